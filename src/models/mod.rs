//! Request and Response models for the fonts API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! query strings and JSON response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{FontsQuery, PreviewQuery};
pub use responses::{ErrorResponse, HealthResponse, ItemsResponse, ProviderResponse};
