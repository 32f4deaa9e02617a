//! Fonts API - font catalog and preview server
//!
//! Mirrors remote font catalogs into TTL caches and renders text previews.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fonts;
pub mod models;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use service::FontService;
pub use tasks::{spawn_refresh_task, spawn_sweep_task};
