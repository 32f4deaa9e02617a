//! Request DTOs for the fonts API
//!
//! Query strings use repeated keys for lists (`families=A&families=B`).

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::fonts::{FontFilters, FontSelector, ResultType};

/// Query of `GET /api/:provider/fonts/all`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FontsQuery {
    /// Categories to keep; empty keeps all
    #[serde(default)]
    pub categories: Vec<String>,
    /// Case-insensitive family name substring
    #[serde(default)]
    pub search: Option<String>,
}

impl FontsQuery {
    pub fn into_filters(self) -> FontFilters {
        FontFilters {
            categories: self.categories,
            search: self.search,
        }
    }
}

/// Query of the preview endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewQuery {
    /// `Family:variant` selectors
    #[serde(default)]
    pub families: Vec<String>,
    /// Text to draw
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "resultType")]
    pub result_type: ResultType,
    /// Banner size instead of cover size
    #[serde(default)]
    pub small: bool,
}

impl PreviewQuery {
    /// Parsed selectors in request order.
    pub fn selectors(&self) -> Vec<FontSelector> {
        self.families.iter().map(|f| FontSelector::parse(f)).collect()
    }

    /// The first selector; single previews ignore the rest.
    pub fn first_selector(&self) -> Result<FontSelector> {
        self.families
            .first()
            .map(|f| FontSelector::parse(f))
            .ok_or_else(|| AppError::InvalidRequest("families is required".to_string()))
    }
}
