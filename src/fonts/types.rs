//! Font domain types shared by providers, the snapshot file and the API.

use serde::{Deserialize, Serialize};

/// Variant used when a selector names only the family.
pub const DEFAULT_VARIANT: &str = "regular";

// == Font Family ==
/// Catalog metadata for one font family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFamily {
    pub name: String,
    pub category: String,
    /// Optimistically true until a license download proves otherwise
    pub has_license: bool,
    pub variants: Vec<FontVariant>,
    pub order: FontOrder,
}

impl FontFamily {
    /// Finds a variant by name.
    pub fn variant(&self, name: &str) -> Option<&FontVariant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// Sort keys for a family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontOrder {
    /// Position in the catalog's popularity ranking, 0 = most popular
    pub popularity: usize,
}

/// One downloadable style of a family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontVariant {
    pub name: String,
    /// `Family:variant`
    pub full_name: String,
    pub download_url: String,
    pub preview: PreviewLinks,
}

/// Relative links to the preview endpoint for a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewLinks {
    /// Contains `{IsSmall}` and `{Text}` placeholders
    pub template: String,
    pub small: String,
    pub large: String,
}

// == Family And Variant ==
/// A resolved family together with one of its variants.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyAndVariant {
    pub family: FontFamily,
    pub variant: FontVariant,
}

impl FamilyAndVariant {
    /// Key in the parsed font cache: `family:variant`.
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.family.name, self.variant.name)
    }
}

// == Font Selector ==
/// A `Family:variant` reference as written in query strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSelector {
    pub family: String,
    pub variant: String,
}

impl FontSelector {
    /// Splits on the first `:`. A missing or empty variant means `regular`.
    pub fn parse(value: &str) -> Self {
        let (family, variant) = match value.split_once(':') {
            Some((family, variant)) if !variant.is_empty() => (family, variant),
            Some((family, _)) => (family, DEFAULT_VARIANT),
            None => (value, DEFAULT_VARIANT),
        };
        Self {
            family: family.to_string(),
            variant: variant.to_string(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}:{}", self.family, self.variant)
    }
}

// == Filters ==
/// Criteria for listing families.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontFilters {
    /// Keep only these categories; empty keeps all
    pub categories: Vec<String>,
    /// Case-insensitive substring of the family name
    pub search: Option<String>,
}

impl FontFilters {
    pub fn matches(&self, family: &FontFamily) -> bool {
        if !self.categories.is_empty() && !self.categories.contains(&family.category) {
            return false;
        }
        match self.search.as_deref() {
            Some(search) if !search.is_empty() => family
                .name
                .to_lowercase()
                .contains(&search.to_lowercase()),
            _ => true,
        }
    }
}

/// Lowercase name without spaces, used for directory names and license URLs.
pub fn path_safe_name(name: &str) -> String {
    name.replace(' ', "").to_lowercase()
}
