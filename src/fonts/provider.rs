//! Font provider abstraction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::TtlCache;
use crate::error::{AppError, Result};
use crate::fonts::{FamilyAndVariant, FontFamily, FontFilters};

/// Metadata cache of a provider, keyed by family name.
pub type FamilyCache = TtlCache<String, FontFamily>;

/// A remote font catalog mirrored into a local TTL cache.
#[async_trait]
pub trait FontProvider: Send + Sync {
    /// Stable identifier used in URLs and on disk.
    fn id(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Base path of this provider's font routes.
    fn endpoint(&self) -> String {
        format!("/api/{}/fonts", self.id())
    }

    /// Family metadata cache.
    fn font_cache(&self) -> &Arc<FamilyCache>;

    /// Distinct categories seen on the last population, sorted.
    fn categories(&self) -> Vec<String>;

    /// URL of the license text for `family`.
    fn license_url(&self, family: &FontFamily) -> String;

    /// Repopulates the cache from the remote catalog.
    async fn refresh(&self) -> Result<Vec<FontFamily>>;

    /// Seeds the cache from previously saved metadata.
    fn initialize_from_snapshot(&self, families: Vec<FontFamily>);

    /// Cached families matching `filters`, most popular first.
    fn fonts(&self, filters: &FontFilters) -> Vec<FontFamily> {
        let mut items: Vec<FontFamily> = self
            .font_cache()
            .values()
            .filter(|family| filters.matches(family))
            .collect();
        items.sort_by_key(|family| family.order.popularity);
        items
    }

    /// Resolves a family and one of its variants from the cache.
    fn family_and_variant(&self, family: &str, variant: &str) -> Result<FamilyAndVariant> {
        let family = self
            .font_cache()
            .get(&family.to_string())
            .ok_or_else(|| AppError::FamilyNotFound(family.to_string()))?;

        let variant = family
            .variant(variant)
            .cloned()
            .ok_or_else(|| AppError::VariantNotFound(format!("{}:{}", family.name, variant)))?;

        Ok(FamilyAndVariant { family, variant })
    }
}
