//! Google Fonts catalog provider.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::error::{AppError, Result};
use crate::fetch::Fetcher;
use crate::fonts::provider::FamilyCache;
use crate::fonts::variants::sort_variants;
use crate::fonts::{path_safe_name, FontFamily, FontOrder, FontProvider, FontVariant, PreviewLinks};
use crate::tasks::SweepHandle;

const CATALOG_URL: &str = "https://www.googleapis.com/webfonts/v1/webfonts?sort=popularity";
const LICENSE_URL_BASE: &str = "https://raw.githubusercontent.com/google/fonts/refs/heads/main/ofl";

// == Catalog Wire Format ==
#[derive(Debug, Deserialize)]
struct WebFontList {
    #[serde(default)]
    items: Vec<WebFontFamily>,
    error: Option<WebFontApiError>,
}

#[derive(Debug, Deserialize)]
struct WebFontApiError {
    code: Option<u16>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebFontFamily {
    family: String,
    category: Option<String>,
    #[serde(default)]
    files: BTreeMap<String, String>,
}

// == Provider ==
/// Provider backed by the Google Fonts developer API.
pub struct GoogleFontsProvider {
    cache: Arc<FamilyCache>,
    _sweep: SweepHandle,
    categories: RwLock<Vec<String>>,
    fetcher: Arc<dyn Fetcher>,
    api_key: String,
}

impl GoogleFontsProvider {
    pub const ID: &'static str = "google";

    /// Creates the provider with an empty metadata cache.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        api_key: impl Into<String>,
        fetcher: Arc<dyn Fetcher>,
        ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        let (cache, sweep) = TtlCache::with_sweep_interval(ttl, sweep_interval);
        Self {
            cache,
            _sweep: sweep,
            categories: RwLock::new(Vec::new()),
            fetcher,
            api_key: api_key.into(),
        }
    }

    fn catalog_url(&self) -> String {
        format!("{CATALOG_URL}&key={}", self.api_key)
    }
}

#[async_trait]
impl FontProvider for GoogleFontsProvider {
    fn id(&self) -> &str {
        Self::ID
    }

    fn display_name(&self) -> &str {
        "Google Fonts"
    }

    fn font_cache(&self) -> &Arc<FamilyCache> {
        &self.cache
    }

    fn categories(&self) -> Vec<String> {
        self.categories.read().clone()
    }

    fn license_url(&self, family: &FontFamily) -> String {
        format!("{LICENSE_URL_BASE}/{}/OFL.txt", path_safe_name(&family.name))
    }

    async fn refresh(&self) -> Result<Vec<FontFamily>> {
        let started = Instant::now();

        let body = self
            .fetcher
            .fetch(&self.catalog_url())
            .await?
            .ok_or_else(|| AppError::Upstream("font catalog not found".to_string()))?;

        let list: WebFontList = serde_json::from_slice(&body)?;
        if let Some(error) = list.error {
            return Err(AppError::Upstream(format!(
                "catalog error {}: {}",
                error.code.unwrap_or_default(),
                error.message.unwrap_or_default()
            )));
        }

        let (families, categories) = build_families(self.id(), list.items);
        for family in &families {
            self.cache.set(family.name.clone(), family.clone());
        }
        *self.categories.write() = categories;

        info!(
            provider = self.id(),
            families = families.len(),
            "Catalog refreshed"
        );
        debug!(provider = self.id(), elapsed = ?started.elapsed(), "refresh timing");

        Ok(families)
    }

    fn initialize_from_snapshot(&self, families: Vec<FontFamily>) {
        let categories: BTreeSet<String> = families.iter().map(|f| f.category.clone()).collect();
        for family in families {
            self.cache.set(family.name.clone(), family);
        }
        *self.categories.write() = categories.into_iter().collect();
    }
}

/// Converts catalog items into families, keeping catalog order as popularity.
///
/// Families without a `regular` or `500` file are skipped. Families missing
/// only `regular` get one backed by the `500` file.
fn build_families(provider_id: &str, items: Vec<WebFontFamily>) -> (Vec<FontFamily>, Vec<String>) {
    let mut categories = BTreeSet::new();
    let mut families = Vec::with_capacity(items.len());

    for (popularity, item) in items.into_iter().enumerate() {
        let category = item.category.unwrap_or_else(|| "unknown".to_string());
        categories.insert(category.clone());

        let has_regular = item.files.contains_key("regular");
        let medium_url = item.files.get("500").cloned();
        if !has_regular && medium_url.is_none() {
            warn!(family = %item.family, "Skipping family without regular or 500 variant");
            continue;
        }

        let mut variants: Vec<FontVariant> = item
            .files
            .iter()
            .map(|(name, url)| FontVariant {
                name: name.clone(),
                full_name: format!("{}:{}", item.family, name),
                download_url: url.clone(),
                preview: preview_links(provider_id, &item.family, name),
            })
            .collect();

        if let (false, Some(url)) = (has_regular, medium_url) {
            variants.push(FontVariant {
                name: "regular".to_string(),
                full_name: format!("{}:regular", item.family),
                download_url: url,
                preview: preview_links(provider_id, &item.family, "500"),
            });
        }

        families.push(FontFamily {
            name: item.family,
            category,
            has_license: true,
            variants: sort_variants(variants),
            order: FontOrder { popularity },
        });
    }

    (families, categories.into_iter().collect())
}

fn preview_links(provider_id: &str, family: &str, variant: &str) -> PreviewLinks {
    let escaped = family.replace(' ', "%20");
    let base = format!("/api/{provider_id}/fonts/preview?families={escaped}:{variant}&resultType=png");
    PreviewLinks {
        template: format!("{base}&small={{IsSmall}}&text={{Text}}"),
        small: format!("{base}&small=true&text={escaped}"),
        large: format!("{base}&small=false&text={escaped}"),
    }
}
