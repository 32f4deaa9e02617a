//! Parsed font binaries, fetched lazily per variant.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::cache::TtlCache;
use crate::error::{AppError, Result};
use crate::fetch::Fetcher;
use crate::fonts::FamilyAndVariant;
use crate::tasks::SweepHandle;

// == Loaded Font ==
/// Font file bytes known to parse as a face.
#[derive(Debug)]
pub struct LoadedFont {
    data: Vec<u8>,
    index: u32,
}

impl LoadedFont {
    /// Validates `data` as the first face of a font file.
    pub fn parse(data: Vec<u8>) -> Result<Self> {
        ttf_parser::Face::parse(&data, 0).map_err(|e| AppError::InvalidFont(e.to_string()))?;
        Ok(Self { data, index: 0 })
    }

    /// Borrows a parsed face over the stored bytes.
    pub fn face(&self) -> Result<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index)
            .map_err(|e| AppError::InvalidFont(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// == Font Cache ==
/// TTL cache of parsed fonts keyed by `family:variant`.
pub struct FontCache {
    cache: Arc<TtlCache<String, Arc<LoadedFont>>>,
    _sweep: SweepHandle,
    fetcher: Arc<dyn Fetcher>,
}

impl FontCache {
    /// Must be called from within a tokio runtime.
    pub fn new(fetcher: Arc<dyn Fetcher>, ttl: Duration, sweep_interval: Duration) -> Self {
        let (cache, sweep) = TtlCache::with_sweep_interval(ttl, sweep_interval);
        Self {
            cache,
            _sweep: sweep,
            fetcher,
        }
    }

    /// Returns the cached font for `target`, downloading it on a miss.
    ///
    /// The cache lock is not held during the download, so concurrent misses
    /// for one key may both fetch; the last one stored wins.
    pub async fn get_or_fetch(&self, target: &FamilyAndVariant) -> Result<Arc<LoadedFont>> {
        let key = target.cache_key();
        if let Some(font) = self.cache.get(&key) {
            return Ok(font);
        }

        let data = self
            .fetcher
            .fetch(&target.variant.download_url)
            .await?
            .ok_or_else(|| {
                AppError::Upstream(format!("font file for {key} not found"))
            })?;

        let font = Arc::new(LoadedFont::parse(data)?);
        debug!(font = %key, bytes = font.len(), "font cached");
        self.cache.set(key, Arc::clone(&font));

        Ok(font)
    }

    /// Number of cached fonts, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
