//! Font Service
//!
//! Owns the registered providers and the parsed font cache. Constructed once
//! in `main` and shared with the HTTP layer through `AppState`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::fetch::Fetcher;
use crate::fonts::license::{download_missing_licenses, read_license};
use crate::fonts::preview::render_preview;
use crate::fonts::snapshot::{load_snapshot, save_snapshot, SNAPSHOT_FILE};
use crate::fonts::{FontCache, FontProvider, FontSelector, GoogleFontsProvider};

pub struct FontService {
    providers: HashMap<String, Arc<dyn FontProvider>>,
    font_cache: FontCache,
    fetcher: Arc<dyn Fetcher>,
    data_dir: PathBuf,
    license_concurrency: usize,
}

impl FontService {
    /// Creates a service with no providers.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            providers: HashMap::new(),
            font_cache: FontCache::new(
                Arc::clone(&fetcher),
                config.font_ttl(),
                config.sweep_interval(),
            ),
            fetcher,
            data_dir: config.data_dir.clone(),
            license_concurrency: config.license_concurrency,
        }
    }

    /// Creates a service with the Google Fonts provider registered.
    pub fn with_default_providers(config: &Config, fetcher: Arc<dyn Fetcher>) -> Self {
        let google = GoogleFontsProvider::new(
            config.google_api_key.clone(),
            Arc::clone(&fetcher),
            config.metadata_ttl(),
            config.sweep_interval(),
        );

        let mut service = Self::new(config, fetcher);
        service.register(Arc::new(google));
        service
    }

    /// Adds a provider, replacing any previous one with the same id.
    pub fn register(&mut self, provider: Arc<dyn FontProvider>) {
        self.providers.insert(provider.id().to_string(), provider);
    }

    pub fn provider(&self, id: &str) -> Result<Arc<dyn FontProvider>> {
        self.providers
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::ProviderNotFound(id.to_string()))
    }

    /// All providers, sorted by id.
    pub fn providers(&self) -> Vec<Arc<dyn FontProvider>> {
        let mut providers: Vec<_> = self.providers.values().cloned().collect();
        providers.sort_by(|a, b| a.id().cmp(b.id()));
        providers
    }

    pub fn font_cache(&self) -> &FontCache {
        &self.font_cache
    }

    pub fn snapshot_path(&self, provider_id: &str) -> PathBuf {
        self.data_dir.join(provider_id).join(SNAPSHOT_FILE)
    }

    // == Startup ==
    /// Populates every provider: snapshot first, remote catalog otherwise.
    ///
    /// A provider that fails is logged and skipped.
    pub async fn initialize(&self) {
        for provider in self.providers() {
            if let Err(err) = self.initialize_provider(provider.as_ref()).await {
                error!(provider = provider.id(), error = %err, "Failed to initialize provider");
            }
        }
        info!("Font providers initialized");
    }

    async fn initialize_provider(&self, provider: &dyn FontProvider) -> Result<()> {
        match load_snapshot(&self.snapshot_path(provider.id())).await? {
            Some(families) => {
                info!(
                    provider = provider.id(),
                    families = families.len(),
                    "Seeded from snapshot"
                );
                provider.initialize_from_snapshot(families);
            }
            None => {
                provider.refresh().await?;
            }
        }

        self.download_licenses(provider).await?;
        self.save_snapshot(provider).await
    }

    // == Refresh ==
    /// Repopulates a provider from its catalog, settles license state and
    /// re-saves its snapshot.
    pub async fn refresh_provider(&self, provider: &dyn FontProvider) -> Result<usize> {
        let families = provider.refresh().await?;
        self.download_licenses(provider).await?;
        self.save_snapshot(provider).await?;
        Ok(families.len())
    }

    async fn download_licenses(&self, provider: &dyn FontProvider) -> Result<usize> {
        download_missing_licenses(
            provider,
            Arc::clone(&self.fetcher),
            &self.data_dir,
            self.license_concurrency,
        )
        .await
    }

    /// Writes the provider's cached families to its snapshot file.
    pub async fn save_snapshot(&self, provider: &dyn FontProvider) -> Result<()> {
        let families = provider.font_cache().all();
        save_snapshot(&self.snapshot_path(provider.id()), &families).await
    }

    // == Requests ==
    /// Renders a PNG preview of `text` in the selected family and variant.
    pub async fn preview(
        &self,
        provider: &dyn FontProvider,
        selector: &FontSelector,
        text: &str,
        small: bool,
    ) -> Result<Vec<u8>> {
        let target = provider.family_and_variant(&selector.family, &selector.variant)?;
        let font = self.font_cache.get_or_fetch(&target).await?;
        let text = text.to_string();

        tokio::task::spawn_blocking(move || render_preview(&font, &text, small))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
    }

    /// License text of a cached family that is known to have one.
    pub async fn license(&self, provider: &dyn FontProvider, family: &str) -> Result<String> {
        let cached = provider
            .font_cache()
            .get(&family.to_string())
            .ok_or_else(|| AppError::FamilyNotFound(family.to_string()))?;

        if !cached.has_license {
            return Err(AppError::LicenseNotFound(family.to_string()));
        }

        read_license(&self.data_dir, provider.id(), &cached.name).await
    }
}
