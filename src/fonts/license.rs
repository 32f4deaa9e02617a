//! License files for font families.
//!
//! Licenses live at `{data_dir}/{provider}/fonts/{safe name}/license.txt`.
//! An empty file records that the family has no license upstream.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::fetch::Fetcher;
use crate::fonts::provider::FamilyCache;
use crate::fonts::{path_safe_name, FontProvider};

/// Location of the license file for `family` under a provider.
pub fn license_path(data_dir: &Path, provider_id: &str, family: &str) -> PathBuf {
    data_dir
        .join(provider_id)
        .join("fonts")
        .join(path_safe_name(family))
        .join("license.txt")
}

/// Downloads every license that is expected but not yet on disk.
///
/// Runs over the provider's metadata cache with at most `concurrency`
/// downloads in flight and stops at the first failure. Each download, and
/// each empty license already on disk, updates the cached `has_license`
/// flag. Returns how many were fetched.
pub async fn download_missing_licenses(
    provider: &dyn FontProvider,
    fetcher: Arc<dyn Fetcher>,
    data_dir: &Path,
    concurrency: usize,
) -> Result<usize> {
    let cache = Arc::clone(provider.font_cache());
    let provider_id = provider.id().to_string();
    let data_dir = data_dir.to_path_buf();

    // Resolve URLs up front so workers do not need the provider.
    let urls: HashMap<String, String> = cache
        .values()
        .filter(|family| family.has_license)
        .map(|family| (family.name.clone(), provider.license_url(&family)))
        .collect();
    let urls = Arc::new(urls);

    let worker_cache = Arc::clone(&cache);
    let fetched = cache
        .parallel_map(concurrency, move |name: String, family| {
            let url = urls.get(&name).filter(|_| family.has_license).cloned();
            let path = license_path(&data_dir, &provider_id, &name);
            fetch_license(
                Arc::clone(&worker_cache),
                Arc::clone(&fetcher),
                name,
                url,
                path,
            )
        })
        .await?
        .into_iter()
        .filter(|downloaded| *downloaded)
        .count();

    if fetched > 0 {
        info!(provider = provider.id(), fetched, "Downloaded missing licenses");
    }
    Ok(fetched)
}

/// Downloads and stores one license unless it is already on disk.
async fn fetch_license(
    cache: Arc<FamilyCache>,
    fetcher: Arc<dyn Fetcher>,
    name: String,
    url: Option<String>,
    path: PathBuf,
) -> Result<bool> {
    let Some(url) = url else {
        return Ok(false);
    };

    match fs::metadata(&path).await {
        Ok(meta) => {
            // A stored empty file means the family has no license upstream
            if meta.len() == 0 {
                set_has_license(&cache, &name, false);
            }
            return Ok(false);
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    let license = fetcher.fetch(&url).await?.unwrap_or_default();
    set_has_license(&cache, &name, !license.is_empty());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&path, &license).await?;
    debug!(family = %name, bytes = license.len(), "license stored");

    Ok(true)
}

fn set_has_license(cache: &FamilyCache, name: &str, has_license: bool) {
    cache.update(&name.to_string(), |mut family| {
        family.has_license = has_license;
        family
    });
}

/// Reads the stored license text of `family`.
pub async fn read_license(data_dir: &Path, provider_id: &str, family: &str) -> Result<String> {
    let path = license_path(data_dir, provider_id, family);
    match fs::read_to_string(&path).await {
        Ok(text) if !text.is_empty() => Ok(text),
        Ok(_) => Err(AppError::LicenseNotFound(family.to_string())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::LicenseNotFound(family.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}
