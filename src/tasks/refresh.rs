//! Catalog Refresh Task
//!
//! Background task that periodically repopulates every provider.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::service::FontService;

/// Spawns a background task that refreshes each provider every `interval`.
///
/// Failures are logged and retried on the next tick. The returned handle
/// should be aborted on shutdown.
pub fn spawn_refresh_task(service: Arc<FontService>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(?interval, "Starting catalog refresh task");

        loop {
            tokio::time::sleep(interval).await;

            for provider in service.providers() {
                match service.refresh_provider(provider.as_ref()).await {
                    Ok(families) => {
                        info!(provider = provider.id(), families, "Scheduled refresh complete")
                    }
                    Err(err) => {
                        error!(provider = provider.id(), error = %err, "Scheduled refresh failed")
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetch::testing::StubFetcher;

    const CATALOG_URL: &str = "https://www.googleapis.com/webfonts/v1/webfonts?sort=popularity&key=";
    const CATALOG: &str = r#"{"items":[{"family":"Inter","category":"sans-serif","files":{"regular":"https://fonts.example/inter.ttf"}}]}"#;

    #[tokio::test]
    async fn test_refresh_task_populates_providers() {
        let config = Config {
            data_dir: std::env::temp_dir()
                .join(format!("fonts_api-refresh-{}", std::process::id())),
            ..Config::default()
        };
        let fetcher = Arc::new(StubFetcher::default().with(CATALOG_URL, CATALOG));
        let service = Arc::new(FontService::with_default_providers(&config, fetcher));

        let task = spawn_refresh_task(Arc::clone(&service), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;
        task.abort();

        let google = service.provider("google").unwrap();
        assert!(google.font_cache().get(&"Inter".to_string()).is_some());
        assert!(service.snapshot_path("google").exists());

        let _ = tokio::fs::remove_dir_all(&config.data_dir).await;
    }

    #[tokio::test]
    async fn test_refresh_task_survives_failures() {
        let config = Config::default();
        let service = Arc::new(FontService::with_default_providers(
            &config,
            Arc::new(StubFetcher::default()),
        ));

        let task = spawn_refresh_task(service, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!task.is_finished());
        task.abort();
    }
}
