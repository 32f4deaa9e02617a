//! JSON snapshot of a provider's metadata cache.
//!
//! A missing or empty snapshot file means "nothing cached yet", never an error.

use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::Result;
use crate::fonts::FontFamily;

/// File name of the snapshot inside a provider's data directory.
pub const SNAPSHOT_FILE: &str = "cache.json";

/// Writes `families` as a JSON array, creating parent directories.
pub async fn save_snapshot(path: &Path, families: &[FontFamily]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let body = serde_json::to_vec(families)?;
    fs::write(path, body).await?;

    debug!(path = %path.display(), families = families.len(), "snapshot saved");
    Ok(())
}

/// Reads a snapshot. Returns `None` when the file is absent or empty.
pub async fn load_snapshot(path: &Path) -> Result<Option<Vec<FontFamily>>> {
    let body = match fs::read(path).await {
        Ok(body) => body,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    Ok(Some(serde_json::from_slice(&body)?))
}
