//! Fetching and persisting game records.

use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tracing::{error, info, warn};

use crate::{client::ApiClient, models::DownloadTarget, pace::Pacer};

/// Downloads SGF records into a destination directory.
///
/// The directory doubles as the completion ledger: a target whose derived
/// filename already exists is never requested again, which is what makes
/// re-running the pipeline both cheap and idempotent.
pub struct SgfDownloader {
    client: ApiClient,
    pacer: Pacer,
}

impl SgfDownloader {
    /// Downloader issuing its requests through `client`, paced by `pacer`.
    pub fn new(client: ApiClient, pacer: Pacer) -> Self {
        Self { client, pacer }
    }

    /// Fetch every target into `dest`, in order, skipping existing files.
    ///
    /// Only a failure to create `dest` aborts the run. A failed download or
    /// write is logged and the loop moves on; no partial file is left behind
    /// either way.
    pub async fn download_all(&self, targets: &[DownloadTarget], dest: &Path) -> Result<()> {
        if !dest.exists() {
            info!("download directory {} missing, creating it", dest.display());
        }
        fs::create_dir_all(dest)
            .with_context(|| format!("failed to create download directory {}", dest.display()))?;

        let total = targets.len();
        let mut saved = 0usize;
        let mut skipped = 0usize;
        let mut failed = 0usize;

        for (index, target) in targets.iter().enumerate() {
            let file_name = target.file_name();
            let path = dest.join(&file_name);
            if path.exists() {
                info!("{file_name} already exists, skipping");
                skipped += 1;
                continue;
            }

            let body = match self.client.get_text(&target.sgf_path()).await {
                Ok(body) => body,
                Err(err) => {
                    warn!("record download skipped: {err}");
                    failed += 1;
                    continue;
                }
            };

            match write_atomic(&path, &body) {
                Ok(()) => {
                    saved += 1;
                    info!("{}/{} saved: {file_name}", index + 1, total);
                }
                Err(err) => {
                    error!("failed to write {}: {err:#}", path.display());
                    failed += 1;
                    continue;
                }
            }

            self.pacer.pause().await;
        }

        info!("finished: {saved} saved, {skipped} skipped, {failed} failed");
        Ok(())
    }
}

/// Write `body` to `path` through a temporary file in the same directory, so
/// an interrupted run never leaves a truncated record behind.
fn write_atomic(path: &Path, body: &str) -> Result<()> {
    let dir = path
        .parent()
        .context("destination path has no parent directory")?;
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(body.as_bytes())
        .context("failed to write record body")?;
    tmp.persist(path)
        .with_context(|| format!("failed to move record into place at {}", path.display()))?;
    Ok(())
}
