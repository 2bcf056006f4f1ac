//! End-to-end run for a single player: list, resolve, download.

use std::{
    ops::Range,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::info;

use crate::{
    catalog::GameCatalog, client::ApiClient, config::AppConfig, download::SgfDownloader,
    pace::Pacer, player::resolve_display_name,
};

/// The assembled fetch, filter and download sequence.
///
/// One pipeline can serve several players in a row; each [`run`] call walks
/// its own page range and writes into its own per-player directory.
///
/// [`run`]: Pipeline::run
pub struct Pipeline {
    client: ApiClient,
    pacer: Pacer,
    board_size: u32,
    stop_on_empty: bool,
}

impl Pipeline {
    /// Assemble a pipeline from application settings.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = ApiClient::new(&config.base_url)?;
        let pacer = Pacer::from_millis(config.delay_min_ms, config.delay_max_ms);
        Ok(Self {
            client,
            pacer,
            board_size: config.board_size,
            stop_on_empty: config.stop_on_empty,
        })
    }

    /// Replace the request pacer. Tests use this to run without delays.
    pub fn with_pacer(mut self, pacer: Pacer) -> Self {
        self.pacer = pacer;
        self
    }

    /// Archive one player's matching games under `dest_root`.
    ///
    /// Walks the history pages in `pages`, keeps the games played on boards of
    /// the configured size, resolves the player's display name and downloads
    /// every record into `dest_root/<name>/`. An unresolvable name falls back
    /// to `dest_root` itself. Per-item failures are logged and skipped; only
    /// an unusable destination directory aborts the run.
    pub async fn run(&self, player_id: &str, pages: Range<u32>, dest_root: &Path) -> Result<()> {
        let catalog = GameCatalog::new(self.client.clone(), self.pacer, self.board_size)
            .stop_on_empty(self.stop_on_empty);
        let targets = catalog.fetch_filtered(player_id, pages).await;
        info!(
            "player {player_id}: {} game(s) selected for download",
            targets.len()
        );

        let name = resolve_display_name(&self.client, player_id).await;
        let dest = player_directory(dest_root, &name);
        info!("saving records for player {player_id} to {}", dest.display());

        SgfDownloader::new(self.client.clone(), self.pacer)
            .download_all(&targets, &dest)
            .await
    }
}

/// Destination directory for a player's records.
///
/// The display name is reduced to a filesystem-safe component first; when
/// nothing safe remains, the records land directly in the root.
fn player_directory(root: &Path, display_name: &str) -> PathBuf {
    let component = sanitize_component(display_name);
    if component.is_empty() {
        root.to_path_buf()
    } else {
        root.join(component)
    }
}

/// Keep only characters that are safe in a directory name on every platform.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}
