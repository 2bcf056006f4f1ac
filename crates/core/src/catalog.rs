//! Paginated game-history walking and board-size filtering.

use std::ops::Range;

use tracing::{debug, error, info, warn};

use crate::{
    client::ApiClient,
    models::{decode_page, DownloadTarget},
    pace::Pacer,
};

/// Walks a player's game history page by page and collects the download
/// references of every game on the configured board size.
pub struct GameCatalog {
    client: ApiClient,
    pacer: Pacer,
    board_size: u32,
    stop_on_empty: bool,
}

impl GameCatalog {
    /// Catalog fetcher keeping only games whose board width is `board_size`.
    pub fn new(client: ApiClient, pacer: Pacer, board_size: u32) -> Self {
        Self {
            client,
            pacer,
            board_size,
            stop_on_empty: false,
        }
    }

    /// Treat a page with no games as the end of the archive.
    ///
    /// Off by default: the caller-supplied range is normally walked in full,
    /// one request per page, failed pages included.
    pub fn stop_on_empty(mut self, enabled: bool) -> Self {
        self.stop_on_empty = enabled;
        self
    }

    /// Fetch pages `[pages.start, pages.end)` of `player_id`'s history and
    /// return the matching games' download references in encounter order
    /// (page order, then listing order within a page).
    ///
    /// `pages.end` itself is never requested. A page that cannot be fetched
    /// or decoded is logged and permanently skipped for this run; re-running
    /// the pipeline is the only retry. Pacing applies after every page,
    /// successful or not.
    pub async fn fetch_filtered(&self, player_id: &str, pages: Range<u32>) -> Vec<DownloadTarget> {
        let mut targets = Vec::new();
        for page in pages {
            let path = format!("api/v1/players{player_id}/games?page={page}");
            match self.client.get_text(&path).await {
                Ok(body) => {
                    let url = self.client.absolute_url(&path);
                    if self.collect_page(player_id, page, &url, &body, &mut targets) {
                        break;
                    }
                }
                Err(err) => warn!("games page {page} skipped: {err}"),
            }
            self.pacer.pause().await;
        }
        targets
    }

    /// Decode one page body into `targets`; returns true when paging should
    /// stop early.
    fn collect_page(
        &self,
        player_id: &str,
        page: u32,
        url: &str,
        body: &str,
        targets: &mut Vec<DownloadTarget>,
    ) -> bool {
        let listing = match decode_page(body) {
            Ok(listing) => listing,
            Err(err) => {
                error!("failed to decode games page {page} for player {player_id}: {err}");
                return false;
            }
        };

        info!(
            "fetched games page {page} from {url} ({} games listed)",
            listing.results.len()
        );

        let empty = listing.results.is_empty();
        for game in &listing.results {
            if game.width != self.board_size {
                debug!("ignoring {} game {}", game.board_label(), game.id);
                continue;
            }
            match game.download_target() {
                Some(target) => {
                    debug!("queued {target}");
                    targets.push(target);
                }
                None => warn!("game {} has no download reference, skipping", game.id),
            }
        }

        if empty && self.stop_on_empty {
            info!("page {page} listed no games, stopping early");
            return true;
        }
        false
    }
}
