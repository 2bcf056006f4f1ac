//! Player profile lookup.

use tracing::{error, warn};

use crate::{client::ApiClient, models::decode_profile};

/// Resolve a player's display name from their profile document.
///
/// Failures of any kind degrade to an empty string, which callers treat as
/// "no per-player subdirectory". The run never hinges on this lookup.
pub async fn resolve_display_name(client: &ApiClient, player_id: &str) -> String {
    let path = format!("api/v1/players{player_id}");
    let body = match client.get_text(&path).await {
        Ok(body) => body,
        Err(err) => {
            warn!("player profile for {player_id} unavailable: {err}");
            return String::new();
        }
    };

    match decode_profile(&body) {
        Ok(profile) => profile.username,
        Err(err) => {
            error!("failed to decode player profile for {player_id}: {err}");
            String::new()
        }
    }
}
