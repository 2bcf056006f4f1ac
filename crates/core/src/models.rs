#![allow(missing_docs)]

//! Wire models for the game-server API and the values derived from them.
//!
//! Decoding is deliberately forgiving: every field defaults when absent and
//! unknown fields are ignored, so older payload dumps and future API versions
//! both decode. The pipeline only ever acts on a game's `width` and its
//! `related.detail` reference; everything else is descriptive metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One page of a player's game history listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamePage {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<GameSummary>,
}

/// A single game as listed in the history pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSummary {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub related: RelatedLinks,
    #[serde(default)]
    pub players: Option<GamePlayers>,
    #[serde(default)]
    pub ranked: bool,
    #[serde(default)]
    pub handicap: Option<i64>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub annulled: bool,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended: Option<DateTime<Utc>>,
}

impl GameSummary {
    /// Board geometry label, e.g. `9x9`.
    pub fn board_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Download reference for this game's record, when the listing carries one.
    pub fn download_target(&self) -> Option<DownloadTarget> {
        self.related
            .detail
            .as_deref()
            .map(str::trim)
            .filter(|reference| !reference.is_empty())
            .map(DownloadTarget::new)
    }
}

/// Links from a listed game to its own API resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelatedLinks {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Both seats of a listed game.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamePlayers {
    #[serde(default)]
    pub black: Option<PlayerRef>,
    #[serde(default)]
    pub white: Option<PlayerRef>,
}

/// Player data as embedded in a game listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRef {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub ranking: Option<f64>,
    #[serde(default)]
    pub professional: bool,
}

/// A player's own profile document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerProfile {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub ranking: Option<f64>,
    #[serde(default)]
    pub professional: bool,
    #[serde(default)]
    pub ratings: Option<Ratings>,
}

/// Rating block of a profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ratings {
    #[serde(default)]
    pub overall: Option<OverallRating>,
}

/// Glicko-style rating triple.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverallRating {
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub deviation: f64,
    #[serde(default)]
    pub volatility: f64,
}

/// Reference to a single downloadable game record.
///
/// Wraps the `related.detail` path from the games listing. The final path
/// segment is the server-side game id, unique per game, so the local
/// filenames derived here never collide across a player's archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTarget(String);

impl DownloadTarget {
    /// Wrap a reference string as reported by the listing.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The raw reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final non-empty path segment of the reference, i.e. the game id.
    pub fn id_segment(&self) -> &str {
        self.0
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or("")
    }

    /// Filename the record is stored under locally.
    pub fn file_name(&self) -> String {
        format!("{}.sgf", self.id_segment())
    }

    /// API path serving the record's SGF text.
    pub fn sgf_path(&self) -> String {
        format!("{}/sgf", self.0.trim_end_matches('/'))
    }
}

impl fmt::Display for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A response payload that did not match the expected shape.
#[derive(Debug, Error)]
#[error("payload did not match the expected shape: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Decode one games-listing page.
pub fn decode_page(body: &str) -> Result<GamePage, DecodeError> {
    Ok(serde_json::from_str(body)?)
}

/// Decode a player profile document.
pub fn decode_profile(body: &str) -> Result<PlayerProfile, DecodeError> {
    Ok(serde_json::from_str(body)?)
}
