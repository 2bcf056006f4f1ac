#![warn(clippy::all, missing_docs)]

//! Core logic for the SGF archiver.
//!
//! This crate hosts the API client, the paginated game catalog, player name
//! resolution, and the paced SGF download loop used by the command line
//! frontend and any future frontends.

pub mod catalog;
pub mod client;
pub mod config;
pub mod download;
pub mod models;
pub mod pace;
pub mod pipeline;
pub mod player;

pub use catalog::GameCatalog;
pub use client::{ApiClient, FetchError};
pub use config::AppConfig;
pub use download::SgfDownloader;
pub use models::{DecodeError, DownloadTarget, GamePage, GameSummary, PlayerProfile};
pub use pace::Pacer;
pub use pipeline::Pipeline;
pub use player::resolve_display_name;
