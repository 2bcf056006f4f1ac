//! Thin HTTP client for the game-server API.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use thiserror::Error;

/// User agent sent with every request, so the server can tell us apart.
const USER_AGENT: &str = concat!("sgfdl/", env!("CARGO_PKG_VERSION"));

/// A remote request that did not produce a usable body.
///
/// Every call site treats both variants as soft failures: the item at hand is
/// logged and skipped, and the surrounding loop carries on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Absolute URL of the attempted request.
        url: String,
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-2xx status.
    #[error("unexpected status {status} from {url}")]
    Status {
        /// Absolute URL of the attempted request.
        url: String,
        /// Status code the server returned.
        status: StatusCode,
    },
}

/// Stateless GET client bound to a fixed base origin.
///
/// One instance serves a whole per-player run; reqwest keeps the underlying
/// connections alive between calls. No cookies or other session state are
/// retained.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
}

impl ApiClient {
    /// Build a client for `base_url` (trailing slashes are ignored).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;
        let mut base = base_url.into();
        while base.ends_with('/') {
            base.pop();
        }
        Ok(Self { http, base })
    }

    /// Absolute URL for a path relative to the base origin, with exactly one
    /// `/` between the two.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    /// GET `path` and return the response body on any 2xx status.
    pub async fn get_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.absolute_url(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        response
            .text()
            .await
            .map_err(|source| FetchError::Transport { url, source })
    }
}
