#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Festival record sources.
//!
//! Each upstream implements the [`FestivalSource`] trait: fetch every
//! raw record, then normalize them into canonical
//! [`FestivalRecord`]s. Both backends share one normalization step driven
//! by the field mappings in their TOML definitions.

pub mod open_data;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod source_def;
pub mod transport;
pub mod wordpress;

#[cfg(test)]
pub(crate) mod testing;

use std::collections::BTreeMap;
use std::fmt::Display;

use async_trait::async_trait;
use festival_map_festival_models::FestivalRecord;

/// Records requested per page when none is configured.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Maximum festivals loaded when none is configured.
pub const DEFAULT_MAX_FESTIVALS: u64 = 8000;

/// Errors that can occur while fetching festivals.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request could not be completed or returned a non-2xx status.
    #[error("Transport error for {url}: {message}")]
    Transport {
        /// Requested URL.
        url: String,
        /// What went wrong.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The upstream answered but refused the request.
    #[error("Request rejected: {message}")]
    Rejected {
        /// Server-provided message.
        message: String,
    },

    /// The source is misconfigured.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of what is wrong.
        message: String,
    },
}

impl SourceError {
    /// Builds a [`SourceError::Transport`].
    pub fn transport(url: &str, message: impl Display) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Builds a [`SourceError::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Configuration for a fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Records per page.
    pub page_size: u64,
    /// Free-text search term.
    pub query: Option<String>,
    /// Upstream field refinements. Empty values are ignored.
    pub refine: BTreeMap<String, String>,
    /// Maximum number of records to fetch.
    pub limit: Option<u64>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            query: None,
            refine: BTreeMap::new(),
            limit: Some(DEFAULT_MAX_FESTIVALS),
        }
    }
}

/// Trait that all festival sources implement.
#[async_trait]
pub trait FestivalSource: Send + Sync {
    /// Returns a unique identifier for this source (e.g. `"culture_gouv"`).
    fn id(&self) -> &str;

    /// Returns the human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetches and normalizes every festival.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if any request fails or the upstream
    /// rejects the request. No partial result is returned.
    async fn fetch_all(&self, options: &FetchOptions) -> Result<Vec<FestivalRecord>, SourceError>;
}
