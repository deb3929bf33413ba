#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Source types and the response envelopes of the upstream festival APIs.
//!
//! Records inside the envelopes stay raw [`serde_json::Value`]s. Turning
//! them into canonical festival records is the source crate's job.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The kind of upstream a festival source talks to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Paginated open-data search API (`nhits` + `records`).
    OpenData,
    /// WordPress `admin-ajax.php` endpoint returning every festival at once.
    WordPress,
}

/// Response of the open-data records search API.
///
/// `nhits` is the total number of matching records, independent of the
/// page actually returned in `records`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total matching records.
    #[serde(default)]
    pub nhits: u64,
    /// Records in this page.
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

/// Envelope returned by the WordPress festivals endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordPressResponse {
    /// Whether the server accepted the request.
    #[serde(default)]
    pub success: bool,
    /// Festival records when `success` is `true`. Failures sent through
    /// `wp_send_json_error` carry the error text here instead.
    #[serde(default)]
    pub data: serde_json::Value,
    /// Server message, sometimes present when `success` is `false`.
    #[serde(default)]
    pub message: Option<String>,
}

impl WordPressResponse {
    /// The server's explanation of a failure: `message`, else a string
    /// `data`.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.data.as_str().filter(|m| !m.trim().is_empty()))
    }

    /// Consumes the envelope into its records.
    ///
    /// A missing or `null` `data` is an empty list. Returns `None` when
    /// `data` is anything other than an array.
    #[must_use]
    pub fn into_records(self) -> Option<Vec<serde_json::Value>> {
        match self.data {
            serde_json::Value::Array(records) => Some(records),
            serde_json::Value::Null => Some(Vec::new()),
            _ => None,
        }
    }
}
