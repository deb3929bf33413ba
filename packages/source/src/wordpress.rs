//! WordPress `admin-ajax.php` festivals fetcher.
//!
//! The plugin endpoint returns every published festival in one response,
//! so there is a single request and no pagination.

use std::sync::Arc;

use festival_map_source_models::WordPressResponse;
use serde_json::Value;

use crate::progress::ProgressCallback;
use crate::transport::{JsonTransport, Query};
use crate::{FetchOptions, SourceError};

/// Message used when the endpoint rejects a request without saying why.
pub const UNKNOWN_ERROR: &str = "Erreur inconnue";

/// Where a WordPress installation serves festival data.
///
/// Both values are page-scoped in WordPress (the nonce is minted per
/// page load), so they come from runtime configuration rather than from
/// the embedded source definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPressEndpoint {
    /// Full `admin-ajax.php` URL.
    pub ajax_url: String,
    /// Request nonce.
    pub nonce: String,
}

impl WordPressEndpoint {
    /// Validates and builds an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Configuration`] if either value is missing
    /// or blank.
    pub fn new(ajax_url: Option<String>, nonce: Option<String>) -> Result<Self, SourceError> {
        let ajax_url = ajax_url
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SourceError::configuration("WordPress ajax URL is not set"))?;
        let nonce = nonce
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SourceError::configuration("WordPress nonce is not set"))?;
        Ok(Self { ajax_url, nonce })
    }
}

/// Builds the query for the single request.
#[must_use]
pub fn build_query(action: &str, endpoint: &WordPressEndpoint, options: &FetchOptions) -> Query {
    let mut query = vec![
        ("action".to_string(), action.to_string()),
        ("nonce".to_string(), endpoint.nonce.clone()),
    ];

    if let Some(q) = options.query.as_deref().map(str::trim)
        && !q.is_empty()
    {
        query.push(("search".to_string(), q.to_string()));
    }

    for (key, value) in &options.refine {
        if !value.is_empty() {
            query.push((key.clone(), value.clone()));
        }
    }

    query
}

/// Fetches every festival from the endpoint, up to `options.limit`.
///
/// # Errors
///
/// Returns [`SourceError::Rejected`] when the envelope reports failure,
/// and any transport or decoding error from the request.
pub async fn fetch_wordpress(
    action: &str,
    endpoint: &WordPressEndpoint,
    transport: &dyn JsonTransport,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<Value>, SourceError> {
    progress.set_total(1);

    let query = build_query(action, endpoint, options);
    let body = transport.get_json(&endpoint.ajax_url, &query).await?;
    let response: WordPressResponse = serde_json::from_value(body)?;

    if !response.success {
        let message = response.error_message().unwrap_or(UNKNOWN_ERROR).to_string();
        log::warn!("WordPress endpoint rejected the request: {message}");
        return Err(SourceError::Rejected { message });
    }

    progress.inc(1);

    let Some(mut records) = response.into_records() else {
        return Err(SourceError::Rejected {
            message: "WordPress endpoint returned no festival list".to_string(),
        });
    };
    if let Some(limit) = options.limit {
        records.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
    }

    log::info!("Downloaded {} WordPress festivals", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::progress::null_progress;
    use crate::testing::{RecordingTransport, param};

    fn endpoint() -> WordPressEndpoint {
        WordPressEndpoint::new(
            Some("https://example.test/wp-admin/admin-ajax.php".to_string()),
            Some("abc123".to_string()),
        )
        .unwrap()
    }

    #[test]
    fn missing_credentials_are_a_configuration_error() {
        assert!(matches!(
            WordPressEndpoint::new(None, Some("n".to_string())),
            Err(SourceError::Configuration { .. })
        ));
        assert!(matches!(
            WordPressEndpoint::new(Some("https://x.test".to_string()), Some("  ".to_string())),
            Err(SourceError::Configuration { .. })
        ));
    }

    #[test]
    fn query_carries_search_and_non_empty_filters() {
        let options = FetchOptions {
            query: Some("rock".to_string()),
            refine: BTreeMap::from([
                ("region".to_string(), "Bretagne".to_string()),
                ("genre".to_string(), String::new()),
            ]),
            ..FetchOptions::default()
        };

        let query = build_query("get_festivals_data", &endpoint(), &options);
        assert_eq!(param(&query, "action").as_deref(), Some("get_festivals_data"));
        assert_eq!(param(&query, "nonce").as_deref(), Some("abc123"));
        assert_eq!(param(&query, "search").as_deref(), Some("rock"));
        assert_eq!(param(&query, "region").as_deref(), Some("Bretagne"));
        assert_eq!(param(&query, "genre"), None);
    }

    #[tokio::test]
    async fn success_returns_data_from_one_request() {
        let transport = RecordingTransport::new(|_| {
            Ok(json!({"success": true, "data": [{"id": 1}, {"id": 2}]}))
        });

        let records = fetch_wordpress(
            "get_festivals_data",
            &endpoint(),
            &transport,
            &FetchOptions::default(),
            &null_progress(),
        )
        .await
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn failure_envelope_is_rejected_with_server_message() {
        let transport = RecordingTransport::new(|_| {
            Ok(json!({"success": false, "message": "Nonce invalide"}))
        });

        let result = fetch_wordpress(
            "get_festivals_data",
            &endpoint(),
            &transport,
            &FetchOptions::default(),
            &null_progress(),
        )
        .await;

        match result {
            Err(SourceError::Rejected { message }) => assert_eq!(message, "Nonce invalide"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_text_sent_in_data_is_rejected_with_that_text() {
        let transport = RecordingTransport::new(|_| {
            Ok(json!({"success": false, "data": "URL manquante"}))
        });

        let result = fetch_wordpress(
            "get_festivals_data",
            &endpoint(),
            &transport,
            &FetchOptions::default(),
            &null_progress(),
        )
        .await;

        match result {
            Err(SourceError::Rejected { message }) => assert_eq!(message, "URL manquante"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_without_a_list_is_rejected() {
        let transport = RecordingTransport::new(|_| Ok(json!({"success": true, "data": "ok"})));

        let result = fetch_wordpress(
            "get_festivals_data",
            &endpoint(),
            &transport,
            &FetchOptions::default(),
            &null_progress(),
        )
        .await;

        assert!(matches!(result, Err(SourceError::Rejected { .. })));
    }

    #[tokio::test]
    async fn failure_without_message_uses_generic_text() {
        let transport = RecordingTransport::new(|_| Ok(json!({"success": false})));

        let result = fetch_wordpress(
            "get_festivals_data",
            &endpoint(),
            &transport,
            &FetchOptions::default(),
            &null_progress(),
        )
        .await;

        assert!(matches!(
            result,
            Err(SourceError::Rejected { message }) if message == UNKNOWN_ERROR
        ));
    }
}
