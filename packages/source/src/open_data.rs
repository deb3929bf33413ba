//! Open-data records search API fetcher.
//!
//! Issues a one-row probe to learn the total (`nhits`), then requests
//! every page concurrently and flattens the results. The first failed
//! page fails the whole fetch; there is no retry and no partial result.

use std::collections::BTreeMap;
use std::sync::Arc;

use festival_map_source_models::SearchResponse;
use futures::future::try_join_all;
use serde_json::Value;

use crate::progress::ProgressCallback;
use crate::transport::{JsonTransport, Query};
use crate::{FetchOptions, SourceError};

/// Configuration for an open-data fetch.
pub struct OpenDataConfig<'a> {
    /// Search endpoint URL.
    pub api_url: &'a str,
    /// Dataset identifier.
    pub dataset: &'a str,
    /// Refinements always applied (e.g. `discipline_dominante = Musique`).
    pub refine: &'a BTreeMap<String, String>,
    /// Label for log messages.
    pub label: &'a str,
}

/// Builds the query for one request.
///
/// `start` is omitted when zero. Caller refinements with empty values are
/// skipped, as is an empty free-text term.
#[must_use]
pub fn build_query(
    config: &OpenDataConfig<'_>,
    options: &FetchOptions,
    rows: u64,
    start: u64,
) -> Query {
    let mut query = vec![
        ("dataset".to_string(), config.dataset.to_string()),
        ("rows".to_string(), rows.to_string()),
    ];

    if start > 0 {
        query.push(("start".to_string(), start.to_string()));
    }

    for (field, value) in config.refine.iter().chain(options.refine.iter()) {
        if !value.is_empty() {
            query.push((format!("refine.{field}"), value.clone()));
        }
    }

    if let Some(q) = options.query.as_deref().map(str::trim)
        && !q.is_empty()
    {
        query.push(("q".to_string(), q.to_string()));
    }

    query
}

/// Fetches every matching record, up to `options.limit`.
///
/// # Errors
///
/// Returns [`SourceError::Configuration`] for a zero page size, and the
/// first transport or decoding error raised by the probe or any page.
pub async fn fetch_open_data(
    config: &OpenDataConfig<'_>,
    transport: &dyn JsonTransport,
    options: &FetchOptions,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<Value>, SourceError> {
    let page_size = options.page_size;
    if page_size == 0 {
        return Err(SourceError::configuration("page size must be positive"));
    }

    let probe = fetch_page(config, transport, options, 1, 0).await?;
    let total = options
        .limit
        .map_or(probe.nhits, |limit| probe.nhits.min(limit));

    log::info!(
        "[{}] {} matching records, fetching {total}",
        config.label,
        probe.nhits
    );

    if total == 0 {
        progress.set_total(0);
        return Ok(Vec::new());
    }

    let pages = total.div_ceil(page_size);
    progress.set_total(pages);

    let requests = (0..pages).map(|i| {
        let start = i * page_size;
        async move {
            let page = fetch_page(config, transport, options, page_size, start).await?;
            log::debug!(
                "[{}] Page {i} (start={start}): {} records",
                config.label,
                page.records.len()
            );
            progress.inc(1);
            Ok::<_, SourceError>(page.records)
        }
    });

    let mut records: Vec<Value> = try_join_all(requests).await?.into_iter().flatten().collect();
    records.truncate(usize::try_from(total).unwrap_or(usize::MAX));

    log::info!("[{}] Downloaded {} records", config.label, records.len());

    Ok(records)
}

async fn fetch_page(
    config: &OpenDataConfig<'_>,
    transport: &dyn JsonTransport,
    options: &FetchOptions,
    rows: u64,
    start: u64,
) -> Result<SearchResponse, SourceError> {
    let query = build_query(config, options, rows, start);
    let body = transport.get_json(config.api_url, &query).await?;
    Ok(serde_json::from_value(body)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::progress::null_progress;
    use crate::testing::{RecordingTransport, param};

    const URL: &str = "https://example.test/api/records/1.0/search/";

    fn music() -> BTreeMap<String, String> {
        BTreeMap::from([("discipline_dominante".to_string(), "Musique".to_string())])
    }

    fn config(refine: &BTreeMap<String, String>) -> OpenDataConfig<'_> {
        OpenDataConfig {
            api_url: URL,
            dataset: "festivals-global-festivals-_-pl",
            refine,
            label: "test",
        }
    }

    fn options(page_size: u64) -> FetchOptions {
        FetchOptions {
            page_size,
            limit: None,
            ..FetchOptions::default()
        }
    }

    fn page(nhits: u64, ids: &[&str]) -> Value {
        json!({
            "nhits": nhits,
            "records": ids.iter().map(|id| json!({"recordid": id})).collect::<Vec<_>>(),
        })
    }

    #[test]
    fn query_omits_zero_start_and_blank_criteria() {
        let refine = music();
        let mut opts = options(100);
        opts.query = Some("  ".to_string());
        opts.refine
            .insert("region_principale_de_deroulement".to_string(), String::new());

        let query = build_query(&config(&refine), &opts, 100, 0);
        assert_eq!(param(&query, "start"), None);
        assert_eq!(param(&query, "q"), None);
        assert_eq!(
            param(&query, "refine.discipline_dominante").as_deref(),
            Some("Musique")
        );
        assert_eq!(param(&query, "refine.region_principale_de_deroulement"), None);
    }

    #[test]
    fn query_carries_search_term_and_refinements() {
        let refine = music();
        let mut opts = options(50);
        opts.query = Some("jazz".to_string());
        opts.refine.insert(
            "region_principale_de_deroulement".to_string(),
            "Bretagne".to_string(),
        );

        let query = build_query(&config(&refine), &opts, 50, 150);
        assert_eq!(param(&query, "start").as_deref(), Some("150"));
        assert_eq!(param(&query, "rows").as_deref(), Some("50"));
        assert_eq!(param(&query, "q").as_deref(), Some("jazz"));
        assert_eq!(
            param(&query, "refine.region_principale_de_deroulement").as_deref(),
            Some("Bretagne")
        );
    }

    #[tokio::test]
    async fn zero_hits_issues_only_the_probe() {
        let refine = music();
        let transport = RecordingTransport::new(|_| Ok(page(0, &[])));

        let records = fetch_open_data(&config(&refine), &transport, &options(100), &null_progress())
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(param(&transport.requests()[0], "rows").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn fetches_every_page_and_flattens() {
        let refine = music();
        let transport = RecordingTransport::new(|query| {
            let rows = param(query, "rows").unwrap_or_default();
            let start = param(query, "start").unwrap_or_else(|| "0".to_string());
            Ok(match (rows.as_str(), start.as_str()) {
                ("1", _) => page(5, &["probe"]),
                (_, "0") => page(5, &["a", "b"]),
                (_, "2") => page(5, &["c", "d"]),
                _ => page(5, &["e"]),
            })
        });

        let records = fetch_open_data(&config(&refine), &transport, &options(2), &null_progress())
            .await
            .unwrap();

        let mut ids: Vec<&str> = records
            .iter()
            .filter_map(|r| r["recordid"].as_str())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);

        let mut starts: Vec<Option<String>> = transport
            .requests()
            .iter()
            .skip(1)
            .map(|q| param(q, "start"))
            .collect();
        starts.sort();
        assert_eq!(
            starts,
            [None, Some("2".to_string()), Some("4".to_string())]
        );
    }

    #[tokio::test]
    async fn limit_caps_pages_and_records() {
        let refine = music();
        let transport = RecordingTransport::new(|query| {
            Ok(if param(query, "rows").as_deref() == Some("1") {
                page(1000, &["probe"])
            } else {
                page(1000, &["x", "y", "z"])
            })
        });
        let mut opts = options(3);
        opts.limit = Some(5);

        let records = fetch_open_data(&config(&refine), &transport, &opts, &null_progress())
            .await
            .unwrap();

        assert_eq!(records.len(), 5);
        assert_eq!(transport.requests().len(), 1 + 2);
    }

    #[tokio::test]
    async fn failed_page_fails_the_whole_fetch() {
        let refine = music();
        let transport = RecordingTransport::new(|query| {
            match param(query, "start").as_deref() {
                Some("2") => Err(SourceError::transport(URL, "HTTP 500 Internal Server Error")),
                _ => Ok(page(4, &["a", "b"])),
            }
        });

        let result =
            fetch_open_data(&config(&refine), &transport, &options(2), &null_progress()).await;

        assert!(matches!(result, Err(SourceError::Transport { .. })));
    }

    #[tokio::test]
    async fn zero_page_size_is_rejected_before_any_request() {
        let refine = music();
        let transport = RecordingTransport::new(|_| Ok(page(10, &[])));

        let result =
            fetch_open_data(&config(&refine), &transport, &options(0), &null_progress()).await;

        assert!(matches!(result, Err(SourceError::Configuration { .. })));
        assert!(transport.requests().is_empty());
    }
}
