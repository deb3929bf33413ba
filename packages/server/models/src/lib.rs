#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the festival map server.
//!
//! These types are serialized to JSON for the REST API. They carry the
//! display fallbacks of the list and detail panels so that every client
//! renders missing values the same way.

use festival_map_catalog::CatalogStatus;
use festival_map_festival_models::{FestivalId, FestivalRecord, FilterCriteria, Period};
use festival_map_geography_models::MapDefaults;
use festival_map_map::MapView;
use serde::{Deserialize, Serialize};

/// Fallback for a missing commune or department.
pub const NOT_SPECIFIED: &str = "Non spécifié";

/// Fallback for a missing period or region.
pub const NOT_SPECIFIED_FEMININE: &str = "Non spécifiée";

/// Smallest accepted `max_festivals` embed option.
pub const MIN_MAX_FESTIVALS: u64 = 100;

/// Largest accepted `max_festivals` embed option.
pub const MAX_MAX_FESTIVALS: u64 = 10_000;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// A festival as shown in the results list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFestivalCard {
    /// Festival id.
    pub id: FestivalId,
    /// Name, or the unnamed fallback.
    pub name: String,
    /// Commune, or [`NOT_SPECIFIED`].
    pub commune: String,
    /// Department, or [`NOT_SPECIFIED`].
    pub department: String,
    /// Period label, or [`NOT_SPECIFIED_FEMININE`].
    pub period: String,
}

impl From<&FestivalRecord> for ApiFestivalCard {
    fn from(record: &FestivalRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.display_name().to_string(),
            commune: or_fallback(record.commune.as_deref(), NOT_SPECIFIED),
            department: or_fallback(record.department.as_deref(), NOT_SPECIFIED),
            period: period_label(record.period),
        }
    }
}

/// Results list: the matching festivals and how many there are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFestivalList {
    /// Number of matching festivals.
    pub count: usize,
    /// Matching festivals, in load order.
    pub festivals: Vec<ApiFestivalCard>,
}

impl<'a> FromIterator<&'a FestivalRecord> for ApiFestivalList {
    fn from_iter<I: IntoIterator<Item = &'a FestivalRecord>>(iter: I) -> Self {
        let festivals: Vec<ApiFestivalCard> = iter.into_iter().map(ApiFestivalCard::from).collect();
        Self {
            count: festivals.len(),
            festivals,
        }
    }
}

/// A website link: where it points and what to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiLink {
    /// Normalized target URL.
    pub href: String,
    /// Original text from the source.
    pub text: String,
}

impl ApiLink {
    /// Builds a link, prefixing `https://` when the text does not start
    /// with `http`.
    #[must_use]
    pub fn website(text: &str) -> Self {
        let href = if text.starts_with("http") {
            text.to_string()
        } else {
            format!("https://{text}")
        };
        Self {
            href,
            text: text.to_string(),
        }
    }
}

/// A festival as shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFestivalDetail {
    /// Card fields.
    #[serde(flatten)]
    pub card: ApiFestivalCard,
    /// Region, or [`NOT_SPECIFIED_FEMININE`].
    pub region: String,
    /// Creation year, if known.
    pub creation_year: Option<String>,
    /// Genre, if known.
    pub genre: Option<String>,
    /// Website link, if known.
    pub website: Option<ApiLink>,
    /// Contact email, if known.
    pub email: Option<String>,
    /// Postal address, if known.
    pub address: Option<String>,
}

impl From<&FestivalRecord> for ApiFestivalDetail {
    fn from(record: &FestivalRecord) -> Self {
        Self {
            card: ApiFestivalCard::from(record),
            region: or_fallback(record.region.as_deref(), NOT_SPECIFIED_FEMININE),
            creation_year: record.details.creation_year.clone(),
            genre: record.genre.clone(),
            website: record.details.website.as_deref().map(ApiLink::website),
            email: record.details.email.clone(),
            address: record.details.address.clone(),
        }
    }
}

fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    value.filter(|v| !v.is_empty()).unwrap_or(fallback).to_string()
}

fn period_label(period: Option<Period>) -> String {
    period.map_or_else(|| NOT_SPECIFIED_FEMININE.to_string(), |p| p.to_string())
}

/// The requested period is not one of the known labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown period: {0}")]
pub struct UnknownPeriod(pub String);

/// Filter query parameters shared by the list and map endpoints.
///
/// Names follow the filter controls: `q` for free text and `departement`
/// for the department.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FestivalQueryParams {
    /// Free-text search.
    pub q: Option<String>,
    /// Exact region.
    pub region: Option<String>,
    /// Exact department.
    pub departement: Option<String>,
    /// Genre substring.
    pub genre: Option<String>,
    /// Exact period label.
    pub period: Option<String>,
}

impl FestivalQueryParams {
    /// Converts the parameters into normalized filter criteria.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownPeriod`] if `period` is non-empty and not a known
    /// label.
    pub fn criteria(&self) -> Result<FilterCriteria, UnknownPeriod> {
        let period = match self.period.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(label) => {
                Some(Period::from_label(label).ok_or_else(|| UnknownPeriod(label.to_string()))?)
            }
        };

        Ok(FilterCriteria {
            text: self.q.clone(),
            region: self.region.clone(),
            department: self.departement.clone(),
            genre: self.genre.clone(),
            period,
        }
        .normalized())
    }
}

/// Query parameters for the map endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapQueryParams {
    /// Filter parameters.
    #[serde(flatten)]
    pub filter: FestivalQueryParams,
    /// `geojson` for a `FeatureCollection`; anything else for the default
    /// view.
    pub format: Option<String>,
}

impl MapQueryParams {
    /// Returns `true` if a `GeoJSON` `FeatureCollection` was requested.
    #[must_use]
    pub fn wants_geojson(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("geojson"))
    }
}

/// Markers and viewport, together with the map defaults.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMapView {
    /// Markers, viewport, and drop count.
    #[serde(flatten)]
    pub view: MapView,
    /// Centre, zoom limits, tile layer, and cluster options.
    pub defaults: MapDefaults,
}

/// Options of an embedded map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedOptions {
    /// CSS height of the map.
    pub height: String,
    /// CSS width of the map.
    pub width: String,
    /// Whether the filter controls are shown.
    pub show_filters: bool,
    /// Whether the results list is shown.
    pub show_list: bool,
    /// Maximum festivals loaded.
    pub max_festivals: u64,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            height: "500px".to_string(),
            width: "100%".to_string(),
            show_filters: true,
            show_list: true,
            max_festivals: 8000,
        }
    }
}

impl EmbedOptions {
    /// Sets `max_festivals`, clamped to
    /// [`MIN_MAX_FESTIVALS`]..=[`MAX_MAX_FESTIVALS`].
    #[must_use]
    pub fn with_max_festivals(mut self, max: u64) -> Self {
        self.max_festivals = max.clamp(MIN_MAX_FESTIVALS, MAX_MAX_FESTIVALS);
        self
    }
}

/// Server status.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    /// Id of the configured source.
    pub source: String,
    /// Catalog counters.
    #[serde(flatten)]
    pub catalog: CatalogStatus,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// User-facing message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use festival_map_festival_models::DetailFields;

    use super::*;

    #[test]
    fn card_applies_fallbacks() {
        let card = ApiFestivalCard::from(&FestivalRecord::new("x"));
        assert_eq!(card.name, "Festival sans nom");
        assert_eq!(card.commune, "Non spécifié");
        assert_eq!(card.department, "Non spécifié");
        assert_eq!(card.period, "Non spécifiée");
    }

    #[test]
    fn card_shows_period_label() {
        let mut record = FestivalRecord::new("x");
        record.period = Some(Period::PreSeason);
        assert_eq!(
            ApiFestivalCard::from(&record).period,
            "Avant-saison (1er janvier - 20 juin)"
        );
    }

    #[test]
    fn website_gets_https_prefix_but_keeps_text() {
        let link = ApiLink::website("www.example.fr");
        assert_eq!(link.href, "https://www.example.fr");
        assert_eq!(link.text, "www.example.fr");

        let link = ApiLink::website("http://example.fr");
        assert_eq!(link.href, "http://example.fr");
    }

    #[test]
    fn detail_carries_extras() {
        let record = FestivalRecord {
            details: DetailFields {
                website: Some("festival.fr".to_string()),
                email: Some("contact@festival.fr".to_string()),
                creation_year: Some("1996".to_string()),
                address: None,
            },
            ..FestivalRecord::new(7_i64)
        };

        let detail = ApiFestivalDetail::from(&record);
        assert_eq!(detail.region, "Non spécifiée");
        assert_eq!(detail.creation_year.as_deref(), Some("1996"));
        assert_eq!(
            detail.website.map(|w| w.href).as_deref(),
            Some("https://festival.fr")
        );

        let json = serde_json::to_value(ApiFestivalDetail::from(&record)).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["creationYear"], "1996");
    }

    #[test]
    fn params_become_normalized_criteria() {
        let params = FestivalQueryParams {
            q: Some(" Rock ".to_string()),
            departement: Some("Gironde".to_string()),
            region: Some(String::new()),
            period: Some("Saison (21 juin - 5 septembre)".to_string()),
            ..FestivalQueryParams::default()
        };

        let criteria = params.criteria().unwrap();
        assert_eq!(criteria.text.as_deref(), Some("Rock"));
        assert_eq!(criteria.department.as_deref(), Some("Gironde"));
        assert_eq!(criteria.region, None);
        assert_eq!(criteria.period, Some(Period::Season));
    }

    #[test]
    fn unknown_period_is_rejected() {
        let params = FestivalQueryParams {
            period: Some("Hiver".to_string()),
            ..FestivalQueryParams::default()
        };
        assert_eq!(params.criteria(), Err(UnknownPeriod("Hiver".to_string())));
    }

    #[test]
    fn max_festivals_is_clamped() {
        assert_eq!(EmbedOptions::default().with_max_festivals(5).max_festivals, 100);
        assert_eq!(
            EmbedOptions::default().with_max_festivals(50_000).max_festivals,
            10_000
        );
        assert_eq!(EmbedOptions::default().with_max_festivals(2500).max_festivals, 2500);
    }
}
