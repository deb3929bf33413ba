//! Config-driven festival source definition.
//!
//! [`SourceDefinition`] captures everything unique about an upstream in a
//! serializable config struct: how to fetch raw records and where each
//! canonical field lives inside them. [`DefinedSource`] pairs a definition
//! with a transport and is the only [`FestivalSource`] implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use festival_map_festival_models::{
    CoordinateCandidates, DetailFields, FestivalId, FestivalRecord, Period, RawLatLng,
};
use festival_map_source_models::SourceType;
use serde::Deserialize;
use serde_json::Value;

use crate::open_data::{OpenDataConfig, fetch_open_data};
use crate::parsing::{as_lenient_f64, as_number_array, first_text, get_path};
use crate::progress::{ProgressCallback, null_progress};
use crate::transport::JsonTransport;
use crate::wordpress::{WordPressEndpoint, fetch_wordpress};
use crate::{FestivalSource, FetchOptions, SourceError};

// ── Top-level source definition ──────────────────────────────────────────

/// A complete, config-driven festival source definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g. `"culture_gouv"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Optional URL of the human-readable portal page.
    #[serde(default)]
    pub portal_url: Option<String>,
    /// How to fetch raw records.
    pub fetcher: FetcherConfig,
    /// Where each canonical field lives in a raw record.
    pub fields: FieldMapping,
}

// ── Fetcher config ───────────────────────────────────────────────────────

/// How to fetch raw records from the upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetcherConfig {
    /// Paginated open-data records search API.
    OpenData {
        /// Search endpoint URL.
        api_url: String,
        /// Dataset identifier.
        dataset: String,
        /// Refinements applied to every request.
        #[serde(default)]
        refine: BTreeMap<String, String>,
    },
    /// WordPress plugin endpoint. The ajax URL and nonce are supplied at
    /// runtime through [`WordPressEndpoint`].
    #[serde(rename = "wordpress")]
    WordPress {
        /// `action` parameter understood by the plugin.
        action: String,
    },
}

impl FetcherConfig {
    /// The kind of upstream this fetcher talks to.
    #[must_use]
    pub const fn source_type(&self) -> SourceType {
        match self {
            Self::OpenData { .. } => SourceType::OpenData,
            Self::WordPress { .. } => SourceType::WordPress,
        }
    }
}

// ── Field mapping ────────────────────────────────────────────────────────

/// Maps canonical festival fields to dot-paths in a raw record.
///
/// Every field is a list of paths tried in order; the first non-empty
/// value wins.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldMapping {
    /// Identifier paths. Records where none resolve are skipped.
    pub id: Vec<String>,
    /// Festival name.
    #[serde(default)]
    pub name: Vec<String>,
    /// Main commune.
    #[serde(default)]
    pub commune: Vec<String>,
    /// Main department.
    #[serde(default)]
    pub department: Vec<String>,
    /// Main region.
    #[serde(default)]
    pub region: Vec<String>,
    /// Period label.
    #[serde(default)]
    pub period: Vec<String>,
    /// Genre.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Coordinate shapes.
    #[serde(default)]
    pub coordinates: CoordinateMapping,
    /// Detail-only fields.
    #[serde(default)]
    pub details: DetailMapping,
}

/// Where each coordinate shape may be found.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinateMapping {
    /// Paths to `{lat, lng}` objects.
    #[serde(default)]
    pub lat_lng_object: Vec<String>,
    /// Paths to `[lng, lat]` arrays.
    #[serde(default)]
    pub lng_lat_pair: Vec<String>,
    /// Paths to `[lat, lng]` arrays.
    #[serde(default)]
    pub lat_lng_pair: Vec<String>,
}

/// Where each detail field may be found.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailMapping {
    /// Website.
    #[serde(default)]
    pub website: Vec<String>,
    /// Contact email.
    #[serde(default)]
    pub email: Vec<String>,
    /// Creation year.
    #[serde(default)]
    pub creation_year: Vec<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Vec<String>,
}

const LAT_KEYS: &[&str] = &["lat", "latitude"];
const LNG_KEYS: &[&str] = &["lng", "lon", "longitude"];

impl CoordinateMapping {
    fn extract(&self, record: &Value) -> CoordinateCandidates {
        CoordinateCandidates {
            lat_lng_object: self
                .lat_lng_object
                .iter()
                .filter_map(|path| get_path(record, path))
                .find_map(lat_lng_object),
            lng_lat_pair: first_number_array(record, &self.lng_lat_pair),
            lat_lng_pair: first_number_array(record, &self.lat_lng_pair),
        }
    }
}

impl DetailMapping {
    fn extract(&self, record: &Value) -> DetailFields {
        DetailFields {
            website: first_text(record, &self.website),
            email: first_text(record, &self.email),
            creation_year: first_text(record, &self.creation_year),
            address: first_text(record, &self.address),
        }
    }
}

fn lat_lng_object(value: &Value) -> Option<RawLatLng> {
    let object = value.as_object()?;
    let member = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| object.get(*key))
            .and_then(as_lenient_f64)
    };
    Some(RawLatLng {
        lat: member(LAT_KEYS),
        lng: member(LNG_KEYS),
    })
}

fn first_number_array(record: &Value, paths: &[String]) -> Option<Vec<f64>> {
    paths
        .iter()
        .filter_map(|path| get_path(record, path))
        .find_map(as_number_array)
}

/// Tries each path in order and returns the first usable identifier.
///
/// Non-empty strings become [`FestivalId::Text`] and integers become
/// [`FestivalId::Number`].
fn extract_id(record: &Value, paths: &[String]) -> Option<FestivalId> {
    paths.iter().find_map(|path| match get_path(record, path)? {
        Value::String(s) if !s.trim().is_empty() => Some(FestivalId::Text(s.trim().to_string())),
        Value::Number(n) => n.as_i64().map(FestivalId::Number),
        _ => None,
    })
}

impl SourceDefinition {
    /// Returns the unique source identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind of upstream.
    #[must_use]
    pub const fn source_type(&self) -> SourceType {
        self.fetcher.source_type()
    }

    /// Returns `true` if this source needs a [`WordPressEndpoint`].
    #[must_use]
    pub const fn needs_endpoint(&self) -> bool {
        matches!(self.fetcher, FetcherConfig::WordPress { .. })
    }

    /// Normalizes raw records into canonical [`FestivalRecord`]s.
    ///
    /// Records with no resolvable id are skipped. Unknown period labels
    /// normalize to `None`.
    #[must_use]
    pub fn normalize_page(&self, records: &[Value]) -> Vec<FestivalRecord> {
        let fields = &self.fields;
        let mut festivals = Vec::with_capacity(records.len());

        for record in records {
            // ── Id ───────────────────────────────────────────────────
            let Some(id) = extract_id(record, &fields.id) else {
                log::warn!("[{}] Skipping record without an id", self.id);
                continue;
            };

            // ── Period ───────────────────────────────────────────────
            let period = first_text(record, &fields.period).and_then(|label| {
                let period = Period::from_label(&label);
                if period.is_none() {
                    log::debug!("[{}] Unknown period {label:?} for {id}", self.id);
                }
                period
            });

            festivals.push(FestivalRecord {
                name: first_text(record, &fields.name),
                commune: first_text(record, &fields.commune),
                department: first_text(record, &fields.department),
                region: first_text(record, &fields.region),
                period,
                genre: first_text(record, &fields.genre),
                coordinates: fields.coordinates.extract(record),
                details: fields.details.extract(record),
                id,
            });
        }

        festivals
    }
}

/// Parses a [`SourceDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}

// ── Runnable source ──────────────────────────────────────────────────────

/// A [`SourceDefinition`] bound to a transport, ready to fetch.
pub struct DefinedSource {
    definition: SourceDefinition,
    transport: Arc<dyn JsonTransport>,
    endpoint: Option<WordPressEndpoint>,
    progress: Arc<dyn ProgressCallback>,
}

impl DefinedSource {
    /// Binds a definition to a transport.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Configuration`] if the definition talks to
    /// WordPress and no endpoint is given.
    pub fn new(
        definition: SourceDefinition,
        transport: Arc<dyn JsonTransport>,
        endpoint: Option<WordPressEndpoint>,
    ) -> Result<Self, SourceError> {
        if definition.needs_endpoint() && endpoint.is_none() {
            return Err(SourceError::configuration(format!(
                "source {} needs a WordPress ajax URL and nonce",
                definition.id
            )));
        }

        Ok(Self {
            definition,
            transport,
            endpoint,
            progress: null_progress(),
        })
    }

    /// Reports page progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// The underlying definition.
    #[must_use]
    pub const fn definition(&self) -> &SourceDefinition {
        &self.definition
    }
}

#[async_trait]
impl FestivalSource for DefinedSource {
    fn id(&self) -> &str {
        self.definition.id()
    }

    fn name(&self) -> &str {
        self.definition.name()
    }

    async fn fetch_all(&self, options: &FetchOptions) -> Result<Vec<FestivalRecord>, SourceError> {
        let raw = match &self.definition.fetcher {
            FetcherConfig::OpenData {
                api_url,
                dataset,
                refine,
            } => {
                fetch_open_data(
                    &OpenDataConfig {
                        api_url,
                        dataset,
                        refine,
                        label: &self.definition.name,
                    },
                    self.transport.as_ref(),
                    options,
                    &self.progress,
                )
                .await?
            }
            FetcherConfig::WordPress { action } => {
                let endpoint = self.endpoint.as_ref().ok_or_else(|| {
                    SourceError::configuration("WordPress endpoint is not configured")
                })?;
                fetch_wordpress(
                    action,
                    endpoint,
                    self.transport.as_ref(),
                    options,
                    &self.progress,
                )
                .await?
            }
        };

        let festivals = self.definition.normalize_page(&raw);
        log::info!(
            "[{}] Normalized {} of {} records",
            self.definition.id,
            festivals.len(),
            raw.len()
        );
        Ok(festivals)
    }
}
