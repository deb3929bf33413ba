#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Canonical festival record, period taxonomy, and filter criteria types.
//!
//! Every festival backend (open-data search API, WordPress endpoint)
//! produces [`FestivalRecord`]s in this shape after normalization. The
//! rest of the system never looks at source-specific layouts.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Display name used when a record has no name.
pub const UNNAMED_FESTIVAL: &str = "Festival sans nom";

/// Opaque festival identifier.
///
/// The open-data API identifies records with a string `recordid`, the
/// WordPress backend with an integer post id. Both are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FestivalId {
    /// Integer identifier (e.g. a WordPress post id).
    Number(i64),
    /// String identifier (e.g. an open-data `recordid`).
    Text(String),
}

impl FestivalId {
    /// Returns `true` if this id renders to exactly `key`.
    ///
    /// Used for lookups where the id arrives as text (URL path segments,
    /// CLI arguments) and may refer to either variant.
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Self::Text(s) => s == key,
            Self::Number(n) => key.parse::<i64>().is_ok_and(|k| k == *n),
        }
    }
}

impl fmt::Display for FestivalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FestivalId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FestivalId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

/// Main period of the year during which a festival takes place.
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
pub enum Period {
    /// 1 January to 20 June.
    #[serde(rename = "Avant-saison (1er janvier - 20 juin)")]
    #[strum(serialize = "Avant-saison (1er janvier - 20 juin)")]
    PreSeason,
    /// 21 June to 5 September.
    #[serde(rename = "Saison (21 juin - 5 septembre)")]
    #[strum(serialize = "Saison (21 juin - 5 septembre)")]
    Season,
    /// 6 September to 31 December.
    #[serde(rename = "Après-saison (6 septembre - 31 décembre)")]
    #[strum(serialize = "Après-saison (6 septembre - 31 décembre)")]
    PostSeason,
}

impl Period {
    /// All periods in calendar order.
    pub const ALL: &[Self] = &[Self::PreSeason, Self::Season, Self::PostSeason];

    /// Parses a period from its exact label. Surrounding whitespace is
    /// ignored; anything else that does not match a label is `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        label.trim().parse().ok()
    }
}

/// A `{lat, lng}` object as found in a raw record. Members that were
/// missing or not numeric are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLatLng {
    /// Latitude member, if numeric.
    pub lat: Option<f64>,
    /// Longitude member, if numeric.
    pub lng: Option<f64>,
}

/// Coordinate shapes found in a raw record, before resolution.
///
/// Sources disagree on where coordinates live and in which order, so
/// normalization only collects what is there. Picking one and validating
/// it is the coordinate resolver's job.
///
/// Array candidates hold every element of the source array when all of
/// them are numeric, and are empty otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoordinateCandidates {
    /// Explicit `{lat, lng}` object.
    pub lat_lng_object: Option<RawLatLng>,
    /// Array in `[lng, lat]` order (`GeoJSON` geometry).
    pub lng_lat_pair: Option<Vec<f64>>,
    /// Array in `[lat, lng]` order (open-data `coordonnees_geo`).
    pub lat_lng_pair: Option<Vec<f64>>,
}

impl CoordinateCandidates {
    /// Returns `true` if no coordinate shape was found at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lat_lng_object.is_none() && self.lng_lat_pair.is_none() && self.lat_lng_pair.is_none()
    }
}

/// Extra fields carried for the detail panel only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailFields {
    /// Festival website, as provided by the source.
    pub website: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Year the festival was created.
    pub creation_year: Option<String>,
    /// Full postal address.
    pub address: Option<String>,
}

/// A festival normalized to the canonical schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalRecord {
    /// Identifier, unique within a loaded collection.
    pub id: FestivalId,
    /// Festival name.
    pub name: Option<String>,
    /// Main commune.
    pub commune: Option<String>,
    /// Main department.
    pub department: Option<String>,
    /// Main region.
    pub region: Option<String>,
    /// Main period of the year.
    pub period: Option<Period>,
    /// Music genre tag, possibly several values in one delimited string.
    pub genre: Option<String>,
    /// Unresolved coordinate shapes.
    #[serde(default)]
    pub coordinates: CoordinateCandidates,
    /// Detail-only extras.
    #[serde(default)]
    pub details: DetailFields,
}

impl FestivalRecord {
    /// Creates a record with only an id; every other field is empty.
    #[must_use]
    pub fn new(id: impl Into<FestivalId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            commune: None,
            department: None,
            region: None,
            period: None,
            genre: None,
            coordinates: CoordinateCandidates::default(),
            details: DetailFields::default(),
        }
    }

    /// Name to show to users, falling back to [`UNNAMED_FESTIVAL`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(UNNAMED_FESTIVAL)
    }
}

/// User-supplied filter predicates. Every criterion is optional and an
/// absent one matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Free-text term matched against name and commune.
    pub text: Option<String>,
    /// Exact region.
    pub region: Option<String>,
    /// Exact department.
    pub department: Option<String>,
    /// Genre substring.
    pub genre: Option<String>,
    /// Exact period.
    pub period: Option<Period>,
}

impl FilterCriteria {
    /// Drops empty criteria so that `Some("")` behaves like `None`.
    ///
    /// The text term is trimmed first; the other string criteria are kept
    /// verbatim because they are matched exactly.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            text: self
                .text
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            region: self.region.filter(|s| !s.is_empty()),
            department: self.department.filter(|s| !s.is_empty()),
            genre: self.genre.filter(|s| !s.is_empty()),
            period: self.period,
        }
    }

    /// Returns `true` if no criterion is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.region.is_none()
            && self.department.is_none()
            && self.genre.is_none()
            && self.period.is_none()
    }

    /// Sets the free-text criterion.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Sets the region criterion.
    #[must_use]
    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    /// Sets the department criterion.
    #[must_use]
    pub fn with_department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    /// Sets the genre criterion.
    #[must_use]
    pub fn with_genre(mut self, genre: &str) -> Self {
        self.genre = Some(genre.to_string());
        self
    }

    /// Sets the period criterion.
    #[must_use]
    pub const fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }
}
