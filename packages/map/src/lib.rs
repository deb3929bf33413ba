#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map presentation.
//!
//! Turns a festival collection into marker data, popup content, and a
//! viewport for the front-end mapping library. Records whose coordinates
//! do not resolve get no marker but stay in every list.

use festival_map_festival_models::{FestivalId, FestivalRecord, Period};
use festival_map_geography::{resolve_record, try_resolve, viewport};
use festival_map_geography_models::{Coordinate, MapDefaults, Viewport};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, feature::Id};
use serde::Serialize;

/// Popup content for a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Popup {
    /// Festival name, with the unnamed fallback applied.
    pub name: String,
    /// Main commune, if known.
    pub commune: Option<String>,
    /// Main department, if known.
    pub department: Option<String>,
    /// Main period, if known.
    pub period: Option<Period>,
}

impl From<&FestivalRecord> for Popup {
    fn from(record: &FestivalRecord) -> Self {
        Self {
            name: record.display_name().to_string(),
            commune: record.commune.clone(),
            department: record.department.clone(),
            period: record.period,
        }
    }
}

/// One marker on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Festival the marker belongs to.
    pub id: FestivalId,
    /// Resolved position.
    pub coordinate: Coordinate,
    /// Popup content.
    pub popup: Popup,
}

/// Everything the front-end needs to draw the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Markers, in input order.
    pub markers: Vec<Marker>,
    /// Where the map should look.
    pub viewport: Viewport,
    /// Records left off the map for lack of a usable coordinate.
    pub dropped: usize,
}

/// Builds markers and the viewport for `records`.
#[must_use]
pub fn present<'a, I>(records: I, defaults: &MapDefaults) -> MapView
where
    I: IntoIterator<Item = &'a FestivalRecord>,
{
    let mut markers = Vec::new();
    let mut dropped = 0;

    for record in records {
        match try_resolve(&record.coordinates) {
            Ok(coordinate) => markers.push(Marker {
                id: record.id.clone(),
                coordinate,
                popup: Popup::from(record),
            }),
            Err(e) => {
                log::debug!("No marker for {}: {e}", record.id);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::debug!("{} markers placed, {dropped} records left off the map", markers.len());
    }

    let coordinates: Vec<Coordinate> = markers.iter().map(|m| m.coordinate).collect();
    let viewport = viewport::fit(&coordinates, defaults);

    MapView {
        markers,
        viewport,
        dropped,
    }
}

/// Viewport centred on one festival, or the default view if it has no
/// usable coordinate.
#[must_use]
pub fn focus(record: &FestivalRecord, defaults: &MapDefaults) -> Viewport {
    viewport::focus(resolve_record(record), defaults)
}

/// Converts the markers of a view into `GeoJSON` Point features.
#[must_use]
pub fn to_feature_collection(view: &MapView) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: view.markers.iter().map(marker_feature).collect(),
        foreign_members: None,
    }
}

fn marker_feature(marker: &Marker) -> Feature {
    let id = match &marker.id {
        FestivalId::Number(n) => Id::Number((*n).into()),
        FestivalId::Text(s) => Id::String(s.clone()),
    };

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(marker.popup.name.clone()));
    properties.insert("commune".to_string(), optional(marker.popup.commune.as_deref()));
    properties.insert(
        "department".to_string(),
        optional(marker.popup.department.as_deref()),
    );
    properties.insert(
        "period".to_string(),
        optional(marker.popup.period.as_ref().map(AsRef::as_ref)),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            marker.coordinate.lng,
            marker.coordinate.lat,
        ]))),
        id: Some(id),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn optional(value: Option<&str>) -> JsonValue {
    value.map_or(JsonValue::Null, JsonValue::from)
}
