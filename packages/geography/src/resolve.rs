//! Coordinate resolver.
//!
//! Probes the coordinate shapes of a record in a fixed priority order,
//! takes the first structurally valid one, and validates it against the
//! map region. Out-of-region pairs are treated as absent: they never
//! produce a marker and never move the viewport.

use std::fmt;

use festival_map_festival_models::{CoordinateCandidates, FestivalRecord, RawLatLng};
use festival_map_geography_models::{BoundingBox, Coordinate, FRANCE_BOUNDS};

use crate::CoordinateError;

/// The coordinate shapes understood by the resolver, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateShape {
    /// `{lat, lng}` object.
    LatLngObject,
    /// `[lng, lat]` array.
    LngLatPair,
    /// `[lat, lng]` array.
    LatLngPair,
}

impl fmt::Display for CoordinateShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LatLngObject => "{lat, lng} object",
            Self::LngLatPair => "[lng, lat] array",
            Self::LatLngPair => "[lat, lng] array",
        })
    }
}

/// Resolves candidates to a coordinate inside continental France.
#[must_use]
pub fn resolve(candidates: &CoordinateCandidates) -> Option<Coordinate> {
    try_resolve(candidates).ok()
}

/// Resolves a record's coordinate inside continental France.
#[must_use]
pub fn resolve_record(record: &FestivalRecord) -> Option<Coordinate> {
    resolve(&record.coordinates)
}

/// Like [`resolve`], but reports why resolution failed.
///
/// # Errors
///
/// Returns [`CoordinateError`] if no shape is present, none is
/// structurally valid, or the first valid pair is outside France.
pub fn try_resolve(candidates: &CoordinateCandidates) -> Result<Coordinate, CoordinateError> {
    try_resolve_within(candidates, &FRANCE_BOUNDS)
}

/// Resolves candidates against an arbitrary region.
///
/// # Errors
///
/// Returns [`CoordinateError`] if no shape is present, none is
/// structurally valid, or the first valid pair is outside `region`.
pub fn try_resolve_within(
    candidates: &CoordinateCandidates,
    region: &BoundingBox,
) -> Result<Coordinate, CoordinateError> {
    let (shape, coordinate) = first_valid_shape(candidates)?;

    if region.contains(coordinate) {
        Ok(coordinate)
    } else {
        Err(CoordinateError::OutOfRegion {
            shape,
            lat: coordinate.lat,
            lng: coordinate.lng,
        })
    }
}

fn first_valid_shape(
    candidates: &CoordinateCandidates,
) -> Result<(CoordinateShape, Coordinate), CoordinateError> {
    let mut malformed = None;

    if let Some(object) = candidates.lat_lng_object {
        match object_pair(object) {
            Some(c) => return Ok((CoordinateShape::LatLngObject, c)),
            None => malformed = malformed.or(Some(CoordinateShape::LatLngObject)),
        }
    }

    if let Some(pair) = candidates.lng_lat_pair.as_deref() {
        match finite_pair(pair) {
            Some((lng, lat)) => return Ok((CoordinateShape::LngLatPair, Coordinate::new(lat, lng))),
            None => malformed = malformed.or(Some(CoordinateShape::LngLatPair)),
        }
    }

    if let Some(pair) = candidates.lat_lng_pair.as_deref() {
        match finite_pair(pair) {
            Some((lat, lng)) => return Ok((CoordinateShape::LatLngPair, Coordinate::new(lat, lng))),
            None => malformed = malformed.or(Some(CoordinateShape::LatLngPair)),
        }
    }

    Err(malformed.map_or(CoordinateError::Missing, |shape| {
        CoordinateError::Malformed { shape }
    }))
}

fn object_pair(object: RawLatLng) -> Option<Coordinate> {
    let lat = object.lat.filter(|v| v.is_finite())?;
    let lng = object.lng.filter(|v| v.is_finite())?;
    Some(Coordinate::new(lat, lng))
}

fn finite_pair(values: &[f64]) -> Option<(f64, f64)> {
    match *values {
        [a, b] if a.is_finite() && b.is_finite() => Some((a, b)),
        _ => None,
    }
}
