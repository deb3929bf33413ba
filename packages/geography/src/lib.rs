#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate resolution and viewport fitting for festival records.
//!
//! [`resolve`] turns the heterogeneous coordinate shapes collected during
//! normalization into one canonical, region-validated
//! [`Coordinate`](festival_map_geography_models::Coordinate).
//! [`viewport`] decides where the map looks once markers are placed.

pub mod resolve;
pub mod viewport;

pub use resolve::{CoordinateShape, resolve, resolve_record, try_resolve, try_resolve_within};

use thiserror::Error;

/// Why a record's coordinate could not be resolved.
///
/// These never abort a load: the record is dropped from the map and kept
/// everywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// The record carries no coordinate shape at all.
    #[error("no coordinates")]
    Missing,

    /// Every shape present was structurally invalid.
    #[error("malformed coordinates ({shape})")]
    Malformed {
        /// First shape that was present but unusable.
        shape: CoordinateShape,
    },

    /// The first usable shape points outside the map region.
    #[error("coordinates ({lat}, {lng}) from {shape} are outside the region")]
    OutOfRegion {
        /// Shape the pair was read from.
        shape: CoordinateShape,
        /// Latitude read.
        lat: f64,
        /// Longitude read.
        lng: f64,
    },
}
