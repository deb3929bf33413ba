#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate, bounding box, and viewport types for the festival map.
//!
//! All coordinates are WGS84 decimal degrees in the canonical
//! `{lat, lng}` shape, whatever order the source used.

use serde::{Deserialize, Serialize};

/// Approximate bounds of continental France.
pub const FRANCE_BOUNDS: BoundingBox = BoundingBox::new(-5.5, 41.0, 10.0, 51.5);

/// Geographic centre of continental France.
pub const FRANCE_CENTER: Coordinate = Coordinate::new(46.227_638, 2.213_749);

/// A canonical `{lat, lng}` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Smallest box containing every coordinate, or `None` for an empty
    /// iterator.
    #[must_use]
    pub fn enclosing<I>(coordinates: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinate>,
    {
        coordinates.into_iter().fold(None, |acc, c| {
            Some(acc.map_or_else(
                || Self::new(c.lng, c.lat, c.lng, c.lat),
                |b: Self| {
                    Self::new(
                        b.west.min(c.lng),
                        b.south.min(c.lat),
                        b.east.max(c.lng),
                        b.north.max(c.lat),
                    )
                },
            ))
        })
    }

    /// Returns `true` if the coordinate lies inside the box (edges
    /// included).
    #[must_use]
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        (self.south..=self.north).contains(&coordinate.lat)
            && (self.west..=self.east).contains(&coordinate.lng)
    }

    /// Returns `true` if `other` lies entirely inside this box.
    #[must_use]
    pub fn contains_box(&self, other: &Self) -> bool {
        self.contains(other.south_west()) && self.contains(other.north_east())
    }

    /// South-west corner.
    #[must_use]
    pub const fn south_west(&self) -> Coordinate {
        Coordinate::new(self.south, self.west)
    }

    /// North-east corner.
    #[must_use]
    pub const fn north_east(&self) -> Coordinate {
        Coordinate::new(self.north, self.east)
    }
}

/// Options passed through to the marker clustering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOptions {
    /// Maximum radius, in pixels, a cluster covers.
    pub max_cluster_radius: u32,
    /// Spread overlapping markers apart at the maximum zoom.
    pub spiderfy_on_max_zoom: bool,
    /// Show the cluster's covered area on hover.
    pub show_coverage_on_hover: bool,
    /// Zoom to a cluster's bounds when it is clicked.
    pub zoom_to_bounds_on_click: bool,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            max_cluster_radius: 50,
            spiderfy_on_max_zoom: true,
            show_coverage_on_hover: true,
            zoom_to_bounds_on_click: true,
        }
    }
}

/// Map defaults handed to the front-end mapping library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDefaults {
    /// Default centre.
    pub center: Coordinate,
    /// Default zoom level.
    pub zoom: u8,
    /// Minimum zoom level.
    pub min_zoom: u8,
    /// Maximum zoom level.
    pub max_zoom: u8,
    /// Region the map is meant to show. Marker bounds outside it reset the
    /// viewport to the default.
    pub region: BoundingBox,
    /// Tile URL template.
    pub tile_layer: String,
    /// Tile attribution HTML.
    pub attribution: String,
    /// Clustering options.
    pub cluster: ClusterOptions,
}

impl Default for MapDefaults {
    fn default() -> Self {
        Self {
            center: FRANCE_CENTER,
            zoom: 6,
            min_zoom: 2,
            max_zoom: 19,
            region: FRANCE_BOUNDS,
            tile_layer: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                .to_string(),
            cluster: ClusterOptions::default(),
        }
    }
}

/// Where the map should look after markers are placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Viewport {
    /// Fit the given bounds.
    #[serde(rename_all = "camelCase")]
    Fit {
        /// Bounds to fit.
        bounds: BoundingBox,
        /// Padding in pixels around the bounds.
        padding: u32,
        /// Maximum zoom the fit may reach.
        max_zoom: u8,
    },
    /// Centre on a point at a fixed zoom.
    Center {
        /// Centre point.
        center: Coordinate,
        /// Zoom level.
        zoom: u8,
    },
}

impl Viewport {
    /// The default view for the given map defaults.
    #[must_use]
    pub const fn default_for(defaults: &MapDefaults) -> Self {
        Self::Center {
            center: defaults.center,
            zoom: defaults.zoom,
        }
    }
}
