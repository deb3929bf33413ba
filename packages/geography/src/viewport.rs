//! Viewport fitting.

use festival_map_geography_models::{BoundingBox, Coordinate, MapDefaults, Viewport};
use geo::{Distance, Haversine, Point};

/// Largest south-west to north-east distance a fit may span, in meters.
pub const MAX_FIT_DIAGONAL_METERS: f64 = 1_500_000.0;

/// Padding, in pixels, applied around fitted bounds.
pub const FIT_PADDING: u32 = 50;

/// Maximum zoom a fit may reach.
pub const FIT_MAX_ZOOM: u8 = 10;

/// Zoom used when focusing a single festival.
pub const FOCUS_ZOOM: u8 = 13;

/// Picks the viewport that shows every coordinate.
///
/// Falls back to the default view when there is nothing to show, when the
/// bounds leave the map region, or when they span more than
/// [`MAX_FIT_DIAGONAL_METERS`].
#[must_use]
pub fn fit(coordinates: &[Coordinate], defaults: &MapDefaults) -> Viewport {
    let Some(bounds) = BoundingBox::enclosing(coordinates.iter().copied()) else {
        return Viewport::default_for(defaults);
    };

    if !defaults.region.contains_box(&bounds) {
        log::warn!("Marker bounds {bounds:?} leave the map region, using default view");
        return Viewport::default_for(defaults);
    }

    let diagonal = diagonal_meters(&bounds);
    if diagonal > MAX_FIT_DIAGONAL_METERS {
        log::warn!(
            "Marker bounds span {:.0} km, using default view",
            diagonal / 1000.0
        );
        return Viewport::default_for(defaults);
    }

    Viewport::Fit {
        bounds,
        padding: FIT_PADDING,
        max_zoom: FIT_MAX_ZOOM,
    }
}

/// Centres on a single coordinate, or the default view without one.
#[must_use]
pub const fn focus(coordinate: Option<Coordinate>, defaults: &MapDefaults) -> Viewport {
    match coordinate {
        Some(center) => Viewport::Center {
            center,
            zoom: FOCUS_ZOOM,
        },
        None => Viewport::default_for(defaults),
    }
}

/// Great-circle distance between the south-west and north-east corners.
#[must_use]
pub fn diagonal_meters(bounds: &BoundingBox) -> f64 {
    let sw = bounds.south_west();
    let ne = bounds.north_east();
    Haversine.distance(Point::new(sw.lng, sw.lat), Point::new(ne.lng, ne.lat))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARIS: Coordinate = Coordinate::new(48.86, 2.35);
    const MARSEILLE: Coordinate = Coordinate::new(43.30, 5.37);

    #[test]
    fn no_coordinates_gives_default_view() {
        let defaults = MapDefaults::default();
        assert_eq!(fit(&[], &defaults), Viewport::default_for(&defaults));
    }

    #[test]
    fn paris_and_marseille_fit() {
        let viewport = fit(&[PARIS, MARSEILLE], &MapDefaults::default());
        assert_eq!(
            viewport,
            Viewport::Fit {
                bounds: BoundingBox::new(2.35, 43.30, 5.37, 48.86),
                padding: 50,
                max_zoom: 10,
            }
        );
    }

    #[test]
    fn single_coordinate_fits_a_point() {
        assert!(matches!(
            fit(&[PARIS], &MapDefaults::default()),
            Viewport::Fit { .. }
        ));
    }

    #[test]
    fn bounds_outside_region_give_default_view() {
        let defaults = MapDefaults::default();
        let geneva_lake = Coordinate::new(46.4, 6.5);
        let rome = Coordinate::new(41.9, 12.5);
        assert_eq!(
            fit(&[geneva_lake, rome], &defaults),
            Viewport::default_for(&defaults)
        );
    }

    #[test]
    fn overly_wide_bounds_give_default_view() {
        let defaults = MapDefaults::default();
        let far_south_west = Coordinate::new(41.2, -5.3);
        let far_north_east = Coordinate::new(51.4, 9.8);
        let bounds = BoundingBox::enclosing([far_south_west, far_north_east]).unwrap();
        assert!(defaults.region.contains_box(&bounds));
        assert!(diagonal_meters(&bounds) > MAX_FIT_DIAGONAL_METERS);
        assert_eq!(
            fit(&[far_south_west, far_north_east], &defaults),
            Viewport::default_for(&defaults)
        );
    }

    #[test]
    fn paris_marseille_diagonal_is_reasonable() {
        let bounds = BoundingBox::enclosing([PARIS, MARSEILLE]).unwrap();
        let km = diagonal_meters(&bounds) / 1000.0;
        assert!((600.0..750.0).contains(&km), "got {km} km");
    }

    #[test]
    fn focus_uses_fixed_zoom() {
        let defaults = MapDefaults::default();
        assert_eq!(
            focus(Some(PARIS), &defaults),
            Viewport::Center {
                center: PARIS,
                zoom: FOCUS_ZOOM,
            }
        );
        assert_eq!(focus(None, &defaults), Viewport::default_for(&defaults));
    }
}
