//! Coordinate conversion module
//!
//! Discretizes geographic coordinates (latitude/longitude) into slippy-map
//! tile coordinates. A tile is the unit of "place" for the whole registry.

mod types;

pub use types::{CoordError, TileCoord, MAX_ABS_LAT, MAX_LON, MAX_ZOOM, MIN_LON, MIN_ZOOM};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// `x = floor(n * (lon + 180) / 360)` and
/// `y = floor(n * (1 - ln(tan(lat) + sec(lat)) / PI) / 2)` with `n = 2^zoom`.
/// Results are clamped onto the grid, so `lon = 180` and latitudes past the
/// Mercator limit land on the edge tiles instead of falling off the map.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees, strictly between -90 and 90
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (1 to 21)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !lat.is_finite() || lat.abs() >= MAX_ABS_LAT {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let n = 2.0_f64.powi(zoom as i32);
    let max_index = n - 1.0;

    let x = (n * ((lon + 180.0) / 360.0)).floor();

    // ln(tan + sec) == asinh(tan)
    let lat_rad = lat * PI / 180.0;
    let y = (n * (1.0 - lat_rad.tan().asinh() / PI) / 2.0).floor();

    Ok(TileCoord {
        x: x.clamp(0.0, max_index) as u32,
        y: y.clamp(0.0, max_index) as u32,
        zoom,
    })
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's center.
#[inline]
pub fn tile_to_lat_lon_center(tile: &TileCoord) -> (f64, f64) {
    let n = 2.0_f64.powi(tile.zoom as i32);

    let lon = (tile.x as f64 + 0.5) / n * 360.0 - 180.0;

    let y = (tile.y as f64 + 0.5) / n;
    let lat_rad = (PI * (1.0 - 2.0 * y)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let result = to_tile_coords(40.7128, -74.0060, 16);
        assert!(result.is_ok(), "Valid coordinates should not error");

        let tile = result.unwrap();
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_beijing_geolife_fix_at_zoom_16() {
        let tile = to_tile_coords(39.984702, 116.318417, 16).unwrap();
        assert_eq!(tile, TileCoord::new(53943, 24814, 16));
    }

    #[test]
    fn test_london_at_zoom_10() {
        let tile = to_tile_coords(51.5074, -0.1278, 10).unwrap();
        assert_eq!(tile.x, 511);
        assert_eq!(tile.y, 340);
    }

    #[test]
    fn test_equator_prime_meridian() {
        // At zoom 1: 2×2 tiles, (0,0) sits on the shared corner of the south-east tile
        let tile = to_tile_coords(0.0, 0.0, 1).unwrap();
        assert_eq!(tile.x, 1);
        assert_eq!(tile.y, 1);
    }

    #[test]
    fn test_antimeridian_clamps_to_last_column() {
        let tile = to_tile_coords(10.0, 180.0, 4).unwrap();
        assert_eq!(tile.x, 15);
    }

    #[test]
    fn test_high_latitude_clamps_to_first_row() {
        let tile = to_tile_coords(89.5, 0.0, 8).unwrap();
        assert_eq!(tile.y, 0);
        let tile = to_tile_coords(-89.5, 0.0, 8).unwrap();
        assert_eq!(tile.y, 255);
    }

    #[test]
    fn test_invalid_latitude() {
        for lat in [90.0, -90.0, 123.0, f64::NAN] {
            let result = to_tile_coords(lat, 0.0, 10);
            assert!(matches!(result, Err(CoordError::InvalidLatitude(_))));
        }
    }

    #[test]
    fn test_invalid_longitude() {
        let result = to_tile_coords(0.0, -180.5, 10);
        assert!(matches!(result, Err(CoordError::InvalidLongitude(_))));
    }

    #[test]
    fn test_invalid_zoom() {
        assert!(matches!(
            to_tile_coords(0.0, 0.0, 0),
            Err(CoordError::InvalidZoom(0))
        ));
        assert!(matches!(
            to_tile_coords(0.0, 0.0, 22),
            Err(CoordError::InvalidZoom(22))
        ));
    }

    #[test]
    fn test_center_roundtrip_at_different_zooms() {
        let lat = 51.5074; // London
        let lon = -0.1278;

        for zoom in [1, 5, 10, 16, 21] {
            let tile = to_tile_coords(lat, lon, zoom).unwrap();
            let (center_lat, center_lon) = tile_to_lat_lon_center(&tile);
            let again = to_tile_coords(center_lat, center_lon, zoom).unwrap();
            assert_eq!(again, tile, "zoom {} center must project into its own tile", zoom);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(TileCoord::new(3, 7, 16).to_string(), "3/7@ZL16");
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_projection_is_deterministic(
                lat in -89.9..89.9_f64,
                lon in -180.0..=180.0_f64,
                zoom in 1u8..=21
            ) {
                let first = to_tile_coords(lat, lon, zoom)?;
                let second = to_tile_coords(lat, lon, zoom)?;
                prop_assert_eq!(first, second);
            }

            #[test]
            fn test_tile_coords_in_bounds(
                lat in -89.9..89.9_f64,
                lon in -180.0..=180.0_f64,
                zoom in 1u8..=21
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let max_tile = tile.tiles_per_axis();
                prop_assert!(tile.x < max_tile, "x {} >= {} at zoom {}", tile.x, max_tile, zoom);
                prop_assert!(tile.y < max_tile, "y {} >= {} at zoom {}", tile.y, max_tile, zoom);
                prop_assert_eq!(tile.zoom, zoom);
            }

            #[test]
            fn test_longitude_monotonic(
                lat in 0.0..1.0_f64,
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                zoom in 10u8..=15
            ) {
                let tile1 = to_tile_coords(lat, lon1, zoom)?;
                let tile2 = to_tile_coords(lat, lon2, zoom)?;
                prop_assert!(tile1.x < tile2.x);
            }

            #[test]
            fn test_latitude_monotonic(
                lat1 in 10.0..40.0_f64,
                lat2 in 45.0..80.0_f64,
                zoom in 8u8..=16
            ) {
                // Further north means a smaller row index
                let south = to_tile_coords(lat1, 0.0, zoom)?;
                let north = to_tile_coords(lat2, 0.0, zoom)?;
                prop_assert!(north.y < south.y);
            }
        }
    }
}
