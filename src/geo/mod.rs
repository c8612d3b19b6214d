/// Short-range geometry around an airport
use crate::domain::BoundingBox;

/// Kilometres per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.0;

/// Distance between two coordinates using an equirectangular approximation.
///
/// Longitude is scaled by the cosine of the first latitude, so the result is
/// only trustworthy over a few tens of kilometres.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat_diff = (lat1 - lat2) * KM_PER_DEGREE;
    let lon_diff = (lon1 - lon2) * KM_PER_DEGREE * lat1.to_radians().cos();
    lat_diff.hypot(lon_diff)
}

/// Initial great-circle bearing from point 1 to point 2 in degrees `[0, 360)`.
///
/// Identical points give `atan2(0, 0) = 0`, i.e. due north.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let x = delta_lon.sin() * lat2_rad.cos();
    let y = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();

    let deg = x.atan2(y).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if deg >= 360.0 {
        0.0
    } else {
        deg
    }
}

/// Query box of `radius_km` around a point, using the same degree scale as `distance_km`
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_offset = radius_km / KM_PER_DEGREE;
    let lon_offset = radius_km / (KM_PER_DEGREE * lat.to_radians().cos().abs());
    BoundingBox {
        min_lat: lat - lat_offset,
        min_lon: lon - lon_offset,
        max_lat: lat + lat_offset,
        max_lon: lon + lon_offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAT: (f64, f64) = (29.5337, -98.4698);
    const AEX: (f64, f64) = (31.3274, -92.5498);

    #[test]
    fn test_distance_km_zero_distance() {
        assert_eq!(distance_km(SAT.0, SAT.1, SAT.0, SAT.1), 0.0);
    }

    #[test]
    fn test_distance_km_symmetric() {
        // cos(lat1) scaling differs per direction, but the points are close in latitude
        let a = (29.5337, -98.4698);
        let b = (29.5600, -98.4400);
        let ab = distance_km(a.0, a.1, b.0, b.1);
        let ba = distance_km(b.0, b.1, a.0, a.1);
        assert!((ab - ba).abs() < 1e-2);
    }

    #[test]
    fn test_distance_km_pure_latitude() {
        let d = distance_km(30.0, -98.0, 31.0, -98.0);
        assert!((d - 111.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_km_short_range_known() {
        // 0.045 deg of latitude is ~5 km
        let d = distance_km(SAT.0, SAT.1, SAT.0 + 0.045, SAT.1);
        assert!((d - 4.995).abs() < 1e-6);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        assert!(bearing(30.0, -98.0, 31.0, -98.0).abs() < 1e-9);
        assert!((bearing(30.0, -98.0, 29.0, -98.0) - 180.0).abs() < 1e-9);
        let east = bearing(0.0, 0.0, 0.0, 1.0);
        assert!((east - 90.0).abs() < 1e-9);
        let west = bearing(0.0, 0.0, 0.0, -1.0);
        assert!((west - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_identical_points_is_north() {
        let b = bearing(SAT.0, SAT.1, SAT.0, SAT.1);
        assert!(b.is_finite());
        assert_eq!(b, 0.0);
    }

    #[test]
    fn test_bearing_always_in_range() {
        let points = [SAT, AEX, (-33.9, 151.2), (64.1, -21.9), (0.0, 179.9), (0.0, -179.9)];
        for a in points {
            for b in points {
                let brg = bearing(a.0, a.1, b.0, b.1);
                assert!((0.0..360.0).contains(&brg), "bearing {brg} out of range");
            }
        }
    }

    #[test]
    fn test_bounding_box_matches_radius() {
        let bbox = bounding_box(SAT.0, SAT.1, 5.0);
        let north = distance_km(SAT.0, SAT.1, bbox.max_lat, SAT.1);
        let east = distance_km(SAT.0, SAT.1, SAT.0, bbox.max_lon);
        assert!((north - 5.0).abs() < 1e-9);
        assert!((east - 5.0).abs() < 1e-9);
        assert!(bbox.min_lat < SAT.0 && SAT.0 < bbox.max_lat);
        assert!(bbox.min_lon < SAT.1 && SAT.1 < bbox.max_lon);
    }
}
