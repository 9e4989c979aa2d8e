//! Geodesic primitives shared by the loaders, the planner and the
//! coverage accounting: haversine distances and a local equirectangular
//! frame for point-to-polyline measurements in meters.

use geo::{Coord, Point};

/// Mean radius of Earth, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Meters per degree of latitude in the equirectangular projection.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Great-circle distance between two positions in kilometers.
pub fn haversine_km(a: Point<f64>, b: Point<f64>) -> f64 {
    haversine_coord_km(a.0, b.0)
}

/// [`haversine_km`] over raw coordinates (x = lon, y = lat).
pub fn haversine_coord_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let dlat_half = ((b.y - a.y) * 0.5).to_radians().sin();
    let dlon_half = ((b.x - a.x) * 0.5).to_radians().sin();

    let h = dlat_half * dlat_half + lat1.cos() * lat2.cos() * dlon_half * dlon_half;
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Sum of haversine distances over consecutive polyline points, in km.
pub fn polyline_distance_km(path: &[Coord<f64>]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_coord_km(pair[0], pair[1]))
        .sum()
}

/// Perpendicular distance in meters from `p` to the segment `a`-`b`,
/// clamped to the segment endpoints.
///
/// Works in a local equirectangular frame whose origin is the centroid of
/// the three points, so the meters-per-degree-longitude factor is taken
/// at a latitude representative of all of them.
pub fn point_to_segment_meters(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let origin_lat = (p.y + a.y + b.y) / 3.0;
    let origin_lon = (p.x + a.x + b.x) / 3.0;
    let meters_per_lon = origin_lat.to_radians().cos() * METERS_PER_DEGREE_LAT;

    let px = (p.x - origin_lon) * meters_per_lon;
    let py = (p.y - origin_lat) * METERS_PER_DEGREE_LAT;
    let ax = (a.x - origin_lon) * meters_per_lon;
    let ay = (a.y - origin_lat) * METERS_PER_DEGREE_LAT;
    let bx = (b.x - origin_lon) * meters_per_lon;
    let by = (b.y - origin_lat) * METERS_PER_DEGREE_LAT;

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

/// Minimum distance in meters from `p` to a polyline.
///
/// Returns infinity for degenerate paths with fewer than 2 points.
pub fn point_to_path_meters(p: Coord<f64>, path: &[Coord<f64>]) -> f64 {
    if path.len() < 2 {
        return f64::INFINITY;
    }

    let mut best = f64::INFINITY;
    for pair in path.windows(2) {
        let d = point_to_segment_meters(p, pair[0], pair[1]);
        if d < best {
            best = d;
        }
    }
    best
}
