//! City containment rules for normalized segments.
//!
//! A polygon boundary (when Nominatim provides one) takes precedence
//! over the bounding box. Point-in-polygon uses even-odd ray casting
//! with points on a ring edge treated as inside.

use geo::Coord;

use crate::geometry::{point_to_segment_meters, METERS_PER_DEGREE_LAT};
use crate::model::{CityBoundary, CityBounds, StreetSegment};

/// Slack granted to segment endpoints around the polygon, in meters.
const ENDPOINT_SLACK_METERS: f64 = 40.0;

/// Slack granted to interior path points around the polygon, in meters.
const PATH_SLACK_METERS: f64 = 22.0;

/// Minimum share of path points that must fall inside (or within slack).
const PATH_INSIDE_RATIO: f64 = 0.72;

/// Padding applied to the bounding box before containment checks, meters.
const BBOX_PADDING_METERS: f64 = 40.0;

/// Keeps the segments contained in the city: polygon rule when a
/// boundary is present, padded bounding box otherwise.
pub fn retain_within_city(
    segments: Vec<StreetSegment>,
    bounds: &CityBounds,
    boundary: Option<&CityBoundary>,
) -> Vec<StreetSegment> {
    segments
        .into_iter()
        .filter(|segment| match boundary {
            Some(boundary) => segment_within_boundary(segment, boundary),
            None => segment_within_bounds(segment, bounds),
        })
        .collect()
}

/// Polygon containment: both endpoints inside or within 40 m of the
/// boundary, and at least 72% of path points within 22 m of it.
pub fn segment_within_boundary(segment: &StreetSegment, boundary: &CityBoundary) -> bool {
    let Some((start, end)) = segment.endpoints() else {
        return false;
    };
    if !near_boundary(start, boundary, ENDPOINT_SLACK_METERS)
        || !near_boundary(end, boundary, ENDPOINT_SLACK_METERS)
    {
        return false;
    }

    let inside = segment
        .path
        .0
        .iter()
        .filter(|&&c| near_boundary(c, boundary, PATH_SLACK_METERS))
        .count();
    inside as f64 / segment.path.0.len() as f64 >= PATH_INSIDE_RATIO
}

/// Bounding-box containment against the 40 m padded box: both endpoints
/// inside and at least 72% of path points inside.
pub fn segment_within_bounds(segment: &StreetSegment, bounds: &CityBounds) -> bool {
    let Some((start, end)) = segment.endpoints() else {
        return false;
    };
    let padded = padded_bounds(bounds, BBOX_PADDING_METERS);
    if !padded.contains(start) || !padded.contains(end) {
        return false;
    }

    let inside = segment.path.0.iter().filter(|&&c| padded.contains(c)).count();
    inside as f64 / segment.path.0.len() as f64 >= PATH_INSIDE_RATIO
}

/// Expands the box by `meters`, scaling the longitude padding by
/// cos(mid latitude).
pub fn padded_bounds(bounds: &CityBounds, meters: f64) -> CityBounds {
    let lat_pad = meters / METERS_PER_DEGREE_LAT;
    let lon_scale = bounds.mid_lat().to_radians().cos().abs().max(1e-6);
    let lon_pad = meters / (METERS_PER_DEGREE_LAT * lon_scale);
    CityBounds {
        south: bounds.south - lat_pad,
        west: bounds.west - lon_pad,
        north: bounds.north + lat_pad,
        east: bounds.east + lon_pad,
    }
}

fn near_boundary(c: Coord<f64>, boundary: &CityBoundary, slack_meters: f64) -> bool {
    point_in_boundary(c, boundary) || distance_to_boundary_meters(c, boundary) <= slack_meters
}

/// Even-odd containment over every polygon of the boundary; holes are
/// rings like any other, so an odd crossing count lands inside.
pub fn point_in_boundary(c: Coord<f64>, boundary: &CityBoundary) -> bool {
    boundary.0 .0.iter().any(|polygon| {
        let mut crossings = 0usize;
        let mut on_edge = false;
        let mut rings = vec![polygon.exterior()];
        rings.extend(polygon.interiors());

        for ring in rings {
            match ring_crossings(c, &ring.0) {
                RingTest::OnEdge => on_edge = true,
                RingTest::Crossings(n) => crossings += n,
            }
            if on_edge {
                return true;
            }
        }
        crossings % 2 == 1
    })
}

enum RingTest {
    OnEdge,
    Crossings(usize),
}

fn ring_crossings(p: Coord<f64>, ring: &[Coord<f64>]) -> RingTest {
    if ring.len() < 2 {
        return RingTest::Crossings(0);
    }

    let mut crossings = 0usize;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];

        if on_segment(p, a, b) {
            return RingTest::OnEdge;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_at = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_at {
                crossings += 1;
            }
        }
    }
    RingTest::Crossings(crossings)
}

fn on_segment(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > 1e-12 {
        return false;
    }
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Minimum distance from a point to the boundary rings, in meters.
/// Rings are treated as closed by wrapping to their first point.
pub fn distance_to_boundary_meters(c: Coord<f64>, boundary: &CityBoundary) -> f64 {
    let mut best = f64::INFINITY;
    for polygon in &boundary.0 .0 {
        let mut rings = vec![polygon.exterior()];
        rings.extend(polygon.interiors());
        for ring in rings {
            let pts = &ring.0;
            if pts.len() < 2 {
                continue;
            }
            for i in 0..pts.len() {
                let a = pts[i];
                let b = pts[(i + 1) % pts.len()];
                let d = point_to_segment_meters(c, a, b);
                if d < best {
                    best = d;
                }
            }
        }
    }
    best
}
