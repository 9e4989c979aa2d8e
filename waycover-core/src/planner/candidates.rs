//! Candidate selection: the subset of the dataset worth grafting into
//! the planning graph for a given home position and target distance.

use geo::Point;
use ordered_float::OrderedFloat;

use crate::geometry::haversine_km;
use crate::loading::boundary::segment_within_bounds;
use crate::model::{CityBounds, StreetSegment};

/// Selects and orders candidate segments around home.
///
/// Segments are ranked by entry distance (the nearer endpoint), kept
/// within a target-scaled radius, and capped; when the radius starves
/// the pool, the nearest segments overall are taken instead so isolated
/// neighborhoods still plan.
pub(crate) fn select_candidates(
    segments: &[StreetSegment],
    home: Point<f64>,
    target_km: f64,
    bounds: Option<&CityBounds>,
) -> Vec<StreetSegment> {
    let mut ranked: Vec<(f64, &StreetSegment)> = segments
        .iter()
        .filter(|segment| match bounds {
            Some(bounds) => segment_within_bounds(segment, bounds),
            None => true,
        })
        .filter_map(|segment| {
            let (start, end) = segment.endpoints()?;
            let entry = haversine_km(home, Point::from(start))
                .min(haversine_km(home, Point::from(end)));
            Some((entry, segment))
        })
        .collect();
    ranked.sort_by_key(|&(entry, _)| OrderedFloat(entry));

    let radius_km = (target_km * 1.45 + 1.3).clamp(2.2, 32.0);
    let keep_cap = (((target_km * 168.0).round() as usize).max(320)).min(4200);

    let within: Vec<&StreetSegment> = ranked
        .iter()
        .take_while(|&&(entry, _)| entry <= radius_km)
        .take(keep_cap)
        .map(|&(_, segment)| segment)
        .collect();

    let min_needed = ((target_km * 22.0).round() as usize).max(120);
    if within.len() >= min_needed {
        return within.into_iter().cloned().collect();
    }

    // Radius fallback: take the nearest segments overall.
    let fallback_cap = ((target_km * 72.0).round() as usize).max(320).min(ranked.len());
    ranked
        .iter()
        .take(fallback_cap)
        .map(|&(_, segment)| segment.clone())
        .collect()
}
