//! End-to-end planning over a synthetic neighborhood: plan, check the
//! route invariants, serialize and parse back.

use chrono::TimeZone;
use geo::{line_string, Point};
use waycover_core::geometry::{point_to_path_meters, polyline_distance_km};
use waycover_core::prelude::*;

fn neighborhood() -> Vec<StreetSegment> {
    let mut segments = Vec::new();
    let mut push = |id: String, name: String, path: geo::LineString<f64>| {
        segments.push(StreetSegment {
            id,
            name,
            path,
            start_node_id: None,
            end_node_id: None,
            completed: false,
            source: SegmentSource::Manual,
        });
    };

    // A 3x3 grid of ~111 m blocks with one cul-de-sac on the west side.
    for row in 0..3 {
        for col in 0..3 {
            let x = 0.001 * f64::from(col);
            let y = 0.001 * f64::from(row);
            if col < 2 {
                push(
                    format!("h-{row}-{col}"),
                    format!("Row {row} Street"),
                    line_string![(x: x, y: y), (x: x + 0.001, y: y)],
                );
            }
            if row < 2 {
                push(
                    format!("v-{row}-{col}"),
                    format!("Column {col} Avenue"),
                    line_string![(x: x, y: y), (x: x, y: y + 0.001)],
                );
            }
        }
    }
    push(
        "cul".into(),
        "Quiet Court".into(),
        line_string![(x: 0.0, y: 0.001), (x: -0.0008, y: 0.001)],
    );
    segments
}

#[test]
fn planned_route_upholds_its_invariants() {
    let segments = neighborhood();
    let target_km = 1.8;
    let route = plan_coverage_route(&segments, Point::new(0.0, 0.0), target_km, None).unwrap();

    // Hard ceiling and distance bookkeeping.
    let hard_max = (target_km * 1.1 + 0.35).max(1.2);
    assert!(route.distance_km <= hard_max + 1e-9);
    let polyline_km = polyline_distance_km(&route.points);
    assert!((route.distance_km - polyline_km).abs() <= route.distance_km * 0.01);

    // No hop between consecutive points exceeds the longest block.
    for pair in route.points.windows(2) {
        let hop_km = polyline_distance_km(pair);
        assert!(hop_km <= 0.12, "hop of {hop_km} km in the polyline");
    }

    // Node coverage agrees with the 20 ft capture radius, both ways.
    let streets = StreetGraph::from_segments(&segments);
    for idx in streets.graph.node_indices() {
        let node = streets.node(idx);
        let within =
            point_to_path_meters(node.geometry.0, &route.points) <= NODE_CAPTURE_RADIUS_METERS;
        assert_eq!(
            route.node_ids_covered.contains(&node.id),
            within,
            "node {} coverage mismatch",
            node.id
        );
    }
    assert_eq!(route.available_nodes.len(), streets.node_count());
}

#[test]
fn gpx_round_trip_preserves_the_distance() {
    let segments = neighborhood();
    let route = plan_coverage_route(&segments, Point::new(0.0, 0.0), 1.5, None).unwrap();

    let created = chrono::Utc.with_ymd_and_hms(2026, 5, 1, 6, 30, 0).unwrap();
    let gpx = write_gpx(&route, created);
    let reparsed = parse_activity_points("route.gpx", &gpx).unwrap();

    let reparsed_km = polyline_distance_km(
        &reparsed
            .iter()
            .map(|p| geo::Coord { x: p.x(), y: p.y() })
            .collect::<Vec<_>>(),
    );
    assert!(
        (reparsed_km - route.distance_km).abs() <= route.distance_km * 0.001,
        "gpx round trip drifted: {reparsed_km} vs {}",
        route.distance_km
    );
}

#[test]
fn completed_streets_still_carry_the_route_but_earn_nothing() {
    let mut segments = neighborhood();
    // Complete the whole first row; the planner may cross it but must
    // still list only genuinely walked streets.
    for segment in segments.iter_mut() {
        if segment.id.starts_with("h-0") {
            segment.completed = true;
        }
    }
    let route = plan_coverage_route(&segments, Point::new(0.0, 0.0), 1.8, None).unwrap();
    assert!(!route.street_ids.is_empty());
    for id in &route.street_ids {
        assert!(segments.iter().any(|s| &s.id == id));
    }
}
