//! Coverage-first tour planner.
//!
//! From a home position and a target distance, greedily assembles one
//! continuous route that maximizes new-street and new-node coverage:
//! dead-end spur sweeps and immediate branch steps interleave with
//! global shortest-path connector moves, all inside a hard distance
//! ceiling. The planner owns its graph and Dijkstra cache for the
//! duration of one request and is deterministic for a given input.

mod candidates;
mod global;
mod score;
mod state;
mod sweeps;

use geo::{Coord, Point};
use log::{debug, info};
use petgraph::graph::NodeIndex;
use rayon::prelude::*;

use crate::algo::{eulerize, hierholzer};
use crate::geometry::point_to_path_meters;
use crate::model::{CityBounds, StreetGraph, StreetSegment};
use crate::routing::{DijkstraCache, TraversalStep};
use crate::{Error, NodeId, NODE_CAPTURE_RADIUS_METERS};

use candidates::select_candidates;
use global::{best_global_move, best_local_extension};
use score::{hard_max_km, max_iterations, soft_stop_km, MIN_TARGET_KM};
use state::TourState;
use sweeps::{sweep_branches, sweep_spurs};

/// A realized route plan.
#[derive(Debug, Clone)]
pub struct SuggestedRoute {
    pub id: String,
    pub name: String,
    /// Continuous route polyline.
    pub points: Vec<Coord<f64>>,
    /// Streets traversed, in first-traversal order.
    pub street_ids: Vec<String>,
    pub street_names: Vec<String>,
    pub distance_km: f64,
    pub strategy: String,
    /// Graph nodes within capture radius of the polyline, in
    /// `available_nodes` order.
    pub node_ids_covered: Vec<NodeId>,
    pub node_points: Vec<Point<f64>>,
    /// Every node of the planning graph.
    pub available_nodes: Vec<NodeId>,
}

/// Plans a coverage route from `home` aiming for `target_km`.
///
/// Returns [`Error::PlanInfeasible`] when no uncompleted street is
/// reachable; the completion state of the input is never touched.
pub fn plan_coverage_route(
    segments: &[StreetSegment],
    home: Point<f64>,
    target_km: f64,
    bounds: Option<&CityBounds>,
) -> Result<SuggestedRoute, Error> {
    let target_km = target_km.max(MIN_TARGET_KM);
    let candidates = select_candidates(segments, home, target_km, bounds);
    if candidates.is_empty() {
        return Err(Error::PlanInfeasible(
            "no candidate streets near home".into(),
        ));
    }
    if candidates.iter().all(|segment| segment.completed) {
        return Err(Error::PlanInfeasible(
            "every nearby street is already completed".into(),
        ));
    }

    let streets = StreetGraph::from_segments(&candidates);
    let Some(start) = streets.nearest_node(home) else {
        return Err(Error::PlanInfeasible("no start node near home".into()));
    };
    info!(
        "planning {} km over {} segments from node {}",
        target_km,
        candidates.len(),
        streets.node(start).id
    );

    let mut cache = DijkstraCache::default();
    let mut state = TourState::new(&streets, start, target_km, hard_max_km(target_km));

    for iteration in 0..max_iterations(target_km) {
        if state.distance_km >= state.hard_max_km {
            break;
        }
        if state.distance_km >= soft_stop_km(target_km) && state.reward_count() > 0 {
            break;
        }

        let mut moved = sweep_spurs(&mut state, 5);
        moved += sweep_branches(&mut state, 6);

        if state.distance_km < state.hard_max_km {
            if let Some(steps) = best_global_move(&state, &mut cache) {
                moved += apply_planned_steps(&mut state, steps);
            } else if let Some(step) = best_local_extension(&state) {
                state.apply_step(&step);
                moved += 1;
            }
        }

        if moved == 0 {
            debug!("no selectable move after iteration {iteration}");
            break;
        }
    }

    if state.steps_applied == 0 {
        return Err(Error::PlanInfeasible(
            "no traversable street from the start node".into(),
        ));
    }

    Ok(finalize(&streets, state, target_km, "efficient-coverage"))
}

/// Walks a planned connector-plus-target step list, re-running the
/// short sweeps after every applied step. A sweep may relocate the
/// current node; the remaining pre-oriented steps are then abandoned
/// and the outer loop re-plans from the new position.
fn apply_planned_steps(state: &mut TourState, steps: Vec<TraversalStep>) -> usize {
    let mut applied = 0;
    for step in steps {
        if step.from != state.current {
            break;
        }
        state.apply_step(&step);
        applied += 1;
        sweep_spurs(state, 3);
        sweep_branches(state, 2);
    }
    applied
}

/// Plans a full-coverage walk by Eulerizing the uncompleted candidate
/// edge set and tracing it with Hierholzer's algorithm. The target only
/// scales candidate selection; the walk length is whatever full
/// coverage costs.
pub fn plan_eulerian_route(
    segments: &[StreetSegment],
    home: Point<f64>,
    target_km: f64,
    bounds: Option<&CityBounds>,
) -> Result<SuggestedRoute, Error> {
    let target_km = target_km.max(MIN_TARGET_KM);
    let candidates = select_candidates(segments, home, target_km, bounds);
    if candidates.iter().all(|segment| segment.completed) {
        return Err(Error::PlanInfeasible(
            "every nearby street is already completed".into(),
        ));
    }

    let streets = StreetGraph::from_segments(&candidates);
    let Some(start) = streets.nearest_node(home) else {
        return Err(Error::PlanInfeasible("no start node near home".into()));
    };

    let selected: Vec<_> = streets
        .graph
        .edge_indices()
        .filter(|&edge| !streets.edge(edge).completed)
        .collect();

    let mut cache = DijkstraCache::default();
    let multiplicity = eulerize(&streets, &selected, &mut cache);
    let steps = hierholzer(&streets, &multiplicity, start);
    if steps.is_empty() {
        return Err(Error::PlanInfeasible(
            "no traversable street from the start node".into(),
        ));
    }

    let mut state = TourState::new(&streets, start, target_km, f64::INFINITY);
    for step in &steps {
        state.apply_step(step);
    }

    Ok(finalize(&streets, state, target_km, "eulerian"))
}

/// Node-coverage accounting over the finished polyline, and assembly of
/// the route value.
fn finalize(
    streets: &StreetGraph,
    state: TourState,
    target_km: f64,
    strategy: &str,
) -> SuggestedRoute {
    let nodes: Vec<NodeIndex> = streets.graph.node_indices().collect();
    let covered: Vec<bool> = nodes
        .par_iter()
        .map(|&idx| {
            point_to_path_meters(streets.node(idx).geometry.0, &state.points)
                <= NODE_CAPTURE_RADIUS_METERS
        })
        .collect();

    let available_nodes: Vec<NodeId> = nodes.iter().map(|&idx| streets.node(idx).id.clone()).collect();
    let mut node_ids_covered = Vec::new();
    let mut node_points = Vec::new();
    for (idx, &is_covered) in nodes.iter().zip(&covered) {
        if is_covered {
            node_ids_covered.push(streets.node(*idx).id.clone());
            node_points.push(streets.node(*idx).geometry);
        }
    }

    info!(
        "route covers {} streets and {}/{} nodes over {:.2} km",
        state.street_ids.len(),
        node_ids_covered.len(),
        available_nodes.len(),
        state.distance_km
    );

    SuggestedRoute {
        id: format!("{strategy}-{:.1}km-{}", target_km, state.street_ids.len()),
        name: format!("Street coverage {:.1} km", state.distance_km),
        points: state.points,
        street_ids: state.street_ids,
        street_names: state.street_names,
        distance_km: state.distance_km,
        strategy: strategy.to_owned(),
        node_ids_covered,
        node_points,
        available_nodes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polyline_distance_km;
    use crate::model::SegmentSource;
    use geo::{line_string, LineString};

    fn segment(id: &str, name: &str, completed: bool, path: LineString<f64>) -> StreetSegment {
        StreetSegment {
            id: id.into(),
            name: name.into(),
            path,
            start_node_id: None,
            end_node_id: None,
            completed,
            source: SegmentSource::Manual,
        }
    }

    #[test]
    fn single_street_is_walked_once() {
        // One ~1 km segment, one-mile target: out only, no walk back.
        let segments = vec![segment(
            "lone",
            "Long Road",
            false,
            line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.008983)],
        )];
        let route =
            plan_coverage_route(&segments, Point::new(0.0, 0.0), 1.609, None).unwrap();

        assert_eq!(route.street_ids, vec!["lone".to_owned()]);
        assert!(
            (0.95..=1.77).contains(&route.distance_km),
            "got {}",
            route.distance_km
        );
        assert!((route.distance_km - polyline_distance_km(&route.points)).abs()
            < route.distance_km * 0.01);
    }

    #[test]
    fn t_intersection_spur_is_swept() {
        let segments = vec![
            segment(
                "trunk",
                "Maple Street",
                false,
                line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.0044967)],
            ),
            segment(
                "spur",
                "Oak Court",
                false,
                line_string![(x: 0.0, y: 0.0044967), (x: 0.0017966, y: 0.0044967)],
            ),
        ];
        let route = plan_coverage_route(&segments, Point::new(0.0, 0.0), 1.5, None).unwrap();

        assert!(route.street_names.contains(&"Maple Street".to_owned()));
        assert!(route.street_names.contains(&"Oak Court".to_owned()));
        assert!(
            (1.3..=2.0).contains(&route.distance_km),
            "got {}",
            route.distance_km
        );
        // All three intersections end up covered.
        assert_eq!(route.node_ids_covered.len(), 3);
        assert_eq!(route.available_nodes.len(), 3);
    }

    #[test]
    fn zero_target_is_clamped_and_terminates() {
        let segments = vec![segment(
            "short",
            "Short Street",
            false,
            line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)],
        )];
        let route = plan_coverage_route(&segments, Point::new(0.0, 0.0), 0.0, None).unwrap();
        assert!(route.distance_km > 0.0);
        assert!(route.distance_km <= hard_max_km(MIN_TARGET_KM));
    }

    #[test]
    fn fully_completed_dataset_is_infeasible() {
        let segments = vec![segment(
            "done",
            "Done Street",
            true,
            line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)],
        )];
        let err = plan_coverage_route(&segments, Point::new(0.0, 0.0), 2.0, None).unwrap_err();
        assert!(matches!(err, Error::PlanInfeasible(_)));
    }

    #[test]
    fn empty_dataset_is_infeasible() {
        let err = plan_coverage_route(&[], Point::new(0.0, 0.0), 2.0, None).unwrap_err();
        assert!(matches!(err, Error::PlanInfeasible(_)));
    }

    #[test]
    fn grid_plan_respects_the_hard_ceiling_and_covers_nodes() {
        // A 4x4 block grid of ~111 m streets.
        let mut segments = Vec::new();
        for row in 0..4 {
            for col in 0..4 {
                let x = 0.001 * f64::from(col);
                let y = 0.001 * f64::from(row);
                if col < 3 {
                    segments.push(segment(
                        &format!("h-{row}-{col}"),
                        &format!("Row {row}"),
                        false,
                        line_string![(x: x, y: y), (x: x + 0.001, y: y)],
                    ));
                }
                if row < 3 {
                    segments.push(segment(
                        &format!("v-{row}-{col}"),
                        &format!("Column {col}"),
                        false,
                        line_string![(x: x, y: y), (x: x, y: y + 0.001)],
                    ));
                }
            }
        }

        let target = 2.0;
        let route = plan_coverage_route(&segments, Point::new(0.0, 0.0), target, None).unwrap();

        assert!(route.distance_km <= hard_max_km(target) + 1e-9);
        assert!(route.distance_km >= 1.0, "got {}", route.distance_km);
        assert!(
            (route.distance_km - polyline_distance_km(&route.points)).abs()
                <= route.distance_km * 0.01
        );

        // Coverage accounting matches the 20 ft rule in both directions.
        let streets = StreetGraph::from_segments(&segments);
        for idx in streets.graph.node_indices() {
            let node = streets.node(idx);
            let within = point_to_path_meters(node.geometry.0, &route.points)
                <= NODE_CAPTURE_RADIUS_METERS;
            assert_eq!(route.node_ids_covered.contains(&node.id), within);
        }
    }

    #[test]
    fn planning_is_deterministic() {
        let segments = vec![
            segment("a", "A Street", false, line_string![(x: 0.0, y: 0.0), (x: 0.002, y: 0.0)]),
            segment("b", "B Street", false, line_string![(x: 0.002, y: 0.0), (x: 0.002, y: 0.002)]),
            segment("c", "C Street", false, line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.002)]),
            segment("d", "D Street", false, line_string![(x: 0.0, y: 0.002), (x: 0.002, y: 0.002)]),
        ];
        let first = plan_coverage_route(&segments, Point::new(0.0, 0.0), 1.0, None).unwrap();
        let second = plan_coverage_route(&segments, Point::new(0.0, 0.0), 1.0, None).unwrap();
        assert_eq!(first.points, second.points);
        assert_eq!(first.street_ids, second.street_ids);
        assert_eq!(first.node_ids_covered, second.node_ids_covered);
    }

    #[test]
    fn eulerian_walk_covers_every_street() {
        let segments = vec![
            segment("a", "A Street", false, line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)]),
            segment("b", "B Street", false, line_string![(x: 0.001, y: 0.0), (x: 0.001, y: 0.001)]),
            segment("c", "C Street", false, line_string![(x: 0.001, y: 0.001), (x: 0.0, y: 0.001)]),
            segment("d", "D Street", false, line_string![(x: 0.0, y: 0.001), (x: 0.0, y: 0.0)]),
            segment("e", "E Court", false, line_string![(x: 0.0, y: 0.0), (x: -0.001, y: 0.0)]),
        ];
        let route = plan_eulerian_route(&segments, Point::new(0.0, 0.0), 2.0, None).unwrap();
        assert_eq!(route.strategy, "eulerian");
        for id in ["a", "b", "c", "d", "e"] {
            assert!(route.street_ids.contains(&id.to_owned()), "missing {id}");
        }
    }
}
