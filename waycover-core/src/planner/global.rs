//! Global coverage moves: reach an attractive uncovered edge through a
//! shortest-path connector, scored against the remaining budget. Also
//! the last-resort single-edge local extension.

use hashbrown::HashSet;
use petgraph::graph::EdgeIndex;

use super::score::connector_budget_fit;
use super::state::TourState;
use super::sweeps::branch_candidates;
use crate::routing::{orient_path_edges, reconstruct_edges, DijkstraCache, TraversalStep};

/// Picks the best-scoring global move from the current node and returns
/// its full oriented step list (connector steps, then the target edge).
pub(crate) fn best_global_move(
    state: &TourState,
    cache: &mut DijkstraCache,
) -> Option<Vec<TraversalStep>> {
    let streets = state.streets;
    let tree = cache.tree(streets, state.current);

    let pending: HashSet<EdgeIndex> = branch_candidates(state)
        .into_iter()
        .map(|(edge, _)| edge)
        .collect();

    let mut best: Option<(f64, Vec<EdgeIndex>)> = None;

    for edge_idx in streets.graph.edge_indices() {
        if !state.edge_is_new(edge_idx) {
            continue;
        }

        let (a, b) = streets.edge_endpoints(edge_idx);
        let (dist_a, dist_b) = (tree.distance_km(a), tree.distance_km(b));
        if dist_a.is_infinite() && dist_b.is_infinite() {
            continue;
        }
        let connector_node = if dist_b < dist_a { b } else { a };
        let connector_km = dist_a.min(dist_b);

        let edge_km = streets.edge(edge_idx).distance_km;
        let additional_km = connector_km + edge_km;
        let projected = state.distance_km + additional_km;
        if projected > state.hard_max_km {
            continue;
        }

        let connector = reconstruct_edges(tree, state.current, connector_node);

        // Gains over the whole walk: connector edges crossing new ground
        // count too, each street and node once.
        let mut seen_edges: HashSet<EdgeIndex> = HashSet::new();
        let mut counted_nodes = HashSet::new();
        let mut new_streets = 0usize;
        let mut new_nodes = 0usize;
        let mut cursor = state.current;
        for &connector_edge in &connector {
            if state.edge_is_new(connector_edge) && seen_edges.insert(connector_edge) {
                new_streets += 1;
            }
            cursor = streets.other_endpoint(connector_edge, cursor);
            if state.node_is_new(cursor) && counted_nodes.insert(cursor) {
                new_nodes += 1;
            }
        }
        if seen_edges.insert(edge_idx) {
            new_streets += 1;
        }
        let far = streets.other_endpoint(edge_idx, cursor);
        if state.node_is_new(far) && counted_nodes.insert(far) {
            new_nodes += 1;
        }

        let leaf_bonus = if streets.degree(a) == 1 || streets.degree(b) == 1 {
            1.75
        } else {
            0.0
        };
        let branch_tail_bonus = if streets.degree(a) <= 2 || streets.degree(b) <= 2 {
            0.35
        } else {
            0.0
        };
        let proximity_bonus = (1.35 - connector_km).max(0.0) * 0.7;
        let useful_distance_bonus = (edge_km * 1.35).min(1.5);

        let remaining = state.target_km - state.distance_km;
        let budget_fit = connector_budget_fit(state.target_km, remaining, additional_km);
        let overshoot_penalty = (projected - state.target_km * 1.08).max(0.0) * 1.9;

        let connector_repeat_penalty: f64 = connector
            .iter()
            .map(|&ce| {
                streets.edge(ce).distance_km * f64::from(state.times_traversed(ce)).min(2.4)
            })
            .sum();

        let first_edge = connector.first().copied().unwrap_or(edge_idx);
        let skip_nearby_branch_penalty = if !pending.is_empty()
            && !pending.contains(&first_edge)
            && state.distance_km < state.target_km * 0.95
        {
            (pending.len() as f64 * 1.18).min(3.6)
        } else {
            0.0
        };

        let score = (new_streets as f64 * 3.8
            + new_nodes as f64 * 2.0
            + leaf_bonus
            + branch_tail_bonus
            + proximity_bonus
            + useful_distance_bonus)
            / (additional_km + 0.08)
            + budget_fit * 1.45
            - overshoot_penalty
            - connector_repeat_penalty * 2.1
            - skip_nearby_branch_penalty;

        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            let mut edges = connector;
            edges.push(edge_idx);
            best = Some((score, edges));
        }
    }

    let (_, edges) = best?;
    orient_path_edges(streets, state.current, &edges)
}

/// Single neighbor step taken when no global move exists: favors new
/// rewards and uncovered nodes, shies away from repeats. `None` when
/// nothing scores above zero.
pub(crate) fn best_local_extension(state: &TourState) -> Option<TraversalStep> {
    let mut best: Option<(f64, TraversalStep)> = None;

    for (edge, neighbor) in state.streets.incident_edges(state.current) {
        let edge_km = state.streets.edge(edge).distance_km;
        if state.distance_km + edge_km > state.hard_max_km {
            continue;
        }

        let reward_bonus = if state.edge_is_new(edge) { 2.5 } else { 0.0 };
        let node_bonus = if state.node_is_new(neighbor) { 1.2 } else { 0.0 };
        let repeat_penalty = f64::from(state.times_traversed(edge)).min(3.0) * 1.2;
        let score = reward_bonus + node_bonus - repeat_penalty;
        if score <= 0.0 {
            continue;
        }

        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((
                score,
                TraversalStep {
                    edge,
                    from: state.current,
                    to: neighbor,
                },
            ));
        }
    }
    best.map(|(_, step)| step)
}
