//! Local coverage moves: dead-end spur sweeps and immediate branch
//! steps. Both operate on the planner's current node and run
//! interleaved with the global connector moves.

use petgraph::graph::{EdgeIndex, NodeIndex};

use super::score::near_budget_fit;
use super::state::TourState;
use crate::routing::TraversalStep;

/// Longest spur chain followed before giving up on a cul-de-sac.
const MAX_SPUR_CHAIN: usize = 12;

/// Progress share below which a spur may not overshoot the soft stop.
const EARLY_PROGRESS_RATIO: f64 = 0.48;

struct SpurCandidate {
    steps: Vec<TraversalStep>,
    score: f64,
}

/// Executes up to `max_spurs` best-scoring dead-end spurs out-and-back
/// from the current node. Returns the number executed.
pub(crate) fn sweep_spurs(state: &mut TourState, max_spurs: usize) -> usize {
    let mut executed = 0;
    while executed < max_spurs {
        let Some(best) = best_spur(state) else { break };
        for step in &best.steps {
            state.apply_step(step);
        }
        for step in best.steps.iter().rev() {
            state.apply_step(&TraversalStep {
                edge: step.edge,
                from: step.to,
                to: step.from,
            });
        }
        executed += 1;
    }
    executed
}

fn best_spur(state: &TourState) -> Option<SpurCandidate> {
    let mut best: Option<SpurCandidate> = None;

    for (edge, neighbor) in state.streets.incident_edges(state.current) {
        let Some((steps, one_way_km)) = spur_chain(state, edge, neighbor) else {
            continue;
        };

        let round_trip_km = one_way_km * 2.0;
        let projected = state.distance_km + round_trip_km;
        if projected > state.hard_max_km {
            continue;
        }
        // Early in the tour a single out-and-back may not blow the whole
        // budget; past 48% of target only the hard ceiling applies.
        if state.distance_km < state.target_km * EARLY_PROGRESS_RATIO
            && projected > state.target_km * 1.03
        {
            continue;
        }

        let new_streets = steps.len() as f64;
        let new_nodes = steps.iter().filter(|s| state.node_is_new(s.to)).count() as f64;
        let score = (new_streets * 4.6 + new_nodes * 2.5 + (one_way_km * 1.8).min(1.4))
            / (round_trip_km + 0.07)
            + near_budget_fit(state.target_km, projected) * 1.1;

        if best.as_ref().is_none_or(|b| score > b.score) {
            best = Some(SpurCandidate { steps, score });
        }
    }
    best
}

/// Follows the forward chain from the current node through degree-2
/// nodes to a degree-1 cul-de-sac, over uncompleted and unrewarded
/// edges only. Returns the chain steps and the one-way length.
fn spur_chain(
    state: &TourState,
    first_edge: EdgeIndex,
    first_neighbor: NodeIndex,
) -> Option<(Vec<TraversalStep>, f64)> {
    if !state.edge_is_new(first_edge) {
        return None;
    }

    let mut steps = vec![TraversalStep {
        edge: first_edge,
        from: state.current,
        to: first_neighbor,
    }];
    let mut one_way_km = state.streets.edge(first_edge).distance_km;
    let mut cursor = first_neighbor;

    loop {
        let degree = state.streets.degree(cursor);
        if degree == 1 {
            return Some((steps, one_way_km));
        }
        // Chains pass only through plain corridor nodes.
        if degree != 2 || steps.len() >= MAX_SPUR_CHAIN {
            return None;
        }

        let last_edge = steps.last()?.edge;
        let (next_edge, next_node) = state
            .streets
            .incident_edges(cursor)
            .into_iter()
            .find(|&(e, _)| e != last_edge)?;
        if !state.edge_is_new(next_edge) {
            // The chain dead-ends into covered ground, not a cul-de-sac.
            return None;
        }

        steps.push(TraversalStep {
            edge: next_edge,
            from: cursor,
            to: next_node,
        });
        one_way_km += state.streets.edge(next_edge).distance_km;
        cursor = next_node;
    }
}

/// Walks up to `max_steps` single-edge branch moves into degree-<=2
/// neighbors, recursing into a short spur sweep after each step.
/// Returns the number of steps taken.
pub(crate) fn sweep_branches(state: &mut TourState, max_steps: usize) -> usize {
    let mut moved = 0;
    while moved < max_steps {
        let Some(step) = best_branch_step(state) else { break };
        state.apply_step(&step);
        moved += 1;
        sweep_spurs(state, 2);
    }
    moved
}

/// Branch candidates at the current node: untraversed new edges leading
/// into degree-<=2 neighbors, within the hard ceiling.
pub(crate) fn branch_candidates(state: &TourState) -> Vec<(EdgeIndex, NodeIndex)> {
    state
        .streets
        .incident_edges(state.current)
        .into_iter()
        .filter(|&(edge, neighbor)| {
            state.streets.degree(neighbor) <= 2
                && state.edge_is_new(edge)
                && state.times_traversed(edge) == 0
                && state.distance_km + state.streets.edge(edge).distance_km <= state.hard_max_km
        })
        .collect()
}

fn best_branch_step(state: &TourState) -> Option<TraversalStep> {
    let current_degree = state.streets.degree(state.current);
    let mut best: Option<(f64, TraversalStep)> = None;

    for (edge, neighbor) in branch_candidates(state) {
        let edge_km = state.streets.edge(edge).distance_km;
        let projected = state.distance_km + edge_km;

        let culdesac_bonus = if state.streets.degree(neighbor) == 1 {
            4.0
        } else {
            2.25
        };
        let branch_exit_bonus = if current_degree >= 3 { 1.45 } else { 0.35 };
        let short_edge_bonus = (0.95 - edge_km).max(0.0) * 1.25;
        let new_node_bonus = if state.node_is_new(neighbor) { 1.2 } else { 0.0 };
        let score = culdesac_bonus
            + branch_exit_bonus
            + short_edge_bonus
            + new_node_bonus
            + near_budget_fit(state.target_km, projected);

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
