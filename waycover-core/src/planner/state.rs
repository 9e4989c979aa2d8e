//! Mutable tour state threaded through the planner's move selectors.

use geo::Coord;
use hashbrown::{HashMap, HashSet};
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::geometry::haversine_coord_km;
use crate::model::StreetGraph;
use crate::routing::TraversalStep;
use crate::SEAMLESS_JOIN_METERS;

/// Accumulated tour: position, distance, route polyline and the
/// coverage bookkeeping the score functions consult.
pub(crate) struct TourState<'g> {
    pub streets: &'g StreetGraph,
    pub target_km: f64,
    pub hard_max_km: f64,
    pub current: NodeIndex,
    pub distance_km: f64,
    pub points: Vec<Coord<f64>>,
    /// Streets walked, in first-traversal order.
    pub street_ids: Vec<String>,
    pub street_names: Vec<String>,
    street_id_set: HashSet<String>,
    street_name_set: HashSet<String>,
    /// Previously-uncompleted streets walked during this plan; guards
    /// against double-scoring.
    rewarded: HashSet<EdgeIndex>,
    pub covered_nodes: HashSet<NodeIndex>,
    traversed: HashMap<EdgeIndex, u32>,
    pub steps_applied: usize,
}

impl<'g> TourState<'g> {
    pub fn new(
        streets: &'g StreetGraph,
        start: NodeIndex,
        target_km: f64,
        hard_max_km: f64,
    ) -> Self {
        Self {
            streets,
            target_km,
            hard_max_km,
            current: start,
            distance_km: 0.0,
            points: Vec::new(),
            street_ids: Vec::new(),
            street_names: Vec::new(),
            street_id_set: HashSet::new(),
            street_name_set: HashSet::new(),
            rewarded: HashSet::new(),
            covered_nodes: HashSet::new(),
            traversed: HashMap::new(),
            steps_applied: 0,
        }
    }

    pub fn is_rewarded(&self, edge: EdgeIndex) -> bool {
        self.rewarded.contains(&edge)
    }

    pub fn reward_count(&self) -> usize {
        self.rewarded.len()
    }

    /// An edge still worth score: uncompleted and not yet rewarded.
    pub fn edge_is_new(&self, edge: EdgeIndex) -> bool {
        !self.streets.edge(edge).completed && !self.is_rewarded(edge)
    }

    pub fn node_is_new(&self, node: NodeIndex) -> bool {
        !self.covered_nodes.contains(&node)
    }

    pub fn times_traversed(&self, edge: EdgeIndex) -> u32 {
        self.traversed.get(&edge).copied().unwrap_or(0)
    }

    /// Walks one oriented edge: appends its polyline (stitching the join
    /// when the edge starts within 18 m of the current route end),
    /// advances the position and updates every coverage set.
    pub fn apply_step(&mut self, step: &TraversalStep) {
        let coords = self.streets.oriented_edge_coords(step.edge, step.from);
        let mut skip_first = false;
        if let (Some(&tail), Some(&head)) = (self.points.last(), coords.first()) {
            skip_first = haversine_coord_km(tail, head) * 1000.0 <= SEAMLESS_JOIN_METERS;
        }
        self.points
            .extend(coords.into_iter().skip(usize::from(skip_first)));

        let edge = self.streets.edge(step.edge);
        self.distance_km += edge.distance_km;
        self.current = step.to;

        if self.street_id_set.insert(edge.street_id.clone()) {
            self.street_ids.push(edge.street_id.clone());
        }
        if self.street_name_set.insert(edge.street_name.clone()) {
            self.street_names.push(edge.street_name.clone());
        }
        if !edge.completed {
            self.rewarded.insert(step.edge);
        }
        self.covered_nodes.insert(step.from);
        self.covered_nodes.insert(step.to);
        *self.traversed.entry(step.edge).or_insert(0) += 1;
        self.steps_applied += 1;
    }
}
