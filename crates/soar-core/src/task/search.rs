//! Shortest and longest paths through a sequence of candidate layers.
//!
//! Each layer holds the candidate locations for one task point (a single
//! fixed point, or samples of a zone boundary). Legs only connect adjacent
//! layers, so a forward sweep finds the optimum exactly over the samples.

use crate::geo::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    Shortest,
    Longest,
}

impl Objective {
    fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Objective::Shortest => candidate < current,
            Objective::Longest => candidate > current,
        }
    }

    fn worst(self) -> f64 {
        match self {
            Objective::Shortest => f64::INFINITY,
            Objective::Longest => f64::NEG_INFINITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayeredPath {
    pub distance: f64,
    /// One chosen location per layer
    pub points: Vec<GeoPoint>,
}

#[derive(Clone, Copy)]
struct Node {
    cost: f64,
    parent: usize,
}

/// Optimal path visiting one candidate from every layer in order.
///
/// Returns `None` if there are no layers or any layer is empty.
pub fn search_layers(layers: &[Vec<GeoPoint>], objective: Objective) -> Option<LayeredPath> {
    let first = layers.first()?;
    if layers.iter().any(|layer| layer.is_empty()) {
        return None;
    }

    let mut steps: Vec<Vec<Node>> = Vec::with_capacity(layers.len());
    steps.push(
        first
            .iter()
            .map(|_| Node {
                cost: 0.0,
                parent: 0,
            })
            .collect(),
    );

    for pair in layers.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        let previous = steps.last()?;
        let next: Vec<Node> = to
            .iter()
            .map(|target| {
                let mut best = Node {
                    cost: objective.worst(),
                    parent: 0,
                };
                for (idx, (origin, node)) in from.iter().zip(previous).enumerate() {
                    let cost = node.cost + origin.distance(target);
                    if objective.improves(cost, best.cost) {
                        best = Node { cost, parent: idx };
                    }
                }
                best
            })
            .collect();
        steps.push(next);
    }

    let last = steps.last()?;
    let mut end = 0;
    for (idx, node) in last.iter().enumerate() {
        if objective.improves(node.cost, last[end].cost) {
            end = idx;
        }
    }
    let distance = last[end].cost;

    let mut points = Vec::with_capacity(layers.len());
    let mut cursor = end;
    for (layer, step) in layers.iter().zip(&steps).rev() {
        points.push(layer[cursor]);
        cursor = step[cursor].parent;
    }
    points.reverse();

    Some(LayeredPath { distance, points })
}
