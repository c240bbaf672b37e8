//! Directed support multigraph of a residual vector.
//!
//! Each edge with `|r| > tol` contributes `|r|` to the arc between its
//! endpoints, oriented along the edge when `r > 0` and against it when
//! `r < 0`. Contributions between the same ordered node pair share one arc
//! whose magnitude is their sum, but every contribution stays individually
//! addressable so a peeled amount is always charged to a specific edge id.
//!
//! # Peeling Order
//!
//! Within an arc, contributions are consumed in ascending edge id order.
//! The contribution at the front of the queue is the arc's *active*
//! contribution; a cycle step charges only active contributions, and the
//! step's bottleneck is the smallest active amount on the cycle. For arcs
//! fed by a single edge this is the arc magnitude itself.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, VecDeque};

use crate::error::DecomposeError;
use crate::graph::{Orientation, SignedEdge};

/// Part of an arc owed to one original edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contribution {
    pub edge: SignedEdge,
    pub remaining: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupportArc {
    pub magnitude: f64,
    pub contributions: VecDeque<Contribution>,
}

/// Arcs keyed by `(from, to)` node ids; `BTreeMap` order fixes traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportGraph {
    node_count: usize,
    arcs: BTreeMap<(usize, usize), SupportArc>,
    contribution_count: usize,
}

impl SupportGraph {
    /// Build the support of `residual` over `endpoints` (one per edge id).
    #[must_use]
    pub fn from_residual(
        node_count: usize,
        endpoints: &[(usize, usize)],
        residual: &[f64],
        tol: f64,
    ) -> Self {
        let mut arcs: BTreeMap<(usize, usize), SupportArc> = BTreeMap::new();
        let mut contribution_count = 0;

        for (edge, (&(source, target), &value)) in endpoints.iter().zip(residual).enumerate() {
            if value.abs() <= tol {
                continue;
            }
            let (key, orientation) = if value > 0.0 {
                ((source, target), Orientation::Forward)
            } else {
                ((target, source), Orientation::Reverse)
            };

            let arc = arcs.entry(key).or_default();
            arc.magnitude += value.abs();
            arc.contributions.push_back(Contribution {
                edge: SignedEdge::new(edge, orientation),
                remaining: value.abs(),
            });
            contribution_count += 1;
        }

        Self {
            node_count,
            arcs,
            contribution_count,
        }
    }

    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Number of edge contributions at construction time; bounds the
    /// number of peeling steps.
    #[must_use]
    pub const fn contribution_count(&self) -> usize {
        self.contribution_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    #[must_use]
    pub fn arc(&self, from: usize, to: usize) -> Option<&SupportArc> {
        self.arcs.get(&(from, to))
    }

    /// Sum of all arc magnitudes.
    #[must_use]
    pub fn total_magnitude(&self) -> f64 {
        self.arcs.values().map(|arc| arc.magnitude).sum()
    }

    /// Out-neighbors of `node`, ascending.
    #[must_use]
    pub fn successors(&self, node: usize) -> Vec<usize> {
        self.arcs
            .range((node, 0)..=(node, usize::MAX))
            .map(|(&(_, to), _)| to)
            .collect()
    }

    /// Any directed cycle as consecutive `(from, to)` arcs, or `None`.
    ///
    /// Iterative DFS from each unvisited node in ascending id order,
    /// following out-arcs in ascending target order; the first back edge
    /// found closes the reported cycle. No preference for short or cheap
    /// cycles is applied.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<(usize, usize)>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let mut marks = vec![Mark::Unvisited; self.node_count];
        // Each frame: (node, successors, next successor index).
        let mut stack: Vec<(usize, Vec<usize>, usize)> = Vec::new();

        for start in 0..self.node_count {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            marks[start] = Mark::OnStack;
            stack.push((start, self.successors(start), 0));

            while let Some(frame) = stack.last_mut() {
                let current = frame.0;
                if frame.2 >= frame.1.len() {
                    marks[current] = Mark::Done;
                    stack.pop();
                    continue;
                }
                let next = frame.1[frame.2];
                frame.2 += 1;

                match marks[next] {
                    Mark::OnStack => {
                        return Some(close_cycle(&stack, next, current));
                    }
                    Mark::Unvisited => {
                        marks[next] = Mark::OnStack;
                        stack.push((next, self.successors(next), 0));
                    }
                    Mark::Done => {}
                }
            }
        }

        None
    }

    /// Active contribution of each arc on `cycle`, plus the bottleneck.
    ///
    /// # Errors
    ///
    /// Returns [`DecomposeError::InternalInconsistency`] if an arc is absent
    /// or has no live contribution to charge.
    pub fn active_contributions(
        &self,
        cycle: &[(usize, usize)],
    ) -> Result<(Vec<SignedEdge>, f64), DecomposeError> {
        let mut edges = Vec::with_capacity(cycle.len());
        let mut bottleneck = f64::INFINITY;

        for &(from, to) in cycle {
            let active = self
                .arcs
                .get(&(from, to))
                .and_then(|arc| arc.contributions.front())
                .ok_or_else(|| DecomposeError::InternalInconsistency {
                    detail: format!("support arc {from} -> {to} has no contributing edge"),
                })?;
            edges.push(active.edge);
            bottleneck = bottleneck.min(active.remaining);
        }

        Ok((edges, bottleneck))
    }

    /// Subtract `amount` from each arc on `cycle` (charging its active
    /// contribution) and drop whatever falls to `floor` or below.
    pub fn peel(&mut self, cycle: &[(usize, usize)], amount: f64, floor: f64) {
        for key in cycle {
            let Some(arc) = self.arcs.get_mut(key) else {
                continue;
            };
            arc.magnitude -= amount;
            if let Some(front) = arc.contributions.front_mut() {
                front.remaining -= amount;
                if front.remaining <= floor {
                    arc.contributions.pop_front();
                }
            }
            if arc.contributions.is_empty() || arc.magnitude <= floor {
                self.arcs.remove(key);
            }
        }
    }
}

/// Arcs from `entry` along the DFS stack down to `current`, then the back
/// edge `current → entry`.
fn close_cycle(
    stack: &[(usize, Vec<usize>, usize)],
    entry: usize,
    current: usize,
) -> Vec<(usize, usize)> {
    let start = stack
        .iter()
        .position(|frame| frame.0 == entry)
        .unwrap_or(stack.len().saturating_sub(1));

    let mut arcs: Vec<(usize, usize)> = stack[start..]
        .windows(2)
        .map(|pair| (pair[0].0, pair[1].0))
        .collect();
    arcs.push((current, entry));
    arcs
}
