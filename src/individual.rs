//! Individual representation for the genetic algorithm population.

use crate::problem::{Distance, Instance};
use serde::Serialize;
use std::cmp::Ordering;

/// A tour together with its cached length.
///
/// Fields are private so the cost can never go stale: every individual is
/// built by a constructor that evaluates its tour. Serialisation is one-way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Individual {
    tour: Vec<usize>,
    cost: Distance,
}

impl Individual {
    /// Create an individual, evaluating the tour on `instance`.
    pub fn new(tour: Vec<usize>, instance: &Instance) -> Self {
        let cost = instance.tour_length(&tour);
        Individual { tour, cost }
    }

    /// Build from a tour whose cost was just recomputed by the caller.
    pub(crate) fn from_evaluated(tour: Vec<usize>, cost: Distance) -> Self {
        Individual { tour, cost }
    }

    pub fn tour(&self) -> &[usize] {
        &self.tour
    }

    pub fn cost(&self) -> Distance {
        self.cost
    }

    pub fn into_tour(self) -> Vec<usize> {
        self.tour
    }

    /// Number of undirected edges shared with another individual.
    pub fn common_edges(&self, other: &Individual) -> usize {
        let n = self.tour.len();
        if n < 2 || other.tour.len() != n {
            return 0;
        }

        let mut succ = vec![usize::MAX; n];
        let mut pred = vec![usize::MAX; n];
        for k in 0..n {
            let a = other.tour[k];
            let b = other.tour[(k + 1) % n];
            succ[a] = b;
            pred[b] = a;
        }

        (0..n)
            .filter(|&k| {
                let a = self.tour[k];
                let b = self.tour[(k + 1) % n];
                succ[a] == b || pred[a] == b
            })
            .count()
    }
}

impl PartialOrd for Individual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Individual {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower cost sorts first; the tour breaks ties so Ord agrees with Eq.
        self.cost
            .cmp(&other.cost)
            .then_with(|| self.tour.cmp(&other.tour))
    }
}
