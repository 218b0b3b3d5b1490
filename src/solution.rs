//! Result record returned by the optimizers.

use crate::individual::Individual;
use crate::local_search::{LocalSearchOutcome, LocalSearchTermination};
use crate::problem::{Distance, Instance};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// All configured generations were run.
    Generations,
    /// The stall limit was reached.
    Stalled,
    /// The stop signal or time limit fired.
    Stopped,
    /// A standalone local search found no improving move.
    Converged,
    /// A standalone local search reached its move cap.
    Capped,
}

impl From<LocalSearchTermination> for Termination {
    fn from(termination: LocalSearchTermination) -> Self {
        match termination {
            LocalSearchTermination::Converged => Termination::Converged,
            LocalSearchTermination::Capped => Termination::Capped,
            LocalSearchTermination::Stopped => Termination::Stopped,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Generations => f.write_str("generation limit"),
            Termination::Stalled => f.write_str("stall limit"),
            Termination::Stopped => f.write_str("stopped"),
            Termination::Converged => f.write_str("local optimum"),
            Termination::Capped => f.write_str("move cap"),
        }
    }
}

/// Best tour found by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub tour: Vec<usize>,
    pub cost: Distance,
    /// Generations completed
    pub generations: usize,
    pub termination: Termination,
    pub run_time: Duration,
}

impl Solution {
    /// Build from the best individual of a run.
    pub fn from_individual(
        best: Individual,
        generations: usize,
        termination: Termination,
        run_time: Duration,
    ) -> Self {
        let cost = best.cost();
        Solution {
            tour: best.into_tour(),
            cost,
            generations,
            termination,
            run_time,
        }
    }

    /// Build from a standalone local search run. No generations are counted.
    pub fn from_local_search(outcome: LocalSearchOutcome, run_time: Duration) -> Self {
        Solution {
            tour: outcome.tour,
            cost: outcome.cost,
            generations: 0,
            termination: outcome.termination.into(),
            run_time,
        }
    }

    /// Whether the tour is a permutation of the instance and the cost matches it.
    pub fn is_consistent(&self, instance: &Instance) -> bool {
        instance.validate_tour(&self.tour).is_ok() && instance.tour_length(&self.tour) == self.cost
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.termination {
            Termination::Converged | Termination::Capped => {
                write!(f, "cost {} ({})", self.cost, self.termination)
            }
            _ => write!(
                f,
                "cost {} after {} generations ({})",
                self.cost, self.generations, self.termination
            ),
        }
    }
}
