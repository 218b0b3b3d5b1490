//! Neighborhood local search with delta-evaluated moves.
//!
//! Three neighborhoods are available: 2-opt (segment reversal), exchange
//! (swap two positions) and jump (relocate one node). Each move is evaluated
//! in O(1) from the handful of edges it touches; the tour length is only
//! recomputed in full to resynchronise the running cost.

pub mod relocate;
pub mod swap;
pub mod two_opt;
pub mod utils;

use crate::error::{Error, Result};
use crate::problem::{Distance, Instance};
use crate::stop::StopSignal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use self::relocate::{apply_insert, delta_insert};
pub use self::swap::{apply_exchange, delta_exchange};
pub use self::two_opt::{apply_two_opt, delta_two_opt};
use self::utils::Move;

/// Move type explored by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Neighborhood {
    TwoOpt,
    Exchange,
    Jump,
}

impl fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Neighborhood::TwoOpt => "2opt",
            Neighborhood::Exchange => "exchange",
            Neighborhood::Jump => "jump",
        };
        f.write_str(name)
    }
}

impl FromStr for Neighborhood {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "2opt" | "2-opt" | "two-opt" | "two_opt" => Ok(Neighborhood::TwoOpt),
            "exchange" | "swap" => Ok(Neighborhood::Exchange),
            "jump" | "insert" | "insertion" => Ok(Neighborhood::Jump),
            _ => Err(Error::invalid_parameter(format!(
                "unknown neighborhood '{s}'"
            ))),
        }
    }
}

/// Which improving move to accept in a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Apply the first improving move in scan order.
    First,
    /// Apply the most improving move of the full scan.
    Best,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::First => f.write_str("first"),
            Strategy::Best => f.write_str("best"),
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first" => Ok(Strategy::First),
            "best" => Ok(Strategy::Best),
            _ => Err(Error::invalid_parameter(format!("unknown strategy '{s}'"))),
        }
    }
}

/// Why a local search run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocalSearchTermination {
    /// A full scan found no improving move.
    Converged,
    /// The accepted-move cap was reached.
    Capped,
    /// The stop signal fired.
    Stopped,
}

/// Result of a local search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSearchOutcome {
    pub tour: Vec<usize>,
    pub cost: Distance,
    /// Number of accepted moves
    pub improves: usize,
    pub termination: LocalSearchTermination,
}

impl LocalSearchOutcome {
    pub fn is_converged(&self) -> bool {
        self.termination == LocalSearchTermination::Converged
    }

    pub fn is_capped(&self) -> bool {
        self.termination == LocalSearchTermination::Capped
    }
}

/// Configured local search over one neighborhood.
#[derive(Debug, Clone)]
pub struct LocalSearch {
    pub neighborhood: Neighborhood,
    pub strategy: Strategy,
    /// Hard cap on accepted moves per run
    pub max_improves: Option<usize>,
    /// 2-opt only: bound on how far past `i` the second cut point may lie
    pub window: Option<usize>,
    /// Recompute the tour length from scratch every this many accepted moves
    pub resync_interval: usize,
    stop: StopSignal,
}

impl LocalSearch {
    /// Create a first-improvement search without caps or window.
    pub fn new(neighborhood: Neighborhood) -> Self {
        LocalSearch {
            neighborhood,
            strategy: Strategy::First,
            max_improves: None,
            window: None,
            resync_interval: 1,
            stop: StopSignal::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_improves(mut self, max_improves: Option<usize>) -> Self {
        self.max_improves = max_improves;
        self
    }

    pub fn with_window(mut self, window: Option<usize>) -> Self {
        self.window = window;
        self
    }

    pub fn with_resync_interval(mut self, interval: usize) -> Self {
        self.resync_interval = interval.max(1);
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Validate `tour` against `instance` and improve it.
    pub fn run(&self, instance: &Instance, tour: Vec<usize>) -> Result<LocalSearchOutcome> {
        instance.validate_tour(&tour)?;
        Ok(self.improve(instance, tour))
    }

    /// Improve an already validated tour.
    pub(crate) fn improve(&self, instance: &Instance, mut tour: Vec<usize>) -> LocalSearchOutcome {
        let n = tour.len();
        let mut cost = instance.tour_length(&tour);
        let mut improves = 0;

        // Every ordering of three or fewer nodes has the same length.
        if n <= 3 {
            return LocalSearchOutcome {
                tour,
                cost,
                improves,
                termination: LocalSearchTermination::Converged,
            };
        }

        let termination = loop {
            if self.max_improves.map_or(false, |cap| improves >= cap) {
                break LocalSearchTermination::Capped;
            }
            if self.stop.should_stop() {
                break LocalSearchTermination::Stopped;
            }

            let Some(mv) = self.scan(instance, &tour) else {
                break LocalSearchTermination::Converged;
            };

            self.apply(&mut tour, mv);
            cost += mv.delta;
            improves += 1;

            if improves % self.resync_interval == 0 {
                cost = resync(instance, &tour, cost);
            }
        };

        let cost = resync(instance, &tour, cost);
        log::trace!(
            "local search ({}, {}): {} moves, cost {}, {:?}",
            self.neighborhood,
            self.strategy,
            improves,
            cost,
            termination
        );

        LocalSearchOutcome {
            tour,
            cost,
            improves,
            termination,
        }
    }

    fn scan(&self, instance: &Instance, tour: &[usize]) -> Option<Move> {
        match self.neighborhood {
            Neighborhood::TwoOpt => self.scan_two_opt(instance, tour),
            Neighborhood::Exchange => self.scan_exchange(instance, tour),
            Neighborhood::Jump => self.scan_jump(instance, tour),
        }
    }

    fn apply(&self, tour: &mut [usize], mv: Move) {
        match self.neighborhood {
            Neighborhood::TwoOpt => apply_two_opt(tour, mv.i, mv.j),
            Neighborhood::Exchange => apply_exchange(tour, mv.i, mv.j),
            Neighborhood::Jump => apply_insert(tour, mv.i, mv.j),
        }
    }
}

/// Replace the running cost with a full recomputation.
fn resync(instance: &Instance, tour: &[usize], running: Distance) -> Distance {
    let exact = instance.tour_length(tour);
    if exact != running {
        log::warn!("local search cost drifted: running {running}, recomputed {exact}");
    }
    exact
}
