//! Shared helpers for neighborhood scans.

use crate::problem::Distance;

use super::Strategy;

/// A candidate move: two tour positions and the exact change in tour length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub i: usize,
    pub j: usize,
    pub delta: Distance,
}

/// Position before `i` on a closed tour of length `n`.
#[inline]
pub fn prev_index(i: usize, n: usize) -> usize {
    (i + n - 1) % n
}

/// Position after `i` on a closed tour of length `n`.
#[inline]
pub fn next_index(i: usize, n: usize) -> usize {
    (i + 1) % n
}

/// Collects improving moves during one scan according to the strategy.
pub(crate) struct MoveSelector {
    strategy: Strategy,
    chosen: Option<Move>,
}

impl MoveSelector {
    pub(crate) fn new(strategy: Strategy) -> Self {
        MoveSelector {
            strategy,
            chosen: None,
        }
    }

    /// Offer a candidate. Returns `true` when the scan can stop early.
    #[inline]
    pub(crate) fn offer(&mut self, i: usize, j: usize, delta: Distance) -> bool {
        if delta >= 0 {
            return false;
        }
        match self.strategy {
            Strategy::First => {
                self.chosen = Some(Move { i, j, delta });
                true
            }
            Strategy::Best => {
                if self.chosen.map_or(true, |m| delta < m.delta) {
                    self.chosen = Some(Move { i, j, delta });
                }
                false
            }
        }
    }

    pub(crate) fn finish(self) -> Option<Move> {
        self.chosen
    }
}
