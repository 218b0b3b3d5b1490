//! Jump (insertion) neighborhood: move one node to another place in the tour.

use crate::problem::{Distance, Instance};

use super::utils::{next_index, prev_index, Move, MoveSelector};
use super::LocalSearch;

/// Whether moving position `i` in front of position `j` leaves the tour unchanged.
#[inline]
fn is_noop(i: usize, j: usize, n: usize) -> bool {
    i == j || j == next_index(i, n)
}

/// Change in tour length from moving the node at position `i` so that it sits
/// immediately before the node currently at position `j`.
pub fn delta_insert(instance: &Instance, tour: &[usize], i: usize, j: usize) -> Distance {
    let n = tour.len();
    if n < 3 || is_noop(i, j, n) {
        return 0;
    }
    let d = |a: usize, b: usize| instance.get_distance(a, b);

    let a = tour[prev_index(i, n)];
    let x = tour[i];
    let b = tour[next_index(i, n)];
    let removal = d(a, b) - d(a, x) - d(x, b);

    let c_prev = tour[prev_index(j, n)];
    let c = tour[j];
    let insertion = d(c_prev, x) + d(x, c) - d(c_prev, c);

    removal + insertion
}

/// Move the node at position `i` to sit immediately before the node at position `j`.
pub fn apply_insert(tour: &mut [usize], i: usize, j: usize) {
    let n = tour.len();
    if n < 2 || is_noop(i, j, n) {
        return;
    }
    if i < j {
        tour[i..j].rotate_left(1);
    } else {
        tour[j..=i].rotate_right(1);
    }
}

impl LocalSearch {
    /// Scan jump moves in ascending `i`, then ascending target `j`.
    pub(crate) fn scan_jump(&self, instance: &Instance, tour: &[usize]) -> Option<Move> {
        let n = tour.len();
        let mut selector = MoveSelector::new(self.strategy);

        for i in 0..n {
            for j in 0..n {
                if is_noop(i, j, n) {
                    continue;
                }
                if selector.offer(i, j, delta_insert(instance, tour, i, j)) {
                    return selector.finish();
                }
            }
        }

        selector.finish()
    }
}
