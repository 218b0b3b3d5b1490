//! Exchange neighborhood: swap the nodes at two tour positions.

use crate::problem::{Distance, Instance};

use super::utils::{next_index, prev_index, Move, MoveSelector};
use super::LocalSearch;

/// Change in tour length from swapping the nodes at positions `i` and `j`.
///
/// Adjacent positions, including the pair that wraps around the end of the
/// tour, share an edge and are evaluated with three edges instead of four.
pub fn delta_exchange(instance: &Instance, tour: &[usize], i: usize, j: usize) -> Distance {
    let n = tour.len();
    if i == j || n < 3 {
        return 0;
    }
    let (i, j) = if i < j { (i, j) } else { (j, i) };
    let d = |a: usize, b: usize| instance.get_distance(a, b);

    // `first` immediately precedes `second` on the cycle.
    let adjacent = if j == i + 1 {
        Some((i, j))
    } else if i == 0 && j == n - 1 {
        Some((j, i))
    } else {
        None
    };

    match adjacent {
        Some((first, second)) => {
            let p = tour[prev_index(first, n)];
            let x = tour[first];
            let y = tour[second];
            let q = tour[next_index(second, n)];
            (d(p, y) + d(y, x) + d(x, q)) - (d(p, x) + d(x, y) + d(y, q))
        }
        None => {
            let a = tour[prev_index(i, n)];
            let b = tour[i];
            let c = tour[next_index(i, n)];
            let e_prev = tour[prev_index(j, n)];
            let e = tour[j];
            let f = tour[next_index(j, n)];
            (d(a, e) + d(e, c) + d(e_prev, b) + d(b, f))
                - (d(a, b) + d(b, c) + d(e_prev, e) + d(e, f))
        }
    }
}

/// Swap the nodes at positions `i` and `j`.
pub fn apply_exchange(tour: &mut [usize], i: usize, j: usize) {
    tour.swap(i, j);
}

impl LocalSearch {
    /// Scan exchange moves in ascending `i`, then ascending `j > i`.
    pub(crate) fn scan_exchange(&self, instance: &Instance, tour: &[usize]) -> Option<Move> {
        let n = tour.len();
        let mut selector = MoveSelector::new(self.strategy);

        for i in 0..n.saturating_sub(1) {
            for j in (i + 1)..n {
                if selector.offer(i, j, delta_exchange(instance, tour, i, j)) {
                    return selector.finish();
                }
            }
        }

        selector.finish()
    }
}
