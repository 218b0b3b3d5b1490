//! 2-Opt neighborhood: reverse the tour segment between two cut points.

use crate::problem::{Distance, Instance};

use super::utils::{next_index, prev_index, Move, MoveSelector};
use super::LocalSearch;

/// Change in tour length from reversing `tour[i..=k]`, for `i < k < n`.
///
/// Only the two edges entering and leaving the segment are inspected.
pub fn delta_two_opt(instance: &Instance, tour: &[usize], i: usize, k: usize) -> Distance {
    let n = tour.len();
    if i >= k || (k - i + 1) % n < 2 {
        return 0;
    }

    let a = tour[prev_index(i, n)];
    let b = tour[i];
    let c = tour[k];
    let d = tour[next_index(k, n)];

    instance.get_distance(a, c) + instance.get_distance(b, d)
        - instance.get_distance(a, b)
        - instance.get_distance(c, d)
}

/// Reverse `tour[i..=k]`.
pub fn apply_two_opt(tour: &mut [usize], i: usize, k: usize) {
    tour[i..=k].reverse();
}

/// Map a cyclic cut pair onto a reversal inside the slice.
///
/// `k` may run past the end of the tour. A wrapped segment `i..n, 0..=k-n`
/// has the same boundary edges as its complement, so the complement is
/// reversed instead. Returns `None` once the wrapped cut reaches `i - 1`.
#[inline]
pub(crate) fn window_segment(i: usize, k: usize, n: usize) -> Option<(usize, usize)> {
    if k < n {
        return Some((i, k));
    }
    let k = k - n;
    if k + 2 <= i {
        Some((k + 1, i - 1))
    } else {
        None
    }
}

impl LocalSearch {
    /// Scan 2-opt moves in ascending `i`, then ascending `k`.
    ///
    /// Without a window `k` covers `i+2..n`. With a window the second cut
    /// covers `i+2..=i+1+window` (mod n).
    pub(crate) fn scan_two_opt(&self, instance: &Instance, tour: &[usize]) -> Option<Move> {
        let n = tour.len();
        let mut selector = MoveSelector::new(self.strategy);

        for i in 0..n {
            match self.window {
                Some(window) => {
                    for offset in 2..=window.saturating_add(1) {
                        let Some((a, b)) = window_segment(i, i + offset, n) else {
                            break;
                        };
                        if selector.offer(a, b, delta_two_opt(instance, tour, a, b)) {
                            return selector.finish();
                        }
                    }
                }
                None => {
                    for k in (i + 2)..n {
                        if selector.offer(i, k, delta_two_opt(instance, tour, i, k)) {
                            return selector.finish();
                        }
                    }
                }
            }
        }

        selector.finish()
    }
}
