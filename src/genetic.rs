//! Permutation operators: crossover and mutation on tours.
//!
//! Every operator returns a permutation of the same element set it was given.
//! Crossovers assume both parents are permutations of `0..n`; the checked
//! entry point [`Crossover::apply`] verifies this before recombining.

use crate::error::{Error, Result};
use crate::problem::validate_permutation;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Crossover operator selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Crossover {
    /// Ordered crossover (OX)
    Ordered,
    /// Partially mapped crossover (PMX)
    PartiallyMapped,
    /// Cycle crossover (CX)
    Cycle,
    /// Edge recombination crossover (ERX)
    EdgeRecombination,
}

impl Crossover {
    pub const ALL: [Crossover; 4] = [
        Crossover::Ordered,
        Crossover::PartiallyMapped,
        Crossover::Cycle,
        Crossover::EdgeRecombination,
    ];

    /// Recombine two parents into one child.
    pub fn apply<R: Rng + ?Sized>(
        self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        if parent1.len() != parent2.len() {
            return Err(Error::invalid_tour(format!(
                "parents have different lengths ({} and {})",
                parent1.len(),
                parent2.len()
            )));
        }
        validate_permutation(parent1)?;
        validate_permutation(parent2)?;

        let child = match self {
            Crossover::Ordered => ordered_crossover(parent1, parent2, rng),
            Crossover::PartiallyMapped => pmx_crossover(parent1, parent2, rng),
            Crossover::Cycle => cycle_crossover(parent1, parent2),
            Crossover::EdgeRecombination => edge_recombination_crossover(parent1, parent2, rng),
        };

        debug_assert!(validate_permutation(&child).is_ok());
        Ok(child)
    }
}

impl fmt::Display for Crossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Crossover::Ordered => "OX",
            Crossover::PartiallyMapped => "PMX",
            Crossover::Cycle => "CX",
            Crossover::EdgeRecombination => "ERX",
        };
        f.write_str(name)
    }
}

impl FromStr for Crossover {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ox" | "ordered" | "order" | "ordered_crossover" => Ok(Crossover::Ordered),
            "pmx" | "pmx_crossover" | "partially_mapped" => Ok(Crossover::PartiallyMapped),
            "cx" | "cycle" | "cycle_crossover" => Ok(Crossover::Cycle),
            "erx" | "edge" | "edge_recombination" | "edge_recombination_crossover" => {
                Ok(Crossover::EdgeRecombination)
            }
            _ => Err(Error::invalid_parameter(format!("unknown crossover '{s}'"))),
        }
    }
}

/// Mutation operator selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mutation {
    Swap,
    Insert,
    Inversion,
}

impl Mutation {
    pub const ALL: [Mutation; 3] = [Mutation::Swap, Mutation::Insert, Mutation::Inversion];

    /// Mutate `tour` in place. Tours shorter than two nodes are left untouched.
    pub fn apply<R: Rng + ?Sized>(self, tour: &mut [usize], rng: &mut R) {
        match self {
            Mutation::Swap => swap_mutation(tour, rng),
            Mutation::Insert => insert_mutation(tour, rng),
            Mutation::Inversion => inversion_mutation(tour, rng),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mutation::Swap => "swap",
            Mutation::Insert => "insert",
            Mutation::Inversion => "inversion",
        };
        f.write_str(name)
    }
}

impl FromStr for Mutation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "swap" | "exchange" => Ok(Mutation::Swap),
            "insert" | "ins" | "jump" => Ok(Mutation::Insert),
            "inversion" | "invert" | "reverse" | "rev" => Ok(Mutation::Inversion),
            _ => Err(Error::invalid_parameter(format!("unknown mutation '{s}'"))),
        }
    }
}

/// Pairs a crossover and a mutation operator with a mutation rate.
#[derive(Debug, Clone, Copy)]
pub struct Genetic {
    pub crossover: Crossover,
    pub mutation: Mutation,
    pub mutation_rate: f64,
}

impl Genetic {
    pub fn new(crossover: Crossover, mutation: Mutation, mutation_rate: f64) -> Self {
        Genetic {
            crossover,
            mutation,
            mutation_rate,
        }
    }

    /// Produce one child: crossover, then mutation with probability `mutation_rate`.
    pub fn breed<R: Rng + ?Sized>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let mut child = self.crossover.apply(parent1, parent2, rng)?;
        if rng.gen::<f64>() < self.mutation_rate {
            self.mutation.apply(&mut child, rng);
        }
        Ok(child)
    }
}

/// Two distinct positions in `0..n`, returned in ascending order.
fn distinct_positions<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    let picked = index::sample(rng, n, 2);
    let (a, b) = (picked.index(0), picked.index(1));
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Cut points `a <= b` for slice-based crossovers; `(0, 0)` for single-node tours.
fn cut_points<R: Rng + ?Sized>(n: usize, rng: &mut R) -> (usize, usize) {
    if n < 2 {
        (0, 0)
    } else {
        distinct_positions(n, rng)
    }
}

/// Exchange the nodes at two distinct random positions.
pub fn swap_mutation<R: Rng + ?Sized>(tour: &mut [usize], rng: &mut R) {
    if tour.len() < 2 {
        return;
    }
    let picked = index::sample(rng, tour.len(), 2);
    tour.swap(picked.index(0), picked.index(1));
}

/// Remove the node at one random position and reinsert it at another.
pub fn insert_mutation<R: Rng + ?Sized>(tour: &mut [usize], rng: &mut R) {
    if tour.len() < 2 {
        return;
    }
    let picked = index::sample(rng, tour.len(), 2);
    let (from, to) = (picked.index(0), picked.index(1));
    if from < to {
        tour[from..=to].rotate_left(1);
    } else {
        tour[to..=from].rotate_right(1);
    }
}

/// Reverse the closed range between two random positions.
pub fn inversion_mutation<R: Rng + ?Sized>(tour: &mut [usize], rng: &mut R) {
    if tour.len() < 3 {
        return;
    }
    let (a, b) = distinct_positions(tour.len(), rng);
    tour[a..=b].reverse();
}

/// Ordered crossover (OX) with random cut points.
pub fn ordered_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    if parent1.is_empty() {
        return Vec::new();
    }
    let (a, b) = cut_points(parent1.len(), rng);
    ordered_crossover_at(parent1, parent2, a, b)
}

/// Ordered crossover (OX) with cut points `a <= b < n`.
///
/// Copies `parent1[a..=b]`, then fills the free positions cyclically from
/// `b + 1` with the remaining nodes in the order they appear in `parent2`.
pub fn ordered_crossover_at(
    parent1: &[usize],
    parent2: &[usize],
    a: usize,
    b: usize,
) -> Vec<usize> {
    let n = parent1.len();
    if n == 0 {
        return Vec::new();
    }

    let mut child = vec![usize::MAX; n];
    let mut placed = vec![false; n];
    for i in a..=b {
        child[i] = parent1[i];
        placed[parent1[i]] = true;
    }

    let mut idx = (b + 1) % n;
    for &node in parent2 {
        if placed[node] {
            continue;
        }
        while child[idx] != usize::MAX {
            idx = (idx + 1) % n;
        }
        child[idx] = node;
        placed[node] = true;
        idx = (idx + 1) % n;
    }

    child
}

/// Partially mapped crossover (PMX) with random cut points.
pub fn pmx_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    if parent1.is_empty() {
        return Vec::new();
    }
    let (a, b) = cut_points(parent1.len(), rng);
    pmx_crossover_at(parent1, parent2, a, b)
}

/// Partially mapped crossover (PMX) with cut points `a <= b < n`.
///
/// Copies `parent1[a..=b]`; every other position takes `parent2`'s node,
/// following the slice mapping `parent1[i] -> parent2[i]` until the node is
/// no longer part of the copied slice.
pub fn pmx_crossover_at(
    parent1: &[usize],
    parent2: &[usize],
    a: usize,
    b: usize,
) -> Vec<usize> {
    let n = parent1.len();
    if n == 0 {
        return Vec::new();
    }

    let mut child = parent2.to_vec();
    let mut mapping: Vec<Option<usize>> = vec![None; n];
    for i in a..=b {
        child[i] = parent1[i];
        mapping[parent1[i]] = Some(parent2[i]);
    }

    for i in (0..a).chain(b + 1..n) {
        let mut node = parent2[i];
        while let Some(next) = mapping[node] {
            node = next;
        }
        child[i] = node;
    }

    child
}

/// Cycle crossover (CX).
///
/// Positions are partitioned into cycles of `i -> pos_in_parent1(parent2[i])`;
/// cycles alternate between taking their nodes from `parent1` and `parent2`.
pub fn cycle_crossover(parent1: &[usize], parent2: &[usize]) -> Vec<usize> {
    let n = parent1.len();
    let mut pos_in_p1 = vec![0; n];
    for (i, &node) in parent1.iter().enumerate() {
        pos_in_p1[node] = i;
    }

    let mut child = vec![usize::MAX; n];
    let mut from_parent1 = true;

    for start in 0..n {
        if child[start] != usize::MAX {
            continue;
        }
        let source = if from_parent1 { parent1 } else { parent2 };
        let mut idx = start;
        while child[idx] == usize::MAX {
            child[idx] = source[idx];
            idx = pos_in_p1[parent2[idx]];
        }
        from_parent1 = !from_parent1;
    }

    child
}

/// Edge recombination crossover (ERX).
///
/// Builds the union of both parents' neighbor lists, then grows the child from
/// a random start node, preferring edges shared by both parents, then the
/// neighbor with the fewest remaining neighbors, and jumping to a random
/// unvisited node when the current neighbor list is exhausted.
pub fn edge_recombination_crossover<R: Rng + ?Sized>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Vec<usize> {
    let n = parent1.len();
    if n == 0 {
        return Vec::new();
    }

    let adj1 = adjacency(parent1);
    let adj2 = adjacency(parent2);

    let mut neighbors: Vec<Vec<usize>> = (0..n)
        .map(|v| {
            let mut list = Vec::with_capacity(4);
            for &u in adj1[v].iter().chain(adj2[v].iter()) {
                if u != v && !list.contains(&u) {
                    list.push(u);
                }
            }
            list
        })
        .collect();

    // Unvisited nodes with O(1) removal via a position index.
    let mut unvisited: Vec<usize> = (0..n).collect();
    let mut slot: Vec<usize> = (0..n).collect();

    let mut child = Vec::with_capacity(n);
    let mut current = parent1[rng.gen_range(0..n)];

    loop {
        child.push(current);

        let s = slot[current];
        let last = unvisited[unvisited.len() - 1];
        unvisited.swap_remove(s);
        if s < unvisited.len() {
            slot[last] = s;
        }

        if child.len() == n {
            break;
        }

        // Adjacency is symmetric, so only current's neighbors list it.
        for k in 0..neighbors[current].len() {
            let u = neighbors[current][k];
            neighbors[u].retain(|&w| w != current);
        }

        let candidates = &neighbors[current];
        let next = if candidates.is_empty() {
            unvisited[rng.gen_range(0..unvisited.len())]
        } else {
            let common: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|v| adj1[current].contains(v) && adj2[current].contains(v))
                .collect();
            if let Some(&pick) = common.choose(rng) {
                pick
            } else {
                let fewest = candidates
                    .iter()
                    .map(|&v| neighbors[v].len())
                    .min()
                    .unwrap_or(0);
                let best: Vec<usize> = candidates
                    .iter()
                    .copied()
                    .filter(|&v| neighbors[v].len() == fewest)
                    .collect();
                best[rng.gen_range(0..best.len())]
            }
        };

        neighbors[current].clear();
        current = next;
    }

    child
}

/// Left and right tour-neighbors of every node.
fn adjacency(tour: &[usize]) -> Vec<[usize; 2]> {
    let n = tour.len();
    let mut adj = vec![[0; 2]; n];
    for i in 0..n {
        adj[tour[i]] = [tour[(i + n - 1) % n], tour[(i + 1) % n]];
    }
    adj
}
