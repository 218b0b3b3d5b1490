//! Selection strategies over a slice of individuals.

use crate::error::{Error, Result};
use crate::individual::Individual;
use itertools::Itertools;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Parent selection scheme used by the memetic GA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentSelection {
    Tournament,
    Roulette,
}

impl fmt::Display for ParentSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParentSelection::Tournament => f.write_str("tournament"),
            ParentSelection::Roulette => f.write_str("roulette"),
        }
    }
}

impl FromStr for ParentSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "tournament" | "tour" => Ok(ParentSelection::Tournament),
            "roulette" | "fitness" | "proportional" => Ok(ParentSelection::Roulette),
            _ => Err(Error::invalid_parameter(format!(
                "unknown parent selection '{s}'"
            ))),
        }
    }
}

/// Fitness-proportional (roulette wheel) selection.
///
/// A candidate with cost `c` has weight `1 / (1 + c)`. Falls back to a uniform
/// pick when the total weight is degenerate.
pub fn roulette_wheel<'a, R: Rng + ?Sized>(
    population: &'a [Individual],
    rng: &mut R,
) -> Result<&'a Individual> {
    if population.is_empty() {
        return Err(Error::EmptyPopulation);
    }

    let weights: Vec<f64> = population
        .iter()
        .map(|ind| 1.0 / (1.0 + ind.cost() as f64))
        .collect();
    let total: f64 = weights.iter().sum();

    if !total.is_finite() || total <= 0.0 {
        return population.choose(rng).ok_or(Error::EmptyPopulation);
    }

    let threshold = rng.gen_range(0.0..total);
    let mut acc = 0.0;
    for (ind, w) in population.iter().zip(&weights) {
        acc += w;
        if acc > threshold {
            return Ok(ind);
        }
    }

    // Rounding can leave the threshold just above the accumulated sum.
    population.last().ok_or(Error::EmptyPopulation)
}

/// Soft tournament selection.
///
/// Samples `k` distinct candidates (clamped to `1..=len`), orders them by cost
/// and accepts each in turn with probability `p`; the last (worst) candidate is
/// accepted when no earlier one was. With `p = 1.0` this is strict best-of-k,
/// and with `k = 1` it is a uniform pick.
pub fn tournament<'a, R: Rng + ?Sized>(
    population: &'a [Individual],
    k: usize,
    p: f64,
    rng: &mut R,
) -> Result<&'a Individual> {
    if population.is_empty() {
        return Err(Error::EmptyPopulation);
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::invalid_parameter(format!(
            "tournament acceptance probability {p} is outside [0, 1]"
        )));
    }

    let k = k.clamp(1, population.len());
    let contenders = index::sample(rng, population.len(), k)
        .into_iter()
        .map(|i| &population[i])
        .sorted_by_key(|ind| ind.cost())
        .collect::<Vec<_>>();

    let last = contenders.len() - 1;
    for (i, &ind) in contenders.iter().enumerate() {
        if i == last || rng.gen_bool(p) {
            return Ok(ind);
        }
    }

    Err(Error::EmptyPopulation)
}

/// The `size` lowest-cost individuals, best first (`size` clamped to the population).
pub fn elitism(population: &[Individual], size: usize) -> Vec<Individual> {
    let size = size.min(population.len());
    population
        .iter()
        .sorted_by_key(|ind| ind.cost())
        .take(size)
        .cloned()
        .collect()
}
