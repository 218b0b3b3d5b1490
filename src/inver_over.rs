//! Inver-over evolutionary operator (Tao & Michalewicz).
//!
//! Each individual is improved by a chain of inversions guided either by a
//! random city (with probability `p`) or by the successor of the current city
//! in another population member. The offspring replaces its parent only when
//! it is strictly shorter.

use crate::error::{Error, Result};
use crate::individual::Individual;
use crate::population::Population;
use crate::problem::Instance;
use crate::solution::{Solution, Termination};
use crate::stop::StopSignal;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Configuration settings for inver-over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InverOverConfig {
    pub pop_size: usize,
    pub generations: usize,
    /// Probability of picking the second city at random
    pub p: f64,
    pub seed: u64,
}

impl Default for InverOverConfig {
    fn default() -> Self {
        InverOverConfig {
            pop_size: 50,
            generations: 20000,
            p: 0.02,
            seed: 42,
        }
    }
}

impl InverOverConfig {
    pub fn with_pop_size(mut self, size: usize) -> Self {
        self.pop_size = size;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_p(mut self, p: f64) -> Self {
        self.p = p;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.pop_size == 0 {
            return Err(Error::invalid_parameter("population size must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.p) {
            return Err(Error::invalid_parameter(format!(
                "random inversion probability {} is outside [0, 1]",
                self.p
            )));
        }
        Ok(())
    }
}

/// Inver-over optimizer bound to one instance.
pub struct InverOver<'a> {
    instance: &'a Instance,
    config: InverOverConfig,
    stop: StopSignal,
}

impl<'a> InverOver<'a> {
    pub fn new(instance: &'a Instance, config: InverOverConfig) -> Result<Self> {
        config.validate()?;
        Ok(InverOver {
            instance,
            config,
            stop: StopSignal::new(),
        })
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn run(&self) -> Result<Solution> {
        let start_time = Instant::now();
        let n = self.instance.size();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut population = Population::random(self.instance, self.config.pop_size, &mut rng)?;
        let mut best = population.best().clone();

        log::info!(
            "inver-over on {} (n={n}): pop={} gens={} p={}",
            self.instance.name,
            self.config.pop_size,
            self.config.generations,
            self.config.p
        );

        // Every ordering of three or fewer cities has the same length.
        if n <= 3 {
            return Ok(Solution::from_individual(
                best,
                0,
                Termination::Generations,
                start_time.elapsed(),
            ));
        }

        let mut generation = 0;
        let termination = loop {
            if generation >= self.config.generations {
                break Termination::Generations;
            }
            if self.stop.should_stop() {
                break Termination::Stopped;
            }

            let positions: Vec<Vec<usize>> = population
                .individuals()
                .iter()
                .map(|ind| positions_of(ind.tour()))
                .collect();

            let mut next = Vec::with_capacity(population.len());
            for parent in population.individuals() {
                let offspring = self.evolve(parent.tour(), &population, &positions, &mut rng);
                let offspring = Individual::new(offspring, self.instance);
                let survivor = if offspring.cost() < parent.cost() {
                    offspring
                } else {
                    parent.clone()
                };
                if survivor.cost() < best.cost() {
                    log::debug!("generation {}: new best {}", generation + 1, survivor.cost());
                    best = survivor.clone();
                }
                next.push(survivor);
            }

            population = Population::new(next)?;
            generation += 1;
        };

        log::info!("best cost {} after {generation} generations", best.cost());
        Ok(Solution::from_individual(
            best,
            generation,
            termination,
            start_time.elapsed(),
        ))
    }

    /// Apply the inversion chain to a copy of `tour`.
    fn evolve<R: Rng + ?Sized>(
        &self,
        tour: &[usize],
        population: &Population,
        positions: &[Vec<usize>],
        rng: &mut R,
    ) -> Vec<usize> {
        let n = tour.len();
        let mut child = tour.to_vec();
        let mut pos = positions_of(&child);
        let mut c = child[rng.gen_range(0..n)];

        loop {
            let c_prime = if rng.gen::<f64>() < self.config.p {
                // Uniform over the other n - 1 cities.
                let pick = rng.gen_range(0..n - 1);
                if pick >= c {
                    pick + 1
                } else {
                    pick
                }
            } else {
                let other = rng.gen_range(0..population.len());
                let other_tour = population.individuals()[other].tour();
                other_tour[(positions[other][c] + 1) % n]
            };

            let i = pos[c];
            let j = pos[c_prime];
            if (i + 1) % n == j || (j + 1) % n == i {
                break;
            }

            invert_cyclic(&mut child, &mut pos, (i + 1) % n, j);
            c = c_prime;
        }

        child
    }
}

/// `positions[node]` = index of `node` in `tour`.
fn positions_of(tour: &[usize]) -> Vec<usize> {
    let mut positions = vec![0; tour.len()];
    for (i, &node) in tour.iter().enumerate() {
        positions[node] = i;
    }
    positions
}

/// Reverse the cyclic segment running from position `from` to position `to`.
fn invert_cyclic(tour: &mut [usize], pos: &mut [usize], from: usize, to: usize) {
    let n = tour.len();
    let len = (to + n - from) % n + 1;
    for t in 0..len / 2 {
        let a = (from + t) % n;
        let b = (to + n - t) % n;
        tour.swap(a, b);
        pos[tour[a]] = a;
        pos[tour[b]] = b;
    }
}
