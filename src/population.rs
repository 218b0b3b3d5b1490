//! Population management for the genetic algorithm.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::individual::Individual;
use crate::problem::Instance;
use crate::selection::{self, ParentSelection};
use rand::seq::SliceRandom;
use rand::Rng;

/// A non-empty, ordered collection of individuals.
#[derive(Debug, Clone)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    /// Wrap existing individuals. Fails on an empty collection.
    pub fn new(individuals: Vec<Individual>) -> Result<Self> {
        if individuals.is_empty() {
            return Err(Error::EmptyPopulation);
        }
        Ok(Population { individuals })
    }

    /// `size` uniformly random permutations of the instance's nodes.
    pub fn random<R: Rng + ?Sized>(instance: &Instance, size: usize, rng: &mut R) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_parameter("population size must be at least 1"));
        }

        let individuals = (0..size)
            .map(|_| {
                let mut tour: Vec<usize> = (0..instance.size()).collect();
                tour.shuffle(rng);
                Individual::new(tour, instance)
            })
            .collect();

        Ok(Population { individuals })
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// The lowest-cost individual (first one on ties).
    pub fn best(&self) -> &Individual {
        self.individuals
            .iter()
            .min_by_key(|ind| ind.cost())
            .unwrap_or(&self.individuals[0])
    }

    /// Mean cost over the population.
    pub fn average_cost(&self) -> f64 {
        let total: i64 = self.individuals.iter().map(Individual::cost).sum();
        total as f64 / self.individuals.len() as f64
    }

    /// The `k` best individuals (clamped to the population size).
    pub fn elites(&self, k: usize) -> Vec<Individual> {
        selection::elitism(&self.individuals, k)
    }

    /// Draw one parent according to the configured selection scheme.
    pub fn select_parent<R: Rng + ?Sized>(&self, config: &Config, rng: &mut R) -> Result<&Individual> {
        match config.parent_selection {
            ParentSelection::Tournament => selection::tournament(
                &self.individuals,
                config.tournament_size,
                config.tournament_pressure,
                rng,
            ),
            ParentSelection::Roulette => selection::roulette_wheel(&self.individuals, rng),
        }
    }

    /// Parent pool of `config.pop_size` independent draws.
    pub fn select_parents<R: Rng + ?Sized>(
        &self,
        config: &Config,
        rng: &mut R,
    ) -> Result<Vec<&Individual>> {
        (0..config.pop_size)
            .map(|_| self.select_parent(config, rng))
            .collect()
    }

    /// Average number of edges each individual shares with the best one.
    pub fn similarity_to_best(&self) -> f64 {
        let best = self.best();
        let shared: usize = self
            .individuals
            .iter()
            .map(|ind| ind.common_edges(best))
            .sum();
        shared as f64 / self.individuals.len() as f64
    }
}
