//! # memetic-tsp
//!
//! A memetic genetic algorithm and neighborhood local search for symmetric
//! Euclidean TSP instances (TSPLIB EUC_2D).
//!
//! The genetic algorithm evolves a population of tours with tournament or
//! roulette parent selection, one of four permutation crossovers, one of three
//! mutations and elitism. Every few generations the best fraction of the
//! offspring is polished with a bounded, delta-evaluated 2-opt (or exchange /
//! jump) local search. An inver-over optimizer is provided as an alternative
//! population-based search.
//!
//! All randomness flows from an explicit seed, so runs are reproducible.

pub mod config;
pub mod error;
pub mod genetic;
pub mod individual;
pub mod inver_over;
pub mod local_search;
pub mod population;
pub mod problem;
pub mod selection;
pub mod solution;
pub mod stop;
pub mod utils;

pub use crate::config::{Config, LocalSearchSchedule};
pub use crate::error::{Error, Result};
pub use crate::genetic::{Crossover, Mutation};
pub use crate::individual::Individual;
pub use crate::local_search::{LocalSearchOutcome, Neighborhood, Strategy};
pub use crate::problem::{Distance, Instance, Point};
pub use crate::selection::ParentSelection;
pub use crate::solution::{Solution, Termination};
pub use crate::stop::StopSignal;

use crate::genetic::Genetic;
use crate::local_search::LocalSearch;
use crate::population::Population;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

/// The main algorithm structure that orchestrates the memetic GA.
pub struct MemeticAlgorithm<'a> {
    pub instance: &'a Instance,
    pub config: Config,
    pub population: Population,
    /// Snapshot of the best individual seen so far
    pub best: Individual,
    /// Generations completed
    pub generation: usize,
    pub generations_without_improvement: usize,
    pub genetic: Genetic,
    pub local_search: LocalSearch,
    pub run_time: Duration,
    rng: ChaCha8Rng,
    stop: StopSignal,
}

impl<'a> MemeticAlgorithm<'a> {
    /// Validate the configuration and build the random initial population.
    pub fn new(instance: &'a Instance, config: Config) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let population = Population::random(instance, config.pop_size, &mut rng)?;
        let best = population.best().clone();

        Ok(MemeticAlgorithm {
            instance,
            population,
            best,
            generation: 0,
            generations_without_improvement: 0,
            genetic: Genetic::new(config.crossover, config.mutation, config.mutation_rate),
            local_search: config.local_search.build(),
            run_time: Duration::from_secs(0),
            rng,
            stop: StopSignal::new(),
            config,
        })
    }

    /// Use an external stop signal, checked once per generation and inside local search.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Run until the generation budget, the stall limit or the stop signal ends the search.
    ///
    /// Calling `run` again continues from the current generation.
    pub fn run(&mut self) -> Result<Solution> {
        let start_time = Instant::now();
        let stop = match self.config.time_limit {
            Some(limit) => self.stop.clone().with_time_limit(limit),
            None => self.stop.clone(),
        };
        self.local_search = self.local_search.clone().with_stop_signal(stop.clone());

        log::info!(
            "memetic GA on {} (n={}): pop={} gens={} {}+{} rate={} seed={}",
            self.instance.name,
            self.instance.size(),
            self.config.pop_size,
            self.config.generations,
            self.config.crossover,
            self.config.mutation,
            self.config.mutation_rate,
            self.config.seed
        );

        let termination = loop {
            if self.generation >= self.config.generations {
                break Termination::Generations;
            }
            if stop.should_stop() {
                break Termination::Stopped;
            }

            self.step()?;

            if let Some(limit) = self.config.stall_limit {
                if self.generations_without_improvement >= limit {
                    log::debug!("no improvement in {limit} generations, stopping early");
                    break Termination::Stalled;
                }
            }
        };

        self.run_time += start_time.elapsed();
        log::info!(
            "best cost {} after {} generations ({termination})",
            self.best.cost(),
            self.generation
        );

        Ok(Solution::from_individual(
            self.best.clone(),
            self.generation,
            termination,
            self.run_time,
        ))
    }

    /// Advance the search by one generation.
    pub fn step(&mut self) -> Result<()> {
        let generation = self.generation + 1;
        let elite_count = self.config.elite_count();
        let child_count = self.config.pop_size - elite_count;

        // Parent pool
        let parents = self.population.select_parents(&self.config, &mut self.rng)?;

        // Crossover + mutation
        let mut next = Vec::with_capacity(self.config.pop_size);
        for _ in 0..child_count {
            let parent1 = parents[self.rng.gen_range(0..parents.len())];
            let parent2 = parents[self.rng.gen_range(0..parents.len())];
            let tour = self
                .genetic
                .breed(parent1.tour(), parent2.tour(), &mut self.rng)?;
            next.push(Individual::new(tour, self.instance));
        }

        // Intermittent local search on the best children
        let schedule = &self.config.local_search;
        if schedule.is_due(generation) && !next.is_empty() {
            next.sort();
            let polish = schedule.polish_count(next.len());
            for child in next.iter_mut().take(polish) {
                let outcome = self
                    .local_search
                    .improve(self.instance, child.tour().to_vec());
                *child = Individual::from_evaluated(outcome.tour, outcome.cost);
            }
        }

        // Survivors: children plus the previous generation's elites
        next.extend(self.population.elites(elite_count));
        self.population = Population::new(next)?;
        self.generation = generation;

        let current = self.population.best();
        if current.cost() < self.best.cost() {
            log::debug!("generation {generation}: new best {}", current.cost());
            self.best = current.clone();
            self.generations_without_improvement = 0;
        } else {
            self.generations_without_improvement += 1;
        }

        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "generation {generation}: best={} avg={:.1} shared_edges={:.1}",
                current.cost(),
                self.population.average_cost(),
                self.population.similarity_to_best()
            );
        }

        Ok(())
    }
}

/// Build a validated instance from a name and ordered coordinates.
pub fn build_instance<P: Into<Point>>(name: impl Into<String>, coords: Vec<P>) -> Result<Instance> {
    Instance::new(name, coords)
}

/// Closed tour length of a validated permutation.
pub fn tour_length(instance: &Instance, tour: &[usize]) -> Result<Distance> {
    instance.validate_tour(tour)?;
    Ok(instance.tour_length(tour))
}

/// Improve `tour` with one neighborhood until no improving move remains or
/// `max_improves` moves have been accepted.
pub fn local_search(
    instance: &Instance,
    tour: Vec<usize>,
    neighborhood: Neighborhood,
    strategy: Strategy,
    max_improves: Option<usize>,
    window: Option<usize>,
) -> Result<LocalSearchOutcome> {
    LocalSearch::new(neighborhood)
        .with_strategy(strategy)
        .with_max_improves(max_improves)
        .with_window(window)
        .run(instance, tour)
}

/// Run the memetic GA and return the best tour found.
pub fn run_memetic_ga(instance: &Instance, config: Config) -> Result<Solution> {
    MemeticAlgorithm::new(instance, config)?.run()
}
