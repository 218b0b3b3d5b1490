//! Configuration parameters for the memetic GA.

use crate::error::{Error, Result};
use crate::genetic::{Crossover, Mutation};
use crate::local_search::{LocalSearch, Neighborhood, Strategy};
use crate::selection::ParentSelection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// When and how offspring are polished by local search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalSearchSchedule {
    /// Run every this many generations (0 disables local search)
    pub every: usize,
    /// Fraction of the children, best first, that get polished
    pub fraction: f64,
    pub neighborhood: Neighborhood,
    pub strategy: Strategy,
    /// 2-opt window ahead of the first cut point
    pub window: Option<usize>,
    /// Cap on accepted moves per polished child
    pub max_improves: Option<usize>,
}

impl Default for LocalSearchSchedule {
    fn default() -> Self {
        LocalSearchSchedule {
            every: 10,
            fraction: 0.30,
            neighborhood: Neighborhood::TwoOpt,
            strategy: Strategy::First,
            window: Some(80),
            max_improves: Some(200),
        }
    }
}

impl LocalSearchSchedule {
    /// A schedule that never runs local search.
    pub fn disabled() -> Self {
        LocalSearchSchedule {
            every: 0,
            ..LocalSearchSchedule::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.every > 0 && self.fraction > 0.0
    }

    /// Whether generation `generation` (1-based) is a polishing round.
    pub fn is_due(&self, generation: usize) -> bool {
        self.is_enabled() && generation % self.every == 0
    }

    /// Number of children to polish out of `children`, at least one.
    pub fn polish_count(&self, children: usize) -> usize {
        if children == 0 {
            return 0;
        }
        ((children as f64 * self.fraction) as usize).clamp(1, children)
    }

    /// The local search engine this schedule describes.
    pub fn build(&self) -> LocalSearch {
        LocalSearch::new(self.neighborhood)
            .with_strategy(self.strategy)
            .with_window(self.window)
            .with_max_improves(self.max_improves)
    }
}

/// Configuration settings for the memetic GA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of individuals per generation
    pub pop_size: usize,
    /// Number of generations to run
    pub generations: usize,
    pub crossover: Crossover,
    pub mutation: Mutation,
    /// Probability that a child is mutated
    pub mutation_rate: f64,
    pub parent_selection: ParentSelection,
    /// Contenders per tournament
    pub tournament_size: usize,
    /// Acceptance probability of the soft tournament (1.0 = strict best-of-k)
    pub tournament_pressure: f64,
    /// Best individuals carried over unchanged each generation
    pub elitism: usize,
    pub local_search: LocalSearchSchedule,
    /// Stop after this many generations without a new best
    pub stall_limit: Option<usize>,
    pub seed: u64,
    /// Optional wall-clock limit for the run
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pop_size: 50,
            generations: 2000,
            crossover: Crossover::EdgeRecombination,
            mutation: Mutation::Insert,
            mutation_rate: 0.3,
            parent_selection: ParentSelection::Tournament,
            tournament_size: 5,
            tournament_pressure: 1.0,
            elitism: 2,
            local_search: LocalSearchSchedule::default(),
            stall_limit: None,
            seed: 42,
            time_limit: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the population size.
    pub fn with_pop_size(mut self, size: usize) -> Self {
        self.pop_size = size;
        self
    }

    /// Set the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_crossover(mut self, crossover: Crossover) -> Self {
        self.crossover = crossover;
        self
    }

    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = mutation;
        self
    }

    /// Set the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_parent_selection(mut self, selection: ParentSelection) -> Self {
        self.parent_selection = selection;
        self
    }

    /// Set the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Set the soft-tournament acceptance probability.
    pub fn with_tournament_pressure(mut self, p: f64) -> Self {
        self.tournament_pressure = p;
        self
    }

    /// Set the number of elites.
    pub fn with_elitism(mut self, k: usize) -> Self {
        self.elitism = k;
        self
    }

    pub fn with_local_search(mut self, schedule: LocalSearchSchedule) -> Self {
        self.local_search = schedule;
        self
    }

    /// Set the early-stopping stall limit.
    pub fn with_stall_limit(mut self, generations: usize) -> Self {
        self.stall_limit = Some(generations);
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the time limit.
    pub fn with_time_limit(mut self, duration: Duration) -> Self {
        self.time_limit = Some(duration);
        self
    }

    /// Elites actually kept: `elitism` clamped to the population size.
    pub fn elite_count(&self) -> usize {
        self.elitism.min(self.pop_size)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.pop_size == 0 {
            return Err(Error::invalid_parameter("population size must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(Error::invalid_parameter("tournament size must be at least 1"));
        }
        check_probability("mutation rate", self.mutation_rate)?;
        check_probability("local search fraction", self.local_search.fraction)?;
        if !(self.tournament_pressure > 0.0 && self.tournament_pressure <= 1.0) {
            return Err(Error::invalid_parameter(format!(
                "tournament pressure {} is outside (0, 1]",
                self.tournament_pressure
            )));
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_parameter(format!(
            "{name} {value} is outside [0, 1]"
        )))
    }
}
