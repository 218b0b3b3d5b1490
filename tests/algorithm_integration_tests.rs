//! Integration tests for the memetic GA driver.

use memetic_tsp::config::{Config, LocalSearchSchedule};
use memetic_tsp::genetic::{Crossover, Mutation};
use memetic_tsp::population::Population;
use memetic_tsp::problem::Instance;
use memetic_tsp::selection::ParentSelection;
use memetic_tsp::solution::Termination;
use memetic_tsp::stop::StopSignal;
use memetic_tsp::{build_instance, run_memetic_ga, tour_length, MemeticAlgorithm};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Creates a test instance with 20 cities on a jittered grid.
fn create_test_instance() -> Instance {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let coords: Vec<(f64, f64)> = (0..20)
        .map(|i| {
            let x = (i % 5) as f64 * 100.0 + rng.gen_range(-20.0..20.0);
            let y = (i / 5) as f64 * 100.0 + rng.gen_range(-20.0..20.0);
            (x, y)
        })
        .collect();
    build_instance("JitteredGrid", coords).unwrap()
}

/// A short configuration for tests.
fn create_test_config() -> Config {
    Config::new()
        .with_pop_size(20)
        .with_generations(30)
        .with_seed(7)
        .with_local_search(LocalSearchSchedule {
            every: 5,
            ..LocalSearchSchedule::default()
        })
}

#[test]
fn test_zero_generations_returns_best_initial_tour() {
    let instance = create_test_instance();
    let config = create_test_config().with_generations(0);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let initial = Population::random(&instance, config.pop_size, &mut rng).unwrap();

    let solution = run_memetic_ga(&instance, config).unwrap();
    assert_eq!(solution.generations, 0);
    assert_eq!(solution.termination, Termination::Generations);
    assert_eq!(solution.cost, initial.best().cost());
    assert!(solution.is_consistent(&instance));
}

#[test]
fn test_same_seed_same_result() {
    let instance = create_test_instance();

    let first = run_memetic_ga(&instance, create_test_config()).unwrap();
    let second = run_memetic_ga(&instance, create_test_config()).unwrap();

    assert_eq!(first.tour, second.tour);
    assert_eq!(first.cost, second.cost);
    assert_eq!(first.generations, second.generations);
}

#[test]
fn test_every_operator_combination_yields_valid_tours() {
    let instance = create_test_instance();

    for crossover in Crossover::ALL {
        for mutation in Mutation::ALL {
            for selection in [ParentSelection::Tournament, ParentSelection::Roulette] {
                let config = create_test_config()
                    .with_generations(10)
                    .with_crossover(crossover)
                    .with_mutation(mutation)
                    .with_parent_selection(selection);
                let solution = run_memetic_ga(&instance, config).unwrap();
                assert!(
                    solution.is_consistent(&instance),
                    "{crossover}/{mutation}/{selection} returned an inconsistent solution"
                );
                assert_eq!(solution.generations, 10);
            }
        }
    }
}

#[test]
fn test_search_improves_on_initial_population() {
    let instance = create_test_instance();
    let config = create_test_config().with_generations(50);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let initial = Population::random(&instance, config.pop_size, &mut rng).unwrap();

    let solution = run_memetic_ga(&instance, config).unwrap();
    assert!(solution.cost < initial.best().cost());
    assert_eq!(solution.cost, tour_length(&instance, &solution.tour).unwrap());
}

#[test]
fn test_best_never_worsens_with_elitism() {
    let instance = create_test_instance();
    let config = create_test_config().with_elitism(1);
    let mut algorithm = MemeticAlgorithm::new(&instance, config).unwrap();

    let mut previous = algorithm.population.best().cost();
    for _ in 0..25 {
        algorithm.step().unwrap();
        let current = algorithm.population.best().cost();
        assert!(current <= previous);
        assert_eq!(algorithm.best.cost(), current);
        previous = current;
    }
    assert_eq!(algorithm.generation, 25);
}

#[test]
fn test_elitism_covering_whole_population() {
    let instance = create_test_instance();
    let config = create_test_config().with_pop_size(6).with_elitism(10);
    let mut algorithm = MemeticAlgorithm::new(&instance, config).unwrap();
    let initial_best = algorithm.best.cost();

    for _ in 0..5 {
        algorithm.step().unwrap();
        assert_eq!(algorithm.population.len(), 6);
    }
    assert_eq!(algorithm.best.cost(), initial_best);
    assert_eq!(algorithm.generations_without_improvement, 5);
}

#[test]
fn test_stall_limit_stops_early() {
    let instance = create_test_instance();
    let config = create_test_config()
        .with_generations(100_000)
        .with_stall_limit(5);

    let solution = run_memetic_ga(&instance, config).unwrap();
    assert_eq!(solution.termination, Termination::Stalled);
    assert!(solution.generations < 100_000);
    assert!(solution.is_consistent(&instance));
}

#[test]
fn test_stop_signal_and_time_limit() {
    let instance = create_test_instance();

    let stop = StopSignal::new();
    stop.stop();
    let solution = MemeticAlgorithm::new(&instance, create_test_config())
        .unwrap()
        .with_stop_signal(stop)
        .run()
        .unwrap();
    assert_eq!(solution.termination, Termination::Stopped);
    assert_eq!(solution.generations, 0);

    let config = create_test_config()
        .with_generations(1_000_000)
        .with_time_limit(Duration::from_millis(0));
    let solution = run_memetic_ga(&instance, config).unwrap();
    assert_eq!(solution.termination, Termination::Stopped);
    assert!(solution.is_consistent(&instance));
}

#[test]
fn test_local_search_disabled() {
    let instance = create_test_instance();
    let config = create_test_config().with_local_search(LocalSearchSchedule::disabled());

    let solution = run_memetic_ga(&instance, config).unwrap();
    assert!(solution.is_consistent(&instance));
    assert_eq!(solution.generations, 30);
}

#[test]
fn test_invalid_configurations() {
    let instance = create_test_instance();

    assert!(run_memetic_ga(&instance, Config::new().with_pop_size(0)).is_err());
    assert!(run_memetic_ga(&instance, Config::new().with_mutation_rate(1.5)).is_err());
    assert!(run_memetic_ga(&instance, Config::new().with_tournament_size(0)).is_err());
    assert!(run_memetic_ga(&instance, Config::new().with_tournament_pressure(0.0)).is_err());
    assert!(run_memetic_ga(
        &instance,
        Config::new().with_local_search(LocalSearchSchedule {
            fraction: -0.1,
            ..LocalSearchSchedule::default()
        })
    )
    .is_err());
}

#[test]
fn test_tiny_instances() {
    let single = build_instance("One", vec![(5.0, 5.0)]).unwrap();
    let solution = run_memetic_ga(&single, create_test_config()).unwrap();
    assert_eq!(solution.tour, vec![0]);
    assert_eq!(solution.cost, 0);

    let triangle = build_instance("Three", vec![(0.0, 0.0), (3.0, 0.0), (0.0, 4.0)]).unwrap();
    let solution = run_memetic_ga(&triangle, create_test_config()).unwrap();
    assert_eq!(solution.cost, 12);
}

#[test]
fn test_config_serialization() {
    let config = create_test_config()
        .with_stall_limit(40)
        .with_time_limit(Duration::from_secs(3));
    let json = config.to_json_string().unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);

    // Missing fields take their defaults
    let partial: Config = serde_json::from_str(r#"{"pop_size": 12}"#).unwrap();
    assert_eq!(partial.pop_size, 12);
    assert_eq!(partial.generations, Config::default().generations);
    assert_eq!(partial.local_search, LocalSearchSchedule::default());
}

#[test]
fn test_schedule_helpers() {
    let schedule = LocalSearchSchedule::default();
    assert!(schedule.is_due(10));
    assert!(!schedule.is_due(9));
    assert_eq!(schedule.polish_count(48), 14);
    assert_eq!(schedule.polish_count(2), 1);
    assert_eq!(schedule.polish_count(0), 0);

    let disabled = LocalSearchSchedule::disabled();
    assert!(!disabled.is_enabled());
    assert!(!disabled.is_due(10));

    assert_eq!(Config::new().with_pop_size(3).with_elitism(5).elite_count(), 3);
}
