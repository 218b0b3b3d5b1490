//! Tests for the inver-over optimizer.

use memetic_tsp::inver_over::{InverOver, InverOverConfig};
use memetic_tsp::population::Population;
use memetic_tsp::problem::Instance;
use memetic_tsp::solution::Termination;
use memetic_tsp::stop::StopSignal;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Creates `n` cities evenly spaced on a circle.
fn create_circle_instance(n: usize) -> Instance {
    let coords: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / n as f64;
            (200.0 * angle.cos(), 200.0 * angle.sin())
        })
        .collect();
    Instance::new(format!("Circle{n}"), coords).unwrap()
}

fn create_test_config() -> InverOverConfig {
    InverOverConfig::default()
        .with_pop_size(20)
        .with_generations(200)
        .with_seed(3)
}

#[test]
fn test_default_config() {
    let config = InverOverConfig::default();
    assert_eq!(config.pop_size, 50);
    assert_eq!(config.generations, 20000);
    assert!((config.p - 0.02).abs() < 1e-12);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_config() {
    let instance = create_circle_instance(10);
    assert!(InverOver::new(&instance, create_test_config().with_pop_size(0)).is_err());
    assert!(InverOver::new(&instance, create_test_config().with_p(1.5)).is_err());
    assert!(InverOver::new(&instance, create_test_config().with_p(-0.1)).is_err());
}

#[test]
fn test_solution_is_valid_and_improves() {
    let instance = create_circle_instance(15);
    let config = create_test_config();

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let initial = Population::random(&instance, config.pop_size, &mut rng).unwrap();

    let solution = InverOver::new(&instance, config).unwrap().run().unwrap();
    assert!(solution.is_consistent(&instance));
    assert!(solution.cost < initial.best().cost());
    assert_eq!(solution.generations, 200);
    assert_eq!(solution.termination, Termination::Generations);
}

#[test]
fn test_deterministic_for_seed() {
    let instance = create_circle_instance(12);

    let a = InverOver::new(&instance, create_test_config()).unwrap().run().unwrap();
    let b = InverOver::new(&instance, create_test_config()).unwrap().run().unwrap();

    assert_eq!(a.tour, b.tour);
    assert_eq!(a.cost, b.cost);
}

#[test]
fn test_random_inversions_only() {
    // p = 1 never consults the population
    let instance = create_circle_instance(10);
    let config = create_test_config().with_p(1.0).with_generations(50);

    let solution = InverOver::new(&instance, config).unwrap().run().unwrap();
    assert!(solution.is_consistent(&instance));
}

#[test]
fn test_zero_generations_and_tiny_instances() {
    let instance = create_circle_instance(10);
    let config = create_test_config().with_generations(0);

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let initial = Population::random(&instance, config.pop_size, &mut rng).unwrap();

    let solution = InverOver::new(&instance, config).unwrap().run().unwrap();
    assert_eq!(solution.cost, initial.best().cost());
    assert_eq!(solution.generations, 0);

    let triangle = Instance::new("Three", vec![(0.0, 0.0), (3.0, 0.0), (0.0, 4.0)]).unwrap();
    let solution = InverOver::new(&triangle, create_test_config())
        .unwrap()
        .run()
        .unwrap();
    assert_eq!(solution.cost, 12);
    assert_eq!(solution.generations, 0);
}

#[test]
fn test_stop_signal() {
    let instance = create_circle_instance(10);
    let stop = StopSignal::new();
    stop.stop();

    let solution = InverOver::new(&instance, create_test_config())
        .unwrap()
        .with_stop_signal(stop)
        .run()
        .unwrap();
    assert_eq!(solution.termination, Termination::Stopped);
    assert_eq!(solution.generations, 0);
    assert!(solution.is_consistent(&instance));
}
