//! Basic example of using the memetic-tsp library.

use memetic_tsp::config::Config;
use memetic_tsp::local_search::{LocalSearch, Neighborhood, Strategy};
use memetic_tsp::problem::Instance;
use memetic_tsp::utils::{format_duration, save_solution};
use std::env;
use std::time::{Duration, Instant};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Get instance path from command line or use default
    let args: Vec<String> = env::args().collect();
    let instance_path = if args.len() > 1 {
        &args[1]
    } else {
        "instances/eil51.tsp"
    };

    // Load instance
    println!("Loading instance from: {}", instance_path);
    let instance = Instance::from_file(instance_path)?;
    println!("Loaded instance: {} with {} cities", instance.name, instance.size());

    // Configure algorithm
    let config = Config::new()
        .with_pop_size(50)
        .with_generations(2000)
        .with_elitism(2)
        .with_stall_limit(300)
        .with_time_limit(Duration::from_secs(60));

    // Run the memetic GA
    let mut algorithm = memetic_tsp::MemeticAlgorithm::new(&instance, config)?;
    println!("Starting search (time limit: 60s)");
    let start_time = Instant::now();
    let solution = algorithm.run()?;
    let runtime = start_time.elapsed();

    println!("Search completed in {}", format_duration(runtime));
    println!("Best tour length: {}", solution.cost);
    println!("Stopped by: {}", solution.termination);

    // A final best-improvement 2-opt pass over the whole tour
    let polished = LocalSearch::new(Neighborhood::TwoOpt)
        .with_strategy(Strategy::Best)
        .run(&instance, solution.tour.clone())?;
    println!(
        "After 2-opt polish: {} ({} moves)",
        polished.cost, polished.improves
    );

    // Save solution
    let output_path = format!("{}.tour", instance.name);
    println!("Saving solution to: {}", output_path);
    save_solution(&solution, &instance, &output_path)?;

    Ok(())
}
