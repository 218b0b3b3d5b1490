//! Command-line driver: runs the optimizers over TSPLIB instances and reports
//! per-instance statistics.

use clap::{Args, Parser, Subcommand};
use memetic_tsp::inver_over::{InverOver, InverOverConfig};
use memetic_tsp::local_search::LocalSearch;
use memetic_tsp::solution::Solution;
use memetic_tsp::utils::{append_summary_row, save_solution, RunStatistics};
use memetic_tsp::{
    Config, Crossover, Instance, Mutation, Neighborhood, ParentSelection, Result, StopSignal,
    Strategy,
};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "memetic-tsp", version, about = "Metaheuristics for TSPLIB EUC_2D instances")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Memetic genetic algorithm
    Ga(GaArgs),
    /// Local search from random starting tours
    LocalSearch(LocalSearchArgs),
    /// Inver-over evolutionary algorithm
    InverOver(InverOverArgs),
}

#[derive(Args)]
struct SuiteArgs {
    /// TSPLIB .tsp files
    #[arg(required = true)]
    instances: Vec<PathBuf>,
    /// Runs per instance
    #[arg(long, default_value_t = 5)]
    runs: usize,
    /// Base seed; run r uses seed + r
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Append summary rows to this results file
    #[arg(long)]
    out: Option<PathBuf>,
    /// Write the best tour of each instance into this directory
    #[arg(long)]
    tour_dir: Option<PathBuf>,
    /// Wall-clock limit per run, in seconds
    #[arg(long)]
    time_limit_secs: Option<u64>,
}

#[derive(Args)]
struct GaArgs {
    #[command(flatten)]
    suite: SuiteArgs,
    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    pop: Option<usize>,
    #[arg(long)]
    gens: Option<usize>,
    /// OX | PMX | CX | ERX
    #[arg(long)]
    crossover: Option<Crossover>,
    /// insert | swap | inversion
    #[arg(long)]
    mutation: Option<Mutation>,
    #[arg(long)]
    mutation_rate: Option<f64>,
    /// tournament | roulette
    #[arg(long)]
    selection: Option<ParentSelection>,
    #[arg(long)]
    tournament_k: Option<usize>,
    #[arg(long)]
    tournament_p: Option<f64>,
    #[arg(long)]
    elitism_k: Option<usize>,
    /// Run local search every N generations (0 disables)
    #[arg(long)]
    ls_every: Option<usize>,
    /// Fraction of children to polish
    #[arg(long)]
    ls_frac: Option<f64>,
    /// 2-opt window ahead of the first cut point
    #[arg(long)]
    span2opt: Option<usize>,
    /// Accepted-move cap per polished child
    #[arg(long)]
    max_improves: Option<usize>,
    /// Stop after N generations without improvement
    #[arg(long)]
    stall_limit: Option<usize>,
}

#[derive(Args)]
struct LocalSearchArgs {
    #[command(flatten)]
    suite: SuiteArgs,
    /// Neighborhoods to run: 2opt, exchange, jump
    #[arg(long, value_delimiter = ',', default_value = "jump,exchange,2opt")]
    neighborhoods: Vec<Neighborhood>,
    /// first | best
    #[arg(long, default_value = "first")]
    strategy: Strategy,
    #[arg(long, default_value_t = 20000)]
    max_improves: usize,
    /// 2-opt window ahead of the first cut point
    #[arg(long, default_value_t = 80)]
    span2opt: usize,
}

#[derive(Args)]
struct InverOverArgs {
    #[command(flatten)]
    suite: SuiteArgs,
    #[arg(long, default_value_t = 50)]
    pop: usize,
    #[arg(long, default_value_t = 20000)]
    gens: usize,
    /// Probability of a random inversion target
    #[arg(long, default_value_t = 0.02)]
    p: f64,
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Command::Ga(args) => run_ga(args),
        Command::LocalSearch(args) => run_local_search(args),
        Command::InverOver(args) => run_inver_over(args),
    };

    if let Err(e) = result {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn ga_config(args: &GaArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };

    if let Some(v) = args.pop {
        config.pop_size = v;
    }
    if let Some(v) = args.gens {
        config.generations = v;
    }
    if let Some(v) = args.crossover {
        config.crossover = v;
    }
    if let Some(v) = args.mutation {
        config.mutation = v;
    }
    if let Some(v) = args.mutation_rate {
        config.mutation_rate = v;
    }
    if let Some(v) = args.selection {
        config.parent_selection = v;
    }
    if let Some(v) = args.tournament_k {
        config.tournament_size = v;
    }
    if let Some(v) = args.tournament_p {
        config.tournament_pressure = v;
    }
    if let Some(v) = args.elitism_k {
        config.elitism = v;
    }
    if let Some(v) = args.ls_every {
        config.local_search.every = v;
    }
    if let Some(v) = args.ls_frac {
        config.local_search.fraction = v;
    }
    if let Some(v) = args.span2opt {
        config.local_search.window = Some(v);
    }
    if let Some(v) = args.max_improves {
        config.local_search.max_improves = Some(v);
    }
    if args.stall_limit.is_some() {
        config.stall_limit = args.stall_limit;
    }
    if let Some(secs) = args.suite.time_limit_secs {
        config.time_limit = Some(Duration::from_secs(secs));
    }

    config.validate()?;
    Ok(config)
}

fn run_ga(args: GaArgs) -> Result<()> {
    let config = ga_config(&args)?;
    let label = format!("memetic-{}-{}", config.crossover, config.mutation);

    for_each_instance(&args.suite, &label, |instance, seed| {
        memetic_tsp::run_memetic_ga(instance, config.clone().with_seed(seed))
    })
}

/// A fresh stop signal carrying the per-run time limit, if any.
fn run_stop_signal(suite: &SuiteArgs) -> StopSignal {
    match suite.time_limit_secs {
        Some(secs) => StopSignal::new().with_time_limit(Duration::from_secs(secs)),
        None => StopSignal::new(),
    }
}

fn run_local_search(args: LocalSearchArgs) -> Result<()> {
    for &neighborhood in &args.neighborhoods {
        let search = LocalSearch::new(neighborhood)
            .with_strategy(args.strategy)
            .with_max_improves(Some(args.max_improves))
            .with_window(Some(args.span2opt));
        let label = format!("{neighborhood}-{}", args.strategy);

        for_each_instance(&args.suite, &label, |instance, seed| {
            solve_local_search(&search, &args.suite, instance, seed)
        })?;
    }
    Ok(())
}

/// One local search run from a seeded random tour.
fn solve_local_search(
    search: &LocalSearch,
    suite: &SuiteArgs,
    instance: &Instance,
    seed: u64,
) -> Result<Solution> {
    let search = search.clone().with_stop_signal(run_stop_signal(suite));
    let start_time = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut tour: Vec<usize> = (0..instance.size()).collect();
    tour.shuffle(&mut rng);

    let outcome = search.run(instance, tour)?;
    log::debug!("  {} moves, {:?}", outcome.improves, outcome.termination);
    Ok(Solution::from_local_search(outcome, start_time.elapsed()))
}

fn run_inver_over(args: InverOverArgs) -> Result<()> {
    let config = InverOverConfig::default()
        .with_pop_size(args.pop)
        .with_generations(args.gens)
        .with_p(args.p);
    config.validate()?;

    for_each_instance(&args.suite, "inver-over", |instance, seed| {
        solve_inver_over(&config, &args.suite, instance, seed)
    })
}

fn solve_inver_over(
    config: &InverOverConfig,
    suite: &SuiteArgs,
    instance: &Instance,
    seed: u64,
) -> Result<Solution> {
    InverOver::new(instance, config.clone().with_seed(seed))?
        .with_stop_signal(run_stop_signal(suite))
        .run()
}

/// Load every instance, run `solve` once per seed and report the statistics.
fn for_each_instance<F>(suite: &SuiteArgs, label: &str, mut solve: F) -> Result<()>
where
    F: FnMut(&Instance, u64) -> Result<Solution>,
{
    for path in &suite.instances {
        let instance = match Instance::from_file(path) {
            Ok(instance) => instance,
            Err(e) => {
                log::warn!("skipping {}: {e}", path.display());
                continue;
            }
        };
        log::info!(
            "{} (n={}): {label}, {} runs",
            instance.name,
            instance.size(),
            suite.runs
        );

        let mut solutions = Vec::with_capacity(suite.runs);
        for run in 0..suite.runs {
            let solution = solve(&instance, suite.seed + run as u64)?;
            log::info!("  run {}/{}: {}", run + 1, suite.runs, solution);
            solutions.push(solution);
        }

        let Some(stats) = RunStatistics::from_solutions(&solutions) else {
            continue;
        };
        println!("{} {label}: {}", instance.name, stats.format());

        if let Some(out) = &suite.out {
            append_summary_row(out, &instance.name, label, &stats)?;
        }
        if let Some(dir) = &suite.tour_dir {
            if let Some(best) = solutions.iter().min_by_key(|s| s.cost) {
                save_tour(dir, &instance, label, best)?;
            }
        }
    }
    Ok(())
}

fn save_tour(dir: &Path, instance: &Instance, label: &str, best: &Solution) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{label}.tour", instance.name));
    save_solution(best, instance, &path)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memetic_tsp::solution::Termination;

    fn create_ring_instance() -> Instance {
        let coords: Vec<(f64, f64)> = (0..20)
            .map(|i| {
                let angle = i as f64 * std::f64::consts::TAU / 20.0;
                (100.0 * angle.cos(), 100.0 * angle.sin())
            })
            .collect();
        Instance::new("Ring20", coords).unwrap()
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_time_limit_stops_local_search() {
        let Command::LocalSearch(args) = parse(&[
            "memetic-tsp",
            "local-search",
            "--time-limit-secs",
            "0",
            "ring.tsp",
        ]) else {
            panic!("expected the local-search subcommand");
        };
        let instance = create_ring_instance();
        let search = LocalSearch::new(Neighborhood::TwoOpt).with_max_improves(Some(20000));

        let solution = solve_local_search(&search, &args.suite, &instance, 7).unwrap();
        assert_eq!(solution.termination, Termination::Stopped);
        assert!(solution.is_consistent(&instance));
    }

    #[test]
    fn test_local_search_reports_its_own_termination() {
        let Command::LocalSearch(args) = parse(&["memetic-tsp", "local-search", "ring.tsp"])
        else {
            panic!("expected the local-search subcommand");
        };
        let instance = create_ring_instance();

        let converged = solve_local_search(
            &LocalSearch::new(Neighborhood::TwoOpt),
            &args.suite,
            &instance,
            7,
        )
        .unwrap();
        assert_eq!(converged.termination, Termination::Converged);
        assert_eq!(converged.generations, 0);

        let capped = solve_local_search(
            &LocalSearch::new(Neighborhood::TwoOpt).with_max_improves(Some(1)),
            &args.suite,
            &instance,
            7,
        )
        .unwrap();
        assert_eq!(capped.termination, Termination::Capped);
    }

    #[test]
    fn test_time_limit_stops_inver_over() {
        let Command::InverOver(args) = parse(&[
            "memetic-tsp",
            "inver-over",
            "--time-limit-secs",
            "0",
            "ring.tsp",
        ]) else {
            panic!("expected the inver-over subcommand");
        };
        let instance = create_ring_instance();
        let config = InverOverConfig::default()
            .with_pop_size(args.pop)
            .with_generations(args.gens)
            .with_p(args.p);

        let solution = solve_inver_over(&config, &args.suite, &instance, 7).unwrap();
        assert_eq!(solution.termination, Termination::Stopped);
        assert!(solution.is_consistent(&instance));
    }
}
