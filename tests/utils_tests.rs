//! Unit tests for the reporting helpers.

use memetic_tsp::local_search::{LocalSearchOutcome, LocalSearchTermination};
use memetic_tsp::problem::Instance;
use memetic_tsp::solution::{Solution, Termination};
use memetic_tsp::utils::{append_summary_row, format_duration, save_solution, RunStatistics};
use std::path::PathBuf;
use std::time::Duration;

fn create_test_instance() -> Instance {
    Instance::new(
        "TestInstance",
        vec![(0.0, 0.0), (30.0, 0.0), (30.0, 40.0), (0.0, 40.0)],
    )
    .unwrap()
}

fn create_test_solution(cost: i64, secs: u64) -> Solution {
    Solution {
        tour: vec![0, 1, 2, 3],
        cost,
        generations: 10,
        termination: Termination::Generations,
        run_time: Duration::from_secs(secs),
    }
}

/// A fresh path under the system temp directory.
fn temp_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir()
        .join(format!("memetic_tsp_utils_{}", std::process::id()))
        .join(name);
    let _ = std::fs::remove_file(&path);
    path
}

#[test]
fn test_format_duration() {
    assert_eq!(format_duration(Duration::from_secs(0)), "0h 00m 00s");
    assert_eq!(format_duration(Duration::from_secs(59)), "0h 00m 59s");
    assert_eq!(format_duration(Duration::from_secs(3661)), "1h 01m 01s");
    assert_eq!(format_duration(Duration::from_millis(125_900)), "0h 02m 05s");
}

#[test]
fn test_run_statistics() {
    let stats = RunStatistics::from_costs(&[10, 12, 14]).unwrap();
    assert_eq!(stats.runs, 3);
    assert_eq!(stats.min, 10);
    assert_eq!(stats.max, 14);
    assert!((stats.mean - 12.0).abs() < 1e-9);
    assert!((stats.stdev - 2.0).abs() < 1e-9);

    let single = RunStatistics::from_costs(&[7]).unwrap();
    assert_eq!(single.stdev, 0.0);

    assert!(RunStatistics::from_costs(&[]).is_none());
    assert!(RunStatistics::from_solutions(&[]).is_none());

    let solutions = vec![create_test_solution(140, 2), create_test_solution(150, 3)];
    let stats = RunStatistics::from_solutions(&solutions).unwrap();
    assert_eq!(stats.min, 140);
    assert_eq!(stats.total_time, Duration::from_secs(5));
    assert!(stats.format().contains("min=140"));
}

#[test]
fn test_save_solution() {
    let instance = create_test_instance();
    let solution = create_test_solution(140, 1);
    let path = temp_path("square.tour");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();

    save_solution(&solution, &instance, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "NAME : TestInstance.tour");
    assert!(lines.contains(&"TYPE : TOUR"));
    assert!(lines.contains(&"DIMENSION : 4"));
    let section = lines.iter().position(|l| *l == "TOUR_SECTION").unwrap();
    assert_eq!(&lines[section + 1..section + 5], &["1", "2", "3", "4"]);
    assert_eq!(lines[section + 5], "-1");
    assert_eq!(lines[section + 6], "EOF");

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_append_summary_row() {
    let path = temp_path("nested/results.txt");
    let stats = RunStatistics::from_costs(&[100, 110]).unwrap();

    append_summary_row(&path, "eil51", "2opt-first", &stats).unwrap();
    append_summary_row(&path, "st70", "2opt-first", &stats).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with('#'));
    assert!(lines[1].starts_with("eil51 2opt-first 2 100 105.00"));
    assert!(lines[2].starts_with("st70 "));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_solution_helpers() {
    let instance = create_test_instance();
    let solution = create_test_solution(140, 1);
    assert!(solution.is_consistent(&instance));

    let wrong_cost = create_test_solution(100, 1);
    assert!(!wrong_cost.is_consistent(&instance));

    let json = solution.to_json_string().unwrap();
    let parsed: Solution = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, solution);

    assert_eq!(
        solution.to_string(),
        "cost 140 after 10 generations (generation limit)"
    );
}

#[test]
fn test_solution_from_local_search() {
    let instance = create_test_instance();
    let outcome = LocalSearchOutcome {
        tour: vec![0, 1, 2, 3],
        cost: 140,
        improves: 6,
        termination: LocalSearchTermination::Capped,
    };

    let solution = Solution::from_local_search(outcome.clone(), Duration::from_secs(1));
    assert!(solution.is_consistent(&instance));
    assert_eq!(solution.generations, 0);
    assert_eq!(solution.termination, Termination::Capped);
    assert_eq!(solution.to_string(), "cost 140 (move cap)");

    let converged = LocalSearchOutcome {
        termination: LocalSearchTermination::Converged,
        ..outcome.clone()
    };
    let solution = Solution::from_local_search(converged, Duration::ZERO);
    assert_eq!(solution.termination, Termination::Converged);
    assert_eq!(solution.to_string(), "cost 140 (local optimum)");

    let stopped = LocalSearchOutcome {
        termination: LocalSearchTermination::Stopped,
        ..outcome
    };
    assert_eq!(
        Solution::from_local_search(stopped, Duration::ZERO).termination,
        Termination::Stopped
    );
}
