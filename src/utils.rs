//! Utility functions for reporting results.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::problem::{Distance, Instance};
use crate::solution::Solution;

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Save a solution as a TSPLIB-style TOUR file (1-based node ids).
pub fn save_solution<P: AsRef<Path>>(
    solution: &Solution,
    instance: &Instance,
    path: P,
) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "NAME : {}.tour", instance.name)?;
    writeln!(file, "COMMENT : length {} ({})", solution.cost, solution.termination)?;
    writeln!(file, "TYPE : TOUR")?;
    writeln!(file, "DIMENSION : {}", solution.tour.len())?;
    writeln!(file, "TOUR_SECTION")?;
    for &node in &solution.tour {
        writeln!(file, "{}", node + 1)?;
    }
    writeln!(file, "-1")?;
    writeln!(file, "EOF")?;

    Ok(())
}

/// Append one `instance algorithm runs min mean stdev` row to a results file,
/// writing the header first when the file is new or empty.
pub fn append_summary_row<P: AsRef<Path>>(
    path: P,
    instance: &str,
    algorithm: &str,
    stats: &RunStatistics,
) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if file.metadata()?.len() == 0 {
        writeln!(file, "# instance  algorithm  runs  min  mean  stdev")?;
    }
    writeln!(
        file,
        "{} {} {} {} {:.2} {:.2}",
        instance, algorithm, stats.runs, stats.min, stats.mean, stats.stdev
    )
}

/// Summary of the best costs of repeated runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub runs: usize,
    pub min: Distance,
    pub max: Distance,
    pub mean: f64,
    /// Sample standard deviation (0 for a single run)
    pub stdev: f64,
    pub total_time: Duration,
}

impl RunStatistics {
    /// Summarize run results; `None` when there are none.
    pub fn from_solutions(solutions: &[Solution]) -> Option<Self> {
        let costs: Vec<Distance> = solutions.iter().map(|s| s.cost).collect();
        let mut stats = Self::from_costs(&costs)?;
        stats.total_time = solutions.iter().map(|s| s.run_time).sum();
        Some(stats)
    }

    /// Summarize raw costs; `None` when there are none.
    pub fn from_costs(costs: &[Distance]) -> Option<Self> {
        let runs = costs.len();
        let min = *costs.iter().min()?;
        let max = *costs.iter().max()?;
        let mean = costs.iter().sum::<Distance>() as f64 / runs as f64;
        let stdev = if runs > 1 {
            let var = costs
                .iter()
                .map(|&c| (c as f64 - mean).powi(2))
                .sum::<f64>()
                / (runs - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };

        Some(RunStatistics {
            runs,
            min,
            max,
            mean,
            stdev,
            total_time: Duration::from_secs(0),
        })
    }

    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "runs={} min={} max={} mean={:.2} stdev={:.2} time={}",
            self.runs,
            self.min,
            self.max,
            self.mean,
            self.stdev,
            format_duration(self.total_time)
        )
    }
}
