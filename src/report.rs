use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::solver::{SolveResult, Strategy};

/// Result file for one strategy run over one puzzle.
#[derive(Debug)]
pub struct Report<'a> {
    pub strategy: Strategy,
    pub result: &'a SolveResult,
    pub elapsed: Duration,
    pub memory_mb: f64,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.strategy)?;
        match self.result {
            SolveResult::Solved(solution) => {
                writeln!(
                    f,
                    "Steps: {}, Weight: {}, Node: {}, Time (ms): {:.2}, Memory (MB): {:.2}",
                    solution.steps(),
                    solution.cost,
                    solution.nodes_expanded,
                    self.elapsed.as_secs_f64() * 1000.0,
                    self.memory_mb
                )?;
                writeln!(f, "{}", solution)
            }
            SolveResult::Cutoff | SolveResult::Impossible => writeln!(f, "No solution found"),
        }
    }
}

/// Write `report` to `<dir>/<strategy dir>/<stem>.txt`, creating directories
/// as needed.
pub fn write_report(dir: &Path, stem: &str, report: &Report<'_>) -> io::Result<PathBuf> {
    let dir = dir.join(report.strategy.dir_name());
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("{}.txt", stem));
    fs::write(&path, report.to_string())?;
    Ok(path)
}

/// Convert a byte count such as [`Solver::memory_bytes`] to megabytes.
///
/// [`Solver::memory_bytes`]: crate::solver::Solver::memory_bytes
pub fn megabytes(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Peak resident set size of this process in megabytes, or 0 where the
/// kernel does not expose it.
pub fn peak_memory_mb() -> f64 {
    fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| parse_vm_hwm(&status))
        .map_or(0.0, |kb| kb as f64 / 1024.0)
}

fn parse_vm_hwm(status: &str) -> Option<u64> {
    status
        .lines()
        .find_map(|line| line.strip_prefix("VmHWM:"))
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|kb| kb.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Direction;
    use crate::solution::Solution;
    use crate::transition::Move;

    fn solved() -> SolveResult {
        SolveResult::Solved(Solution {
            moves: vec![
                Move::walk(Direction::Down),
                Move::push(Direction::Right),
                Move::walk(Direction::Up),
                Move::walk(Direction::Right),
                Move::push(Direction::Down),
            ],
            cost: 10,
            nodes_expanded: 41,
        })
    }

    #[test]
    fn test_solved_report() {
        let result = solved();
        let report = Report {
            strategy: Strategy::UniformCost,
            result: &result,
            elapsed: Duration::from_micros(1500),
            memory_mb: 3.0,
        };
        assert_eq!(
            report.to_string(),
            "UCS\nSteps: 5, Weight: 10, Node: 41, Time (ms): 1.50, Memory (MB): 3.00\ndRurD\n"
        );
    }

    #[test]
    fn test_unsolved_report() {
        for result in [SolveResult::Impossible, SolveResult::Cutoff] {
            let report = Report {
                strategy: Strategy::AStar,
                result: &result,
                elapsed: Duration::ZERO,
                memory_mb: 0.0,
            };
            assert_eq!(report.to_string(), "A*\nNo solution found\n");
        }
    }

    #[test]
    fn test_write_report() {
        let dir = std::env::temp_dir().join(format!("ares-report-{}", std::process::id()));
        let result = solved();
        let report = Report {
            strategy: Strategy::AStar,
            result: &result,
            elapsed: Duration::ZERO,
            memory_mb: 0.0,
        };

        let path = write_report(&dir, "input-01", &report).unwrap();
        assert_eq!(path, dir.join("A").join("input-01.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), report.to_string());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_megabytes() {
        assert_eq!(megabytes(0), 0.0);
        assert_eq!(megabytes(3 * 1024 * 1024 + 512 * 1024), 3.5);
    }

    #[test]
    fn test_parse_vm_hwm() {
        let status = "Name:\tares\nVmPeak:\t  10000 kB\nVmHWM:\t    2048 kB\nVmRSS:\t 1024 kB\n";
        assert_eq!(parse_vm_hwm(status), Some(2048));
        assert_eq!(parse_vm_hwm("Name:\tares\n"), None);
        assert!(peak_memory_mb() >= 0.0);
    }
}
