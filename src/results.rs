//! Batch results: a (run, iteration) table filled in by the search, and the
//! statistics computed over it once every run has finished.

use crate::error::AcoResult;
use crate::utils::{mean, sample_std_dev};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const BEST_COUPLING_FILE_NAME: &str = "BestCoupling.dat";
const BEST_NAC_FILE_NAME: &str = "BestNAC.dat";
const BEST_ATMR_FILE_NAME: &str = "BestATMR.dat";
const BEST_COMBINED_FILE_NAME: &str = "BestCOMBINED.dat";
const RETRIES_ATTEMPTS_FILE_NAME: &str = "RetriesAttempts.dat";
const INTERFERENCE_FILE_NAME: &str = "Interference.dat";
const RESULTS_JSON_FILE_NAME: &str = "results.json";

/// Everything reported for one iteration of one run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct IterationRecord {
    /// Best values in this iteration's colony
    pub best_cbo: f64,
    pub best_nac: f64,
    pub best_atmr: f64,
    pub best_combined: f64,
    pub average_cbo: f64,
    pub retries: usize,
    pub average_attempts: f64,
    pub invalids: usize,
    pub antipheromone_applied: bool,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub max_invalids: usize,
    /// Percentage in [0, 100]
    pub interference: f64,
    pub average_iteration_ms: f64,
    pub run_time_sec: f64,
}

/// Receives results while the search runs; never read back during the search.
pub trait ResultsSink {
    fn record_iteration(&mut self, run: usize, iteration: usize, record: &IterationRecord);

    fn record_run(&mut self, run: usize, summary: &RunSummary);
}

pub struct BatchResults {
    number_of_iterations: usize,
    number_of_runs: usize,
    /// [run][iteration]
    table: Vec<Vec<IterationRecord>>,
    runs: Vec<RunSummary>,
}

impl ResultsSink for BatchResults {
    fn record_iteration(&mut self, run: usize, iteration: usize, record: &IterationRecord) {
        self.table[run][iteration] = record.clone();
    }

    fn record_run(&mut self, run: usize, summary: &RunSummary) {
        self.runs[run] = summary.clone();
    }
}

/// Best value of one objective within a run, and the iteration it first appeared.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BestFound {
    pub value: f64,
    pub iteration: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunBest {
    pub run: usize,
    pub cbo: BestFound,
    pub nac: BestFound,
    pub combined: BestFound,
    pub max_invalids: usize,
    pub interference: f64,
    pub run_time_sec: f64,
}

/// Mean and sample standard deviation over runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub sd: f64,
}

impl Spread {
    fn of(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            sd: sample_std_dev(values),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationAggregate {
    pub iteration: usize,
    pub best_cbo: Spread,
    pub best_nac: Spread,
    pub best_atmr: Spread,
    pub best_combined: Spread,
    pub retries: Spread,
    pub average_attempts: Spread,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FinalResults {
    pub runs: Vec<RunBest>,
    pub iterations: Vec<IterationAggregate>,
    pub mean_interference: f64,
}

impl BatchResults {
    pub fn new(number_of_iterations: usize, number_of_runs: usize) -> Self {
        assert!(number_of_iterations > 0);
        assert!(number_of_runs > 0);
        Self {
            number_of_iterations,
            number_of_runs,
            table: vec![vec![IterationRecord::default(); number_of_iterations]; number_of_runs],
            runs: vec![RunSummary::default(); number_of_runs],
        }
    }

    pub fn number_of_iterations(&self) -> usize {
        self.number_of_iterations
    }

    pub fn number_of_runs(&self) -> usize {
        self.number_of_runs
    }

    pub fn record(&self, run: usize, iteration: usize) -> &IterationRecord {
        &self.table[run][iteration]
    }

    pub fn run(&self, run: usize) -> &RunSummary {
        &self.runs[run]
    }

    pub fn run_records(&self, run: usize) -> &[IterationRecord] {
        &self.table[run]
    }

    pub fn max_invalids(&self) -> usize {
        self.runs.iter().map(|r| r.max_invalids).max().unwrap_or(0)
    }

    pub fn calculate_final_results(&self) -> FinalResults {
        let runs = self
            .table
            .iter()
            .zip(&self.runs)
            .enumerate()
            .map(|(run, (records, summary))| RunBest {
                run,
                cbo: best_found(records, |r| r.best_cbo),
                nac: best_found(records, |r| r.best_nac),
                combined: best_found(records, |r| r.best_combined),
                max_invalids: summary.max_invalids,
                interference: summary.interference,
                run_time_sec: summary.run_time_sec,
            })
            .collect();

        let iterations = (0..self.number_of_iterations())
            .map(|iteration| {
                let column = |field: fn(&IterationRecord) -> f64| -> Spread {
                    let values: Vec<f64> = (0..self.number_of_runs())
                        .map(|run| field(self.record(run, iteration)))
                        .collect();
                    Spread::of(&values)
                };
                IterationAggregate {
                    iteration,
                    best_cbo: column(|r| r.best_cbo),
                    best_nac: column(|r| r.best_nac),
                    best_atmr: column(|r| r.best_atmr),
                    best_combined: column(|r| r.best_combined),
                    retries: column(|r| r.retries as f64),
                    average_attempts: column(|r| r.average_attempts),
                }
            })
            .collect();

        let interference: Vec<f64> = self.runs.iter().map(|r| r.interference).collect();

        FinalResults {
            runs,
            iterations,
            mean_interference: mean(&interference),
        }
    }

    /// Writes the `.dat` series and a JSON dump of the final results into `dir`.
    pub fn write_results(&self, dir: &Path) -> AcoResult<FinalResults> {
        fs::create_dir_all(dir)?;
        let results = self.calculate_final_results();

        let series: [(&str, fn(&IterationAggregate) -> Spread); 4] = [
            (BEST_COUPLING_FILE_NAME, |a| a.best_cbo),
            (BEST_NAC_FILE_NAME, |a| a.best_nac),
            (BEST_ATMR_FILE_NAME, |a| a.best_atmr),
            (BEST_COMBINED_FILE_NAME, |a| a.best_combined),
        ];
        for (name, field) in series {
            let mut out = BufWriter::new(File::create(dir.join(name))?);
            for aggregate in &results.iterations {
                let spread = field(aggregate);
                writeln!(out, "{} {:.3} {:.3}", aggregate.iteration, spread.mean, spread.sd)?;
            }
            out.flush()?;
        }

        let mut out = BufWriter::new(File::create(dir.join(RETRIES_ATTEMPTS_FILE_NAME))?);
        for aggregate in &results.iterations {
            writeln!(
                out,
                "{} {:.3} {:.3} {:.3} {:.3}",
                aggregate.iteration,
                aggregate.retries.mean,
                aggregate.retries.sd,
                aggregate.average_attempts.mean,
                aggregate.average_attempts.sd
            )?;
        }
        out.flush()?;

        let mut out = BufWriter::new(File::create(dir.join(INTERFERENCE_FILE_NAME))?);
        for run in &results.runs {
            writeln!(
                out,
                "{} {:.3} {} {:.3}",
                run.run, run.interference, run.max_invalids, run.run_time_sec
            )?;
        }
        out.flush()?;

        let json = serde_json::to_string_pretty(&results)?;
        fs::write(dir.join(RESULTS_JSON_FILE_NAME), json)?;

        Ok(results)
    }
}

// strict `<`, so the earliest iteration reaching the minimum is reported
fn best_found(records: &[IterationRecord], field: impl Fn(&IterationRecord) -> f64) -> BestFound {
    let mut best = BestFound {
        value: f64::INFINITY,
        iteration: 0,
    };
    for (iteration, record) in records.iter().enumerate() {
        let value = field(record);
        if value < best.value {
            best = BestFound { value, iteration };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(best_cbo: f64, retries: usize) -> IterationRecord {
        IterationRecord {
            best_cbo,
            best_nac: best_cbo * 2.0,
            best_combined: best_cbo + 0.1,
            retries,
            average_attempts: retries as f64 * 1.5,
            ..Default::default()
        }
    }

    fn filled() -> BatchResults {
        let mut results = BatchResults::new(3, 2);
        for (iteration, cbo) in [0.5, 0.3, 0.3].into_iter().enumerate() {
            results.record_iteration(0, iteration, &record(cbo, 2));
        }
        for (iteration, cbo) in [0.7, 0.6, 0.2].into_iter().enumerate() {
            results.record_iteration(1, iteration, &record(cbo, 4));
        }
        results.record_run(
            0,
            &RunSummary {
                max_invalids: 1,
                interference: 20.0,
                ..Default::default()
            },
        );
        results.record_run(
            1,
            &RunSummary {
                max_invalids: 3,
                interference: 40.0,
                ..Default::default()
            },
        );
        results
    }

    #[test]
    fn test_final_results_best_per_run() {
        let results = filled().calculate_final_results();
        assert_eq!(results.runs[0].cbo, BestFound { value: 0.3, iteration: 1 });
        assert_eq!(results.runs[1].cbo, BestFound { value: 0.2, iteration: 2 });
        assert_eq!(results.runs[1].max_invalids, 3);
        assert_eq!(results.mean_interference, 30.0);
    }

    #[test]
    fn test_final_results_per_iteration_spread() {
        let results = filled().calculate_final_results();
        let first = &results.iterations[0];
        assert!((first.best_cbo.mean - 0.6).abs() < 1e-12);
        assert_eq!(first.retries.mean, 3.0);
        assert!((first.retries.sd - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(first.average_attempts.mean, 4.5);
    }

    #[test]
    fn test_write_results_creates_series_files() {
        let dir = std::env::temp_dir().join(format!("aco_design_results_{}", std::process::id()));
        let results = filled();
        results.write_results(&dir).unwrap();

        let coupling = fs::read_to_string(dir.join(BEST_COUPLING_FILE_NAME)).unwrap();
        assert_eq!(coupling.lines().count(), 3);
        assert!(coupling.starts_with("0 0.600 "));
        let interference = fs::read_to_string(dir.join(INTERFERENCE_FILE_NAME)).unwrap();
        assert_eq!(interference.lines().next(), Some("0 20.000 1 0.000"));
        assert!(dir.join(RESULTS_JSON_FILE_NAME).exists());
        assert_eq!(results.max_invalids(), 3);

        let _ = fs::remove_dir_all(&dir);
    }
}
