//! Batch driver: runs the search over a problem for one or more antipheromone
//! phase thresholds and writes the results of each sweep step to its own directory.

use acodesign::utils::log_run_to_csv;
use acodesign::{AcoStruct, AlgorithmParameters, DesignProblem};
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "aco_batch", about = "Ant colony search for software designs")]
struct Args {
    /// Design problem JSON file
    problem: PathBuf,

    /// Algorithm parameters JSON file, defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory receiving the result files
    #[arg(short, long, default_value = "aco_output")]
    output: PathBuf,

    #[arg(long)]
    runs: Option<usize>,

    #[arg(long)]
    iterations: Option<usize>,

    #[arg(long)]
    ants: Option<usize>,

    /// Antipheromone phase thresholds (percent) to sweep, e.g. 0,1,2,3,4
    #[arg(long, value_delimiter = ',')]
    thresholds: Vec<u32>,

    /// CSV file receiving one summary line per sweep step
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut params = match &args.config {
        Some(path) => AlgorithmParameters::from_json(&path.to_string_lossy())
            .with_context(|| format!("failed to load parameters from {}", path.display()))?,
        None => AlgorithmParameters::default(),
    };
    if let Some(runs) = args.runs {
        params.number_of_runs = runs;
    }
    if let Some(iterations) = args.iterations {
        params.number_of_iterations = iterations;
    }
    if let Some(ants) = args.ants {
        params.number_of_ants = ants;
    }

    let thresholds = if args.thresholds.is_empty() {
        vec![params.antipheromone_phase_threshold_percentage]
    } else {
        args.thresholds.clone()
    };

    info!("selected path for output files is: {}", args.output.display());

    for threshold in thresholds {
        let problem = DesignProblem::from_json(&args.problem.to_string_lossy())
            .with_context(|| format!("failed to load problem from {}", args.problem.display()))?;
        let step_params = AlgorithmParameters {
            antipheromone_phase_threshold_percentage: threshold,
            ..params.clone()
        };
        info!(
            "******* AP threshold is: {}%, reduction is: {:?}, ants: {}, iterations: {} *******",
            threshold,
            step_params.antipheromone_reduction,
            step_params.number_of_ants,
            step_params.number_of_iterations
        );

        let mut model = AcoStruct::new(problem, step_params).context("invalid search setup")?;
        let (metrics, results) = model.run_model()?;

        let dir = args.output.join(format!("threshold_{threshold}"));
        results
            .write_results(&dir)
            .with_context(|| format!("failed to write results to {}", dir.display()))?;
        model.to_json(&dir.join("best_design.json").to_string_lossy())?;

        if let Some(csv) = &args.csv {
            log_run_to_csv(
                &csv.to_string_lossy(),
                model.problem.number_of_vertices(),
                model.problem.number_of_classes(),
                metrics.ants,
                metrics.iterations,
                metrics.runs,
                metrics.best_fitness.map_or(f64::NAN, |f| f.combined),
                metrics.mean_interference,
                metrics.max_invalids,
            )?;
        }
    }

    info!("batch ACO complete");
    Ok(())
}
