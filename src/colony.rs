use crate::archive::EliteArchive;
use crate::config::AlgorithmParameters;
use crate::construction::{ConstructionEngine, ConstructionStats};
use crate::error::{AcoError, AcoResult};
use crate::fitness::{DesignFitness, FitnessEvaluator};
use crate::heuristics::HeuristicInformation;
use crate::interference::investigate_interference;
use crate::pheromone::{self, AlphaMatrix, PheromoneMatrix, UpdateReport};
use crate::problem::DesignProblem;
use crate::ranking::{ColonyRanking, IterationStats};
use crate::results::{BatchResults, IterationRecord, ResultsSink, RunSummary};
use crate::structs::{AcoMetrics, Path, SolutionOutput};
use crate::utils::print_design_summary;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::time::Instant;

/// State owned by a single run; created fresh for every run.
pub struct RunState {
    pub run_index: usize,
    pub pheromones: PheromoneMatrix,
    pub archive: EliteArchive,
    pub max_invalids: usize,
    pub last_ranking: Option<ColonyRanking>,
}

/// What happened in one iteration, as seen by the caller.
#[derive(Debug)]
pub struct IterationOutcome {
    pub colony_size: usize,
    /// Archive size when the elitist replace step began
    pub archive_size_before_replace: usize,
    pub elites_injected: usize,
    pub stats: IterationStats,
    pub construction: ConstructionStats,
    pub update: UpdateReport,
    pub record: IterationRecord,
}

pub struct AcoStruct {
    pub problem: DesignProblem,
    pub params: AlgorithmParameters,
    heuristics: HeuristicInformation,
    evaluator: Box<dyn FitnessEvaluator>,
    rng: StdRng,
    best_path: Option<Path>,
}

impl AcoStruct {
    pub fn new(problem: DesignProblem, params: AlgorithmParameters) -> AcoResult<Self> {
        params.validate()?;
        if params.constraint_handling && !problem.can_satisfy_constraints() {
            return Err(AcoError::config(format!(
                "{} attributes and {} methods cannot fill {} classes, constraint handling would never finish",
                problem.number_of_attributes(),
                problem.number_of_methods(),
                problem.number_of_classes()
            )));
        }

        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let heuristics = HeuristicInformation::set_up(&problem);
        let evaluator = Box::new(DesignFitness::new(params.weights));

        Ok(Self {
            problem,
            params,
            heuristics,
            evaluator,
            rng,
            best_path: None,
        })
    }

    pub fn with_evaluator(mut self, evaluator: impl FitnessEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_heuristics(mut self, heuristics: HeuristicInformation) -> AcoResult<Self> {
        if heuristics.vertices() != self.problem.number_of_vertices()
            || heuristics.classes() != self.problem.number_of_classes()
        {
            return Err(AcoError::config(format!(
                "heuristic table is {} x {}, problem is {} x {}",
                heuristics.vertices(),
                heuristics.classes(),
                self.problem.number_of_vertices(),
                self.problem.number_of_classes()
            )));
        }
        self.heuristics = heuristics;
        Ok(self)
    }

    /// Best Combined path seen over every run so far.
    pub fn best_path(&self) -> Option<&Path> {
        self.best_path.as_ref()
    }

    pub fn start_run(&self, run_index: usize) -> RunState {
        RunState {
            run_index,
            pheromones: PheromoneMatrix::new(&self.problem, &self.params),
            archive: EliteArchive::new(),
            max_invalids: 0,
            last_ranking: None,
        }
    }

    pub fn run_iteration(
        &mut self,
        state: &mut RunState,
        iteration: usize,
    ) -> AcoResult<IterationOutcome> {
        let before = Instant::now();

        let alpha = AlphaMatrix::new(&state.pheromones, self.params.alpha);

        let engine = ConstructionEngine::new(&self.problem, &self.heuristics, &self.params);
        let (mut colony, construction) = engine.generate_colony(&alpha, &mut self.rng)?;

        let archive_size_before_replace = state.archive.len();
        let elites_injected = if self.params.replacement_elitism {
            state.archive.replace_into(&mut colony, &mut self.rng)
        } else {
            0
        };

        assert_eq!(colony.len(), self.params.number_of_ants);
        for path in colony.iter_mut() {
            assert!(self.problem.fits(path), "colony path does not fit the problem");
            let evaluation = self.evaluator.evaluate(path, &self.problem);
            path.stamp(evaluation);
        }

        let ranking = ColonyRanking::rank(&mut colony);
        let stats = ranking.stats.clone();
        state.max_invalids = state.max_invalids.max(stats.invalid_count);

        let update = pheromone::update(&mut state.pheromones, &ranking, &self.params, iteration);

        if self.params.replacement_elitism {
            state
                .archive
                .refresh(&colony, self.params.objectives, self.params.atmr_elitism);
        }

        let iteration_best = &colony[0];
        let improved = self
            .best_path
            .as_ref()
            .map_or(true, |best| iteration_best.combined() < best.combined());
        if improved {
            self.best_path = Some(iteration_best.clone());
        }

        let record = IterationRecord {
            best_cbo: stats.best_cbo.value,
            best_nac: stats.best_nac.value,
            best_atmr: stats.best_atmr.value,
            best_combined: stats.best_combined.value,
            average_cbo: stats.average_cbo,
            retries: construction.retries,
            average_attempts: construction.average_attempts,
            invalids: stats.invalid_count,
            antipheromone_applied: update.antipheromone_applied,
            elapsed_ms: before.elapsed().as_secs_f64() * 1000.0,
        };

        debug!(
            "run {} iteration {}: best CBO {:.4}, best NAC {:.4}, best combined {:.4}, retries {}",
            state.run_index,
            iteration,
            record.best_cbo,
            record.best_nac,
            record.best_combined,
            record.retries
        );

        let colony_size = colony.len();
        state.last_ranking = Some(ranking);

        Ok(IterationOutcome {
            colony_size,
            archive_size_before_replace,
            elites_injected,
            stats,
            construction,
            update,
            record,
        })
    }

    /// One independent run; every iteration and the run summary go to `sink`.
    pub fn run(&mut self, run_index: usize, sink: &mut dyn ResultsSink) -> AcoResult<RunSummary> {
        let start = Instant::now();
        let mut state = self.start_run(run_index);
        let mut iteration_ms = Vec::with_capacity(self.params.number_of_iterations);

        for iteration in 0..self.params.number_of_iterations {
            let outcome = self.run_iteration(&mut state, iteration)?;
            iteration_ms.push(outcome.record.elapsed_ms);
            sink.record_iteration(run_index, iteration, &outcome.record);
        }

        let (vertices, classes) = state.pheromones.size();
        let interference = state
            .last_ranking
            .as_ref()
            .map_or(0.0, |ranking| investigate_interference(ranking, &self.params, vertices, classes));

        let summary = RunSummary {
            max_invalids: state.max_invalids,
            interference,
            average_iteration_ms: crate::utils::mean(&iteration_ms),
            run_time_sec: start.elapsed().as_secs_f64(),
        };
        sink.record_run(run_index, &summary);

        info!(
            "run number {} done in {:.3} seconds, interference {:.3}%",
            run_index + 1,
            summary.run_time_sec,
            summary.interference
        );
        Ok(summary)
    }

    pub fn run_batch(&mut self) -> AcoResult<BatchResults> {
        let mut results =
            BatchResults::new(self.params.number_of_iterations, self.params.number_of_runs);
        for run_index in 0..self.params.number_of_runs {
            self.run(run_index, &mut results)?;
        }
        Ok(results)
    }

    /// Runs the whole batch and summarises it.
    pub fn run_model(&mut self) -> AcoResult<(AcoMetrics, BatchResults)> {
        let start = Instant::now();
        let results = self.run_batch()?;
        let total_time = start.elapsed().as_secs_f64();

        let final_results = results.calculate_final_results();
        let metrics = AcoMetrics {
            runs: self.params.number_of_runs,
            iterations: self.params.number_of_iterations,
            ants: self.params.number_of_ants,
            best_fitness: self.best_path.as_ref().map(Path::fitness),
            mean_interference: final_results.mean_interference,
            max_invalids: results.max_invalids(),
            total_time_sec: total_time,
        };

        info!(
            "batch ACO complete: {} runs in {:.3} seconds, best combined {:?}",
            metrics.runs,
            total_time,
            metrics.best_fitness.map(|f| f.combined)
        );
        Ok((metrics, results))
    }
}

// data operations taken out of the search loop
impl AcoStruct {
    pub fn from_json(problem_path: &str, config_path: Option<&str>) -> AcoResult<Self> {
        let problem = DesignProblem::from_json(problem_path)?;
        let params = match config_path {
            Some(path) => AlgorithmParameters::from_json(path)?,
            None => AlgorithmParameters::default(),
        };
        info!(
            "Using {} ants and {} iterations for {} attributes, {} methods and {} classes",
            params.number_of_ants,
            params.number_of_iterations,
            problem.number_of_attributes(),
            problem.number_of_methods(),
            problem.number_of_classes()
        );
        Self::new(problem, params)
    }

    /// Writes the best design found so far; fails if nothing has been searched yet.
    pub fn to_json(&self, path: &str) -> AcoResult<()> {
        let best = self
            .best_path
            .as_ref()
            .ok_or_else(|| AcoError::config("no design has been searched yet"))?;
        let classes = self.problem.design_classes(best);
        print_design_summary(&classes);
        let out = SolutionOutput {
            classes,
            fitness: best.fitness(),
            valid: best.is_valid(),
        };
        let json = serde_json::to_string_pretty(&out)?;
        fs::write(path, json)?;
        Ok(())
    }
}
