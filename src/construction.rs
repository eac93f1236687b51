use crate::config::AlgorithmParameters;
use crate::error::{AcoError, AcoResult};
use crate::heuristics::HeuristicInformation;
use crate::pheromone::AlphaMatrix;
use crate::problem::DesignProblem;
use crate::structs::Path;
use log::warn;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::Serialize;

/// Cost of infeasibility for one iteration's colony.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ConstructionStats {
    /// Ants that needed at least one extra attempt
    pub retries: usize,
    /// Extra attempts summed over all ants
    pub extra_attempts: usize,
    /// Mean extra attempts over the ants that retried, 0 when none did
    pub average_attempts: f64,
}

pub struct Ant {
    pub path_taken: Vec<usize>,
}

impl Ant {
    pub fn new(num_vertices: usize) -> Self {
        Self {
            path_taken: vec![0; num_vertices],
        }
    }

    /// Assigns every vertex to a class, weighted by trail (and heuristic) strength.
    /// Any previous assignment is discarded.
    pub fn generate_solution<R: Rng>(
        &mut self,
        alpha: &AlphaMatrix,
        heuristics: Option<(&HeuristicInformation, f64)>,
        rng: &mut R,
    ) -> AcoResult<()> {
        for vertex in 0..self.path_taken.len() {
            let weights: Vec<f64> = alpha
                .row(vertex)
                .iter()
                .enumerate()
                .map(|(class, tau)| match heuristics {
                    Some((info, beta)) => tau * info.value(vertex, class).powf(beta),
                    None => *tau,
                })
                .collect();
            let dist = WeightedIndex::new(&weights).map_err(|e| {
                AcoError::numerical(format!("class weights for vertex {vertex}: {e}"))
            })?;
            self.path_taken[vertex] = dist.sample(rng);
        }
        Ok(())
    }

    pub fn is_valid_path(&self, problem: &DesignProblem) -> bool {
        problem.satisfies_constraints(&self.path_taken)
    }

    pub fn into_path(self, problem: &DesignProblem) -> Path {
        let valid = problem.satisfies_constraints(&self.path_taken);
        Path::new(self.path_taken, valid)
    }
}

/// Builds a full colony of paths from one alpha snapshot.
pub struct ConstructionEngine<'a> {
    problem: &'a DesignProblem,
    heuristics: &'a HeuristicInformation,
    params: &'a AlgorithmParameters,
}

impl<'a> ConstructionEngine<'a> {
    pub fn new(
        problem: &'a DesignProblem,
        heuristics: &'a HeuristicInformation,
        params: &'a AlgorithmParameters,
    ) -> Self {
        Self {
            problem,
            heuristics,
            params,
        }
    }

    pub fn generate_colony<R: Rng>(
        &self,
        alpha: &AlphaMatrix,
        rng: &mut R,
    ) -> AcoResult<(Vec<Path>, ConstructionStats)> {
        let mut colony = Vec::with_capacity(self.params.number_of_ants);
        let mut stats = ConstructionStats::default();

        for ant_index in 0..self.params.number_of_ants {
            let (path, attempts) = self.construct(ant_index, alpha, rng)?;
            if attempts > 0 {
                stats.retries += 1;
            }
            stats.extra_attempts += attempts;
            colony.push(path);
        }

        if stats.retries > 0 {
            stats.average_attempts = stats.extra_attempts as f64 / stats.retries as f64;
        }
        if stats.retries == self.params.number_of_ants {
            warn!(
                "every ant needed retries this iteration, {:.1} extra attempts on average",
                stats.average_attempts
            );
        }

        debug_assert_eq!(colony.len(), self.params.number_of_ants);
        Ok((colony, stats))
    }

    /// One ant's path and the number of extra attempts it took.
    fn construct<R: Rng>(
        &self,
        ant_index: usize,
        alpha: &AlphaMatrix,
        rng: &mut R,
    ) -> AcoResult<(Path, usize)> {
        let heuristics = self
            .params
            .use_heuristics
            .then_some((self.heuristics, self.params.beta));

        let mut ant = Ant::new(self.problem.number_of_vertices());
        ant.generate_solution(alpha, heuristics, rng)?;

        let mut attempts = 0;
        if self.params.constraint_handling {
            // whole-path restart until valid, no repair
            while !ant.is_valid_path(self.problem) {
                if self
                    .params
                    .max_construction_attempts
                    .is_some_and(|ceiling| attempts >= ceiling)
                {
                    return Err(AcoError::ConstructionExhausted {
                        ant: ant_index,
                        attempts,
                    });
                }
                ant.generate_solution(alpha, heuristics, rng)?;
                attempts += 1;
            }
            debug_assert!(ant.is_valid_path(self.problem));
        }

        Ok((ant.into_path(self.problem), attempts))
    }
}
