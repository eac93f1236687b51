//! Trail storage and the MMAS update: evaporation, rank-weighted
//! reinforcement and the late-phase antipheromone penalty.

use crate::config::{AlgorithmParameters, AntipheromoneReduction, Strength};
use crate::problem::DesignProblem;
use crate::ranking::ColonyRanking;
use crate::structs::{Objective, Path};
use serde::Serialize;

/// Trail strength per (vertex, class), bounded to `[min, max]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PheromoneMatrix {
    values: Vec<f64>,
    vertices: usize,
    classes: usize,
    min: f64,
    max: f64,
}

impl PheromoneMatrix {
    pub fn new(problem: &DesignProblem, params: &AlgorithmParameters) -> Self {
        Self::with_value(
            problem.number_of_vertices(),
            problem.number_of_classes(),
            params.initial_trail(),
            params.mmas_min,
            params.mmas_max,
        )
    }

    pub fn with_value(vertices: usize, classes: usize, initial: f64, min: f64, max: f64) -> Self {
        assert!(min <= initial && initial <= max, "initial trail {initial} outside [{min}, {max}]");
        Self {
            values: vec![initial; vertices * classes],
            vertices,
            classes,
            min,
            max,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.vertices, self.classes)
    }

    pub fn get(&self, vertex: usize, class: usize) -> f64 {
        self.values[vertex * self.classes + class]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn evaporate(&mut self, rho: f64) {
        let min = self.min;
        for value in &mut self.values {
            *value = (*value * (1.0 - rho)).max(min);
        }
    }

    /// Adds `amount` to every cell the path visits, clamped at the maximum.
    pub fn deposit(&mut self, path: &Path, amount: f64) {
        for (vertex, class) in path.placements() {
            let cell = &mut self.values[vertex * self.classes + class];
            *cell = (*cell + amount).min(self.max);
        }
    }

    pub fn penalise(&mut self, path: &Path, reduction: AntipheromoneReduction) {
        for (vertex, class) in path.placements() {
            let cell = &mut self.values[vertex * self.classes + class];
            *cell = match reduction {
                AntipheromoneReduction::Halve => (*cell / 2.0).max(self.min),
                AntipheromoneReduction::ReduceToMin => self.min,
            };
        }
    }

    pub fn within_bounds(&self) -> bool {
        self.values.iter().all(|v| *v >= self.min && *v <= self.max)
    }

    fn assert_bounds(&self) {
        if let Some((cell, value)) = self
            .values
            .iter()
            .enumerate()
            .find(|(_, v)| !(**v >= self.min && **v <= self.max))
        {
            panic!(
                "trail ({}, {}) = {value} escaped [{}, {}]",
                cell / self.classes,
                cell % self.classes,
                self.min,
                self.max
            );
        }
    }
}

/// Trail values raised to ALPHA; a snapshot taken once per iteration.
#[derive(Clone, Debug)]
pub struct AlphaMatrix {
    values: Vec<f64>,
    classes: usize,
}

impl AlphaMatrix {
    pub fn new(pheromones: &PheromoneMatrix, alpha: f64) -> Self {
        Self {
            values: pheromones.values.iter().map(|v| v.powf(alpha)).collect(),
            classes: pheromones.classes,
        }
    }

    pub fn get(&self, vertex: usize, class: usize) -> f64 {
        self.values[vertex * self.classes + class]
    }

    pub fn row(&self, vertex: usize) -> &[f64] {
        &self.values[vertex * self.classes..(vertex + 1) * self.classes]
    }

    pub fn classes(&self) -> usize {
        self.classes
    }
}

/// What the update engine did in one iteration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub reinforced: usize,
    pub penalised: usize,
    pub antipheromone_applied: bool,
}

/// Rank weight `(K - rank) / K`: best > second best > third best.
pub fn rank_weight(rank: usize, strength: Strength) -> f64 {
    let k = strength.count();
    debug_assert!(rank < k);
    (k - rank) as f64 / k as f64
}

/// Evaporation, then reinforcement, then (late in the run) antipheromone.
pub fn update(
    matrix: &mut PheromoneMatrix,
    ranking: &ColonyRanking,
    params: &AlgorithmParameters,
    iteration: usize,
) -> UpdateReport {
    let mut report = UpdateReport::default();

    matrix.evaporate(params.rho);

    let toggles = params.objectives;
    for (enabled, objective) in [
        (toggles.cbo, Objective::Cbo),
        (toggles.nac, Objective::Nac),
        (toggles.atmr, Objective::Atmr),
    ] {
        if enabled {
            matrix.deposit(ranking.best_for(objective), params.pheromone_deposit);
            report.reinforced += 1;
        }
    }

    for (rank, path) in ranking.best(params.pheromone_strength).iter().enumerate() {
        let weight = rank_weight(rank, params.pheromone_strength);
        matrix.deposit(path, params.pheromone_deposit * weight);
        report.reinforced += 1;
    }

    if params.is_antipheromone_phase(iteration) {
        for path in ranking.worst(params.antipheromone_strength) {
            matrix.penalise(path, params.antipheromone_reduction);
            report.penalised += 1;
        }
        report.antipheromone_applied = true;
    }

    matrix.assert_bounds();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::scored_path;
    use proptest::prelude::*;

    fn params() -> AlgorithmParameters {
        AlgorithmParameters {
            number_of_iterations: 10,
            rho: 0.5,
            pheromone_deposit: 1.0,
            mmas_min: 0.5,
            mmas_max: 3.0,
            antipheromone_phase_threshold_percentage: 50,
            ..Default::default()
        }
    }

    // vertex 0 decides who is who: best paths put it in class 0, worst in class 2
    fn ranked() -> ColonyRanking {
        let mut colony = vec![
            scored_path(vec![0, 0], 0.1, 1.0, 0.1),
            scored_path(vec![1, 1], 0.5, 1.0, 0.5),
            scored_path(vec![2, 2], 0.9, 1.0, 0.9),
        ];
        ColonyRanking::rank(&mut colony)
    }

    #[test]
    fn test_evaporation_floors_at_min() {
        let mut matrix = PheromoneMatrix::with_value(2, 2, 0.8, 0.5, 3.0);
        matrix.evaporate(0.5);
        assert!(matrix.values().iter().all(|v| *v == 0.5));
    }

    #[test]
    fn test_deposit_clamps_at_max() {
        let mut matrix = PheromoneMatrix::with_value(2, 2, 2.5, 0.5, 3.0);
        matrix.deposit(&Path::new(vec![1, 0], true), 1.0);
        assert_eq!(matrix.get(0, 1), 3.0);
        assert_eq!(matrix.get(1, 0), 3.0);
        assert_eq!(matrix.get(0, 0), 2.5);
    }

    #[test]
    fn test_penalise_modes() {
        let mut matrix = PheromoneMatrix::with_value(1, 2, 3.0, 0.5, 3.0);
        let path = Path::new(vec![1], true);
        matrix.penalise(&path, AntipheromoneReduction::Halve);
        assert_eq!(matrix.get(0, 1), 1.5);
        matrix.penalise(&path, AntipheromoneReduction::Halve);
        matrix.penalise(&path, AntipheromoneReduction::Halve);
        assert_eq!(matrix.get(0, 1), 0.5);

        let mut matrix = PheromoneMatrix::with_value(1, 2, 3.0, 0.5, 3.0);
        matrix.penalise(&path, AntipheromoneReduction::ReduceToMin);
        assert_eq!(matrix.get(0, 1), 0.5);
        assert_eq!(matrix.get(0, 0), 3.0);
    }

    #[test]
    fn test_alpha_matrix_raises_trails() {
        let matrix = PheromoneMatrix::with_value(2, 3, 2.0, 0.5, 3.0);
        let alpha = AlphaMatrix::new(&matrix, 2.0);
        assert_eq!(alpha.get(1, 2), 4.0);
        assert_eq!(alpha.row(0), &[4.0, 4.0, 4.0]);
        assert_eq!(alpha.classes(), 3);
        assert_eq!((matrix.min(), matrix.max()), (0.5, 3.0));
    }

    #[test]
    fn test_rank_weights_decrease() {
        assert_eq!(rank_weight(0, Strength::Single), 1.0);
        assert!(rank_weight(0, Strength::Triple) > rank_weight(1, Strength::Triple));
        assert!(rank_weight(1, Strength::Triple) > rank_weight(2, Strength::Triple));
    }

    #[test]
    fn test_update_reinforces_best_before_phase() {
        let params = AlgorithmParameters {
            objectives: crate::config::ObjectiveToggles {
                cbo: false,
                nac: false,
                atmr: true,
            },
            replacement_elitism: false,
            ..params()
        };
        let mut matrix = PheromoneMatrix::with_value(2, 3, 2.0, 0.5, 3.0);
        let report = update(&mut matrix, &ranked(), &params, 4);

        assert!(!report.antipheromone_applied);
        assert_eq!(report.penalised, 0);
        // atmr best (first of equal values) plus the combined best
        assert_eq!(report.reinforced, 2);
        // 2.0 * 0.5 + 1.0 (atmr best) + 1.0 (combined best), clamped
        assert_eq!(matrix.get(0, 0), 3.0);
        assert_eq!(matrix.get(0, 1), 1.0);
        assert_eq!(matrix.get(0, 2), 1.0);
    }

    #[test]
    fn test_update_penalises_worst_in_phase() {
        let params = AlgorithmParameters {
            objectives: crate::config::ObjectiveToggles {
                cbo: true,
                nac: false,
                atmr: false,
            },
            ..params()
        };
        let mut matrix = PheromoneMatrix::with_value(2, 3, 2.0, 0.5, 3.0);
        let report = update(&mut matrix, &ranked(), &params, 5);

        assert!(report.antipheromone_applied);
        assert_eq!(report.penalised, 1);
        assert_eq!(matrix.get(0, 2), 0.5);
        assert_eq!(matrix.get(0, 0), 3.0);
    }

    #[test]
    fn test_triple_strength_touches_three_paths() {
        let params = AlgorithmParameters {
            pheromone_strength: Strength::Triple,
            antipheromone_strength: Strength::Triple,
            antipheromone_reduction: AntipheromoneReduction::Halve,
            ..params()
        };
        let mut matrix = PheromoneMatrix::with_value(2, 3, 2.0, 0.5, 3.0);
        let report = update(&mut matrix, &ranked(), &params, 9);
        // cbo + nac objectives, then three combined ranks
        assert_eq!(report.reinforced, 5);
        assert_eq!(report.penalised, 3);
        assert!(matrix.within_bounds());
    }

    proptest! {
        #[test]
        fn trails_stay_within_bounds(
            initial in 0.5f64..=3.0,
            rho in 0.01f64..=1.0,
            deposit in 0.01f64..10.0,
            iteration in 0usize..10,
            halve in any::<bool>(),
            strength in 1u8..=3,
            assignments in prop::collection::vec(prop::collection::vec(0usize..3, 4), 3..8),
        ) {
            let strength = Strength::try_from(strength).unwrap();
            let params = AlgorithmParameters {
                rho,
                pheromone_deposit: deposit,
                pheromone_strength: strength,
                antipheromone_strength: strength,
                antipheromone_reduction: if halve {
                    AntipheromoneReduction::Halve
                } else {
                    AntipheromoneReduction::ReduceToMin
                },
                ..params()
            };
            let mut colony: Vec<Path> = assignments
                .into_iter()
                .enumerate()
                .map(|(i, classes)| scored_path(classes, i as f64 * 0.1, 1.0, (i % 4) as f64))
                .collect();
            let ranking = ColonyRanking::rank(&mut colony);
            let mut matrix = PheromoneMatrix::with_value(4, 3, initial, 0.5, 3.0);

            update(&mut matrix, &ranking, &params, iteration);
            prop_assert!(matrix.within_bounds());
        }
    }
}
