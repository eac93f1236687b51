//! Design quality measures. The engine only depends on the [`FitnessEvaluator`]
//! contract; [`DesignFitness`] is the reference implementation.

use crate::config::CombinedWeights;
use crate::problem::DesignProblem;
use crate::structs::{Evaluation, Fitness, Path};
use crate::utils::population_std_dev;

/// Deterministic scoring of a path against a problem instance.
pub trait FitnessEvaluator {
    fn evaluate(&self, path: &Path, problem: &DesignProblem) -> Evaluation;
}

pub struct DesignFitness {
    weights: CombinedWeights,
}

impl DesignFitness {
    pub fn new(weights: CombinedWeights) -> Self {
        Self { weights }
    }
}

impl FitnessEvaluator for DesignFitness {
    fn evaluate(&self, path: &Path, problem: &DesignProblem) -> Evaluation {
        let assignment = path.assignment();
        let cbo = external_coupling(problem, assignment);
        let nac = elegance_nac(problem, assignment);
        let atmr = elegance_atmr(problem, assignment);
        let combined = self.weights.cbo * cbo + self.weights.nac * nac + self.weights.atmr * atmr;

        Evaluation {
            fitness: Fitness {
                cbo,
                nac,
                atmr,
                combined,
            },
            valid: problem.satisfies_constraints(assignment),
        }
    }
}

/// Fraction of method→attribute uses that cross a class boundary.
pub fn external_coupling(problem: &DesignProblem, assignment: &[usize]) -> f64 {
    let uses = problem.uses();
    if uses.is_empty() {
        return 0.0;
    }
    let external = uses
        .iter()
        .filter(|(method, attribute)| assignment[*method] != assignment[*attribute])
        .count();
    external as f64 / uses.len() as f64
}

/// Spread of the number of elements per class.
pub fn elegance_nac(problem: &DesignProblem, assignment: &[usize]) -> f64 {
    let mut counts = vec![0.0; problem.number_of_classes()];
    for &class in assignment {
        counts[class] += 1.0;
    }
    population_std_dev(&counts)
}

/// Spread of the attribute-to-method ratio over classes that hold methods.
pub fn elegance_atmr(problem: &DesignProblem, assignment: &[usize]) -> f64 {
    let classes = problem.number_of_classes();
    let mut attributes = vec![0usize; classes];
    let mut methods = vec![0usize; classes];
    for (vertex, &class) in assignment.iter().enumerate() {
        if problem.is_attribute(vertex) {
            attributes[class] += 1;
        } else {
            methods[class] += 1;
        }
    }
    let ratios: Vec<f64> = attributes
        .iter()
        .zip(&methods)
        .filter(|(_, m)| **m > 0)
        .map(|(&a, &m)| a as f64 / m as f64)
        .collect();
    population_std_dev(&ratios)
}
