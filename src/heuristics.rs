use crate::error::{AcoError, AcoResult};
use crate::problem::DesignProblem;

/// Precomputed desirability of placing a vertex in a class. Read-only during runs.
#[derive(Clone, Debug)]
pub struct HeuristicInformation {
    values: Vec<f64>,
    classes: usize,
}

impl HeuristicInformation {
    pub fn uniform(vertices: usize, classes: usize) -> Self {
        Self {
            values: vec![1.0; vertices * classes],
            classes,
        }
    }

    /// Row-major `vertices × classes` values, all strictly positive.
    pub fn from_values(vertices: usize, classes: usize, values: Vec<f64>) -> AcoResult<Self> {
        if values.len() != vertices * classes {
            return Err(AcoError::config(format!(
                "heuristic table has {} values, expected {vertices} x {classes}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(AcoError::config("heuristic values must be finite and positive"));
        }
        Ok(Self { values, classes })
    }

    pub fn set_up(problem: &DesignProblem) -> Self {
        Self::uniform(problem.number_of_vertices(), problem.number_of_classes())
    }

    pub fn vertices(&self) -> usize {
        if self.classes == 0 {
            0
        } else {
            self.values.len() / self.classes
        }
    }

    pub fn classes(&self) -> usize {
        self.classes
    }

    pub fn value(&self, vertex: usize, class: usize) -> f64 {
        self.values[vertex * self.classes + class]
    }
}
