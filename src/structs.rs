use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexKind {
    Attribute,
    Method,
}

/// A design element with a stable position in the combined vertex list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vertex {
    pub name: String,
    pub index: usize,
    pub kind: VertexKind,
}

impl Vertex {
    pub fn attribute(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            kind: VertexKind::Attribute,
        }
    }

    pub fn method(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            kind: VertexKind::Method,
        }
    }

    pub fn is_attribute(&self) -> bool {
        self.kind == VertexKind::Attribute
    }
}

/// The four minimisation objectives a path is scored on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Cbo,
    Nac,
    Atmr,
    Combined,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fitness {
    /// External coupling between objects
    pub cbo: f64,
    pub nac: f64,
    pub atmr: f64,
    pub combined: f64,
}

impl Fitness {
    pub fn get(&self, objective: Objective) -> f64 {
        match objective {
            Objective::Cbo => self.cbo,
            Objective::Nac => self.nac,
            Objective::Atmr => self.atmr,
            Objective::Combined => self.combined,
        }
    }
}

/// Output of a fitness evaluation, stamped onto a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub fitness: Fitness,
    pub valid: bool,
}

/// One ant's complete solution: the class chosen for every vertex.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Path {
    classes: Vec<usize>,
    valid: bool,
    evaluated: bool,
    fitness: Fitness,
}

impl Path {
    pub fn new(classes: Vec<usize>, valid: bool) -> Self {
        Self {
            classes,
            valid,
            evaluated: false,
            fitness: Fitness::default(),
        }
    }

    /// A path that already carries its fitness values.
    pub fn evaluated(classes: Vec<usize>, valid: bool, fitness: Fitness) -> Self {
        Self {
            classes,
            valid,
            evaluated: true,
            fitness,
        }
    }

    pub fn stamp(&mut self, evaluation: Evaluation) {
        self.fitness = evaluation.fitness;
        self.valid = evaluation.valid;
        self.evaluated = true;
    }

    pub fn assignment(&self) -> &[usize] {
        &self.classes
    }

    pub fn class_of(&self, vertex: usize) -> usize {
        self.classes[vertex]
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// (vertex, class) cells visited by this path.
    pub fn placements(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.classes.iter().copied().enumerate()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated
    }

    pub fn fitness(&self) -> Fitness {
        self.fitness
    }

    pub fn objective(&self, objective: Objective) -> f64 {
        self.fitness.get(objective)
    }

    pub fn cbo(&self) -> f64 {
        self.fitness.cbo
    }

    pub fn nac(&self) -> f64 {
        self.fitness.nac
    }

    pub fn atmr(&self) -> f64 {
        self.fitness.atmr
    }

    pub fn combined(&self) -> f64 {
        self.fitness.combined
    }
}

#[derive(Deserialize)]
pub struct MethodInput {
    pub name: String,
    /// Names of the attributes this method uses
    #[serde(default)]
    pub uses: Vec<String>,
}

#[derive(Deserialize)]
pub struct ProblemInput {
    pub classes: usize,
    pub attributes: Vec<String>,
    pub methods: Vec<MethodInput>,
}

/// One class of a decoded design.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DesignClass {
    pub index: usize,
    pub attributes: Vec<String>,
    pub methods: Vec<String>,
}

#[derive(Serialize)]
pub struct SolutionOutput {
    pub classes: Vec<DesignClass>,
    pub fitness: Fitness,
    pub valid: bool,
}

/// Summary metrics of a complete batch of runs.
#[derive(Debug, Serialize, Deserialize)]
pub struct AcoMetrics {
    pub runs: usize,
    pub iterations: usize,
    pub ants: usize,
    pub best_fitness: Option<Fitness>,
    pub mean_interference: f64,
    pub max_invalids: usize,
    pub total_time_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_marks_path_evaluated() {
        let mut path = Path::new(vec![0, 1, 1], false);
        assert!(!path.is_evaluated());

        let fitness = Fitness {
            cbo: 0.25,
            nac: 1.0,
            atmr: 0.5,
            combined: 0.625,
        };
        path.stamp(Evaluation {
            fitness,
            valid: true,
        });
        assert!(path.is_evaluated());
        assert!(path.is_valid());
        assert_eq!(path.objective(Objective::Combined), 0.625);
        assert_eq!(path.placements().collect::<Vec<_>>(), vec![(0, 0), (1, 1), (2, 1)]);
    }
}
