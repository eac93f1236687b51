//! The software design problem: attributes, methods, the use relation between
//! them and the number of classes to partition them into.

use crate::error::{AcoError, AcoResult};
use crate::structs::{DesignClass, Path, ProblemInput, Vertex};
use rand::Rng;
use std::collections::HashMap;
use std::fs;

pub struct DesignProblem {
    vertices: Vec<Vertex>,
    number_of_attributes: usize,
    number_of_classes: usize,
    /// (method vertex, attribute vertex) pairs
    uses: Vec<(usize, usize)>,
}

impl DesignProblem {
    /// `methods` holds each method's name and the attribute indices it uses.
    pub fn new(
        attributes: Vec<String>,
        methods: Vec<(String, Vec<usize>)>,
        number_of_classes: usize,
    ) -> AcoResult<Self> {
        if number_of_classes == 0 {
            return Err(AcoError::problem("a design needs at least one class"));
        }
        if attributes.is_empty() && methods.is_empty() {
            return Err(AcoError::problem("a design needs at least one attribute or method"));
        }

        let number_of_attributes = attributes.len();
        let mut vertices = Vec::with_capacity(attributes.len() + methods.len());
        let mut uses = Vec::new();

        for (index, name) in attributes.into_iter().enumerate() {
            vertices.push(Vertex::attribute(name, index));
        }
        for (name, used) in methods {
            let index = vertices.len();
            for attribute in used {
                if attribute >= number_of_attributes {
                    return Err(AcoError::problem(format!(
                        "method '{name}' uses unknown attribute {attribute}"
                    )));
                }
                if !uses.contains(&(index, attribute)) {
                    uses.push((index, attribute));
                }
            }
            vertices.push(Vertex::method(name, index));
        }

        Ok(Self {
            vertices,
            number_of_attributes,
            number_of_classes,
            uses,
        })
    }

    pub fn from_input(input: ProblemInput) -> AcoResult<Self> {
        let lookup: HashMap<&str, usize> = input
            .attributes
            .iter()
            .enumerate()
            .map(|(index, name)| (name.as_str(), index))
            .collect();
        if lookup.len() != input.attributes.len() {
            return Err(AcoError::problem("attribute names must be unique"));
        }

        let mut methods = Vec::with_capacity(input.methods.len());
        for method in &input.methods {
            let used = method
                .uses
                .iter()
                .map(|name| {
                    lookup.get(name.as_str()).copied().ok_or_else(|| {
                        AcoError::problem(format!(
                            "method '{}' uses unknown attribute '{name}'",
                            method.name
                        ))
                    })
                })
                .collect::<AcoResult<Vec<_>>>()?;
            methods.push((method.name.clone(), used));
        }

        Self::new(input.attributes, methods, input.classes)
    }

    pub fn from_json(path: &str) -> AcoResult<Self> {
        let data = fs::read_to_string(path)?;
        let input: ProblemInput = serde_json::from_str(&data)?;
        Self::from_input(input)
    }

    /// Random instance where every method uses each attribute with probability
    /// `density`, and always at least one.
    pub fn randomised<R: Rng>(
        attributes: usize,
        methods: usize,
        number_of_classes: usize,
        density: f64,
        rng: &mut R,
    ) -> AcoResult<Self> {
        if attributes == 0 {
            return Err(AcoError::problem("a randomised design needs attributes"));
        }
        if !density.is_finite() {
            return Err(AcoError::problem(format!("use density {density} is not a number")));
        }
        let density = density.clamp(0.0, 1.0);
        let names = (0..attributes).map(|a| format!("attribute{a}")).collect();
        let methods = (0..methods)
            .map(|m| {
                let mut used: Vec<usize> = (0..attributes).filter(|_| rng.gen_bool(density)).collect();
                if used.is_empty() {
                    used.push(rng.gen_range(0..attributes));
                }
                (format!("method{m}"), used)
            })
            .collect();
        Self::new(names, methods, number_of_classes)
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn number_of_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn number_of_attributes(&self) -> usize {
        self.number_of_attributes
    }

    pub fn number_of_methods(&self) -> usize {
        self.vertices.len() - self.number_of_attributes
    }

    pub fn number_of_classes(&self) -> usize {
        self.number_of_classes
    }

    pub fn is_attribute(&self, vertex: usize) -> bool {
        vertex < self.number_of_attributes
    }

    pub fn uses(&self) -> &[(usize, usize)] {
        &self.uses
    }

    /// Every class must hold at least one attribute and one method.
    pub fn satisfies_constraints(&self, assignment: &[usize]) -> bool {
        if assignment.len() != self.vertices.len() {
            return false;
        }
        let mut has_attribute = vec![false; self.number_of_classes];
        let mut has_method = vec![false; self.number_of_classes];
        for (vertex, &class) in assignment.iter().enumerate() {
            if class >= self.number_of_classes {
                return false;
            }
            if self.is_attribute(vertex) {
                has_attribute[class] = true;
            } else {
                has_method[class] = true;
            }
        }
        has_attribute.into_iter().chain(has_method).all(|filled| filled)
    }

    /// Whether any assignment at all can satisfy the constraints.
    pub fn can_satisfy_constraints(&self) -> bool {
        self.number_of_attributes() >= self.number_of_classes
            && self.number_of_methods() >= self.number_of_classes
    }

    /// Whether `path` is a structurally sound assignment for this problem.
    pub fn fits(&self, path: &Path) -> bool {
        path.len() == self.vertices.len()
            && path.assignment().iter().all(|&class| class < self.number_of_classes)
    }

    pub fn design_classes(&self, path: &Path) -> Vec<DesignClass> {
        let mut classes: Vec<DesignClass> = (0..self.number_of_classes)
            .map(|index| DesignClass {
                index,
                attributes: Vec::new(),
                methods: Vec::new(),
            })
            .collect();
        for (vertex, class) in path.placements() {
            let name = self.vertices[vertex].name.clone();
            if self.is_attribute(vertex) {
                classes[class].attributes.push(name);
            } else {
                classes[class].methods.push(name);
            }
        }
        classes
    }
}

/// Small deterministic problem: method `m` uses attributes `m` and `m + 1` (mod count).
#[cfg(test)]
pub(crate) fn test_problem(attributes: usize, methods: usize, classes: usize) -> DesignProblem {
    let names = (0..attributes).map(|a| format!("a{a}")).collect();
    let methods = (0..methods)
        .map(|m| (format!("m{m}"), vec![m % attributes, (m + 1) % attributes]))
        .collect();
    DesignProblem::new(names, methods, classes).unwrap()
}
