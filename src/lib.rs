//! Ant colony search for object-oriented software designs: MMAS with an
//! adaptive antipheromone phase, elitist replacement and path interference analysis.

pub mod archive;
pub mod colony;
pub mod config;
pub mod construction;
pub mod error;
pub mod fitness;
pub mod heuristics;
pub mod interference;
pub mod pheromone;
pub mod problem;
pub mod ranking;
pub mod results;
pub mod structs;
pub mod utils;

pub use crate::colony::AcoStruct;
pub use crate::config::AlgorithmParameters;
pub use crate::error::{AcoError, AcoResult};
pub use crate::problem::DesignProblem;

#[cfg(feature = "python")]
mod python {
    use crate::colony::AcoStruct;
    use crate::error::AcoError;
    use pyo3::prelude::*;

    fn to_py_err(e: AcoError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(e.to_string())
    }

    /// Run the search from JSON files, return the batch metrics as a JSON string.
    #[pyfunction]
    #[pyo3(signature = (problem_path, config_path = None))]
    fn solve_from_json(problem_path: &str, config_path: Option<&str>) -> PyResult<String> {
        let mut model = AcoStruct::from_json(problem_path, config_path).map_err(to_py_err)?;
        let (metrics, _) = model.run_model().map_err(to_py_err)?;
        let json = serde_json::to_string_pretty(&metrics).map_err(|e| {
            PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("Serialization error: {}", e))
        })?;
        Ok(json)
    }

    /// Run the search from JSON files and write the best design found to `output_path`
    #[pyfunction]
    #[pyo3(signature = (problem_path, output_path, config_path = None))]
    fn solve_and_write(
        problem_path: &str,
        output_path: &str,
        config_path: Option<&str>,
    ) -> PyResult<()> {
        let mut model = AcoStruct::from_json(problem_path, config_path).map_err(to_py_err)?;
        model.run_model().map_err(to_py_err)?;
        model.to_json(output_path).map_err(to_py_err)?;
        Ok(())
    }

    /// Python module definition
    #[pymodule]
    fn acodesign(_py: Python, m: &PyModule) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(solve_from_json, m)?)?;
        m.add_function(wrap_pyfunction!(solve_and_write, m)?)?;
        Ok(())
    }
}
