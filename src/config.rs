use crate::error::{AcoError, AcoResult};
use serde::{Deserialize, Serialize};
use std::fs;

/// Smallest colony for which best/worst ranks 0..3 are well defined.
pub const MIN_COLONY_SIZE: usize = 3;

/// How many ranked paths take part in a reinforcement or antipheromone step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Strength {
    Single,
    Double,
    Triple,
}

impl Strength {
    pub fn count(self) -> usize {
        match self {
            Strength::Single => 1,
            Strength::Double => 2,
            Strength::Triple => 3,
        }
    }
}

impl TryFrom<u8> for Strength {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Strength::Single),
            2 => Ok(Strength::Double),
            3 => Ok(Strength::Triple),
            other => Err(format!("impossible strength {other}, expected 1, 2 or 3")),
        }
    }
}

impl From<Strength> for u8 {
    fn from(strength: Strength) -> Self {
        strength.count() as u8
    }
}

/// What happens to the trails of the worst paths once the antipheromone phase starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntipheromoneReduction {
    /// Subtractive: trail is halved, floored at the MMAS minimum
    Halve,
    /// Trail drops straight to the MMAS minimum
    ReduceToMin,
}

/// Per-objective switches for reinforcement and elitism.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveToggles {
    pub cbo: bool,
    pub nac: bool,
    pub atmr: bool,
}

impl Default for ObjectiveToggles {
    fn default() -> Self {
        Self {
            cbo: true,
            nac: true,
            atmr: false,
        }
    }
}

impl ObjectiveToggles {
    pub fn any(&self) -> bool {
        self.cbo || self.nac || self.atmr
    }
}

/// Weights of the combined fitness aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinedWeights {
    pub cbo: f64,
    pub nac: f64,
    pub atmr: f64,
}

impl Default for CombinedWeights {
    fn default() -> Self {
        Self {
            cbo: 0.5,
            nac: 0.5,
            atmr: 0.0,
        }
    }
}

/// Read-only configuration surface of the search.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmParameters {
    pub number_of_ants: usize,
    pub number_of_iterations: usize,
    pub number_of_runs: usize,
    /// Exponent applied to trail values when building the alpha matrix
    pub alpha: f64,
    /// Exponent applied to heuristic information, only used with `use_heuristics`
    pub beta: f64,
    pub use_heuristics: bool,
    /// Evaporation coefficient
    pub rho: f64,
    /// Trail deposited on every cell of a reinforced path, before rank weighting
    pub pheromone_deposit: f64,
    pub mmas_min: f64,
    pub mmas_max: f64,
    /// Seed value for a fresh pheromone matrix, defaults to `mmas_max`
    pub initial_pheromone: Option<f64>,
    pub objectives: ObjectiveToggles,
    pub weights: CombinedWeights,
    pub pheromone_strength: Strength,
    pub antipheromone: bool,
    pub antipheromone_strength: Strength,
    pub antipheromone_phase_threshold_percentage: u32,
    pub antipheromone_reduction: AntipheromoneReduction,
    pub constraint_handling: bool,
    pub replacement_elitism: bool,
    /// ATMR best paths are kept out of the elite archive unless this is set
    pub atmr_elitism: bool,
    /// Extra construction attempts allowed per ant; `None` retries until valid
    pub max_construction_attempts: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for AlgorithmParameters {
    fn default() -> Self {
        Self {
            number_of_ants: 100,
            number_of_iterations: 1000,
            number_of_runs: 10,
            alpha: 1.0,
            beta: 1.0,
            use_heuristics: false,
            rho: 0.1,
            pheromone_deposit: 1.0,
            mmas_min: 0.5,
            mmas_max: 3.5,
            initial_pheromone: None,
            objectives: ObjectiveToggles::default(),
            weights: CombinedWeights::default(),
            pheromone_strength: Strength::Single,
            antipheromone: true,
            antipheromone_strength: Strength::Single,
            antipheromone_phase_threshold_percentage: 50,
            antipheromone_reduction: AntipheromoneReduction::ReduceToMin,
            constraint_handling: true,
            replacement_elitism: true,
            atmr_elitism: false,
            max_construction_attempts: None,
            seed: None,
        }
    }
}

impl AlgorithmParameters {
    pub fn from_json(path: &str) -> AcoResult<Self> {
        let data = fs::read_to_string(path)?;
        let params: AlgorithmParameters = serde_json::from_str(&data)?;
        params.validate()?;
        Ok(params)
    }

    /// Rejects configurations under which a run must not start.
    pub fn validate(&self) -> AcoResult<()> {
        if self.number_of_ants < MIN_COLONY_SIZE {
            return Err(AcoError::config(format!(
                "colony of {} ants is below the minimum of {MIN_COLONY_SIZE}",
                self.number_of_ants
            )));
        }
        if self.number_of_iterations == 0 {
            return Err(AcoError::config("number_of_iterations must be positive"));
        }
        if self.number_of_runs == 0 {
            return Err(AcoError::config("number_of_runs must be positive"));
        }
        if !(self.alpha.is_finite() && self.alpha >= 0.0) {
            return Err(AcoError::config(format!("invalid alpha {}", self.alpha)));
        }
        if !(self.beta.is_finite() && self.beta >= 0.0) {
            return Err(AcoError::config(format!("invalid beta {}", self.beta)));
        }
        if !(self.rho > 0.0 && self.rho <= 1.0) {
            return Err(AcoError::config(format!(
                "evaporation rate {} outside (0, 1]",
                self.rho
            )));
        }
        if !(self.pheromone_deposit.is_finite() && self.pheromone_deposit > 0.0) {
            return Err(AcoError::config(format!(
                "invalid pheromone deposit {}",
                self.pheromone_deposit
            )));
        }
        if !(self.mmas_min > 0.0 && self.mmas_min < self.mmas_max && self.mmas_max.is_finite()) {
            return Err(AcoError::config(format!(
                "MMAS bounds [{}, {}] are not a valid positive range",
                self.mmas_min, self.mmas_max
            )));
        }
        let initial = self.initial_trail();
        if !(initial >= self.mmas_min && initial <= self.mmas_max) {
            return Err(AcoError::config(format!(
                "initial pheromone {initial} outside [{}, {}]",
                self.mmas_min, self.mmas_max
            )));
        }
        if self.antipheromone_phase_threshold_percentage > 100 {
            return Err(AcoError::config(format!(
                "antipheromone phase threshold {}% exceeds 100%",
                self.antipheromone_phase_threshold_percentage
            )));
        }
        if !self.objectives.any() {
            return Err(AcoError::config("at least one objective must be enabled"));
        }
        let elite_sources =
            self.objectives.cbo || self.objectives.nac || (self.objectives.atmr && self.atmr_elitism);
        if self.replacement_elitism && !elite_sources {
            return Err(AcoError::config(
                "replacement elitism is on but no enabled objective can populate the elite archive",
            ));
        }
        let weights = [self.weights.cbo, self.weights.nac, self.weights.atmr];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0 {
            return Err(AcoError::config(format!(
                "combined weights {:?} must be non-negative with a positive sum",
                self.weights
            )));
        }
        if self.max_construction_attempts == Some(0) && self.constraint_handling {
            return Err(AcoError::config(
                "max_construction_attempts of 0 leaves no room for a single retry",
            ));
        }
        Ok(())
    }

    pub fn initial_trail(&self) -> f64 {
        self.initial_pheromone.unwrap_or(self.mmas_max)
    }

    /// First 0-based iteration at or past the threshold, if the phase is active at all.
    pub fn antipheromone_phase_start(&self) -> Option<usize> {
        if !self.antipheromone || self.antipheromone_phase_threshold_percentage == 0 {
            return None;
        }
        let pct = self.antipheromone_phase_threshold_percentage as usize;
        Some((self.number_of_iterations * pct).div_ceil(100))
    }

    pub fn is_antipheromone_phase(&self, iteration: usize) -> bool {
        self.antipheromone_phase_start()
            .is_some_and(|start| iteration >= start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let params = AlgorithmParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.initial_trail(), params.mmas_max);
    }

    #[test]
    fn test_colony_below_three_is_rejected() {
        let params = AlgorithmParameters {
            number_of_ants: 2,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(AcoError::Config(_))));
    }

    #[test]
    fn test_impossible_strength_rejected_on_load() {
        let json = r#"{ "pheromone_strength": 4 }"#;
        assert!(serde_json::from_str::<AlgorithmParameters>(json).is_err());

        let json = r#"{ "pheromone_strength": 3, "antipheromone_strength": 2 }"#;
        let params: AlgorithmParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.pheromone_strength, Strength::Triple);
        assert_eq!(params.antipheromone_strength, Strength::Double);
        assert_eq!(params.number_of_ants, 100);
    }

    #[test]
    fn test_elitism_without_archive_sources_rejected() {
        let params = AlgorithmParameters {
            objectives: ObjectiveToggles {
                cbo: false,
                nac: false,
                atmr: true,
            },
            replacement_elitism: true,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = AlgorithmParameters {
            atmr_elitism: true,
            ..params
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let params = AlgorithmParameters {
            mmas_min: 4.0,
            mmas_max: 3.0,
            initial_pheromone: Some(3.0),
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_nan_initial_pheromone_rejected() {
        let params = AlgorithmParameters {
            initial_pheromone: Some(f64::NAN),
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(AcoError::Config(_))));
    }

    #[test]
    fn test_antipheromone_phase_start() {
        let params = AlgorithmParameters {
            number_of_iterations: 10,
            antipheromone_phase_threshold_percentage: 50,
            ..Default::default()
        };
        assert_eq!(params.antipheromone_phase_start(), Some(5));
        assert!(!params.is_antipheromone_phase(4));
        assert!(params.is_antipheromone_phase(5));

        // a threshold that falls between iterations starts the phase on the next one
        let params = AlgorithmParameters {
            antipheromone_phase_threshold_percentage: 1,
            ..params
        };
        assert_eq!(params.antipheromone_phase_start(), Some(1));
        assert!(!params.is_antipheromone_phase(0));
        let params = AlgorithmParameters {
            antipheromone_phase_threshold_percentage: 33,
            ..params
        };
        assert_eq!(params.antipheromone_phase_start(), Some(4));

        let params = AlgorithmParameters {
            antipheromone_phase_threshold_percentage: 0,
            ..params
        };
        assert_eq!(params.antipheromone_phase_start(), None);

        let params = AlgorithmParameters {
            antipheromone: false,
            antipheromone_phase_threshold_percentage: 20,
            ..params
        };
        assert!(!params.is_antipheromone_phase(9));
    }
}
