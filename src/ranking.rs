//! Best/worst tracking and Combined-fitness ranking of an evaluated colony.
//!
//! Trackers are rebuilt from scratch for every colony, so "best" always means
//! best in this iteration's colony, never best ever seen in the run.

use crate::config::{Strength, MIN_COLONY_SIZE};
use crate::structs::{Objective, Path};
use serde::Serialize;

/// A tracked objective value and the colony index it came from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Tracked {
    pub value: f64,
    pub index: usize,
}

#[derive(Clone, Copy, Debug)]
struct Extremes {
    best: Tracked,
    worst: Tracked,
}

impl Extremes {
    fn new() -> Self {
        Self {
            best: Tracked {
                value: f64::INFINITY,
                index: 0,
            },
            worst: Tracked {
                value: f64::NEG_INFINITY,
                index: 0,
            },
        }
    }

    // strict comparisons: the first of several equal values is kept
    fn observe(&mut self, value: f64, index: usize) {
        if value < self.best.value {
            self.best = Tracked { value, index };
        }
        if value > self.worst.value {
            self.worst = Tracked { value, index };
        }
    }
}

/// Per-iteration statistics over one colony, indices refer to the unsorted colony.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IterationStats {
    pub best_cbo: Tracked,
    pub best_nac: Tracked,
    pub best_atmr: Tracked,
    pub best_combined: Tracked,
    pub worst_cbo: Tracked,
    pub worst_nac: Tracked,
    pub worst_atmr: Tracked,
    pub worst_combined: Tracked,
    pub invalid_count: usize,
    pub average_cbo: f64,
    pub colony_size: usize,
}

impl IterationStats {
    /// Single linear pass over an evaluated colony.
    pub fn track(colony: &[Path]) -> Self {
        assert!(!colony.is_empty(), "cannot track an empty colony");

        let mut cbo = Extremes::new();
        let mut nac = Extremes::new();
        let mut atmr = Extremes::new();
        let mut combined = Extremes::new();
        let mut invalid_count = 0;
        let mut running_total_cbo = 0.0;

        for (index, path) in colony.iter().enumerate() {
            debug_assert!(path.is_evaluated(), "path {index} was never evaluated");
            cbo.observe(path.cbo(), index);
            nac.observe(path.nac(), index);
            atmr.observe(path.atmr(), index);
            combined.observe(path.combined(), index);

            running_total_cbo += path.cbo();
            if !path.is_valid() {
                invalid_count += 1;
            }
        }

        assert!(running_total_cbo >= 0.0);
        let average_cbo = if running_total_cbo == 0.0 {
            0.0
        } else {
            running_total_cbo / colony.len() as f64
        };

        Self {
            best_cbo: cbo.best,
            best_nac: nac.best,
            best_atmr: atmr.best,
            best_combined: combined.best,
            worst_cbo: cbo.worst,
            worst_nac: nac.worst,
            worst_atmr: atmr.worst,
            worst_combined: combined.worst,
            invalid_count,
            average_cbo,
            colony_size: colony.len(),
        }
    }
}

/// The designated paths of one iteration, taken out of the colony before it is cleared.
#[derive(Clone, Debug)]
pub struct ColonyRanking {
    pub stats: IterationStats,
    best_cbo: Path,
    best_nac: Path,
    best_atmr: Path,
    worst_cbo: Path,
    worst_nac: Path,
    worst_atmr: Path,
    /// best, second best, third best Combined
    best_combined: [Path; 3],
    /// worst, second worst, third worst Combined
    worst_combined: [Path; 3],
}

impl ColonyRanking {
    /// Tracks the colony, then sorts it by Combined ascending in place.
    pub fn rank(colony: &mut [Path]) -> Self {
        let n = colony.len();
        assert!(
            n >= MIN_COLONY_SIZE,
            "colony of {n} paths cannot be ranked, at least {MIN_COLONY_SIZE} needed"
        );

        let stats = IterationStats::track(colony);
        let best_cbo = colony[stats.best_cbo.index].clone();
        let best_nac = colony[stats.best_nac.index].clone();
        let best_atmr = colony[stats.best_atmr.index].clone();
        let worst_cbo = colony[stats.worst_cbo.index].clone();
        let worst_nac = colony[stats.worst_nac.index].clone();
        let worst_atmr = colony[stats.worst_atmr.index].clone();

        // stable, so the first of equal paths stays ahead
        colony.sort_by(|a, b| a.combined().total_cmp(&b.combined()));

        let best = colony[0].combined();
        let second = colony[1].combined();
        let third = colony[2].combined();
        assert!(best <= second, "second best {second} ranks ahead of best {best}");
        assert!(second <= third, "third best {third} ranks ahead of second best {second}");
        debug_assert_eq!(best, stats.best_combined.value);

        let worst = colony[n - 1].combined();
        let second_worst = colony[n - 2].combined();
        let third_worst = colony[n - 3].combined();
        assert!(second_worst <= worst, "second worst {second_worst} exceeds worst {worst}");
        assert!(
            third_worst <= second_worst,
            "third worst {third_worst} exceeds second worst {second_worst}"
        );

        Self {
            stats,
            best_cbo,
            best_nac,
            best_atmr,
            worst_cbo,
            worst_nac,
            worst_atmr,
            best_combined: [colony[0].clone(), colony[1].clone(), colony[2].clone()],
            worst_combined: [
                colony[n - 1].clone(),
                colony[n - 2].clone(),
                colony[n - 3].clone(),
            ],
        }
    }

    /// First `strength` of [best, second best, third best] by Combined.
    pub fn best(&self, strength: Strength) -> &[Path] {
        &self.best_combined[..strength.count()]
    }

    /// First `strength` of [worst, second worst, third worst] by Combined.
    pub fn worst(&self, strength: Strength) -> &[Path] {
        &self.worst_combined[..strength.count()]
    }

    pub fn best_for(&self, objective: Objective) -> &Path {
        match objective {
            Objective::Cbo => &self.best_cbo,
            Objective::Nac => &self.best_nac,
            Objective::Atmr => &self.best_atmr,
            Objective::Combined => &self.best_combined[0],
        }
    }

    pub fn worst_for(&self, objective: Objective) -> &Path {
        match objective {
            Objective::Cbo => &self.worst_cbo,
            Objective::Nac => &self.worst_nac,
            Objective::Atmr => &self.worst_atmr,
            Objective::Combined => &self.worst_combined[0],
        }
    }
}

#[cfg(test)]
pub(crate) fn scored_path(classes: Vec<usize>, cbo: f64, nac: f64, combined: f64) -> Path {
    use crate::structs::Fitness;
    Path::evaluated(
        classes,
        true,
        Fitness {
            cbo,
            nac,
            atmr: nac / 2.0,
            combined,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colony() -> Vec<Path> {
        vec![
            scored_path(vec![0], 0.5, 2.0, 0.7),
            scored_path(vec![1], 0.2, 3.0, 0.4),
            scored_path(vec![2], 0.2, 1.0, 0.9),
            scored_path(vec![3], 0.8, 1.0, 0.4),
            scored_path(vec![4], 0.8, 3.0, 0.6),
        ]
    }

    #[test]
    fn test_first_strictly_better_wins_ties() {
        let stats = IterationStats::track(&colony());
        assert_eq!(stats.best_cbo, Tracked { value: 0.2, index: 1 });
        assert_eq!(stats.worst_cbo, Tracked { value: 0.8, index: 3 });
        assert_eq!(stats.best_nac, Tracked { value: 1.0, index: 2 });
        assert_eq!(stats.worst_nac, Tracked { value: 3.0, index: 1 });
        assert_eq!(stats.best_combined, Tracked { value: 0.4, index: 1 });
        assert_eq!(stats.worst_combined, Tracked { value: 0.9, index: 2 });
        assert_eq!(stats.colony_size, 5);
    }

    #[test]
    fn test_average_cbo_and_invalids() {
        let mut paths = colony();
        paths.push(Path::evaluated(vec![5], false, Default::default()));
        let stats = IterationStats::track(&paths);
        assert_eq!(stats.invalid_count, 1);
        assert!((stats.average_cbo - 2.5 / 6.0).abs() < 1e-12);

        let zeros = vec![scored_path(vec![0], 0.0, 0.0, 0.0); 3];
        assert_eq!(IterationStats::track(&zeros).average_cbo, 0.0);
    }

    #[test]
    fn test_trackers_reset_for_each_colony() {
        let first = IterationStats::track(&colony());
        let later = vec![
            scored_path(vec![0], 0.9, 4.0, 0.95),
            scored_path(vec![1], 0.7, 4.0, 0.85),
            scored_path(vec![2], 0.95, 4.0, 0.99),
        ];
        let second = IterationStats::track(&later);
        assert_eq!(first.best_cbo.value, 0.2);
        // best in this colony, not best ever
        assert_eq!(second.best_cbo, Tracked { value: 0.7, index: 1 });
    }

    #[test]
    fn test_rank_sorts_and_selects_ranks() {
        let mut paths = colony();
        let ranking = ColonyRanking::rank(&mut paths);

        let combined: Vec<f64> = paths.iter().map(Path::combined).collect();
        assert!(combined.windows(2).all(|w| w[0] <= w[1]));

        let best: Vec<usize> = ranking.best(Strength::Triple).iter().map(|p| p.class_of(0)).collect();
        assert_eq!(best, vec![1, 3, 4]);
        let worst: Vec<usize> = ranking.worst(Strength::Triple).iter().map(|p| p.class_of(0)).collect();
        assert_eq!(worst, vec![2, 0, 4]);
        assert_eq!(ranking.best(Strength::Single).len(), 1);
        assert_eq!(ranking.worst(Strength::Double).len(), 2);

        assert_eq!(ranking.best_for(Objective::Cbo).class_of(0), 1);
        assert_eq!(ranking.best_for(Objective::Nac).class_of(0), 2);
        assert_eq!(ranking.worst_for(Objective::Cbo).class_of(0), 3);
    }

    #[test]
    #[should_panic]
    fn test_rank_rejects_tiny_colony() {
        let mut paths = vec![scored_path(vec![0], 0.1, 0.1, 0.1); 2];
        ColonyRanking::rank(&mut paths);
    }
}
