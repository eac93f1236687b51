//! Structural overlap between the best and worst paths of a run. A high
//! interference means reinforcement and antipheromone work the same trail cells.

use crate::config::AlgorithmParameters;
use crate::ranking::ColonyRanking;
use crate::structs::Path;
use log::debug;

/// Counts of (vertex, class) placements over a set of recorded paths.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacementMatrix {
    counts: Vec<u32>,
    classes: usize,
}

pub type BestPathsMatrix = PlacementMatrix;
pub type WorstPathsMatrix = PlacementMatrix;

impl PlacementMatrix {
    pub fn new(vertices: usize, classes: usize) -> Self {
        Self {
            counts: vec![0; vertices * classes],
            classes,
        }
    }

    pub fn record_path(&mut self, path: &Path) {
        for (vertex, class) in path.placements() {
            self.counts[vertex * self.classes + class] += 1;
        }
    }

    /// Number of cells visited at least once.
    pub fn occupied(&self) -> usize {
        self.counts.iter().filter(|c| **c > 0).count()
    }
}

pub struct PathInterferenceMatrix<'a> {
    best: &'a BestPathsMatrix,
    worst: &'a WorstPathsMatrix,
}

impl<'a> PathInterferenceMatrix<'a> {
    pub fn new(best: &'a BestPathsMatrix, worst: &'a WorstPathsMatrix) -> Self {
        assert_eq!(
            best.counts.len(),
            worst.counts.len(),
            "best and worst path matrices differ in shape"
        );
        Self { best, worst }
    }

    pub fn shared(&self) -> usize {
        self.cells().filter(|(b, w)| *b > 0 && *w > 0).count()
    }

    pub fn either(&self) -> usize {
        self.cells().filter(|(b, w)| *b > 0 || *w > 0).count()
    }

    /// Shared cells over cells present in either matrix, in [0, 1].
    pub fn interference(&self) -> f64 {
        let either = self.either();
        if either == 0 {
            0.0
        } else {
            self.shared() as f64 / either as f64
        }
    }

    fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.best.counts.iter().copied().zip(self.worst.counts.iter().copied())
    }
}

/// Interference percentage for the final ranking of a run.
pub fn investigate_interference(
    ranking: &ColonyRanking,
    params: &AlgorithmParameters,
    vertices: usize,
    classes: usize,
) -> f64 {
    let mut best = BestPathsMatrix::new(vertices, classes);
    for path in ranking.best(params.pheromone_strength) {
        best.record_path(path);
    }

    let mut worst = WorstPathsMatrix::new(vertices, classes);
    if params.antipheromone && params.antipheromone_phase_threshold_percentage > 0 {
        for path in ranking.worst(params.antipheromone_strength) {
            worst.record_path(path);
        }
    }

    let interference = PathInterferenceMatrix::new(&best, &worst).interference() * 100.0;
    debug_assert!((0.0..=100.0).contains(&interference));
    debug!(
        "best paths occupy {} cells, worst paths {}, interference {:.3}%",
        best.occupied(),
        worst.occupied(),
        interference
    );
    interference
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Strength;
    use crate::ranking::scored_path;

    fn matrix(paths: &[Vec<usize>]) -> PlacementMatrix {
        let mut m = PlacementMatrix::new(3, 3);
        for classes in paths {
            m.record_path(&Path::new(classes.clone(), true));
        }
        m
    }

    #[test]
    fn test_identical_matrices_interfere_fully() {
        let best = matrix(&[vec![0, 1, 2]]);
        let worst = matrix(&[vec![0, 1, 2], vec![0, 1, 2]]);
        assert_eq!(PathInterferenceMatrix::new(&best, &worst).interference(), 1.0);
    }

    #[test]
    fn test_disjoint_matrices_do_not_interfere() {
        let best = matrix(&[vec![0, 0, 0]]);
        let worst = matrix(&[vec![1, 1, 1]]);
        assert_eq!(PathInterferenceMatrix::new(&best, &worst).interference(), 0.0);

        let empty = PlacementMatrix::new(3, 3);
        assert_eq!(PathInterferenceMatrix::new(&best, &empty).interference(), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        let best = matrix(&[vec![0, 1, 2]]);
        let worst = matrix(&[vec![0, 1, 0]]);
        let pim = PathInterferenceMatrix::new(&best, &worst);
        assert_eq!(pim.shared(), 2);
        assert_eq!(pim.either(), 4);
        assert_eq!(pim.interference(), 0.5);
        assert_eq!(best.occupied(), 3);
        assert_eq!(worst.occupied(), 3);
    }

    #[test]
    fn test_investigate_respects_strengths_and_phase() {
        let mut colony = vec![
            scored_path(vec![0, 0, 0], 0.1, 1.0, 0.1),
            scored_path(vec![1, 1, 1], 0.2, 1.0, 0.2),
            scored_path(vec![0, 0, 2], 0.3, 1.0, 0.3),
            scored_path(vec![2, 2, 2], 0.4, 1.0, 0.4),
        ];
        let ranking = ColonyRanking::rank(&mut colony);

        let params = AlgorithmParameters {
            pheromone_strength: Strength::Single,
            antipheromone_strength: Strength::Single,
            ..Default::default()
        };
        // best [0,0,0] against worst [2,2,2]
        assert_eq!(investigate_interference(&ranking, &params, 3, 3), 0.0);

        let params = AlgorithmParameters {
            antipheromone_strength: Strength::Double,
            ..params
        };
        // worst adds [0,0,2]: shares two cells with the best, six cells in total
        let interference = investigate_interference(&ranking, &params, 3, 3);
        assert!((interference - 100.0 / 3.0).abs() < 1e-9);

        let params = AlgorithmParameters {
            antipheromone_phase_threshold_percentage: 0,
            ..params
        };
        assert_eq!(investigate_interference(&ranking, &params, 3, 3), 0.0);
    }
}
