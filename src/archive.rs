use crate::config::ObjectiveToggles;
use crate::structs::{Objective, Path};
use rand::Rng;

/// Best path per objective from the previous iteration, at most one each.
#[derive(Clone, Debug, Default)]
pub struct EliteArchive {
    cbo: Option<Path>,
    nac: Option<Path>,
    atmr: Option<Path>,
}

impl EliteArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        [&self.cbo, &self.nac, &self.atmr]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn get(&self, objective: Objective) -> Option<&Path> {
        match objective {
            Objective::Cbo => self.cbo.as_ref(),
            Objective::Nac => self.nac.as_ref(),
            Objective::Atmr => self.atmr.as_ref(),
            Objective::Combined => None,
        }
    }

    /// Rebuilds the archive from one scan of an evaluated colony.
    pub fn refresh(&mut self, colony: &[Path], toggles: ObjectiveToggles, atmr_elitism: bool) {
        self.clear();

        let mut best: [Option<&Path>; 3] = [None; 3];
        let objectives = [Objective::Cbo, Objective::Nac, Objective::Atmr];
        for path in colony {
            for (slot, objective) in best.iter_mut().zip(objectives) {
                let improves = slot.map_or(true, |current| {
                    path.objective(objective) < current.objective(objective)
                });
                if improves {
                    *slot = Some(path);
                }
            }
        }

        let [cbo, nac, atmr] = best;
        if toggles.cbo {
            self.cbo = cbo.cloned();
        }
        if toggles.nac {
            self.nac = nac.cloned();
        }
        if toggles.atmr && atmr_elitism {
            self.atmr = atmr.cloned();
        }
        debug_assert!(self.len() <= 3);
    }

    /// Empties the archive into uniformly random slots of `colony`; returns how many were injected.
    pub fn replace_into<R: Rng>(&mut self, colony: &mut [Path], rng: &mut R) -> usize {
        if colony.is_empty() {
            return 0;
        }
        let elites = [self.cbo.take(), self.nac.take(), self.atmr.take()];
        let mut injected = 0;
        for elite in elites.into_iter().flatten() {
            assert_eq!(
                elite.len(),
                colony[0].len(),
                "elite path does not fit the colony's vertex count"
            );
            let slot = rng.gen_range(0..colony.len());
            colony[slot] = elite;
            injected += 1;
        }
        injected
    }
}
