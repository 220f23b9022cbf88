//! Plant lifecycle state machine.
//!
//! Juveniles feel negative density dependence twice as strongly as adults.
//! A juvenile that survives past its species' maturation threshold is
//! promoted to an adult with its age reset to zero; adults never revert.

use crate::species::{Species, SpeciesId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plant {
    Juvenile { species: SpeciesId, age: u32 },
    Adult { species: SpeciesId, age: u32 },
}

impl Plant {
    pub fn species(&self) -> SpeciesId {
        match *self {
            Plant::Juvenile { species, .. } | Plant::Adult { species, .. } => species,
        }
    }

    pub fn age(&self) -> u32 {
        match *self {
            Plant::Juvenile { age, .. } | Plant::Adult { age, .. } => age,
        }
    }

    pub fn is_adult(&self) -> bool {
        matches!(self, Plant::Adult { .. })
    }

    /// Survival probability under the given conspecific and heterospecific
    /// neighbor counts. May fall below zero under heavy crowding, which makes
    /// death certain.
    pub fn survival_probability(&self, species: &Species, con: f64, het: f64) -> f64 {
        match self {
            Plant::Juvenile { .. } => {
                species.p1 - 2.0 * (species.con_ndd * con + species.het_ndd * het)
            }
            Plant::Adult { .. } => species.p2 - (species.con_ndd * con + species.het_ndd * het),
        }
    }

    /// One tick of the lifecycle. `draw` is a uniform sample from [0, 1);
    /// the plant survives when `draw` ≤ its survival probability. Returns
    /// `None` on death.
    pub fn step(&self, species: &Species, con: f64, het: f64, draw: f64) -> Option<Plant> {
        if draw > self.survival_probability(species, con, het) {
            return None;
        }
        Some(match *self {
            Plant::Juvenile { species: id, age } => {
                let age = age + 1;
                if age >= species.t1 {
                    Plant::Adult { species: id, age: 0 }
                } else {
                    Plant::Juvenile { species: id, age }
                }
            }
            Plant::Adult { species: id, age } => Plant::Adult {
                species: id,
                age: age + 1,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species() -> Species {
        Species {
            id: 1,
            t1: 3,
            p1: 0.9,
            seed_per_tick: 0.5,
            t2: 10,
            p2: 0.95,
            adult_per_tick: 0.2,
            con_ndd: 0.01,
            het_ndd: 0.005,
        }
    }

    #[test]
    fn juvenile_ndd_is_doubled() {
        let sp = species();
        let juvenile = Plant::Juvenile { species: 1, age: 0 };
        let adult = Plant::Adult { species: 1, age: 5 };
        let expected_juv = 0.9 - 2.0 * (0.01 * 4.0 + 0.005 * 6.0);
        let expected_adult = 0.95 - (0.01 * 4.0 + 0.005 * 6.0);
        assert!((juvenile.survival_probability(&sp, 4.0, 6.0) - expected_juv).abs() < 1e-12);
        assert!((adult.survival_probability(&sp, 4.0, 6.0) - expected_adult).abs() < 1e-12);
    }

    #[test]
    fn juvenile_ages_until_promotion() {
        let sp = species();
        let plant = Plant::Juvenile { species: 1, age: 0 };
        let next = plant.step(&sp, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(next, Plant::Juvenile { species: 1, age: 1 });
    }

    #[test]
    fn promotion_resets_age() {
        let sp = species();
        let plant = Plant::Juvenile { species: 1, age: 2 };
        let next = plant.step(&sp, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(next, Plant::Adult { species: 1, age: 0 });
    }

    #[test]
    fn adult_only_ages() {
        let sp = species();
        let plant = Plant::Adult { species: 1, age: 7 };
        let next = plant.step(&sp, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(next, Plant::Adult { species: 1, age: 8 });
    }

    #[test]
    fn failed_draw_kills() {
        let sp = species();
        let plant = Plant::Juvenile { species: 1, age: 0 };
        assert!(plant.step(&sp, 0.0, 0.0, 0.95).is_none());
    }

    #[test]
    fn crowding_can_make_death_certain() {
        let sp = species();
        let plant = Plant::Juvenile { species: 1, age: 0 };
        // 100 conspecific neighbors push the probability below zero.
        assert!(plant.survival_probability(&sp, 100.0, 0.0) < 0.0);
        assert!(plant.step(&sp, 100.0, 0.0, 0.0).is_none());
    }
}
