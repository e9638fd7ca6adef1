//! Roster templates: the ordered slots a lineup must fill, the positions each slot accepts,
//! and the salary cap a lineup must respect.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Salary cap of a classic DK basketball contest.
pub const DK_SALARY_CAP: u32 = 50_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    pub eligible: Vec<String>,
}
impl Slot {
    pub fn new(name: &str, eligible: &[&str]) -> Self {
        Self {
            name: name.into(),
            eligible: eligible.iter().map(|&position| position.into()).collect(),
        }
    }

    pub fn accepts<'a>(&self, mut positions: impl Iterator<Item = &'a String>) -> bool {
        positions.any(|position| self.eligible.contains(position))
    }
}

impl Display for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterTemplate {
    pub slots: Vec<Slot>,
    pub salary_cap: u32,
}
impl RosterTemplate {
    /// The classic 8-slot DK basketball template: PG, SG, SF, PF, C, G, F, UTIL.
    pub fn dk_classic() -> Self {
        Self {
            slots: vec![
                Slot::new("PG", &["PG"]),
                Slot::new("SG", &["SG"]),
                Slot::new("SF", &["SF"]),
                Slot::new("PF", &["PF"]),
                Slot::new("C", &["C"]),
                Slot::new("G", &["PG", "SG"]),
                Slot::new("F", &["SF", "PF"]),
                Slot::new("UTIL", &["PG", "SG", "SF", "PF", "C"]),
            ],
            salary_cap: DK_SALARY_CAP,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for RosterTemplate {
    fn default() -> Self {
        Self::dk_classic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dk_classic_shape() {
        let template = RosterTemplate::default();
        assert_eq!(8, template.len());
        assert_eq!(DK_SALARY_CAP, template.salary_cap);
        let names: Vec<_> = template.slots.iter().map(ToString::to_string).collect();
        assert_eq!(vec!["PG", "SG", "SF", "PF", "C", "G", "F", "UTIL"], names);
    }

    #[test]
    fn slot_accepts() {
        let guard = Slot::new("G", &["PG", "SG"]);
        let positions = ["SG".to_string(), "SF".to_string()];
        assert!(guard.accepts(positions.iter()));
        let positions = ["C".to_string()];
        assert!(!guard.accepts(positions.iter()));
    }
}
