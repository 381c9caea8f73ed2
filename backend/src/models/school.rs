use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::filter::normalize_key;
use crate::define_id_type;

define_id_type!(i64, SchoolId);

/// Support coordinator (TCGP). Many schools share one coordinator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coordinator {
    pub name: String,
    pub email: String,
}

/// Education levels a school offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationLevels {
    pub ensino_fundamental: bool,
    pub ensino_medio: bool,
}

/// Headcounts published in the school directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolCounts {
    pub total_alunos: u32,
    pub total_professores: u32,
    pub total_pedagogos: u32,
    pub total_turmas: u32,
}

/// IDEBES literacy targets and results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdebesTargets {
    pub meta_alfa_2024: Option<f64>,
    pub alfa_2024: Option<f64>,
    pub meta_alfa_2025: Option<f64>,
}

/// Comparison keys of a school's position in the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HierarchyKeys {
    pub name: String,
    pub municipio: String,
    pub regional: String,
}

/// A school from the reference directory. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    pub id: SchoolId,
    pub name: String,
    pub municipio: String,
    pub regional: String,
    pub levels: EducationLevels,
    pub counts: SchoolCounts,
    /// Number of coordinators assigned (`tcgps` column)
    pub tcgps: u32,
    pub coordinator: Option<Coordinator>,
    pub idebes: IdebesTargets,
    /// Per-grade `alunos_*` / `turmas_*` columns, keyed by column name
    pub grades: BTreeMap<String, u32>,
    #[serde(skip)]
    pub keys: HierarchyKeys,
}

impl School {
    /// Recompute the comparison keys from the display fields.
    pub fn refresh_keys(&mut self) {
        self.keys = HierarchyKeys {
            name: normalize_key(&self.name),
            municipio: normalize_key(&self.municipio),
            regional: normalize_key(&self.regional),
        };
    }

    pub fn with_keys(mut self) -> Self {
        self.refresh_keys();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_id_parses_padded_cell() {
        assert_eq!(SchoolId::parse_cell(" 42 "), Some(SchoolId(42)));
        assert_eq!(SchoolId::parse_cell(""), None);
        assert_eq!(SchoolId::parse_cell("abc"), None);
    }

    #[test]
    fn test_keys_follow_display_fields() {
        let school = School {
            id: SchoolId(1),
            name: "  EEEFM  Boa   Vista ".to_string(),
            municipio: "VILA VELHA".to_string(),
            regional: "Carapina".to_string(),
            levels: EducationLevels::default(),
            counts: SchoolCounts::default(),
            tcgps: 0,
            coordinator: None,
            idebes: IdebesTargets::default(),
            grades: BTreeMap::new(),
            keys: HierarchyKeys::default(),
        }
        .with_keys();

        assert_eq!(school.keys.name, "eeefm boa vista");
        assert_eq!(school.keys.municipio, "vila velha");
        assert_eq!(school.keys.regional, "carapina");
    }
}
