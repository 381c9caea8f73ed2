use serde::{Deserialize, Serialize};

use super::school::SchoolId;

/// Tier of the state → regional → municipality → school hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HierarchyLevel {
    Estado,
    Regional,
    Municipio,
    Escola,
}

impl HierarchyLevel {
    /// Level enumerated by a drill-down from this one.
    pub fn child(&self) -> Option<HierarchyLevel> {
        match self {
            HierarchyLevel::Estado | HierarchyLevel::Regional => Some(HierarchyLevel::Municipio),
            HierarchyLevel::Municipio => Some(HierarchyLevel::Escola),
            HierarchyLevel::Escola => None,
        }
    }
}

/// Identity of the entity an aggregate describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityLabel {
    pub level: HierarchyLevel,
    /// School name, municipality, regional or state name
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escola_id: Option<SchoolId>,
}

impl EntityLabel {
    pub fn new(level: HierarchyLevel, label: impl Into<String>) -> Self {
        Self {
            level,
            label: label.into(),
            regional: None,
            municipio: None,
            escola_id: None,
        }
    }
}

/// Derived summary of a set of domain rows, labelled with the entity it covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRecord<S> {
    pub entity: EntityLabel,
    /// Schools of the directory matched by the filter
    pub matched_schools: usize,
    /// Domain rows folded into the summary
    pub row_count: usize,
    pub summary: S,
}
