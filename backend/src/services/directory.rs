//! School directory: the reference table every aggregate is scoped through.
//!
//! All hierarchy matching goes through the directory, so a domain row whose
//! school is not listed here never contributes to any aggregate.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{
    normalize_key, Coordinator, EntityLabel, HierarchyLevel, NormalizedFilter, School, SchoolId,
};

/// A municipality listed under more than one regional in the source data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityConflict {
    pub municipio: String,
    /// Regional kept for every school of the municipality (first seen)
    pub regional: String,
    pub school_id: SchoolId,
    /// Regional the school row declared
    pub declared_regional: String,
}

/// A selection that cannot match anything because it contradicts another level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConflict {
    pub level: HierarchyLevel,
    pub value: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityEntry {
    pub municipio: String,
    pub regional: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorSchools {
    pub coordinator: Coordinator,
    pub schools: Vec<SchoolId>,
}

/// One entity one level below the current filter, with the schools it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntity {
    pub label: EntityLabel,
    pub ids: BTreeSet<SchoolId>,
}

#[derive(Debug, Clone, Default)]
pub struct SchoolDirectory {
    schools: BTreeMap<SchoolId, School>,
    by_name: HashMap<String, SchoolId>,
    /// Canonical display name per municipality / regional key
    municipio_names: HashMap<String, String>,
    regional_names: HashMap<String, String>,
    /// Regional key of each municipality key
    regional_of: HashMap<String, String>,
    inconsistencies: Vec<MunicipalityConflict>,
    state_name: String,
}

impl SchoolDirectory {
    /// Build the directory, canonicalizing display names and the
    /// municipality → regional mapping (first seen wins).
    pub fn new(schools: Vec<School>, state_name: impl Into<String>) -> Self {
        let mut directory = Self {
            state_name: state_name.into(),
            ..Self::default()
        };

        for mut school in schools {
            if let Some(previous) = directory.schools.get(&school.id) {
                log::warn!(
                    "Duplicate school id {} ('{}'), keeping the first row",
                    school.id,
                    previous.name
                );
                continue;
            }

            school.name = collapse_whitespace(&school.name);
            school.municipio = collapse_whitespace(&school.municipio);
            school.regional = collapse_whitespace(&school.regional);
            school.refresh_keys();
            let keys = school.keys.clone();

            let regional_display = directory
                .regional_names
                .entry(keys.regional.clone())
                .or_insert_with(|| school.regional.clone())
                .clone();
            school.regional = regional_display;

            let municipio_display = directory
                .municipio_names
                .entry(keys.municipio.clone())
                .or_insert_with(|| school.municipio.clone())
                .clone();
            school.municipio = municipio_display;

            let kept_regional = directory
                .regional_of
                .entry(keys.municipio.clone())
                .or_insert_with(|| keys.regional.clone())
                .clone();
            if kept_regional != keys.regional {
                let kept_display = directory
                    .regional_names
                    .get(&kept_regional)
                    .cloned()
                    .unwrap_or_else(|| kept_regional.clone());
                log::warn!(
                    "School {} lists municipality '{}' under regional '{}', keeping '{}'",
                    school.id,
                    school.municipio,
                    school.regional,
                    kept_display
                );
                directory.inconsistencies.push(MunicipalityConflict {
                    municipio: school.municipio.clone(),
                    regional: kept_display.clone(),
                    school_id: school.id,
                    declared_regional: school.regional.clone(),
                });
                school.regional = kept_display;
            }
            school.refresh_keys();

            match directory.by_name.get(&school.keys.name) {
                Some(existing) if *existing != school.id => log::warn!(
                    "Schools {} and {} share the name key '{}'; name joins resolve to {}",
                    existing,
                    school.id,
                    school.keys.name,
                    existing
                ),
                Some(_) => {}
                None => {
                    directory.by_name.insert(school.keys.name.clone(), school.id);
                }
            }
            directory.schools.insert(school.id, school);
        }

        log::debug!(
            "School directory: {} schools, {} municipalities, {} regionals",
            directory.schools.len(),
            directory.municipio_names.len(),
            directory.regional_names.len()
        );
        directory
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }

    pub fn state_name(&self) -> &str {
        &self.state_name
    }

    pub fn school(&self, id: SchoolId) -> Option<&School> {
        self.schools.get(&id)
    }

    pub fn schools(&self) -> impl Iterator<Item = &School> {
        self.schools.values()
    }

    /// Resolve a free-text school name to its id through the name key.
    pub fn id_for_name(&self, name: &str) -> Option<SchoolId> {
        self.by_name.get(&normalize_key(name)).copied()
    }

    pub fn inconsistencies(&self) -> &[MunicipalityConflict] {
        &self.inconsistencies
    }

    pub fn ids_matching(&self, filter: &NormalizedFilter) -> BTreeSet<SchoolId> {
        self.schools
            .values()
            .filter(|s| filter.matches_school(s))
            .map(|s| s.id)
            .collect()
    }

    pub fn schools_in(&self, filter: &NormalizedFilter) -> Vec<&School> {
        let mut schools: Vec<&School> = self
            .schools
            .values()
            .filter(|s| filter.matches_school(s))
            .collect();
        schools.sort_by(|a, b| a.keys.name.cmp(&b.keys.name).then(a.id.cmp(&b.id)));
        schools
    }

    /// Canonical regional display names, sorted.
    pub fn regionals(&self) -> Vec<String> {
        let mut names: Vec<String> = self.regional_names.values().cloned().collect();
        names.sort_by_key(|n| normalize_key(n));
        names
    }

    /// Municipalities with their regional, optionally limited to one regional.
    pub fn municipalities(&self, regional: Option<&str>) -> Vec<MunicipalityEntry> {
        let wanted = regional.map(normalize_key);
        let mut entries: Vec<MunicipalityEntry> = self
            .regional_of
            .iter()
            .filter(|(_, r)| wanted.as_ref().map_or(true, |w| w == *r))
            .map(|(m, r)| MunicipalityEntry {
                municipio: self.municipio_display(m),
                regional: self.regional_display(r),
            })
            .collect();
        entries.sort_by_key(|e| (normalize_key(&e.regional), normalize_key(&e.municipio)));
        entries
    }

    pub fn coordinators(&self) -> Vec<CoordinatorSchools> {
        let mut grouped: BTreeMap<Coordinator, Vec<SchoolId>> = BTreeMap::new();
        for school in self.schools.values() {
            if let Some(coordinator) = &school.coordinator {
                grouped
                    .entry(coordinator.clone())
                    .or_default()
                    .push(school.id);
            }
        }
        grouped
            .into_iter()
            .map(|(coordinator, schools)| CoordinatorSchools {
                coordinator,
                schools,
            })
            .collect()
    }

    /// Most specific hierarchy level the filter selects.
    pub fn level_of(&self, filter: &NormalizedFilter) -> HierarchyLevel {
        if !filter.escolas.is_empty() {
            HierarchyLevel::Escola
        } else if !filter.municipios.is_empty() {
            HierarchyLevel::Municipio
        } else if !filter.regionals.is_empty() {
            HierarchyLevel::Regional
        } else {
            HierarchyLevel::Estado
        }
    }

    /// Label of the entity an aggregate under `filter` describes.
    pub fn label_for(&self, filter: &NormalizedFilter) -> EntityLabel {
        let level = self.level_of(filter);
        let single = |set: &BTreeSet<String>| {
            if set.len() == 1 {
                set.iter().next().cloned()
            } else {
                None
            }
        };

        let regional = single(&filter.regionals).map(|r| self.regional_display(&r));
        let municipio = single(&filter.municipios).map(|m| self.municipio_display(&m));

        let mut entity = match level {
            HierarchyLevel::Estado => EntityLabel::new(level, self.state_name.clone()),
            HierarchyLevel::Regional => EntityLabel::new(
                level,
                join_labels(filter.regionals.iter().map(|r| self.regional_display(r))),
            ),
            HierarchyLevel::Municipio => EntityLabel::new(
                level,
                join_labels(filter.municipios.iter().map(|m| self.municipio_display(m))),
            ),
            HierarchyLevel::Escola => {
                let matched = self.schools_in(filter);
                let mut entity = match matched.as_slice() {
                    [school] => {
                        let mut entity = EntityLabel::new(level, school.name.clone());
                        entity.escola_id = Some(school.id);
                        entity.municipio = Some(school.municipio.clone());
                        entity.regional = Some(school.regional.clone());
                        entity
                    }
                    _ => EntityLabel::new(
                        level,
                        join_labels(filter.escolas.iter().map(|key| self.school_display(key))),
                    ),
                };
                entity.regional = entity.regional.or(regional.clone());
                entity.municipio = entity.municipio.or(municipio.clone());
                return entity;
            }
        };
        entity.regional = regional;
        entity.municipio = municipio;
        if level == HierarchyLevel::Municipio && entity.regional.is_none() {
            entity.regional = single(&filter.municipios)
                .and_then(|m| self.regional_of.get(&m))
                .map(|r| self.regional_display(r));
        }
        entity
    }

    /// Entities one level below the filter, each with the matching schools it
    /// covers. Unscoped or regional filters enumerate municipalities,
    /// municipality filters enumerate schools, school filters have no children.
    pub fn child_entities(&self, filter: &NormalizedFilter) -> Vec<ChildEntity> {
        let level = self.level_of(filter);
        match level.child() {
            Some(HierarchyLevel::Municipio) => {
                let mut groups: BTreeMap<(String, String), BTreeSet<SchoolId>> = BTreeMap::new();
                for school in self.schools.values().filter(|s| filter.matches_school(s)) {
                    groups
                        .entry((school.keys.regional.clone(), school.keys.municipio.clone()))
                        .or_default()
                        .insert(school.id);
                }
                groups
                    .into_iter()
                    .map(|((regional, municipio), ids)| {
                        let mut label = EntityLabel::new(
                            HierarchyLevel::Municipio,
                            self.municipio_display(&municipio),
                        );
                        label.regional = Some(self.regional_display(&regional));
                        label.municipio = Some(label.label.clone());
                        ChildEntity { label, ids }
                    })
                    .collect()
            }
            Some(HierarchyLevel::Escola) => self
                .schools_in(filter)
                .into_iter()
                .map(|school| {
                    let mut label = EntityLabel::new(HierarchyLevel::Escola, school.name.clone());
                    label.regional = Some(school.regional.clone());
                    label.municipio = Some(school.municipio.clone());
                    label.escola_id = Some(school.id);
                    ChildEntity {
                        label,
                        ids: BTreeSet::from([school.id]),
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Selections that contradict a selection at the level above. The filter
    /// is still applied as a plain conjunction; these are warnings only.
    pub fn conflicts(&self, filter: &NormalizedFilter) -> Vec<FilterConflict> {
        let mut conflicts = Vec::new();

        for regional in &filter.regionals {
            if !self.regional_names.contains_key(regional) {
                conflicts.push(FilterConflict {
                    level: HierarchyLevel::Regional,
                    value: regional.clone(),
                    message: format!("regional '{}' is not in the school directory", regional),
                });
            }
        }

        for municipio in &filter.municipios {
            match self.regional_of.get(municipio) {
                None => conflicts.push(FilterConflict {
                    level: HierarchyLevel::Municipio,
                    value: municipio.clone(),
                    message: format!("municipality '{}' is not in the school directory", municipio),
                }),
                Some(regional)
                    if !filter.regionals.is_empty() && !filter.regionals.contains(regional) =>
                {
                    conflicts.push(FilterConflict {
                        level: HierarchyLevel::Municipio,
                        value: municipio.clone(),
                        message: format!(
                            "municipality '{}' belongs to regional '{}', which is not selected",
                            self.municipio_display(municipio),
                            self.regional_display(regional)
                        ),
                    })
                }
                Some(_) => {}
            }
        }

        for escola in &filter.escolas {
            let Some(school) = self.by_name.get(escola).and_then(|id| self.schools.get(id)) else {
                conflicts.push(FilterConflict {
                    level: HierarchyLevel::Escola,
                    value: escola.clone(),
                    message: format!("school '{}' is not in the school directory", escola),
                });
                continue;
            };
            let outside_municipio = !filter.municipios.is_empty()
                && !filter.municipios.contains(&school.keys.municipio);
            let outside_regional = !filter.regionals.is_empty()
                && !filter.regionals.contains(&school.keys.regional);
            if outside_municipio || outside_regional {
                conflicts.push(FilterConflict {
                    level: HierarchyLevel::Escola,
                    value: escola.clone(),
                    message: format!(
                        "school '{}' is in {} / {}, outside the selected hierarchy",
                        school.name, school.municipio, school.regional
                    ),
                });
            }
        }

        if !conflicts.is_empty() {
            log::warn!("Filter has {} conflicting selection(s)", conflicts.len());
        }
        conflicts
    }

    fn municipio_display(&self, key: &str) -> String {
        self.municipio_names
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn school_display(&self, key: &str) -> String {
        self.by_name
            .get(key)
            .and_then(|id| self.schools.get(id))
            .map(|school| school.name.clone())
            .unwrap_or_else(|| key.to_string())
    }

    fn regional_display(&self, key: &str) -> String {
        self.regional_names
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

fn join_labels<I: Iterator<Item = String>>(labels: I) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
