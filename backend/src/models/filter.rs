//! Hierarchical filter context and its normalized comparison form.
//!
//! The presentation layer sends each hierarchy field either absent, as a
//! single `{label, value}` option, or as an array of options. Everything
//! downstream works on [`NormalizedFilter`], whose fields are always sets.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::school::{HierarchyKeys, School};

/// Canonical comparison key: trimmed, inner whitespace collapsed, lowercased.
pub fn normalize_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One option of a select input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl SelectOption {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: serde_json::Value::String(label.clone()),
            label,
        }
    }

    /// Text compared against the hierarchy: the label, or the value when the label is blank.
    pub fn comparison_text(&self) -> String {
        if !self.label.trim().is_empty() {
            return self.label.clone();
        }
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// A hierarchy field as sent by single- or multi-select inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Selection {
    #[default]
    None,
    Text(String),
    One(SelectOption),
    Many(Vec<SelectOption>),
}

impl Selection {
    pub fn texts(&self) -> Vec<String> {
        match self {
            Selection::None => vec![],
            Selection::Text(text) => vec![text.clone()],
            Selection::One(option) => vec![option.comparison_text()],
            Selection::Many(options) => options.iter().map(SelectOption::comparison_text).collect(),
        }
    }

    fn comparison_keys(&self) -> BTreeSet<String> {
        self.texts()
            .iter()
            .map(|t| normalize_key(t))
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Cycle-phase selector; accepts a number, a numeric string, or a select option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CycleSelector {
    Number(u8),
    Text(String),
    Option(SelectOption),
}

impl CycleSelector {
    pub fn cycle(&self) -> Option<u8> {
        match self {
            CycleSelector::Number(n) => Some(*n),
            CycleSelector::Text(text) => text.trim().parse().ok(),
            CycleSelector::Option(option) => match &option.value {
                serde_json::Value::Number(n) => n.as_u64().and_then(|v| u8::try_from(v).ok()),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => option.label.trim().parse().ok(),
            },
        }
    }
}

/// Filter context as received from the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterContext {
    #[serde(default)]
    pub estado: Option<SelectOption>,
    #[serde(default)]
    pub regional: Selection,
    #[serde(default)]
    pub municipio: Selection,
    #[serde(default)]
    pub escola: Selection,
    #[serde(default)]
    pub saar: Option<CycleSelector>,
}

impl FilterContext {
    /// Unscoped filter (whole state).
    pub fn state() -> Self {
        Self::default()
    }

    pub fn with_regional(mut self, label: &str) -> Self {
        self.regional = push_option(self.regional, label);
        self
    }

    pub fn with_municipio(mut self, label: &str) -> Self {
        self.municipio = push_option(self.municipio, label);
        self
    }

    pub fn with_escola(mut self, label: &str) -> Self {
        self.escola = push_option(self.escola, label);
        self
    }

    pub fn with_saar(mut self, cycle: u8) -> Self {
        self.saar = Some(CycleSelector::Number(cycle));
        self
    }

    /// Collapse single/multiple representations into comparison-key sets.
    pub fn normalize(&self) -> NormalizedFilter {
        NormalizedFilter {
            regionals: self.regional.comparison_keys(),
            municipios: self.municipio.comparison_keys(),
            escolas: self.escola.comparison_keys(),
            saar: self.saar.as_ref().and_then(CycleSelector::cycle),
        }
    }
}

fn push_option(selection: Selection, label: &str) -> Selection {
    let option = SelectOption::new(label);
    match selection {
        Selection::None => Selection::One(option),
        Selection::Text(text) => Selection::Many(vec![SelectOption::new(text), option]),
        Selection::One(first) => Selection::Many(vec![first, option]),
        Selection::Many(mut options) => {
            options.push(option);
            Selection::Many(options)
        }
    }
}

/// Filter with every hierarchy field as a set of comparison keys.
/// An empty set matches everything at that level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedFilter {
    pub regionals: BTreeSet<String>,
    pub municipios: BTreeSet<String>,
    pub escolas: BTreeSet<String>,
    pub saar: Option<u8>,
}

impl NormalizedFilter {
    pub fn from_keys<R, M, E>(regionals: R, municipios: M, escolas: E) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        fn keys<I>(values: I) -> BTreeSet<String>
        where
            I: IntoIterator,
            I::Item: AsRef<str>,
        {
            values
                .into_iter()
                .map(|v| normalize_key(v.as_ref()))
                .filter(|k| !k.is_empty())
                .collect()
        }

        Self {
            regionals: keys(regionals),
            municipios: keys(municipios),
            escolas: keys(escolas),
            saar: None,
        }
    }

    /// Re-normalize every key. A no-op on an already-normalized filter.
    pub fn normalize(&self) -> Self {
        let mut normalized = Self::from_keys(&self.regionals, &self.municipios, &self.escolas);
        normalized.saar = self.saar;
        normalized
    }

    pub fn is_unscoped(&self) -> bool {
        self.regionals.is_empty() && self.municipios.is_empty() && self.escolas.is_empty()
    }

    /// Conjunction of the independently-specified levels.
    pub fn matches(&self, keys: &HierarchyKeys) -> bool {
        (self.regionals.is_empty() || self.regionals.contains(&keys.regional))
            && (self.municipios.is_empty() || self.municipios.contains(&keys.municipio))
            && (self.escolas.is_empty() || self.escolas.contains(&keys.name))
    }

    pub fn matches_school(&self, school: &School) -> bool {
        self.matches(&school.keys)
    }

    /// Narrow the filter to one municipality.
    pub fn refine_municipio(&self, municipio: &str) -> Self {
        let mut refined = self.clone();
        refined.municipios = BTreeSet::from([normalize_key(municipio)]);
        refined
    }

    /// Narrow the filter to one school.
    pub fn refine_escola(&self, escola: &str) -> Self {
        let mut refined = self.clone();
        refined.escolas = BTreeSet::from([normalize_key(escola)]);
        refined
    }
}

impl From<&FilterContext> for NormalizedFilter {
    fn from(context: &FilterContext) -> Self {
        context.normalize()
    }
}
