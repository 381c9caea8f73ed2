//! Generic hierarchy traversal shared by the five domain aggregators.
//!
//! A domain plugs in how a row resolves to a school, how rows fold into
//! running totals, how two totals merge and how totals derive the published
//! summary. The engine owns filtering, grouping and the one-level drill-down.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Debug;

use crate::models::{AggregateRecord, NormalizedFilter, SchoolId};
use crate::services::directory::SchoolDirectory;

pub trait DomainAggregator {
    type Row;
    /// Summed counters. `Default` is the zero value.
    type Totals: Default + Clone + PartialEq + Debug;
    type Summary;

    /// School the row belongs to, if the directory knows it.
    fn school_of(&self, row: &Self::Row, directory: &SchoolDirectory) -> Option<SchoolId>;

    /// Domain-specific row selection on top of the hierarchy match.
    fn accepts(&self, _row: &Self::Row, _filter: &NormalizedFilter) -> bool {
        true
    }

    fn fold(&self, totals: &mut Self::Totals, row: &Self::Row, school: SchoolId);

    fn merge(&self, totals: &mut Self::Totals, other: &Self::Totals);

    fn derive(&self, totals: &Self::Totals) -> Self::Summary;
}

/// Totals plus the number of rows folded into them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Folded<T> {
    pub row_count: usize,
    pub totals: T,
}

/// Group rows by `key` and fold each group.
///
/// Rows whose school is unknown, or for which `key` yields `None`, are skipped.
pub fn group_fold<'a, A, K, F>(
    aggregator: &A,
    rows: impl IntoIterator<Item = &'a A::Row>,
    directory: &SchoolDirectory,
    filter: &NormalizedFilter,
    mut key: F,
) -> BTreeMap<K, Folded<A::Totals>>
where
    A: DomainAggregator,
    A::Row: 'a,
    K: Ord,
    F: FnMut(SchoolId) -> Option<K>,
{
    let mut groups: BTreeMap<K, Folded<A::Totals>> = BTreeMap::new();
    for row in rows {
        if !aggregator.accepts(row, filter) {
            continue;
        }
        let Some(school) = aggregator.school_of(row, directory) else {
            continue;
        };
        let Some(k) = key(school) else {
            continue;
        };
        let group = groups.entry(k).or_default();
        aggregator.fold(&mut group.totals, row, school);
        group.row_count += 1;
    }
    groups
}

/// Fold the rows of the given schools into one total.
pub fn fold_schools<A: DomainAggregator>(
    aggregator: &A,
    rows: &[A::Row],
    directory: &SchoolDirectory,
    filter: &NormalizedFilter,
    ids: &BTreeSet<SchoolId>,
) -> Folded<A::Totals> {
    group_fold(aggregator, rows, directory, filter, |school| {
        ids.contains(&school).then_some(())
    })
    .remove(&())
    .unwrap_or_default()
}

/// Aggregate of every row whose school matches `filter`.
pub fn aggregate<A: DomainAggregator>(
    aggregator: &A,
    rows: &[A::Row],
    directory: &SchoolDirectory,
    filter: &NormalizedFilter,
) -> AggregateRecord<A::Summary> {
    let ids = directory.ids_matching(filter);
    let folded = fold_schools(aggregator, rows, directory, filter, &ids);
    AggregateRecord {
        entity: directory.label_for(filter),
        matched_schools: ids.len(),
        row_count: folded.row_count,
        summary: aggregator.derive(&folded.totals),
    }
}

/// One aggregate per entity one level below `filter`, in a single pass over
/// the rows. Children with no rows still get a zero-valued aggregate.
pub fn aggregate_by_children<A: DomainAggregator>(
    aggregator: &A,
    rows: &[A::Row],
    directory: &SchoolDirectory,
    filter: &NormalizedFilter,
) -> Vec<AggregateRecord<A::Summary>> {
    let children = directory.child_entities(filter);
    if children.is_empty() {
        return Vec::new();
    }

    let child_of: HashMap<SchoolId, usize> = children
        .iter()
        .enumerate()
        .flat_map(|(i, child)| child.ids.iter().map(move |id| (*id, i)))
        .collect();

    let mut groups = group_fold(aggregator, rows, directory, filter, |school| {
        child_of.get(&school).copied()
    });

    children
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            let folded = groups.remove(&i).unwrap_or_default();
            AggregateRecord {
                entity: child.label,
                matched_schools: child.ids.len(),
                row_count: folded.row_count,
                summary: aggregator.derive(&folded.totals),
            }
        })
        .collect()
}

/// Per-school totals of the schools matching `filter`.
pub fn totals_by_school<A: DomainAggregator>(
    aggregator: &A,
    rows: &[A::Row],
    directory: &SchoolDirectory,
    filter: &NormalizedFilter,
) -> BTreeMap<SchoolId, Folded<A::Totals>> {
    let ids = directory.ids_matching(filter);
    group_fold(aggregator, rows, directory, filter, |school| {
        ids.contains(&school).then_some(school)
    })
}

/// Merge a sequence of totals with the aggregator's merge rule.
pub fn merge_all<'a, A, I>(aggregator: &A, parts: I) -> Folded<A::Totals>
where
    A: DomainAggregator,
    A::Totals: 'a,
    I: IntoIterator<Item = &'a Folded<A::Totals>>,
{
    parts.into_iter().fold(Folded::default(), |mut acc, part| {
        aggregator.merge(&mut acc.totals, &part.totals);
        acc.row_count += part.row_count;
        acc
    })
}
