//! Group-wise totals, shares and per-entity statistics over a long-form dataset.
//!
//! Every dashboard uses the same helpers and only varies the identifier column
//! and the family's [`Aggregate`]. Missing values never contribute to sums and
//! are excluded from the count used for means.

use std::collections::{BTreeMap, HashSet};

use cndc_parser::{CanonicalPeriod, LongDataset, LongRecord, ParserError};
use serde::Serialize;

use crate::config::Aggregate;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupKey {
    Period,
    Column(String),
}

impl GroupKey {
    pub fn column(name: impl Into<String>) -> Self {
        GroupKey::Column(name.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupValue {
    Period(CanonicalPeriod),
    Text(String),
}

impl GroupValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            GroupValue::Text(value) => Some(value.as_str()),
            GroupValue::Period(_) => None,
        }
    }

    pub fn as_period(&self) -> Option<CanonicalPeriod> {
        match self {
            GroupValue::Period(period) => Some(*period),
            GroupValue::Text(_) => None,
        }
    }
}

pub type Grouped<T> = BTreeMap<Vec<GroupValue>, T>;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Total {
    pub sum: f64,
    /// Non-missing values.
    pub count: usize,
    /// All rows in the group, missing included.
    pub rows: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Total {
    pub fn add(&mut self, value: Option<f64>) {
        self.rows += 1;
        let Some(value) = value else {
            return;
        };
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn value(&self, aggregate: Aggregate) -> Option<f64> {
        match aggregate {
            Aggregate::Sum => Some(self.sum),
            Aggregate::Mean => self.mean(),
        }
    }
}

#[derive(Clone, Copy)]
enum KeyPart {
    Period,
    Identifier(usize),
}

fn key_parts(dataset: &LongDataset, keys: &[GroupKey]) -> Result<Vec<KeyPart>> {
    keys.iter()
        .map(|key| match key {
            GroupKey::Period => Ok(KeyPart::Period),
            GroupKey::Column(name) => dataset
                .identifier_index(name)
                .map(KeyPart::Identifier)
                .ok_or_else(|| {
                    PipelineError::from(ParserError::UnknownColumn {
                        column: name.clone(),
                    })
                }),
        })
        .collect()
}

fn group_values(record: &LongRecord, parts: &[KeyPart]) -> Vec<GroupValue> {
    parts
        .iter()
        .map(|part| match part {
            KeyPart::Period => GroupValue::Period(record.period),
            KeyPart::Identifier(idx) => GroupValue::Text(record.identifiers[*idx].clone()),
        })
        .collect()
}

/// Totals per distinct combination of `keys`. An empty key list yields a single
/// grand-total group under the empty key.
pub fn total_by(dataset: &LongDataset, keys: &[GroupKey]) -> Result<Grouped<Total>> {
    let parts = key_parts(dataset, keys)?;
    let mut totals: Grouped<Total> = BTreeMap::new();
    for record in &dataset.records {
        totals
            .entry(group_values(record, &parts))
            .or_default()
            .add(record.value);
    }
    Ok(totals)
}

/// One value per group under the family's aggregate, e.g. the system curve
/// (`[Period]`) or one entity's curve (`[Period]` on a filtered dataset).
pub fn series(
    dataset: &LongDataset,
    keys: &[GroupKey],
    aggregate: Aggregate,
) -> Result<Grouped<Option<f64>>> {
    Ok(total_by(dataset, keys)?
        .into_iter()
        .map(|(key, total)| (key, total.value(aggregate)))
        .collect())
}

/// Percentage share of each `entity` value in the total of its `within` group.
///
/// Output keys are the `within` values followed by the entity value. With an
/// empty `within` the denominator is the grand total. A group whose total is
/// zero yields `None` for every entity in it.
pub fn share_of_total(
    dataset: &LongDataset,
    entity: &str,
    within: &[GroupKey],
) -> Result<Grouped<Option<f64>>> {
    let mut keys = within.to_vec();
    keys.push(GroupKey::column(entity));

    let group_totals = total_by(dataset, within)?;
    let entity_totals = total_by(dataset, &keys)?;

    let shares = entity_totals
        .into_iter()
        .map(|(key, total)| {
            let group_sum = group_totals
                .get(&key[..within.len()])
                .map_or(0.0, |group| group.sum);
            let share = (group_sum != 0.0).then(|| total.sum / group_sum * 100.0);
            (key, share)
        })
        .collect();
    Ok(shares)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    /// Months with at least one non-missing value.
    pub periods: usize,
    pub min: Option<f64>,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    /// Mean of the entity's monthly shares of the system total. Differs from the
    /// entity's share of the overall total whenever monthly totals differ.
    pub average_share: Option<f64>,
}

/// Per-entity min/mean/max of the entity's monthly sums, plus its average
/// monthly share. Sorted by average share, largest first.
pub fn summary_stats(dataset: &LongDataset, entity: &str) -> Result<Vec<EntitySummary>> {
    summary_stats_with(dataset, entity, Aggregate::Sum)
}

/// [`summary_stats`] with the monthly entity value combined under `aggregate`.
pub fn summary_stats_with(
    dataset: &LongDataset,
    entity: &str,
    aggregate: Aggregate,
) -> Result<Vec<EntitySummary>> {
    let monthly = total_by(dataset, &[GroupKey::Period, GroupKey::column(entity)])?;
    let shares = share_of_total(dataset, entity, &[GroupKey::Period])?;

    let mut per_entity: BTreeMap<String, (Total, Total)> = BTreeMap::new();
    for (key, total) in &monthly {
        let Some(name) = key[1].as_text() else {
            continue;
        };
        let (values, share_acc) = per_entity.entry(name.to_string()).or_default();
        if total.count > 0 {
            values.add(total.value(aggregate));
        }
        share_acc.add(shares.get(key).copied().flatten());
    }

    let mut summaries: Vec<EntitySummary> = per_entity
        .into_iter()
        .map(|(entity, (values, share_acc))| EntitySummary {
            entity,
            periods: values.count,
            min: values.min,
            mean: values.mean(),
            max: values.max,
            average_share: share_acc.mean(),
        })
        .collect();

    summaries.sort_by(|a, b| {
        let a_share = a.average_share.unwrap_or(f64::NEG_INFINITY);
        let b_share = b.average_share.unwrap_or(f64::NEG_INFINITY);
        b_share
            .total_cmp(&a_share)
            .then_with(|| a.entity.cmp(&b.entity))
    });
    Ok(summaries)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub rows: usize,
    /// Distinct values per identifier column, in column order.
    pub distinct: Vec<(String, usize)>,
    pub total: f64,
    pub first_period: Option<CanonicalPeriod>,
    pub last_period: Option<CanonicalPeriod>,
}

pub fn system_overview(dataset: &LongDataset) -> Overview {
    let distinct = dataset
        .identifier_columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let values: HashSet<&str> = dataset
                .records
                .iter()
                .map(|record| record.identifiers[idx].as_str())
                .collect();
            (column.clone(), values.len())
        })
        .collect();

    Overview {
        rows: dataset.len(),
        distinct,
        total: dataset.records.iter().filter_map(|r| r.value).sum(),
        first_period: dataset.records.iter().map(|r| r.period).min(),
        last_period: dataset.records.iter().map(|r| r.period).max(),
    }
}
