use std::collections::HashMap;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::types::{CalculationResult, GroupStat, StatsSummary, TimeSeriesPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Category,
    Subcategory,
    /// Accounting month of the input (`YYYY-MM`).
    Period,
    /// Calendar day the result was created (`YYYY-MM-DD`).
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// First appearance in the input.
    #[default]
    Insertion,
    KeyAscending,
    TotalDescending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Day,
}

fn group_key(result: &CalculationResult, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Category => result.category.to_string(),
        GroupBy::Subcategory => result
            .subcategory
            .clone()
            .unwrap_or_else(|| result.category.to_string()),
        GroupBy::Period => result.period.to_string(),
        GroupBy::Day => result.created_at.format("%Y-%m-%d").to_string(),
    }
}

/// Sums kgCO2e and counts records per group. Percentages are of the signed
/// grand total and are 0 when that total is 0.
pub fn aggregate(results: &[CalculationResult], group_by: GroupBy, sort: SortOrder) -> Vec<GroupStat> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<GroupStat> = Vec::new();

    for r in results {
        let key = group_key(r, group_by);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                groups.push(GroupStat { key: key.clone(), total_kg_co2e: 0.0, record_count: 0, percentage: 0.0 });
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].total_kg_co2e += r.kg_co2e;
        groups[slot].record_count += 1;
    }

    let grand_total: f64 = groups.iter().map(|g| g.total_kg_co2e).sum();
    for g in &mut groups {
        g.percentage = if grand_total == 0.0 { 0.0 } else { g.total_kg_co2e / grand_total * 100.0 };
    }

    match sort {
        SortOrder::Insertion => {}
        SortOrder::KeyAscending => groups.sort_by(|a, b| a.key.cmp(&b.key)),
        SortOrder::TotalDescending => groups.sort_by_key(|g| std::cmp::Reverse(OrderedFloat(g.total_kg_co2e))),
    }
    groups
}

/// Chronological series for charts and the forecaster.
pub fn time_series(results: &[CalculationResult], granularity: Granularity) -> Vec<TimeSeriesPoint> {
    let group_by = match granularity {
        Granularity::Month => GroupBy::Period,
        Granularity::Day => GroupBy::Day,
    };
    aggregate(results, group_by, SortOrder::KeyAscending)
        .into_iter()
        .map(|g| TimeSeriesPoint { period: g.key, total_kg_co2e: g.total_kg_co2e, record_count: g.record_count })
        .collect()
}

/// Headline figures for the dashboard, relative to `reference` month.
pub fn summary(results: &[CalculationResult], reference: Period, now: DateTime<Utc>) -> StatsSummary {
    let previous = reference.previous();
    let mut total = 0.0;
    let mut this_month = 0.0;
    let mut last_month = 0.0;
    let mut periods = Vec::new();

    for r in results {
        total += r.kg_co2e;
        if r.period == reference {
            this_month += r.kg_co2e;
        } else if Some(r.period) == previous {
            last_month += r.kg_co2e;
        }
        if !periods.contains(&r.period) {
            periods.push(r.period);
        }
    }

    StatsSummary {
        total_kg_co2e: total,
        total_records: results.len() as u64,
        this_month_kg_co2e: this_month,
        last_month_kg_co2e: last_month,
        average_per_month: if periods.is_empty() { 0.0 } else { total / periods.len() as f64 },
        calculated_at: now,
    }
}
