//! Shared numeric helpers used by every aggregator

use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Debug;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Mean floored to an integer; an empty group is an error
pub fn floored_mean(values: &[f64], group: &str) -> Result<i64> {
    mean(values)
        .map(|m| m.floor() as i64)
        .ok_or_else(|| Error::EmptyGroup(group.to_string()))
}

/// Floored mean of every group
pub fn average<K>(groups: &BTreeMap<K, Vec<f64>>) -> Result<BTreeMap<K, i64>>
where
    K: Ord + Clone + Debug,
{
    groups
        .iter()
        .map(|(key, values)| Ok((key.clone(), floored_mean(values, &format!("{:?}", key))?)))
        .collect()
}

/// Stable sort of (key, value) pairs by value
///
/// Equal values keep their relative order in both directions.
pub fn sort_by_value<K, V: PartialOrd>(pairs: &mut [(K, V)], descending: bool) {
    if descending {
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    } else {
        pairs.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    }
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
