//! Personal/global settings merge and column ordering.
//!
//! Every table setting kind (view, ordering, sort-within-column, filter) is
//! keyed by (user, entity, column) with a `for_all` variant carrying a NULL
//! user. Merging is first-available with personal winning over global.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::predicate::{FilterOp, SortDirection, SortSpec};

/// Display rule for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRule {
    pub hidden: bool,
    pub width: Option<i32>,
}

/// Sort rule for one column, with a priority for multi-column sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortRule {
    pub direction: SortDirection,
    pub priority: i32,
}

/// Filter rule for one column as stored (operator + raw value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub operator: FilterOp,
    pub value: Value,
}

/// A loaded setting row of some kind, before merging.
#[derive(Debug, Clone)]
pub struct SettingRow<T> {
    pub column: String,
    /// False for `for_all` (organization-wide) rows.
    pub personal: bool,
    pub rule: T,
}

/// The two-slot merge structure: a personal row and a global row for the
/// same (entity, column) key.
#[derive(Debug, Clone)]
pub struct SettingSlot<T> {
    pub personal: Option<T>,
    pub global: Option<T>,
}

// Manual impl: a derived Default would demand `T: Default`, and the rule
// types carried here have no meaningful default.
impl<T> Default for SettingSlot<T> {
    fn default() -> Self {
        Self {
            personal: None,
            global: None,
        }
    }
}

impl<T> SettingSlot<T> {
    /// Personal wins; global is the fallback.
    pub fn resolve(&self) -> Option<&T> {
        self.personal.as_ref().or(self.global.as_ref())
    }
}

/// Group rows by column into two-slot structures.
///
/// Duplicate rows for the same slot can exist under the weak concurrency
/// contract; the first one loaded wins.
pub fn merge_by_column<T>(rows: Vec<SettingRow<T>>) -> BTreeMap<String, SettingSlot<T>> {
    let mut slots: BTreeMap<String, SettingSlot<T>> = BTreeMap::new();

    for row in rows {
        let slot = slots.entry(row.column).or_default();
        let target = if row.personal {
            &mut slot.personal
        } else {
            &mut slot.global
        };
        if target.is_none() {
            *target = Some(row.rule);
        }
    }

    slots
}

/// Compute the final column order.
///
/// Columns with an explicit ordering rule come first, ascending, ties
/// broken by column name. Columns without a rule follow in definition
/// order, numbered past the highest explicit value so they always trail
/// deterministically. Returns (column, effective ordering) pairs.
pub fn order_columns(
    definition_order: &[String],
    explicit: &BTreeMap<String, i32>,
) -> Vec<(String, i32)> {
    let mut ordered: Vec<(String, i32)> = definition_order
        .iter()
        .filter_map(|col| explicit.get(col).map(|n| (col.clone(), *n)))
        .collect();
    ordered.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut next = ordered.iter().map(|(_, n)| *n).max().unwrap_or(0);
    for col in definition_order {
        if !explicit.contains_key(col) {
            next += 1;
            ordered.push((col.clone(), next));
        }
    }

    ordered
}

/// Merge per-column sort rules into one multi-column sort list, ordered by
/// explicit priority ascending (ties by column name).
pub fn merge_sorts(slots: &BTreeMap<String, SettingSlot<SortRule>>) -> Vec<SortSpec> {
    let mut rules: Vec<(&String, &SortRule)> = slots
        .iter()
        .filter_map(|(col, slot)| slot.resolve().map(|rule| (col, rule)))
        .collect();
    rules.sort_by(|a, b| a.1.priority.cmp(&b.1.priority).then_with(|| a.0.cmp(b.0)));

    rules
        .into_iter()
        .map(|(col, rule)| SortSpec {
            column: col.clone(),
            direction: rule.direction,
        })
        .collect()
}
