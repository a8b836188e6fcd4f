//! Derived statistics over item collections.
//!
//! Every function here is pure: the input is never mutated and the current
//! time is always passed in by the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{Item, Priority};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    /// Subset of `pending`.
    pub overdue: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Completed,
    Overdue,
    Pending,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub total: usize,
    pub completed: usize,
}

pub type PriorityBreakdown = BTreeMap<Priority, PriorityCounts>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl StateFilter {
    pub fn accepts(self, item: &Item, now: DateTime<Utc>) -> bool {
        match self {
            StateFilter::All => true,
            StateFilter::Pending => !item.is_completed(),
            StateFilter::Completed => item.is_completed(),
            StateFilter::Overdue => item.is_overdue(now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub status: ItemStatus,
}

/// Activity within the ISO week (Monday 00:00 UTC onwards) containing `now`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub added: usize,
    pub completed: usize,
    /// `completed` as a share of `added`, capped at 100.
    pub productivity: u8,
}

/// Everything a screen renders from its collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub counts: StatusCounts,
    pub completion_rate: u8,
    pub by_priority: PriorityBreakdown,
    pub items: Vec<ItemView>,
}

pub fn count_by_status(items: &[Item], now: DateTime<Utc>) -> StatusCounts {
    let total = items.len();
    let completed = items.iter().filter(|item| item.is_completed()).count();
    let overdue = items.iter().filter(|item| item.is_overdue(now)).count();

    StatusCounts {
        total,
        completed,
        pending: total - completed,
        overdue,
    }
}

/// Rounded percentage of `part` in `whole`, `0` when `whole` is zero.
pub fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }

    let part = part.min(whole) as f64;
    (part / whole as f64 * 100.0).round() as u8
}

pub fn completion_rate(items: &[Item]) -> u8 {
    let completed = items.iter().filter(|item| item.is_completed()).count();
    percent(completed, items.len())
}

/// Completion wins over the due date, so a late submission still reads as
/// completed.
pub fn status_of(item: &Item, now: DateTime<Utc>) -> ItemStatus {
    if item.is_completed() {
        ItemStatus::Completed
    } else if item.is_overdue(now) {
        ItemStatus::Overdue
    } else {
        ItemStatus::Pending
    }
}

pub fn breakdown_by_priority(items: &[Item]) -> PriorityBreakdown {
    let mut breakdown = PriorityBreakdown::new();

    for item in items {
        let Some(priority) = item.priority() else {
            continue;
        };

        let counts = breakdown.entry(priority).or_default();
        counts.total += 1;

        if item.is_completed() {
            counts.completed += 1;
        }
    }

    breakdown
}

/// A whitespace-only query counts as empty. Any other query is matched
/// as given, spaces included.
pub fn filter_by_text<'a>(items: &'a [Item], query: &str) -> Vec<&'a Item> {
    if query.trim().is_empty() {
        return items.iter().collect();
    }

    let query = query.to_lowercase();

    (items.iter())
        .filter(|item| item.matches_lowercase(&query))
        .collect()
}

pub fn filter_by_state<'a>(
    items: &'a [Item],
    filter: StateFilter,
    now: DateTime<Utc>,
) -> Vec<&'a Item> {
    (items.iter())
        .filter(|item| filter.accepts(item, now))
        .collect()
}

pub fn weekly_summary(items: &[Item], now: DateTime<Utc>) -> WeeklySummary {
    let today = now.date_naive();
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let start = monday.and_time(NaiveTime::MIN).and_utc();
    let end = start + TimeDelta::weeks(1);

    let in_week = |at: DateTime<Utc>| start <= at && at < end;

    let added = (items.iter())
        .filter(|item| in_week(item.created_at()))
        .count();
    let completed = (items.iter())
        .filter(|item| item.submitted_at().is_some_and(in_week))
        .count();

    WeeklySummary {
        added,
        completed,
        productivity: percent(completed, added),
    }
}

/// Builds the view model for `visible`, with counts taken over all of
/// `items`.
pub fn summarize<'a>(
    items: &[Item],
    visible: impl IntoIterator<Item = &'a Item>,
    now: DateTime<Utc>,
) -> Summary {
    let items_view = (visible.into_iter())
        .map(|item| ItemView {
            item: item.clone(),
            status: status_of(item, now),
        })
        .collect();

    Summary {
        counts: count_by_status(items, now),
        completion_rate: completion_rate(items),
        by_priority: breakdown_by_priority(items),
        items: items_view,
    }
}
