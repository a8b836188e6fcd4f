use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Identifier of an [`Item`].
///
/// Backed by a UUIDv7, so ids sort in generation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Assignment,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("submitted at {submitted_at} before creation at {created_at}")]
    SubmittedBeforeCreated {
        created_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
    },
    #[error("item has a submission time but is not completed")]
    SubmittedButIncomplete,
}

/// The caller supplied part of an [`Item`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewItem {
    pub kind: ItemKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Option<Priority>,
}

impl NewItem {
    pub fn task(title: impl Into<String>, due_date: NaiveDate, priority: Priority) -> Self {
        Self {
            kind: ItemKind::Task,
            title: title.into(),
            description: String::new(),
            due_date,
            priority: Some(priority),
        }
    }

    pub fn assignment(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            kind: ItemKind::Assignment,
            title: title.into(),
            description: String::new(),
            due_date,
            priority: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A dated, completable entry on one of the screens.
///
/// Tasks always carry a priority, assignments never do. `created_at` is
/// fixed at construction and `submitted_at` is present exactly while the
/// item is completed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Item {
    id: ItemId,
    kind: ItemKind,
    title: String,
    description: String,
    due_date: NaiveDate,
    priority: Option<Priority>,
    completed: bool,
    created_at: DateTime<Utc>,
    submitted_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn new(new: NewItem, now: DateTime<Utc>) -> Result<Self, ItemError> {
        let title = validate_title(&new.title)?;

        Ok(Self {
            id: ItemId::generate(),
            kind: new.kind,
            title,
            description: new.description,
            due_date: new.due_date,
            priority: normalize_priority(new.kind, new.priority),
            completed: false,
            created_at: now,
            submitted_at: None,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// The due date passes at the start of its day, 00:00 UTC.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.due_date.and_time(NaiveTime::MIN).and_utc() < now
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.is_past_due(now)
    }

    /// Flips completion. Completing stamps `submitted_at`, un-completing
    /// clears it.
    pub fn toggle(&mut self, now: DateTime<Utc>) {
        self.set_completed(!self.completed, now);
    }

    /// Marks the item completed, returning `false` if it already was.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }

        self.set_completed(true, now);
        true
    }

    fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;

        // submitted_at never precedes created_at
        self.submitted_at = completed.then(|| now.max(self.created_at));
    }

    pub(crate) fn matches_lowercase(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(query)
            || self.description.to_lowercase().contains(query)
    }
}

/// An item as written in a seed file.
///
/// Missing ids are generated and a missing `created_at` defaults to the
/// load time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemRecord {
    #[serde(default)]
    pub id: Option<ItemId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ItemRecord {
    pub fn into_item(self, kind: ItemKind, now: DateTime<Utc>) -> Result<Item, ItemError> {
        let title = validate_title(&self.title)?;
        let created_at = self.created_at.unwrap_or(now);

        let submitted_at = match (self.completed, self.submitted_at) {
            (false, Some(_)) => return Err(ItemError::SubmittedButIncomplete),
            (false, None) => None,
            (true, Some(submitted_at)) if submitted_at < created_at => {
                return Err(ItemError::SubmittedBeforeCreated {
                    created_at,
                    submitted_at,
                });
            }
            (true, Some(submitted_at)) => Some(submitted_at),
            (true, None) => Some(created_at),
        };

        Ok(Item {
            id: self.id.unwrap_or_else(ItemId::generate),
            kind,
            title,
            description: self.description,
            due_date: self.due_date,
            priority: normalize_priority(kind, self.priority),
            completed: self.completed,
            created_at,
            submitted_at,
        })
    }
}

fn validate_title(title: &str) -> Result<String, ItemError> {
    let title = title.trim();

    if title.is_empty() {
        return Err(ItemError::EmptyTitle);
    }

    Ok(title.to_owned())
}

fn normalize_priority(kind: ItemKind, priority: Option<Priority>) -> Option<Priority> {
    match kind {
        ItemKind::Task => Some(priority.unwrap_or_default()),
        ItemKind::Assignment => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn new_assigns_id_and_creation_time() {
        let now = at(2025, 1, 1);
        let new = NewItem::task("Bio Notes", date(2025, 1, 25), Priority::High);
        let item = Item::new(new, now).unwrap();

        assert!(!item.id().as_uuid().is_nil());
        assert_eq!(item.created_at(), now);
        assert_eq!(item.submitted_at(), None);
        assert!(!item.is_completed());
        assert_eq!(item.priority(), Some(Priority::High));
    }

    #[test]
    fn new_rejects_blank_title() {
        let new = NewItem::assignment("   ", date(2025, 1, 25));
        let err = Item::new(new, at(2025, 1, 1)).unwrap_err();
        assert_eq!(err, ItemError::EmptyTitle);
    }

    #[test]
    fn new_trims_title() {
        let new = NewItem::assignment("  Essay ", date(2025, 1, 25));
        let item = Item::new(new, at(2025, 1, 1)).unwrap();
        assert_eq!(item.title(), "Essay");
    }

    #[test]
    fn priority_follows_kind() {
        let mut task = NewItem::task("Read", date(2025, 1, 25), Priority::Low);
        task.priority = None;
        let task = Item::new(task, at(2025, 1, 1)).unwrap();
        assert_eq!(task.priority(), Some(Priority::Medium));

        let mut assignment = NewItem::assignment("Lab report", date(2025, 1, 25));
        assignment.priority = Some(Priority::High);
        let assignment = Item::new(assignment, at(2025, 1, 1)).unwrap();
        assert_eq!(assignment.priority(), None);
    }

    #[test]
    fn ids_sort_in_generation_order() {
        let now = at(2025, 1, 1);
        let ids: Vec<_> = (0..16)
            .map(|i| {
                Item::new(NewItem::assignment(format!("a{i}"), date(2025, 1, 25)), now)
                    .unwrap()
                    .id()
            })
            .collect();

        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn toggle_stamps_and_clears_submission() {
        let created = at(2025, 1, 1);
        let mut item = Item::new(NewItem::assignment("Essay", date(2025, 1, 25)), created).unwrap();

        let toggled = at(2025, 1, 20);
        item.toggle(toggled);
        assert!(item.is_completed());
        assert_eq!(item.submitted_at(), Some(toggled));

        item.toggle(at(2025, 1, 21));
        assert!(!item.is_completed());
        assert_eq!(item.submitted_at(), None);
        assert_eq!(item.created_at(), created);
    }

    #[test]
    fn submission_never_precedes_creation() {
        let created = at(2025, 1, 10);
        let mut item = Item::new(NewItem::assignment("Essay", date(2025, 1, 25)), created).unwrap();

        item.toggle(created - Duration::hours(3));
        assert_eq!(item.submitted_at(), Some(created));
    }

    #[test]
    fn complete_is_idempotent() {
        let new = NewItem::assignment("Essay", date(2025, 1, 25));
        let mut item = Item::new(new, at(2025, 1, 1)).unwrap();

        assert!(item.complete(at(2025, 1, 2)));
        assert!(!item.complete(at(2025, 1, 3)));
        assert_eq!(item.submitted_at(), Some(at(2025, 1, 2)));
    }

    #[test]
    fn overdue_from_start_of_due_day() {
        let new = NewItem::assignment("Essay", date(2024, 1, 15));
        let item = Item::new(new, at(2024, 1, 1)).unwrap();

        let midnight = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        assert!(!item.is_overdue(midnight));
        assert!(item.is_overdue(midnight + Duration::seconds(1)));
        assert!(item.is_overdue(at(2024, 1, 15)));
        assert!(!item.is_overdue(at(2024, 1, 14)));
    }

    #[test]
    fn record_keeps_seeded_times() {
        let record = ItemRecord {
            id: None,
            title: "React Components Assignment".into(),
            description: String::new(),
            due_date: date(2024, 1, 15),
            priority: None,
            completed: true,
            created_at: Some(at(2024, 1, 1)),
            submitted_at: Some(at(2024, 1, 14)),
        };

        let item = record.into_item(ItemKind::Assignment, at(2025, 1, 1)).unwrap();
        assert_eq!(item.created_at(), at(2024, 1, 1));
        assert_eq!(item.submitted_at(), Some(at(2024, 1, 14)));
    }

    #[test]
    fn record_rejects_inconsistent_submission() {
        let mut record = ItemRecord {
            id: None,
            title: "Essay".into(),
            description: String::new(),
            due_date: date(2024, 1, 15),
            priority: None,
            completed: false,
            created_at: Some(at(2024, 1, 10)),
            submitted_at: Some(at(2024, 1, 14)),
        };

        let err = record.clone().into_item(ItemKind::Assignment, at(2025, 1, 1)).unwrap_err();
        assert_eq!(err, ItemError::SubmittedButIncomplete);

        record.completed = true;
        record.submitted_at = Some(at(2024, 1, 5));
        let err = record.into_item(ItemKind::Assignment, at(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, ItemError::SubmittedBeforeCreated { .. }));
    }

    #[test]
    fn item_serializes_wire_fields() {
        let new = NewItem::task("Bio Notes", date(2025, 1, 25), Priority::Medium);
        let item = Item::new(new, at(2025, 1, 1)).unwrap();
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["id"], item.id().to_string());
        assert_eq!(json["kind"], "task");
        assert_eq!(json["due_date"], "2025-01-25");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["completed"], false);
        assert!(json["submitted_at"].is_null());
    }
}
