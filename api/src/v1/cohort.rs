use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{percent, Item, ItemError, ItemId, ItemKind, ItemRecord, NewItem};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CohortError {
    #[error("assignment {0} not found")]
    NotFound(ItemId),
    #[error("duplicate assignment id {0}")]
    DuplicateId(ItemId),
    #[error("assignment description must not be empty")]
    EmptyDescription,
    #[error("all {assigned} students already submitted")]
    AllSubmitted { assigned: u32 },
    #[error("{completed} submissions recorded for {assigned} students")]
    TooManySubmissions { assigned: u32, completed: u32 },
    #[error(transparent)]
    Item(#[from] ItemError),
}

/// Badge shown on the instructor's view of an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortBadge {
    Overdue,
    Complete,
    InProgress,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewClassAssignment {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub assigned_students: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassAssignmentRecord {
    pub item: ItemRecord,
    #[serde(default)]
    pub assigned_students: u32,
    #[serde(default)]
    pub completed_students: u32,
}

/// An assignment handed out to a whole class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassAssignment {
    item: Item,
    assigned_students: u32,
    completed_students: u32,
}

impl ClassAssignment {
    pub fn new(new: NewClassAssignment, now: DateTime<Utc>) -> Result<Self, CohortError> {
        if new.description.trim().is_empty() {
            return Err(CohortError::EmptyDescription);
        }

        let item = NewItem::assignment(new.title, new.due_date).description(new.description);

        Ok(Self {
            item: Item::new(item, now)?,
            assigned_students: new.assigned_students,
            completed_students: 0,
        })
    }

    pub fn from_record(
        record: ClassAssignmentRecord,
        now: DateTime<Utc>,
    ) -> Result<Self, CohortError> {
        if record.completed_students > record.assigned_students {
            return Err(CohortError::TooManySubmissions {
                assigned: record.assigned_students,
                completed: record.completed_students,
            });
        }

        Ok(Self {
            item: record.item.into_item(ItemKind::Assignment, now)?,
            assigned_students: record.assigned_students,
            completed_students: record.completed_students,
        })
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn assigned_students(&self) -> u32 {
        self.assigned_students
    }

    pub fn completed_students(&self) -> u32 {
        self.completed_students
    }

    pub fn record_submission(&mut self) -> Result<(), CohortError> {
        if self.completed_students >= self.assigned_students {
            return Err(CohortError::AllSubmitted {
                assigned: self.assigned_students,
            });
        }

        self.completed_students += 1;
        Ok(())
    }

    pub fn completion_rate(&self) -> u8 {
        percent(
            self.completed_students as usize,
            self.assigned_students as usize,
        )
    }

    /// A passed deadline outranks completion here, unlike the student's
    /// own status.
    pub fn badge(&self, now: DateTime<Utc>) -> CohortBadge {
        let all_submitted =
            self.assigned_students > 0 && self.completed_students == self.assigned_students;

        if self.item.is_past_due(now) {
            CohortBadge::Overdue
        } else if all_submitted {
            CohortBadge::Complete
        } else {
            CohortBadge::InProgress
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> ClassAssignmentView {
        ClassAssignmentView {
            assignment: self.clone(),
            completion_rate: self.completion_rate(),
            badge: self.badge(now),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassAssignmentView {
    #[serde(flatten)]
    pub assignment: ClassAssignment,
    pub completion_rate: u8,
    pub badge: CohortBadge,
}

/// The instructor's assignments, newest first.
#[derive(Clone, Debug, Default)]
pub struct Cohort {
    assignments: Vec<ClassAssignment>,
}

impl Cohort {
    pub fn new(assignments: Vec<ClassAssignment>) -> Result<Self, CohortError> {
        let mut seen = HashSet::with_capacity(assignments.len());

        for assignment in &assignments {
            if !seen.insert(assignment.item.id()) {
                return Err(CohortError::DuplicateId(assignment.item.id()));
            }
        }

        Ok(Self { assignments })
    }

    pub fn assignments(&self) -> &[ClassAssignment] {
        &self.assignments
    }

    pub fn add(
        &mut self,
        new: NewClassAssignment,
        now: DateTime<Utc>,
    ) -> Result<&ClassAssignment, CohortError> {
        let assignment = ClassAssignment::new(new, now)?;
        self.assignments.insert(0, assignment);
        Ok(&self.assignments[0])
    }

    pub fn record_submission(&mut self, id: ItemId) -> Result<&ClassAssignment, CohortError> {
        let assignment = (self.assignments.iter_mut())
            .find(|assignment| assignment.item.id() == id)
            .ok_or(CohortError::NotFound(id))?;

        assignment.record_submission()?;
        Ok(&*assignment)
    }

    pub fn views(&self, now: DateTime<Utc>) -> Vec<ClassAssignmentView> {
        self.assignments.iter().map(|a| a.view(now)).collect()
    }
}
