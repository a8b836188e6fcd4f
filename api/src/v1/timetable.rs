use std::fmt;

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("event title must not be empty")]
    EmptyTitle,
    #[error("event ends at {end} before it starts at {start}")]
    InvalidSlot { start: NaiveTime, end: NaiveTime },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default)]
    pub subject: Option<String>,
}

/// A recurring weekly class slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Event {
    id: EventId,
    title: String,
    weekday: Weekday,
    start: NaiveTime,
    end: NaiveTime,
    subject: Option<String>,
}

impl Event {
    pub fn new(new: NewEvent) -> Result<Self, EventError> {
        let title = new.title.trim();

        if title.is_empty() {
            return Err(EventError::EmptyTitle);
        }

        if new.end <= new.start {
            return Err(EventError::InvalidSlot {
                start: new.start,
                end: new.end,
            });
        }

        // blank subjects are the same as none
        let subject = (new.subject)
            .map(|subject| subject.trim().to_owned())
            .filter(|subject| !subject.is_empty());

        Ok(Self {
            id: EventId::generate(),
            title: title.to_owned(),
            weekday: new.weekday,
            start: new.start,
            end: new.end,
            subject,
        })
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DaySchedule {
    pub weekday: Weekday,
    pub events: Vec<Event>,
}

#[derive(Clone, Debug, Default)]
pub struct Timetable {
    events: Vec<Event>,
}

impl Timetable {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn add(&mut self, new: NewEvent) -> Result<&Event, EventError> {
        self.events.push(Event::new(new)?);
        Ok(&self.events[self.events.len() - 1])
    }

    /// Events on `weekday`, ordered by start time.
    pub fn day(&self, weekday: Weekday) -> DaySchedule {
        let mut events: Vec<_> = (self.events.iter())
            .filter(|event| event.weekday == weekday)
            .cloned()
            .collect();

        events.sort_by_key(|event| (event.start, event.end));

        DaySchedule { weekday, events }
    }

    /// Monday through Sunday.
    pub fn week(&self) -> Vec<DaySchedule> {
        let mut weekday = Weekday::Mon;
        let mut week = Vec::with_capacity(7);

        for _ in 0..7 {
            week.push(self.day(weekday));
            weekday = weekday.succ();
        }

        week
    }

    pub fn today(&self, now: DateTime<Utc>) -> DaySchedule {
        self.day(now.weekday())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn time(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    fn event(title: &str, weekday: Weekday, start: NaiveTime, end: NaiveTime) -> NewEvent {
        NewEvent {
            title: title.into(),
            weekday,
            start,
            end,
            subject: None,
        }
    }

    #[test]
    fn rejects_empty_title_and_bad_slot() {
        let err = Event::new(event(" ", Weekday::Mon, time(9, 0), time(10, 30))).unwrap_err();
        assert_eq!(err, EventError::EmptyTitle);

        let new = event("Physics Lab", Weekday::Mon, time(11, 0), time(11, 0));
        let err = Event::new(new).unwrap_err();
        assert!(matches!(err, EventError::InvalidSlot { .. }));
    }

    #[test]
    fn blank_subject_is_dropped() {
        let mut new = event("Chemistry", Weekday::Wed, time(14, 0), time(15, 30));
        new.subject = Some("  ".into());

        assert_eq!(Event::new(new).unwrap().subject(), None);
    }

    #[test]
    fn day_is_sorted_by_start() {
        let mut timetable = Timetable::default();
        timetable.add(event("Chemistry", Weekday::Tue, time(14, 0), time(15, 30))).unwrap();
        timetable.add(event("Mathematics", Weekday::Tue, time(9, 0), time(10, 30))).unwrap();
        timetable.add(event("Physics Lab", Weekday::Fri, time(11, 0), time(12, 30))).unwrap();

        let tuesday = timetable.day(Weekday::Tue);
        let titles: Vec<_> = tuesday.events.iter().map(Event::title).collect();
        assert_eq!(titles, ["Mathematics", "Chemistry"]);
    }

    #[test]
    fn week_starts_on_monday() {
        let mut timetable = Timetable::default();
        timetable.add(event("Mathematics", Weekday::Sun, time(9, 0), time(10, 30))).unwrap();

        let week = timetable.week();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].weekday, Weekday::Mon);
        assert_eq!(week[6].weekday, Weekday::Sun);
        assert_eq!(week[6].events.len(), 1);
        assert!(week[..6].iter().all(|day| day.events.is_empty()));
    }

    #[test]
    fn today_uses_weekday_of_now() {
        let mut timetable = Timetable::default();
        timetable.add(event("Mathematics", Weekday::Sat, time(9, 0), time(10, 30))).unwrap();

        // 2025-02-01 is a Saturday
        let now = Utc.with_ymd_and_hms(2025, 2, 1, 7, 0, 0).unwrap();
        let today = timetable.today(now);
        assert_eq!(today.weekday, Weekday::Sat);
        assert_eq!(today.events.len(), 1);
    }
}
