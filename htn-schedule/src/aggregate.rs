use std::{collections::HashMap, fmt::Display};

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::{Event, EventType};

pub const NO_DATES: &str = "No dates";

const TIMELINE_LEN: usize = 4;

/// Per-type tallies over the whole dataset, independent of any active filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeCounts {
    pub workshop: usize,
    pub activity: usize,
    pub tech_talk: usize,
    pub other: usize,
}

impl TypeCounts {
    #[must_use]
    pub fn from_events(events: &[Event]) -> Self {
        events.iter().fold(Self::default(), |mut counts, event| {
            match event.event_type {
                EventType::Workshop => counts.workshop += 1,
                EventType::Activity => counts.activity += 1,
                EventType::TechTalk => counts.tech_talk += 1,
                EventType::Other(_) => counts.other += 1,
            }
            counts
        })
    }

    #[must_use]
    pub fn get(&self, event_type: &EventType) -> usize {
        match event_type {
            EventType::Workshop => self.workshop,
            EventType::Activity => self.activity,
            EventType::TechTalk => self.tech_talk,
            EventType::Other(_) => self.other,
        }
    }

    /// Number of known types that occur at least once.
    #[must_use]
    pub fn distinct(&self) -> usize {
        EventType::KNOWN
            .iter()
            .filter(|event_type| self.get(event_type) > 0)
            .count()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PermissionCounts {
    pub public: usize,
    pub private: usize,
}

impl PermissionCounts {
    #[must_use]
    pub fn from_events(events: &[Event]) -> Self {
        let private = events.iter().filter(|event| event.is_private()).count();
        Self {
            public: events.len() - private,
            private,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Earliest start to the latest end (or start, for open-ended events).
    #[must_use]
    pub fn of(events: &[Event]) -> Option<Self> {
        let start = events.iter().map(|event| event.start_time).min()?;
        let end = events
            .iter()
            .map(Event::end_or_start)
            .fold(start, |latest, end| latest.max(end));

        Some(Self { start, end })
    }

    /// "May 3", "May 3–4" or "May 30–Jun 2" depending on how far the range
    /// reaches in the viewer's zone.
    #[must_use]
    pub fn label<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let start = self.start.with_timezone(tz).date_naive();
        let end = self.end.with_timezone(tz).date_naive();
        let month_day = |date: NaiveDate| date.format("%b %-d").to_string();

        if start == end {
            month_day(start)
        } else if start.year() == end.year() && start.month() == end.month() {
            format!("{}\u{2013}{}", month_day(start), end.day())
        } else {
            format!("{}\u{2013}{}", month_day(start), month_day(end))
        }
    }
}

#[must_use]
pub fn date_range_label<Tz>(events: &[Event], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    DateRange::of(events).map_or_else(|| NO_DATES.to_string(), |range| range.label(tz))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    /// "Sunday, May 3"
    pub label: String,
    pub events: Vec<&'a Event>,
}

/// Buckets events by the calendar day of their start in `tz`. Buckets appear
/// in first-seen order and keep the input order within each day.
#[must_use]
pub fn group_by_day<'a, Tz: TimeZone>(events: &'a [Event], tz: &Tz) -> Vec<DayGroup<'a>> {
    let mut groups: Vec<DayGroup<'a>> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for event in events {
        let date = event.start_time.with_timezone(tz).date_naive();
        let slot = *index.entry(date).or_insert_with(|| {
            groups.push(DayGroup {
                date,
                label: date.format("%A, %b %-d").to_string(),
                events: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].events.push(event);
    }

    groups
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Happening<'a> {
    pub now: Option<&'a Event>,
    pub next: Option<&'a Event>,
}

/// `now` is the first event whose `[start, end)` contains `instant`; `next`
/// is the first event starting strictly after it.
#[must_use]
pub fn now_and_next(events: &[Event], instant: DateTime<Utc>) -> Happening<'_> {
    Happening {
        now: events
            .iter()
            .find(|event| event.start_time <= instant && event.end_or_start() > instant),
        next: events.iter().find(|event| event.start_time > instant),
    }
}

/// Elapsed share of the schedule span in percent, clamped to `[0, 100]`.
#[must_use]
pub fn schedule_progress(events: &[Event], instant: DateTime<Utc>) -> Option<f64> {
    let range = DateRange::of(events)?;
    let span = (range.end - range.start).num_milliseconds();
    if span <= 0 {
        return None;
    }

    let elapsed = (instant - range.start).num_milliseconds();
    Some((elapsed as f64 / span as f64 * 100.0).clamp(0.0, 100.0))
}

#[must_use]
pub fn featured(events: &[Event]) -> Option<&Event> {
    events.first()
}

#[must_use]
pub fn timeline(events: &[Event]) -> &[Event] {
    &events[..events.len().min(TIMELINE_LEN)]
}

/// Everything the listing view derives for one query.
#[derive(Debug, Clone, Serialize)]
pub struct Overview<'a> {
    pub total: usize,
    pub matching: usize,
    pub type_counts: TypeCounts,
    pub distinct_types: usize,
    pub permission_counts: PermissionCounts,
    pub date_range: String,
    pub featured: Option<&'a Event>,
    pub timeline: &'a [Event],
    #[serde(flatten)]
    pub happening: Happening<'a>,
    pub progress: Option<f64>,
    pub days: Vec<DayGroup<'a>>,
}

impl<'a> Overview<'a> {
    /// `all` is the unfiltered dataset used for counts; `filtered` is the
    /// pipeline output every other aggregate is derived from.
    #[must_use]
    pub fn new<Tz>(all: &[Event], filtered: &'a [Event], instant: DateTime<Utc>, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let type_counts = TypeCounts::from_events(all);

        Self {
            total: all.len(),
            matching: filtered.len(),
            type_counts,
            distinct_types: type_counts.distinct(),
            permission_counts: PermissionCounts::from_events(all),
            date_range: date_range_label(filtered, tz),
            featured: featured(filtered),
            timeline: timeline(filtered),
            happening: now_and_next(filtered, instant),
            progress: schedule_progress(filtered, instant),
            days: group_by_day(filtered, tz),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};

    use super::*;
    use crate::query::fixtures::{at, event, timed};
    use crate::{Permission, Query, TypeFilter};

    fn day(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn counts_types_over_the_full_dataset() {
        let events = vec![
            event(1, "Rust", EventType::Workshop, Permission::Public),
            event(2, "Go", EventType::Workshop, Permission::Private),
            event(3, "Yoga", EventType::Activity, Permission::Public),
        ];

        let filtered = Query::new(false)
            .with_type(TypeFilter::Only(EventType::Activity))
            .apply(&events);
        assert_eq!(filtered.len(), 1);

        let counts = TypeCounts::from_events(&events);
        assert_eq!(
            counts,
            TypeCounts {
                workshop: 2,
                activity: 1,
                tech_talk: 0,
                other: 0
            }
        );
        assert_eq!(counts.distinct(), 2);
        assert_eq!(
            PermissionCounts::from_events(&events),
            PermissionCounts {
                public: 2,
                private: 1
            }
        );
    }

    #[test]
    fn unknown_types_are_counted_aside() {
        let events = vec![event(1, "Snack", EventType::Other("food".into()), Permission::Public)];
        let counts = TypeCounts::from_events(&events);
        assert_eq!(counts.other, 1);
        assert_eq!(counts.distinct(), 0);
    }

    #[test]
    fn half_open_now_and_missing_next() {
        let events = vec![
            timed(1, at(9, 0), Some(at(10, 0))),
            timed(2, at(10, 0), Some(at(11, 0))),
        ];

        let happening = now_and_next(&events, at(10, 0));
        assert_eq!(happening.now.map(|event| event.id), Some(2));
        assert_eq!(happening.next, None);

        let early = now_and_next(&events, at(8, 0));
        assert_eq!(early.now, None);
        assert_eq!(early.next.map(|event| event.id), Some(1));
    }

    #[test]
    fn open_ended_events_are_never_current() {
        let events = vec![timed(1, at(9, 0), None)];
        assert_eq!(now_and_next(&events, at(9, 0)).now, None);
    }

    #[test]
    fn date_range_labels() {
        let single = vec![timed(1, day(5, 3, 9), Some(day(5, 3, 17)))];
        let two_days = vec![
            timed(1, day(5, 3, 9), Some(day(5, 3, 10))),
            timed(2, day(5, 4, 9), None),
        ];
        let across_months = vec![
            timed(1, day(5, 30, 9), Some(day(5, 30, 10))),
            timed(2, day(6, 1, 9), Some(day(6, 2, 12))),
        ];

        assert_eq!(date_range_label(&single, &Utc), "May 3");
        assert_eq!(date_range_label(&two_days, &Utc), "May 3\u{2013}4");
        assert_eq!(date_range_label(&across_months, &Utc), "May 30\u{2013}Jun 2");
        assert_eq!(date_range_label(&[], &Utc), NO_DATES);
    }

    #[test]
    fn date_range_tolerates_end_before_start() {
        let events = vec![timed(1, day(5, 3, 9), Some(day(5, 2, 9)))];
        let range = DateRange::of(&events).unwrap();
        assert_eq!(range.start, range.end);
        assert_eq!(range.label(&Utc), "May 3");
    }

    #[test]
    fn groups_by_local_day_in_first_seen_order() {
        let events = vec![
            timed(1, day(5, 4, 9), None),
            timed(2, day(5, 4, 13), None),
            timed(3, day(5, 5, 10), None),
        ];

        let groups = group_by_day(&events, &Utc);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Monday, May 4");
        assert_eq!(
            groups[0].events.iter().map(|event| event.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(groups[1].label, "Tuesday, May 5");
        assert_eq!(groups[1].events[0].id, 3);

        // 02:00 UTC on the 5th is still the 4th in Toronto.
        let toronto = FixedOffset::west_opt(4 * 3600).unwrap();
        let shifted = vec![timed(4, day(5, 4, 20), None), timed(5, day(5, 5, 2), None)];
        let groups = group_by_day(&shifted, &toronto);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].events.len(), 2);
    }

    #[test]
    fn progress_is_clamped_and_needs_a_span() {
        let events = vec![
            timed(1, at(9, 0), Some(at(10, 0))),
            timed(2, at(10, 0), Some(at(13, 0))),
        ];

        assert_eq!(schedule_progress(&events, at(10, 0)), Some(25.0));
        assert_eq!(schedule_progress(&events, at(6, 0)), Some(0.0));
        assert_eq!(schedule_progress(&events, at(20, 0)), Some(100.0));
        assert_eq!(schedule_progress(&[], at(10, 0)), None);
        assert_eq!(schedule_progress(&[timed(3, at(9, 0), None)], at(9, 0)), None);
    }

    #[test]
    fn overview_combines_filtered_and_full_views() {
        let events = vec![
            timed(1, at(9, 0), Some(at(10, 0))),
            timed(2, at(10, 0), Some(at(11, 0))),
            timed(3, at(11, 0), Some(at(12, 0))),
            timed(4, at(12, 0), Some(at(13, 0))),
            timed(5, at(13, 0), Some(at(14, 0))),
        ];
        let filtered = Query::new(false).apply(&events);

        let overview = Overview::new(&events, &filtered, at(10, 30), &Utc);
        assert_eq!(overview.total, 5);
        assert_eq!(overview.matching, 5);
        assert_eq!(overview.featured.map(|event| event.id), Some(1));
        assert_eq!(overview.timeline.len(), 4);
        assert_eq!(overview.happening.now.map(|event| event.id), Some(2));
        assert_eq!(overview.happening.next.map(|event| event.id), Some(3));
        assert_eq!(overview.date_range, "May 3");
        assert_eq!(overview.days.len(), 1);

        let json = serde_json::to_value(&overview).unwrap();
        assert_eq!(json["now"]["id"], 2);
        assert_eq!(json["type_counts"]["activity"], 5);
    }
}
