use chrono::{Datelike, Days, Months, NaiveDate, TimeZone};
use serde::Serialize;

use crate::Event;

pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    /// "2026-05-03"
    pub key: String,
    pub in_month: bool,
    pub is_today: bool,
    pub events: Vec<&'a Event>,
}

/// Six Sunday-first weeks covering one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthGrid<'a> {
    pub month: NaiveDate,
    pub label: String,
    pub cells: Vec<DayCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    #[must_use]
    pub fn new<Tz: TimeZone>(
        month: NaiveDate,
        events: &'a [Event],
        tz: &Tz,
        today: NaiveDate,
    ) -> Self {
        let month = first_of_month(month);
        let lead = u64::from(month.weekday().num_days_from_sunday());
        let mut day = month - Days::new(lead);

        let mut cells = Vec::with_capacity(GRID_CELLS);
        for _ in 0..GRID_CELLS {
            cells.push(DayCell {
                date: day,
                key: day.format("%Y-%m-%d").to_string(),
                in_month: day.year() == month.year() && day.month() == month.month(),
                is_today: day == today,
                events: Vec::new(),
            });
            day = day + Days::new(1);
        }

        let first = cells[0].date;
        for event in events {
            let date = event.start_time.with_timezone(tz).date_naive();
            let Ok(offset) = usize::try_from((date - first).num_days()) else {
                continue;
            };
            if let Some(cell) = cells.get_mut(offset) {
                cell.events.push(event);
            }
        }

        for cell in &mut cells {
            cell.events.sort_by_key(|event| event.start_time);
        }

        Self {
            month,
            label: month.format("%B %Y").to_string(),
            cells,
        }
    }

    #[must_use]
    pub fn previous(&self) -> NaiveDate {
        self.month - Months::new(1)
    }

    #[must_use]
    pub fn next(&self) -> NaiveDate {
        self.month + Months::new(1)
    }
}

/// The month the calendar opens on: the one holding the earliest event, or
/// the current one when there is nothing scheduled.
#[must_use]
pub fn initial_month<Tz: TimeZone>(events: &[Event], tz: &Tz, today: NaiveDate) -> NaiveDate {
    events
        .iter()
        .map(|event| event.start_time)
        .min()
        .map_or(today, |start| start.with_timezone(tz).date_naive())
        .with_day(1)
        .unwrap_or(today)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
