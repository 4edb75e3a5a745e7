use std::fmt::Display;

use chrono::{DateTime, TimeZone, Utc};

use crate::EventType;

pub const DEFAULT_COLOR: &str = "#6b7280";

/// "tech_talk" -> "Tech Talk". Works for any string, known type or not.
#[must_use]
pub fn format_event_type(raw: &str) -> String {
    raw.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[must_use]
pub fn event_type_color(event_type: &EventType) -> &'static str {
    match event_type {
        EventType::Workshop => "#ff5f1f",
        EventType::Activity => "#2ed3c6",
        EventType::TechTalk => "#9f84ff",
        EventType::Other(_) => DEFAULT_COLOR,
    }
}

impl EventType {
    #[must_use]
    pub fn label(&self) -> String {
        format_event_type(self.as_str())
    }

    #[must_use]
    pub fn color(&self) -> &'static str {
        event_type_color(self)
    }
}

/// "May 3, 2026, 09:00 AM"
#[must_use]
pub fn format_date_time<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant
        .with_timezone(tz)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

/// "9:00 AM"
#[must_use]
pub fn format_time<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format("%-I:%M %p").to_string()
}

/// "May 3"
#[must_use]
pub fn format_date<Tz>(instant: DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    instant.with_timezone(tz).format("%b %-d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::FixedOffset;

    use super::*;

    #[test]
    fn labels_any_type_string() {
        assert_eq!(format_event_type("tech_talk"), "Tech Talk");
        assert_eq!(format_event_type("workshop"), "Workshop");
        assert_eq!(format_event_type("late_night_snack"), "Late Night Snack");
        assert_eq!(format_event_type(""), "");
        assert_eq!(EventType::Other("food".into()).label(), "Food");
    }

    #[test]
    fn unknown_types_fall_back_to_gray() {
        assert_eq!(EventType::Workshop.color(), "#ff5f1f");
        assert_eq!(EventType::Activity.color(), "#2ed3c6");
        assert_eq!(EventType::TechTalk.color(), "#9f84ff");
        assert_eq!(EventType::Other("food".into()).color(), DEFAULT_COLOR);
    }

    #[test]
    fn formats_in_the_viewer_zone() {
        let instant = Utc.with_ymd_and_hms(2026, 5, 3, 13, 5, 0).unwrap();
        let toronto = FixedOffset::west_opt(4 * 3600).unwrap();

        assert_eq!(format_date_time(instant, &Utc), "May 3, 2026, 01:05 PM");
        assert_eq!(format_time(instant, &toronto), "9:05 AM");
        assert_eq!(format_date(instant, &toronto), "May 3");

        let late = Utc.with_ymd_and_hms(2026, 5, 3, 2, 0, 0).unwrap();
        assert_eq!(format_date(late, &toronto), "May 2");
    }
}
