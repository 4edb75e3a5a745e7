use chrono::{DateTime, Utc};
use ics::{
    escape_text,
    properties::{Categories, Description, DtEnd, DtStart, Summary, URL},
    ICalendar,
};

use crate::Event;

fn ics_time(instant: DateTime<Utc>) -> String {
    instant.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Renders `events` as one calendar. Times are emitted in UTC so no
/// timezone component is needed.
#[must_use]
pub fn to_ics<'a, I>(name: &'a str, events: I) -> ICalendar<'a>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut icalendar = ICalendar::new("2.0", name);

    for event in events {
        icalendar.add_event(event.to_ics());
    }

    icalendar
}

impl Event {
    #[must_use]
    pub fn to_ics(&self) -> ics::Event<'_> {
        let start = ics_time(self.start_time);
        // DTEND must not precede DTSTART.
        let end = ics_time(self.end_or_start().max(self.start_time));

        let mut ics_event = ics::Event::new(format!("htn-event-{}", self.id), start.clone());

        ics_event.push(DtStart::new(start));
        ics_event.push(DtEnd::new(end));
        ics_event.push(Summary::new(escape_text(&self.name)));
        ics_event.push(Categories::new(self.event_type.label()));

        if let Some(description) = &self.description {
            ics_event.push(Description::new(escape_text(description)));
        }

        if let Some(url) = &self.public_url {
            ics_event.push(URL::new(url));
        }

        ics_event
    }
}
