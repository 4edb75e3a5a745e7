use crate::{Event, TypeFilter};

/// Anonymous visitors only see events that are not explicitly private.
#[must_use]
pub fn filter_by_permission(events: &[Event], is_authenticated: bool) -> Vec<Event> {
    if is_authenticated {
        return events.to_vec();
    }

    events
        .iter()
        .filter(|event| !event.is_private())
        .cloned()
        .collect()
}

#[must_use]
pub fn filter_by_type(events: &[Event], filter: &TypeFilter) -> Vec<Event> {
    match filter {
        TypeFilter::All => events.to_vec(),
        TypeFilter::Only(event_type) => events
            .iter()
            .filter(|event| &event.event_type == event_type)
            .cloned()
            .collect(),
    }
}

/// Case-insensitive substring match on name or description. The empty query
/// matches everything.
#[must_use]
pub fn search(events: &[Event], query: &str) -> Vec<Event> {
    let query = query.to_lowercase();

    events
        .iter()
        .filter(|event| matches_text(event, &query))
        .cloned()
        .collect()
}

fn matches_text(event: &Event, lowercase_query: &str) -> bool {
    event.name.to_lowercase().contains(lowercase_query)
        || event
            .description
            .as_ref()
            .is_some_and(|description| description.to_lowercase().contains(lowercase_query))
}

/// Stable ascending sort by start time into a new vector.
#[must_use]
pub fn sort_by_start_time(events: &[Event]) -> Vec<Event> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|event| event.start_time);
    sorted
}

/// Inputs of the listing pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub is_authenticated: bool,
    pub type_filter: TypeFilter,
    pub text: String,
}

impl Query {
    #[must_use]
    pub fn new(is_authenticated: bool) -> Self {
        Self {
            is_authenticated,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_type(mut self, type_filter: TypeFilter) -> Self {
        self.type_filter = type_filter;
        self
    }

    #[must_use]
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Permission filter, then sort, then type filter, then search.
    #[must_use]
    pub fn apply(&self, events: &[Event]) -> Vec<Event> {
        let visible = filter_by_permission(events, self.is_authenticated);
        let sorted = sort_by_start_time(&visible);
        let typed = filter_by_type(&sorted, &self.type_filter);
        search(&typed, &self.text)
    }
}
