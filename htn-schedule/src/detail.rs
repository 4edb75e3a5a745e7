use log::debug;
use serde::Serialize;

use crate::{error::FetchError, source::EventSource, Event, EventId, EventType};

/// Looks `id` up in the already loaded schedule and only asks the source when
/// it is missing there.
pub async fn resolve_event<S: EventSource>(
    loaded: &[Event],
    id: EventId,
    source: &S,
) -> Result<Event, FetchError> {
    if let Some(event) = loaded.iter().find(|event| event.id == id) {
        return Ok(event.clone());
    }

    debug!("Event {id} is not loaded, fetching it");
    source.event_by_id(id).await
}

/// Related events that are loaded and visible, in the order `event` lists
/// them. Unknown ids are dropped.
#[must_use]
pub fn related_events<'a>(
    event: &Event,
    loaded: &'a [Event],
    is_authenticated: bool,
) -> Vec<&'a Event> {
    event
        .related_events
        .iter()
        .filter_map(|id| loaded.iter().find(|candidate| candidate.id == *id))
        .filter(|related| is_authenticated || !related.is_private())
        .collect()
}

impl Event {
    /// Drops what an anonymous visitor must not see on an otherwise visible
    /// event.
    #[must_use]
    pub fn for_viewer(mut self, is_authenticated: bool) -> Self {
        if !is_authenticated {
            self.private_url = None;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub kind: LinkKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventDetail {
    /// A private event shown to an anonymous visitor.
    Locked {
        id: EventId,
        event_type: EventType,
        type_label: String,
        type_color: &'static str,
    },
    Visible {
        event: Event,
        type_label: String,
        type_color: &'static str,
        links: Vec<Link>,
        related: Vec<Event>,
    },
}

impl EventDetail {
    /// Builds the view for `event`. Related events go through the same
    /// viewer redaction as `event` itself.
    #[must_use]
    pub fn new(event: Event, loaded: &[Event], is_authenticated: bool) -> Self {
        let type_label = event.event_type.label();
        let type_color = event.event_type.color();

        if event.is_private() && !is_authenticated {
            return EventDetail::Locked {
                id: event.id,
                event_type: event.event_type,
                type_label,
                type_color,
            };
        }

        let mut links = Vec::new();
        if let Some(url) = &event.public_url {
            links.push(Link {
                kind: LinkKind::Public,
                url: url.clone(),
            });
        }
        if let (true, Some(url)) = (is_authenticated, &event.private_url) {
            links.push(Link {
                kind: LinkKind::Private,
                url: url.clone(),
            });
        }

        let related = related_events(&event, loaded, is_authenticated)
            .into_iter()
            .map(|related| related.clone().for_viewer(is_authenticated))
            .collect();

        EventDetail::Visible {
            event: event.for_viewer(is_authenticated),
            type_label,
            type_color,
            links,
            related,
        }
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self, EventDetail::Locked { .. })
    }
}
