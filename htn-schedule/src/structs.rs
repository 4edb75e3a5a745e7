use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownEventType;

pub type EventId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub event_type: EventType,
    pub permission: Permission,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub start_time: DateTime<Utc>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub speakers: Vec<Speaker>,
    #[serde(default)]
    pub public_url: Option<String>,
    #[serde(default)]
    pub private_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_events: Vec<EventId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub name: String,
}

impl Event {
    /// End of the event, falling back to its start when the source omits it.
    #[must_use]
    pub fn end_or_start(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.start_time)
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.permission == Permission::Private
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Kind of schedule item. Strings the upstream API may add later land in
/// `Other` and keep their raw value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    Workshop,
    Activity,
    TechTalk,
    Other(String),
}

impl EventType {
    pub const KNOWN: [EventType; 3] = [
        EventType::Workshop,
        EventType::Activity,
        EventType::TechTalk,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            EventType::Workshop => "workshop",
            EventType::Activity => "activity",
            EventType::TechTalk => "tech_talk",
            EventType::Other(raw) => raw,
        }
    }
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "workshop" => EventType::Workshop,
            "activity" => EventType::Activity,
            "tech_talk" => EventType::TechTalk,
            _ => EventType::Other(raw),
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visibility tier. Only `Private` hides an event from anonymous visitors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Permission {
    Public,
    Private,
    Other(String),
}

impl From<String> for Permission {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "public" => Permission::Public,
            "private" => Permission::Private,
            _ => Permission::Other(raw),
        }
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        match permission {
            Permission::Public => "public".to_string(),
            Permission::Private => "private".to_string(),
            Permission::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Only(EventType),
}

impl FromStr for TypeFilter {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(TypeFilter::All);
        }

        match EventType::from(s.to_string()) {
            EventType::Other(raw) => Err(UnknownEventType(raw)),
            known => Ok(TypeFilter::Only(known)),
        }
    }
}
