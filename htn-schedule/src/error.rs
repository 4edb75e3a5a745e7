use std::io;

use thiserror::Error;

use crate::EventId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of the event source. Transport, status and decoding faults share
/// one user-facing message per request kind.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch events. Please try again later.")]
    Events(#[source] BoxError),
    #[error("Failed to fetch event. Please try again later.")]
    Event {
        id: EventId,
        #[source]
        source: BoxError,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("session storage failed")]
    Storage(#[from] io::Error),
    #[error("session could not be encoded")]
    Encoding(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type `{0}`")]
pub struct UnknownEventType(pub String);
