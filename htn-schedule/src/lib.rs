//! Query and derivation engine behind the Hack the North schedule viewer.
//!
//! Everything here is a pure function of the loaded event list, the
//! visitor's authentication flag and their filter inputs, except for the
//! [`source`] and [`session`] collaborators that feed it.

pub mod aggregate;
pub mod calendar;
pub mod detail;
pub mod labels;
pub mod query;
pub mod session;
pub mod source;

mod error;
mod structs;

#[cfg(feature = "ics")]
mod ics;

pub use error::{BoxError, FetchError, SessionError, UnknownEventType};
pub use query::Query;
pub use structs::{Event, EventId, EventType, Permission, Speaker, TypeFilter};

#[cfg(feature = "ics")]
pub use crate::ics::to_ics;
