//! Topic-based event bus for flexible event routing.
//!
//! Consumers subscribe per topic so a scoreboard view can watch
//! [`Topic::Session`] without drinking from the once-per-second
//! [`Topic::Clock`] stream.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{AuthoringEvent, ClockEvent, SessionEvent};
