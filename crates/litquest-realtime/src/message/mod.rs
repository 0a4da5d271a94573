//! Wire protocol: typed events and the outbound envelope.

pub mod envelope;
pub mod events;

pub use envelope::EventEnvelope;
pub use events::{ClientEvent, ServerEvent};
