//! The session-keyed streaming relay.
//!
//! Binds an opaque session identifier to a durable message log, assembles
//! completion requests from the fixed instruction plus prior history, and
//! drives the provider's fragment stream while guaranteeing all-or-nothing
//! persistence per turn. Entry point: [`controller::ChatRelay`].

pub mod controller;
pub mod prompt;
pub mod transcript;

pub use controller::{ChatRelay, ReplyStream, TurnError};
pub use transcript::Transcript;
