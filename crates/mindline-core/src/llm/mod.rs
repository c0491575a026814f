//! Completion provider abstractions.
//!
//! [`provider::CompletionProvider`] is the port implemented by concrete
//! backends in `mindline-infra`; [`box_provider::BoxCompletionProvider`]
//! wraps any implementation behind dynamic dispatch so the relay and the
//! application wiring never name a concrete backend.

pub mod box_provider;
pub mod provider;
