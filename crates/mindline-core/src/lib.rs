//! Relay logic and capability ports for Mindline.
//!
//! This crate defines the "ports" (the `CompletionProvider` and
//! `HistoryRepository` traits) that the infrastructure layer implements,
//! plus the session-keyed streaming relay that orchestrates them. It
//! depends only on `mindline-types` -- never on `mindline-infra` or any
//! database/HTTP crate.

pub mod history;
pub mod llm;
pub mod relay;
