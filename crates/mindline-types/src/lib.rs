//! Shared domain types for Mindline.
//!
//! This crate contains the domain types used across the Mindline workspace:
//! conversation messages, completion request/response shapes, settings, and
//! their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod message;
