//! History store abstractions.
//!
//! The durable, keyed, ordered message log behind every session. The
//! SQLite implementation lives in `mindline-infra`.

pub mod repository;
