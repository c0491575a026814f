//! SQLite persistence.
//!
//! `DatabasePool` owns the split reader/writer connections; the history
//! repository implements the `HistoryRepository` port on top of it.

pub mod history;
pub mod pool;
