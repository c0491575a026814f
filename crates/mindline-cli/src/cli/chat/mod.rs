//! Interactive CLI chat experience for Mindline.
//!
//! This module implements the full chat loop: transcript replay, streaming
//! relay turns with a thinking spinner, slash commands, and a welcome
//! banner. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;

pub use loop_runner::run_chat_loop;
