//! # Agent Module
//!
//! The tool-calling conversation loop.
//!
//! ## Key Types
//!
//! - [`Agent`] - The loop executor
//! - [`AgentOptions`] - Provider, model and budget settings
//! - [`AgentOutcome`] - Transcript, final answer and executed steps
//! - [`AgentError`] - Errors that end a run
//!
//! ## Agent Loop
//!
//! 1. Send the full history and tool catalog to the model
//! 2. If the reply requests tools, execute each in order and append results
//! 3. Otherwise the reply text is the final answer
//!
//! The loop is bounded by [`AgentOptions::max_turns`] completions.

mod errors;
mod models;
mod runner;

#[cfg(test)]
mod tests;

pub use errors::AgentError;
pub use models::{AgentOptions, AgentOutcome, AgentStep, format_annotation};
pub use runner::Agent;
