//! meetminutes client library: CLI definition, configuration, the archive
//! pipeline, and the transcript readiness poll.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod transcript;
