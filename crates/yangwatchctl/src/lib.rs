//! yangwatchctl library - CLI surface, command handlers and output.
//!
//! Split from the binary so the handlers can be driven from tests.

pub mod cli;
pub mod commands;
pub mod errors;
pub mod logging;
pub mod output;

/// Version embedded by build.rs
pub const VERSION: &str = env!("YANGWATCH_VERSION");
