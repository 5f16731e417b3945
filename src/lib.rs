//! grnsh - Interactive Console for Line-Oriented JSON Engines
//!
//! grnsh drives an external database engine process (`<engine> <database>`)
//! through its standard input and output. It gives the user a prompt with
//! history and tab completion, and turns the engine's single-line JSON
//! responses into readable multi-line output.
//!
//! # Core Principles
//! - One command in flight at a time (strict request/response lock-step)
//! - Formatting never hides a response: anything unparseable is shown raw
//! - stdout carries engine output only; logs go to stderr
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`engine`] - Command channel trait and the subprocess implementation
//! - [`output`] - Response formatting (pretty JSON, select row records)
//! - [`command`] - Input line classification
//! - [`completion`] - Vocabulary and tab completion
//! - [`console`] - Session state machine and line readers
//! - [`config`] - Configuration management

pub mod error;
pub mod engine;
pub mod output;
pub mod command;
pub mod completion;
pub mod console;
pub mod config;

// Re-export commonly used types for convenience
pub use error::{GrnshError, Result};
pub use engine::{EngineChannel, EngineCommand, ProcessChannel};
pub use output::{format_select, normalize, normalize_stream, SelectResponse};
pub use command::CommandKind;
pub use completion::{Completer, Vocabulary, MAX_CANDIDATES};
pub use console::{Console, ConsoleState, LineReader, ReadOutcome};
pub use config::{FileConfig, Overrides, Settings};
