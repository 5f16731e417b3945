//! Engine Channel Trait and Launch Configuration
//!
//! This module defines the command channel abstraction used to talk to the
//! external engine. [`ProcessChannel`] is the subprocess implementation.
//!
//! # Wire Protocol
//! - Interactive: one command per line on stdin, one response line on stdout
//! - Batch: a whole script file as stdin, stdout read until the process exits
//!
//! # Lock-step
//! `send` takes `&mut self`, so a channel can never have two commands in
//! flight at once.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::Result;

pub mod process;

pub use process::ProcessChannel;

/// Command channel to a line-oriented engine
pub trait EngineChannel {
    /// Send one command and read exactly one response line
    ///
    /// The returned line has its line terminator removed and is not parsed.
    ///
    /// # Errors
    /// `ProcessUnavailable` if the pipe is closed or broken,
    /// `InvalidInput` if the command contains a line break.
    fn send(&mut self, command: &str) -> Result<String>;

    /// Run a script file in a fresh engine process and collect its stdout
    ///
    /// # Errors
    /// `ScriptNotFound` if the file cannot be opened,
    /// `ProcessUnavailable` if the engine cannot be launched.
    fn run_script(&mut self, path: &Path) -> Result<String>;

    /// Close both pipe ends and reap the engine process
    ///
    /// # Errors
    /// `ProcessUnavailable` if the channel was already closed or waiting failed.
    fn close(&mut self) -> Result<()>;
}

/// How to launch the engine: `<engine_path> <database_path>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineCommand {
    /// Engine executable (looked up on `PATH` when not a path)
    pub engine_path: PathBuf,

    /// Database file handed to the engine as its only argument
    pub database_path: PathBuf,
}

impl EngineCommand {
    /// Create a new launch configuration
    pub fn new(engine_path: impl Into<PathBuf>, database_path: impl Into<PathBuf>) -> Self {
        Self { engine_path: engine_path.into(), database_path: database_path.into() }
    }

    /// Build a `Command` for this engine, without any stdio configured
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.engine_path);
        command.arg(&self.database_path);
        command
    }

    /// Human-readable command line, for logs and error messages
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} {}", self.engine_path.display(), self.database_path.display())
    }
}

impl std::fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
