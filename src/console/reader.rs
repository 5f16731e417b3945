//! Line input capabilities for the console loop.
//!
//! [`EditorReader`] is the interactive reader: rustyline with tab
//! completion and a persisted history file. [`StdinReader`] reads piped
//! input without prompting or history.

use std::io::BufRead;
use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing::{debug, warn};

use crate::completion::{Completer, GrnshHelper};
use crate::config::Settings;
use crate::error::{GrnshError, Result};

/// Result of one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A line, without its terminator
    Line(String),
    /// The current line was abandoned (Ctrl-C)
    Interrupted,
    /// End of input
    Eof,
}

/// Reads one line at a time with editing, completion and history
pub trait LineReader {
    /// Prompt and read one line
    ///
    /// # Errors
    /// `Input` if the underlying terminal or stream fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome>;

    /// Persist the history, if this reader keeps one
    ///
    /// # Errors
    /// `Input` if the history cannot be written.
    fn save_history(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Interactive rustyline reader
pub struct EditorReader {
    editor: Editor<GrnshHelper, DefaultHistory>,
    history_file: PathBuf,
}

impl EditorReader {
    /// Build the editor and load the history file
    ///
    /// A missing history file is not an error.
    ///
    /// # Errors
    /// `Input` if the terminal cannot be set up.
    pub fn new(completer: Completer, settings: &Settings) -> Result<Self> {
        let config = Config::builder()
            .max_history_size(settings.history_size)
            .and_then(|builder| builder.history_ignore_dups(true))
            .map_err(|e| GrnshError::input(format!("invalid history settings: {e}")))?
            .auto_add_history(false)
            .build();

        let mut editor: Editor<GrnshHelper, DefaultHistory> = Editor::with_config(config)
            .map_err(|e| GrnshError::input(format!("could not initialize line editor: {e}")))?;
        editor.set_helper(Some(GrnshHelper::new(completer)));

        let history_file = settings.history_file.clone();
        if history_file.exists() {
            match editor.load_history(&history_file) {
                Ok(()) => debug!(history = %history_file.display(), "loaded history"),
                Err(e) => {
                    warn!(history = %history_file.display(), error = %e, "could not load history");
                }
            }
        }

        Ok(Self { editor, history_file })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                    warn!(error = %e, "could not record history entry");
                }
                Ok(ReadOutcome::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(GrnshError::input(e.to_string())),
        }
    }

    fn save_history(&mut self) -> Result<()> {
        self.editor.save_history(&self.history_file).map_err(|e| {
            GrnshError::input(format!(
                "could not save history to '{}': {e}",
                self.history_file.display()
            ))
        })
    }
}

/// Non-interactive reader over any buffered stream
pub struct StdinReader<R> {
    input: R,
}

impl<R: BufRead> StdinReader<R> {
    pub const fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> LineReader for StdinReader<R> {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome> {
        let mut line = String::new();
        let bytes_read =
            self.input.read_line(&mut line).map_err(|e| GrnshError::input(e.to_string()))?;

        if bytes_read == 0 {
            return Ok(ReadOutcome::Eof);
        }

        let line = line.strip_suffix('\n').unwrap_or(&line);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(ReadOutcome::Line(line.to_string()))
    }
}
