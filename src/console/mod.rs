//! Console Session
//!
//! The orchestrating loop: prompt, read one line, dispatch it to the engine
//! channel (or to a batch script run), print the formatted response, repeat
//! until end of input.
//!
//! # States
//! `Starting → Ready → (Dispatching → Ready)* → Closing → Terminated`
//!
//! A session that cannot list tables at startup never reaches `Ready`: the
//! channel is closed and the session terminates.
//!
//! # Error Policy
//! - Unopenable scripts and unsendable commands are reported on stderr and
//!   the loop continues
//! - Engine failures end the loop; the channel is still closed exactly once

use std::io::{self, IsTerminal, Write};

use tracing::{debug, info, warn};

use crate::command::CommandKind;
use crate::completion::{Completer, Vocabulary};
use crate::config::Settings;
use crate::engine::{EngineChannel, ProcessChannel};
use crate::error::{GrnshError, Result};
use crate::output::{format_select, normalize, normalize_stream};

mod reader;

pub use reader::{EditorReader, LineReader, ReadOutcome, StdinReader};

/// Prompt shown before every line
pub const PROMPT: &str = "> ";

/// Console session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleState {
    Starting,
    Ready,
    Dispatching,
    Closing,
    Terminated,
}

/// One console session over an engine channel
#[derive(Debug)]
pub struct Console<C: EngineChannel> {
    channel: C,
    format_select: bool,
    state: ConsoleState,
}

impl<C: EngineChannel> Console<C> {
    /// Wrap an open channel without loading the completion vocabulary
    ///
    /// Used for one-shot command execution.
    pub const fn new(channel: C, format_select: bool) -> Self {
        Self { channel, format_select, state: ConsoleState::Ready }
    }

    /// Build the completion engine from the live table listing
    ///
    /// # Errors
    /// `SchemaUnavailable` if the listing fails. The channel has been closed
    /// by then.
    pub fn start(mut channel: C, settings: &Settings) -> Result<(Self, Completer)> {
        debug!(state = ?ConsoleState::Starting, "starting console");

        let vocabulary = match Vocabulary::load(&mut channel) {
            Ok(vocabulary) => vocabulary,
            Err(e) => {
                if let Err(close_err) = channel.close() {
                    warn!(error = %close_err, "could not close engine after failed startup");
                }
                return Err(e);
            }
        };

        let completer = Completer::new(vocabulary, settings.complete_arguments);
        Ok((Self::new(channel, settings.format_select), completer))
    }

    /// Current state
    pub const fn state(&self) -> ConsoleState {
        self.state
    }

    /// The underlying channel
    pub const fn channel(&self) -> &C {
        &self.channel
    }

    /// Run one input line and return the text to print
    ///
    /// The line is trimmed first. Empty lines are sent like any other.
    ///
    /// # Errors
    /// Whatever the channel reports; see [`GrnshError::is_fatal`].
    pub fn dispatch(&mut self, line: &str) -> Result<String> {
        self.state = ConsoleState::Dispatching;
        let line = line.trim();

        let result = match CommandKind::classify(line) {
            CommandKind::Script(path) => {
                self.channel.run_script(&path).map(|output| normalize_stream(&output))
            }
            kind => {
                let format = kind.wants_select_format(self.format_select);
                self.channel.send(line).map(|response| {
                    if format {
                        format_select(&response)
                    } else {
                        normalize(&response)
                    }
                })
            }
        };

        self.state = ConsoleState::Ready;
        result
    }

    /// Read, dispatch and print until end of input, then close
    ///
    /// # Errors
    /// The first fatal error (engine or input failure). The channel is closed
    /// before returning in every case.
    pub fn run<R: LineReader, W: Write>(&mut self, reader: &mut R, out: &mut W) -> Result<()> {
        let outcome = self.read_loop(reader, out);

        if let Err(e) = reader.save_history() {
            warn!(error = %e, "history not saved");
        }

        let closed = self.close();
        outcome.and(closed)
    }

    fn read_loop<R: LineReader, W: Write>(&mut self, reader: &mut R, out: &mut W) -> Result<()> {
        loop {
            let line = match reader.read_line(PROMPT)? {
                ReadOutcome::Line(line) => line,
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => return Ok(()),
            };

            match self.dispatch(&line) {
                Ok(text) => print_block(out, &text)?,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(code = e.error_code(), "command failed");
                    eprintln!("{e}");
                }
            }
        }
    }

    /// Close the channel; later calls are no-ops
    ///
    /// # Errors
    /// Whatever the channel reports when closing.
    pub fn close(&mut self) -> Result<()> {
        if matches!(self.state, ConsoleState::Closing | ConsoleState::Terminated) {
            return Ok(());
        }

        self.state = ConsoleState::Closing;
        let result = self.channel.close();
        self.state = ConsoleState::Terminated;
        debug!(state = ?self.state, "console closed");
        result
    }

    /// Close the channel on an error path, logging a close failure
    fn close_after_failure(&mut self) {
        if let Err(close_err) = self.close() {
            warn!(error = %close_err, "could not close engine after failure");
        }
    }
}

/// Print a block followed by exactly one newline
fn print_block<W: Write>(out: &mut W, text: &str) -> Result<()> {
    let write = if text.ends_with('\n') { write!(out, "{text}") } else { writeln!(out, "{text}") };
    write
        .and_then(|()| out.flush())
        .map_err(|e| GrnshError::input(format!("could not write output: {e}")))
}

/// Run an interactive (or piped) session against the configured engine
///
/// # Errors
/// `ProcessUnavailable` if the engine cannot be launched or dies,
/// `SchemaUnavailable` if the startup table listing fails,
/// `Input` if the terminal fails.
pub fn run_session(settings: &Settings) -> Result<()> {
    let channel = ProcessChannel::spawn(settings.engine_command())?;
    let (mut console, completer) = Console::start(channel, settings)?;
    info!(engine = %settings.engine_command(), "session ready");

    let mut stdout = io::stdout();
    if io::stdin().is_terminal() {
        let mut reader = match EditorReader::new(completer, settings) {
            Ok(reader) => reader,
            Err(e) => {
                console.close_after_failure();
                return Err(e);
            }
        };
        console.run(&mut reader, &mut stdout)
    } else {
        let mut reader = StdinReader::new(io::stdin().lock());
        console.run(&mut reader, &mut stdout)
    }
}

/// Run a single command (or script) and close
///
/// # Errors
/// Any error from launching the engine or running the command.
pub fn run_command(settings: &Settings, line: &str) -> Result<()> {
    let channel = ProcessChannel::spawn(settings.engine_command())?;
    let mut console = Console::new(channel, settings.format_select);

    let outcome = console.dispatch(line).and_then(|text| print_block(&mut io::stdout(), &text));
    let closed = console.close();
    outcome.and(closed)
}
