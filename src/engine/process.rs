//! Subprocess engine channel.
//!
//! [`ProcessChannel`] launches `<engine> <database>` once with stdin and
//! stdout piped, then exchanges one line per command in lock-step. Script
//! runs spawn an independent process whose stdin is the script file.
//! Engine stderr is inherited so its diagnostics reach the terminal.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Stdio};

use tracing::{debug, warn};

use super::{EngineChannel, EngineCommand};
use crate::error::{GrnshError, Result};

/// Tracing target for engine process operations.
const ENGINE_TARGET: &str = "grnsh::engine";

/// Interactive engine process with its pipe pair
#[derive(Debug)]
pub struct ProcessChannel {
    command: EngineCommand,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
}

impl ProcessChannel {
    /// Launch the engine and keep its pipes open
    ///
    /// # Errors
    /// `ProcessUnavailable` if the engine cannot be spawned.
    pub fn spawn(command: EngineCommand) -> Result<Self> {
        debug!(target: ENGINE_TARGET, command = %command, "spawning engine process");

        let mut child = command
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                GrnshError::process_unavailable(format!("could not launch '{command}': {e}"))
            })?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);
        if stdin.is_none() || stdout.is_none() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(GrnshError::process_unavailable("failed to capture engine pipes"));
        }

        Ok(Self { command, child: Some(child), stdin, stdout })
    }

    /// Launch configuration shared with script runs
    #[must_use]
    pub const fn command(&self) -> &EngineCommand {
        &self.command
    }

    /// Whether the interactive process is still attached
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.child.is_some()
    }

    fn write_command(&mut self, command: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| GrnshError::process_unavailable("engine channel is closed"))?;

        stdin
            .write_all(command.as_bytes())
            .and_then(|()| stdin.write_all(b"\n"))
            .and_then(|()| stdin.flush())
            .map_err(|e| pipe_error("write to", &e))
    }

    fn read_response(&mut self) -> Result<String> {
        let stdout = self
            .stdout
            .as_mut()
            .ok_or_else(|| GrnshError::process_unavailable("engine channel is closed"))?;

        let mut buffer = Vec::new();
        let bytes_read =
            stdout.read_until(b'\n', &mut buffer).map_err(|e| pipe_error("read from", &e))?;

        debug!(target: ENGINE_TARGET, bytes_read, "read response line");

        if bytes_read == 0 {
            return Err(GrnshError::process_unavailable("engine closed its output"));
        }

        Ok(strip_line_terminator(&String::from_utf8_lossy(&buffer)).to_string())
    }
}

impl EngineChannel for ProcessChannel {
    fn send(&mut self, command: &str) -> Result<String> {
        if command.contains(['\n', '\r']) {
            return Err(GrnshError::invalid_input("commands must fit on a single line"));
        }

        debug!(target: ENGINE_TARGET, command, "sending command");
        self.write_command(command)?;
        self.read_response()
    }

    fn run_script(&mut self, path: &Path) -> Result<String> {
        let script = File::open(path).map_err(|e| GrnshError::script_not_found(path, e))?;

        debug!(
            target: ENGINE_TARGET,
            command = %self.command,
            script = %path.display(),
            "running script in a fresh engine process"
        );

        let output = self
            .command
            .to_command()
            .stdin(Stdio::from(script))
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| {
                GrnshError::process_unavailable(format!(
                    "could not launch '{}': {e}",
                    self.command
                ))
            })?;

        if !output.status.success() {
            warn!(
                target: ENGINE_TARGET,
                script = %path.display(),
                status = %output.status,
                "script engine exited unsuccessfully"
            );
        }

        debug!(target: ENGINE_TARGET, bytes_read = output.stdout.len(), "script finished");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn close(&mut self) -> Result<()> {
        let mut child = self
            .child
            .take()
            .ok_or_else(|| GrnshError::process_unavailable("engine channel already closed"))?;

        // Dropping stdin delivers EOF, which is the engine's signal to exit.
        if let Some(mut stdin) = self.stdin.take() {
            let _ = stdin.flush();
        }
        self.stdout = None;

        let status = child
            .wait()
            .map_err(|e| GrnshError::process_unavailable(format!("could not reap engine: {e}")))?;

        if status.success() {
            debug!(target: ENGINE_TARGET, %status, "engine exited");
        } else {
            warn!(target: ENGINE_TARGET, %status, "engine exited unsuccessfully");
        }
        Ok(())
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        if self.is_open() {
            let _ = self.close();
        }
    }
}

/// Map a pipe I/O failure to `ProcessUnavailable`
fn pipe_error(action: &str, err: &std::io::Error) -> GrnshError {
    match err.kind() {
        ErrorKind::BrokenPipe => {
            GrnshError::process_unavailable(format!("could not {action} engine: broken pipe"))
        }
        _ => GrnshError::process_unavailable(format!("could not {action} engine: {err}")),
    }
}

/// Remove a trailing `\n` or `\r\n`
fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
