//! GTP engine process communication.
//!
//! [`GtpEngine`] owns a child process that speaks GTP over its standard
//! streams. The protocol is strictly half-duplex: one command is written, then
//! exactly one response line is read back before the next command goes out.
//! [`GtpConnection`] is the seam the game drives, so the game logic can run
//! against any transport that follows the same contract.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, trace, warn};

use crate::error::{GtpError, Result};
use crate::protocol::{self, Command, Response, ResponseKind};

/// Default bound on how long a single response may take to arrive.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// A half-duplex GTP request/response channel.
pub trait GtpConnection {
    /// Starts the underlying engine.
    fn open(&mut self) -> Result<()>;

    /// Returns `true` while the engine has not exited.
    fn is_alive(&mut self) -> bool;

    /// Writes one command without waiting for its response.
    fn send_command(&mut self, command: &Command) -> Result<()>;

    /// Blocks until one response line has been read and decoded.
    ///
    /// With `ignore_empty` set, blank keep-alive lines are skipped.
    fn recv_response(&mut self, ignore_empty: bool) -> Result<Response>;

    /// Releases the engine. Must be safe to call more than once.
    fn close(&mut self);

    /// Sends `command` and reads back its non-empty response.
    fn request(&mut self, command: &Command) -> Result<Response> {
        self.send_command(command)?;
        self.recv_response(true)
    }

    /// Get the engine's name and version.
    ///
    /// Sends the `name` and `version` commands and combines the answers. An
    /// engine that rejects `version` is reported by name only.
    fn identify(&mut self) -> Result<String> {
        let name = match self.request(&Command::name())?.into_result() {
            Ok(name) => name,
            Err(msg) => {
                return Err(GtpError::MalformedResponse(format!(
                    "invalid name response: {msg}"
                )));
            }
        };

        let version = self
            .request(&Command::version())?
            .into_result()
            .unwrap_or_default();

        if version.is_empty() {
            Ok(name)
        } else if version.starts_with(['v', 'V']) {
            Ok(format!("{name} {version}"))
        } else {
            Ok(format!("{name} v{version}"))
        }
    }
}

enum ReaderEvent {
    Line(Vec<u8>),
    Closed,
    Failed(std::io::Error),
}

struct RunningEngine {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<ReaderEvent>,
}

/// A GTP-compatible Go engine process.
///
/// The process is spawned by [`GtpConnection::open`] and terminated by
/// [`GtpConnection::close`] or when the value is dropped.
pub struct GtpEngine {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    read_timeout: Duration,
    running: Option<RunningEngine>,
}

impl GtpEngine {
    /// Create a new, not yet started, GTP engine.
    ///
    /// # Arguments
    ///
    /// * `program` - Path or name of the engine executable
    /// * `args` - Command-line arguments for the engine
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            read_timeout: DEFAULT_READ_TIMEOUT,
            running: None,
        }
    }

    /// Run the engine from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Bound every [`GtpConnection::recv_response`] call by `timeout`.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    fn spawn_reader(stdout: ChildStdout, tx: Sender<ReaderEvent>) {
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            loop {
                let mut line = Vec::new();
                let event = match reader.read_until(b'\n', &mut line) {
                    Ok(0) => ReaderEvent::Closed,
                    Ok(_) => ReaderEvent::Line(line),
                    Err(e) => ReaderEvent::Failed(e),
                };
                let done = !matches!(event, ReaderEvent::Line(_));
                if tx.send(event).is_err() || done {
                    break;
                }
            }
        });
    }
}

impl GtpConnection for GtpEngine {
    /// Spawns the engine with piped stdin/stdout and a discarded stderr.
    ///
    /// An engine that is already running is closed first.
    ///
    /// # Errors
    ///
    /// Returns [`GtpError::ProcessStart`] if the process cannot be spawned.
    fn open(&mut self) -> Result<()> {
        if self.running.is_some() {
            self.close();
        }

        let mut command = ProcessCommand::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| GtpError::ProcessStart {
            program: self.program.clone(),
            source,
        })?;

        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GtpError::ConnectionBroken(
                    "engine streams are not piped".to_string(),
                ));
            }
        };

        let (tx, rx) = mpsc::channel();
        Self::spawn_reader(stdout, tx);

        info!(program = %self.program, pid = child.id(), "engine started");
        self.running = Some(RunningEngine {
            child,
            stdin,
            lines: rx,
        });
        Ok(())
    }

    fn is_alive(&mut self) -> bool {
        match &mut self.running {
            Some(running) => matches!(running.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn send_command(&mut self, command: &Command) -> Result<()> {
        if !self.is_alive() {
            return Err(GtpError::ConnectionBroken(
                "engine is not running".to_string(),
            ));
        }
        let Some(running) = self.running.as_mut() else {
            return Err(GtpError::ConnectionBroken(
                "engine is not running".to_string(),
            ));
        };

        debug!(command = %command, "send");
        running
            .stdin
            .write_all(&command.to_bytes())
            .and_then(|()| running.stdin.flush())
            .map_err(|e| GtpError::ConnectionBroken(format!("write failed: {e}")))
    }

    /// Reads lines until one response is available or the deadline passes.
    ///
    /// The deadline covers the whole call, so an engine that only ever emits
    /// blank lines still times out.
    fn recv_response(&mut self, ignore_empty: bool) -> Result<Response> {
        let timeout = self.read_timeout;
        let Some(running) = self.running.as_mut() else {
            return Err(GtpError::ConnectionBroken(
                "engine is not running".to_string(),
            ));
        };

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let line = match running.lines.recv_timeout(remaining) {
                Ok(ReaderEvent::Line(line)) => line,
                Ok(ReaderEvent::Closed) | Err(RecvTimeoutError::Disconnected) => {
                    return Err(GtpError::ConnectionBroken(
                        "engine closed its output".to_string(),
                    ));
                }
                Ok(ReaderEvent::Failed(e)) => {
                    return Err(GtpError::ConnectionBroken(format!("read failed: {e}")));
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(?timeout, "engine response timed out");
                    return Err(GtpError::Timeout(timeout));
                }
            };

            trace!(line = %String::from_utf8_lossy(&line).trim_end(), "recv");
            let response = protocol::decode(&line)?;
            if ignore_empty && response.kind() == ResponseKind::Empty {
                trace!("skipping empty line");
                continue;
            }
            return Ok(response);
        }
    }

    /// Sends `quit`, then kills and reaps the process.
    ///
    /// The `quit` response is not awaited.
    fn close(&mut self) {
        let Some(mut running) = self.running.take() else {
            return;
        };

        if matches!(running.child.try_wait(), Ok(None)) {
            let _ = running.stdin.write_all(&Command::quit().to_bytes());
            let _ = running.stdin.flush();
        }
        drop(running.stdin);

        let _ = running.child.kill();
        let status = running.child.wait();
        debug!(program = %self.program, ?status, "engine closed");
    }
}

impl Drop for GtpEngine {
    fn drop(&mut self) {
        self.close();
    }
}
