//! Local command execution with total and idle timeouts.
//!
//! Commands run through the platform shell (`sh -c`, or `cmd /C` on
//! Windows). The call blocks until the process exits or one of the two
//! timeout bounds is exceeded; there is no other cancellation path.
//! Reader threads feed captured output into a channel so the waiting
//! thread can enforce the idle window and tick the progress indicator,
//! but none of that is visible to the caller.

use crate::console::Console;
use crate::error::{Error, Result, TimeoutKind};
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

pub const DEFAULT_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Cadence of `ExecEvent::Tick` while the process produces no output.
const TICK: Duration = Duration::from_millis(120);

#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub exit_code: i32,
}

/// Options for [`execute`].
pub struct ExecOptions<'a, W: Write> {
    /// Sink for status and progress text. `None` runs silently.
    pub output: Option<&'a mut Console<W>>,
    /// Label shown instead of the raw command.
    pub command_description: Option<String>,
    /// Stream subprocess output to the sink as it is produced.
    pub print_output: bool,
    /// Total wall-clock bound.
    pub timeout_secs: u64,
    /// Fail when no output arrives within this window.
    pub idle_timeout_secs: u64,
}

impl<'a, W: Write> Default for ExecOptions<'a, W> {
    fn default() -> Self {
        Self {
            output: None,
            command_description: None,
            print_output: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

impl ExecOptions<'static, std::io::Sink> {
    /// Default options with no output sink.
    pub fn silent() -> Self {
        Self::default()
    }
}

/// Plain-value half of the option bag, parseable from loosely-typed
/// JSON configuration. Each key has a fixed expected type and is
/// validated before any process is spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecValues {
    pub command_description: Option<String>,
    pub print_output: bool,
    pub timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl Default for ExecValues {
    fn default() -> Self {
        Self {
            command_description: None,
            print_output: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            idle_timeout_secs: DEFAULT_IDLE_TIMEOUT_SECS,
        }
    }
}

impl ExecValues {
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| Error::InvalidInput("options have to be a JSON object".to_string()))?;

        let mut values = Self::default();
        for (key, entry) in map {
            match key.as_str() {
                "command_description" => match entry {
                    serde_json::Value::Null => values.command_description = None,
                    serde_json::Value::String(s) => values.command_description = Some(s.clone()),
                    _ => return Err(Error::invalid_argument(key, "String or null")),
                },
                "print_output" => {
                    values.print_output = entry
                        .as_bool()
                        .ok_or_else(|| Error::invalid_argument(key, "Boolean"))?;
                }
                "timeout" => {
                    values.timeout_secs = entry
                        .as_u64()
                        .ok_or_else(|| Error::invalid_argument(key, "Integer"))?;
                }
                "idle_timeout" => {
                    values.idle_timeout_secs = entry
                        .as_u64()
                        .ok_or_else(|| Error::invalid_argument(key, "Integer"))?;
                }
                _ => return Err(Error::invalid_argument(key, "a recognized option")),
            }
        }
        Ok(values)
    }

    pub fn into_options<W: Write>(self, output: Option<&mut Console<W>>) -> ExecOptions<'_, W> {
        ExecOptions {
            output,
            command_description: self.command_description,
            print_output: self.print_output,
            timeout_secs: self.timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

/// Incremental event delivered to the wait loop's callback.
pub enum ExecEvent<'a> {
    Stdout(&'a str),
    Stderr(&'a str),
    /// No output for one tick interval; used to animate the spinner.
    Tick,
}

/// Execute a shell command and return its trimmed stdout.
///
/// Status text goes to the sink per the options: a description line in
/// non-verbose mode, a spinner in verbose mode without `print_output`,
/// or the echoed command when no description is given.
pub fn execute<W: Write>(command: &str, options: ExecOptions<'_, W>) -> Result<String> {
    let ExecOptions {
        output,
        command_description,
        print_output,
        timeout_secs,
        idle_timeout_secs,
    } = options;

    let Some(console) = output else {
        let captured = run(command, timeout_secs, idle_timeout_secs, &mut |_| {})?;
        return Ok(captured.stdout.trim().to_string());
    };

    let mut spinner_shown = false;
    if let Some(description) = command_description.as_deref() {
        if !console.is_verbose() {
            console.writeln(description);
        } else if !print_output {
            console.spinner_start(description);
            spinner_shown = true;
        }
    } else {
        let echoed = console.success(command);
        console.writeln(&echoed);
    }

    let result = {
        let mut handler = |event: ExecEvent<'_>| match event {
            ExecEvent::Stdout(chunk) | ExecEvent::Stderr(chunk) => {
                if print_output {
                    console.write(chunk);
                }
            }
            ExecEvent::Tick => {
                if spinner_shown {
                    console.spinner_tick();
                }
            }
        };
        run(command, timeout_secs, idle_timeout_secs, &mut handler)
    };

    if spinner_shown {
        console.spinner_stop();
    }

    let captured = result?;
    if spinner_shown {
        if let Some(description) = command_description.as_deref() {
            console.writeln(description);
        }
    }

    Ok(captured.stdout.trim().to_string())
}

/// Run a command to completion or timeout, delivering output and tick
/// events to `on_event` as they happen.
pub fn run(
    command: &str,
    timeout_secs: u64,
    idle_timeout_secs: u64,
    on_event: &mut dyn FnMut(ExecEvent<'_>),
) -> Result<CommandOutput> {
    let mut child = spawn_shell(command)?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (tx, rx) = mpsc::channel::<(bool, String)>();
    let mut readers = Vec::new();
    if let Some(stream) = stdout {
        readers.push(spawn_reader(stream, true, tx.clone()));
    }
    if let Some(stream) = stderr {
        readers.push(spawn_reader(stream, false, tx.clone()));
    }
    drop(tx);

    let start = Instant::now();
    let total = Duration::from_secs(timeout_secs);
    let idle = Duration::from_secs(idle_timeout_secs);
    let mut last_output = start;
    let mut stdout_buf = String::new();
    let mut stderr_buf = String::new();

    loop {
        let elapsed = start.elapsed();
        if elapsed >= total {
            return Err(kill_with_timeout(&mut child, TimeoutKind::Total, timeout_secs));
        }
        let idle_elapsed = last_output.elapsed();
        if idle_elapsed >= idle {
            return Err(kill_with_timeout(&mut child, TimeoutKind::Idle, idle_timeout_secs));
        }

        let wait = TICK.min(total - elapsed).min(idle - idle_elapsed);
        match rx.recv_timeout(wait) {
            Ok((is_stdout, chunk)) => {
                last_output = Instant::now();
                if is_stdout {
                    stdout_buf.push_str(&chunk);
                    on_event(ExecEvent::Stdout(&chunk));
                } else {
                    stderr_buf.push_str(&chunk);
                    on_event(ExecEvent::Stderr(&chunk));
                }
            }
            Err(RecvTimeoutError::Timeout) => on_event(ExecEvent::Tick),
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    for reader in readers {
        let _ = reader.join();
    }

    // Output streams are closed; the process may still be running.
    // The idle window keeps counting from the last chunk received, so
    // a child that closed its descriptors and lingers still times out.
    let deadline = start + total;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            return Err(kill_with_timeout(&mut child, TimeoutKind::Total, timeout_secs));
        }
        if last_output.elapsed() >= idle {
            return Err(kill_with_timeout(&mut child, TimeoutKind::Idle, idle_timeout_secs));
        }
        thread::sleep(Duration::from_millis(20));
    };

    Ok(CommandOutput {
        stdout: stdout_buf,
        stderr: stderr_buf,
        success: status.success(),
        exit_code: status.code().unwrap_or(-1),
    })
}

fn spawn_shell(command: &str) -> Result<Child> {
    #[cfg(windows)]
    let mut cmd = {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    };

    #[cfg(not(windows))]
    let mut cmd = {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| Error::Spawn {
            command: command.to_string(),
            source,
        })
}

fn spawn_reader<R: Read + Send + 'static>(
    mut stream: R,
    is_stdout: bool,
    tx: mpsc::Sender<(bool, String)>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let chunk = String::from_utf8_lossy(&buf[..n]).into_owned();
                    if tx.send((is_stdout, chunk)).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn kill_with_timeout(child: &mut Child, kind: TimeoutKind, secs: u64) -> Error {
    let _ = child.kill();
    let _ = child.wait();
    Error::Timeout { kind, secs }
}
