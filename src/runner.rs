//! Running the registry tool as a child process.
//!
//! [`CommandRunner`] is the seam between key operations and the operating
//! system. [`ProcessRunner`] spawns the real tool through tokio; tests plug in
//! runners that return canned output.

use crate::command::{quote, Invocation};
use crate::error::Result;
use crate::options::RegistryOptions;
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

/// Characters the command interpreter treats as syntax outside double quotes.
const SHELL_METACHARACTERS: [char; 7] = ['&', '|', '<', '>', '^', '(', ')'];

/// Stands in for a literal `%` on a `cmd /c` line. `%cd:~,%` expands to an
/// empty string, which splits any `%NAME%` reference before expansion.
const PERCENT_ESCAPE: &str = "%%cd:~,%";

/// Captured result of one tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Decoded standard output.
    pub stdout: String,
    /// Decoded standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Output of a run that exited with `code`.
    pub fn new(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Returns true if the tool exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes registry tool invocations.
///
/// Implementations must buffer both output streams completely and return only
/// once the process has exited. A process that cannot be started is an
/// `io::Error`; a non-zero exit is reported through [`ProcessOutput::code`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs the tool with `invocation`'s arguments.
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput>;
}

#[async_trait]
impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        (**self).run(invocation).await
    }
}

/// Runs the real tool with `tokio::process`.
pub struct ProcessRunner {
    tool_path: PathBuf,
    shell_path: PathBuf,
    utf8: bool,
    encoding: &'static Encoding,
}

impl fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("tool_path", &self.tool_path)
            .field("utf8", &self.utf8)
            .field("encoding", &self.encoding.name())
            .finish()
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        let options = RegistryOptions::default();
        Self {
            tool_path: options.resolve_tool_path(),
            shell_path: options.resolve_shell_path(),
            utf8: options.utf8,
            encoding: UTF_8,
        }
    }
}

impl ProcessRunner {
    /// Creates a runner from options.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RegistryError::InvalidEncoding`] for an unknown encoding label.
    pub fn new(options: &RegistryOptions) -> Result<Self> {
        Ok(Self {
            tool_path: options.resolve_tool_path(),
            shell_path: options.resolve_shell_path(),
            utf8: options.utf8,
            encoding: options.output_encoding()?,
        })
    }

    /// Path of the tool executable.
    pub fn tool_path(&self) -> &Path {
        &self.tool_path
    }

    /// Builds the child process for `invocation`.
    ///
    /// On Windows in UTF-8 mode the tool runs through the command interpreter
    /// after switching the console code page to 65001.
    fn command(&self, invocation: &Invocation) -> Command {
        let mut command = if self.utf8 && cfg!(windows) {
            let mut command = Command::new(&self.shell_path);
            command.args(["/d", "/s", "/c"]);
            push_verbatim(&mut command, &self.shell_line(invocation));
            command
        } else {
            let mut command = Command::new(&self.tool_path);
            for arg in invocation.args() {
                push_verbatim(&mut command, arg);
            }
            command
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }

    /// Renders the quoted `/c` operand that runs the tool under code page 65001.
    fn shell_line(&self, invocation: &Invocation) -> String {
        let tool = self.tool_path.display().to_string();
        let mut line = format!("chcp 65001 >nul && {}", quote(&tool));
        for arg in invocation.args() {
            line.push(' ');
            line.push_str(&shell_escape(arg));
        }
        format!("\"{}\"", line)
    }

    fn decode(&self, bytes: &[u8], stream: &str) -> String {
        let (text, _, had_errors) = self.encoding.decode(bytes);
        if had_errors {
            warn!(
                stream,
                encoding = self.encoding.name(),
                "Tool output contained malformed bytes"
            );
        }
        text.into_owned()
    }
}

/// Renders `arg` for a `cmd /c` line so the tool still receives it unchanged.
///
/// Arguments holding shell syntax are quoted, and every `%` is replaced with
/// [`PERCENT_ESCAPE`] so no environment variable is expanded.
fn shell_escape(arg: &str) -> String {
    let quoted = arg.len() >= 2 && arg.starts_with('"') && arg.ends_with('"');
    let arg = if !quoted && arg.contains(SHELL_METACHARACTERS) {
        quote(arg)
    } else {
        arg.to_string()
    };
    arg.replace('%', PERCENT_ESCAPE)
}

/// Appends `arg` without re-quoting; arguments are rendered by [`Invocation`].
#[cfg(windows)]
fn push_verbatim(command: &mut Command, arg: &str) {
    command.raw_arg(arg);
}

#[cfg(not(windows))]
fn push_verbatim(command: &mut Command, arg: &str) {
    command.arg(arg);
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutput> {
        debug!(command = %invocation, "Running registry tool");
        let output = self.command(invocation).output().await?;
        let code = output.status.code();
        debug!(?code, "Registry tool exited");

        Ok(ProcessOutput {
            code,
            stdout: self.decode(&output.stdout, "stdout"),
            stderr: self.decode(&output.stderr, "stderr"),
        })
    }
}
