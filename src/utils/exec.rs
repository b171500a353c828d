//! External command execution utilities.
//!
//! Runs a command with optional stdin bytes, captures stdout and stderr, and
//! enforces a timeout. Anything written to stderr counts as a failure.

use regex::Regex;
use std::{
    borrow::Cow,
    ffi::OsString,
    io::{self, Read, Write},
    process::{Child, Command, ExitStatus, Output, Stdio},
    sync::{
        OnceLock,
        mpsc::{self, Receiver},
    },
    thread,
    time::{Duration, Instant},
};
use thiserror::Error;

/// Poll interval while waiting for a child with a deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Macros
// ============================================================================

/// Run an external command with fixed arguments and no stdin.
///
/// # Examples
/// ```ignore
/// exec!(timeout=Duration::from_secs(60); &config.build.converter.command; "-t", "json", input)?;
/// ```
#[macro_export]
macro_rules! exec {
    (timeout=$timeout:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
            None,
            $timeout,
        )
    };
}

// ============================================================================
// Argument Conversion
// ============================================================================

#[doc(hidden)]
pub mod internal {
    use std::ffi::OsString;

    /// Convert to `OsString`.
    #[inline]
    pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
        s.into()
    }

    /// Trait for converting to command vector.
    pub trait ToCmd {
        fn to_cmd(self) -> Vec<OsString>;
    }

    impl<const N: usize> ToCmd for [&str; N] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.into_iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &[String] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &Vec<String> {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    /// Convert command to Vec<OsString>.
    #[inline]
    pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
        cmd.to_cmd()
    }

    /// Filter out empty args.
    #[inline]
    pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
        args.iter().filter(|a| !a.is_empty()).cloned().collect()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Failed to execute `{name}`")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for `{name}`")]
    Wait {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("Command `{name}` failed with {status}\n{stderr}")]
    Failed {
        name: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Command `{name}` reported errors\n{stderr}")]
    Stderr { name: String, stderr: String },

    #[error("Command `{name}` timed out after {} ms", timeout.as_millis())]
    Timeout { name: String, timeout: Duration },
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command, feeding `stdin` if given, and capture its output.
///
/// # Errors
/// Spawn failure, a non-zero exit code, non-empty stderr, or running past
/// `timeout`. A timed out child is killed.
pub fn exec(
    cmd: &[OsString],
    args: &[OsString],
    stdin: Option<&[u8]>,
    timeout: Option<Duration>,
) -> Result<Output, ExecError> {
    let (name, mut command) = prepare(cmd, args)?;

    command
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| ExecError::Spawn {
        name: name.clone(),
        source,
    })?;

    let deadline = timeout.map(|t| Instant::now() + t);

    // stdin, stdout and stderr are pumped on their own threads so a child
    // blocked on a full pipe can not stall the others
    if let (Some(mut pipe), Some(bytes)) = (child.stdin.take(), stdin) {
        let bytes = bytes.to_vec();
        thread::spawn(move || {
            // EPIPE when the child exits early, its status tells the story
            pipe.write_all(&bytes).ok();
        });
    }
    let out = pump(child.stdout.take());
    let err = pump(child.stderr.take());

    let status = wait_with_timeout(&mut child, &name, timeout)?;

    // a grandchild may still hold the pipes after the child is gone; the
    // readers are then left behind once the deadline passes
    let timed_out = || ExecError::Timeout {
        name: name.clone(),
        timeout: timeout.unwrap_or_default(),
    };
    let stdout = drain(&out, deadline).ok_or_else(timed_out)?;
    let stderr = drain(&err, deadline).ok_or_else(timed_out)?;

    let output = Output {
        status,
        stdout,
        stderr,
    };
    check_output(&name, &output)?;
    Ok(output)
}

/// Read `pipe` to the end on a detached thread.
fn pump<R: Read + Send + 'static>(pipe: Option<R>) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).ok();
        }
        tx.send(buf).ok();
    });
    rx
}

/// Collected pipe contents, `None` if the pipe is still open at `deadline`.
fn drain(rx: &Receiver<Vec<u8>>, deadline: Option<Instant>) -> Option<Vec<u8>> {
    match deadline {
        Some(deadline) => rx
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .ok(),
        None => rx.recv().ok(),
    }
}

fn wait_with_timeout(
    child: &mut Child,
    name: &str,
    timeout: Option<Duration>,
) -> Result<ExitStatus, ExecError> {
    let wait_err = |source| ExecError::Wait {
        name: name.to_owned(),
        source,
    };

    let Some(timeout) = timeout else {
        return child.wait().map_err(wait_err);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(wait_err)? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            child.kill().ok();
            child.wait().map_err(wait_err)?;
            return Err(ExecError::Timeout {
                name: name.to_owned(),
                timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Prepare a Command from components.
fn prepare(cmd: &[OsString], args: &[OsString]) -> Result<(String, Command), ExecError> {
    let (program, leading) = cmd.split_first().ok_or(ExecError::EmptyCommand)?;
    let name = program.to_string_lossy().into_owned();

    let mut command = Command::new(program);
    command.args(leading).args(args);

    Ok((name, command))
}

/// Fail on a non-zero exit or anything written to stderr.
fn check_output(name: &str, output: &Output) -> Result<(), ExecError> {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = strip_ansi(stderr.trim()).into_owned();

    if !output.status.success() {
        return Err(ExecError::Failed {
            name: name.to_owned(),
            status: output.status,
            stderr,
        });
    }
    if !stderr.is_empty() {
        return Err(ExecError::Stderr {
            name: name.to_owned(),
            stderr,
        });
    }
    Ok(())
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    match RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").ok()) {
        Some(re) => re.replace_all(s, ""),
        None => Cow::Borrowed(s),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::internal::*;
    use super::*;

    const TIMEOUT: Option<Duration> = Some(Duration::from_secs(10));

    #[test]
    fn test_to_os() {
        assert_eq!(to_os("hello"), OsString::from("hello"));
        assert_eq!(to_os(String::from("world")), OsString::from("world"));
    }

    #[test]
    fn test_to_cmd_vec_vec() {
        let v = vec!["pandoc".to_string(), "--quiet".to_string()];
        let cmd = to_cmd_vec(&v);
        assert_eq!(cmd, [OsString::from("pandoc"), OsString::from("--quiet")]);
    }

    #[test]
    fn test_filter_args() {
        let args = [OsString::from("a"), OsString::from(""), OsString::from("b")];
        assert_eq!(filter_args(&args), [OsString::from("a"), OsString::from("b")]);
    }

    #[test]
    fn test_prepare_empty() {
        assert!(matches!(prepare(&[], &[]), Err(ExecError::EmptyCommand)));
    }

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(strip_ansi("\x1b[1;32mGreen Bold\x1b[0m"), "Green Bold");
        assert_eq!(strip_ansi("Plain text"), "Plain text");
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_captures_stdout() {
        let output = crate::exec!(timeout=TIMEOUT; ["sh"]; "-c", "printf hello").unwrap();
        assert_eq!(output.stdout, b"hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_feeds_stdin() {
        let big = vec![b'x'; 1 << 20];
        let output = exec(&to_cmd_vec(["cat"]), &[], Some(&big), TIMEOUT).unwrap();
        assert_eq!(output.stdout.len(), big.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_nonzero_exit() {
        let err = crate::exec!(timeout=TIMEOUT; ["sh"]; "-c", "echo broken >&2; exit 3").unwrap_err();
        match err {
            ExecError::Failed { stderr, status, .. } => {
                assert_eq!(stderr, "broken");
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_stderr_is_failure() {
        let err = crate::exec!(timeout=TIMEOUT; ["sh"]; "-c", "echo '[WARNING] odd' >&2").unwrap_err();
        assert!(matches!(err, ExecError::Stderr { ref stderr, .. } if stderr == "[WARNING] odd"));
    }

    #[cfg(unix)]
    #[test]
    fn test_exec_timeout_kills_child() {
        let started = Instant::now();
        let timeout = Some(Duration::from_millis(100));
        let err = crate::exec!(timeout=timeout; ["sleep"]; "5").unwrap_err();

        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_does_not_wait_for_grandchild() {
        let started = Instant::now();
        let timeout = Some(Duration::from_millis(200));
        let err = crate::exec!(timeout=timeout; ["sh"]; "-c", "sleep 4; echo done").unwrap_err();

        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_process_holding_pipes_times_out() {
        let started = Instant::now();
        let timeout = Some(Duration::from_millis(300));
        let err = crate::exec!(timeout=timeout; ["sh"]; "-c", "sleep 4 & echo started").unwrap_err();

        assert!(matches!(err, ExecError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_exec_missing_program() {
        let err = crate::exec!(timeout=TIMEOUT; ["mkweb-no-such-program"];).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
