//! Child process execution with bounded output capture.
//!
//! The executor spawns the requested argument vector as a child process —
//! `argv[0]` resolved through the OS executable search path, the remaining
//! elements passed verbatim, never shell-interpreted — with stdin closed and
//! both output streams piped into bounded capture tasks. It always waits for
//! natural termination; there is no timeout or cancellation path.

pub mod capture;

use crate::error::{BridgeError, DecodeError, Result};
use capture::{capture_stream, CapturedStream};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Exit code reported when the child did not exit normally (signal, crash),
/// or could not be spawned at all.
pub const EXIT_CODE_ABNORMAL: i32 = -1;

/// Outcome of one child process execution.
///
/// Produced exactly once per accepted request and owned by the controller
/// for the duration of that request.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// The child's exit code, or [`EXIT_CODE_ABNORMAL`] if it was terminated
    /// by a signal.
    pub exit_code: i32,

    /// Captured standard output, possibly truncated.
    pub stdout: CapturedStream,

    /// Captured standard error, possibly truncated.
    pub stderr: CapturedStream,
}

impl ExecutionResult {
    /// Number of streams that lost bytes to the capture bound.
    pub fn truncated_streams(&self) -> u64 {
        u64::from(self.stdout.is_truncated()) + u64::from(self.stderr.is_truncated())
    }
}

/// Spawns child processes and captures their output.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    /// Usable capture bound per stream, in bytes.
    capture_limit: usize,
}

impl CommandExecutor {
    /// Create an executor with the given per-stream capture bound.
    pub fn new(capture_limit: usize) -> Self {
        Self { capture_limit }
    }

    /// Execute `argv` and wait for the child to terminate.
    ///
    /// Fails with [`BridgeError::SpawnFailed`] only when the OS cannot create
    /// the process; a child that runs and fails is reported through
    /// [`ExecutionResult::exit_code`].
    #[instrument(skip(self, argv), fields(program = argv.first().map(String::as_str).unwrap_or("")))]
    pub async fn execute(&self, argv: &[String]) -> Result<ExecutionResult> {
        let (program, args) = argv
            .split_first()
            .ok_or(BridgeError::MalformedRequest(DecodeError::EmptyCommand))?;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BridgeError::SpawnFailed {
                program: program.clone(),
                source,
            })?;

        debug!(pid = child.id(), args = args.len(), "Child process spawned");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| missing_pipe(program, "stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| missing_pipe(program, "stderr"))?;

        let limit = self.capture_limit;
        let stdout_task = tokio::spawn(capture_stream(stdout, limit));
        let stderr_task = tokio::spawn(capture_stream(stderr, limit));

        let exit_code = match child.wait().await {
            Ok(status) => status.code().unwrap_or(EXIT_CODE_ABNORMAL),
            Err(error) => {
                warn!(%error, "Waiting for child failed");
                EXIT_CODE_ABNORMAL
            }
        };

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        debug!(
            exit_code,
            stdout_bytes = stdout.bytes.len(),
            stderr_bytes = stderr.bytes.len(),
            discarded_bytes = stdout.discarded_bytes + stderr.discarded_bytes,
            "Child process finished"
        );

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
        })
    }
}

fn missing_pipe(program: &str, stream: &str) -> BridgeError {
    BridgeError::SpawnFailed {
        program: program.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            format!("{stream} pipe was not created"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn executor() -> CommandExecutor {
        CommandExecutor::new(crate::config::DEFAULT_CAPTURE_LIMIT_BYTES)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_echo_captures_stdout() {
        let result = executor().execute(&argv(&["echo", "hello"])).await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.bytes, b"hello\n");
        assert!(result.stderr.bytes.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let result = executor()
            .execute(&argv(&["echo", "$HOME; rm -rf /"]))
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.bytes, b"$HOME; rm -rf /\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_false_reports_exit_code() {
        let result = executor().execute(&argv(&["false"])).await.unwrap();
        assert_eq!(result.exit_code, 1);
        assert!(result.stdout.bytes.is_empty());
        assert!(result.stderr.bytes.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_is_captured_separately() {
        let result = executor()
            .execute(&argv(&["sh", "-c", "echo out; echo err >&2"]))
            .await
            .unwrap();
        assert_eq!(result.stdout.bytes, b"out\n");
        assert_eq!(result.stderr.bytes, b"err\n");
    }

    #[tokio::test]
    async fn test_nonexistent_program_is_spawn_failure() {
        let err = executor()
            .execute(&argv(&["definitely-not-a-real-binary-5a1c"]))
            .await
            .unwrap_err();
        match err {
            BridgeError::SpawnFailed { ref program, .. } => {
                assert_eq!(program, "definitely-not-a-real-binary-5a1c");
            }
            other => panic!("expected SpawnFailed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_output_truncated_at_bound() {
        // printf pads to 8192 bytes, twice the default bound.
        let result = executor()
            .execute(&argv(&["sh", "-c", "printf '%08192d' 0"]))
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(
            result.stdout.bytes.len(),
            crate::config::DEFAULT_CAPTURE_LIMIT_BYTES
        );
        assert!(result.stdout.is_truncated());
        assert_eq!(result.truncated_streams(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_oversized_output_does_not_block() {
        // 1 MiB of output would deadlock a reader that stops at the bound
        // without draining the pipe.
        let executor = CommandExecutor::new(1024);
        let result = executor
            .execute(&argv(&["sh", "-c", "head -c 1048576 /dev/zero"]))
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.bytes.len(), 1024);
        assert_eq!(result.stdout.discarded_bytes, 1_048_576 - 1024);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_termination_reports_sentinel() {
        let result = executor()
            .execute(&argv(&["sh", "-c", "kill -9 $$"]))
            .await
            .unwrap();
        assert_eq!(result.exit_code, EXIT_CODE_ABNORMAL);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdin_is_closed() {
        // cat with a closed stdin exits immediately instead of hanging.
        let result = executor().execute(&argv(&["cat"])).await.unwrap();
        assert_eq!(result.exit_code, 0);
        assert!(result.stdout.bytes.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_program_as_absolute_path() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.sh");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh\necho from-script").unwrap();
        drop(file);
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let result = executor()
            .execute(&[path.to_string_lossy().into_owned()])
            .await
            .unwrap();
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.bytes, b"from-script\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_writer_is_fully_captured() {
        // Reads loop until end-of-file, so output written after the first
        // read still lands in the capture.
        let result = executor()
            .execute(&argv(&["sh", "-c", "printf a; sleep 0.2; printf b"]))
            .await
            .unwrap();
        assert_eq!(result.stdout.bytes, b"ab");
    }

    #[tokio::test]
    async fn test_empty_argv_rejected() {
        let err = executor().execute(&[]).await.unwrap_err();
        assert_eq!(err.code(), "EMPTY_COMMAND");
    }
}
