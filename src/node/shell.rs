//! Child-process plumbing shared by the local and SSH executors

use anyhow::{Context, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use std::io::Read;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

use super::ExecOutput;

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured size per output stream (10MB)
pub(crate) const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

/// Run a prepared command to completion, killing it after `timeout`.
///
/// The child leads its own process group so a timeout also takes down
/// anything the script started.
///
/// `label` is only used for error context; it must not contain the script
/// body, which may carry credentials.
pub(crate) fn run_with_timeout(
    mut cmd: Command,
    label: &str,
    timeout: Duration,
) -> Result<ExecOutput> {
    let start = Instant::now();

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn {label}"))?;

    // Drain the pipes while waiting. A child blocked on a full pipe buffer
    // would otherwise never exit.
    let (stdout_tx, stdout_rx) = mpsc::channel();
    let (stderr_tx, stderr_rx) = mpsc::channel();

    if let Some(stdout) = child.stdout.take() {
        thread::spawn(move || {
            let _ = stdout_tx.send(read_stream_to_string(stdout));
        });
    } else {
        let _ = stdout_tx.send(String::new());
    }

    if let Some(stderr) = child.stderr.take() {
        thread::spawn(move || {
            let _ = stderr_tx.send(read_stream_to_string(stderr));
        });
    } else {
        let _ = stderr_tx.send(String::new());
    }

    let wait_result = match child.wait_timeout(timeout) {
        Ok(status) => status,
        Err(e) => {
            kill_child_process(&mut child);
            return Err(e).with_context(|| format!("Failed to wait for {label}"));
        }
    };

    if wait_result.is_none() {
        kill_child_process(&mut child);
    }

    let duration = start.elapsed();

    let stdout = stdout_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());
    let stderr = stderr_rx
        .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
        .unwrap_or_else(|_| "[output collection timed out]".to_string());

    Ok(match wait_result {
        Some(status) => ExecOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            duration,
            timed_out: false,
        },
        None => ExecOutput {
            exit_code: None,
            stdout,
            stderr: format!(
                "{}\n[Process killed after {}s timeout]",
                stderr,
                timeout.as_secs()
            ),
            duration,
            timed_out: true,
        },
    })
}

/// Read a stream to string, capped at MAX_OUTPUT_SIZE.
///
/// Data past the cap is drained and discarded so the writer never sees a
/// broken pipe.
pub(crate) fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    let mut discard = [0u8; 8192];
                    while stream.read(&mut discard).unwrap_or(0) > 0 {}
                    buf.extend_from_slice(b"\n[output truncated at 10MB]");
                    break;
                }
            }
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn kill_child_process(child: &mut Child) {
    // The group may already be gone
    if let Ok(pgid) = i32::try_from(child.id()) {
        let _ = killpg(Pid::from_raw(pgid), Signal::SIGKILL);
    }
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_stream_small_input() {
        let result = read_stream_to_string(Cursor::new(b"hello world"));
        assert_eq!(result, "hello world");
    }

    #[test]
    fn test_read_stream_empty_input() {
        let data: &[u8] = b"";
        assert_eq!(read_stream_to_string(Cursor::new(data)), "");
    }

    #[test]
    fn test_read_stream_truncates_at_limit() {
        let data = vec![b'x'; MAX_OUTPUT_SIZE + 1000];
        let result = read_stream_to_string(Cursor::new(data));

        assert!(result.contains("[output truncated at 10MB]"));
        assert!(result.len() <= MAX_OUTPUT_SIZE + 50);
    }

    #[test]
    fn test_read_stream_exact_limit() {
        let data = vec![b'y'; MAX_OUTPUT_SIZE];
        let result = read_stream_to_string(Cursor::new(data));
        assert!(!result.contains("[output truncated"));
        assert_eq!(result.len(), MAX_OUTPUT_SIZE);
    }
}
