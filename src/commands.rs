use crate::error::{ChangeflowError, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;

/// Receives the combined stdout/stderr of post-bump commands as they run.
pub trait CommandObserver {
    fn output(&mut self, text: &str);
}

/// Observer that buffers all output, used in tests and dry runs.
#[derive(Debug, Default)]
pub struct BufferObserver {
    pub buffer: String,
}

impl CommandObserver for BufferObserver {
    fn output(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// Whether a failed post-bump command should still let the release proceed
/// to commit and tag.
///
/// The current documented behavior is that a failing command stops the
/// remaining commands in the list but does not abort the release. Likely an
/// oversight in the original design; kept here as a single policy knob so
/// it can be corrected without touching the orchestrator.
pub fn continue_after_command_failure() -> bool {
    true
}

/// Read lines from a child pipe and send them to the forwarding channel.
fn forward_lines<R: Read + Send + 'static>(
    reader: R,
    sender: mpsc::Sender<String>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            if sender.send(format!("{}\n", line)).is_err() {
                break;
            }
        }
    })
}

/// Execute the configured post-bump commands sequentially in the project
/// root.
///
/// Each command line runs through `sh -c` with piped stdout/stderr, and
/// lines reach the observer as the command produces them rather than after
/// it exits. The call blocks with no deadline. The first failing command
/// stops the remaining commands and returns a `Command` error; the caller
/// decides via [continue_after_command_failure] whether that aborts the
/// release.
pub fn run_commands(
    root: &Path,
    commands: &[String],
    observer: &mut dyn CommandObserver,
) -> Result<()> {
    for command in commands {
        observer.output(&format!("$ {}\n", command));

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(root)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ChangeflowError::command(format!("Failed to execute '{}': {}", command, e))
            })?;

        let (sender, receiver) = mpsc::channel();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, sender.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, sender.clone()));
        }
        drop(sender);

        // The channel closes once both pipes hit EOF
        for line in receiver {
            observer.output(&line);
        }
        for handle in readers {
            let _ = handle.join();
        }

        let status = child.wait().map_err(|e| {
            ChangeflowError::command(format!("Failed to wait for '{}': {}", command, e))
        })?;

        if !status.success() {
            return Err(ChangeflowError::command(format!(
                "Command '{}' failed with exit code {}",
                command,
                status.code().unwrap_or(-1)
            )));
        }
    }
    Ok(())
}
