//! Subprocess execution for the external secret tool.
//!
//! Secrets travel on the child's stdin, never on its argument list.

use crate::core::helper::{combine_errors, HelperError, HelperResult};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;
use zeroize::Zeroizing;

/// Runs the external tool with the given arguments and stdin content.
///
/// Returns stdout with trailing newlines removed. A non-zero exit becomes
/// [`HelperError::Command`] carrying the tool's stderr.
pub trait CommandRunner: Send + Sync {
    fn run(&self, stdin: &str, args: &[&str]) -> HelperResult<Zeroizing<String>>;
}

/// Runs a real program found on `PATH` or by absolute path.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    program: String,
}

impl SystemRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, stdin: &str, args: &[&str]) -> HelperResult<Zeroizing<String>> {
        debug!(program = %self.program, ?args, "running command");
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| HelperError::io(format!("run {}", self.program), e))?;

        let child_stdin = child.stdin.take();
        let (write_err, output) = thread::scope(|s| {
            let writer = s.spawn(move || write_stdin(child_stdin, stdin));
            let output = child.wait_with_output();
            let write_err = writer.join().unwrap_or_else(|_| {
                Some(HelperError::Inconsistent("stdin writer panicked".to_string()))
            });
            (write_err, output)
        });

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                let wait_err = HelperError::io(format!("wait for {}", self.program), e);
                return Err(match write_err {
                    Some(write_err) => HelperError::Multiple(vec![write_err, wait_err]),
                    None => wait_err,
                });
            }
        };

        let status_err = if output.status.success() {
            None
        } else {
            Some(HelperError::Command {
                command: format!("{} {}", self.program, args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr)
                    .trim_end_matches(['\n', '\r'])
                    .to_string(),
            })
        };
        combine_errors([write_err, status_err])?;

        Ok(Zeroizing::new(trim_newlines(&String::from_utf8_lossy(
            &output.stdout,
        ))))
    }
}

fn write_stdin(stdin: Option<std::process::ChildStdin>, content: &str) -> Option<HelperError> {
    let mut stdin = stdin?;
    match stdin.write_all(content.as_bytes()) {
        Ok(()) => None,
        // The tool may exit without reading stdin; its exit status decides.
        Err(e) if e.kind() == ErrorKind::BrokenPipe => None,
        Err(e) => Some(HelperError::io("write command stdin", e)),
    }
}

/// Strip trailing newlines; gopass ends `show` output with one.
pub fn trim_newlines(s: &str) -> String {
    s.trim_end_matches(['\n', '\r']).to_string()
}
