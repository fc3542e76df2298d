//! Shared test fixtures: a gopass stand-in working on a temp directory.

use gopass_credential_helper::core::gopass::GopassHelper;
use gopass_credential_helper::core::helper::{HelperError, HelperResult};
use gopass_credential_helper::core::protocol::{self, ProtocolError};
use gopass_credential_helper::util::command::CommandRunner;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use zeroize::Zeroizing;

/// Behaves like `gopass` for the subset of commands the helper uses,
/// storing `<entry>.gpg` files under `root`.
pub struct FakeGopass {
    root: PathBuf,
    pub init_checks: AtomicUsize,
}

impl FakeGopass {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            init_checks: AtomicUsize::new(0),
        }
    }

    fn entry_file(&self, entry: &str) -> PathBuf {
        self.root.join(format!("{}.gpg", entry))
    }
}

fn io_err(context: &str, e: std::io::Error) -> HelperError {
    HelperError::io(context, e)
}

impl CommandRunner for FakeGopass {
    fn run(&self, stdin: &str, args: &[&str]) -> HelperResult<Zeroizing<String>> {
        let out = match args {
            ["ls", "--flat"] => {
                self.init_checks.fetch_add(1, Ordering::SeqCst);
                String::new()
            }
            ["config", "mounts.path"] => self.root.display().to_string(),
            ["insert", "-f", entry] => {
                let file = self.entry_file(entry);
                if let Some(parent) = file.parent() {
                    fs::create_dir_all(parent).map_err(|e| io_err("mkdir", e))?;
                }
                fs::write(&file, stdin).map_err(|e| io_err("write", e))?;
                String::new()
            }
            ["show", "-o", entry] => {
                fs::read_to_string(self.entry_file(entry)).map_err(|e| io_err("read", e))? + "\n"
            }
            ["rm", "-rf", entry] => {
                let dir = self.root.join(entry);
                if dir.exists() {
                    fs::remove_dir_all(dir).map_err(|e| io_err("remove", e))?;
                }
                String::new()
            }
            ["rm", "-f", entry] => {
                let file = self.entry_file(entry);
                if file.exists() {
                    fs::remove_file(file).map_err(|e| io_err("remove", e))?;
                }
                String::new()
            }
            other => {
                return Err(HelperError::Command {
                    command: format!("gopass {}", other.join(" ")),
                    status: "exit status: 1".to_string(),
                    stderr: "unsupported".to_string(),
                })
            }
        };
        Ok(Zeroizing::new(out.trim_end_matches('\n').to_string()))
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub helper: GopassHelper<FakeGopass>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp store");
        let helper = GopassHelper::with_runner(FakeGopass::new(dir.path()));
        Self { dir, helper }
    }

    pub fn namespace_dir(&self) -> PathBuf {
        self.dir.path().join("docker-credential-helpers")
    }

    /// Run one protocol action, returning stdout.
    pub fn run(&self, action: &str, input: &str) -> Result<String, ProtocolError> {
        let mut out = Vec::new();
        protocol::serve(&self.helper, action, input.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }
}
