//! Helper backed by the `gopass` password manager.
//!
//! Entries live at `docker-credential-helpers/<base64url(serverURL)>/<username>`
//! inside the gopass store, with the secret as the entry content.

use crate::constants;
use crate::core::encoding::encode_server_url;
use crate::core::helper::{combine_errors, Helper, HelperError, HelperResult};
use crate::core::init_guard::InitGuard;
use crate::core::store_index::{self, DirIndex, StoreIndex};
use crate::models::credential::Credentials;
use crate::util::command::{CommandRunner, SystemRunner};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;
use zeroize::Zeroizing;

pub struct GopassHelper<R: CommandRunner = SystemRunner> {
    runner: R,
    store_dir: Option<PathBuf>,
    init: InitGuard,
}

impl GopassHelper<SystemRunner> {
    /// Helper driving the given gopass executable.
    pub fn new(gopass_bin: impl Into<String>) -> Self {
        Self::with_runner(SystemRunner::new(gopass_bin))
    }
}

impl<R: CommandRunner> GopassHelper<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            store_dir: None,
            init: InitGuard::new(),
        }
    }

    /// Use a fixed store root instead of asking gopass for `mounts.path`.
    pub fn with_store_dir(mut self, store_dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(store_dir.into());
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Whether gopass answers a round trip. Cached after the first success.
    pub fn check_initialized(&self) -> bool {
        self.ensure_initialized().is_ok()
    }

    fn ensure_initialized(&self) -> HelperResult<()> {
        self.init.ensure(|| {
            debug!("checking gopass is initialized");
            self.runner.run("", &["ls", "--flat"]).map(|_| ())
        })
    }

    fn run(&self, stdin: &str, args: &[&str]) -> HelperResult<Zeroizing<String>> {
        self.ensure_initialized()?;
        self.runner.run(stdin, args)
    }

    fn store_root(&self) -> HelperResult<PathBuf> {
        if let Some(dir) = &self.store_dir {
            return Ok(dir.clone());
        }
        let raw = self.run("", &["config", constants::MOUNTS_PATH_KEY])?;
        expand_store_path(&raw, dirs::home_dir, |name| std::env::var(name).ok())
    }

    fn index(&self) -> HelperResult<DirIndex> {
        let root = self.store_root()?;
        debug!(root = %root.display(), "reading gopass store");
        Ok(DirIndex::new(&root))
    }
}

/// Store path of the directory holding one server's entry.
fn server_path(encoded: &str) -> String {
    format!("{}/{}", constants::NAMESPACE, encoded)
}

/// Store path of the entry holding `username`'s secret.
fn entry_path(encoded: &str, username: &str) -> String {
    format!(
        "{}/{}/{}",
        constants::NAMESPACE,
        encoded,
        store_index::entry_stem(username)
    )
}

/// Expand `$VAR`, `${VAR}` and a leading `~` in the store path gopass reports.
/// Unset variables are left as written.
fn expand_store_path<HD, C>(raw: &str, home_dir: HD, lookup: C) -> HelperResult<PathBuf>
where
    HD: FnOnce() -> Option<PathBuf>,
    C: FnMut(&str) -> Option<String>,
{
    let mut home_missing = false;
    let expanded = shellexpand::full_with_context_no_errors(
        raw.trim(),
        || {
            let home = home_dir();
            home_missing = home.is_none();
            home.map(|h| h.to_string_lossy().into_owned())
        },
        lookup,
    );
    if home_missing && (expanded == "~" || expanded.starts_with("~/")) {
        return Err(HelperError::HomeDirUnavailable(raw.trim().to_string()));
    }
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Usernames become file names in the store, so they must be one path segment.
/// The empty username is stored under a reserved placeholder name.
fn validate_username(username: &str) -> HelperResult<()> {
    if username.contains(['/', '\\']) {
        return Err(HelperError::InvalidUsername(
            username.to_string(),
            "must not contain path separators",
        ));
    }
    if username == "." || username == ".." {
        return Err(HelperError::InvalidUsername(
            username.to_string(),
            "must not be a relative path component",
        ));
    }
    if username == constants::EMPTY_USERNAME_ENTRY {
        return Err(HelperError::InvalidUsername(
            username.to_string(),
            "is reserved for the empty username",
        ));
    }
    Ok(())
}

impl<R: CommandRunner> Helper for GopassHelper<R> {
    fn add(&self, creds: &Credentials) -> HelperResult<()> {
        if creds.server_url.is_empty() {
            return Err(HelperError::MissingServerUrl);
        }
        validate_username(&creds.username)?;
        let encoded = encode_server_url(&creds.server_url);
        self.ensure_initialized()?;

        let wanted = format!(
            "{}{}",
            store_index::entry_stem(&creds.username),
            constants::STORE_EXTENSION
        );
        let stale: Vec<String> = self
            .index()?
            .user_entries(&encoded)?
            .unwrap_or_default()
            .into_iter()
            .filter(|name| *name != wanted)
            .collect();

        // Write first so a failed insert leaves the previous credential intact.
        self.run(
            &creds.secret,
            &["insert", "-f", &entry_path(&encoded, &creds.username)],
        )?;

        // One username per server: drop entries left under other names.
        if !stale.is_empty() {
            debug!(server = %creds.server_url, count = stale.len(), "removing previous entries");
        }
        combine_errors(stale.iter().map(|name| {
            let stem = name
                .strip_suffix(constants::STORE_EXTENSION)
                .unwrap_or(name.as_str());
            let path = format!("{}/{}", server_path(&encoded), stem);
            self.run("", &["rm", "-f", &path]).err()
        }))
    }

    fn delete(&self, server_url: &str) -> HelperResult<()> {
        if server_url.is_empty() {
            return Err(HelperError::MissingServerUrl);
        }
        let encoded = encode_server_url(server_url);
        self.run("", &["rm", "-rf", &server_path(&encoded)])?;
        Ok(())
    }

    fn get(&self, server_url: &str) -> HelperResult<(String, Zeroizing<String>)> {
        if server_url.is_empty() {
            return Err(HelperError::MissingServerUrl);
        }
        self.ensure_initialized()?;
        let index = self.index()?;
        let username = store_index::lookup_username(&index, server_url)?;
        let encoded = encode_server_url(server_url);
        let secret = self.run("", &["show", "-o", &entry_path(&encoded, &username)])?;
        Ok((username, secret))
    }

    fn list(&self) -> HelperResult<BTreeMap<String, String>> {
        self.ensure_initialized()?;
        let index = self.index()?;
        store_index::list_servers(&index)
    }
}
