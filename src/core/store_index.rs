//! Read-only view of the helper namespace inside the password store.
//!
//! The tool's own `ls` output is decorated for humans, so structure is read
//! straight from the store directory: one directory per encoded server URL,
//! holding one `<username>.gpg` file.

use crate::constants;
use crate::core::encoding::{decode_server_url, encode_server_url};
use crate::core::helper::{HelperError, HelperResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub name: String,
    pub is_dir: bool,
}

impl StoreEntry {
    pub fn dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
        }
    }
}

/// Lists entries under the helper namespace.
pub trait StoreIndex {
    /// Entries directly under the namespace. A missing namespace is empty.
    fn server_entries(&self) -> HelperResult<Vec<StoreEntry>>;

    /// Entry names inside one encoded server directory, or `None` when that
    /// directory does not exist.
    fn user_entries(&self, encoded: &str) -> HelperResult<Option<Vec<String>>>;
}

/// [`StoreIndex`] backed by the store directory on disk.
#[derive(Debug, Clone)]
pub struct DirIndex {
    namespace_dir: PathBuf,
}

impl DirIndex {
    /// Index the namespace below a store root.
    pub fn new(store_root: &Path) -> Self {
        Self {
            namespace_dir: store_root.join(constants::NAMESPACE),
        }
    }

    #[cfg(test)]
    pub fn namespace_dir(&self) -> &Path {
        &self.namespace_dir
    }
}

impl StoreIndex for DirIndex {
    fn server_entries(&self) -> HelperResult<Vec<StoreEntry>> {
        let Some(entries) = read_entries(&self.namespace_dir)? else {
            return Ok(Vec::new());
        };
        Ok(entries)
    }

    fn user_entries(&self, encoded: &str) -> HelperResult<Option<Vec<String>>> {
        let dir = self.namespace_dir.join(encoded);
        Ok(read_entries(&dir)?.map(|entries| entries.into_iter().map(|e| e.name).collect()))
    }
}

fn read_entries(dir: &Path) -> HelperResult<Option<Vec<StoreEntry>>> {
    let read = match fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(HelperError::io(format!("read directory {}", dir.display()), e)),
    };
    let mut entries = Vec::new();
    for entry in read {
        let entry =
            entry.map_err(|e| HelperError::io(format!("read directory {}", dir.display()), e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| HelperError::io(format!("stat {}", entry.path().display()), e))?;
        let name = entry.file_name().into_string().map_err(|raw| HelperError::Decode {
            entry: raw.to_string_lossy().into_owned(),
            reason: format!("non UTF-8 name in {}", dir.display()),
        })?;
        entries.push(StoreEntry {
            name,
            is_dir: file_type.is_dir(),
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Some(entries))
}

/// File stem under which `username` is stored.
pub fn entry_stem(username: &str) -> &str {
    if username.is_empty() {
        constants::EMPTY_USERNAME_ENTRY
    } else {
        username
    }
}

/// Recover the username from an entry name: strip the store's file
/// extension and map the empty-username placeholder back to `""`.
pub fn username_from_entry(name: &str) -> &str {
    let stem = name.strip_suffix(constants::STORE_EXTENSION).unwrap_or(name);
    if stem == constants::EMPTY_USERNAME_ENTRY {
        ""
    } else {
        stem
    }
}

/// Find the single username stored for `server_url`.
pub fn lookup_username(index: &dyn StoreIndex, server_url: &str) -> HelperResult<String> {
    let encoded = encode_server_url(server_url);
    let Some(names) = index.user_entries(&encoded)? else {
        return Err(HelperError::NotFound);
    };
    single_username(names, server_url)
}

/// Map every stored server URL to its username.
pub fn list_servers(index: &dyn StoreIndex) -> HelperResult<BTreeMap<String, String>> {
    let mut servers = BTreeMap::new();
    for entry in index.server_entries()? {
        if !entry.is_dir {
            warn!(entry = %entry.name, "skipping non-directory in namespace");
            continue;
        }
        let server_url = decode_server_url(&entry.name)?;
        let names = index.user_entries(&entry.name)?.ok_or_else(|| {
            HelperError::Inconsistent(format!("entry {} vanished while listing", entry.name))
        })?;
        let username = single_username(names, &server_url)?;
        servers.insert(server_url, username);
    }
    Ok(servers)
}

// The directory existing with no usable entry means a partial write or
// out-of-band tampering; neither is reported as not-found.
fn single_username(names: Vec<String>, server_url: &str) -> HelperResult<String> {
    match names.as_slice() {
        [] => Err(HelperError::Inconsistent(format!(
            "no usernames for {}",
            server_url
        ))),
        [only] => Ok(username_from_entry(only).to_string()),
        _ => Err(HelperError::Inconsistent(format!(
            "multiple usernames for {}",
            server_url
        ))),
    }
}
