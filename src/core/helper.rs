//! The Helper contract every credential backend implements.

use crate::models::credential::Credentials;
use std::collections::BTreeMap;
use thiserror::Error;
use zeroize::Zeroizing;

/// Message carried by the distinguished not-found error.
pub const NOT_FOUND_MESSAGE: &str = "credentials not found in native keychain";

/// Message returned when a request has no server URL.
pub const MISSING_SERVER_URL_MESSAGE: &str = "no credentials server URL";

/// Errors a backend can return through the Helper contract.
#[derive(Error, Debug)]
pub enum HelperError {
    #[error("{}", NOT_FOUND_MESSAGE)]
    NotFound,

    #[error("{}", MISSING_SERVER_URL_MESSAGE)]
    MissingServerUrl,

    #[error("missing credentials")]
    MissingCredentials,

    #[error("invalid username {0:?}: {1}")]
    InvalidUsername(String, &'static str),

    #[error("gopass is not initialized: {0}")]
    NotInitialized(Box<HelperError>),

    #[error("{command} failed: {status}: {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("unable to get user home directory to expand {0}")]
    HomeDirUnavailable(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt entry {entry:?}: {reason}")]
    Decode { entry: String, reason: String },

    #[error("{0}")]
    Inconsistent(String),

    #[error("{}", join_messages(.0))]
    Multiple(Vec<HelperError>),
}

pub type HelperResult<T> = Result<T, HelperError>;

impl HelperError {
    /// Whether this is the distinguished "credentials not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HelperError::NotFound)
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        HelperError::Io {
            context: context.into(),
            source,
        }
    }
}

fn join_messages(errors: &[HelperError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Combine independent failures into one result.
///
/// No errors yields `Ok(())`, a single error is returned as is, and several
/// are wrapped in [`HelperError::Multiple`].
pub fn combine_errors(errors: impl IntoIterator<Item = Option<HelperError>>) -> HelperResult<()> {
    let mut errors: Vec<HelperError> = errors.into_iter().flatten().collect();
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(HelperError::Multiple(errors)),
    }
}

/// Capability contract for a native credential store.
///
/// The dispatcher only talks to this trait, so backends are chosen without
/// touching dispatch logic.
pub trait Helper {
    /// Store credentials, replacing any entry for the same server URL.
    fn add(&self, creds: &Credentials) -> HelperResult<()>;

    /// Remove everything stored for a server URL.
    fn delete(&self, server_url: &str) -> HelperResult<()>;

    /// Return the username and secret stored for a server URL.
    ///
    /// Absence is reported as [`HelperError::NotFound`].
    fn get(&self, server_url: &str) -> HelperResult<(String, Zeroizing<String>)>;

    /// Map every stored server URL to its username. Empty when nothing is stored.
    fn list(&self) -> HelperResult<BTreeMap<String, String>>;
}
