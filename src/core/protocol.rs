//! Credential helper wire protocol.
//!
//! One action word selects the operation; its payload arrives on stdin and
//! any result is written to stdout:
//!
//! | action  | stdin                          | stdout                         |
//! |---------|--------------------------------|--------------------------------|
//! | store   | `{ServerURL,Username,Secret}`  | nothing                        |
//! | get     | raw server URL                 | `{ServerURL,Username,Secret}`  |
//! | erase   | raw server URL                 | nothing                        |
//! | list    | nothing                        | `{serverURL: username}`        |
//! | version | nothing                        | version line                   |

use crate::constants;
use crate::core::helper::{Helper, HelperError};
use crate::models::credential::Credentials;
use std::fmt;
use std::io::{self, Read, Write};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Store,
    Get,
    Erase,
    List,
    Version,
}

impl FromStr for Action {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "store" => Ok(Action::Store),
            "get" => Ok(Action::Get),
            "erase" => Ok(Action::Erase),
            "list" => Ok(Action::List),
            "version" => Ok(Action::Version),
            other => Err(ProtocolError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Store => "store",
            Action::Get => "get",
            Action::Erase => "erase",
            Action::List => "list",
            Action::Version => "version",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unknown credential action `{0}`")]
    UnknownAction(String),

    #[error("error reading payload from stdin: {0}")]
    Read(#[source] io::Error),

    #[error("payload exceeds maximum size of {} bytes", constants::MAX_PAYLOAD_SIZE)]
    PayloadTooLarge,

    #[error("error decoding credentials: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("error encoding response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("error writing response: {0}")]
    Write(#[source] io::Error),

    #[error(transparent)]
    Helper(#[from] HelperError),
}

impl ProtocolError {
    /// Whether the failure is the helper's distinguished not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProtocolError::Helper(e) if e.is_not_found())
    }
}

/// Run one protocol action against `helper`.
pub fn serve<H, R, W>(helper: &H, action: &str, stdin: R, stdout: W) -> Result<(), ProtocolError>
where
    H: Helper + ?Sized,
    R: Read,
    W: Write,
{
    let action: Action = action.parse()?;
    debug!(%action, "dispatching");
    match action {
        Action::Store => store(helper, stdin),
        Action::Get => get(helper, stdin, stdout),
        Action::Erase => erase(helper, stdin),
        Action::List => list(helper, stdout),
        Action::Version => version(stdout),
    }
}

/// Decode credentials from `stdin` and hand them to the helper.
pub fn store<H: Helper + ?Sized, R: Read>(helper: &H, stdin: R) -> Result<(), ProtocolError> {
    let payload = read_payload(stdin)?;
    let creds: Option<Credentials> =
        serde_json::from_str(&payload).map_err(ProtocolError::Decode)?;
    let creds = creds.ok_or(HelperError::MissingCredentials)?;
    if creds.server_url.is_empty() {
        return Err(HelperError::MissingServerUrl.into());
    }
    helper.add(&creds)?;
    Ok(())
}

/// Look up the server URL read from `stdin` and write its credentials.
pub fn get<H: Helper + ?Sized, R: Read, W: Write>(
    helper: &H,
    stdin: R,
    mut stdout: W,
) -> Result<(), ProtocolError> {
    let server_url = read_server_url(stdin)?;
    let (username, secret) = helper.get(&server_url)?;
    let creds = Credentials::new(server_url, username, secret.as_str());
    write_json(&mut stdout, &creds)
}

/// Remove the credentials for the server URL read from `stdin`.
pub fn erase<H: Helper + ?Sized, R: Read>(helper: &H, stdin: R) -> Result<(), ProtocolError> {
    let server_url = read_server_url(stdin)?;
    helper.delete(&server_url)?;
    Ok(())
}

/// Write every stored server URL with its username.
pub fn list<H: Helper + ?Sized, W: Write>(helper: &H, mut stdout: W) -> Result<(), ProtocolError> {
    let servers = helper.list()?;
    write_json(&mut stdout, &servers)
}

pub fn version<W: Write>(mut stdout: W) -> Result<(), ProtocolError> {
    writeln!(
        stdout,
        "{} ({}) {}",
        constants::HELPER_NAME,
        constants::HELPER_PACKAGE,
        env!("CARGO_PKG_VERSION")
    )
    .map_err(ProtocolError::Write)?;
    stdout.flush().map_err(ProtocolError::Write)
}

fn read_payload<R: Read>(stdin: R) -> Result<Zeroizing<String>, ProtocolError> {
    let mut buf = Zeroizing::new(String::new());
    stdin
        .take(constants::MAX_PAYLOAD_SIZE as u64 + 1)
        .read_to_string(&mut buf)
        .map_err(ProtocolError::Read)?;
    if buf.len() > constants::MAX_PAYLOAD_SIZE {
        return Err(ProtocolError::PayloadTooLarge);
    }
    Ok(buf)
}

fn read_server_url<R: Read>(stdin: R) -> Result<String, ProtocolError> {
    let payload = read_payload(stdin)?;
    let server_url = payload.trim();
    if server_url.is_empty() {
        return Err(HelperError::MissingServerUrl.into());
    }
    Ok(server_url.to_string())
}

fn write_json<W: Write, T: serde::Serialize>(stdout: &mut W, value: &T) -> Result<(), ProtocolError> {
    serde_json::to_writer(&mut *stdout, value).map_err(ProtocolError::Encode)?;
    writeln!(stdout).map_err(ProtocolError::Write)?;
    stdout.flush().map_err(ProtocolError::Write)
}
