//! Docker credential helper backed by gopass.
//!
//! Speaks the credential-helper protocol (`store`, `get`, `erase`, `list`)
//! on stdin/stdout and keeps credentials in the gopass password store.
//!
//! ## Modules
//! - `cli` — Argument parsing and helper construction
//! - `core` — Helper contract, protocol dispatch, gopass backend, settings
//! - `models` — Data structures (credentials, config file)
//! - `util` — Subprocesses, paths, logging

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;
