//! Utility modules for subprocesses and logging.

pub mod command;
pub mod logging;
