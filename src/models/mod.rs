//! Data models for the helper protocol and configuration.

pub mod credential;
pub mod helper_config;
