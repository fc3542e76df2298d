//! Core logic: the Helper contract, protocol dispatch, and the gopass backend.

pub mod encoding;
pub mod gopass;
pub mod helper;
pub mod init_guard;
pub mod protocol;
pub mod settings;
pub mod store_index;
