//! Helper configuration file model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HelperConfigFile {
    /// Path or name of the gopass executable.
    #[serde(default)]
    pub gopass_bin: Option<String>,

    /// Store root override; skips asking gopass for `mounts.path`.
    #[serde(default)]
    pub store_dir: Option<PathBuf>,
}
