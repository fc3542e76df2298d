//! Centralized constants for the store layout, tool invocation, and limits.

/// Namespace directory inside the gopass store that holds every helper entry.
pub const NAMESPACE: &str = "docker-credential-helpers";

/// File extension gopass appends to each stored secret.
pub const STORE_EXTENSION: &str = ".gpg";

/// Entry name standing in for an empty username. Usernames equal to it are
/// rejected so the two never collide.
pub const EMPTY_USERNAME_ENTRY: &str = ".empty-username";

/// Default name of the gopass executable.
pub const DEFAULT_GOPASS_BIN: &str = "gopass";

/// Gopass config key holding the root store path.
pub const MOUNTS_PATH_KEY: &str = "mounts.path";

/// Maximum payload accepted on stdin (1 MiB).
pub const MAX_PAYLOAD_SIZE: usize = 1_048_576;

/// Binary name reported by the `version` action.
pub const HELPER_NAME: &str = "docker-credential-gopass";

/// Upstream protocol package reported by the `version` action.
pub const HELPER_PACKAGE: &str = "github.com/docker/docker-credential-helpers";

/// Environment variable overriding the gopass executable.
pub const ENV_GOPASS_BIN: &str = "GOPASS_HELPER_BIN";

/// Environment variable overriding the store root directory.
pub const ENV_STORE_DIR: &str = "GOPASS_HELPER_STORE_DIR";

/// Environment variable pointing at the TOML config file.
pub const ENV_CONFIG: &str = "GOPASS_HELPER_CONFIG";

/// Environment variable holding the log filter directive.
pub const ENV_LOG: &str = "GOPASS_HELPER_LOG";

/// Config file location relative to the user config directory.
pub const CONFIG_RELATIVE_PATH: &str = "docker-credential-gopass/config.toml";
