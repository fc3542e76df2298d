//! Command-line entry: action word parsing and helper construction.

use crate::constants;
use crate::core::gopass::GopassHelper;
use crate::core::protocol;
use crate::core::settings::Settings;
use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "docker-credential-gopass",
    version,
    about = "Docker credential helper backed by gopass"
)]
pub struct Cli {
    /// Protocol action: store, get, erase, list, or version
    #[arg(value_name = "ACTION")]
    pub action: String,

    /// gopass executable to run
    #[arg(long, value_name = "PATH", env = constants::ENV_GOPASS_BIN)]
    pub gopass: Option<String>,

    /// Store root to read instead of asking gopass for mounts.path
    #[arg(long, value_name = "PATH", env = constants::ENV_STORE_DIR)]
    pub store_dir: Option<PathBuf>,

    /// Helper config file (TOML)
    #[arg(long, value_name = "PATH", env = constants::ENV_CONFIG)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let settings = Settings::resolve(self.gopass, self.store_dir, self.config)?;
        debug!(?settings, "resolved settings");

        let mut helper = GopassHelper::new(settings.gopass_bin);
        if let Some(dir) = settings.store_dir {
            helper = helper.with_store_dir(dir);
        }

        protocol::serve(&helper, &self.action, io::stdin().lock(), io::stdout().lock())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_only() {
        let cli = Cli::try_parse_from(["docker-credential-gopass", "get"]).unwrap();
        assert_eq!(cli.action, "get");
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "docker-credential-gopass",
            "--gopass",
            "/usr/local/bin/gopass",
            "--store-dir",
            "/tmp/store",
            "list",
        ])
        .unwrap();
        assert_eq!(cli.action, "list");
        assert_eq!(cli.gopass.as_deref(), Some("/usr/local/bin/gopass"));
        assert_eq!(cli.store_dir, Some(PathBuf::from("/tmp/store")));
    }

    #[test]
    fn test_action_required() {
        assert!(Cli::try_parse_from(["docker-credential-gopass"]).is_err());
    }
}
