//! Command line flags and configuration stream loading.

use std::fs::File;
use std::io::{self, BufReader, Read};

use anyhow::{bail, Context, Result};
use clap::Parser;
use gitsync_common::config::Config;
use gitsync_common::envvar::EnvVars;

/// Path value that selects standard input.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gitsync",
    version,
    about = "Continuously mirror Git repositories between remotes"
)]
pub struct CliFlags {
    /// Path to a configuration file. Use '-' to read from STDIN.
    #[arg(short, long, default_value = STDIN_PATH, env = "GITSYNC_CONFIG_PATH")]
    pub config: String,

    /// Path to a credentials file. Use '-' to read from STDIN.
    #[arg(long, env = "GITSYNC_CREDENTIALS")]
    pub credentials: Option<String>,

    /// Sync the repositories. Without this flag, a dry run is executed
    /// instead.
    #[arg(long)]
    pub run: bool,

    /// Sync only once instead of repeatedly on the configured
    /// interval.
    #[arg(long)]
    pub once: bool,
}

impl CliFlags {
    pub fn validate(&self) -> Result<()> {
        if self.config.is_empty() {
            bail!("config path not specified");
        }
        if self.config == STDIN_PATH && self.credentials.as_deref() == Some(STDIN_PATH) {
            bail!("loading config and credentials from STDIN at the same time is not supported");
        }
        Ok(())
    }
}

/// Open the configuration streams named by the flags and parse them.
/// File handles are scoped to this call and released on every path.
pub fn load_config(flags: &CliFlags, env: &EnvVars) -> Result<Config> {
    let config_reader: Box<dyn Read> = if flags.config == STDIN_PATH {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&flags.config)
            .with_context(|| format!("failed to open config in path '{}'", flags.config))?;
        Box::new(BufReader::new(file))
    };

    let credentials_reader: Option<Box<dyn Read>> = match flags.credentials.as_deref() {
        None | Some("") => None,
        Some(STDIN_PATH) => Some(Box::new(io::stdin().lock())),
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open credentials in path '{path}'"))?;
            Some(Box::new(BufReader::new(file)))
        }
    };

    Config::parse(env, config_reader, credentials_reader).context("failed to parse config")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(config: &str, credentials: Option<&str>) -> CliFlags {
        CliFlags {
            config: config.to_string(),
            credentials: credentials.map(str::to_string),
            run: false,
            once: false,
        }
    }

    #[test]
    fn rejects_stdin_for_both_streams() {
        assert!(flags("-", Some("-")).validate().is_err());
        assert!(flags("-", Some("/etc/creds.json")).validate().is_ok());
        assert!(flags("/etc/config.json", Some("-")).validate().is_ok());
        assert!(flags("", None).validate().is_err());
    }

    #[test]
    fn parses_long_flags() {
        let flags = CliFlags::parse_from([
            "gitsync",
            "--config",
            "/etc/gitsync.json",
            "--credentials",
            "/etc/creds.json",
            "--run",
            "--once",
        ]);
        assert_eq!("/etc/gitsync.json", flags.config);
        assert_eq!(Some("/etc/creds.json".to_string()), flags.credentials);
        assert!(flags.run);
        assert!(flags.once);
    }

    #[test]
    fn config_defaults_to_stdin() {
        let flags = CliFlags::parse_from(["gitsync"]);
        assert_eq!(STDIN_PATH, flags.config);
        assert_eq!(None, flags.credentials);
        assert!(!flags.run);
        assert!(!flags.once);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let env = EnvVars::default();
        let err = load_config(&flags("/definitely/not/here.json", None), &env).unwrap_err();
        assert!(err.to_string().contains("failed to open config"));
    }
}
