//! Explicit view of the process environment.
//!
//! The environment is captured once at startup and passed into the
//! pieces that need it (CLI fallbacks, logging setup, credential
//! defaults, `${NAME}` substitution). Nothing else reads `std::env`,
//! which keeps tests deterministic.

use std::collections::HashMap;

/// Immutable map of environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvVars {
    vars: HashMap<String, String>,
}

impl EnvVars {
    /// Snapshot the real process environment.
    pub fn from_os() -> Self {
        EnvVars {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_map(vars: HashMap<String, String>) -> Self {
        EnvVars { vars }
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The value for `key`, or the empty string when unset.
    pub fn get(&self, key: &str) -> &str {
        self.lookup(key).unwrap_or("")
    }

    pub fn get_or<'a>(&'a self, key: &str, alternative: &'a str) -> &'a str {
        self.lookup(key).unwrap_or(alternative)
    }

    /// Look up `<APP>_<NAME>` with the application prefix applied.
    pub fn lookup_for_app(&self, app_name: &str, var_name: &str) -> Option<&str> {
        self.lookup(&app_key(app_name, var_name))
    }

    pub fn get_for_app(&self, app_name: &str, var_name: &str) -> &str {
        self.lookup_for_app(app_name, var_name).unwrap_or("")
    }
}

/// Build the environment variable name for an application setting:
/// the app name uppercased with `-` and spaces mapped to `_`, then an
/// underscore and the setting name.
pub fn app_key(app_name: &str, var_name: &str) -> String {
    let prefix: String = app_name
        .trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            c => c.to_ascii_uppercase(),
        })
        .collect();
    format!("{prefix}_{var_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> EnvVars {
        EnvVars::from_map(HashMap::from([
            ("GITSYNC_CONFIG_PATH".to_string(), "/etc/gitsync.json".to_string()),
            ("HOME".to_string(), "/home/tester".to_string()),
        ]))
    }

    #[test]
    fn app_key_transforms_name() {
        assert_eq!("GITSYNC_CONFIG_PATH", app_key("gitsync", "CONFIG_PATH"));
        assert_eq!("GIT_SYNC_CREDENTIALS", app_key("git-sync", "CREDENTIALS"));
        assert_eq!("MY_APP_X", app_key("my app", "X"));
    }

    #[test]
    fn lookup_and_defaults() {
        let env = env();
        assert_eq!(Some("/home/tester"), env.lookup("HOME"));
        assert_eq!("", env.get("MISSING"));
        assert_eq!("fallback", env.get_or("MISSING", "fallback"));
        assert_eq!("/etc/gitsync.json", env.get_for_app("gitsync", "CONFIG_PATH"));
        assert_eq!(None, env.lookup_for_app("gitsync", "CREDENTIALS"));
    }
}
