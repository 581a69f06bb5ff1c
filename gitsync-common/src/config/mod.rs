//! Configuration model for the mirroring daemon.
//!
//! Parsing takes two JSON streams (configuration plus an optional
//! credentials overlay), normalizes the "single" shape into the
//! canonical multi-repository shape, fills credential defaults from the
//! environment, expands `${NAME}` references, and validates the result
//! in one pass through the fault accumulator.

mod auth_method;

pub use auth_method::AuthMethod;

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::envsubst;
use crate::envvar::EnvVars;
use crate::interval::Interval;
use crate::matcher::Matcher;
use crate::validation::{ValidationError, Validator};
use crate::APP_NAME;

/// Repository ID synthesized when the configuration uses the single
/// shape (`path` + `targets`).
pub const SINGLE_SOURCE_ID: &str = "source";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Config(#[source] serde_json::Error),
    #[error("failed to parse credentials: {0}")]
    Credentials(#[source] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// HTTP basic auth credentials.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpCredentials {
    pub username: String,
    pub password: String,
}

/// SSH credentials. Empty strings and `false` mean "not set".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SshCredentials {
    pub use_agent: bool,
    pub username: String,
    pub key_path: String,
    pub key_password: String,
    pub host_key: String,
    pub known_hosts_paths: Vec<String>,
    pub ignore_host_key: bool,
}

/// All credentials a repository may carry, regardless of method.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub http_token: String,
    pub http_credentials: HttpCredentials,
    pub ssh_credentials: SshCredentials,
}

impl Credentials {
    /// Pick the auth method from whichever credentials are present:
    /// HTTP token, then HTTP basic, then SSH agent, then SSH key, and
    /// `None` when nothing is set.
    pub fn infer_auth_method(&self) -> AuthMethod {
        if !self.http_token.is_empty() {
            AuthMethod::HttpToken
        } else if !self.http_credentials.username.is_empty()
            && !self.http_credentials.password.is_empty()
        {
            AuthMethod::HttpBasic
        } else if self.ssh_credentials.use_agent {
            AuthMethod::SshAgent
        } else if !self.ssh_credentials.key_path.is_empty() {
            AuthMethod::SshKey
        } else {
            AuthMethod::None
        }
    }

    /// Apply an overlay: non-empty strings and `true` booleans replace
    /// the corresponding fields, everything else is left alone.
    fn overlay(&mut self, other: &Credentials) {
        override_str(&mut self.http_token, &other.http_token);
        override_str(
            &mut self.http_credentials.username,
            &other.http_credentials.username,
        );
        override_str(
            &mut self.http_credentials.password,
            &other.http_credentials.password,
        );
        override_bool(
            &mut self.ssh_credentials.use_agent,
            other.ssh_credentials.use_agent,
        );
        override_str(
            &mut self.ssh_credentials.username,
            &other.ssh_credentials.username,
        );
        override_str(
            &mut self.ssh_credentials.key_path,
            &other.ssh_credentials.key_path,
        );
        override_str(
            &mut self.ssh_credentials.key_password,
            &other.ssh_credentials.key_password,
        );
        override_str(
            &mut self.ssh_credentials.host_key,
            &other.ssh_credentials.host_key,
        );
        if !other.ssh_credentials.known_hosts_paths.is_empty() {
            self.ssh_credentials.known_hosts_paths = other.ssh_credentials.known_hosts_paths.clone();
        }
        override_bool(
            &mut self.ssh_credentials.ignore_host_key,
            other.ssh_credentials.ignore_host_key,
        );
    }

    /// Fill still-unset fields from the `GITSYNC_*` credential
    /// environment variables.
    fn default_from_env(&mut self, env: &EnvVars) {
        default_str(&mut self.http_token, env.get_for_app(APP_NAME, "HTTP_TOKEN"));
        default_str(
            &mut self.http_credentials.username,
            env.get_for_app(APP_NAME, "HTTP_USERNAME"),
        );
        default_str(
            &mut self.http_credentials.password,
            env.get_for_app(APP_NAME, "HTTP_PASSWORD"),
        );
        if env.get_for_app(APP_NAME, "SSH_USE_AGENT") == "true" {
            self.ssh_credentials.use_agent = true;
        }
        default_str(
            &mut self.ssh_credentials.key_path,
            env.get_for_app(APP_NAME, "SSH_KEY_PATH"),
        );
        default_str(
            &mut self.ssh_credentials.key_password,
            env.get_for_app(APP_NAME, "SSH_KEY_PASSWORD"),
        );
    }
}

fn override_str(target: &mut String, source: &str) {
    if !source.is_empty() {
        target.clear();
        target.push_str(source);
    }
}

fn override_bool(target: &mut bool, source: bool) {
    if source {
        *target = true;
    }
}

fn default_str(target: &mut String, source: &str) {
    if target.is_empty() && !source.is_empty() {
        target.push_str(source);
    }
}

/// A mirrored repository endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Repository {
    /// Remote URL. Empty means "local only": fetch is skipped and refs
    /// are enumerated from the local store.
    pub url: String,
    /// Keep all object storage transient; `localPath` is ignored.
    pub in_memory: bool,
    /// Filesystem path for the backing store. Empty means a temporary
    /// directory owned by the engine instance.
    pub local_path: String,
    /// Declared auth method; `Undefined` means infer from credentials.
    pub auth_method: AuthMethod,
    #[serde(flatten)]
    pub credentials: Credentials,
}

impl Repository {
    /// The effective auth method: the declared one, or the inferred
    /// one when undeclared. A pure function of the immutable
    /// configuration, so every consumer sees the same answer.
    pub fn auth(&self) -> AuthMethod {
        match self.auth_method {
            AuthMethod::Undefined => self.credentials.infer_auth_method(),
            declared => declared,
        }
    }
}

/// Ref selection and cadence for a mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncSpec {
    pub interval: Interval,
    pub branches: Vec<Matcher>,
    pub tags: Vec<Matcher>,
}

/// One unit of work: mirror `source` into each of `targets`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncMapping {
    pub source: String,
    pub targets: Vec<String>,
    #[serde(flatten)]
    pub spec: SyncSpec,
}

/// The normalized multi-repository configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub repositories: BTreeMap<String, Repository>,
    pub mappings: Vec<SyncMapping>,
}

/// Raw parse target accepting both accepted shapes at once.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawConfig {
    repositories: BTreeMap<String, Repository>,
    mappings: Vec<SyncMapping>,
    path: String,
    targets: BTreeMap<String, SingleTarget>,
}

/// Target entry in the single shape: repository and sync spec fields
/// side by side.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SingleTarget {
    #[serde(flatten)]
    repository: Repository,
    #[serde(flatten)]
    spec: SyncSpec,
}

impl Config {
    /// Parse and normalize a configuration from the given streams.
    ///
    /// `env` supplies credential defaults and `${NAME}` expansions.
    /// Returns a single error whose message is the rendered validation
    /// report when any fault was found.
    pub fn parse<C: Read, K: Read>(
        env: &EnvVars,
        config: C,
        credentials: Option<K>,
    ) -> Result<Config, ConfigError> {
        let raw: RawConfig = serde_json::from_reader(config).map_err(ConfigError::Config)?;
        let mut cfg = normalize(raw);

        if let Some(stream) = credentials {
            let overlay: BTreeMap<String, Credentials> =
                serde_json::from_reader(stream).map_err(ConfigError::Credentials)?;
            cfg.overlay_credentials(&overlay);
        }
        for repo in cfg.repositories.values_mut() {
            repo.credentials.default_from_env(env);
        }
        cfg.substitute_variables(env);

        if let Some(err) = cfg.validate().to_error() {
            return Err(err.into());
        }
        Ok(cfg)
    }

    fn overlay_credentials(&mut self, overlay: &BTreeMap<String, Credentials>) {
        for (repo_id, creds) in overlay {
            match self.repositories.get_mut(repo_id) {
                Some(repo) => repo.credentials.overlay(creds),
                None => warn!(
                    repo_id = %repo_id,
                    "credentials specified for a repository that is not in the configuration"
                ),
            }
        }
    }

    fn substitute_variables(&mut self, env: &EnvVars) {
        for (repo_id, repo) in &mut self.repositories {
            let fields: [(&str, &mut String); 8] = [
                ("url", &mut repo.url),
                ("localPath", &mut repo.local_path),
                ("httpToken", &mut repo.credentials.http_token),
                (
                    "httpCredentials.username",
                    &mut repo.credentials.http_credentials.username,
                ),
                (
                    "httpCredentials.password",
                    &mut repo.credentials.http_credentials.password,
                ),
                (
                    "sshCredentials.username",
                    &mut repo.credentials.ssh_credentials.username,
                ),
                (
                    "sshCredentials.keyPath",
                    &mut repo.credentials.ssh_credentials.key_path,
                ),
                (
                    "sshCredentials.keyPassword",
                    &mut repo.credentials.ssh_credentials.key_password,
                ),
            ];
            for (name, value) in fields {
                let (replaced, missing) = envsubst::substitute(value, |key| env.lookup(key));
                if let Some(missing) = missing {
                    warn!(
                        field = %format!("{repo_id}.{name}"),
                        error = %missing,
                        "environment substitution left missing values"
                    );
                }
                *value = replaced;
            }
        }
    }

    fn validate(&self) -> Validator {
        let mut root = Validator::root();
        root.fault_when(
            self.repositories.is_empty(),
            "repositories",
            "at least one repository must be specified",
        );
        root.fault_when(
            self.mappings.is_empty(),
            "mappings",
            "at least one mapping must be specified",
        );

        for (repo_id, repo) in &self.repositories {
            let v = root.sub("repositories").sub(repo_id);
            validate_repository(v, repo);
        }
        for (i, mapping) in self.mappings.iter().enumerate() {
            let v = root.sub("mappings").indexed_sub(i);
            self.validate_mapping(v, mapping);
        }
        root
    }

    fn validate_mapping(&self, v: &mut Validator, mapping: &SyncMapping) {
        if mapping.source.is_empty() {
            v.fault("source", "source must be defined");
        } else if !self.repositories.contains_key(&mapping.source) {
            v.fault_fmt(
                "source",
                format_args!("repository '{}' does not exist", mapping.source),
            );
        }

        if mapping.targets.is_empty() {
            v.fault("targets", "at least one target must be defined");
        }
        {
            let targets = v.sub("targets");
            for (i, target) in mapping.targets.iter().enumerate() {
                if target.is_empty() {
                    targets.index_fault(i, "target must be specified");
                } else if !self.repositories.contains_key(target) {
                    targets.index_fault(i, format!("repository '{target}' does not exist"));
                }
            }
        }

        v.fault_when(
            mapping.spec.branches.is_empty() && mapping.spec.tags.is_empty(),
            "refs",
            "at least one branch or tag matcher must be specified",
        );
        {
            let branches = v.sub("branches");
            for (i, matcher) in mapping.spec.branches.iter().enumerate() {
                branches.index_fault_when(matcher.is_empty(), i, "matcher cannot be empty");
            }
        }
        let tags = v.sub("tags");
        for (i, matcher) in mapping.spec.tags.iter().enumerate() {
            tags.index_fault_when(matcher.is_empty(), i, "matcher cannot be empty");
        }
    }
}

fn validate_repository(v: &mut Validator, repo: &Repository) {
    v.fault_when(
        repo.url.is_empty() && repo.local_path.is_empty() && !repo.in_memory,
        "url",
        "either a URL or a local path must be set",
    );

    let creds = &repo.credentials;
    match repo.auth_method {
        AuthMethod::Undefined | AuthMethod::None => {}
        AuthMethod::HttpToken => v.fault_when(
            creds.http_token.is_empty(),
            "httpToken",
            "expected HTTP token to be set",
        ),
        AuthMethod::HttpBasic => {
            v.fault_when(
                creds.http_credentials.username.is_empty(),
                "httpCredentials.username",
                "expected HTTP username to be set",
            );
            v.fault_when(
                creds.http_credentials.password.is_empty(),
                "httpCredentials.password",
                "expected HTTP password to be set",
            );
        }
        AuthMethod::SshAgent => v.fault_when(
            !creds.ssh_credentials.use_agent,
            "sshCredentials.useAgent",
            "expected SSH agent to be enabled",
        ),
        AuthMethod::SshKey => v.fault_when(
            creds.ssh_credentials.key_path.is_empty(),
            "sshCredentials.keyPath",
            "expected SSH key path to be set",
        ),
    }
}

/// Turn the raw parse into the canonical multi shape. A document with
/// no repositories and no mappings is interpreted as the single shape.
fn normalize(raw: RawConfig) -> Config {
    if !raw.repositories.is_empty() || !raw.mappings.is_empty() {
        return Config {
            repositories: raw.repositories,
            mappings: raw.mappings,
        };
    }

    let mut repositories = BTreeMap::new();
    repositories.insert(
        SINGLE_SOURCE_ID.to_string(),
        Repository {
            local_path: raw.path,
            auth_method: AuthMethod::None,
            ..Repository::default()
        },
    );

    let mut mappings = Vec::with_capacity(raw.targets.len());
    for (target_id, target) in raw.targets {
        mappings.push(SyncMapping {
            source: SINGLE_SOURCE_ID.to_string(),
            targets: vec![target_id.clone()],
            spec: target.spec,
        });
        repositories.insert(target_id, target.repository);
    }

    Config {
        repositories,
        mappings,
    }
}
