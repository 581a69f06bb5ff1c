//! Git transport authentication.
//!
//! Turns a repository's resolved auth method and credentials into the
//! callbacks libgit2 consumes during fetch, list, and push. Credential
//! material is captured eagerly so a bad key path fails the mapping at
//! init time instead of mid-transfer.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use git2::cert::Cert;
use git2::{CertificateCheckStatus, Cred, RemoteCallbacks};
use gitsync_common::config::{AuthMethod, Repository};
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_GIT_USERNAME: &str = "git";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read SSH key from path '{path}': {source}")]
    KeyUnreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse SSH host key")]
    InvalidHostKey,
    #[error("unknown auth method")]
    UnknownMethod,
}

/// Host key verification policy for SSH transports.
#[derive(Debug, Clone)]
enum HostKeyPolicy {
    /// Non-SSH transport; let libgit2 do its default checks.
    Transport,
    /// Accept any host key. Logged loudly.
    Ignore,
    /// Pin a single key given in authorized-keys form.
    Pinned(Vec<u8>),
    /// Verify against known-hosts files.
    KnownHosts(Vec<PathBuf>),
}

/// Reusable authentication material for one repository.
///
/// [`RepoAuth::callbacks`] builds a fresh callback set per operation,
/// since libgit2 consumes callbacks by value.
#[derive(Debug, Clone)]
pub struct RepoAuth {
    method: AuthMethod,
    http_token: String,
    http_username: String,
    http_password: String,
    ssh_username: String,
    ssh_key_path: PathBuf,
    ssh_key_password: String,
    host_keys: HostKeyPolicy,
}

impl RepoAuth {
    /// Build the authentication material for a repository.
    pub fn from_repository(repo: &Repository) -> Result<RepoAuth, AuthError> {
        let creds = &repo.credentials;
        let method = repo.auth();
        let ssh_username = if creds.ssh_credentials.username.is_empty() {
            DEFAULT_GIT_USERNAME.to_string()
        } else {
            creds.ssh_credentials.username.clone()
        };

        let mut auth = RepoAuth {
            method,
            http_token: creds.http_token.clone(),
            http_username: creds.http_credentials.username.clone(),
            http_password: creds.http_credentials.password.clone(),
            ssh_username,
            ssh_key_path: PathBuf::from(&creds.ssh_credentials.key_path),
            ssh_key_password: creds.ssh_credentials.key_password.clone(),
            host_keys: HostKeyPolicy::Transport,
        };

        match method {
            AuthMethod::None | AuthMethod::Undefined => {
                debug!("no auth method selected");
            }
            AuthMethod::HttpToken => {
                debug!("using http token for auth");
            }
            AuthMethod::HttpBasic => {
                debug!("using http basic for auth");
            }
            AuthMethod::SshAgent => {
                debug!(username = %auth.ssh_username, "using ssh agent auth");
                auth.host_keys = host_key_policy(&creds.ssh_credentials)?;
            }
            AuthMethod::SshKey => {
                debug!(username = %auth.ssh_username, "using ssh key auth");
                // libgit2 reads the key lazily; surface a bad path now.
                std::fs::metadata(&auth.ssh_key_path).map_err(|source| {
                    AuthError::KeyUnreadable {
                        path: creds.ssh_credentials.key_path.clone(),
                        source,
                    }
                })?;
                auth.host_keys = host_key_policy(&creds.ssh_credentials)?;
            }
        }

        Ok(auth)
    }

    pub fn method(&self) -> AuthMethod {
        self.method
    }

    /// Fresh callbacks for one fetch, list, or push. The callbacks own
    /// their captured credentials.
    pub fn callbacks(&self) -> RemoteCallbacks<'static> {
        let mut cbs = RemoteCallbacks::new();

        match self.method {
            AuthMethod::None | AuthMethod::Undefined => {}
            AuthMethod::HttpToken => {
                let token = self.http_token.clone();
                cbs.credentials(move |_url, _username, _allowed| {
                    Cred::userpass_plaintext(&token, "")
                });
            }
            AuthMethod::HttpBasic => {
                let username = self.http_username.clone();
                let password = self.http_password.clone();
                cbs.credentials(move |_url, _username, _allowed| {
                    Cred::userpass_plaintext(&username, &password)
                });
            }
            AuthMethod::SshAgent => {
                let username = self.ssh_username.clone();
                cbs.credentials(move |_url, username_from_url, _allowed| {
                    Cred::ssh_key_from_agent(username_from_url.unwrap_or(&username))
                });
            }
            AuthMethod::SshKey => {
                let username = self.ssh_username.clone();
                let key_path = self.ssh_key_path.clone();
                let password = self.ssh_key_password.clone();
                cbs.credentials(move |_url, username_from_url, _allowed| {
                    let passphrase = if password.is_empty() {
                        None
                    } else {
                        Some(password.as_str())
                    };
                    Cred::ssh_key(
                        username_from_url.unwrap_or(&username),
                        None,
                        &key_path,
                        passphrase,
                    )
                });
            }
        }

        let policy = self.host_keys.clone();
        cbs.certificate_check(move |cert, hostname| check_host_key(&policy, cert, hostname));

        cbs
    }
}

/// Pick the host key policy from SSH credentials: ignore, pinned key,
/// or known-hosts files (defaulting to `~/.ssh/known_hosts`).
fn host_key_policy(creds: &gitsync_common::config::SshCredentials) -> Result<HostKeyPolicy, AuthError> {
    if creds.ignore_host_key {
        warn!("disabling SSH host key check");
        return Ok(HostKeyPolicy::Ignore);
    }
    if !creds.host_key.is_empty() {
        return Ok(HostKeyPolicy::Pinned(parse_authorized_key(&creds.host_key)?));
    }

    let mut paths: Vec<PathBuf> = creds.known_hosts_paths.iter().map(PathBuf::from).collect();
    if paths.is_empty() {
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ssh").join("known_hosts"));
        }
    }
    Ok(HostKeyPolicy::KnownHosts(paths))
}

/// Parse the key blob out of an authorized-keys line
/// (`<type> <base64-key> [comment]`).
fn parse_authorized_key(line: &str) -> Result<Vec<u8>, AuthError> {
    let encoded = line
        .split_whitespace()
        .nth(1)
        .ok_or(AuthError::InvalidHostKey)?;
    BASE64.decode(encoded).map_err(|_| AuthError::InvalidHostKey)
}

fn check_host_key(
    policy: &HostKeyPolicy,
    cert: &Cert<'_>,
    hostname: &str,
) -> Result<CertificateCheckStatus, git2::Error> {
    match policy {
        HostKeyPolicy::Transport => Ok(CertificateCheckStatus::CertificatePassthrough),
        HostKeyPolicy::Ignore => {
            warn!(hostname, "accepting unverified SSH host key");
            Ok(CertificateCheckStatus::CertificateOk)
        }
        HostKeyPolicy::Pinned(expected) => {
            let presented = cert
                .as_hostkey()
                .and_then(|hk| hk.hostkey())
                .ok_or_else(|| git2::Error::from_str("no SSH host key presented"))?;
            if presented == expected.as_slice() {
                Ok(CertificateCheckStatus::CertificateOk)
            } else {
                Err(git2::Error::from_str(&format!(
                    "host key for '{hostname}' does not match the pinned key"
                )))
            }
        }
        HostKeyPolicy::KnownHosts(paths) => {
            let presented = cert
                .as_hostkey()
                .and_then(|hk| hk.hostkey())
                .ok_or_else(|| git2::Error::from_str("no SSH host key presented"))?;
            if known_hosts_contain(paths, hostname, presented) {
                Ok(CertificateCheckStatus::CertificateOk)
            } else {
                Err(git2::Error::from_str(&format!(
                    "host key for '{hostname}' not found in known hosts"
                )))
            }
        }
    }
}

/// Scan known-hosts files for a plain (non-hashed) entry matching the
/// hostname and key.
fn known_hosts_contain(paths: &[PathBuf], hostname: &str, key: &[u8]) -> bool {
    for path in paths {
        let Ok(contents) = std::fs::read_to_string(path) else {
            debug!(path = %path.display(), "known hosts file not readable");
            continue;
        };
        for line in contents.lines() {
            if let Some(entry_key) = known_hosts_entry_key(line, hostname) {
                if entry_key == key {
                    return true;
                }
            }
        }
    }
    false
}

/// The decoded key of a known-hosts line when it names `hostname`.
/// Hashed entries (`|1|...`) cannot be matched and are skipped.
fn known_hosts_entry_key(line: &str, hostname: &str) -> Option<Vec<u8>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('|') {
        return None;
    }
    let mut fields = line.split_whitespace();
    let hosts = fields.next()?;
    let _key_type = fields.next()?;
    let encoded = fields.next()?;

    let matches_host = hosts.split(',').any(|h| {
        h == hostname
            || h.strip_prefix('[')
                .and_then(|h| h.split_once("]:"))
                .is_some_and(|(host, _port)| host == hostname)
    });
    if !matches_host {
        return None;
    }
    BASE64.decode(encoded).ok()
}
