//! Authentication method selection for a repository.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// How to authenticate against a repository's remote.
///
/// `Undefined` means the method is inferred from whichever credentials
/// are present; see [`crate::config::Credentials::infer_auth_method`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMethod {
    /// Not declared; inferred from the credentials.
    #[default]
    Undefined,
    /// No authentication. Common for local repositories.
    None,
    /// HTTP token authentication.
    HttpToken,
    /// HTTP basic authentication.
    HttpBasic,
    /// SSH credentials provided by a running SSH agent.
    SshAgent,
    /// SSH private key authentication.
    SshKey,
}

#[derive(Debug, Error)]
#[error("unexpected value '{0}' for auth method")]
pub struct AuthMethodError(String);

impl AuthMethod {
    /// Canonical textual form; empty for `Undefined`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Undefined => "",
            AuthMethod::None => "none",
            AuthMethod::HttpToken => "http-token",
            AuthMethod::HttpBasic => "http-basic",
            AuthMethod::SshAgent => "ssh-agent",
            AuthMethod::SshKey => "ssh-key",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMethod {
    type Err = AuthMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "undefined" => Ok(AuthMethod::Undefined),
            "none" | "disabled" => Ok(AuthMethod::None),
            "http-token" => Ok(AuthMethod::HttpToken),
            "http" | "http-basic" => Ok(AuthMethod::HttpBasic),
            "ssh-agent" => Ok(AuthMethod::SshAgent),
            "ssh" | "ssh-key" => Ok(AuthMethod::SshKey),
            other => Err(AuthMethodError(other.to_string())),
        }
    }
}

impl Serialize for AuthMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AuthMethod::Undefined => serializer.serialize_none(),
            method => serializer.serialize_str(method.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for AuthMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Option::None => Ok(AuthMethod::Undefined),
            Option::Some(s) => s.parse().map_err(D::Error::custom),
        }
    }
}
