//! Identity lookup and link validation used while parsing.
//!
//! The parser never talks to a user directory itself. Callers inject an
//! [`IdentityProvider`]; anything it cannot resolve degrades to plain text.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use thiserror::Error;
use url::Url;

/// Schemes accepted by the default link check.
pub const DEFAULT_LINK_SCHEMES: [&str; 4] = ["http", "https", "mailto", "ftp"];

/// A resolved user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub screen_name: String,
    pub pretty_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkRejection {
    #[error("not an absolute URL: {0}")]
    Malformed(String),
    #[error("scheme '{0}' is not allowed")]
    Scheme(String),
}

pub trait IdentityProvider {
    /// Look up a user by numeric id.
    fn resolve(&self, user_id: u64) -> Option<UserIdentity>;

    /// Accept or reject a link destination.
    fn validate_link(
        &self,
        destination: &str,
        allowed_schemes: &[String],
    ) -> Result<(), LinkRejection> {
        check_link(destination, allowed_schemes)
    }
}

/// Absolute URL whose scheme (case-insensitive) is in `allowed_schemes`.
pub fn check_link(destination: &str, allowed_schemes: &[String]) -> Result<(), LinkRejection> {
    let url = Url::parse(destination.trim())
        .map_err(|err| LinkRejection::Malformed(err.to_string()))?;
    let scheme = url.scheme();
    if allowed_schemes
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(scheme))
    {
        Ok(())
    } else {
        Err(LinkRejection::Scheme(scheme.to_string()))
    }
}

/// In-memory user directory.
///
/// Deserializes from a JSON array of users:
///
/// ```json
/// [{"id": 1, "screenName": "jdoe", "prettyName": "Jane Doe"}]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticDirectory {
    users: HashMap<u64, UserIdentity>,
}

#[derive(Deserialize)]
struct DirectoryEntry {
    id: u64,
    #[serde(flatten)]
    identity: UserIdentity,
}

impl<'de> Deserialize<'de> for StaticDirectory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<DirectoryEntry>::deserialize(deserializer)?;
        Ok(Self {
            users: entries
                .into_iter()
                .map(|entry| (entry.id, entry.identity))
                .collect(),
        })
    }
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, user_id: u64, identity: UserIdentity) -> &mut Self {
        self.users.insert(user_id, identity);
        self
    }

    pub fn with_user(
        mut self,
        user_id: u64,
        screen_name: impl Into<String>,
        pretty_name: impl Into<String>,
    ) -> Self {
        self.insert(
            user_id,
            UserIdentity {
                screen_name: screen_name.into(),
                pretty_name: pretty_name.into(),
                email: None,
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl IdentityProvider for StaticDirectory {
    fn resolve(&self, user_id: u64) -> Option<UserIdentity> {
        self.users.get(&user_id).cloned()
    }
}
