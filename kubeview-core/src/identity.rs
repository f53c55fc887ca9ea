//! Logical resource identity

use crate::{IdentityError, Kind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between kind and name in a full resource name (`deployment/web`).
pub const FULL_NAME_SEPARATOR: char = '/';

/// The logical identity of a cached resource.
///
/// `location` is the namespace for namespaced kinds and empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceIdentity {
    kind: Kind,
    account: String,
    location: String,
    name: String,
}

impl ResourceIdentity {
    pub fn new(
        kind: Kind,
        account: impl Into<String>,
        location: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            account: account.into(),
            location: location.into(),
            name: name.into(),
        }
    }

    /// Split a full resource name of the form `<kind>/<name>`.
    ///
    /// Fails when there is no separator, the kind is not recognized, or the
    /// name is empty, contains whitespace, or contains another separator.
    pub fn parse_full_name(full_name: &str) -> Result<(Kind, String), IdentityError> {
        let (kind, name) = full_name
            .split_once(FULL_NAME_SEPARATOR)
            .ok_or_else(|| IdentityError::Malformed {
                input: full_name.to_string(),
            })?;

        if kind.is_empty() || kind.chars().any(char::is_whitespace) {
            return Err(IdentityError::Malformed {
                input: full_name.to_string(),
            });
        }

        let kind = Kind::parse(kind)?;
        validate_name(name)?;

        Ok((kind, name.to_string()))
    }

    /// Parse a full resource name under the given account and location.
    ///
    /// The location is kept as supplied; scope normalization is the
    /// caller's decision.
    pub fn parse(
        account: impl Into<String>,
        location: impl Into<String>,
        full_name: &str,
    ) -> Result<Self, IdentityError> {
        let (kind, name) = Self::parse_full_name(full_name)?;
        Ok(Self::new(kind, account, location, name))
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `<kind>/<name>`, the inverse of [`ResourceIdentity::parse_full_name`].
    pub fn full_name(&self) -> String {
        format!("{}{}{}", self.kind, FULL_NAME_SEPARATOR, self.name)
    }

    /// True unless a cluster-scoped kind carries a location.
    pub fn is_normalized(&self) -> bool {
        self.kind.is_namespaced() || self.location.is_empty()
    }

    /// Drop the location, keeping every other field.
    pub fn without_location(self) -> Self {
        Self {
            location: String::new(),
            ..self
        }
    }
}

impl fmt::Display for ResourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            write!(f, "{} ({})", self.full_name(), self.account)
        } else {
            write!(
                f,
                "{} in {} ({})",
                self.full_name(),
                self.location,
                self.account
            )
        }
    }
}

fn validate_name(name: &str) -> Result<(), IdentityError> {
    let invalid = |reason: &str| IdentityError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("name must not contain whitespace"));
    }
    if name.contains(FULL_NAME_SEPARATOR) {
        return Err(invalid("name must not contain '/'"));
    }
    Ok(())
}
