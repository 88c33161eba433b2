use serde::{Deserialize, Serialize};
use std::fmt;

/// A slash-separated key path into the remote store, e.g. `tasks` or
/// `notifications/n1`. Collection paths and record paths share this type;
/// which one an operation expects is part of that operation's contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorePath(String);

impl StorePath {
    /// The top of the store tree. Only `initialize_database` writes here.
    pub fn root() -> Self {
        Self(String::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.is_empty() {
            return Err("Store path cannot be empty".to_string());
        }
        if value.starts_with('/') || value.ends_with('/') {
            return Err(format!("Store path cannot start or end with '/': {value}"));
        }
        if value.split('/').any(|segment| segment.is_empty()) {
            return Err(format!("Store path contains an empty segment: {value}"));
        }
        Ok(Self(value))
    }

    pub fn join(&self, segment: &str) -> Result<Self, String> {
        if segment.is_empty() {
            return Err("Path segment cannot be empty".to_string());
        }
        if segment.contains('/') {
            return Err(format!("Path segment cannot contain '/': {segment}"));
        }
        if self.is_root() {
            return Ok(Self(segment.to_string()));
        }
        Ok(Self(format!("{}/{}", self.0, segment)))
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|segment| !segment.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when `other` is this path or lies underneath it.
    pub fn contains(&self, other: &StorePath) -> bool {
        self.is_root() || other.0 == self.0 || other.0.starts_with(&format!("{}/", self.0))
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "/")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl TryFrom<String> for StorePath {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Ok(Self::root());
        }
        Self::new(value)
    }
}

impl From<StorePath> for String {
    fn from(path: StorePath) -> Self {
        path.0
    }
}
