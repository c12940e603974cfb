//! Domain primitive types used across the brood workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BroodError;

/// Unique, comparable name of a deployed container.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Creates a new container id from a string value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Query language understood by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Relational queries.
    Sql,
    /// Graph queries.
    Sparql,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql => write!(f, "sql"),
            Self::Sparql => write!(f, "sparql"),
        }
    }
}

impl FromStr for Language {
    type Err = BroodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sql" => Ok(Self::Sql),
            "sparql" => Ok(Self::Sparql),
            other => Err(BroodError::Config {
                message: format!("unknown query language: {other}"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_orders_by_name() {
        let mut ids = vec![Id::new("second"), Id::new("first")];
        ids.sort();
        assert_eq!(ids, vec![Id::new("first"), Id::new("second")]);
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let json = serde_json::to_string(&Id::new("public")).unwrap();
        assert_eq!(json, "\"public\"");
    }

    #[test]
    fn language_parses_case_insensitively() {
        assert_eq!("SQL".parse::<Language>().unwrap(), Language::Sql);
        assert_eq!("sparql".parse::<Language>().unwrap(), Language::Sparql);
    }

    #[test]
    fn language_rejects_unknown_name() {
        assert!("xquery".parse::<Language>().is_err());
    }
}
