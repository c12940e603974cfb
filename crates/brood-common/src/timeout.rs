//! Time-unit aware timeout configuration with an explicit "undefined" value.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::BroodError;

/// A timeout that is either a concrete duration or undefined.
///
/// The text form is `"<millis>ms"` or `"undefined"` and is used for both
/// parsing and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeout(Option<Duration>);

impl Timeout {
    /// A timeout with no defined value.
    #[must_use]
    pub const fn undefined() -> Self {
        Self(None)
    }

    /// A timeout of exactly `duration`.
    #[must_use]
    pub const fn from_duration(duration: Duration) -> Self {
        Self(Some(duration))
    }

    /// A timeout of `millis` milliseconds, or undefined if `millis` is negative.
    #[must_use]
    pub fn from_millis(millis: i64) -> Self {
        u64::try_from(millis).map_or(Self(None), |ms| Self(Some(Duration::from_millis(ms))))
    }

    /// Returns `true` if this timeout has a defined value.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.0.is_some()
    }

    /// The defined duration, or `fallback` if undefined.
    #[must_use]
    pub fn as_duration_or(&self, fallback: Duration) -> Duration {
        self.0.unwrap_or(fallback)
    }

    /// The defined value in whole milliseconds, or `fallback` if undefined.
    #[must_use]
    pub fn as_millis_or(&self, fallback: u64) -> u64 {
        self.0
            .map_or(fallback, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    /// The defined value in whole seconds, or `fallback` if undefined.
    #[must_use]
    pub fn as_secs_or(&self, fallback: u64) -> u64 {
        self.0.map_or(fallback, |d| d.as_secs())
    }

    /// `self` if defined, else `fallback`.
    #[must_use]
    pub const fn or_if_undefined(self, fallback: Self) -> Self {
        if self.is_defined() { self } else { fallback }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(d) => write!(f, "{}ms", d.as_millis()),
            None => write!(f, "undefined"),
        }
    }
}

impl FromStr for Timeout {
    type Err = BroodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text == "undefined" {
            return Ok(Self::undefined());
        }
        text.strip_suffix("ms")
            .and_then(|n| n.parse::<u64>().ok())
            .map(|ms| Self::from_duration(Duration::from_millis(ms)))
            .ok_or_else(|| BroodError::Config {
                message: format!("cannot parse <{text}> as timeout (expected '<n>ms' or 'undefined')"),
            })
    }
}

impl TryFrom<String> for Timeout {
    type Error = BroodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeout> for String {
    fn from(value: Timeout) -> Self {
        value.to_string()
    }
}

impl From<Duration> for Timeout {
    fn from(value: Duration) -> Self {
        Self::from_duration(value)
    }
}
