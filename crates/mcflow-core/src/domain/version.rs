//! Workflow version triples.
//!
//! Versions show up in three places: the upstream `package.json`, the
//! manifest, and the legacy `workflow-version.json` (which stores two
//! components, e.g. `"15.0"`). All of them normalise to [`Version`].

use std::{cmp::Ordering, convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A `major.minor.patch` triple compared numerically, component by component.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Sentinel for a project that has never been deployed.
    pub const UNINSTALLED: Version = Version::new(0, 0, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version string. Never fails.
    ///
    /// Missing components become 0, non-numeric components become 0 and
    /// anything past the third component is ignored.
    pub fn parse(input: &str) -> Self {
        let mut parts = input
            .trim()
            .split('.')
            .map(|part| part.trim().parse::<u32>().unwrap_or(0));

        Self {
            major: parts.next().unwrap_or(0),
            minor: parts.next().unwrap_or(0),
            patch: parts.next().unwrap_or(0),
        }
    }

    /// Three-way comparison.
    pub fn compare(&self, other: &Version) -> Ordering {
        self.cmp(other)
    }

    pub fn is_uninstalled(&self) -> bool {
        *self == Self::UNINSTALLED
    }

    /// `true` when the version belongs to the `major.x` line.
    pub fn in_major(&self, major: u32) -> bool {
        self.major == major
    }

    /// `true` when the version belongs to the `major.minor.x` line.
    pub fn in_minor(&self, major: u32, minor: u32) -> bool {
        self.major == major && self.minor == minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for Version {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Version {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}
