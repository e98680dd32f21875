//! Version types for schema compatibility.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Schema version using semantic versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version (breaking changes)
    pub major: u16,
    /// Minor version (backwards-compatible additions)
    pub minor: u16,
    /// Patch version (bug fixes)
    pub patch: u16,
}

impl SchemaVersion {
    /// Creates a new schema version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Current quest content file version.
    pub const QUEST_CONTENT: Self = Self::new(1, 0, 0);

    /// Current story content file version.
    pub const STORY_CONTENT: Self = Self::new(1, 0, 0);

    /// Checks if this version is compatible with another version.
    /// Compatible means same major version and this minor >= other minor.
    #[must_use]
    pub const fn is_compatible_with(&self, other: &Self) -> bool {
        self.major == other.major && self.minor >= other.minor
    }

    /// Checks if this version can read data from another version.
    #[must_use]
    pub const fn can_read(&self, data_version: &Self) -> bool {
        self.major == data_version.major
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    /// Parses `major[.minor[.patch]]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = [0u16; 3];
        let mut count = 0;
        for (i, part) in s.trim().split('.').enumerate() {
            if i >= 3 {
                return Err(format!("too many components in version '{s}'"));
            }
            parts[i] = part
                .parse()
                .map_err(|_| format!("invalid version component '{part}' in '{s}'"))?;
            count += 1;
        }
        if count == 0 {
            return Err("empty version".to_string());
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}
