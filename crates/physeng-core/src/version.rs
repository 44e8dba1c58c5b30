//! Semantic versioning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A version made of a major, minor and patch number.
///
/// Versions order by major first, then minor, then patch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SemanticVersion {
    /// Incremented on incompatible changes
    pub major: u32,
    /// Incremented on backwards compatible additions
    pub minor: u32,
    /// Incremented on backwards compatible fixes
    pub patch: u32,
}

impl SemanticVersion {
    /// Create a new version.
    #[inline]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemanticVersion {
    type Err = Error;

    /// Parse `MAJOR`, `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`. Missing parts are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(Error::Parse(format!("invalid version \"{s}\"")));
        }

        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| Error::Parse(format!("invalid version component \"{part}\" in \"{s}\"")))?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2]))
    }
}
