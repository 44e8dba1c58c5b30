//! Information about the client application.

use crate::error::{Error, Result};
use crate::version::SemanticVersion;

/// Name and version of the application using the engine.
///
/// Both are forwarded to the driver when the Vulkan instance is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    name: String,
    version: SemanticVersion,
}

impl ApplicationInfo {
    /// Create application info.
    ///
    /// The name must be non-empty and may not contain NUL bytes, since it is
    /// handed to the driver as a C string.
    pub fn new(name: impl Into<String>, version: SemanticVersion) -> Result<Self> {
        let name = name.into();

        if name.trim().is_empty() {
            return Err(Error::InvalidData("application name is empty".to_string()));
        }

        if name.contains('\0') {
            return Err(Error::InvalidData(format!(
                "application name \"{}\" contains a NUL byte",
                name.escape_debug()
            )));
        }

        Ok(Self { name, version })
    }

    /// Application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Application version.
    pub const fn version(&self) -> SemanticVersion {
        self.version
    }
}
