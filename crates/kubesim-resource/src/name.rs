//! Resource names.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// CPU, in cores (`500m` is half a core).
pub const CPU: &str = "cpu";
/// Memory, in bytes.
pub const MEMORY: &str = "memory";
/// Local ephemeral storage, in bytes.
pub const EPHEMERAL_STORAGE: &str = "ephemeral-storage";
/// Number of pods a node accepts.
pub const PODS: &str = "pods";
/// NVIDIA GPUs exposed through the device plugin.
pub const NVIDIA_GPU: &str = "nvidia.com/gpu";

/// Name of a resource (`cpu`, `memory`, `nvidia.com/gpu`, ...).
///
/// Compared by exact string equality. No normalization is applied, so
/// `Memory` and `memory` are distinct resources.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for vendor-namespaced resources such as `nvidia.com/gpu`.
    pub fn is_extended(&self) -> bool {
        self.0.contains('/')
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResourceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<&String> for ResourceName {
    fn from(name: &String) -> Self {
        Self(name.clone())
    }
}

impl From<String> for ResourceName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&ResourceName> for ResourceName {
    fn from(name: &ResourceName) -> Self {
        name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_case_sensitive() {
        assert_ne!(ResourceName::from("memory"), ResourceName::from("Memory"));
    }

    #[test]
    fn extended_resources_are_namespaced() {
        assert!(ResourceName::from(NVIDIA_GPU).is_extended());
        assert!(!ResourceName::from(CPU).is_extended());
    }
}
