use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// CUDA version declared by a legacy image through `CUDA_VERSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CudaVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl CudaVersion {
    /// Parse `major[.minor[.patch]]`. Missing components are zero.
    pub fn parse(version: &str) -> Result<Self, VersionError> {
        // Longest shape first; each attempt has to consume the whole input.
        [3, 2, 1]
            .into_iter()
            .find_map(|components| scan(version, components))
            .map(|[major, minor, patch]| Self { major, minor, patch })
            .ok_or_else(|| VersionError::Invalid {
                version: version.to_string(),
            })
    }

    /// Requirement string handed to nvidia-container-cli. The patch level is
    /// not part of the constraint.
    pub fn requirement(&self) -> String {
        format!("cuda>={}.{}", self.major, self.minor)
    }
}

impl FromStr for CudaVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CudaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn scan(input: &str, components: usize) -> Option<[u32; 3]> {
    let input = input.strip_suffix('\n').unwrap_or(input);
    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() != components {
        return None;
    }

    let mut out = [0u32; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    Some(out)
}
