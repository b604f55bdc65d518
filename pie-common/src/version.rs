//! PIE format version handling.
//!
//! The version is fixed per exported object and selects the texture block
//! layout and the UV encoding for the whole document: versions 2 and 3 use
//! the legacy TEXTURE/NORMALMAP/SPECULARMAP block, version 2 additionally
//! encodes UVs in 0-256 fixed-point texel space, and version 4 uses
//! per-object texture-map lines.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Raised when a manifest names a version outside the supported set.
#[derive(Debug, Error)]
#[error("unsupported PIE version '{0}' (expected 2, 3 or 4)")]
pub struct UnsupportedVersion(pub String);

/// Supported PIE format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieVersion {
    V2,
    V3,
    V4,
}

impl PieVersion {
    /// Versions 2 and 3 use the legacy texture/normal/specular block and
    /// never emit per-level overrides or texture-map lines.
    pub fn legacy_texture_block(self) -> bool {
        matches!(self, PieVersion::V2 | PieVersion::V3)
    }

    /// Version 2 wraps UV coordinates into 0-256 integer texel space.
    pub fn integer_uvs(self) -> bool {
        matches!(self, PieVersion::V2)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PieVersion::V2 => "2",
            PieVersion::V3 => "3",
            PieVersion::V4 => "4",
        }
    }
}

impl fmt::Display for PieVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PieVersion {
    type Err = UnsupportedVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" => Ok(PieVersion::V2),
            "3" => Ok(PieVersion::V3),
            "4" => Ok(PieVersion::V4),
            other => Err(UnsupportedVersion(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_versions() {
        assert_eq!("2".parse::<PieVersion>().unwrap(), PieVersion::V2);
        assert_eq!("3".parse::<PieVersion>().unwrap(), PieVersion::V3);
        assert_eq!("4".parse::<PieVersion>().unwrap(), PieVersion::V4);
    }

    #[test]
    fn rejects_unknown_versions() {
        assert!("1".parse::<PieVersion>().is_err());
        assert!("".parse::<PieVersion>().is_err());
        assert!("3.0".parse::<PieVersion>().is_err());
    }

    #[test]
    fn version_branches() {
        assert!(PieVersion::V2.legacy_texture_block());
        assert!(PieVersion::V3.legacy_texture_block());
        assert!(!PieVersion::V4.legacy_texture_block());
        assert!(PieVersion::V2.integer_uvs());
        assert!(!PieVersion::V3.integer_uvs());
    }
}
