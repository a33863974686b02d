//! Contract versioning
//!
//! Versions follow major.minor.patch semantics. At runtime the rule is
//! additive-only: a running instance never silently upgrades, and a wiring
//! request for an incompatible version is a load-time error.

use semver::{Comparator, Op, Prerelease, Version};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{SchemaError, SchemaResult};

/// A contract version: major.minor.patch.
///
/// A thin wrapper over the semver triple. Pre-release and build
/// metadata are not part of the contract version model and are rejected
/// at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ContractVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    fn as_semver(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }

    /// Whether this loaded version satisfies a requested version.
    ///
    /// Compatibility is additive-only: the major version must match
    /// exactly, and the loaded minor.patch must be at least the
    /// requested minor.patch — i.e. `requested.major.*` intersected
    /// with `>= requested`.
    pub fn is_compatible_with(&self, requested: &ContractVersion) -> bool {
        let same_major = Comparator {
            op: Op::Wildcard,
            major: requested.major,
            minor: None,
            patch: None,
            pre: Prerelease::EMPTY,
        };
        let at_least = Comparator {
            op: Op::GreaterEq,
            major: requested.major,
            minor: Some(requested.minor),
            patch: Some(requested.patch),
            pre: Prerelease::EMPTY,
        };
        let loaded = self.as_semver();
        same_major.matches(&loaded) && at_least.matches(&loaded)
    }
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ContractVersion {
    type Err = SchemaError;

    fn from_str(s: &str) -> SchemaResult<Self> {
        let version =
            Version::parse(s).map_err(|_| SchemaError::MalformedVersion(s.to_string()))?;
        if !version.pre.is_empty() || !version.build.is_empty() {
            return Err(SchemaError::MalformedVersion(s.to_string()));
        }
        Ok(Self::new(version.major, version.minor, version.patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let v: ContractVersion = "1.2.3".parse().unwrap();
        assert_eq!(v, ContractVersion::new(1, 2, 3));
        assert_eq!(v.to_string(), "1.2.3");
    }

    #[test]
    fn test_malformed_versions_rejected() {
        for s in ["1.2", "1.2.3.4", "a.b.c", "", "1..3"] {
            assert!(
                s.parse::<ContractVersion>().is_err(),
                "expected '{s}' to be rejected"
            );
        }
    }

    #[test]
    fn test_signed_and_zero_padded_components_rejected() {
        for s in ["+1.2.3", "1.+2.3", "01.2.3", "1.02.3", "01.a.3", " 1.2.3"] {
            assert!(
                s.parse::<ContractVersion>().is_err(),
                "expected '{s}' to be rejected"
            );
        }
    }

    #[test]
    fn test_prerelease_and_build_metadata_rejected() {
        for s in ["1.2.3-alpha.1", "1.2.3+build.5"] {
            assert!(
                s.parse::<ContractVersion>().is_err(),
                "expected '{s}' to be rejected"
            );
        }
    }

    #[test]
    fn test_additive_compatibility() {
        let loaded = ContractVersion::new(1, 4, 0);
        assert!(loaded.is_compatible_with(&ContractVersion::new(1, 2, 9)));
        assert!(loaded.is_compatible_with(&ContractVersion::new(1, 4, 0)));
        assert!(!loaded.is_compatible_with(&ContractVersion::new(1, 5, 0)));
        assert!(!loaded.is_compatible_with(&ContractVersion::new(2, 0, 0)));
    }

    #[test]
    fn test_major_zero_pins_major_only() {
        // 0.x still follows the additive rule: the major must match and
        // minor.patch may only grow.
        let loaded = ContractVersion::new(0, 3, 0);
        assert!(loaded.is_compatible_with(&ContractVersion::new(0, 2, 1)));
        assert!(!loaded.is_compatible_with(&ContractVersion::new(1, 0, 0)));
        assert!(!ContractVersion::new(0, 1, 0)
            .is_compatible_with(&ContractVersion::new(0, 2, 0)));
    }
}
