use std::fmt;
use std::str::FromStr;

use crate::error::VersionError;

/// A semantic version: a `major.minor.patch` triple of non-negative integers.
///
/// Ordering is lexicographic over `(major, minor, patch)`, which the derived
/// `Ord` provides because the fields are declared in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// Which component of a [`Version`] to increment.
///
/// `None` is show mode: report the current value, mutate nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
    None,
}

/// Parses a strict `major.minor.patch` version string.
///
/// Exactly three dot-separated components are required, each matching
/// `^0$|^[1-9][0-9]*$` and fitting in a `u32`. `"0.01.0"` is rejected as a
/// component error; `"3.0.1.0"` is rejected as a malformed version.
pub fn parse(s: &str) -> Result<Version, VersionError> {
    let components: Vec<&str> = s.split('.').collect();
    if components.len() != 3 {
        return Err(VersionError::Malformed(s.to_string()));
    }
    Ok(Version {
        major: component(components[0], s)?,
        minor: component(components[1], s)?,
        patch: component(components[2], s)?,
    })
}

/// Like [`parse`], but panics on invalid input.
///
/// This is the strict constructor target files use for their embedded
/// version constant, where the literal is known to be well formed.
pub fn must_parse(s: &str) -> Version {
    parse(s).unwrap_or_else(|err| panic!("{err}"))
}

fn component(c: &str, input: &str) -> Result<u32, VersionError> {
    let invalid = || VersionError::Component {
        input: input.to_string(),
        component: c.to_string(),
    };
    if c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    // "0" is the only component allowed to start with a zero.
    if c.len() > 1 && c.starts_with('0') {
        return Err(invalid());
    }
    c.parse::<u32>().map_err(|_| invalid())
}

impl Version {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Version { major, minor, patch }
    }

    /// Returns the version with one component incremented and all
    /// lower-order components zeroed. `BumpKind::None` returns the
    /// version unchanged.
    ///
    /// Fails only when the component to increment already holds
    /// `u32::MAX`; [`parse`] accepts such versions, so the overflow has
    /// to surface as an error rather than wrap.
    pub fn bump(self, kind: BumpKind) -> Result<Version, VersionError> {
        let bumped = |component: u32, name: &'static str| {
            component.checked_add(1).ok_or_else(|| VersionError::Overflow {
                version: self.to_string(),
                component: name,
            })
        };
        Ok(match kind {
            BumpKind::Major => Version::new(bumped(self.major, "major")?, 0, 0),
            BumpKind::Minor => Version::new(self.major, bumped(self.minor, "minor")?, 0),
            BumpKind::Patch => Version::new(self.major, self.minor, bumped(self.patch, "patch")?),
            BumpKind::None => self,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
