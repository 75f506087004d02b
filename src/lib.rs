//! Locates the semantic-version literal embedded in a Rust source file,
//! parses it under strict semver rules, optionally bumps one component,
//! and rewrites the source with the new literal spliced in place,
//! byte-for-byte identical everywhere else.
//!
//! Target files import this crate's [`version`] module and construct their
//! embedded version with `version::parse("X.Y.Z")` or
//! `version::must_parse("X.Y.Z")`; the argument may also be a name bound
//! to a string constant in the same file.

pub mod error;
pub mod locator;
pub mod logging;
pub mod parser;
pub mod version;

pub use error::{BumpError, VersionError};
pub use locator::{BumpOutcome, VERSION_IMPORT, bump_source, locate_and_bump};
pub use version::{BumpKind, Version};
