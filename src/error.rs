use thiserror::Error;

/// Failures produced while parsing a version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The string does not split into exactly three dot-separated components.
    #[error("`{0}` is not a major.minor.patch version")]
    Malformed(String),

    /// A component is not a decimal integer without redundant leading
    /// zeros, or does not fit in a u32.
    #[error("invalid version component `{component}` in `{input}`")]
    Component { input: String, component: String },

    /// The component to increment already holds the largest value a
    /// u32 can represent.
    #[error("bumping the {component} component of `{version}` overflows")]
    Overflow { version: String, component: &'static str },
}

/// Failures produced while locating or rewriting the embedded version.
///
/// Every variant is fatal for the invocation; the input is never rewritten
/// once any of these has been raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BumpError {
    /// The source text could not be parsed as Rust.
    #[error("source could not be parsed as Rust")]
    Syntax,

    /// No `use` declaration imports the version module.
    #[error("`{0}` is not imported")]
    ImportNotFound(&'static str),

    /// The version module is imported but never called.
    #[error("no call to `{local}::parse` or `{local}::must_parse` found")]
    NoQualifyingCall { local: String },

    /// The qualifying call does not take exactly one argument.
    #[error("`{call}` takes exactly one argument, found {found}")]
    Arity { call: String, found: usize },

    /// The version argument is not a string literal or a name that
    /// resolves to one in a single step.
    #[error("unsupported version expression: {0}")]
    UnsupportedExpression(String),

    /// A name used as the version argument is bound by more than one
    /// declaration in the file.
    #[error("`{0}` is bound by more than one declaration")]
    MultipleInitializers(String),

    /// The located string was not a valid version.
    #[error(transparent)]
    Version(#[from] VersionError),
}
