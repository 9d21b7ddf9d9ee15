//! Errors raised while building a table or binding a request.

use std::fmt;

use thiserror::Error;

use crate::param::ParamKind;

/// The category of a construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The route has an empty method.
    MethodEmpty,
    /// The route has no handler.
    NilHandler,
    /// The route has an empty path.
    PathEmpty,
    /// The path does not start with `/`.
    NoInitialSlash,
    /// A segment contains the reserved `*` byte or is an unnamed wildcard
    /// while unnamed wildcards are disabled.
    InvalidSegment,
    /// Too many wildcards in the path, or too many distinct methods.
    OutOfRange,
    /// A handler is already registered for this method and pattern.
    DuplicateHandler,
    /// The handler's declared parameter shape is not supported.
    ConversionShapeFailure,
    /// The handler's arity disagrees with the pattern's wildcard count.
    ParamCountMismatch,
    /// A wildcard and a literal sibling accept a common method.
    ConflictingRoutes,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MethodEmpty => "method empty",
            Self::NilHandler => "nil handler",
            Self::PathEmpty => "path empty",
            Self::NoInitialSlash => "no initial slash",
            Self::InvalidSegment => "invalid segment",
            Self::OutOfRange => "out of range",
            Self::DuplicateHandler => "duplicate handler",
            Self::ConversionShapeFailure => "conversion shape failure",
            Self::ParamCountMismatch => "param count mismatch",
            Self::ConflictingRoutes => "conflicting routes",
        };
        f.write_str(name)
    }
}

/// One registered `(method, pattern)` pair involved in a routing conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub method: String,
    pub pattern: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// A construction failure, pinned to the offending route.
///
/// Displays as `route {index} "{METHOD} {path}": {detail}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("route {index} \"{route}\": {detail}")]
pub struct BuildError {
    /// Zero-based index of the route in the list given to the builder.
    pub index: usize,
    pub kind: ErrorKind,
    /// The route rendered as `METHOD path`, with `<nil>` for empty parts.
    pub route: String,
    /// Human-readable explanation.
    pub detail: String,
    /// Every registered pair reachable on both sides of an ambiguous branch.
    /// Empty unless `kind` is [`ErrorKind::ConflictingRoutes`].
    pub conflicts: Vec<Conflict>,
}

impl BuildError {
    pub(crate) fn new(
        index: usize,
        kind: ErrorKind,
        method: &str,
        path: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            index,
            kind,
            route: format!("{} {}", or_nil(method), or_nil(path)),
            detail: detail.into(),
            conflicts: Vec::new(),
        }
    }

    pub(crate) fn with_conflicts(mut self, conflicts: Vec<Conflict>) -> Self {
        self.conflicts = conflicts;
        self
    }
}

fn or_nil(s: &str) -> &str {
    if s.is_empty() {
        "<nil>"
    } else {
        s
    }
}

/// A captured path segment that could not be converted to the type the
/// handler declared for it. Surfaces as a client error, never a panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path parameter {index} ({value:?}) is not a valid {kind}")]
pub struct ParamError {
    /// Position of the wildcard in the pattern.
    pub index: usize,
    pub kind: ParamKind,
    /// The raw captured text.
    pub value: String,
}
