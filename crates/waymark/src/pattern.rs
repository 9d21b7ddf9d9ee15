//! Path pattern normalization.
//!
//! A pattern is `/`-separated. A segment starting with `:` is a named
//! wildcard; every other segment is literal. Normalization replaces each
//! wildcard segment with the single reserved byte `*`, so `/users/:id/posts`
//! becomes `/users/*/posts`.

use crate::config::BuildOptions;
use crate::error::ErrorKind;

/// Path separator.
pub(crate) const SEPARATOR: u8 = b'/';

/// Reserved byte standing in for a wildcard segment in normalized patterns.
/// Never allowed literally in a registered path.
pub(crate) const MARKER: u8 = b'*';

const WILDCARD_PREFIX: char = ':';

/// A validated, normalized path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    normalized: String,
    names: Vec<String>,
}

impl Pattern {
    /// Validate and normalize a raw path pattern.
    pub fn parse(path: &str, options: &BuildOptions) -> Result<Self, ErrorKind> {
        if path.is_empty() {
            return Err(ErrorKind::PathEmpty);
        }
        let Some(rest) = path.strip_prefix('/') else {
            return Err(ErrorKind::NoInitialSlash);
        };

        let mut normalized = String::with_capacity(path.len());
        let mut names = Vec::new();

        for segment in rest.split('/') {
            normalized.push('/');

            if segment.as_bytes().contains(&MARKER) {
                return Err(ErrorKind::InvalidSegment);
            }

            match segment.strip_prefix(WILDCARD_PREFIX) {
                Some(name) => {
                    if name.is_empty() && !options.allow_unnamed_wildcards {
                        return Err(ErrorKind::InvalidSegment);
                    }
                    normalized.push(char::from(MARKER));
                    names.push(name.to_string());
                }
                None => normalized.push_str(segment),
            }
        }

        if names.len() > options.param_ceiling() {
            return Err(ErrorKind::OutOfRange);
        }

        Ok(Self { normalized, names })
    }

    /// The normalized form, e.g. `/users/*`.
    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.normalized.as_bytes()
    }

    /// Number of wildcards.
    pub fn param_count(&self) -> usize {
        self.names.len()
    }

    /// Wildcard names in order; unnamed wildcards appear as `""`.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
