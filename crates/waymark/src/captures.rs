//! Fixed-capacity capture buffer filled during a match.

use std::fmt;

/// Maximum number of wildcard segments a pattern may contain.
pub const MAX_PARAMS: usize = 8;

/// Byte ranges of captured segments, relative to the request path.
///
/// Kept separate from the path so a dispatcher can hold on to the captures
/// after releasing its borrow of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Spans {
    bounds: [(usize, usize); MAX_PARAMS],
    len: usize,
}

impl Spans {
    pub(crate) const fn new() -> Self {
        Self {
            bounds: [(0, 0); MAX_PARAMS],
            len: 0,
        }
    }

    /// Record a capture. Returns `false` when the buffer is full.
    pub(crate) fn push(&mut self, start: usize, end: usize) -> bool {
        if self.len == MAX_PARAMS {
            return false;
        }
        self.bounds[self.len] = (start, end);
        self.len += 1;
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    fn slice<'p>(&self, path: &'p str, index: usize) -> Option<&'p str> {
        if index >= self.len {
            return None;
        }
        let (start, end) = self.bounds[index];
        path.get(start..end)
    }
}

/// The wildcard segments captured from one request path, left to right.
///
/// Lives on the caller's stack for the duration of a single match.
#[derive(Clone, Copy)]
pub struct Captures<'p> {
    path: &'p str,
    spans: Spans,
}

impl<'p> Captures<'p> {
    pub(crate) fn new(path: &'p str, spans: Spans) -> Self {
        Self { path, spans }
    }

    /// Number of captured segments.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.len() == 0
    }

    /// The `index`-th captured segment.
    pub fn get(&self, index: usize) -> Option<&'p str> {
        self.spans.slice(self.path, index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'p str> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Copy the captures into an owned list.
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }
}

impl fmt::Debug for Captures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl PartialEq<[&str]> for Captures<'_> {
    fn eq(&self, other: &[&str]) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a == *b)
    }
}

impl<const N: usize> PartialEq<[&str; N]> for Captures<'_> {
    fn eq(&self, other: &[&str; N]) -> bool {
        *self == other[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_the_request_path() {
        let path = "/users/42/orders/7";
        let mut spans = Spans::new();
        assert!(spans.push(7, 9));
        assert!(spans.push(17, 18));

        let captures = Captures::new(path, spans);
        assert_eq!(captures.len(), 2);
        assert_eq!(captures.get(0), Some("42"));
        assert_eq!(captures.get(1), Some("7"));
        assert_eq!(captures.get(2), None);
        assert_eq!(captures, ["42", "7"]);
    }

    #[test]
    fn refuses_to_overflow() {
        let mut spans = Spans::new();
        for i in 0..MAX_PARAMS {
            assert!(spans.push(i, i));
        }
        assert!(!spans.push(0, 0));
        assert_eq!(spans.len(), MAX_PARAMS);
    }

    #[test]
    fn empty_capture_is_kept() {
        let mut spans = Spans::new();
        spans.push(1, 1);
        let captures = Captures::new("/", spans);
        assert_eq!(captures.to_vec(), vec![String::new()]);
    }
}
