//! Method names and their bit positions.

/// Wildcard-method sentinel: a route registered under this method handles any
/// request method not registered explicitly for the same path.
pub const METHOD_ANY: &str = "~";

/// Bitset of method positions. Bit `i` is the `i`-th method first seen while
/// building.
pub(crate) type MethodMask = u64;

/// Number of distinct methods a table can hold.
pub(crate) const MAX_METHODS: usize = MethodMask::BITS as usize;

pub(crate) const fn flag(bit: u8) -> MethodMask {
    1 << bit
}

/// Method names in order of first registration; the position is the bit.
#[derive(Debug, Default, Clone)]
pub(crate) struct MethodSet {
    names: Vec<String>,
}

impl MethodSet {
    /// Bit of a known method.
    pub(crate) fn bit(&self, method: &str) -> Option<u8> {
        self.names
            .iter()
            .position(|name| name == method)
            .map(|i| i as u8)
    }

    /// Bit of `method`, assigning the next free one on first sighting.
    /// `None` once every bit is taken.
    pub(crate) fn intern(&mut self, method: &str) -> Option<u8> {
        if let Some(bit) = self.bit(method) {
            return Some(bit);
        }
        if self.names.len() == MAX_METHODS {
            return None;
        }
        self.names.push(method.to_string());
        Some((self.names.len() - 1) as u8)
    }

    pub(crate) fn name(&self, bit: u8) -> &str {
        self.names
            .get(usize::from(bit))
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Names of every method set in `mask`, in bit order.
    pub(crate) fn names_in(&self, mask: MethodMask) -> impl Iterator<Item = &str> + '_ {
        self.names
            .iter()
            .enumerate()
            .filter(move |(i, _)| mask & flag(*i as u8) != 0)
            .map(|(_, name)| name.as_str())
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}
