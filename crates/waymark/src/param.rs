//! Converters from captured segments to typed handler parameters.
//!
//! The set is closed: pass-through `String`, base-10 `i64`, base-16 `i64`
//! (spelled [`Hex`]), and base-10 `u64`.

use std::fmt;

use serde::Serialize;

use crate::captures::Captures;
use crate::error::ParamError;

/// The converter bound to one handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    /// Pass-through string.
    Str,
    /// Base-10 signed 64-bit integer.
    Int,
    /// Base-16 signed 64-bit integer.
    Hex,
    /// Base-10 unsigned 64-bit integer.
    Uint,
}

impl ParamKind {
    /// Parse the one-letter code used in dynamic shapes: `s`, `i`, `h`, `u`.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            's' => Some(Self::Str),
            'i' => Some(Self::Int),
            'h' => Some(Self::Hex),
            'u' => Some(Self::Uint),
            _ => None,
        }
    }

    /// Rust type a typed handler declares for this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            Self::Str => "String",
            Self::Int => "i64",
            Self::Hex => "Hex",
            Self::Uint => "u64",
        }
    }

    /// Convert a raw segment into a dynamic value.
    pub fn convert(self, raw: &str) -> Option<Value> {
        match self {
            Self::Str => Some(Value::Str(raw.to_owned())),
            Self::Int => i64::convert(raw).map(Value::Int),
            Self::Hex => Hex::convert(raw).map(|Hex(v)| Value::Hex(v)),
            Self::Uint => u64::convert(raw).map(Value::Uint),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Str => "string",
            Self::Int => "base-10 integer",
            Self::Hex => "hex integer",
            Self::Uint => "base-10 unsigned integer",
        };
        f.write_str(name)
    }
}

/// A base-16 signed 64-bit path parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hex(pub i64);

/// A converted parameter, as handed to dynamically shaped handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Int(i64),
    Hex(i64),
    Uint(u64),
}

mod sealed {
    pub trait Sealed {}
}

/// A type a captured segment can be converted into.
///
/// Sealed: the converters are fixed.
pub trait Param: sealed::Sealed + Sized + Clone + Send + 'static {
    const KIND: ParamKind;

    fn convert(raw: &str) -> Option<Self>;
}

impl sealed::Sealed for String {}
impl Param for String {
    const KIND: ParamKind = ParamKind::Str;

    fn convert(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }
}

impl sealed::Sealed for i64 {}
impl Param for i64 {
    const KIND: ParamKind = ParamKind::Int;

    fn convert(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }
}

impl sealed::Sealed for Hex {}
impl Param for Hex {
    const KIND: ParamKind = ParamKind::Hex;

    fn convert(raw: &str) -> Option<Self> {
        i64::from_str_radix(raw, 16).ok().map(Hex)
    }
}

impl sealed::Sealed for u64 {}
impl Param for u64 {
    const KIND: ParamKind = ParamKind::Uint;

    fn convert(raw: &str) -> Option<Self> {
        // `u64::from_str` tolerates a leading `+`; a path id should not.
        if raw.starts_with('+') {
            return None;
        }
        raw.parse().ok()
    }
}

fn extract<T: Param>(captures: &Captures<'_>, index: usize) -> Result<T, ParamError> {
    let raw = captures.get(index).unwrap_or_default();
    T::convert(raw).ok_or_else(|| ParamError {
        index,
        kind: T::KIND,
        value: raw.to_owned(),
    })
}

/// An ordered parameter list a typed handler declares after its request.
///
/// Implemented for tuples of up to eight [`Param`]s. Parameters bind to the
/// leading captures, so a shorter list simply ignores trailing wildcards.
pub trait Params: sealed::Sealed + Sized + Clone + Send + 'static {
    const SHAPE: &'static [ParamKind];

    fn extract(captures: &Captures<'_>) -> Result<Self, ParamError>;
}

macro_rules! impl_params {
    ($($ty:ident => $idx:tt),*) => {
        impl<$($ty: Param),*> sealed::Sealed for ($($ty,)*) {}

        impl<$($ty: Param),*> Params for ($($ty,)*) {
            const SHAPE: &'static [ParamKind] = &[$($ty::KIND),*];

            #[allow(unused_variables)]
            fn extract(captures: &Captures<'_>) -> Result<Self, ParamError> {
                Ok(($(extract::<$ty>(captures, $idx)?,)*))
            }
        }
    };
}

impl_params!();
impl_params!(A0 => 0);
impl_params!(A0 => 0, A1 => 1);
impl_params!(A0 => 0, A1 => 1, A2 => 2);
impl_params!(A0 => 0, A1 => 1, A2 => 2, A3 => 3);
impl_params!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4);
impl_params!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5);
impl_params!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6);
impl_params!(A0 => 0, A1 => 1, A2 => 2, A3 => 3, A4 => 4, A5 => 5, A6 => 6, A7 => 7);
