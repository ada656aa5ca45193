//! Type and type-parameter handles.
//!
//! `Idx` is the only type representation passed around. Types live in the
//! [`Pool`](crate::Pool) and are compared by index, which interning makes
//! equivalent to structural comparison.

use std::fmt;

/// A 32-bit index into the type pool.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Idx(u32);

impl Idx {
    // Primitives are pre-interned at these indices when a pool is created.

    /// The universal type. Also the fallback after a reported type error.
    pub const ANY: Self = Self(0);
    pub const VOID: Self = Self(1);
    pub const INT: Self = Self(2);
    pub const FLOAT: Self = Self(3);
    pub const BOOL: Self = Self(4);
    pub const CHAR: Self = Self(5);
    pub const STR: Self = Self(6);

    /// Number of pre-interned primitive types.
    pub const PRIMITIVE_COUNT: u32 = 7;

    /// Sentinel for "no type yet".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::PRIMITIVE_COUNT
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    /// Source name of a primitive, `None` for pool-allocated types.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("any"),
            1 => Some("void"),
            2 => Some("int"),
            3 => Some("float"),
            4 => Some("bool"),
            5 => Some("char"),
            6 => Some("string"),
            _ => None,
        }
    }

    /// Primitive named `name` in source, if any.
    pub fn primitive(name: &str) -> Option<Self> {
        match name {
            "any" => Some(Self::ANY),
            "void" => Some(Self::VOID),
            "int" => Some(Self::INT),
            "float" => Some(Self::FLOAT),
            "bool" => Some(Self::BOOL),
            "char" => Some(Self::CHAR),
            "string" => Some(Self::STR),
            _ => None,
        }
    }
}

impl fmt::Debug for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Idx::{}", name.to_uppercase()),
            None if self.is_none() => write!(f, "Idx::NONE"),
            None => write!(f, "Idx({})", self.0),
        }
    }
}

impl fmt::Display for Idx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_none() => write!(f, "<none>"),
            None => write!(f, "type#{}", self.0),
        }
    }
}

/// Identity of a declared type parameter.
///
/// Type-variable types point back at their parameter through this id; the
/// parameter itself (name, owner, variance, bounds) lives in the pool.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct TypeParamId(u32);

impl TypeParamId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

const _: () = assert!(std::mem::size_of::<Idx>() == 4);
