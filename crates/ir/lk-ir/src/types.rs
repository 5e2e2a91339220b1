//! IR type system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width integer type
///
/// Integers carry their signedness so constants can be range-checked, but
/// arithmetic instructions treat the bits uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntType {
    /// Width in bits (1..=64)
    pub bits: u32,
    /// Whether values are interpreted as two's-complement signed
    pub signed: bool,
}

impl IntType {
    /// One-bit unsigned integer used for booleans
    pub const BOOL: Self = Self::new(1, false);

    /// Creates an integer type
    pub const fn new(bits: u32, signed: bool) -> Self {
        Self { bits, signed }
    }

    /// Mask selecting the low `bits` bits
    pub fn mask(self) -> u64 {
        if self.bits >= 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Smallest representable value
    pub fn min_value(self) -> i128 {
        if self.signed {
            -(1i128 << (self.bits - 1))
        } else {
            0
        }
    }

    /// Largest representable value
    pub fn max_value(self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            (1i128 << self.bits) - 1
        }
    }

    /// Whether `value` fits without loss
    pub fn contains(self, value: i128) -> bool {
        value >= self.min_value() && value <= self.max_value()
    }
}

/// Floating-point type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatType {
    /// IEEE binary32
    F32,
    /// IEEE binary64
    F64,
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionType {
    /// Parameter types
    pub params: Vec<Type>,
    /// Return type
    pub ret: Box<Type>,
    /// Whether extra trailing arguments are accepted
    pub variadic: bool,
}

impl FunctionType {
    /// Creates a non-variadic signature
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret: Box::new(ret),
            variadic: false,
        }
    }
}

/// IR types
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// No value
    Void,
    /// Integer
    Int(IntType),
    /// Floating point
    Float(FloatType),
    /// Immutable string header
    String,
    /// Pointer to a value of the inner type
    Pointer(Box<Type>),
    /// Fixed-size array
    Array {
        /// Element type
        element: Box<Type>,
        /// Number of elements
        len: u64,
    },
    /// Slice header
    Slice(Box<Type>),
    /// Map handle
    Map {
        /// Key type
        key: Box<Type>,
        /// Value type
        value: Box<Type>,
    },
    /// Function
    Function(FunctionType),
}

impl Type {
    /// Integer type shorthand
    pub fn int(bits: u32, signed: bool) -> Self {
        Self::Int(IntType::new(bits, signed))
    }

    /// Boolean (`i1`)
    pub fn bool() -> Self {
        Self::Int(IntType::BOOL)
    }

    /// Pointer to `self`
    #[must_use]
    pub fn pointer_to(self) -> Self {
        Self::Pointer(Box::new(self))
    }

    /// Array of `len` elements of `element`
    pub fn array(element: Self, len: u64) -> Self {
        Self::Array {
            element: Box::new(element),
            len,
        }
    }

    /// Whether this is an integer type
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => write!(f, "void"),
            Self::Int(IntType { bits: 1, signed: false }) => write!(f, "bool"),
            Self::Int(IntType { bits, signed }) => {
                write!(f, "{}{bits}", if *signed { 'i' } else { 'u' })
            }
            Self::Float(FloatType::F32) => write!(f, "f32"),
            Self::Float(FloatType::F64) => write!(f, "f64"),
            Self::String => write!(f, "string"),
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Array { element, len } => write!(f, "[{len} x {element}]"),
            Self::Slice(element) => write!(f, "[]{element}"),
            Self::Map { key, value } => write!(f, "map[{key}]{value}"),
            Self::Function(signature) => {
                write!(f, "fn(")?;
                for (idx, param) in signature.params.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{param}")?;
                }
                if signature.variadic {
                    if !signature.params.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "...")?;
                }
                write!(f, ") -> {}", signature.ret)
            }
        }
    }
}
