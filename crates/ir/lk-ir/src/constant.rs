//! Compile-time constants

use crate::module::{FunctionId, GlobalId};
use crate::types::{FloatType, FunctionType, IntType, Type};
use std::fmt;

/// A compile-time constant value
#[derive(Debug, Clone, PartialEq)]
pub enum Const {
    /// Integer constant, stored as raw two's-complement bits masked to width
    Int {
        /// Integer type
        ty: IntType,
        /// Raw bits
        bits: u64,
    },
    /// Floating-point constant
    Float {
        /// Float type
        ty: FloatType,
        /// Value (already rounded to `ty`)
        value: f64,
    },
    /// String constant
    Str(String),
    /// Array aggregate constant
    Array {
        /// Element type
        element: Type,
        /// Elements in order
        elements: Vec<Const>,
    },
    /// All-zero value of a type
    Zero(Type),
    /// Address of a global variable
    Global {
        /// Global id
        id: GlobalId,
        /// Type of the value stored in the global
        ty: Type,
    },
    /// Address of a declared function
    Function {
        /// Function id
        id: FunctionId,
        /// Function signature
        ty: FunctionType,
    },
}

impl Const {
    /// Integer constant from a mathematical value, `None` if it does not fit
    pub fn int(ty: IntType, value: i128) -> Option<Self> {
        ty.contains(value).then(|| Self::Int {
            ty,
            bits: (value as u64) & ty.mask(),
        })
    }

    /// Integer constant from raw bits (truncated to width)
    pub fn int_bits(ty: IntType, bits: u64) -> Self {
        Self::Int {
            ty,
            bits: bits & ty.mask(),
        }
    }

    /// Boolean constant
    pub fn bool(value: bool) -> Self {
        Self::int_bits(IntType::BOOL, u64::from(value))
    }

    /// Float constant, rounding to `ty`
    pub fn float(ty: FloatType, value: f64) -> Self {
        let value = match ty {
            FloatType::F32 => f64::from(value as f32),
            FloatType::F64 => value,
        };
        Self::Float { ty, value }
    }

    /// Type of the constant
    pub fn ty(&self) -> Type {
        match self {
            Self::Int { ty, .. } => Type::Int(*ty),
            Self::Float { ty, .. } => Type::Float(*ty),
            Self::Str(_) => Type::String,
            Self::Array { element, elements } => Type::array(element.clone(), elements.len() as u64),
            Self::Zero(ty) => ty.clone(),
            Self::Global { ty, .. } => ty.clone().pointer_to(),
            Self::Function { ty, .. } => Type::Function(ty.clone()).pointer_to(),
        }
    }

    /// Mathematical value of an integer constant, honouring its signedness
    pub fn int_value(&self) -> Option<i128> {
        match self {
            Self::Int { ty, bits } => Some(if ty.signed && ty.bits < 64 {
                let shift = 64 - ty.bits;
                i128::from(((*bits << shift) as i64) >> shift)
            } else if ty.signed {
                i128::from(*bits as i64)
            } else {
                i128::from(*bits)
            }),
            Self::Zero(Type::Int(_)) => Some(0),
            _ => None,
        }
    }

    /// Converts the constant to `to` without losing information
    ///
    /// Returns `None` when the value cannot be represented exactly, e.g.
    /// `300` as `u8` or `2.5` as `i32`.
    #[allow(clippy::float_cmp, reason = "exact equality is the representability check")]
    pub fn convert(&self, to: &Type) -> Option<Self> {
        if &self.ty() == to {
            return Some(self.clone());
        }

        match (self, to) {
            (Self::Int { .. } | Self::Zero(Type::Int(_)), Type::Int(target)) => {
                Self::int(*target, self.int_value()?)
            }
            (Self::Int { .. } | Self::Zero(Type::Int(_)), Type::Float(target)) => {
                let value = self.int_value()?;
                let converted = match target {
                    FloatType::F32 => f64::from(value as f32),
                    FloatType::F64 => value as f64,
                };
                (converted as i128 == value && converted.is_finite())
                    .then(|| Self::float(*target, converted))
            }
            (Self::Float { value, .. }, Type::Int(target)) => {
                if !value.is_finite() || value.fract() != 0.0 {
                    return None;
                }
                let integral = *value as i128;
                if integral as f64 != *value {
                    return None;
                }
                Self::int(*target, integral)
            }
            (Self::Float { value, .. }, Type::Float(target)) => {
                let converted = Self::float(*target, *value);
                match converted {
                    Self::Float { value: rounded, .. }
                        if rounded == *value || (rounded.is_nan() && value.is_nan()) =>
                    {
                        Some(converted)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int {
                ty: IntType { bits: 1, signed: false },
                bits,
            } => write!(f, "{}", *bits != 0),
            Self::Int { .. } => match self.int_value() {
                Some(value) => write!(f, "{value}"),
                None => Err(fmt::Error),
            },
            Self::Float { value, .. } => write!(f, "{value:?}"),
            Self::Str(text) => write!(f, "{text:?}"),
            Self::Array { elements, .. } => {
                write!(f, "{} [", self.ty())?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Self::Zero(ty) => write!(f, "{ty} zeroinit"),
            Self::Global { id, .. } => write!(f, "@g{}", id.0),
            Self::Function { id, .. } => write!(f, "@fn{}", id.0),
        }
    }
}
