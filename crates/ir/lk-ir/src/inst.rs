//! Instructions and operands

use crate::constant::Const;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SSA value produced by a parameter or an instruction
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Instruction operand
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Constant
    Const(Const),
    /// SSA value
    Value(ValueId),
}

impl From<Const> for Operand {
    fn from(constant: Const) -> Self {
        Self::Const(constant)
    }
}

impl From<ValueId> for Operand {
    fn from(value: ValueId) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(constant) => write!(f, "{constant}"),
            Self::Value(value) => write!(f, "{value}"),
        }
    }
}

/// Integer arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Wrapping multiplication
    Mul,
    /// Unsigned division
    UDiv,
    /// Wrapping addition
    Add,
    /// Wrapping subtraction
    Sub,
}

impl BinaryOp {
    /// Mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Mul => "mul",
            Self::UDiv => "udiv",
            Self::Add => "add",
            Self::Sub => "sub",
        }
    }
}

/// Integer comparison predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntPredicate {
    /// Equal
    Eq,
    /// Not equal
    Ne,
    /// Unsigned less than
    Ult,
    /// Unsigned less or equal
    Ule,
    /// Unsigned greater than
    Ugt,
    /// Unsigned greater or equal
    Uge,
    /// Signed less than
    Slt,
    /// Signed less or equal
    Sle,
    /// Signed greater than
    Sgt,
    /// Signed greater or equal
    Sge,
}

impl IntPredicate {
    /// Mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Ult => "ult",
            Self::Ule => "ule",
            Self::Ugt => "ugt",
            Self::Uge => "uge",
            Self::Slt => "slt",
            Self::Sle => "sle",
            Self::Sgt => "sgt",
            Self::Sge => "sge",
        }
    }
}

/// Value conversions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastOp {
    /// Narrow an integer
    Trunc,
    /// Widen an integer with zero fill
    ZExt,
    /// Widen an integer with sign fill
    SExt,
    /// Reinterpret an integer of the same width with another signedness
    Bitcast,
    /// Float to signed integer
    FpToSi,
    /// Float to unsigned integer
    FpToUi,
    /// Signed integer to float
    SiToFp,
    /// Unsigned integer to float
    UiToFp,
    /// Narrow a float
    FpTrunc,
    /// Widen a float
    FpExt,
}

impl CastOp {
    /// Mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::Trunc => "trunc",
            Self::ZExt => "zext",
            Self::SExt => "sext",
            Self::Bitcast => "bitcast",
            Self::FpToSi => "fptosi",
            Self::FpToUi => "fptoui",
            Self::SiToFp => "sitofp",
            Self::UiToFp => "uitofp",
            Self::FpTrunc => "fptrunc",
            Self::FpExt => "fpext",
        }
    }
}

/// Instruction payload
#[derive(Debug, Clone, PartialEq)]
pub enum InstKind {
    /// Integer arithmetic
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Operand,
        /// Right operand
        rhs: Operand,
    },
    /// Integer comparison
    ICmp {
        /// Predicate
        pred: IntPredicate,
        /// Left operand
        lhs: Operand,
        /// Right operand
        rhs: Operand,
    },
    /// Arithmetic negation
    Neg(Operand),
    /// Load through a pointer
    Load(Operand),
    /// Address of an element inside an aggregate
    ElementPtr {
        /// Pointer to the aggregate
        base: Operand,
        /// Offsets; the first steps over the pointer itself
        indices: Vec<Operand>,
    },
    /// Function call
    Call {
        /// Function pointer
        callee: Operand,
        /// Arguments
        args: Vec<Operand>,
    },
    /// Conversion
    Cast {
        /// Conversion kind
        op: CastOp,
        /// Converted value
        value: Operand,
    },
    /// Stack slot allocation
    Alloca(Type),
    /// Store through a pointer
    Store {
        /// Destination
        ptr: Operand,
        /// Stored value
        value: Operand,
    },
}

/// A single emitted instruction
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Produced value, `None` for stores
    pub result: Option<ValueId>,
    /// Result type
    pub ty: Type,
    /// Payload
    pub kind: InstKind,
}

fn write_list(out: &mut fmt::Formatter<'_>, operands: &[Operand]) -> fmt::Result {
    for (idx, operand) in operands.iter().enumerate() {
        if idx > 0 {
            write!(out, ", ")?;
        }
        write!(out, "{operand}")?;
    }
    Ok(())
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = self.result {
            write!(f, "{result} = ")?;
        }
        match &self.kind {
            InstKind::Binary { op, lhs, rhs } => {
                write!(f, "{} {} {lhs}, {rhs}", op.mnemonic(), self.ty)
            }
            InstKind::ICmp { pred, lhs, rhs } => {
                write!(f, "icmp {} {lhs}, {rhs}", pred.mnemonic())
            }
            InstKind::Neg(operand) => write!(f, "neg {} {operand}", self.ty),
            InstKind::Load(ptr) => write!(f, "load {}, {ptr}", self.ty),
            InstKind::ElementPtr { base, indices } => {
                write!(f, "elementptr {base}, [")?;
                write_list(f, indices)?;
                write!(f, "]")
            }
            InstKind::Call { callee, args } => {
                write!(f, "call {} {callee}(", self.ty)?;
                write_list(f, args)?;
                write!(f, ")")
            }
            InstKind::Cast { op, value } => {
                write!(f, "{} {value} to {}", op.mnemonic(), self.ty)
            }
            InstKind::Alloca(ty) => write!(f, "alloca {ty}"),
            InstKind::Store { ptr, value } => write!(f, "store {value}, {ptr}"),
        }
    }
}
