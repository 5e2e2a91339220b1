//! IR construction errors

use crate::inst::{CastOp, ValueId};
use crate::types::Type;
use thiserror::Error;

/// Result alias for IR operations
pub type IrResult<T> = Result<T, IrError>;

/// Errors raised while folding constants or emitting instructions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IrError {
    /// Operand type not accepted by the operation
    #[error("`{op}` cannot take an operand of type {found}")]
    OperandType {
        /// Operation name
        op: &'static str,
        /// Offending type
        found: Type,
    },

    /// The two operands of a binary operation have different types
    #[error("`{op}` operands differ in type: {lhs} vs {rhs}")]
    TypeMismatch {
        /// Operation name
        op: &'static str,
        /// Left operand type
        lhs: Type,
        /// Right operand type
        rhs: Type,
    },

    /// Load or store through a non-pointer
    #[error("expected a pointer, found {found}")]
    NotAPointer {
        /// Offending type
        found: Type,
    },

    /// Call through a value that is not a function pointer
    #[error("value of type {found} is not callable")]
    NotCallable {
        /// Offending type
        found: Type,
    },

    /// Wrong number of call arguments
    #[error("expected {expected} arguments, found {found}")]
    Arity {
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// Call argument type differs from the parameter type
    #[error("argument {index} has type {found}, parameter expects {expected}")]
    ArgumentType {
        /// Zero-based argument position
        index: usize,
        /// Parameter type
        expected: Type,
        /// Argument type
        found: Type,
    },

    /// Element address path does not match the aggregate type
    #[error("cannot compute an element address inside {ty}")]
    InvalidElementPath {
        /// Type the path stepped into
        ty: Type,
    },

    /// Cast between incompatible types
    #[error("invalid {op:?} from {from} to {to}")]
    InvalidCast {
        /// Cast operation
        op: CastOp,
        /// Source type
        from: Type,
        /// Target type
        to: Type,
    },

    /// Stored value type differs from the slot type
    #[error("cannot store {found} into a slot of {expected}")]
    StoreType {
        /// Slot type
        expected: Type,
        /// Stored value type
        found: Type,
    },

    /// Global initializer type differs from the declared type
    #[error("initializer of type {found} for global of type {expected}")]
    InitializerType {
        /// Declared type
        expected: Type,
        /// Initializer type
        found: Type,
    },

    /// Value id not produced by this builder
    #[error("unknown value {0}")]
    UnknownValue(ValueId),

    /// Constant division by zero
    #[error("division by zero in constant expression")]
    DivisionByZero,
}
