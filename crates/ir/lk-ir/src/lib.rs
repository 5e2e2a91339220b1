//! Low-level typed intermediate representation
//!
//! A single-assignment IR close to what the native backend consumes:
//! fixed-width integers, pointers, arrays and calls through function
//! pointers. Values are either compile-time [`Const`]s or SSA [`ValueId`]s
//! produced by instructions. [`FunctionBuilder`] validates every
//! instruction as it is recorded, so a finished [`Function`] is always
//! well typed.

mod builder;
mod constant;
mod emit;
mod error;
pub mod fold;
mod inst;
mod module;
mod types;

pub use builder::{Function, FunctionBuilder};
pub use constant::Const;
pub use emit::IrEmitter;
pub use error::{IrError, IrResult};
pub use inst::{BinaryOp, CastOp, InstKind, Instruction, IntPredicate, Operand, ValueId};
pub use module::{FunctionDecl, FunctionId, Global, GlobalId, Module};
pub use types::{FloatType, FunctionType, IntType, Type};
