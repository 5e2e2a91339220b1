//! Instruction emission capability
//!
//! Lowering code talks to the IR through this trait so it can be driven by
//! [`FunctionBuilder`](crate::FunctionBuilder) or by any other backend that
//! validates and records instructions the same way.

use crate::constant::Const;
use crate::error::IrResult;
use crate::inst::{BinaryOp, CastOp, IntPredicate, Operand, ValueId};
use crate::module::GlobalId;
use crate::types::Type;

/// Emits typed instructions into the current function
///
/// Every method validates operand types and fails with an
/// [`IrError`](crate::IrError) instead of producing ill-typed IR.
pub trait IrEmitter {
    /// Integer arithmetic
    ///
    /// # Errors
    ///
    /// Fails unless both operands are integers of the same type.
    fn binary(&mut self, op: BinaryOp, lhs: Operand, rhs: Operand) -> IrResult<ValueId>;

    /// Integer comparison, producing a `bool`
    ///
    /// # Errors
    ///
    /// Fails unless both operands are integers of the same type.
    fn icmp(&mut self, pred: IntPredicate, lhs: Operand, rhs: Operand) -> IrResult<ValueId>;

    /// Arithmetic negation
    ///
    /// # Errors
    ///
    /// Fails on operands that are neither integers nor floats.
    fn neg(&mut self, operand: Operand) -> IrResult<ValueId>;

    /// Load through a pointer
    ///
    /// # Errors
    ///
    /// Fails when `ptr` is not a pointer.
    fn load(&mut self, ptr: Operand) -> IrResult<ValueId>;

    /// Address of an element; the first index steps over the pointer
    ///
    /// # Errors
    ///
    /// Fails on non-integer indices or a path that leaves the aggregate.
    fn element_ptr(&mut self, base: Operand, indices: Vec<Operand>) -> IrResult<ValueId>;

    /// Call through a function pointer
    ///
    /// # Errors
    ///
    /// Fails on a non-function callee, a wrong argument count or an
    /// argument whose type differs from its parameter.
    fn call(&mut self, callee: Operand, args: Vec<Operand>) -> IrResult<ValueId>;

    /// Value conversion
    ///
    /// # Errors
    ///
    /// Fails when `op` does not convert the operand's type to `to`.
    fn cast(&mut self, op: CastOp, value: Operand, to: Type) -> IrResult<ValueId>;

    /// Stack slot for a value of `ty`
    ///
    /// # Errors
    ///
    /// Fails for `void`.
    fn alloca(&mut self, ty: Type) -> IrResult<ValueId>;

    /// Store `value` through `ptr`
    ///
    /// # Errors
    ///
    /// Fails when `ptr` does not point to the type of `value`.
    fn store(&mut self, ptr: Operand, value: Operand) -> IrResult<()>;

    /// Compile-time initializer of a global, if it has one
    fn global_initializer(&self, global: GlobalId) -> Option<Const>;

    /// Type of an operand
    ///
    /// # Errors
    ///
    /// Fails for values this emitter did not produce.
    fn operand_type(&self, operand: &Operand) -> IrResult<Type>;
}
