//! Constant folding
//!
//! These are the compile-time counterparts of the arithmetic and comparison
//! instructions. Integer arithmetic wraps at the operand width, exactly like
//! the emitted instruction would at run time.

use crate::constant::Const;
use crate::error::{IrError, IrResult};
use crate::inst::{BinaryOp, IntPredicate};
use crate::types::{IntType, Type};

fn int_parts(op: &'static str, value: &Const) -> IrResult<(IntType, u64)> {
    match value {
        Const::Int { ty, bits } => Ok((*ty, *bits)),
        Const::Zero(Type::Int(ty)) => Ok((*ty, 0)),
        other => Err(IrError::OperandType {
            op,
            found: other.ty(),
        }),
    }
}

fn int_pair(op: &'static str, lhs: &Const, rhs: &Const) -> IrResult<(IntType, u64, u64)> {
    let (lhs_ty, lhs_bits) = int_parts(op, lhs)?;
    let (rhs_ty, rhs_bits) = int_parts(op, rhs)?;
    if lhs_ty != rhs_ty {
        return Err(IrError::TypeMismatch {
            op,
            lhs: Type::Int(lhs_ty),
            rhs: Type::Int(rhs_ty),
        });
    }
    Ok((lhs_ty, lhs_bits, rhs_bits))
}

/// Folds an arithmetic operator over two integer constants
///
/// # Errors
///
/// Fails on non-integer or mismatched operands, and on division by zero.
pub fn binary(op: BinaryOp, lhs: &Const, rhs: &Const) -> IrResult<Const> {
    let (ty, left, right) = int_pair(op.mnemonic(), lhs, rhs)?;
    let bits = match op {
        BinaryOp::Mul => left.wrapping_mul(right),
        BinaryOp::Add => left.wrapping_add(right),
        BinaryOp::Sub => left.wrapping_sub(right),
        BinaryOp::UDiv => {
            if right == 0 {
                return Err(IrError::DivisionByZero);
            }
            left / right
        }
    };
    Ok(Const::int_bits(ty, bits))
}

/// Folds an integer comparison into a boolean constant
///
/// # Errors
///
/// Fails on non-integer or mismatched operands.
pub fn icmp(pred: IntPredicate, lhs: &Const, rhs: &Const) -> IrResult<Const> {
    let (ty, left, right) = int_pair("icmp", lhs, rhs)?;
    // Signed predicates reinterpret the raw bits as two's complement.
    let as_signed = |bits: u64| -> i128 {
        let shift = 64 - ty.bits;
        i128::from(((bits << shift) as i64) >> shift)
    };
    let result = match pred {
        IntPredicate::Eq => left == right,
        IntPredicate::Ne => left != right,
        IntPredicate::Ult => left < right,
        IntPredicate::Ule => left <= right,
        IntPredicate::Ugt => left > right,
        IntPredicate::Uge => left >= right,
        IntPredicate::Slt => as_signed(left) < as_signed(right),
        IntPredicate::Sle => as_signed(left) <= as_signed(right),
        IntPredicate::Sgt => as_signed(left) > as_signed(right),
        IntPredicate::Sge => as_signed(left) >= as_signed(right),
    };
    Ok(Const::bool(result))
}

/// Folds an arithmetic negation
///
/// # Errors
///
/// Fails on constants that are neither integers nor floats.
pub fn neg(value: &Const) -> IrResult<Const> {
    match value {
        Const::Float { ty, value } => Ok(Const::float(*ty, -value)),
        other => {
            let (ty, bits) = int_parts("neg", other)?;
            Ok(Const::int_bits(ty, bits.wrapping_neg()))
        }
    }
}
