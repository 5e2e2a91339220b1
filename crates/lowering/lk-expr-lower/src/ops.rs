//! Binary and unary operators

use crate::error::{LowerError, LowerResult};
use crate::lower::ExprLowerer;
use crate::value::LoweredValue;
use lk_ir::{fold, BinaryOp as IrBinaryOp, IntPredicate, Type};
use lk_span::FileSpan;
use lk_syntax::{BinaryOp, ExprId, UnaryOp};
use tracing::debug;

/// IR operation selected for a source operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lowered {
    Arith(IrBinaryOp),
    Compare(IntPredicate),
}

/// Division and ordering are unsigned regardless of operand signedness.
fn select(op: BinaryOp) -> Option<Lowered> {
    Some(match op {
        BinaryOp::Mul => Lowered::Arith(IrBinaryOp::Mul),
        BinaryOp::Quo => Lowered::Arith(IrBinaryOp::UDiv),
        BinaryOp::Add => Lowered::Arith(IrBinaryOp::Add),
        BinaryOp::Sub => Lowered::Arith(IrBinaryOp::Sub),
        BinaryOp::Eq => Lowered::Compare(IntPredicate::Eq),
        BinaryOp::Lt => Lowered::Compare(IntPredicate::Ult),
        BinaryOp::Rem
        | BinaryOp::And
        | BinaryOp::Or
        | BinaryOp::Xor
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::AndNot
        | BinaryOp::LogicalAnd
        | BinaryOp::LogicalOr
        | BinaryOp::Ne
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge => return None,
    })
}

/// Unary operators that lower to something
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unary {
    Negate,
    Identity,
}

fn select_unary(op: UnaryOp) -> Option<Unary> {
    match op {
        UnaryOp::Neg => Some(Unary::Negate),
        UnaryOp::Plus => Some(Unary::Identity),
        UnaryOp::Not | UnaryOp::Complement | UnaryOp::AddrOf | UnaryOp::Recv => None,
    }
}

impl ExprLowerer<'_> {
    pub(crate) fn lower_binary(
        &mut self,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let lowered = select(op).ok_or(LowerError::UnsupportedOperator {
            op: op.as_str(),
            span,
        })?;

        let left = self.lower_expr(left)?;
        let right = self.lower_expr(right)?;
        let operands = self.reconcile(left, right, span)?;

        if operands.both_constant {
            let (Some(lhs), Some(rhs)) = (operands.left.as_const(), operands.right.as_const()) else {
                return Err(LowerError::TypeMismatch {
                    expected: "constant operands".to_string(),
                    found: format!("{} and {}", operands.left.ty(), operands.right.ty()),
                    span,
                });
            };
            let folded = match lowered {
                Lowered::Arith(arith) => fold::binary(arith, lhs, rhs),
                Lowered::Compare(pred) => fold::icmp(pred, lhs, rhs),
            }
            .map_err(|source| LowerError::backend(source, span))?;
            debug!(op = op.as_str(), result = %folded, "folded binary expression");
            return Ok(LoweredValue::constant(folded));
        }

        let lhs = self.load(operands.left, span)?;
        let rhs = self.load(operands.right, span)?;
        if lhs.ty() != rhs.ty() {
            return Err(LowerError::TypeMismatch {
                expected: lhs.ty().to_string(),
                found: rhs.ty().to_string(),
                span,
            });
        }

        let (emitted, ty) = match lowered {
            Lowered::Arith(arith) => (
                self.emitter.binary(arith, lhs.operand(), rhs.operand()),
                lhs.ty().clone(),
            ),
            Lowered::Compare(pred) => (
                self.emitter.icmp(pred, lhs.operand(), rhs.operand()),
                Type::bool(),
            ),
        };
        let emitted = emitted.map_err(|source| LowerError::backend(source, span))?;
        Ok(LoweredValue::runtime(emitted, ty))
    }

    pub(crate) fn lower_unary(
        &mut self,
        op: UnaryOp,
        operand: ExprId,
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let unary = select_unary(op).ok_or(LowerError::UnsupportedOperator {
            op: op.as_str(),
            span,
        })?;

        let value = self.lower_expr(operand)?;
        if unary == Unary::Identity {
            return Ok(value);
        }

        let value = self.use_value(value, span)?;
        if let Some(constant) = value.as_const() {
            let folded = fold::neg(constant).map_err(|source| LowerError::backend(source, span))?;
            return Ok(LoweredValue::constant(folded));
        }

        let negated = self
            .emitter
            .neg(value.operand())
            .map_err(|source| LowerError::backend(source, span))?;
        Ok(LoweredValue::runtime(negated, value.ty().clone()))
    }
}
