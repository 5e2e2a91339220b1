//! Operand reconciliation and conversions

use crate::error::{LowerError, LowerResult};
use crate::lower::ExprLowerer;
use crate::value::LoweredValue;
use lk_ir::{CastOp, FloatType, Type};
use lk_span::FileSpan;
use tracing::{debug, trace};

/// Operands of a binary operation after reconciliation
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    /// Left operand
    pub left: LoweredValue,
    /// Right operand
    pub right: LoweredValue,
    /// Whether both operands are compile-time constants
    pub both_constant: bool,
}

impl ExprLowerer<'_> {
    /// Brings the two operands of a binary operation to a common form
    ///
    /// When exactly one side is constant, that side is unwrapped (global
    /// constants become their initializer), the runtime side is loaded, and
    /// the constant is converted to the runtime side's type. When both are
    /// constant, both are unwrapped and folding is possible. Two runtime
    /// operands are returned untouched.
    ///
    /// # Errors
    ///
    /// As [`Self::use_value`] and [`Self::coerce_constant`].
    pub fn reconcile(
        &mut self,
        left: LoweredValue,
        right: LoweredValue,
        span: FileSpan,
    ) -> LowerResult<Reconciled> {
        match (left.is_constant(), right.is_constant()) {
            (true, true) => Ok(Reconciled {
                left: self.unwrap_global(left, span)?,
                right: self.unwrap_global(right, span)?,
                both_constant: true,
            }),
            (true, false) => {
                let left = self.unwrap_global(left, span)?;
                let right = self.load(right, span)?;
                let left = self.coerce_constant(&left, right.ty(), span)?;
                Ok(Reconciled {
                    left,
                    right,
                    both_constant: false,
                })
            }
            (false, true) => {
                let right = self.unwrap_global(right, span)?;
                let left = self.load(left, span)?;
                let right = self.coerce_constant(&right, left.ty(), span)?;
                Ok(Reconciled {
                    left,
                    right,
                    both_constant: false,
                })
            }
            (false, false) => Ok(Reconciled {
                left,
                right,
                both_constant: false,
            }),
        }
    }

    /// Converts a constant to `ty` without losing information
    ///
    /// # Errors
    ///
    /// [`LowerError::TypeMismatch`] if `value` is not a constant or does not
    /// fit in `ty`.
    pub fn coerce_constant(
        &self,
        value: &LoweredValue,
        ty: &Type,
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let mismatch = || LowerError::TypeMismatch {
            expected: ty.to_string(),
            found: match value.as_const() {
                Some(constant) => format!("constant {constant} of type {}", value.ty()),
                None => value.ty().to_string(),
            },
            span,
        };

        let converted = value
            .as_const()
            .and_then(|constant| constant.convert(ty))
            .ok_or_else(mismatch)?;
        debug!(from = %value.ty(), to = %ty, "coerced constant");
        Ok(LoweredValue::constant(converted))
    }

    /// Explicit conversion `T(x)`
    ///
    /// Constants are converted at compile time and must be representable in
    /// the target type. Runtime values get a cast instruction.
    ///
    /// # Errors
    ///
    /// [`LowerError::TypeMismatch`] for unrepresentable constants and
    /// conversions with no cast.
    pub fn convert(
        &mut self,
        value: LoweredValue,
        to: &Type,
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let value = self.use_value(value, span)?;
        if value.is_constant() {
            return self.coerce_constant(&value, to, span);
        }
        if value.ty() == to {
            return Ok(value);
        }

        let op = cast_op(value.ty(), to).ok_or_else(|| LowerError::TypeMismatch {
            expected: to.to_string(),
            found: value.ty().to_string(),
            span,
        })?;
        trace!(?op, from = %value.ty(), to = %to, "emitting conversion");

        let result = self
            .emitter
            .cast(op, value.operand(), to.clone())
            .map_err(|source| LowerError::backend(source, span))?;
        Ok(LoweredValue::runtime(result, to.clone()))
    }
}

fn cast_op(from: &Type, to: &Type) -> Option<CastOp> {
    Some(match (from, to) {
        (Type::Int(src), Type::Int(dst)) if dst.bits < src.bits => CastOp::Trunc,
        (Type::Int(src), Type::Int(dst)) if dst.bits > src.bits => {
            if src.signed {
                CastOp::SExt
            } else {
                CastOp::ZExt
            }
        }
        (Type::Int(_), Type::Int(_)) => CastOp::Bitcast,
        (Type::Float(_), Type::Int(dst)) => {
            if dst.signed {
                CastOp::FpToSi
            } else {
                CastOp::FpToUi
            }
        }
        (Type::Int(src), Type::Float(_)) => {
            if src.signed {
                CastOp::SiToFp
            } else {
                CastOp::UiToFp
            }
        }
        (Type::Float(FloatType::F64), Type::Float(FloatType::F32)) => CastOp::FpTrunc,
        (Type::Float(FloatType::F32), Type::Float(FloatType::F64)) => CastOp::FpExt,
        _ => return None,
    })
}
