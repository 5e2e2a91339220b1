//! Element access

use crate::error::{LowerError, LowerResult};
use crate::lower::ExprLowerer;
use crate::value::LoweredValue;
use lk_ir::{Const, Operand, Type};
use lk_span::FileSpan;
use lk_syntax::ExprId;
use tracing::{debug, trace};

impl ExprLowerer<'_> {
    /// Lowers `base[index]` for fixed-size arrays
    pub(crate) fn lower_index(
        &mut self,
        base: ExprId,
        index: ExprId,
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let base = self.lower_expr(base)?;
        let index = self.lower_expr(index)?;
        let index = self.load(index, span)?;
        if !index.ty().is_integer() {
            return Err(LowerError::TypeMismatch {
                expected: "integer index".to_string(),
                found: index.ty().to_string(),
                span,
            });
        }

        let (address, element) = self.element_base(base, span)?;
        let offset = Const::int(self.config.offset_type(), 0).ok_or_else(|| {
            LowerError::TypeMismatch {
                expected: "offset type able to hold zero".to_string(),
                found: self.config.offset_type().bits.to_string(),
                span,
            }
        })?;
        trace!(%address, index = %index.operand(), "computing element address");

        let pointer = self
            .emitter
            .element_ptr(address, vec![Operand::Const(offset), index.operand()])
            .map_err(|source| LowerError::backend(source, span))?;
        self.load(LoweredValue::runtime(pointer, element).mark_indirect(), span)
    }

    /// Address of the array being indexed, and its element type
    fn element_base(&mut self, base: LoweredValue, span: FileSpan) -> LowerResult<(Operand, Type)> {
        let unsupported = |ty: &Type| LowerError::UnsupportedIndexTarget {
            target: ty.to_string(),
            span,
        };

        debug!(
            ty = %base.ty(),
            indirect = base.is_indirect(),
            "selecting index base"
        );
        match base.ty().clone() {
            Type::Array { element, .. } if base.is_indirect() => Ok((base.operand(), *element)),
            Type::Array { element, .. } => base
                .array_address()
                .map(|address| (address.clone(), *element))
                .ok_or_else(|| unsupported(base.ty())),
            Type::Pointer(inner) => match *inner {
                Type::Array { element, .. } => {
                    let pointer = self.load(base, span)?;
                    Ok((pointer.operand(), *element))
                }
                other => Err(unsupported(&other.pointer_to())),
            },
            other => Err(unsupported(&other)),
        }
    }
}
