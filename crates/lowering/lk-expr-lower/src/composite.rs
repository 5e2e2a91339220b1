//! Array composite literals

use crate::error::{LowerError, LowerResult};
use crate::lower::ExprLowerer;
use crate::value::LoweredValue;
use lk_ir::{Const, Operand, Type};
use lk_span::FileSpan;
use lk_syntax::{ExprId, TypeExpr};
use tracing::trace;

impl ExprLowerer<'_> {
    /// Lowers `[N]T{...}` into a stack slot
    ///
    /// The result is the loaded aggregate with the slot as its array
    /// address. Other composite types go to the external lowering.
    pub(crate) fn lower_composite(
        &mut self,
        expr: ExprId,
        ty: &TypeExpr,
        elements: &[ExprId],
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let ty = self.resolve_type(ty, span)?;
        let Type::Array { element, len } = &ty else {
            let external = self.external;
            return external.lower_composite_lit(self, expr, &ty);
        };

        if elements.len() as u64 > *len {
            return Err(LowerError::TypeMismatch {
                expected: ty.to_string(),
                found: format!("{} elements", elements.len()),
                span,
            });
        }

        let body = self.body();
        let mut values = Vec::with_capacity(elements.len());
        for element_expr in elements {
            let element_span = body.span(*element_expr);
            let value = self.lower_expr(*element_expr)?;
            let value = self.use_value(value, element_span)?;
            let value = if value.is_constant() {
                self.coerce_constant(&value, element, element_span)?
            } else if value.ty() != element.as_ref() {
                return Err(LowerError::TypeMismatch {
                    expected: element.to_string(),
                    found: value.ty().to_string(),
                    span: element_span,
                });
            } else {
                value
            };
            values.push(value);
        }

        let backend = |source| LowerError::backend(source, span);
        let slot = self.emitter.alloca(ty.clone()).map_err(backend)?;

        let filled = values.len() as u64 == *len;
        let constants: Option<Vec<Const>> = values.iter().map(|value| value.as_const().cloned()).collect();
        match constants {
            Some(constants) if filled => {
                trace!(%ty, "storing constant aggregate");
                let aggregate = Const::Array {
                    element: element.as_ref().clone(),
                    elements: constants,
                };
                self.emitter
                    .store(Operand::Value(slot), Operand::Const(aggregate))
                    .map_err(backend)?;
            }
            _ => {
                // Slots past the written elements are zero.
                if !filled {
                    self.emitter
                        .store(Operand::Value(slot), Operand::Const(Const::Zero(ty.clone())))
                        .map_err(backend)?;
                }
                let offset_ty = self.config.offset_type();
                for (position, value) in values.iter().enumerate() {
                    let indices = vec![
                        Operand::Const(Const::int_bits(offset_ty, 0)),
                        Operand::Const(Const::int_bits(offset_ty, position as u64)),
                    ];
                    let pointer = self
                        .emitter
                        .element_ptr(Operand::Value(slot), indices)
                        .map_err(backend)?;
                    self.emitter
                        .store(Operand::Value(pointer), value.operand())
                        .map_err(backend)?;
                }
            }
        }

        let aggregate = LoweredValue::runtime(slot, ty.clone()).mark_indirect();
        self.load(aggregate, span)
    }
}
