//! Calls, conversions and built-ins

use crate::error::{LowerError, LowerResult};
use crate::lower::ExprLowerer;
use crate::value::LoweredValue;
use lk_ir::{FunctionType, Operand, Type};
use lk_span::FileSpan;
use lk_syntax::{Expr, ExprId};
use tracing::debug;

impl ExprLowerer<'_> {
    /// Lowers `callee(args...)`
    ///
    /// The callee identifier is tried, in order, as a built-in, as a type
    /// name when there is exactly one argument, and as a function binding.
    pub(crate) fn lower_call(
        &mut self,
        call: ExprId,
        callee: ExprId,
        args: &[ExprId],
        spread: bool,
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let body = self.body();
        let Expr::Ident {
            name,
            binding,
            span: name_span,
        } = &body[callee]
        else {
            return Err(LowerError::UnsupportedCallForm {
                reason: "callee must be an identifier",
                span,
            });
        };

        let text = self.interner().resolve(name);
        if let Some(builtin) = self.config.builtin(&text) {
            debug!(name = %text, ?builtin, "lowering built-in call");
            let external = self.external;
            return external.lower_builtin(self, builtin, call);
        }

        let conversion = match args {
            [arg] => self.types.type_for_identifier(*name).map(|ty| (*arg, ty)),
            _ => None,
        };
        if let Some((arg, ty)) = conversion {
            if spread {
                return Err(LowerError::UnsupportedCallForm {
                    reason: "conversions cannot spread their argument",
                    span,
                });
            }
            debug!(name = %text, to = %ty, "lowering conversion");
            let value = self.lower_expr(arg)?;
            return self.convert(value, &ty, span);
        }

        let binding = self
            .binding_for(*name, *binding)
            .ok_or_else(|| self.unresolved(*name, *name_span))?;
        let target = self
            .scope
            .resolve(&binding)
            .ok_or_else(|| self.unresolved(*name, *name_span))?;
        if spread {
            return Err(LowerError::UnsupportedCallForm {
                reason: "spread arguments are not supported",
                span,
            });
        }

        let signature = match target.ty() {
            Type::Pointer(inner) => match inner.as_ref() {
                Type::Function(signature) => Some(signature.clone()),
                _ => None,
            },
            _ => None,
        };
        if signature.as_ref().is_some_and(|function| function.variadic) {
            return Err(LowerError::UnsupportedCallForm {
                reason: "variadic calls are not supported",
                span,
            });
        }

        debug!(name = %text, kind = ?binding.kind, "lowering function call");
        // Variables hold the function pointer in their slot.
        let target = self.load(target, span)?;

        let operands = self.lower_arguments(args, signature.as_ref())?;
        let result = self
            .emitter
            .call(target.operand(), operands)
            .map_err(|source| LowerError::backend(source, span))?;

        let ret = match signature {
            Some(signature) => *signature.ret,
            None => self
                .emitter
                .operand_type(&Operand::Value(result))
                .map_err(|source| LowerError::backend(source, span))?,
        };
        Ok(LoweredValue::runtime(result, ret))
    }

    /// Lowers arguments left to right, converting constants to parameter types
    fn lower_arguments(
        &mut self,
        args: &[ExprId],
        signature: Option<&FunctionType>,
    ) -> LowerResult<Vec<Operand>> {
        let body = self.body();
        let mut operands = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            let arg_span = body.span(*arg);
            let value = self.lower_expr(*arg)?;
            let value = self.use_value(value, arg_span)?;
            let param = signature.and_then(|function| function.params.get(index));
            let value = match param {
                Some(param) if value.is_constant() => self.coerce_constant(&value, param, arg_span)?,
                _ => value,
            };
            operands.push(value.operand());
        }
        Ok(operands)
    }
}
