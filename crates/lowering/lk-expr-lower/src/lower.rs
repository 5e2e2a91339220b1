//! Expression lowering entry point

use crate::config::LowerConfig;
use crate::context::{ExternalLowering, LowerContext, ScopeResolver, TypeLookup};
use crate::error::{LowerError, LowerResult};
use crate::value::LoweredValue;
use lk_intern::{Interner, Symbol};
use lk_ir::{Const, IrEmitter, Type};
use lk_span::FileSpan;
use lk_syntax::{Binding, Body, Expr, ExprId, LiteralKind, TypeExpr};
use tracing::trace;

/// Lowers expressions of one body into IR
///
/// The lowerer owns no state of its own beyond its collaborators; every
/// instruction goes through the emitter in evaluation order, left operand
/// before right and arguments left to right.
pub struct ExprLowerer<'ctx> {
    body: &'ctx Body,
    interner: &'ctx Interner,
    pub(crate) scope: &'ctx dyn ScopeResolver,
    pub(crate) types: &'ctx dyn TypeLookup,
    pub(crate) external: &'ctx dyn ExternalLowering,
    pub(crate) emitter: &'ctx mut dyn IrEmitter,
    pub(crate) config: &'ctx LowerConfig,
}

impl<'ctx> ExprLowerer<'ctx> {
    /// Creates a lowerer for `body`
    pub fn new(
        body: &'ctx Body,
        interner: &'ctx Interner,
        context: LowerContext<'ctx>,
        emitter: &'ctx mut dyn IrEmitter,
        config: &'ctx LowerConfig,
    ) -> Self {
        Self {
            body,
            interner,
            scope: context.scope,
            types: context.types,
            external: context.external,
            emitter,
            config,
        }
    }

    /// Expression arena being lowered
    pub fn body(&self) -> &'ctx Body {
        self.body
    }

    /// Interner holding identifier text
    pub fn interner(&self) -> &'ctx Interner {
        self.interner
    }

    /// Active configuration
    pub fn config(&self) -> &'ctx LowerConfig {
        self.config
    }

    /// Emitter receiving instructions
    pub fn emitter(&mut self) -> &mut dyn IrEmitter {
        &mut *self.emitter
    }

    /// Lowers one expression
    ///
    /// # Errors
    ///
    /// Fails on unsupported node kinds, operators or call forms, on
    /// unresolved identifiers and on type mismatches. No partial result is
    /// returned; instructions already emitted for sub-expressions remain.
    pub fn lower_expr(&mut self, expr: ExprId) -> LowerResult<LoweredValue> {
        let body = self.body;
        let node = &body[expr];
        trace!(kind = node.kind_name(), span = %node.span(), "lowering expression");

        match node {
            Expr::Literal { kind, span } => self.lower_literal(kind, *span),
            Expr::Ident {
                name,
                binding,
                span,
            } => self.lower_ident(*name, *binding, *span),
            Expr::Binary {
                op,
                left,
                right,
                span,
            } => self.lower_binary(*op, *left, *right, *span),
            Expr::Unary { op, operand, span } => self.lower_unary(*op, *operand, *span),
            Expr::FuncLit { .. } => {
                let external = self.external;
                external.lower_func_lit(self, expr)
            }
            Expr::CompositeLit { ty, elements, span } => {
                self.lower_composite(expr, ty, elements, *span)
            }
            Expr::Call {
                callee,
                args,
                spread,
                span,
            } => self.lower_call(expr, *callee, args, *spread, *span),
            Expr::Index { base, index, span } => self.lower_index(*base, *index, *span),
            Expr::Paren { .. }
            | Expr::Selector { .. }
            | Expr::Slice { .. }
            | Expr::TypeAssert { .. }
            | Expr::Star { .. }
            | Expr::KeyValue { .. } => Err(LowerError::UnsupportedExpressionKind {
                kind: node.kind_name(),
                span: node.span(),
            }),
        }
    }

    /// Loads an indirect value; direct values are returned unchanged
    ///
    /// A loaded array keeps the slot it came from as its array address so
    /// it can still be indexed.
    ///
    /// # Errors
    ///
    /// [`LowerError::Backend`] if the emitter rejects the load.
    pub fn load(&mut self, value: LoweredValue, span: FileSpan) -> LowerResult<LoweredValue> {
        if !value.is_indirect() {
            return Ok(value);
        }

        let slot = value.operand();
        let loaded = self
            .emitter
            .load(slot.clone())
            .map_err(|source| LowerError::backend(source, span))?;
        let result = LoweredValue::runtime(loaded, value.ty().clone());

        Ok(match value.ty() {
            Type::Array { .. } => result.with_array_address(slot),
            _ => result,
        })
    }

    /// Value of a global constant's initializer; other values pass through
    ///
    /// # Errors
    ///
    /// [`LowerError::MissingInitializer`] if the constant has none.
    pub fn unwrap_global(&self, value: LoweredValue, span: FileSpan) -> LowerResult<LoweredValue> {
        if !(value.is_global() && value.is_constant()) {
            return Ok(value);
        }

        let initializer = value
            .global_id()
            .and_then(|id| self.emitter.global_initializer(id))
            .ok_or(LowerError::MissingInitializer { span })?;
        Ok(LoweredValue::constant(initializer))
    }

    /// Reads a value for use as an operand
    ///
    /// Global constants become their initializer and storage slots are
    /// loaded.
    ///
    /// # Errors
    ///
    /// As [`Self::unwrap_global`] and [`Self::load`].
    pub fn use_value(&mut self, value: LoweredValue, span: FileSpan) -> LowerResult<LoweredValue> {
        let value = self.unwrap_global(value, span)?;
        self.load(value, span)
    }

    /// Resolves a written type to an IR type
    ///
    /// # Errors
    ///
    /// [`LowerError::UnresolvedSymbol`] if a type name is unknown.
    pub fn resolve_type(&self, ty: &TypeExpr, span: FileSpan) -> LowerResult<Type> {
        Ok(match ty {
            TypeExpr::Named(name) => self
                .types
                .type_for_identifier(*name)
                .ok_or_else(|| self.unresolved(*name, span))?,
            TypeExpr::Array { len, element } => Type::array(self.resolve_type(element, span)?, *len),
            TypeExpr::Slice(element) => Type::Slice(Box::new(self.resolve_type(element, span)?)),
            TypeExpr::Map { key, value } => Type::Map {
                key: Box::new(self.resolve_type(key, span)?),
                value: Box::new(self.resolve_type(value, span)?),
            },
            TypeExpr::Pointer(inner) => self.resolve_type(inner, span)?.pointer_to(),
        })
    }

    pub(crate) fn unresolved(&self, name: Symbol, span: FileSpan) -> LowerError {
        LowerError::UnresolvedSymbol {
            name: self.interner.resolve(&name),
            span,
        }
    }

    /// Binding for an identifier, preferring the one attached by the parser
    pub(crate) fn binding_for(&self, name: Symbol, binding: Option<Binding>) -> Option<Binding> {
        binding.or_else(|| self.scope.lookup(name))
    }

    fn lower_ident(
        &mut self,
        name: Symbol,
        binding: Option<Binding>,
        span: FileSpan,
    ) -> LowerResult<LoweredValue> {
        let binding = self
            .binding_for(name, binding)
            .ok_or_else(|| self.unresolved(name, span))?;
        self.scope
            .resolve(&binding)
            .ok_or_else(|| self.unresolved(name, span))
    }

    fn lower_literal(&self, kind: &LiteralKind, span: FileSpan) -> LowerResult<LoweredValue> {
        let constant = match kind {
            LiteralKind::Integer(value) => {
                let ty = self.config.int_literal_type();
                Const::int(ty, i128::from(*value)).ok_or_else(|| LowerError::TypeMismatch {
                    expected: Type::Int(ty).to_string(),
                    found: format!("integer constant {value}"),
                    span,
                })?
            }
            LiteralKind::Float(value) => Const::float(self.config.literals.float, *value),
            LiteralKind::Char(ch) => {
                let ty = self.config.rune_literal_type();
                Const::int(ty, i128::from(u32::from(*ch))).ok_or_else(|| LowerError::TypeMismatch {
                    expected: Type::Int(ty).to_string(),
                    found: format!("character constant {ch:?}"),
                    span,
                })?
            }
            LiteralKind::String(text) => Const::Str(text.clone()),
        };
        Ok(LoweredValue::constant(constant))
    }
}
