//! Capabilities the lowerer consumes from its host
//!
//! Scope resolution, type names and the lowering of function literals,
//! non-array composites and built-ins all belong to the statement and
//! declaration layers. The lowerer reaches them through these traits.

use crate::config::BuiltinKind;
use crate::error::{LowerError, LowerResult};
use crate::lower::ExprLowerer;
use crate::value::LoweredValue;
use lk_intern::Symbol;
use lk_ir::Type;
use lk_syntax::{Binding, ExprId};

/// Resolves identifiers to bindings and bindings to values
pub trait ScopeResolver {
    /// Binding visible under `name` at the current point
    fn lookup(&self, name: Symbol) -> Option<Binding>;

    /// Value a binding denotes
    ///
    /// Variables resolve to their storage slot (indirect), parameters
    /// without a slot to their direct value, functions to their address,
    /// and globals to [`LoweredValue::global_constant`] or
    /// [`LoweredValue::global_variable`].
    fn resolve(&self, binding: &Binding) -> Option<LoweredValue>;
}

/// Maps type names to IR types
pub trait TypeLookup {
    /// Type named by `name`, if it names one
    fn type_for_identifier(&self, name: Symbol) -> Option<Type>;
}

/// Lowering performed outside the expression layer
///
/// Each hook receives the lowerer so it can lower sub-expressions itself.
pub trait ExternalLowering {
    /// Lowers a call to a built-in function
    ///
    /// # Errors
    ///
    /// Any [`LowerError`] raised while lowering the arguments or the call.
    fn lower_builtin(
        &self,
        lowerer: &mut ExprLowerer<'_>,
        builtin: BuiltinKind,
        call: ExprId,
    ) -> LowerResult<LoweredValue>;

    /// Lowers a function literal
    ///
    /// # Errors
    ///
    /// Any [`LowerError`] raised while lowering the literal.
    fn lower_func_lit(&self, lowerer: &mut ExprLowerer<'_>, expr: ExprId) -> LowerResult<LoweredValue>;

    /// Lowers a composite literal whose type is not a fixed-size array
    ///
    /// # Errors
    ///
    /// Any [`LowerError`] raised while lowering the literal.
    fn lower_composite_lit(
        &self,
        lowerer: &mut ExprLowerer<'_>,
        expr: ExprId,
        ty: &Type,
    ) -> LowerResult<LoweredValue>;
}

/// External lowering that rejects everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalLowering;

impl NoExternalLowering {
    fn reject(lowerer: &ExprLowerer<'_>, expr: ExprId) -> LowerError {
        let node = &lowerer.body()[expr];
        LowerError::UnsupportedExpressionKind {
            kind: node.kind_name(),
            span: node.span(),
        }
    }
}

impl ExternalLowering for NoExternalLowering {
    fn lower_builtin(
        &self,
        lowerer: &mut ExprLowerer<'_>,
        _builtin: BuiltinKind,
        call: ExprId,
    ) -> LowerResult<LoweredValue> {
        Err(Self::reject(lowerer, call))
    }

    fn lower_func_lit(&self, lowerer: &mut ExprLowerer<'_>, expr: ExprId) -> LowerResult<LoweredValue> {
        Err(Self::reject(lowerer, expr))
    }

    fn lower_composite_lit(
        &self,
        lowerer: &mut ExprLowerer<'_>,
        expr: ExprId,
        _ty: &Type,
    ) -> LowerResult<LoweredValue> {
        Err(Self::reject(lowerer, expr))
    }
}

/// Host capabilities bundled for [`ExprLowerer::new`]
#[derive(Clone, Copy)]
pub struct LowerContext<'ctx> {
    /// Scope resolution
    pub scope: &'ctx dyn ScopeResolver,
    /// Type names
    pub types: &'ctx dyn TypeLookup,
    /// Function literals, non-array composites and built-ins
    pub external: &'ctx dyn ExternalLowering,
}
