//! Shared fixtures for lowering tests
#![allow(
    dead_code,
    clippy::unwrap_used,
    reason = "each test binary uses a different subset of the fixtures"
)]

use lk_expr_lower::{
    BuiltinKind, ExprLowerer, ExternalLowering, LowerConfig, LowerContext, LowerError,
    LowerResult, LoweredValue, ScopeResolver, TypeLookup,
};
use lk_intern::{Interner, Symbol};
use lk_ir::{Const, FloatType, FunctionBuilder, FunctionType, IntType, Type};
use lk_span::{FileId, FileSpan, Span};
use lk_syntax::{
    BinaryOp, Binding, BindingId, BindingKind, BlockRef, Body, Expr, ExprId, LiteralKind,
    TypeExpr, UnaryOp,
};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use tracing_subscriber::EnvFilter;

pub const I32: IntType = IntType::new(32, true);
pub const I64: IntType = IntType::new(64, true);

/// Installs a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    #[allow(
        let_underscore_drop,
        clippy::let_underscore_must_use,
        reason = "an earlier test may have installed the subscriber"
    )]
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds expression trees with distinct spans
pub struct Source {
    pub interner: Interner,
    pub body: Body,
    offset: u32,
}

impl Source {
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            body: Body::new(),
            offset: 0,
        }
    }

    pub fn sym(&self, name: &str) -> Symbol {
        self.interner.intern(name)
    }

    /// Fresh one-byte span
    pub fn span(&mut self) -> FileSpan {
        let start = self.offset;
        self.offset += 1;
        FileSpan::new(FileId(0), Span::new(start, start + 1))
    }

    pub fn int(&mut self, value: u64) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Literal {
            kind: LiteralKind::Integer(value),
            span,
        })
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Literal {
            kind: LiteralKind::Float(value),
            span,
        })
    }

    pub fn string(&mut self, text: &str) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Literal {
            kind: LiteralKind::String(text.to_string()),
            span,
        })
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.sym(name);
        let span = self.span();
        self.body.alloc(Expr::Ident {
            name,
            binding: None,
            span,
        })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Binary {
            op,
            left,
            right,
            span,
        })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Unary { op, operand, span })
    }

    pub fn call(&mut self, callee: &str, args: Vec<ExprId>) -> ExprId {
        let callee = self.ident(callee);
        self.call_expr(callee, args, false)
    }

    pub fn call_expr(&mut self, callee: ExprId, args: Vec<ExprId>, spread: bool) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Call {
            callee,
            args,
            spread,
            span,
        })
    }

    pub fn index(&mut self, base: ExprId, index: ExprId) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Index { base, index, span })
    }

    pub fn composite(&mut self, ty: TypeExpr, elements: Vec<ExprId>) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::CompositeLit { ty, elements, span })
    }

    pub fn func_lit(&mut self) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::FuncLit {
            params: Vec::new(),
            result: None,
            body: BlockRef(0),
            span,
        })
    }

    pub fn paren(&mut self, inner: ExprId) -> ExprId {
        let span = self.span();
        self.body.alloc(Expr::Paren { inner, span })
    }

    pub fn named(&self, name: &str) -> TypeExpr {
        TypeExpr::Named(self.sym(name))
    }

    pub fn array_of(&self, len: u64, element: &str) -> TypeExpr {
        TypeExpr::Array {
            len,
            element: Box::new(self.named(element)),
        }
    }
}

/// Scope backed by a name table
#[derive(Default)]
pub struct TestScope {
    bindings: FxHashMap<Symbol, (Binding, LoweredValue)>,
}

impl TestScope {
    pub fn define(&mut self, name: Symbol, kind: BindingKind, value: LoweredValue) -> Binding {
        let binding = Binding {
            id: BindingId(self.bindings.len() as u32),
            name,
            kind,
        };
        self.bindings.insert(name, (binding, value));
        binding
    }
}

impl ScopeResolver for TestScope {
    fn lookup(&self, name: Symbol) -> Option<Binding> {
        self.bindings.get(&name).map(|(binding, _)| *binding)
    }

    fn resolve(&self, binding: &Binding) -> Option<LoweredValue> {
        self.bindings
            .get(&binding.name)
            .filter(|(known, _)| known.id == binding.id)
            .map(|(_, value)| value.clone())
    }
}

/// Type names
pub struct TestTypes {
    types: FxHashMap<Symbol, Type>,
}

impl TestTypes {
    /// Registers the predeclared numeric and string types
    pub fn predeclared(interner: &Interner) -> Self {
        let table = [
            ("int", Type::int(64, true)),
            ("int8", Type::int(8, true)),
            ("int32", Type::int(32, true)),
            ("int64", Type::int(64, true)),
            ("uint", Type::int(64, false)),
            ("uint8", Type::int(8, false)),
            ("uint32", Type::int(32, false)),
            ("float32", Type::Float(FloatType::F32)),
            ("float64", Type::Float(FloatType::F64)),
            ("string", Type::String),
            ("bool", Type::bool()),
        ];
        let types = table
            .into_iter()
            .map(|(name, ty)| (interner.intern(name), ty))
            .collect();
        Self { types }
    }

    pub fn define(&mut self, name: Symbol, ty: Type) {
        self.types.insert(name, ty);
    }
}

impl TypeLookup for TestTypes {
    fn type_for_identifier(&self, name: Symbol) -> Option<Type> {
        self.types.get(&name).cloned()
    }
}

/// External lowering that records what it was asked to do
#[derive(Default)]
pub struct RecordingExternal {
    pub calls: RefCell<Vec<String>>,
}

impl RecordingExternal {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl ExternalLowering for RecordingExternal {
    fn lower_builtin(
        &self,
        lowerer: &mut ExprLowerer<'_>,
        builtin: BuiltinKind,
        call: ExprId,
    ) -> LowerResult<LoweredValue> {
        self.calls.borrow_mut().push(format!("{builtin:?}"));
        let body = lowerer.body();
        let Expr::Call { args, span, .. } = &body[call] else {
            return Err(LowerError::UnsupportedCallForm {
                reason: "built-ins are only lowered from calls",
                span: body.span(call),
            });
        };

        match builtin {
            BuiltinKind::Len => {
                let value = lowerer.lower_expr(args[0])?;
                match value.ty() {
                    Type::Array { len, .. } => {
                        Ok(LoweredValue::constant(int_const(I64, i128::from(*len))))
                    }
                    other => Err(LowerError::TypeMismatch {
                        expected: "array".to_string(),
                        found: other.to_string(),
                        span: *span,
                    }),
                }
            }
            BuiltinKind::Print => {
                for arg in args {
                    let value = lowerer.lower_expr(*arg)?;
                    lowerer.use_value(value, *span)?;
                }
                Ok(LoweredValue::constant(Const::Zero(Type::Void)))
            }
        }
    }

    fn lower_func_lit(
        &self,
        _lowerer: &mut ExprLowerer<'_>,
        _expr: ExprId,
    ) -> LowerResult<LoweredValue> {
        self.calls.borrow_mut().push("FuncLit".to_string());
        let signature = FunctionType::new(Vec::new(), Type::Void);
        Ok(LoweredValue::constant(Const::Zero(
            Type::Function(signature).pointer_to(),
        )))
    }

    fn lower_composite_lit(
        &self,
        _lowerer: &mut ExprLowerer<'_>,
        _expr: ExprId,
        ty: &Type,
    ) -> LowerResult<LoweredValue> {
        self.calls.borrow_mut().push(format!("CompositeLit {ty}"));
        Ok(LoweredValue::constant(Const::Zero(ty.clone())))
    }
}

/// Host collaborators for one test
pub struct Env {
    pub scope: TestScope,
    pub types: TestTypes,
    pub external: RecordingExternal,
    pub config: LowerConfig,
}

impl Env {
    pub fn new(source: &Source) -> Self {
        Self {
            scope: TestScope::default(),
            types: TestTypes::predeclared(&source.interner),
            external: RecordingExternal::default(),
            config: LowerConfig::default(),
        }
    }

    pub fn lower(
        &self,
        source: &Source,
        builder: &mut FunctionBuilder<'_>,
        expr: ExprId,
    ) -> LowerResult<LoweredValue> {
        self.with_lowerer(source, builder, |lowerer| lowerer.lower_expr(expr))
    }

    pub fn with_lowerer<R>(
        &self,
        source: &Source,
        builder: &mut FunctionBuilder<'_>,
        run: impl FnOnce(&mut ExprLowerer<'_>) -> R,
    ) -> R {
        init_tracing();
        let context = LowerContext {
            scope: &self.scope,
            types: &self.types,
            external: &self.external,
        };
        let mut lowerer =
            ExprLowerer::new(&source.body, &source.interner, context, builder, &self.config);
        run(&mut lowerer)
    }
}

pub fn int_const(ty: IntType, value: i128) -> Const {
    Const::int(ty, value).unwrap()
}
