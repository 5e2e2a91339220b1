//! Expression syntax tree
//!
//! The parser produces one [`Body`] per function or initializer. Expressions
//! are allocated in an arena and refer to each other through [`ExprId`].
//! Identifiers may already carry a [`Binding`] when the parser's scope pass
//! could resolve them; otherwise the lowering looks them up by name.

use la_arena::{Arena, Idx};
use lk_intern::Symbol;
use lk_span::FileSpan;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Expression node ID
pub type ExprId = Idx<Expr>;

/// Unique ID of a declared object (constant, variable, function or type)
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct BindingId(pub u32);

/// What kind of object a binding names
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum BindingKind {
    /// Named constant
    Const,
    /// Variable (local, parameter or package-level)
    Var,
    /// Function declaration
    Func,
    /// Type name
    Type,
}

/// A resolved reference to a declared object
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub struct Binding {
    /// Declaration id, meaningful to the scope resolver only
    pub id: BindingId,
    /// Declared name
    pub name: Symbol,
    /// Object kind
    pub kind: BindingKind,
}

/// Opaque handle to a statement block owned by the statement lowering
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct BlockRef(pub u32);

/// Literal kinds, already decoded by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralKind {
    /// Integer literal (always non-negative; negation is a unary expression)
    Integer(u64),
    /// Floating-point literal
    Float(f64),
    /// Rune literal
    Char(char),
    /// String literal
    String(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Sub,
    /// Multiplication (*)
    Mul,
    /// Division (/)
    Quo,
    /// Remainder (%)
    Rem,
    /// Bitwise AND (&)
    And,
    /// Bitwise OR (|)
    Or,
    /// Bitwise XOR (^)
    Xor,
    /// Left shift (<<)
    Shl,
    /// Right shift (>>)
    Shr,
    /// Bit clear (&^)
    AndNot,
    /// Logical AND (&&)
    LogicalAnd,
    /// Logical OR (||)
    LogicalOr,
    /// Equality (==)
    Eq,
    /// Inequality (!=)
    Ne,
    /// Less than (<)
    Lt,
    /// Greater than (>)
    Gt,
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
}

impl BinaryOp {
    /// Source spelling of the operator
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::AndNot => "&^",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Negation (-x)
    Neg,
    /// Unary plus (+x)
    Plus,
    /// Logical NOT (!x)
    Not,
    /// Bitwise complement (^x)
    Complement,
    /// Address-of (&x)
    AddrOf,
    /// Channel receive (<-x)
    Recv,
}

impl UnaryOp {
    /// Source spelling of the operator
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::Complement => "^",
            Self::AddrOf => "&",
            Self::Recv => "<-",
        }
    }
}

/// Type expressions as written in source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Named type (`int32`, `Point`)
    Named(Symbol),
    /// Fixed-size array (`[N]T`)
    Array {
        /// Number of elements
        len: u64,
        /// Element type
        element: Box<TypeExpr>,
    },
    /// Slice (`[]T`)
    Slice(Box<TypeExpr>),
    /// Map (`map[K]V`)
    Map {
        /// Key type
        key: Box<TypeExpr>,
        /// Value type
        value: Box<TypeExpr>,
    },
    /// Pointer (`*T`)
    Pointer(Box<TypeExpr>),
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal {
        /// Literal kind
        kind: LiteralKind,
        /// Source location
        span: FileSpan,
    },
    /// Identifier
    Ident {
        /// Identifier text
        name: Symbol,
        /// Binding found by the parser's scope pass, if any
        binding: Option<Binding>,
        /// Source location
        span: FileSpan,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: ExprId,
        /// Right operand
        right: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Function literal (closure)
    FuncLit {
        /// Parameter names and types
        params: Vec<(Symbol, TypeExpr)>,
        /// Result type
        result: Option<TypeExpr>,
        /// Function body
        body: BlockRef,
        /// Source location
        span: FileSpan,
    },
    /// Composite literal (`[3]int{1, 2, 3}`)
    CompositeLit {
        /// Literal type
        ty: TypeExpr,
        /// Element expressions in order
        elements: Vec<ExprId>,
        /// Source location
        span: FileSpan,
    },
    /// Function call or conversion
    Call {
        /// Callee expression
        callee: ExprId,
        /// Arguments
        args: Vec<ExprId>,
        /// Whether the last argument is spread (`f(xs...)`)
        spread: bool,
        /// Source location
        span: FileSpan,
    },
    /// Index expression (`base[index]`)
    Index {
        /// Indexed expression
        base: ExprId,
        /// Index expression
        index: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Parenthesized expression
    Paren {
        /// Inner expression
        inner: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Field or package selector (`x.f`)
    Selector {
        /// Selected-from expression
        base: ExprId,
        /// Selected name
        field: Symbol,
        /// Source location
        span: FileSpan,
    },
    /// Slice expression (`x[lo:hi]`)
    Slice {
        /// Sliced expression
        base: ExprId,
        /// Lower bound
        low: Option<ExprId>,
        /// Upper bound
        high: Option<ExprId>,
        /// Source location
        span: FileSpan,
    },
    /// Type assertion (`x.(T)`)
    TypeAssert {
        /// Asserted expression
        base: ExprId,
        /// Asserted type, `None` in a type switch
        ty: Option<TypeExpr>,
        /// Source location
        span: FileSpan,
    },
    /// Pointer dereference (`*x`)
    Star {
        /// Dereferenced expression
        operand: ExprId,
        /// Source location
        span: FileSpan,
    },
    /// Key/value pair inside a composite literal
    KeyValue {
        /// Key expression
        key: ExprId,
        /// Value expression
        value: ExprId,
        /// Source location
        span: FileSpan,
    },
}

impl Expr {
    /// Source location of the expression
    pub fn span(&self) -> FileSpan {
        match self {
            Self::Literal { span, .. }
            | Self::Ident { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::FuncLit { span, .. }
            | Self::CompositeLit { span, .. }
            | Self::Call { span, .. }
            | Self::Index { span, .. }
            | Self::Paren { span, .. }
            | Self::Selector { span, .. }
            | Self::Slice { span, .. }
            | Self::TypeAssert { span, .. }
            | Self::Star { span, .. }
            | Self::KeyValue { span, .. } => *span,
        }
    }

    /// Human-readable node kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal { .. } => "literal",
            Self::Ident { .. } => "identifier",
            Self::Binary { .. } => "binary expression",
            Self::Unary { .. } => "unary expression",
            Self::FuncLit { .. } => "function literal",
            Self::CompositeLit { .. } => "composite literal",
            Self::Call { .. } => "call expression",
            Self::Index { .. } => "index expression",
            Self::Paren { .. } => "parenthesized expression",
            Self::Selector { .. } => "selector expression",
            Self::Slice { .. } => "slice expression",
            Self::TypeAssert { .. } => "type assertion",
            Self::Star { .. } => "dereference",
            Self::KeyValue { .. } => "key/value pair",
        }
    }
}

/// Expressions of one function body or initializer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    /// Expression arena
    pub exprs: Arena<Expr>,
}

impl Body {
    /// Creates an empty body
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an expression and returns its id
    pub fn alloc(&mut self, expr: Expr) -> ExprId {
        self.exprs.alloc(expr)
    }

    /// Source location of an expression
    pub fn span(&self, id: ExprId) -> FileSpan {
        self.exprs[id].span()
    }
}

impl Index<ExprId> for Body {
    type Output = Expr;

    fn index(&self, index: ExprId) -> &Self::Output {
        &self.exprs[index]
    }
}
