//! Lowering errors

use codespan_reporting::diagnostic::{Diagnostic as CodespanDiagnostic, Label};
use lk_ir::IrError;
use lk_span::FileSpan;
use miette::Diagnostic;
use thiserror::Error;

/// Result alias for lowering routines
pub type LowerResult<T> = Result<T, LowerError>;

/// Errors that abort lowering of the enclosing expression
///
/// Every variant carries the span of the syntax node that raised it so the
/// driver can report the failure at its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum LowerError {
    /// Binary or unary operator outside the supported set
    #[error("unsupported operator `{op}`")]
    #[diagnostic(
        code(lower::unsupported_operator),
        help("only `*`, `/`, `+`, `-`, `==`, `<` and unary `-`/`+` are lowered")
    )]
    UnsupportedOperator {
        /// Operator spelling
        op: &'static str,
        /// Location of the operation
        span: FileSpan,
    },

    /// Identifier with no resolvable binding
    #[error("undefined: {name}")]
    #[diagnostic(code(lower::unresolved_symbol))]
    UnresolvedSymbol {
        /// Identifier text
        name: String,
        /// Location of the identifier
        span: FileSpan,
    },

    /// Constant not representable in the required type, or non-integer index
    #[error("type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(lower::type_mismatch))]
    TypeMismatch {
        /// Required type
        expected: String,
        /// Offending value or type
        found: String,
        /// Location of the expression
        span: FileSpan,
    },

    /// Index base is not a fixed-size array
    #[error("cannot index a value of type {target}")]
    #[diagnostic(
        code(lower::unsupported_index_target),
        help("only fixed-size arrays and pointers to arrays can be indexed")
    )]
    UnsupportedIndexTarget {
        /// Type of the indexed value
        target: String,
        /// Location of the index expression
        span: FileSpan,
    },

    /// Syntax node kind with no lowering routine
    #[error("unhandled expression kind: {kind}")]
    #[diagnostic(code(lower::unsupported_expression))]
    UnsupportedExpressionKind {
        /// Node kind
        kind: &'static str,
        /// Location of the node
        span: FileSpan,
    },

    /// Call through a non-identifier callee or with spread arguments
    #[error("unsupported call: {reason}")]
    #[diagnostic(code(lower::unsupported_call))]
    UnsupportedCallForm {
        /// What made the call unsupported
        reason: &'static str,
        /// Location of the call
        span: FileSpan,
    },

    /// Global constant used as a value but declared without initializer
    #[error("global constant has no initializer")]
    #[diagnostic(code(lower::missing_initializer))]
    MissingInitializer {
        /// Location of the use
        span: FileSpan,
    },

    /// Error reported by the IR while folding or emitting
    #[error("{source}")]
    #[diagnostic(code(lower::backend))]
    Backend {
        /// Underlying IR error
        source: IrError,
        /// Location of the expression being lowered
        span: FileSpan,
    },
}

impl LowerError {
    /// Returns the span where the error occurred
    #[must_use]
    pub fn span(&self) -> FileSpan {
        match self {
            Self::UnsupportedOperator { span, .. }
            | Self::UnresolvedSymbol { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::UnsupportedIndexTarget { span, .. }
            | Self::UnsupportedExpressionKind { span, .. }
            | Self::UnsupportedCallForm { span, .. }
            | Self::MissingInitializer { span }
            | Self::Backend { span, .. } => *span,
        }
    }

    /// Wraps an IR error with the span of the expression that triggered it
    pub fn backend(source: IrError, span: FileSpan) -> Self {
        Self::Backend { source, span }
    }

    /// Convert to codespan diagnostic for rustc-style output
    pub fn to_codespan_diagnostic(&self, file_id: usize) -> CodespanDiagnostic<usize> {
        let label = match self {
            Self::UnsupportedOperator { .. } => "operator not supported here",
            Self::UnresolvedSymbol { .. } => "not found in this scope",
            Self::TypeMismatch { .. } => "mismatched types",
            Self::UnsupportedIndexTarget { .. } => "cannot be indexed",
            Self::UnsupportedExpressionKind { .. } => "cannot be lowered",
            Self::UnsupportedCallForm { .. } => "unsupported call",
            Self::MissingInitializer { .. } => "used here",
            Self::Backend { .. } => "while lowering this expression",
        };

        let diagnostic = CodespanDiagnostic::error()
            .with_message(self.to_string())
            .with_labels(vec![
                Label::primary(file_id, self.span().range()).with_message(label),
            ]);

        match self {
            Self::UnsupportedIndexTarget { .. } => diagnostic.with_notes(vec![
                "map, string and slice indexing are not lowered yet".to_string(),
            ]),
            _ => diagnostic,
        }
    }
}
