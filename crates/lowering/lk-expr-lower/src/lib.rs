//! Expression lowering
//!
//! Translates resolved expression trees into [`lk_ir`] instructions,
//! folding constant subexpressions along the way. Each expression lowers to
//! a [`LoweredValue`] that records whether it is a compile-time constant,
//! whether it names a storage slot that still has to be loaded, and whether
//! it refers to a global.
//!
//! Statement and declaration lowering stay outside this crate. The lowerer
//! talks to them through [`ScopeResolver`], [`TypeLookup`] and
//! [`ExternalLowering`].
//!
//! # Example
//!
//! ```ignore
//! let context = LowerContext { scope: &scope, types: &types, external: &NoExternalLowering };
//! let mut lowerer = ExprLowerer::new(&body, &interner, context, &mut builder, &config);
//! let value = lowerer.lower_expr(root)?;
//! ```

#![allow(
    clippy::multiple_inherent_impl,
    reason = "ExprLowerer routines are split by concern across modules"
)]

mod call;
mod composite;
mod config;
mod context;
mod error;
mod index;
mod lower;
mod ops;
mod reconcile;
mod value;

pub use config::{BuiltinKind, ConfigError, IndexConfig, LiteralConfig, LowerConfig};
pub use context::{ExternalLowering, LowerContext, NoExternalLowering, ScopeResolver, TypeLookup};
pub use error::{LowerError, LowerResult};
pub use lower::ExprLowerer;
pub use reconcile::Reconciled;
pub use value::{LoweredValue, Repr};
