//! Traducir - Structural Python-to-Aiken validator transpiler
//!
//! Traducir converts validator and test definitions written in Python into
//! equivalent Aiken source text. The input is an already-parsed module AST
//! (supplied by an external Python parser, typically as JSON); the output is
//! one block of Aiken text per module, in declaration order, plus a
//! structured list of warnings for every degraded translation path.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       TRADUCIR CORE                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  ast        →   types       →   emit        →   Emitted    │
//! │  source AST     type            expression /    text +     │
//! │  definitions    resolution      statement /     warnings   │
//! │                                 declaration                │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use traducir::ast::{Expr, FunctionDef, Item, Module, Stmt};
//! use traducir::transpile;
//!
//! let module = Module {
//!     body: vec![Item::Function(FunctionDef {
//!         name: "always_true".to_string(),
//!         params: vec![],
//!         returns: Some("bool".to_string()),
//!         body: vec![Stmt::Return {
//!             value: Some(Expr::Bool(true)),
//!         }],
//!     })],
//! };
//!
//! let emitted = transpile(&module);
//! assert!(emitted.text.contains("fn always_true() -> Bool {"));
//! assert!(emitted.warnings.is_empty());
//! ```
//!
//! # Modules
//!
//! - [`ast`] - Source AST definitions (closed sum types, serde-compatible)
//! - [`types`] - Type resolution and unification
//! - [`emit`] - Expression, statement, and declaration emitters
//! - [`error`] - Error and warning types
//!
//! # Best-effort contract
//!
//! No input accepted by [`ast`] can abort the pass. Unrecognized shapes
//! render as fixed placeholders, failed idiom reconstructions fall back to
//! generic renderings, and unresolvable types degrade to `Data`; every such
//! degradation is reported in [`Emitted::warnings`].

#![forbid(unsafe_code)]

pub mod ast;
pub mod emit;
pub mod error;
pub mod types;

pub use ast::Module;
pub use emit::{transpile, Emitted};
pub use error::{Error, Result, Warning};
