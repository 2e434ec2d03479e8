//! Core of the Whirl toolchain.
//!
//! Whirl source is lowered to C text in a single streaming pass:
//!
//!   source .wh
//!     -> lexer      (tokens, one token of lookahead)
//!     -> parser     (one top-level instruction at a time)
//!     -> codegen_c  (C text; imports are transpiled and spliced in place)
//!
//! The CLI depends on this crate and only adds file handling and the
//! external C toolchain invocation.

// ---------------------------------------------------------------------
// Error handling and diagnostics
// ---------------------------------------------------------------------

pub mod span;
pub mod error;

// ---------------------------------------------------------------------
// Front-end: lexing and parsing
// ---------------------------------------------------------------------

pub mod lexer;
pub mod parser;
pub mod ast;

// ---------------------------------------------------------------------
// Names: mangling, scopes and reserved symbols
// ---------------------------------------------------------------------

pub mod namespace;
pub mod builtins;

// ---------------------------------------------------------------------
// Back-end: source loading, code generation and orchestration
// ---------------------------------------------------------------------

pub mod source;
pub mod codegen_c;
pub mod compiler;

// ---------------------------------------------------------------------
// Public API re-exports
// ---------------------------------------------------------------------

pub use codegen_c::{Context, Pipeline};
pub use compiler::{Transpiler, transpile_c};
pub use error::CoreError;
pub use source::{FsLoader, LoadedSource, MemoryLoader, SourceLoader};
