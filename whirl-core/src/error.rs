use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::span::Position;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("lex error at {position}: {message}")]
    Lex { position: Position, message: String },
    #[error("syntax error at {position}: expected {expected}, found {found}")]
    Syntax {
        expected: String,
        found: String,
        position: Position,
    },
    #[error(
        "struct mismatch at {position}: declared type `{expected}` is initialized with `struct {found}`"
    )]
    StructMismatch {
        expected: String,
        found: String,
        position: Position,
    },
    #[error("failed to resolve import {}: {source}", path.display())]
    ImportResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("import cycle: {} is already being imported", path.display())]
    ImportCycle { path: PathBuf },
    #[error("invalid integer literal `{literal}` at {position}")]
    InvalidLiteral { literal: String, position: Position },
    #[error("failed to write generated code")]
    Emit(#[from] fmt::Error),
}
