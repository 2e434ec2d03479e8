//! Surface AST produced by the parser and consumed once by the code
//! generator.

use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Int,
    String,
    Bool,
    Char,
    Void,
    /// Reference to a struct declared with `struct`.
    Ident(String),
    Array(Box<Type>),
}

/// Non-empty sequence of `::`-separated identifier segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    pub fn new(first: impl Into<String>) -> Self {
        Self {
            segments: vec![first.into()],
        }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Final segment; the bare symbol name.
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// All segments but the last.
    pub fn qualifier(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Int(i64),
    Str(String),
    Bool(bool),
    /// Raw byte between the apostrophes.
    Char(u8),
    /// Captured run of operands and operator tokens, rendered verbatim.
    Math(Vec<Expr>),
    Array(Vec<Expr>),
    StructInit(StructInit),
    Call(ProcedureCall),
    Path(Path),
    /// Operator or punctuation inside a `Math` run.
    Token(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructInit {
    pub ident: String,
    pub fields: Vec<FieldInit>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInit {
    pub ident: String,
    pub expr: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureCall {
    pub path: Path,
    pub args: Vec<Expr>,
}

/// Name and type pair, used for procedure parameters and struct fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub ident: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    pub ident: String,
    pub args: Vec<Argument>,
    pub return_type: Type,
    pub body: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Procedure(Procedure),
    Assignment {
        ident: String,
        ty: Type,
        expr: Expr,
    },
    Reassign {
        target: Path,
        /// Index suffixes, outermost first; empty for plain reassignment.
        indices: Vec<Expr>,
        expr: Expr,
    },
    If {
        condition: Expr,
        body: Vec<Instruction>,
        else_body: Vec<Instruction>,
    },
    Until {
        condition: Expr,
        body: Vec<Instruction>,
    },
    Iter {
        ident: String,
        lower: Expr,
        upper: Expr,
        body: Vec<Instruction>,
    },
    Break,
    Continue,
    Escape(Expr),
    Call(ProcedureCall),
    Struct {
        path: Path,
        fields: Vec<Argument>,
    },
    Import {
        path: String,
        alias: Option<String>,
    },
}
