//! C code generation.
//!
//! Instructions are rendered one at a time, in source order, into a
//! single output buffer. An `import` is not turned into an `#include`:
//! the imported file is run through the whole pipeline again under its
//! own namespace and its output is spliced in at the import's position.

use std::fmt::{self, Write as _};
use std::path::{Path as FsPath, PathBuf};

use tracing::{debug, trace};

use crate::ast::{Argument, Expr, Instruction, Path, Procedure, ProcedureCall, StructInit, Type};
use crate::error::CoreError;
use crate::lexer::TokenKind;
use crate::namespace::{Exports, Scope, path_to_namespace};
use crate::source::{LoadedSource, normalize};

const INDENT: &str = "    ";

/// Per-file generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Mangling prefix; empty for the root file.
    pub namespace: String,
    /// Directory this file's imports are resolved against.
    pub dir: PathBuf,
    /// Normalized paths of the imports currently being inlined, outermost
    /// first. Empty for the root file.
    pub chain: Vec<PathBuf>,
}

impl Context {
    pub fn new(namespace: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            namespace: namespace.into(),
            dir: dir.into(),
            chain: Vec::new(),
        }
    }

    pub fn root(dir: impl Into<PathBuf>) -> Self {
        Self::new(String::new(), dir)
    }
}

/// Re-entry into the full pipeline, used to inline imports.
pub trait Pipeline {
    fn load(&self, dir: &FsPath, relative: &str) -> Result<LoadedSource, CoreError>;

    /// Lex, parse and render `source` under `ctx`, appending to `out`.
    fn transpile(&self, source: &[u8], ctx: Context, out: &mut String)
    -> Result<Exports, CoreError>;
}

/// Render every instruction into `out` and return the file's top-level
/// symbols.
pub fn generate_c<I>(
    ctx: &Context,
    instructions: I,
    pipeline: &dyn Pipeline,
    out: &mut String,
) -> Result<Exports, CoreError>
where
    I: IntoIterator<Item = Result<Instruction, CoreError>>,
{
    let mut generator = CGenerator {
        ctx,
        pipeline,
        out,
        scope: Scope::new(ctx.namespace.clone()),
        exports: Exports::new(),
        indent: 0,
    };
    for instruction in instructions {
        let instruction = instruction?;
        trace!(?instruction, "rendering");
        generator.emit(instruction)?;
    }
    Ok(generator.exports)
}

struct CGenerator<'a> {
    ctx: &'a Context,
    pipeline: &'a dyn Pipeline,
    out: &'a mut String,
    scope: Scope,
    exports: Exports,
    indent: usize,
}

impl CGenerator<'_> {
    fn emit(&mut self, instruction: Instruction) -> Result<(), CoreError> {
        match instruction {
            Instruction::Procedure(procedure) => self.emit_procedure(procedure),
            Instruction::Assignment { ident, ty, expr } => {
                let value = self.expr(&expr);
                let name = self.declare(&ident);
                let declaration = self.declaration(&ty, &name);
                self.line(format_args!("{declaration} = {value};"))
            }
            Instruction::Reassign {
                target,
                indices,
                expr,
            } => {
                let mut lvalue = self.scope.resolve(&target);
                for index in &indices {
                    let index = self.expr(index);
                    write!(lvalue, "[{index}]")?;
                }
                let value = self.expr(&expr);
                self.line(format_args!("{lvalue} = {value};"))
            }
            Instruction::If {
                condition,
                body,
                else_body,
            } => {
                let condition = self.expr(&condition);
                self.line(format_args!("if ({condition}) {{"))?;
                self.emit_block(body)?;
                if !else_body.is_empty() {
                    self.line("} else {")?;
                    self.emit_block(else_body)?;
                }
                self.line("}")
            }
            Instruction::Until { condition, body } => {
                let condition = self.expr(&condition);
                self.line(format_args!("while (!({condition})) {{"))?;
                self.emit_block(body)?;
                self.line("}")
            }
            Instruction::Iter {
                ident,
                lower,
                upper,
                body,
            } => {
                let lower = self.expr(&lower);
                let upper = self.expr(&upper);
                self.scope.push_block();
                let var = self.scope.declare(&ident);
                self.line(format_args!(
                    "for (int {var} = {lower}; {var} < {upper}; {var}++) {{"
                ))?;
                self.emit_block(body)?;
                self.scope.pop_block();
                self.line("}")
            }
            Instruction::Break => self.line("break;"),
            Instruction::Continue => self.line("continue;"),
            Instruction::Escape(expr) => {
                let value = self.expr(&expr);
                self.line(format_args!("return {value};"))
            }
            Instruction::Call(call) => {
                let call = self.call(&call);
                self.line(format_args!("{call};"))
            }
            Instruction::Struct { path, fields } => self.emit_struct(&path, &fields),
            Instruction::Import { path, alias } => self.emit_import(&path, alias.as_deref()),
        }
    }

    fn emit_procedure(&mut self, procedure: Procedure) -> Result<(), CoreError> {
        let name = self.declare(&procedure.ident);
        let return_type = self.c_type(&procedure.return_type);

        self.scope.push_block();
        let params = procedure
            .args
            .iter()
            .map(|arg| {
                let param = self.scope.declare(&arg.ident);
                self.declaration(&arg.ty, &param)
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.line(format_args!("{return_type} {name}({params}) {{"))?;
        self.emit_block(procedure.body)?;
        self.scope.pop_block();
        self.line("}")?;
        self.blank_line();
        Ok(())
    }

    fn emit_struct(&mut self, path: &Path, fields: &[Argument]) -> Result<(), CoreError> {
        let name = if path.is_simple() {
            self.declare(path.name())
        } else {
            self.scope.resolve(path)
        };

        self.line(format_args!("struct {name} {{"))?;
        self.indent += 1;
        for field in fields {
            let declaration = self.declaration(&field.ty, &field.ident);
            self.line(format_args!("{declaration};"))?;
        }
        self.indent -= 1;
        self.line("};")?;
        self.blank_line();
        Ok(())
    }

    /// Inline the imported file. Each import is transpiled afresh, so
    /// importing the same file twice emits its declarations twice. A file
    /// that is already on the import chain is a cycle.
    fn emit_import(&mut self, path: &str, alias: Option<&str>) -> Result<(), CoreError> {
        let namespace = path_to_namespace(path);
        let source = self.pipeline.load(&self.ctx.dir, path)?;
        let resolved = normalize(&source.path);
        if self.ctx.chain.contains(&resolved) {
            return Err(CoreError::ImportCycle { path: resolved });
        }
        debug!(
            import = path,
            namespace = %namespace,
            resolved = %source.path.display(),
            "inlining import"
        );

        let dir = source
            .path
            .parent()
            .map(FsPath::to_path_buf)
            .unwrap_or_default();
        let mut child = Context::new(namespace.clone(), dir);
        child.chain = self.ctx.chain.clone();
        child.chain.push(resolved);

        let exports = self.pipeline.transpile(&source.contents, child, self.out)?;
        self.scope.import(exports, &namespace, alias);
        Ok(())
    }

    fn emit_block(&mut self, body: Vec<Instruction>) -> Result<(), CoreError> {
        self.indent += 1;
        self.scope.push_block();
        for instruction in body {
            self.emit(instruction)?;
        }
        self.scope.pop_block();
        self.indent -= 1;
        Ok(())
    }

    /// Declare a name in the current scope, exporting it when it is a
    /// top-level declaration.
    fn declare(&mut self, ident: &str) -> String {
        let top_level = self.scope.is_top_level();
        let emitted = self.scope.declare(ident);
        if top_level {
            self.exports.insert(ident.to_string(), emitted.clone());
        }
        emitted
    }

    fn c_type(&self, ty: &Type) -> String {
        match ty {
            Type::Int => "int".to_string(),
            Type::String => "char*".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Char => "char".to_string(),
            Type::Void => "void".to_string(),
            Type::Ident(name) => format!("struct {}", self.scope.resolve(&Path::new(name.as_str()))),
            Type::Array(element) => format!("{}*", self.c_type(element)),
        }
    }

    /// `<type> <name>`, with array brackets attached to the name.
    fn declaration(&self, ty: &Type, name: &str) -> String {
        let mut base = ty;
        let mut brackets = String::new();
        while let Type::Array(element) = base {
            brackets.push_str("[]");
            base = element;
        }
        format!("{} {name}{brackets}", self.c_type(base))
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Int(value) => value.to_string(),
            Expr::Str(text) => format!("\"{text}\""),
            Expr::Bool(value) => value.to_string(),
            Expr::Char(byte) => format!("'{}'", byte.escape_ascii()),
            Expr::Math(parts) => self.math(parts),
            Expr::Array(items) => format!("{{{}}}", self.join(items)),
            Expr::StructInit(init) => self.struct_init(init),
            Expr::Call(call) => self.call(call),
            Expr::Path(path) => self.scope.resolve(path),
            Expr::Token(token) => token.value.clone(),
        }
    }

    /// Captured run, space-separated except around brackets and `.`.
    fn math(&self, parts: &[Expr]) -> String {
        let mut text = String::new();
        let mut previous: Option<&Expr> = None;
        for part in parts {
            if let Some(previous) = previous {
                if !binds_right(previous) && !binds_left(part) {
                    text.push(' ');
                }
            }
            text.push_str(&self.expr(part));
            previous = Some(part);
        }
        text
    }

    fn struct_init(&self, init: &StructInit) -> String {
        if init.fields.is_empty() {
            return "{0}".to_string();
        }
        let fields = init
            .fields
            .iter()
            .map(|field| format!(".{} = {}", field.ident, self.expr(&field.expr)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{ {fields} }}")
    }

    fn call(&self, call: &ProcedureCall) -> String {
        format!("{}({})", self.scope.resolve(&call.path), self.join(&call.args))
    }

    fn join(&self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|expr| self.expr(expr))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn line(&mut self, text: impl fmt::Display) -> Result<(), CoreError> {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
        writeln!(self.out, "{text}")?;
        Ok(())
    }

    /// Separates top-level definitions.
    fn blank_line(&mut self) {
        if self.indent == 0 {
            self.out.push('\n');
        }
    }
}

fn token_kind(expr: &Expr) -> Option<TokenKind> {
    match expr {
        Expr::Token(token) => Some(token.kind),
        _ => None,
    }
}

/// Parts that glue to whatever follows them.
fn binds_right(expr: &Expr) -> bool {
    matches!(
        token_kind(expr),
        Some(TokenKind::LParen | TokenKind::LBracket | TokenKind::Dot)
    )
}

/// Parts that glue to whatever precedes them.
fn binds_left(expr: &Expr) -> bool {
    matches!(
        token_kind(expr),
        Some(
            TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::LBracket
                | TokenKind::Dot
                | TokenKind::Comma
        )
    )
}
