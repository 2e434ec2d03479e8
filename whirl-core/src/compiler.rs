use std::path::Path;

use tracing::debug_span;

use crate::builtins;
use crate::codegen_c::{Context, Pipeline, generate_c};
use crate::error::CoreError;
use crate::namespace::Exports;
use crate::parser::Parser;
use crate::source::{LoadedSource, SourceLoader};

/// Full lex, parse and generate pipeline over an injected loader.
pub struct Transpiler<'a> {
    loader: &'a dyn SourceLoader,
}

impl<'a> Transpiler<'a> {
    pub fn new(loader: &'a dyn SourceLoader) -> Self {
        Self { loader }
    }
}

impl Pipeline for Transpiler<'_> {
    fn load(&self, dir: &Path, relative: &str) -> Result<LoadedSource, CoreError> {
        self.loader.load(dir, relative)
    }

    fn transpile(
        &self,
        source: &[u8],
        ctx: Context,
        out: &mut String,
    ) -> Result<Exports, CoreError> {
        let span = debug_span!("transpile", namespace = %ctx.namespace, dir = %ctx.dir.display());
        let _entered = span.enter();
        generate_c(&ctx, Parser::new(source), self, out)
    }
}

/// Transpile a root Whirl file to a complete C translation unit.
///
/// `dir` is the directory the root file's imports are resolved against.
pub fn transpile_c(
    source: &[u8],
    dir: impl AsRef<Path>,
    loader: &dyn SourceLoader,
) -> Result<String, CoreError> {
    let mut out = builtins::prelude();
    Transpiler::new(loader).transpile(source, Context::root(dir.as_ref()), &mut out)?;
    Ok(out)
}
