//! Namespace mangling and symbol scopes.
//!
//! Whirl has no module system in the target language: an imported file is
//! inlined as text, and its top-level symbols are renamed to
//! `__whirl_<namespace>_<name>` so that symbols from different files do
//! not collide. The root file has the empty namespace and keeps its names.

use std::collections::{HashMap, HashSet};

use crate::ast::Path;
use crate::builtins::is_reserved;

pub const MANGLE_PREFIX: &str = "__whirl_";

/// Top-level symbols declared by one file, keyed by source name and
/// mapped to the name they were emitted under.
pub type Exports = HashMap<String, String>;

/// Namespace for an import path: every non-alphanumeric byte becomes `_`.
pub fn path_to_namespace(path: &str) -> String {
    path.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

pub fn mangle(namespace: &str, name: &str) -> String {
    if namespace.is_empty() || is_reserved(name) {
        name.to_string()
    } else {
        format!("{MANGLE_PREFIX}{namespace}_{name}")
    }
}

/// Names visible while generating one file.
#[derive(Debug, Default)]
pub struct Scope {
    namespace: String,
    /// Enclosing blocks, innermost last. Empty at top level.
    locals: Vec<HashSet<String>>,
    own: HashSet<String>,
    imported: HashMap<String, String>,
    aliases: HashMap<String, String>,
}

impl Scope {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.locals.is_empty()
    }

    pub fn push_block(&mut self) {
        self.locals.push(HashSet::new());
    }

    pub fn pop_block(&mut self) {
        self.locals.pop();
    }

    /// Declare `name` in the innermost block, or at top level when no
    /// block is open. Returns the emitted name.
    pub fn declare(&mut self, name: &str) -> String {
        match self.locals.last_mut() {
            Some(block) => {
                block.insert(name.to_string());
            }
            None => {
                self.own.insert(name.to_string());
            }
        }
        mangle(&self.namespace, name)
    }

    /// Make an imported file's exports visible and bind its alias.
    pub fn import(&mut self, exports: Exports, namespace: &str, alias: Option<&str>) {
        self.imported.extend(exports);
        if let Some(alias) = alias {
            self.aliases
                .insert(alias.to_string(), namespace.to_string());
        }
    }

    /// Emitted name for a path reference.
    pub fn resolve(&self, path: &Path) -> String {
        let name = path.name();
        if is_reserved(name) {
            return name.to_string();
        }

        if !path.is_simple() {
            let namespace = match path.qualifier() {
                [single] => self
                    .aliases
                    .get(single)
                    .cloned()
                    .unwrap_or_else(|| single.clone()),
                qualifier => qualifier.join("_"),
            };
            return format!("{MANGLE_PREFIX}{namespace}_{name}");
        }

        let declared_here = self.locals.iter().any(|block| block.contains(name))
            || self.own.contains(name);
        if !declared_here {
            if let Some(emitted) = self.imported.get(name) {
                return emitted.clone();
            }
        }
        mangle(&self.namespace, name)
    }
}
