//! Reserved names known to the code generator.
//!
//! A reserved name is emitted verbatim in every namespace: the program
//! entry point, and C builtins that Whirl code calls directly. Builtins
//! carry the header that must be included for the call to compile.

/// Why a name is exempt from mangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservedKind {
    /// Entry point the C toolchain starts from.
    EntryPoint,
    /// Function provided by the C standard library.
    Builtin,
}

/// Metadata about a single reserved symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservedName {
    pub name: &'static str,
    /// Header declaring the symbol, if any.
    pub header: Option<&'static str>,
    pub kind: ReservedKind,
}

pub const RESERVED: &[ReservedName] = &[
    ReservedName {
        name: "main",
        header: None,
        kind: ReservedKind::EntryPoint,
    },
    ReservedName {
        name: "printf",
        header: Some("stdio.h"),
        kind: ReservedKind::Builtin,
    },
];

/// Headers every translation unit needs regardless of the builtins used.
const BASE_HEADERS: &[&str] = &["stdbool.h"];

pub fn find_reserved(name: &str) -> Option<&'static ReservedName> {
    RESERVED.iter().find(|reserved| reserved.name == name)
}

pub fn is_reserved(name: &str) -> bool {
    find_reserved(name).is_some()
}

/// `#include` block that opens the root translation unit.
pub fn prelude() -> String {
    let mut text = String::new();
    let headers = BASE_HEADERS
        .iter()
        .copied()
        .chain(RESERVED.iter().filter_map(|reserved| reserved.header));
    for header in headers {
        text.push_str("#include <");
        text.push_str(header);
        text.push_str(">\n");
    }
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_point_and_print_are_reserved() {
        assert_eq!(
            find_reserved("main").map(|r| r.kind),
            Some(ReservedKind::EntryPoint)
        );
        assert_eq!(
            find_reserved("printf").map(|r| r.kind),
            Some(ReservedKind::Builtin)
        );
        assert!(!is_reserved("helper"));
    }

    #[test]
    fn prelude_includes_builtin_headers() {
        assert_eq!(prelude(), "#include <stdbool.h>\n#include <stdio.h>\n\n");
    }
}
