use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use whirl_core::{FsLoader, transpile_c};

fn programs_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/programs")
}

fn transpile_fixture(name: &str) -> String {
    let path = programs_root().join(name);
    let source = fs::read(&path).expect("read fixture");
    transpile_c(&source, programs_root(), &FsLoader).expect("transpile fixture")
}

#[test]
fn every_program_transpiles() {
    let mut seen = 0;
    // Files under lib/ are only reached through imports.
    for entry in WalkDir::new(programs_root()).max_depth(1).sort_by_file_name() {
        let entry = entry.expect("walk programs");
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("wh") {
            continue;
        }

        let source = fs::read(path).expect("read program");
        let dir = path.parent().expect("program directory");
        let c = transpile_c(&source, dir, &FsLoader)
            .unwrap_or_else(|err| panic!("{}: {err}", path.display()));
        assert!(
            c.contains("int main() {"),
            "{}: no entry point in\n{c}",
            path.display()
        );
        seen += 1;
    }
    assert!(seen >= 5, "only {seen} programs found");
}

#[test]
fn arrays_program() {
    let c = transpile_fixture("arrays.wh");
    assert!(c.contains("int sum(int xs[], int len) {"));
    assert!(c.contains("        for (int i = 0; i < len; i++) {\n            total = total + xs[i];\n        }\n"));
    assert!(c.contains("    a[0] = 10;\n"));
    assert!(c.contains("    printf(\"%d\\n\", sum(a, 5));\n"));
    assert!(c.contains("    return a[2];\n"));
}

#[test]
fn loops_program() {
    let c = transpile_fixture("loops.wh");
    assert!(c.contains("    while (!(n >= 10)) {\n"));
    assert!(c.contains(
        "        if (n % 2 == 0) {\n            continue;\n        } else {\n            if (n == 7) {\n                break;\n            }\n        }\n"
    ));
}

#[test]
fn structs_program() {
    let c = transpile_fixture("structs.wh");
    assert!(c.contains("struct Point {\n    int x;\n    int y;\n};\n"));
    assert!(c.contains("int area(struct Point p) {\n    return p.x * p.y;\n}"));
    assert!(c.contains("    struct Point p = { .x = 3, .y = 4 };\n"));
    assert!(c.contains("    char* label = \"area\";\n"));
    assert!(c.contains("    bool ok = true;\n"));
}

#[test]
fn imports_program() {
    let c = transpile_fixture("imports.wh");

    let util = c.find("int __whirl_util_wh_twice(int __whirl_util_wh_n) {").expect("util inlined");
    let math = c.find("int __whirl_lib_math_wh_max(").expect("math inlined");
    let main = c.find("int main() {").expect("entry point");
    assert!(util < math && math < main);

    assert!(c.contains("    return __whirl_util_wh_twice(__whirl_lib_math_wh_n) * __whirl_lib_math_wh_n / 2;\n"));
    assert!(c.contains("    int best = __whirl_lib_math_wh_max(3, 7);\n"));
    assert!(c.contains("    return best - __whirl_lib_math_wh_square(2) + 1;\n"));
}
