//! Static reference scanning.
//!
//! Extracts import specifiers from glue-layer source without a full parse.
//! The glue layer this bundler targets is thin loader code, so a pattern
//! scan over the recognized import forms is sufficient:
//!
//! - `import ... from "spec"` / `import "spec"`
//! - `export ... from "spec"`
//! - dynamic `import("spec")`
//! - `require("spec")`
//!
//! Only relative and absolute specifiers participate in graph resolution;
//! bare package specifiers are returned too and rejected later by the
//! resolver so the error can name the importing module.

use once_cell::sync::Lazy;
use regex::Regex;

static STATIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s+(?:[\w$\{\}\*,\s]+\s+from\s+)?["']([^"']+)["']"#)
        .expect("static import pattern")
});

static DYNAMIC_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s*\(\s*["']([^"']+)["']\s*\)"#).expect("dynamic import pattern")
});

static REQUIRE_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#).expect("require pattern")
});

/// Scan source text for import specifiers, in order of appearance.
///
/// Duplicate specifiers are collapsed to their first occurrence.
pub fn scan_references(source: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for re in [&*STATIC_IMPORT, &*DYNAMIC_IMPORT, &*REQUIRE_CALL] {
        for capture in re.captures_iter(source) {
            let spec = capture[1].to_string();
            if !seen.contains(&spec) {
                seen.push(spec);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_named_import() {
        let refs = scan_references(r#"import { connect } from "./session.js";"#);
        assert_eq!(refs, vec!["./session.js"]);
    }

    #[test]
    fn test_scan_default_and_named() {
        let refs = scan_references(r#"import init, { play } from "./wasm";"#);
        assert_eq!(refs, vec!["./wasm"]);
    }

    #[test]
    fn test_scan_side_effect_import() {
        let refs = scan_references(r#"import "./polyfill.js";"#);
        assert_eq!(refs, vec!["./polyfill.js"]);
    }

    #[test]
    fn test_scan_namespace_import() {
        let refs = scan_references(r#"import * as wasm from "../pkg/loader.js";"#);
        assert_eq!(refs, vec!["../pkg/loader.js"]);
    }

    #[test]
    fn test_scan_export_from() {
        let refs = scan_references(r#"export { start } from "./app";"#);
        assert_eq!(refs, vec!["./app"]);
    }

    #[test]
    fn test_scan_dynamic_import() {
        let refs = scan_references(r#"const mod = await import("./lazy.js");"#);
        assert_eq!(refs, vec!["./lazy.js"]);
    }

    #[test]
    fn test_scan_require() {
        let refs = scan_references(r#"const fs = require("./shim");"#);
        assert_eq!(refs, vec!["./shim"]);
    }

    #[test]
    fn test_scan_deduplicates() {
        let src = r#"
            import { a } from "./util.js";
            import { b } from "./util.js";
        "#;
        assert_eq!(scan_references(src), vec!["./util.js"]);
    }

    #[test]
    fn test_scan_multiple_in_order() {
        let src = r#"
            import init from "./wasm";
            import { ui } from "./ui.js";
            import("./lazy.js");
        "#;
        assert_eq!(scan_references(src), vec!["./wasm", "./ui.js", "./lazy.js"]);
    }

    #[test]
    fn test_scan_ignores_non_import_strings() {
        let refs = scan_references(r#"console.log("from the top");"#);
        assert!(refs.is_empty());
    }
}
