//! Module source rewriting for the emitted registry.
//!
//! The emitted bundle wraps each module in a registry function with
//! `module`, `exports`, and `__kiln_require__` in scope. This rewrite maps
//! the glue layer's module syntax onto that shape. Glue layers are thin
//! loader code, so the recognized forms cover what such code uses:
//!
//! - static imports (default, named, namespace, side-effect)
//! - re-exports (`export { .. } from`, `export * from`)
//! - `export default`, `export function/class/const/let/var`, `export { }`
//! - dynamic `import()` and `require()`
//!
//! Specifiers are replaced by registry keys the caller computes (module id
//! relative to the project root).

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static IMPORT_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s*\*\s*as\s+([A-Za-z_$][\w$]*)\s+from\s*["']([^"']+)["']\s*;?"#).unwrap()
});
static IMPORT_DEFAULT_NAMED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+([A-Za-z_$][\w$]*)\s*,\s*\{([^}]*)\}\s*from\s*["']([^"']+)["']\s*;?"#)
        .unwrap()
});
static IMPORT_NAMED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s*\{([^}]*)\}\s*from\s*["']([^"']+)["']\s*;?"#).unwrap());
static IMPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s+([A-Za-z_$][\w$]*)\s+from\s*["']([^"']+)["']\s*;?"#).unwrap()
});
static IMPORT_SIDE_EFFECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"import\s*["']([^"']+)["']\s*;?"#).unwrap());
static IMPORT_DYNAMIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bimport\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap());
static REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\brequire\s*\(\s*["']([^"']+)["']\s*\)"#).unwrap());

static EXPORT_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"export\s*\{([^}]*)\}\s*from\s*["']([^"']+)["']\s*;?"#).unwrap());
static EXPORT_STAR_FROM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"export\s*\*\s*from\s*["']([^"']+)["']\s*;?"#).unwrap());
static EXPORT_DEFAULT: Lazy<Regex> = Lazy::new(|| Regex::new(r"export\s+default\s+").unwrap());
static EXPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(async\s+function|function|class|const|let|var)\s+([A-Za-z_$][\w$]*)")
        .unwrap()
});
static EXPORT_LIST: Lazy<Regex> = Lazy::new(|| Regex::new(r"export\s*\{([^}]*)\}\s*;?").unwrap());

/// Rewrite one module's source against the given specifier→key map.
pub fn rewrite_module(source: &str, keys: &HashMap<String, String>) -> String {
    let require = |spec: &str| match keys.get(spec) {
        Some(key) => format!("__kiln_require__(\"{key}\")"),
        // Unreachable after a successful walk; kept inert for safety.
        None => format!("__kiln_require__({spec:?})"),
    };

    let mut out = source.to_string();

    // Re-exports first so EXPORT_LIST doesn't swallow the `from` clause.
    out = EXPORT_STAR_FROM
        .replace_all(&out, |c: &Captures| {
            format!("Object.assign(exports, {});", require(&c[1]))
        })
        .into_owned();
    out = EXPORT_FROM
        .replace_all(&out, |c: &Captures| {
            let req = require(&c[2]);
            let assigns = parse_bindings(&c[1])
                .into_iter()
                .map(|(local, exported)| format!("exports.{exported} = {req}.{local};"))
                .collect::<Vec<_>>()
                .join(" ");
            assigns
        })
        .into_owned();

    // Imports, most specific form first.
    out = IMPORT_NAMESPACE
        .replace_all(&out, |c: &Captures| {
            format!("const {} = {};", &c[1], require(&c[2]))
        })
        .into_owned();
    out = IMPORT_DEFAULT_NAMED
        .replace_all(&out, |c: &Captures| {
            format!(
                "const {{ default: {}, {} }} = {};",
                &c[1],
                destructure(&c[2]),
                require(&c[3])
            )
        })
        .into_owned();
    out = IMPORT_NAMED
        .replace_all(&out, |c: &Captures| {
            format!("const {{ {} }} = {};", destructure(&c[1]), require(&c[2]))
        })
        .into_owned();
    out = IMPORT_DEFAULT
        .replace_all(&out, |c: &Captures| {
            format!("const {} = {}.default;", &c[1], require(&c[2]))
        })
        .into_owned();
    out = IMPORT_SIDE_EFFECT
        .replace_all(&out, |c: &Captures| format!("{};", require(&c[1])))
        .into_owned();
    out = IMPORT_DYNAMIC
        .replace_all(&out, |c: &Captures| {
            format!("Promise.resolve({})", require(&c[1]))
        })
        .into_owned();
    out = REQUIRE
        .replace_all(&out, |c: &Captures| require(&c[1]))
        .into_owned();

    // Exported declarations: strip the keyword, collect the name.
    let mut exported_names: Vec<String> = Vec::new();
    out = EXPORT_DECL
        .replace_all(&out, |c: &Captures| {
            exported_names.push(c[2].to_string());
            format!("{} {}", &c[1], &c[2])
        })
        .into_owned();
    out = EXPORT_DEFAULT.replace_all(&out, "exports.default = ").into_owned();
    out = EXPORT_LIST
        .replace_all(&out, |c: &Captures| {
            parse_bindings(&c[1])
                .into_iter()
                .map(|(local, exported)| format!("exports.{exported} = {local};"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .into_owned();

    if !exported_names.is_empty() {
        out.push('\n');
        for name in exported_names {
            out.push_str(&format!("exports.{name} = {name};\n"));
        }
    }

    out
}

/// Parse `a, b as c` into `[(local, exported)]` pairs.
fn parse_bindings(list: &str) -> Vec<(String, String)> {
    list.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            match part.split_once(" as ") {
                Some((local, exported)) => {
                    Some((local.trim().to_string(), exported.trim().to_string()))
                }
                None => Some((part.to_string(), part.to_string())),
            }
        })
        .collect()
}

/// Turn an import binding list into a destructuring pattern
/// (`a as b` becomes `a: b`).
fn destructure(list: &str) -> String {
    parse_bindings(list)
        .into_iter()
        .map(|(local, bound)| {
            if local == bound {
                local
            } else {
                format!("{local}: {bound}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(spec, key)| (spec.to_string(), key.to_string()))
            .collect()
    }

    #[test]
    fn test_rewrite_named_import() {
        let out = rewrite_module(
            r#"import { connect } from "./session.js";"#,
            &keys(&[("./session.js", "src/session.js")]),
        );
        assert_eq!(
            out,
            r#"const { connect } = __kiln_require__("src/session.js");"#
        );
    }

    #[test]
    fn test_rewrite_default_and_named() {
        let out = rewrite_module(
            r#"import init, { play as start } from "./wasm";"#,
            &keys(&[("./wasm", "pkg/demo.js")]),
        );
        assert_eq!(
            out,
            r#"const { default: init, play: start } = __kiln_require__("pkg/demo.js");"#
        );
    }

    #[test]
    fn test_rewrite_namespace_import() {
        let out = rewrite_module(
            r#"import * as wasm from "./pkg/demo_bg.wasm";"#,
            &keys(&[("./pkg/demo_bg.wasm", "pkg/demo_bg.wasm")]),
        );
        assert_eq!(out, r#"const wasm = __kiln_require__("pkg/demo_bg.wasm");"#);
    }

    #[test]
    fn test_rewrite_default_only() {
        let out = rewrite_module(
            r#"import init from "./loader.js";"#,
            &keys(&[("./loader.js", "loader.js")]),
        );
        assert_eq!(out, r#"const init = __kiln_require__("loader.js").default;"#);
    }

    #[test]
    fn test_rewrite_side_effect_import() {
        let out = rewrite_module(
            r#"import "./polyfill.js";"#,
            &keys(&[("./polyfill.js", "polyfill.js")]),
        );
        assert_eq!(out, r#"__kiln_require__("polyfill.js");"#);
    }

    #[test]
    fn test_rewrite_dynamic_import() {
        let out = rewrite_module(
            r#"const m = await import("./lazy.js");"#,
            &keys(&[("./lazy.js", "lazy.js")]),
        );
        assert_eq!(
            out,
            r#"const m = await Promise.resolve(__kiln_require__("lazy.js"));"#
        );
    }

    #[test]
    fn test_rewrite_export_default_function() {
        let out = rewrite_module("export default async function init() {}", &keys(&[]));
        assert_eq!(out, "exports.default = async function init() {}");
    }

    #[test]
    fn test_rewrite_export_function() {
        let out = rewrite_module("export function play() {}", &keys(&[]));
        assert_eq!(out, "function play() {}\nexports.play = play;\n");
    }

    #[test]
    fn test_rewrite_export_const() {
        let out = rewrite_module("export const VERSION = 3;", &keys(&[]));
        assert_eq!(out, "const VERSION = 3;\nexports.VERSION = VERSION;\n");
    }

    #[test]
    fn test_rewrite_export_list_with_alias() {
        let out = rewrite_module("const a = 1;\nexport { a as alpha };", &keys(&[]));
        assert_eq!(out, "const a = 1;\nexports.alpha = a;");
    }

    #[test]
    fn test_rewrite_export_from() {
        let out = rewrite_module(
            r#"export { start } from "./app.js";"#,
            &keys(&[("./app.js", "app.js")]),
        );
        assert_eq!(out, r#"exports.start = __kiln_require__("app.js").start;"#);
    }

    #[test]
    fn test_rewrite_export_star_from() {
        let out = rewrite_module(
            r#"export * from "./util.js";"#,
            &keys(&[("./util.js", "util.js")]),
        );
        assert_eq!(
            out,
            r#"Object.assign(exports, __kiln_require__("util.js"));"#
        );
    }

    #[test]
    fn test_rewrite_leaves_plain_code_alone() {
        let src = "const x = 1;\nconsole.log(x);\n";
        assert_eq!(rewrite_module(src, &keys(&[])), src);
    }
}
