//! Multi-source textual linker
//!
//! Combines a named set of sources into one self-contained program text
//! before any parsing happens. Three strategies, tried in order:
//!
//! 1. parameterized imports: `use Module { paramExpr }::{names};` — the
//!    parameter expression is evaluated, the used source's `in let x`
//!    placeholders become `let x = <value>;` (deduplicated by name and
//!    value), and the named exports are spliced in;
//! 2. namespaced imports: `use Module::{names};` — the named exports are
//!    spliced in;
//! 3. plain concatenation of every non-main source ahead of the main one.
//!
//! Exports are statements of the form `out let|fn|type|struct name ...;`.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;

/// Linker errors, disjoint from the interpreter's
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("missing source: {name}")]
    MissingSource { name: String },

    #[error("export not found: {name} in {module}")]
    MissingExport { name: String, module: String },

    #[error("invalid use parameter: {message}")]
    BadParameter { message: String },
}

static USE_PARAMETERIZED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)use\s+([A-Za-z_]\w*)\s*\{([^}]*)\}\s*::\s*\{\s*([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s*\}\s*;\s*",
    )
    .expect("valid regex")
});
static USE_NAMESPACED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)use\s+([A-Za-z_]\w*)\s*::\s*\{\s*([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s*\}\s*;\s*",
    )
    .expect("valid regex")
});
static IN_LET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\bin\s+let\s+([A-Za-z_]\w*)").expect("valid regex"));
static EXPORT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:let|fn|type|struct)\s+([A-Za-z_]\w*)").expect("valid regex"));

/// Combine the named sources into one program text, treating `main_name`
/// as the entry source
pub fn combine(main_name: &str, sources: &HashMap<String, String>) -> Result<String, LinkError> {
    let main_code = sources.get(main_name).ok_or_else(|| LinkError::MissingSource {
        name: main_name.to_string(),
    })?;

    if let Some(combined) = combine_parameterized(main_code, sources)? {
        return Ok(combined);
    }
    if let Some(combined) = combine_namespaced(main_code, sources)? {
        return Ok(combined);
    }
    Ok(combine_simple(main_name, main_code, sources))
}

fn combine_parameterized(
    main_code: &str,
    sources: &HashMap<String, String>,
) -> Result<Option<String>, LinkError> {
    if !USE_PARAMETERIZED.is_match(main_code) {
        return Ok(None);
    }

    let mut spliced = String::new();
    let mut initializations = String::new();
    let mut seen_params: HashSet<String> = HashSet::new();

    for captures in USE_PARAMETERIZED.captures_iter(main_code) {
        let source_key = &captures[1];
        let param_expr = captures[2].trim();
        let names = &captures[3];
        let source_code = sources
            .get(source_key)
            .ok_or_else(|| LinkError::MissingSource {
                name: source_key.to_string(),
            })?;

        // the parameter expression runs as its own little program
        let param_value =
            crate::interpret(param_expr).map_err(|e| LinkError::BadParameter {
                message: e.to_string(),
            })?;

        for placeholder in IN_LET.captures_iter(source_code) {
            let var_name = &placeholder[1];
            let key = format!("{var_name}_{param_value}");
            if seen_params.insert(key) {
                initializations.push_str(&format!("let {var_name} = {param_value};\n"));
            }
        }

        let cleaned = IN_LET.replace_all(source_code, "let $1");
        splice_exports(&cleaned, source_key, names, &mut spliced)?;
    }

    let cleaned_main = USE_PARAMETERIZED.replace_all(main_code, "");
    Ok(Some(format!("{initializations}{spliced}{cleaned_main}")))
}

fn combine_namespaced(
    main_code: &str,
    sources: &HashMap<String, String>,
) -> Result<Option<String>, LinkError> {
    if !USE_NAMESPACED.is_match(main_code) {
        return Ok(None);
    }

    let mut spliced = String::new();
    for captures in USE_NAMESPACED.captures_iter(main_code) {
        let source_key = &captures[1];
        let names = &captures[2];
        let source_code = sources
            .get(source_key)
            .ok_or_else(|| LinkError::MissingSource {
                name: source_key.to_string(),
            })?;
        splice_exports(source_code, source_key, names, &mut spliced)?;
    }

    let cleaned_main = USE_NAMESPACED.replace_all(main_code, "");
    Ok(Some(format!("{spliced}{cleaned_main}")))
}

/// Collect the `out`-prefixed declarations of `source_code` and append the
/// requested ones to `out`
fn splice_exports(
    source_code: &str,
    source_key: &str,
    names: &str,
    out: &mut String,
) -> Result<(), LinkError> {
    let mut exports: HashMap<String, String> = HashMap::new();
    for part in source_code.split(';') {
        let part = part.trim();
        let Some(decl) = part.strip_prefix("out ") else {
            continue;
        };
        let decl = decl.trim();
        if let Some(captures) = EXPORT_NAME.captures(decl) {
            exports.insert(captures[1].to_string(), format!("{decl};\n"));
        }
    }

    for name in names.split(',').map(str::trim) {
        let decl = exports.get(name).ok_or_else(|| LinkError::MissingExport {
            name: name.to_string(),
            module: source_key.to_string(),
        })?;
        out.push_str(decl);
    }
    Ok(())
}

fn combine_simple(main_name: &str, main_code: &str, sources: &HashMap<String, String>) -> String {
    let mut combined = String::new();
    let mut keys: Vec<&String> = sources.keys().filter(|k| *k != main_name).collect();
    keys.sort();
    for key in keys {
        let code = &sources[key];
        if code.is_empty() {
            continue;
        }
        combined.push_str(code);
        if !code.ends_with(';') && !code.ends_with('}') && !code.ends_with("}\n") {
            combined.push_str(";\n");
        }
    }
    combined.push_str(main_code);
    combined
}
