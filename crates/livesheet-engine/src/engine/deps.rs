//! Free variable extraction from formula strings.
//!
//! Scans formula text for identifiers that must be resolved against the
//! sheet scope. This is what a cell subscribes to.
//!
//! Skips:
//! - Function calls: `sqrt(x)` contributes `x`, never `sqrt`
//! - Property and method access: `x.abs()` contributes `x` only
//! - Reserved built-in names: keywords, constants like `pi`, math functions
//! - Anything inside string literals

use regex::Regex;
use std::sync::OnceLock;

use crate::builtins::is_reserved;

/// Collect the free variables of a formula in order of first appearance.
pub fn extract_free_variables(formula: &str) -> Vec<String> {
    let mut vars: Vec<String> = Vec::new();

    let script = strip_string_literals(formula);

    for m in identifier_re().find_iter(&script) {
        let name = m.as_str();
        if is_reserved(name) {
            continue;
        }

        let before = script[..m.start()].trim_end();
        if before.ends_with('.') {
            continue;
        }

        let after = script[m.end()..].trim_start();
        if after.starts_with('(') {
            continue;
        }

        if !vars.iter().any(|v| v == name) {
            vars.push(name.to_string());
        }
    }

    vars
}

fn identifier_re() -> &'static Regex {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    IDENT_RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("identifier regex must compile")
    })
}

fn strip_string_literals(script: &str) -> String {
    let mut out = String::with_capacity(script.len());
    let mut in_string = false;
    let mut escaped = false;

    for ch in script.chars() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(' ');
                continue;
            }
            if ch == '\\' {
                escaped = true;
                out.push(' ');
                continue;
            }
            if ch == '"' {
                in_string = false;
                out.push('"');
            } else {
                out.push(' ');
            }
        } else if ch == '"' {
            in_string = true;
            out.push('"');
        } else {
            out.push(ch);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_references() {
        assert_eq!(extract_free_variables("a + b * c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicates_keep_first_appearance() {
        assert_eq!(extract_free_variables("b + a + b + a"), vec!["b", "a"]);
    }

    #[test]
    fn test_function_names_are_not_variables() {
        assert_eq!(extract_free_variables("sqrt(x) + max(y, 2)"), vec!["x", "y"]);
        assert_eq!(extract_free_variables("custom (z)"), vec!["z"]);
    }

    #[test]
    fn test_constants_and_keywords_are_reserved() {
        assert_eq!(extract_free_variables("2 * pi * r"), vec!["r"]);
        assert_eq!(extract_free_variables("if flag { 1 } else { 0 }"), vec!["flag"]);
    }

    #[test]
    fn test_property_access_is_skipped() {
        assert_eq!(extract_free_variables("total.abs()"), vec!["total"]);
    }

    #[test]
    fn test_number_literals_do_not_leak_identifiers() {
        assert_eq!(extract_free_variables("1e5 + 0x1F + 2.5"), Vec::<String>::new());
    }

    #[test]
    fn test_string_literals_are_ignored() {
        assert_eq!(extract_free_variables("\"a + b\" + c"), vec!["c"]);
        assert_eq!(extract_free_variables("\"esc \\\" q\" + d"), vec!["d"]);
    }

    #[test]
    fn test_underscore_names() {
        assert_eq!(extract_free_variables("_tmp + net_total2"), vec!["_tmp", "net_total2"]);
    }
}
