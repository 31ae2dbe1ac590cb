//! Flattening and matching of the `exports` field.
//!
//! Conditional and subpath mappings are reduced to the plain list of
//! `./`-relative patterns they mention. Keys are not interpreted, so the list
//! describes which files are reachable, not under which specifier.

use log::warn;
use regex::Regex;
use serde_json::Value;
use std::path::{Component, Path};

use crate::runtime::{is_path_under, relative_path_from_dir};

/// Flatten an `exports` declaration into a list of relative path patterns.
///
/// The declaration is walked with an explicit stack: arrays and object values
/// are pushed in order and popped last-first, so `["./a", "./b"]` yields
/// `["./b", "./a"]`. Directory exports (`"./dir/"`) become `"./dir/*"`.
///
/// `null` entries (negative patterns) are skipped with a warning. A string
/// without the `./` prefix, or a boolean or number anywhere in the tree,
/// makes the whole declaration unsupported and returns `None`.
#[tracing::instrument(skip(declaration))]
pub fn flatten_exports(declaration: &Value) -> Option<Vec<String>> {
    let mut exports = Vec::new();
    let mut queue = vec![declaration];

    while let Some(exp) = queue.pop() {
        match exp {
            Value::String(s) if s.starts_with("./") => {
                if s != "./" && s.ends_with('/') {
                    exports.push(format!("{s}*"));
                } else {
                    exports.push(s.clone());
                }
            }
            Value::String(s) => {
                warn!("Non-relative export ({}) found in package.json", s);
                return None;
            }
            Value::Array(items) => queue.extend(items),
            Value::Null => {
                warn!("Unsupported negative exports pattern found in package.json");
            }
            Value::Object(map) => queue.extend(map.values()),
            other => {
                warn!("Invalid export ({}) found in package.json", other);
                return None;
            }
        }
    }

    Some(exports)
}

/// Check whether a package-relative path (`./lib/a.js`) is matched by any
/// export pattern.
///
/// `*` matches any sequence of characters, including `/`. Each wildcard is
/// matched independently of the others in the same pattern.
pub fn is_in_exports<S: AsRef<str>>(rel: &str, exports: &[S]) -> bool {
    exports.iter().any(|pattern| {
        let pattern = pattern.as_ref();
        if pattern.contains('*') {
            matches_wildcard(pattern, rel)
        } else {
            pattern == rel
        }
    })
}

fn matches_wildcard(pattern: &str, rel: &str) -> bool {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    match Regex::new(&format!("^{body}$")) {
        Ok(re) => re.is_match(rel),
        Err(e) => {
            warn!("Ignoring export pattern {}: {}", pattern, e);
            false
        }
    }
}

/// Express `file` relative to the package directory `dir` in export form
/// (`./` prefix, `/` separators).
///
/// Returns `None` if `file` is not inside `dir`.
pub fn export_subpath(dir: &Path, file: &Path) -> Option<String> {
    if !is_path_under(file, dir) {
        return None;
    }
    let rel = relative_path_from_dir(dir, file)?;
    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(format!("./{}", parts.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_flatten_string() {
        assert_eq!(
            flatten_exports(&json!("./index.js")),
            Some(vec!["./index.js".to_string()])
        );
    }

    #[test]
    fn test_flatten_mixed_structure_order() {
        let exports = json!(["./a", "./b/", ["./c", null], {"x": "./d"}]);
        assert_eq!(
            flatten_exports(&exports),
            Some(vec![
                "./d".to_string(),
                "./c".to_string(),
                "./b/*".to_string(),
                "./a".to_string(),
            ])
        );
    }

    #[test]
    fn test_flatten_object_values_in_document_order_reversed() {
        let exports: Value = serde_json::from_str(
            r#"{".": "./index.js", "./feature": "./feature.js", "./utils/": "./utils/"}"#,
        )
        .unwrap();
        assert_eq!(
            flatten_exports(&exports),
            Some(vec![
                "./utils/*".to_string(),
                "./feature.js".to_string(),
                "./index.js".to_string(),
            ])
        );
    }

    #[test]
    fn test_flatten_conditions_use_values_not_keys() {
        let exports = json!({
            ".": {"import": "./esm/index.mjs", "require": "./cjs/index.js"}
        });
        let flat = flatten_exports(&exports).unwrap();
        assert_eq!(flat, vec!["./cjs/index.js", "./esm/index.mjs"]);
    }

    #[test]
    fn test_flatten_root_directory_not_rewritten() {
        assert_eq!(
            flatten_exports(&json!("./")),
            Some(vec!["./".to_string()])
        );
    }

    #[test_log::test]
    fn test_flatten_non_relative_aborts() {
        let exports = json!(["./a", ["./b", "bar"], "./c"]);
        assert_eq!(flatten_exports(&exports), None);
    }

    #[test_log::test]
    fn test_flatten_non_relative_aborts_even_after_entries_collected() {
        // "./c" is collected first, then "bar" discards everything
        let exports = json!(["bar", "./c"]);
        assert_eq!(flatten_exports(&exports), None);
    }

    #[test_log::test]
    fn test_flatten_wrong_type_aborts() {
        assert_eq!(flatten_exports(&json!({"./a": 1})), None);
        assert_eq!(flatten_exports(&json!(["./a", true])), None);
    }

    #[test_log::test]
    fn test_flatten_null_skipped() {
        let exports = json!({"./*": "./*", "./internal/*": null});
        assert_eq!(flatten_exports(&exports), Some(vec!["./*".to_string()]));
    }

    #[test]
    fn test_flatten_empty_containers() {
        assert_eq!(flatten_exports(&json!([])), Some(vec![]));
        assert_eq!(flatten_exports(&json!({})), Some(vec![]));
    }

    #[test]
    fn test_flatten_deep_nesting() {
        let mut exports = json!("./deep.js");
        for _ in 0..1_000 {
            exports = json!([exports]);
        }
        assert_eq!(
            flatten_exports(&exports),
            Some(vec!["./deep.js".to_string()])
        );
    }

    #[test]
    fn test_is_in_exports_wildcard() {
        let exports = ["./sub/*"];
        assert!(!is_in_exports("sub/x", &exports));
        assert!(is_in_exports("./sub/x", &exports));
        assert!(is_in_exports("./sub/x/y", &exports));
        assert!(!is_in_exports("./other/x", &exports));
    }

    #[test]
    fn test_is_in_exports_exact() {
        let exports = vec!["./exact".to_string()];
        assert!(is_in_exports("./exact", &exports));
        assert!(!is_in_exports("./exact/more", &exports));
        assert!(!is_in_exports("./exac", &exports));
    }

    #[test]
    fn test_is_in_exports_anchored() {
        let exports = ["./lib/*.js"];
        assert!(is_in_exports("./lib/a.js", &exports));
        assert!(!is_in_exports("./lib/a.js.map", &exports));
        assert!(!is_in_exports("x./lib/a.js", &exports));
    }

    #[test]
    fn test_is_in_exports_dots_are_literal() {
        let exports = ["./lib/*.js"];
        assert!(!is_in_exports("./lib/axjs", &exports));
    }

    #[test]
    fn test_is_in_exports_regex_metacharacters() {
        let exports = ["./(group)/*+[x]"];
        assert!(is_in_exports("./(group)/a+[x]", &exports));
        assert!(!is_in_exports("./group/a+x", &exports));
    }

    #[test]
    fn test_is_in_exports_multiple_wildcards_independent() {
        let exports = ["./*/x/*"];
        assert!(is_in_exports("./a/x/b", &exports));
        assert!(is_in_exports("./a/x/a", &exports));
    }

    #[test]
    fn test_is_in_exports_empty() {
        let exports: [&str; 0] = [];
        assert!(!is_in_exports("./index.js", &exports));
    }

    #[test]
    fn test_export_subpath() {
        let dir = PathBuf::from("/work/node_modules/foo");
        assert_eq!(
            export_subpath(&dir, &dir.join("lib").join("a.js")),
            Some("./lib/a.js".to_string())
        );
        assert_eq!(export_subpath(&dir, &dir), Some("./".to_string()));
        assert_eq!(export_subpath(&dir, Path::new("/work/other.js")), None);
    }
}
