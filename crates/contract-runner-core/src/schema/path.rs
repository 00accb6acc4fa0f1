//! Path template matching
//!
//! `/users/{id}` and `/users/{userId}` describe the same operation; matching
//! compares templates with every parameter segment replaced by a placeholder.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Token substituted for every `{...}` parameter
pub const PLACEHOLDER: &str = "{}";

/// A path template with parameter names erased
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath(String);

impl NormalizedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replace every non-empty `{...}` parameter with [`PLACEHOLDER`]
///
/// Literal text, including an unterminated `{`, is kept as is.
pub fn normalize(template: &str) -> NormalizedPath {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                out.push_str(PLACEHOLDER);
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    NormalizedPath(out)
}

/// Find the operation object for `method` on `method_map`, case-insensitively
fn method_operation<'a>(operations: &'a Value, method: &str) -> Option<&'a Value> {
    operations
        .as_object()?
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(method))
        .map(|(_, operation)| operation)
}

/// Resolve `(path, method)` against a document's `paths` object
///
/// Tries the literal template first, then the first template in document order
/// whose normalized form matches and which defines the method. Returns the
/// matched document template along with the operation.
pub fn resolve<'a>(
    paths: &'a Map<String, Value>,
    path: &str,
    method: &str,
) -> Option<(&'a str, &'a Value)> {
    if let Some((template, operations)) = paths.iter().find(|(template, _)| *template == path) {
        if let Some(operation) = method_operation(operations, method) {
            return Some((template.as_str(), operation));
        }
    }

    let target = normalize(path);
    paths.iter().find_map(|(template, operations)| {
        if normalize(template) != target {
            return None;
        }
        method_operation(operations, method).map(|operation| (template.as_str(), operation))
    })
}

/// Templates that normalize identically while declaring the same method
///
/// Such documents make resolution order-dependent and are reported as a
/// documentation defect. Each entry reads `GET /a/{x} ~ /a/{y}`.
pub fn ambiguous_templates(paths: &Map<String, Value>) -> Vec<String> {
    let mut groups: BTreeMap<(String, NormalizedPath), Vec<&str>> = BTreeMap::new();

    for (template, operations) in paths {
        let Some(methods) = operations.as_object() else {
            continue;
        };
        for method in methods.keys() {
            let method = method.to_lowercase();
            if !crate::contracts::HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            groups
                .entry((method, normalize(template)))
                .or_default()
                .push(template.as_str());
        }
    }

    groups
        .into_iter()
        .filter(|(_, templates)| templates.len() > 1)
        .map(|((method, _), templates)| {
            format!("{} {}", method.to_uppercase(), templates.join(" ~ "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn paths(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_normalize_erases_parameter_names() {
        assert_eq!(normalize("/media/{id}"), normalize("/media/{mediaId}"));
        assert_eq!(normalize("/media/{id}").as_str(), "/media/{}");
    }

    #[test]
    fn test_normalize_keeps_literals_and_positions() {
        assert_ne!(normalize("/media/{id}/content"), normalize("/media/{id}/restore"));
        assert_ne!(normalize("/a/{x}/b"), normalize("/a/b/{x}"));
        assert_ne!(normalize("/a/{x}"), normalize("/a/{x}/{y}"));
    }

    #[test]
    fn test_normalize_unterminated_brace_is_literal() {
        assert_eq!(normalize("/a/{oops").as_str(), "/a/{oops");
    }

    #[test]
    fn test_resolve_exact_match() {
        let doc = paths(json!({
            "/api/v1/uploads/{uploadId}": {"get": {"operationId": "exact"}},
            "/api/v1/uploads/{id}": {"get": {"operationId": "normalized"}}
        }));
        let (template, op) = resolve(&doc, "/api/v1/uploads/{uploadId}", "get").unwrap();
        assert_eq!(template, "/api/v1/uploads/{uploadId}");
        assert_eq!(op["operationId"], "exact");
    }

    #[test]
    fn test_resolve_normalized_match_with_method_case() {
        let doc = paths(json!({
            "/api/v1/media/{id}": {"delete": {"operationId": "remove"}}
        }));
        let (template, op) = resolve(&doc, "/api/v1/media/{mediaId}", "DELETE").unwrap();
        assert_eq!(template, "/api/v1/media/{id}");
        assert_eq!(op["operationId"], "remove");
    }

    #[test]
    fn test_resolve_requires_method() {
        let doc = paths(json!({
            "/api/v1/media/{id}": {"get": {}}
        }));
        assert!(resolve(&doc, "/api/v1/media/{mediaId}", "patch").is_none());
    }

    #[test]
    fn test_resolve_falls_through_to_template_with_method() {
        let doc = paths(json!({
            "/api/v1/media/{mediaId}": {"get": {}},
            "/api/v1/media/{id}": {"patch": {"operationId": "update"}}
        }));
        let (template, _) = resolve(&doc, "/api/v1/media/{mediaId}", "patch").unwrap();
        assert_eq!(template, "/api/v1/media/{id}");
    }

    #[test]
    fn test_ambiguous_templates_reported() {
        let doc = paths(json!({
            "/users/{id}": {"get": {}, "parameters": []},
            "/users/{userId}": {"get": {}},
            "/users/{userId}/avatar": {"get": {}}
        }));
        assert_eq!(
            ambiguous_templates(&doc),
            vec!["GET /users/{id} ~ /users/{userId}".to_string()]
        );
    }

    proptest! {
        #[test]
        fn prop_parameter_names_never_matter(
            literals in prop::collection::vec("[a-z][a-z0-9-]{0,8}", 1..5),
            names_a in prop::collection::vec("[A-Za-z][A-Za-z0-9_]{0,8}", 5),
            names_b in prop::collection::vec("[A-Za-z][A-Za-z0-9_]{0,8}", 5),
        ) {
            let build = |names: &[String]| {
                literals
                    .iter()
                    .zip(names)
                    .map(|(lit, name)| format!("/{}/{{{}}}", lit, name))
                    .collect::<String>()
            };
            prop_assert_eq!(normalize(&build(&names_a)), normalize(&build(&names_b)));
        }

        #[test]
        fn prop_normalize_is_idempotent(template in "(/[a-z{}A-Z]{0,6}){0,6}") {
            let once = normalize(&template);
            prop_assert_eq!(normalize(once.as_str()), once);
        }
    }
}
