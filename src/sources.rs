//! Parameter sources: pluggable resolvers that mine the bundled document
//! for likely parameter values.
//!
//! A resolver runs only when a fix parameter names it, never mutates
//! anything, and fails soft — missing or malformed data yields an empty
//! candidate list, not an error.

use std::collections::HashMap;

use serde_json::Value;

use crate::document::Document;
use crate::fix::{Fix, FixParameter, Issue, OasVersion};
use crate::pointer::Pointer;

/// Collaborator hook for re-basing `$ref` values that point into other
/// files of a bundled document set.
pub trait RefMapper {
    /// A reference rewritten relative to the current document, or `None`
    /// to keep it as-is.
    fn rebase(&self, reference: &str) -> Option<String>;
}

/// Everything a resolver may inspect for one parameter.
pub struct SourceContext<'a> {
    pub issue: &'a Issue,
    pub fix: &'a Fix,
    pub parameter: &'a FixParameter,
    pub version: OasVersion,
    pub bundle: &'a Value,
    pub document: &'a Document,
    pub mapper: Option<&'a dyn RefMapper>,
}

pub trait ParameterSource {
    /// Candidate values, best first. Empty when nothing can be suggested.
    fn candidates(&self, ctx: &SourceContext<'_>) -> Vec<Value>;
}

/// Named resolver lookup, built explicitly and handed to the engine.
pub struct SourceRegistry {
    sources: HashMap<String, Box<dyn ParameterSource + Send + Sync>>,
}

impl SourceRegistry {
    pub fn empty() -> Self {
        Self {
            sources: HashMap::new(),
        }
    }

    /// Registry with the three shipped resolvers.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("securitySchemes", SecuritySchemes);
        registry.register("mostUsedByName", MostUsedByName);
        registry.register("schemaRefByResponseCode", SchemaRefByResponseCode);
        registry
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        source: impl ParameterSource + Send + Sync + 'static,
    ) {
        self.sources.insert(name.into(), Box::new(source));
    }

    pub fn get(&self, name: &str) -> Option<&(dyn ParameterSource + Send + Sync)> {
        self.sources.get(name).map(Box::as_ref)
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("SourceRegistry")
            .field("sources", &names)
            .finish()
    }
}

/// Declared security scheme identifiers for the detected version.
struct SecuritySchemes;

impl ParameterSource for SecuritySchemes {
    fn candidates(&self, ctx: &SourceContext<'_>) -> Vec<Value> {
        let schemes = match ctx.version {
            OasVersion::V2 => ctx.bundle.get("securityDefinitions"),
            OasVersion::V3 => ctx
                .bundle
                .get("components")
                .and_then(|components| components.get("securitySchemes")),
            OasVersion::Unknown => None,
        };
        schemes
            .and_then(Value::as_object)
            .map(|map| map.keys().cloned().map(Value::String).collect())
            .unwrap_or_default()
    }
}

/// Most frequent value observed for the same (property, leaf-key) pair
/// anywhere else in the bundled document.
struct MostUsedByName;

impl ParameterSource for MostUsedByName {
    fn candidates(&self, ctx: &SourceContext<'_>) -> Vec<Value> {
        let Some(name) = last_segment(&ctx.issue.pointer) else {
            return Vec::new();
        };
        let Some(property) = last_segment(&ctx.parameter.path) else {
            return Vec::new();
        };

        let mut occurrences = Vec::new();
        let mut ancestors: Vec<String> = Vec::new();
        walk_scalars(ctx.bundle, &mut ancestors, &mut |path, key, value| {
            // `path` lists the scalar's container ancestry nearest-first;
            // a hit is a scalar under a property of the same name.
            if path.len() > 3 && path[1] == "properties" && path[0] == name && key == property {
                occurrences.push(value.clone());
            }
        });

        mode(occurrences).into_iter().collect()
    }
}

/// The schema `$ref` most often used for the response code implied by the
/// issue's pointer.
struct SchemaRefByResponseCode;

impl ParameterSource for SchemaRefByResponseCode {
    fn candidates(&self, ctx: &SourceContext<'_>) -> Vec<Value> {
        let index = match ctx.version {
            OasVersion::V2 => 2,
            OasVersion::V3 => 4,
            OasVersion::Unknown => return Vec::new(),
        };
        let (Ok(issue_pointer), Ok(parameter_pointer)) = (
            Pointer::parse(&ctx.issue.pointer),
            Pointer::parse(&ctx.parameter.path),
        ) else {
            return Vec::new();
        };
        let mut path: Vec<&str> = issue_pointer
            .segments()
            .iter()
            .chain(parameter_pointer.segments())
            .map(String::as_str)
            .collect();
        path.reverse();
        let Some(code) = path.get(index) else {
            return Vec::new();
        };

        let refs = schema_refs_by_code(ctx.version, ctx.bundle);
        let Some(reference) = refs.get(*code) else {
            return Vec::new();
        };
        let rebased = ctx
            .mapper
            .and_then(|mapper| mapper.rebase(reference))
            .unwrap_or_else(|| reference.clone());
        vec![Value::String(rebased)]
    }
}

/// Most frequent schema reference per response code across all operations.
fn schema_refs_by_code(version: OasVersion, bundle: &Value) -> HashMap<String, String> {
    let mut buckets: HashMap<String, Vec<Value>> = HashMap::new();
    let paths = bundle.get("paths").and_then(Value::as_object);
    for operations in paths.into_iter().flat_map(|map| map.values()) {
        let Some(operations) = operations.as_object() else {
            continue;
        };
        for operation in operations.values() {
            let Some(responses) = operation.get("responses").and_then(Value::as_object) else {
                continue;
            };
            for (code, response) in responses {
                let reference = match version {
                    OasVersion::V2 => response.get("schema"),
                    _ => response
                        .get("content")
                        .and_then(|content| content.get("application/json"))
                        .and_then(|media| media.get("schema")),
                }
                .and_then(|schema| schema.get("$ref"))
                .and_then(Value::as_str);
                if let Some(reference) = reference {
                    buckets
                        .entry(code.clone())
                        .or_default()
                        .push(Value::String(reference.to_string()));
                }
            }
        }
    }

    buckets
        .into_iter()
        .filter_map(|(code, values)| {
            mode(values).and_then(|value| {
                value
                    .as_str()
                    .map(|reference| (code, reference.to_string()))
            })
        })
        .collect()
}

fn last_segment(pointer: &str) -> Option<String> {
    Pointer::parse(pointer)
        .ok()?
        .last_segment()
        .map(str::to_string)
}

/// Visit every scalar with its container ancestry (nearest container key
/// first) and its own key.
fn walk_scalars(
    value: &Value,
    ancestors: &mut Vec<String>,
    visitor: &mut impl FnMut(&[String], &str, &Value),
) {
    let entries: Vec<(String, &Value)> = match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, child)| (key.clone(), child))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, child)| (index.to_string(), child))
            .collect(),
        _ => return,
    };
    for (key, child) in entries {
        match child {
            Value::Object(_) | Value::Array(_) => {
                ancestors.insert(0, key);
                walk_scalars(child, ancestors, visitor);
                ancestors.remove(0);
            }
            _ => visitor(ancestors, &key, child),
        }
    }
}

/// Most frequent element; ties go to the element a stable ascending sort
/// by count leaves last, i.e. the one seen latest in document order.
fn mode(values: Vec<Value>) -> Option<Value> {
    if values.is_empty() {
        return None;
    }
    let counts: Vec<usize> = values
        .iter()
        .map(|value| values.iter().filter(|other| *other == value).count())
        .collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&index| counts[index]);
    order.last().map(|&index| values[index].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context<'a>(
        issue: &'a Issue,
        fix: &'a Fix,
        version: OasVersion,
        bundle: &'a Value,
        document: &'a Document,
    ) -> SourceContext<'a> {
        SourceContext {
            issue,
            fix,
            parameter: &fix.parameters[0],
            version,
            bundle,
            document,
            mapper: None,
        }
    }

    fn sample_fix(path: &str, source: &str) -> Fix {
        serde_json::from_value(json!({
            "type": "insert",
            "pointer": "",
            "fix": {},
            "parameters": [{"path": path, "source": source}]
        }))
        .unwrap()
    }

    #[test]
    fn security_schemes_v3() {
        let bundle = json!({
            "openapi": "3.0.0",
            "components": {"securitySchemes": {"api_key": {}, "oauth": {}}}
        });
        let document = Document::new("");
        let issue = Issue {
            pointer: "/paths".to_string(),
            id: None,
        };
        let fix = sample_fix("/0", "securitySchemes");
        let ctx = context(&issue, &fix, OasVersion::V3, &bundle, &document);
        assert_eq!(
            SecuritySchemes.candidates(&ctx),
            vec![json!("api_key"), json!("oauth")]
        );
    }

    #[test]
    fn security_schemes_v2_and_unknown() {
        let bundle = json!({"swagger": "2.0", "securityDefinitions": {"basic": {}}});
        let document = Document::new("");
        let issue = Issue {
            pointer: "/paths".to_string(),
            id: None,
        };
        let fix = sample_fix("/0", "securitySchemes");
        let ctx = context(&issue, &fix, OasVersion::V2, &bundle, &document);
        assert_eq!(SecuritySchemes.candidates(&ctx), vec![json!("basic")]);
        let ctx = context(&issue, &fix, OasVersion::Unknown, &bundle, &document);
        assert!(SecuritySchemes.candidates(&ctx).is_empty());
    }

    #[test]
    fn most_used_prefers_frequent_value() {
        let bundle = json!({
            "definitions": {
                "Pet": {"properties": {"id": {"type": "integer", "format": "int64"}}},
                "Dog": {"properties": {"id": {"type": "integer", "format": "int64"}}},
                "Cat": {"properties": {"id": {"type": "integer", "format": "int32"}}}
            }
        });
        let document = Document::new("");
        let issue = Issue {
            pointer: "/definitions/Toy/properties/id".to_string(),
            id: None,
        };
        let fix = sample_fix("/format", "mostUsedByName");
        let ctx = context(&issue, &fix, OasVersion::V2, &bundle, &document);
        assert_eq!(MostUsedByName.candidates(&ctx), vec![json!("int64")]);
    }

    #[test]
    fn most_used_tie_goes_to_last_seen() {
        let bundle = json!({
            "definitions": {
                "A": {"properties": {"id": {"type": "integer"}}},
                "B": {"properties": {"id": {"type": "string"}}}
            }
        });
        let document = Document::new("");
        let issue = Issue {
            pointer: "/definitions/C/properties/id".to_string(),
            id: None,
        };
        let fix = sample_fix("/type", "mostUsedByName");
        let ctx = context(&issue, &fix, OasVersion::V2, &bundle, &document);
        assert_eq!(MostUsedByName.candidates(&ctx), vec![json!("string")]);
    }

    #[test]
    fn most_used_empty_without_hits() {
        let bundle = json!({"definitions": {}});
        let document = Document::new("");
        let issue = Issue {
            pointer: "/definitions/X/properties/id".to_string(),
            id: None,
        };
        let fix = sample_fix("/type", "mostUsedByName");
        let ctx = context(&issue, &fix, OasVersion::V2, &bundle, &document);
        assert!(MostUsedByName.candidates(&ctx).is_empty());
    }

    #[test]
    fn schema_ref_by_response_code_v3() {
        let bundle = json!({
            "openapi": "3.0.0",
            "paths": {
                "/pets": {
                    "get": {"responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pets"}}}}}},
                    "post": {"responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pets"}}}}}}
                },
                "/toys": {
                    "get": {"responses": {"200": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Toy"}}}}}}
                }
            }
        });
        let document = Document::new("");
        let issue = Issue {
            pointer: "/paths/~1pets/get/responses/200/content/application~1json/schema".to_string(),
            id: None,
        };
        let fix = sample_fix("/$ref", "schemaRefByResponseCode");
        let ctx = context(&issue, &fix, OasVersion::V3, &bundle, &document);
        assert_eq!(
            SchemaRefByResponseCode.candidates(&ctx),
            vec![json!("#/components/schemas/Pets")]
        );
    }

    #[test]
    fn schema_ref_by_response_code_v2_uses_mapper() {
        struct Prefix;
        impl RefMapper for Prefix {
            fn rebase(&self, reference: &str) -> Option<String> {
                Some(format!("./common.json{reference}"))
            }
        }
        let bundle = json!({
            "swagger": "2.0",
            "paths": {
                "/pets": {"get": {"responses": {"404": {"schema": {"$ref": "#/definitions/Error"}}}}}
            }
        });
        let document = Document::new("");
        let issue = Issue {
            pointer: "/paths/~1pets/get/responses/404/schema".to_string(),
            id: None,
        };
        let fix = sample_fix("/$ref", "schemaRefByResponseCode");
        let mut ctx = context(&issue, &fix, OasVersion::V2, &bundle, &document);
        ctx.mapper = Some(&Prefix);
        assert_eq!(
            SchemaRefByResponseCode.candidates(&ctx),
            vec![json!("./common.json#/definitions/Error")]
        );
    }

    #[test]
    fn registry_lookup() {
        let registry = SourceRegistry::builtin();
        assert!(registry.get("securitySchemes").is_some());
        assert!(registry.get("mostUsedByName").is_some());
        assert!(registry.get("schemaRefByResponseCode").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn mode_prefers_count_then_last_seen() {
        assert_eq!(
            mode(vec![json!("a"), json!("b"), json!("a")]),
            Some(json!("a"))
        );
        assert_eq!(mode(vec![json!("a"), json!("b")]), Some(json!("b")));
        assert_eq!(mode(Vec::new()), None);
    }
}
