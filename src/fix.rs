//! Fix descriptors: the declarative description of one structural edit.
//!
//! Descriptors arrive from a static catalog or are built programmatically;
//! either way they deserialize from the same JSON shape the catalogs use.

use serde::Deserialize;
use serde_json::Value;

use crate::ordering::OrderingPolicy;
use crate::pointer::{Pointer, PointerError};
use crate::tree::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixKind {
    Insert,
    Replace,
    Delete,
    RenameKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    #[default]
    Value,
    Key,
}

/// One interactive parameter of a fix payload.
///
/// `path` is a JSON Pointer relative to the payload root and must resolve
/// inside it once the payload is rendered.
#[derive(Debug, Clone, Deserialize)]
pub struct FixParameter {
    pub path: String,
    #[serde(rename = "type", default)]
    pub kind: ParameterKind,
    /// Explicit enumerated choices for the placeholder.
    #[serde(default)]
    pub values: Option<Vec<Value>>,
    /// Name of a registered parameter source to mine candidates from.
    #[serde(default)]
    pub source: Option<String>,
    /// Which issue of the collaborator-supplied list to resolve against.
    #[serde(rename = "fixIndex", default)]
    pub fix_index: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fix {
    #[serde(rename = "type")]
    pub kind: FixKind,
    pub pointer: String,
    #[serde(default)]
    pub fix: Value,
    #[serde(default)]
    pub parameters: Vec<FixParameter>,
}

impl Fix {
    /// Rewrite this fix so its pointer resolves in `root`.
    ///
    /// When the target location does not exist yet, the payload is wrapped
    /// through the missing intermediate containers and the pointer is
    /// shortened to the nearest resolvable ancestor; parameter paths are
    /// prefixed to keep resolving inside the grown payload. Keys the policy
    /// knows to be array-valued get a one-element array wrapper (and an
    /// extra `/0` pointer step).
    pub fn materialize_against(
        &self,
        root: &Node,
        policy: &OrderingPolicy,
    ) -> Result<Fix, PointerError> {
        let mut pointer = Pointer::parse(&self.pointer)?;
        let mut payload = self.fix.clone();
        let mut prefix: Vec<String> = Vec::new();

        while root.find(&pointer).is_none() {
            let Some(key) = pointer.last_segment().map(str::to_string) else {
                break;
            };
            pointer = pointer.parent().unwrap_or_else(Pointer::root);
            if policy.is_array_valued(&key) {
                payload = Value::Object(
                    [(key.clone(), Value::Array(vec![payload]))]
                        .into_iter()
                        .collect(),
                );
                prefix.insert(0, "0".to_string());
                prefix.insert(0, key);
            } else {
                payload = Value::Object([(key.clone(), payload)].into_iter().collect());
                prefix.insert(0, key);
            }
        }

        if prefix.is_empty() {
            return Ok(self.clone());
        }

        let prefix_pointer = Pointer::join(prefix).to_string();
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| FixParameter {
                path: format!("{prefix_pointer}{}", parameter.path),
                ..parameter.clone()
            })
            .collect();

        Ok(Fix {
            kind: self.kind,
            pointer: pointer.to_string(),
            fix: payload,
            parameters,
        })
    }
}

/// Issue the collaborator hands over for parameter resolution; `pointer`
/// addresses the offending node in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub pointer: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Detected API-description version of the bundled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OasVersion {
    Unknown,
    V2,
    V3,
}

pub fn detect_version(bundle: &Value) -> OasVersion {
    if bundle.get("swagger").and_then(Value::as_str) == Some("2.0") {
        return OasVersion::V2;
    }
    match bundle.get("openapi").and_then(Value::as_str) {
        Some(version) if version.starts_with('3') => OasVersion::V3,
        _ => OasVersion::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{safe_parse, Dialect};
    use serde_json::json;

    #[test]
    fn descriptor_deserializes_catalog_shape() {
        let fix: Fix = serde_json::from_str(
            r#"{
                "type": "insert",
                "pointer": "/components/securitySchemes",
                "fix": {"scheme": {"type": "http"}},
                "parameters": [
                    {"path": "/scheme/type", "values": ["http", "apiKey"]},
                    {"path": "/scheme", "type": "key", "source": "securitySchemes", "fixIndex": 1}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(fix.kind, FixKind::Insert);
        assert_eq!(fix.parameters[0].kind, ParameterKind::Value);
        assert_eq!(fix.parameters[1].kind, ParameterKind::Key);
        assert_eq!(fix.parameters[1].fix_index, Some(1));
    }

    #[test]
    fn materialize_wraps_missing_containers() {
        let root = safe_parse(r#"{"openapi": "3.0.0"}"#, Dialect::Json).unwrap();
        let fix = Fix {
            kind: FixKind::Insert,
            pointer: "/components/securitySchemes".to_string(),
            fix: json!({"basic": {"type": "http"}}),
            parameters: vec![FixParameter {
                path: "/basic/type".to_string(),
                kind: ParameterKind::Value,
                values: None,
                source: None,
                fix_index: None,
            }],
        };
        let rewritten = fix
            .materialize_against(&root, &OrderingPolicy::default())
            .unwrap();
        assert_eq!(rewritten.pointer, "");
        assert_eq!(
            rewritten.fix,
            json!({"components": {"securitySchemes": {"basic": {"type": "http"}}}})
        );
        assert_eq!(
            rewritten.parameters[0].path,
            "/components/securitySchemes/basic/type"
        );
    }

    #[test]
    fn materialize_wraps_array_valued_keys() {
        let root = safe_parse(r#"{"openapi": "3.0.0"}"#, Dialect::Json).unwrap();
        let fix = Fix {
            kind: FixKind::Insert,
            pointer: "/security".to_string(),
            fix: json!({"api_key": []}),
            parameters: Vec::new(),
        };
        let rewritten = fix
            .materialize_against(&root, &OrderingPolicy::default())
            .unwrap();
        assert_eq!(rewritten.pointer, "");
        assert_eq!(rewritten.fix, json!({"security": [{"api_key": []}]}));
    }

    #[test]
    fn materialize_keeps_resolvable_fix() {
        let root = safe_parse(r#"{"paths": {}}"#, Dialect::Json).unwrap();
        let fix = Fix {
            kind: FixKind::Insert,
            pointer: "/paths".to_string(),
            fix: json!({}),
            parameters: Vec::new(),
        };
        let rewritten = fix
            .materialize_against(&root, &OrderingPolicy::default())
            .unwrap();
        assert_eq!(rewritten.pointer, "/paths");
    }

    #[test]
    fn version_detection() {
        assert_eq!(detect_version(&json!({"swagger": "2.0"})), OasVersion::V2);
        assert_eq!(detect_version(&json!({"openapi": "3.0.3"})), OasVersion::V3);
        assert_eq!(detect_version(&json!({"openapi": "3.1.0"})), OasVersion::V3);
        assert_eq!(detect_version(&json!({})), OasVersion::Unknown);
    }
}
