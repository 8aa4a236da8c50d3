//! End-to-end parameter handling: snippet placeholders and parameter
//! sources resolved through the engine.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use openapi_patcher::{safe_parse, Dialect, Document, Engine, Fix, Issue, PlanRequest, PlannedEdit};

fn plan_with(
    text: &str,
    dialect: Dialect,
    fix: Value,
    snippet: bool,
    issue_pointers: &[&str],
) -> PlannedEdit {
    let fix: Fix = serde_json::from_value(fix).expect("fix descriptor");
    let document = Document::new(text);
    let root = safe_parse(text, dialect).expect("parse");
    let bundle = root.to_value();
    let issues: Vec<Issue> = issue_pointers
        .iter()
        .map(|pointer| Issue {
            pointer: pointer.to_string(),
            id: None,
        })
        .collect();
    let engine = Engine::with_defaults();
    let fix = engine.materialize(&fix, &root).expect("materialize");
    engine
        .plan(&PlanRequest {
            fix: &fix,
            root: &root,
            document: &document,
            dialect,
            snippet,
            issues: &issues,
            bundle: Some(&bundle),
            mapper: None,
        })
        .expect("plan")
}

#[test]
fn snippet_insert_renders_choice_placeholder() {
    let text = "{\n  \"components\": {\n    \"securitySchemes\": {\n      \"existing\": {\n        \"type\": \"http\"\n      }\n    }\n  }\n}";
    let fix = json!({
        "type": "insert",
        "pointer": "/components/securitySchemes",
        "fix": {"scheme": {"type": "http"}},
        "parameters": [
            {"path": "/scheme/type", "values": ["http", "apiKey", "oauth2"]}
        ]
    });
    let plan = plan_with(text, Dialect::Json, fix, true, &[]);
    assert!(
        plan.text.contains("\"${1|http,apiKey,oauth2|}\""),
        "unexpected plan text: {}",
        plan.text
    );
}

#[test]
fn literal_insert_takes_security_scheme_from_bundle() {
    let text = "swagger: \"2.0\"\nsecurityDefinitions:\n  api_key:\n    type: apiKey\npaths:\n  /pets:\n    get:\n      operationId: list\n";
    let fix = json!({
        "type": "insert",
        "pointer": "/paths/~1pets/get",
        "fix": {"security": [{"placeholder": []}]},
        "parameters": [
            {"path": "/security/0/placeholder", "type": "key", "source": "securitySchemes"}
        ]
    });
    let plan = plan_with(text, Dialect::Yaml, fix, false, &["/paths/~1pets/get"]);
    let edited = plan.apply_to(text).unwrap();
    assert_eq!(
        edited,
        "swagger: \"2.0\"\nsecurityDefinitions:\n  api_key:\n    type: apiKey\npaths:\n  /pets:\n    get:\n      operationId: list\n      security:\n      - api_key: []\n"
    );
}

#[test]
fn snippet_insert_uses_resolver_candidate_as_default() {
    let text = "swagger: \"2.0\"\nsecurityDefinitions:\n  api_key:\n    type: apiKey\npaths:\n  /pets:\n    get:\n      operationId: list\n";
    let fix = json!({
        "type": "insert",
        "pointer": "/paths/~1pets/get",
        "fix": {"security": [{"placeholder": []}]},
        "parameters": [
            {"path": "/security/0/placeholder", "type": "key", "source": "securitySchemes"}
        ]
    });
    let plan = plan_with(text, Dialect::Yaml, fix, true, &["/paths/~1pets/get"]);
    assert!(
        plan.text.contains("${1:api_key}"),
        "unexpected plan text: {}",
        plan.text
    );
}

#[test]
fn literal_insert_uses_most_frequent_sibling_value() {
    let text = "{\n  \"swagger\": \"2.0\",\n  \"definitions\": {\n    \"Pet\": {\n      \"properties\": {\n        \"id\": {\n          \"type\": \"integer\"\n        }\n      }\n    },\n    \"Dog\": {\n      \"properties\": {\n        \"id\": {\n          \"type\": \"integer\"\n        }\n      }\n    },\n    \"Toy\": {\n      \"properties\": {\n        \"id\": {}\n      }\n    }\n  }\n}";
    let fix = json!({
        "type": "insert",
        "pointer": "/definitions/Toy/properties/id",
        "fix": {"type": "string"},
        "parameters": [
            {"path": "/type", "source": "mostUsedByName"}
        ]
    });
    let plan = plan_with(
        text,
        Dialect::Json,
        fix,
        false,
        &["/definitions/Toy/properties/id"],
    );
    assert!(
        plan.text.contains("\"type\": \"integer\""),
        "unexpected plan text: {}",
        plan.text
    );
}

#[test]
fn snippet_insert_resolves_schema_ref_by_response_code() {
    let text = "{\n  \"openapi\": \"3.0.0\",\n  \"paths\": {\n    \"/a\": {\n      \"get\": {\n        \"responses\": {\n          \"200\": {\n            \"content\": {\n              \"application/json\": {\n                \"schema\": {\n                  \"$ref\": \"#/components/schemas/Pet\"\n                }\n              }\n            }\n          }\n        }\n      }\n    },\n    \"/b\": {\n      \"get\": {\n        \"responses\": {\n          \"200\": {\n            \"description\": \"missing\"\n          }\n        }\n      }\n    }\n  }\n}";
    let fix = json!({
        "type": "insert",
        "pointer": "/paths/~1b/get/responses/200",
        "fix": {"content": {"application/json": {"schema": {"$ref": "placeholder"}}}},
        "parameters": [
            {
                "path": "/content/application~1json/schema/$ref",
                "source": "schemaRefByResponseCode"
            }
        ]
    });
    let plan = plan_with(
        text,
        Dialect::Json,
        fix,
        true,
        &["/paths/~1b/get/responses/200"],
    );
    assert!(
        plan.text.contains("${1:#/components/schemas/Pet}"),
        "unexpected plan text: {}",
        plan.text
    );
    // $ref keys are escaped so the template engine leaves them alone.
    assert!(
        plan.text.contains("\\$ref"),
        "unexpected plan text: {}",
        plan.text
    );
}

#[test]
fn parameters_keep_declaration_order_across_resolvers() {
    let text = "{\n  \"components\": {\n    \"securitySchemes\": {\n      \"existing\": {\n        \"type\": \"http\"\n      }\n    }\n  }\n}";
    let fix = json!({
        "type": "insert",
        "pointer": "/components/securitySchemes",
        "fix": {"scheme": {"type": "http", "description": "d"}},
        "parameters": [
            {"path": "/scheme", "type": "key"},
            {"path": "/scheme/type", "values": ["http", "apiKey"]},
            {"path": "/scheme/description"}
        ]
    });
    let plan = plan_with(text, Dialect::Json, fix, true, &[]);
    let first = plan.text.find("${1:scheme}").expect("first placeholder");
    let second = plan.text.find("${2|http,apiKey|}").expect("second placeholder");
    let third = plan.text.find("${3:d}").expect("third placeholder");
    assert!(first < second && second < third, "order: {}", plan.text);
}
