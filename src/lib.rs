//! OpenAPI Patcher: format-preserving quickfix planning for OpenAPI
//! documents.
//!
//! # Architecture
//!
//! Every operation compiles down to a single primitive: [`PlannedEdit`], a
//! verified byte-span replacement over the original source text.
//! Intelligence lives in span acquisition — pointer navigation over a
//! span-recording parse, indentation inference, and the per-dialect edit
//! planners — not in the application logic, which stays on the
//! collaborator's side of the boundary.
//!
//! The [`Engine`] is configuration only (ordering policy + parameter source
//! registry): each [`Engine::plan`] call works over one immutable snapshot
//! and returns a plan without writing anything.
//!
//! # Example
//!
//! ```
//! use openapi_patcher::{safe_parse, Dialect, Document, Engine, Fix, PlanRequest};
//!
//! let text = "a:\n  a1: foo\nc:\n  - 1\n";
//! let document = Document::new(text);
//! let root = safe_parse(text, Dialect::Yaml).unwrap();
//! let fix: Fix = serde_json::from_str(
//!     r#"{"type": "insert", "pointer": "/c", "fix": {"a2": "baz"}}"#,
//! )
//! .unwrap();
//!
//! let engine = Engine::with_defaults();
//! let plan = engine
//!     .plan(&PlanRequest {
//!         fix: &fix,
//!         root: &root,
//!         document: &document,
//!         dialect: Dialect::Yaml,
//!         snippet: false,
//!         issues: &[],
//!         bundle: None,
//!         mapper: None,
//!     })
//!     .unwrap();
//! assert_eq!(
//!     plan.apply_to(text).unwrap(),
//!     "a:\n  a1: foo\nc:\n  - 1\n  - a2: baz\n"
//! );
//! ```

pub mod apply;
pub mod document;
pub mod engine;
pub mod fix;
pub mod indent;
pub mod ordering;
pub mod parse;
pub mod planner;
pub mod pointer;
pub mod snippet;
pub mod sources;
pub mod tree;

// Re-exports
pub use apply::{ApplyError, ApplyOutcome, PlannedEdit, Verification};
pub use document::{Document, Eol};
pub use engine::{Engine, PlanRequest};
pub use fix::{detect_version, Fix, FixKind, FixParameter, Issue, OasVersion, ParameterKind};
pub use indent::Indent;
pub use ordering::{OrderingPolicy, COMPONENTS_KEYS, ROOT_KEYS};
pub use parse::{safe_parse, Dialect, ParseError};
pub use planner::{EditContext, PlanError};
pub use pointer::{Pointer, PointerError};
pub use sources::{ParameterSource, RefMapper, SourceContext, SourceRegistry};
pub use tree::{
    children, entry_ranges, find_node, key_range, next, parent, prev, range, root_ref,
    value_range, Node, NodeRef, Span,
};
