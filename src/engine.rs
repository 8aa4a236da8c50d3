//! The plan engine: snapshot in, edit plan out.
//!
//! An [`Engine`] owns only configuration — the ordering policy and the
//! parameter source registry — so independent engines can serve independent
//! documents concurrently. Each [`Engine::plan`] call builds its own
//! ephemeral [`EditContext`] over the caller's immutable snapshot and
//! returns a [`PlannedEdit`] for the collaborator to apply; the engine
//! itself never writes.

use serde_json::Value;

use crate::apply::PlannedEdit;
use crate::document::{Document, Eol};
use crate::fix::{detect_version, Fix, FixKind, Issue, OasVersion};
use crate::indent;
use crate::ordering::OrderingPolicy;
use crate::parse::Dialect;
use crate::planner::{self, EditContext, PlanError};
use crate::pointer::Pointer;
use crate::snippet;
use crate::sources::{RefMapper, SourceRegistry};
use crate::tree::{find_node, Node};

/// Inputs for one plan invocation.
pub struct PlanRequest<'a> {
    pub fix: &'a Fix,
    pub root: &'a Node,
    pub document: &'a Document,
    pub dialect: Dialect,
    /// Render placeholders instead of literal values.
    pub snippet: bool,
    /// Issues for parameter resolution (`fixIndex` selects among them).
    pub issues: &'a [Issue],
    /// Bundled document for parameter sources; resolvers are skipped
    /// without one.
    pub bundle: Option<&'a Value>,
    /// Collaborator hook for cross-file reference re-basing.
    pub mapper: Option<&'a dyn RefMapper>,
}

pub struct Engine {
    ordering: OrderingPolicy,
    sources: SourceRegistry,
}

impl Engine {
    pub fn new(ordering: OrderingPolicy, sources: SourceRegistry) -> Self {
        Self { ordering, sources }
    }

    /// Engine with the default ordering tables and the shipped resolvers.
    pub fn with_defaults() -> Self {
        Self::new(OrderingPolicy::default(), SourceRegistry::builtin())
    }

    pub fn ordering(&self) -> &OrderingPolicy {
        &self.ordering
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Rewrite a fix whose pointer does not resolve yet so that it does,
    /// wrapping the payload through the missing containers.
    pub fn materialize(&self, fix: &Fix, root: &Node) -> Result<Fix, PlanError> {
        Ok(fix.materialize_against(root, &self.ordering)?)
    }

    /// Compute the edit plan for one fix against one snapshot.
    pub fn plan(&self, request: &PlanRequest<'_>) -> Result<PlannedEdit, PlanError> {
        let pointer = Pointer::parse(&request.fix.pointer)?;
        let target = find_node(request.root, &pointer)
            .ok_or_else(|| PlanError::target_not_found(request.fix.pointer.as_str()))?;
        let ctx = EditContext {
            fix: request.fix,
            root: request.root,
            target,
            dialect: request.dialect,
            snippet: request.snippet,
            indent: indent::infer(request.document, request.root, request.dialect),
            document: request.document,
            issues: request.issues,
            version: request
                .bundle
                .map(detect_version)
                .unwrap_or(OasVersion::Unknown),
            bundle: request.bundle,
            mapper: request.mapper,
        };

        let mut plan = match request.fix.kind {
            FixKind::Insert => {
                let value = snippet::render_fix(&ctx, &self.sources)?;
                match request.dialect {
                    Dialect::Json => planner::json::insert(&ctx, value, &self.ordering),
                    Dialect::Yaml => planner::yaml::insert(&ctx, value, &self.ordering),
                }
            }
            FixKind::Replace => {
                let value = snippet::render_fix(&ctx, &self.sources)?;
                match request.dialect {
                    Dialect::Json => planner::json::replace(&ctx, value),
                    Dialect::Yaml => planner::yaml::replace(&ctx, value),
                }
            }
            FixKind::Delete => match request.dialect {
                Dialect::Json => planner::json::delete(&ctx),
                Dialect::Yaml => planner::yaml::delete(&ctx),
            },
            FixKind::RenameKey => {
                let value = snippet::render_fix(&ctx, &self.sources)?;
                planner::rename_key(&ctx, value)
            }
        }?;

        if request.document.eol() == Eol::CrLf {
            plan.text = plan.text.replace('\n', "\r\n");
        }
        Ok(plan)
    }
}
