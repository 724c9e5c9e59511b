//! Resolution orchestrator.
//!
//! The only entry point external callers need: strict validation, default
//! layering, execution-target resolution and matrix normalization, in that
//! order, followed by a final check that the document is canonical.

use crate::builder::ConfigBuilder;
use crate::error::{Error, Result};
use crate::layer::layer;
use crate::model::{ConfigDocument, JobName};
use crate::normalize::normalize;
use crate::schema::{self, RawConfig, SchemaVariant};
use serde_json::Value;
use tracing::{debug, info};

/// Resolves authored documents and builder sessions into canonical documents.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    execution_target: Option<String>,
}

impl Resolver {
    /// A resolver that takes the execution target from the document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the document's execution target. Empty overrides are ignored.
    #[must_use]
    pub fn with_execution_target(mut self, target: impl Into<String>) -> Self {
        self.execution_target = Some(target.into());
        self
    }

    /// Resolve a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] for invalid documents and
    /// [`Error::MissingExecutionTarget`] when no execution target is available.
    pub fn resolve_str(&self, text: &str) -> Result<ConfigDocument> {
        self.resolve_raw(schema::parse(text, SchemaVariant::Strict)?)
    }

    /// Resolve an already-decoded document.
    ///
    /// # Errors
    ///
    /// See [`resolve_str`](Self::resolve_str).
    pub fn resolve_value(&self, value: Value) -> Result<ConfigDocument> {
        self.resolve_raw(schema::parse_value(value, SchemaVariant::Strict)?)
    }

    /// Resolve a raw document. The strict section and list rules are
    /// checked again, so hand-built raw documents get the same treatment as
    /// parsed ones.
    ///
    /// # Errors
    ///
    /// See [`resolve_str`](Self::resolve_str).
    pub fn resolve_raw(&self, raw: RawConfig) -> Result<ConfigDocument> {
        schema::check(&raw, SchemaVariant::Strict)?;
        let mut document = layer(raw)?;

        let override_target = self
            .execution_target
            .as_deref()
            .map(str::trim)
            .filter(|target| !target.is_empty());
        document.execution_target = match override_target {
            Some(target) => {
                debug!(execution_target = target, "Using execution target override");
                target.to_string()
            }
            None => document.execution_target.trim().to_string(),
        };
        if document.execution_target.is_empty() {
            return Err(Error::MissingExecutionTarget);
        }

        normalize(&mut document);
        check_canonical(&document)?;
        info!(execution_target = %document.execution_target, "Resolved configuration document");
        Ok(document)
    }

    /// Finish a builder session. The execution target override does not apply;
    /// the builder resolved its own target when it was created.
    ///
    /// # Errors
    ///
    /// Returns the builder's [`Error::MalformedBuilderArgument`], if any.
    pub fn resolve_builder(&self, builder: ConfigBuilder) -> Result<ConfigDocument> {
        let document = builder.build()?;
        check_canonical(&document)?;
        Ok(document)
    }
}

/// Invariants every emitted document satisfies.
fn check_canonical(document: &ConfigDocument) -> Result<()> {
    if document.execution_target.trim().is_empty() {
        return Err(Error::MissingExecutionTarget);
    }
    let global_lists = [
        ("global.toolchains", &document.global.toolchains),
        ("global.features", &document.global.features),
    ];
    if let Some((path, _)) = global_lists.iter().find(|(_, list)| list.is_empty()) {
        return Err(Error::shape(
            *path,
            "expected a non-empty list, found an empty list",
        ));
    }
    for name in JobName::matrix_jobs() {
        if document.jobs.matrix(name).is_some_and(|m| m.os.is_empty()) {
            return Err(Error::shape(
                format!("jobs.{name}.matrix.os"),
                "expected a non-empty list after resolution",
            ));
        }
    }
    if document.release.targets.is_empty() {
        return Err(Error::shape(
            "release.targets",
            "expected a non-empty list, found an empty list",
        ));
    }
    Ok(())
}

/// Serialize a canonical document for the renderer.
///
/// # Errors
///
/// Returns [`Error::Json`] if serialization fails.
pub fn emit(document: &ConfigDocument) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}

/// Resolve a JSON document with an optional execution target override and
/// serialize the result.
///
/// # Errors
///
/// See [`Resolver::resolve_str`].
pub fn resolve(text: &str, execution_target: Option<&str>) -> Result<String> {
    let resolver = match execution_target {
        Some(target) => Resolver::new().with_execution_target(target),
        None => Resolver::new(),
    };
    emit(&resolver.resolve_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults;
    use crate::schema::{RawAi, RawGlobal};
    use serde_json::json;

    fn minimal() -> Value {
        json!({
            "global": {},
            "release": {},
            "pages": {},
            "ai": { "prompt": "x" },
            "jobs": {}
        })
    }

    #[test]
    fn test_override_beats_document_target() {
        let mut doc = minimal();
        doc["executionTarget"] = json!("self-hosted");

        let resolved = Resolver::new()
            .with_execution_target("ubuntu-latest")
            .resolve_value(doc)
            .unwrap();
        assert_eq!(resolved.execution_target, "ubuntu-latest");
        assert_eq!(resolved.jobs.coverage.matrix.os, vec!["ubuntu-latest"]);
    }

    #[test]
    fn test_blank_override_falls_back_to_document() {
        let mut doc = minimal();
        doc["executionTarget"] = json!("self-hosted");

        let resolved = Resolver::new()
            .with_execution_target("  ")
            .resolve_value(doc)
            .unwrap();
        assert_eq!(resolved.execution_target, "self-hosted");
    }

    #[test]
    fn test_missing_target_is_fatal() {
        let err = Resolver::new().resolve_value(minimal()).unwrap_err();
        assert!(matches!(err, Error::MissingExecutionTarget));

        let mut doc = minimal();
        doc["executionTarget"] = json!("");
        let err = Resolver::new().resolve_value(doc).unwrap_err();
        assert!(matches!(err, Error::MissingExecutionTarget));
    }

    #[test]
    fn test_shape_errors_surface_before_target_check() {
        let err = Resolver::new()
            .resolve_value(json!({ "jobs": {} }))
            .unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_builder_path() {
        let doc = Resolver::new()
            .with_execution_target("ignored")
            .resolve_builder(ConfigBuilder::new())
            .unwrap();
        assert_eq!(doc.execution_target, defaults::DEFAULT_EXECUTION_TARGET.as_str());
    }

    #[test]
    fn test_emit_uses_wire_names() {
        let text = resolve(&minimal().to_string(), Some("ubuntu-latest")).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["executionTarget"], "ubuntu-latest");
        assert_eq!(value["jobs"]["docCheck"]["if"], true);
        assert_eq!(value["jobs"]["clippy"]["matrix"]["os"], json!(["ubuntu-latest"]));
        assert_eq!(value["ai"]["use_sticky_comment"], false);
        assert!(value["jobs"]["semver"].get("run").is_none());
    }

    #[test]
    fn test_document_target_is_trimmed() {
        let mut doc = minimal();
        doc["executionTarget"] = json!("  ubuntu-latest ");

        let resolved = Resolver::new().resolve_value(doc).unwrap();
        assert_eq!(resolved.execution_target, "ubuntu-latest");
        assert_eq!(resolved.jobs.coverage.matrix.os, vec!["ubuntu-latest"]);
    }

    #[test]
    fn test_raw_documents_get_strict_checks() {
        let raw = RawConfig {
            execution_target: Some("t".to_string()),
            global: Some(RawGlobal {
                toolchains: Some(Vec::new()),
                ..RawGlobal::default()
            }),
            ai: Some(RawAi {
                prompt: "x".to_string(),
                ..RawAi::default()
            }),
            ..RawConfig::default()
        };
        let err = Resolver::new().resolve_raw(raw).unwrap_err();
        assert!(matches!(err, Error::Shape { ref path, .. } if path == "release"));

        let raw = RawConfig {
            global: Some(RawGlobal {
                features: Some(Vec::new()),
                ..RawGlobal::default()
            }),
            ..schema::parse_value(minimal(), SchemaVariant::Strict).unwrap()
        };
        let err = Resolver::new()
            .with_execution_target("t")
            .resolve_raw(raw)
            .unwrap_err();
        assert!(matches!(err, Error::Shape { ref path, .. } if path == "global.features"));
    }

    #[test]
    fn test_canonical_check_rejects_incomplete_documents() {
        let complete = {
            let mut doc = defaults::document("ubuntu-latest", "review");
            crate::normalize::normalize(&mut doc);
            doc
        };
        assert!(check_canonical(&complete).is_ok());

        let mut doc = complete.clone();
        doc.global.toolchains.clear();
        let err = check_canonical(&doc).unwrap_err();
        assert!(matches!(err, Error::Shape { ref path, .. } if path == "global.toolchains"));

        let mut doc = complete.clone();
        doc.global.features.clear();
        let err = check_canonical(&doc).unwrap_err();
        assert!(matches!(err, Error::Shape { ref path, .. } if path == "global.features"));

        let mut doc = complete.clone();
        doc.jobs.extra.matrix.os.clear();
        let err = check_canonical(&doc).unwrap_err();
        assert!(matches!(err, Error::Shape { ref path, .. } if path == "jobs.extra.matrix.os"));

        let mut doc = complete.clone();
        doc.release.targets.clear();
        let err = check_canonical(&doc).unwrap_err();
        assert!(matches!(err, Error::Shape { ref path, .. } if path == "release.targets"));

        let mut doc = complete;
        doc.execution_target = " ".to_string();
        assert!(matches!(check_canonical(&doc), Err(Error::MissingExecutionTarget)));
    }
}
