use crate::host::{self, CONFIG_OUTPUT, ConfigSource};
use miette::{IntoDiagnostic, WrapErr};
use rustci_config::{Resolver, SchemaVariant, emit, json_schema};
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Resolve the configured document and publish it as the `config` output.
#[instrument(skip(configs))]
pub fn resolve(
    configs: &str,
    execution_target: Option<&str>,
    output: Option<&Path>,
) -> miette::Result<()> {
    let source = ConfigSource::from_input(configs);
    let text = source.read()?;
    debug!(bytes = text.len(), "Loaded configuration document");

    let resolver = match execution_target {
        Some(target) => Resolver::new().with_execution_target(target),
        None => Resolver::new(),
    };
    let document = resolver.resolve_str(&text)?;
    host::set_output(CONFIG_OUTPUT, &emit(&document)?, output)?;

    info!(execution_target = %document.execution_target, "Published resolved configuration");
    Ok(())
}

/// Write the JSON Schema for a variant.
#[instrument]
pub fn schema(variant: SchemaVariant, output: Option<&Path>) -> miette::Result<()> {
    let schema = serde_json::to_string_pretty(&json_schema(variant)).into_diagnostic()?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{schema}\n"))
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write schema to {}", path.display()))?;
            info!(path = %path.display(), "Generated schema");
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{schema}").into_diagnostic()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"{
        "global": {}, "release": {}, "pages": {}, "jobs": {},
        "ai": { "prompt": "Review this pull request" }
    }"#;

    fn output_value(path: &Path) -> Value {
        let written = std::fs::read_to_string(path).unwrap();
        let body = written.lines().nth(1).unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_resolve_inline_document() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("github_output");

        resolve(MINIMAL, Some("ubuntu-latest"), Some(&out)).unwrap();

        let config = output_value(&out);
        assert_eq!(config["executionTarget"], "ubuntu-latest");
        assert_eq!(config["jobs"]["coverage"]["matrix"]["os"][0], "ubuntu-latest");
    }

    #[test]
    fn test_resolve_document_file() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("rust-ci.json");
        let out = dir.path().join("github_output");
        std::fs::write(&doc, MINIMAL.replace("\"jobs\": {}", r#""jobs": {"fmt": {"if": false}}"#))
            .unwrap();

        resolve(doc.to_str().unwrap(), Some("self-hosted"), Some(&out)).unwrap();

        let config = output_value(&out);
        assert_eq!(config["jobs"]["fmt"]["if"], false);
        assert_eq!(config["jobs"]["clippy"]["matrix"]["os"][0], "self-hosted");
    }

    #[test]
    fn test_resolve_failure_writes_no_output() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("github_output");

        let err = resolve(MINIMAL, None, Some(&out)).unwrap_err();
        assert!(err.to_string().contains("Execution target is required"));
        assert!(!out.exists());
    }

    #[test]
    fn test_schema_written_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rust-ci.schema.json");

        schema(SchemaVariant::Strict, Some(&path)).unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["title"], "RustCIConfig");
        assert_eq!(written["required"].as_array().unwrap().len(), 5);
    }
}
