//! Shape schema for authored configuration documents.
//!
//! Raw types mirror [`ConfigDocument`](crate::ConfigDocument) with every
//! defaultable field optional. Parsing never applies defaults; it either
//! returns the document exactly as written or a [`Error::Shape`] naming the
//! offending path. Unknown keys are dropped with a warning.

use crate::error::{Error, Result};
use crate::model::{Condition, ReleaseTarget};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Top-level sections of a configuration document.
pub const SECTIONS: [&str; 5] = ["global", "release", "pages", "ai", "jobs"];

/// Title of the published JSON Schema.
pub const SCHEMA_TITLE: &str = "RustCIConfig";

/// Which flavour of the schema to validate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaVariant {
    /// Every top-level section must be present. Used for resolution.
    #[default]
    Strict,
    /// Every top-level section is optional. Used for authoring fragments.
    Partial,
}

/// An authored configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(title = "RustCIConfig", description = "rust-ci workflow configuration")]
pub struct RawConfig {
    /// Default runner for jobs without their own `os` list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_target: Option<String>,
    /// Cross-cutting settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<RawGlobal>,
    /// Release settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<RawRelease>,
    /// Documentation site jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<RawPages>,
    /// Automated review job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<RawAi>,
    /// Named pipeline jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<RawJobs>,
}

/// Authored global settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawGlobal {
    /// Package lists keyed by `$RUNNER_OS`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<RawPackages>,
    /// Toolchains for non-matrix jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 1))]
    pub toolchains: Option<Vec<String>>,
    /// Feature sets for non-matrix jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 1))]
    pub features: Option<Vec<String>>,
    /// `RUST_LOG` exported to every job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust_log: Option<String>,
    /// Coverage upload flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codecov: Option<RawCodecov>,
}

/// Authored package lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawPackages {
    /// Comma-separated packages for Linux runners
    #[serde(rename = "Linux", default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<String>,
    /// Comma-separated packages for macOS runners
    #[serde(rename = "macOS", default, skip_serializing_if = "Option::is_none")]
    pub macos: Option<String>,
    /// Comma-separated packages for Windows runners
    #[serde(rename = "Windows", default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<String>,
}

/// Authored coverage upload flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawCodecov {
    /// Upload coverage reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Fail the job when the upload fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_ci_if_error: Option<bool>,
}

/// Authored release settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawRelease {
    /// Build and attach binaries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<bool>,
    /// Publish crates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish: Option<bool>,
    /// Build Debian packages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debian: Option<bool>,
    /// Cargo profile for release builds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Compilation targets; each entry is taken as written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(length(min = 1))]
    pub targets: Option<Vec<ReleaseTarget>>,
}

/// Authored documentation site jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawPages {
    /// mdBook site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdbook: Option<RawPageJob>,
}

/// Authored documentation site job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawPageJob {
    /// Whether the job runs
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Condition>,
    /// Book source directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Tool version pin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Build command
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Authored review job. The prompt is always required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawAi {
    /// Whether the job runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Bots allowed to trigger a review
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_bots: Option<String>,
    /// Tool-access arguments for the review action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_args: Option<String>,
    /// Keep one sticky review comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_sticky_comment: Option<bool>,
    /// Report progress on the pull request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_progress: Option<bool>,
    /// Free-form settings passed through to the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<String>,
    /// Review prompt
    pub prompt: String,
}

/// Authored base job fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawBaseJob {
    /// Whether the job runs (flag or workflow expression)
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Condition>,
    /// Whether a failure is tolerated (flag or workflow expression)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<Condition>,
    /// Shell invocation
    #[serde(rename = "run", default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Authored build matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawMatrix {
    /// Runners; an empty list falls back to the execution target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<Vec<String>>,
    /// Toolchains
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchains: Option<Vec<String>>,
    /// Feature sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

// Matrix job types repeat the `RawBaseJob` fields inline.

/// Authored lint job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawLintJob {
    /// Whether the job runs
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Condition>,
    /// Whether a failure is tolerated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<Condition>,
    /// Shell invocation
    #[serde(rename = "run", default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Extra lint flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,
    /// Build matrix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<RawMatrix>,
}

/// Authored coverage job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawCoverageJob {
    /// Whether the job runs
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Condition>,
    /// Whether a failure is tolerated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<Condition>,
    /// Shell invocation
    #[serde(rename = "run", default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Build matrix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<RawMatrix>,
}

/// Authored extra job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraJob {
    /// Whether the job runs
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<Condition>,
    /// Whether a failure is tolerated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continue_on_error: Option<Condition>,
    /// Shell invocation
    #[serde(rename = "run", default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Display name of the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Build matrix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<RawMatrix>,
}

/// Authored sanitizer suite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawSanitizerSuite {
    /// Whether the suite runs at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// AddressSanitizer job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<RawBaseJob>,
    /// LeakSanitizer job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leak: Option<RawBaseJob>,
    /// ThreadSanitizer job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<RawBaseJob>,
    /// Build matrix shared by the three jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<RawMatrix>,
}

/// Authored job set. Unlisted jobs keep their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawJobs {
    /// Formatting check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fmt: Option<RawBaseJob>,
    /// Semantic-version check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semver: Option<RawBaseJob>,
    /// Feature powerset check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hack: Option<RawBaseJob>,
    /// Documentation build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_check: Option<RawBaseJob>,
    /// Manifest ordering check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo_sort: Option<RawBaseJob>,
    /// Unused dependency check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<RawBaseJob>,
    /// Coverage job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<RawCoverageJob>,
    /// Lint job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clippy: Option<RawLintJob>,
    /// Sanitizer suite
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitizers: Option<RawSanitizerSuite>,
    /// Free-form extra job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<RawExtraJob>,
}

/// Parse and validate a JSON document.
///
/// # Errors
///
/// Returns [`Error::Shape`] when the text is not JSON or does not match the
/// requested schema variant.
pub fn parse(text: &str, variant: SchemaVariant) -> Result<RawConfig> {
    let value: Value = serde_json::from_str(text).map_err(|e| Error::shape(".", e.to_string()))?;
    parse_value(value, variant)
}

/// Validate an already-decoded document.
///
/// # Errors
///
/// Returns [`Error::Shape`] when the value does not match the requested schema variant.
pub fn parse_value(value: Value, variant: SchemaVariant) -> Result<RawConfig> {
    let raw: RawConfig = serde_path_to_error::deserialize(&value).map_err(path_error)?;
    check(&raw, variant)?;

    for path in unknown_keys(&value, &serde_json::to_value(&raw)?) {
        warn!(%path, "Ignoring unknown configuration key");
    }
    debug!(?variant, "Configuration document is shape-valid");
    Ok(raw)
}

fn path_error(err: serde_path_to_error::Error<serde_json::Error>) -> Error {
    let path = err.path().to_string();
    Error::shape(path, err.into_inner().to_string())
}

/// Keys of `input` that did not survive a round trip through the raw types.
fn unknown_keys(input: &Value, known: &Value) -> Vec<String> {
    let mut found = Vec::new();
    collect_unknown(input, known, "", &mut found);
    found
}

fn collect_unknown(input: &Value, known: &Value, path: &str, found: &mut Vec<String>) {
    match (input, known) {
        (Value::Object(input), Value::Object(known)) => {
            for (key, value) in input {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                match known.get(key) {
                    Some(known) => collect_unknown(value, known, &child, found),
                    // Explicit nulls deserialize to `None` and are not serialized back.
                    None if value.is_null() => {}
                    None => found.push(child),
                }
            }
        }
        (Value::Array(input), Value::Array(known)) => {
            for (index, (value, known)) in input.iter().zip(known).enumerate() {
                collect_unknown(value, known, &format!("{path}[{index}]"), found);
            }
        }
        _ => {}
    }
}

/// Constraints serde cannot express: required sections and non-empty lists.
pub(crate) fn check(raw: &RawConfig, variant: SchemaVariant) -> Result<()> {
    if variant == SchemaVariant::Strict {
        let present = [
            raw.global.is_some(),
            raw.release.is_some(),
            raw.pages.is_some(),
            raw.ai.is_some(),
            raw.jobs.is_some(),
        ];
        if let Some((section, _)) = SECTIONS.iter().zip(present).find(|(_, p)| !p) {
            return Err(Error::shape(*section, "missing required section"));
        }
    }

    if let Some(global) = &raw.global {
        non_empty("global.toolchains", global.toolchains.as_deref())?;
        non_empty("global.features", global.features.as_deref())?;
    }
    if let Some(release) = &raw.release {
        non_empty("release.targets", release.targets.as_deref())?;
    }
    Ok(())
}

fn non_empty<T>(path: &str, list: Option<&[T]>) -> Result<()> {
    match list {
        Some([]) => Err(Error::shape(path, "expected a non-empty list, found an empty list")),
        _ => Ok(()),
    }
}

/// Generate the JSON Schema for a variant.
///
/// The partial variant is the artifact published for editor validation.
#[must_use]
pub fn json_schema(variant: SchemaVariant) -> Value {
    let mut schema = schemars::schema_for!(RawConfig).to_value();
    if let Some(object) = schema.as_object_mut() {
        object.insert("title".to_string(), Value::from(SCHEMA_TITLE));
        if variant == SchemaVariant::Strict {
            object.insert("required".to_string(), Value::from(SECTIONS.to_vec()));
        }
    }
    schema
}
