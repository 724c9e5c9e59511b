//! Canonical configuration document.
//!
//! These types describe the fully-resolved document handed to the workflow
//! template renderer. Field names on the wire follow the renderer's contract:
//! base jobs use `if`, `continueOnError` and `run`, the AI section uses
//! snake_case keys.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A job toggle: either a literal flag or a workflow conditional expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Condition {
    /// Literal on/off
    Flag(bool),
    /// Expression evaluated by the workflow engine (e.g. `${{ github.event_name == 'push' }}`)
    Expression(String),
}

impl Condition {
    /// The literal flag, if this condition is not an expression.
    #[must_use]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Expression(_) => None,
        }
    }
}

impl From<bool> for Condition {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for Condition {
    fn from(expression: &str) -> Self {
        Self::Expression(expression.to_string())
    }
}

impl From<String> for Condition {
    fn from(expression: String) -> Self {
        Self::Expression(expression)
    }
}

/// Symbolic runner references, resolved to concrete runners by repository variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runner {
    /// `vars.RUNNER_ARM64`
    Arm64,
    /// `vars.RUNNER_AMD64`
    Amd64,
    /// `vars.RUNNER_WIN`
    Windows,
    /// `vars.RUNNER_MAC`
    Mac,
}

impl Runner {
    /// Every runner token.
    pub const ALL: [Self; 4] = [Self::Arm64, Self::Amd64, Self::Windows, Self::Mac];

    /// The token written into the document.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Arm64 => "vars.RUNNER_ARM64",
            Self::Amd64 => "vars.RUNNER_AMD64",
            Self::Windows => "vars.RUNNER_WIN",
            Self::Mac => "vars.RUNNER_MAC",
        }
    }
}

impl fmt::Display for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Runner> for String {
    fn from(runner: Runner) -> Self {
        runner.as_str().to_string()
    }
}

/// Operating-system families keyed the same way as `$RUNNER_OS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// `Linux`
    Linux,
    /// `macOS`
    MacOs,
    /// `Windows`
    Windows,
}

impl Platform {
    /// The `$RUNNER_OS` value for this platform.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::MacOs => "macOS",
            Self::Windows => "Windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fully-resolved configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    /// Default runner for every job without its own `os` list
    pub execution_target: String,
    /// Cross-cutting settings
    pub global: Global,
    /// Release build and publish settings
    pub release: Release,
    /// Documentation site jobs
    pub pages: Pages,
    /// Automated review job
    pub ai: AiJob,
    /// Named pipeline jobs
    pub jobs: Jobs,
}

/// Cross-cutting settings shared by every job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Global {
    /// System packages installed before each job, per platform
    pub packages: Packages,
    /// Toolchains installed for non-matrix jobs
    pub toolchains: Vec<String>,
    /// Feature sets used by non-matrix jobs
    pub features: Vec<String>,
    /// `RUST_LOG` value exported to every job
    pub rust_log: String,
    /// Coverage upload integration
    pub codecov: Codecov,
}

/// Comma-separated package lists keyed by `$RUNNER_OS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packages {
    /// Packages for Linux runners
    #[serde(rename = "Linux", default, skip_serializing_if = "Option::is_none")]
    pub linux: Option<String>,
    /// Packages for macOS runners
    #[serde(rename = "macOS", default, skip_serializing_if = "Option::is_none")]
    pub macos: Option<String>,
    /// Packages for Windows runners
    #[serde(rename = "Windows", default, skip_serializing_if = "Option::is_none")]
    pub windows: Option<String>,
}

impl Packages {
    /// Package list for a platform.
    #[must_use]
    pub fn get(&self, platform: Platform) -> Option<&str> {
        match platform {
            Platform::Linux => self.linux.as_deref(),
            Platform::MacOs => self.macos.as_deref(),
            Platform::Windows => self.windows.as_deref(),
        }
    }

    /// Replace the package list for a platform.
    pub fn set(&mut self, platform: Platform, packages: Option<String>) {
        match platform {
            Platform::Linux => self.linux = packages,
            Platform::MacOs => self.macos = packages,
            Platform::Windows => self.windows = packages,
        }
    }
}

/// Coverage upload flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Codecov {
    /// Upload coverage reports
    pub enabled: bool,
    /// Fail the coverage job when the upload fails
    pub fail_ci_if_error: bool,
}

/// Release settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    /// Build and attach binaries
    pub bin: bool,
    /// Publish crates
    pub publish: bool,
    /// Build Debian packages
    pub debian: bool,
    /// Cargo profile used for release builds
    pub profile: String,
    /// Compilation targets, each paired with the runner that builds it
    pub targets: Vec<ReleaseTarget>,
}

/// A release compilation target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseTarget {
    /// Target triple (e.g. `x86_64-unknown-linux-gnu`)
    pub target: String,
    /// Runner that builds this target
    pub os: String,
    /// Features enabled for this target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
}

impl ReleaseTarget {
    /// Pair a target triple with a runner.
    pub fn new(target: impl Into<String>, os: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            os: os.into(),
            features: None,
        }
    }

    /// Set the features enabled for this target.
    #[must_use]
    pub fn features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features = Some(features.into_iter().map(Into::into).collect());
        self
    }
}

/// Documentation site jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pages {
    /// mdBook site
    pub mdbook: PageJob,
}

/// A documentation site build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageJob {
    /// Whether the job runs
    #[serde(rename = "if")]
    pub enabled: Condition,
    /// Book source directory
    pub path: String,
    /// Tool version pin
    pub version: String,
    /// Build command
    pub command: String,
}

/// Automated pull-request review job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiJob {
    /// Whether the job runs
    pub enabled: bool,
    /// Bots allowed to trigger a review
    pub allowed_bots: String,
    /// Tool-access arguments passed to the review action
    pub claude_args: String,
    /// Keep one sticky review comment instead of posting new ones
    pub use_sticky_comment: bool,
    /// Report progress on the pull request
    pub track_progress: bool,
    /// Free-form settings passed through to the action
    pub additional: String,
    /// Review prompt
    pub prompt: String,
}

/// Fields shared by every job kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseJob {
    /// Whether the job runs
    #[serde(rename = "if")]
    pub enabled: Condition,
    /// Whether a failure is tolerated
    pub continue_on_error: Condition,
    /// Shell invocation
    #[serde(rename = "run", default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Build matrix for a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSpec {
    /// Runners
    pub os: Vec<String>,
    /// Toolchains
    pub toolchains: Vec<String>,
    /// Feature sets
    pub features: Vec<String>,
}

/// Lint job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LintJob {
    /// Common job fields
    #[serde(flatten)]
    pub base: BaseJob,
    /// Extra clippy flags
    pub flags: String,
    /// Build matrix
    pub matrix: MatrixSpec,
}

/// Coverage job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageJob {
    /// Common job fields
    #[serde(flatten)]
    pub base: BaseJob,
    /// Build matrix
    pub matrix: MatrixSpec,
}

/// User-defined extra job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraJob {
    /// Common job fields
    #[serde(flatten)]
    pub base: BaseJob,
    /// Display name
    pub name: String,
    /// Build matrix
    pub matrix: MatrixSpec,
}

/// Sanitizer suite: three sub-jobs sharing one matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerSuite {
    /// Suite-level switch
    pub enabled: bool,
    /// AddressSanitizer run
    pub address: BaseJob,
    /// LeakSanitizer run
    pub leak: BaseJob,
    /// ThreadSanitizer run
    pub thread: BaseJob,
    /// Build matrix
    pub matrix: MatrixSpec,
}

/// Named pipeline jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jobs {
    /// `cargo fmt --check`
    pub fmt: BaseJob,
    /// Semver compatibility check
    pub semver: BaseJob,
    /// Feature powerset check
    pub hack: BaseJob,
    /// Documentation build check
    pub doc_check: BaseJob,
    /// Manifest ordering check
    pub cargo_sort: BaseJob,
    /// Unused dependency detection
    pub dependencies: BaseJob,
    /// Coverage
    pub coverage: CoverageJob,
    /// Clippy
    pub clippy: LintJob,
    /// Sanitizers
    pub sanitizers: SanitizerSuite,
    /// User-defined job
    pub extra: ExtraJob,
}

/// The fixed set of job names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JobName {
    /// `fmt`
    Fmt,
    /// `semver`
    Semver,
    /// `hack`
    Hack,
    /// `docCheck`
    DocCheck,
    /// `cargoSort`
    CargoSort,
    /// `dependencies`
    Dependencies,
    /// `coverage`
    Coverage,
    /// `clippy`
    Clippy,
    /// `sanitizers`
    Sanitizers,
    /// `extra`
    Extra,
}

impl JobName {
    /// Every job, in document order.
    pub const ALL: [Self; 10] = [
        Self::Fmt,
        Self::Semver,
        Self::Hack,
        Self::DocCheck,
        Self::CargoSort,
        Self::Dependencies,
        Self::Coverage,
        Self::Clippy,
        Self::Sanitizers,
        Self::Extra,
    ];

    /// The job's key under `jobs`.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Fmt => "fmt",
            Self::Semver => "semver",
            Self::Hack => "hack",
            Self::DocCheck => "docCheck",
            Self::CargoSort => "cargoSort",
            Self::Dependencies => "dependencies",
            Self::Coverage => "coverage",
            Self::Clippy => "clippy",
            Self::Sanitizers => "sanitizers",
            Self::Extra => "extra",
        }
    }

    /// Whether the job carries a build matrix.
    ///
    /// New jobs must be registered here explicitly; the match is exhaustive so
    /// the compiler flags any job that has not been classified.
    #[must_use]
    pub const fn has_matrix(&self) -> bool {
        match self {
            Self::Coverage | Self::Clippy | Self::Sanitizers | Self::Extra => true,
            Self::Fmt
            | Self::Semver
            | Self::Hack
            | Self::DocCheck
            | Self::CargoSort
            | Self::Dependencies => false,
        }
    }

    /// Jobs that carry a build matrix.
    pub fn matrix_jobs() -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(Self::has_matrix)
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for JobName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.key() == s)
            .ok_or_else(|| format!("Unknown job: {s}"))
    }
}

impl Jobs {
    /// The shared fields of a job. The sanitizer suite has none of its own.
    #[must_use]
    pub fn base(&self, name: JobName) -> Option<&BaseJob> {
        match name {
            JobName::Fmt => Some(&self.fmt),
            JobName::Semver => Some(&self.semver),
            JobName::Hack => Some(&self.hack),
            JobName::DocCheck => Some(&self.doc_check),
            JobName::CargoSort => Some(&self.cargo_sort),
            JobName::Dependencies => Some(&self.dependencies),
            JobName::Coverage => Some(&self.coverage.base),
            JobName::Clippy => Some(&self.clippy.base),
            JobName::Extra => Some(&self.extra.base),
            JobName::Sanitizers => None,
        }
    }

    /// Mutable access to the shared fields of a job.
    pub fn base_mut(&mut self, name: JobName) -> Option<&mut BaseJob> {
        match name {
            JobName::Fmt => Some(&mut self.fmt),
            JobName::Semver => Some(&mut self.semver),
            JobName::Hack => Some(&mut self.hack),
            JobName::DocCheck => Some(&mut self.doc_check),
            JobName::CargoSort => Some(&mut self.cargo_sort),
            JobName::Dependencies => Some(&mut self.dependencies),
            JobName::Coverage => Some(&mut self.coverage.base),
            JobName::Clippy => Some(&mut self.clippy.base),
            JobName::Extra => Some(&mut self.extra.base),
            JobName::Sanitizers => None,
        }
    }

    /// The build matrix of a matrix-bearing job.
    #[must_use]
    pub fn matrix(&self, name: JobName) -> Option<&MatrixSpec> {
        match name {
            JobName::Coverage => Some(&self.coverage.matrix),
            JobName::Clippy => Some(&self.clippy.matrix),
            JobName::Sanitizers => Some(&self.sanitizers.matrix),
            JobName::Extra => Some(&self.extra.matrix),
            JobName::Fmt
            | JobName::Semver
            | JobName::Hack
            | JobName::DocCheck
            | JobName::CargoSort
            | JobName::Dependencies => None,
        }
    }

    /// Mutable access to the build matrix of a matrix-bearing job.
    pub fn matrix_mut(&mut self, name: JobName) -> Option<&mut MatrixSpec> {
        match name {
            JobName::Coverage => Some(&mut self.coverage.matrix),
            JobName::Clippy => Some(&mut self.clippy.matrix),
            JobName::Sanitizers => Some(&mut self.sanitizers.matrix),
            JobName::Extra => Some(&mut self.extra.matrix),
            JobName::Fmt
            | JobName::Semver
            | JobName::Hack
            | JobName::DocCheck
            | JobName::CargoSort
            | JobName::Dependencies => None,
        }
    }

    /// Whether a job is switched on with a literal `true`.
    ///
    /// Expressions are evaluated by the workflow engine and report `None`.
    #[must_use]
    pub fn is_enabled(&self, name: JobName) -> Option<bool> {
        match name {
            JobName::Sanitizers => Some(self.sanitizers.enabled),
            other => self.base(other).and_then(|job| job.enabled.as_flag()),
        }
    }
}
