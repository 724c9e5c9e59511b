//! Fluent construction of a canonical document.
//!
//! ```rust
//! use rustci_config::{ConfigBuilder, JobName, Runner};
//!
//! let config = ConfigBuilder::with_execution_target(Runner::Amd64)
//!     .enable_mdbook()
//!     .extra("integration", "cargo test --test integration")
//!     .semver(false)
//!     .disable(JobName::Coverage)
//!     .disable_sanitizers()
//!     .build()?;
//!
//! assert_eq!(config.jobs.extra.name, "integration");
//! # Ok::<(), rustci_config::Error>(())
//! ```

use crate::defaults;
use crate::error::{Error, Result};
use crate::model::{Condition, ConfigDocument, JobName, Platform, Release, ReleaseTarget};
use tracing::debug;

/// Optional overrides for the clippy job. Unset fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ClippyOptions {
    /// Whether the job runs
    pub enabled: Option<Condition>,
    /// Whether a failure is tolerated
    pub continue_on_error: Option<Condition>,
    /// Shell invocation
    pub run: Option<String>,
    /// Extra clippy flags
    pub flags: Option<String>,
    /// Matrix overrides
    pub matrix: MatrixOptions,
}

/// Optional overrides for the extra job.
#[derive(Debug, Clone, Default)]
pub struct ExtraOptions {
    /// Shell invocation
    pub run: Option<String>,
    /// Whether a failure is tolerated
    pub continue_on_error: Option<Condition>,
    /// Matrix overrides
    pub matrix: MatrixOptions,
}

/// Optional matrix overrides. Lists must be non-empty when set.
#[derive(Debug, Clone, Default)]
pub struct MatrixOptions {
    /// Runners
    pub os: Option<Vec<String>>,
    /// Toolchains
    pub toolchains: Option<Vec<String>>,
    /// Feature sets
    pub features: Option<Vec<String>>,
}

/// Builder for [`ConfigDocument`].
///
/// Starts from the [default table](crate::defaults) with every matrix `os`
/// seeded from the execution target, so `build()` never depends on deferred
/// normalization. The first malformed argument is kept and reported by
/// [`build`](Self::build); later calls still chain.
#[derive(Debug)]
pub struct ConfigBuilder {
    document: ConfigDocument,
    error: Option<Error>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    /// Builder targeting the default runner ([`defaults::DEFAULT_EXECUTION_TARGET`]).
    #[must_use]
    pub fn new() -> Self {
        Self::with_execution_target(defaults::DEFAULT_EXECUTION_TARGET)
    }

    /// Builder targeting the given runner.
    #[must_use]
    pub fn with_execution_target(target: impl Into<String>) -> Self {
        let target = target.into();
        let mut builder = Self {
            document: defaults::document(target.clone(), defaults::PROMPT_PLACEHOLDER),
            error: None,
        };

        if target.trim().is_empty() {
            builder.reject("execution_target", "must not be empty");
            return builder;
        }
        for name in JobName::matrix_jobs() {
            if let Some(matrix) = builder.document.jobs.matrix_mut(name) {
                matrix.os = vec![target.clone()];
            }
        }
        builder
    }

    fn reject(&mut self, argument: &'static str, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(Error::malformed(argument, message));
        }
    }

    fn checked_list(
        &mut self,
        argument: &'static str,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Option<Vec<String>> {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.reject(argument, "expected a non-empty list");
            None
        } else {
            Some(values)
        }
    }

    /// Set a job's `if` condition.
    ///
    /// The sanitizer suite only takes a literal flag.
    #[must_use]
    pub fn enable(mut self, name: JobName, condition: impl Into<Condition>) -> Self {
        let condition = condition.into();
        if name == JobName::Sanitizers {
            match condition.as_flag() {
                Some(flag) => self.document.jobs.sanitizers.enabled = flag,
                None => self.reject("condition", "the sanitizer suite takes a literal flag"),
            }
        } else if let Some(job) = self.document.jobs.base_mut(name) {
            job.enabled = condition;
        }
        self
    }

    /// Switch a job off.
    #[must_use]
    pub fn disable(self, name: JobName) -> Self {
        self.enable(name, false)
    }

    /// Set whether a job's failure is tolerated.
    #[must_use]
    pub fn continue_on_error(mut self, name: JobName, condition: impl Into<Condition>) -> Self {
        match self.document.jobs.base_mut(name) {
            Some(job) => job.continue_on_error = condition.into(),
            None => self.reject("name", format!("{name} has no continueOnError of its own")),
        }
        self
    }

    /// Set a job's shell invocation.
    #[must_use]
    pub fn run(mut self, name: JobName, command: impl Into<String>) -> Self {
        match self.document.jobs.base_mut(name) {
            Some(job) => job.command = Some(command.into()),
            None => self.reject("name", format!("{name} has no run command of its own")),
        }
        self
    }

    /// Toggle the `fmt` job.
    #[must_use]
    pub fn fmt(self, enable: bool) -> Self {
        self.enable(JobName::Fmt, enable)
    }

    /// Toggle the `semver` job.
    #[must_use]
    pub fn semver(self, enable: bool) -> Self {
        self.enable(JobName::Semver, enable)
    }

    /// Toggle the `hack` job.
    #[must_use]
    pub fn hack(self, enable: bool) -> Self {
        self.enable(JobName::Hack, enable)
    }

    /// Toggle the `docCheck` job.
    #[must_use]
    pub fn doc_check(self, enable: bool) -> Self {
        self.enable(JobName::DocCheck, enable)
    }

    /// Toggle the `cargoSort` job.
    #[must_use]
    pub fn cargo_sort(self, enable: bool) -> Self {
        self.enable(JobName::CargoSort, enable)
    }

    /// Toggle the `dependencies` job.
    #[must_use]
    pub fn dependencies(self, enable: bool) -> Self {
        self.enable(JobName::Dependencies, enable)
    }

    /// Switch the coverage job off.
    #[must_use]
    pub fn disable_coverage(self) -> Self {
        self.disable(JobName::Coverage)
    }

    /// Apply clippy overrides.
    #[must_use]
    pub fn clippy(mut self, options: ClippyOptions) -> Self {
        let ClippyOptions {
            enabled,
            continue_on_error,
            run,
            flags,
            matrix,
        } = options;

        let clippy = &mut self.document.jobs.clippy;
        if let Some(enabled) = enabled {
            clippy.base.enabled = enabled;
        }
        if let Some(continue_on_error) = continue_on_error {
            clippy.base.continue_on_error = continue_on_error;
        }
        if run.is_some() {
            clippy.base.command = run;
        }
        if let Some(flags) = flags {
            clippy.flags = flags;
        }
        self.apply_matrix(JobName::Clippy, matrix)
    }

    /// Set extra clippy flags.
    #[must_use]
    pub fn clippy_flags(mut self, flags: impl Into<String>) -> Self {
        self.document.jobs.clippy.flags = flags.into();
        self
    }

    fn apply_matrix(mut self, name: JobName, options: MatrixOptions) -> Self {
        if let Some(os) = options.os {
            self = self.matrix_os(name, os);
        }
        if let Some(toolchains) = options.toolchains {
            self = self.matrix_toolchains(name, toolchains);
        }
        if let Some(features) = options.features {
            self = self.matrix_features(name, features);
        }
        self
    }

    /// Replace a matrix job's runners.
    #[must_use]
    pub fn matrix_os(
        mut self,
        name: JobName,
        os: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        if let Some(os) = self.checked_list("os", os) {
            match self.document.jobs.matrix_mut(name) {
                Some(matrix) => matrix.os = os,
                None => self.reject("name", format!("{name} has no matrix")),
            }
        }
        self
    }

    /// Replace a matrix job's toolchains.
    #[must_use]
    pub fn matrix_toolchains(
        mut self,
        name: JobName,
        toolchains: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        if let Some(toolchains) = self.checked_list("toolchains", toolchains) {
            match self.document.jobs.matrix_mut(name) {
                Some(matrix) => matrix.toolchains = toolchains,
                None => self.reject("name", format!("{name} has no matrix")),
            }
        }
        self
    }

    /// Replace a matrix job's feature sets.
    #[must_use]
    pub fn matrix_features(
        mut self,
        name: JobName,
        features: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        if let Some(features) = self.checked_list("features", features) {
            match self.document.jobs.matrix_mut(name) {
                Some(matrix) => matrix.features = features,
                None => self.reject("name", format!("{name} has no matrix")),
            }
        }
        self
    }

    /// Replace the release settings.
    #[must_use]
    pub fn release(mut self, release: Release) -> Self {
        if release.targets.is_empty() {
            self.reject("targets", "expected a non-empty list");
        } else {
            self.document.release = release;
        }
        self
    }

    /// Replace the release targets.
    #[must_use]
    pub fn release_targets(mut self, targets: impl IntoIterator<Item = ReleaseTarget>) -> Self {
        let targets: Vec<ReleaseTarget> = targets.into_iter().collect();
        if targets.is_empty() {
            self.reject("targets", "expected a non-empty list");
        } else {
            self.document.release.targets = targets;
        }
        self
    }

    /// Set the system packages for a platform.
    #[must_use]
    pub fn packages(
        mut self,
        platform: Platform,
        packages: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        if let Some(packages) = self.checked_list("packages", packages) {
            self.document
                .global
                .packages
                .set(platform, Some(packages.join(",")));
        }
        self
    }

    /// Set the system packages for Linux runners.
    #[must_use]
    pub fn linux_packages(self, packages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.packages(Platform::Linux, packages)
    }

    /// Replace the global toolchain list.
    #[must_use]
    pub fn toolchains(mut self, toolchains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        if let Some(toolchains) = self.checked_list("toolchains", toolchains) {
            self.document.global.toolchains = toolchains;
        }
        self
    }

    /// Replace the global feature list.
    #[must_use]
    pub fn features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        if let Some(features) = self.checked_list("features", features) {
            self.document.global.features = features;
        }
        self
    }

    /// Toggle the sanitizer suite.
    #[must_use]
    pub fn sanitizers(self, enable: bool) -> Self {
        self.enable(JobName::Sanitizers, enable)
    }

    /// Switch the sanitizer suite off.
    #[must_use]
    pub fn disable_sanitizers(self) -> Self {
        self.sanitizers(false)
    }

    /// Attach and enable the extra job.
    #[must_use]
    pub fn extra(self, name: impl Into<String>, run: impl Into<String>) -> Self {
        self.extra_job(
            name,
            ExtraOptions {
                run: Some(run.into()),
                ..ExtraOptions::default()
            },
        )
    }

    /// Attach and enable the extra job with full options.
    #[must_use]
    pub fn extra_job(mut self, name: impl Into<String>, options: ExtraOptions) -> Self {
        let name = name.into();
        if name.trim().is_empty() {
            self.reject("name", "extra job name must not be empty");
            return self;
        }

        let extra = &mut self.document.jobs.extra;
        extra.base.enabled = Condition::Flag(true);
        extra.name = name;
        if options.run.is_some() {
            extra.base.command = options.run;
        }
        if let Some(continue_on_error) = options.continue_on_error {
            extra.base.continue_on_error = continue_on_error;
        }
        self.apply_matrix(JobName::Extra, options.matrix)
    }

    /// Enable the mdBook site job.
    #[must_use]
    pub fn enable_mdbook(mut self) -> Self {
        self.document.pages.mdbook.enabled = Condition::Flag(true);
        self
    }

    /// Attach the review prompt.
    #[must_use]
    pub fn ai_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            self.reject("prompt", "must not be empty");
        } else {
            self.document.ai.prompt = prompt;
        }
        self
    }

    /// Switch the review job off.
    #[must_use]
    pub fn disable_ai(mut self) -> Self {
        self.document.ai.enabled = false;
        self
    }

    /// Finish the session.
    ///
    /// # Errors
    ///
    /// Returns the first [`Error::MalformedBuilderArgument`] recorded by a mutator.
    pub fn build(self) -> Result<ConfigDocument> {
        if let Some(error) = self.error {
            return Err(error);
        }
        debug!(execution_target = %self.document.execution_target, "Built configuration document");
        Ok(self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Runner;

    #[test]
    fn test_default_build_seeds_every_matrix() {
        let doc = ConfigBuilder::new().build().unwrap();
        assert_eq!(doc.execution_target, "vars.RUNNER_ARM64");
        for name in JobName::matrix_jobs() {
            assert_eq!(doc.jobs.matrix(name).unwrap().os, vec!["vars.RUNNER_ARM64"]);
        }
        assert_eq!(doc.ai.prompt, defaults::PROMPT_PLACEHOLDER);
    }

    #[test]
    fn test_semver_only_touches_semver() {
        let baseline = ConfigBuilder::new().build().unwrap();
        let doc = ConfigBuilder::new().semver(false).build().unwrap();

        assert_eq!(doc.jobs.semver.enabled, Condition::Flag(false));
        for name in JobName::ALL.into_iter().filter(|n| *n != JobName::Semver) {
            assert_eq!(doc.jobs.base(name), baseline.jobs.base(name), "{name}");
            assert_eq!(doc.jobs.matrix(name), baseline.jobs.matrix(name), "{name}");
        }
    }

    #[test]
    fn test_sessions_do_not_share_state() {
        let first = ConfigBuilder::new()
            .matrix_toolchains(JobName::Clippy, ["nightly"])
            .linux_packages(["libssl-dev"])
            .build()
            .unwrap();
        let second = ConfigBuilder::new().build().unwrap();

        assert_eq!(first.jobs.clippy.matrix.toolchains, vec!["nightly"]);
        assert_eq!(second.jobs.clippy.matrix.toolchains, vec!["stable"]);
        assert_eq!(second.global.packages.linux, None);
    }

    #[test]
    fn test_extra_job() {
        let doc = ConfigBuilder::with_execution_target(Runner::Mac)
            .extra("test-extra", "echo hello")
            .build()
            .unwrap();

        assert_eq!(doc.jobs.extra.base.enabled, Condition::Flag(true));
        assert_eq!(doc.jobs.extra.name, "test-extra");
        assert_eq!(doc.jobs.extra.base.command.as_deref(), Some("echo hello"));
        assert_eq!(doc.jobs.extra.matrix.os, vec!["vars.RUNNER_MAC"]);
    }

    #[test]
    fn test_clippy_options() {
        let doc = ConfigBuilder::new()
            .clippy(ClippyOptions {
                flags: Some("-D warnings".to_string()),
                matrix: MatrixOptions {
                    toolchains: Some(vec!["stable".to_string(), "beta".to_string()]),
                    ..MatrixOptions::default()
                },
                ..ClippyOptions::default()
            })
            .build()
            .unwrap();

        assert_eq!(doc.jobs.clippy.flags, "-D warnings");
        assert_eq!(doc.jobs.clippy.matrix.toolchains, vec!["stable", "beta"]);
        assert_eq!(doc.jobs.clippy.matrix.os, vec!["vars.RUNNER_ARM64"]);
        assert_eq!(doc.jobs.clippy.base.enabled, Condition::Flag(true));
    }

    #[test]
    fn test_empty_release_targets_rejected() {
        let err = ConfigBuilder::new()
            .release_targets(Vec::new())
            .semver(false)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedBuilderArgument {
                argument: "targets",
                ..
            }
        ));
    }

    #[test]
    fn test_first_malformed_argument_wins() {
        let err = ConfigBuilder::new()
            .matrix_os(JobName::Fmt, ["ubuntu-latest"])
            .toolchains(Vec::<String>::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MalformedBuilderArgument { argument: "name", .. }));
    }

    #[test]
    fn test_sanitizer_suite_rejects_expressions() {
        let err = ConfigBuilder::new()
            .enable(JobName::Sanitizers, "${{ github.ref == 'refs/heads/main' }}")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::MalformedBuilderArgument { argument: "condition", .. }));

        let doc = ConfigBuilder::new().disable_sanitizers().build().unwrap();
        assert!(!doc.jobs.sanitizers.enabled);
    }

    #[test]
    fn test_empty_execution_target_rejected() {
        let err = ConfigBuilder::with_execution_target("").build().unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedBuilderArgument {
                argument: "execution_target",
                ..
            }
        ));
    }

    #[test]
    fn test_release_replacement() {
        let doc = ConfigBuilder::new()
            .release(Release {
                bin: true,
                publish: false,
                debian: true,
                profile: "dist".to_string(),
                targets: vec![
                    ReleaseTarget::new("aarch64-apple-darwin", Runner::Mac),
                    ReleaseTarget::new("x86_64-unknown-linux-gnu", Runner::Amd64)
                        .features(["vendored"]),
                ],
            })
            .build()
            .unwrap();

        assert!(doc.release.bin);
        assert_eq!(doc.release.targets.len(), 2);
        assert_eq!(
            doc.release.targets[1].features,
            Some(vec!["vendored".to_string()])
        );
    }

    #[test]
    fn test_toggles() {
        let doc = ConfigBuilder::new()
            .enable_mdbook()
            .disable_ai()
            .disable_coverage()
            .fmt(false)
            .continue_on_error(JobName::Hack, true)
            .run(JobName::DocCheck, "cargo doc --no-deps")
            .build()
            .unwrap();

        assert_eq!(doc.pages.mdbook.enabled, Condition::Flag(true));
        assert!(!doc.ai.enabled);
        assert_eq!(doc.jobs.is_enabled(JobName::Coverage), Some(false));
        assert_eq!(doc.jobs.is_enabled(JobName::Fmt), Some(false));
        assert_eq!(doc.jobs.hack.continue_on_error, Condition::Flag(true));
        assert_eq!(doc.jobs.doc_check.command.as_deref(), Some("cargo doc --no-deps"));
    }
}
