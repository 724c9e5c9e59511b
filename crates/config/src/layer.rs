//! Default layering.
//!
//! Overlays an authored document onto fresh values from the
//! [default table](crate::defaults). Present fields always win, including
//! empty strings, `false` and empty lists; absent fields keep the default.
//! Substructures recurse, so a supplied job with only `run` set still picks up
//! its default matrix.

use crate::defaults;
use crate::error::{Error, Result};
use crate::model::{
    AiJob, BaseJob, Codecov, Condition, ConfigDocument, CoverageJob, ExtraJob, Global, Jobs, LintJob,
    MatrixSpec, PageJob, Packages, Pages, Release, SanitizerSuite,
};
use crate::schema::{
    RawAi, RawBaseJob, RawCodecov, RawConfig, RawCoverageJob, RawExtraJob, RawGlobal, RawJobs,
    RawLintJob, RawMatrix, RawPackages, RawPageJob, RawPages, RawRelease, RawSanitizerSuite,
};
use tracing::debug;

/// An authored substructure that can be laid over its resolved default.
pub trait Layer {
    /// The resolved type this layer applies to.
    type Resolved;

    /// Overwrite every field of `base` that this layer sets.
    fn layer_onto(self, base: Self::Resolved) -> Self::Resolved;
}

impl<L: Layer> Layer for Option<L> {
    type Resolved = L::Resolved;

    fn layer_onto(self, base: Self::Resolved) -> Self::Resolved {
        match self {
            Some(layer) => layer.layer_onto(base),
            None => base,
        }
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn base_fields(
    enabled: Option<Condition>,
    continue_on_error: Option<Condition>,
    command: Option<String>,
) -> RawBaseJob {
    RawBaseJob {
        enabled,
        continue_on_error,
        command,
    }
}

/// Materialize every omitted field of a shape-valid document.
///
/// The execution target is copied as written (empty when absent); resolving it
/// is the orchestrator's job. Matrix `os` lists stay empty until
/// [`normalize`](crate::normalize) runs.
///
/// # Errors
///
/// Returns [`Error::Shape`] when the document has no `ai` section, since the
/// review prompt has no default.
pub fn layer(raw: RawConfig) -> Result<ConfigDocument> {
    let RawConfig {
        execution_target,
        global,
        release,
        pages,
        ai,
        jobs,
    } = raw;

    let ai = ai.ok_or_else(|| Error::shape("ai", "missing required section"))?;

    let document = ConfigDocument {
        execution_target: execution_target.unwrap_or_default(),
        global: global.layer_onto(defaults::global()),
        release: release.layer_onto(defaults::release()),
        pages: pages.layer_onto(defaults::pages()),
        ai: ai.layer_onto(defaults::ai(String::new())),
        jobs: jobs.layer_onto(defaults::jobs()),
    };
    debug!("Applied schema defaults");
    Ok(document)
}

impl Layer for RawGlobal {
    type Resolved = Global;

    fn layer_onto(self, mut base: Global) -> Global {
        base.packages = self.packages.layer_onto(base.packages);
        set(&mut base.toolchains, self.toolchains);
        set(&mut base.features, self.features);
        set(&mut base.rust_log, self.rust_log);
        base.codecov = self.codecov.layer_onto(base.codecov);
        base
    }
}

impl Layer for RawPackages {
    type Resolved = Packages;

    fn layer_onto(self, mut base: Packages) -> Packages {
        if self.linux.is_some() {
            base.linux = self.linux;
        }
        if self.macos.is_some() {
            base.macos = self.macos;
        }
        if self.windows.is_some() {
            base.windows = self.windows;
        }
        base
    }
}

impl Layer for RawCodecov {
    type Resolved = Codecov;

    fn layer_onto(self, mut base: Codecov) -> Codecov {
        set(&mut base.enabled, self.enabled);
        set(&mut base.fail_ci_if_error, self.fail_ci_if_error);
        base
    }
}

impl Layer for RawRelease {
    type Resolved = Release;

    fn layer_onto(self, mut base: Release) -> Release {
        set(&mut base.bin, self.bin);
        set(&mut base.publish, self.publish);
        set(&mut base.debian, self.debian);
        set(&mut base.profile, self.profile);
        set(&mut base.targets, self.targets);
        base
    }
}

impl Layer for RawPages {
    type Resolved = Pages;

    fn layer_onto(self, mut base: Pages) -> Pages {
        base.mdbook = self.mdbook.layer_onto(base.mdbook);
        base
    }
}

impl Layer for RawPageJob {
    type Resolved = PageJob;

    fn layer_onto(self, mut base: PageJob) -> PageJob {
        set(&mut base.enabled, self.enabled);
        set(&mut base.path, self.path);
        set(&mut base.version, self.version);
        set(&mut base.command, self.command);
        base
    }
}

impl Layer for RawAi {
    type Resolved = AiJob;

    fn layer_onto(self, mut base: AiJob) -> AiJob {
        set(&mut base.enabled, self.enabled);
        set(&mut base.allowed_bots, self.allowed_bots);
        set(&mut base.claude_args, self.claude_args);
        set(&mut base.use_sticky_comment, self.use_sticky_comment);
        set(&mut base.track_progress, self.track_progress);
        set(&mut base.additional, self.additional);
        base.prompt = self.prompt;
        base
    }
}

impl Layer for RawBaseJob {
    type Resolved = BaseJob;

    fn layer_onto(self, mut base: BaseJob) -> BaseJob {
        set(&mut base.enabled, self.enabled);
        set(&mut base.continue_on_error, self.continue_on_error);
        if self.command.is_some() {
            base.command = self.command;
        }
        base
    }
}

impl Layer for RawMatrix {
    type Resolved = MatrixSpec;

    fn layer_onto(self, mut base: MatrixSpec) -> MatrixSpec {
        set(&mut base.os, self.os);
        set(&mut base.toolchains, self.toolchains);
        set(&mut base.features, self.features);
        base
    }
}

impl Layer for RawLintJob {
    type Resolved = LintJob;

    fn layer_onto(self, mut base: LintJob) -> LintJob {
        base.base = base_fields(self.enabled, self.continue_on_error, self.command)
            .layer_onto(base.base);
        set(&mut base.flags, self.flags);
        base.matrix = self.matrix.layer_onto(base.matrix);
        base
    }
}

impl Layer for RawCoverageJob {
    type Resolved = CoverageJob;

    fn layer_onto(self, mut base: CoverageJob) -> CoverageJob {
        base.base = base_fields(self.enabled, self.continue_on_error, self.command)
            .layer_onto(base.base);
        base.matrix = self.matrix.layer_onto(base.matrix);
        base
    }
}

impl Layer for RawExtraJob {
    type Resolved = ExtraJob;

    fn layer_onto(self, mut base: ExtraJob) -> ExtraJob {
        base.base = base_fields(self.enabled, self.continue_on_error, self.command)
            .layer_onto(base.base);
        set(&mut base.name, self.name);
        base.matrix = self.matrix.layer_onto(base.matrix);
        base
    }
}

impl Layer for RawSanitizerSuite {
    type Resolved = SanitizerSuite;

    fn layer_onto(self, mut base: SanitizerSuite) -> SanitizerSuite {
        set(&mut base.enabled, self.enabled);
        base.address = self.address.layer_onto(base.address);
        base.leak = self.leak.layer_onto(base.leak);
        base.thread = self.thread.layer_onto(base.thread);
        base.matrix = self.matrix.layer_onto(base.matrix);
        base
    }
}

impl Layer for RawJobs {
    type Resolved = Jobs;

    fn layer_onto(self, base: Jobs) -> Jobs {
        Jobs {
            fmt: self.fmt.layer_onto(base.fmt),
            semver: self.semver.layer_onto(base.semver),
            hack: self.hack.layer_onto(base.hack),
            doc_check: self.doc_check.layer_onto(base.doc_check),
            cargo_sort: self.cargo_sort.layer_onto(base.cargo_sort),
            dependencies: self.dependencies.layer_onto(base.dependencies),
            coverage: self.coverage.layer_onto(base.coverage),
            clippy: self.clippy.layer_onto(base.clippy),
            sanitizers: self.sanitizers.layer_onto(base.sanitizers),
            extra: self.extra.layer_onto(base.extra),
        }
    }
}
