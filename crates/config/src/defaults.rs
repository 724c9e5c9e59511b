//! Canonical default table.
//!
//! Both the layering engine and [`ConfigBuilder`](crate::ConfigBuilder) draw
//! their defaults from these functions. Each call constructs fresh owned
//! values, so no two documents ever share a nested list.
//!
//! Matrix `os` lists default to empty; they are filled from the execution
//! target by [`normalize`](crate::normalize) or seeded eagerly by the builder.

use crate::model::{
    AiJob, BaseJob, Codecov, Condition, ConfigDocument, CoverageJob, ExtraJob, Global, Jobs,
    LintJob, MatrixSpec, PageJob, Packages, Pages, Release, ReleaseTarget, Runner, SanitizerSuite,
};

/// Toolchain used when none is configured.
pub const DEFAULT_TOOLCHAIN: &str = "stable";

/// Feature set used when none is configured.
pub const DEFAULT_FEATURE: &str = "default";

/// Toolchain required by the sanitizer suite.
pub const SANITIZER_TOOLCHAIN: &str = "nightly";

/// Target triple sanitizers and the default release build run on.
pub const LINUX_GNU_TARGET: &str = "x86_64-unknown-linux-gnu";

/// Runner the builder targets unless told otherwise.
pub const DEFAULT_EXECUTION_TARGET: Runner = Runner::Arm64;

/// Prompt used by the builder until a real prompt is attached.
///
/// It instructs the reviewer to fail loudly so a missing prompt template is
/// never mistaken for a clean review.
pub const PROMPT_PLACEHOLDER: &str = "POISON PILL\n\nERROR: Prompt template was not loaded. This workflow MUST fail immediately. Do not approve or review any code. Report this configuration error.";

/// Tools the review job may call.
pub const REVIEW_TOOL_ARGS: &str = r#"--allowedTools "mcp__github_inline_comment__create_inline_comment,Bash(find *),Bash(diff *),Bash(jq *),Bash(git *),Bash(cargo *),Bash(gh *)""#;

const CARGO_SORT_RUN: &str = "if [ -f ./scripts/cargo-sort.sh ]; then\n  ./scripts/cargo-sort.sh\nelse\n  cargo sort -c -g\nfi\n";

const COVERAGE_RUN: &str = r#"cmd="cargo llvm-cov ${LLVM_ARGS} --locked --lcov --output-path lcov-${FEATURES}.info --no-fail-fast"
if [ "$FEATURES" == "default" ]; then
  $cmd -- --no-capture $CARGO_ARGS
else
  $cmd --features "$FEATURES" -- --no-capture $CARGO_ARGS
fi
"#;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn job(enabled: bool, command: Option<&str>) -> BaseJob {
    BaseJob {
        enabled: Condition::Flag(enabled),
        continue_on_error: Condition::Flag(false),
        command: command.map(str::to_string),
    }
}

/// Default build matrix: no runners yet, stable toolchain, default features.
#[must_use]
pub fn matrix() -> MatrixSpec {
    MatrixSpec {
        os: Vec::new(),
        toolchains: strings(&[DEFAULT_TOOLCHAIN]),
        features: strings(&[DEFAULT_FEATURE]),
    }
}

/// Default global settings.
#[must_use]
pub fn global() -> Global {
    Global {
        packages: Packages::default(),
        toolchains: strings(&[DEFAULT_TOOLCHAIN]),
        features: strings(&[DEFAULT_FEATURE]),
        rust_log: "info".to_string(),
        codecov: codecov(),
    }
}

/// Default coverage upload flags.
#[must_use]
pub fn codecov() -> Codecov {
    Codecov {
        enabled: true,
        fail_ci_if_error: false,
    }
}

/// Default release settings: publish crates, one Linux GNU target.
#[must_use]
pub fn release() -> Release {
    Release {
        bin: false,
        publish: true,
        debian: false,
        profile: "release".to_string(),
        targets: vec![ReleaseTarget::new(LINUX_GNU_TARGET, Runner::Amd64)],
    }
}

/// Default documentation site jobs.
#[must_use]
pub fn pages() -> Pages {
    Pages { mdbook: mdbook() }
}

/// Default mdBook job (disabled).
#[must_use]
pub fn mdbook() -> PageJob {
    PageJob {
        enabled: Condition::Flag(false),
        path: "docs".to_string(),
        version: "latest".to_string(),
        command: "mdbook build".to_string(),
    }
}

/// Default review job around the given prompt.
///
/// The prompt has no default of its own; documents must supply one.
#[must_use]
pub fn ai(prompt: impl Into<String>) -> AiJob {
    AiJob {
        enabled: true,
        allowed_bots: "*".to_string(),
        claude_args: REVIEW_TOOL_ARGS.to_string(),
        use_sticky_comment: false,
        track_progress: true,
        additional: String::new(),
        prompt: prompt.into(),
    }
}

/// Default `fmt` job.
#[must_use]
pub fn fmt() -> BaseJob {
    job(true, Some("cargo +nightly fmt --check --all"))
}

/// Default `semver` job. The renderer supplies the check itself.
#[must_use]
pub fn semver() -> BaseJob {
    job(true, None)
}

/// Default `hack` job.
#[must_use]
pub fn hack() -> BaseJob {
    job(true, Some("cargo hack --feature-powerset check"))
}

/// Default `docCheck` job.
#[must_use]
pub fn doc_check() -> BaseJob {
    job(true, Some("cargo +nightly docs-rs"))
}

/// Default `cargoSort` job. A repository script takes precedence.
#[must_use]
pub fn cargo_sort() -> BaseJob {
    job(true, Some(CARGO_SORT_RUN))
}

/// Default `dependencies` job.
#[must_use]
pub fn dependencies() -> BaseJob {
    job(true, Some("cargo machete --with-metadata"))
}

/// Default `coverage` job.
#[must_use]
pub fn coverage() -> CoverageJob {
    CoverageJob {
        base: job(true, Some(COVERAGE_RUN)),
        matrix: matrix(),
    }
}

/// Default `clippy` job.
#[must_use]
pub fn clippy() -> LintJob {
    LintJob {
        base: job(true, Some("")),
        flags: String::new(),
        matrix: matrix(),
    }
}

/// Default `extra` job (disabled until a command is attached).
#[must_use]
pub fn extra() -> ExtraJob {
    ExtraJob {
        base: job(false, Some("")),
        name: "extra".to_string(),
        matrix: matrix(),
    }
}

/// Default sanitizer suite. ThreadSanitizer is off; it needs single-threaded tests.
#[must_use]
pub fn sanitizers() -> SanitizerSuite {
    SanitizerSuite {
        enabled: true,
        address: job(
            true,
            Some(
                format!(
                    "cargo test --lib --tests --no-fail-fast --target {LINUX_GNU_TARGET} -- --no-capture"
                )
                .as_str(),
            ),
        ),
        leak: job(
            true,
            Some(format!("cargo test --target {LINUX_GNU_TARGET} -- --no-capture").as_str()),
        ),
        thread: job(
            false,
            Some(format!("cargo test --target {LINUX_GNU_TARGET} -- --test-threads=1").as_str()),
        ),
        matrix: MatrixSpec {
            toolchains: strings(&[SANITIZER_TOOLCHAIN]),
            ..matrix()
        },
    }
}

/// Default job set.
#[must_use]
pub fn jobs() -> Jobs {
    Jobs {
        fmt: fmt(),
        semver: semver(),
        hack: hack(),
        doc_check: doc_check(),
        cargo_sort: cargo_sort(),
        dependencies: dependencies(),
        coverage: coverage(),
        clippy: clippy(),
        sanitizers: sanitizers(),
        extra: extra(),
    }
}

/// A complete default document. Matrix `os` lists are still empty.
#[must_use]
pub fn document(execution_target: impl Into<String>, prompt: impl Into<String>) -> ConfigDocument {
    ConfigDocument {
        execution_target: execution_target.into(),
        global: global(),
        release: release(),
        pages: pages(),
        ai: ai(prompt),
        jobs: jobs(),
    }
}
