use crate::{build::resolve::BuildInfo, common::tool::ToolCommand};
use anyhow::Result;
use derive_more::Display;
use std::path::{Path, PathBuf};
use std::thread;

pub const COVERAGE_INFO_FILENAME: &str = "coverage.info";
pub const COVERAGE_HTML_DIRNAME: &str = "coverage_html";

/// Sources that don't belong in the coverage report.
pub const COVERAGE_EXCLUDE_PATTERNS: &[&str] = &["/usr/*", "*/third_party/*", "*/tests/*"];

#[derive(Display, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    #[display("generate")]
    Generate,
    #[display("clean")]
    Clean,
    #[display("build")]
    Build,
    #[display("test")]
    Test,
    #[display("coverage capture")]
    CoverageCapture,
    #[display("coverage report")]
    CoverageReport,
}

/// Leave two processors for the rest of the machine, but always use at least one.
pub fn parallel_jobs(processor_ct: usize) -> usize {
    processor_ct.saturating_sub(2).max(1)
}

pub fn available_parallel_jobs() -> usize {
    let processor_ct = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    parallel_jobs(processor_ct)
}

/// The ordered external invocations for one run. Every command runs inside the build directory.
pub fn plan(build_info: &BuildInfo, source_dir: &Path, jobs: usize) -> Vec<(Step, ToolCommand)> {
    let build_dir = PathBuf::from(build_info.build_dir() as &PathBuf);
    let in_build_dir = |descr: &'static str, program: &str| {
        ToolCommand::new(descr, program).dir(build_dir.clone())
    };

    let mut steps = vec![];

    if !build_info.cached() {
        let cmd = in_build_dir("generator", "cmake")
            .arg("-S")
            .arg(source_dir)
            .args(build_info.build_flags().iter())
            .envs(build_info.env());
        steps.push((Step::Generate, cmd));
    }

    if build_info.clean() {
        let cmd = in_build_dir("clean", "cmake").args(["--build", ".", "--target", "clean"]);
        steps.push((Step::Clean, cmd));
    }

    let cmd = in_build_dir("build driver", "cmake")
        .args(["--build", ".", "--parallel"])
        .arg(jobs.to_string());
    steps.push((Step::Build, cmd));

    if build_info.run_tests() {
        let cmd = in_build_dir("test runner", "ctest").args([
            "--output-on-failure",
            "--stop-on-failure",
            "--verbose",
        ]);
        steps.push((Step::Test, cmd));
    }

    if build_info.run_coverage() {
        let mut cmd = in_build_dir("coverage capture", "lcov").args([
            "--capture",
            "--directory",
            ".",
            "--output-file",
            COVERAGE_INFO_FILENAME,
        ]);
        for pattern in COVERAGE_EXCLUDE_PATTERNS {
            cmd = cmd.args(["--exclude", *pattern]);
        }
        steps.push((Step::CoverageCapture, cmd));

        let cmd = in_build_dir("coverage report", "genhtml").args([
            COVERAGE_INFO_FILENAME,
            "--output-directory",
            COVERAGE_HTML_DIRNAME,
        ]);
        steps.push((Step::CoverageReport, cmd));
    }

    steps
}

pub fn execute(build_info: &BuildInfo, source_dir: &Path) -> Result<()> {
    let steps = plan(build_info, source_dir, available_parallel_jobs());
    execute_steps(build_info, source_dir, steps)
}

/// Run the steps in order. The first failure ends the run; nothing already done is undone.
/// The build is persisted right after the generate step succeeds.
pub fn execute_steps(
    build_info: &BuildInfo,
    source_dir: &Path,
    steps: Vec<(Step, ToolCommand)>,
) -> Result<()> {
    for (step, cmd) in steps {
        log::info!("Step: {step}");
        cmd.run()?;

        if step == Step::Generate {
            build_info.persisted().store(source_dir)?;
        }
    }

    if build_info.run_coverage() {
        let report_dir = build_info.build_dir().join(COVERAGE_HTML_DIRNAME);
        println!("Coverage report: {}", report_dir.join("index.html").display());
    }
    Ok(())
}
