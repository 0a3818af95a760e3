use super::utils::{dir_flag, file_name_of, put_marker, resolve_flags};
use crate::build::{
    build_dir,
    persist::PersistedBuild,
    resolve::{BuildInfo, TESTS_FLAG},
    steps::{COVERAGE_EXCLUDE_PATTERNS, Step, execute_steps, parallel_jobs, plan},
};
use crate::common::tool::ToolCommand;
use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

fn step_kinds(steps: &[(Step, ToolCommand)]) -> Vec<Step> {
    steps.iter().map(|(step, _)| *step).collect()
}

fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

#[test]
fn jobs_leave_two_processors() {
    assert_eq!(parallel_jobs(0), 1);
    assert_eq!(parallel_jobs(1), 1);
    assert_eq!(parallel_jobs(3), 1);
    assert_eq!(parallel_jobs(4), 2);
    assert_eq!(parallel_jobs(16), 14);
}

#[test]
fn no_flags_on_fresh_checkout() -> Result<()> {
    let src = tempfile::tempdir()?;
    let mut build_info = resolve_flags(&[], src.path())?;
    build_dir::prepare(&mut build_info)?;
    let build = src.path().join("build");
    assert!(build.is_dir());

    let steps = plan(&build_info, src.path(), 6);
    assert_eq!(step_kinds(&steps), vec![Step::Generate, Step::Build]);

    let (_, generate) = &steps[0];
    assert_eq!(generate.program, "cmake");
    assert_eq!(generate.dir.as_ref(), Some(&build));
    assert_eq!(generate.args[0], "-S");
    assert_eq!(PathBuf::from(&generate.args[1]), src.path());
    assert!(generate.has_arg("-DCMAKE_BUILD_TYPE=Debug"));
    assert_eq!(file_name_of(&generate.env["CC"]), "clang");
    assert_eq!(file_name_of(&generate.env["CXX"]), "clang++");

    let (_, build_driver) = &steps[1];
    assert_eq!(build_driver.program, "cmake");
    assert_eq!(build_driver.dir.as_ref(), Some(&build));
    assert_eq!(build_driver.args, os_args(&["--build", ".", "--parallel", "6"]));
    Ok(())
}

#[test]
fn gnu_release_tests() -> Result<()> {
    let src = tempfile::tempdir()?;
    let mut build_info = resolve_flags(&["--gnu", "--release", "--tests"], src.path())?;
    build_dir::prepare(&mut build_info)?;

    let steps = plan(&build_info, src.path(), 1);
    assert_eq!(
        step_kinds(&steps),
        vec![Step::Generate, Step::Build, Step::Test]
    );

    let (_, generate) = &steps[0];
    assert!(generate.has_arg("-DCMAKE_BUILD_TYPE=Release"));
    assert!(generate.has_arg(TESTS_FLAG));
    assert_eq!(file_name_of(&generate.env["CC"]), "gcc");
    assert_eq!(file_name_of(&generate.env["CXX"]), "g++");

    let (_, test_runner) = &steps[2];
    assert_eq!(test_runner.program, "ctest");
    assert!(test_runner.has_arg("--stop-on-failure"));
    assert!(test_runner.has_arg("--verbose"));
    assert!(test_runner.env.is_empty());
    Ok(())
}

#[test]
fn wipe_happens_before_generate() -> Result<()> {
    let src = tempfile::tempdir()?;
    let out = src.path().join("out");
    let marker = put_marker(&out)?;

    let mut build_info = resolve_flags(&["--wipe", &dir_flag(&out)], src.path())?;
    build_dir::prepare(&mut build_info)?;
    assert!(!marker.exists());

    let steps = plan(&build_info, src.path(), 1);
    assert_eq!(step_kinds(&steps)[0], Step::Generate);
    Ok(())
}

#[test]
fn clean_then_build() -> Result<()> {
    let src = tempfile::tempdir()?;
    let mut build_info = resolve_flags(&["--clean", "--release"], src.path())?;
    build_dir::prepare(&mut build_info)?;
    let steps = plan(&build_info, src.path(), 1);
    assert_eq!(
        step_kinds(&steps),
        vec![Step::Generate, Step::Clean, Step::Build]
    );

    let (_, clean) = &steps[1];
    assert_eq!(clean.args, os_args(&["--build", ".", "--target", "clean"]));
    Ok(())
}

#[test]
fn clean_alone_reuses_configured_dir() -> Result<()> {
    let src = tempfile::tempdir()?;
    put_marker(&src.path().join("build"))?;

    let mut build_info = resolve_flags(&["--clean"], src.path())?;
    build_dir::prepare(&mut build_info)?;
    let steps = plan(&build_info, src.path(), 1);
    assert_eq!(step_kinds(&steps), vec![Step::Clean, Step::Build]);
    Ok(())
}

#[test]
fn clean_alone_reconfigures_vanished_dir() -> Result<()> {
    let src = tempfile::tempdir()?;
    let mut build_info = resolve_flags(&["--clean"], src.path())?;
    build_dir::prepare(&mut build_info)?;
    let steps = plan(&build_info, src.path(), 1);
    assert_eq!(
        step_kinds(&steps),
        vec![Step::Generate, Step::Clean, Step::Build]
    );
    Ok(())
}

#[test]
fn coverage_after_tests() -> Result<()> {
    let src = tempfile::tempdir()?;
    let build_info = resolve_flags(&["--gcov", "--tests"], src.path())?;
    let steps = plan(&build_info, src.path(), 1);
    assert_eq!(
        step_kinds(&steps),
        vec![
            Step::Generate,
            Step::Build,
            Step::Test,
            Step::CoverageCapture,
            Step::CoverageReport,
        ]
    );

    let (_, generate) = &steps[0];
    assert!(generate.has_arg("-DENABLE_COVERAGE=ON"));

    let (_, capture) = &steps[3];
    assert_eq!(capture.program, "lcov");
    assert!(capture.has_arg("--capture"));
    for pattern in COVERAGE_EXCLUDE_PATTERNS {
        assert!(capture.has_arg(pattern));
    }

    let (_, report) = &steps[4];
    assert_eq!(report.program, "genhtml");
    assert_eq!(
        report.args,
        os_args(&["coverage.info", "--output-directory", "coverage_html"])
    );
    Ok(())
}

/// Same steps, same working directories, but each one only leaves a `<Step>.ran` file behind,
/// except `failing`, which exits non-zero.
fn stand_in_steps(
    build_info: &BuildInfo,
    source_dir: &std::path::Path,
    failing: Option<Step>,
) -> Vec<(Step, ToolCommand)> {
    plan(build_info, source_dir, 1)
        .into_iter()
        .map(|(step, cmd)| {
            let script = match Some(step) == failing {
                true => "exit 1".to_string(),
                false => format!("touch {step:?}.ran"),
            };
            let cmd = ToolCommand {
                program: "sh".to_string(),
                args: os_args(&["-c", &script]),
                ..cmd
            };
            (step, cmd)
        })
        .collect()
}

#[test]
fn all_steps_succeed() -> Result<()> {
    let src = tempfile::tempdir()?;
    let mut build_info = resolve_flags(&["--tests"], src.path())?;
    build_dir::prepare(&mut build_info)?;
    let build = src.path().join("build");

    let steps = stand_in_steps(&build_info, src.path(), None);
    execute_steps(&build_info, src.path(), steps)?;

    for ran in ["Generate.ran", "Build.ran", "Test.ran"] {
        assert!(build.join(ran).exists(), "{ran}");
    }
    assert_eq!(
        PersistedBuild::load(src.path())?,
        Some(build_info.persisted())
    );
    Ok(())
}

#[test]
fn failed_build_stops_before_tests() -> Result<()> {
    let src = tempfile::tempdir()?;
    let mut build_info = resolve_flags(&["--tests"], src.path())?;
    build_dir::prepare(&mut build_info)?;
    let build = src.path().join("build");

    let steps = stand_in_steps(&build_info, src.path(), Some(Step::Build));
    assert!(execute_steps(&build_info, src.path(), steps).is_err());

    assert!(build.join("Generate.ran").exists());
    assert!(!build.join("Test.ran").exists());
    /* Generate succeeded, so the build was persisted, and is not rolled back. */
    assert!(PersistedBuild::filepath(src.path()).exists());
    Ok(())
}

#[test]
fn failed_generate_persists_nothing() -> Result<()> {
    let src = tempfile::tempdir()?;
    let mut build_info = resolve_flags(&["--tests"], src.path())?;
    build_dir::prepare(&mut build_info)?;
    let build = src.path().join("build");

    let steps = stand_in_steps(&build_info, src.path(), Some(Step::Generate));
    assert!(execute_steps(&build_info, src.path(), steps).is_err());

    assert!(!build.join("Build.ran").exists());
    assert!(!build.join("Test.ran").exists());
    assert!(!PersistedBuild::filepath(src.path()).exists());
    Ok(())
}
