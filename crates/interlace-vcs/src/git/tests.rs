//! Unit tests for the git backend.

use std::ffi::OsString;

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn configured() -> GitVersionControl {
    let mut git = GitVersionControl::new();
    git.set_bootstrap_properties(&BootstrapProperties::from_pairs([
        (VCS_REMOTE_URL, "https://git.example.com/config.git"),
        (VCS_WORKING_COPY, "/var/lib/interlace/config"),
    ]));
    git
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[rstest]
fn checkout_clones_remote_into_working_copy(configured: GitVersionControl) {
    let args = configured.checkout_args().expect("checkout args");
    assert_eq!(
        strings(&args),
        vec![
            "clone",
            "https://git.example.com/config.git",
            "/var/lib/interlace/config"
        ]
    );
}

#[rstest]
fn checkout_honours_branch(mut configured: GitVersionControl) {
    configured.set_bootstrap_properties(&BootstrapProperties::from_pairs([
        (VCS_REMOTE_URL, "https://git.example.com/config.git"),
        (VCS_WORKING_COPY, "/var/lib/interlace/config"),
        (VCS_BRANCH, "release"),
    ]));
    let args = configured.checkout_args().expect("checkout args");
    assert_eq!(
        strings(args.get(..3).expect("branch args")),
        vec!["clone", "--branch", "release"]
    );
}

#[rstest]
fn update_pulls_fast_forward_only(configured: GitVersionControl) {
    let args = configured.update_args().expect("update args");
    assert_eq!(
        strings(&args),
        vec!["-C", "/var/lib/interlace/config", "pull", "--ff-only"]
    );
}

#[test]
fn checkout_without_remote_reports_missing_property() {
    let error = GitVersionControl::new()
        .checkout()
        .expect_err("remote url is required");
    assert!(matches!(
        error,
        VcsError::MissingProperty {
            key: VCS_REMOTE_URL
        }
    ));
}

#[test]
fn api_requires_working_copy() {
    let result = GitVersionControl::new().api(&BootstrapProperties::new());
    assert!(matches!(
        result,
        Err(VcsError::MissingProperty {
            key: VCS_WORKING_COPY
        })
    ));
}

#[test]
fn missing_executable_reports_spawn_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut git = GitVersionControl::with_program(dir.path().join("no-such-git"));
    git.set_bootstrap_properties(&BootstrapProperties::from_pairs([(
        VCS_WORKING_COPY,
        dir.path().to_string_lossy().into_owned(),
    )]));

    let error = git.update().expect_err("executable is absent");
    assert!(matches!(error, VcsError::Spawn { .. }));
}

#[test]
fn api_exposes_working_copy() {
    let api = GitVersionControl::new()
        .api(&BootstrapProperties::from_pairs([(
            VCS_WORKING_COPY,
            "/srv/config",
        )]))
        .expect("api");
    assert_eq!(api.working_copy(), Path::new("/srv/config"));
}
