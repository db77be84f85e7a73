//! Unit tests for the version-control loader.

use std::sync::atomic::{AtomicUsize, Ordering};

use interlace_config::BootstrapProperties;
use rstest::rstest;

use super::*;
use crate::VcsApi;

static SVN_CONSTRUCTIONS: AtomicUsize = AtomicUsize::new(0);

struct StubBackend {
    name: &'static str,
}

impl VersionControl for StubBackend {
    fn implementation_name(&self) -> &str {
        self.name
    }

    fn set_bootstrap_properties(&mut self, _properties: &BootstrapProperties) {}

    fn update(&self) -> Result<(), VcsError> {
        Ok(())
    }

    fn checkout(&self) -> Result<(), VcsError> {
        Ok(())
    }

    fn api(&self, _properties: &BootstrapProperties) -> Result<Box<dyn VcsApi>, VcsError> {
        Err(VcsError::Construction {
            name: self.name.to_owned(),
            message: "stub has no working copy".to_owned(),
        })
    }
}

fn svn() -> Result<Box<dyn VersionControl>, VcsError> {
    SVN_CONSTRUCTIONS.fetch_add(1, Ordering::SeqCst);
    Ok(Box::new(StubBackend { name: "svn" }))
}

fn hg() -> Result<Box<dyn VersionControl>, VcsError> {
    Ok(Box::new(StubBackend { name: "hg" }))
}

fn broken() -> Result<Box<dyn VersionControl>, VcsError> {
    Err(VcsError::Construction {
        name: "broken".to_owned(),
        message: "missing client library".to_owned(),
    })
}

fn loader() -> VersionControlLoader {
    VersionControlLoader::new([
        VcsRegistration::new("svn", svn),
        VcsRegistration::new("hg", hg),
        VcsRegistration::new("broken", broken),
    ])
}

#[test]
fn empty_loader_yields_nothing() {
    let loader = VersionControlLoader::new(Vec::new());
    assert!(loader.load().is_none());
    assert!(loader.available_implementations().is_empty());
}

#[test]
fn lists_implementations_in_discovery_order() {
    assert_eq!(loader().available_implementations(), vec!["svn", "hg", "broken"]);
}

#[test]
fn duplicate_registrations_keep_the_first() {
    let loader = VersionControlLoader::new([
        VcsRegistration::new("hg", hg),
        VcsRegistration::new("hg", svn),
    ]);
    assert_eq!(loader.available_implementations(), vec!["hg"]);
}

#[test]
fn load_picks_first_of_many() {
    let backend = loader().load().expect("first backend");
    assert_eq!(backend.implementation_name(), "svn");
}

#[test]
fn each_load_constructs_a_fresh_instance() {
    let loader = VersionControlLoader::new([VcsRegistration::new("svn", svn)]);
    let before = SVN_CONSTRUCTIONS.load(Ordering::SeqCst);

    let first = loader.load_named("svn");
    let second = loader.load_named("svn");

    assert!(first.is_some() && second.is_some());
    assert!(SVN_CONSTRUCTIONS.load(Ordering::SeqCst) >= before + 2);
}

#[rstest]
#[case::exact("hg", Some("hg"))]
#[case::case_sensitive("HG", None)]
#[case::unknown("cvs", None)]
#[case::failing_constructor("broken", None)]
fn load_named_matches_exactly(#[case] name: &str, #[case] expected: Option<&str>) {
    let loaded = loader().load_named(name);
    assert_eq!(
        loaded.as_ref().map(|backend| backend.implementation_name()),
        expected
    );
}

fn mislabelled() -> Result<Box<dyn VersionControl>, VcsError> {
    Ok(Box::new(StubBackend { name: "bzr" }))
}

#[test]
fn load_named_matches_the_reported_implementation_name() {
    let loader = VersionControlLoader::new([
        VcsRegistration::new("darcs", mislabelled),
        VcsRegistration::new("hg", hg),
    ]);

    assert!(loader.load_named("darcs").is_none());
    let backend = loader.load_named("bzr").expect("backend reporting bzr");
    assert_eq!(backend.implementation_name(), "bzr");
    assert_eq!(
        loader.load_named("hg").map(|loaded| loaded.implementation_name().to_owned()),
        Some("hg".to_owned())
    );
}

#[test]
fn standard_loader_offers_git() {
    let loader = VersionControlLoader::standard();
    assert_eq!(loader.available_implementations(), vec![GIT_IMPLEMENTATION]);
    let backend = loader.load().expect("git backend");
    assert_eq!(backend.implementation_name(), GIT_IMPLEMENTATION);
}
