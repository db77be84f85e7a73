//! Behavioural tests for the bootstrap launcher.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use camino::Utf8Path;
use interlace_launcher::{
    ImmediateShutdown, LaunchArguments, LaunchError, LaunchMode, ProgramRegistry, launch,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

struct World {
    dir: TempDir,
    settings: RefCell<Vec<String>>,
    arguments: RefCell<Vec<String>>,
    parsed: RefCell<Option<LaunchArguments>>,
    archives: RefCell<Vec<String>>,
    output: RefCell<String>,
    failure: RefCell<Option<LaunchError>>,
}

impl World {
    fn base(&self) -> &Utf8Path {
        match Utf8Path::from_path(self.dir.path()) {
            Some(path) => path,
            None => panic!("temporary directory is not UTF-8"),
        }
    }

    fn command_line(&self) -> Vec<OsString> {
        let mut args = vec![OsString::from("interlace")];
        args.extend(self.settings.borrow().iter().map(OsString::from));
        args.extend(self.arguments.borrow().iter().map(OsString::from));
        args
    }

    fn parsed(&self) -> LaunchArguments {
        match self.parsed.borrow().as_ref() {
            Some(parsed) => parsed.clone(),
            None => panic!("arguments were not parsed"),
        }
    }
}

#[fixture]
fn world() -> World {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("temp dir: {error}"),
    };
    World {
        dir,
        settings: RefCell::new(Vec::new()),
        arguments: RefCell::new(Vec::new()),
        parsed: RefCell::new(None),
        archives: RefCell::new(Vec::new()),
        output: RefCell::new(String::new()),
        failure: RefCell::new(None),
    }
}

#[given("the launcher arguments \"{line}\"")]
fn given_arguments(world: &World, line: String) {
    *world.arguments.borrow_mut() = line.split_whitespace().map(str::to_owned).collect();
}

#[given("an archive at \"{relative}\"")]
fn given_archive(world: &World, relative: String) {
    let path: PathBuf = world.dir.path().join(&relative);
    if let Some(parent) = path.parent()
        && let Err(error) = fs::create_dir_all(parent)
    {
        panic!("create {}: {error}", parent.display());
    }
    if let Err(error) = fs::write(&path, b"PK") {
        panic!("write {relative}: {error}");
    }
}

#[given("an empty bootstrap properties file")]
fn given_empty_properties(world: &World) {
    let path = world.dir.path().join("bootstrap.properties");
    if let Err(error) = fs::write(&path, "# empty\n") {
        panic!("write properties: {error}");
    }
    world.settings.borrow_mut().extend([
        "--bootstrap-properties".to_owned(),
        path.to_string_lossy().into_owned(),
    ]);
}

#[when("the arguments are parsed")]
fn when_parsed(world: &World) {
    match LaunchArguments::parse(&world.command_line()) {
        Ok(parsed) => *world.parsed.borrow_mut() = Some(parsed),
        Err(error) => panic!("parse failed: {error}"),
    }
}

#[when("the module path is built")]
fn when_module_path_built(world: &World) {
    let module_path = world.parsed().module_path_builder().build_in(world.base());
    let base = world.base();
    *world.archives.borrow_mut() = module_path
        .archives()
        .map(|path| match path.strip_prefix(base) {
            Ok(relative) => relative.as_str().replace('\\', "/"),
            Err(error) => panic!("{path} outside {base}: {error}"),
        })
        .collect();
}

#[when("the launcher runs")]
fn when_launcher_runs(world: &World) {
    let mut stdout = Vec::new();
    let result = launch(
        &world.command_line(),
        &mut stdout,
        &ProgramRegistry::standard(),
        &ImmediateShutdown,
    );
    *world.output.borrow_mut() = String::from_utf8_lossy(&stdout).into_owned();
    if let Err(error) = result {
        *world.failure.borrow_mut() = Some(error);
    }
}

#[then("the launch mode is \"{mode}\"")]
fn then_mode(world: &World, mode: String) {
    let expected: LaunchMode = match mode.parse() {
        Ok(expected) => expected,
        Err(error) => panic!("unknown mode '{mode}': {error}"),
    };
    assert_eq!(world.parsed().mode(), expected);
}

#[then("the discovered archives are \"{list}\"")]
fn then_archives(world: &World, list: String) {
    let expected: Vec<String> = list.split(',').map(str::to_owned).collect();
    assert_eq!(*world.archives.borrow(), expected);
}

#[then("the launcher prints \"{line}\"")]
fn then_prints(world: &World, line: String) {
    if let Some(error) = world.failure.borrow().as_ref() {
        panic!("launch failed: {error}");
    }
    assert_eq!(world.output.borrow().trim_end(), line);
}

#[then("the launch fails because \"{mode}\" is unavailable")]
fn then_unavailable(world: &World, mode: String) {
    let failure = world.failure.borrow();
    assert!(
        matches!(
            failure.as_ref(),
            Some(LaunchError::ProgramUnavailable { mode: selected }) if selected.to_string() == mode
        ),
        "unexpected outcome: {failure:?}"
    );
}

#[scenario(
    path = "tests/features/launcher.feature",
    name = "Mode flags resolve in priority order"
)]
fn mode_flags_priority(#[from(world)] world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/launcher.feature",
    name = "Archive discovery skips version-control metadata"
)]
fn archive_discovery_skips_vcs(#[from(world)] world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/launcher.feature",
    name = "A wildcard classpath entry is not recursive"
)]
fn wildcard_classpath_not_recursive(#[from(world)] world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/launcher.feature",
    name = "The password utility obfuscates passthrough arguments"
)]
fn password_utility_output(#[from(world)] world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/launcher.feature",
    name = "A mode without a program fails the launch"
)]
fn unavailable_mode_fails(#[from(world)] world: World) {
    let _ = world;
}

#[scenario(
    path = "tests/features/launcher.feature",
    name = "The launcher runs without any settings flags"
)]
fn launcher_runs_without_settings_flags(#[from(world)] world: World) {
    let _ = world;
}
