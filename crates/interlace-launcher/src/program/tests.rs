//! Unit tests for launch programs.

use std::fs;

use interlace_adapter::AdapterError;
use interlace_config::keys::MANAGEMENT_COMPONENTS;
use interlace_management::{ManagementError, ObjectName};
use rstest::rstest;

use super::*;
use crate::ImmediateShutdown;

struct Run {
    objects: Arc<ObjectRegistry>,
    output: Vec<u8>,
    result: Result<(), LaunchError>,
}

fn run(program: &dyn MainProgram, properties: &BootstrapProperties, arguments: &[String]) -> Run {
    let objects = ObjectRegistry::shared();
    let module_path = ModulePath::default();
    let mut output = Vec::new();
    let mut context = LaunchContext {
        properties,
        module_path: &module_path,
        arguments,
        objects: Arc::clone(&objects),
        shutdown: &ImmediateShutdown,
        output: &mut output,
    };
    let result = program.run(&mut context);
    Run {
        objects,
        output,
        result,
    }
}

#[test]
fn standard_registry_covers_built_in_modes() {
    let registry = ProgramRegistry::standard();
    assert_eq!(
        registry.modes(),
        vec![
            LaunchMode::Standard,
            LaunchMode::PasswordUtility,
            LaunchMode::WebConsoleOnly
        ]
    );
}

#[rstest]
#[case::service_test(LaunchMode::ServiceTest)]
#[case::container(LaunchMode::Container)]
#[case::failover(LaunchMode::Failover)]
fn modes_without_programs_are_unavailable(#[case] mode: LaunchMode) {
    let registry = ProgramRegistry::standard();
    let error = registry.select(mode).err().expect("no program");
    assert!(matches!(error, LaunchError::ProgramUnavailable { mode: selected } if selected == mode));
}

#[test]
fn registered_programs_replace_unavailable_modes() {
    let registry = ProgramRegistry::standard().with(LaunchMode::Failover, PasswordProgram);
    let program = registry.select(LaunchMode::Failover).expect("registered");
    assert_eq!(program.name(), "password utility");
}

#[test]
fn launch_modes_display_in_kebab_case() {
    assert_eq!(LaunchMode::WebConsoleOnly.to_string(), "web-console-only");
    assert_eq!(
        "service-test".parse::<LaunchMode>().expect("parse"),
        LaunchMode::ServiceTest
    );
}

#[test]
fn password_program_prints_obfuscated_secrets() {
    let outcome = run(
        &PasswordProgram,
        &BootstrapProperties::new(),
        &["s3cr3t".to_owned(), "other".to_owned()],
    );
    outcome.result.expect("password run");
    let text = String::from_utf8(outcome.output).expect("utf-8");
    assert_eq!(text, "obf:czNjcjN0\nobf:b3RoZXI=\n");
}

#[test]
fn password_program_requires_arguments() {
    let outcome = run(&PasswordProgram, &BootstrapProperties::new(), &[]);
    assert!(matches!(
        outcome.result,
        Err(LaunchError::MissingArgument { .. })
    ));
}

#[test]
fn standard_program_creates_and_destroys_the_adapter() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("adapter.json"), r#"{"unique-id":"orders"}"#).expect("write");
    let program = StandardProgram::with_config_dir(dir.path());

    let outcome = run(
        &program,
        &BootstrapProperties::from_pairs([(MANAGEMENT_COMPONENTS, "webconsole")]),
        &[],
    );

    outcome.result.expect("standard run");
    let names: Vec<String> = outcome.objects.names().iter().map(ToString::to_string).collect();
    assert_eq!(names, vec!["interlace:type=AdapterRegistry,id=default"]);
    let adapter = ObjectName::parse("interlace:type=Adapter,id=orders").expect("name");
    assert!(!outcome.objects.is_registered(&adapter));
}

#[test]
fn standard_program_releases_the_adapter_when_components_fail() {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("adapter.json"), r#"{"unique-id":"orders"}"#).expect("write");
    let program = StandardProgram::with_config_dir(dir.path());

    let outcome = run(
        &program,
        &BootstrapProperties::from_pairs([(MANAGEMENT_COMPONENTS, "clustering")]),
        &[],
    );

    assert!(matches!(
        outcome.result,
        Err(LaunchError::Management(ManagementError::UnknownComponent { .. }))
    ));
    let adapter = ObjectName::parse("interlace:type=Adapter,id=orders").expect("name");
    assert!(!outcome.objects.is_registered(&adapter));
}

#[test]
fn standard_program_fails_without_adapter_configuration() {
    let dir = tempfile::tempdir().expect("temp dir");
    let program = StandardProgram::with_config_dir(dir.path());

    let outcome = run(&program, &BootstrapProperties::new(), &[]);

    assert!(matches!(
        outcome.result,
        Err(LaunchError::Adapter(AdapterError::Io { .. }))
    ));
}

#[test]
fn web_console_program_without_address_runs_as_no_op() {
    let outcome = run(&WebConsoleProgram, &BootstrapProperties::new(), &[]);
    outcome.result.expect("web console run");
    assert!(outcome.objects.is_empty());
}
