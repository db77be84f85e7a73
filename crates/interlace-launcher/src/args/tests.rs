//! Unit tests for launcher argument handling.

use rstest::rstest;

use super::*;

fn os_args(args: &[&str]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

fn parse(args: &[&str]) -> LaunchArguments {
    LaunchArguments::parse(&os_args(args)).expect("valid arguments")
}

#[rstest]
#[case::default(&["interlace"], LaunchMode::Standard)]
#[case::single(&["interlace", "--webconsole-only"], LaunchMode::WebConsoleOnly)]
#[case::first_in_priority(&["interlace", "--password", "--container"], LaunchMode::Container)]
#[case::service_test_wins(
    &["interlace", "--webconsole-only", "--failover", "--service-test"],
    LaunchMode::ServiceTest
)]
#[case::failover_before_password(&["interlace", "--password", "--failover"], LaunchMode::Failover)]
fn mode_flags_follow_priority_order(#[case] args: &[&str], #[case] expected: LaunchMode) {
    assert_eq!(parse(args).mode(), expected);
}

#[rstest]
#[case::commas("a.jar,b.jar,lib/")]
#[case::colons("a.jar:b.jar:lib/")]
#[case::semicolons("a.jar;b.jar;lib/")]
#[case::mixed("a.jar, b.jar;;lib/")]
fn module_path_accepts_any_delimiter(#[case] raw: &str) {
    let arguments = parse(&["interlace", "--module-path", raw]);
    assert_eq!(
        arguments.module_path(),
        Some(["a.jar", "b.jar", "lib/"].map(str::to_owned).as_slice())
    );
}

#[test]
fn classpath_is_an_alias_with_inline_value() {
    let arguments = parse(&["interlace", "--classpath=lib/*", "--no-subdirs"]);
    assert_eq!(
        arguments.module_path(),
        Some(["lib/*".to_owned()].as_slice())
    );
    assert!(!arguments.recursive());
}

#[test]
fn unknown_flags_pass_through_in_order() {
    let arguments = parse(&[
        "interlace",
        "--verbose",
        "--password",
        "s3cr3t",
        "--other=1",
    ]);
    assert_eq!(arguments.mode(), LaunchMode::PasswordUtility);
    assert_eq!(arguments.passthrough(), ["--verbose", "s3cr3t", "--other=1"]);
    assert!(arguments.recursive());
    assert_eq!(arguments.module_path(), None);
}

#[test]
fn module_path_without_value_is_a_usage_error() {
    let error = LaunchArguments::parse(&os_args(&["interlace", "--module-path"]))
        .expect_err("missing value");
    assert!(matches!(error, LaunchError::Usage(_)));
}

#[test]
fn leading_settings_flags_are_split_off() {
    let split = split_settings_arguments(&os_args(&[
        "interlace",
        "--log-filter",
        "debug",
        "--log-format=compact",
        "--password",
        "--log-filter",
        "x",
    ]));
    assert_eq!(
        split.settings,
        os_args(&["interlace", "--log-filter", "debug", "--log-format=compact"])
    );
    assert_eq!(
        split.remaining,
        os_args(&["interlace", "--password", "--log-filter", "x"])
    );
}

#[test]
fn empty_command_line_splits_into_nothing() {
    assert_eq!(split_settings_arguments(&[]), SettingsSplit::default());
}
