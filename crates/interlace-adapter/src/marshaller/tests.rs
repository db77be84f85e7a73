//! Unit tests for the marshaller.

use rstest::rstest;
use serde_json::json;

use super::*;

fn definition() -> AdapterDefinition {
    AdapterDefinition::new("orders").with_entry("timeout", json!(30))
}

#[rstest]
#[case::defaults(&[], MarshalFormat::Json, false)]
#[case::yaml(&[(MARSHALLER_OUTPUT_FORMAT, "YAML")], MarshalFormat::Yaml, false)]
#[case::beautified(&[(MARSHALLER_OUTPUT_BEAUTIFY, "true")], MarshalFormat::Json, true)]
#[case::unknown_format(&[(MARSHALLER_OUTPUT_FORMAT, "xml")], MarshalFormat::Json, false)]
fn reads_marshaller_properties(
    #[case] pairs: &[(&str, &str)],
    #[case] format: MarshalFormat,
    #[case] beautify: bool,
) {
    let marshaller =
        Marshaller::from_properties(&BootstrapProperties::from_pairs(pairs.iter().copied()));
    assert_eq!(marshaller.format(), format);
    assert_eq!(marshaller.beautify(), beautify);
}

#[rstest]
#[case::compact_json(Marshaller::new(MarshalFormat::Json, false))]
#[case::pretty_json(Marshaller::new(MarshalFormat::Json, true))]
#[case::yaml(Marshaller::new(MarshalFormat::Yaml, false))]
fn marshalled_text_reads_back(#[case] marshaller: Marshaller) {
    let text = marshaller.marshal(&definition()).expect("marshal");
    assert_eq!(marshaller.unmarshal(&text).expect("unmarshal"), definition());
}

#[test]
fn beautified_json_spans_lines() {
    let pretty = Marshaller::new(MarshalFormat::Json, true)
        .marshal(&definition())
        .expect("marshal");
    let compact = Marshaller::new(MarshalFormat::Json, false)
        .marshal(&definition())
        .expect("marshal");
    assert!(pretty.contains('\n'));
    assert!(!compact.contains('\n'));
}

#[test]
fn missing_unique_id_is_rejected() {
    let error = Marshaller::default()
        .unmarshal(r#"{"timeout": 30}"#)
        .expect_err("unique-id is required");
    assert!(matches!(
        error,
        AdapterError::Marshal {
            operation: "unmarshal",
            ..
        }
    ));
}

#[test]
fn installed_marshaller_is_shared_between_clones() {
    let slot = DefaultMarshaller::new();
    let view = slot.clone();
    slot.install(Marshaller::new(MarshalFormat::Yaml, true));
    assert_eq!(view.current(), Marshaller::new(MarshalFormat::Yaml, true));
}
