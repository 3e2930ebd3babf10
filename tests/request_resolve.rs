use serde_json::json;
use soffice_relay::{
    error::ParameterError,
    request::{ConversionRequest, infer_extension},
};

fn base() -> serde_json::Value {
    json!({
        "input_bucket": "in",
        "input_path": "docs/report.docx",
        "output_bucket": "out",
        "output_path": "converted/report.pdf",
    })
}

#[test]
fn infers_format_from_output_extension() {
    let req = ConversionRequest::resolve(&base(), 3).expect("resolve");
    assert_eq!(req.convert_to.as_str(), "pdf");
    assert!(req.format_inferred);
    assert_eq!(req.num_attempts, 3);
    assert_eq!(req.input_file_name(), "report.docx");
}

#[test]
fn explicit_convert_to_wins_over_extension() {
    let mut raw = base();
    raw["convert_to"] = json!("txt");
    let req = ConversionRequest::resolve(&raw, 3).expect("resolve");
    assert_eq!(req.convert_to.as_str(), "txt");
    assert!(!req.format_inferred);
}

#[test]
fn explicit_convert_to_is_used_verbatim() {
    let mut raw = base();
    raw["output_path"] = json!("converted/report");
    raw["convert_to"] = json!("pdf:writer_pdf_Export");
    let req = ConversionRequest::resolve(&raw, 3).expect("resolve");
    assert_eq!(req.convert_to.as_str(), "pdf:writer_pdf_Export");
    assert_eq!(req.convert_to.extension(), "pdf");
}

#[test]
fn missing_extension_without_convert_to_names_output_path() {
    let mut raw = base();
    raw["output_path"] = json!("doc");
    let err = ConversionRequest::resolve(&raw, 3).unwrap_err();
    assert_eq!(
        err,
        ParameterError::UninferableFormat {
            output_path: "doc".into()
        }
    );
    assert!(err.to_string().contains("\"doc\""));
}

#[test]
fn extension_is_taken_from_last_segment_only() {
    assert_eq!(infer_extension("a.dir/doc"), None);
    assert_eq!(infer_extension("a.dir/doc.odt"), Some("odt"));
    assert_eq!(infer_extension("archive.tar.gz"), Some("gz"));
    assert_eq!(infer_extension("doc."), None);
    assert_eq!(infer_extension(".profile"), None);
    assert_eq!(infer_extension("dir/"), None);
}

#[test]
fn null_convert_to_counts_as_absent() {
    let mut raw = base();
    raw["convert_to"] = serde_json::Value::Null;
    let req = ConversionRequest::resolve(&raw, 3).expect("resolve");
    assert_eq!(req.convert_to.as_str(), "pdf");
    assert!(req.format_inferred);
}

#[test]
fn empty_convert_to_is_rejected() {
    let mut raw = base();
    raw["convert_to"] = json!("");
    let err = ConversionRequest::resolve(&raw, 3).unwrap_err();
    assert_eq!(err, ParameterError::Empty { field: "convert_to" });
}

#[test]
fn required_fields_are_checked() {
    for field in ["input_bucket", "input_path", "output_bucket", "output_path"] {
        let mut raw = base();
        raw.as_object_mut().unwrap().remove(field);
        let err = ConversionRequest::resolve(&raw, 3).unwrap_err();
        assert_eq!(err, ParameterError::Missing { field });
    }
}

#[test]
fn non_string_field_is_rejected() {
    let mut raw = base();
    raw["input_bucket"] = json!(7);
    let err = ConversionRequest::resolve(&raw, 3).unwrap_err();
    assert!(matches!(
        err,
        ParameterError::InvalidType {
            field: "input_bucket",
            ..
        }
    ));
}

#[test]
fn payload_must_be_an_object() {
    let err = ConversionRequest::resolve(&json!(["input_bucket"]), 3).unwrap_err();
    assert_eq!(err, ParameterError::NotAnObject);
}

#[test]
fn input_path_must_name_a_file() {
    let mut raw = base();
    raw["input_path"] = json!("docs/");
    let err = ConversionRequest::resolve(&raw, 3).unwrap_err();
    assert!(matches!(err, ParameterError::NoFileName { .. }));
}

#[test]
fn num_attempts_accepts_positive_integers() {
    let mut raw = base();
    raw["num_attempts"] = json!(5);
    assert_eq!(ConversionRequest::resolve(&raw, 3).unwrap().num_attempts, 5);

    raw["num_attempts"] = json!("2");
    assert_eq!(ConversionRequest::resolve(&raw, 3).unwrap().num_attempts, 2);
}

#[test]
fn num_attempts_rejects_zero_negative_and_fractional() {
    for bad in [json!(0), json!(-1), json!(1.5), json!("x"), json!("0"), json!(true)] {
        let mut raw = base();
        raw["num_attempts"] = bad;
        let err = ConversionRequest::resolve(&raw, 3).unwrap_err();
        assert!(
            matches!(err, ParameterError::InvalidAttempts { .. }),
            "unexpected {err:?}"
        );
    }
}
