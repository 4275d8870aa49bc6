//! Error handling tests

use platform_onboard::error::OnboardError;

#[test]
fn test_remote_error_display() {
    let err = OnboardError::Remote {
        route: "/hry/units/save_units".to_string(),
        status: 500,
        body: "internal error".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Remote call to /hry/units/save_units failed with status 500: internal error"
    );
    assert_eq!(err.kind(), "remote");
}

#[test]
fn test_validation_error_display() {
    let err = OnboardError::Validation("Parameter Name is missing in row number 4".to_string());
    assert!(err.to_string().starts_with("Validation error:"));
    assert_eq!(err.kind(), "validation");
}

#[test]
fn test_response_error_display() {
    let err = OnboardError::Response {
        route: "/scada_dt/asset/list".to_string(),
        message: "expected an array".to_string(),
    };
    assert!(err.to_string().contains("/scada_dt/asset/list"));
    assert_eq!(err.kind(), "response");
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: OnboardError = io_err.into();
    assert!(err.to_string().contains("IO error"));
    assert_eq!(err.kind(), "io");
}

#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let err: OnboardError = json_err.into();
    assert!(err.to_string().contains("JSON error"));
}

#[test]
fn test_yaml_error_is_config_kind() {
    let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("key: [unclosed").unwrap_err();
    let err: OnboardError = yaml_err.into();
    assert_eq!(err.kind(), "config");
}

#[test]
fn test_error_kinds() {
    let cases = [
        (OnboardError::Config("x".into()), "config"),
        (OnboardError::Extraction("x".into()), "extraction"),
        (OnboardError::Transport("x".into()), "remote"),
        (OnboardError::Signing("x".into()), "signing"),
        (OnboardError::Template("x".into()), "template"),
        (OnboardError::Migration("x".into()), "migration"),
    ];
    for (err, kind) in cases {
        assert_eq!(err.kind(), kind, "{}", err);
    }
}

#[test]
fn test_error_is_std_error() {
    fn takes_error(_: &dyn std::error::Error) {}
    takes_error(&OnboardError::Config("test".to_string()));
}
