use configure::{Configure, ConfigureError};

#[derive(Debug, Default, Configure)]
struct DistrictConfig {
    #[config("district_id,required")]
    district_id: String,
    #[config("collection")]
    collection: String,
}

fn bind(args: &[&str]) -> Result<DistrictConfig, ConfigureError> {
    let mut config = DistrictConfig::default();
    config.configure_from(args.iter().copied())?;
    Ok(config)
}

fn assert_missing_district(result: Result<DistrictConfig, ConfigureError>) {
    match result {
        Err(err @ ConfigureError::MissingRequiredFields(_)) => {
            assert_eq!(err.missing_fields(), ["district_id"]);
            assert_eq!(err.to_string(), "Missing required fields: [district_id]");
        }
        Ok(cfg) => panic!("expected missing district_id, got {cfg:?}"),
        Err(other) => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn binds_from_flags() {
    let cfg = bind(&["-district_id=abc123"]).expect("flags bind");
    assert_eq!(cfg.district_id, "abc123");
    assert_eq!(cfg.collection, "");
}

#[test]
fn binds_from_double_dash_and_separate_value() {
    let cfg = bind(&["--district_id", "abc123", "-collection", "schools"]).expect("flags bind");
    assert_eq!(cfg.district_id, "abc123");
    assert_eq!(cfg.collection, "schools");
}

#[test]
fn missing_required_field() {
    assert_missing_district(bind(&[]));
}

#[test]
fn other_field_without_required_field() {
    assert_missing_district(bind(&["-collection=schools"]));
}

#[test]
fn flags_take_precedence_over_json() {
    // a flag was given, so the JSON argument is never read
    assert_missing_district(bind(&["-collection=schools", r#"{"district_id":"abc123"}"#]));
}

#[test]
fn flag_after_json_is_positional() {
    let cfg = bind(&[r#"{"district_id":"abc123"}"#, "-collection=schools"]).expect("json binds");
    assert_eq!(cfg.district_id, "abc123");
    assert_eq!(cfg.collection, "");
}

#[test]
fn fails_with_undeclared_flags() {
    let err = bind(&["-district_id=abc123", "-random-test-flag=X"]).unwrap_err();
    assert!(matches!(err, ConfigureError::Flag(_)));
    assert_eq!(err.to_string(), "flag provided but not defined: -random-test-flag");
}

#[test]
fn propagates_flag_syntax_errors() {
    let err = bind(&["-district_id"]).unwrap_err();
    assert_eq!(err.to_string(), "flag needs an argument: -district_id");

    let err = bind(&["---district_id=abc123"]).unwrap_err();
    assert_eq!(err.to_string(), "bad flag syntax: ---district_id=abc123");
}

#[test]
fn blank_flag_values_keep_defaults() {
    #[derive(Debug, Default, Configure)]
    struct Optional {
        #[config("district_id")]
        district_id: String,
        #[config("collection")]
        collection: String,
    }

    let mut cfg = Optional {
        district_id: "preset".into(),
        ..Default::default()
    };
    cfg.configure_from(["-collection=", "-district_id="])
        .expect("blank flags are accepted");
    assert_eq!(cfg.district_id, "preset");
    assert_eq!(cfg.collection, "");
}

#[test]
fn blank_flag_still_suppresses_json() {
    let mut cfg = DistrictConfig::default();
    let result = cfg.configure_from(["-collection=", r#"{"district_id":"abc123"}"#]);
    assert!(matches!(result, Err(ConfigureError::MissingRequiredFields(_))));
    assert_eq!(cfg.district_id, "");
}

#[test]
fn binding_is_repeatable() {
    let mut cfg = DistrictConfig::default();
    cfg.configure_from(["-district_id=one"]).expect("first bind");
    cfg.configure_from(["-district_id=two"]).expect("second bind");
    assert_eq!(cfg.district_id, "two");
}

#[test]
fn reports_missing_fields_in_declaration_order() {
    #[derive(Debug, Default, Configure)]
    struct Several {
        #[config("zeta,required")]
        zeta: String,
        #[config("alpha")]
        alpha: String,
        #[config("ratio,required")]
        ratio: f64,
        #[config("beta,required")]
        beta: String,
    }

    let mut cfg = Several::default();
    let err = cfg.configure_from(["-beta=set"]).unwrap_err();
    assert_eq!(err.missing_fields(), ["zeta", "ratio"]);
    assert_eq!(err.to_string(), "Missing required fields: [zeta ratio]");
}
