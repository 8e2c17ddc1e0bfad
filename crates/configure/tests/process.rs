//! The process-wide entry point, kept in its own test binary so the
//! once-per-process guard is not shared with other tests.

use configure::{Configure, ConfigureError};

#[derive(Debug, Default, Configure)]
struct Optional {
    #[config("collection")]
    collection: String,
}

#[test]
fn process_arguments_are_consumed_once() {
    let mut first = Optional::default();
    // The harness may pass its own flags, so the first call can fail on them,
    // but never because of the guard.
    let result = first.configure();
    assert!(
        !matches!(result, Err(ConfigureError::FlagAlreadyParsed)),
        "first call was rejected by the guard: {result:?}"
    );

    let mut second = Optional {
        collection: "untouched".into(),
    };
    let err = second.configure().unwrap_err();
    assert!(matches!(err, ConfigureError::FlagAlreadyParsed));
    assert_eq!(second.collection, "untouched");

    // explicit argument lists are unaffected by the guard
    second
        .configure_from(["-collection=schools"])
        .expect("configure_from is repeatable");
    assert_eq!(second.collection, "schools");
}
