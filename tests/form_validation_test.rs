//! Dynamic form validation scenarios

mod helpers;

use std::collections::HashMap;

use assert_matches::assert_matches;
use gatherpay::models::form::FieldKind;
use gatherpay::services::forms::FormValidator;
use gatherpay::EngineError;
use helpers::*;

fn responses(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
    pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
}

#[test]
fn checkbox_selection_outside_option_set_yields_one_error_naming_it() {
    let validator = FormValidator::new();
    let fields = vec![form_field(
        1,
        "Workshops",
        true,
        FieldKind::Checkbox {
            options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        },
    )];

    let errors = validator.validate(&fields, &responses(&[(1, r#"["A","D"]"#)]));

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field_id, 1);
    assert!(errors[0].message.contains("'D'"));
}

#[test]
fn every_failing_field_is_reported_not_just_the_first() {
    let validator = FormValidator::new();
    let fields = vec![
        form_field(1, "Full name", true, FieldKind::Text),
        form_field(2, "Email", true, FieldKind::Email),
        form_field(3, "Phone", true, FieldKind::Phone),
        form_field(
            4,
            "Track",
            true,
            FieldKind::Select {
                options: vec!["beginner".to_string(), "advanced".to_string()],
            },
        ),
    ];

    // Name missing, email malformed, phone malformed, track off-list
    let submitted = responses(&[(2, "at-sign-missing"), (3, "letters"), (4, "expert")]);
    let errors = validator.validate(&fields, &submitted);

    let failing: Vec<i64> = errors.iter().map(|e| e.field_id).collect();
    assert_eq!(failing, vec![1, 2, 3, 4]);
}

#[test]
fn phone_numbers_tolerate_separators() {
    let validator = FormValidator::new();
    let fields = vec![form_field(1, "Phone", true, FieldKind::Phone)];

    for ok in ["+7 (921) 555-01-02", "555.123.4567", "89215550102"] {
        assert!(
            validator.validate(&fields, &responses(&[(1, ok)])).is_empty(),
            "{} should be accepted",
            ok
        );
    }
}

#[test]
fn validate_or_reject_surfaces_structured_errors() {
    let validator = FormValidator::new();
    let fields = vec![
        form_field(1, "Email", true, FieldKind::Email),
        form_field(2, "Phone", true, FieldKind::Phone),
    ];

    let err = validator
        .validate_or_reject(&fields, &HashMap::new())
        .unwrap_err();

    assert_matches!(err, EngineError::Validation { errors } => {
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].label, "Email");
        assert_eq!(errors[1].label, "Phone");
    });
}
