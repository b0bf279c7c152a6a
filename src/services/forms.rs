//! Dynamic form validation
//!
//! Validates submitted responses against an event's field schema. Errors
//! are collected across every field rather than short-circuiting, so a
//! caller can render all problems at once.

use std::collections::HashMap;
use regex::Regex;

use crate::models::form::{FieldError, FieldKind, FormField};
use crate::utils::errors::{EngineError, Result};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
// Separators are stripped before matching, so this only sees digits and an
// optional leading plus
const PHONE_PATTERN: &str = r"^\+?\d{7,15}$";

#[derive(Debug, Clone)]
pub struct FormValidator {
    email_re: Regex,
    phone_re: Regex,
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormValidator {
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(EMAIL_PATTERN).expect("email pattern is valid"),
            phone_re: Regex::new(PHONE_PATTERN).expect("phone pattern is valid"),
        }
    }

    /// Validate responses against the field schema, returning every error
    pub fn validate(
        &self,
        fields: &[FormField],
        responses: &HashMap<i64, String>,
    ) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for field in fields {
            let response = responses.get(&field.id).map(|v| v.trim()).unwrap_or("");

            if response.is_empty() {
                if field.required {
                    errors.push(FieldError {
                        field_id: field.id,
                        label: field.label.clone(),
                        message: "This field is required".to_string(),
                    });
                }
                // No type coercion is attempted on empty optional values
                continue;
            }

            self.check_kind(field, response, &mut errors);
            self.check_rules(field, response, &mut errors);
        }

        errors
    }

    /// Validate and reject with a structured validation error when any
    /// field fails
    pub fn validate_or_reject(
        &self,
        fields: &[FormField],
        responses: &HashMap<i64, String>,
    ) -> Result<()> {
        let errors = self.validate(fields, responses);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation { errors })
        }
    }

    fn check_kind(&self, field: &FormField, response: &str, errors: &mut Vec<FieldError>) {
        match &field.kind {
            FieldKind::Text => {}
            FieldKind::Email => {
                if !self.email_re.is_match(response) {
                    errors.push(FieldError {
                        field_id: field.id,
                        label: field.label.clone(),
                        message: "Enter a valid email address".to_string(),
                    });
                }
            }
            FieldKind::Phone => {
                let stripped: String = response
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
                    .collect();
                if !self.phone_re.is_match(&stripped) {
                    errors.push(FieldError {
                        field_id: field.id,
                        label: field.label.clone(),
                        message: "Enter a valid phone number".to_string(),
                    });
                }
            }
            FieldKind::Select { options } | FieldKind::Radio { options } => {
                if !options.iter().any(|o| o == response) {
                    errors.push(FieldError {
                        field_id: field.id,
                        label: field.label.clone(),
                        message: format!("'{}' is not one of the available options", response),
                    });
                }
            }
            FieldKind::Checkbox { options } => {
                match serde_json::from_str::<Vec<String>>(response) {
                    Ok(selected) => {
                        let invalid: Vec<&String> = selected
                            .iter()
                            .filter(|s| !options.iter().any(|o| &o == s))
                            .collect();
                        if !invalid.is_empty() {
                            let names: Vec<String> =
                                invalid.iter().map(|s| format!("'{}'", s)).collect();
                            errors.push(FieldError {
                                field_id: field.id,
                                label: field.label.clone(),
                                message: format!(
                                    "{} is not one of the available options",
                                    names.join(", ")
                                ),
                            });
                        }
                    }
                    Err(_) => {
                        errors.push(FieldError {
                            field_id: field.id,
                            label: field.label.clone(),
                            message: "Selections must be a list of options".to_string(),
                        });
                    }
                }
            }
        }
    }

    fn check_rules(&self, field: &FormField, response: &str, errors: &mut Vec<FieldError>) {
        let rules = &field.rules;

        if let Some(min) = rules.min_length {
            if response.chars().count() < min {
                errors.push(FieldError {
                    field_id: field.id,
                    label: field.label.clone(),
                    message: format!("Must be at least {} characters", min),
                });
            }
        }

        if let Some(max) = rules.max_length {
            if response.chars().count() > max {
                errors.push(FieldError {
                    field_id: field.id,
                    label: field.label.clone(),
                    message: format!("Must be at most {} characters", max),
                });
            }
        }

        if let Some(pattern) = &rules.pattern {
            match Regex::new(pattern) {
                Ok(re) => {
                    if !re.is_match(response) {
                        errors.push(FieldError {
                            field_id: field.id,
                            label: field.label.clone(),
                            message: "Does not match the expected format".to_string(),
                        });
                    }
                }
                Err(_) => {
                    // A broken stored pattern is a schema problem, not the
                    // registrant's; skip it rather than failing them
                    tracing::warn!(
                        field_id = field.id,
                        pattern = %pattern,
                        "Skipping invalid custom validation pattern"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::models::form::{FieldRules, FormScope};

    fn field(id: i64, label: &str, required: bool, kind: FieldKind) -> FormField {
        FormField {
            id,
            event_id: 1,
            scope: FormScope::Event,
            label: label.to_string(),
            position: id as i32,
            required,
            kind,
            rules: FieldRules::default(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn respond(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn required_empty_field_errors() {
        let validator = FormValidator::new();
        let fields = vec![field(1, "Name", true, FieldKind::Text)];
        let errors = validator.validate(&fields, &HashMap::new());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_id, 1);
        assert_eq!(errors[0].message, "This field is required");
    }

    #[test]
    fn optional_empty_field_is_skipped() {
        let validator = FormValidator::new();
        let fields = vec![field(1, "Email", false, FieldKind::Email)];
        let errors = validator.validate(&fields, &respond(&[(1, "  ")]));
        assert!(errors.is_empty());
    }

    #[test]
    fn email_and_phone_checks() {
        let validator = FormValidator::new();
        let fields = vec![
            field(1, "Email", true, FieldKind::Email),
            field(2, "Phone", true, FieldKind::Phone),
        ];

        let ok = respond(&[(1, "alex@example.org"), (2, "+1 (555) 123-4567")]);
        assert!(validator.validate(&fields, &ok).is_empty());

        let bad = respond(&[(1, "not-an-email"), (2, "call me")]);
        let errors = validator.validate(&fields, &bad);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn select_membership_is_enforced() {
        let validator = FormValidator::new();
        let fields = vec![field(
            1,
            "Size",
            true,
            FieldKind::Select {
                options: vec!["S".to_string(), "M".to_string(), "L".to_string()],
            },
        )];

        assert!(validator.validate(&fields, &respond(&[(1, "M")])).is_empty());

        let errors = validator.validate(&fields, &respond(&[(1, "XXL")]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("XXL"));
    }

    #[test]
    fn checkbox_with_invalid_option_produces_one_error_naming_it() {
        let validator = FormValidator::new();
        let fields = vec![field(
            1,
            "Workshops",
            true,
            FieldKind::Checkbox {
                options: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            },
        )];

        let errors = validator.validate(&fields, &respond(&[(1, r#"["A","D"]"#)]));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'D'"));
        assert!(!errors[0].message.contains("'A'"));
    }

    #[test]
    fn checkbox_rejects_non_list_payload() {
        let validator = FormValidator::new();
        let fields = vec![field(
            1,
            "Workshops",
            true,
            FieldKind::Checkbox {
                options: vec!["A".to_string()],
            },
        )];

        let errors = validator.validate(&fields, &respond(&[(1, "A")]));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn custom_rules_apply_after_kind_check() {
        let validator = FormValidator::new();
        let mut f = field(1, "Nickname", true, FieldKind::Text);
        f.rules = FieldRules {
            min_length: Some(3),
            max_length: Some(8),
            pattern: Some(r"^[a-z]+$".to_string()),
        };

        assert!(validator.validate(&[f.clone()], &respond(&[(1, "swing")])).is_empty());

        let errors = validator.validate(&[f.clone()], &respond(&[(1, "ab")]));
        assert_eq!(errors.len(), 1);

        let errors = validator.validate(&[f], &respond(&[(1, "Ab")]));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn all_errors_are_collected_not_short_circuited() {
        let validator = FormValidator::new();
        let fields = vec![
            field(1, "Name", true, FieldKind::Text),
            field(2, "Email", true, FieldKind::Email),
            field(
                3,
                "Track",
                true,
                FieldKind::Radio {
                    options: vec!["lindy".to_string(), "balboa".to_string()],
                },
            ),
        ];

        let responses = respond(&[(2, "nope"), (3, "tango")]);
        let errors = validator.validate(&fields, &responses);
        assert_eq!(errors.len(), 3);
        let ids: Vec<i64> = errors.iter().map(|e| e.field_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn validate_or_reject_wraps_errors() {
        let validator = FormValidator::new();
        let fields = vec![field(1, "Name", true, FieldKind::Text)];
        let err = validator
            .validate_or_reject(&fields, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation { errors } if errors.len() == 1));
    }
}
