//! Dynamic form field models
//!
//! Field kinds are a closed tagged union: each kind carries only the data
//! its validation needs, so no runtime type-sniffing of loose option blobs
//! happens anywhere downstream.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::errors::EngineError;

/// Which form a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormScope {
    Event,
    Guest,
}

/// Closed set of field kinds and their kind-specific data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Select { options: Vec<String> },
    Radio { options: Vec<String> },
    Checkbox { options: Vec<String> },
}

impl FieldKind {
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Text => "TEXT",
            FieldKind::Email => "EMAIL",
            FieldKind::Phone => "PHONE",
            FieldKind::Select { .. } => "SELECT",
            FieldKind::Radio { .. } => "RADIO",
            FieldKind::Checkbox { .. } => "CHECKBOX",
        }
    }

    /// Option set for option-carrying kinds, empty otherwise
    pub fn options(&self) -> &[String] {
        match self {
            FieldKind::Select { options }
            | FieldKind::Radio { options }
            | FieldKind::Checkbox { options } => options,
            _ => &[],
        }
    }
}

/// Optional custom validation rules applied after the kind-specific check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRules {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub id: i64,
    pub event_id: i64,
    pub scope: FormScope,
    pub label: String,
    pub position: i32,
    pub required: bool,
    pub kind: FieldKind,
    pub rules: FieldRules,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw storage row: kind tag plus JSONB options/rules blobs
#[derive(Debug, Clone, FromRow)]
pub struct FormFieldRow {
    pub id: i64,
    pub event_id: i64,
    pub scope: FormScope,
    pub label: String,
    pub position: i32,
    pub required: bool,
    pub field_type: String,
    pub options: serde_json::Value,
    pub rules: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<FormFieldRow> for FormField {
    type Error = EngineError;

    fn try_from(row: FormFieldRow) -> Result<Self, Self::Error> {
        let options: Vec<String> = if row.options.is_null() {
            Vec::new()
        } else {
            serde_json::from_value(row.options.clone())?
        };
        let kind = match row.field_type.as_str() {
            "TEXT" => FieldKind::Text,
            "EMAIL" => FieldKind::Email,
            "PHONE" => FieldKind::Phone,
            "SELECT" => FieldKind::Select { options },
            "RADIO" => FieldKind::Radio { options },
            "CHECKBOX" => FieldKind::Checkbox { options },
            other => {
                return Err(EngineError::ConsistencyViolation(format!(
                    "form field {} has unknown type tag '{}'",
                    row.id, other
                )))
            }
        };
        let rules: FieldRules = if row.rules.is_null() {
            FieldRules::default()
        } else {
            serde_json::from_value(row.rules)?
        };
        Ok(FormField {
            id: row.id,
            event_id: row.event_id,
            scope: row.scope,
            label: row.label,
            position: row.position,
            required: row.required,
            kind,
            rules,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A single validation failure, keyed by field so a caller can render
/// every problem at once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field_id: i64,
    pub label: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(field_type: &str, options: serde_json::Value) -> FormFieldRow {
        FormFieldRow {
            id: 7,
            event_id: 1,
            scope: FormScope::Event,
            label: "T-shirt size".to_string(),
            position: 0,
            required: true,
            field_type: field_type.to_string(),
            options,
            rules: serde_json::Value::Null,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn hydrates_select_with_options() {
        let field = FormField::try_from(row("SELECT", serde_json::json!(["S", "M", "L"]))).unwrap();
        assert_eq!(field.kind.options(), ["S", "M", "L"]);
        assert_eq!(field.kind.tag(), "SELECT");
    }

    #[test]
    fn unknown_type_tag_is_a_consistency_violation() {
        let err = FormField::try_from(row("GEOLOCATION", serde_json::Value::Null)).unwrap_err();
        assert!(matches!(err, EngineError::ConsistencyViolation(_)));
    }
}
