//! Form field and response repository implementation

use std::collections::HashMap;
use sqlx::{PgPool, Postgres, Transaction};
use chrono::Utc;
use crate::models::form::{FieldKind, FieldRules, FormField, FormFieldRow, FormScope};
use crate::utils::errors::EngineError;

const FIELD_COLUMNS: &str = "id, event_id, scope, label, position, required, field_type, options, rules, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct FormRepository {
    pool: PgPool,
}

impl FormRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a form field
    pub async fn create_field(
        &self,
        event_id: i64,
        scope: FormScope,
        label: &str,
        position: i32,
        required: bool,
        kind: &FieldKind,
        rules: &FieldRules,
    ) -> Result<FormField, EngineError> {
        let options = if kind.options().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::to_value(kind.options())?
        };
        let rules_value = serde_json::to_value(rules)?;

        let row = sqlx::query_as::<_, FormFieldRow>(&format!(
            r#"
            INSERT INTO form_fields (event_id, scope, label, position, required, field_type, options, rules, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {FIELD_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(scope)
        .bind(label)
        .bind(position)
        .bind(required)
        .bind(kind.tag())
        .bind(options)
        .bind(rules_value)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        FormField::try_from(row)
    }

    /// Ordered field schema for an event form
    pub async fn fields_for_event(
        &self,
        event_id: i64,
        scope: FormScope,
    ) -> Result<Vec<FormField>, EngineError> {
        let rows = sqlx::query_as::<_, FormFieldRow>(&format!(
            "SELECT {FIELD_COLUMNS} FROM form_fields WHERE event_id = $1 AND scope = $2 ORDER BY position ASC, id ASC"
        ))
        .bind(event_id)
        .bind(scope)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(FormField::try_from).collect()
    }

    /// Upsert validated responses for a registration inside the caller's
    /// transaction
    pub async fn save_responses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
        responses: &HashMap<i64, String>,
    ) -> Result<(), EngineError> {
        for (field_id, value) in responses {
            sqlx::query(
                r#"
                INSERT INTO form_responses (registration_id, field_id, value, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $4)
                ON CONFLICT (registration_id, field_id)
                DO UPDATE SET value = EXCLUDED.value, updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(registration_id)
            .bind(field_id)
            .bind(value)
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Stored responses for a registration, keyed by field
    pub async fn responses_for_registration(
        &self,
        registration_id: i64,
    ) -> Result<HashMap<i64, String>, EngineError> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT field_id, value FROM form_responses WHERE registration_id = $1",
        )
        .bind(registration_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
