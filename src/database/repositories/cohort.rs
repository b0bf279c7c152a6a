//! Cohort repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::cohort::{Cohort, CreateCohortRequest};
use crate::utils::errors::EngineError;

#[derive(Debug, Clone)]
pub struct CohortRepository {
    pool: PgPool,
}

impl CohortRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new cohort
    pub async fn create(&self, request: CreateCohortRequest) -> Result<Cohort, EngineError> {
        let cohort = sqlx::query_as::<_, Cohort>(
            r#"
            INSERT INTO cohorts (name, created_at, updated_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(request.name)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(cohort)
    }

    /// Find cohort by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Cohort>, EngineError> {
        let cohort = sqlx::query_as::<_, Cohort>(
            "SELECT id, name, created_at, updated_at FROM cohorts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(cohort)
    }
}
