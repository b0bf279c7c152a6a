//! Batch collection repository implementation
//!
//! The target-met and approval transitions are compare-and-set updates so
//! they succeed for exactly one caller under concurrent writers.

use sqlx::{PgPool, Postgres, Transaction};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::models::batch::{
    BatchAdminPayment, BatchCollection, CompletedPayment, CreateBatchCollectionRequest,
};
use crate::models::registration::PaymentStatus;
use crate::utils::errors::EngineError;

const COLLECTION_COLUMNS: &str = "id, event_id, cohort_id, target_amount, collected_amount, is_target_met, is_approved, approved_by, status, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, collection_id, admin_user_id, amount, txn_ref, payment_status, created_at";

#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: PgPool,
}

impl BatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a collection for an (event, cohort) pair.
    ///
    /// The unique constraint is the authoritative duplicate guard; a
    /// violation surfaces as a state conflict rather than a raw DB error.
    pub async fn create(
        &self,
        request: &CreateBatchCollectionRequest,
    ) -> Result<BatchCollection, EngineError> {
        let result = sqlx::query_as::<_, BatchCollection>(&format!(
            r#"
            INSERT INTO batch_collections (event_id, cohort_id, target_amount, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(request.event_id)
        .bind(request.cohort_id)
        .bind(request.target_amount)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(collection) => Ok(collection),
            Err(e) if is_unique_violation(&e, "uq_batch_collections_event_cohort") => {
                Err(EngineError::StateConflict(
                    "A batch collection already exists for this event and cohort".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find collection by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<BatchCollection>, EngineError> {
        let collection = sqlx::query_as::<_, BatchCollection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM batch_collections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(collection)
    }

    /// Find collection by ID, failing when it does not exist
    pub async fn get(&self, id: i64) -> Result<BatchCollection, EngineError> {
        self.find_by_id(id)
            .await?
            .ok_or(EngineError::CollectionNotFound { collection_id: id })
    }

    /// Find the collection covering an (event, cohort) pair
    pub async fn find_by_event_and_cohort(
        &self,
        event_id: i64,
        cohort_id: i64,
    ) -> Result<Option<BatchCollection>, EngineError> {
        let collection = sqlx::query_as::<_, BatchCollection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM batch_collections WHERE event_id = $1 AND cohort_id = $2"
        ))
        .bind(event_id)
        .bind(cohort_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(collection)
    }

    /// Insert a completed administrator payment row
    pub async fn insert_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        collection_id: i64,
        payment: &CompletedPayment,
    ) -> Result<BatchAdminPayment, EngineError> {
        let result = sqlx::query_as::<_, BatchAdminPayment>(&format!(
            r#"
            INSERT INTO batch_admin_payments (collection_id, admin_user_id, amount, txn_ref, payment_status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(collection_id)
        .bind(payment.payer_user_id)
        .bind(payment.amount)
        .bind(&payment.txn_ref)
        .bind(PaymentStatus::Completed)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) if is_unique_violation(&e, "batch_admin_payments_txn_ref_key") => {
                Err(EngineError::StateConflict(
                    "This payment transaction has already been recorded".to_string(),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically add a completed payment amount to the collected total
    pub async fn add_to_collected(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        collection_id: i64,
        amount: Decimal,
    ) -> Result<BatchCollection, EngineError> {
        let collection = sqlx::query_as::<_, BatchCollection>(&format!(
            r#"
            UPDATE batch_collections
            SET collected_amount = collected_amount + $2, updated_at = $3
            WHERE id = $1
            RETURNING {COLLECTION_COLUMNS}
            "#
        ))
        .bind(collection_id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(EngineError::CollectionNotFound { collection_id })?;

        Ok(collection)
    }

    /// Flip `is_target_met` once the collected amount covers the target.
    ///
    /// Compare-and-set: returns true only for the caller that performs the
    /// transition, so the target-met signal can fire exactly once.
    pub async fn try_mark_target_met(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        collection_id: i64,
    ) -> Result<bool, EngineError> {
        let result = sqlx::query(
            r#"
            UPDATE batch_collections
            SET is_target_met = TRUE, updated_at = $2
            WHERE id = $1
              AND is_target_met = FALSE
              AND collected_amount >= target_amount
            "#,
        )
        .bind(collection_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Approve a target-met collection and complete it.
    ///
    /// Compare-and-set inside the approval transaction; the bulk member
    /// registration commits with the same transaction or not at all.
    pub async fn try_approve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        collection_id: i64,
        approver_id: i64,
    ) -> Result<bool, EngineError> {
        let result = sqlx::query(
            r#"
            UPDATE batch_collections
            SET is_approved = TRUE, approved_by = $2, status = 'COMPLETED', updated_at = $3
            WHERE id = $1
              AND is_target_met = TRUE
              AND is_approved = FALSE
              AND status = 'ACTIVE'
            "#,
        )
        .bind(collection_id)
        .bind(approver_id)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Administrative abort of an active collection
    pub async fn try_cancel(&self, collection_id: i64) -> Result<bool, EngineError> {
        let result = sqlx::query(
            r#"
            UPDATE batch_collections
            SET status = 'CANCELLED', updated_at = $2
            WHERE id = $1 AND status = 'ACTIVE'
            "#,
        )
        .bind(collection_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Completed payments recorded against a collection
    pub async fn payments_for_collection(
        &self,
        collection_id: i64,
    ) -> Result<Vec<BatchAdminPayment>, EngineError> {
        let payments = sqlx::query_as::<_, BatchAdminPayment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM batch_admin_payments WHERE collection_id = $1 ORDER BY created_at ASC"
        ))
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

/// Match a Postgres unique-constraint violation by constraint name
fn is_unique_violation(error: &sqlx::Error, constraint: &str) -> bool {
    match error {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}
