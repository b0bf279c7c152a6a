//! Registration and guest repository implementation
//!
//! Mutations that touch a registration together with its guest rows take a
//! transaction handle so the service layer owns the commit boundary.

use sqlx::{PgPool, Postgres, Transaction};
use chrono::Utc;
use rust_decimal::Decimal;
use crate::models::registration::{
    CreateRegistrationRequest, Guest, MoneyBreakdown, Registration, RegistrationMode,
    RegistrationStatus, PaymentStatus,
};
use crate::utils::errors::EngineError;

const REGISTRATION_COLUMNS: &str = "id, event_id, user_id, status, payment_status, mode, registration_fee_paid, guest_fees_paid, merchandise_total, donation_amount, total_amount, total_guests, active_guests, created_at, updated_at";

const GUEST_COLUMNS: &str = "id, registration_id, name, status, fee_paid, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a registration together with its initial guest rows.
    ///
    /// The caller computes the money breakdown up front; the uniqueness
    /// constraint on (event_id, user_id) turns a concurrent duplicate into
    /// a database error rather than a second row.
    pub async fn create_with_guests(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &CreateRegistrationRequest,
        guest_fee_each: Decimal,
    ) -> Result<Registration, EngineError> {
        let guest_count = request.guest_names.len() as i32;
        let total_amount = request.registration_fee_paid
            + request.guest_fees_paid
            + request.merchandise_total
            + request.donation_amount;

        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations (event_id, user_id, status, payment_status, mode, registration_fee_paid, guest_fees_paid, merchandise_total, donation_amount, total_amount, total_guests, active_guests, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(request.event_id)
        .bind(request.user_id)
        .bind(RegistrationStatus::Confirmed)
        .bind(request.payment_status)
        .bind(request.mode)
        .bind(request.registration_fee_paid)
        .bind(request.guest_fees_paid)
        .bind(request.merchandise_total)
        .bind(request.donation_amount)
        .bind(total_amount)
        .bind(guest_count)
        .bind(guest_count)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        for name in &request.guest_names {
            sqlx::query(
                r#"
                INSERT INTO guests (registration_id, name, status, fee_paid, created_at, updated_at)
                VALUES ($1, $2, 'ACTIVE', $3, $4, $5)
                "#,
            )
            .bind(registration.id)
            .bind(name)
            .bind(guest_fee_each)
            .bind(Utc::now())
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        }

        Ok(registration)
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, EngineError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Find registration by ID, verifying the money invariant on read.
    ///
    /// A stored total that disagrees with its components aborts the read
    /// instead of being silently repaired.
    pub async fn get_checked(&self, id: i64) -> Result<Registration, EngineError> {
        let registration = self
            .find_by_id(id)
            .await?
            .ok_or(EngineError::RegistrationNotFound { registration_id: id })?;

        if !registration.total_is_consistent() {
            return Err(EngineError::ConsistencyViolation(format!(
                "registration {} total {} does not match its components",
                registration.id, registration.total_amount
            )));
        }

        Ok(registration)
    }

    /// Find a registration for an (event, user) pair
    pub async fn find_by_event_and_user(
        &self,
        event_id: i64,
        user_id: i64,
    ) -> Result<Option<Registration>, EngineError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 AND user_id = $2"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Count confirmed registrations for an event
    pub async fn count_confirmed(&self, event_id: i64) -> Result<i64, EngineError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status = 'CONFIRMED'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    /// Get active guests for a registration
    pub async fn active_guests(&self, registration_id: i64) -> Result<Vec<Guest>, EngineError> {
        let guests = sqlx::query_as::<_, Guest>(&format!(
            "SELECT {GUEST_COLUMNS} FROM guests WHERE registration_id = $1 AND status = 'ACTIVE' ORDER BY created_at ASC"
        ))
        .bind(registration_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(guests)
    }

    /// Insert new active guests and apply the recomputed money breakdown
    /// to the parent registration in the same transaction
    pub async fn add_guests(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
        names: &[String],
        fee_each: Decimal,
        money: &MoneyBreakdown,
    ) -> Result<(), EngineError> {
        for name in names {
            sqlx::query(
                r#"
                INSERT INTO guests (registration_id, name, status, fee_paid, created_at, updated_at)
                VALUES ($1, $2, 'ACTIVE', $3, $4, $5)
                "#,
            )
            .bind(registration_id)
            .bind(name)
            .bind(fee_each)
            .bind(Utc::now())
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        }

        let added = names.len() as i32;
        self.apply_money(tx, registration_id, money, added, added).await
    }

    /// Cancel the given guests and apply the recomputed money breakdown
    /// (removed-guest fees move into the donation component)
    pub async fn remove_guests(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
        guest_ids: &[i64],
        money: &MoneyBreakdown,
    ) -> Result<(), EngineError> {
        let updated = sqlx::query(
            r#"
            UPDATE guests
            SET status = 'CANCELLED', updated_at = $3
            WHERE registration_id = $1 AND id = ANY($2) AND status = 'ACTIVE'
            "#,
        )
        .bind(registration_id)
        .bind(guest_ids)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if updated.rows_affected() != guest_ids.len() as u64 {
            return Err(EngineError::StateConflict(
                "One or more guests are not active on this registration".to_string(),
            ));
        }

        let removed = guest_ids.len() as i32;
        self.apply_money(tx, registration_id, money, 0, -removed).await
    }

    /// Overwrite the merchandise component after a cart checkout
    pub async fn set_merchandise_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
        money: &MoneyBreakdown,
    ) -> Result<(), EngineError> {
        self.apply_money(tx, registration_id, money, 0, 0).await
    }

    /// Bulk-insert auto-registrations for cohort members.
    ///
    /// `ON CONFLICT DO NOTHING` on the (event_id, user_id) constraint skips
    /// members who already hold a registration, which also makes a retried
    /// approval safe. Returns the number of rows actually created.
    pub async fn bulk_register(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        user_ids: &[i64],
        registration_fee: Decimal,
    ) -> Result<u64, EngineError> {
        let result = sqlx::query(
            r#"
            INSERT INTO registrations (event_id, user_id, status, payment_status, mode, registration_fee_paid, guest_fees_paid, merchandise_total, donation_amount, total_amount, total_guests, active_guests, created_at, updated_at)
            SELECT $1, member_id, $3, $4, $5, $2, 0, 0, 0, $2, 0, 0, $6, $6
            FROM UNNEST($7::BIGINT[]) AS member_id
            ON CONFLICT (event_id, user_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(registration_fee)
        .bind(RegistrationStatus::Confirmed)
        .bind(PaymentStatus::Completed)
        .bind(RegistrationMode::BatchAutoRegistered)
        .bind(Utc::now())
        .bind(user_ids)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }

    /// Cancel a registration without touching its money breakdown
    pub async fn cancel(&self, id: i64) -> Result<Registration, EngineError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = 'CANCELLED', updated_at = $2
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(EngineError::RegistrationNotFound { registration_id: id })?;

        Ok(registration)
    }

    async fn apply_money(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        registration_id: i64,
        money: &MoneyBreakdown,
        total_guest_delta: i32,
        active_guest_delta: i32,
    ) -> Result<(), EngineError> {
        let updated = sqlx::query(
            r#"
            UPDATE registrations
            SET registration_fee_paid = $2,
                guest_fees_paid = $3,
                merchandise_total = $4,
                donation_amount = $5,
                total_amount = $6,
                total_guests = total_guests + $7,
                active_guests = active_guests + $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(registration_id)
        .bind(money.registration_fee_paid)
        .bind(money.guest_fees_paid)
        .bind(money.merchandise_total)
        .bind(money.donation_amount)
        .bind(money.total_amount)
        .bind(total_guest_delta)
        .bind(active_guest_delta)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(EngineError::RegistrationNotFound {
                registration_id,
            });
        }

        Ok(())
    }
}
