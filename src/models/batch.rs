//! Batch collection models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use super::registration::PaymentStatus;

/// A pooled-funding campaign scoping one event to one cohort.
///
/// `collected_amount` is maintained by the payment-recording transaction and
/// never decreases outside a full campaign reset. `is_target_met` flips once,
/// via compare-and-set, when `collected_amount >= target_amount` first holds.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BatchCollection {
    pub id: i64,
    pub event_id: i64,
    pub cohort_id: i64,
    pub target_amount: Decimal,
    pub collected_amount: Decimal,
    pub is_target_met: bool,
    pub is_approved: bool,
    pub approved_by: Option<i64>,
    pub status: BatchCollectionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BatchCollection {
    /// Whether the collected amount covers the target. Exact equality
    /// counts as reached; one cent short does not.
    pub fn target_reached(&self) -> bool {
        self.collected_amount >= self.target_amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchCollectionStatus {
    Active,
    Completed,
    Cancelled,
}

/// One completed administrator contribution to a collection
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BatchAdminPayment {
    pub id: i64,
    pub collection_id: i64,
    pub admin_user_id: i64,
    pub amount: Decimal,
    pub txn_ref: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Already-verified payment signal from the gateway integration.
///
/// The engine never talks to a payment gateway; callers guarantee the
/// amount is real before handing this over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedPayment {
    pub amount: Decimal,
    pub txn_ref: String,
    pub payer_user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBatchCollectionRequest {
    pub event_id: i64,
    pub cohort_id: i64,
    pub target_amount: Decimal,
}
