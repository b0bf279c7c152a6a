//! Notification dispatch boundary
//!
//! The engine emits fire-and-forget signals when a collection's funding
//! target is met and when a collection is approved. Delivery is a
//! collaborator concern; failures are logged and never roll back the
//! state transition that triggered them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Payload carried by both collection signals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionNotice {
    pub collection_id: i64,
    pub event_id: i64,
    pub cohort_id: i64,
    pub collected_amount: Decimal,
    pub target_amount: Decimal,
}

#[allow(async_fn_in_trait)]
pub trait NotificationDispatcher: Send + Sync {
    /// The collection's collected amount crossed its target.
    /// Fired at most once per collection.
    async fn target_met(&self, notice: &CollectionNotice);

    /// The collection was approved and its members bulk-registered
    async fn collection_approved(&self, notice: &CollectionNotice, registrations_created: u64);
}

/// Default dispatcher that records signals in the structured log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl NotificationDispatcher for LogNotifier {
    async fn target_met(&self, notice: &CollectionNotice) {
        info!(
            collection_id = notice.collection_id,
            event_id = notice.event_id,
            cohort_id = notice.cohort_id,
            collected = %notice.collected_amount,
            target = %notice.target_amount,
            "Batch collection funding target met"
        );
    }

    async fn collection_approved(&self, notice: &CollectionNotice, registrations_created: u64) {
        info!(
            collection_id = notice.collection_id,
            event_id = notice.event_id,
            cohort_id = notice.cohort_id,
            registrations_created = registrations_created,
            "Batch collection approved"
        );
    }
}
