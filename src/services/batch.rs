//! Batch collection coordinator
//!
//! Manages the cohort-scoped pooled-funding campaign: payment recording
//! with exact aggregate maintenance, once-only target-met detection,
//! approval gating, and the atomic bulk auto-registration of cohort
//! members. Notifications dispatch after commit and never roll back a
//! transition; cache keys are invalidated after every write.

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::models::batch::{
    BatchAdminPayment, BatchCollection, BatchCollectionStatus, CompletedPayment,
    CreateBatchCollectionRequest,
};
use crate::models::registration::DerivedRegistrationMode;
use crate::services::cache::{collection_status_key, registration_mode_key, CacheService};
use crate::services::membership::CohortDirectory;
use crate::services::notification::{CollectionNotice, NotificationDispatcher};
use crate::utils::errors::{EngineError, Result};
use crate::utils::logging::log_collection_transition;

/// Result of recording an administrator payment
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: BatchAdminPayment,
    pub collection: BatchCollection,
    /// True only for the payment that performed the target-met transition
    pub target_met_now: bool,
}

/// Result of approving a collection
#[derive(Debug, Clone)]
pub struct ApprovalOutcome {
    pub collection: BatchCollection,
    pub members_considered: usize,
    pub registrations_created: u64,
    pub members_skipped: u64,
}

/// Cached progress view served by the collection-status lookup
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CollectionProgress {
    pub collection_id: i64,
    pub status: BatchCollectionStatus,
    pub collected_amount: Decimal,
    pub target_amount: Decimal,
    pub is_target_met: bool,
    pub is_approved: bool,
}

impl From<&BatchCollection> for CollectionProgress {
    fn from(collection: &BatchCollection) -> Self {
        Self {
            collection_id: collection.id,
            status: collection.status,
            collected_amount: collection.collected_amount,
            target_amount: collection.target_amount,
            is_target_met: collection.is_target_met,
            is_approved: collection.is_approved,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchCollectionCoordinator<D, N>
where
    D: CohortDirectory,
    N: NotificationDispatcher,
{
    db: DatabaseService,
    directory: D,
    notifier: N,
    cache: CacheService,
    settings: Settings,
}

impl<D, N> BatchCollectionCoordinator<D, N>
where
    D: CohortDirectory,
    N: NotificationDispatcher,
{
    pub fn new(
        db: DatabaseService,
        directory: D,
        notifier: N,
        cache: CacheService,
        settings: Settings,
    ) -> Self {
        Self {
            db,
            directory,
            notifier,
            cache,
            settings,
        }
    }

    /// Create a collection for an (event, cohort) pair.
    ///
    /// Allowed only while the event is open for registration and before
    /// its registration window closes, and only for cohorts with at least
    /// one active administrator to contribute.
    pub async fn create_collection(
        &self,
        request: CreateBatchCollectionRequest,
    ) -> Result<BatchCollection> {
        if request.target_amount <= Decimal::ZERO {
            return Err(EngineError::InvalidInput(
                "Target amount must be positive".to_string(),
            ));
        }

        let event = self.db.events.get(request.event_id).await?;
        if !event.status.is_open_for_registration() {
            warn!(
                event_id = event.id,
                status = %event.status,
                "Collection creation rejected for non-open event"
            );
            return Err(EngineError::StateConflict(
                "Collections can only be created for open events".to_string(),
            ));
        }
        if let Some(closes_at) = event.registration_closes_at {
            if Utc::now() > closes_at {
                return Err(EngineError::StateConflict(
                    "The registration period for this event has ended".to_string(),
                ));
            }
        }

        self.db
            .cohorts
            .find_by_id(request.cohort_id)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidInput(format!("Unknown cohort: {}", request.cohort_id))
            })?;

        let members = self.directory.active_members(request.cohort_id).await?;
        if !members.iter().any(|m| m.is_admin) {
            return Err(EngineError::StateConflict(
                "This cohort has no active administrators".to_string(),
            ));
        }

        let collection = self.db.batch.create(&request).await?;

        self.invalidate_cache(&collection).await;

        info!(
            collection_id = collection.id,
            event_id = collection.event_id,
            cohort_id = collection.cohort_id,
            target = %collection.target_amount,
            "Batch collection created"
        );

        Ok(collection)
    }

    /// Record a verified administrator payment.
    ///
    /// The payment row, the collected-amount increment, and the target-met
    /// compare-and-set all commit in one transaction; the target-met
    /// signal fires after commit and at most once per collection.
    pub async fn record_payment(
        &self,
        collection_id: i64,
        payment: CompletedPayment,
    ) -> Result<PaymentOutcome> {
        if payment.amount <= Decimal::ZERO {
            return Err(EngineError::InvalidInput(
                "Payment amount must be positive".to_string(),
            ));
        }

        let collection = self.db.batch.get(collection_id).await?;
        if collection.status != BatchCollectionStatus::Active {
            return Err(EngineError::StateConflict(
                "This collection is no longer accepting payments".to_string(),
            ));
        }

        let authorized = self
            .directory
            .is_cohort_admin(collection.cohort_id, payment.payer_user_id)
            .await?;
        if !authorized {
            return Err(EngineError::PermissionDenied(format!(
                "User {} is not an administrator of cohort {}",
                payment.payer_user_id, collection.cohort_id
            )));
        }

        let mut tx = self.db.pool().begin().await.map_err(EngineError::Database)?;

        let payment_row = self
            .db
            .batch
            .insert_payment(&mut tx, collection_id, &payment)
            .await?;
        self.db
            .batch
            .add_to_collected(&mut tx, collection_id, payment.amount)
            .await?;
        let target_met_now = self.db.batch.try_mark_target_met(&mut tx, collection_id).await?;

        tx.commit().await.map_err(EngineError::Database)?;

        let collection = self.db.batch.get(collection_id).await?;
        self.invalidate_cache(&collection).await;

        info!(
            collection_id = collection_id,
            payer = payment.payer_user_id,
            amount = %payment.amount,
            collected = %collection.collected_amount,
            target_met_now = target_met_now,
            "Batch payment recorded"
        );

        if target_met_now {
            // Post-commit, fire-and-forget: a delivery failure must not
            // undo the transition
            self.notifier.target_met(&self.notice_for(&collection)).await;
        }

        Ok(PaymentOutcome {
            payment: payment_row,
            collection,
            target_met_now,
        })
    }

    /// Approve a target-met collection and bulk-register its cohort.
    ///
    /// The approval flag flip and every member registration commit as one
    /// transaction: a crash cannot leave the collection approved with an
    /// incomplete member set. Members holding a registration already are
    /// skipped by the uniqueness constraint, which also makes a retried
    /// approval harmless.
    pub async fn approve(&self, collection_id: i64, approver_id: i64) -> Result<ApprovalOutcome> {
        let collection = self.db.batch.get(collection_id).await?;

        if !collection.is_target_met {
            return Err(EngineError::StateConflict(
                "The funding target has not been met yet".to_string(),
            ));
        }
        if !collection.target_reached() {
            // The persisted flag disagrees with the amounts; abort rather
            // than registering a cohort on corrupt data
            return Err(EngineError::ConsistencyViolation(format!(
                "collection {} is flagged target-met but holds {} of {}",
                collection.id, collection.collected_amount, collection.target_amount
            )));
        }
        if collection.is_approved {
            return Err(EngineError::StateConflict(
                "This collection has already been approved".to_string(),
            ));
        }
        if collection.status != BatchCollectionStatus::Active {
            return Err(EngineError::StateConflict(
                "Only active collections can be approved".to_string(),
            ));
        }

        let event = self.db.events.get(collection.event_id).await?;

        // Membership enumeration happens before the transaction opens so
        // no slow I/O runs inside it
        let members = self.directory.active_members(collection.cohort_id).await?;
        let member_ids: Vec<i64> = members.iter().map(|m| m.user_id).collect();

        let mut tx = self.db.pool().begin().await.map_err(EngineError::Database)?;

        let approved = self
            .db
            .batch
            .try_approve(&mut tx, collection_id, approver_id)
            .await?;
        if !approved {
            tx.rollback().await.map_err(EngineError::Database)?;
            return Err(EngineError::StateConflict(
                "This collection was just approved by someone else".to_string(),
            ));
        }

        let registrations_created = self
            .db
            .registrations
            .bulk_register(&mut tx, collection.event_id, &member_ids, event.registration_fee)
            .await?;

        tx.commit().await.map_err(EngineError::Database)?;

        let collection = self.db.batch.get(collection_id).await?;
        self.invalidate_cache(&collection).await;

        let members_skipped = member_ids.len() as u64 - registrations_created;
        log_collection_transition(collection_id, "ACTIVE", "COMPLETED", Some(approver_id));
        info!(
            collection_id = collection_id,
            approver = approver_id,
            members = member_ids.len(),
            created = registrations_created,
            skipped = members_skipped,
            "Batch collection approved and members registered"
        );

        self.notifier
            .collection_approved(&self.notice_for(&collection), registrations_created)
            .await;

        Ok(ApprovalOutcome {
            collection,
            members_considered: member_ids.len(),
            registrations_created,
            members_skipped,
        })
    }

    /// Administrative abort of an active collection
    pub async fn cancel_collection(&self, collection_id: i64) -> Result<BatchCollection> {
        let cancelled = self.db.batch.try_cancel(collection_id).await?;
        if !cancelled {
            return Err(EngineError::StateConflict(
                "Only active collections can be cancelled".to_string(),
            ));
        }

        let collection = self.db.batch.get(collection_id).await?;
        self.invalidate_cache(&collection).await;

        log_collection_transition(collection_id, "ACTIVE", "CANCELLED", None);
        warn!(collection_id = collection_id, "Batch collection cancelled");
        Ok(collection)
    }

    /// Derive the advisory registration mode for a prospective individual
    /// registrant, served read-through from the cache.
    pub async fn registration_mode_for(
        &self,
        event_id: i64,
        cohort_id: i64,
    ) -> Result<DerivedRegistrationMode> {
        let key = registration_mode_key(event_id, cohort_id);

        if let Some(mode) = self.cache.try_get::<DerivedRegistrationMode>(&key).await {
            return Ok(mode);
        }

        let mode = match self
            .db
            .batch
            .find_by_event_and_cohort(event_id, cohort_id)
            .await?
        {
            Some(c) if c.is_approved && c.status == BatchCollectionStatus::Completed => {
                DerivedRegistrationMode::BatchAutoRegistered
            }
            Some(c) if c.status == BatchCollectionStatus::Active => {
                DerivedRegistrationMode::BatchPending
            }
            _ => DerivedRegistrationMode::Individual,
        };

        self.cache
            .try_set(&key, &mode, Some(self.settings.engine.mode_cache_ttl_seconds))
            .await;

        Ok(mode)
    }

    /// Progress view for a collection, served read-through from the cache
    pub async fn collection_status(&self, collection_id: i64) -> Result<CollectionProgress> {
        let key = collection_status_key(collection_id);

        if let Some(progress) = self.cache.try_get::<CollectionProgress>(&key).await {
            return Ok(progress);
        }

        let collection = self.db.batch.get(collection_id).await?;
        let progress = CollectionProgress::from(&collection);

        self.cache
            .try_set(&key, &progress, Some(self.settings.engine.mode_cache_ttl_seconds))
            .await;

        Ok(progress)
    }

    /// Completed payments recorded against a collection
    pub async fn payments(&self, collection_id: i64) -> Result<Vec<BatchAdminPayment>> {
        self.db.batch.payments_for_collection(collection_id).await
    }

    fn notice_for(&self, collection: &BatchCollection) -> CollectionNotice {
        CollectionNotice {
            collection_id: collection.id,
            event_id: collection.event_id,
            cohort_id: collection.cohort_id,
            collected_amount: collection.collected_amount,
            target_amount: collection.target_amount,
        }
    }

    /// Drop the cache keys covering this collection's (event, cohort)
    /// space. Explicit invalidation, not TTL expiry: stale mode lookups
    /// would misroute registrants.
    async fn invalidate_cache(&self, collection: &BatchCollection) {
        self.cache
            .try_delete(&registration_mode_key(collection.event_id, collection.cohort_id))
            .await;
        self.cache
            .try_delete(&collection_status_key(collection.id))
            .await;
    }
}
