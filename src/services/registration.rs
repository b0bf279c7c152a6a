//! Registration service
//!
//! Composes the eligibility gate, fee calculator, and form validator into
//! the individual registration path, and applies guest-change deltas and
//! the modification window to existing registrations. Every multi-row
//! mutation commits in a single transaction.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

use crate::database::DatabaseService;
use crate::models::batch::BatchCollection;
use crate::models::event::EventSnapshot;
use crate::models::form::FormScope;
use crate::models::registration::{
    CreateRegistrationRequest, Guest, PaymentStatus, Registration, RegistrationMode,
};
use crate::services::eligibility::check_eligibility;
use crate::services::fees::{FeeCalculator, GuestDelta};
use crate::services::forms::FormValidator;
use crate::services::modification::can_modify;
use crate::utils::errors::{EngineError, Result};
use crate::utils::logging::{log_registration_action, log_rejection};

/// Input for an individual registration
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub event_id: i64,
    pub user_id: i64,
    /// The registrant's cohort, when known; used to suppress individual
    /// signup once a batch collection has covered the pair
    pub cohort_id: Option<i64>,
    pub guest_names: Vec<String>,
    pub donation_amount: Decimal,
    pub form_responses: HashMap<i64, String>,
}

#[derive(Debug, Clone)]
pub struct RegistrationService {
    db: DatabaseService,
    fees: FeeCalculator,
    forms: FormValidator,
}

impl RegistrationService {
    pub fn new(db: DatabaseService, fees: FeeCalculator, forms: FormValidator) -> Self {
        Self {
            db,
            fees,
            forms,
        }
    }

    /// Register an individual for an event: eligibility gate, fee
    /// computation, form validation, then a transactional insert of the
    /// registration together with its guests and form responses.
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration> {
        let event = self.db.events.get(request.event_id).await?;

        let confirmed_count = self.db.registrations.count_confirmed(event.id).await?;
        let existing = self
            .db
            .registrations
            .find_by_event_and_user(event.id, request.user_id)
            .await?;

        let snapshot = EventSnapshot::from_event(&event, confirmed_count);
        let decision = check_eligibility(&snapshot, existing.is_some(), Utc::now());
        if !decision.allowed {
            log_rejection(event.id, request.user_id, &decision.message);
            return Err(EngineError::StateConflict(decision.message));
        }

        if let Some(cohort_id) = request.cohort_id {
            if let Some(collection) = self
                .db
                .batch
                .find_by_event_and_cohort(event.id, cohort_id)
                .await?
            {
                if covers_registration(&collection) {
                    return Err(EngineError::StateConflict(
                        "Your cohort's batch registration covers this event".to_string(),
                    ));
                }
            }
        }

        if !request.guest_names.is_empty() && !event.has_guests {
            return Err(EngineError::StateConflict(
                "This event does not allow guests".to_string(),
            ));
        }

        let fields = self
            .db
            .forms
            .fields_for_event(event.id, FormScope::Event)
            .await?;
        self.forms.validate_or_reject(&fields, &request.form_responses)?;

        let money = self.fees.compute_initial_fees(
            event.registration_fee,
            request.guest_names.len() as u32,
            event.guest_fee,
            &[],
            request.donation_amount,
        );

        let create = CreateRegistrationRequest {
            event_id: event.id,
            user_id: request.user_id,
            mode: RegistrationMode::Individual,
            payment_status: PaymentStatus::Pending,
            registration_fee_paid: money.registration_fee_paid,
            guest_fees_paid: money.guest_fees_paid,
            merchandise_total: money.merchandise_total,
            donation_amount: money.donation_amount,
            guest_names: request.guest_names,
        };

        let mut tx = self.db.pool().begin().await.map_err(EngineError::Database)?;

        let registration = match self
            .db
            .registrations
            .create_with_guests(&mut tx, &create, event.guest_fee)
            .await
        {
            Ok(registration) => registration,
            // The uniqueness constraint wins any race the gate missed
            Err(EngineError::Database(e)) if is_duplicate_registration(&e) => {
                tx.rollback().await.map_err(EngineError::Database)?;
                return Err(EngineError::StateConflict(
                    "You are already registered for this event".to_string(),
                ));
            }
            Err(e) => {
                tx.rollback().await.map_err(EngineError::Database)?;
                return Err(e);
            }
        };

        self.db
            .forms
            .save_responses(&mut tx, registration.id, &request.form_responses)
            .await?;

        tx.commit().await.map_err(EngineError::Database)?;

        info!(
            event_id = event.id,
            user_id = request.user_id,
            registration_id = registration.id,
            total = %registration.total_amount,
            "Registration created"
        );

        Ok(registration)
    }

    /// Add guests to a confirmed registration inside the modification
    /// window. Returns the fee delta so the caller can collect the
    /// additional amount owed.
    pub async fn add_guests(
        &self,
        registration_id: i64,
        guest_names: &[String],
    ) -> Result<GuestDelta> {
        if guest_names.is_empty() {
            return Err(EngineError::InvalidInput(
                "At least one guest is required".to_string(),
            ));
        }

        let registration = self.db.registrations.get_checked(registration_id).await?;
        let event = self.db.events.get(registration.event_id).await?;

        if !event.has_guests {
            return Err(EngineError::StateConflict(
                "This event does not allow guests".to_string(),
            ));
        }

        let window = can_modify(&registration, &event, Utc::now());
        if !window.open {
            return Err(EngineError::StateConflict(
                window.reason.unwrap_or_else(|| "Modification window is closed".to_string()),
            ));
        }

        let delta =
            self.fees
                .add_guests_delta(&registration, guest_names.len() as u32, event.guest_fee);

        let mut tx = self.db.pool().begin().await.map_err(EngineError::Database)?;
        self.db
            .registrations
            .add_guests(&mut tx, registration_id, guest_names, event.guest_fee, &delta.money)
            .await?;
        tx.commit().await.map_err(EngineError::Database)?;

        info!(
            registration_id = registration_id,
            added = guest_names.len(),
            additional_due = %delta.additional_amount_due,
            "Guests added"
        );

        Ok(delta)
    }

    /// Remove guests from a registration. Their fees are not refunded:
    /// the exact amount they paid moves into the donation component.
    pub async fn remove_guests(
        &self,
        registration_id: i64,
        guest_ids: &[i64],
    ) -> Result<GuestDelta> {
        if guest_ids.is_empty() {
            return Err(EngineError::InvalidInput(
                "At least one guest is required".to_string(),
            ));
        }

        let registration = self.db.registrations.get_checked(registration_id).await?;
        let event = self.db.events.get(registration.event_id).await?;

        let window = can_modify(&registration, &event, Utc::now());
        if !window.open {
            return Err(EngineError::StateConflict(
                window.reason.unwrap_or_else(|| "Modification window is closed".to_string()),
            ));
        }

        let active = self.db.registrations.active_guests(registration_id).await?;
        let removed: Vec<&Guest> = active
            .iter()
            .filter(|g| guest_ids.contains(&g.id))
            .collect();
        if removed.len() != guest_ids.len() {
            return Err(EngineError::StateConflict(
                "One or more guests are not active on this registration".to_string(),
            ));
        }

        // Exact fees paid by the removed guests, not an approximation
        let removed_fees: Vec<Decimal> = removed.iter().map(|g| g.fee_paid).collect();
        let delta = self.fees.remove_guests_delta(&registration, &removed_fees);

        let mut tx = self.db.pool().begin().await.map_err(EngineError::Database)?;
        self.db
            .registrations
            .remove_guests(&mut tx, registration_id, guest_ids, &delta.money)
            .await?;
        tx.commit().await.map_err(EngineError::Database)?;

        info!(
            registration_id = registration_id,
            removed = guest_ids.len(),
            donated = %delta.money.donation_amount,
            "Guests removed, fees converted to donation"
        );

        Ok(delta)
    }

    /// Cancel a registration without touching its money breakdown
    pub async fn cancel_registration(&self, registration_id: i64) -> Result<Registration> {
        let registration = self.db.registrations.cancel(registration_id).await?;
        log_registration_action(registration.event_id, registration.user_id, "cancelled", None);
        Ok(registration)
    }

    /// Fetch a registration, verifying the money invariant
    pub async fn get_registration(&self, registration_id: i64) -> Result<Registration> {
        self.db.registrations.get_checked(registration_id).await
    }

    /// Stored form responses for a registration, keyed by field
    pub async fn form_responses(&self, registration_id: i64) -> Result<HashMap<i64, String>> {
        self.db.forms.responses_for_registration(registration_id).await
    }
}

/// Whether a collection has reached the state that supersedes individual
/// signup for its cohort
fn covers_registration(collection: &BatchCollection) -> bool {
    use crate::models::batch::BatchCollectionStatus;
    collection.is_approved && collection.status == BatchCollectionStatus::Completed
}

fn is_duplicate_registration(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_err) => {
            db_err.constraint() == Some("uq_registrations_event_user")
        }
        _ => false,
    }
}
