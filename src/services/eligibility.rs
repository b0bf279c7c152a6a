//! Registration eligibility gate
//!
//! Composes event status, registration window, capacity, and duplicate
//! checks into a single ordered decision. The check itself is a pure
//! function over an event snapshot so it can back both enforcement and
//! advisory UI state without side effects.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::database::{EventRepository, RegistrationRepository};
use crate::models::event::EventSnapshot;
use crate::utils::errors::Result;
use crate::utils::helpers::format_timestamp;

/// Why a registration attempt was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    RegistrationNotOpen,
    RegistrationDisabled,
    UseExternalLink,
    EventAlreadyStarted,
    WindowNotYetOpen,
    WindowEnded,
    EventFull,
    AlreadyRegistered,
}

/// Outcome of the eligibility check: an allowed flag plus a reason and a
/// message suitable for direct end-user display
#[derive(Debug, Clone)]
pub struct EligibilityDecision {
    pub allowed: bool,
    pub reason: Option<RejectionReason>,
    pub message: String,
}

impl EligibilityDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            message: "Registration is open".to_string(),
        }
    }

    fn rejected(reason: RejectionReason, message: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            message: message.into(),
        }
    }
}

/// Decide whether `user` may register for the event right now.
///
/// Rules run in order and the first failure wins. Safe to call repeatedly:
/// no mutation happens here.
pub fn check_eligibility(
    snapshot: &EventSnapshot,
    already_registered: bool,
    now: DateTime<Utc>,
) -> EligibilityDecision {
    if !snapshot.status.is_open_for_registration() {
        return EligibilityDecision::rejected(
            RejectionReason::RegistrationNotOpen,
            "Registration is not open for this event",
        );
    }

    if !snapshot.has_registration {
        return EligibilityDecision::rejected(
            RejectionReason::RegistrationDisabled,
            "Registration is disabled for this event",
        );
    }

    if snapshot.has_external_link {
        return EligibilityDecision::rejected(
            RejectionReason::UseExternalLink,
            "Please use the external registration link for this event",
        );
    }

    if snapshot.starts_at < now {
        return EligibilityDecision::rejected(
            RejectionReason::EventAlreadyStarted,
            "This event has already started",
        );
    }

    if let Some(opens_at) = snapshot.registration_opens_at {
        if now < opens_at {
            return EligibilityDecision::rejected(
                RejectionReason::WindowNotYetOpen,
                format!("Registration opens on {}", format_timestamp(opens_at)),
            );
        }
    }

    if let Some(closes_at) = snapshot.registration_closes_at {
        if now > closes_at {
            return EligibilityDecision::rejected(
                RejectionReason::WindowEnded,
                "The registration period has ended",
            );
        }
    }

    if let Some(capacity) = snapshot.capacity {
        if snapshot.confirmed_count >= capacity as i64 {
            return EligibilityDecision::rejected(RejectionReason::EventFull, "Event is full");
        }
    }

    if already_registered {
        return EligibilityDecision::rejected(
            RejectionReason::AlreadyRegistered,
            "You are already registered for this event",
        );
    }

    EligibilityDecision::allowed()
}

/// Storage-backed wrapper that assembles the snapshot and delegates to the
/// pure check
#[derive(Debug, Clone)]
pub struct EligibilityService {
    events: EventRepository,
    registrations: RegistrationRepository,
}

impl EligibilityService {
    pub fn new(events: EventRepository, registrations: RegistrationRepository) -> Self {
        Self { events, registrations }
    }

    /// Check whether `user_id` may register for `event_id` right now
    pub async fn check(&self, event_id: i64, user_id: i64) -> Result<EligibilityDecision> {
        let event = self.events.get(event_id).await?;
        let confirmed_count = self.registrations.count_confirmed(event_id).await?;
        let existing = self
            .registrations
            .find_by_event_and_user(event_id, user_id)
            .await?;

        let snapshot = EventSnapshot::from_event(&event, confirmed_count);
        let decision = check_eligibility(&snapshot, existing.is_some(), Utc::now());

        debug!(
            event_id = event_id,
            user_id = user_id,
            allowed = decision.allowed,
            reason = ?decision.reason,
            "Eligibility check completed"
        );

        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::models::event::EventStatus;

    fn open_snapshot(now: DateTime<Utc>) -> EventSnapshot {
        EventSnapshot {
            event_id: 1,
            status: EventStatus::Open,
            starts_at: now + Duration::days(7),
            capacity: None,
            registration_opens_at: None,
            registration_closes_at: None,
            has_registration: true,
            has_external_link: false,
            confirmed_count: 0,
        }
    }

    #[test]
    fn allows_open_event() {
        let now = Utc::now();
        let decision = check_eligibility(&open_snapshot(now), false, now);
        assert!(decision.allowed);
        assert_eq!(decision.reason, None);
    }

    #[test]
    fn rejects_closed_status() {
        let now = Utc::now();
        let mut snapshot = open_snapshot(now);
        snapshot.status = EventStatus::Closed;
        let decision = check_eligibility(&snapshot, false, now);
        assert_eq!(decision.reason, Some(RejectionReason::RegistrationNotOpen));
    }

    #[test]
    fn distinguishes_disabled_from_external_link() {
        let now = Utc::now();

        let mut disabled = open_snapshot(now);
        disabled.has_registration = false;
        assert_eq!(
            check_eligibility(&disabled, false, now).reason,
            Some(RejectionReason::RegistrationDisabled)
        );

        let mut external = open_snapshot(now);
        external.has_external_link = true;
        assert_eq!(
            check_eligibility(&external, false, now).reason,
            Some(RejectionReason::UseExternalLink)
        );
    }

    #[test]
    fn rejects_past_event() {
        let now = Utc::now();
        let mut snapshot = open_snapshot(now);
        snapshot.starts_at = now - Duration::hours(1);
        let decision = check_eligibility(&snapshot, false, now);
        assert_eq!(decision.reason, Some(RejectionReason::EventAlreadyStarted));
    }

    #[test]
    fn window_not_yet_open_includes_date() {
        let now = Utc::now();
        let opens = now + Duration::days(1);
        let mut snapshot = open_snapshot(now);
        snapshot.registration_opens_at = Some(opens);
        let decision = check_eligibility(&snapshot, false, now);
        assert_eq!(decision.reason, Some(RejectionReason::WindowNotYetOpen));
        assert!(decision.message.contains(&format_timestamp(opens)));
    }

    #[test]
    fn rejects_after_window_end() {
        let now = Utc::now();
        let mut snapshot = open_snapshot(now);
        snapshot.registration_closes_at = Some(now - Duration::minutes(5));
        let decision = check_eligibility(&snapshot, false, now);
        assert_eq!(decision.reason, Some(RejectionReason::WindowEnded));
    }

    #[test]
    fn rejects_full_event() {
        let now = Utc::now();
        let mut snapshot = open_snapshot(now);
        snapshot.capacity = Some(2);
        snapshot.confirmed_count = 2;
        let decision = check_eligibility(&snapshot, false, now);
        assert_eq!(decision.reason, Some(RejectionReason::EventFull));
        assert_eq!(decision.message, "Event is full");
    }

    #[test]
    fn rejects_duplicate_registration() {
        let now = Utc::now();
        let decision = check_eligibility(&open_snapshot(now), true, now);
        assert_eq!(decision.reason, Some(RejectionReason::AlreadyRegistered));
    }

    #[test]
    fn capacity_check_runs_before_duplicate_check() {
        let now = Utc::now();
        let mut snapshot = open_snapshot(now);
        snapshot.capacity = Some(1);
        snapshot.confirmed_count = 1;
        let decision = check_eligibility(&snapshot, true, now);
        assert_eq!(decision.reason, Some(RejectionReason::EventFull));
    }
}
