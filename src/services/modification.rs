//! Registration modification window
//!
//! Single source of truth for whether a confirmed registration may still
//! be edited. Guest changes, cart checkout, and form edits all go through
//! this check so deadline logic never diverges between features.

use chrono::{DateTime, Duration, Utc};

use crate::models::event::Event;
use crate::models::registration::{Registration, RegistrationStatus};
use crate::utils::helpers::{format_timestamp, hours_between};

#[derive(Debug, Clone)]
pub struct ModificationWindowStatus {
    pub open: bool,
    pub deadline: DateTime<Utc>,
    pub hours_remaining: i64,
    /// Set when the window is closed; suitable for end-user display
    pub reason: Option<String>,
}

/// Decide whether `registration` may still be modified at `now`.
///
/// The deadline is the event start minus the event's modification deadline
/// hours; a closed window reports why.
pub fn can_modify(
    registration: &Registration,
    event: &Event,
    now: DateTime<Utc>,
) -> ModificationWindowStatus {
    let deadline = event.starts_at - Duration::hours(event.modification_deadline_hours as i64);

    let closed = |reason: String| ModificationWindowStatus {
        open: false,
        deadline,
        hours_remaining: 0,
        reason: Some(reason),
    };

    if !event.allow_form_modification {
        return closed("Modifications are not allowed for this event".to_string());
    }

    if registration.status == RegistrationStatus::Cancelled {
        return closed("This registration has been cancelled".to_string());
    }

    if now > event.starts_at {
        return closed("This event has already started".to_string());
    }

    if now > deadline {
        return closed(format!(
            "The modification deadline ({}) has passed",
            format_timestamp(deadline)
        ));
    }

    ModificationWindowStatus {
        open: true,
        deadline,
        hours_remaining: hours_between(now, deadline),
        reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use crate::models::event::EventStatus;
    use crate::models::registration::{MoneyBreakdown, PaymentStatus, RegistrationMode};

    fn event_starting_in(hours: i64, deadline_hours: i32) -> Event {
        Event {
            id: 1,
            title: "Spring social".to_string(),
            description: None,
            status: EventStatus::Open,
            starts_at: Utc::now() + Duration::hours(hours),
            capacity: None,
            registration_fee: dec!(500),
            guest_fee: dec!(100),
            registration_opens_at: None,
            registration_closes_at: None,
            has_registration: true,
            has_external_link: false,
            has_guests: true,
            has_merchandise: true,
            allow_form_modification: true,
            modification_deadline_hours: deadline_hours,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn confirmed_registration() -> Registration {
        let money = MoneyBreakdown::from_components(
            dec!(500),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        );
        Registration {
            id: 1,
            event_id: 1,
            user_id: 1,
            status: RegistrationStatus::Confirmed,
            payment_status: PaymentStatus::Completed,
            mode: RegistrationMode::Individual,
            registration_fee_paid: money.registration_fee_paid,
            guest_fees_paid: money.guest_fees_paid,
            merchandise_total: money.merchandise_total,
            donation_amount: money.donation_amount,
            total_amount: money.total_amount,
            total_guests: 0,
            active_guests: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn open_well_before_deadline() {
        let event = event_starting_in(72, 24);
        let status = can_modify(&confirmed_registration(), &event, Utc::now());
        assert!(status.open);
        assert!(status.hours_remaining >= 47);
        assert!(status.reason.is_none());
    }

    #[test]
    fn closed_after_deadline_even_before_start() {
        // Starts in 12 hours, deadline was 24 hours before start
        let event = event_starting_in(12, 24);
        let status = can_modify(&confirmed_registration(), &event, Utc::now());
        assert!(!status.open);
        assert!(status.reason.as_deref().unwrap().contains("deadline"));
    }

    #[test]
    fn closed_when_event_disallows_modification() {
        let mut event = event_starting_in(72, 24);
        event.allow_form_modification = false;
        let status = can_modify(&confirmed_registration(), &event, Utc::now());
        assert!(!status.open);
    }

    #[test]
    fn closed_for_cancelled_registration() {
        let event = event_starting_in(72, 24);
        let mut registration = confirmed_registration();
        registration.status = RegistrationStatus::Cancelled;
        let status = can_modify(&registration, &event, Utc::now());
        assert!(!status.open);
        assert!(status.reason.as_deref().unwrap().contains("cancelled"));
    }

    #[test]
    fn closed_after_event_start() {
        let event = event_starting_in(-2, 24);
        let status = can_modify(&confirmed_registration(), &event, Utc::now());
        assert!(!status.open);
    }
}
