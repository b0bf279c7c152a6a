//! Fee computation
//!
//! All monetary arithmetic runs on fixed-point decimals. Guest removal
//! never refunds: the removed guests' fees move into the donation
//! component, so the total never decreases.

use rust_decimal::Decimal;

use crate::models::registration::{MoneyBreakdown, Registration};

/// What happens to money already paid for a guest who is removed.
///
/// A named policy rather than inline arithmetic, so it can be swapped
/// without touching unrelated fee logic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuestRemovalPolicy {
    /// No refund; the removed guests' fees become a goodwill donation
    #[default]
    ConvertToDonation,
}

impl GuestRemovalPolicy {
    /// Split the removed-guest fee total into (refund, donation increment)
    fn settle(&self, removed_fee_total: Decimal) -> (Decimal, Decimal) {
        match self {
            GuestRemovalPolicy::ConvertToDonation => (Decimal::ZERO, removed_fee_total),
        }
    }
}

/// Result of applying a guest count change to a registration
#[derive(Debug, Clone)]
pub struct GuestDelta {
    pub new_active_guests: i32,
    pub money: MoneyBreakdown,
    pub additional_payment_required: bool,
    pub additional_amount_due: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct FeeCalculator {
    removal_policy: GuestRemovalPolicy,
}

impl FeeCalculator {
    pub fn new(removal_policy: GuestRemovalPolicy) -> Self {
        Self { removal_policy }
    }

    /// Compute the money breakdown for a brand-new registration
    pub fn compute_initial_fees(
        &self,
        registration_fee: Decimal,
        guest_count: u32,
        guest_fee: Decimal,
        merchandise_line_totals: &[Decimal],
        donation_amount: Decimal,
    ) -> MoneyBreakdown {
        let guest_fees = guest_fee * Decimal::from(guest_count);
        let merchandise_total: Decimal = merchandise_line_totals.iter().copied().sum();

        MoneyBreakdown::from_components(
            registration_fee,
            guest_fees,
            merchandise_total,
            donation_amount,
        )
    }

    /// Recompute the breakdown after adding guests.
    ///
    /// The amount above what was already paid in guest fees is owed before
    /// the new guests become active.
    pub fn add_guests_delta(
        &self,
        current: &Registration,
        added: u32,
        guest_fee: Decimal,
    ) -> GuestDelta {
        let new_active = current.active_guests + added as i32;
        let new_guest_fees = current.guest_fees_paid + guest_fee * Decimal::from(added);
        let additional = new_guest_fees - current.guest_fees_paid;

        let money = MoneyBreakdown::from_components(
            current.registration_fee_paid,
            new_guest_fees,
            current.merchandise_total,
            current.donation_amount,
        );

        GuestDelta {
            new_active_guests: new_active,
            money,
            additional_payment_required: additional > Decimal::ZERO,
            additional_amount_due: additional,
        }
    }

    /// Recompute the breakdown after removing guests.
    ///
    /// `removed_guest_fees` are the exact fees the removed guests paid, so
    /// the donation conversion is auditable rather than approximated.
    pub fn remove_guests_delta(
        &self,
        current: &Registration,
        removed_guest_fees: &[Decimal],
    ) -> GuestDelta {
        let removed_total: Decimal = removed_guest_fees.iter().copied().sum();
        let (refund, donation_increment) = self.removal_policy.settle(removed_total);
        debug_assert_eq!(refund, Decimal::ZERO);

        let new_active = current.active_guests - removed_guest_fees.len() as i32;
        let money = MoneyBreakdown::from_components(
            current.registration_fee_paid,
            current.guest_fees_paid - removed_total,
            current.merchandise_total,
            current.donation_amount + donation_increment,
        );

        GuestDelta {
            new_active_guests: new_active,
            money,
            additional_payment_required: false,
            additional_amount_due: Decimal::ZERO,
        }
    }
}
