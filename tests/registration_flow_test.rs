//! Individual registration flow scenarios
//!
//! Covers the eligibility gate's capacity behavior and the fee model's
//! guest add/remove semantics end to end over the pure decision functions.

mod helpers;

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use gatherpay::services::eligibility::{check_eligibility, RejectionReason};
use gatherpay::services::fees::FeeCalculator;
use gatherpay::services::forms::FormValidator;
use helpers::*;

#[test]
fn capacity_two_admits_two_then_rejects_the_third() {
    let mut event = upcoming_event(72);
    event.capacity = Some(2);
    let now = Utc::now();

    // First two registrants pass the gate as the confirmed count grows
    for confirmed in 0..2 {
        let decision = check_eligibility(&snapshot_of(&event, confirmed), false, now);
        assert!(decision.allowed, "registrant {} should be admitted", confirmed + 1);
    }

    // The third attempt sees a full event
    let decision = check_eligibility(&snapshot_of(&event, 2), false, now);
    assert!(!decision.allowed);
    assert_eq!(decision.reason, Some(RejectionReason::EventFull));
    assert_eq!(decision.message, "Event is full");
}

#[test]
fn signup_with_two_guests_totals_and_later_removal_donates() {
    // Registration fee 500, guest fee 100, two guests at signup
    let calc = FeeCalculator::default();
    let initial = calc.compute_initial_fees(dec!(500), 2, dec!(100), &[], Decimal::ZERO);
    assert_eq!(initial.total_amount, dec!(700));

    // Removing one guest converts that guest's fee into a donation and
    // leaves the total unchanged
    let registration = registration_with_money(initial, 2);
    let delta = calc.remove_guests_delta(&registration, &[dec!(100)]);

    assert_eq!(delta.money.donation_amount, dec!(100));
    assert_eq!(delta.money.guest_fees_paid, dec!(100));
    assert_eq!(delta.money.total_amount, dec!(700));
    assert_eq!(delta.additional_amount_due, Decimal::ZERO);
}

#[test]
fn guest_round_trip_restores_count_and_moves_fees_to_donation() {
    let calc = FeeCalculator::default();
    let initial = calc.compute_initial_fees(dec!(500), 0, dec!(100), &[], Decimal::ZERO);
    let start = registration_with_money(initial.clone(), 0);

    let added = calc.add_guests_delta(&start, 4, dec!(100));
    assert_eq!(added.new_active_guests, 4);
    assert_eq!(added.additional_amount_due, dec!(400));

    let mid = registration_with_money(added.money, 4);
    let removed = calc.remove_guests_delta(
        &mid,
        &[dec!(100), dec!(100), dec!(100), dec!(100)],
    );

    // Active count is back where it started
    assert_eq!(removed.new_active_guests, 0);
    // Exactly the removed fees became donation, and the total only grew
    assert_eq!(removed.money.donation_amount, dec!(400));
    assert_eq!(removed.money.guest_fees_paid, Decimal::ZERO);
    assert_eq!(removed.money.total_amount, initial.total_amount + dec!(400));
}

#[test]
fn eligibility_and_forms_compose_for_a_clean_registration() {
    let event = upcoming_event(72);
    let decision = check_eligibility(&snapshot_of(&event, 0), false, Utc::now());
    assert!(decision.allowed);

    let validator = FormValidator::new();
    let fields = vec![
        form_field(
            1,
            "Email",
            true,
            gatherpay::models::form::FieldKind::Email,
        ),
        form_field(2, "Dietary notes", false, gatherpay::models::form::FieldKind::Text),
    ];
    let mut responses = HashMap::new();
    responses.insert(1, "sam@example.org".to_string());

    assert!(validator.validate(&fields, &responses).is_empty());
}

mod money_invariant {
    use super::*;
    use proptest::prelude::*;

    fn money_amount() -> impl Strategy<Value = Decimal> {
        // Cent-resolution amounts up to 100,000.00
        (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn initial_total_always_equals_component_sum(
            fee in money_amount(),
            guest_fee in money_amount(),
            guests in 0u32..20,
            donation in money_amount(),
        ) {
            let calc = FeeCalculator::default();
            let money = calc.compute_initial_fees(fee, guests, guest_fee, &[], donation);
            prop_assert_eq!(
                money.total_amount,
                money.registration_fee_paid
                    + money.guest_fees_paid
                    + money.merchandise_total
                    + money.donation_amount
            );
        }

        #[test]
        fn removal_never_decreases_total(
            fee in money_amount(),
            guest_fee in money_amount(),
            guests in 1u32..10,
        ) {
            let calc = FeeCalculator::default();
            let initial = calc.compute_initial_fees(fee, guests, guest_fee, &[], Decimal::ZERO);
            let registration = registration_with_money(initial.clone(), guests as i32);

            let removed_fees: Vec<Decimal> =
                std::iter::repeat(guest_fee).take(guests as usize).collect();
            let delta = calc.remove_guests_delta(&registration, &removed_fees);

            prop_assert!(delta.money.total_amount >= initial.total_amount);
            prop_assert_eq!(
                delta.money.total_amount,
                delta.money.registration_fee_paid
                    + delta.money.guest_fees_paid
                    + delta.money.merchandise_total
                    + delta.money.donation_amount
            );
        }
    }
}
