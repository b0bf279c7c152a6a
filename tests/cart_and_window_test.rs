//! Merchandise cart and modification window scenarios

mod helpers;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use gatherpay::models::merchandise::StockStatus;
use gatherpay::models::registration::MoneyBreakdown;
use gatherpay::services::cart::{stock_status_for, validate_stock};
use gatherpay::services::modification::can_modify;
use helpers::*;

#[test]
fn checkout_after_deadline_is_blocked_even_with_sufficient_stock() {
    // Event starts in 12 hours but the modification window closed 24 hours
    // before start
    let event = upcoming_event(12);
    let registration = registration_with_money(
        MoneyBreakdown::from_components(dec!(500), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        0,
    );

    let window = can_modify(&registration, &event, Utc::now());
    assert!(!window.open);
    assert!(window.reason.as_deref().unwrap().contains("deadline"));

    // Stock alone would have allowed the purchase
    let item = merch_item(1, "Tote bag", Some(50), &[]);
    assert_eq!(validate_stock(&item, 2, None), Ok(StockStatus::Available));
}

#[test]
fn window_reports_hours_remaining_while_open() {
    let event = upcoming_event(96);
    let registration = registration_with_money(
        MoneyBreakdown::from_components(dec!(500), Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        0,
    );

    let window = can_modify(&registration, &event, Utc::now());
    assert!(window.open);
    // 96 hours to start minus the 24-hour deadline leaves about 72
    assert!((71..=72).contains(&window.hours_remaining));
    assert_eq!(window.deadline, event.starts_at - chrono::Duration::hours(24));
}

#[test]
fn unlimited_stock_never_blocks_quantity() {
    let item = merch_item(1, "Digital program", None, &[]);
    assert_eq!(validate_stock(&item, 10_000, None), Ok(StockStatus::Unlimited));
    assert_eq!(stock_status_for(&item, i32::MAX), StockStatus::Unlimited);
}

#[test]
fn sized_item_enforces_size_membership() {
    let item = merch_item(1, "Festival tee", Some(30), &["S", "M", "L"]);

    assert!(validate_stock(&item, 1, None).is_err());
    assert!(validate_stock(&item, 1, Some("XS")).is_err());
    assert_eq!(validate_stock(&item, 1, Some("L")), Ok(StockStatus::Available));
}

#[test]
fn finite_stock_blocks_over_request_with_reason() {
    let item = merch_item(1, "Poster", Some(3), &[]);

    let err = validate_stock(&item, 4, None).unwrap_err();
    assert!(err.contains("3"));
    assert!(err.contains("Poster"));
    assert_eq!(stock_status_for(&item, 4), StockStatus::Insufficient);
}

#[test]
fn inactive_item_blocks_regardless_of_stock() {
    let mut item = merch_item(1, "Hoodie", None, &[]);
    item.is_active = false;

    assert!(validate_stock(&item, 1, None).is_err());
}
