//! Shared test data factories
//!
//! Builders for the engine's domain objects so scenario tests stay focused
//! on behavior instead of struct plumbing.

#![allow(dead_code)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use gatherpay::models::batch::{BatchCollection, BatchCollectionStatus};
use gatherpay::models::event::{Event, EventSnapshot, EventStatus};
use gatherpay::models::form::{FieldKind, FieldRules, FormField, FormScope};
use gatherpay::models::merchandise::MerchandiseItem;
use gatherpay::models::registration::{
    MoneyBreakdown, PaymentStatus, Registration, RegistrationMode, RegistrationStatus,
};

pub fn upcoming_event(starts_in_hours: i64) -> Event {
    Event {
        id: 1,
        title: "Alumni spring gala".to_string(),
        description: Some("Annual gathering".to_string()),
        status: EventStatus::Open,
        starts_at: Utc::now() + Duration::hours(starts_in_hours),
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
        modification_deadline_hours: 24,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn snapshot_of(event: &Event, confirmed_count: i64) -> EventSnapshot {
    EventSnapshot::from_event(event, confirmed_count)
}

pub fn registration_with_money(money: MoneyBreakdown, active_guests: i32) -> Registration {
    Registration {
        id: 1,
        event_id: 1,
        user_id: 10,
        status: RegistrationStatus::Confirmed,
        payment_status: PaymentStatus::Completed,
        mode: RegistrationMode::Individual,
        registration_fee_paid: money.registration_fee_paid,
        guest_fees_paid: money.guest_fees_paid,
        merchandise_total: money.merchandise_total,
        donation_amount: money.donation_amount,
        total_amount: money.total_amount,
        total_guests: active_guests,
        active_guests,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn collection(target: Decimal, collected: Decimal) -> BatchCollection {
    BatchCollection {
        id: 1,
        event_id: 1,
        cohort_id: 7,
        target_amount: target,
        collected_amount: collected,
        is_target_met: collected >= target,
        is_approved: false,
        approved_by: None,
        status: BatchCollectionStatus::Active,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn form_field(id: i64, label: &str, required: bool, kind: FieldKind) -> FormField {
    FormField {
        id,
        event_id: 1,
        scope: FormScope::Event,
        label: label.to_string(),
        position: id as i32,
        required,
        kind,
        rules: FieldRules::default(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn merch_item(id: i64, name: &str, stock: Option<i32>, sizes: &[&str]) -> MerchandiseItem {
    MerchandiseItem {
        id,
        event_id: 1,
        name: name.to_string(),
        price: dec!(25),
        stock_quantity: stock,
        sizes: serde_json::json!(sizes),
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
