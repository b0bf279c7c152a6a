//! Event model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub registration_fee: Decimal,
    pub guest_fee: Decimal,
    pub registration_opens_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,
    pub has_registration: bool,
    pub has_external_link: bool,
    pub has_guests: bool,
    pub has_merchandise: bool,
    pub allow_form_modification: bool,
    pub modification_deadline_hours: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Draft,
    Published,
    Open,
    Closed,
    Completed,
    Cancelled,
}

impl EventStatus {
    /// Statuses in which new registrations may be accepted
    pub fn is_open_for_registration(&self) -> bool {
        matches!(self, EventStatus::Published | EventStatus::Open)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EventStatus::Draft => "DRAFT",
            EventStatus::Published => "PUBLISHED",
            EventStatus::Open => "OPEN",
            EventStatus::Closed => "CLOSED",
            EventStatus::Completed => "COMPLETED",
            EventStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

/// Point-in-time view of an event used by the eligibility gate.
///
/// Carries the confirmed registration count alongside the event fields so
/// the gate can run as a pure function without touching storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub event_id: i64,
    pub status: EventStatus,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub registration_opens_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,
    pub has_registration: bool,
    pub has_external_link: bool,
    pub confirmed_count: i64,
}

impl EventSnapshot {
    pub fn from_event(event: &Event, confirmed_count: i64) -> Self {
        Self {
            event_id: event.id,
            status: event.status,
            starts_at: event.starts_at,
            capacity: event.capacity,
            registration_opens_at: event.registration_opens_at,
            registration_closes_at: event.registration_closes_at,
            has_registration: event.has_registration,
            has_external_link: event.has_external_link,
            confirmed_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: EventStatus,
    pub starts_at: DateTime<Utc>,
    pub capacity: Option<i32>,
    pub registration_fee: Decimal,
    pub guest_fee: Decimal,
    pub registration_opens_at: Option<DateTime<Utc>>,
    pub registration_closes_at: Option<DateTime<Utc>>,
    pub has_registration: bool,
    pub has_external_link: bool,
    pub has_guests: bool,
    pub has_merchandise: bool,
    pub allow_form_modification: bool,
    pub modification_deadline_hours: i32,
}
