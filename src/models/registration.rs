//! Registration and guest models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    pub mode: RegistrationMode,
    pub registration_fee_paid: Decimal,
    pub guest_fees_paid: Decimal,
    pub merchandise_total: Decimal,
    pub donation_amount: Decimal,
    pub total_amount: Decimal,
    pub total_guests: i32,
    pub active_guests: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Check the money invariant: the total must equal the sum of its
    /// four components after every mutation.
    pub fn total_is_consistent(&self) -> bool {
        self.total_amount
            == self.registration_fee_paid
                + self.guest_fees_paid
                + self.merchandise_total
                + self.donation_amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
    Waitlist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// How a registration row came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationMode {
    Individual,
    BatchAutoRegistered,
}

/// Advisory mode for a prospective registrant, derived from the state of
/// any batch collection covering their (event, cohort) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivedRegistrationMode {
    Individual,
    BatchPending,
    BatchAutoRegistered,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Guest {
    pub id: i64,
    pub registration_id: i64,
    pub name: String,
    pub status: GuestStatus,
    pub fee_paid: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestStatus {
    Active,
    Cancelled,
}

/// Money fields of a registration after a mutation.
///
/// Produced by the fee calculator and written verbatim by the repository,
/// so the stored total always equals the sum of the four components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyBreakdown {
    pub registration_fee_paid: Decimal,
    pub guest_fees_paid: Decimal,
    pub merchandise_total: Decimal,
    pub donation_amount: Decimal,
    pub total_amount: Decimal,
}

impl MoneyBreakdown {
    /// Breakdown with a freshly computed total
    pub fn from_components(
        registration_fee_paid: Decimal,
        guest_fees_paid: Decimal,
        merchandise_total: Decimal,
        donation_amount: Decimal,
    ) -> Self {
        Self {
            registration_fee_paid,
            guest_fees_paid,
            merchandise_total,
            donation_amount,
            total_amount: registration_fee_paid
                + guest_fees_paid
                + merchandise_total
                + donation_amount,
        }
    }
}

impl From<&Registration> for MoneyBreakdown {
    fn from(registration: &Registration) -> Self {
        Self {
            registration_fee_paid: registration.registration_fee_paid,
            guest_fees_paid: registration.guest_fees_paid,
            merchandise_total: registration.merchandise_total,
            donation_amount: registration.donation_amount,
            total_amount: registration.total_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRegistrationRequest {
    pub event_id: i64,
    pub user_id: i64,
    pub mode: RegistrationMode,
    pub payment_status: PaymentStatus,
    pub registration_fee_paid: Decimal,
    pub guest_fees_paid: Decimal,
    pub merchandise_total: Decimal,
    pub donation_amount: Decimal,
    pub guest_names: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn registration(components: [Decimal; 4], total: Decimal) -> Registration {
        Registration {
            id: 1,
            event_id: 1,
            user_id: 1,
            status: RegistrationStatus::Confirmed,
            payment_status: PaymentStatus::Completed,
            mode: RegistrationMode::Individual,
            registration_fee_paid: components[0],
            guest_fees_paid: components[1],
            merchandise_total: components[2],
            donation_amount: components[3],
            total_amount: total,
            total_guests: 0,
            active_guests: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn total_consistency_check() {
        let ok = registration(
            [dec!(500), dec!(200), dec!(150), dec!(50)],
            dec!(900),
        );
        assert!(ok.total_is_consistent());

        let bad = registration(
            [dec!(500), dec!(200), dec!(150), dec!(50)],
            dec!(850),
        );
        assert!(!bad.total_is_consistent());
    }
}
