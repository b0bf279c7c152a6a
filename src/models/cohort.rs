//! Cohort model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A named partition of users, e.g. a graduation year.
///
/// Membership itself is resolved through the [`CohortDirectory`] provider;
/// the engine persists only the cohort row that collections reference.
///
/// [`CohortDirectory`]: crate::services::membership::CohortDirectory
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cohort {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An active member of a cohort as reported by the membership provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortMember {
    pub user_id: i64,
    pub cohort_id: i64,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCohortRequest {
    pub name: String,
}
