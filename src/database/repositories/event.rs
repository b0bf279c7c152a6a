//! Event repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::event::{Event, CreateEventRequest};
use crate::utils::errors::EngineError;

const EVENT_COLUMNS: &str = "id, title, description, status, starts_at, capacity, registration_fee, guest_fee, registration_opens_at, registration_closes_at, has_registration, has_external_link, has_guests, has_merchandise, allow_form_modification, modification_deadline_hours, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event
    pub async fn create(&self, request: CreateEventRequest) -> Result<Event, EngineError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, status, starts_at, capacity, registration_fee, guest_fee, registration_opens_at, registration_closes_at, has_registration, has_external_link, has_guests, has_merchandise, allow_form_modification, modification_deadline_hours, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(request.title)
        .bind(request.description)
        .bind(request.status)
        .bind(request.starts_at)
        .bind(request.capacity)
        .bind(request.registration_fee)
        .bind(request.guest_fee)
        .bind(request.registration_opens_at)
        .bind(request.registration_closes_at)
        .bind(request.has_registration)
        .bind(request.has_external_link)
        .bind(request.has_guests)
        .bind(request.has_merchandise)
        .bind(request.allow_form_modification)
        .bind(request.modification_deadline_hours)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EngineError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID, failing when it does not exist
    pub async fn get(&self, id: i64) -> Result<Event, EngineError> {
        self.find_by_id(id)
            .await?
            .ok_or(EngineError::EventNotFound { event_id: id })
    }
}
