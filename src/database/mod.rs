//! Database module
//!
//! This module handles database connections and operations

pub mod connection;
pub mod repositories;

// Re-export commonly used database components
pub use connection::{DatabasePool, DatabaseConfig, create_pool, run_migrations, health_check};
pub use repositories::{
    EventRepository, CohortRepository, RegistrationRepository, MerchandiseRepository,
    FormRepository, BatchRepository,
};

/// Bundle of all repositories over one connection pool
#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub events: EventRepository,
    pub cohorts: CohortRepository,
    pub registrations: RegistrationRepository,
    pub merchandise: MerchandiseRepository,
    pub forms: FormRepository,
    pub batch: BatchRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            events: EventRepository::new(pool.clone()),
            cohorts: CohortRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            merchandise: MerchandiseRepository::new(pool.clone()),
            forms: FormRepository::new(pool.clone()),
            batch: BatchRepository::new(pool.clone()),
            pool,
        }
    }

    /// Pool handle for service-level transaction boundaries
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}
