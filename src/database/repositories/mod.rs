//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod event;
pub mod cohort;
pub mod registration;
pub mod merchandise;
pub mod form;
pub mod batch;

// Re-export repositories
pub use event::EventRepository;
pub use cohort::CohortRepository;
pub use registration::RegistrationRepository;
pub use merchandise::MerchandiseRepository;
pub use form::FormRepository;
pub use batch::BatchRepository;
