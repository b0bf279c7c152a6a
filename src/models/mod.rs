//! Data models module
//!
//! This module contains all data structures used throughout the engine

pub mod event;
pub mod cohort;
pub mod registration;
pub mod merchandise;
pub mod form;
pub mod batch;

// Re-export commonly used models
pub use event::{Event, EventSnapshot, EventStatus, CreateEventRequest};
pub use cohort::{Cohort, CohortMember, CreateCohortRequest};
pub use registration::{
    Registration, Guest, RegistrationStatus, PaymentStatus, GuestStatus, RegistrationMode,
    DerivedRegistrationMode, CreateRegistrationRequest, MoneyBreakdown,
};
pub use merchandise::{
    MerchandiseItem, CartOrder, StockStatus, CartLine, CartSummary, CreateMerchandiseItemRequest,
    AddCartOrderRequest,
};
pub use form::{FormField, FormScope, FieldKind, FieldRules, FieldError};
pub use batch::{
    BatchCollection, BatchAdminPayment, BatchCollectionStatus, CompletedPayment,
    CreateBatchCollectionRequest,
};
