//! Services module
//!
//! This module contains the engine's business logic services

pub mod batch;
pub mod cache;
pub mod cart;
pub mod eligibility;
pub mod fees;
pub mod forms;
pub mod membership;
pub mod modification;
pub mod notification;
pub mod registration;

// Re-export commonly used services
pub use batch::{ApprovalOutcome, BatchCollectionCoordinator, CollectionProgress, PaymentOutcome};
pub use cache::CacheService;
pub use cart::{CartService, CheckoutValidation, stock_status_for, validate_stock};
pub use eligibility::{check_eligibility, EligibilityDecision, EligibilityService, RejectionReason};
pub use fees::{FeeCalculator, GuestDelta, GuestRemovalPolicy};
pub use forms::FormValidator;
pub use membership::{CohortDirectory, StaticDirectory};
pub use modification::{can_modify, ModificationWindowStatus};
pub use notification::{CollectionNotice, LogNotifier, NotificationDispatcher};
pub use registration::{RegisterRequest, RegistrationService};

use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory<D, N>
where
    D: CohortDirectory + Clone,
    N: NotificationDispatcher + Clone,
{
    pub eligibility_service: EligibilityService,
    pub registration_service: RegistrationService,
    pub cart_service: CartService,
    pub batch_coordinator: BatchCollectionCoordinator<D, N>,
    pub cache_service: CacheService,
}

impl<D, N> ServiceFactory<D, N>
where
    D: CohortDirectory + Clone,
    N: NotificationDispatcher + Clone,
{
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        db: DatabaseService,
        settings: Settings,
        directory: D,
        notifier: N,
    ) -> Result<Self> {
        let cache_service = CacheService::new(settings.clone())?;
        let eligibility_service =
            EligibilityService::new(db.events.clone(), db.registrations.clone());
        let registration_service =
            RegistrationService::new(db.clone(), FeeCalculator::default(), FormValidator::new());
        let cart_service = CartService::new(db.clone());
        let batch_coordinator = BatchCollectionCoordinator::new(
            db,
            directory,
            notifier,
            cache_service.clone(),
            settings,
        );

        Ok(Self {
            eligibility_service,
            registration_service,
            cart_service,
            batch_coordinator,
            cache_service,
        })
    }

    /// Health check for the cache connection
    pub async fn health_check(&self) -> bool {
        self.cache_service.health_check().await.unwrap_or(false)
    }
}
