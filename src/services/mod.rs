//! Business logic services

pub mod catalog;
pub mod email;
pub mod loans;
pub mod reminders;

use crate::{
    config::{EmailConfig, ReminderConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub email: email::EmailService,
    pub reminders: reminders::ReminderService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        email_config: EmailConfig,
        reminder_config: ReminderConfig,
    ) -> Self {
        let email = email::EmailService::new(email_config);
        let loans = loans::LoansService::new(repository.clone());
        Self {
            catalog: catalog::CatalogService::new(repository),
            reminders: reminders::ReminderService::new(
                loans.clone(),
                email.clone(),
                reminder_config,
            ),
            loans,
            email,
        }
    }
}
