//! Periodic overdue-loan reminder job

use std::time::Duration;

use crate::{config::ReminderConfig, error::AppResult, models::loan::Loan};

use super::{email::EmailService, loans::LoansService};

#[derive(Clone)]
pub struct ReminderService {
    loans: LoansService,
    email: EmailService,
    config: ReminderConfig,
}

impl ReminderService {
    pub fn new(loans: LoansService, email: EmailService, config: ReminderConfig) -> Self {
        Self {
            loans,
            email,
            config,
        }
    }

    /// One reminder sweep: collect late loans and send the configured notice
    /// to every affected customer. Returns the number of recipients.
    pub async fn run_once(&self) -> AppResult<usize> {
        let late = self.loans.get_all_late_loans().await?;
        let recipients = notify_addresses(&late);

        if recipients.is_empty() {
            tracing::info!("No overdue loans to notify ({} late loans)", late.len());
            return Ok(0);
        }

        tracing::info!(
            "Sending overdue notices for {} late loan(s) to {} recipient(s)",
            late.len(),
            recipients.len()
        );
        self.email
            .send_overdue_notices(&self.config.message, &recipients)
            .await?;

        Ok(recipients.len())
    }

    /// Spawn the periodic sweep on the current runtime
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        let period = Duration::from_secs(self.config.interval_hours.max(1) * 3600);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once().await {
                    tracing::error!("Overdue reminder sweep failed: {}", e);
                }
            }
        })
    }
}

/// Notification addresses for a set of late loans, deduplicated in order.
/// Loans without a customer email are skipped.
fn notify_addresses(loans: &[Loan]) -> Vec<String> {
    let mut addresses: Vec<String> = Vec::new();
    for loan in loans {
        if let Some(email) = &loan.customer_email {
            if !addresses.iter().any(|a| a == email) {
                addresses.push(email.clone());
            }
        }
    }
    addresses
}
