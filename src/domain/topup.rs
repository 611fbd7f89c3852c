//! Top-up request model
//!
//! A top-up is the only way balance enters the system. It is gated on manual
//! approval: Pending -> Approved credits the wallet, Pending -> Rejected
//! changes nothing. Both outcomes are terminal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DomainError, Money};

/// Status of a top-up request. Terminal once it leaves Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "topup_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TopupStatus {
    Pending,
    Approved,
    Rejected,
}

/// Admin decision on a pending top-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopupDecision {
    Approved,
    Rejected,
}

impl TopupDecision {
    /// The terminal status this decision resolves to.
    pub fn resolved_status(&self) -> TopupStatus {
        match self {
            TopupDecision::Approved => TopupStatus::Approved,
            TopupDecision::Rejected => TopupStatus::Rejected,
        }
    }
}

/// A user-submitted request to add funds. Never deleted; mutated only by the
/// processing operation, exactly once.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopupRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "rust_decimal::Decimal")]
    pub amount: Money,
    pub payment_method: String,
    pub payment_proof_url: Option<String>,
    pub status: TopupStatus,
    pub admin_notes: Option<String>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TopupRequest {
    /// Resolve a pending request. Stamps `processed_by` and `processed_at`
    /// together with the status flip, exactly once.
    ///
    /// # Errors
    /// - `DomainError::AlreadyProcessed` if the request already left Pending
    pub fn process(
        mut self,
        decision: TopupDecision,
        admin_id: Uuid,
        notes: Option<String>,
        processed_at: DateTime<Utc>,
    ) -> Result<TopupRequest, DomainError> {
        if self.status != TopupStatus::Pending {
            return Err(DomainError::AlreadyProcessed);
        }

        self.status = decision.resolved_status();
        self.admin_notes = notes;
        self.processed_by = Some(admin_id);
        self.processed_at = Some(processed_at);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn pending_topup() -> TopupRequest {
        TopupRequest {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: Money::new(Decimal::new(150_000, 0)).unwrap(),
            payment_method: "bank_transfer".to_string(),
            payment_proof_url: Some("https://proof.example/1.jpg".to_string()),
            status: TopupStatus::Pending,
            admin_notes: None,
            processed_by: None,
            processed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_approve_stamps_fields_together() {
        let topup = pending_topup();
        let admin = Uuid::new_v4();
        let at = Utc::now();

        let processed = topup
            .process(TopupDecision::Approved, admin, Some("ok".to_string()), at)
            .unwrap();

        assert_eq!(processed.status, TopupStatus::Approved);
        assert_eq!(processed.processed_by, Some(admin));
        assert_eq!(processed.processed_at, Some(at));
        assert_eq!(processed.admin_notes, Some("ok".to_string()));
    }

    #[test]
    fn test_reject_is_terminal_too() {
        let topup = pending_topup();
        let rejected = topup
            .process(TopupDecision::Rejected, Uuid::new_v4(), None, Utc::now())
            .unwrap();
        assert_eq!(rejected.status, TopupStatus::Rejected);

        let result = rejected.process(TopupDecision::Approved, Uuid::new_v4(), None, Utc::now());
        assert_eq!(result.unwrap_err(), DomainError::AlreadyProcessed);
    }

    #[test]
    fn test_process_at_most_once() {
        let topup = pending_topup();
        let approved = topup
            .process(TopupDecision::Approved, Uuid::new_v4(), None, Utc::now())
            .unwrap();

        let second = approved
            .clone()
            .process(TopupDecision::Rejected, Uuid::new_v4(), None, Utc::now());
        assert_eq!(second.unwrap_err(), DomainError::AlreadyProcessed);

        // the first processing stamp is untouched
        assert_eq!(approved.status, TopupStatus::Approved);
    }

    #[test]
    fn test_decision_resolves_status() {
        assert_eq!(
            TopupDecision::Approved.resolved_status(),
            TopupStatus::Approved
        );
        assert_eq!(
            TopupDecision::Rejected.resolved_status(),
            TopupStatus::Rejected
        );
    }
}
