//! Account domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, CustomerId, Money};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{InvoiceId, SubscriptionId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AccountEvent {
    AccountOpened(AccountOpenedData),
    FundsDeposited(FundsMovedData),
    FundsWithdrawn(FundsMovedData),
    SubscriptionCreated(SubscriptionCreatedData),
    SubscriptionCancelled(SubscriptionCancelledData),
    InvoiceCreated(InvoiceCreatedData),
}

impl DomainEvent for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::AccountOpened(_) => "AccountOpened",
            AccountEvent::FundsDeposited(_) => "FundsDeposited",
            AccountEvent::FundsWithdrawn(_) => "FundsWithdrawn",
            AccountEvent::SubscriptionCreated(_) => "SubscriptionCreated",
            AccountEvent::SubscriptionCancelled(_) => "SubscriptionCancelled",
            AccountEvent::InvoiceCreated(_) => "InvoiceCreated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountOpenedData {
    pub account_id: AggregateId,
    pub customer_id: CustomerId,
    pub opened_at: DateTime<Utc>,
}

/// Shared by deposits and withdrawals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundsMovedData {
    pub amount: Money,
    /// Balance once this movement is applied.
    pub balance_after: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionCreatedData {
    pub subscription_id: SubscriptionId,
    pub plan: String,
    pub monthly_fee: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionCancelledData {
    pub subscription_id: SubscriptionId,
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceCreatedData {
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub description: String,
    pub issued_at: DateTime<Utc>,
}

impl AccountEvent {
    pub fn account_opened(account_id: AggregateId, customer_id: CustomerId) -> Self {
        AccountEvent::AccountOpened(AccountOpenedData {
            account_id,
            customer_id,
            opened_at: Utc::now(),
        })
    }

    pub fn funds_deposited(amount: Money, balance_after: Money) -> Self {
        AccountEvent::FundsDeposited(FundsMovedData {
            amount,
            balance_after,
            occurred_at: Utc::now(),
        })
    }

    pub fn funds_withdrawn(amount: Money, balance_after: Money) -> Self {
        AccountEvent::FundsWithdrawn(FundsMovedData {
            amount,
            balance_after,
            occurred_at: Utc::now(),
        })
    }

    pub fn subscription_created(
        subscription_id: SubscriptionId,
        plan: impl Into<String>,
        monthly_fee: Money,
    ) -> Self {
        AccountEvent::SubscriptionCreated(SubscriptionCreatedData {
            subscription_id,
            plan: plan.into(),
            monthly_fee,
            created_at: Utc::now(),
        })
    }

    pub fn subscription_cancelled(subscription_id: SubscriptionId, reason: Option<String>) -> Self {
        AccountEvent::SubscriptionCancelled(SubscriptionCancelledData {
            subscription_id,
            reason,
            cancelled_at: Utc::now(),
        })
    }

    pub fn invoice_created(
        invoice_id: InvoiceId,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        AccountEvent::InvoiceCreated(InvoiceCreatedData {
            invoice_id,
            amount,
            description: description.into(),
            issued_at: Utc::now(),
        })
    }
}
