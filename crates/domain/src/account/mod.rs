//! Billing account aggregate: balance movements, subscriptions and invoices.

mod aggregate;
mod commands;
mod events;
mod service;
mod value_objects;

pub use aggregate::Account;
pub use commands::*;
pub use events::{
    AccountEvent, AccountOpenedData, FundsMovedData, InvoiceCreatedData,
    SubscriptionCancelledData, SubscriptionCreatedData,
};
pub use service::AccountService;
pub use value_objects::{Invoice, InvoiceId, Subscription, SubscriptionId, SubscriptionStatus};

use common::Money;
use thiserror::Error;

/// Reasons a billing command is rejected.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Account is not open")]
    NotOpen,

    #[error("Account already opened")]
    AlreadyOpen,

    #[error("Invalid amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: Money },

    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Money, requested: Money },

    #[error("Subscription plan must not be blank")]
    BlankPlan,

    #[error("Subscription {subscription_id} is already active")]
    SubscriptionAlreadyActive { subscription_id: SubscriptionId },

    #[error("Subscription not found: {subscription_id}")]
    SubscriptionNotFound { subscription_id: SubscriptionId },

    #[error("Subscription {subscription_id} is already cancelled")]
    SubscriptionAlreadyCancelled { subscription_id: SubscriptionId },

    #[error("Invoice {invoice_id} already exists")]
    DuplicateInvoice { invoice_id: InvoiceId },

    #[error("Amount {amount} would overflow the running total {total}")]
    AmountOverflow { total: Money, amount: Money },
}
