//! Billing commands. Each record is immutable once built and targets one account.

use common::{AggregateId, CustomerId, Money};
use serde::{Deserialize, Serialize};

use crate::command::Command;

use super::{Account, InvoiceId, SubscriptionId};

macro_rules! account_command {
    ($name:ident) => {
        impl Command for $name {
            type Aggregate = Account;

            fn aggregate_id(&self) -> AggregateId {
                self.account_id
            }
        }
    };
}

/// Opens a billing account for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAccountCommand {
    pub account_id: AggregateId,
    pub customer_id: CustomerId,
}

impl OpenAccountCommand {
    pub fn new(account_id: AggregateId, customer_id: CustomerId) -> Self {
        Self {
            account_id,
            customer_id,
        }
    }

    /// Opens an account under a freshly generated id.
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self::new(AggregateId::new(), customer_id)
    }
}

account_command!(OpenAccountCommand);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositCommand {
    pub account_id: AggregateId,
    pub amount: Money,
}

impl DepositCommand {
    pub fn new(account_id: AggregateId, amount: Money) -> Self {
        Self { account_id, amount }
    }
}

account_command!(DepositCommand);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawCommand {
    pub account_id: AggregateId,
    pub amount: Money,
}

impl WithdrawCommand {
    pub fn new(account_id: AggregateId, amount: Money) -> Self {
        Self { account_id, amount }
    }
}

account_command!(WithdrawCommand);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSubscriptionCommand {
    pub account_id: AggregateId,
    pub subscription_id: SubscriptionId,
    pub plan: String,
    pub monthly_fee: Money,
}

impl CreateSubscriptionCommand {
    pub fn new(
        account_id: AggregateId,
        subscription_id: impl Into<SubscriptionId>,
        plan: impl Into<String>,
        monthly_fee: Money,
    ) -> Self {
        Self {
            account_id,
            subscription_id: subscription_id.into(),
            plan: plan.into(),
            monthly_fee,
        }
    }
}

account_command!(CreateSubscriptionCommand);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelSubscriptionCommand {
    pub account_id: AggregateId,
    pub subscription_id: SubscriptionId,
    pub reason: Option<String>,
}

impl CancelSubscriptionCommand {
    pub fn new(
        account_id: AggregateId,
        subscription_id: impl Into<SubscriptionId>,
        reason: Option<String>,
    ) -> Self {
        Self {
            account_id,
            subscription_id: subscription_id.into(),
            reason,
        }
    }
}

account_command!(CancelSubscriptionCommand);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateInvoiceCommand {
    pub account_id: AggregateId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub description: String,
}

impl CreateInvoiceCommand {
    pub fn new(
        account_id: AggregateId,
        invoice_id: impl Into<InvoiceId>,
        amount: Money,
        description: impl Into<String>,
    ) -> Self {
        Self {
            account_id,
            invoice_id: invoice_id.into(),
            amount,
            description: description.into(),
        }
    }
}

account_command!(CreateInvoiceCommand);
