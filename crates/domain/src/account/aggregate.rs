//! Account aggregate implementation.

use std::collections::BTreeMap;

use common::{AggregateId, CustomerId, Money};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{
    AccountError, AccountEvent, Invoice, InvoiceId, Subscription, SubscriptionId,
    SubscriptionStatus,
};

/// A customer's billing account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    id: Option<AggregateId>,
    #[serde(default)]
    version: Version,
    customer_id: Option<CustomerId>,
    balance: Money,
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    invoices: Vec<Invoice>,
}

impl Aggregate for Account {
    type Event = AccountEvent;
    type Error = AccountError;

    fn aggregate_type() -> &'static str {
        "Account"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            AccountEvent::AccountOpened(data) => {
                self.id = Some(data.account_id);
                self.customer_id = Some(data.customer_id);
            }
            AccountEvent::FundsDeposited(data) | AccountEvent::FundsWithdrawn(data) => {
                self.balance = data.balance_after;
            }
            AccountEvent::SubscriptionCreated(data) => {
                self.subscriptions.insert(
                    data.subscription_id.clone(),
                    Subscription {
                        subscription_id: data.subscription_id,
                        plan: data.plan,
                        monthly_fee: data.monthly_fee,
                        status: SubscriptionStatus::Active,
                        created_at: data.created_at,
                        cancelled_at: None,
                        cancellation_reason: None,
                    },
                );
            }
            AccountEvent::SubscriptionCancelled(data) => {
                if let Some(sub) = self.subscriptions.get_mut(&data.subscription_id) {
                    sub.status = SubscriptionStatus::Cancelled;
                    sub.cancelled_at = Some(data.cancelled_at);
                    sub.cancellation_reason = data.reason;
                }
            }
            AccountEvent::InvoiceCreated(data) => {
                self.invoices.push(Invoice {
                    invoice_id: data.invoice_id,
                    amount: data.amount,
                    description: data.description,
                    issued_at: data.issued_at,
                });
            }
        }
    }
}

// Query methods
impl Account {
    pub fn customer_id(&self) -> Option<CustomerId> {
        self.customer_id
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn is_open(&self) -> bool {
        self.id.is_some()
    }

    /// All subscriptions ever created, ordered by id.
    pub fn subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.values()
    }

    pub fn active_subscriptions(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.values().filter(|s| s.is_active())
    }

    pub fn subscription(&self, subscription_id: &SubscriptionId) -> Option<&Subscription> {
        self.subscriptions.get(subscription_id)
    }

    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    pub fn invoiced_total(&self) -> Money {
        self.invoices.iter().map(|i| i.amount).sum()
    }

    /// Sum of monthly fees across active subscriptions.
    pub fn monthly_commitment(&self) -> Money {
        self.active_subscriptions().map(|s| s.monthly_fee).sum()
    }
}

// Command methods (return events)
impl Account {
    pub fn open(
        &self,
        account_id: AggregateId,
        customer_id: CustomerId,
    ) -> Result<Vec<AccountEvent>, AccountError> {
        if self.is_open() {
            return Err(AccountError::AlreadyOpen);
        }
        Ok(vec![AccountEvent::account_opened(account_id, customer_id)])
    }

    pub fn deposit(&self, amount: Money) -> Result<Vec<AccountEvent>, AccountError> {
        self.ensure_open()?;
        ensure_positive(amount)?;
        let balance_after = checked_total(self.balance, amount)?;

        Ok(vec![AccountEvent::funds_deposited(amount, balance_after)])
    }

    pub fn withdraw(&self, amount: Money) -> Result<Vec<AccountEvent>, AccountError> {
        self.ensure_open()?;
        ensure_positive(amount)?;

        let balance_after =
            self.balance
                .checked_sub(amount)
                .ok_or(AccountError::InsufficientFunds {
                    balance: self.balance,
                    requested: amount,
                })?;

        Ok(vec![AccountEvent::funds_withdrawn(amount, balance_after)])
    }

    pub fn create_subscription(
        &self,
        subscription_id: SubscriptionId,
        plan: String,
        monthly_fee: Money,
    ) -> Result<Vec<AccountEvent>, AccountError> {
        self.ensure_open()?;
        if plan.trim().is_empty() {
            return Err(AccountError::BlankPlan);
        }
        ensure_positive(monthly_fee)?;
        if self
            .subscriptions
            .get(&subscription_id)
            .is_some_and(Subscription::is_active)
        {
            return Err(AccountError::SubscriptionAlreadyActive { subscription_id });
        }
        checked_total(self.monthly_commitment(), monthly_fee)?;

        Ok(vec![AccountEvent::subscription_created(
            subscription_id,
            plan.trim(),
            monthly_fee,
        )])
    }

    pub fn cancel_subscription(
        &self,
        subscription_id: SubscriptionId,
        reason: Option<String>,
    ) -> Result<Vec<AccountEvent>, AccountError> {
        self.ensure_open()?;
        match self.subscriptions.get(&subscription_id) {
            None => Err(AccountError::SubscriptionNotFound { subscription_id }),
            Some(sub) if !sub.is_active() => {
                Err(AccountError::SubscriptionAlreadyCancelled { subscription_id })
            }
            Some(_) => Ok(vec![AccountEvent::subscription_cancelled(
                subscription_id,
                reason,
            )]),
        }
    }

    pub fn create_invoice(
        &self,
        invoice_id: InvoiceId,
        amount: Money,
        description: String,
    ) -> Result<Vec<AccountEvent>, AccountError> {
        self.ensure_open()?;
        ensure_positive(amount)?;
        if self.invoices.iter().any(|i| i.invoice_id == invoice_id) {
            return Err(AccountError::DuplicateInvoice { invoice_id });
        }
        checked_total(self.invoiced_total(), amount)?;

        Ok(vec![AccountEvent::invoice_created(
            invoice_id,
            amount,
            description,
        )])
    }

    fn ensure_open(&self) -> Result<(), AccountError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(AccountError::NotOpen)
        }
    }
}

fn ensure_positive(amount: Money) -> Result<(), AccountError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(AccountError::InvalidAmount { amount })
    }
}

fn checked_total(total: Money, amount: Money) -> Result<Money, AccountError> {
    total
        .checked_add(amount)
        .ok_or(AccountError::AmountOverflow { total, amount })
}
