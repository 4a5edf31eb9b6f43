//! Account service: the billing API over the command handler.

use common::AggregateId;
use event_store::EventStore;

use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{
    Account, CancelSubscriptionCommand, CreateInvoiceCommand, CreateSubscriptionCommand,
    DepositCommand, OpenAccountCommand, WithdrawCommand,
};

fn record_command(command: &'static str) {
    metrics::counter!("billing_commands_total", "command" => command).increment(1);
}

/// Executes billing commands against event-sourced accounts.
pub struct AccountService<S: EventStore> {
    handler: CommandHandler<S, Account>,
}

impl<S: EventStore> AccountService<S> {
    pub fn new(store: S) -> Self {
        Self {
            handler: CommandHandler::new(store),
        }
    }

    pub fn handler(&self) -> &CommandHandler<S, Account> {
        &self.handler
    }

    #[tracing::instrument(skip(self))]
    pub async fn open_account(
        &self,
        cmd: OpenAccountCommand,
    ) -> Result<CommandResult<Account>, DomainError> {
        record_command("open_account");
        let OpenAccountCommand {
            account_id,
            customer_id,
        } = cmd;

        self.handler
            .execute(account_id, |account| account.open(account_id, customer_id))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn deposit(&self, cmd: DepositCommand) -> Result<CommandResult<Account>, DomainError> {
        record_command("deposit");
        self.handler
            .execute(cmd.account_id, |account| account.deposit(cmd.amount))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn withdraw(
        &self,
        cmd: WithdrawCommand,
    ) -> Result<CommandResult<Account>, DomainError> {
        record_command("withdraw");
        self.handler
            .execute(cmd.account_id, |account| account.withdraw(cmd.amount))
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_subscription(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CommandResult<Account>, DomainError> {
        record_command("create_subscription");
        let CreateSubscriptionCommand {
            account_id,
            subscription_id,
            plan,
            monthly_fee,
        } = cmd;

        self.handler
            .execute(account_id, |account| {
                account.create_subscription(subscription_id, plan, monthly_fee)
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_subscription(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CommandResult<Account>, DomainError> {
        record_command("cancel_subscription");
        let CancelSubscriptionCommand {
            account_id,
            subscription_id,
            reason,
        } = cmd;

        self.handler
            .execute(account_id, |account| {
                account.cancel_subscription(subscription_id, reason)
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_invoice(
        &self,
        cmd: CreateInvoiceCommand,
    ) -> Result<CommandResult<Account>, DomainError> {
        record_command("create_invoice");
        let CreateInvoiceCommand {
            account_id,
            invoice_id,
            amount,
            description,
        } = cmd;

        self.handler
            .execute(account_id, |account| {
                account.create_invoice(invoice_id, amount, description)
            })
            .await
    }

    /// Loads an account by id. Returns `None` if it was never opened.
    #[tracing::instrument(skip(self))]
    pub async fn get_account(
        &self,
        account_id: AggregateId,
    ) -> Result<Option<Account>, DomainError> {
        self.handler.load_existing(account_id).await
    }
}
