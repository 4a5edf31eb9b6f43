//! Billing account endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CustomerId, Money};
use domain::{
    Account, CancelSubscriptionCommand, CreateInvoiceCommand, CreateSubscriptionCommand,
    DepositCommand, OpenAccountCommand, WithdrawCommand,
};
use event_store::EventStore;
use serde::{Deserialize, Serialize};

use super::parse_aggregate_id;
use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct OpenAccountRequest {
    pub customer_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AmountRequest {
    pub amount_cents: i64,
}

#[derive(Deserialize)]
pub struct CreateSubscriptionRequest {
    pub subscription_id: String,
    pub plan: String,
    pub monthly_fee_cents: i64,
}

#[derive(Debug, Deserialize)]
pub struct CancelSubscriptionParams {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateInvoiceRequest {
    pub invoice_id: String,
    pub amount_cents: i64,
    pub description: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub customer_id: String,
    pub balance_cents: i64,
    pub monthly_commitment_cents: i64,
    pub invoiced_total_cents: i64,
    pub subscriptions: Vec<SubscriptionResponse>,
    pub invoices: Vec<InvoiceResponse>,
    pub version: i64,
}

#[derive(Serialize)]
pub struct SubscriptionResponse {
    pub subscription_id: String,
    pub plan: String,
    pub monthly_fee_cents: i64,
    pub status: String,
    pub cancellation_reason: Option<String>,
}

#[derive(Serialize)]
pub struct InvoiceResponse {
    pub invoice_id: String,
    pub amount_cents: i64,
    pub description: String,
    pub issued_at: String,
}

impl AccountResponse {
    fn from_account(id: impl ToString, account: &Account) -> Self {
        use domain::Aggregate;

        Self {
            id: id.to_string(),
            customer_id: account
                .customer_id()
                .map(|c| c.to_string())
                .unwrap_or_default(),
            balance_cents: account.balance().cents(),
            monthly_commitment_cents: account.monthly_commitment().cents(),
            invoiced_total_cents: account.invoiced_total().cents(),
            subscriptions: account
                .subscriptions()
                .map(|s| SubscriptionResponse {
                    subscription_id: s.subscription_id.to_string(),
                    plan: s.plan.clone(),
                    monthly_fee_cents: s.monthly_fee.cents(),
                    status: format!("{:?}", s.status),
                    cancellation_reason: s.cancellation_reason.clone(),
                })
                .collect(),
            invoices: account
                .invoices()
                .iter()
                .map(|i| InvoiceResponse {
                    invoice_id: i.invoice_id.to_string(),
                    amount_cents: i.amount.cents(),
                    description: i.description.clone(),
                    issued_at: i.issued_at.to_rfc3339(),
                })
                .collect(),
            version: account.version().as_i64(),
        }
    }
}

// -- Handlers --

/// POST /accounts: open an account, for a new customer unless one is given.
#[tracing::instrument(skip(state, req))]
pub async fn open<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<OpenAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let customer_id = match req.customer_id.as_deref() {
        Some(id_str) => {
            let uuid = uuid::Uuid::parse_str(id_str)
                .map_err(|e| ApiError::BadRequest(format!("Invalid customer_id: {e}")))?;
            CustomerId::from_uuid(uuid)
        }
        None => CustomerId::new(),
    };

    let cmd = OpenAccountCommand::for_customer(customer_id);
    let account_id = cmd.account_id;
    let result = state.accounts.open_account(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::from_account(account_id, &result.aggregate)),
    ))
}

/// GET /accounts/{id}
#[tracing::instrument(skip(state))]
pub async fn get<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_aggregate_id(&id)?;
    let account = state
        .accounts
        .get_account(account_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Account {id} not found")))?;

    Ok(Json(AccountResponse::from_account(account_id, &account)))
}

/// POST /accounts/{id}/deposits
#[tracing::instrument(skip(state, req))]
pub async fn deposit<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_aggregate_id(&id)?;
    let result = state
        .accounts
        .deposit(DepositCommand::new(
            account_id,
            Money::from_cents(req.amount_cents),
        ))
        .await?;

    Ok(Json(AccountResponse::from_account(account_id, &result.aggregate)))
}

/// POST /accounts/{id}/withdrawals
#[tracing::instrument(skip(state, req))]
pub async fn withdraw<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_aggregate_id(&id)?;
    let result = state
        .accounts
        .withdraw(WithdrawCommand::new(
            account_id,
            Money::from_cents(req.amount_cents),
        ))
        .await?;

    Ok(Json(AccountResponse::from_account(account_id, &result.aggregate)))
}

/// POST /accounts/{id}/subscriptions
#[tracing::instrument(skip(state, req))]
pub async fn create_subscription<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<CreateSubscriptionRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account_id = parse_aggregate_id(&id)?;
    let result = state
        .accounts
        .create_subscription(CreateSubscriptionCommand::new(
            account_id,
            req.subscription_id.as_str(),
            req.plan,
            Money::from_cents(req.monthly_fee_cents),
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::from_account(account_id, &result.aggregate)),
    ))
}

/// DELETE /accounts/{id}/subscriptions/{subscription_id}?reason=...
#[tracing::instrument(skip(state))]
pub async fn cancel_subscription<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, subscription_id)): Path<(String, String)>,
    Query(params): Query<CancelSubscriptionParams>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account_id = parse_aggregate_id(&id)?;
    let result = state
        .accounts
        .cancel_subscription(CancelSubscriptionCommand::new(
            account_id,
            subscription_id.as_str(),
            params.reason,
        ))
        .await?;

    Ok(Json(AccountResponse::from_account(account_id, &result.aggregate)))
}

/// POST /accounts/{id}/invoices
#[tracing::instrument(skip(state, req))]
pub async fn create_invoice<S: EventStore + Clone + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    let account_id = parse_aggregate_id(&id)?;
    let result = state
        .accounts
        .create_invoice(CreateInvoiceCommand::new(
            account_id,
            req.invoice_id.as_str(),
            Money::from_cents(req.amount_cents),
            req.description,
        ))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AccountResponse::from_account(account_id, &result.aggregate)),
    ))
}
