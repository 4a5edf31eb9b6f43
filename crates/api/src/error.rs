//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog::CatalogError;
use domain::{AccountError, DomainError};
use event_store::EventStoreError;
use saga::SagaError;

/// Errors returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Domain(DomainError),
    Saga(SagaError),
    Catalog(CatalogError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => (domain_status(&err), err.to_string()),
            ApiError::Saga(err) => (saga_status(&err), err.to_string()),
            ApiError::Catalog(err) => (catalog_status(&err), err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        metrics::counter!("api_errors_total", "status" => status.as_u16().to_string())
            .increment(1);
        if status.is_server_error() {
            tracing::error!(%status, error = %message, "request failed");
        }

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Account(account_err) => match account_err {
            AccountError::NotOpen | AccountError::SubscriptionNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            AccountError::InvalidAmount { .. } | AccountError::BlankPlan => {
                StatusCode::BAD_REQUEST
            }
            AccountError::AlreadyOpen
            | AccountError::InsufficientFunds { .. }
            | AccountError::SubscriptionAlreadyActive { .. }
            | AccountError::SubscriptionAlreadyCancelled { .. }
            | AccountError::DuplicateInvoice { .. }
            | AccountError::AmountOverflow { .. } => StatusCode::CONFLICT,
        },
        DomainError::AggregateNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::EventStore(store_err) => event_store_status(store_err),
        DomainError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn saga_status(err: &SagaError) -> StatusCode {
    match err {
        SagaError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        SagaError::AlreadyStarted(_) => StatusCode::CONFLICT,
        SagaError::EventStore(store_err) => event_store_status(store_err),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::InvalidStay { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn event_store_status(err: &EventStoreError) -> StatusCode {
    match err {
        EventStoreError::ConcurrencyConflict { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{AggregateId, Money};
    use event_store::Version;

    #[test]
    fn account_errors_map_to_client_statuses() {
        let cases = [
            (AccountError::NotOpen, StatusCode::NOT_FOUND),
            (
                AccountError::InvalidAmount {
                    amount: Money::zero(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AccountError::InsufficientFunds {
                    balance: Money::from_cents(100),
                    requested: Money::from_cents(500),
                },
                StatusCode::CONFLICT,
            ),
            (AccountError::AlreadyOpen, StatusCode::CONFLICT),
            (
                AccountError::AmountOverflow {
                    total: Money::from_cents(i64::MAX),
                    amount: Money::from_cents(1),
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(domain_status(&DomainError::Account(err)), expected);
        }
    }

    #[test]
    fn concurrency_conflicts_are_409() {
        let conflict = || EventStoreError::ConcurrencyConflict {
            aggregate_id: AggregateId::new(),
            expected: Version::initial(),
            actual: Version::first(),
        };

        assert_eq!(
            domain_status(&DomainError::EventStore(conflict())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            saga_status(&SagaError::EventStore(conflict())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn saga_errors_map_by_kind() {
        assert_eq!(
            saga_status(&SagaError::AlreadyStarted(AggregateId::new())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            saga_status(&SagaError::FlightService("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
