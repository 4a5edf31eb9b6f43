//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog::InMemoryCatalog;
use event_store::InMemoryEventStore;
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    InMemoryCarRentalService, InMemoryFlightService, InMemoryHotelService, SagaConfig,
    SagaCoordinator,
};
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

async fn setup() -> axum::Router {
    let state = api::create_default_state(
        InMemoryEventStore::new(),
        Arc::new(InMemoryCatalog::seeded()),
        SagaConfig::default(),
    )
    .await
    .unwrap();
    api::create_app(state, get_metrics_handle())
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn open_account(app: &axum::Router) -> String {
    let (status, account) = send(app, "POST", "/accounts", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    account["id"].as_str().unwrap().to_string()
}

fn booking(hotel_id: &str) -> Value {
    json!({
        "customer_id": "9b2f6a8e-1c43-4f7e-8d7a-3f0c2b1e5a90",
        "flight": {
            "origin": "MAD",
            "destination": "LIS",
            "departure_date": "2025-07-10",
            "return_date": "2025-07-14",
            "passengers": 2
        },
        "hotel": {
            "hotel_id": hotel_id,
            "check_in": "2025-07-10",
            "check_out": "2025-07-14",
            "rooms": 1,
            "guests": 2
        },
        "car": {
            "pickup_location": "LIS Airport",
            "pickup_date": "2025-07-10",
            "dropoff_date": "2025-07-14",
            "car_class": "economy"
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = setup().await;

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_catalog_seed_is_served() {
    let app = setup().await;

    let (status, categories) = send(&app, "GET", "/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories.as_array().unwrap().len(), 3);
    assert_eq!(categories[0]["name"], "Luggage");

    let (status, products) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(products.as_array().unwrap().len(), 6);

    let (status, product) = send(&app, "GET", "/products/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(product["name"], "Annual Multi-Trip Cover");
    assert_eq!(product["price"], 18_900);
    assert_eq!(product["categoryId"], 2);

    let (status, in_category) = send(&app, "GET", "/categories/3/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(in_category.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_catalog_lookups_reject_unknown_and_malformed_ids() {
    let app = setup().await;

    let (status, json) = send(&app, "GET", "/products/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Product 99 not found");

    let (status, _) = send(&app, "GET", "/categories/42/products", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/products/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_schema_describes_catalog_types() {
    let app = setup().await;

    let (status, schema) = send(&app, "GET", "/schema", None).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = schema
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Category", "Product"]);
    assert!(
        schema[1]["fields"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["name"] == "price" && f["type"].is_string())
    );
}

#[tokio::test]
async fn test_hotel_search_with_alternatives() {
    let app = setup().await;

    let (status, result) = send(
        &app,
        "POST",
        "/hotels/search",
        Some(json!({
            "properties": {
                "hotelIds": ["HTL-BCN-001"],
                "checkIn": "2025-05-02",
                "checkOut": "2025-05-05"
            },
            "alternatives": { "enabled": true, "maxAlternatives": 2, "sameCityOnly": true }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["requested"][0]["hotelId"], "HTL-BCN-001");
    let alternatives = result["alternatives"].as_array().unwrap();
    assert_eq!(alternatives.len(), 2);
    assert!(alternatives.iter().all(|h| h["city"] == result["requested"][0]["city"]));
}

#[tokio::test]
async fn test_hotel_search_rejects_inverted_stay() {
    let app = setup().await;

    let (status, json) = send(
        &app,
        "POST",
        "/hotels/search",
        Some(json!({
            "properties": {
                "hotelIds": ["HTL-BCN-001"],
                "checkIn": "2025-05-05",
                "checkOut": "2025-05-02"
            }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("check-out"));
}

#[tokio::test]
async fn test_account_lifecycle() {
    let app = setup().await;
    let id = open_account(&app).await;

    let (status, account) = send(
        &app,
        "POST",
        &format!("/accounts/{id}/deposits"),
        Some(json!({ "amount_cents": 10_000 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["balance_cents"], 10_000);

    let (status, account) = send(
        &app,
        "POST",
        &format!("/accounts/{id}/withdrawals"),
        Some(json!({ "amount_cents": 2_500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["balance_cents"], 7_500);

    let (status, account) = send(
        &app,
        "POST",
        &format!("/accounts/{id}/subscriptions"),
        Some(json!({ "subscription_id": "SUB-1", "plan": "Gold", "monthly_fee_cents": 1_500 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["monthly_commitment_cents"], 1_500);

    let (status, account) = send(
        &app,
        "POST",
        &format!("/accounts/{id}/invoices"),
        Some(json!({ "invoice_id": "INV-1", "amount_cents": 1_500, "description": "May" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account["invoiced_total_cents"], 1_500);

    let (status, account) = send(
        &app,
        "DELETE",
        &format!("/accounts/{id}/subscriptions/SUB-1?reason=moving"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["subscriptions"][0]["status"], "Cancelled");
    assert_eq!(account["subscriptions"][0]["cancellation_reason"], "moving");
    assert_eq!(account["monthly_commitment_cents"], 0);

    let (status, account) = send(&app, "GET", &format!("/accounts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["id"], id);
    assert_eq!(account["balance_cents"], 7_500);
    assert_eq!(account["invoices"].as_array().unwrap().len(), 1);
    assert_eq!(account["version"], 6);
}

#[tokio::test]
async fn test_account_rule_violations() {
    let app = setup().await;
    let id = open_account(&app).await;

    let (status, json) = send(
        &app,
        "POST",
        &format!("/accounts/{id}/withdrawals"),
        Some(json!({ "amount_cents": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("Insufficient funds"));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/accounts/{id}/deposits"),
        Some(json!({ "amount_cents": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/accounts/{id}/subscriptions/NOPE"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deposit_past_the_balance_limit_is_rejected() {
    let app = setup().await;
    let id = open_account(&app).await;
    let uri = format!("/accounts/{id}/deposits");

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "amount_cents": i64::MAX }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, json) = send(&app, "POST", &uri, Some(json!({ "amount_cents": 1 }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["error"].as_str().unwrap().contains("overflow"));

    let (status, account) = send(&app, "GET", &format!("/accounts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(account["balance_cents"], i64::MAX);
}

#[tokio::test]
async fn test_unknown_and_malformed_account_ids() {
    let app = setup().await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(&app, "GET", &format!("/accounts/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/accounts/{missing}/deposits"),
        Some(json!({ "amount_cents": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = send(&app, "GET", "/accounts/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid ID format"));
}

#[tokio::test]
async fn test_booking_completes() {
    let app = setup().await;

    let (status, booking) = send(&app, "POST", "/bookings", Some(booking("HTL-LIS-001"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["state"], "Completed");
    let steps: Vec<&str> = booking["completed_steps"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["step"].as_str().unwrap())
        .collect();
    assert_eq!(steps, ["book_flight", "reserve_hotel", "rent_car"]);

    let id = booking["booking_id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/bookings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["state"], "Completed");
    assert_eq!(
        fetched["customer_id"],
        "9b2f6a8e-1c43-4f7e-8d7a-3f0c2b1e5a90"
    );

    let (status, events) = send(&app, "GET", &format!("/bookings/{id}/events"), None).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 8);
    assert_eq!(events[0]["event_type"], "SagaStarted");
    assert_eq!(events[7]["event_type"], "SagaCompleted");
}

#[tokio::test]
async fn test_booking_for_unknown_hotel_is_compensated() {
    let app = setup().await;

    let (status, booking) = send(&app, "POST", "/bookings", Some(booking("HTL-NOWHERE"))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(booking["state"], "Failed");
    assert_eq!(booking["failed_step"], "reserve_hotel");
    assert_eq!(booking["compensations"][0]["step"], "book_flight");
    assert!(booking["compensations"][0]["error"].is_null());
}

#[tokio::test]
async fn test_booking_validation_and_duplicates() {
    let app = setup().await;

    let mut invalid = booking("HTL-LIS-001");
    invalid["flight"]["destination"] = json!("MAD");
    let (status, json) = send(&app, "POST", "/bookings", Some(invalid)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let mut request = booking("HTL-LIS-001");
    request["booking_id"] = json!("0d9c7c3e-5b8a-4c1f-9e2d-7a6b5c4d3e21");
    let (status, _) = send(&app, "POST", "/bookings", Some(request.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/bookings", Some(request)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_booking_survives_a_dropped_request() {
    let store = InMemoryEventStore::new();
    let flights = InMemoryFlightService::new();
    let hotels = InMemoryHotelService::new();
    let cars = InMemoryCarRentalService::new();
    hotels.set_delay(Duration::from_millis(200)).await;

    let state = Arc::new(api::AppState {
        accounts: domain::AccountService::new(store.clone()),
        bookings: SagaCoordinator::new(store, flights.clone(), hotels.clone(), cars.clone()),
        catalog: Arc::new(InMemoryCatalog::seeded()),
    });
    let app = api::create_app(state, get_metrics_handle());

    let id = "5f1e2d3c-4b5a-4968-8776-a5b4c3d2e1f0";
    let mut request = booking("HTL-LIS-001");
    request["booking_id"] = json!(id);

    // The client gives up while the hotel call is still in progress.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        send(&app, "POST", "/bookings", Some(request)),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(400)).await;

    let (status, booking) = send(&app, "GET", &format!("/bookings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(booking["state"], "Completed");
    assert_eq!(flights.booking_count().await, 1);
    assert_eq!(hotels.reservation_count().await, 1);
    assert_eq!(cars.rental_count().await, 1);
}

#[tokio::test]
async fn test_get_nonexistent_booking() {
    let app = setup().await;
    let missing = uuid::Uuid::new_v4();

    let (status, _) = send(&app, "GET", &format!("/bookings/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/bookings/{missing}/events"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup().await;
    send(&app, "POST", "/bookings", Some(booking("HTL-LIS-001"))).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("saga_executions_total"));
}
