//! REST API driven through the router without a listener.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Duration, Utc};
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use park_eazy::domain::{CurrencySettings, CurrentUser, UserRole};
use park_eazy::infrastructure::crypto::jwt::{create_token, JwtConfig};
use park_eazy::interfaces::http::middleware::AuthState;
use park_eazy::shared::StorePolicy;
use park_eazy::{
    create_api_router, create_event_bus, AppServices, AppState, InMemoryRepositoryProvider,
    SimulatedGateway,
};

struct TestApi {
    router: Router,
    jwt: JwtConfig,
}

impl TestApi {
    fn new() -> Self {
        let services = AppServices::new(
            Arc::new(InMemoryRepositoryProvider::new()),
            Arc::new(SimulatedGateway::new()),
            create_event_bus(),
            StorePolicy::default(),
            CurrencySettings::default(),
        );
        let jwt = JwtConfig::default();
        let state = AppState::new(
            services,
            AuthState {
                jwt_config: jwt.clone(),
            },
            None,
        );
        let metrics = PrometheusBuilder::new().build_recorder().handle();
        Self {
            router: create_api_router(state, metrics),
            jwt,
        }
    }

    fn token(&self, user: &CurrentUser) -> String {
        create_token(user, &self.jwt).unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        user: Option<&CurrentUser>,
        body: Option<Value>,
        idempotency_key: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(user)));
        }
        if let Some(key) = idempotency_key {
            builder = builder.header("Idempotency-Key", key);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

fn session(role: UserRole) -> CurrentUser {
    let id = Uuid::new_v4();
    CurrentUser {
        id,
        email: format!("{}@example.com", id.simple()),
        name: "Tanvir Hasan".into(),
        role,
    }
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

fn slot_body(name: &str) -> Value {
    json!({
        "name": name,
        "location": { "lat": 23.7806, "lon": 90.4193 },
        "address": "Banani Road 11, Dhaka",
        "vehicle_type": "Car",
        "price_per_hour": "60",
        "features": ["Covered", "EV Charging"],
    })
}

async fn create_slot(api: &TestApi, name: &str) -> Uuid {
    let admin = session(UserRole::Admin);
    let (status, body) = api
        .call(Method::POST, "/api/v1/slots", Some(&admin), Some(slot_body(name)), None)
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn health_reports_memory_store() {
    let api = TestApi::new();
    let (status, body) = api.call(Method::GET, "/health", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"]["status"], "memory");
}

#[tokio::test]
async fn slot_management_needs_staff_session() {
    let api = TestApi::new();

    let (status, _) = api
        .call(Method::POST, "/api/v1/slots", None, Some(slot_body("P1")), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let driver = session(UserRole::User);
    let (status, _) = api
        .call(Method::POST, "/api/v1/slots", Some(&driver), Some(slot_body("P1")), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let slot_id = create_slot(&api, "P1").await;
    let (status, body) = api.call(Method::GET, "/api/v1/slots", None, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], slot_id.to_string());
    assert_eq!(body["data"][0]["status"], "Available");

    let (status, body) = api
        .call(
            Method::GET,
            "/api/v1/slots?vehicle_type=Truck",
            None,
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn invalid_slot_body_is_unprocessable() {
    let api = TestApi::new();
    let admin = session(UserRole::Admin);
    let mut body = slot_body("");
    body["address"] = json!("");

    let (status, body) = api
        .call(Method::POST, "/api/v1/slots", Some(&admin), Some(body), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn bad_token_is_rejected_even_on_public_routes() {
    let api = TestApi::new();
    let request = Request::builder()
        .uri("/api/v1/slots")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = api.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn quote_then_checkout_then_replay() {
    let api = TestApi::new();
    let slot_id = create_slot(&api, "B7").await;
    let driver = session(UserRole::User);
    let start = Utc::now() + Duration::minutes(5);
    let end = start + Duration::minutes(150);

    let (status, quote) = api
        .call(
            Method::POST,
            "/api/v1/pricing/quote",
            None,
            Some(json!({ "slot_id": slot_id, "start_time": start, "end_time": end })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", quote);
    assert_eq!(decimal(&quote["data"]["total"]), Decimal::from(150));
    assert_eq!(quote["data"]["currency"], "BDT");
    assert_eq!(quote["data"]["display_total"], "৳150.00");

    let checkout = json!({
        "slot_id": slot_id,
        "start_time": start,
        "end_time": end,
        "payment": {
            "source": "new",
            "details": {
                "type": "Card",
                "card_number": "4111 1111 1111 1111",
                "expiry_date": format!("11/{:02}", (Utc::now().year() + 4) % 100),
                "cvc": "987",
                "cardholder_name": "Tanvir Hasan"
            },
            "save_for_future": true
        }
    });

    let (status, first) = api
        .call(
            Method::POST,
            "/api/v1/checkout/bookings",
            Some(&driver),
            Some(checkout.clone()),
            Some("booking-42"),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", first);
    assert_eq!(first["data"]["replayed"], false);
    assert_eq!(decimal(&first["data"]["amount_charged"]), Decimal::from(150));
    assert_eq!(first["data"]["payment_label"], "Card •••• 1111");
    assert!(first["data"]["saved_method_id"].is_string());

    let (status, second) = api
        .call(
            Method::POST,
            "/api/v1/checkout/bookings",
            Some(&driver),
            Some(checkout),
            Some("booking-42"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["replayed"], true);
    assert_eq!(second["data"]["reservation"]["id"], first["data"]["reservation"]["id"]);

    let (status, active) = api
        .call(Method::GET, "/api/v1/reservations/active", Some(&driver), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["data"]["id"], first["data"]["reservation"]["id"]);

    let (status, methods) = api
        .call(Method::GET, "/api/v1/payment-methods", Some(&driver), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(methods["data"].as_array().unwrap().len(), 1);

    let (_, slot) = api
        .call(Method::GET, &format!("/api/v1/slots/{}", slot_id), None, None, None)
        .await;
    assert_eq!(slot["data"]["status"], "Reserved");
}

#[tokio::test]
async fn ending_releases_the_slot() {
    let api = TestApi::new();
    let slot_id = create_slot(&api, "C3").await;
    let driver = session(UserRole::User);
    let start = Utc::now();

    let (status, booked) = api
        .call(
            Method::POST,
            "/api/v1/checkout/bookings",
            Some(&driver),
            Some(json!({
                "slot_id": slot_id,
                "start_time": start,
                "end_time": start + Duration::hours(1),
                "payment": {
                    "source": "new",
                    "details": { "type": "MobileWallet", "provider": "Nagad", "account_number": "01612345678" }
                }
            })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", booked);
    let reservation_id = booked["data"]["reservation"]["id"].as_str().unwrap().to_string();

    let stranger = session(UserRole::User);
    let (status, _) = api
        .call(
            Method::POST,
            &format!("/api/v1/reservations/{}/end", reservation_id),
            Some(&stranger),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, ended) = api
        .call(
            Method::POST,
            &format!("/api/v1/reservations/{}/end", reservation_id),
            Some(&driver),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", ended);
    assert_eq!(ended["data"]["status"], "Completed");

    let (status, _) = api
        .call(
            Method::POST,
            &format!("/api/v1/reservations/{}/end", reservation_id),
            Some(&driver),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, slot) = api
        .call(Method::GET, &format!("/api/v1/slots/{}", slot_id), None, None, None)
        .await;
    assert_eq!(slot["data"]["status"], "Available");
}

#[tokio::test]
async fn super_admin_surfaces() {
    let api = TestApi::new();
    let root = session(UserRole::SuperAdmin);
    let admin = session(UserRole::Admin);

    let (status, _) = api
        .call(Method::GET, "/api/v1/logs", Some(&admin), None, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    create_slot(&api, "D4").await;
    let (status, logs) = api
        .call(
            Method::GET,
            "/api/v1/logs?action_type=SLOT_CREATED",
            Some(&root),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", logs);
    assert_eq!(logs["data"]["total"], 1);

    let (status, currency) = api
        .call(
            Method::PUT,
            "/api/v1/settings/currency",
            Some(&root),
            Some(json!({ "code": "USD", "symbol": "$" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", currency);
    let (_, currency) = api
        .call(Method::GET, "/api/v1/settings/currency", None, None, None)
        .await;
    assert_eq!(currency["data"]["code"], "USD");

    let (status, _) = api
        .call(
            Method::PUT,
            "/api/v1/settings/currency",
            Some(&admin),
            Some(json!({ "code": "EUR", "symbol": "€" })),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let api = TestApi::new();
    let (status, doc) = api
        .call(Method::GET, "/api-doc/openapi.json", None, None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(doc["info"]["title"], "Park-Eazy API");
    assert!(doc["paths"]["/api/v1/checkout/bookings"].is_object());
}
