//! API Router with Swagger UI

use axum::{
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use super::common::{EmptyData, PaginatedResponse};
use super::middleware::{auth_middleware, optional_auth_middleware, AuthState};
use super::modules::{
    checkout, health, logs, metrics, payment_methods, pricing, reservations, session, settings,
    slots, users,
};
use super::state::AppState;
use crate::domain::audit::ActionType;
use crate::domain::payment_method::{
    CardInput, PaymentInput, PaymentInstrument, WalletInput, WalletProvider,
};
use crate::domain::reservation::ReservationStatus;
use crate::domain::settings::CurrencySettings;
use crate::domain::slot::{GeoPoint, SlotStatus, VehicleType};
use crate::domain::user::UserRole;
use crate::interfaces::ws::{create_notification_state, ws_notifications_handler};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Session token from the auth provider"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Session
        session::current_session,
        session::sign_in,
        session::sign_out,
        // Slots
        slots::list_slots,
        slots::get_slot,
        slots::create_slot,
        slots::update_slot,
        slots::delete_slot,
        slots::set_slot_status,
        // Pricing
        pricing::quote_booking,
        pricing::quote_extension,
        // Reservations
        reservations::list_my_reservations,
        reservations::get_active_reservation,
        reservations::list_all_reservations,
        reservations::get_reservation,
        reservations::end_reservation,
        // Checkout
        checkout::checkout_booking,
        checkout::checkout_extension,
        // Payment methods
        payment_methods::list_payment_methods,
        payment_methods::add_payment_method,
        payment_methods::remove_payment_method,
        // Logs
        logs::list_logs,
        // Users
        users::list_users,
        users::set_user_role,
        // Settings
        settings::get_currency,
        settings::set_currency,
    ),
    components(
        schemas(
            EmptyData,
            PaginatedResponse<logs::SystemLogDto>,
            health::HealthResponse,
            health::ComponentHealth,
            session::SessionDto,
            slots::SlotDto,
            slots::SlotRequest,
            slots::SetStatusRequest,
            SlotStatus,
            VehicleType,
            GeoPoint,
            pricing::BookingQuoteRequest,
            pricing::ExtensionQuoteRequest,
            pricing::QuoteResponse,
            reservations::ReservationDto,
            ReservationStatus,
            checkout::BookingCheckoutRequest,
            checkout::ExtensionCheckoutRequest,
            checkout::PaymentSelectionRequest,
            checkout::CheckoutReceiptDto,
            payment_methods::PaymentMethodDto,
            PaymentInput,
            CardInput,
            WalletInput,
            WalletProvider,
            PaymentInstrument,
            logs::SystemLogDto,
            ActionType,
            users::UserProfileDto,
            users::SetRoleRequest,
            UserRole,
            settings::SetCurrencyRequest,
            CurrencySettings,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and storage health"),
        (name = "Session", description = "The signed-in caller"),
        (name = "Slots", description = "Parking slot registry"),
        (name = "Pricing", description = "Price quotes"),
        (name = "Reservations", description = "Reservation lifecycle"),
        (name = "Checkout", description = "Paid bookings and extensions, idempotent per key"),
        (name = "Payment Methods", description = "Saved cards and mobile wallets"),
        (name = "Logs", description = "Audit log (super-admin)"),
        (name = "Users", description = "User directory (super-admin)"),
        (name = "Settings", description = "Display currency"),
    ),
    info(
        title = "Park-Eazy API",
        version = "1.0.0",
        description = "REST API for parking slot search, reservation and checkout",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Anonymous callers pass; a bad token is still rejected.
fn public(route: MethodRouter<AppState>, auth: &AuthState) -> MethodRouter<AppState> {
    route.layer(middleware::from_fn_with_state(
        auth.clone(),
        optional_auth_middleware,
    ))
}

fn protected(route: MethodRouter<AppState>, auth: &AuthState) -> MethodRouter<AppState> {
    route.layer(middleware::from_fn_with_state(auth.clone(), auth_middleware))
}

/// Create the API router with all routes
pub fn create_api_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let auth = state.auth.clone();

    let api = Router::new()
        .route("/health", get(health::health_check))
        // Session
        .route(
            "/api/v1/session",
            protected(
                get(session::current_session)
                    .post(session::sign_in)
                    .delete(session::sign_out),
                &auth,
            ),
        )
        // Slots: browsing is public, management needs a staff session
        .route(
            "/api/v1/slots",
            public(get(slots::list_slots), &auth)
                .merge(protected(post(slots::create_slot), &auth)),
        )
        .route(
            "/api/v1/slots/{slot_id}",
            public(get(slots::get_slot), &auth).merge(protected(
                put(slots::update_slot).delete(slots::delete_slot),
                &auth,
            )),
        )
        .route(
            "/api/v1/slots/{slot_id}/status",
            protected(put(slots::set_slot_status), &auth),
        )
        // Pricing
        .route(
            "/api/v1/pricing/quote",
            public(post(pricing::quote_booking), &auth),
        )
        .route(
            "/api/v1/pricing/extension-quote",
            protected(post(pricing::quote_extension), &auth),
        )
        // Reservations
        .route(
            "/api/v1/reservations",
            protected(get(reservations::list_my_reservations), &auth),
        )
        .route(
            "/api/v1/reservations/active",
            protected(get(reservations::get_active_reservation), &auth),
        )
        .route(
            "/api/v1/reservations/all",
            protected(get(reservations::list_all_reservations), &auth),
        )
        .route(
            "/api/v1/reservations/{reservation_id}",
            protected(get(reservations::get_reservation), &auth),
        )
        .route(
            "/api/v1/reservations/{reservation_id}/end",
            protected(post(reservations::end_reservation), &auth),
        )
        // Checkout
        .route(
            "/api/v1/checkout/bookings",
            protected(post(checkout::checkout_booking), &auth),
        )
        .route(
            "/api/v1/checkout/extensions",
            protected(post(checkout::checkout_extension), &auth),
        )
        // Payment methods
        .route(
            "/api/v1/payment-methods",
            protected(
                get(payment_methods::list_payment_methods)
                    .post(payment_methods::add_payment_method),
                &auth,
            ),
        )
        .route(
            "/api/v1/payment-methods/{method_id}",
            protected(delete(payment_methods::remove_payment_method), &auth),
        )
        // Logs and users
        .route("/api/v1/logs", protected(get(logs::list_logs), &auth))
        .route("/api/v1/users", protected(get(users::list_users), &auth))
        .route(
            "/api/v1/users/{user_id}/role",
            protected(put(users::set_user_role), &auth),
        )
        // Settings
        .route(
            "/api/v1/settings/currency",
            public(get(settings::get_currency), &auth)
                .merge(protected(put(settings::set_currency), &auth)),
        );

    // Notifications WebSocket authenticates from the query string
    let notification_state =
        create_notification_state(state.services.events.clone(), auth.jwt_config.clone());
    let notification_routes = Router::new()
        .route("/api/v1/notifications/ws", get(ws_notifications_handler))
        .with_state(notification_state);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics::prometheus_metrics))
        .with_state(metrics::MetricsState {
            handle: metrics_handle,
        });

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(swagger_routes)
        .merge(api.with_state(state))
        .merge(notification_routes)
        .merge(metrics_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
