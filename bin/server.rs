// Trip Savings Tracker - Web Server
// JSON API over the store + aggregation engine: admin dashboard, public
// read-only view, token-gated writes, CSV download.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::CorsLayer;

use trip_savings::{
    export_file_name, to_export_rows, write_csv, AuthProvider, ContributionForm, DashboardView,
    SqliteStore, StaticAuth, Traveler, TravelerForm, Trip, TripForm, TripStore, ValidationError,
};

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: Arc<Mutex<SqliteStore>>,
    auth: Arc<Mutex<StaticAuth>>,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

fn internal_error<T>(context: &str, err: anyhow::Error) -> axum::response::Response
where
    T: Serialize,
{
    eprintln!("Error {}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<T>::fail("Internal error")),
    )
        .into_response()
}

fn validation_failure<T: Serialize>(errors: Vec<ValidationError>) -> axum::response::Response {
    let message = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<T>::fail(message)),
    )
        .into_response()
}

/// Reject requests whose x-admin-token header does not match the live session.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), axum::response::Response> {
    let token = headers
        .get("x-admin-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let auth = state.auth.lock().unwrap();
    if auth.verify_token(token) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::fail("Admin session required")),
        )
            .into_response())
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Everything either view renders, in one response.
#[derive(Serialize)]
struct DashboardPayload {
    trip: Trip,
    travelers: Vec<Traveler>,
    dashboard: DashboardView,
}

fn load_dashboard(store: &SqliteStore, trip: Trip) -> anyhow::Result<DashboardPayload> {
    let travelers = store.travelers_for_trip(&trip.id)?;
    let contributions = store.contributions_for_trip(&trip.id)?;
    let dashboard = DashboardView::build(&trip, &travelers, &contributions);
    Ok(DashboardPayload {
        trip,
        travelers,
        dashboard,
    })
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
}

/// Raw trip form fields as submitted; validation happens in the schema layer.
#[derive(Deserialize, Default)]
struct TripFormRequest {
    name: String,
    destination: String,
    currency: String,
    #[serde(default)]
    target_amount: String,
    #[serde(default)]
    trip_date: String,
}

impl From<TripFormRequest> for TripForm {
    fn from(req: TripFormRequest) -> Self {
        TripForm {
            name: req.name,
            destination: req.destination,
            currency: req.currency,
            target_amount: req.target_amount,
            trip_date: req.trip_date,
        }
    }
}

#[derive(Deserialize)]
struct TravelerFormRequest {
    name: String,
}

#[derive(Deserialize)]
struct ContributionFormRequest {
    traveler_id: String,
    amount: String,
    date: String,
    #[serde(default)]
    note: String,
}

impl From<ContributionFormRequest> for ContributionForm {
    fn from(req: ContributionFormRequest) -> Self {
        ContributionForm {
            traveler_id: req.traveler_id,
            amount: req.amount,
            date: req.date,
            note: req.note,
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/auth/login
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> impl IntoResponse {
    let mut auth = state.auth.lock().unwrap();
    match auth.sign_in(&req.email, &req.password) {
        Ok(session) => (
            StatusCode::OK,
            Json(ApiResponse::ok(LoginResponse {
                token: session.token,
            })),
        )
            .into_response(),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<LoginResponse>::fail("Invalid credentials")),
        )
            .into_response(),
    }
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    state.auth.lock().unwrap().sign_out();
    Json(ApiResponse::ok("OK"))
}

/// GET /api/trip - The admin dashboard payload
async fn get_trip(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().unwrap();

    match store.get_trip() {
        Ok(Some(trip)) => match load_dashboard(&store, trip) {
            Ok(payload) => (StatusCode::OK, Json(ApiResponse::ok(payload))).into_response(),
            Err(e) => internal_error::<DashboardPayload>("loading dashboard", e),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<DashboardPayload>::fail("No trip created yet")),
        )
            .into_response(),
        Err(e) => internal_error::<DashboardPayload>("loading trip", e),
    }
}

/// GET /api/public/:trip_id - Read-only share-link payload
async fn get_public_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<String>,
) -> impl IntoResponse {
    let store = state.store.lock().unwrap();

    match store.get_trip_by_id(&trip_id) {
        Ok(Some(trip)) => match load_dashboard(&store, trip) {
            Ok(payload) => (StatusCode::OK, Json(ApiResponse::ok(payload))).into_response(),
            Err(e) => internal_error::<DashboardPayload>("loading public dashboard", e),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<DashboardPayload>::fail("Trip not found")),
        )
            .into_response(),
        Err(e) => internal_error::<DashboardPayload>("loading public trip", e),
    }
}

/// POST /api/trip - Create the trip
async fn create_trip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TripFormRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&state, &headers) {
        return rejection;
    }

    let mut store = state.store.lock().unwrap();

    match store.get_trip() {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<Trip>::fail("A trip already exists")),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return internal_error::<Trip>("checking for trip", e),
    }

    let trip = match TripForm::from(req).build() {
        Ok(trip) => trip,
        Err(errors) => return validation_failure::<Trip>(errors),
    };

    match store.insert_trip(&trip) {
        Ok(()) => (StatusCode::CREATED, Json(ApiResponse::ok(trip))).into_response(),
        Err(e) => internal_error::<Trip>("creating trip", e),
    }
}

/// PUT /api/trip - Update the trip
async fn update_trip(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TripFormRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&state, &headers) {
        return rejection;
    }

    let mut store = state.store.lock().unwrap();

    let mut trip = match store.get_trip() {
        Ok(Some(trip)) => trip,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Trip>::fail("No trip created yet")),
            )
                .into_response();
        }
        Err(e) => return internal_error::<Trip>("loading trip", e),
    };

    let fields = match TripForm::from(req).validate() {
        Ok(fields) => fields,
        Err(errors) => return validation_failure::<Trip>(errors),
    };
    fields.apply_to(&mut trip);

    match store.update_trip(&trip) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(trip))).into_response(),
        Err(e) => internal_error::<Trip>("updating trip", e),
    }
}

/// POST /api/travelers - Add a traveler
async fn add_traveler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TravelerFormRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&state, &headers) {
        return rejection;
    }

    let mut store = state.store.lock().unwrap();

    let trip = match store.get_trip() {
        Ok(Some(trip)) => trip,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Traveler>::fail("No trip created yet")),
            )
                .into_response();
        }
        Err(e) => return internal_error::<Traveler>("loading trip", e),
    };

    let traveler = match (TravelerForm { name: req.name }).build(&trip.id) {
        Ok(traveler) => traveler,
        Err(errors) => return validation_failure::<Traveler>(errors),
    };

    match store.insert_traveler(&traveler) {
        Ok(()) => (StatusCode::CREATED, Json(ApiResponse::ok(traveler))).into_response(),
        Err(e) => internal_error::<Traveler>("adding traveler", e),
    }
}

/// POST /api/contributions - Record a contribution
async fn add_contribution(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ContributionFormRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&state, &headers) {
        return rejection;
    }

    let mut store = state.store.lock().unwrap();

    let trip = match store.get_trip() {
        Ok(Some(trip)) => trip,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<trip_savings::Contribution>::fail(
                    "No trip created yet",
                )),
            )
                .into_response();
        }
        Err(e) => return internal_error::<trip_savings::Contribution>("loading trip", e),
    };

    let travelers = match store.travelers_for_trip(&trip.id) {
        Ok(travelers) => travelers,
        Err(e) => return internal_error::<trip_savings::Contribution>("loading travelers", e),
    };

    let contribution = match ContributionForm::from(req).build(&trip.id, &travelers) {
        Ok(contribution) => contribution,
        Err(errors) => return validation_failure::<trip_savings::Contribution>(errors),
    };

    match store.insert_contribution(&contribution) {
        Ok(true) => (StatusCode::CREATED, Json(ApiResponse::ok(contribution))).into_response(),
        Ok(false) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::<trip_savings::Contribution>::fail(
                "An identical contribution is already recorded",
            )),
        )
            .into_response(),
        Err(e) => internal_error::<trip_savings::Contribution>("recording contribution", e),
    }
}

/// PUT /api/contributions/:id - Edit a contribution
async fn edit_contribution(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(contribution_id): Path<String>,
    Json(req): Json<ContributionFormRequest>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&state, &headers) {
        return rejection;
    }

    let mut store = state.store.lock().unwrap();

    let trip = match store.get_trip() {
        Ok(Some(trip)) => trip,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<trip_savings::Contribution>::fail(
                    "No trip created yet",
                )),
            )
                .into_response();
        }
        Err(e) => return internal_error::<trip_savings::Contribution>("loading trip", e),
    };

    let travelers = match store.travelers_for_trip(&trip.id) {
        Ok(travelers) => travelers,
        Err(e) => return internal_error::<trip_savings::Contribution>("loading travelers", e),
    };

    let existing = match store.contributions_for_trip(&trip.id) {
        Ok(contributions) => contributions.into_iter().find(|c| c.id == contribution_id),
        Err(e) => return internal_error::<trip_savings::Contribution>("loading contributions", e),
    };
    let mut contribution = match existing {
        Some(contribution) => contribution,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<trip_savings::Contribution>::fail(
                    "Contribution not found",
                )),
            )
                .into_response();
        }
    };

    let fields = match ContributionForm::from(req).validate(&travelers) {
        Ok(fields) => fields,
        Err(errors) => return validation_failure::<trip_savings::Contribution>(errors),
    };
    fields.apply_to(&mut contribution);

    match store.update_contribution(&contribution) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok(contribution))).into_response(),
        Err(e) => internal_error::<trip_savings::Contribution>("updating contribution", e),
    }
}

/// DELETE /api/contributions/:id
async fn remove_contribution(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(contribution_id): Path<String>,
) -> impl IntoResponse {
    if let Err(rejection) = require_admin(&state, &headers) {
        return rejection;
    }

    let mut store = state.store.lock().unwrap();

    match store.delete_contribution(&contribution_id) {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::ok("OK"))).into_response(),
        Err(_) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::fail("Contribution not found")),
        )
            .into_response(),
    }
}

/// GET /api/export.csv - Contribution history as a CSV download
async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let store = state.store.lock().unwrap();

    let trip = match store.get_trip() {
        Ok(Some(trip)) => trip,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::fail("No trip created yet")),
            )
                .into_response();
        }
        Err(e) => return internal_error::<()>("loading trip", e),
    };

    let result = store
        .travelers_for_trip(&trip.id)
        .and_then(|travelers| {
            let contributions = store.contributions_for_trip(&trip.id)?;
            write_csv(&to_export_rows(&travelers, &contributions))
        });

    match result {
        Ok(csv_text) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export_file_name(&trip)),
                ),
            ],
            csv_text,
        )
            .into_response(),
        Err(e) => internal_error::<()>("exporting CSV", e),
    }
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() {
    println!("Trip Savings Tracker - Web Server v{}", trip_savings::VERSION);

    let db_path = std::env::var("TRIP_DB").unwrap_or_else(|_| "trip-savings.db".to_string());
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    let store = SqliteStore::open(std::path::Path::new(&db_path)).expect("Failed to open database");
    println!("✓ Database opened: {}", db_path);

    let state = AppState {
        store: Arc::new(Mutex::new(store)),
        auth: Arc::new(Mutex::new(StaticAuth::new(admin_email, admin_password))),
    };

    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/trip", get(get_trip).post(create_trip).put(update_trip))
        .route("/public/:trip_id", get(get_public_trip))
        .route("/travelers", post(add_traveler))
        .route("/contributions", post(add_contribution))
        .route(
            "/contributions/:id",
            put(edit_contribution).delete(remove_contribution),
        )
        .route("/export.csv", get(export_csv))
        .with_state(state);

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive());

    let addr = "0.0.0.0:3000";
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    println!("\nServer running on http://localhost:3000");
    println!("  Admin:  GET /api/trip");
    println!("  Public: GET /api/public/:trip_id");
    println!("\n  Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
