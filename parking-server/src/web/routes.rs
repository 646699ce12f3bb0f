//! HTTP route handlers.

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, put},
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::catalog::FacilityCatalog;
use crate::domain::Coordinate;
use crate::routing::RouteProvider;
use crate::search::{SearchMode, SearchOutcome};
use crate::session::UserId;

use super::dto::*;
use super::state::AppState;
use super::templates::{NearbyTemplate, NearestTemplate};

/// Create the application router.
pub fn create_router<C, R>(state: AppState<C, R>) -> Router
where
    C: FacilityCatalog + 'static,
    R: RouteProvider + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route(
            "/users/:user_id/location",
            put(record_location::<C, R>).post(locate_and_search::<C, R>),
        )
        .route("/users/:user_id/nearby", get(user_nearby::<C, R>))
        .route("/users/:user_id/nearest", get(user_nearest::<C, R>))
        .route("/search/nearby", get(search_nearby::<C, R>))
        .route("/search/nearest", get(search_nearest::<C, R>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Store the user's location.
async fn record_location<C, R>(
    State(state): State<AppState<C, R>>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Json<LocationAck>, AppError>
where
    C: FacilityCatalog + 'static,
    R: RouteProvider + 'static,
{
    let user_id = parse_user_id(&user_id)?;
    let coordinate = parse_location(&body)?;

    let session = state.sessions.record(user_id, coordinate).await;
    info!(user = %session.user_id, %coordinate, "Location recorded");

    Ok(Json(LocationAck::from_session(&session)))
}

/// Store the user's location and answer with parking nearby.
async fn locate_and_search<C, R>(
    State(state): State<AppState<C, R>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError>
where
    C: FacilityCatalog + 'static,
    R: RouteProvider + 'static,
{
    let user_id = parse_user_id(&user_id)?;
    let coordinate = parse_location(&body)?;

    state.sessions.record(user_id, coordinate).await;

    let radius_km = state.search.config().radius_km;
    let outcome = state
        .search
        .search(coordinate, SearchMode::Nearby { radius_km })
        .await;

    render_outcome(&headers, outcome)
}

/// Nearby search from the user's stored location.
async fn user_nearby<C, R>(
    State(state): State<AppState<C, R>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Query(query): Query<NearbyQuery>,
) -> Result<Response, AppError>
where
    C: FacilityCatalog + 'static,
    R: RouteProvider + 'static,
{
    let origin = stored_location(&state, &user_id).await?;
    let radius_km = resolve_radius(query.radius_km, state.search.config().radius_km)?;

    let outcome = state
        .search
        .search(origin, SearchMode::Nearby { radius_km })
        .await;

    render_outcome(&headers, outcome)
}

/// Nearest search from the user's stored location.
async fn user_nearest<C, R>(
    State(state): State<AppState<C, R>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, AppError>
where
    C: FacilityCatalog + 'static,
    R: RouteProvider + 'static,
{
    let origin = stored_location(&state, &user_id).await?;
    let outcome = state.search.search(origin, SearchMode::Nearest).await;

    render_outcome(&headers, outcome)
}

/// Nearby search from a coordinate given in the query.
async fn search_nearby<C, R>(
    State(state): State<AppState<C, R>>,
    headers: HeaderMap,
    Query(query): Query<CoordinateQuery>,
) -> Result<Response, AppError>
where
    C: FacilityCatalog + 'static,
    R: RouteProvider + 'static,
{
    let origin = parse_coordinate(query.lat, query.lon)?;
    let radius_km = resolve_radius(query.radius_km, state.search.config().radius_km)?;

    let outcome = state
        .search
        .search(origin, SearchMode::Nearby { radius_km })
        .await;

    render_outcome(&headers, outcome)
}

/// Nearest search from a coordinate given in the query.
async fn search_nearest<C, R>(
    State(state): State<AppState<C, R>>,
    headers: HeaderMap,
    Query(query): Query<CoordinateQuery>,
) -> Result<Response, AppError>
where
    C: FacilityCatalog + 'static,
    R: RouteProvider + 'static,
{
    let origin = parse_coordinate(query.lat, query.lon)?;
    let outcome = state.search.search(origin, SearchMode::Nearest).await;

    render_outcome(&headers, outcome)
}

/// Check if request accepts HTML.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Render a search outcome as HTML or JSON based on the Accept header.
fn render_outcome(headers: &HeaderMap, outcome: SearchOutcome) -> Result<Response, AppError> {
    let html = accepts_html(headers);

    match outcome {
        SearchOutcome::Ranked { radius_km, results } => {
            let response = NearbyResponse::new(radius_km, &results);
            if html {
                render_html(NearbyTemplate::from(response))
            } else {
                Ok(Json(response).into_response())
            }
        }
        SearchOutcome::Nearest(nearest) => {
            let response = NearestResponse::new(nearest.as_ref());
            if html {
                render_html(NearestTemplate::from(response))
            } else {
                Ok(Json(response).into_response())
            }
        }
    }
}

fn render_html(template: impl Template) -> Result<Response, AppError> {
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;
    Ok(Html(html).into_response())
}

fn parse_user_id(raw: &str) -> Result<UserId, AppError> {
    UserId::parse(raw).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

fn parse_coordinate(latitude: f64, longitude: f64) -> Result<Coordinate, AppError> {
    Coordinate::new(latitude, longitude).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })
}

/// Parse a location body manually so the payload can be logged on failure.
fn parse_location(body: &[u8]) -> Result<Coordinate, AppError> {
    let req: LocationRequest = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, body = %String::from_utf8_lossy(body), "Invalid location body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
        }
    })?;
    parse_coordinate(req.latitude, req.longitude)
}

/// Requested radius, or the default. Must be finite and non-negative.
fn resolve_radius(requested: Option<f64>, default_km: f64) -> Result<f64, AppError> {
    let radius_km = requested.unwrap_or(default_km);
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(AppError::BadRequest {
            message: format!("Invalid radius: {radius_km}"),
        });
    }
    Ok(radius_km)
}

async fn stored_location<C, R>(state: &AppState<C, R>, raw_user_id: &str) -> Result<Coordinate, AppError> {
    let user_id = parse_user_id(raw_user_id)?;
    state
        .sessions
        .last_coordinate(&user_id)
        .await
        .ok_or(AppError::NoLocation { user_id })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    /// The user has not shared a location (or it has expired).
    NoLocation { user_id: UserId },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::NoLocation { .. } => (
                StatusCode::NOT_FOUND,
                "Send your location first".to_string(),
            ),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message.clone()),
        };

        match &self {
            AppError::Internal { .. } => error!(%status, %message, "Request failed"),
            AppError::NoLocation { user_id } => info!(%status, user = %user_id, "No location on file"),
            AppError::BadRequest { .. } => warn!(%status, %message, "Bad request"),
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
