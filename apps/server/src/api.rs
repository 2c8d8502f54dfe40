use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    error::{ApiError, ApiResult, ErrorBody},
    main_lib::AppState,
    models::{ComparableListing, EstimateRequest, EstimateResponse, NumericInput},
};
use carvalue_core::valuation::EstimateOutcome;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(
    get,
    path = "/api/v1/readyz",
    responses(
        (status = 200, description = "Ready"),
        (status = 503, description = "Record store unreachable", body = ErrorBody)
    )
)]
pub async fn readyz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.listing_repository.count_listings()?;
    Ok("ok")
}

#[utoipa::path(
    post,
    path = "/api/v1/estimate",
    request_body = EstimateRequest,
    responses(
        (status = 200, body = EstimateResponse),
        (status = 400, description = "Invalid mileage or year", body = ErrorBody),
        (status = 422, description = "Not enough comparable listings", body = ErrorBody),
        (status = 503, description = "Record store unavailable", body = ErrorBody)
    )
)]
async fn estimate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EstimateRequest>, JsonRejection>,
) -> ApiResult<Json<EstimateResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = request.to_query()?;

    match state.valuation_service.get_estimate(&query).await? {
        EstimateOutcome::Estimated(result) => Ok(Json(EstimateResponse::from(result))),
        EstimateOutcome::InsufficientData { found, required } => {
            Err(ApiError::InsufficientData { found, required })
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(healthz, readyz, estimate),
    components(schemas(
        EstimateRequest,
        EstimateResponse,
        ComparableListing,
        NumericInput,
        ErrorBody
    )),
    tags((name = "carvalue"))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/estimate", post(estimate));

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}
