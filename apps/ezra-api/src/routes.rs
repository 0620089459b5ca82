use axum::{
	Json, Router,
	extract::{Path, Query, Request, State},
	http::StatusCode,
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use ezra_service::{
	DocumentationIngestRequest, DocumentationSearchRequest, DocumentationSearchResponse,
	ErrorCodeEntity, IngestReport, ListRequest, ListResponse, MarkdownIngestRequest, QueryRequest,
	QueryResponse, ServiceError, StatsResponse,
};

pub fn router(state: AppState) -> Router {
	let guarded = Router::new()
		.route("/v1/ingest/error_codes", post(ingest_error_codes))
		.route("/v1/ingest/documentation", post(ingest_documentation))
		.route("/v1/ingest/markdown", post(ingest_markdown))
		.route("/v1/query", post(query))
		.route("/v1/query/documentation", post(query_documentation))
		.route("/v1/error_codes", get(list_error_codes))
		.route("/v1/error_codes/{code}", get(lookup_error_code))
		.route("/v1/stats", get(stats))
		.route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

	Router::new().route("/health", get(health)).merge(guarded).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn require_api_key(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	let Some(expected) = state.service.cfg.security.api_auth_token.as_deref() else {
		return Ok(next.run(request).await);
	};
	let Some(provided) = request.headers().get("x-api-key").and_then(|value| value.to_str().ok())
	else {
		return Err(json_error(StatusCode::UNAUTHORIZED, "missing_api_key", "Missing API key."));
	};

	if provided != expected {
		return Err(json_error(StatusCode::FORBIDDEN, "invalid_api_key", "Invalid API key."));
	}

	Ok(next.run(request).await)
}

async fn ingest_error_codes(
	State(state): State<AppState>,
	Json(payload): Json<serde_json::Value>,
) -> Result<Json<IngestReport>, ApiError> {
	let report = state.service.ingest_error_codes(payload).await?;
	Ok(Json(report))
}

async fn ingest_documentation(
	State(state): State<AppState>,
	Json(payload): Json<DocumentationIngestRequest>,
) -> Result<Json<IngestReport>, ApiError> {
	let report = state.service.ingest_documentation(&payload.chunks).await?;
	Ok(Json(report))
}

async fn ingest_markdown(
	State(state): State<AppState>,
	Json(payload): Json<MarkdownIngestRequest>,
) -> Result<Json<IngestReport>, ApiError> {
	let report = state.service.ingest_markdown(payload).await?;
	Ok(Json(report))
}

async fn query(
	State(state): State<AppState>,
	Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
	let response = state.service.answer(payload).await?;
	Ok(Json(response))
}

async fn query_documentation(
	State(state): State<AppState>,
	Json(payload): Json<DocumentationSearchRequest>,
) -> Result<Json<DocumentationSearchResponse>, ApiError> {
	let response = state.service.search_documentation(payload).await?;
	Ok(Json(response))
}

async fn list_error_codes(
	State(state): State<AppState>,
	Query(params): Query<ListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
	let response = state.service.list_error_codes(params).await?;
	Ok(Json(response))
}

async fn lookup_error_code(
	State(state): State<AppState>,
	Path(code): Path<String>,
) -> Result<Json<ErrorCodeEntity>, ApiError> {
	match state.service.lookup_error_code(&code).await? {
		Some(entity) => Ok(Json(entity)),
		None => Err(json_error(
			StatusCode::NOT_FOUND,
			"not_found",
			format!("Error code {code} not found."),
		)),
	}
}

async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
	let response = state.service.stats().await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError { status, error_code: code.to_string(), message: message.into() }
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message),
			ServiceError::Storage { message } =>
				json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", message),
			ServiceError::Provider { message } =>
				json_error(StatusCode::BAD_GATEWAY, "provider_error", message),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
