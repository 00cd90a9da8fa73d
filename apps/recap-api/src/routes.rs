use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::{HeaderValue, Method, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use recap_service::{
	AddUpdateRequest, ChatRequest, ChatResponse, DependencyStage, Error as ServiceError,
	UpdateItem,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	let cors = cors_layer(&state.service.cfg.service.cors_allow_origins);

	Router::new()
		.route("/healthz", get(healthz))
		.route("/chat", post(chat))
		.route("/updates", post(add_update))
		.layer(cors)
		.with_state(state)
}

/// `["*"]` allows any origin without credentials; otherwise only the listed origins, with
/// credentials.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
	if origins.iter().any(|origin| origin == "*") {
		return CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
	}

	let mut allowed = Vec::with_capacity(origins.len());

	for origin in origins {
		match origin.parse::<HeaderValue>() {
			Ok(value) => allowed.push(value),
			Err(_) => tracing::warn!(%origin, "Invalid CORS origin skipped."),
		}
	}

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(allowed))
		.allow_methods(AllowMethods::list([Method::GET, Method::POST, Method::OPTIONS]))
		.allow_headers(AllowHeaders::mirror_request())
		.allow_credentials(true)
}

#[derive(Debug, Serialize)]
struct Health {
	status: &'static str,
}

async fn healthz() -> Json<Health> {
	Json(Health { status: "ok" })
}

async fn chat(
	State(state): State<AppState>,
	payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.chat(payload).await?;

	Ok(Json(response))
}

async fn add_update(
	State(state): State<AppState>,
	payload: Result<Json<AddUpdateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Option<UpdateItem>>), ApiError> {
	let Json(payload) = payload?;
	let stored = state.service.add_update(payload).await?;

	Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message, fields } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", message, Some(fields)),
			ServiceError::Dependency { stage, message } => {
				let code = match stage {
					DependencyStage::Embedding => "embedding_failure",
					DependencyStage::Completion => "completion_failure",
				};

				tracing::error!(%stage, %message, "Chat request failed.");

				Self::new(StatusCode::BAD_GATEWAY, code, message, None)
			},
			ServiceError::StorageUnconfigured => Self::new(
				StatusCode::SERVICE_UNAVAILABLE,
				"storage_unconfigured",
				"Storage is not configured.",
				None,
			),
			ServiceError::Storage { message } =>
				Self::new(StatusCode::BAD_GATEWAY, "storage_error", message, None),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		Self::new(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text(), None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
