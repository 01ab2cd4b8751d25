//! Sample routes exercising each failure path end to end

use std::borrow::Cow;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::extract::{Path, ValidatedJson};
use crate::insurer::{Insurer, InsurerClient};
use crate::render::ApiError;

/// Build the sample router
///
/// The insurer lookup is only mounted when a registry is configured.
pub fn sample_router(insurer: Option<InsurerClient>) -> Router {
    let mut router = Router::new()
        .route("/ping", get(ping))
        .route("/api/tasks", post(create_task));

    if let Some(client) = insurer {
        router = router.route("/api/insurers/{id}", get(get_insurer).with_state(client));
    }

    router
}

/// Task creation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 120, message = "size must be between 0 and 120")
    )]
    pub description: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank").with_message(Cow::Borrowed("must not be blank")));
    }
    Ok(())
}

/// Liveness probe, mounted at the configured health path
pub async fn health() -> &'static str {
    "ok"
}

async fn ping() -> &'static str {
    "pong"
}

async fn create_task(ValidatedJson(request): ValidatedJson<CreateTaskRequest>) -> Json<CreateTaskRequest> {
    tracing::debug!(description = %request.description, "task accepted");
    Json(request)
}

async fn get_insurer(State(client): State<InsurerClient>, Path(id): Path<String>) -> Result<Json<Insurer>, ApiError> {
    let insurer = client.fetch(&id).await?;
    Ok(Json(insurer))
}
