use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, Request};
use http::StatusCode;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::failure::Failure;
use crate::render::ApiError;
use crate::validation::{BindingErrors, object_name};

/// Reason given when a request body cannot be parsed
pub const UNREADABLE_BODY: &str = "Failed to read HTTP message";

/// JSON body that is deserialized and then validated
///
/// Rejections render as problem documents: an unreadable body as invalid
/// input, a wrong content type as 415, a body that fails its `Validate`
/// rules as a validation failure listing every offending field.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| ApiError::new(json_rejection_failure(&rejection, content_type)))?;

        value.validate().map_err(|errors| {
            ApiError::new(Failure::Binding(BindingErrors::from_validation(
                &errors,
                &object_name::<T>(),
            )))
        })?;

        Ok(Self(value))
    }
}

/// Path parameters whose rejection renders as a problem document
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// Query string whose rejection renders as a problem document
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

/// Failure for a rejected path, query or form extraction
///
/// Values that could not be converted are invalid input; anything else the
/// extractor reports keeps its status.
pub(crate) fn rejection_failure(status: StatusCode, reason: String) -> Failure {
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Failure::Input { reason },
        StatusCode::UNSUPPORTED_MEDIA_TYPE => Failure::UnsupportedMediaType { content_type: None },
        status => Failure::Status { status, reason: None },
    }
}

pub(crate) fn json_rejection_failure(rejection: &JsonRejection, content_type: Option<String>) -> Failure {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => Failure::UnsupportedMediaType { content_type },
        JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => Failure::Input {
            reason: UNREADABLE_BODY.to_owned(),
        },
        other => Failure::Status {
            status: other.status(),
            reason: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::routing::{get, post};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, Validate)]
    struct Signup {
        #[validate(length(min = 3, message = "size must be at least 3"))]
        username: String,
        #[validate(range(min = 18, message = "must be at least 18"))]
        age: u8,
    }

    async fn signup(ValidatedJson(body): ValidatedJson<Signup>) -> axum::Json<Signup> {
        axum::Json(body)
    }

    async fn send(content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let app = crate::with_error_handling(Router::new().route("/signup", post(signup)));

        let mut request = http::Request::post("/signup");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let request = request.body(Body::from(body.to_owned())).unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let (status, json) = send(Some("application/json"), r#"{"username":"ana","age":30}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["username"], "ana");
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_input() {
        let (status, json) = send(Some("application/json"), r#"{"username":"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_INPUT");
        assert_eq!(json["detail"], UNREADABLE_BODY);
    }

    #[tokio::test]
    async fn wrong_shape_is_invalid_input() {
        let (status, json) = send(Some("application/json"), r#"{"username":"ana","age":"old"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn missing_content_type() {
        let (status, json) = send(None, r#"{"username":"ana","age":30}"#).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["title"], "Unsupported Media Type");
        assert_eq!(json["detail"], "Content type not specified");
    }

    #[tokio::test]
    async fn foreign_content_type() {
        let (status, json) = send(Some("text/plain"), "ana").await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["detail"], "Content type 'text/plain' not supported");
    }

    #[tokio::test]
    async fn validation_failure_lists_fields() {
        let (status, json) = send(Some("application/json"), r#"{"username":"a","age":7}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["title"], "Validation Failed");
        assert_eq!(json["detail"], "Validation failure");
        assert_eq!(
            json["errors"],
            serde_json::json!([
                { "field": "age", "message": "must be at least 18" },
                { "field": "username", "message": "size must be at least 3" },
            ])
        );
    }

    #[derive(Debug, Deserialize)]
    struct Page {
        page: u32,
    }

    async fn item(Path(id): Path<u32>, Query(query): Query<Page>) -> String {
        format!("{id}:{}", query.page)
    }

    async fn fetch(uri: &str) -> (StatusCode, Value) {
        let app = crate::with_error_handling(Router::new().route("/items/{id}", get(item)));

        let response = app
            .oneshot(http::Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn valid_path_and_query_pass() {
        let app = crate::with_error_handling(Router::new().route("/items/{id}", get(item)));

        let response = app
            .oneshot(http::Request::get("/items/4?page=2").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"4:2");
    }

    #[tokio::test]
    async fn unparseable_path_is_invalid_input() {
        let (status, json) = fetch("/items/abc?page=1").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["title"], "Invalid Input");
        assert_eq!(json["code"], "INVALID_INPUT");
        assert!(json["detail"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn unparseable_query_is_invalid_input() {
        let (status, json) = fetch("/items/4?page=x").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["title"], "Invalid Input");
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    #[tokio::test]
    async fn missing_query_is_invalid_input() {
        let (status, json) = fetch("/items/4").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_INPUT");
    }

    #[test]
    fn other_rejection_statuses_are_kept() {
        let failure = rejection_failure(StatusCode::INTERNAL_SERVER_ERROR, "No paths parameters found".to_owned());

        assert!(matches!(failure, Failure::Status { reason: None, .. }));
        assert_eq!(failure.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
