//! Request body extractors

use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Body decoded from `application/x-www-form-urlencoded` when the request
/// says so, and from JSON otherwise. Rejections become 400 envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOrForm<T>(pub T);

impl<S, T> FromRequest<S> for JsonOrForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            let Form(value) = Form::<T>::from_request(req, state).await?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state).await?;
            Ok(Self(value))
        }
    }
}

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::post, Router};
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize)]
    struct Shelf {
        name: String,
    }

    fn app() -> Router {
        Router::new().route(
            "/shelves",
            post(|JsonOrForm(shelf): JsonOrForm<Shelf>| async move { shelf.name }),
        )
    }

    async fn post_with(content_type: &str, body: &'static str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri("/shelves")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn decodes_json_bodies() {
        let (status, body) = post_with("application/json", r#"{"name":"Fiction"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Fiction");
    }

    #[tokio::test]
    async fn decodes_urlencoded_bodies() {
        let (status, body) = post_with(
            "application/x-www-form-urlencoded; charset=utf-8",
            "name=Science+Fiction",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Science Fiction");
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request_envelope() {
        let (status, body) = post_with("application/json", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON body"));
    }
}
