//! HTTP Routes
//!
//! - /    GET   存活探针

use axum::{routing::get, Router};

use super::handlers;

/// 创建所有路由
pub fn create_routes() -> Router {
    Router::new().route("/", get(handlers::liveness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_liveness() {
        let response = create_routes()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], handlers::LIVENESS_BODY.as_bytes());
    }

    #[tokio::test]
    async fn test_other_routes_not_found() {
        for uri in ["/api/ping", "/health"] {
            let response = create_routes()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let response = create_routes()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
