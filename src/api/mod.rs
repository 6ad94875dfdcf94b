//! HTTP layer: route handlers, DTOs, OpenAPI document and router
//! composition.

pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the router with every bridge endpoint.
pub fn build_router() -> Router<AppState> {
    handlers::routes()
}

/// Builds the complete application: routes, API docs, tracing and CORS
/// layers, with state attached.
pub fn build_app(state: AppState) -> Router {
    let router = build_router();

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::service::{BridgeSettings, CommandBridge};
    use crate::ws::SessionTiming;

    fn app() -> Router {
        let bridge = CommandBridge::new(
            None,
            BridgeSettings {
                gateway_url: "ws://127.0.0.1:1/v1".to_string(),
                domain: None,
                timing: SessionTiming::default(),
            },
        );
        build_app(AppState::new(bridge, None))
    }

    #[tokio::test]
    async fn command_route_rejects_get() {
        let Ok(request) = Request::builder()
            .method(Method::GET)
            .uri("/vcp/command/v1/door_unlock")
            .body(Body::empty())
        else {
            panic!("request build failed");
        };
        let Ok(response) = app().oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn unauthorized_before_misconfigured() {
        let Ok(request) = Request::builder()
            .method(Method::POST)
            .uri("/vcp/command/v1/door_unlock")
            .body(Body::empty())
        else {
            panic!("request build failed");
        };
        let Ok(response) = app().oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_credential_wins_over_malformed_body() {
        let Ok(request) = Request::builder()
            .method(Method::POST)
            .uri("/vcp/command/v1/door_unlock")
            .body(Body::from("{not json"))
        else {
            panic!("request build failed");
        };
        let Ok(response) = app().oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_body_with_credential_is_bad_request() {
        let Ok(request) = Request::builder()
            .method(Method::POST)
            .uri("/vcp/command/v1/door_unlock")
            .header("authorization", "Bearer token")
            .body(Body::from("{not json"))
        else {
            panic!("request build failed");
        };
        let Ok(response) = app().oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[cfg(feature = "swagger-ui")]
    #[tokio::test]
    async fn openapi_document_is_served() {
        let Ok(request) = Request::builder()
            .uri("/api-docs/openapi.json")
            .body(Body::empty())
        else {
            panic!("request build failed");
        };
        let Ok(response) = app().oneshot(request).await else {
            panic!("router failed");
        };
        assert_eq!(response.status(), StatusCode::OK);
    }
}
