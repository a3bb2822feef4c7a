//! CORS Middleware Configuration
//!
//! Browser clients authenticate with bearer tokens and cookies-equivalent
//! credentials, so configured origins get `Access-Control-Allow-Credentials`.
//! An empty origin list falls back to a wildcard, where credentials are not
//! permitted and therefore not advertised.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;

/// Create CORS layer from settings
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Credentialed CORS forbids wildcards, so methods and headers are
        // enumerated: the API only speaks GET/POST plus preflight, and
        // clients send Authorization and a JSON content type.
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600)) // 1 hour default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "OK"
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/")
            .header("origin", origin)
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "authorization")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn configured_origins_allow_credentials() {
        let settings = CorsSettings {
            allowed_origins: vec!["http://localhost:5173".into()],
        };
        let app = Router::new()
            .route("/", get(test_handler))
            .layer(create_cors_layer(&settings));

        let response = app
            .oneshot(preflight("http://localhost:5173"))
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            headers.get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn empty_origin_list_falls_back_to_wildcard_without_credentials() {
        let settings = CorsSettings {
            allowed_origins: vec![],
        };
        let app = Router::new()
            .route("/", get(test_handler))
            .layer(create_cors_layer(&settings));

        let response = app
            .oneshot(preflight("http://anywhere.example"))
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert!(!headers.contains_key("access-control-allow-credentials"));
    }
}
