//! Security Headers Middleware
//!
//! Adds standard security headers to all HTTP responses.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, Response},
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tower::{Layer, Service};

/// Security headers configuration
#[derive(Clone, Debug)]
pub struct SecurityHeadersConfig {
    /// Enable HSTS header (should only be true when using HTTPS)
    pub enable_hsts: bool,
    /// HSTS max-age in seconds (default: 31536000 = 1 year)
    pub hsts_max_age: u64,
    /// Content-Security-Policy directive
    pub content_security_policy: String,
    /// Referrer-Policy value
    pub referrer_policy: String,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            enable_hsts: true,
            hsts_max_age: 31536000, // 1 year
            content_security_policy: "default-src 'self'".to_string(),
            referrer_policy: "strict-origin-when-cross-origin".to_string(),
        }
    }
}

/// Layer that adds security headers to responses
#[derive(Clone)]
pub struct SecurityHeadersLayer {
    config: SecurityHeadersConfig,
}

impl SecurityHeadersLayer {
    pub fn new() -> Self {
        Self {
            config: SecurityHeadersConfig::default(),
        }
    }

    pub fn with_config(config: SecurityHeadersConfig) -> Self {
        Self { config }
    }
}

impl Default for SecurityHeadersLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for SecurityHeadersLayer {
    type Service = SecurityHeadersMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SecurityHeadersMiddleware {
            inner,
            config: self.config.clone(),
        }
    }
}

/// Middleware service that adds security headers
#[derive(Clone)]
pub struct SecurityHeadersMiddleware<S> {
    inner: S,
    config: SecurityHeadersConfig,
}

impl<S> Service<Request<Body>> for SecurityHeadersMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let config = self.config.clone();

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            let headers = response.headers_mut();

            headers.insert(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
            headers.insert(
                header::X_XSS_PROTECTION,
                HeaderValue::from_static("1; mode=block"),
            );

            if config.enable_hsts {
                let hsts_value = format!("max-age={}; includeSubDomains", config.hsts_max_age);
                if let Ok(value) = HeaderValue::from_str(&hsts_value) {
                    headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
                }
            }

            if let Ok(value) = HeaderValue::from_str(&config.content_security_policy) {
                headers.insert(header::CONTENT_SECURITY_POLICY, value);
            }

            if let Ok(value) = HeaderValue::from_str(&config.referrer_policy) {
                headers.insert(header::REFERRER_POLICY, value);
            }

            Ok(response)
        })
    }
}

/// Create a security headers layer with default configuration
pub fn create_security_headers_layer() -> SecurityHeadersLayer {
    SecurityHeadersLayer::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::get, Router};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "OK"
    }

    #[tokio::test]
    async fn headers_are_added_to_responses() {
        let app = Router::new()
            .route("/", get(test_handler))
            .layer(create_security_headers_layer());

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert!(headers.contains_key("strict-transport-security"));
        assert!(headers.contains_key("content-security-policy"));
    }
}
