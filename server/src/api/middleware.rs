//! CORS policy and the JSON 404 fallback

use axum::body::to_bytes;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::types::ApiError;
use crate::core::config::is_all_interfaces;

/// Browser origins allowed to call the API
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<String>,
}

impl AllowedOrigins {
    /// Origins for the configured bind address.
    ///
    /// Loopback binds accept both `localhost` and `127.0.0.1`. Binding to
    /// all interfaces additionally accepts every non-loopback IPv4 address
    /// of this machine.
    pub fn new(host: &str, port: u16) -> Self {
        let all_interfaces = is_all_interfaces(host);
        let hosts: Vec<String> = if all_interfaces || host == "127.0.0.1" || host == "localhost"
        {
            vec!["localhost".to_string(), "127.0.0.1".to_string()]
        } else {
            vec![host.to_string()]
        };

        let mut origins: Vec<String> = hosts
            .iter()
            .flat_map(|h| [format!("http://{}:{}", h, port), format!("http://{}", h)])
            .collect();

        if all_interfaces && let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            origins.extend(
                interfaces
                    .into_iter()
                    .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
                    .map(|(_, ip)| format!("http://{}:{}", ip, port)),
            );
        }

        Self { origins }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.origins.iter().any(|o| o == origin)
    }

    fn header_values(&self) -> Vec<HeaderValue> {
        self.origins.iter().filter_map(|o| o.parse().ok()).collect()
    }
}

/// CORS for the dataset API. `Location` is exposed so browser clients
/// can read the URL of a created record.
pub fn cors(allowed: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed.header_values()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .expose_headers([header::LOCATION])
}

const MAX_404_BODY_LOG: usize = 4 * 1024;

/// Fallback for unknown routes: logs the request at debug level and
/// responds with a JSON `ROUTE_NOT_FOUND` error
pub async fn handle_404(req: Request) -> ApiError {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if tracing::enabled!(tracing::Level::DEBUG) {
        let query = req.uri().query().map(str::to_string);
        let body = to_bytes(req.into_body(), MAX_404_BODY_LOG).await;
        let body_preview = match &body {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Err(_) => Some(format!("<over {} bytes>", MAX_404_BODY_LOG)),
        };
        tracing::debug!(%method, %path, ?query, body = ?body_preview, "Route not found");
    }

    ApiError::not_found(
        "ROUTE_NOT_FOUND",
        format!("No route for {} {}", method, path),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn test_localhost_allows_both_spellings() {
        let origins = AllowedOrigins::new("127.0.0.1", 5047);
        assert!(origins.is_allowed("http://localhost:5047"));
        assert!(origins.is_allowed("http://127.0.0.1:5047"));
        assert!(origins.is_allowed("http://localhost"));
        assert!(!origins.is_allowed("http://evil.example:5047"));
    }

    #[test]
    fn test_specific_host_only() {
        let origins = AllowedOrigins::new("10.0.0.5", 8080);
        assert!(origins.is_allowed("http://10.0.0.5:8080"));
        assert!(!origins.is_allowed("http://localhost:8080"));
    }

    #[tokio::test]
    async fn test_handle_404_json_body() {
        let req = axum::http::Request::builder()
            .method("DELETE")
            .uri("/missing?x=1")
            .body(Body::empty())
            .unwrap();
        let response = handle_404(req).await.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["code"], "ROUTE_NOT_FOUND");
        assert_eq!(json["message"], "No route for DELETE /missing");
    }
}
