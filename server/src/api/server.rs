//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::response::Redirect;
use axum::routing::get;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, schema_name, swagger_ui_html};
use super::routes::{datasets, health};
use crate::core::CoreApp;
use crate::core::config::QueryConfig;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::Dataset;
use crate::data::types::{CallCenterInquiry, CustomerSatisfactionSurvey, ServiceRequest};

/// Alias path the survey dataset is also served under
const SURVEYS_ALIAS: &str = "/surveys";

/// One dataset router and the path it is nested under
pub struct DatasetMount {
    pub path: String,
    pub name: &'static str,
    pub schema: String,
    router: fn(SqlitePool, QueryConfig) -> Router<()>,
}

impl DatasetMount {
    fn at<R: Dataset>(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: R::NAME,
            schema: schema_name::<R>(),
            router: datasets::routes::<R>,
        }
    }

    fn table<R: Dataset>() -> Self {
        Self::at::<R>(format!("/{}", R::TABLE))
    }
}

/// Every dataset mount, in route registration order
pub fn dataset_mounts() -> Vec<DatasetMount> {
    vec![
        DatasetMount::at::<CustomerSatisfactionSurvey>(SURVEYS_ALIAS),
        DatasetMount::table::<CustomerSatisfactionSurvey>(),
        DatasetMount::table::<CallCenterInquiry>(),
        DatasetMount::table::<ServiceRequest>(),
    ]
}

/// Build the full application router
pub fn router(pool: SqlitePool, limits: QueryConfig, allowed_origins: &AllowedOrigins) -> Router {
    let mut router = Router::new()
        .route("/", get(|| async { Redirect::temporary("/api/docs") }))
        .route(
            "/api/v1/health",
            get(health::health).with_state(pool.clone()),
        )
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html));

    for mount in dataset_mounts() {
        tracing::debug!(path = %mount.path, dataset = mount.name, "Mounting dataset routes");
        router = router.nest(&mount.path, (mount.router)(pool.clone(), limits));
    }

    router
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
}

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();

        let host = app.config.server.host.clone();
        let port = app.config.server.port;
        let addr = SocketAddr::new(host.parse()?, port);

        let router = router(
            app.database.pool().clone(),
            app.config.query,
            &allowed_origins,
        );

        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "Listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::data::sqlite::migrations::run_migrations;

    async fn test_router() -> Router {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        router(
            pool,
            QueryConfig::default(),
            &AllowedOrigins::new("127.0.0.1", 5047),
        )
    }

    async fn get(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[test]
    fn test_dataset_mounts_cover_every_table() {
        let paths: Vec<String> = dataset_mounts().into_iter().map(|m| m.path).collect();
        assert_eq!(
            paths,
            vec![
                "/surveys",
                "/nyc_open_data_311_customer_satisfaction_survey",
                "/nyc_open_data_311_call_center_inquiry",
                "/nyc_open_data_311_service_requests",
            ]
        );
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router().await;
        let (status, body) = get(&router, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_every_dataset_lists() {
        let router = test_router().await;
        for mount in dataset_mounts() {
            let (status, body) = get(&router, &mount.path).await;
            assert_eq!(status, StatusCode::OK, "{}", mount.path);
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["value"], serde_json::json!([]));
        }
    }

    #[tokio::test]
    async fn test_surveys_alias_shares_table() {
        let router = test_router().await;
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/surveys")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"campaign":"Spring"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let (status, body) =
            get(&router, "/nyc_open_data_311_customer_satisfaction_survey/1").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["campaign"], "Spring");
    }

    #[tokio::test]
    async fn test_openapi_and_unknown_route() {
        let router = test_router().await;
        let (status, _) = get(&router, "/api/openapi.json").await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = get(&router, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
