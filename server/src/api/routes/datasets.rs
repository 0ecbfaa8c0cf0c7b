//! Dataset CRUD and query endpoints
//!
//! One generic router serves every [`Dataset`]; it is mounted once per table.

use axum::extract::{DefaultBodyLimit, OriginalUri, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::api::extractors::{RecordJson, RecordPath, ValidatedQuery};
use crate::api::types::ApiError;
use crate::core::config::QueryConfig;
use crate::core::constants::BATCH_BODY_LIMIT;
use crate::data::Dataset;
use crate::data::sqlite::repositories;
use crate::query::{QueryOptions, QueryPlan, QueryResult};

/// Shared state for dataset endpoints
#[derive(Clone)]
pub struct DatasetApiState {
    pub pool: SqlitePool,
    pub limits: QueryConfig,
}

/// OData-style query-string options for collection reads
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ODataQuery {
    #[serde(rename = "$filter")]
    pub filter: Option<String>,
    #[serde(rename = "$orderby")]
    pub order_by: Option<String>,
    #[serde(rename = "$select")]
    pub select: Option<String>,
    #[serde(rename = "$apply")]
    pub apply: Option<String>,
    #[serde(rename = "$expand")]
    pub expand: Option<String>,
    #[serde(rename = "$top")]
    #[validate(range(min = 1, message = "$top must be at least 1"))]
    pub top: Option<usize>,
    #[serde(rename = "$skip")]
    pub skip: Option<usize>,
    #[serde(rename = "$count", default)]
    pub count: bool,
}

impl ODataQuery {
    /// Check the options the query engine does not handle and apply paging limits
    fn into_options(self, limits: &QueryConfig) -> Result<QueryOptions, ApiError> {
        if self.expand.as_deref().is_some_and(|e| !e.trim().is_empty()) {
            return Err(ApiError::bad_request(
                "UNSUPPORTED_EXPAND",
                "$expand is not supported: datasets have no navigation properties",
            ));
        }

        let top = self.top.unwrap_or(limits.default_top);
        if top > limits.max_top {
            return Err(ApiError::bad_request(
                "INVALID_TOP",
                format!("$top must not exceed {}", limits.max_top),
            ));
        }

        Ok(QueryOptions {
            filter: self.filter,
            order_by: self.order_by,
            select: self.select,
            apply: self.apply,
            top: Some(top),
            skip: self.skip,
            count: self.count,
        })
    }
}

/// Build the routes for one dataset
pub fn routes<R: Dataset>(pool: SqlitePool, limits: QueryConfig) -> Router<()> {
    let state = DatasetApiState { pool, limits };

    Router::new()
        .route("/", get(list_records::<R>).post(create_record::<R>))
        .route(
            "/batch",
            post(create_batch::<R>)
                .put(upsert_batch::<R>)
                .layer(DefaultBodyLimit::max(BATCH_BODY_LIMIT)),
        )
        .route(
            "/{id}",
            get(get_record::<R>)
                .put(update_record::<R>)
                .delete(delete_record::<R>),
        )
        .with_state(state)
}

fn not_found<R: Dataset>(id: i64) -> ApiError {
    ApiError::not_found("NOT_FOUND", format!("No {} with id {}", R::NAME, id))
}

/// Query the collection
pub async fn list_records<R: Dataset>(
    State(state): State<DatasetApiState>,
    ValidatedQuery(query): ValidatedQuery<ODataQuery>,
) -> Result<Json<QueryResult<R>>, ApiError> {
    let options = query.into_options(&state.limits)?;
    // Compile before touching the database so bad facets fail fast
    let plan = QueryPlan::<R>::compile(&options)?;

    let records = repositories::list_matching::<R, _>(&state.pool, |r| plan.matches(r))
        .await
        .map_err(ApiError::from_sqlite)?;
    let matched = records.len();
    let result = plan.execute_matched(records);

    tracing::debug!(
        dataset = R::NAME,
        matched,
        returned = result.value.len(),
        "Query executed"
    );
    Ok(Json(result))
}

pub async fn get_record<R: Dataset>(
    State(state): State<DatasetApiState>,
    path: RecordPath,
) -> Result<Json<R>, ApiError> {
    repositories::get::<R>(&state.pool, path.id)
        .await
        .map_err(ApiError::from_sqlite)?
        .map(Json)
        .ok_or_else(|| not_found::<R>(path.id))
}

/// Insert one record; responds 201 with a `Location` header
pub async fn create_record<R: Dataset>(
    State(state): State<DatasetApiState>,
    OriginalUri(uri): OriginalUri,
    RecordJson(record): RecordJson<R>,
) -> Result<(StatusCode, HeaderMap, Json<R>), ApiError> {
    let stored = repositories::insert(&state.pool, &record)
        .await
        .map_err(ApiError::from_sqlite)?;

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), stored.id());
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&location)
        .map_err(|e| ApiError::internal(format!("Invalid location header: {}", e)))?;
    headers.insert(header::LOCATION, value);

    Ok((StatusCode::CREATED, headers, Json(stored)))
}

/// Insert many records in one transaction
pub async fn create_batch<R: Dataset>(
    State(state): State<DatasetApiState>,
    RecordJson(records): RecordJson<Vec<R>>,
) -> Result<Json<Vec<R>>, ApiError> {
    if records.is_empty() {
        return Err(ApiError::bad_request(
            "EMPTY_BATCH",
            format!("No {} records provided", R::NAME),
        ));
    }

    let stored = repositories::insert_batch(&state.pool, &records)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(Json(stored))
}

/// Replace every field of an existing record
pub async fn update_record<R: Dataset>(
    State(state): State<DatasetApiState>,
    path: RecordPath,
    RecordJson(record): RecordJson<R>,
) -> Result<StatusCode, ApiError> {
    let updated = repositories::update(&state.pool, path.id, &record)
        .await
        .map_err(ApiError::from_sqlite)?;

    if updated {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<R>(path.id))
    }
}

/// Update records with a known id and insert the rest, in one transaction
pub async fn upsert_batch<R: Dataset>(
    State(state): State<DatasetApiState>,
    RecordJson(records): RecordJson<Vec<R>>,
) -> Result<StatusCode, ApiError> {
    repositories::upsert_batch(&state.pool, &records)
        .await
        .map_err(ApiError::from_sqlite)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_record<R: Dataset>(
    State(state): State<DatasetApiState>,
    path: RecordPath,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::delete::<R>(&state.pool, path.id)
        .await
        .map_err(ApiError::from_sqlite)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<R>(path.id))
    }
}
