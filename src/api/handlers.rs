use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use crate::errors::ErrorResponse;
use crate::metrics::QUERY_VALIDATION_ERRORS_TOTAL;
use crate::model::{Record, Resource, ResourceRegistry};
use crate::query::{PaginationMeta, QueryBuilder, QueryDefaults, QueryError, QueryParams};

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub registry: ResourceRegistry,
    pub query_defaults: QueryDefaults,
    pub instance_id: String,
}

/// List query parameters.
///
/// Any other key filters on the field of the same name: `status=active`
/// matches exactly, `price[gte]=10&price[lte]=50` compares numerically.
#[derive(Debug, utoipa::IntoParams)]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct ListParams {
    /// Case-insensitive text matched against the resource's searchable fields
    pub search_term: Option<String>,
    /// Comma-separated fields; prefix with `-` for descending (default: `-createdAt`)
    pub sort: Option<String>,
    /// Page number, starting at 1 (default: 1)
    pub page: Option<String>,
    /// Records per page (default: 10)
    pub limit: Option<String>,
    /// Comma-separated fields to return; prefix with `-` to leave one out
    pub fields: Option<String>,
    /// Comma-separated fields to leave out of every record
    pub exclude: Option<String>,
}

/// Paginated list response
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse {
    /// Always true for successful responses
    pub success: bool,
    /// Human-readable summary
    pub message: String,
    /// Pagination summary
    pub meta: PaginationMeta,
    /// Records of the current page
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Record>,
}

/// A resource served by the API
#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceSummary {
    /// Name used in `/api/{resource}`
    pub name: String,
    /// Known fields
    pub fields: Vec<String>,
    /// Fields matched by `searchTerm`
    pub searchable_fields: Vec<String>,
}

/// Resource index response
#[derive(Debug, Serialize, ToSchema)]
pub struct ResourceIndexResponse {
    /// Always true for successful responses
    pub success: bool,
    /// Registered resources
    pub data: Vec<ResourceSummary>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "query-adapter",
        "version": env!("CARGO_PKG_VERSION"),
        "instance_id": state.instance_id,
        "resources": state.registry.len(),
        "uptime_seconds": START_TIME.elapsed().as_secs(),
    }))
}

/// List registered resources
#[utoipa::path(
    get,
    path = "/api",
    tag = "resources",
    responses(
        (status = 200, description = "Registered resources", body = ResourceIndexResponse)
    )
)]
pub async fn list_resources(State(state): State<AppState>) -> impl IntoResponse {
    let data = state
        .registry
        .iter()
        .map(|resource| ResourceSummary {
            name: resource.name.clone(),
            fields: resource.fields.clone(),
            searchable_fields: resource.searchable_fields.clone(),
        })
        .collect();

    Json(ResourceIndexResponse {
        success: true,
        data,
    })
}

/// Search, filter, sort, paginate and project the records of a resource
#[utoipa::path(
    get,
    path = "/api/{resource}",
    tag = "resources",
    params(
        ("resource" = String, Path, description = "Resource name"),
        ListParams
    ),
    responses(
        (status = 200, description = "Page of records", body = ListResponse),
        (status = 400, description = "Invalid filter value", body = ErrorResponse),
        (status = 404, description = "Unknown resource", body = ErrorResponse),
        (status = 503, description = "Model unavailable", body = ErrorResponse)
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    Path(resource_name): Path<String>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let params = QueryParams::from_pairs(pairs);
    info!(resource = %resource_name, params = params.len(), "List request");

    let resource = match state.registry.get(&resource_name) {
        Some(resource) => resource,
        None => {
            info!("Resource not found: {}", resource_name);
            return ErrorResponse::resource_not_found(resource_name).into_response();
        }
    };

    match run_list_query(resource, params, &state.query_defaults).await {
        Ok((meta, data)) => {
            info!(
                "List returned {} {} (page {}/{}), {} total matches",
                data.len(),
                resource_name,
                meta.page,
                meta.total_page,
                meta.total
            );

            let response = ListResponse {
                success: true,
                message: format!("{} retrieved successfully", resource_name),
                meta,
                data,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            match &e {
                QueryError::InvalidFilterValue { operator } => {
                    warn!(resource = %resource_name, operator = %operator, "Rejected filter value");
                    QUERY_VALIDATION_ERRORS_TOTAL
                        .with_label_values(&[resource_name.as_str()])
                        .inc();
                }
                QueryError::Model(inner) => {
                    error!(resource = %resource_name, "List failed: {:#}", inner);
                }
            }
            ErrorResponse::from(e).into_response()
        }
    }
}

/// Run the builder steps in their required order
async fn run_list_query(
    resource: &Resource,
    params: QueryParams,
    defaults: &QueryDefaults,
) -> Result<(PaginationMeta, Vec<Record>), QueryError> {
    let mut builder = QueryBuilder::with_defaults(
        resource.model.clone(),
        params,
        resource.fields.iter().cloned(),
        defaults.clone(),
    )
    .search(resource.searchable_fields.as_slice())
    .filter()?
    .sort()
    .paginate()
    .fields()
    .exclude();

    let data = builder.execute().await?;
    let meta = builder.count_total().await?;
    Ok((meta, data))
}
