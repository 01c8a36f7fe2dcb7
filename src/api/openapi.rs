use utoipa::OpenApi;

use crate::api::handlers::{ListResponse, ResourceIndexResponse, ResourceSummary};
use crate::errors::{ErrorCode, ErrorDetail, ErrorResponse};
use crate::query::PaginationMeta;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Query Adapter",
        version = "0.1.0",
        description = "Turns URL query strings into search, filter, sort, pagination and projection options for a data model, and serves paginated record lists with total counts.",
        contact(
            name = "Query Adapter API",
        )
    ),
    paths(
        crate::api::handlers::health,
        crate::api::handlers::list_resources,
        crate::api::handlers::list_records,
    ),
    components(
        schemas(
            ListResponse,
            PaginationMeta,
            ResourceIndexResponse,
            ResourceSummary,
            ErrorResponse,
            ErrorDetail,
            ErrorCode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "resources", description = "Resource listing and list queries"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_query_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/api"));
        assert!(doc.paths.paths.contains_key("/api/{resource}"));
    }
}
