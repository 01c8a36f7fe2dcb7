use serde::{Deserialize, Serialize};

/// Fallbacks applied when a request leaves a setting out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefaults {
    /// Page used when `page` is absent or invalid
    pub page: u64,

    /// Page size used when `limit` is absent or invalid
    pub limit: u64,

    /// Field sorted descending when `sort` is absent
    pub sort_field: String,

    /// Primary key of every model; always part of the known field list
    pub primary_key: String,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_field: "createdAt".to_string(),
            primary_key: "id".to_string(),
        }
    }
}

impl QueryDefaults {
    /// Create defaults from environment variables
    pub fn from_env() -> Self {
        let fallback = Self::default();
        Self {
            page: std::env::var("QUERY_DEFAULT_PAGE")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback.page),
            limit: std::env::var("QUERY_DEFAULT_LIMIT")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback.limit),
            sort_field: std::env::var("QUERY_DEFAULT_SORT_FIELD")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback.sort_field),
            primary_key: std::env::var("QUERY_PRIMARY_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(fallback.primary_key),
        }
    }
}
