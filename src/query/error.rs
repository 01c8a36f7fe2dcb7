use thiserror::Error;

/// Failures surfaced by [`QueryBuilder`](super::QueryBuilder)
#[derive(Debug, Error)]
pub enum QueryError {
    /// A value under a filter operator (`price[gte]=abc`) is not a number
    #[error("The value field in the {operator} should be a number")]
    InvalidFilterValue { operator: String },

    /// The model handle failed; propagated as-is
    #[error("Model call failed: {0}")]
    Model(#[from] anyhow::Error),
}

impl QueryError {
    /// HTTP status the error maps to
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidFilterValue { .. } => 400,
            Self::Model(_) => 503,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_value_message() {
        let err = QueryError::InvalidFilterValue {
            operator: "gte".to_string(),
        };
        assert_eq!(err.to_string(), "The value field in the gte should be a number");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_model_error_from_anyhow() {
        let err: QueryError = anyhow::anyhow!("connection refused").into();
        assert_eq!(err.status_code(), 503);
        assert!(err.to_string().contains("connection refused"));
    }
}
