use thiserror::Error;

use crate::database::manager::DatabaseError;

/// Failures of the listing engine.
///
/// Everything except the store variants is a deterministic validation error
/// raised before any query runs; the store variants are infrastructure
/// failures and must not be shown to clients verbatim.
#[derive(Debug, Error)]
pub enum FilterError {
    // Request-shape errors (parser)
    #[error("Query parameter '{0}' must be provided at most once")]
    RepeatedParameter(&'static str),

    #[error("'{value}' is not a valid '{param}' value")]
    InvalidPagingValue { param: &'static str, value: String },

    #[error("Page size {requested} exceeds the maximum of {max}")]
    PageSizeTooLarge { requested: i32, max: i32 },

    #[error("'{0}' is not a valid sorting expression")]
    InvalidSortExpression(String),

    #[error("'{0}' is not a valid sorting direction")]
    InvalidSortDirection(String),

    #[error("'{0}' is not a valid filter parameter")]
    MalformedParameter(String),

    #[error("'{0}' is not a known filtering operator")]
    UnknownOperator(String),

    // Schema errors (field registry)
    #[error("Filtering by '{0}' is not supported")]
    FieldNotFilterable(String),

    #[error("'{operator}' operator is not supported for '{field}' filter")]
    OperatorNotSupported {
        field: String,
        operator: &'static str,
    },

    #[error("Sorting by '{0}' is not supported")]
    FieldNotSortable(String),

    // Conversion errors (value converter)
    #[error("Cannot convert '{value}' to {kind} ('{field}')")]
    ValueConversion {
        field: String,
        value: String,
        kind: &'static str,
    },

    #[error("'{0}' filter requires at least one value")]
    EmptyValueList(String),

    // Infrastructure
    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl FilterError {
    /// Validation errors are caller-facing (4xx); the rest is infrastructure.
    pub fn is_validation(&self) -> bool {
        !matches!(self, FilterError::Store(_) | FilterError::Database(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_offending_input() {
        let err = FilterError::FieldNotFilterable("unknownField".to_string());
        assert_eq!(err.to_string(), "Filtering by 'unknownField' is not supported");

        let err = FilterError::OperatorNotSupported {
            field: "userName".to_string(),
            operator: "in",
        };
        assert_eq!(
            err.to_string(),
            "'in' operator is not supported for 'userName' filter"
        );

        let err = FilterError::ValueConversion {
            field: "customerId".to_string(),
            value: "abc".to_string(),
            kind: "Long",
        };
        assert_eq!(err.to_string(), "Cannot convert 'abc' to Long ('customerId')");
    }

    #[test]
    fn store_failures_are_not_validation() {
        assert!(FilterError::RepeatedParameter("page").is_validation());
        assert!(!FilterError::Database(sqlx::Error::PoolClosed).is_validation());
    }
}
