//! Maps domain/storage errors onto the JSON-RPC wire taxonomy (spec.md §7).
//! This is the one place a `DomainError`/`DbError` is allowed to become a
//! wire error code - everywhere else they stay typed.

use movies_core::DomainError;
use movies_db::DbError;
use serde_json::json;

use super::envelope::{ErrorCode, JsonRpcError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<AppError> for JsonRpcError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(domain_err) => domain_error_to_rpc(&domain_err),
            AppError::Db(DbError::Domain(domain_err)) => domain_error_to_rpc(&domain_err),
            AppError::Db(db_err) => {
                JsonRpcError::new(ErrorCode::InternalError, format!("storage failure: {db_err}"))
            }
            AppError::Internal(message) => JsonRpcError::new(ErrorCode::InternalError, message),
        }
    }
}

fn domain_error_to_rpc(err: &DomainError) -> JsonRpcError {
    let data = err.field().map(|field| {
        json!({
            "errors": [{
                "field": field,
                "code": domain_error_code(err),
                "message": err.to_string(),
            }]
        })
    });

    let code = if err.is_input_error() {
        ErrorCode::InvalidParams
    } else {
        ErrorCode::InternalError
    };

    match data {
        Some(data) => JsonRpcError::with_data(code, err.to_string(), data),
        None => JsonRpcError::new(code, err.to_string()),
    }
}

/// A machine code for a domain error, used in the structured `error.data`
/// validation-style payload alongside schema validation errors.
fn domain_error_code(err: &DomainError) -> &'static str {
    match err {
        DomainError::Empty { .. } => "REQUIRED",
        DomainError::OutOfRange { message, .. } if message.contains("VALUE_TOO_LARGE") => "VALUE_TOO_LARGE",
        DomainError::OutOfRange { message, .. } if message.contains("VALUE_TOO_SMALL") => "VALUE_TOO_SMALL",
        DomainError::OutOfRange { .. } => "OUT_OF_RANGE",
        DomainError::BadUrl { .. } => "BAD_URL",
        DomainError::NotFound { .. } => "NOT_FOUND",
        DomainError::Conflict { .. } => "CONFLICT",
        DomainError::Validation { .. } => "VALIDATION",
        DomainError::Infrastructure { .. } => "INTERNAL",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_too_large_maps_to_invalid_params_with_field() {
        let err = DomainError::out_of_range("rating", "VALUE_TOO_LARGE: must be <= 10.0");
        let rpc: JsonRpcError = AppError::from(err).into();
        assert_eq!(rpc.code, ErrorCode::InvalidParams.as_i32());
        let data = rpc.data.unwrap();
        assert_eq!(data["errors"][0]["field"], "rating");
        assert_eq!(data["errors"][0]["code"], "VALUE_TOO_LARGE");
    }

    #[test]
    fn not_found_maps_to_invalid_params() {
        let err = DomainError::not_found("movie", "5");
        let rpc: JsonRpcError = AppError::from(err).into();
        assert_eq!(rpc.code, ErrorCode::InvalidParams.as_i32());
    }

    #[test]
    fn infrastructure_failure_maps_to_internal_error_not_invalid_params() {
        let err = DomainError::infrastructure("connection closed mid-query");
        let rpc: JsonRpcError = AppError::from(err).into();
        assert_eq!(rpc.code, ErrorCode::InternalError.as_i32());
    }
}
