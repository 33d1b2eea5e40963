//! Unified error handling for the admin console.

use thiserror::Error;
use voltmart_core::validation::FieldErrors;
use voltmart_storefront::api::ApiError;
use voltmart_storefront::error::AppError;

/// Errors raised by admin view models.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// One or more form fields are invalid; nothing was sent.
    #[error("{0}")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<FieldErrors> for AdminError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Api(ApiError::NotFound(message)) | AdminError::NotFound(message) => {
                Self::NotFound(message)
            }
            AdminError::Api(e) => Self::Api(e),
            AdminError::Validation(errors) => Self::Validation(errors),
        }
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use voltmart_storefront::error::ErrorKind;

    use super::*;

    #[test]
    fn test_conversion_keeps_kind() {
        let err: AppError = AdminError::NotFound("category c1".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: AppError = AdminError::Api(ApiError::NotFound("order".to_string())).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: AppError = AdminError::Validation(FieldErrors::new()).into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
