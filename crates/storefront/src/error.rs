//! Unified error handling with Sentry integration.
//!
//! Every view model returns its own error enum; the front end converts them
//! into [`AppError`] and calls [`AppError::report`] before showing
//! [`AppError::user_message`].

use thiserror::Error;
use voltmart_core::PagerError;
use voltmart_core::validation::FieldErrors;

use crate::account::AccountError;
use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// How a failure should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Local, field-scoped; never reached the network.
    Validation,
    /// No session; the caller should send the user to login.
    Authentication,
    /// Non-2xx or transport failure; shown as a dismissible message.
    Api,
    /// Rendered inline.
    NotFound,
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Login, registration or profile operation failed.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Requested page is out of range.
    #[error(transparent)]
    Pager(#[from] PagerError),

    /// One or more form fields are invalid.
    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not logged in.
    #[error("Not logged in")]
    Unauthenticated,
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl ErrorKind {
    /// Classify a remote API failure.
    #[must_use]
    pub const fn of_api(error: &ApiError) -> Self {
        match error {
            ApiError::Unauthorized(_) => Self::Authentication,
            ApiError::NotFound(_) => Self::NotFound,
            _ => Self::Api,
        }
    }
}

impl AppError {
    /// Presentation category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Api(e) => ErrorKind::of_api(e),
            Self::Cart(e) => e.kind(),
            Self::Checkout(e) => e.kind(),
            Self::Account(e) => e.kind(),
            Self::Validation(_) | Self::Pager(_) | Self::Config(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthenticated => ErrorKind::Authentication,
            Self::Session(_) => ErrorKind::Api,
        }
    }

    /// The underlying API error, if any.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e)
            | Self::Cart(CartError::Api(e))
            | Self::Checkout(CheckoutError::Api(e))
            | Self::Account(AccountError::Api(e)) => Some(e),
            _ => None,
        }
    }

    /// Per-field messages of a rejected form, if any.
    #[must_use]
    pub const fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors)
            | Self::Checkout(CheckoutError::InvalidAddress(errors))
            | Self::Account(AccountError::Validation(errors)) => Some(errors),
            _ => None,
        }
    }

    /// Whether this points at the server, the network or local storage
    /// rather than at something the user did.
    #[must_use]
    pub fn is_server_side(&self) -> bool {
        matches!(
            self,
            Self::Session(_)
                | Self::Cart(CartError::Session(_))
                | Self::Account(AccountError::Session(_))
        ) || self.api_error().is_some_and(ApiError::is_server_side)
    }

    /// Message safe to show the user. Transport and parse details are hidden.
    #[must_use]
    pub fn user_message(&self) -> String {
        if self.is_server_side() {
            return "Something went wrong. Please try again.".to_string();
        }
        if let Some(message) = self.api_error().and_then(ApiError::server_message) {
            return message.to_string();
        }
        match self.kind() {
            ErrorKind::Authentication => "Please log in to continue.".to_string(),
            _ => self.to_string(),
        }
    }

    /// Capture server-side failures to Sentry and log them. User errors are
    /// only logged at debug level.
    pub fn report(&self) {
        if self.is_server_side() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Operation failed"
            );
        } else {
            tracing::debug!(error = %self, kind = ?self.kind(), "Operation rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voltmart_core::ProductId;

    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            AppError::from(CartError::Unauthenticated).kind(),
            ErrorKind::Authentication
        );
        assert_eq!(
            AppError::from(CartError::NotInCart(ProductId::new("p"))).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AppError::from(ApiError::NotFound("order".to_string())).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            AppError::from(ApiError::Unauthorized("expired".to_string())).kind(),
            ErrorKind::Authentication
        );

        let mut errors = FieldErrors::new();
        errors.record("email", Some("Email is required".to_string()));
        assert_eq!(AppError::from(errors).kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_field_errors_reach_through_wrappers() {
        let mut errors = FieldErrors::new();
        errors.record("city", Some("City is required".to_string()));
        let err = AppError::from(CheckoutError::InvalidAddress(errors));
        assert_eq!(err.field_errors().unwrap().get("city"), Some("City is required"));
        assert!(AppError::Unauthenticated.field_errors().is_none());
    }

    #[test]
    fn test_user_message_shows_server_text_for_client_errors() {
        let err = AppError::from(ApiError::Api {
            status: 400,
            message: "Out of stock".to_string(),
        });
        assert_eq!(err.user_message(), "Out of stock");
        assert!(!err.is_server_side());
    }

    #[test]
    fn test_user_message_hides_server_failures() {
        let err = AppError::from(CartError::Api(ApiError::Api {
            status: 503,
            message: "mongo connection refused".to_string(),
        }));
        assert!(err.is_server_side());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");

        let err = AppError::from(ApiError::Parse("expected `data`".to_string()));
        assert!(!err.user_message().contains("data"));
    }

    #[test]
    fn test_authentication_message() {
        assert_eq!(
            AppError::Unauthenticated.user_message(),
            "Please log in to continue."
        );
    }
}
