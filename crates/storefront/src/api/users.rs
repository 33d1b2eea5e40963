//! Authentication and user account endpoints.

use reqwest::Method;
use tracing::instrument;
use voltmart_core::UserId;

use super::wire::{
    DataEnvelope, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, TotalUsers,
    UserWire,
};
use super::{ApiClient, ApiError, LoginOutcome, NewUser, User, UserUpdate};

const DEFAULT_LOGIN_FAILURE: &str = "Invalid email or password.";
const DEFAULT_REGISTER_FAILURE: &str = "Error registering user.";

impl ApiClient {
    /// Exchange credentials for a token and the user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the server's message when the
    /// credentials are refused, either via `status: "fail"` or a 4xx.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let body = LoginRequest { email, password };
        let response: LoginResponse = match self.send_json(Method::POST, &["login"], &body).await {
            Ok(response) => response,
            Err(ApiError::Unauthorized(message) | ApiError::NotFound(message)) => {
                return Err(ApiError::Rejected(message));
            }
            Err(ApiError::Api { status, message }) if status < 500 => {
                return Err(ApiError::Rejected(message));
            }
            Err(e) => return Err(e),
        };

        if response.is_failure() {
            return Err(ApiError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string()),
            ));
        }

        let token = response
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Parse("login response has no token".to_string()))?;
        let user = response
            .data
            .ok_or_else(|| ApiError::Parse("login response has no user".to_string()))?;

        Ok(LoginOutcome {
            token,
            user: user.into(),
        })
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the server's message unless it
    /// answers `status: 1`.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<(), ApiError> {
        let body = RegisterRequest {
            user_name: user.name.trim(),
            user_email: user.email.trim(),
            password: &user.password,
            user_gender: user.gender,
            user_mobile: user.mobile.trim(),
        };
        let response: RegisterResponse = match self.send_json(Method::POST, &["addUser"], &body).await {
            Ok(response) => response,
            Err(ApiError::Api { status, message }) if status < 500 => {
                return Err(ApiError::Rejected(message));
            }
            Err(e) => return Err(e),
        };

        if response.is_success() {
            Ok(())
        } else {
            Err(ApiError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| DEFAULT_REGISTER_FAILURE.to_string()),
            ))
        }
    }

    /// Fetch one user.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &UserId) -> Result<User, ApiError> {
        let envelope: DataEnvelope<Option<UserWire>> =
            self.get(&["singleUser", id.as_str()]).await?;
        envelope
            .data
            .map(User::from)
            .ok_or_else(|| ApiError::NotFound(format!("user {id}")))
    }

    /// Update a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        id: &UserId,
        update: &UserUpdate,
    ) -> Result<Option<String>, ApiError> {
        self.acknowledge(Method::PUT, &["updateUser", id.as_str()], Some(update))
            .await
    }

    /// List every user.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let envelope: DataEnvelope<Vec<UserWire>> = self.get(&["getUser"]).await?;
        Ok(envelope.data.into_iter().map(User::from).collect())
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<Option<String>, ApiError> {
        self.acknowledge::<()>(Method::DELETE, &["deleteUser", id.as_str()], None)
            .await
    }

    /// Number of registered users.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn total_users(&self) -> Result<u64, ApiError> {
        let total: TotalUsers = self.get(&["totalUsers"]).await?;
        Ok(total.total)
    }
}
