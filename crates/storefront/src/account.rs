//! Login, registration, profile and order history.

use std::str::FromStr;

use thiserror::Error;
use tracing::instrument;
use voltmart_core::validation::{FieldErrors, ProfileField, RegistrationForm, validate_login};
use voltmart_core::{Gender, OrderId, OrderStatus, UserId, UserRole};

use crate::api::{ApiClient, ApiError, LoginOutcome, NewUser, Order, User, UserUpdate};
use crate::error::{ErrorKind, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::session::{Scope, SessionError, SessionStore, keys};

/// Errors raised by account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// One or more form fields are invalid; nothing was sent.
    #[error("{0}")]
    Validation(FieldErrors),

    /// No user id or token in the session.
    #[error("User ID or Token is missing!")]
    Unauthenticated,

    /// The order is not in the loaded history.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// Delivered or already cancelled orders cannot be cancelled.
    #[error("Order {id} cannot be cancelled ({status})")]
    NotCancellable { id: OrderId, status: OrderStatus },

    /// The server refused or the request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not be written.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AccountError {
    /// Presentation category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::NotCancellable { .. } => ErrorKind::Validation,
            Self::Unauthenticated => ErrorKind::Authentication,
            Self::OrderNotFound(_) => ErrorKind::NotFound,
            Self::Api(e) => ErrorKind::of_api(e),
            Self::Session(_) => ErrorKind::Api,
        }
    }
}

/// Where the front end goes after a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landing {
    AdminConsole,
    Home,
}

impl From<UserRole> for Landing {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Admin => Self::AdminConsole,
            UserRole::Customer => Self::Home,
        }
    }
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.mobile.clone(),
            gender: user.gender.map(|g| g.as_str().to_owned()).unwrap_or_default(),
        }
    }
}

impl ProfileForm {
    /// # Errors
    ///
    /// Returns the failing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            (ProfileField::Name, &self.name),
            (ProfileField::Phone, &self.phone),
            (ProfileField::Email, &self.email),
        ] {
            errors.record(field.key(), field.check(value));
        }
        errors.into_result()
    }
}

/// Account operations for the current session.
#[derive(Debug, Clone)]
pub struct Account {
    api: ApiClient,
}

impl Account {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// Log in and store the user's profile and token in the persistent
    /// scope.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] without a network call when
    /// either field is empty, or the API error (credentials refused arrive as
    /// [`ApiError::Rejected`] with the server's message).
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Landing, AccountError> {
        validate_login(email, password).map_err(AccountError::Validation)?;

        let outcome = self.api.login(email.trim(), password).await?;
        self.store_login(&outcome)?;

        let user = &outcome.user;
        set_sentry_user(&user.id, Some(&user.email));
        add_breadcrumb("auth", "Logged in", None);
        tracing::info!(user_id = %user.id, role = %user.role, "Login successful");
        Ok(user.role.into())
    }

    /// Write every login key, or none: a failed write wipes the keys already
    /// written so the session never holds a user without a token.
    fn store_login(&self, outcome: &LoginOutcome) -> Result<(), AccountError> {
        let user = &outcome.user;
        let session = self.session();
        let written = [
            (keys::USER_ID, user.id.as_str()),
            (keys::NAME, user.name.as_str()),
            (keys::EMAIL, user.email.as_str()),
            (keys::PHONE, user.mobile.as_str()),
            (keys::GENDER, user.gender.map_or("", Gender::as_str)),
            (keys::USER_ROLE, user.role.as_str()),
            (keys::TOKEN, outcome.token.as_str()),
        ]
        .into_iter()
        .try_for_each(|(key, value)| session.set(key, value, Scope::Persistent));

        if let Err(e) = written {
            tracing::error!(error = %e, "Failed to store login, rolling back session");
            if let Err(cleanup) = session.clear() {
                tracing::warn!(error = %cleanup, "Session rollback incomplete");
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Create an account. Nothing is sent unless the whole form is valid.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] or the API error.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: &RegistrationForm) -> Result<(), AccountError> {
        form.validate().map_err(AccountError::Validation)?;
        let gender = Gender::from_str(&form.gender).map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.record("gender", Some("Please select a gender.".to_owned()));
            AccountError::Validation(errors)
        })?;

        self.api
            .register(&NewUser {
                name: form.name.clone(),
                email: form.email.clone(),
                password: form.password.clone(),
                gender,
                mobile: form.mobile.clone(),
            })
            .await?;
        tracing::info!("Registration successful");
        Ok(())
    }

    /// Forget the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the persistent store cannot be written.
    pub fn logout(&self) -> Result<(), AccountError> {
        self.session().clear()?;
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        tracing::info!("Logged out");
        Ok(())
    }

    fn require_user(&self) -> Result<UserId, AccountError> {
        match (self.session().user_id(), self.session().token()) {
            (Some(user_id), Some(_)) => Ok(user_id),
            _ => Err(AccountError::Unauthenticated),
        }
    }

    /// The logged-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Unauthenticated`] without a user id and token,
    /// or the API error.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, AccountError> {
        let user_id = self.require_user()?;
        Ok(self.api.get_user(&user_id).await?)
    }

    /// Save profile changes and mirror them into the session.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::Validation`] without a network call, then the
    /// same errors as [`Self::profile`].
    #[instrument(skip(self, form))]
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<(), AccountError> {
        form.validate().map_err(AccountError::Validation)?;
        let user_id = self.require_user()?;

        let update = UserUpdate {
            name: form.name.trim().to_owned(),
            email: Some(form.email.trim().to_owned()),
            mobile: form.phone.trim().to_owned(),
            gender: form.gender.trim().to_owned(),
        };
        self.api.update_user(&user_id, &update).await?;

        let session = self.session();
        for (key, value) in [
            (keys::NAME, update.name.as_str()),
            (keys::EMAIL, form.email.trim()),
            (keys::PHONE, update.mobile.as_str()),
            (keys::GENDER, update.gender.as_str()),
        ] {
            session.set(key, value, Scope::Persistent)?;
        }
        tracing::info!(user_id = %user_id, "Profile updated");
        Ok(())
    }

    /// The logged-in user's order history.
    ///
    /// # Errors
    ///
    /// Same as [`Self::profile`].
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<OrderHistory, AccountError> {
        let user_id = self.require_user()?;
        let orders = self.api.user_orders(&user_id).await?;
        Ok(OrderHistory {
            api: self.api.clone(),
            orders,
        })
    }
}

/// A user's orders, newest as returned by the server.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    api: ApiClient,
    orders: Vec<Order>,
}

impl OrderHistory {
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Whether the cancel action applies to an order.
    #[must_use]
    pub const fn can_cancel(order: &Order) -> bool {
        !order.status.is_final()
    }

    /// Cancel an order and drop it from the list. Returns the server's message.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::OrderNotFound`] or
    /// [`AccountError::NotCancellable`] without a network call, or the API
    /// error (the list is then unchanged).
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn cancel(&mut self, id: &OrderId) -> Result<Option<String>, AccountError> {
        let order = self
            .orders
            .iter()
            .find(|order| &order.id == id)
            .ok_or_else(|| AccountError::OrderNotFound(id.clone()))?;
        if !Self::can_cancel(order) {
            return Err(AccountError::NotCancellable {
                id: id.clone(),
                status: order.status,
            });
        }

        let message = self.api.cancel_order(id).await?;
        self.orders.retain(|order| &order.id != id);
        tracing::info!("Order cancelled");
        Ok(message)
    }
}
