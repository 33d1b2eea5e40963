//! Command implementations, one module per area of the app.

pub mod account;
pub mod admin;
pub mod shop;

pub use account::{OrdersAction, ProfileAction, RegisterArgs};
pub use admin::AdminSection;
pub use shop::{CartAction, CheckoutArgs};

use voltmart_storefront::api::ApiClient;
use voltmart_storefront::config::StorefrontConfig;
use voltmart_storefront::error::Result;
use voltmart_storefront::session::SessionStore;

/// Everything a command needs: configuration and an API client bound to the
/// on-disk session.
pub struct Context {
    pub config: StorefrontConfig,
    pub api: ApiClient,
}

impl Context {
    /// Open the session file and build the API client.
    ///
    /// # Errors
    ///
    /// Returns error if the session file is unreadable or the API base URL
    /// is unusable.
    pub fn new(config: StorefrontConfig) -> Result<Self> {
        let session = SessionStore::with_file(config.session_file.clone())?;
        let api = ApiClient::new(&config, session)?;
        tracing::debug!(
            api = %api.base_url(),
            session_file = %config.session_file.display(),
            "Client ready"
        );
        Ok(Self { config, api })
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }
}
