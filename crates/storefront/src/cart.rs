//! Cart state reconciler.
//!
//! Mirrors the server-side cart for the active session. Local state is for
//! display only: adds refetch the authoritative cart, quantity changes are
//! committed once the server accepts them, and checkout resubmits the items
//! so the order endpoint stays the source of truth for price.
//!
//! Each entry carries an [`EntryState`]. `Updating` is a mutual-exclusion
//! latch: a second update or removal of the same entry while one is in
//! flight is rejected with [`CartError::EntryBusy`] and never reaches the
//! network.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;
use voltmart_core::{ProductId, Quantity, QuantityError, UserId};

use crate::api::{ApiClient, ApiError, CartLine, Product};
use crate::error::{ErrorKind, add_breadcrumb};
use crate::session::{SessionError, SessionStore};

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No user id in the session.
    #[error("Please log in to use the cart")]
    Unauthenticated,

    /// Quantity below 1 (or out of range); rejected before any network call.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The product has no line in the local cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// An update or removal of this entry is already in flight.
    #[error("Cart item {0} is already being updated")]
    EntryBusy(ProductId),

    /// The server refused or the request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The cart count could not be written to the session.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl CartError {
    /// Presentation category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Authentication,
            Self::InvalidQuantity(_) | Self::EntryBusy(_) => ErrorKind::Validation,
            Self::NotInCart(_) => ErrorKind::NotFound,
            Self::Api(e) => ErrorKind::of_api(e),
            Self::Session(_) => ErrorKind::Api,
        }
    }
}

/// Server-side cart operations the reconciler depends on.
///
/// Implemented by [`ApiClient`]; tests substitute fakes.
pub trait CartBackend: Send + Sync {
    /// Authoritative cart lines.
    fn fetch_cart(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// Add units of a product.
    fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Set a line's quantity.
    fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete a line.
    fn remove_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl CartBackend for ApiClient {
    async fn fetch_cart(&self, user_id: &UserId) -> Result<Vec<CartLine>, ApiError> {
        self.get_cart(user_id).await
    }

    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<(), ApiError> {
        self.add_to_cart(user_id, product_id, quantity).await.map(drop)
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<(), ApiError> {
        self.update_cart(user_id, product_id, quantity).await.map(drop)
    }

    async fn remove_item(&self, user_id: &UserId, product_id: &ProductId) -> Result<(), ApiError> {
        self.remove_from_cart(user_id, product_id).await.map(drop)
    }
}

/// Per-entry request state.
///
/// `Idle → Updating → Idle | Error`, and `Error → Updating` on the next
/// attempt. `Updating → Updating` is refused.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EntryState {
    #[default]
    Idle,
    Updating,
    /// Last request failed with this message; the quantity is the last committed one.
    Error(String),
}

/// A cart line as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartEntry {
    pub product: Product,
    /// Last quantity the server accepted.
    pub quantity: Quantity,
    pub state: EntryState,
}

impl CartEntry {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.times(self.quantity)
    }
}

/// Entries plus the ids whose latch is held by a live request.
#[derive(Debug, Default)]
struct CartState {
    entries: Vec<CartEntry>,
    in_flight: HashSet<ProductId>,
}

impl CartState {
    fn entry_mut(&mut self, product_id: &ProductId) -> Option<&mut CartEntry> {
        self.entries
            .iter_mut()
            .find(|entry| &entry.product.id == product_id)
    }
}

/// Local mirror of the server-side cart.
pub struct CartReconciler<B = ApiClient> {
    backend: B,
    session: SessionStore,
    state: Mutex<CartState>,
}

/// Owns an entry's `Updating` latch for the lifetime of one request.
///
/// Dropped while armed (the request future was cancelled), it puts the
/// entry back to `Idle`.
struct Latch<'a, B> {
    cart: &'a CartReconciler<B>,
    product_id: ProductId,
    armed: bool,
}

impl<B> Latch<'_, B> {
    /// Give the latch up under a lock the caller already holds; the caller
    /// sets the entry's final state.
    fn release(mut self, state: &mut CartState) {
        state.in_flight.remove(&self.product_id);
        self.armed = false;
    }
}

impl<B> Drop for Latch<'_, B> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.cart.lock();
        state.in_flight.remove(&self.product_id);
        if let Some(entry) = state
            .entry_mut(&self.product_id)
            .filter(|entry| entry.state == EntryState::Updating)
        {
            entry.state = EntryState::Idle;
        }
        tracing::debug!(product_id = %self.product_id, "Cart request abandoned, entry released");
    }
}

impl<B> CartReconciler<B> {
    fn lock(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<B: CartBackend> CartReconciler<B> {
    /// Empty cart; call [`Self::refresh`] to load it.
    pub fn new(backend: B, session: SessionStore) -> Self {
        Self {
            backend,
            session,
            state: Mutex::new(CartState::default()),
        }
    }

    fn require_user(&self) -> Result<UserId, CartError> {
        self.session.user_id().ok_or(CartError::Unauthenticated)
    }

    /// Replace local entries with the authoritative cart and publish the
    /// line count to the session.
    ///
    /// Entries with a request still in flight keep their `Updating` latch;
    /// every other entry comes back `Idle`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unauthenticated`] without a session user, or the
    /// fetch error.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), CartError> {
        let user_id = self.require_user()?;
        let lines = self.backend.fetch_cart(&user_id).await?;

        let count = {
            let mut state = self.lock();
            let replaced: Vec<CartEntry> = lines
                .into_iter()
                .map(|line| CartEntry {
                    state: if state.in_flight.contains(&line.product.id) {
                        EntryState::Updating
                    } else {
                        EntryState::Idle
                    },
                    product: line.product,
                    quantity: line.quantity,
                })
                .collect();
            state.entries = replaced;
            state.entries.len()
        };

        tracing::debug!(lines = count, "Cart refreshed");
        self.session.set_cart_count(count)?;
        Ok(())
    }

    /// Add one unit of a product, then reload the cart from the server.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Unauthenticated`] (with no network call) when no
    /// user is logged in, or the API error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: &ProductId) -> Result<(), CartError> {
        let user_id = self.require_user()?;
        self.backend
            .add_item(&user_id, product_id, Quantity::ONE)
            .await?;
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));
        self.refresh().await
    }

    /// Set a line's quantity.
    ///
    /// Dropping the returned future before it completes releases the
    /// latch and leaves the last committed quantity.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] for values below 1, before anything else
    /// - [`CartError::NotInCart`] for unknown products
    /// - [`CartError::EntryBusy`] while another request for the line is in flight
    /// - the API error, after which the entry is in [`EntryState::Error`]
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(
        &self,
        product_id: &ProductId,
        new_quantity: i64,
    ) -> Result<(), CartError> {
        let quantity = Quantity::new(new_quantity)?;
        let user_id = self.require_user()?;
        let latch = self.begin(product_id)?;

        let result = self
            .backend
            .set_quantity(&user_id, product_id, quantity)
            .await;

        let mut state = self.lock();
        latch.release(&mut state);
        match (result, state.entry_mut(product_id)) {
            (Ok(()), Some(entry)) => {
                entry.quantity = quantity;
                entry.state = EntryState::Idle;
                drop(state);
                add_breadcrumb(
                    "cart",
                    "Updated quantity",
                    Some(&[("product_id", product_id.as_str())]),
                );
                Ok(())
            }
            // Line vanished during a concurrent refresh; nothing to commit.
            (Ok(()), None) => Ok(()),
            (Err(e), entry) => {
                tracing::warn!(error = %e, "Cart quantity update failed");
                if let Some(entry) = entry {
                    entry.state = EntryState::Error(e.to_string());
                }
                Err(e.into())
            }
        }
    }

    /// Delete a line.
    ///
    /// # Errors
    ///
    /// Same latch and lookup errors as [`Self::update_quantity`]; on an API
    /// failure the entry stays, in [`EntryState::Error`].
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<(), CartError> {
        let user_id = self.require_user()?;
        let latch = self.begin(product_id)?;

        let result = self.backend.remove_item(&user_id, product_id).await;

        let count = {
            let mut state = self.lock();
            latch.release(&mut state);
            if let Err(e) = result {
                tracing::warn!(error = %e, "Cart removal failed");
                if let Some(entry) = state.entry_mut(product_id) {
                    entry.state = EntryState::Error(e.to_string());
                }
                return Err(e.into());
            }
            state.entries.retain(|entry| &entry.product.id != product_id);
            state.entries.len()
        };

        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", product_id.as_str())]));
        self.session.set_cart_count(count)?;
        Ok(())
    }

    /// Move an entry into `Updating`, refusing if a request already holds it.
    fn begin(&self, product_id: &ProductId) -> Result<Latch<'_, B>, CartError> {
        let mut state = self.lock();
        if state.in_flight.contains(product_id) {
            tracing::debug!("Cart entry busy, rejecting");
            return Err(CartError::EntryBusy(product_id.clone()));
        }
        let entry = state
            .entry_mut(product_id)
            .ok_or_else(|| CartError::NotInCart(product_id.clone()))?;
        entry.state = EntryState::Updating;
        state.in_flight.insert(product_id.clone());
        Ok(Latch {
            cart: self,
            product_id: product_id.clone(),
            armed: true,
        })
    }

    /// Sum of `price × quantity` over all entries.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock().entries.iter().map(CartEntry::line_total).sum()
    }

    /// Copy of every entry, in server order.
    #[must_use]
    pub fn entries(&self) -> Vec<CartEntry> {
        self.lock().entries.clone()
    }

    /// State of one entry.
    #[must_use]
    pub fn entry_state(&self, product_id: &ProductId) -> Option<EntryState> {
        self.lock()
            .entries
            .iter()
            .find(|entry| &entry.product.id == product_id)
            .map(|entry| entry.state.clone())
    }

    /// Ids of every product in the cart.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        self.lock()
            .entries
            .iter()
            .map(|entry| entry.product.id.clone())
            .collect()
    }

    /// Number of lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Committed lines, for handing to checkout.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lock()
            .entries
            .iter()
            .map(|entry| CartLine {
                product: entry.product.clone(),
                quantity: entry.quantity,
            })
            .collect()
    }
}

impl<B> std::fmt::Debug for CartReconciler<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("CartReconciler")
            .field("lines", &state.entries.len())
            .field("in_flight", &state.in_flight.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use tokio::sync::Notify;
    use voltmart_core::Price;

    use super::*;
    use crate::session::{Scope, keys};

    pub(crate) fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::inr(Decimal::from(price)).unwrap(),
            category: None,
            brand: "Voltmart".to_string(),
            image: None,
        }
    }

    /// In-memory server cart with call counters and an optional gate that
    /// holds quantity updates until released.
    #[derive(Default)]
    struct FakeBackend {
        server: Mutex<Vec<CartLine>>,
        catalog: Vec<Product>,
        calls: AtomicUsize,
        fail_writes: bool,
        gate: Option<Arc<Notify>>,
    }

    impl FakeBackend {
        fn with_line(product: Product, quantity: i64) -> Self {
            Self {
                server: Mutex::new(vec![CartLine {
                    product: product.clone(),
                    quantity: Quantity::new(quantity).unwrap(),
                }]),
                catalog: vec![product],
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl CartBackend for FakeBackend {
        async fn fetch_cart(&self, _user_id: &UserId) -> Result<Vec<CartLine>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.server.lock().unwrap().clone())
        }

        async fn add_item(
            &self,
            _user_id: &UserId,
            product_id: &ProductId,
            quantity: Quantity,
        ) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let product = self
                .catalog
                .iter()
                .find(|p| &p.id == product_id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(product_id.to_string()))?;
            self.server.lock().unwrap().push(CartLine { product, quantity });
            Ok(())
        }

        async fn set_quantity(
            &self,
            _user_id: &UserId,
            product_id: &ProductId,
            quantity: Quantity,
        ) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_writes {
                return Err(ApiError::Api {
                    status: 400,
                    message: "Out of stock".to_string(),
                });
            }
            for line in self.server.lock().unwrap().iter_mut() {
                if &line.product.id == product_id {
                    line.quantity = quantity;
                }
            }
            Ok(())
        }

        async fn remove_item(
            &self,
            _user_id: &UserId,
            product_id: &ProductId,
        ) -> Result<(), ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes {
                return Err(ApiError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            self.server
                .lock()
                .unwrap()
                .retain(|line| &line.product.id != product_id);
            Ok(())
        }
    }

    fn logged_in_session() -> SessionStore {
        let session = SessionStore::in_memory();
        session.set(keys::USER_ID, "u-1", Scope::Persistent).unwrap();
        session
    }

    async fn loaded(backend: FakeBackend) -> CartReconciler<FakeBackend> {
        let cart = CartReconciler::new(backend, logged_in_session());
        cart.refresh().await.unwrap();
        cart
    }

    #[tokio::test]
    async fn test_update_then_remove_scenario() {
        let p = ProductId::new("P");
        let cart = loaded(FakeBackend::with_line(product("P", 500), 2)).await;
        assert_eq!(cart.total(), Decimal::from(1000));
        assert_eq!(cart.session.cart_count(), 1);

        cart.update_quantity(&p, 3).await.unwrap();
        assert_eq!(cart.total(), Decimal::from(1500));
        assert_eq!(cart.entry_state(&p), Some(EntryState::Idle));

        cart.remove_item(&p).await.unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.session.cart_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_quantity_changes_nothing() {
        let p = ProductId::new("P");
        let cart = loaded(FakeBackend::with_line(product("P", 500), 2)).await;
        let calls = cart.backend.calls();
        let before = cart.entries();

        for bad in [0, -1] {
            assert!(matches!(
                cart.update_quantity(&p, bad).await,
                Err(CartError::InvalidQuantity(_))
            ));
        }

        assert_eq!(cart.backend.calls(), calls);
        assert_eq!(cart.entries(), before);
    }

    #[tokio::test]
    async fn test_add_without_session_makes_no_call() {
        let backend = FakeBackend::with_line(product("P", 500), 1);
        let cart = CartReconciler::new(backend, SessionStore::in_memory());

        let result = cart.add_to_cart(&ProductId::new("P")).await;

        assert!(matches!(result, Err(CartError::Unauthenticated)));
        assert_eq!(cart.backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_add_refetches_authoritative_cart() {
        let mut backend = FakeBackend::with_line(product("P", 500), 1);
        backend.catalog.push(product("Q", 250));
        let cart = loaded(backend).await;

        cart.add_to_cart(&ProductId::new("Q")).await.unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Decimal::from(750));
        assert_eq!(cart.session.cart_count(), 2);
        assert_eq!(cart.product_ids(), vec![ProductId::new("P"), ProductId::new("Q")]);
    }

    #[tokio::test]
    async fn test_second_update_while_in_flight_is_rejected() {
        let gate = Arc::new(Notify::new());
        let mut backend = FakeBackend::with_line(product("P", 500), 2);
        backend.gate = Some(Arc::clone(&gate));
        let cart = loaded(backend).await;
        let p = ProductId::new("P");
        let calls_before = cart.backend.calls();

        let first = cart.update_quantity(&p, 3);
        let second = async {
            tokio::task::yield_now().await;
            assert_eq!(cart.entry_state(&p), Some(EntryState::Updating));
            let result = cart.update_quantity(&p, 4).await;
            gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        first.unwrap();
        assert!(matches!(second, Err(CartError::EntryBusy(_))));
        assert_eq!(cart.backend.calls(), calls_before + 1);
        assert_eq!(cart.total(), Decimal::from(1500));
    }

    #[tokio::test]
    async fn test_abandoned_update_releases_entry() {
        let gate = Arc::new(Notify::new());
        let mut backend = FakeBackend::with_line(product("P", 500), 2);
        backend.gate = Some(Arc::clone(&gate));
        let cart = loaded(backend).await;
        let p = ProductId::new("P");

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), cart.update_quantity(&p, 3)).await;
        assert!(abandoned.is_err());
        assert_eq!(cart.entry_state(&p), Some(EntryState::Idle));
        assert_eq!(cart.total(), Decimal::from(1000));

        cart.refresh().await.unwrap();
        assert_eq!(cart.entry_state(&p), Some(EntryState::Idle));

        gate.notify_one();
        cart.update_quantity(&p, 4).await.unwrap();
        assert_eq!(cart.total(), Decimal::from(2000));
        cart.remove_item(&p).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_keeps_latch_of_live_request() {
        let gate = Arc::new(Notify::new());
        let mut backend = FakeBackend::with_line(product("P", 500), 2);
        backend.gate = Some(Arc::clone(&gate));
        let cart = loaded(backend).await;
        let p = ProductId::new("P");

        let update = cart.update_quantity(&p, 3);
        let refresh = async {
            tokio::task::yield_now().await;
            cart.refresh().await.unwrap();
            let state = cart.entry_state(&p);
            gate.notify_one();
            state
        };
        let (update, during) = tokio::join!(update, refresh);

        update.unwrap();
        assert_eq!(during, Some(EntryState::Updating));
        assert_eq!(cart.entry_state(&p), Some(EntryState::Idle));
        assert_eq!(cart.total(), Decimal::from(1500));
    }

    #[tokio::test]
    async fn test_failed_update_keeps_committed_quantity() {
        let mut backend = FakeBackend::with_line(product("P", 500), 2);
        backend.fail_writes = true;
        let cart = loaded(backend).await;
        let p = ProductId::new("P");

        assert!(matches!(
            cart.update_quantity(&p, 5).await,
            Err(CartError::Api(ApiError::Api { status: 400, .. }))
        ));
        assert_eq!(cart.total(), Decimal::from(1000));
        assert!(matches!(cart.entry_state(&p), Some(EntryState::Error(_))));

        // Error is not a latch: the next attempt goes out again.
        let calls = cart.backend.calls();
        let _ = cart.update_quantity(&p, 4).await;
        assert_eq!(cart.backend.calls(), calls + 1);
    }

    #[tokio::test]
    async fn test_failed_remove_leaves_entry() {
        let mut backend = FakeBackend::with_line(product("P", 500), 1);
        backend.fail_writes = true;
        let cart = loaded(backend).await;
        let p = ProductId::new("P");

        assert!(cart.remove_item(&p).await.is_err());
        assert_eq!(cart.item_count(), 1);
        assert!(matches!(cart.entry_state(&p), Some(EntryState::Error(_))));
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let cart = loaded(FakeBackend::with_line(product("P", 500), 1)).await;
        assert!(matches!(
            cart.update_quantity(&ProductId::new("nope"), 2).await,
            Err(CartError::NotInCart(_))
        ));
        assert!(matches!(
            cart.remove_item(&ProductId::new("nope")).await,
            Err(CartError::NotInCart(_))
        ));
    }
}
