//! Client-side cart store.
//!
//! The store owns the session's [`CartState`] and keeps it in lockstep with
//! the remote cart service:
//!
//! - Every mutation is followed by a full re-fetch; nothing is patched
//!   locally, so server-side rules (stock limits, merging) always win.
//! - Every fetch takes a ticket from a monotonically increasing counter. A
//!   response is installed only if no newer fetch or reset has been installed,
//!   so a slow stale response can never overwrite a fresher one.
//! - Failures never escape. They are logged, turned into notifications, and
//!   the operation reports an [`Outcome`].
//!
//! Construct one store at startup and share it by reference (usually in an
//! `Arc`); every consumer reads and writes through it.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use eshop_core::{CartState, Product, ProductId, UserId};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::api::conversions::convert_cart;
use crate::api::{AddItemRequest, CartService};
use crate::error::{CartError, Result};
use crate::notify::{Notification, Notifier};

/// How a store operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The request was sent and accepted, and the cart was reconciled.
    Applied,
    /// The call was a silent no-op (e.g. a quantity below one).
    Skipped,
    /// Invalid input was rejected locally. Nothing was sent.
    Rejected,
    /// The cart service failed or timed out.
    Failed,
}

/// Cart state plus the ticket of the fetch that produced it.
struct Tracked {
    cart: CartState,
    ticket: u64,
    user_id: Option<UserId>,
}

/// The session's cart, synchronized with a [`CartService`].
pub struct CartStore<S, N> {
    pub(crate) service: S,
    pub(crate) notifier: N,
    state: RwLock<Tracked>,
    next_ticket: AtomicU64,
    in_flight: AtomicUsize,
}

/// Marks a fetch as outstanding for as long as it lives.
///
/// Decrementing on drop keeps `is_loading` correct even when the fetching
/// future is cancelled mid-flight.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<S: CartService, N: Notifier> CartStore<S, N> {
    /// Create a store with an empty cart and no session identity.
    ///
    /// Call [`CartStore::fetch_cart`] to load the server's cart.
    pub fn new(service: S, notifier: N) -> Self {
        Self {
            service,
            notifier,
            state: RwLock::new(Tracked {
                cart: CartState::empty(),
                ticket: 0,
                user_id: None,
            }),
            next_ticket: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Attach the session identity used to scope bulk clears.
    #[must_use]
    pub fn with_user(mut self, user_id: Option<UserId>) -> Self {
        self.state.get_mut().user_id = user_id;
        self
    }

    /// Replace the session identity (sign in or out).
    pub async fn set_user(&self, user_id: Option<UserId>) {
        self.state.write().await.user_id = user_id;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Copy of the current cart, with `is_loading` reflecting outstanding fetches.
    pub async fn snapshot(&self) -> CartState {
        let mut cart = self.state.read().await.cart.clone();
        cart.set_loading(self.is_loading());
        cart
    }

    /// Sum of all line quantities (header badge).
    pub async fn item_count(&self) -> u64 {
        self.state.read().await.cart.item_count()
    }

    /// `sum(price * quantity)` over current items, at full precision.
    pub async fn cart_total(&self) -> Decimal {
        self.state.read().await.cart.total()
    }

    /// Whether any fetch round trip is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Replace local state with the server's cart.
    ///
    /// On failure the cart is replaced with an empty one and an error
    /// notification is sent. Either way the returned snapshot's item count
    /// equals the sum of its quantities.
    #[instrument(skip(self))]
    pub async fn fetch_cart(&self) -> CartState {
        let ticket = self.take_ticket();
        let loading = LoadingGuard::enter(&self.in_flight);

        let cart = match self.service.get_cart().await {
            Ok(response) => convert_cart(response),
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "Failed to fetch cart");
                self.notifier.notify(Notification::error("Failed to load cart"));
                CartState::empty()
            }
        };

        self.install(ticket, cart).await;
        drop(loading);
        self.snapshot().await
    }

    /// Tear down the cart on logout or unmount. No request is sent.
    ///
    /// Any fetch still in flight is discarded when it lands.
    pub async fn reset(&self) {
        let ticket = self.take_ticket();
        self.install(ticket, CartState::empty()).await;
    }

    fn take_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install `cart` unless a newer ticket has already been installed.
    async fn install(&self, ticket: u64, cart: CartState) {
        let mut state = self.state.write().await;
        if ticket > state.ticket {
            state.ticket = ticket;
            state.cart = cart;
        } else {
            debug!(ticket, installed = state.ticket, "Discarding stale cart response");
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of `product`, then reconcile.
    ///
    /// `quantity` must be at least 1 and the product must have an id.
    #[instrument(skip(self, product), fields(product_id = %product.product_id))]
    pub async fn add_to_cart(&self, product: &Product, quantity: i64) -> Outcome {
        match self.try_add(product, quantity).await {
            Ok(()) => {
                self.notifier.notify(Notification::success(format!(
                    "{quantity} {} added to cart!",
                    product.name
                )));
                Outcome::Applied
            }
            Err(e) => self.fail(&e, "Failed to add item to cart"),
        }
    }

    async fn try_add(&self, product: &Product, quantity: i64) -> Result<()> {
        if product.product_id.is_blank() {
            return Err(CartError::InvalidInput("Product ID is missing".to_string()));
        }
        let quantity = positive_quantity(quantity)?;

        let request = AddItemRequest {
            product_id: product.product_id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
            category: product.category.clone(),
        };
        self.service.add_item(&request).await?;
        self.fetch_cart().await;
        Ok(())
    }

    /// Remove a product's line, then reconcile.
    ///
    /// A blank id is rejected with an error notification and sends nothing.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: &ProductId) -> Outcome {
        match self.try_remove(product_id).await {
            Ok(()) => {
                self.notifier
                    .notify(Notification::success("Item removed from cart"));
                Outcome::Applied
            }
            Err(e) => self.fail(&e, "Failed to remove item from cart"),
        }
    }

    async fn try_remove(&self, product_id: &ProductId) -> Result<()> {
        if product_id.is_blank() {
            return Err(CartError::InvalidInput(
                "No product ID provided for removal".to_string(),
            ));
        }
        self.service.remove_item(product_id).await?;
        self.fetch_cart().await;
        Ok(())
    }

    /// Set a product's quantity, then reconcile.
    ///
    /// A quantity below 1 is a silent no-op: removing a line goes through
    /// [`CartStore::remove_from_cart`] instead.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_quantity(&self, product_id: &ProductId, quantity: i64) -> Outcome {
        if quantity < 1 {
            debug!(quantity, "Ignoring quantity update below 1");
            return Outcome::Skipped;
        }
        match self.try_update(product_id, quantity).await {
            Ok(()) => Outcome::Applied,
            Err(e) => self.fail(&e, "Failed to update quantity"),
        }
    }

    async fn try_update(&self, product_id: &ProductId, quantity: i64) -> Result<()> {
        if product_id.is_blank() {
            return Err(CartError::InvalidInput(
                "No product ID provided for quantity update".to_string(),
            ));
        }
        let quantity = positive_quantity(quantity)?;
        self.service.update_quantity(product_id, quantity).await?;
        self.fetch_cart().await;
        Ok(())
    }

    /// Empty the cart with one bulk request scoped to the session identity.
    ///
    /// On success local state is reset to empty, unless a fetch started after
    /// the clear has already installed something newer. On failure the cart
    /// is re-fetched so it shows whatever the server actually kept.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self) -> Outcome {
        let user_id = self.state.read().await.user_id.clone();
        // Ticket taken before the request: a fetch that lands while the
        // clear is in flight is newer than the cleared state.
        let ticket = self.take_ticket();

        match self.service.clear(user_id.as_ref()).await {
            Ok(()) => {
                self.install(ticket, CartState::empty()).await;
                self.notifier.notify(Notification::success("Cart cleared"));
                Outcome::Applied
            }
            Err(e) => {
                let e = CartError::from(e);
                let outcome = self.fail(&e, "Failed to clear cart");
                self.fetch_cart().await;
                outcome
            }
        }
    }

    /// Log `error` and turn it into an error notification.
    pub(crate) fn fail(&self, error: &CartError, fallback: &str) -> Outcome {
        let outcome = match error {
            CartError::Api(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "{fallback}");
                Outcome::Failed
            }
            CartError::InvalidInput(_) | CartError::EmptyCart => {
                warn!(error = %error, "Rejected cart operation");
                Outcome::Rejected
            }
        };
        self.notifier
            .notify(Notification::error(error.user_message(fallback)));
        outcome
    }
}

/// Validate a caller-supplied quantity.
fn positive_quantity(quantity: i64) -> Result<u32> {
    if quantity < 1 {
        return Err(CartError::InvalidInput(
            "Quantity must be at least 1".to_string(),
        ));
    }
    u32::try_from(quantity).map_err(|_| {
        CartError::InvalidInput(format!("Quantity must be at most {}", u32::MAX))
    })
}
