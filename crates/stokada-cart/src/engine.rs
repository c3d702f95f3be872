//! Cart reconciliation engine.
//!
//! The engine owns the cart as a two-tier store: the remote cart service is
//! authoritative, and a local copy keeps working when the service is not
//! reachable. Every mutation follows the same state machine:
//!
//! 1. attempt the operation against the remote service;
//! 2. on success, re-fetch the full authoritative cart and adopt it
//!    wholesale (`source = server`);
//! 3. on a network error or an explicit failure ack, apply the same
//!    mutation to the local copy (`source = local`) and surface a warning
//!    outcome; the operation is never silently dropped.
//!
//! A periodic resync heals a cart left in local mode once connectivity
//! returns. At most one resync is in flight at a time, and a resync only
//! adopts the fetched cart if no user mutation landed while it was
//! fetching: `CartState::revision` is recorded before the fetch and
//! compared at adoption, so user mutations always win.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use stokada_commerce::catalog::{ProductGroup, Variant};
use stokada_commerce::pricing;

use crate::config::CartEngineConfig;
use crate::error::CartError;
use crate::line::{CartLine, CartState, CartSummary, LineKey, SourceOfTruth};
use crate::remote::{AddItemRequest, CartService, CartServiceError, RemoteCart};
use crate::store::{encode_lines, CartStore};

/// Result of a public cart operation.
///
/// Cart operations never propagate errors to the caller; a blocking
/// problem (validation, missing identity) comes back as `success = false`,
/// and a local fallback comes back as `success = true` with
/// `source = Local` and a warning message.
#[derive(Debug, Clone, PartialEq)]
pub struct CartOutcome {
    pub success: bool,
    pub message: String,
    pub source: SourceOfTruth,
}

impl CartOutcome {
    fn server(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            source: SourceOfTruth::Server,
        }
    }

    fn local(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            source: SourceOfTruth::Local,
        }
    }

    fn blocked(message: impl Into<String>, source: SourceOfTruth) -> Self {
        Self {
            success: false,
            message: message.into(),
            source,
        }
    }
}

/// The cart reconciliation engine. See the module docs for the protocol.
pub struct CartEngine {
    config: CartEngineConfig,
    service: Arc<dyn CartService>,
    store: Arc<dyn CartStore>,
    state: Mutex<CartState>,
    changed: watch::Sender<CartState>,
    resync_in_flight: AtomicBool,
}

impl CartEngine {
    /// Create an engine with an empty cart.
    pub fn new(
        service: Arc<dyn CartService>,
        store: Arc<dyn CartStore>,
        config: CartEngineConfig,
    ) -> Self {
        let (changed, _) = watch::channel(CartState::new());
        Self {
            config,
            service,
            store,
            state: Mutex::new(CartState::new()),
            changed,
            resync_in_flight: AtomicBool::new(false),
        }
    }

    /// Observe every settled cart state.
    ///
    /// The receiver always holds the latest snapshot; subscribers (badge,
    /// summary, display) read it instead of recomputing their own copy.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.changed.subscribe()
    }

    /// Snapshot of the last settled state.
    pub async fn snapshot(&self) -> CartState {
        self.state.lock().await.clone()
    }

    /// Summary fold over the last settled state.
    pub async fn summary(&self) -> CartSummary {
        self.state.lock().await.summary(self.config.currency)
    }

    /// Hydrate the cart at session start.
    ///
    /// Adopts the authoritative cart when it is reachable and non-empty;
    /// otherwise reads the persisted local fallback slot back.
    pub async fn init(&self) -> CartOutcome {
        let mut state = self.state.lock().await;
        match self.service.get_cart().await {
            Ok(cart) if cart.success && !cart.items.is_empty() => {
                self.adopt(&mut state, cart);
                CartOutcome::server("Cart loaded")
            }
            Err(CartServiceError::Unauthorized(message)) => {
                CartOutcome::blocked(message, state.source)
            }
            Ok(_) | Err(CartServiceError::Network(_)) => {
                if self.restore_fallback(&mut state) {
                    warn!("cart service unavailable or empty, restored local copy");
                    CartOutcome::local("Cart restored from this device")
                } else {
                    CartOutcome::server("Cart is empty")
                }
            }
        }
    }

    /// Add boxes of one variant/size to the cart.
    pub async fn add_item(
        &self,
        group: &ProductGroup,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> CartOutcome {
        let mut state = self.state.lock().await;

        let variant = match self.validate_add(group, color, size, quantity) {
            Ok(variant) => variant,
            Err(e) => return CartOutcome::blocked(e.to_string(), state.source),
        };
        let assorted = group.base.is_assorted;
        let quote = match pricing::quote(variant, assorted) {
            Ok(quote) => quote,
            Err(e) => return CartOutcome::blocked(e.to_string(), state.source),
        };

        let request = AddItemRequest {
            product_code: group.product_code.clone(),
            color: color.to_string(),
            size: size.to_string(),
            quantity,
        };

        match self.service.add_item(&request).await {
            Ok(ack) if ack.success => match self.fetch_and_adopt(&mut state).await {
                Ok(()) => CartOutcome::server(or_default(ack.message, "Item added to cart")),
                Err(e) => {
                    warn!("cart re-fetch failed after add, keeping local copy: {}", e);
                    self.local_add(&mut state, &request, variant, assorted, quote)
                }
            },
            Ok(ack) => {
                warn!("cart service rejected add ({}), falling back", ack.message);
                self.local_add(&mut state, &request, variant, assorted, quote)
            }
            Err(CartServiceError::Unauthorized(message)) => {
                CartOutcome::blocked(message, state.source)
            }
            Err(CartServiceError::Network(e)) => {
                warn!("cart service unreachable ({}), falling back", e);
                self.local_add(&mut state, &request, variant, assorted, quote)
            }
        }
    }

    /// Set the quantity of a line. A quantity of zero or less removes it.
    pub async fn update_quantity(&self, key: &LineKey, quantity: i64) -> CartOutcome {
        if quantity <= 0 {
            return self.remove_item(key).await;
        }

        let mut state = self.state.lock().await;
        if quantity > self.config.max_quantity_per_line {
            let e = CartError::QuantityExceedsLimit(quantity, self.config.max_quantity_per_line);
            return CartOutcome::blocked(e.to_string(), state.source);
        }
        let remote_id = match state.find(key) {
            Some(line) => line.remote_id.clone(),
            None => {
                let e = CartError::ItemNotInCart(key.to_string());
                return CartOutcome::blocked(e.to_string(), state.source);
            }
        };

        let attempt = match &remote_id {
            Some(cart_id) => Some(self.service.update_item(cart_id, quantity).await),
            None => None,
        };

        match attempt {
            Some(Ok(ack)) if ack.success => match self.fetch_and_adopt(&mut state).await {
                Ok(()) => CartOutcome::server(or_default(ack.message, "Cart updated")),
                Err(e) => {
                    warn!("cart re-fetch failed after update, keeping local copy: {}", e);
                    self.local_update(&mut state, key, quantity)
                }
            },
            Some(Err(CartServiceError::Unauthorized(message))) => {
                CartOutcome::blocked(message, state.source)
            }
            Some(Ok(ack)) => {
                warn!("cart service rejected update ({}), falling back", ack.message);
                self.local_update(&mut state, key, quantity)
            }
            Some(Err(CartServiceError::Network(e))) => {
                warn!("cart service unreachable ({}), falling back", e);
                self.local_update(&mut state, key, quantity)
            }
            // The line was created offline and has no server id yet; the
            // periodic resync reconciles it once the service is back.
            None => self.local_update(&mut state, key, quantity),
        }
    }

    /// Remove a line from the cart.
    pub async fn remove_item(&self, key: &LineKey) -> CartOutcome {
        let mut state = self.state.lock().await;
        let remote_id = match state.find(key) {
            Some(line) => line.remote_id.clone(),
            None => {
                let e = CartError::ItemNotInCart(key.to_string());
                return CartOutcome::blocked(e.to_string(), state.source);
            }
        };

        let attempt = match &remote_id {
            Some(cart_id) => Some(self.service.remove_item(cart_id).await),
            None => None,
        };

        match attempt {
            Some(Ok(ack)) if ack.success => match self.fetch_and_adopt(&mut state).await {
                Ok(()) => CartOutcome::server(or_default(ack.message, "Item removed")),
                Err(e) => {
                    warn!("cart re-fetch failed after remove, keeping local copy: {}", e);
                    self.local_remove(&mut state, key)
                }
            },
            Some(Err(CartServiceError::Unauthorized(message))) => {
                CartOutcome::blocked(message, state.source)
            }
            Some(Ok(ack)) => {
                warn!("cart service rejected remove ({}), falling back", ack.message);
                self.local_remove(&mut state, key)
            }
            Some(Err(CartServiceError::Network(e))) => {
                warn!("cart service unreachable ({}), falling back", e);
                self.local_remove(&mut state, key)
            }
            None => self.local_remove(&mut state, key),
        }
    }

    /// Empty the cart.
    pub async fn clear(&self) -> CartOutcome {
        let mut state = self.state.lock().await;
        match self.service.clear_cart().await {
            Ok(ack) if ack.success => match self.fetch_and_adopt(&mut state).await {
                Ok(()) => CartOutcome::server(or_default(ack.message, "Cart cleared")),
                Err(e) => {
                    warn!("cart re-fetch failed after clear, keeping local copy: {}", e);
                    self.local_clear(&mut state)
                }
            },
            Err(CartServiceError::Unauthorized(message)) => {
                CartOutcome::blocked(message, state.source)
            }
            Ok(ack) => {
                warn!("cart service rejected clear ({}), falling back", ack.message);
                self.local_clear(&mut state)
            }
            Err(CartServiceError::Network(e)) => {
                warn!("cart service unreachable ({}), falling back", e);
                self.local_clear(&mut state)
            }
        }
    }

    /// Attempt one full server resync.
    ///
    /// Returns `true` when the authoritative cart was adopted. Returns
    /// `false` when a resync is already in flight, the service is
    /// unreachable, or a user mutation landed during the fetch.
    pub async fn resync(&self) -> bool {
        if self
            .resync_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("resync already in flight");
            return false;
        }

        let observed = self.state.lock().await.revision;
        let adopted = match self.service.get_cart().await {
            Ok(cart) if cart.success => {
                let mut state = self.state.lock().await;
                if state.revision != observed {
                    debug!("resync discarded, cart mutated during fetch");
                    false
                } else {
                    self.adopt(&mut state, cart);
                    true
                }
            }
            Ok(_) => {
                debug!("resync rejected by cart service");
                false
            }
            Err(e) => {
                debug!("resync failed: {}", e);
                false
            }
        };

        self.resync_in_flight.store(false, Ordering::SeqCst);
        adopted
    }

    /// Spawn the periodic resync loop.
    ///
    /// Runs for the life of the session; the first attempt fires one full
    /// interval after spawning.
    pub fn spawn_resync(self: &Arc<Self>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(engine.config.resync_interval);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                engine.resync().await;
            }
        })
    }

    fn validate_add<'a>(
        &self,
        group: &'a ProductGroup,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> Result<&'a Variant, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if quantity > self.config.max_quantity_per_line {
            return Err(CartError::QuantityExceedsLimit(
                quantity,
                self.config.max_quantity_per_line,
            ));
        }
        let variant = group
            .variant(color)
            .ok_or_else(|| CartError::VariantNotFound {
                product_code: group.product_code.to_string(),
                color: color.to_string(),
            })?;
        if !variant.sizes.is_empty() && variant.sizes.get(size).copied().unwrap_or(0) <= 0 {
            return Err(CartError::SizeUnavailable {
                product_code: group.product_code.to_string(),
                color: color.to_string(),
                size: size.to_string(),
            });
        }
        Ok(variant)
    }

    fn local_add(
        &self,
        state: &mut CartState,
        request: &AddItemRequest,
        variant: &Variant,
        assorted: bool,
        quote: pricing::PriceQuote,
    ) -> CartOutcome {
        let key = LineKey::new(
            request.product_code.clone(),
            request.color.clone(),
            request.size.clone(),
        );
        let line = match CartLine::new(
            key,
            request.quantity,
            quote,
            variant.total_pieces,
            assorted,
            pricing::list_price_per_box(variant, assorted),
            variant.weight_grams,
        ) {
            Ok(line) => line,
            Err(e) => return CartOutcome::blocked(e.to_string(), state.source),
        };
        if let Err(e) = state.merge_add(line, self.config.max_quantity_per_line) {
            return CartOutcome::blocked(e.to_string(), state.source);
        }
        self.settle_local(state);
        CartOutcome::local("Item added locally; cart will sync when the connection returns")
    }

    fn local_update(&self, state: &mut CartState, key: &LineKey, quantity: i64) -> CartOutcome {
        let applied = match state.find_mut(key) {
            Some(line) => line.set_quantity(quantity),
            None => Err(CartError::ItemNotInCart(key.to_string())),
        };
        if let Err(e) = applied {
            return CartOutcome::blocked(e.to_string(), state.source);
        }
        self.settle_local(state);
        CartOutcome::local("Cart updated locally; will sync when the connection returns")
    }

    fn local_remove(&self, state: &mut CartState, key: &LineKey) -> CartOutcome {
        if !state.remove(key) {
            let e = CartError::ItemNotInCart(key.to_string());
            return CartOutcome::blocked(e.to_string(), state.source);
        }
        self.settle_local(state);
        CartOutcome::local("Item removed locally; will sync when the connection returns")
    }

    fn local_clear(&self, state: &mut CartState) -> CartOutcome {
        state.clear();
        self.settle_local(state);
        CartOutcome::local("Cart cleared locally; will sync when the connection returns")
    }

    /// Fetch the authoritative cart and adopt it wholesale.
    async fn fetch_and_adopt(&self, state: &mut CartState) -> Result<(), CartServiceError> {
        let cart = self.service.get_cart().await?;
        if !cart.success {
            return Err(CartServiceError::Network(
                "cart fetch rejected by service".to_string(),
            ));
        }
        self.adopt(state, cart);
        Ok(())
    }

    fn adopt(&self, state: &mut CartState, cart: RemoteCart) {
        state.lines = cart.items.into_iter().map(CartLine::from).collect();
        state.source = SourceOfTruth::Server;
        state.revision += 1;
        self.settle(state);
    }

    fn settle_local(&self, state: &mut CartState) {
        state.source = SourceOfTruth::Local;
        state.revision += 1;
        self.settle(state);
    }

    /// Persist the fallback copy and notify subscribers.
    fn settle(&self, state: &CartState) {
        match encode_lines(&state.lines) {
            Ok(payload) => {
                if let Err(e) = self.store.save(&payload) {
                    warn!("failed to persist local cart copy: {}", e);
                }
            }
            Err(e) => warn!("failed to serialize local cart copy: {}", e),
        }
        self.changed.send_replace(state.clone());
    }

    /// Load the fallback slot into the state. Returns `true` when lines
    /// were restored.
    fn restore_fallback(&self, state: &mut CartState) -> bool {
        let payload = match self.store.load() {
            Ok(Some(payload)) => payload,
            Ok(None) => return false,
            Err(e) => {
                warn!("failed to read local cart copy: {}", e);
                return false;
            }
        };
        match crate::store::decode_lines(&payload) {
            Ok(lines) if !lines.is_empty() => {
                state.lines = lines;
                state.source = SourceOfTruth::Local;
                state.revision += 1;
                self.changed.send_replace(state.clone());
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("discarding unreadable local cart copy: {}", e);
                false
            }
        }
    }
}

fn or_default(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
