pub mod errors;
pub mod models;
pub mod services;
pub mod storage;

use std::collections::BTreeSet;

use models::{
    cart::{CartTotals, Ledger},
    checkout::{AppliedPromo, CheckoutSummary},
    money::Price,
    product::{Product, ProductId},
    settings::{Settings, Theme},
    user::User,
    wishlist::Wishlist,
};
use services::checkout_service::CheckoutService;
use storage::manager::StorageManager;
use storage::store::{KeyValueStore, MemoryStore};

use errors::CoreError;

/// Main entry point for the storefront core library.
///
/// Holds the shopper's client-local state (cart, wishlist, theme, signed-in
/// user) together with the store it is persisted to. Create one with
/// [`Storefront::open`] at session start and pass it to whatever needs it.
/// Every successful mutation is written through to the store immediately.
///
/// A failed write never rolls back in-memory state: the session keeps
/// working, the key is marked unsynced, and the next successful write of
/// that key (or [`Storefront::resync`]) brings storage back in line.
#[must_use]
pub struct Storefront<S: KeyValueStore = MemoryStore> {
    store: S,
    settings: Settings,
    checkout_service: CheckoutService,
    cart: Ledger,
    wishlist: Wishlist,
    theme: Theme,
    user: Option<User>,
    promo: Option<AppliedPromo>,
    /// Keys whose latest state failed to reach the store.
    unsynced: BTreeSet<String>,
    last_write_error: Option<CoreError>,
}

impl<S: KeyValueStore> std::fmt::Debug for Storefront<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("cart_lines", &self.cart.len())
            .field("wishlist", &self.wishlist.len())
            .field("theme", &self.theme)
            .field("signed_in", &self.user.is_some())
            .field("promo", &self.promo)
            .field("unsynced", &self.unsynced)
            .finish()
    }
}

impl<S: KeyValueStore> Storefront<S> {
    /// Start a session on `store`, hydrating whatever a previous session left.
    ///
    /// Missing or unreadable snapshots are logged and replaced by empty state;
    /// only invalid `settings` are an error.
    pub fn open(store: S, settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(store, settings))
    }

    /// Start a session with default settings.
    pub fn open_default(store: S) -> Self {
        Self::build(store, Settings::default())
    }

    /// End the session and hand back the store.
    pub fn close(self) -> S {
        if !self.unsynced.is_empty() {
            tracing::warn!(keys = ?self.unsynced, "closing storefront with unsynced state");
        }
        self.store
    }

    // ── Cart ────────────────────────────────────────────────────────

    /// Add `qty` units of a listed product. Adding zero units does nothing.
    pub fn add_to_cart(&mut self, product: &Product, qty: u32) {
        if self.cart.add_product(product, qty) {
            tracing::debug!(id = %product.id, qty, "added to cart");
            self.persist_cart();
        }
    }

    /// Add `qty` units of a product known only by id and unit price.
    pub fn add_item(&mut self, id: impl Into<ProductId>, unit_price: Price, qty: u32) {
        let id = id.into();
        if self.cart.add(id.clone(), unit_price, qty) {
            tracing::debug!(%id, qty, "added to cart");
            self.persist_cart();
        }
    }

    /// Set a line's quantity; zero or less removes it.
    /// A positive quantity for a product not in the cart is `ItemNotFound`.
    pub fn set_cart_quantity(&mut self, id: &ProductId, qty: i64) -> Result<(), CoreError> {
        if self.cart.set_quantity(id, qty)? {
            tracing::debug!(%id, qty, "cart quantity updated");
            self.persist_cart();
        }
        Ok(())
    }

    /// Remove a product from the cart. Removing an absent product does nothing.
    pub fn remove_from_cart(&mut self, id: &ProductId) {
        if self.cart.remove(id) {
            tracing::debug!(%id, "removed from cart");
            self.persist_cart();
        }
    }

    /// Empty the cart and drop any applied promo code.
    pub fn clear_cart(&mut self) {
        self.cart.clear();
        self.promo = None;
        tracing::debug!("cart cleared");
        self.persist_cart();
    }

    #[must_use]
    pub fn cart(&self) -> &Ledger {
        &self.cart
    }

    #[must_use]
    pub fn cart_totals(&self) -> CartTotals {
        self.cart.totals()
    }

    /// Units in the cart (the header badge count).
    #[must_use]
    pub fn cart_item_count(&self) -> u64 {
        self.cart.totals().item_count
    }

    // ── Checkout ────────────────────────────────────────────────────

    /// Apply a promo code (case-insensitive) and return its percentage.
    ///
    /// An unknown code resets the discount to zero and returns
    /// `InvalidPromoCode` so the caller can show a notice.
    pub fn apply_promo_code(&mut self, code: &str) -> Result<u8, CoreError> {
        match self.checkout_service.apply_promo(code) {
            Ok(promo) => {
                let percent = promo.percent;
                tracing::debug!(code = %promo.code, percent, "promo code applied");
                self.promo = Some(promo);
                Ok(percent)
            }
            Err(e) => {
                tracing::warn!(code, "rejected promo code");
                self.promo = None;
                Err(e)
            }
        }
    }

    pub fn clear_promo_code(&mut self) {
        self.promo = None;
    }

    #[must_use]
    pub fn applied_promo(&self) -> Option<&AppliedPromo> {
        self.promo.as_ref()
    }

    /// Subtotal, discount, shipping and total for the current cart.
    #[must_use]
    pub fn checkout_summary(&self) -> CheckoutSummary {
        let percent = self.promo.as_ref().map_or(0, |p| p.percent);
        self.checkout_service.summarize(self.cart.totals(), percent)
    }

    // ── Wishlist ────────────────────────────────────────────────────

    /// Toggle a product on the wishlist. Returns `true` if it is now wishlisted.
    pub fn toggle_wishlist(&mut self, id: impl Into<ProductId>) -> bool {
        let wishlisted = self.wishlist.toggle(id.into());
        self.persist_wishlist();
        wishlisted
    }

    #[must_use]
    pub fn is_wishlisted(&self, id: &ProductId) -> bool {
        self.wishlist.contains(id)
    }

    #[must_use]
    pub fn wishlist(&self) -> &Wishlist {
        &self.wishlist
    }

    // ── Theme ───────────────────────────────────────────────────────

    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme
    }

    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.theme == Theme::Dark
    }

    /// Flip between light and dark. Returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.set_theme(self.theme.toggled());
        self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.persist_theme();
    }

    // ── User ────────────────────────────────────────────────────────

    /// Sign a user in, stamping `signed_in_at` if the profile has none.
    pub fn login(&mut self, mut user: User) -> Result<(), CoreError> {
        user.validate()?;
        if user.signed_in_at.is_none() {
            user.signed_in_at = Some(chrono::Utc::now());
        }
        tracing::debug!(email = %user.email, "user signed in");
        self.user = Some(user);
        self.persist_user();
        Ok(())
    }

    /// Sign out. Also empties the cart.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::debug!(email = %user.email, "user signed out");
        }
        self.persist_user();
        self.clear_cart();
    }

    /// Replace the signed-in user's profile, keeping the sign-in time.
    pub fn update_profile(&mut self, mut profile: User) -> Result<(), CoreError> {
        profile.validate()?;
        let current = self
            .user
            .as_ref()
            .ok_or_else(|| CoreError::ValidationError("No user is signed in".into()))?;
        profile.signed_in_at = current.signed_in_at;
        self.user = Some(profile);
        self.persist_user();
        Ok(())
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    // ── Settings & Sync State ───────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns `true` while any key's latest state has failed to reach the store.
    #[must_use]
    pub fn has_unsynced_changes(&self) -> bool {
        !self.unsynced.is_empty()
    }

    /// Storage keys currently out of sync.
    #[must_use]
    pub fn unsynced_keys(&self) -> Vec<&str> {
        self.unsynced.iter().map(String::as_str).collect()
    }

    /// The most recent write failure, kept until the next successful write.
    #[must_use]
    pub fn last_write_error(&self) -> Option<&CoreError> {
        self.last_write_error.as_ref()
    }

    /// Write every unsynced key again. Returns the first failure, if any;
    /// keys that still fail stay unsynced.
    pub fn resync(&mut self) -> Result<(), CoreError> {
        let keys = self.settings.keys.clone();
        let pending: Vec<String> = self.unsynced.iter().cloned().collect();
        let mut first_error = None;

        for key in pending {
            let result = if key == keys.cart {
                StorageManager::save_cart(&mut self.store, &key, &self.cart)
            } else if key == keys.wishlist {
                StorageManager::save_wishlist(&mut self.store, &key, &self.wishlist)
            } else if key == keys.theme {
                StorageManager::save_theme(&mut self.store, &key, self.theme)
            } else if key == keys.user {
                StorageManager::save_user(&mut self.store, &key, self.user.as_ref())
            } else {
                tracing::warn!(key, "dropping unsynced key with no owner");
                self.unsynced.remove(&key);
                continue;
            };
            if let Err(e) = self.record_write(&key, result) {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Direct access to the backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the backing store (e.g. to swap a failing backend's mode).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(store: S, settings: Settings) -> Self {
        let keys = &settings.keys;
        let cart = StorageManager::load_cart_or_default(&store, &keys.cart);
        let wishlist = StorageManager::load_wishlist_or_default(&store, &keys.wishlist);
        let theme = StorageManager::load_theme_or_default(&store, &keys.theme);
        let user = StorageManager::load_user_or_default(&store, &keys.user);

        tracing::debug!(
            cart_lines = cart.len(),
            wishlist = wishlist.len(),
            %theme,
            signed_in = user.is_some(),
            "storefront session hydrated"
        );

        Self {
            checkout_service: CheckoutService::new(settings.checkout.clone()),
            store,
            settings,
            cart,
            wishlist,
            theme,
            user,
            promo: None,
            unsynced: BTreeSet::new(),
            last_write_error: None,
        }
    }

    fn persist_cart(&mut self) {
        let key = self.settings.keys.cart.clone();
        let result = StorageManager::save_cart(&mut self.store, &key, &self.cart);
        let _ = self.record_write(&key, result);
    }

    fn persist_wishlist(&mut self) {
        let key = self.settings.keys.wishlist.clone();
        let result = StorageManager::save_wishlist(&mut self.store, &key, &self.wishlist);
        let _ = self.record_write(&key, result);
    }

    fn persist_theme(&mut self) {
        let key = self.settings.keys.theme.clone();
        let result = StorageManager::save_theme(&mut self.store, &key, self.theme);
        let _ = self.record_write(&key, result);
    }

    fn persist_user(&mut self) {
        let key = self.settings.keys.user.clone();
        let result = StorageManager::save_user(&mut self.store, &key, self.user.as_ref());
        let _ = self.record_write(&key, result);
    }

    /// Track sync state for `key` after a write attempt.
    fn record_write(&mut self, key: &str, result: Result<(), CoreError>) -> Result<(), CoreError> {
        match result {
            Ok(()) => {
                if self.unsynced.remove(key) {
                    tracing::debug!(key, "storage re-synced");
                }
                if self.unsynced.is_empty() {
                    self.last_write_error = None;
                }
                Ok(())
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "write failed, continuing in memory");
                self.unsynced.insert(key.to_string());
                self.last_write_error = Some(e.clone());
                Err(e)
            }
        }
    }
}
