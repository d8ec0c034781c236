use crate::errors::CoreError;
use crate::models::cart::Ledger;
use crate::models::settings::Theme;
use crate::models::user::User;
use crate::models::wishlist::Wishlist;

use super::format;
use super::store::KeyValueStore;

/// High-level persistence operations: each piece of storefront state to/from
/// its key in a [`KeyValueStore`].
///
/// `load_*` report missing or malformed snapshots as `PersistenceRead`;
/// `load_*_or_default` log the failure and fall back to empty state, which
/// is what session start-up wants. `save_*` report `PersistenceWrite`.
pub struct StorageManager;

impl StorageManager {
    // ── Cart ────────────────────────────────────────────────────────

    /// Flow: store[key] → JSON → stored lines → Ledger (quantities restored directly)
    pub fn load_cart<S>(store: &S, key: &str) -> Result<Ledger, CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let raw = Self::read(store, key)?;
        format::decode_cart(&raw).map_err(|e| CoreError::read(key, e))
    }

    pub fn load_cart_or_default<S>(store: &S, key: &str) -> Ledger
    where
        S: KeyValueStore + ?Sized,
    {
        Self::load_or_default(store, key, format::decode_cart)
    }

    pub fn save_cart<S>(store: &mut S, key: &str, ledger: &Ledger) -> Result<(), CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let raw = format::encode_cart(ledger).map_err(|e| CoreError::write(key, e))?;
        Self::write(store, key, &raw)?;
        tracing::debug!(key, lines = ledger.len(), "cart persisted");
        Ok(())
    }

    // ── Wishlist ────────────────────────────────────────────────────

    pub fn load_wishlist<S>(store: &S, key: &str) -> Result<Wishlist, CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let raw = Self::read(store, key)?;
        format::decode_wishlist(&raw).map_err(|e| CoreError::read(key, e))
    }

    pub fn load_wishlist_or_default<S>(store: &S, key: &str) -> Wishlist
    where
        S: KeyValueStore + ?Sized,
    {
        Self::load_or_default(store, key, format::decode_wishlist)
    }

    pub fn save_wishlist<S>(store: &mut S, key: &str, wishlist: &Wishlist) -> Result<(), CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let raw = format::encode_wishlist(wishlist).map_err(|e| CoreError::write(key, e))?;
        Self::write(store, key, &raw)
    }

    // ── Theme ───────────────────────────────────────────────────────

    pub fn load_theme<S>(store: &S, key: &str) -> Result<Theme, CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let raw = Self::read(store, key)?;
        format::decode_theme(&raw).map_err(|e| CoreError::read(key, e))
    }

    pub fn load_theme_or_default<S>(store: &S, key: &str) -> Theme
    where
        S: KeyValueStore + ?Sized,
    {
        Self::load_or_default(store, key, format::decode_theme)
    }

    pub fn save_theme<S>(store: &mut S, key: &str, theme: Theme) -> Result<(), CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        Self::write(store, key, &format::encode_theme(theme))
    }

    // ── User ────────────────────────────────────────────────────────

    pub fn load_user<S>(store: &S, key: &str) -> Result<User, CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        let raw = Self::read(store, key)?;
        format::decode_user(&raw).map_err(|e| CoreError::read(key, e))
    }

    /// Signed-in user from a previous session, if any.
    pub fn load_user_or_default<S>(store: &S, key: &str) -> Option<User>
    where
        S: KeyValueStore + ?Sized,
    {
        Self::load_or_default(store, key, |raw| format::decode_user(raw).map(Some))
    }

    /// Write the user, or delete the key when signed out.
    pub fn save_user<S>(store: &mut S, key: &str, user: Option<&User>) -> Result<(), CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        match user {
            Some(user) => {
                let raw = format::encode_user(user).map_err(|e| CoreError::write(key, e))?;
                Self::write(store, key, &raw)
            }
            None => store.remove(key).map_err(|e| CoreError::write(key, e)),
        }
    }

    // ── Internal ────────────────────────────────────────────────────

    fn read<S>(store: &S, key: &str) -> Result<String, CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        store
            .get(key)
            .map_err(|e| CoreError::read(key, e))?
            .ok_or_else(|| CoreError::read(key, "nothing stored"))
    }

    fn write<S>(store: &mut S, key: &str, raw: &str) -> Result<(), CoreError>
    where
        S: KeyValueStore + ?Sized,
    {
        store.set(key, raw).map_err(|e| CoreError::write(key, e))
    }

    fn load_or_default<S, T, F>(store: &S, key: &str, decode: F) -> T
    where
        S: KeyValueStore + ?Sized,
        T: Default,
        F: FnOnce(&str) -> Result<T, CoreError>,
    {
        match store.get(key) {
            Ok(None) => {
                tracing::debug!(key, "nothing stored, starting empty");
                T::default()
            }
            Ok(Some(raw)) => decode(&raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "discarding unreadable snapshot");
                T::default()
            }),
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed, starting empty");
                T::default()
            }
        }
    }
}
