// ═══════════════════════════════════════════════════════════════════
// Storage Tests — snapshot format, key-value stores, StorageManager
// ═══════════════════════════════════════════════════════════════════

use rust_decimal_macros::dec;
use serde_json::json;
use storefront_core::errors::CoreError;
use storefront_core::models::cart::{LineItem, Ledger};
use storefront_core::models::money::Price;
use storefront_core::models::product::ProductId;
use storefront_core::models::settings::Theme;
use storefront_core::models::user::User;
use storefront_core::models::wishlist::Wishlist;
use storefront_core::storage::format;
use storefront_core::storage::manager::StorageManager;
use storefront_core::storage::store::{FileStore, KeyValueStore, MemoryStore};

fn id(n: u64) -> ProductId {
    ProductId::from(n)
}

/// A store whose writes fail, like a browser with storage disabled.
#[derive(Default)]
struct BrokenStore {
    inner: MemoryStore,
}

impl KeyValueStore for BrokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), CoreError> {
        Err(CoreError::FileIO("quota exceeded".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), CoreError> {
        Err(CoreError::FileIO("storage disabled".into()))
    }
}

/// A store whose reads fail.
struct UnreadableStore;

impl KeyValueStore for UnreadableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, CoreError> {
        Err(CoreError::FileIO("permission denied".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), CoreError> {
        Ok(())
    }

    fn remove(&mut self, _key: &str) -> Result<(), CoreError> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════
// Cart format
// ═══════════════════════════════════════════════════════════════════

mod cart_format {
    use super::*;

    #[test]
    fn writes_object_with_items() {
        let mut ledger = Ledger::new();
        ledger.add(1u64, Price::new(dec!(9.99)).unwrap(), 3);
        let raw = format::encode_cart(&ledger).unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v, json!({"items": [{"id": 1, "price": 9.99, "quantity": 3}]}));
    }

    #[test]
    fn empty_cart_writes_empty_items() {
        let raw = format::encode_cart(&Ledger::new()).unwrap();
        assert_eq!(raw, r#"{"items":[]}"#);
    }

    #[test]
    fn persist_then_load_single_item() {
        let mut ledger = Ledger::new();
        ledger.add(1u64, Price::new(dec!(9.99)).unwrap(), 3);
        let restored = format::decode_cart(&format::encode_cart(&ledger).unwrap()).unwrap();

        assert_eq!(restored.len(), 1);
        let item = restored.get(&id(1)).unwrap();
        assert_eq!(item.quantity, 3);
        assert_eq!(item.price.amount(), dec!(9.99));
        assert_eq!(restored, ledger);
    }

    #[test]
    fn preserves_order_and_opaque_fields() {
        let stored = json!({"items": [
            {"id": 2, "name": "Smart Watch", "price": 299.99, "quantity": 1,
             "image": "/w.png", "variant": {"size": "42mm"}, "stock": 3},
            {"id": "gift-card", "price": 25.5, "quantity": 2, "message": "Happy birthday"}
        ]});
        let ledger = format::decode_cart(&stored.to_string()).unwrap();
        let ids: Vec<_> = ledger.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(ids, vec![id(2), ProductId::from("gift-card")]);

        let rewritten: serde_json::Value =
            serde_json::from_str(&format::encode_cart(&ledger).unwrap()).unwrap();
        assert_eq!(rewritten, stored);
    }

    #[test]
    fn whole_prices_stay_integers() {
        let stored = json!({"items": [
            {"id": 1, "name": "Gift Card", "price": 25, "quantity": 2},
            {"id": 2, "price": 0, "quantity": 1},
            {"id": 3, "price": 12.5, "quantity": 1}
        ]});
        let ledger = format::decode_cart(&stored.to_string()).unwrap();
        let rewritten: serde_json::Value =
            serde_json::from_str(&format::encode_cart(&ledger).unwrap()).unwrap();
        assert_eq!(rewritten, stored);
        assert!(rewritten["items"][0]["price"].is_u64());
    }

    #[test]
    fn ignores_stale_total() {
        let raw = r#"{"items":[{"id":1,"price":10,"quantity":2}],"total":999}"#;
        let ledger = format::decode_cart(raw).unwrap();
        assert_eq!(ledger.totals().subtotal, dec!(20));
    }

    #[test]
    fn accepts_bare_array() {
        let raw = r#"[{"id":1,"name":"Mug","price":12.5,"quantity":2},{"id":3,"price":1,"quantity":1}]"#;
        let ledger = format::decode_cart(raw).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.totals().subtotal, dec!(26));
        assert_eq!(ledger.totals().item_count, 3);
    }

    #[test]
    fn accepts_empty_bare_array() {
        assert!(format::decode_cart("[]").unwrap().is_empty());
    }

    #[test]
    fn restores_quantity_without_replay() {
        let raw = r#"{"items":[{"id":1,"price":0.5,"quantity":1000000}]}"#;
        let ledger = format::decode_cart(raw).unwrap();
        assert_eq!(ledger.get(&id(1)).unwrap().quantity, 1_000_000);
        assert_eq!(ledger.totals().subtotal, dec!(500000));
    }

    #[test]
    fn rejects_malformed() {
        for raw in [
            "",
            "not json",
            "{\"items\": 5}",
            r#"{"items":[{"id":1,"price":-1,"quantity":1}]}"#,
            r#"{"items":[{"id":1,"price":1,"quantity":-2}]}"#,
            r#"{"items":[{"id":1,"quantity":1}]}"#,
            r#"{"items":[{"id":1,"price":1e28,"quantity":10}]}"#,
        ] {
            let err = format::decode_cart(raw).unwrap_err();
            assert!(matches!(err, CoreError::Deserialization(_)), "{raw:?} gave {err:?}");
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// Other formats
// ═══════════════════════════════════════════════════════════════════

mod other_formats {
    use super::*;

    #[test]
    fn wishlist_round_trip() {
        let w = Wishlist::from_ids(vec![id(4), ProductId::from("x"), id(1)]);
        let raw = format::encode_wishlist(&w).unwrap();
        assert_eq!(raw, r#"[4,"x",1]"#);
        assert_eq!(format::decode_wishlist(&raw).unwrap(), w);
    }

    #[test]
    fn theme_is_bare_word() {
        assert_eq!(format::encode_theme(Theme::Dark), "dark");
        assert_eq!(format::decode_theme("dark").unwrap(), Theme::Dark);
        assert_eq!(format::decode_theme("\"light\"").unwrap(), Theme::Light);
        assert!(format::decode_theme("purple").is_err());
    }

    #[test]
    fn user_round_trip() {
        let user = User::new("Sarah Johnson", "sarah@example.com")
            .unwrap()
            .with_phone("+1 (555) 123-4567");
        let raw = format::encode_user(&user).unwrap();
        assert_eq!(format::decode_user(&raw).unwrap(), user);
    }

    #[test]
    fn user_must_validate_on_load() {
        let err = format::decode_user(r#"{"name":"","email":"x@y.z"}"#).unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// MemoryStore
// ═══════════════════════════════════════════════════════════════════

mod memory_store {
    use super::*;

    #[test]
    fn set_get_remove() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("cart").unwrap(), None);

        store.set("cart", "{}").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("{}"));
        assert_eq!(store.len(), 1);

        store.set("cart", "[]").unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[]"));

        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
        store.remove("cart").unwrap();
    }
}

// ═══════════════════════════════════════════════════════════════════
// FileStore
// ═══════════════════════════════════════════════════════════════════

mod file_store {
    use super::*;

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("state"));

        assert_eq!(store.get("cart").unwrap(), None);
        store.set("cart", r#"{"items":[]}"#).unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some(r#"{"items":[]}"#));
        assert!(dir.path().join("state").join("cart.json").exists());

        store.remove("cart").unwrap();
        assert_eq!(store.get("cart").unwrap(), None);
        store.remove("cart").unwrap();
    }

    #[test]
    fn overwrite_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        store.set("theme", "light").unwrap();
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["theme.json".to_string()]);
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        for key in ["", "../cart", "a/b", ".hidden"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(CoreError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = FileStore::new(dir.path());
            store.set("wishlist", "[1,2]").unwrap();
        }
        let store = FileStore::new(dir.path());
        assert_eq!(store.get("wishlist").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(store.dir(), dir.path());
    }
}

// ═══════════════════════════════════════════════════════════════════
// StorageManager
// ═══════════════════════════════════════════════════════════════════

mod manager {
    use super::*;

    #[test]
    fn cart_save_and_load() {
        let mut store = MemoryStore::new();
        let ledger = Ledger::from_items(vec![LineItem::new(1u64, Price::new(dec!(9.99)).unwrap(), 3)]);
        StorageManager::save_cart(&mut store, "cart", &ledger).unwrap();

        let loaded = StorageManager::load_cart(&store, "cart").unwrap();
        assert_eq!(loaded, ledger);
    }

    #[test]
    fn missing_cart_is_read_error() {
        let store = MemoryStore::new();
        let err = StorageManager::load_cart(&store, "cart").unwrap_err();
        assert!(matches!(err, CoreError::PersistenceRead { ref key, .. } if key == "cart"));
    }

    #[test]
    fn malformed_cart_is_read_error() {
        let mut store = MemoryStore::new();
        store.set("cart", "{{{").unwrap();
        let err = StorageManager::load_cart(&store, "cart").unwrap_err();
        assert!(matches!(err, CoreError::PersistenceRead { .. }));
    }

    #[test]
    fn or_default_recovers_empty() {
        let mut store = MemoryStore::new();
        assert!(StorageManager::load_cart_or_default(&store, "cart").is_empty());

        store.set("cart", "garbage").unwrap();
        store.set("wishlist", "{\"not\":\"a list\"}").unwrap();
        store.set("theme", "neon").unwrap();
        store.set("user", "[]").unwrap();

        assert!(StorageManager::load_cart_or_default(&store, "cart").is_empty());
        assert!(StorageManager::load_wishlist_or_default(&store, "wishlist").is_empty());
        assert_eq!(StorageManager::load_theme_or_default(&store, "theme"), Theme::Light);
        assert!(StorageManager::load_user_or_default(&store, "user").is_none());
    }

    #[test]
    fn or_default_survives_unreadable_store() {
        let store = UnreadableStore;
        assert!(StorageManager::load_cart_or_default(&store, "cart").is_empty());
        assert!(matches!(
            StorageManager::load_theme(&store, "theme"),
            Err(CoreError::PersistenceRead { .. })
        ));
    }

    #[test]
    fn write_failure_is_write_error() {
        let mut store = BrokenStore::default();
        let err = StorageManager::save_cart(&mut store, "cart", &Ledger::new()).unwrap_err();
        match err {
            CoreError::PersistenceWrite { key, message } => {
                assert_eq!(key, "cart");
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("expected PersistenceWrite, got {other:?}"),
        }
    }

    #[test]
    fn user_none_removes_key() {
        let mut store = MemoryStore::new();
        let user = User::new("Sarah", "s@example.com").unwrap();
        StorageManager::save_user(&mut store, "user", Some(&user)).unwrap();
        assert_eq!(StorageManager::load_user(&store, "user").unwrap(), user);

        StorageManager::save_user(&mut store, "user", None).unwrap();
        assert_eq!(store.get("user").unwrap(), None);
    }

    #[test]
    fn user_remove_failure_is_write_error() {
        let mut store = BrokenStore::default();
        assert!(matches!(
            StorageManager::save_user(&mut store, "user", None),
            Err(CoreError::PersistenceWrite { .. })
        ));
    }

    #[test]
    fn theme_and_wishlist() {
        let mut store = MemoryStore::new();
        StorageManager::save_theme(&mut store, "theme", Theme::Dark).unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(StorageManager::load_theme(&store, "theme").unwrap(), Theme::Dark);

        let w = Wishlist::from_ids(vec![id(1), id(2)]);
        StorageManager::save_wishlist(&mut store, "wishlist", &w).unwrap();
        assert_eq!(StorageManager::load_wishlist(&store, "wishlist").unwrap(), w);
    }

    #[test]
    fn works_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        let mut ledger = Ledger::new();
        ledger.add(1u64, Price::new(dec!(4.5)).unwrap(), 2);
        StorageManager::save_cart(&mut store, "cart", &ledger).unwrap();

        let reopened = FileStore::new(dir.path());
        assert_eq!(StorageManager::load_cart(&reopened, "cart").unwrap(), ledger);
    }
}
