//! Favorites Store
//!
//! The set of favorited row identities. Loaded once at startup, mutated only
//! through [`Favorites::toggle`], persisted after every mutation.
//!
//! Persistence is best-effort: a corrupt entry loads as an empty set and a
//! failed write is logged, never surfaced to the caller.

use std::collections::BTreeSet;

use crate::corpus::RowId;
use crate::store::SharedStore;

/// Store key holding the JSON array of favorite identities
pub const FAVORITES_KEY: &str = "chuleta:favorites";

/// Favorited row identities backed by the shared store
pub struct Favorites {
    ids: BTreeSet<RowId>,
    store: SharedStore,
}

impl Favorites {
    /// Load the favorite set from the store (corrupt data yields an empty set)
    pub fn load(store: SharedStore) -> Self {
        let raw = store.borrow().get(FAVORITES_KEY);
        let ids = match raw {
            None => BTreeSet::new(),
            Some(json) => match serde_json::from_str::<Vec<String>>(&json) {
                Ok(list) => list.into_iter().map(RowId::from_raw).collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "Stored favorites are corrupt, starting empty");
                    BTreeSet::new()
                }
            },
        };
        tracing::debug!(count = ids.len(), "Favorites loaded");
        Self { ids, store }
    }

    /// Flip membership of `id` and persist; returns the new membership
    pub fn toggle(&mut self, id: &RowId) -> bool {
        let now_favorite = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        };
        self.persist();
        now_favorite
    }

    /// Whether `id` is favorited
    #[must_use]
    pub fn is_favorite(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    /// All favorited identities
    #[must_use]
    pub fn all(&self) -> &BTreeSet<RowId> {
        &self.ids
    }

    /// Number of favorites
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is favorited
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn persist(&self) {
        let list: Vec<&str> = self.ids.iter().map(RowId::as_str).collect();
        let json = match serde_json::to_string(&list) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode favorites");
                return;
            }
        };
        if let Err(e) = self.store.borrow_mut().set(FAVORITES_KEY, &json) {
            tracing::warn!(error = %e, "Failed to persist favorites");
        }
    }
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites").field("ids", &self.ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};

    fn id(raw: &str) -> RowId {
        RowId::from_raw(raw)
    }

    #[test]
    fn test_toggle_is_involution() {
        let store = MemoryStore::new().shared();
        let mut favorites = Favorites::load(store);
        let row = id("vocab::dog|perro");

        assert!(favorites.toggle(&row));
        assert!(favorites.is_favorite(&row));
        assert!(!favorites.toggle(&row));
        assert!(!favorites.is_favorite(&row));
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_toggle_persists_json_array() {
        let store = MemoryStore::new().shared();
        let mut favorites = Favorites::load(store.clone());
        favorites.toggle(&id("vocab::dog|perro"));

        let raw = store.borrow().get(FAVORITES_KEY).unwrap();
        let list: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(list, vec!["vocab::dog|perro".to_string()]);
    }

    #[test]
    fn test_reload_restores_set() {
        let store = MemoryStore::new().shared();
        {
            let mut favorites = Favorites::load(store.clone());
            favorites.toggle(&id("a::1"));
            favorites.toggle(&id("b::2"));
        }
        let favorites = Favorites::load(store);
        assert_eq!(favorites.len(), 2);
        assert!(favorites.is_favorite(&id("a::1")));
    }

    #[test]
    fn test_corrupt_store_loads_empty() {
        let store = MemoryStore::with_entries([(FAVORITES_KEY, "[\"unterminated")]).shared();
        let favorites = Favorites::load(store);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_non_string_array_loads_empty() {
        let store = MemoryStore::with_entries([(FAVORITES_KEY, "[1, 2, 3]")]).shared();
        assert!(Favorites::load(store).is_empty());
    }

    #[test]
    fn test_failed_persist_keeps_memory_state() {
        let store = MemoryStore::new().shared();
        store.borrow_mut().set_read_only(true);
        let mut favorites = Favorites::load(store.clone());

        assert!(favorites.toggle(&id("vocab::cat|gato")));
        assert!(favorites.is_favorite(&id("vocab::cat|gato")));
        assert_eq!(store.borrow().get(FAVORITES_KEY), None);
    }
}
