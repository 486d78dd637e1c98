use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::Identified;
use crate::store::Store;

/// An entity list synchronized with one storage slot. Loading a missing or
/// unreadable slot falls back to the seed; every save rewrites the slot in
/// full, preserving list order.
pub struct PersistedCollection<T> {
    key: &'static str,
    items: Vec<T>,
    used_fallback: bool,
}

impl<T> PersistedCollection<T>
where
    T: Serialize + DeserializeOwned + Identified,
{
    pub fn load(
        store: &Store,
        key: &'static str,
        seed: impl FnOnce() -> Vec<T>,
    ) -> anyhow::Result<Self> {
        let (items, used_fallback) = match store.get(key)? {
            Some(raw) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) => (items, false),
                Err(e) => {
                    warn!("slot {} is unreadable ({}), reseeding", key, e);
                    (seed(), true)
                }
            },
            None => (seed(), true),
        };
        Ok(PersistedCollection {
            key,
            items,
            used_fallback,
        })
    }

    /// True when the slot was absent or unparsable and the seed was used.
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn list(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Newest-first collections (assignments) prepend instead.
    pub fn push_front(&mut self, item: T) {
        self.items.insert(0, item);
    }

    /// Applies `patch` to the matching item. Returns false when no item
    /// carries the id; the list is untouched in that case.
    pub fn update(&mut self, id: &str, patch: impl FnOnce(&mut T)) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                patch(item);
                true
            }
            None => false,
        }
    }

    /// Fallible counterpart of `update` for guarded transitions: the patch
    /// result is handed back and the item stays modified only on Ok (the
    /// guards themselves leave the entity untouched on Err).
    pub fn try_update<E>(
        &mut self,
        id: &str,
        patch: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Option<Result<(), E>> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .map(patch)
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let idx = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(idx))
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn save(&self, store: &Store) -> anyhow::Result<()> {
        store.put(self.key, &serde_json::to_string(&self.items)?)?;
        Ok(())
    }

    /// Serialized form for a transactional multi-slot flush via
    /// `Store::put_many`.
    pub fn staged(&self) -> anyhow::Result<(&'static str, String)> {
        Ok((self.key, serde_json::to_string(&self.items)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Notification;
    use crate::model::NotificationKind;
    use crate::store::NOTIFICATIONS_KEY;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn seed() -> Vec<Notification> {
        vec![
            Notification {
                id: "n1".into(),
                kind: NotificationKind::Info,
                message: "새 공지".into(),
                date: "2024-05-01T09:00:00Z".into(),
                read: false,
            },
            Notification {
                id: "n2".into(),
                kind: NotificationKind::Success,
                message: "채점 완료".into(),
                date: "2024-05-02T09:00:00Z".into(),
                read: true,
            },
        ]
    }

    #[test]
    fn load_save_round_trip_preserves_order() {
        let ws = temp_workspace("musead-coll-roundtrip");
        let store = Store::open(&ws).expect("open");

        let mut coll =
            PersistedCollection::load(&store, NOTIFICATIONS_KEY, seed).expect("load");
        assert!(coll.used_fallback());
        coll.update("n1", |n| n.read = true);
        coll.save(&store).expect("save");

        let again =
            PersistedCollection::<Notification>::load(&store, NOTIFICATIONS_KEY, Vec::new)
                .expect("reload");
        assert!(!again.used_fallback());
        let ids: Vec<&str> = again.list().iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["n1", "n2"]);
        assert!(again.list().iter().all(|n| n.read));
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn corrupt_slot_fails_open_to_seed() {
        let ws = temp_workspace("musead-coll-corrupt");
        let store = Store::open(&ws).expect("open");
        store
            .put(NOTIFICATIONS_KEY, "{not json at all")
            .expect("corrupt");

        let coll =
            PersistedCollection::load(&store, NOTIFICATIONS_KEY, seed).expect("load");
        assert!(coll.used_fallback());
        assert_eq!(coll.len(), 2);
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn update_missing_id_leaves_list_alone() {
        let ws = temp_workspace("musead-coll-missing");
        let store = Store::open(&ws).expect("open");
        let mut coll =
            PersistedCollection::load(&store, NOTIFICATIONS_KEY, seed).expect("load");
        assert!(!coll.update("nope", |n| n.read = true));
        assert!(coll.remove("nope").is_none());
        assert_eq!(coll.len(), 2);
        let _ = std::fs::remove_dir_all(ws);
    }
}
