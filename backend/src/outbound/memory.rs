//! In-memory store adapters.
//!
//! Used when no data directory is configured and by integration tests. State
//! lives for the lifetime of the process.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use url::Url;

use crate::domain::ports::{
    ObjectRef, ObjectStore, ObjectStoreError, RecordStore, RecordStoreError, WriteMode,
};
use crate::domain::records::{AttributeMap, Collection};

use super::object_names;

/// Apply a write to an existing record according to `mode`.
pub(crate) fn apply_write(
    existing: Option<AttributeMap>,
    update: AttributeMap,
    mode: WriteMode,
) -> AttributeMap {
    match (mode, existing) {
        (WriteMode::Merge, Some(mut current)) => {
            current.extend(update);
            current
        }
        _ => update,
    }
}

/// Record store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    collections: RwLock<HashMap<Collection, BTreeMap<String, AttributeMap>>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<AttributeMap>, RecordStoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .and_then(|records| records.get(key))
            .cloned())
    }

    async fn list_all(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, AttributeMap)>, RecordStoreError> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .map(|(key, map)| (key.clone(), map.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn set(
        &self,
        collection: Collection,
        key: &str,
        attributes: AttributeMap,
        mode: WriteMode,
    ) -> Result<(), RecordStoreError> {
        let mut guard = self.collections.write().await;
        let records = guard.entry(collection).or_default();
        let merged = apply_write(records.remove(key), attributes, mode);
        records.insert(key.to_owned(), merged);
        Ok(())
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<(), RecordStoreError> {
        let mut guard = self.collections.write().await;
        if let Some(records) = guard.get_mut(&collection) {
            records.remove(key);
        }
        Ok(())
    }
}

/// Object store backed by process memory.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: Url,
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryObjectStore {
    /// Create an empty store whose public URLs live below `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            objects: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<ObjectRef, ObjectStoreError> {
        let reference = object_names::object_name(filename, &bytes)?;
        self.objects
            .write()
            .await
            .insert(reference.name().to_owned(), bytes);
        Ok(reference)
    }

    fn public_url(&self, reference: &ObjectRef) -> Result<String, ObjectStoreError> {
        object_names::public_url(&self.base_url, reference)
    }

    async fn load(&self, reference: &ObjectRef) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        object_names::validate_name(reference.name())?;
        Ok(self.objects.read().await.get(reference.name()).cloned())
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour shared with the filesystem adapter.
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};

    fn object(value: Value) -> AttributeMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[fixture]
    fn store() -> InMemoryRecordStore {
        InMemoryRecordStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn merge_keeps_unmentioned_attributes(store: InMemoryRecordStore) {
        store
            .set(
                Collection::Users,
                "a",
                object(json!({ "email": "a@example.com", "password": "" })),
                WriteMode::Replace,
            )
            .await
            .expect("seed");
        store
            .set(
                Collection::Users,
                "a",
                object(json!({ "password": "sha256$s$d" })),
                WriteMode::Merge,
            )
            .await
            .expect("merge");

        let stored = store
            .get(Collection::Users, "a")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored.get("email"), Some(&json!("a@example.com")));
        assert_eq!(stored.get("password"), Some(&json!("sha256$s$d")));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_discards_previous_attributes(store: InMemoryRecordStore) {
        for map in [json!({ "a": 1, "b": 2 }), json!({ "a": 3 })] {
            store
                .set(Collection::Events, "k", object(map), WriteMode::Replace)
                .await
                .expect("set");
        }
        let stored = store
            .get(Collection::Events, "k")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(Value::Object(stored), json!({ "a": 3 }));
    }

    #[rstest]
    #[tokio::test]
    async fn collections_are_isolated(store: InMemoryRecordStore) {
        store
            .set(Collection::Events, "k", AttributeMap::new(), WriteMode::Replace)
            .await
            .expect("set");
        assert!(store.get(Collection::Users, "k").await.expect("get").is_none());
        assert!(store.list_all(Collection::Users).await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn delete_is_idempotent(store: InMemoryRecordStore) {
        store
            .set(Collection::Events, "k", AttributeMap::new(), WriteMode::Replace)
            .await
            .expect("set");
        store.delete(Collection::Events, "k").await.expect("delete");
        store.delete(Collection::Events, "k").await.expect("delete again");
        assert!(store.list_all(Collection::Events).await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn objects_round_trip_through_store() {
        let base = Url::parse("http://localhost:8080/").expect("url");
        let objects = InMemoryObjectStore::new(base);
        let reference = objects
            .store("map.png", b"png bytes".to_vec())
            .await
            .expect("stored");

        let loaded = objects.load(&reference).await.expect("load");
        assert_eq!(loaded.as_deref(), Some(b"png bytes".as_slice()));
        assert!(
            objects
                .public_url(&reference)
                .expect("url")
                .starts_with("http://localhost:8080/api/v1/files/")
        );
        assert!(
            objects
                .load(&ObjectRef::new("missing.png"))
                .await
                .expect("load")
                .is_none()
        );
    }
}
