//! Directory-backed store adapters.
//!
//! Layout below the configured data directory:
//!
//! - `records/<collection>.json`: one JSON object per collection mapping
//!   record keys to attribute maps;
//! - `files/<object name>`: uploaded attachments.
//!
//! All access goes through `cap_std::fs::Dir` handles on Tokio's blocking
//! pool. Collection documents are rewritten through a temporary file and a
//! rename so readers never observe a partial write. The write lock is held
//! by the blocking job itself, so a cancelled caller cannot let a stale
//! rewrite overtake a later one.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use crate::domain::TraceId;
use crate::domain::ports::{
    ObjectRef, ObjectStore, ObjectStoreError, RecordStore, RecordStoreError, WriteMode,
};
use crate::domain::records::{AttributeMap, Collection};

use super::memory::apply_write;
use super::object_names;

const RECORDS_DIR: &str = "records";
const FILES_DIR: &str = "files";

type Records = BTreeMap<String, AttributeMap>;

/// Open `name` below `root`, creating the directory tree when missing.
fn open_subdir(root: &Path, name: &str) -> io::Result<Dir> {
    Dir::create_ambient_dir_all(root, ambient_authority())?;
    let base = Dir::open_ambient_dir(root, ambient_authority())?;
    base.create_dir_all(name)?;
    base.open_dir(name)
}

/// Run blocking filesystem work, keeping the caller's trace id in scope.
async fn run_blocking<T, E, F>(work: F, on_join_error: fn(String) -> E) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    let trace_id = TraceId::current();
    tokio::task::spawn_blocking(move || match trace_id {
        Some(id) => TraceId::sync_scope(id, work),
        None => work(),
    })
    .await
    .unwrap_or_else(|err| Err(on_join_error(err.to_string())))
}

fn document_name(collection: Collection) -> String {
    format!("{}.json", collection.as_str())
}

fn read_records(dir: &Dir, collection: Collection) -> Result<Records, RecordStoreError> {
    let name = document_name(collection);
    match dir.read_to_string(&name) {
        Ok(text) => serde_json::from_str(&text)
            .map_err(|err| RecordStoreError::query(format!("{name} is not valid: {err}"))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Records::new()),
        Err(err) => Err(RecordStoreError::connection(format!("reading {name}: {err}"))),
    }
}

fn write_records(
    dir: &Dir,
    collection: Collection,
    records: &Records,
) -> Result<(), RecordStoreError> {
    let name = document_name(collection);
    let staging = format!("{name}.{}.tmp", Uuid::new_v4().simple());
    let body = serde_json::to_vec_pretty(records)
        .map_err(|err| RecordStoreError::query(format!("encoding {name}: {err}")))?;
    dir.write(&staging, body)
        .and_then(|()| dir.rename(&staging, dir, &name))
        .map_err(|err| {
            if let Err(cleanup) = dir.remove_file(&staging) {
                warn!(file = %staging, error = %cleanup, "staging file left behind");
            }
            RecordStoreError::connection(format!("writing {name}: {err}"))
        })
}

/// Record store persisting each collection as a JSON document.
#[derive(Debug, Clone)]
pub struct FilesystemRecordStore {
    dir: Arc<Dir>,
    writes: Arc<Mutex<()>>,
}

impl FilesystemRecordStore {
    /// Open (creating if needed) the record directory below `root`.
    pub fn open(root: &Path) -> io::Result<Self> {
        let dir = open_subdir(root, RECORDS_DIR)?;
        debug!(path = %root.display(), "opened filesystem record store");
        Ok(Self {
            dir: Arc::new(dir),
            writes: Arc::new(Mutex::new(())),
        })
    }

    async fn read(&self, collection: Collection) -> Result<Records, RecordStoreError> {
        let dir = Arc::clone(&self.dir);
        run_blocking(
            move || read_records(&dir, collection),
            |message| RecordStoreError::connection(message),
        )
        .await
    }

    /// Read-modify-write a collection document under the write lock.
    ///
    /// The guard moves into the blocking job and is released only when the
    /// rewrite has finished, even if this future is dropped first.
    async fn update<F>(&self, collection: Collection, change: F) -> Result<(), RecordStoreError>
    where
        F: FnOnce(&mut Records) + Send + 'static,
    {
        let guard = Arc::clone(&self.writes).lock_owned().await;
        let dir = Arc::clone(&self.dir);
        let result = run_blocking(
            move || {
                let _guard = guard;
                let mut records = read_records(&dir, collection)?;
                change(&mut records);
                write_records(&dir, collection, &records)
            },
            |message| RecordStoreError::connection(message),
        )
        .await;
        if let Err(err) = &result {
            error!(collection = %collection, error = %err, "record write failed");
        }
        result
    }
}

#[async_trait]
impl RecordStore for FilesystemRecordStore {
    async fn get(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Option<AttributeMap>, RecordStoreError> {
        let mut records = self.read(collection).await?;
        Ok(records.remove(key))
    }

    async fn list_all(
        &self,
        collection: Collection,
    ) -> Result<Vec<(String, AttributeMap)>, RecordStoreError> {
        Ok(self.read(collection).await?.into_iter().collect())
    }

    async fn set(
        &self,
        collection: Collection,
        key: &str,
        attributes: AttributeMap,
        mode: WriteMode,
    ) -> Result<(), RecordStoreError> {
        let key = key.to_owned();
        self.update(collection, move |records| {
            let merged = apply_write(records.remove(&key), attributes, mode);
            records.insert(key, merged);
        })
        .await
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<(), RecordStoreError> {
        let key = key.to_owned();
        self.update(collection, move |records| {
            records.remove(&key);
        })
        .await
    }
}

/// Object store writing attachments into a directory.
#[derive(Debug, Clone)]
pub struct FilesystemObjectStore {
    dir: Arc<Dir>,
    base_url: Url,
}

impl FilesystemObjectStore {
    /// Open (creating if needed) the file directory below `root`.
    pub fn open(root: &Path, base_url: Url) -> io::Result<Self> {
        let dir = open_subdir(root, FILES_DIR)?;
        Ok(Self {
            dir: Arc::new(dir),
            base_url,
        })
    }
}

#[async_trait]
impl ObjectStore for FilesystemObjectStore {
    async fn store(&self, filename: &str, bytes: Vec<u8>) -> Result<ObjectRef, ObjectStoreError> {
        let reference = object_names::object_name(filename, &bytes)?;
        let dir = Arc::clone(&self.dir);
        let name = reference.name().to_owned();
        run_blocking(
            move || {
                dir.write(&name, bytes)
                    .map_err(|err| ObjectStoreError::io(format!("writing {name}: {err}")))
            },
            |message| ObjectStoreError::io(message),
        )
        .await?;
        debug!(object = %reference.name(), "stored object");
        Ok(reference)
    }

    fn public_url(&self, reference: &ObjectRef) -> Result<String, ObjectStoreError> {
        object_names::public_url(&self.base_url, reference)
    }

    async fn load(&self, reference: &ObjectRef) -> Result<Option<Vec<u8>>, ObjectStoreError> {
        object_names::validate_name(reference.name())?;
        let dir = Arc::clone(&self.dir);
        let name = reference.name().to_owned();
        run_blocking(
            move || match dir.read(&name) {
                Ok(bytes) => Ok(Some(bytes)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(ObjectStoreError::io(format!("reading {name}: {err}"))),
            },
            |message| ObjectStoreError::io(message),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    //! Persistence across store instances.
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn object(value: Value) -> AttributeMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[fixture]
    fn data_dir() -> TempDir {
        tempfile::tempdir().expect("tempdir")
    }

    #[rstest]
    #[tokio::test]
    async fn records_survive_reopening(data_dir: TempDir) {
        let store = FilesystemRecordStore::open(data_dir.path()).expect("open");
        store
            .set(
                Collection::Events,
                "Lunch-2",
                object(json!({ "day": "Saturday" })),
                WriteMode::Replace,
            )
            .await
            .expect("set");
        drop(store);

        let reopened = FilesystemRecordStore::open(data_dir.path()).expect("reopen");
        let stored = reopened
            .get(Collection::Events, "Lunch-2")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored.get("day"), Some(&json!("Saturday")));
    }

    #[rstest]
    #[tokio::test]
    async fn merge_and_delete_update_document(data_dir: TempDir) {
        let store = FilesystemRecordStore::open(data_dir.path()).expect("open");
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
        store
            .set(Collection::Users, "b", AttributeMap::new(), WriteMode::Replace)
            .await
            .expect("second");
        store.delete(Collection::Users, "b").await.expect("delete");

        let listing = store.list_all(Collection::Users).await.expect("list");
        assert_eq!(listing.len(), 1);
        let (key, map) = listing.into_iter().next().expect("one record");
        assert_eq!(key, "a");
        assert_eq!(
            Value::Object(map),
            json!({ "email": "a@example.com", "password": "sha256$s$d" })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn cancelled_write_cannot_overwrite_later_write(data_dir: TempDir) {
        let store = FilesystemRecordStore::open(data_dir.path()).expect("open");
        let bulky = object(json!({ "description": "x".repeat(8 * 1024 * 1024) }));
        let cancelled = tokio::time::timeout(
            std::time::Duration::from_micros(1),
            store.set(Collection::Events, "Bulky-2", bulky, WriteMode::Replace),
        )
        .await;
        drop(cancelled);

        store
            .set(
                Collection::Events,
                "Lunch-2",
                object(json!({ "day": "Saturday" })),
                WriteMode::Replace,
            )
            .await
            .expect("acknowledged write");

        let stored = store
            .get(Collection::Events, "Lunch-2")
            .await
            .expect("get");
        assert!(stored.is_some(), "acknowledged write must survive");
        let leftovers: Vec<_> = store
            .dir
            .entries()
            .expect("list records dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "staging files left: {leftovers:?}");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_collection_reads_empty(data_dir: TempDir) {
        let store = FilesystemRecordStore::open(data_dir.path()).expect("open");
        assert!(store.list_all(Collection::Events).await.expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn corrupt_document_is_a_query_error(data_dir: TempDir) {
        let store = FilesystemRecordStore::open(data_dir.path()).expect("open");
        store
            .dir
            .write("events.json", b"not json")
            .expect("write corrupt document");

        let err = store
            .list_all(Collection::Events)
            .await
            .expect_err("corrupt");
        assert!(matches!(err, RecordStoreError::Query { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn objects_are_written_to_files_dir(data_dir: TempDir) {
        let base = Url::parse("http://localhost:8080/").expect("url");
        let objects = FilesystemObjectStore::open(data_dir.path(), base).expect("open");
        let reference = objects
            .store("map.png", b"png bytes".to_vec())
            .await
            .expect("stored");

        let on_disk = data_dir.path().join(FILES_DIR).join(reference.name());
        assert!(on_disk.exists());
        let loaded = objects.load(&reference).await.expect("load");
        assert_eq!(loaded.as_deref(), Some(b"png bytes".as_slice()));
    }

    #[rstest]
    #[tokio::test]
    async fn unsafe_object_names_are_rejected(data_dir: TempDir) {
        let base = Url::parse("http://localhost:8080/").expect("url");
        let objects = FilesystemObjectStore::open(data_dir.path(), base).expect("open");
        let err = objects
            .load(&ObjectRef::new("../records/users.json"))
            .await
            .expect_err("unsafe");
        assert!(matches!(err, ObjectStoreError::InvalidName { .. }));
    }
}
