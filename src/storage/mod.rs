//! Persistent record store
//!
//! A small document store on top of an embedded `sled` database. Each named
//! collection maps to its own tree; records are JSON documents keyed by the
//! string value of a declared key-path field. Schema metadata (version and
//! key paths) lives in a reserved tree so a reopened database can be checked
//! against the declaration it was created with.
//!
//! All operations are async. Engine calls run on the blocking pool so a slow
//! flush never stalls the runtime.

use crate::error::{Result, ScribeError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::ConflictableTransactionError;
use sled::{Db, IVec, Tree};
use std::collections::HashMap;
use std::sync::Arc;

pub mod types;
pub use types::{CollectionSpec, StoreLocation, WriteOutcome};

/// Tree holding schema metadata; never exposed as a collection
const SCHEMA_TREE: &str = "__schema";
const VERSION_KEY: &[u8] = b"version";
const KEY_PATH_PREFIX: &str = "keypath/";

#[derive(Clone)]
struct Collection {
    tree: Tree,
    key_path: String,
}

struct StoreInner {
    name: String,
    version: u32,
    db: Db,
    collections: HashMap<String, Collection>,
}

/// Handle to an opened database
///
/// Cloning is cheap and every clone talks to the same database. Repositories
/// receive a handle explicitly instead of reaching for shared state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("version", &self.inner.version)
            .field("collections", &self.collection_names())
            .finish()
    }
}

impl Store {
    /// Open or create a database and make sure every declared collection exists
    ///
    /// # Arguments
    ///
    /// * `location` - Parent directory, or a temporary database
    /// * `name` - Database name (a subdirectory of the location)
    /// * `version` - Schema version the caller expects
    /// * `collections` - Collections to create if missing
    ///
    /// # Errors
    ///
    /// Returns `ScribeError::StorageUnavailable` if the database cannot be
    /// opened, if it was written by a newer schema version, or if a collection
    /// was created with a different key path.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe::storage::{CollectionSpec, Store, StoreLocation};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> scribe::error::Result<()> {
    /// let store = Store::open(
    ///     &StoreLocation::Temporary,
    ///     "demo",
    ///     1,
    ///     &[CollectionSpec::new("notes", "title")],
    /// )
    /// .await?;
    /// assert_eq!(store.collection_names(), vec!["notes".to_string()]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open(
        location: &StoreLocation,
        name: &str,
        version: u32,
        collections: &[CollectionSpec],
    ) -> Result<Self> {
        let location = location.clone();
        let name = name.to_string();
        let specs = collections.to_vec();

        let inner = tokio::task::spawn_blocking(move || {
            open_blocking(&location, &name, version, &specs)
        })
        .await
        .map_err(|e| ScribeError::StorageUnavailable(format!("open task failed: {}", e)))??;

        tracing::info!(
            "Opened store '{}' (version {}) with {} collections, recovered={}",
            inner.name,
            inner.version,
            inner.collections.len(),
            inner.db.was_recovered()
        );

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Database name this handle was opened with
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Schema version recorded for this database
    pub fn version(&self) -> u32 {
        self.inner.version
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.collections.keys().cloned().collect();
        names.sort();
        names
    }

    /// Fetch one record by key; absence is `Ok(None)`
    pub async fn get<R: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<R>> {
        let col = self.collection(collection)?;
        let key = key.to_string();
        let found = run_blocking("get", move || {
            col.tree
                .get(key.as_bytes())
                .map_err(|e| ScribeError::StorageIo(format!("Get failed: {}", e)))
        })
        .await?;

        found.map(|bytes| decode(&bytes)).transpose()
    }

    /// Fetch every record in a collection, in no particular order
    pub async fn get_all<R: DeserializeOwned>(&self, collection: &str) -> Result<Vec<R>> {
        let col = self.collection(collection)?;
        let values = run_blocking("get_all", move || {
            col.tree
                .iter()
                .values()
                .collect::<std::result::Result<Vec<IVec>, _>>()
                .map_err(|e| ScribeError::StorageIo(format!("Iteration failed: {}", e)))
        })
        .await?;

        values.iter().map(|bytes| decode(bytes)).collect()
    }

    /// Number of records in a collection
    pub async fn count(&self, collection: &str) -> Result<usize> {
        let col = self.collection(collection)?;
        run_blocking("count", move || Ok(col.tree.len())).await
    }

    /// Insert or replace a record under its own key
    pub async fn put<R: Serialize>(&self, collection: &str, record: &R) -> Result<()> {
        let col = self.collection(collection)?;
        let (key, bytes) = encode(record, &col.key_path)?;
        tracing::debug!("put {}/{}", collection, key);

        run_blocking("put", move || {
            col.tree
                .insert(key.as_bytes(), bytes)
                .map_err(|e| ScribeError::StorageIo(format!("Insert failed: {}", e)))?;
            flush(&col.tree)
        })
        .await
    }

    /// Insert a record only if its key is not already present
    pub async fn insert_new<R: Serialize>(
        &self,
        collection: &str,
        record: &R,
    ) -> Result<WriteOutcome> {
        let col = self.collection(collection)?;
        let (key, bytes) = encode(record, &col.key_path)?;
        tracing::debug!("insert_new {}/{}", collection, key);

        run_blocking("insert_new", move || {
            let swapped = col
                .tree
                .compare_and_swap(key.as_bytes(), None as Option<&[u8]>, Some(bytes))
                .map_err(|e| ScribeError::StorageIo(format!("Insert failed: {}", e)))?;
            match swapped {
                Ok(()) => {
                    flush(&col.tree)?;
                    Ok(WriteOutcome::Written)
                }
                Err(_) => Ok(WriteOutcome::KeyTaken),
            }
        })
        .await
    }

    /// Move a record from `old_key` to its own key in one transaction
    ///
    /// The removal and the write commit together or not at all. If the new key
    /// already belongs to a different record the transaction is aborted and
    /// `WriteOutcome::KeyTaken` is returned with nothing changed.
    pub async fn rekey<R: Serialize>(
        &self,
        collection: &str,
        old_key: &str,
        record: &R,
    ) -> Result<WriteOutcome> {
        let col = self.collection(collection)?;
        let (new_key, bytes) = encode(record, &col.key_path)?;
        let old_key = old_key.to_string();
        tracing::debug!("rekey {}/{} -> {}", collection, old_key, new_key);

        run_blocking("rekey", move || {
            let result = col.tree.transaction(|tx| {
                if new_key != old_key && tx.get(new_key.as_bytes())?.is_some() {
                    return Err(ConflictableTransactionError::Abort(()));
                }
                tx.remove(old_key.as_bytes())?;
                tx.insert(new_key.as_bytes(), bytes.as_slice())?;
                Ok(())
            });

            match result {
                Ok(()) => {
                    flush(&col.tree)?;
                    Ok(WriteOutcome::Written)
                }
                Err(sled::transaction::TransactionError::Abort(())) => Ok(WriteOutcome::KeyTaken),
                Err(sled::transaction::TransactionError::Storage(e)) => {
                    Err(ScribeError::StorageIo(format!("Transaction failed: {}", e)))
                }
            }
        })
        .await
    }

    /// Remove a record if present
    pub async fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let col = self.collection(collection)?;
        let key = key.to_string();
        tracing::debug!("delete {}/{}", collection, key);

        run_blocking("delete", move || {
            col.tree
                .remove(key.as_bytes())
                .map_err(|e| ScribeError::StorageIo(format!("Delete failed: {}", e)))?;
            flush(&col.tree)
        })
        .await
    }

    /// Remove every record in a collection
    pub async fn clear(&self, collection: &str) -> Result<()> {
        let col = self.collection(collection)?;
        tracing::debug!("clear {}", collection);

        run_blocking("clear", move || {
            col.tree
                .clear()
                .map_err(|e| ScribeError::StorageIo(format!("Clear failed: {}", e)))?;
            flush(&col.tree)
        })
        .await
    }

    fn collection(&self, name: &str) -> Result<Collection> {
        self.inner.collections.get(name).cloned().ok_or_else(|| {
            ScribeError::StorageIo(format!(
                "Unknown collection '{}' in store '{}'",
                name, self.inner.name
            ))
            .into()
        })
    }
}

fn open_blocking(
    location: &StoreLocation,
    name: &str,
    version: u32,
    specs: &[CollectionSpec],
) -> std::result::Result<StoreInner, ScribeError> {
    let unavailable = |e: &dyn std::fmt::Display| {
        ScribeError::StorageUnavailable(format!("Failed to open database '{}': {}", name, e))
    };

    let db = match location {
        StoreLocation::Directory(dir) => {
            let path = dir.join(name);
            std::fs::create_dir_all(&path).map_err(|e| unavailable(&e))?;
            sled::open(&path).map_err(|e| unavailable(&e))?
        }
        StoreLocation::Temporary => sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| unavailable(&e))?,
    };

    let schema = db.open_tree(SCHEMA_TREE).map_err(|e| unavailable(&e))?;

    let stored_version = schema
        .get(VERSION_KEY)
        .map_err(|e| unavailable(&e))?
        .and_then(|bytes| <[u8; 4]>::try_from(&bytes[..]).ok())
        .map(u32::from_be_bytes)
        .unwrap_or(0);

    if stored_version > version {
        return Err(ScribeError::StorageUnavailable(format!(
            "Database '{}' has schema version {} but version {} was requested",
            name, stored_version, version
        )));
    }

    let mut collections = HashMap::new();
    for spec in specs {
        let meta_key = format!("{}{}", KEY_PATH_PREFIX, spec.name);
        match schema.get(meta_key.as_bytes()).map_err(|e| unavailable(&e))? {
            Some(existing) if &existing[..] != spec.key_path.as_bytes() => {
                return Err(ScribeError::StorageUnavailable(format!(
                    "Collection '{}' is keyed by '{}', not '{}'",
                    spec.name,
                    String::from_utf8_lossy(&existing),
                    spec.key_path
                )));
            }
            Some(_) => {}
            None => {
                tracing::info!(
                    "Creating collection '{}' keyed by '{}' in '{}'",
                    spec.name,
                    spec.key_path,
                    name
                );
                schema
                    .insert(meta_key.as_bytes(), spec.key_path.as_bytes())
                    .map_err(|e| unavailable(&e))?;
            }
        }

        let tree = db.open_tree(spec.name).map_err(|e| unavailable(&e))?;
        collections.insert(
            spec.name.to_string(),
            Collection {
                tree,
                key_path: spec.key_path.to_string(),
            },
        );
    }

    if stored_version < version {
        schema
            .insert(VERSION_KEY, version.to_be_bytes().to_vec())
            .map_err(|e| unavailable(&e))?;
    }
    schema.flush().map_err(|e| unavailable(&e))?;

    Ok(StoreInner {
        name: name.to_string(),
        version,
        db,
        collections,
    })
}

async fn run_blocking<T, F>(op: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> std::result::Result<T, ScribeError> + Send + 'static,
    T: Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ScribeError::StorageIo(format!("{} task failed: {}", op, e)))?;
    outcome.map_err(|e| {
        tracing::warn!("Store {} failed: {}", op, e);
        e.into()
    })
}

fn flush(tree: &Tree) -> std::result::Result<(), ScribeError> {
    tree.flush()
        .map(|_| ())
        .map_err(|e| ScribeError::StorageIo(format!("Flush failed: {}", e)))
}

fn encode<R: Serialize>(record: &R, key_path: &str) -> Result<(String, Vec<u8>)> {
    let value = serde_json::to_value(record)
        .map_err(|e| ScribeError::StorageIo(format!("Serialization failed: {}", e)))?;
    let key = match value.get(key_path) {
        Some(serde_json::Value::String(key)) if !key.is_empty() => key.clone(),
        _ => {
            return Err(ScribeError::StorageIo(format!(
                "Record has no non-empty string key at '{}'",
                key_path
            ))
            .into())
        }
    };
    let bytes = serde_json::to_vec(&value)
        .map_err(|e| ScribeError::StorageIo(format!("Serialization failed: {}", e)))?;
    Ok((key, bytes))
}

fn decode<R: DeserializeOwned>(bytes: &[u8]) -> Result<R> {
    serde_json::from_slice(bytes)
        .map_err(|e| ScribeError::StorageIo(format!("Deserialization failed: {}", e)).into())
}
