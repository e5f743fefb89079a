//! High-level typed access over a storage backend.
//!
//! `DataStore` wraps a [`StateStore`] backend and exposes one typed record
//! service per collection, plus the schema-version record. Records are
//! encoded as JSON documents so that older documents stay readable while a
//! migration is pending.
//!
//! # Example
//!
//! ```
//! use dockhand_store::{DataStore, MemoryStore, Record};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize)]
//! struct Note {
//!     id: u64,
//!     body: String,
//! }
//!
//! impl Record for Note {
//!     const NAMESPACE: &'static str = "notes";
//!     fn key(&self) -> String {
//!         self.id.to_string()
//!     }
//! }
//!
//! let mut db = DataStore::new(MemoryStore::new());
//! db.records::<Note>()
//!     .update(&Note { id: 1, body: "hello".into() })
//!     .unwrap();
//!
//! let notes = db.records::<Note>().list().unwrap();
//! assert_eq!(notes[0].body, "hello");
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::records::{Endpoint, EndpointGroup, Record, ResourceControl, Settings, Stack, User};
use crate::traits::StateStore;

/// Namespace holding the schema-version record.
const VERSION_NAMESPACE: &str = "version";
/// Key of the schema-version record.
const VERSION_KEY: &str = "db_version";

/// Error type for `DataStore` operations.
#[derive(Debug)]
pub enum StoreError<E: fmt::Debug + fmt::Display> {
    /// Error from the underlying storage backend.
    Backend(E),
    /// Encoding a record to JSON failed.
    Encode(String),
    /// Decoding a stored document failed.
    Decode(String),
}

impl<E: fmt::Debug + fmt::Display> fmt::Display for StoreError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(e) => write!(f, "store error: {e}"),
            Self::Encode(msg) => write!(f, "encode error: {msg}"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for StoreError<E> {}

/// Typed record service for one collection.
///
/// Obtained from [`DataStore::records`] (or the named accessors). The type
/// parameter decides both the namespace and the document shape, so migration
/// code can open the same collection at a superseded shape.
pub struct Records<'a, S: StateStore, R: Record> {
    store: &'a mut S,
    _record: PhantomData<R>,
}

impl<'a, S: StateStore, R: Record> Records<'a, S, R> {
    /// All keys in the collection, in ascending order.
    pub fn keys(&self) -> Result<Vec<String>, StoreError<S::Error>> {
        self.store.list_keys(R::NAMESPACE).map_err(StoreError::Backend)
    }

    /// Decode every record in the collection, in key order.
    pub fn list(&self) -> Result<Vec<R>, StoreError<S::Error>> {
        let mut records = Vec::new();
        for key in self.keys()? {
            if let Some(record) = self.get(&key)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Decode one record by key. Returns `None` if the key does not exist.
    pub fn get(&self, key: &str) -> Result<Option<R>, StoreError<S::Error>> {
        let raw = self
            .store
            .get(R::NAMESPACE, key)
            .map_err(StoreError::Backend)?;
        match raw {
            Some(data) => {
                let record = serde_json::from_slice(&data).map_err(|e| {
                    StoreError::Decode(format!("{}/{key}: {e}", R::NAMESPACE))
                })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Persist a record under its own key, replacing any previous document.
    pub fn update(&mut self, record: &R) -> Result<(), StoreError<S::Error>> {
        let data = serde_json::to_vec(record)
            .map_err(|e| StoreError::Encode(format!("{}: {e}", R::NAMESPACE)))?;
        self.store
            .put(R::NAMESPACE, &record.key(), &data)
            .map_err(StoreError::Backend)
    }

    /// Delete a record by key.
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError<S::Error>> {
        self.store
            .delete(R::NAMESPACE, key)
            .map_err(StoreError::Backend)
    }
}

/// The application data store: a storage backend plus typed record services.
pub struct DataStore<S: StateStore> {
    store: S,
}

impl<S: StateStore> DataStore<S> {
    /// Wrap a storage backend.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// A reference to the underlying backend.
    pub fn backend(&self) -> &S {
        &self.store
    }

    /// A mutable reference to the underlying backend.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The typed record service for any [`Record`] type.
    pub fn records<R: Record>(&mut self) -> Records<'_, S, R> {
        Records {
            store: &mut self.store,
            _record: PhantomData,
        }
    }

    /// Endpoints collection at the current shape.
    pub fn endpoints(&mut self) -> Records<'_, S, Endpoint> {
        self.records()
    }

    /// Endpoint groups collection at the current shape.
    pub fn endpoint_groups(&mut self) -> Records<'_, S, EndpointGroup> {
        self.records()
    }

    /// Users collection at the current shape.
    pub fn users(&mut self) -> Records<'_, S, User> {
        self.records()
    }

    /// Resource controls collection at the current shape.
    pub fn resource_controls(&mut self) -> Records<'_, S, ResourceControl> {
        self.records()
    }

    /// Stacks collection at the current shape.
    pub fn stacks(&mut self) -> Records<'_, S, Stack> {
        self.records()
    }

    /// The settings singleton at the current shape.
    pub fn settings(&mut self) -> Records<'_, S, Settings> {
        self.records()
    }

    /// Read the schema version recorded on disk.
    ///
    /// `None` means the store has never been stamped, i.e. a brand-new store
    /// the bootstrap code initializes at the current version.
    pub fn db_version(&self) -> Result<Option<u32>, StoreError<S::Error>> {
        let raw = self
            .store
            .get(VERSION_NAMESPACE, VERSION_KEY)
            .map_err(StoreError::Backend)?;
        match raw {
            Some(data) => {
                let version = serde_json::from_slice(&data)
                    .map_err(|e| StoreError::Decode(format!("{VERSION_NAMESPACE}: {e}")))?;
                Ok(Some(version))
            }
            None => Ok(None),
        }
    }

    /// Record a new schema version.
    pub fn set_db_version(&mut self, version: u32) -> Result<(), StoreError<S::Error>> {
        let data = serde_json::to_vec(&version)
            .map_err(|e| StoreError::Encode(format!("{VERSION_NAMESPACE}: {e}")))?;
        self.store
            .put(VERSION_NAMESPACE, VERSION_KEY, &data)
            .map_err(StoreError::Backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Settings, Stack, User, UserRole};
    use crate::MemoryStore;

    fn test_db() -> DataStore<MemoryStore> {
        DataStore::new(MemoryStore::new())
    }

    #[test]
    fn typed_roundtrip() {
        let mut db = test_db();
        let user = User {
            id: 7,
            username: "ops".into(),
            password: "hash".into(),
            role: UserRole::Standard,
        };

        db.users().update(&user).unwrap();
        assert_eq!(db.users().get("7").unwrap(), Some(user.clone()));
        assert_eq!(db.users().list().unwrap(), vec![user]);

        db.users().delete("7").unwrap();
        assert_eq!(db.users().get("7").unwrap(), None);
    }

    #[test]
    fn stacks_keyed_by_name_and_endpoint() {
        let mut db = test_db();
        let stack = Stack {
            id: 1,
            name: "web".into(),
            endpoint_id: 2,
            entry_point: String::new(),
            env: vec![],
        };
        db.stacks().update(&stack).unwrap();
        assert_eq!(db.stacks().keys().unwrap(), vec!["web_2"]);
    }

    #[test]
    fn settings_is_a_singleton() {
        let mut db = test_db();
        db.settings().update(&Settings::default()).unwrap();
        db.settings()
            .update(&Settings {
                logo_url: "https://example.com/logo.png".into(),
                ..Settings::default()
            })
            .unwrap();

        let all = db.settings().list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].logo_url, "https://example.com/logo.png");
    }

    #[test]
    fn db_version_roundtrip() {
        let mut db = test_db();
        assert_eq!(db.db_version().unwrap(), None);

        db.set_db_version(12).unwrap();
        assert_eq!(db.db_version().unwrap(), Some(12));
    }

    #[test]
    fn corrupt_document_is_a_decode_error() {
        let mut db = test_db();
        db.backend_mut().put("users", "1", b"not json").unwrap();

        let err = db.users().get("1").unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)), "got: {err}");
    }
}
