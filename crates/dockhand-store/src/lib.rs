//! # dockhand-store
//!
//! Persistence layer for dockhand: a namespaced key-value abstraction with
//! in-memory and SQLite backends, and a typed record layer over it.
//!
//! Each record collection (endpoints, endpoint groups, users, settings,
//! stacks, resource controls) lives in its own namespace and is stored as
//! JSON documents. The schema version the data on disk conforms to is
//! recorded in a single version record; bringing the data up to the version
//! the running build expects is the job of the `dockhand-migrate` crate.
//!
//! ## Quick Start
//!
//! ```
//! use dockhand_store::{MemoryStore, StateStore};
//!
//! let mut store = MemoryStore::new();
//! store.put("endpoints", "1", br#"{"id":1}"#).unwrap();
//! let data = store.get("endpoints", "1").unwrap();
//! assert_eq!(data.as_deref(), Some(br#"{"id":1}"#.as_slice()));
//! ```
//!
//! ## Backends
//!
//! | Backend | Feature flag | Use case |
//! |---------|-------------|----------|
//! | [`MemoryStore`] | *(always available)* | Testing, prototyping |
//! | `SqliteStore` | `sqlite` | Production deployments |

mod db;
mod memory;
mod records;
#[cfg(feature = "sqlite")]
mod sqlite;
mod traits;

pub use db::{DataStore, Records, StoreError};
pub use memory::{MemoryError, MemoryStore};
pub use records::{
    Endpoint, EndpointGroup, EndpointKind, Pair, Record, ResourceControl, Settings, Stack,
    TlsConfig, User, UserRole, SETTINGS_KEY, UNASSIGNED_GROUP_ID,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{JournalMode, SqliteConfig, SqliteError, SqliteStore};
pub use traits::StateStore;
