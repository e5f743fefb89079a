//! # dockhand-migrate
//!
//! Startup schema migration engine for the dockhand data store.
//!
//! Every release records the schema version its data model conforms to in
//! [`SCHEMA_VERSION`]. On startup, before anything else touches the store,
//! the hosting application reads the version record, hands it to a
//! [`Migrator`], and refuses to serve if the run fails: a partially
//! migrated store must never receive traffic.
//!
//! The migrator walks an ascending table of version thresholds, each pairing
//! a schema version with the [`MigrationStep`]s that bring the store up to
//! it. Thresholds at or below the stored version were applied by an earlier
//! startup and are skipped, which is what makes re-running on an up-to-date
//! store a no-op. The first failing step aborts the run and leaves the
//! version record untouched, so the next startup resumes from the same
//! observed version.
//!
//! Adding a schema version is a data addition: append a threshold to the
//! table, freeze the superseded document shape next to the step that decodes
//! it, and bump [`SCHEMA_VERSION`]. Released thresholds are never edited.
//!
//! ## Startup flow
//!
//! ```
//! use dockhand_migrate::{Migrator, SCHEMA_VERSION};
//! use dockhand_store::{DataStore, MemoryStore};
//!
//! let mut db = DataStore::new(MemoryStore::new());
//!
//! // A brand-new store is stamped at the current version; an existing one
//! // reports the version its data was written at.
//! let observed = match db.db_version().unwrap() {
//!     Some(version) => version,
//!     None => {
//!         db.set_db_version(SCHEMA_VERSION).unwrap();
//!         SCHEMA_VERSION
//!     }
//! };
//!
//! Migrator::new(&mut db, observed).migrate().unwrap();
//! assert_eq!(db.db_version().unwrap(), Some(SCHEMA_VERSION));
//! ```

mod legacy;
mod migrator;
mod steps;

pub use migrator::{MigrationError, MigrationStep, Migrator, StepError, Threshold};
pub use steps::default_thresholds;

/// Schema version the current build reads and writes.
pub const SCHEMA_VERSION: u32 = 12;
