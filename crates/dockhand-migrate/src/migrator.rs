use std::fmt;

use dockhand_store::{DataStore, StateStore};
use tracing::info;

use crate::steps::default_thresholds;
use crate::SCHEMA_VERSION;

/// A single unit of schema transformation work.
///
/// A step reads the full contents of the collection(s) it targets through
/// the typed record services, transforms every record according to its rule,
/// and persists each result back before returning. It runs exactly once per
/// store lifetime, at the fixed position the threshold table assigns to it,
/// and must have no observable effect outside the store.
pub trait MigrationStep<S: StateStore> {
    /// Stable name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Apply the transformation.
    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError>;
}

/// Failure of a single [`MigrationStep`].
#[derive(Debug)]
pub enum StepError {
    /// A collection could not be enumerated or a document decoded.
    Read(String),
    /// The step's rule could not be applied to a record.
    Transform(String),
    /// Persisting a transformed record failed.
    Write(String),
}

impl StepError {
    /// A read failure from the given cause.
    pub fn read(err: impl fmt::Display) -> Self {
        Self::Read(err.to_string())
    }

    /// A transform failure from the given cause.
    pub fn transform(err: impl fmt::Display) -> Self {
        Self::Transform(err.to_string())
    }

    /// A write failure from the given cause.
    pub fn write(err: impl fmt::Display) -> Self {
        Self::Write(err.to_string())
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(msg) => write!(f, "read failed: {msg}"),
            Self::Transform(msg) => write!(f, "transform failed: {msg}"),
            Self::Write(msg) => write!(f, "write failed: {msg}"),
        }
    }
}

impl std::error::Error for StepError {}

/// Error from a migration run.
#[derive(Debug)]
pub enum MigrationError {
    /// The store records a newer schema than this build targets. That is a
    /// configuration or packaging error; there is no downgrade path.
    StoreAhead { stored: u32, target: u32 },
    /// A step failed. Nothing after it was executed and nothing already
    /// applied was rolled back.
    Step {
        /// Threshold version the step belongs to.
        version: u32,
        /// Name of the failed step.
        step: &'static str,
        source: StepError,
    },
    /// Every step succeeded but recording the new schema version failed.
    /// The data is fully migrated; only the version marker is stale.
    VersionCommit(String),
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StoreAhead { stored, target } => {
                write!(f, "store schema v{stored} is newer than target v{target}")
            }
            Self::Step {
                version,
                step,
                source,
            } => {
                write!(f, "migration to v{version} failed in step '{step}': {source}")
            }
            Self::VersionCommit(msg) => {
                write!(f, "failed to record schema version: {msg}")
            }
        }
    }
}

impl std::error::Error for MigrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Step { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A schema version together with the steps that bring the store up to it.
///
/// Moving a store from below `version` to `version` or above means running
/// these steps, in declared order, exactly once.
pub struct Threshold<S: StateStore> {
    version: u32,
    steps: Vec<Box<dyn MigrationStep<S>>>,
}

impl<S: StateStore> Threshold<S> {
    /// Pair a version with its steps.
    pub fn new(version: u32, steps: Vec<Box<dyn MigrationStep<S>>>) -> Self {
        Self { version, steps }
    }

    /// The schema version this threshold brings the store up to.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The steps, in execution order.
    pub fn steps(&self) -> &[Box<dyn MigrationStep<S>>] {
        &self.steps
    }
}

/// The migration orchestrator.
///
/// Holds the store handle, the schema version observed on disk, the version
/// this build targets, and the ascending threshold table. [`migrate`] walks
/// the table once: thresholds at or below the observed version are skipped,
/// the rest run in order, and the target version is committed only after
/// every required step succeeded.
///
/// [`migrate`]: Migrator::migrate
///
/// # Example
///
/// ```
/// use dockhand_migrate::Migrator;
/// use dockhand_store::{DataStore, MemoryStore};
///
/// let mut db = DataStore::new(MemoryStore::new());
/// db.set_db_version(3).unwrap();
///
/// // No data changed shape between v3 and v4, so the table is empty; the
/// // run still moves the version record forward.
/// let mut migrator = Migrator::with_table(&mut db, 3, 4, vec![]);
/// migrator.migrate().unwrap();
///
/// assert_eq!(db.db_version().unwrap(), Some(4));
/// ```
pub struct Migrator<'a, S: StateStore> {
    store: &'a mut DataStore<S>,
    stored_version: u32,
    target_version: u32,
    thresholds: Vec<Threshold<S>>,
}

impl<'a, S: StateStore> Migrator<'a, S> {
    /// Create a migrator over the built-in threshold table, targeting
    /// [`SCHEMA_VERSION`].
    ///
    /// `stored_version` is the version read from the store's version record
    /// before migration begins.
    pub fn new(store: &'a mut DataStore<S>, stored_version: u32) -> Self {
        Self::with_table(store, stored_version, SCHEMA_VERSION, default_thresholds())
    }

    /// Create a migrator over an explicit threshold table and target.
    ///
    /// The table is sorted by version; registration order does not matter.
    pub fn with_table(
        store: &'a mut DataStore<S>,
        stored_version: u32,
        target_version: u32,
        mut thresholds: Vec<Threshold<S>>,
    ) -> Self {
        thresholds.sort_by_key(Threshold::version);
        Self {
            store,
            stored_version,
            target_version,
            thresholds,
        }
    }

    /// The schema version observed on disk.
    pub fn stored_version(&self) -> u32 {
        self.stored_version
    }

    /// The schema version this run migrates to.
    pub fn target_version(&self) -> u32 {
        self.target_version
    }

    /// Whether a run would do anything.
    pub fn needs_migration(&self) -> bool {
        self.stored_version != self.target_version
    }

    /// Run the migration.
    ///
    /// Walks the threshold table in ascending version order. A threshold at
    /// or below the stored version has already been applied and is skipped
    /// entirely; one above the target version belongs to a newer build and
    /// is not reached. Steps within a threshold run in declared order.
    ///
    /// The first failing step aborts the run: no later step executes, and
    /// steps that already ran are not rolled back. The target version is
    /// written to the version record only after every required threshold
    /// completed; when the stored version already equals the target the run
    /// performs no writes at all.
    pub fn migrate(&mut self) -> Result<(), MigrationError> {
        if self.stored_version > self.target_version {
            return Err(MigrationError::StoreAhead {
                stored: self.stored_version,
                target: self.target_version,
            });
        }
        if self.stored_version == self.target_version {
            return Ok(());
        }

        for threshold in &self.thresholds {
            if threshold.version <= self.stored_version {
                continue;
            }
            if threshold.version > self.target_version {
                break;
            }
            for step in &threshold.steps {
                info!(version = threshold.version, step = step.name(), "applying migration step");
                step.run(self.store).map_err(|source| MigrationError::Step {
                    version: threshold.version,
                    step: step.name(),
                    source,
                })?;
            }
        }

        self.store
            .set_db_version(self.target_version)
            .map_err(|e| MigrationError::VersionCommit(e.to_string()))?;
        info!(
            from = self.stored_version,
            to = self.target_version,
            "data store migrated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use dockhand_store::{MemoryStore, StateStore};

    use super::*;

    /// Appends its label to a shared log when run.
    struct RecordingStep {
        label: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl<S: StateStore> MigrationStep<S> for RecordingStep {
        fn name(&self) -> &'static str {
            self.label
        }

        fn run(&self, _store: &mut DataStore<S>) -> Result<(), StepError> {
            self.log.borrow_mut().push(self.label);
            Ok(())
        }
    }

    /// Fails with a transform error after logging itself.
    struct FailingStep {
        label: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl<S: StateStore> MigrationStep<S> for FailingStep {
        fn name(&self) -> &'static str {
            self.label
        }

        fn run(&self, _store: &mut DataStore<S>) -> Result<(), StepError> {
            self.log.borrow_mut().push(self.label);
            Err(StepError::transform("boom"))
        }
    }

    fn recording(
        label: &'static str,
        log: &Rc<RefCell<Vec<&'static str>>>,
    ) -> Box<dyn MigrationStep<MemoryStore>> {
        Box::new(RecordingStep {
            label,
            log: Rc::clone(log),
        })
    }

    #[test]
    fn noop_when_already_at_target() {
        let mut db = DataStore::new(MemoryStore::new());
        db.set_db_version(4).unwrap();
        let writes_before = db.backend().write_count();

        let log = Rc::new(RefCell::new(Vec::new()));
        let table = vec![Threshold::new(4, vec![recording("v4", &log)])];
        Migrator::with_table(&mut db, 4, 4, table).migrate().unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(db.backend().write_count(), writes_before);
        assert_eq!(db.db_version().unwrap(), Some(4));
    }

    #[test]
    fn runs_pending_thresholds_in_ascending_order() {
        let mut db = DataStore::new(MemoryStore::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        // Registered out of order on purpose.
        let table = vec![
            Threshold::new(3, vec![recording("v3", &log)]),
            Threshold::new(2, vec![recording("v2-a", &log), recording("v2-b", &log)]),
            Threshold::new(4, vec![recording("v4", &log)]),
        ];
        Migrator::with_table(&mut db, 1, 4, table).migrate().unwrap();

        assert_eq!(*log.borrow(), vec!["v2-a", "v2-b", "v3", "v4"]);
        assert_eq!(db.db_version().unwrap(), Some(4));
    }

    #[test]
    fn skips_thresholds_at_or_below_stored_version() {
        let mut db = DataStore::new(MemoryStore::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let table = vec![
            Threshold::new(1, vec![recording("v1", &log)]),
            Threshold::new(2, vec![recording("v2", &log)]),
            Threshold::new(3, vec![recording("v3", &log)]),
        ];
        Migrator::with_table(&mut db, 2, 3, table).migrate().unwrap();

        assert_eq!(*log.borrow(), vec!["v3"]);
    }

    #[test]
    fn thresholds_beyond_target_do_not_run() {
        let mut db = DataStore::new(MemoryStore::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let table = vec![
            Threshold::new(5, vec![recording("v5", &log)]),
            Threshold::new(6, vec![recording("v6", &log)]),
        ];
        Migrator::with_table(&mut db, 4, 5, table).migrate().unwrap();

        assert_eq!(*log.borrow(), vec!["v5"]);
        assert_eq!(db.db_version().unwrap(), Some(5));
    }

    #[test]
    fn halts_on_first_failure_and_leaves_version_unchanged() {
        let mut db = DataStore::new(MemoryStore::new());
        db.set_db_version(1).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));

        let failing: Box<dyn MigrationStep<MemoryStore>> = Box::new(FailingStep {
            label: "v3-fails",
            log: Rc::clone(&log),
        });
        let table = vec![
            Threshold::new(2, vec![recording("v2", &log)]),
            Threshold::new(3, vec![failing, recording("v3-after", &log)]),
            Threshold::new(4, vec![recording("v4", &log)]),
        ];

        let err = Migrator::with_table(&mut db, 1, 4, table)
            .migrate()
            .unwrap_err();

        match err {
            MigrationError::Step {
                version,
                step,
                source,
            } => {
                assert_eq!(version, 3);
                assert_eq!(step, "v3-fails");
                assert!(matches!(source, StepError::Transform(_)));
            }
            other => panic!("unexpected error: {other}"),
        }

        // v2 ran and stays applied; nothing after the failure ran.
        assert_eq!(*log.borrow(), vec!["v2", "v3-fails"]);
        assert_eq!(db.db_version().unwrap(), Some(1));
    }

    #[test]
    fn store_ahead_is_an_error() {
        let mut db = DataStore::new(MemoryStore::new());
        let err = Migrator::with_table(&mut db, 7, 5, vec![])
            .migrate()
            .unwrap_err();
        assert!(matches!(
            err,
            MigrationError::StoreAhead {
                stored: 7,
                target: 5
            }
        ));
    }

    #[test]
    fn needs_migration() {
        let mut db = DataStore::new(MemoryStore::new());
        let migrator = Migrator::with_table(&mut db, 3, 5, vec![]);
        assert_eq!(migrator.stored_version(), 3);
        assert_eq!(migrator.target_version(), 5);
        assert!(migrator.needs_migration());
        assert!(!Migrator::with_table(&mut db, 5, 5, vec![]).needs_migration());
    }

    /// Backend that refuses writes to the version namespace.
    struct VersionWriteFails {
        inner: MemoryStore,
    }

    impl StateStore for VersionWriteFails {
        type Error = String;

        fn put(&mut self, namespace: &str, key: &str, value: &[u8]) -> Result<(), Self::Error> {
            if namespace == "version" {
                return Err("disk full".to_string());
            }
            self.inner.put(namespace, key, value).map_err(|e| e.to_string())
        }

        fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, Self::Error> {
            self.inner.get(namespace, key).map_err(|e| e.to_string())
        }

        fn delete(&mut self, namespace: &str, key: &str) -> Result<(), Self::Error> {
            self.inner.delete(namespace, key).map_err(|e| e.to_string())
        }

        fn list_keys(&self, namespace: &str) -> Result<Vec<String>, Self::Error> {
            self.inner.list_keys(namespace).map_err(|e| e.to_string())
        }
    }

    #[test]
    fn failed_version_commit_is_reported_distinctly() {
        let mut db = DataStore::new(VersionWriteFails {
            inner: MemoryStore::new(),
        });

        struct Touch;
        impl<S: StateStore> MigrationStep<S> for Touch {
            fn name(&self) -> &'static str {
                "touch"
            }
            fn run(&self, _store: &mut DataStore<S>) -> Result<(), StepError> {
                Ok(())
            }
        }

        let steps: Vec<Box<dyn MigrationStep<VersionWriteFails>>> = vec![Box::new(Touch)];
        let err = Migrator::with_table(&mut db, 1, 2, vec![Threshold::new(2, steps)])
            .migrate()
            .unwrap_err();

        assert!(matches!(err, MigrationError::VersionCommit(_)), "got: {err}");
        assert_eq!(db.db_version().unwrap(), None);
    }
}
