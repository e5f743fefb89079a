use dockhand_store::{DataStore, ResourceControl, StateStore};

use crate::legacy::ResourceControlV2;
use crate::migrator::{MigrationStep, StepError};

/// Legacy access level: visible to the owner only.
const ACCESS_PRIVATE: u8 = 1;
/// Legacy access level: visible to everyone.
const ACCESS_PUBLIC: u8 = 2;

/// v2: the scalar `access_level` + `owner_id` pair becomes explicit
/// `users` / `public` fields. An access level outside the released codes
/// fails the whole step.
pub struct ExpandAccessLevels;

impl<S: StateStore> MigrationStep<S> for ExpandAccessLevels {
    fn name(&self) -> &'static str {
        "resource-controls.expand-access-level"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let controls = store
            .records::<ResourceControlV2>()
            .list()
            .map_err(StepError::read)?;
        for control in controls {
            let Some(level) = control.access_level else {
                // Already in the expanded shape.
                continue;
            };
            let expanded = match level {
                ACCESS_PRIVATE => ResourceControl {
                    id: control.id,
                    resource_id: control.resource_id,
                    users: control.owner_id.into_iter().collect(),
                    teams: vec![],
                    public: false,
                },
                ACCESS_PUBLIC => ResourceControl {
                    id: control.id,
                    resource_id: control.resource_id,
                    users: vec![],
                    teams: vec![],
                    public: true,
                },
                other => {
                    return Err(StepError::transform(format!(
                        "resource control {}: unknown access level {other}",
                        control.id
                    )))
                }
            };
            store
                .records::<ResourceControl>()
                .update(&expanded)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dockhand_store::MemoryStore;
    use serde_json::json;

    use super::*;

    fn seed(db: &mut DataStore<MemoryStore>, key: &str, doc: serde_json::Value) {
        db.backend_mut()
            .put("resource_controls", key, &serde_json::to_vec(&doc).unwrap())
            .unwrap();
    }

    #[test]
    fn private_control_becomes_owner_scoped() {
        let mut db = DataStore::new(MemoryStore::new());
        seed(
            &mut db,
            "1",
            json!({"id": 1, "resource_id": "c0ffee", "owner_id": 9, "access_level": 1}),
        );

        ExpandAccessLevels.run(&mut db).unwrap();

        let rc = db.resource_controls().get("1").unwrap().unwrap();
        assert_eq!(rc.users, vec![9]);
        assert!(!rc.public);
    }

    #[test]
    fn public_control_becomes_public_flag() {
        let mut db = DataStore::new(MemoryStore::new());
        seed(
            &mut db,
            "2",
            json!({"id": 2, "resource_id": "beef", "owner_id": 9, "access_level": 2}),
        );

        ExpandAccessLevels.run(&mut db).unwrap();

        let rc = db.resource_controls().get("2").unwrap().unwrap();
        assert!(rc.users.is_empty());
        assert!(rc.public);
    }

    #[test]
    fn unknown_access_level_fails_the_step() {
        let mut db = DataStore::new(MemoryStore::new());
        seed(
            &mut db,
            "3",
            json!({"id": 3, "resource_id": "dead", "owner_id": 9, "access_level": 4}),
        );

        let err = ExpandAccessLevels.run(&mut db).unwrap_err();
        assert!(matches!(err, StepError::Transform(_)), "got: {err}");
    }

    #[test]
    fn expanded_controls_pass_through() {
        let mut db = DataStore::new(MemoryStore::new());
        seed(
            &mut db,
            "4",
            json!({"id": 4, "resource_id": "f00d", "users": [3], "teams": [], "public": false}),
        );
        let writes_before = db.backend().write_count();

        ExpandAccessLevels.run(&mut db).unwrap();

        assert_eq!(db.backend().write_count(), writes_before);
    }
}
