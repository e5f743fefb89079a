use dockhand_store::{DataStore, StateStore, User, UserRole};

use crate::legacy::UserV1;
use crate::migrator::{MigrationStep, StepError};

/// v1: accounts created before roles were enforced carry role code 0.
/// The bootstrap account (id 1) becomes an administrator, everyone else a
/// standard user.
pub struct PromoteInitialAdmin;

impl<S: StateStore> MigrationStep<S> for PromoteInitialAdmin {
    fn name(&self) -> &'static str {
        "users.promote-initial-admin"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let users = store.records::<UserV1>().list().map_err(StepError::read)?;
        for user in users {
            if user.role != 0 {
                continue;
            }
            let role = if user.id == 1 {
                UserRole::Administrator
            } else {
                UserRole::Standard
            };
            let migrated = User {
                id: user.id,
                username: user.username,
                password: user.password,
                role,
            };
            store
                .records::<User>()
                .update(&migrated)
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
            .put("users", key, &serde_json::to_vec(&doc).unwrap())
            .unwrap();
    }

    #[test]
    fn promotes_bootstrap_account_and_demotes_the_rest() {
        let mut db = DataStore::new(MemoryStore::new());
        seed(&mut db, "1", json!({"id": 1, "username": "admin", "password": "h1"}));
        seed(&mut db, "2", json!({"id": 2, "username": "ops", "password": "h2"}));

        PromoteInitialAdmin.run(&mut db).unwrap();

        let users = db.users().list().unwrap();
        assert_eq!(users[0].role, UserRole::Administrator);
        assert_eq!(users[1].role, UserRole::Standard);
    }

    #[test]
    fn leaves_accounts_with_roles_alone() {
        let mut db = DataStore::new(MemoryStore::new());
        seed(
            &mut db,
            "2",
            json!({"id": 2, "username": "ops", "password": "h", "role": 2}),
        );
        let writes_before = db.backend().write_count();

        PromoteInitialAdmin.run(&mut db).unwrap();

        assert_eq!(db.backend().write_count(), writes_before);
        assert_eq!(db.users().get("2").unwrap().unwrap().role, UserRole::Standard);
    }

    #[test]
    fn rerun_is_a_noop() {
        let mut db = DataStore::new(MemoryStore::new());
        seed(&mut db, "1", json!({"id": 1, "username": "admin", "password": "h"}));

        PromoteInitialAdmin.run(&mut db).unwrap();
        let writes_before = db.backend().write_count();
        PromoteInitialAdmin.run(&mut db).unwrap();

        assert_eq!(db.backend().write_count(), writes_before);
    }
}
