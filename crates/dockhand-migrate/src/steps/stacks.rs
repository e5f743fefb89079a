use dockhand_store::{DataStore, Record, Stack, StateStore};
use tracing::info;

use crate::migrator::{MigrationStep, StepError};

/// v12: stack records move from bare `name` keys to the composite
/// `<name>_<endpoint_id>` key so the same stack name can exist on several
/// endpoints. Each record is re-written under its new key and the old key
/// deleted.
pub struct QualifyStackKeys;

impl<S: StateStore> MigrationStep<S> for QualifyStackKeys {
    fn name(&self) -> &'static str {
        "stacks.qualify-keys"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let keys = store.records::<Stack>().keys().map_err(StepError::read)?;
        let mut moved = 0usize;
        for key in keys {
            let Some(stack) = store
                .records::<Stack>()
                .get(&key)
                .map_err(StepError::read)?
            else {
                continue;
            };
            if stack.key() == key {
                continue;
            }
            store
                .records::<Stack>()
                .update(&stack)
                .map_err(StepError::write)?;
            store
                .records::<Stack>()
                .delete(&key)
                .map_err(StepError::write)?;
            moved += 1;
        }
        if moved > 0 {
            info!(moved, "re-keyed stack records");
        }
        Ok(())
    }
}
