use dockhand_store::{DataStore, EndpointGroup, StateStore, UNASSIGNED_GROUP_ID};
use tracing::info;

use crate::migrator::{MigrationStep, StepError};

/// v12: seed the built-in "Unassigned" group, the home for endpoints
/// without an explicit group. Runs before the endpoint step that assigns
/// group ids.
pub struct SeedUnassignedGroup;

impl<S: StateStore> MigrationStep<S> for SeedUnassignedGroup {
    fn name(&self) -> &'static str {
        "endpoint-groups.seed-unassigned"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let key = UNASSIGNED_GROUP_ID.to_string();
        let existing = store
            .records::<EndpointGroup>()
            .get(&key)
            .map_err(StepError::read)?;
        if existing.is_some() {
            return Ok(());
        }
        let group = EndpointGroup {
            id: UNASSIGNED_GROUP_ID,
            name: "Unassigned".to_string(),
            description: "Endpoints not assigned to any group".to_string(),
            labels: vec![],
        };
        store
            .records::<EndpointGroup>()
            .update(&group)
            .map_err(StepError::write)?;
        info!(id = UNASSIGNED_GROUP_ID, "seeded built-in endpoint group");
        Ok(())
    }
}
