//! The released upgrade path, one module per collection.

pub mod endpoint_groups;
pub mod endpoints;
pub mod resource_controls;
pub mod settings;
pub mod stacks;
pub mod users;

use dockhand_store::StateStore;

use crate::migrator::Threshold;

/// The built-in threshold table, in release order.
///
/// Append-only: a new schema version is added at the end with the next
/// version number; released entries are never edited. Steps within a
/// threshold run in declared order and may rely on the effects of the ones
/// before them.
pub fn default_thresholds<S: StateStore>() -> Vec<Threshold<S>> {
    vec![
        Threshold::new(1, vec![Box::new(users::PromoteInitialAdmin)]),
        Threshold::new(
            2,
            vec![
                Box::new(resource_controls::ExpandAccessLevels),
                Box::new(endpoints::AttachAuthorizedUsers),
            ],
        ),
        Threshold::new(3, vec![Box::new(settings::IntroduceHiddenLabels)]),
        Threshold::new(4, vec![Box::new(endpoints::ExpandTlsConfig)]),
        Threshold::new(5, vec![Box::new(settings::DefaultBindMounts)]),
        Threshold::new(6, vec![Box::new(settings::DefaultPrivilegedMode)]),
        Threshold::new(7, vec![Box::new(settings::DefaultExternalTemplates)]),
        Threshold::new(8, vec![Box::new(endpoints::AttachAuthorizedTeams)]),
        Threshold::new(9, vec![Box::new(endpoints::AttachPublicUrl)]),
        Threshold::new(10, vec![Box::new(endpoints::ClassifyKind)]),
        Threshold::new(11, vec![Box::new(endpoints::PruneDisabledTlsPaths)]),
        Threshold::new(
            12,
            vec![
                Box::new(endpoint_groups::SeedUnassignedGroup),
                Box::new(endpoints::AssignDefaultGroup),
                Box::new(stacks::QualifyStackKeys),
            ],
        ),
    ]
}
