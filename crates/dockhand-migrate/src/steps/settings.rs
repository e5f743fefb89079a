//! Settings steps. The settings record is a singleton; a store that never
//! persisted settings has nothing to transform and every step here accepts
//! that.

use dockhand_store::{DataStore, StateStore, SETTINGS_KEY};

use crate::legacy::{SettingsV3, SettingsV5, SettingsV6, SettingsV7};
use crate::migrator::{MigrationStep, StepError};

/// v3: the single `hidden_label_pattern` string becomes the
/// `hidden_labels` list.
pub struct IntroduceHiddenLabels;

impl<S: StateStore> MigrationStep<S> for IntroduceHiddenLabels {
    fn name(&self) -> &'static str {
        "settings.introduce-hidden-labels"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let Some(mut settings) = store
            .records::<SettingsV3>()
            .get(SETTINGS_KEY)
            .map_err(StepError::read)?
        else {
            return Ok(());
        };
        if settings.hidden_labels.is_some() {
            return Ok(());
        }
        let labels = match settings.hidden_label_pattern.take() {
            Some(pattern) if !pattern.is_empty() => vec![pattern],
            _ => vec![],
        };
        settings.hidden_labels = Some(labels);
        store
            .records::<SettingsV3>()
            .update(&settings)
            .map_err(StepError::write)
    }
}

/// v5: installs predating the bind-mount switch keep bind mounts allowed.
pub struct DefaultBindMounts;

impl<S: StateStore> MigrationStep<S> for DefaultBindMounts {
    fn name(&self) -> &'static str {
        "settings.default-bind-mounts"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let Some(mut settings) = store
            .records::<SettingsV5>()
            .get(SETTINGS_KEY)
            .map_err(StepError::read)?
        else {
            return Ok(());
        };
        if settings.allow_bind_mounts.is_some() {
            return Ok(());
        }
        settings.allow_bind_mounts = Some(true);
        store
            .records::<SettingsV5>()
            .update(&settings)
            .map_err(StepError::write)
    }
}

/// v6: likewise for privileged mode.
pub struct DefaultPrivilegedMode;

impl<S: StateStore> MigrationStep<S> for DefaultPrivilegedMode {
    fn name(&self) -> &'static str {
        "settings.default-privileged-mode"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let Some(mut settings) = store
            .records::<SettingsV6>()
            .get(SETTINGS_KEY)
            .map_err(StepError::read)?
        else {
            return Ok(());
        };
        if settings.allow_privileged_mode.is_some() {
            return Ok(());
        }
        settings.allow_privileged_mode = Some(true);
        store
            .records::<SettingsV6>()
            .update(&settings)
            .map_err(StepError::write)
    }
}

/// v7: existing installs keep templates local until opted in.
pub struct DefaultExternalTemplates;

impl<S: StateStore> MigrationStep<S> for DefaultExternalTemplates {
    fn name(&self) -> &'static str {
        "settings.default-external-templates"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let Some(mut settings) = store
            .records::<SettingsV7>()
            .get(SETTINGS_KEY)
            .map_err(StepError::read)?
        else {
            return Ok(());
        };
        if settings.external_templates.is_some() {
            return Ok(());
        }
        settings.external_templates = Some(false);
        store
            .records::<SettingsV7>()
            .update(&settings)
            .map_err(StepError::write)
    }
}
