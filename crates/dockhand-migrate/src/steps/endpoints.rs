//! Endpoint collection steps. The endpoint document changed shape more than
//! any other collection; each step here decodes the era it was released
//! against (see `legacy`).

use dockhand_store::{DataStore, Endpoint, EndpointKind, StateStore, TlsConfig, UNASSIGNED_GROUP_ID};

use crate::legacy::{EndpointV10, EndpointV2, EndpointV4, EndpointV8, EndpointV9};
use crate::migrator::{MigrationStep, StepError};

/// v2: materialize an empty `authorized_users` list on every endpoint.
pub struct AttachAuthorizedUsers;

impl<S: StateStore> MigrationStep<S> for AttachAuthorizedUsers {
    fn name(&self) -> &'static str {
        "endpoints.attach-authorized-users"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let endpoints = store.records::<EndpointV2>().list().map_err(StepError::read)?;
        for mut endpoint in endpoints {
            if endpoint.authorized_users.is_some() {
                continue;
            }
            endpoint.authorized_users = Some(vec![]);
            store
                .records::<EndpointV2>()
                .update(&endpoint)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}

/// v4: the flat `tls` flag becomes the structured `tls_config`. Endpoints
/// with TLS enabled get the conventional cert paths under `certs/<id>/`.
pub struct ExpandTlsConfig;

impl<S: StateStore> MigrationStep<S> for ExpandTlsConfig {
    fn name(&self) -> &'static str {
        "endpoints.expand-tls-config"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let endpoints = store.records::<EndpointV4>().list().map_err(StepError::read)?;
        for mut endpoint in endpoints {
            if endpoint.tls_config.is_some() {
                // Already expanded.
                continue;
            }
            let enabled = endpoint.tls.unwrap_or(false);
            let mut config = TlsConfig {
                enabled,
                ..TlsConfig::default()
            };
            if enabled {
                config.ca_cert_path = Some(format!("certs/{}/ca.pem", endpoint.id));
                config.cert_path = Some(format!("certs/{}/cert.pem", endpoint.id));
                config.key_path = Some(format!("certs/{}/key.pem", endpoint.id));
            }
            endpoint.tls_config = Some(config);
            endpoint.tls = None;
            store
                .records::<EndpointV4>()
                .update(&endpoint)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}

/// v8: materialize an empty `authorized_teams` list on every endpoint.
pub struct AttachAuthorizedTeams;

impl<S: StateStore> MigrationStep<S> for AttachAuthorizedTeams {
    fn name(&self) -> &'static str {
        "endpoints.attach-authorized-teams"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let endpoints = store.records::<EndpointV8>().list().map_err(StepError::read)?;
        for mut endpoint in endpoints {
            if endpoint.authorized_teams.is_some() {
                continue;
            }
            endpoint.authorized_teams = Some(vec![]);
            store
                .records::<EndpointV8>()
                .update(&endpoint)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}

/// v9: materialize an empty `public_url` on every endpoint.
pub struct AttachPublicUrl;

impl<S: StateStore> MigrationStep<S> for AttachPublicUrl {
    fn name(&self) -> &'static str {
        "endpoints.attach-public-url"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let endpoints = store.records::<EndpointV9>().list().map_err(StepError::read)?;
        for mut endpoint in endpoints {
            if endpoint.public_url.is_some() {
                continue;
            }
            endpoint.public_url = Some(String::new());
            store
                .records::<EndpointV9>()
                .update(&endpoint)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}

/// v10: derive the endpoint `kind` from its URL: TCP URLs reach a remote
/// daemon, everything else is a local socket.
pub struct ClassifyKind;

impl<S: StateStore> MigrationStep<S> for ClassifyKind {
    fn name(&self) -> &'static str {
        "endpoints.classify-kind"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let endpoints = store
            .records::<EndpointV10>()
            .list()
            .map_err(StepError::read)?;
        for mut endpoint in endpoints {
            if endpoint.kind.is_some() {
                continue;
            }
            endpoint.kind = Some(if endpoint.url.starts_with("tcp://") {
                EndpointKind::DockerRemote
            } else {
                EndpointKind::DockerLocal
            });
            store
                .records::<EndpointV10>()
                .update(&endpoint)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}

/// v11: the v4 expansion left cert paths behind on endpoints that later
/// disabled TLS; clear them.
pub struct PruneDisabledTlsPaths;

impl<S: StateStore> MigrationStep<S> for PruneDisabledTlsPaths {
    fn name(&self) -> &'static str {
        "endpoints.prune-disabled-tls-paths"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let endpoints = store
            .records::<EndpointV10>()
            .list()
            .map_err(StepError::read)?;
        for mut endpoint in endpoints {
            let config = &mut endpoint.tls_config;
            if config.enabled {
                continue;
            }
            if config.ca_cert_path.is_none()
                && config.cert_path.is_none()
                && config.key_path.is_none()
            {
                continue;
            }
            config.ca_cert_path = None;
            config.cert_path = None;
            config.key_path = None;
            store
                .records::<EndpointV10>()
                .update(&endpoint)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}

/// v12: endpoints not yet assigned to a group join the built-in
/// "Unassigned" group.
pub struct AssignDefaultGroup;

impl<S: StateStore> MigrationStep<S> for AssignDefaultGroup {
    fn name(&self) -> &'static str {
        "endpoints.assign-default-group"
    }

    fn run(&self, store: &mut DataStore<S>) -> Result<(), StepError> {
        let endpoints = store.records::<Endpoint>().list().map_err(StepError::read)?;
        for mut endpoint in endpoints {
            if endpoint.group_id != 0 {
                continue;
            }
            endpoint.group_id = UNASSIGNED_GROUP_ID;
            store
                .records::<Endpoint>()
                .update(&endpoint)
                .map_err(StepError::write)?;
        }
        Ok(())
    }
}
