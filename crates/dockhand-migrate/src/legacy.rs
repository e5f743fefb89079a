//! Frozen record shapes from superseded schema versions.
//!
//! Each struct is named for the threshold whose step decodes it, and is
//! tolerant of both the pre- and post-migration form of the document
//! (`Option` sentinels, defaults) so the step can recognize records that
//! already carry their target shape and pass them through. Nothing here is
//! used outside migration code, and released shapes are never edited.

use serde::{Deserialize, Serialize};

use dockhand_store::{EndpointKind, Record, TlsConfig, SETTINGS_KEY};

/// User document before roles were enforced: `role` is a bare numeric code,
/// absent (0) on accounts created by the earliest builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserV1 {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: u8,
}

impl Record for UserV1 {
    const NAMESPACE: &'static str = "users";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Resource control before explicit user lists: a scalar `access_level`
/// (1 = private to `owner_id`, 2 = public) that v2 expands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceControlV2 {
    pub id: u64,
    pub resource_id: String,
    #[serde(default)]
    pub owner_id: Option<u64>,
    #[serde(default)]
    pub access_level: Option<u8>,
}

impl Record for ResourceControlV2 {
    const NAMESPACE: &'static str = "resource_controls";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Endpoint document as the v2 step sees it: a flat `tls` flag (restructured
/// at v4) and possibly no `authorized_users` list yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointV2 {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub tls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_users: Option<Vec<u64>>,
}

impl Record for EndpointV2 {
    const NAMESPACE: &'static str = "endpoints";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Endpoint document as the v4 step sees it: either the flat `tls` flag or
/// the structured `tls_config` it is expanded into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointV4 {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,
    #[serde(default)]
    pub authorized_users: Vec<u64>,
}

impl Record for EndpointV4 {
    const NAMESPACE: &'static str = "endpoints";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Endpoint document as the v8 step sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointV8 {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub tls_config: TlsConfig,
    #[serde(default)]
    pub authorized_users: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorized_teams: Option<Vec<u64>>,
}

impl Record for EndpointV8 {
    const NAMESPACE: &'static str = "endpoints";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Endpoint document as the v9 step sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointV9 {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    #[serde(default)]
    pub tls_config: TlsConfig,
    #[serde(default)]
    pub authorized_users: Vec<u64>,
    #[serde(default)]
    pub authorized_teams: Vec<u64>,
}

impl Record for EndpointV9 {
    const NAMESPACE: &'static str = "endpoints";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Endpoint document as the v10 and v11 steps see it: `kind` is absent until
/// v10 derives it from the URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointV10 {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub public_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EndpointKind>,
    #[serde(default)]
    pub tls_config: TlsConfig,
    #[serde(default)]
    pub authorized_users: Vec<u64>,
    #[serde(default)]
    pub authorized_teams: Vec<u64>,
}

impl Record for EndpointV10 {
    const NAMESPACE: &'static str = "endpoints";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Settings document as the v3 step sees it: a single `hidden_label_pattern`
/// string that v3 turns into the `hidden_labels` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsV3 {
    #[serde(default)]
    pub logo_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_label_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_labels: Option<Vec<String>>,
}

impl Record for SettingsV3 {
    const NAMESPACE: &'static str = "settings";

    fn key(&self) -> String {
        SETTINGS_KEY.to_string()
    }
}

/// Settings document as the v5 step sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsV5 {
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub hidden_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_bind_mounts: Option<bool>,
}

impl Record for SettingsV5 {
    const NAMESPACE: &'static str = "settings";

    fn key(&self) -> String {
        SETTINGS_KEY.to_string()
    }
}

/// Settings document as the v6 step sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsV6 {
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub hidden_labels: Vec<String>,
    #[serde(default)]
    pub allow_bind_mounts: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_privileged_mode: Option<bool>,
}

impl Record for SettingsV6 {
    const NAMESPACE: &'static str = "settings";

    fn key(&self) -> String {
        SETTINGS_KEY.to_string()
    }
}

/// Settings document as the v7 step sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsV7 {
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub hidden_labels: Vec<String>,
    #[serde(default)]
    pub allow_bind_mounts: bool,
    #[serde(default)]
    pub allow_privileged_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_templates: Option<bool>,
}

impl Record for SettingsV7 {
    const NAMESPACE: &'static str = "settings";

    fn key(&self) -> String {
        SETTINGS_KEY.to_string()
    }
}
