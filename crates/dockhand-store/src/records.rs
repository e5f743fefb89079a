//! The record model: current shapes of every persisted collection.
//!
//! Records are stored as JSON documents, one namespace per collection.
//! Decoding is tolerant of older documents: fields gained in later schema
//! versions carry `#[serde(default)]` so a not-yet-migrated record still
//! loads (the migration engine in `dockhand-migrate` is what actually brings
//! it up to shape).

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Binds a record type to its storage namespace and primary key.
///
/// Implemented by every collection's current shape, and by the frozen legacy
/// shapes the migration steps decode from.
pub trait Record: Serialize + serde::de::DeserializeOwned {
    /// Storage namespace (one per collection).
    const NAMESPACE: &'static str;

    /// Primary key this record is stored under.
    fn key(&self) -> String;
}

/// A generic name/value pair used by labels and environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub name: String,
    pub value: String,
}

/// Access role of a [`User`].
///
/// Persisted as its numeric code (`1` / `2`); unknown codes are rejected at
/// decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    /// Full control over the installation.
    Administrator,
    /// Regular user, subject to resource controls.
    Standard,
}

impl UserRole {
    /// Convert from the persisted numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Administrator),
            2 => Some(Self::Standard),
            _ => None,
        }
    }

    /// The persisted numeric code.
    pub fn code(self) -> u8 {
        match self {
            Self::Administrator => 1,
            Self::Standard => 2,
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::from_code(code)
            .ok_or_else(|| de::Error::custom(format!("unknown user role code: {code}")))
    }
}

/// An account that can sign in to the installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    /// Password hash, never the clear text.
    pub password: String,
    pub role: UserRole,
}

impl Record for User {
    const NAMESPACE: &'static str = "users";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// How an [`Endpoint`] is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
    /// Local socket on the same host.
    #[default]
    DockerLocal,
    /// Remote daemon over TCP.
    DockerRemote,
}

/// TLS settings for reaching a remote endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub skip_verify: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_path: Option<String>,
}

/// A container engine the installation manages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: u64,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub group_id: u64,
    #[serde(default)]
    pub kind: EndpointKind,
    #[serde(default)]
    pub tls_config: TlsConfig,
    #[serde(default)]
    pub authorized_users: Vec<u64>,
    #[serde(default)]
    pub authorized_teams: Vec<u64>,
}

impl Record for Endpoint {
    const NAMESPACE: &'static str = "endpoints";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Id of the built-in "Unassigned" endpoint group.
pub const UNASSIGNED_GROUP_ID: u64 = 1;

/// A named grouping of endpoints sharing access rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointGroup {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<Pair>,
}

impl Record for EndpointGroup {
    const NAMESPACE: &'static str = "endpoint_groups";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// Access rules attached to a single managed resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceControl {
    pub id: u64,
    /// Identifier of the controlled resource (container id, volume name, ...).
    pub resource_id: String,
    #[serde(default)]
    pub users: Vec<u64>,
    #[serde(default)]
    pub teams: Vec<u64>,
    #[serde(default)]
    pub public: bool,
}

impl Record for ResourceControl {
    const NAMESPACE: &'static str = "resource_controls";

    fn key(&self) -> String {
        self.id.to_string()
    }
}

/// A deployed compose stack.
///
/// Stored under the composite key `<name>_<endpoint_id>` so the same stack
/// name can exist on different endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stack {
    pub id: u64,
    pub name: String,
    pub endpoint_id: u64,
    #[serde(default)]
    pub entry_point: String,
    #[serde(default)]
    pub env: Vec<Pair>,
}

impl Record for Stack {
    const NAMESPACE: &'static str = "stacks";

    fn key(&self) -> String {
        format!("{}_{}", self.name, self.endpoint_id)
    }
}

/// Key the singleton [`Settings`] record is stored under.
pub const SETTINGS_KEY: &str = "settings";

/// Installation-wide settings. Single record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logo_url: String,
    /// Container label names hidden from regular users.
    #[serde(default)]
    pub hidden_labels: Vec<String>,
    #[serde(default)]
    pub allow_bind_mounts: bool,
    #[serde(default)]
    pub allow_privileged_mode: bool,
    /// Whether app templates are fetched from an external URL.
    #[serde(default)]
    pub external_templates: bool,
}

impl Record for Settings {
    const NAMESPACE: &'static str = "settings";

    fn key(&self) -> String {
        SETTINGS_KEY.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_role_codes_roundtrip() {
        for role in [UserRole::Administrator, UserRole::Standard] {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
        }
        assert_eq!(UserRole::from_code(0), None);
        assert_eq!(UserRole::from_code(9), None);
    }

    #[test]
    fn user_role_persisted_as_number() {
        let user = User {
            id: 1,
            username: "admin".into(),
            password: "hash".into(),
            role: UserRole::Administrator,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], serde_json::json!(1));
    }

    #[test]
    fn unknown_role_code_rejected() {
        let err = serde_json::from_value::<User>(serde_json::json!({
            "id": 1, "username": "x", "password": "y", "role": 7
        }))
        .unwrap_err();
        assert!(err.to_string().contains("unknown user role code"));
    }

    #[test]
    fn endpoint_decodes_older_document_with_defaults() {
        // A document from before groups, kinds, and team authorizations existed.
        let ep: Endpoint = serde_json::from_value(serde_json::json!({
            "id": 3, "name": "prod", "url": "tcp://10.0.0.5:2375"
        }))
        .unwrap();
        assert_eq!(ep.group_id, 0);
        assert_eq!(ep.kind, EndpointKind::DockerLocal);
        assert!(!ep.tls_config.enabled);
        assert!(ep.authorized_users.is_empty());
        assert!(ep.authorized_teams.is_empty());
    }

    #[test]
    fn stack_key_is_name_and_endpoint() {
        let stack = Stack {
            id: 1,
            name: "web".into(),
            endpoint_id: 4,
            entry_point: "docker-compose.yml".into(),
            env: vec![],
        };
        assert_eq!(stack.key(), "web_4");
    }

    #[test]
    fn tls_config_omits_unset_paths() {
        let json = serde_json::to_value(TlsConfig::default()).unwrap();
        assert!(json.get("ca_cert_path").is_none());
        assert!(json.get("cert_path").is_none());
        assert!(json.get("key_path").is_none());
    }
}
