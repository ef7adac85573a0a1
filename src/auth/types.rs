//! Identity and access profile records as returned by the back office. Field
//! names on the wire are the back office's (`codigo`, `nome`, `nivel_acesso`,
//! `permissoes`); English aliases are accepted so fixtures and other clients can
//! use either form.

use crate::auth::permissions::{Action, Module};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::{collections::HashMap, fmt, str::FromStr};

/// Coarse permission tier of an administrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    SuperAdmin,
    Admin,
    #[serde(rename = "suporte", alias = "support")]
    Support,
}

impl AccessLevel {
    pub const ALL: [AccessLevel; 3] = [Self::SuperAdmin, Self::Admin, Self::Support];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AccessLevel::SuperAdmin => "super_admin",
            AccessLevel::Admin => "admin",
            AccessLevel::Support => "suporte",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "super_admin" | "superadmin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "suporte" | "support" => Ok(Self::Support),
            other => Err(format!("unknown access level: {other}")),
        }
    }
}

/// The signed-in administrator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(rename = "codigo", alias = "id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "nome", alias = "display_name", default)]
    pub display_name: String,
    pub email: String,
    #[serde(rename = "nivel_acesso", alias = "access_level")]
    pub access_level: AccessLevel,
    #[serde(
        rename = "codigo_perfil_acesso",
        alias = "profile_ref",
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub profile_ref: Option<String>,
}

impl AdminIdentity {
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.access_level == AccessLevel::SuperAdmin
    }
}

/// Module -> action -> granted.
pub type PermissionMatrix = HashMap<Module, HashMap<Action, bool>>;

/// Fine-grained permission override attached to an administrator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessProfile {
    #[serde(rename = "codigo", alias = "id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "nome", alias = "name", default)]
    pub name: String,
    #[serde(
        rename = "permissoes",
        alias = "permissions",
        default,
        deserialize_with = "permission_matrix"
    )]
    pub permissions: PermissionMatrix,
}

impl AccessProfile {
    /// Explicit grant for `module`/`action`; anything not present is `None`.
    #[must_use]
    pub fn grant(&self, module: Module, action: Action) -> Option<bool> {
        self.permissions
            .get(&module)
            .and_then(|actions| actions.get(&action))
            .copied()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) if value.trim().is_empty() => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(Value::Number(value)) => Ok(Some(value.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number profile reference, got {other}"
        ))),
    }
}

// Lenient decoding: the profile editor stores whatever the form sent, so keys
// we don't know and values that aren't booleans are dropped (and deny).
fn permission_matrix<'de, D>(deserializer: D) -> Result<PermissionMatrix, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();

    let mut matrix = PermissionMatrix::new();
    for (module_name, actions) in raw {
        let Ok(module) = module_name.parse::<Module>() else {
            continue;
        };
        let Value::Object(actions) = actions else {
            continue;
        };

        let grants = matrix.entry(module).or_default();
        for (action_name, granted) in actions {
            if let (Ok(action), Value::Bool(granted)) = (action_name.parse::<Action>(), granted) {
                grants.insert(action, granted);
            }
        }
    }

    Ok(matrix)
}
