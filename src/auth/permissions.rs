//! Permission evaluation for console modules.
//!
//! Resolution order:
//! 1. no identity denies everything;
//! 2. `super_admin` is allowed everything;
//! 3. a loaded access profile is authoritative, even when it grants less than
//!    the role would;
//! 4. otherwise the static role-default table decides.
//!
//! Anything not explicitly granted is denied. The functions here are pure so the
//! policy can be tested exhaustively without a session.

use crate::auth::types::{AccessLevel, AccessProfile, AdminIdentity};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Console areas that carry permissions. Wire names are the back office's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Module {
    #[serde(rename = "dashboard")]
    Dashboard,
    #[serde(rename = "revendas")]
    Resellers,
    #[serde(rename = "planos_revenda")]
    ResellerPlans,
    #[serde(rename = "planos_streaming")]
    StreamingPlans,
    #[serde(rename = "streamings")]
    Streams,
    #[serde(rename = "administradores")]
    Administrators,
    #[serde(rename = "perfis")]
    Profiles,
    #[serde(rename = "servidores")]
    Servers,
    #[serde(rename = "configuracoes")]
    Settings,
    #[serde(rename = "logs")]
    Logs,
}

impl Module {
    pub const ALL: [Module; 10] = [
        Self::Dashboard,
        Self::Resellers,
        Self::ResellerPlans,
        Self::StreamingPlans,
        Self::Streams,
        Self::Administrators,
        Self::Profiles,
        Self::Servers,
        Self::Settings,
        Self::Logs,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Resellers => "revendas",
            Module::ResellerPlans => "planos_revenda",
            Module::StreamingPlans => "planos_streaming",
            Module::Streams => "streamings",
            Module::Administrators => "administradores",
            Module::Profiles => "perfis",
            Module::Servers => "servidores",
            Module::Settings => "configuracoes",
            Module::Logs => "logs",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let module = match value.trim().to_lowercase().replace('-', "_").as_str() {
            "dashboard" => Module::Dashboard,
            "revendas" | "resellers" => Module::Resellers,
            "planos_revenda" | "reseller_plans" => Module::ResellerPlans,
            "planos_streaming" | "streaming_plans" => Module::StreamingPlans,
            "streamings" | "streams" => Module::Streams,
            "administradores" | "administrators" => Module::Administrators,
            "perfis" | "profiles" => Module::Profiles,
            "servidores" | "servers" => Module::Servers,
            "configuracoes" | "settings" => Module::Settings,
            "logs" => Module::Logs,
            other => return Err(format!("unknown module: {other}")),
        };
        Ok(module)
    }
}

/// Operations a module may allow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "visualizar")]
    View,
    #[serde(rename = "criar")]
    Create,
    #[serde(rename = "editar")]
    Edit,
    #[serde(rename = "excluir")]
    Delete,
    #[serde(rename = "suspender")]
    Suspend,
    #[serde(rename = "ativar")]
    Activate,
    #[serde(rename = "controlar")]
    Control,
    #[serde(rename = "sincronizar")]
    Sync,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Self::View,
        Self::Create,
        Self::Edit,
        Self::Delete,
        Self::Suspend,
        Self::Activate,
        Self::Control,
        Self::Sync,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "visualizar",
            Action::Create => "criar",
            Action::Edit => "editar",
            Action::Delete => "excluir",
            Action::Suspend => "suspender",
            Action::Activate => "ativar",
            Action::Control => "controlar",
            Action::Sync => "sincronizar",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let action = match value.trim().to_lowercase().as_str() {
            "visualizar" | "view" => Action::View,
            "criar" | "create" => Action::Create,
            "editar" | "edit" => Action::Edit,
            "excluir" | "delete" => Action::Delete,
            "suspender" | "suspend" => Action::Suspend,
            "ativar" | "activate" => Action::Activate,
            "controlar" | "control" => Action::Control,
            "sincronizar" | "sync" => Action::Sync,
            other => return Err(format!("unknown action: {other}")),
        };
        Ok(action)
    }
}

pub type DefaultTable = &'static [(Module, &'static [Action])];

const ADMIN_DEFAULTS: DefaultTable = &[
    (Module::Dashboard, &[Action::View]),
    (
        Module::Resellers,
        &[
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Suspend,
            Action::Activate,
        ],
    ),
    (
        Module::ResellerPlans,
        &[Action::View, Action::Create, Action::Edit, Action::Delete],
    ),
    (
        Module::StreamingPlans,
        &[Action::View, Action::Create, Action::Edit, Action::Delete],
    ),
    (
        Module::Streams,
        &[
            Action::View,
            Action::Create,
            Action::Edit,
            Action::Delete,
            Action::Control,
        ],
    ),
    (
        Module::Administrators,
        &[Action::View, Action::Create, Action::Edit],
    ),
    (
        Module::Servers,
        &[Action::View, Action::Create, Action::Edit, Action::Sync],
    ),
    (Module::Settings, &[Action::View, Action::Edit]),
    (Module::Logs, &[Action::View]),
];

const SUPPORT_DEFAULTS: DefaultTable = &[
    (Module::Dashboard, &[Action::View]),
    (Module::Resellers, &[Action::View]),
    (Module::Streams, &[Action::View, Action::Control]),
    (Module::Logs, &[Action::View]),
];

/// Role-default grants for a level. `super_admin` has no table; it bypasses
/// evaluation entirely.
#[must_use]
pub fn role_defaults(level: AccessLevel) -> DefaultTable {
    match level {
        AccessLevel::SuperAdmin => &[],
        AccessLevel::Admin => ADMIN_DEFAULTS,
        AccessLevel::Support => SUPPORT_DEFAULTS,
    }
}

fn role_allows(level: AccessLevel, module: Module, action: Action) -> bool {
    role_defaults(level)
        .iter()
        .find(|(entry, _)| *entry == module)
        .is_some_and(|(_, actions)| actions.contains(&action))
}

/// Decide whether `identity` may perform `action` on `module`.
#[must_use]
pub fn authorize(
    identity: Option<&AdminIdentity>,
    profile: Option<&AccessProfile>,
    module: Module,
    action: Action,
) -> bool {
    let Some(identity) = identity else {
        return false;
    };

    if identity.is_super_admin() {
        return true;
    }

    match profile {
        Some(profile) => profile.grant(module, action).unwrap_or(false),
        None => role_allows(identity.access_level, module, action),
    }
}

/// Same as [`authorize`] but keyed by names as they appear in routes and menus.
/// Unknown module or action names are denied.
#[must_use]
pub fn authorize_named(
    identity: Option<&AdminIdentity>,
    profile: Option<&AccessProfile>,
    module: &str,
    action: &str,
) -> bool {
    match (module.parse::<Module>(), action.parse::<Action>()) {
        (Ok(module), Ok(action)) => authorize(identity, profile, module, action),
        _ => false,
    }
}
