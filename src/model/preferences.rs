use serde::{Deserialize, Serialize};

/// Role of the message carrying injected stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InjectRole {
    #[default]
    System,
    User,
}

impl InjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjectRole::System => "system",
            InjectRole::User => "user",
        }
    }
}

/// Process-wide switches, persisted on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub enabled: bool,
    pub auto_inject: bool,
    pub inject_role: InjectRole,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_inject: true,
            inject_role: InjectRole::System,
        }
    }
}

impl Preferences {
    pub fn injection_active(&self) -> bool {
        self.enabled && self.auto_inject
    }
}
