use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of statement a named command or a generated write is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Select,
    Insert,
    Update,
    Delete,
    Procedure,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Procedure => "procedure",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named ad-hoc command from the mapping document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    pub kind: CommandKind,
    pub sql: String,
}

/// Direct connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionProperties {
    pub database_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Seconds; `0` means no timeout.
    #[serde(default)]
    pub login_timeout: u64,
}

/// How the session reaches its database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    /// Name of an externally managed data source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    /// Transactions are demarcated by the caller rather than per write plan.
    #[serde(default = "default_managed_tx")]
    pub managed_tx: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_properties: Option<ConnectionProperties>,
}

fn default_managed_tx() -> bool {
    true
}

impl fmt::Display for ConnectionProperties {
    // Never prints the password.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.database_url)?;
        if let Some(user) = &self.user_name {
            write!(f, " as {user}")?;
        }
        Ok(())
    }
}
