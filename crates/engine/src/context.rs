//! Request-scoped context
//!
//! Every engine call receives the caller's context explicitly; there is no
//! process-wide session. Mutations require [`Role::Admin`].

use docpath_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Authenticated role of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// May read and mutate
    Admin,
    /// May only read
    ReadOnly,
}

/// Per-request caller information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    role: Role,
    actor: Option<String>,
}

impl RequestContext {
    /// Context for an administrator
    pub fn admin() -> Self {
        RequestContext {
            role: Role::Admin,
            actor: None,
        }
    }

    /// Context for a read-only caller
    pub fn read_only() -> Self {
        RequestContext {
            role: Role::ReadOnly,
            actor: None,
        }
    }

    /// Attach a caller name for logging (builder pattern)
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// The caller's role
    pub fn role(&self) -> Role {
        self.role
    }

    /// The caller's name, if known
    pub fn actor(&self) -> &str {
        self.actor.as_deref().unwrap_or("anonymous")
    }

    /// Fail with `Forbidden` unless the caller is an administrator
    pub fn require_admin(&self, operation: &str) -> Result<()> {
        match self.role {
            Role::Admin => Ok(()),
            Role::ReadOnly => Err(Error::Forbidden(format!(
                "{} requires admin role (caller: {})",
                operation,
                self.actor()
            ))),
        }
    }
}
