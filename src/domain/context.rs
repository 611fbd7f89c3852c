//! Operation Context
//!
//! Carries the resolved caller identity plus request metadata for tracing.
//! Authentication happens upstream; by the time the core runs, identity is
//! just a caller id and a role.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

use super::Role;

/// Context for an operation, used for authorization checks and tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Resolved caller id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<Uuid>,

    /// Resolved caller role
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// Client IP address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl OperationContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            caller_id: None,
            role: None,
            correlation_id: None,
            client_ip: None,
        }
    }

    /// Create context with a caller id
    pub fn with_caller(mut self, caller_id: Uuid) -> Self {
        self.caller_id = Some(caller_id);
        self
    }

    /// Create context with a role
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Create context with correlation ID
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Create context with client IP
    pub fn with_client_ip(mut self, ip: IpAddr) -> Self {
        self.client_ip = Some(ip);
        self
    }

    /// Check if the caller carries the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}
