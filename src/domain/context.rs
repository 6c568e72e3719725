//! Operation Context
//!
//! Explicit caller identity plus request metadata, passed into every
//! command and query instead of ambient session state.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use uuid::Uuid;

use super::DomainError;

/// Role of a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(DomainError::validation("role", format!("unknown role '{}'", other))),
        }
    }
}

/// The authenticated user issuing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Context for an operation, used for authorization, auditing and tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContext {
    /// Resolved caller, if the request carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<Caller>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// Client IP address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl OperationContext {
    /// Create a new anonymous context
    pub fn new() -> Self {
        Self {
            caller: None,
            correlation_id: None,
            client_ip: None,
        }
    }

    /// Create context with a caller
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
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

    /// Generate a new correlation ID if not present
    pub fn ensure_correlation_id(&mut self) -> Uuid {
        *self.correlation_id.get_or_insert_with(Uuid::new_v4)
    }

    /// The caller, or `Unauthenticated`
    pub fn require_caller(&self) -> Result<&Caller, DomainError> {
        self.caller.as_ref().ok_or(DomainError::Unauthenticated)
    }

    /// The caller if they hold the admin role
    pub fn require_admin(&self) -> Result<&Caller, DomainError> {
        let caller = self.require_caller()?;
        if !caller.is_admin() {
            return Err(DomainError::Forbidden("administrator role required".to_string()));
        }
        Ok(caller)
    }

    /// The caller if they are `owner` or an admin
    pub fn require_owner_or_admin(&self, owner: Uuid) -> Result<&Caller, DomainError> {
        let caller = self.require_caller()?;
        if caller.user_id != owner && !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "cannot act on another user's records".to_string(),
            ));
        }
        Ok(caller)
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let user_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let context = OperationContext::new()
            .with_caller(Caller::user(user_id))
            .with_correlation_id(correlation_id);

        assert_eq!(context.caller, Some(Caller::user(user_id)));
        assert_eq!(context.correlation_id, Some(correlation_id));
    }

    #[test]
    fn test_ensure_correlation_id() {
        let mut context = OperationContext::new();
        assert!(context.correlation_id.is_none());

        let id = context.ensure_correlation_id();
        assert_eq!(context.correlation_id, Some(id));

        // Calling again should return the same ID
        assert_eq!(context.ensure_correlation_id(), id);
    }

    #[test]
    fn test_anonymous_context_is_unauthenticated() {
        let context = OperationContext::new();
        assert_eq!(context.require_caller(), Err(DomainError::Unauthenticated));
        assert_eq!(context.require_admin(), Err(DomainError::Unauthenticated));
    }

    #[test]
    fn test_admin_checks() {
        let user = OperationContext::new().with_caller(Caller::user(Uuid::new_v4()));
        assert!(matches!(user.require_admin(), Err(DomainError::Forbidden(_))));

        let admin = OperationContext::new().with_caller(Caller::admin(Uuid::new_v4()));
        assert!(admin.require_admin().is_ok());
    }

    #[test]
    fn test_owner_or_admin() {
        let owner = Uuid::new_v4();
        let own = OperationContext::new().with_caller(Caller::user(owner));
        assert!(own.require_owner_or_admin(owner).is_ok());

        let other = OperationContext::new().with_caller(Caller::user(Uuid::new_v4()));
        assert!(matches!(
            other.require_owner_or_admin(owner),
            Err(DomainError::Forbidden(_))
        ));

        let admin = OperationContext::new().with_caller(Caller::admin(Uuid::new_v4()));
        assert!(admin.require_owner_or_admin(owner).is_ok());
    }

    #[test]
    fn test_role_round_trip_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.as_str(), "user");
        assert!("root".parse::<Role>().is_err());
    }
}
