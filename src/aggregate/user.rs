//! User Aggregate
//!
//! Directory entry for a registered user.
//! Note: Authentication is handled outside this service, this is only profile data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, Role};

/// User Aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub(crate) id: Uuid,
    /// Display name, matched by booking search
    pub(crate) name: String,
    /// Email (unique, stored lowercase)
    pub(crate) email: String,
    pub(crate) phone: String,
    pub(crate) role: Role,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    /// Validate and create a new user profile
    pub fn register(
        user_id: Uuid,
        name: &str,
        email: &str,
        phone: &str,
        role: Role,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Full name is required"));
        }
        if name.chars().count() <= 3 {
            return Err(DomainError::validation(
                "name",
                "name must be longer than 3 characters",
            ));
        }

        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(DomainError::validation("email", "Email is required"));
        }
        if !is_plausible_email(&email) {
            return Err(DomainError::validation("email", "Invalid email format"));
        }

        let phone = phone.trim();
        if phone.is_empty() {
            return Err(DomainError::validation("phone", "Mobile number is required"));
        }
        if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation("phone", "Enter 10 digit number"));
        }

        Ok(Self {
            id: user_id,
            name: name.to_string(),
            email,
            phone: phone.to_string(),
            role,
            created_at: Utc::now(),
        })
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// `local@domain.tld`, no whitespace, one `@`
fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_user() {
        let id = Uuid::new_v4();
        let user = User::register(id, " Alice Doe ", "Alice@Example.com", "9876543210", Role::User)
            .unwrap();

        assert_eq!(user.id(), id);
        assert_eq!(user.name(), "Alice Doe");
        assert_eq!(user.email(), "alice@example.com");
        assert_eq!(user.role(), Role::User);
    }

    #[test]
    fn test_register_rejects_short_name() {
        let err = User::register(Uuid::new_v4(), "Bob", "bob@example.com", "9876543210", Role::User)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "name", .. }));
    }

    #[test]
    fn test_register_rejects_bad_email() {
        for email in ["", "no-at-sign", "a@b", "@example.com", "a b@example.com", "a@@b.com"] {
            let err = User::register(Uuid::new_v4(), "Carol King", email, "9876543210", Role::User)
                .unwrap_err();
            assert!(
                matches!(err, DomainError::Validation { field: "email", .. }),
                "accepted {:?}",
                email
            );
        }
    }

    #[test]
    fn test_register_rejects_bad_phone() {
        for phone in ["", "12345", "98765432101", "98765abcde"] {
            let err = User::register(Uuid::new_v4(), "Dave Grohl", "dave@example.com", phone, Role::User)
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation { field: "phone", .. }));
        }
    }
}
