//! User Directory
//!
//! Registration and lookup of the people who own bookings.

use std::sync::Arc;

use uuid::Uuid;

use crate::aggregate::User;
use crate::domain::{DomainError, OperationContext, Resource, Role};
use crate::error::AppResult;
use crate::store::Store;

use super::RegisterUserCommand;

/// Handler for user registration and lookup
#[derive(Clone)]
pub struct UserDirectory {
    store: Arc<dyn Store>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a new user with the `User` role
    pub async fn register_user(
        &self,
        command: RegisterUserCommand,
        context: &OperationContext,
    ) -> AppResult<User> {
        let user = User::register(
            Uuid::new_v4(),
            &command.name,
            &command.email,
            &command.phone,
            Role::User,
        )?;

        self.store.insert_user(&user, context).await?;

        tracing::info!(user_id = %user.id(), "User registered");
        Ok(user)
    }

    /// Create the configured administrator unless it already exists
    pub async fn ensure_admin(
        &self,
        user_id: Uuid,
        name: &str,
        email: &str,
        phone: &str,
    ) -> AppResult<User> {
        if let Some(existing) = self.store.get_user(user_id).await? {
            if existing.role() != Role::Admin {
                tracing::warn!(
                    user_id = %user_id,
                    "Bootstrap administrator id belongs to a non-admin user"
                );
            }
            return Ok(existing);
        }

        let admin = User::register(user_id, name, email, phone, Role::Admin)?;
        self.store
            .insert_user(&admin, &OperationContext::new())
            .await?;

        tracing::info!(user_id = %user_id, "Administrator bootstrapped");
        Ok(admin)
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<User> {
        self.find_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(Resource::User, user_id).into())
    }

    /// Lookup without a not-found error, used to resolve request callers
    pub async fn find_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.store.get_user(user_id).await
    }
}
