//! In-memory directory seeded from configuration.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{DirectoryError, PrincipalDirectory, Role, RoleDirectory, UserRecord};
use crate::config::DirectoryConfig;

/// Read-only role and user tables. Emails are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    roles: HashMap<String, Role>,
    users: HashMap<String, UserRecord>,
}

impl InMemoryDirectory {
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let directory = config.roles.iter().fold(Self::default(), |dir, role| {
            dir.with_role(Role {
                id: role.id.clone(),
                name: role.name.clone(),
                is_deleted: role.is_deleted,
            })
        });

        config.users.iter().fold(directory, |dir, user| {
            dir.with_user(UserRecord {
                id: user.id,
                email: user.email.clone(),
                user_name: user.user_name.clone(),
                name: user.name.clone(),
                surname: user.surname.clone(),
                password_hash: user.password_hash.clone(),
                role_id: user.role_id.clone(),
                is_deleted: user.is_deleted,
            })
        })
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role.id.clone(), role);
        self
    }

    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.users.insert(user.email.to_lowercase(), user);
        self
    }
}

#[async_trait]
impl RoleDirectory for InMemoryDirectory {
    async fn find_role(&self, role_id: &str) -> Result<Option<Role>, DirectoryError> {
        Ok(self.roles.get(role_id).cloned())
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DirectoryError> {
        Ok(self.users.get(&email.to_lowercase()).cloned())
    }
}
