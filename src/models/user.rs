use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role tags carried by a user.
///
/// Stored in Postgres as a TEXT[] of tag names; the set is never empty
/// (every account holds at least `User`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::Superadmin => "SUPERADMIN",
        }
    }
}

/// User row as stored in Postgres
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    pub fn is_superadmin(&self) -> bool {
        self.has_role(Role::Superadmin)
    }

    /// Role set with the admin tag added (idempotent)
    pub fn roles_with_admin(&self) -> Vec<String> {
        let mut roles = self.roles.clone();
        if !self.is_admin() {
            roles.push(Role::Admin.as_str().to_string());
        }
        roles
    }

    /// Role set with every privilege stripped back to the base tag
    pub fn roles_without_privileges() -> Vec<String> {
        vec![Role::User.as_str().to_string()]
    }
}

/// Public profile representation
#[derive(Debug, Clone, Serialize)]
pub struct ShowUser {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
}

impl From<&User> for ShowUser {
    fn from(user: &User) -> Self {
        ShowUser {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
        }
    }
}

/// Extended representation returned by privilege-management endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ShowAdmin {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for ShowAdmin {
    fn from(user: &User) -> Self {
        ShowAdmin {
            id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            is_active: user.is_active,
            roles: user.roles.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[Role]) -> User {
        User {
            id: Uuid::new_v4(),
            username: "test".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            email: "test@example.com".to_string(),
            password: "hash".to_string(),
            is_active: true,
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_checks() {
        let user = user_with_roles(&[Role::User]);
        assert!(!user.is_admin());
        assert!(!user.is_superadmin());

        let admin = user_with_roles(&[Role::User, Role::Admin]);
        assert!(admin.is_admin());
        assert!(!admin.is_superadmin());

        let superadmin = user_with_roles(&[Role::User, Role::Superadmin]);
        assert!(superadmin.is_superadmin());
    }

    #[test]
    fn test_roles_with_admin_is_idempotent() {
        let user = user_with_roles(&[Role::User]);
        let promoted = user_with_roles(&[Role::User, Role::Admin]);

        let expected = vec!["USER".to_string(), "ADMIN".to_string()];
        assert_eq!(user.roles_with_admin(), expected);
        assert_eq!(promoted.roles_with_admin(), expected);
    }

    #[test]
    fn test_roles_without_privileges() {
        assert_eq!(User::roles_without_privileges(), vec!["USER".to_string()]);
    }
}
