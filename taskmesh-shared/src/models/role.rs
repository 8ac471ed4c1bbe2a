/// Account role hierarchy
///
/// Roles form a total order where a lower numeric value means higher
/// privilege: admin (1) < manager (2) < client (3). Authorization checks use
/// `role <= manager` to mean "privileged".
///
/// The numeric values are the wire format: they are stored in the `role`
/// integer column on both sides of the service boundary and carried as plain
/// numbers in account lifecycle events.
///
/// # Example
///
/// ```
/// use taskmesh_shared::models::role::Role;
///
/// assert!(Role::Admin.is_privileged());
/// assert!(Role::Manager.is_privileged());
/// assert!(!Role::Client.is_privileged());
///
/// assert_eq!(Role::try_from(2), Ok(Role::Manager));
/// assert!(Role::try_from(9).is_err());
/// ```

use serde::{Deserialize, Serialize};

/// Account role, ordered by privilege (lower value = more privileged)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(into = "i32", try_from = "i32")]
#[repr(i32)]
pub enum Role {
    /// Full administrative access
    Admin = 1,

    /// Can trigger privileged task operations
    Manager = 2,

    /// Regular account, no privileged operations
    Client = 3,
}

impl Role {
    /// Numeric wire/storage representation
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// True for roles allowed to perform privileged operations
    ///
    /// Privileged means admin or manager; the check is `role <= manager`
    /// on the numeric hierarchy.
    pub fn is_privileged(self) -> bool {
        self <= Role::Manager
    }

    /// Human-readable name for logging
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Client => "client",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Client
    }
}

impl From<Role> for i32 {
    fn from(role: Role) -> i32 {
        role.as_i32()
    }
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Manager),
            3 => Ok(Role::Client),
            other => Err(format!("unknown role value: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ordering() {
        assert!(Role::Admin < Role::Manager);
        assert!(Role::Manager < Role::Client);
    }

    #[test]
    fn test_privilege_boundary() {
        assert!(Role::Admin.is_privileged());
        assert!(Role::Manager.is_privileged());
        assert!(!Role::Client.is_privileged());
    }

    #[test]
    fn test_numeric_roundtrip() {
        for role in [Role::Admin, Role::Manager, Role::Client] {
            assert_eq!(Role::try_from(role.as_i32()), Ok(role));
        }
        assert!(Role::try_from(0).is_err());
        assert!(Role::try_from(4).is_err());
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "2");

        let role: Role = serde_json::from_str("3").unwrap();
        assert_eq!(role, Role::Client);
    }
}
