//! Well-known role names and the authorization predicates built on them.
//!
//! These must match the `CHECK` constraint on `users.role` in
//! `20260101000001_create_users.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_WAREHOUSE_KEEPER: &str = "warehouse_keeper";
pub const ROLE_EMPLOYEE: &str = "employee";

/// A user's role attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    WarehouseKeeper,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::WarehouseKeeper => ROLE_WAREHOUSE_KEEPER,
            Role::Employee => ROLE_EMPLOYEE,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_WAREHOUSE_KEEPER => Ok(Role::WarehouseKeeper),
            ROLE_EMPLOYEE => Ok(Role::Employee),
            other => Err(format!("Unknown role '{other}'")),
        }
    }
}

/// Whether a role may approve or reject pending documents.
pub fn can_decide(role: Role) -> bool {
    matches!(role, Role::Admin | Role::WarehouseKeeper)
}

/// Whether a role may submit documents for approval. Every defined role can.
pub fn can_submit(role: Role) -> bool {
    matches!(role, Role::Admin | Role::WarehouseKeeper | Role::Employee)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privileged_roles_can_decide() {
        assert!(can_decide(Role::Admin));
        assert!(can_decide(Role::WarehouseKeeper));
        assert!(!can_decide(Role::Employee));
    }

    #[test]
    fn every_role_can_submit() {
        for role in [Role::Admin, Role::WarehouseKeeper, Role::Employee] {
            assert!(can_submit(role), "{role} should be able to submit");
        }
    }

    #[test]
    fn role_round_trips_through_its_name() {
        assert_eq!("warehouse_keeper".parse::<Role>(), Ok(Role::WarehouseKeeper));
        assert_eq!(Role::Employee.to_string(), "employee");
        assert!("auditor".parse::<Role>().is_err());
    }
}
