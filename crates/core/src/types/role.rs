//! Session roles and the capabilities they grant.
//!
//! Access decisions go through [`Role::can`] rather than comparing role
//! strings at each call site.

use serde::{Deserialize, Serialize};

/// Who is driving the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Nobody is signed in.
    #[default]
    Guest,
    /// A signed-in shopper.
    Customer,
    /// Store staff with back-office access.
    Admin,
}

/// Something a session may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Use the login, registration and password-reset views.
    SignIn,
    /// Browse the shop, fill a cart and check out.
    Shop,
    /// Use the admin dashboard and its CRUD operations.
    ManageStore,
}

impl Role {
    /// Whether this role grants `capability`.
    #[must_use]
    pub const fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::SignIn => !matches!(self, Self::Admin),
            Capability::Shop => matches!(self, Self::Customer | Self::Admin),
            Capability::ManageStore => matches!(self, Self::Admin),
        }
    }

    /// Wire and session-storage name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::Customer => "customer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "customer" => Ok(Self::Customer),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_table() {
        assert!(Role::Guest.can(Capability::SignIn));
        assert!(!Role::Guest.can(Capability::Shop));
        assert!(!Role::Guest.can(Capability::ManageStore));

        assert!(Role::Customer.can(Capability::SignIn));
        assert!(Role::Customer.can(Capability::Shop));
        assert!(!Role::Customer.can(Capability::ManageStore));

        assert!(!Role::Admin.can(Capability::SignIn));
        assert!(Role::Admin.can(Capability::Shop));
        assert!(Role::Admin.can(Capability::ManageStore));
    }

    #[test]
    fn test_parse_roundtrip() {
        for role in [Role::Guest, Role::Customer, Role::Admin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("mechanic".parse::<Role>().is_err());
    }
}
