//! Permission flags and roles.
//!
//! A user's `role` is a bitmask of [`Permission`] flags. The three canonical
//! roles are fixed compositions of those flags, each a strict superset of
//! the previous one. Other masks are allowed to exist; they simply have no
//! role name.
//!
//! These checks only decide which screens and actions the client offers.
//! The server enforces authorization on its own.

use std::fmt;
use std::str::FromStr;

use bitmask_enum::bitmask;

use crate::model::User;

/// Individual capability flags, in wire bit order (bit 0 first).
#[bitmask(u32)]
pub enum Permission {
    /// Create new user accounts.
    CreateUser,
    /// Create and modify one's own tasks.
    ModifyOwnTasks,
    /// Modify any user, including roles.
    ModifyAllUsers,
    /// Modify any user, except roles.
    ModifyAllUsersRestricted,
    /// List every user's tasks.
    ViewAllTasks,
    /// Modify any user's tasks.
    ModifyAllTasks,
}

/// Named, fixed composition of permission flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Regular user: manages own tasks.
    User,
    /// Manager: user plus user listing and read access to all tasks.
    Manager,
    /// Administrator: everything.
    Admin,
}

impl Role {
    /// Every canonical role, least privileged first.
    pub const ALL: [Role; 3] = [Role::User, Role::Manager, Role::Admin];

    /// Permission flags granted by this role.
    pub fn permissions(self) -> Permission {
        match self {
            Role::User => Permission::ModifyOwnTasks,
            Role::Manager => {
                Role::User.permissions()
                    | Permission::ModifyAllUsersRestricted
                    | Permission::ViewAllTasks
            }
            Role::Admin => {
                Role::Manager.permissions()
                    | Permission::ModifyAllUsers
                    | Permission::ModifyAllTasks
            }
        }
    }

    /// Raw mask as stored in [`User::role`].
    pub fn mask_bits(self) -> u32 {
        self.permissions().bits()
    }

    /// Reverse lookup. Only the three canonical masks have a role.
    ///
    /// # Examples
    ///
    /// ```
    /// use manageme::auth::Role;
    ///
    /// assert_eq!(Role::from_mask(Role::Manager.mask_bits()), Some(Role::Manager));
    /// assert_eq!(Role::from_mask(0b100_0000), None);
    /// ```
    pub fn from_mask(mask: u32) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.mask_bits() == mask)
    }

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
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
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// Role name for a raw mask, if it is one of the canonical roles.
pub fn role_name(mask: u32) -> Option<&'static str> {
    Role::from_mask(mask).map(|r| r.as_str())
}

/// Check whether a user's mask contains `flag`.
///
/// Total: a user with an unrecognized mask simply lacks the flags it does
/// not contain.
///
/// # Examples
///
/// ```
/// use manageme::auth::{has_permission, Permission, Role};
/// use manageme::model::User;
///
/// let user = User {
///     id: "u1".into(),
///     username: "jane".into(),
///     email: "jane@example.com".into(),
///     role: Role::User.mask_bits(),
///     preferred_hours: None,
/// };
/// assert!(has_permission(&user, Permission::ModifyOwnTasks));
/// assert!(!has_permission(&user, Permission::ViewAllTasks));
/// ```
pub fn has_permission(user: &User, flag: Permission) -> bool {
    Permission::from(user.role).intersects(flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAGS: [Permission; 6] = [
        Permission::CreateUser,
        Permission::ModifyOwnTasks,
        Permission::ModifyAllUsers,
        Permission::ModifyAllUsersRestricted,
        Permission::ViewAllTasks,
        Permission::ModifyAllTasks,
    ];

    fn user_with_mask(role: u32) -> User {
        User {
            id: "u1".to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            role,
            preferred_hours: None,
        }
    }

    #[test]
    fn test_flag_bits_match_wire_order() {
        let bits: Vec<u32> = FLAGS.iter().map(|f| f.bits()).collect();
        assert_eq!(bits, vec![1, 2, 4, 8, 16, 32]);
    }

    #[test]
    fn test_role_masks() {
        assert_eq!(Role::User.mask_bits(), 0b00_0010);
        assert_eq!(Role::Manager.mask_bits(), 0b01_1010);
        assert_eq!(Role::Admin.mask_bits(), 0b11_1110);
    }

    #[test]
    fn test_has_permission_matches_bit_test_for_all_masks() {
        for mask in 0u32..128 {
            let user = user_with_mask(mask);
            for flag in FLAGS {
                assert_eq!(
                    has_permission(&user, flag),
                    mask & flag.bits() != 0,
                    "mask {mask:#b} flag {:#b}",
                    flag.bits()
                );
            }
        }
    }

    #[test]
    fn test_role_containment() {
        let user = Role::User.mask_bits();
        let manager = Role::Manager.mask_bits();
        let admin = Role::Admin.mask_bits();

        assert_eq!(user & manager, user);
        assert_eq!(manager & admin, manager);
        assert_ne!(user, manager);
        assert_ne!(manager, admin);
    }

    #[test]
    fn test_reverse_lookup_only_for_canonical_masks() {
        for role in Role::ALL {
            assert_eq!(Role::from_mask(role.mask_bits()), Some(role));
        }

        let canonical: Vec<u32> = Role::ALL.iter().map(|r| r.mask_bits()).collect();
        for mask in 0u32..128 {
            if !canonical.contains(&mask) {
                assert_eq!(Role::from_mask(mask), None, "mask {mask:#b}");
                assert_eq!(role_name(mask), None);
            }
        }
    }

    #[test]
    fn test_role_names_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>(), Ok(role));
            assert_eq!(role_name(role.mask_bits()), Some(role.as_str()));
        }
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "User");
        assert_eq!(Role::Manager.to_string(), "Manager");
        assert_eq!(Role::Admin.to_string(), "Admin");
    }

    #[test]
    fn test_unrecognized_mask_keeps_its_own_flags() {
        // CreateUser alone is not a canonical role.
        let user = user_with_mask(Permission::CreateUser.bits());
        assert!(has_permission(&user, Permission::CreateUser));
        assert!(!has_permission(&user, Permission::ModifyOwnTasks));
    }
}
