//! Well-known role name constants.
//!
//! These must match the `CHECK` constraint on `users.role`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";
pub const ROLE_CUSTOMER: &str = "customer";

/// All roles accepted by the `users` table.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MEMBER, ROLE_CUSTOMER];

/// Returns `true` if `role` is one of the known roles.
pub fn is_valid_role(role: &str) -> bool {
    ALL_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_valid() {
        assert!(is_valid_role("admin"));
        assert!(is_valid_role("member"));
        assert!(is_valid_role("customer"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(!is_valid_role("creator"));
        assert!(!is_valid_role(""));
    }
}
