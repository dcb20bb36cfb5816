use crate::domain::models::{UserProfile, UserRole};
use serde::Serialize;
use uuid::Uuid;

/// What the current user may do, resolved once per request from the profile.
/// A missing profile resolves to read-only.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Capabilities {
    pub is_admin: bool,
    pub is_customer: bool,
    pub can_edit: bool,
    pub can_approve_repairs: bool,
}

impl Capabilities {
    pub fn for_role(role: Option<UserRole>) -> Self {
        let is_admin = matches!(role, Some(UserRole::Admin));
        let is_customer = matches!(role, Some(UserRole::Customer));
        Self {
            is_admin,
            is_customer,
            can_edit: is_admin,
            can_approve_repairs: is_admin || is_customer,
        }
    }
}

/// Authenticated identity plus the profile fetched for it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub profile: Option<UserProfile>,
    pub capabilities: Capabilities,
}

impl SessionContext {
    pub fn resolve(user_id: Uuid, profile: Option<UserProfile>) -> Self {
        let capabilities = Capabilities::for_role(profile.as_ref().map(|p| p.role));
        Self {
            user_id,
            profile,
            capabilities,
        }
    }

    pub fn role(&self) -> Option<UserRole> {
        self.profile.as_ref().map(|p| p.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_can_edit_and_approve() {
        let caps = Capabilities::for_role(Some(UserRole::Admin));
        assert!(caps.is_admin);
        assert!(!caps.is_customer);
        assert!(caps.can_edit);
        assert!(caps.can_approve_repairs);
    }

    #[test]
    fn customer_can_only_approve() {
        let caps = Capabilities::for_role(Some(UserRole::Customer));
        assert!(caps.is_customer);
        assert!(!caps.can_edit);
        assert!(caps.can_approve_repairs);
    }

    #[test]
    fn missing_profile_is_read_only() {
        let ctx = SessionContext::resolve(Uuid::new_v4(), None);
        assert_eq!(ctx.capabilities, Capabilities::default());
        assert_eq!(ctx.role(), None);
    }
}
