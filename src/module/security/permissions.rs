//! Role-based access to remote modules
//!
//! A module is allowed for a role when its permission set is empty, when the
//! role is listed, or when the role is the administrative role.

use std::collections::BTreeSet;
use tracing::debug;

/// Permission rule with an administrative bypass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    admin_role: String,
}

impl AccessPolicy {
    pub fn new(admin_role: impl Into<String>) -> Self {
        Self {
            admin_role: admin_role.into(),
        }
    }

    pub fn admin_role(&self) -> &str {
        &self.admin_role
    }

    /// Whether `role` may open a module requiring `permissions`
    #[inline]
    pub fn is_allowed(&self, role: &str, permissions: &BTreeSet<String>) -> bool {
        let allowed =
            permissions.is_empty() || permissions.contains(role) || role == self.admin_role;
        debug!(
            "Access check: role={} permissions={:?} allowed={}",
            role, permissions, allowed
        );
        allowed
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new("admin")
    }
}
