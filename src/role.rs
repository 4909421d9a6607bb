//! Role gate: a pure decision over the route's declared role requirement and
//! the user's role set.

use crate::routes::{RoleRequirement, RouteClassification};
use crate::session::{Role, UserProfile};

/// Outcome of the role gate.
///
/// `AllowMultiRole` grants admission exactly like `Allow`; it only tells the
/// UI to offer a dashboard switch instead of the denial panel, because the
/// user also holds the other recognized persona.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleVerdict {
    Allow,
    AllowMultiRole,
    Deny { required: Role },
}

#[must_use]
pub fn evaluate(classification: &RouteClassification, user: &UserProfile) -> RoleVerdict {
    let required = match classification.role_requirement {
        RoleRequirement::None => return RoleVerdict::Allow,
        RoleRequirement::JobSeeker => Role::JobSeeker,
        RoleRequirement::Employer => Role::Employer,
    };

    if !user.has_role(required) {
        return RoleVerdict::Deny { required };
    }

    if user.holds_both_roles() {
        RoleVerdict::AllowMultiRole
    } else {
        RoleVerdict::Allow
    }
}
