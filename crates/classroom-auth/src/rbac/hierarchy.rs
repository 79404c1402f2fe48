//! The fixed role order.

use classroom_entity::user::Role;

/// Subsumption over the linear order SuperAdmin > Admin > User.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleHierarchy;

impl RoleHierarchy {
    /// True iff `actual` is `required` or strictly senior to it.
    pub fn subsumes(actual: Role, required: Role) -> bool {
        actual.rank() >= required.rank()
    }

    /// True iff `actual` subsumes at least one of `allowed`.
    pub fn subsumes_any(actual: Role, allowed: &[Role]) -> bool {
        allowed.iter().any(|required| Self::subsumes(actual, *required))
    }
}
