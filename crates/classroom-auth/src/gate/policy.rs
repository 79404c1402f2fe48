//! Operation-to-role allow-list.

use std::collections::HashMap;

use classroom_entity::user::Role;

use super::operation::Operation;

/// Closed allow-list. An operation without an entry is denied to everyone.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    grants: HashMap<Operation, Vec<Role>>,
}

impl AccessPolicy {
    /// A policy that grants nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Allow `roles` (and every role senior to them) to invoke `operation`.
    pub fn grant(mut self, operation: Operation, roles: &[Role]) -> Self {
        self.grants.insert(operation, roles.to_vec());
        self
    }

    /// Drop the entry for `operation`, making it inaccessible.
    pub fn revoke(mut self, operation: Operation) -> Self {
        self.grants.remove(&operation);
        self
    }

    /// The allowed roles, or `None` when the operation is unmapped.
    pub fn allowed(&self, operation: Operation) -> Option<&[Role]> {
        self.grants.get(&operation).map(Vec::as_slice)
    }

    /// The service's route table.
    ///
    /// `GetUser` and `UpdateUser` are open to every role here; the handlers
    /// narrow them to the caller's own record unless the caller is a
    /// superadmin.
    pub fn standard() -> Self {
        Self::empty()
            .grant(Operation::Logout, &[Role::User])
            .grant(Operation::ChangePassword, &[Role::User])
            .grant(Operation::RefreshToken, &[Role::User])
            .grant(Operation::GetAccount, &[Role::User])
            .grant(Operation::GetUser, &[Role::User])
            .grant(Operation::UpdateUser, &[Role::User])
            .grant(Operation::ListUsers, &[Role::Admin])
            .grant(Operation::CreateUser, &[Role::Admin])
    }
}
