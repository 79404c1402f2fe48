//! Account domain entities.

pub mod model;
pub mod query;
pub mod role;

pub use model::{Account, AccountChanges, NewAccount};
pub use query::{AccountQuery, AccountSort, SortOrder};
pub use role::Role;
