//! Account listing parameters.

use serde::{Deserialize, Serialize};

/// Column accounts can be listed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSort {
    #[default]
    Id,
    Username,
    Email,
    FirstName,
    LastName,
    CreatedAt,
    UpdatedAt,
}

impl AccountSort {
    /// Column name; only ever one of a fixed set.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Username => "username",
            Self::Email => "email",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One page of the account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountQuery {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub sort: AccountSort,
    pub order: SortOrder,
}

impl AccountQuery {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

impl Default for AccountQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            sort: AccountSort::default(),
            order: SortOrder::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_zero_based() {
        let query = AccountQuery {
            page: 3,
            page_size: 25,
            ..AccountQuery::default()
        };
        assert_eq!(query.offset(), 50);
        assert_eq!(query.limit(), 25);
    }

    #[test]
    fn test_page_zero_clamps_to_first_page() {
        let query = AccountQuery {
            page: 0,
            ..AccountQuery::default()
        };
        assert_eq!(query.offset(), 0);
    }
}
