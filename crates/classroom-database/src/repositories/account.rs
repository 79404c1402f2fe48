//! Account repository.

use classroom_core::error::{AppError, ErrorKind};
use classroom_core::result::AppResult;
use classroom_entity::user::{
    Account, AccountChanges, AccountQuery, AccountSort, NewAccount, SortOrder,
};

use super::map_write_error;
use crate::transaction::{RequestTransaction, TxBackend};

const LOGIN_TAKEN: &str = "Username or email already in use";

/// Account reads and writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountRepository;

impl AccountRepository {
    /// Find an account by primary key.
    pub async fn find_by_id(tx: &mut RequestTransaction, id: i64) -> AppResult<Option<Account>> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => {
                sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&mut **pg)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to find account", e)
                    })
            }
            TxBackend::Memory(mem) => Ok(mem.account_by_id(id).await),
        }
    }

    /// Find an account by username or email.
    pub async fn find_by_login(
        tx: &mut RequestTransaction,
        login: &str,
    ) -> AppResult<Option<Account>> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => sqlx::query_as::<_, Account>(
                "SELECT * FROM accounts WHERE username = $1 OR email = $1 LIMIT 1",
            )
            .bind(login)
            .fetch_optional(&mut **pg)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find account by login", e)
            }),
            TxBackend::Memory(mem) => Ok(mem.account_by_login(login).await),
        }
    }

    /// List one page of accounts.
    pub async fn list(
        tx: &mut RequestTransaction,
        query: &AccountQuery,
    ) -> AppResult<Vec<Account>> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => {
                // Column and direction come from closed enums, never from input text.
                let sql = format!(
                    "SELECT * FROM accounts ORDER BY {} {}, id LIMIT $1 OFFSET $2",
                    query.sort.column(),
                    query.order.keyword()
                );
                sqlx::query_as::<_, Account>(&sql)
                    .bind(query.limit())
                    .bind(query.offset())
                    .fetch_all(&mut **pg)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Database, "Failed to list accounts", e)
                    })
            }
            TxBackend::Memory(mem) => {
                let mut accounts = mem.list_accounts().await;
                sort_accounts(&mut accounts, query.sort, query.order);
                let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
                let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
                Ok(accounts.into_iter().skip(offset).take(limit).collect())
            }
        }
    }

    /// Insert a new account.
    pub async fn create(tx: &mut RequestTransaction, new: &NewAccount) -> AppResult<Account> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => sqlx::query_as::<_, Account>(
                "INSERT INTO accounts (username, email, password_hash, first_name, last_name, role) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
            )
            .bind(&new.username)
            .bind(&new.email)
            .bind(&new.password_hash)
            .bind(&new.first_name)
            .bind(&new.last_name)
            .bind(new.role)
            .fetch_one(&mut **pg)
            .await
            .map_err(|e| map_write_error(e, "Failed to create account", LOGIN_TAKEN)),
            TxBackend::Memory(mem) => mem
                .insert_account(new)
                .await
                .ok_or_else(|| AppError::conflict(LOGIN_TAKEN)),
        }
    }

    /// Apply a partial update. Returns `None` when the account does not exist.
    pub async fn update(
        tx: &mut RequestTransaction,
        id: i64,
        changes: &AccountChanges,
    ) -> AppResult<Option<Account>> {
        match tx.backend_mut()? {
            TxBackend::Postgres(pg) => sqlx::query_as::<_, Account>(
                "UPDATE accounts SET \
                     username = COALESCE($2, username), \
                     email = COALESCE($3, email), \
                     first_name = COALESCE($4, first_name), \
                     last_name = COALESCE($5, last_name), \
                     role = COALESCE($6, role), \
                     password_hash = COALESCE($7, password_hash), \
                     updated_at = NOW() \
                 WHERE id = $1 RETURNING *",
            )
            .bind(id)
            .bind(&changes.username)
            .bind(&changes.email)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(changes.role)
            .bind(&changes.password_hash)
            .fetch_optional(&mut **pg)
            .await
            .map_err(|e| map_write_error(e, "Failed to update account", LOGIN_TAKEN)),
            TxBackend::Memory(mem) => match mem.update_account(id, changes).await {
                None => Ok(None),
                Some(None) => Err(AppError::conflict(LOGIN_TAKEN)),
                Some(Some(account)) => Ok(Some(account)),
            },
        }
    }
}

fn sort_accounts(accounts: &mut [Account], sort: AccountSort, order: SortOrder) {
    accounts.sort_by(|a, b| {
        let ordering = match sort {
            AccountSort::Id => a.id.cmp(&b.id),
            AccountSort::Username => a.username.cmp(&b.username),
            AccountSort::Email => a.email.cmp(&b.email),
            AccountSort::FirstName => a.first_name.cmp(&b.first_name),
            AccountSort::LastName => a.last_name.cmp(&b.last_name),
            AccountSort::CreatedAt => a.created_at.cmp(&b.created_at),
            AccountSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        }
        .then(a.id.cmp(&b.id));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}
