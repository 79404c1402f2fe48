//! Process-local transactional store.
//!
//! Reads see committed rows overlaid with the transaction's own staged
//! writes. Nothing becomes visible to other transactions until `commit`,
//! which re-checks every uniqueness rule under the store lock and applies
//! the whole write set or none of it. Dropping the transaction discards the
//! write set.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use classroom_entity::token::RevocationEntry;
use classroom_entity::user::{Account, AccountChanges, NewAccount};

use super::TransactionError;

#[derive(Debug, Default)]
struct MemoryState {
    accounts: BTreeMap<i64, Account>,
    tokens: BTreeMap<String, RevocationEntry>,
    account_seq: i64,
    token_seq: i64,
}

impl MemoryState {
    fn login_taken(&self, username: &str, email: &str, except: Option<i64>) -> bool {
        self.accounts.values().any(|a| {
            Some(a.id) != except && (a.username == username || a.email == email)
        })
    }
}

/// Shared handle to the process-local store.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryDatabase {
    pub(crate) fn begin(&self) -> MemoryTransaction {
        MemoryTransaction {
            state: Arc::clone(&self.state),
            accounts: BTreeMap::new(),
            tokens: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Staged<T> {
    row: T,
    inserted: bool,
}

/// Write set of one in-flight transaction.
#[derive(Debug)]
pub struct MemoryTransaction {
    state: Arc<Mutex<MemoryState>>,
    accounts: BTreeMap<i64, Staged<Account>>,
    tokens: BTreeMap<String, Staged<RevocationEntry>>,
}

impl MemoryTransaction {
    pub(crate) async fn account_by_id(&self, id: i64) -> Option<Account> {
        if let Some(staged) = self.accounts.get(&id) {
            return Some(staged.row.clone());
        }
        self.state.lock().await.accounts.get(&id).cloned()
    }

    pub(crate) async fn account_by_login(&self, login: &str) -> Option<Account> {
        self.list_accounts()
            .await
            .into_iter()
            .find(|a| a.username == login || a.email == login)
    }

    pub(crate) async fn list_accounts(&self) -> Vec<Account> {
        let state = self.state.lock().await;
        let mut merged = state.accounts.clone();
        drop(state);
        for (id, staged) in &self.accounts {
            merged.insert(*id, staged.row.clone());
        }
        merged.into_values().collect()
    }

    async fn login_taken(&self, username: &str, email: &str, except: Option<i64>) -> bool {
        self.list_accounts().await.iter().any(|a| {
            Some(a.id) != except && (a.username == username || a.email == email)
        })
    }

    /// `None` when the username or email is already in use.
    pub(crate) async fn insert_account(&mut self, new: &NewAccount) -> Option<Account> {
        if self.login_taken(&new.username, &new.email, None).await {
            return None;
        }
        let id = {
            let mut state = self.state.lock().await;
            state.account_seq += 1;
            state.account_seq
        };
        let now = Utc::now();
        let account = Account {
            id,
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            role: new.role,
            created_at: now,
            updated_at: now,
        };
        self.accounts.insert(
            id,
            Staged {
                row: account.clone(),
                inserted: true,
            },
        );
        Some(account)
    }

    /// Outer `None` when the account does not exist, inner `None` when the
    /// new username or email is already in use.
    pub(crate) async fn update_account(
        &mut self,
        id: i64,
        changes: &AccountChanges,
    ) -> Option<Option<Account>> {
        let mut account = self.account_by_id(id).await?;
        changes.apply_to(&mut account);
        if self
            .login_taken(&account.username, &account.email, Some(id))
            .await
        {
            return Some(None);
        }
        let inserted = self.accounts.get(&id).is_some_and(|s| s.inserted);
        self.accounts.insert(
            id,
            Staged {
                row: account.clone(),
                inserted,
            },
        );
        Some(Some(account))
    }

    pub(crate) async fn token(&self, token_id: &str) -> Option<RevocationEntry> {
        if let Some(staged) = self.tokens.get(token_id) {
            return Some(staged.row.clone());
        }
        self.state.lock().await.tokens.get(token_id).cloned()
    }

    /// `None` when the token-id is already registered.
    pub(crate) async fn insert_token(&mut self, token_id: &str) -> Option<RevocationEntry> {
        if self.token(token_id).await.is_some() {
            return None;
        }
        let id = {
            let mut state = self.state.lock().await;
            state.token_seq += 1;
            state.token_seq
        };
        let entry = RevocationEntry {
            id,
            token_id: token_id.to_string(),
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.tokens.insert(
            token_id.to_string(),
            Staged {
                row: entry.clone(),
                inserted: true,
            },
        );
        Some(entry)
    }

    /// `false` when there is no live entry to revoke.
    pub(crate) async fn revoke_token(&mut self, token_id: &str) -> bool {
        let Some(mut entry) = self.token(token_id).await else {
            return false;
        };
        if !entry.is_live() {
            return false;
        }
        entry.deleted_at = Some(Utc::now());
        let inserted = self.tokens.get(token_id).is_some_and(|s| s.inserted);
        self.tokens.insert(
            token_id.to_string(),
            Staged {
                row: entry,
                inserted,
            },
        );
        true
    }

    pub(crate) async fn commit(self) -> Result<(), TransactionError> {
        let mut state = self.state.lock().await;

        for (token_id, staged) in &self.tokens {
            let committed = state.tokens.get(token_id);
            if staged.inserted && committed.is_some() {
                return Err(TransactionError::Conflict(format!(
                    "token id '{token_id}' registered concurrently"
                )));
            }
            if !staged.inserted && committed.is_none_or(|entry| !entry.is_live()) {
                return Err(TransactionError::Conflict(format!(
                    "token id '{token_id}' revoked concurrently"
                )));
            }
        }
        for staged in self.accounts.values() {
            let row = &staged.row;
            if state.login_taken(&row.username, &row.email, Some(row.id)) {
                return Err(TransactionError::Conflict(format!(
                    "username '{}' or email '{}' taken concurrently",
                    row.username, row.email
                )));
            }
        }

        for (id, staged) in self.accounts {
            state.accounts.insert(id, staged.row);
        }
        for (token_id, staged) in self.tokens {
            state.tokens.insert(token_id, staged.row);
        }
        Ok(())
    }

    pub(crate) fn discard(self) {}
}
