//! PostgreSQL transaction opening.

use std::time::Duration;

use sqlx::{PgPool, Postgres, Transaction};

use super::TransactionError;

/// Begin a transaction whose connection the server reclaims if it sits idle
/// inside the transaction for longer than `deadline`.
pub(crate) async fn begin(
    pool: &PgPool,
    deadline: Duration,
) -> Result<Transaction<'static, Postgres>, TransactionError> {
    let mut tx = pool.begin().await.map_err(TransactionError::Open)?;

    // SET does not take bind parameters; the value is an integer we format.
    let millis = deadline.as_millis().min(i32::MAX as u128);
    sqlx::query(&format!(
        "SET LOCAL idle_in_transaction_session_timeout = {millis}"
    ))
    .execute(&mut *tx)
    .await
    .map_err(TransactionError::Open)?;

    Ok(tx)
}
