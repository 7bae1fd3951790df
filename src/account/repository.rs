//! Repository layer for account rows
//!
//! Statements take a `&mut PgConnection` so they can run on a pooled
//! connection or inside an open transaction (`&mut *tx`).

use sqlx::PgConnection;

use super::models::{
    Account, AddAccountBalanceParams, CreateAccountParams, ListAccountsParams,
    UpdateAccountParams,
};

const ACCOUNT_COLUMNS: &str = "id, owner, balance, currency, created_at";

/// Account repository for CRUD operations
pub struct AccountRepository;

impl AccountRepository {
    /// Insert a new account
    pub async fn create(
        conn: &mut PgConnection,
        params: &CreateAccountParams,
    ) -> Result<Account, sqlx::Error> {
        let sql = format!(
            "INSERT INTO accounts_tb (owner, balance, currency) VALUES ($1, $2, $3) RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(&params.owner)
            .bind(params.balance)
            .bind(&params.currency)
            .fetch_one(conn)
            .await
    }

    /// Get account by ID
    pub async fn get_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!("SELECT {} FROM accounts_tb WHERE id = $1", ACCOUNT_COLUMNS);
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Page of accounts ordered by id
    pub async fn list(
        conn: &mut PgConnection,
        params: ListAccountsParams,
    ) -> Result<Vec<Account>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM accounts_tb ORDER BY id LIMIT $1 OFFSET $2",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(conn)
            .await
    }

    /// Replace owner, balance and currency of an existing row
    pub async fn update(
        conn: &mut PgConnection,
        params: &UpdateAccountParams,
    ) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!(
            "UPDATE accounts_tb SET owner = $2, balance = $3, currency = $4 WHERE id = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(params.id)
            .bind(&params.owner)
            .bind(params.balance)
            .bind(&params.currency)
            .fetch_optional(conn)
            .await
    }

    /// Returns false when no row matched
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM accounts_tb WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `balance = balance + amount` in a single statement.
    ///
    /// The UPDATE takes the row lock, which is held until the surrounding
    /// transaction ends.
    pub async fn add_balance(
        conn: &mut PgConnection,
        params: AddAccountBalanceParams,
    ) -> Result<Option<Account>, sqlx::Error> {
        let sql = format!(
            "UPDATE accounts_tb SET balance = balance + $1 WHERE id = $2 RETURNING {}",
            ACCOUNT_COLUMNS
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(params.amount)
            .bind(params.id)
            .fetch_optional(conn)
            .await
    }
}
