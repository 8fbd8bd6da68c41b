//! SQL helper behind the SQL-injection-flavored fixture
//!
//! Mirrors the `DatabaseHelper` contract the original corpus assumes: get a
//! connection, run a statement, print the results, and let a `hideSQLErrors`
//! flag decide whether SQL failures collapse into a generic message or
//! surface to the caller. The lookup below interpolates the attacker value
//! straight into the statement text; that injection is the fixture's payload
//! and must not be "fixed" with bind parameters.

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite};
use tracing::{info, warn};

use crate::error::BenchError;
use crate::sink::encode_for_html;

/// Generic response used when SQL errors are hidden.
pub const GENERIC_SQL_ERROR: &str = "Error processing request.";

#[derive(Debug, Clone)]
pub struct SqlHelper {
    pool: Pool<Sqlite>,
    hide_sql_errors: bool,
}

/// One row of the seeded `users` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub userid: i64,
    pub username: String,
    pub cc_number: String,
}

/// Outcome of a lookup under the error-hiding policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlOutcome {
    Rows(Vec<UserRow>),
    /// The statement failed and `hide_sql_errors` swallowed it.
    Hidden,
}

impl SqlHelper {
    /// Open an in-memory SQLite database and seed the fixture table.
    pub async fn connect(hide_sql_errors: bool) -> Result<Self, BenchError> {
        // A single connection keeps every query on the same in-memory
        // database; separate pooled connections would each see an empty one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE users (
                userid INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                cc_number TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        for (userid, username, cc_number) in [
            (1_i64, "jsmith", "4111111111111111"),
            (2, "jdoe", "5500000000000004"),
            (3, "admin", "340000000000009"),
        ] {
            sqlx::query("INSERT INTO users (userid, username, cc_number) VALUES (?, ?, ?)")
                .bind(userid)
                .bind(username)
                .bind(cc_number)
                .execute(&pool)
                .await?;
        }

        info!("fixture database seeded");
        Ok(Self {
            pool,
            hide_sql_errors,
        })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Look up users by name with the attacker value interpolated verbatim
    /// into the statement. Failures are swallowed or propagated according to
    /// the `hide_sql_errors` flag.
    pub async fn lookup_user(&self, raw_name: &str) -> Result<SqlOutcome, BenchError> {
        let sql = format!(
            "SELECT userid, username, cc_number FROM users WHERE username = '{raw_name}'"
        );
        match sqlx::query(&sql).fetch_all(&self.pool).await {
            Ok(rows) => {
                let users = rows
                    .iter()
                    .map(|row| UserRow {
                        userid: row.get("userid"),
                        username: row.get("username"),
                        cc_number: row.get("cc_number"),
                    })
                    .collect();
                Ok(SqlOutcome::Rows(users))
            }
            Err(err) if self.hide_sql_errors => {
                warn!(error = %err, "SQL error hidden per configuration");
                Ok(SqlOutcome::Hidden)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Render a lookup outcome as the HTML fragment the fixture responds with.
pub fn print_results(outcome: &SqlOutcome) -> String {
    match outcome {
        SqlOutcome::Rows(rows) if rows.is_empty() => "No results found.<br/>".to_string(),
        SqlOutcome::Rows(rows) => {
            let mut out = String::new();
            for row in rows {
                out.push_str(&format!(
                    "User: {} (id {}), CC: {}<br/>",
                    encode_for_html(&row.username),
                    row.userid,
                    encode_for_html(&row.cc_number)
                ));
            }
            out
        }
        SqlOutcome::Hidden => format!("{GENERIC_SQL_ERROR}<br/>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_finds_seeded_user() {
        let helper = SqlHelper::connect(true).await.unwrap();
        let outcome = helper.lookup_user("jsmith").await.unwrap();
        match outcome {
            SqlOutcome::Rows(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].username, "jsmith");
            }
            SqlOutcome::Hidden => panic!("lookup should not be hidden"),
        }
    }

    #[tokio::test]
    async fn lookup_misses_yield_empty_rows() {
        let helper = SqlHelper::connect(true).await.unwrap();
        let outcome = helper.lookup_user("nobody").await.unwrap();
        assert_eq!(outcome, SqlOutcome::Rows(Vec::new()));
    }

    #[tokio::test]
    async fn injection_widens_the_result_set() {
        // The point of the fixture: a tautology in the name returns the table.
        let helper = SqlHelper::connect(true).await.unwrap();
        let outcome = helper.lookup_user("x' OR '1'='1").await.unwrap();
        match outcome {
            SqlOutcome::Rows(rows) => assert_eq!(rows.len(), 3),
            SqlOutcome::Hidden => panic!("tautology is valid SQL and must not be hidden"),
        }
    }

    #[tokio::test]
    async fn broken_sql_is_hidden_when_flag_set() {
        let helper = SqlHelper::connect(true).await.unwrap();
        let outcome = helper.lookup_user("x' AND BADFUNC(").await.unwrap();
        assert_eq!(outcome, SqlOutcome::Hidden);
    }

    #[tokio::test]
    async fn broken_sql_propagates_when_flag_clear() {
        let helper = SqlHelper::connect(false).await.unwrap();
        let err = helper.lookup_user("x' AND BADFUNC(").await.unwrap_err();
        assert!(matches!(err, BenchError::Database(_)));
    }

    #[test]
    fn print_results_renders_rows_and_hidden() {
        let rows = SqlOutcome::Rows(vec![UserRow {
            userid: 3,
            username: "admin".to_string(),
            cc_number: "340000000000009".to_string(),
        }]);
        assert_eq!(
            print_results(&rows),
            "User: admin (id 3), CC: 340000000000009<br/>"
        );
        assert_eq!(print_results(&SqlOutcome::Hidden), "Error processing request.<br/>");
        assert_eq!(print_results(&SqlOutcome::Rows(Vec::new())), "No results found.<br/>");
    }
}
