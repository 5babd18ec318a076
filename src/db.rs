use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::query_dsl::methods::ExecuteDsl;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::Error as DieselError;
use diesel::sqlite::SqliteConnection;
use diesel::sql_types::Text;
use diesel::QueryResult;
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Number of attempts made by `execute_with_retry` before giving up
const MAX_WRITE_ATTEMPTS: u32 = 5;

/// Base delay between write attempts, doubled after every failure
const RETRY_BASE_DELAY: Duration = Duration::from_millis(20);

/// Name of the SQL function registered on every pooled connection
pub const FOLD_CASE_FUNCTION: &str = "fold_case";

diesel::define_sql_function! {
    /// Unicode lowercase, where SQLite's own `lower` only folds ASCII
    fn fold_case(text: Text) -> Text;
}

/// Applies per-connection pragmas and functions as connections are handed out by the pool
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 2000;")
            .map_err(diesel::r2d2::Error::QueryError)?;
        fold_case_utils::register_impl(conn, |text: String| text.to_lowercase())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Initializes a connection pool for the given database URL
///
/// Every connection enforces foreign keys and waits briefly on a locked
/// database before reporting `SQLITE_BUSY`.
///
/// ### Panics
///
/// Panics if the pool cannot be built, which only happens when the first
/// connection cannot be opened.
pub fn init_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .expect("Failed to create pool.")
}

/// Returns true when a database error means another writer holds the lock
fn is_lock_error(err: &DieselError) -> bool {
    match err {
        DieselError::DatabaseError(_, info) => {
            let message = info.message();
            message.contains("database is locked")
                || message.contains("database table is locked")
                || message.contains("busy")
        }
        _ => false,
    }
}

/// Executes a write statement, retrying while SQLite reports the database as locked
pub trait ExecuteWithRetry: Sized {
    async fn execute_with_retry(self, conn: &mut SqliteConnection) -> QueryResult<usize>;
}

impl<T> ExecuteWithRetry for T
where
    T: ExecuteDsl<SqliteConnection> + Clone,
{
    async fn execute_with_retry(self, conn: &mut SqliteConnection) -> QueryResult<usize> {
        let mut delay = RETRY_BASE_DELAY;
        let mut attempt = 1;
        loop {
            match ExecuteDsl::execute(self.clone(), conn) {
                Err(err) if attempt < MAX_WRITE_ATTEMPTS && is_lock_error(&err) => {
                    warn!("Database locked on attempt {}, retrying in {:?}", attempt, delay);
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                result => {
                    if attempt > 1 {
                        debug!("Write finished after {} attempts", attempt);
                    }
                    return result;
                }
            }
        }
    }
}

/// Runs `body` in an immediate transaction, retrying the whole transaction
/// while SQLite reports the database as locked
///
/// `body` may run more than once, so it must not keep state between calls.
///
/// ### Errors
///
/// Returns the error of the last attempt, or the first error that is not a
/// lock error.
pub async fn transaction_with_retry<T, F>(conn: &mut SqliteConnection, mut body: F) -> anyhow::Result<T>
where
    F: FnMut(&mut SqliteConnection) -> anyhow::Result<T>,
{
    let mut delay = RETRY_BASE_DELAY;
    let mut attempt = 1;
    loop {
        match conn.immediate_transaction(|conn| body(conn)) {
            Err(err)
                if attempt < MAX_WRITE_ATTEMPTS
                    && err.downcast_ref::<DieselError>().is_some_and(is_lock_error) =>
            {
                warn!("Database locked on attempt {}, retrying transaction in {:?}", attempt, delay);
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            result => {
                if attempt > 1 {
                    debug!("Transaction finished after {} attempts", attempt);
                }
                return result;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
    use diesel::RunQueryDsl;

    #[derive(Debug)]
    struct Message(&'static str);

    impl DatabaseErrorInformation for Message {
        fn message(&self) -> &str {
            self.0
        }
        fn details(&self) -> Option<&str> {
            None
        }
        fn hint(&self) -> Option<&str> {
            None
        }
        fn table_name(&self) -> Option<&str> {
            None
        }
        fn column_name(&self) -> Option<&str> {
            None
        }
        fn constraint_name(&self) -> Option<&str> {
            None
        }
        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn database_error(message: &'static str) -> DieselError {
        DieselError::DatabaseError(DatabaseErrorKind::Unknown, Box::new(Message(message)))
    }

    #[test]
    fn test_lock_errors_are_retryable() {
        assert!(is_lock_error(&database_error("database is locked")));
        assert!(is_lock_error(&database_error("database table is locked: card_sets")));
    }

    #[test]
    fn test_other_errors_are_not_retryable() {
        assert!(!is_lock_error(&database_error("UNIQUE constraint failed: card_sets.name")));
        assert!(!is_lock_error(&DieselError::NotFound));
    }

    #[test]
    fn test_fold_case_lowers_non_ascii() {
        let pool = init_pool(":memory:");
        let conn = &mut pool.get().unwrap();

        let folded = diesel::select(fold_case("ÉLAN Deck")).get_result::<String>(conn).unwrap();

        assert_eq!(folded, "élan deck");
    }

    #[tokio::test]
    async fn test_transaction_retries_on_lock_error() {
        let pool = init_pool(":memory:");
        let conn = &mut pool.get().unwrap();

        let mut calls = 0;
        let result = transaction_with_retry(conn, |_| {
            calls += 1;
            if calls < 3 {
                return Err(database_error("database is locked").into());
            }
            Ok(calls)
        })
        .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_transaction_gives_up_on_other_errors() {
        let pool = init_pool(":memory:");
        let conn = &mut pool.get().unwrap();

        let mut calls = 0;
        let result: anyhow::Result<()> = transaction_with_retry(conn, |_| {
            calls += 1;
            Err(database_error("UNIQUE constraint failed: card_sets.name").into())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_transaction_stops_after_max_attempts() {
        let pool = init_pool(":memory:");
        let conn = &mut pool.get().unwrap();

        let mut calls = 0;
        let result: anyhow::Result<()> = transaction_with_retry(conn, |_| {
            calls += 1;
            Err(database_error("database is locked").into())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, MAX_WRITE_ATTEMPTS);
    }
}
