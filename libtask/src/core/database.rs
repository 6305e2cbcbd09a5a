use crate::{
    Result,
    core::model::{Collection, Model},
};

use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{fmt::Display, future::Future, str::FromStr};
use tracing::{debug, trace, warn};

/// An object that represents a connection to the task database
#[derive(Clone, Debug)]
pub struct Database(Pool<Sqlite>);

impl From<Pool<Sqlite>> for Database {
    /// **WARNING**: This is primarily intended for tests. You should probably
    /// use [Database::open()] instead of creating the pool yourself, since
    /// [Database::open()] will perform database schema migration automatically.
    fn from(value: Pool<Sqlite>) -> Self {
        Self(value)
    }
}

impl Database {
    /// Open a connection to the database at the given sqlite url (e.g.
    /// `sqlite://tasks.sqlite`). The database file is created if it doesn't
    /// exist yet, and any necessary sql migrations are run so that the `tasks`
    /// and `users` collections are available.
    pub async fn open(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        debug!(url, "opening database");
        let dbpool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        trace!("Running database migrations");
        sqlx::migrate!("../db/migrations").run(&dbpool).await?;
        Ok(Database(dbpool))
    }

    /// gets a reference to the underlying sqlx connection pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.0
    }

    /// Get a handle to the collection that stores documents of type `M`
    pub fn collection<M: Model>(&self) -> Collection<'_, M> {
        Collection::new(self)
    }

    /// Release the connection. Any clones of this handle are closed as well.
    pub async fn close(self) {
        trace!("Closing database");
        self.0.close().await
    }
}

/// Run `op` against `db` and close the database afterwards, whether or not
/// the operation succeeded. The result of `op` is returned unchanged.
pub async fn with_database<F, Fut, T, E>(db: Database, op: F) -> Result<T, E>
where
    F: FnOnce(Database) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let res = op(db.clone()).await;
    if let Err(ref e) = res {
        warn!("operation failed: {e}");
    }
    db.close().await;
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use sqlx::Row;
    use test_log::test;

    #[test(tokio::test)]
    async fn open_runs_migrations() {
        let db = Database::open("sqlite::memory:")
            .await
            .expect("Failed to open database");
        let tables: Vec<String> = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE '\\_%' ESCAPE '\\' AND name NOT LIKE 'sqlite%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .expect("Failed to list tables")
        .into_iter()
        .map(|row| row.get("name"))
        .collect();
        assert_eq!(tables, vec!["tasks", "user_tasks", "users"]);
        db.close().await;
    }

    #[test(tokio::test)]
    async fn open_fails_for_missing_directory() {
        let res = Database::open("sqlite:///no-such-directory/tasks/tasks.sqlite").await;
        assert!(matches!(res, Err(Error::DatabaseError(_))));
    }

    #[test(tokio::test)]
    async fn scoped_close_on_success() {
        let db = Database::open("sqlite::memory:").await.unwrap();
        let handle = db.clone();
        let n = with_database(db, |db| async move {
            let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
                .fetch_one(db.pool())
                .await?;
            Ok::<_, Error>(n)
        })
        .await
        .expect("operation should succeed");
        assert_eq!(n, 0);
        assert!(handle.pool().is_closed());
    }

    #[test(tokio::test)]
    async fn scoped_close_on_failure() {
        let db = Database::open("sqlite::memory:").await.unwrap();
        let mut seen = None;
        let res: Result<(), Error> = with_database(db, |db| {
            seen = Some(db.clone());
            async move {
                sqlx::query("SELECT * FROM no_such_table")
                    .execute(db.pool())
                    .await?;
                Ok::<(), Error>(())
            }
        })
        .await;
        assert!(res.is_err());
        assert!(seen.expect("operation was not run").pool().is_closed());
    }
}
