//! # Store
//!
//! The durable project map: identifier → record, backed by a single SQLite
//! table (`projects`) that survives process restarts.
//!
//! The store exposes exactly the map surface the engine needs: point
//! lookup, membership, point insert/overwrite, and key-ordered enumeration.
//! There is no delete: retirement is a status write performed by the engine.
//! Records are stored as JSON in the `record` column so the row shape never
//! changes as the record evolves.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::errors::Result;
use crate::types::Project;

/// Handle to the durable project map.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ProjectStore {
    pool: SqlitePool,
}

impl ProjectStore {
    /// Open (creating if missing) the database at `database_url` and run
    /// pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let url = if database_url.starts_with("sqlite:") {
            database_url.to_string()
        } else {
            format!("sqlite:{database_url}")
        };

        let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database migrations applied");
        Ok(Self { pool })
    }

    /// An isolated in-memory store.
    ///
    /// Single-connection: with SQLite, every `:memory:` connection is its
    /// own database, so the pool must never open a second one.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Point lookup.
    pub async fn get(&self, id: &str) -> Result<Option<Project>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT record FROM projects WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((record,)) => Ok(Some(serde_json::from_str(&record)?)),
            None => Ok(None),
        }
    }

    /// Membership test, used by identifier allocation.
    pub async fn contains(&self, id: &str) -> Result<bool> {
        let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM projects WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Point insert / overwrite under the record's own key.
    pub async fn insert(&self, project: &Project) -> Result<()> {
        let record = serde_json::to_string(project)?;
        sqlx::query(
            r#"
            INSERT INTO projects (id, record)
            VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET record = excluded.record
            "#,
        )
        .bind(&project.id)
        .bind(record)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Enumerate every stored record in key order.
    pub async fn values(&self) -> Result<Vec<Project>> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT record FROM projects ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|(record,)| serde_json::from_str(&record).map_err(Into::into))
            .collect()
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProjectStatus;

    fn sample(id: &str) -> Project {
        Project {
            id: id.to_string(),
            creator: "alice".into(),
            title: "Solar farm".into(),
            description: "Community solar array".into(),
            goal_amount: 500,
            raised_amount: 0,
            start_time: 1_000,
            deadline: 2_000,
            contributors: Vec::new(),
            status: ProjectStatus::Funding,
        }
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let store = ProjectStore::in_memory().await.unwrap();
        assert!(store.get("absent").await.unwrap().is_none());
        assert!(!store.contains("absent").await.unwrap());
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = ProjectStore::in_memory().await.unwrap();
        let project = sample("aa");
        store.insert(&project).await.unwrap();

        assert!(store.contains("aa").await.unwrap());
        assert_eq!(store.get("aa").await.unwrap(), Some(project));
    }

    #[tokio::test]
    async fn insert_overwrites_existing_record() {
        let store = ProjectStore::in_memory().await.unwrap();
        let mut project = sample("aa");
        store.insert(&project).await.unwrap();

        project.raised_amount = 300;
        project.contributors.push("bob".into());
        store.insert(&project).await.unwrap();

        let stored = store.get("aa").await.unwrap().unwrap();
        assert_eq!(stored.raised_amount, 300);
        assert_eq!(stored.contributors, vec!["bob".to_string()]);
    }

    #[tokio::test]
    async fn values_enumerates_in_key_order() {
        let store = ProjectStore::in_memory().await.unwrap();
        for id in ["cc", "aa", "bb"] {
            store.insert(&sample(id)).await.unwrap();
        }

        let ids: Vec<_> = store
            .values()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["aa", "bb", "cc"]);
    }
}
