use domain::ports::StoreError;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{Sqlite, SqlitePoolOptions},
    Pool,
};
use std::{fs, path::Path};
use tracing::{error, info};

mod models;
mod repo;

#[derive(Clone)]
pub struct Db {
    pub(crate) pool: Pool<Sqlite>,
}

impl Db {
    pub async fn new(db_url: &str) -> anyhow::Result<Self> {
        let in_memory = db_url.contains(":memory:");

        if !in_memory {
            if let Some(path_str) = db_url.strip_prefix("sqlite://") {
                let path = Path::new(path_str);
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        fs::create_dir_all(parent)?;
                    }
                }
            }
            if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
                Sqlite::create_database(db_url).await?;
            }
        }

        // every connection to `:memory:` opens its own database, so pin the pool to one
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(db_url)
                .await?
        } else {
            SqlitePoolOptions::new().connect(db_url).await?
        };

        if !in_memory {
            sqlx::query("PRAGMA journal_mode = WAL;")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA synchronous = NORMAL;")
                .execute(&pool)
                .await?;
        }
        sqlx::query("PRAGMA foreign_keys = ON;")
            .execute(&pool)
            .await?;

        sqlx::migrate!("../../migrations").run(&pool).await?;
        info!("Database ready at {}", db_url);

        Ok(Self { pool })
    }
}

pub(crate) fn persistence(err: sqlx::Error) -> StoreError {
    error!("Database error: {}", err);
    StoreError::from_persistence(err)
}
