use std::path::Path;
use anyhow::Context;
use log::info;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

pub const NAMESPACE: &str = "shorts";
pub const DATABASE: &str = "app";

/// Open the embedded RocksDB-backed database, creating its directory if needed
pub async fn connect(db_path: &Path) -> anyhow::Result<Surreal<Db>> {
    info!("Setting up database at {}", db_path.display());

    tokio::fs::create_dir_all(db_path)
        .await
        .with_context(|| format!("failed to create {}", db_path.display()))?;

    let db = Surreal::new::<RocksDb>(db_path.to_path_buf())
        .await
        .context("failed to open database")?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;

    Ok(db)
}

/// Volatile database for tests and throwaway runs
pub async fn connect_in_memory() -> anyhow::Result<Surreal<Db>> {
    let db = Surreal::new::<Mem>(()).await?;
    db.use_ns(NAMESPACE).use_db(DATABASE).await?;
    Ok(db)
}
