//! Forward/backward SQL migration runner.
//!
//! Discovers `<NNN>_<slug>.up.sql` / `<NNN>_<slug>.down.sql` pairs in a
//! directory, tracks what has been applied in `schema_migrations`, and
//! applies or rolls back one version at a time inside a transaction.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use tracing::info;

use crate::error::{DbError, Result};

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub slug: String,
    up_path: PathBuf,
    down_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<i64>,
    pub no_op: bool,
}

/// Discovers migration pairs in `dir`, sorted ascending by version. A
/// version number that appears via only one of `.up.sql`/`.down.sql` is
/// rejected - each discovered version must have both scripts. Version
/// numbers themselves need not be contiguous.
pub fn discover_migrations(dir: &Path) -> Result<Vec<Migration>> {
    let mut ups: BTreeMap<i64, (String, PathBuf)> = BTreeMap::new();
    let mut downs: BTreeMap<i64, PathBuf> = BTreeMap::new();

    let entries = std::fs::read_dir(dir)
        .map_err(|e| DbError::Migration(format!("cannot read migrations dir {}: {e}", dir.display())))?;

    for entry in entries {
        let entry = entry.map_err(|e| DbError::Migration(e.to_string()))?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if let Some(rest) = file_name.strip_suffix(".up.sql") {
            let (version, slug) = parse_prefix(rest)?;
            ups.insert(version, (slug, path));
        } else if let Some(rest) = file_name.strip_suffix(".down.sql") {
            let (version, _slug) = parse_prefix(rest)?;
            downs.insert(version, path);
        }
    }

    let mut migrations = Vec::with_capacity(ups.len());
    for (version, (slug, up_path)) in ups {
        let down_path = downs.remove(&version).ok_or_else(|| {
            DbError::Migration(format!("version {version} has an up script but no down script"))
        })?;
        migrations.push(Migration {
            version,
            slug,
            up_path,
            down_path,
        });
    }

    if let Some((stray_version, _)) = downs.into_iter().next() {
        return Err(DbError::Migration(format!(
            "version {stray_version} has a down script but no up script"
        )));
    }

    migrations.sort_by_key(|m| m.version);
    Ok(migrations)
}

fn parse_prefix(rest: &str) -> Result<(i64, String)> {
    let (number, slug) = rest.split_once('_').ok_or_else(|| {
        DbError::Migration(format!("migration file name '{rest}' is not '<NNN>_<slug>'"))
    })?;
    let version: i64 = number
        .parse()
        .map_err(|_| DbError::Migration(format!("migration version '{number}' is not numeric")))?;
    Ok((version, slug.to_string()))
}

pub async fn ensure_schema_migrations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|(v,)| v).collect())
}

/// Applies every discovered migration with `version` greater than the
/// current maximum applied version, each in its own transaction.
pub async fn up(pool: &SqlitePool, dir: &Path) -> Result<MigrationReport> {
    ensure_schema_migrations_table(pool).await?;
    let migrations = discover_migrations(dir)?;
    let applied = applied_versions(pool).await?;
    let current = applied.into_iter().max().unwrap_or(0);

    let pending: Vec<&Migration> = migrations.iter().filter(|m| m.version > current).collect();
    if pending.is_empty() {
        info!("migrations up: nothing pending");
        return Ok(MigrationReport { applied: vec![], no_op: true });
    }

    let mut applied_versions = Vec::with_capacity(pending.len());
    for migration in pending {
        let sql = std::fs::read_to_string(&migration.up_path)
            .map_err(|e| DbError::Migration(format!("reading {}: {e}", migration.up_path.display())))?;

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(&sql).execute(&mut *tx).await?;
        sqlx::query("INSERT INTO schema_migrations (version) VALUES (?)")
            .bind(migration.version)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(version = migration.version, slug = %migration.slug, "applied migration");
        applied_versions.push(migration.version);
    }

    Ok(MigrationReport {
        applied: applied_versions,
        no_op: false,
    })
}

/// Rolls back exactly the current (highest applied) version.
pub async fn down(pool: &SqlitePool, dir: &Path) -> Result<MigrationReport> {
    ensure_schema_migrations_table(pool).await?;
    let migrations = discover_migrations(dir)?;
    let applied = applied_versions(pool).await?;

    let Some(current) = applied.into_iter().max() else {
        info!("migrations down: nothing applied");
        return Ok(MigrationReport { applied: vec![], no_op: true });
    };

    let migration = migrations
        .iter()
        .find(|m| m.version == current)
        .ok_or_else(|| DbError::Migration(format!("no down script found for applied version {current}")))?;

    let sql = std::fs::read_to_string(&migration.down_path)
        .map_err(|e| DbError::Migration(format!("reading {}: {e}", migration.down_path.display())))?;

    let mut tx = pool.begin().await?;
    sqlx::raw_sql(&sql).execute(&mut *tx).await?;
    sqlx::query("DELETE FROM schema_migrations WHERE version = ?")
        .bind(current)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    info!(version = current, slug = %migration.slug, "rolled back migration");
    Ok(MigrationReport {
        applied: vec![current],
        no_op: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::io::Write;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new().connect("sqlite::memory:").await.unwrap()
    }

    fn write_migration(dir: &Path, version: &str, slug: &str, up: &str, down: &str) {
        let mut up_file = std::fs::File::create(dir.join(format!("{version}_{slug}.up.sql"))).unwrap();
        up_file.write_all(up.as_bytes()).unwrap();
        let mut down_file = std::fs::File::create(dir.join(format!("{version}_{slug}.down.sql"))).unwrap();
        down_file.write_all(down.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn up_then_down_then_up_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(
            dir.path(),
            "001",
            "create_widgets",
            "CREATE TABLE widgets (id INTEGER PRIMARY KEY);",
            "DROP TABLE widgets;",
        );
        let pool = memory_pool().await;

        let report = up(&pool, dir.path()).await.unwrap();
        assert_eq!(report.applied, vec![1]);

        let report = up(&pool, dir.path()).await.unwrap();
        assert!(report.no_op);

        down(&pool, dir.path()).await.unwrap();
        let report = up(&pool, dir.path()).await.unwrap();
        assert_eq!(report.applied, vec![1]);

        let versions = applied_versions(&pool).await.unwrap();
        assert_eq!(versions, vec![1]);
    }

    #[test]
    fn rejects_up_without_down() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("001_broken.up.sql"), "SELECT 1;").unwrap();
        assert!(discover_migrations(dir.path()).is_err());
    }

    #[test]
    fn allows_non_contiguous_versions() {
        let dir = tempfile::tempdir().unwrap();
        write_migration(dir.path(), "001", "a", "SELECT 1;", "SELECT 1;");
        write_migration(dir.path(), "005", "b", "SELECT 1;", "SELECT 1;");
        let migrations = discover_migrations(dir.path()).unwrap();
        assert_eq!(migrations.iter().map(|m| m.version).collect::<Vec<_>>(), vec![1, 5]);
    }
}
