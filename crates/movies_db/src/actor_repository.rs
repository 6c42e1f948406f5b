//! SQLite implementation of the actor repository contracts.
//!
//! Movie linkage lives entirely in the `movie_actors` junction table; an
//! actor's `movie_ids` order is recorded via the `position` column. `Save`
//! diffs the in-memory ordered list against the persisted edges and applies
//! the minimal set of inserts/deletes, same as `SqliteMovieRepository` does
//! for scalar columns.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use movies_core::{
    Actor, ActorId, ActorOrderBy, ActorReader, ActorSearchCriteria, ActorWriter, CancellationToken,
    DomainError, MovieId, NonEmptyText, SortDirection, Year,
};

pub struct SqliteActorRepository {
    pool: SqlitePool,
}

impl SqliteActorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_movie_ids(&self, actor_id: i64) -> Result<Vec<MovieId>, DomainError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            "SELECT movie_id FROM movie_actors WHERE actor_id = ? ORDER BY position",
        )
        .bind(actor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;

        rows.into_iter()
            .map(|(id,)| MovieId::new(id))
            .collect::<Result<Vec<_>, _>>()
    }
}

fn row_to_actor(row: &sqlx::sqlite::SqliteRow, movie_ids: Vec<MovieId>) -> Result<Actor, DomainError> {
    let id: i64 = row.try_get("id").map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let birth_year: i64 = row
        .try_get("birth_year")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let bio: String = row.try_get("bio").map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let version: i64 = row.try_get("version").map_err(|e| DomainError::infrastructure(e.to_string()))?;

    let current_year = Utc::now().year_ce().1 as i32;

    Ok(Actor::hydrate(
        ActorId::new(id)?,
        NonEmptyText::new("name", name)?,
        Year::for_birth(birth_year as i32, current_year.max(birth_year as i32))?,
        bio,
        movie_ids,
        created_at,
        updated_at,
        version as u64,
    ))
}

#[async_trait]
impl ActorReader for SqliteActorRepository {
    async fn find_by_id(&self, id: ActorId, _cancel: CancellationToken) -> Result<Actor, DomainError> {
        let row = sqlx::query("SELECT * FROM actors WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?
            .ok_or_else(|| DomainError::not_found("actor", id.to_string()))?;
        let movie_ids = self.load_movie_ids(id.get()).await?;
        row_to_actor(&row, movie_ids)
    }

    async fn find_by_criteria(
        &self,
        criteria: &ActorSearchCriteria,
        _cancel: CancellationToken,
    ) -> Result<Vec<Actor>, DomainError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT DISTINCT actors.* FROM actors",
        );
        if criteria.movie_id.is_some() {
            builder.push(" JOIN movie_actors ON movie_actors.actor_id = actors.id");
        }
        builder.push(" WHERE 1=1");

        if let Some(name) = &criteria.name {
            builder.push(" AND actors.name LIKE ");
            builder.push_bind(format!("%{name}%"));
        }
        if let Some(min_birth_year) = criteria.min_birth_year {
            builder.push(" AND actors.birth_year >= ");
            builder.push_bind(min_birth_year);
        }
        if let Some(max_birth_year) = criteria.max_birth_year {
            builder.push(" AND actors.birth_year <= ");
            builder.push_bind(max_birth_year);
        }
        if let Some(movie_id) = criteria.movie_id {
            builder.push(" AND movie_actors.movie_id = ");
            builder.push_bind(movie_id.get());
        }

        let order_column = match criteria.order_by {
            ActorOrderBy::Name => "actors.name",
            ActorOrderBy::BirthYear => "actors.birth_year",
            ActorOrderBy::Id => "actors.id",
        };
        let order_dir = match criteria.order_dir {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        };
        builder.push(format!(" ORDER BY {order_column} {order_dir}"));
        builder.push(" LIMIT ");
        builder.push_bind(criteria.limit as i64);
        builder.push(" OFFSET ");
        builder.push_bind(criteria.offset as i64);

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?;

        let mut actors = Vec::with_capacity(rows.len());
        for row in &rows {
            let id: i64 = row.try_get("id").map_err(|e| DomainError::infrastructure(e.to_string()))?;
            let movie_ids = self.load_movie_ids(id).await?;
            actors.push(row_to_actor(row, movie_ids)?);
        }
        Ok(actors)
    }
}

#[async_trait]
impl ActorWriter for SqliteActorRepository {
    async fn save(&self, actor: &mut Actor, _cancel: CancellationToken) -> Result<(), DomainError> {
        actor.validate()?;
        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?;

        let actor_id: i64 = if actor.id().is_unsaved() {
            let id = sqlx::query(
                "INSERT INTO actors (name, birth_year, bio, created_at, updated_at, version)
                 VALUES (?, ?, ?, ?, ?, 1)",
            )
            .bind(actor.name())
            .bind(actor.birth_year())
            .bind(actor.bio())
            .bind(actor.created_at())
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?
            .last_insert_rowid();
            id
        } else {
            let result = sqlx::query(
                "UPDATE actors SET name = ?, birth_year = ?, bio = ?, updated_at = ?, version = version + 1
                 WHERE id = ? AND version = ?",
            )
            .bind(actor.name())
            .bind(actor.birth_year())
            .bind(actor.bio())
            .bind(now)
            .bind(actor.id().get())
            .bind(actor.version() as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?;

            if result.rows_affected() == 0 {
                let current: Option<(i64,)> = sqlx::query_as("SELECT version FROM actors WHERE id = ?")
                    .bind(actor.id().get())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| DomainError::infrastructure(e.to_string()))?;
                let current = current.ok_or_else(|| DomainError::not_found("actor", actor.id().to_string()))?;
                return Err(DomainError::conflict(
                    "actor",
                    actor.id().to_string(),
                    actor.version(),
                    current.0 as u64,
                ));
            }
            actor.id().get()
        };

        let persisted: Vec<(i64,)> = sqlx::query_as(
            "SELECT movie_id FROM movie_actors WHERE actor_id = ? ORDER BY position",
        )
        .bind(actor_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
        let persisted_ids: Vec<i64> = persisted.into_iter().map(|(id,)| id).collect();
        let desired_ids: Vec<i64> = actor.movie_ids().into_iter().map(|id| id.get()).collect();

        if persisted_ids != desired_ids {
            sqlx::query("DELETE FROM movie_actors WHERE actor_id = ?")
                .bind(actor_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::infrastructure(e.to_string()))?;

            for (position, movie_id) in desired_ids.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO movie_actors (movie_id, actor_id, position) VALUES (?, ?, ?)",
                )
                .bind(movie_id)
                .bind(actor_id)
                .bind(position as i64)
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::infrastructure(e.to_string()))?;
            }
        }

        tx.commit().await.map_err(|e| DomainError::infrastructure(e.to_string()))?;

        if actor.id().is_unsaved() {
            actor.assign_id(ActorId::new(actor_id)?, now);
        }
        Ok(())
    }

    async fn delete(&self, id: ActorId, _cancel: CancellationToken) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM actors WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("actor", id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations;
    use movies_core::{ActorWriter as _, MovieWriter as _};
    use sqlx::sqlite::SqlitePoolOptions;
    use tokio::sync::watch;

    fn cancel() -> CancellationToken {
        watch::channel(false).1
    }

    async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new().connect("sqlite::memory:").await.unwrap();
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await.unwrap();
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        migrations::up(&pool, &dir).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn save_assigns_id_and_round_trips() {
        let pool = memory_pool().await;
        let repo = SqliteActorRepository::new(pool);

        let mut actor = Actor::new("Leonardo DiCaprio", 1974, "", 2026, Utc::now()).unwrap();
        repo.save(&mut actor, cancel()).await.unwrap();
        assert!(!actor.id().is_unsaved());

        let loaded = repo.find_by_id(actor.id(), cancel()).await.unwrap();
        assert_eq!(loaded.name(), "Leonardo DiCaprio");
        assert!(loaded.movie_ids().is_empty());
    }

    #[tokio::test]
    async fn link_unlink_round_trips_through_storage() {
        let pool = memory_pool().await;
        let movie_repo = crate::movie_repository::SqliteMovieRepository::new(pool.clone());
        let actor_repo = SqliteActorRepository::new(pool);

        let mut movie = new_movie();
        movie_repo.save(&mut movie, cancel()).await.unwrap();

        let mut actor = Actor::new("Leo", 1974, "", 2026, Utc::now()).unwrap();
        actor_repo.save(&mut actor, cancel()).await.unwrap();

        actor.add_movie(movie.id(), Utc::now());
        actor_repo.save(&mut actor, cancel()).await.unwrap();

        let loaded = actor_repo.find_by_id(actor.id(), cancel()).await.unwrap();
        assert_eq!(loaded.movie_ids(), vec![movie.id()]);

        let mut loaded = loaded;
        loaded.remove_movie(movie.id(), Utc::now());
        actor_repo.save(&mut loaded, cancel()).await.unwrap();

        let reloaded = actor_repo.find_by_id(actor.id(), cancel()).await.unwrap();
        assert!(reloaded.movie_ids().is_empty());
    }

    fn new_movie() -> movies_core::Movie {
        movies_core::Movie::new("Inception", "Christopher Nolan", 2010, 2026, Utc::now()).unwrap()
    }
}
