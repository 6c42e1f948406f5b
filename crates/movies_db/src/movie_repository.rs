//! SQLite implementation of the movie repository contracts.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use movies_core::{
    CancellationToken, DomainError, Movie, MovieId, MovieOrderBy, MovieReader, MovieSearchCriteria,
    MovieWriter, NonEmptyText, PosterUrl, Rating, SortDirection, Year,
};

pub struct SqliteMovieRepository {
    pool: SqlitePool,
}

impl SqliteMovieRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_movie(row: &sqlx::sqlite::SqliteRow) -> Result<Movie, DomainError> {
    let id: i64 = row.try_get("id").map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let title: String = row.try_get("title").map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let director: String = row
        .try_get("director")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let year: i64 = row.try_get("year").map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let rating: Option<f64> = row.try_get("rating").map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let genres_json: String = row
        .try_get("genres")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let poster_url: String = row
        .try_get("poster_url")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let created_at: DateTime<Utc> = row
        .try_get("created_at")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let updated_at: DateTime<Utc> = row
        .try_get("updated_at")
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let version: i64 = row.try_get("version").map_err(|e| DomainError::infrastructure(e.to_string()))?;

    let genres: Vec<String> = serde_json::from_str(&genres_json)
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;
    let current_year = Utc::now().year_ce().1 as i32;

    Ok(Movie::hydrate(
        MovieId::new(id)?,
        NonEmptyText::new("title", title)?,
        NonEmptyText::new("director", director)?,
        Year::for_movie(year as i32, current_year.max(year as i32))?,
        rating.map(Rating::new).transpose()?,
        genres,
        PosterUrl::new(poster_url)?,
        created_at,
        updated_at,
        version as u64,
    ))
}

#[async_trait]
impl MovieReader for SqliteMovieRepository {
    async fn find_by_id(&self, id: MovieId, _cancel: CancellationToken) -> Result<Movie, DomainError> {
        let row = sqlx::query("SELECT * FROM movies WHERE id = ?")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?
            .ok_or_else(|| DomainError::not_found("movie", id.to_string()))?;
        row_to_movie(&row)
    }

    async fn find_by_criteria(
        &self,
        criteria: &MovieSearchCriteria,
        _cancel: CancellationToken,
    ) -> Result<Vec<Movie>, DomainError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM movies WHERE 1=1");

        if let Some(title) = &criteria.title {
            builder.push(" AND title LIKE ");
            builder.push_bind(format!("%{title}%"));
        }
        if let Some(director) = &criteria.director {
            builder.push(" AND director LIKE ");
            builder.push_bind(format!("%{director}%"));
        }
        if let Some(genre) = &criteria.genre {
            builder.push(" AND genres LIKE ");
            builder.push_bind(format!("%\"{genre}\"%"));
        }
        if let Some(min_year) = criteria.min_year {
            builder.push(" AND year >= ");
            builder.push_bind(min_year);
        }
        if let Some(max_year) = criteria.max_year {
            builder.push(" AND year <= ");
            builder.push_bind(max_year);
        }
        if let Some(min_rating) = criteria.min_rating {
            builder.push(" AND rating >= ");
            builder.push_bind(min_rating);
        }
        if let Some(max_rating) = criteria.max_rating {
            builder.push(" AND rating <= ");
            builder.push_bind(max_rating);
        }

        let order_column = match criteria.order_by {
            MovieOrderBy::Title => "title",
            MovieOrderBy::Year => "year",
            MovieOrderBy::Rating => "rating",
            MovieOrderBy::Id => "id",
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

        rows.iter().map(row_to_movie).collect()
    }
}

#[async_trait]
impl MovieWriter for SqliteMovieRepository {
    async fn save(&self, movie: &mut Movie, _cancel: CancellationToken) -> Result<(), DomainError> {
        movie.validate()?;
        let genres_json = serde_json::to_string(&movie.genres()).unwrap_or_else(|_| "[]".to_string());
        let now = Utc::now();

        if movie.id().is_unsaved() {
            let id: i64 = sqlx::query(
                "INSERT INTO movies (title, director, year, rating, genres, poster_url, created_at, updated_at, version)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)",
            )
            .bind(movie.title())
            .bind(movie.director())
            .bind(movie.year())
            .bind(movie.rating())
            .bind(&genres_json)
            .bind(movie.poster_url())
            .bind(movie.created_at())
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?
            .last_insert_rowid();

            movie.assign_id(MovieId::new(id)?, now);
            return Ok(());
        }

        let result = sqlx::query(
            "UPDATE movies SET title = ?, director = ?, year = ?, rating = ?, genres = ?, poster_url = ?,
             updated_at = ?, version = version + 1
             WHERE id = ? AND version = ?",
        )
        .bind(movie.title())
        .bind(movie.director())
        .bind(movie.year())
        .bind(movie.rating())
        .bind(&genres_json)
        .bind(movie.poster_url())
        .bind(now)
        .bind(movie.id().get())
        .bind(movie.version() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::infrastructure(e.to_string()))?;

        if result.rows_affected() == 0 {
            let current: (i64,) = sqlx::query_as("SELECT version FROM movies WHERE id = ?")
                .bind(movie.id().get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| DomainError::infrastructure(e.to_string()))?
                .ok_or_else(|| DomainError::not_found("movie", movie.id().to_string()))?;

            return Err(DomainError::conflict(
                "movie",
                movie.id().to_string(),
                movie.version(),
                current.0 as u64,
            ));
        }

        Ok(())
    }

    async fn delete(&self, id: MovieId, _cancel: CancellationToken) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::infrastructure(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("movie", id.to_string()));
        }
        Ok(())
    }
}
