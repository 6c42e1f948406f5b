//! Read-model shapes returned by application services. Tool handlers
//! serialize these directly into a `tools/call` response's `text` field.

use chrono::{DateTime, Utc};
use serde::Serialize;

use movies_core::{Actor, Movie};

#[derive(Debug, Clone, Serialize)]
pub struct MovieDto {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub rating: Option<f64>,
    pub genres: Vec<String>,
    pub poster_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl From<&Movie> for MovieDto {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id().get(),
            title: movie.title().to_string(),
            director: movie.director().to_string(),
            year: movie.year(),
            rating: movie.rating(),
            genres: movie.genres(),
            poster_url: movie.poster_url().to_string(),
            created_at: movie.created_at(),
            updated_at: movie.updated_at(),
            version: movie.version(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ActorDto {
    pub id: i64,
    pub name: String,
    pub birth_year: i32,
    pub bio: String,
    pub movie_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl From<&Actor> for ActorDto {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id().get(),
            name: actor.name().to_string(),
            birth_year: actor.birth_year(),
            bio: actor.bio().to_string(),
            movie_ids: actor.movie_ids().into_iter().map(|id| id.get()).collect(),
            created_at: actor.created_at(),
            updated_at: actor.updated_at(),
            version: actor.version(),
        }
    }
}
