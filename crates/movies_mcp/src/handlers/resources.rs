//! Resource handlers (spec.md §6): `movies://database/all`,
//! `movies://database/stats`, `movies://posters/collection`, and the
//! `movies://posters/{movie_id}` template.
//!
//! Poster bytes are not owned by the core - a `PosterStore` is handed in
//! by the outer layer (same shape as the repository contracts in
//! `movies_core`), keeping image download/thumbnailing out of scope per
//! spec.md §1 while still letting the core shape the resource reply.

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::protocol::AppError;
use crate::registry::{Registry, RegistryError, ResourceHandler, ResourceTemplateHandler};
use crate::AppState;

/// A single poster image keyed by movie id.
#[derive(Debug, Clone)]
pub struct PosterEntry {
    pub movie_id: i64,
    pub size_bytes: usize,
}

/// Abstracts over where poster bytes actually live (filesystem, blob store,
/// ...) so the core never touches image ingestion directly.
#[async_trait]
pub trait PosterStore: Send + Sync {
    async fn get(&self, movie_id: i64) -> Result<Option<Vec<u8>>, AppError>;
    async fn list(&self) -> Result<Vec<PosterEntry>, AppError>;
}

/// A `PosterStore` backed by `<dir>/<movie_id>.jpg` files, matching the
/// `image/jpeg` mime type the poster template resource always reports.
pub struct FilesystemPosterStore {
    dir: std::path::PathBuf,
}

impl FilesystemPosterStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl PosterStore for FilesystemPosterStore {
    async fn get(&self, movie_id: i64) -> Result<Option<Vec<u8>>, AppError> {
        let path = self.dir.join(format!("{movie_id}.jpg"));
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::internal(format!("reading poster {}: {e}", path.display()))),
        }
    }

    async fn list(&self) -> Result<Vec<PosterEntry>, AppError> {
        let mut entries = Vec::new();
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => return Err(AppError::internal(format!("reading poster directory: {e}"))),
        };

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| AppError::internal(format!("reading poster directory: {e}")))?
        {
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some("jpg") = path.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            let Ok(movie_id) = stem.parse::<i64>() else {
                continue;
            };
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| AppError::internal(format!("reading poster metadata: {e}")))?;
            entries.push(PosterEntry {
                movie_id,
                size_bytes: metadata.len() as usize,
            });
        }
        entries.sort_by_key(|e| e.movie_id);
        Ok(entries)
    }
}

pub fn register(registry: &mut Registry, poster_store: Arc<dyn PosterStore>) -> Result<(), RegistryError> {
    registry.register_resource(Arc::new(AllMoviesResource))?;
    registry.register_resource(Arc::new(StatsResource))?;
    registry.register_resource(Arc::new(PostersCollectionResource {
        poster_store: Arc::clone(&poster_store),
    }))?;
    registry.register_resource_template(Arc::new(PosterTemplateResource { poster_store }));
    Ok(())
}

struct AllMoviesResource;

#[async_trait]
impl ResourceHandler for AllMoviesResource {
    fn uri(&self) -> &'static str {
        "movies://database/all"
    }

    fn name(&self) -> &'static str {
        "All movies"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn description(&self) -> &'static str {
        "Every movie in the catalog."
    }

    async fn read(&self, state: &AppState) -> Result<Value, AppError> {
        let movies = state
            .movies()
            .search_movies(
                None,
                None,
                None,
                None,
                None,
                None,
                None,
                1_000_000,
                0,
                state.cancel_token(),
            )
            .await?;
        Ok(json!({"movies": movies}))
    }
}

struct StatsResource;

#[async_trait]
impl ResourceHandler for StatsResource {
    fn uri(&self) -> &'static str {
        "movies://database/stats"
    }

    fn name(&self) -> &'static str {
        "Catalog statistics"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn description(&self) -> &'static str {
        "Aggregate counts, genre list, year range, and top directors."
    }

    async fn read(&self, state: &AppState) -> Result<Value, AppError> {
        let movies = state
            .movies()
            .search_movies(None, None, None, None, None, None, None, 1_000_000, 0, state.cancel_token())
            .await?;
        let actors = state
            .actors()
            .search_actors(None, None, None, None, 1_000_000, 0, None, None, state.cancel_token())
            .await?;

        let mut genres: Vec<String> = Vec::new();
        for movie in &movies {
            for genre in &movie.genres {
                if !genres.contains(genre) {
                    genres.push(genre.clone());
                }
            }
        }
        genres.sort();

        let year_range = if movies.is_empty() {
            json!(null)
        } else {
            let earliest = movies.iter().map(|m| m.year).min().unwrap();
            let latest = movies.iter().map(|m| m.year).max().unwrap();
            json!({"earliest": earliest, "latest": latest})
        };

        let mut director_counts: Vec<(String, usize)> = Vec::new();
        for movie in &movies {
            match director_counts.iter_mut().find(|(name, _)| name == &movie.director) {
                Some((_, count)) => *count += 1,
                None => director_counts.push((movie.director.clone(), 1)),
            }
        }
        director_counts.sort_by(|(name_a, count_a), (name_b, count_b)| {
            count_b.cmp(count_a).then_with(|| name_a.cmp(name_b))
        });
        let top_directors: Vec<Value> = director_counts
            .into_iter()
            .take(10)
            .map(|(name, count)| json!({"name": name, "count": count}))
            .collect();

        Ok(json!({
            "total_movies": movies.len(),
            "total_actors": actors.len(),
            "genres": genres,
            "year_range": year_range,
            "top_directors": top_directors,
        }))
    }
}

struct PostersCollectionResource {
    poster_store: Arc<dyn PosterStore>,
}

#[async_trait]
impl ResourceHandler for PostersCollectionResource {
    fn uri(&self) -> &'static str {
        "movies://posters/collection"
    }

    fn name(&self) -> &'static str {
        "Poster index"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn description(&self) -> &'static str {
        "An index of every poster image available, by movie id."
    }

    async fn read(&self, _state: &AppState) -> Result<Value, AppError> {
        let entries = self.poster_store.list().await?;
        let posters: Vec<Value> = entries
            .into_iter()
            .map(|e| json!({"movie_id": e.movie_id, "size_bytes": e.size_bytes, "uri": format!("movies://posters/{}", e.movie_id)}))
            .collect();
        Ok(json!({"posters": posters}))
    }
}

struct PosterTemplateResource {
    poster_store: Arc<dyn PosterStore>,
}

#[async_trait]
impl ResourceTemplateHandler for PosterTemplateResource {
    fn uri_prefix(&self) -> &'static str {
        "movies://posters/"
    }

    fn name(&self) -> &'static str {
        "Poster image"
    }

    fn mime_type(&self) -> &'static str {
        "image/jpeg"
    }

    async fn read(&self, _state: &AppState, param: &str) -> Result<Value, AppError> {
        let movie_id: i64 = param
            .parse()
            .map_err(|_| AppError::internal(format!("'{param}' is not a valid movie id")))?;
        let bytes = self
            .poster_store
            .get(movie_id)
            .await?
            .ok_or_else(|| AppError::internal(format!("no poster stored for movie {movie_id}")))?;
        Ok(json!({
            "mimeType": "image/jpeg",
            "blob": BASE64.encode(bytes),
        }))
    }
}
