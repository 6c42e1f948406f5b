//! The `Movie` aggregate.

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::events::MovieEvent;
use crate::value_objects::{MovieId, NonEmptyText, PosterUrl, Rating, Year};

#[derive(Debug, Clone)]
pub struct Movie {
    id: MovieId,
    title: NonEmptyText,
    director: NonEmptyText,
    year: Year,
    rating: Option<Rating>,
    genres: Vec<String>,
    poster_url: PosterUrl,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
    events: Vec<MovieEvent>,
}

impl Movie {
    /// Constructs a new, unsaved movie (id zero, version zero, no creation
    /// event yet - the repository's first `Save` is the creation point).
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: impl Into<String>,
        director: impl Into<String>,
        year_value: i32,
        current_year: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let title = NonEmptyText::new("title", title)?;
        let director = NonEmptyText::new("director", director)?;
        let year = Year::for_movie(year_value, current_year)?;

        Ok(Self {
            id: MovieId::UNSAVED,
            title,
            director,
            year,
            rating: None,
            genres: Vec::new(),
            poster_url: PosterUrl::default(),
            created_at: now,
            updated_at: now,
            version: 0,
            events: Vec::new(),
        })
    }

    /// Reconstructs a movie from persisted fields - used by the repository
    /// when hydrating rows, bypassing the constructor's "unsaved" framing.
    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: MovieId,
        title: NonEmptyText,
        director: NonEmptyText,
        year: Year,
        rating: Option<Rating>,
        genres: Vec<String>,
        poster_url: PosterUrl,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: u64,
    ) -> Self {
        Self {
            id,
            title,
            director,
            year,
            rating,
            genres,
            poster_url,
            created_at,
            updated_at,
            version,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> MovieId {
        self.id
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn director(&self) -> &str {
        self.director.as_str()
    }

    pub fn year(&self) -> i32 {
        self.year.get()
    }

    pub fn rating(&self) -> Option<f64> {
        self.rating.map(|r| r.get())
    }

    /// Returns a copy of the genre list - callers cannot mutate aggregate
    /// state by holding a reference into it.
    pub fn genres(&self) -> Vec<String> {
        self.genres.clone()
    }

    pub fn poster_url(&self) -> &str {
        self.poster_url.as_str()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    /// Drains accumulated events - called by the repository after a
    /// successful save.
    pub fn drain_events(&mut self) -> Vec<MovieEvent> {
        std::mem::take(&mut self.events)
    }

    /// Assigns the id and records the creation event. Called exactly once,
    /// by the repository, on first persistence of an unsaved aggregate.
    pub fn assign_id(&mut self, id: MovieId, now: DateTime<Utc>) {
        self.id = id;
        self.version = 1;
        self.updated_at = now;
        self.events.push(MovieEvent::Created { id });
    }

    pub fn update_details(
        &mut self,
        title: impl Into<String>,
        director: impl Into<String>,
        year_value: i32,
        current_year: i32,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let title = NonEmptyText::new("title", title)?;
        let director = NonEmptyText::new("director", director)?;
        let year = Year::for_movie(year_value, current_year)?;

        let changed = title != self.title || director != self.director || year != self.year;
        self.title = title;
        self.director = director;
        self.year = year;
        if changed {
            self.touch(now);
            self.events.push(MovieEvent::Updated { id: self.id });
        }
        Ok(())
    }

    pub fn set_rating(&mut self, rating: Option<f64>, now: DateTime<Utc>) -> Result<(), DomainError> {
        let new_rating = match rating {
            Some(r) => Some(Rating::new(r)?),
            None => None,
        };
        if new_rating.map(|r| r.get()) != self.rating.map(|r| r.get()) {
            self.rating = new_rating;
            self.touch(now);
            self.events.push(MovieEvent::RatingChanged {
                id: self.id,
                rating,
            });
        }
        Ok(())
    }

    pub fn add_genre(&mut self, genre: impl Into<String>, now: DateTime<Utc>) -> Result<(), DomainError> {
        let genre = genre.into();
        let genre = genre.trim();
        if genre.is_empty() {
            return Err(DomainError::empty("genre"));
        }
        if self.has_genre(genre) {
            return Ok(());
        }
        self.genres.push(genre.to_string());
        self.touch(now);
        self.events.push(MovieEvent::GenreAdded {
            id: self.id,
            genre: genre.to_string(),
        });
        Ok(())
    }

    pub fn remove_genre(&mut self, genre: &str, now: DateTime<Utc>) {
        let before = self.genres.len();
        self.genres.retain(|g| g != genre);
        if self.genres.len() != before {
            self.touch(now);
            self.events.push(MovieEvent::Updated { id: self.id });
        }
    }

    pub fn set_poster_url(&mut self, url: impl Into<String>, now: DateTime<Utc>) -> Result<(), DomainError> {
        let url = PosterUrl::new(url)?;
        if url != self.poster_url {
            self.poster_url = url;
            self.touch(now);
            self.events.push(MovieEvent::PosterChanged { id: self.id });
        }
        Ok(())
    }

    /// Marks the aggregate deleted for event-accumulation purposes. The
    /// repository performs the actual row removal; this only records the
    /// event so callers inspecting a drained event list see it.
    pub fn mark_deleted(&mut self) {
        self.events.push(MovieEvent::Deleted { id: self.id });
    }

    /// Total re-check used defensively before persistence.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.as_str().trim().is_empty() {
            return Err(DomainError::empty("title"));
        }
        if self.director.as_str().trim().is_empty() {
            return Err(DomainError::empty("director"));
        }
        let mut seen = std::collections::HashSet::new();
        for g in &self.genres {
            if g.trim().is_empty() {
                return Err(DomainError::empty("genre"));
            }
            if !seen.insert(g.as_str()) {
                return Err(DomainError::validation("genres", "duplicate genre"));
            }
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn new_movie_is_unsaved_with_no_events() {
        let m = Movie::new("Inception", "Christopher Nolan", 2010, 2026, now()).unwrap();
        assert!(m.id().is_unsaved());
        assert_eq!(m.version(), 0);
    }

    #[test]
    fn assign_id_emits_created_event() {
        let mut m = Movie::new("Inception", "Christopher Nolan", 2010, 2026, now()).unwrap();
        m.assign_id(MovieId::new(1).unwrap(), now());
        let events = m.drain_events();
        assert_eq!(events, vec![MovieEvent::Created { id: MovieId::new(1).unwrap() }]);
        assert_eq!(m.version(), 1);
    }

    #[test]
    fn add_genre_is_idempotent() {
        let mut m = Movie::new("Inception", "Christopher Nolan", 2010, 2026, now()).unwrap();
        m.add_genre("sci-fi", now()).unwrap();
        m.add_genre("sci-fi", now()).unwrap();
        assert_eq!(m.genres(), vec!["sci-fi".to_string()]);
    }

    #[test]
    fn set_rating_rejects_out_of_range() {
        let mut m = Movie::new("X", "Y", 2000, 2026, now()).unwrap();
        assert!(m.set_rating(Some(11.0), now()).is_err());
    }

    #[test]
    fn validate_catches_duplicate_genre_injected_via_hydrate() {
        let m = Movie::hydrate(
            MovieId::new(1).unwrap(),
            NonEmptyText::new("title", "X").unwrap(),
            NonEmptyText::new("director", "Y").unwrap(),
            Year::for_movie(2000, 2026).unwrap(),
            None,
            vec!["drama".to_string(), "drama".to_string()],
            PosterUrl::default(),
            now(),
            now(),
            1,
        );
        assert!(m.validate().is_err());
    }
}
