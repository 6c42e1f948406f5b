//! The `Actor` aggregate.

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::events::ActorEvent;
use crate::value_objects::{ActorId, MovieId, NonEmptyText, Year};

#[derive(Debug, Clone)]
pub struct Actor {
    id: ActorId,
    name: NonEmptyText,
    birth_year: Year,
    bio: String,
    movie_ids: Vec<MovieId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    version: u64,
    events: Vec<ActorEvent>,
}

impl Actor {
    pub fn new(
        name: impl Into<String>,
        birth_year_value: i32,
        bio: impl Into<String>,
        current_year: i32,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = NonEmptyText::new("name", name)?;
        let birth_year = Year::for_birth(birth_year_value, current_year)?;

        Ok(Self {
            id: ActorId::UNSAVED,
            name,
            birth_year,
            bio: bio.into(),
            movie_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
            events: Vec::new(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn hydrate(
        id: ActorId,
        name: NonEmptyText,
        birth_year: Year,
        bio: String,
        movie_ids: Vec<MovieId>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: u64,
    ) -> Self {
        Self {
            id,
            name,
            birth_year,
            bio,
            movie_ids,
            created_at,
            updated_at,
            version,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn birth_year(&self) -> i32 {
        self.birth_year.get()
    }

    pub fn bio(&self) -> &str {
        &self.bio
    }

    pub fn movie_ids(&self) -> Vec<MovieId> {
        self.movie_ids.clone()
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

    pub fn has_movie(&self, movie_id: MovieId) -> bool {
        self.movie_ids.iter().any(|id| *id == movie_id)
    }

    pub fn drain_events(&mut self) -> Vec<ActorEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn assign_id(&mut self, id: ActorId, now: DateTime<Utc>) {
        self.id = id;
        self.version = 1;
        self.updated_at = now;
        self.events.push(ActorEvent::Created { id });
    }

    pub fn update_details(
        &mut self,
        name: impl Into<String>,
        birth_year_value: i32,
        current_year: i32,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let name = NonEmptyText::new("name", name)?;
        let birth_year = Year::for_birth(birth_year_value, current_year)?;

        let changed = name != self.name || birth_year != self.birth_year;
        self.name = name;
        self.birth_year = birth_year;
        if changed {
            self.touch(now);
            self.events.push(ActorEvent::Updated { id: self.id });
        }
        Ok(())
    }

    pub fn set_bio(&mut self, bio: impl Into<String>, now: DateTime<Utc>) {
        let bio = bio.into();
        if bio != self.bio {
            self.bio = bio;
            self.touch(now);
            self.events.push(ActorEvent::BioChanged { id: self.id });
        }
    }

    pub fn add_movie(&mut self, movie_id: MovieId, now: DateTime<Utc>) {
        if self.has_movie(movie_id) {
            return;
        }
        self.movie_ids.push(movie_id);
        self.touch(now);
        self.events.push(ActorEvent::LinkedToMovie {
            id: self.id,
            movie_id,
        });
    }

    pub fn remove_movie(&mut self, movie_id: MovieId, now: DateTime<Utc>) {
        let before = self.movie_ids.len();
        self.movie_ids.retain(|id| *id != movie_id);
        if self.movie_ids.len() != before {
            self.touch(now);
            self.events.push(ActorEvent::UnlinkedFromMovie {
                id: self.id,
                movie_id,
            });
        }
    }

    pub fn mark_deleted(&mut self) {
        self.events.push(ActorEvent::Deleted { id: self.id });
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.as_str().trim().is_empty() {
            return Err(DomainError::empty("name"));
        }
        let mut seen = std::collections::HashSet::new();
        for id in &self.movie_ids {
            if !seen.insert(*id) {
                return Err(DomainError::validation("movie_ids", "duplicate movie id"));
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
    fn link_unlink_round_trips() {
        let mut a = Actor::new("Leo", 1974, "", 2026, now()).unwrap();
        let m = MovieId::new(7).unwrap();
        a.add_movie(m, now());
        assert!(a.has_movie(m));
        a.remove_movie(m, now());
        assert!(!a.has_movie(m));
    }

    #[test]
    fn add_movie_twice_is_idempotent() {
        let mut a = Actor::new("Leo", 1974, "", 2026, now()).unwrap();
        let m = MovieId::new(7).unwrap();
        a.add_movie(m, now());
        a.add_movie(m, now());
        assert_eq!(a.movie_ids(), vec![m]);
    }

    #[test]
    fn birth_year_out_of_range_rejected() {
        assert!(Actor::new("Leo", 1700, "", 2026, now()).is_err());
    }
}
