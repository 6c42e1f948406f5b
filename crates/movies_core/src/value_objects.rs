//! Validated scalars shared by the Movie and Actor aggregates.
//!
//! Constructors are total functions: they return either a validated value
//! or a [`DomainError`], never panic. A zero id marks "new, unsaved" per
//! spec.md §9 - the repository assigns the real id on first save.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Earliest year a movie could plausibly exist - first commercial screening.
pub const EARLIEST_MOVIE_YEAR: i32 = 1888;
/// How far into the future a year is still accepted (announced productions).
pub const MOVIE_YEAR_FUTURE_SLACK: i32 = 15;
/// Earliest plausible actor birth year.
pub const EARLIEST_BIRTH_YEAR: i32 = 1850;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(i64);

impl MovieId {
    pub const UNSAVED: MovieId = MovieId(0);

    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::out_of_range("movie_id", "must be >= 0"));
        }
        Ok(Self(value))
    }

    pub fn is_unsaved(&self) -> bool {
        self.0 == 0
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(i64);

impl ActorId {
    pub const UNSAVED: ActorId = ActorId(0);

    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value < 0 {
            return Err(DomainError::out_of_range("actor_id", "must be >= 0"));
        }
        Ok(Self(value))
    }

    pub fn is_unsaved(&self) -> bool {
        self.0 == 0
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated release year for a movie, or birth year for an actor -
/// callers pick the right constructor since the valid ranges differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Year(i32);

impl Year {
    pub fn for_movie(value: i32, current_year: i32) -> Result<Self, DomainError> {
        let max = current_year + MOVIE_YEAR_FUTURE_SLACK;
        if value < EARLIEST_MOVIE_YEAR || value > max {
            return Err(DomainError::out_of_range(
                "year",
                format!("must be between {EARLIEST_MOVIE_YEAR} and {max}"),
            ));
        }
        Ok(Self(value))
    }

    pub fn for_birth(value: i32, current_year: i32) -> Result<Self, DomainError> {
        if value < EARLIEST_BIRTH_YEAR || value > current_year {
            return Err(DomainError::out_of_range(
                "birth_year",
                format!("must be between {EARLIEST_BIRTH_YEAR} and {current_year}"),
            ));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> i32 {
        self.0
    }
}

/// A movie rating in [0.0, 10.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rating(f64);

impl Rating {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if !(0.0..=10.0).contains(&value) {
            return Err(if value > 10.0 {
                DomainError::out_of_range("rating", "VALUE_TOO_LARGE: must be <= 10.0")
            } else {
                DomainError::out_of_range("rating", "VALUE_TOO_SMALL: must be >= 0.0")
            });
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

/// A poster URL: either empty, or an http(s) URL.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PosterUrl(String);

impl PosterUrl {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Ok(Self(value));
        }
        let scheme_ok = value.starts_with("http://") || value.starts_with("https://");
        if !scheme_ok {
            return Err(DomainError::bad_url(
                "poster_url",
                "scheme must be http or https",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A non-empty, trimmed string used for titles, director names, actor names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    pub fn new(field: &str, value: impl Into<String>) -> Result<Self, DomainError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(DomainError::empty(field));
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_rejects_above_ten() {
        let err = Rating::new(11.0).unwrap_err();
        assert!(matches!(err, DomainError::OutOfRange { field, .. } if field == "rating"));
    }

    #[test]
    fn rating_accepts_bounds() {
        assert!(Rating::new(0.0).is_ok());
        assert!(Rating::new(10.0).is_ok());
    }

    #[test]
    fn poster_url_allows_empty() {
        assert!(PosterUrl::new("").is_ok());
    }

    #[test]
    fn poster_url_rejects_bad_scheme() {
        assert!(PosterUrl::new("ftp://example.com/x.jpg").is_err());
    }

    #[test]
    fn movie_id_zero_is_unsaved() {
        let id = MovieId::new(0).unwrap();
        assert!(id.is_unsaved());
    }

    #[test]
    fn non_empty_text_trims() {
        let t = NonEmptyText::new("title", "  Inception  ").unwrap();
        assert_eq!(t.as_str(), "Inception");
    }

    #[test]
    fn non_empty_text_rejects_blank() {
        assert!(NonEmptyText::new("title", "   ").is_err());
    }
}
