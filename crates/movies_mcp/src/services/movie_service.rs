//! `Movie` aggregate use cases (spec.md §4.10).

use std::sync::Arc;

use chrono::{Datelike, Utc};
use regex::Regex;
use std::sync::OnceLock;

use movies_core::{
    CancellationToken, DomainError, Movie, MovieId, MovieOrderBy, MovieSearchCriteria, Result,
    SortDirection,
};

use super::dto::MovieDto;
use super::MovieRepository;

/// Upper bound used when a service needs to scan the whole catalog in
/// memory (decade/top/similarity ranking) rather than a paginated page.
const CATALOG_SCAN_LIMIT: u32 = 100_000;

pub struct MovieService {
    movies: Arc<dyn MovieRepository>,
}

impl MovieService {
    pub fn new(movies: Arc<dyn MovieRepository>) -> Self {
        Self { movies }
    }

    fn current_year() -> i32 {
        Utc::now().year_ce().1 as i32
    }

    pub async fn add_movie(
        &self,
        title: &str,
        director: &str,
        year: i32,
        genres: &[String],
        rating: Option<f64>,
        poster_url: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<MovieDto> {
        let now = Utc::now();
        let mut movie = Movie::new(title, director, year, Self::current_year(), now)?;
        for genre in genres {
            movie.add_genre(genre, now)?;
        }
        if rating.is_some() {
            movie.set_rating(rating, now)?;
        }
        if let Some(url) = poster_url {
            movie.set_poster_url(url, now)?;
        }
        self.movies.save(&mut movie, cancel).await?;
        Ok(MovieDto::from(&movie))
    }

    pub async fn get_movie(&self, movie_id: i64, cancel: CancellationToken) -> Result<MovieDto> {
        let id = MovieId::new(movie_id)?;
        let movie = self.movies.find_by_id(id, cancel).await?;
        Ok(MovieDto::from(&movie))
    }

    pub async fn update_movie(
        &self,
        movie_id: i64,
        title: &str,
        director: &str,
        year: i32,
        genres: &[String],
        rating: Option<f64>,
        cancel: CancellationToken,
    ) -> Result<MovieDto> {
        let id = MovieId::new(movie_id)?;
        let mut movie = self.movies.find_by_id(id, cancel.clone()).await?;
        let now = Utc::now();
        movie.update_details(title, director, year, Self::current_year(), now)?;

        for existing in movie.genres() {
            if !genres.iter().any(|g| g == &existing) {
                movie.remove_genre(&existing, now);
            }
        }
        for genre in genres {
            movie.add_genre(genre, now)?;
        }
        movie.set_rating(rating, now)?;

        self.movies.save(&mut movie, cancel).await?;
        Ok(MovieDto::from(&movie))
    }

    pub async fn delete_movie(&self, movie_id: i64, cancel: CancellationToken) -> Result<()> {
        let id = MovieId::new(movie_id)?;
        self.movies.delete(id, cancel).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn search_movies(
        &self,
        title: Option<String>,
        director: Option<String>,
        genre: Option<String>,
        min_year: Option<i32>,
        max_year: Option<i32>,
        min_rating: Option<f64>,
        max_rating: Option<f64>,
        limit: u32,
        offset: u32,
        cancel: CancellationToken,
    ) -> Result<Vec<MovieDto>> {
        let criteria = MovieSearchCriteria {
            title,
            director,
            genre,
            min_year,
            max_year,
            min_rating,
            max_rating,
            limit,
            offset,
            ..MovieSearchCriteria::default()
        };
        let movies = self.movies.find_by_criteria(&criteria, cancel).await?;
        Ok(movies.iter().map(MovieDto::from).collect())
    }

    /// Orders by rating desc, then year desc, then id asc; movies without a
    /// rating are skipped entirely.
    pub async fn list_top_movies(&self, limit: u32, cancel: CancellationToken) -> Result<Vec<MovieDto>> {
        let criteria = MovieSearchCriteria {
            limit: CATALOG_SCAN_LIMIT,
            order_by: MovieOrderBy::Id,
            order_dir: SortDirection::Ascending,
            ..MovieSearchCriteria::default()
        };
        let mut movies = self.movies.find_by_criteria(&criteria, cancel).await?;
        movies.retain(|m| m.rating().is_some());
        movies.sort_by(|a, b| {
            b.rating()
                .partial_cmp(&a.rating())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.year().cmp(&a.year()))
                .then_with(|| a.id().get().cmp(&b.id().get()))
        });
        movies.truncate(limit as usize);
        Ok(movies.iter().map(MovieDto::from).collect())
    }

    /// Parses `"1990s"` / `"90s"` into an inclusive `[start, end]` year range
    /// and returns every movie released in it.
    pub async fn search_by_decade(&self, decade: &str, cancel: CancellationToken) -> Result<Vec<MovieDto>> {
        let (start, end) = parse_decade(decade)?;
        let criteria = MovieSearchCriteria {
            min_year: Some(start),
            max_year: Some(end),
            limit: CATALOG_SCAN_LIMIT,
            order_by: MovieOrderBy::Year,
            order_dir: SortDirection::Ascending,
            ..MovieSearchCriteria::default()
        };
        let movies = self.movies.find_by_criteria(&criteria, cancel).await?;
        Ok(movies.iter().map(MovieDto::from).collect())
    }

    pub async fn search_by_rating_range(
        &self,
        min_rating: f64,
        max_rating: f64,
        cancel: CancellationToken,
    ) -> Result<Vec<MovieDto>> {
        if min_rating > max_rating {
            return Err(DomainError::validation(
                "min_rating",
                "must be less than or equal to max_rating",
            ));
        }
        let criteria = MovieSearchCriteria {
            min_rating: Some(min_rating),
            max_rating: Some(max_rating),
            limit: CATALOG_SCAN_LIMIT,
            order_by: MovieOrderBy::Rating,
            order_dir: SortDirection::Descending,
            ..MovieSearchCriteria::default()
        };
        let movies = self.movies.find_by_criteria(&criteria, cancel).await?;
        Ok(movies.iter().map(MovieDto::from).collect())
    }

    /// Scores every other movie by genre overlap, director match, year
    /// proximity, and rating proximity; excludes the seed movie.
    pub async fn search_similar_movies(
        &self,
        movie_id: i64,
        limit: u32,
        cancel: CancellationToken,
    ) -> Result<Vec<MovieDto>> {
        let id = MovieId::new(movie_id)?;
        let seed = self.movies.find_by_id(id, cancel.clone()).await?;

        let criteria = MovieSearchCriteria {
            limit: CATALOG_SCAN_LIMIT,
            order_by: MovieOrderBy::Id,
            order_dir: SortDirection::Ascending,
            ..MovieSearchCriteria::default()
        };
        let candidates = self.movies.find_by_criteria(&criteria, cancel).await?;

        let mut scored: Vec<(f64, &Movie)> = candidates
            .iter()
            .filter(|m| m.id() != seed.id())
            .map(|m| (similarity_score(&seed, m), m))
            .collect();

        scored.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .partial_cmp(score_a)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id().get().cmp(&b.id().get()))
        });
        scored.truncate(limit as usize);
        Ok(scored.into_iter().map(|(_, m)| MovieDto::from(m)).collect())
    }
}

fn similarity_score(seed: &Movie, other: &Movie) -> f64 {
    let genre_score = jaccard(&seed.genres(), &other.genres());
    let director_score = if seed.director().eq_ignore_ascii_case(other.director()) {
        1.0
    } else {
        0.0
    };
    let year_score = (-((seed.year() - other.year()).unsigned_abs() as f64) / 20.0).exp();
    let rating_score = match (seed.rating(), other.rating()) {
        (Some(a), Some(b)) => (1.0 - (a - b).abs() / 10.0).max(0.0),
        _ => 0.0,
    };

    0.4 * genre_score + 0.2 * director_score + 0.2 * year_score + 0.2 * rating_score
}

fn jaccard(a: &[String], b: &[String]) -> f64 {
    use std::collections::HashSet;
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    intersection / union
}

fn full_decade_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(19|20)\d0s$").unwrap())
}

fn short_decade_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}s$").unwrap())
}

/// `"1990s"` -> `[1990, 1999]`. A two-digit shorthand (`"90s"`) is taken
/// relative to the 1900s, matching the only example the tool contract gives.
fn parse_decade(label: &str) -> Result<(i32, i32)> {
    if full_decade_regex().is_match(label) {
        let start: i32 = label[..4].parse().map_err(|_| DomainError::validation("decade", "not a number"))?;
        return validate_decade_range(start);
    }
    if short_decade_regex().is_match(label) {
        let tens: i32 = label[..2].parse().map_err(|_| DomainError::validation("decade", "not a number"))?;
        return validate_decade_range(1900 + tens);
    }
    Err(DomainError::validation(
        "decade",
        "must match ^(19|20)\\d0s$ or ^\\d{2}s$",
    ))
}

fn validate_decade_range(start: i32) -> Result<(i32, i32)> {
    let end = start + 9;
    let current_year = MovieService::current_year();
    if start < movies_core::value_objects::EARLIEST_MOVIE_YEAR
        || end > current_year + movies_core::value_objects::MOVIE_YEAR_FUTURE_SLACK
    {
        return Err(DomainError::out_of_range("decade", format!("{start}s is out of the supported range")));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_short_decade_labels() {
        assert_eq!(parse_decade("1990s").unwrap(), (1990, 1999));
        assert_eq!(parse_decade("90s").unwrap(), (1990, 1999));
    }

    #[test]
    fn rejects_malformed_decade_label() {
        assert!(parse_decade("the nineties").is_err());
    }

    #[test]
    fn rejects_out_of_range_decade() {
        assert!(parse_decade("1700s").is_err());
    }

    #[test]
    fn jaccard_of_disjoint_genres_is_zero() {
        let a = vec!["drama".to_string()];
        let b = vec!["comedy".to_string()];
        assert_eq!(jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_of_identical_genres_is_one() {
        let a = vec!["drama".to_string(), "noir".to_string()];
        assert_eq!(jaccard(&a, &a.clone()), 1.0);
    }
}
