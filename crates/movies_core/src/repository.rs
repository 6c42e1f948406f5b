//! Storage-agnostic repository contracts. The SQL implementation lives in
//! a separate crate; this module only defines the interfaces and the
//! search/order vocabulary shared by services and adapters.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::actor::Actor;
use crate::error::DomainError;
use crate::movie::Movie;
use crate::value_objects::{ActorId, MovieId};

/// A cooperative cancellation signal threaded from the router down to
/// repository calls so an in-flight query can be abandoned on shutdown.
pub type CancellationToken = watch::Receiver<bool>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieOrderBy {
    Title,
    Year,
    Rating,
    Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorOrderBy {
    Name,
    BirthYear,
    Id,
}

/// Filters, pagination, and ordering for `FindByCriteria`. Defaults mirror
/// the tool argument defaults: `limit` 50, `offset` 0.
#[derive(Debug, Clone)]
pub struct MovieSearchCriteria {
    pub title: Option<String>,
    pub director: Option<String>,
    pub genre: Option<String>,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub limit: u32,
    pub offset: u32,
    pub order_by: MovieOrderBy,
    pub order_dir: SortDirection,
}

impl Default for MovieSearchCriteria {
    fn default() -> Self {
        Self {
            title: None,
            director: None,
            genre: None,
            min_year: None,
            max_year: None,
            min_rating: None,
            max_rating: None,
            limit: 50,
            offset: 0,
            order_by: MovieOrderBy::Id,
            order_dir: SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActorSearchCriteria {
    pub name: Option<String>,
    pub min_birth_year: Option<i32>,
    pub max_birth_year: Option<i32>,
    pub movie_id: Option<MovieId>,
    pub limit: u32,
    pub offset: u32,
    pub order_by: ActorOrderBy,
    pub order_dir: SortDirection,
}

impl Default for ActorSearchCriteria {
    fn default() -> Self {
        Self {
            name: None,
            min_birth_year: None,
            max_birth_year: None,
            movie_id: None,
            limit: 50,
            offset: 0,
            order_by: ActorOrderBy::Id,
            order_dir: SortDirection::Ascending,
        }
    }
}

#[async_trait]
pub trait MovieReader: Send + Sync {
    async fn find_by_id(&self, id: MovieId, cancel: CancellationToken) -> Result<Movie, DomainError>;
    async fn find_by_criteria(
        &self,
        criteria: &MovieSearchCriteria,
        cancel: CancellationToken,
    ) -> Result<Vec<Movie>, DomainError>;
}

#[async_trait]
pub trait MovieWriter: Send + Sync {
    /// Insert-or-update keyed on id zero-ness: an unsaved movie (id zero)
    /// is inserted and assigned an id; any other movie is updated in place,
    /// guarded by its `version`.
    async fn save(&self, movie: &mut Movie, cancel: CancellationToken) -> Result<(), DomainError>;
    async fn delete(&self, id: MovieId, cancel: CancellationToken) -> Result<(), DomainError>;
}

#[async_trait]
pub trait ActorReader: Send + Sync {
    async fn find_by_id(&self, id: ActorId, cancel: CancellationToken) -> Result<Actor, DomainError>;
    async fn find_by_criteria(
        &self,
        criteria: &ActorSearchCriteria,
        cancel: CancellationToken,
    ) -> Result<Vec<Actor>, DomainError>;
}

#[async_trait]
pub trait ActorWriter: Send + Sync {
    async fn save(&self, actor: &mut Actor, cancel: CancellationToken) -> Result<(), DomainError>;
    async fn delete(&self, id: ActorId, cancel: CancellationToken) -> Result<(), DomainError>;
}
