//! Domain model for the movies/actors catalog.
//!
//! This crate owns the value objects, the `Movie`/`Actor` aggregates, the
//! events they emit, and the storage-agnostic repository contracts. It has
//! no knowledge of SQL, JSON-RPC, or the wire protocol - those live in
//! `movies_db` and `movies_mcp` respectively.

pub mod actor;
pub mod error;
pub mod events;
pub mod movie;
pub mod repository;
pub mod value_objects;

pub use actor::Actor;
pub use error::{DomainError, Result};
pub use events::{ActorEvent, MovieEvent};
pub use movie::Movie;
pub use repository::{
    ActorOrderBy, ActorReader, ActorSearchCriteria, ActorWriter, CancellationToken, MovieOrderBy,
    MovieReader, MovieSearchCriteria, MovieWriter, SortDirection,
};
pub use value_objects::{ActorId, MovieId, NonEmptyText, PosterUrl, Rating, Year};
