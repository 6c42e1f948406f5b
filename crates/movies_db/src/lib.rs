//! SQLite-backed repository implementation and migration runner for the
//! movies/actors catalog.
//!
//! This crate translates `movies_core` aggregates to and from rows, manages
//! the `movie_actors` junction table, and runs the forward/backward SQL
//! migration scripts that define the schema. It has no knowledge of the
//! wire protocol - that lives in `movies_mcp`.

pub mod actor_repository;
pub mod error;
pub mod migrations;
pub mod movie_repository;
pub mod pool;

pub use actor_repository::SqliteActorRepository;
pub use error::{DbError, Result};
pub use migrations::{discover_migrations, down, up, Migration, MigrationReport};
pub use movie_repository::SqliteMovieRepository;
pub use pool::{create_pool, PoolConfig};
