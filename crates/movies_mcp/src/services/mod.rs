//! Application services (spec.md §4.10): one per aggregate, exposing coarse
//! use cases. Every method validates inputs, loads/constructs the aggregate,
//! mutates, persists through the repository in one call, and returns a DTO.
//! Domain errors are returned unmapped - only the protocol boundary turns
//! them into wire codes.

mod actor_service;
mod dto;
mod movie_service;

pub use actor_service::ActorService;
pub use dto::{ActorDto, MovieDto};
pub use movie_service::MovieService;

use movies_core::{ActorReader, ActorWriter, MovieReader, MovieWriter};

/// The SQL layer implements `MovieReader`/`MovieWriter` on the same struct;
/// this supertrait lets services hold one trait object instead of two.
pub trait MovieRepository: MovieReader + MovieWriter {}
impl<T: MovieReader + MovieWriter> MovieRepository for T {}

pub trait ActorRepository: ActorReader + ActorWriter {}
impl<T: ActorReader + ActorWriter> ActorRepository for T {}
