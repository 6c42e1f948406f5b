//! Tool/resource/prompt handlers (spec.md §4.11): each re-asserts its
//! argument shape, invokes a service, and shapes the reply envelope.
//! Handlers never touch the database directly.

mod actor_tools;
mod movie_tools;
mod prompts;
mod resources;

pub use resources::{FilesystemPosterStore, PosterStore};

use std::sync::Arc;

use crate::registry::{Registry, RegistryError};

/// Registers every built-in tool, resource, resource template, and prompt.
/// Called once at startup; duplicate names are a programmer error, not a
/// runtime condition, so this surfaces as a plain `Result` the caller
/// `expect`s on.
pub fn register_all(registry: &mut Registry, poster_store: Arc<dyn PosterStore>) -> Result<(), RegistryError> {
    movie_tools::register(registry)?;
    actor_tools::register(registry)?;
    resources::register(registry, poster_store)?;
    prompts::register(registry)?;
    Ok(())
}
