//! MCP protocol engine for the movies/actors catalog (spec.md §1).
//!
//! Wires together the line-framed JSON-RPC transport (`codec`), the method
//! router (`router`), the auto-registering tool/resource/prompt registry
//! (`registry`), the per-call JSON Schema validator (`schema`), and the
//! application services (`services`) that translate validated arguments
//! into `movies_core`/`movies_db` calls. Tool/resource/prompt handlers
//! (`handlers`) are thin adapters over the services.

pub mod codec;
pub mod handlers;
pub mod protocol;
pub mod registry;
pub mod router;
pub mod schema;
pub mod services;

use std::sync::Arc;

use tokio::sync::watch;

use movies_core::CancellationToken;
use services::{ActorService, MovieService};

/// Shared, immutable-after-startup state handed to every tool/resource
/// handler. Built once in the binary crate's `main` and wrapped in an
/// `Arc` so concurrent request tasks can each hold a cheap clone.
pub struct AppState {
    movie_service: Arc<MovieService>,
    actor_service: Arc<ActorService>,
    shutdown: watch::Receiver<bool>,
    server_name: String,
}

impl AppState {
    pub fn new(
        movie_service: Arc<MovieService>,
        actor_service: Arc<ActorService>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self::with_server_name(movie_service, actor_service, shutdown, "movies-mcp-server")
    }

    pub fn with_server_name(
        movie_service: Arc<MovieService>,
        actor_service: Arc<ActorService>,
        shutdown: watch::Receiver<bool>,
        server_name: impl Into<String>,
    ) -> Self {
        Self {
            movie_service,
            actor_service,
            shutdown,
            server_name: server_name.into(),
        }
    }

    pub fn movies(&self) -> &MovieService {
        &self.movie_service
    }

    pub fn actors(&self) -> &ActorService {
        &self.actor_service
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// A fresh clone of the shutdown signal, threaded into repository calls
    /// as the request's `CancellationToken` (spec.md §5).
    pub fn cancel_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }
}
