//! Outer layer for the movies MCP server: loads configuration, opens the
//! SQLite pool, runs pending migrations, wires the protocol core together,
//! and drives it over stdin/stdout. None of this is the core's concern
//! (spec.md §1) - the core only ever sees an open pool and a duplex stream.

mod config;
mod logging;

use std::sync::Arc;

use movies_db::{create_pool, up, SqliteActorRepository, SqliteMovieRepository};
use movies_mcp::handlers::{self, FilesystemPosterStore, PosterStore};
use movies_mcp::registry::Registry;
use movies_mcp::router::Router;
use movies_mcp::services::{ActorService, MovieService};
use movies_mcp::AppState;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args = config::Args::from_env();
    logging::init(&args.server.log_level);

    tracing::info!(server = %args.server.name, "starting");

    let pool = create_pool(&args.database.pool_config()).await?;
    let report = up(&pool, &args.database.migrations_path).await?;
    if report.no_op {
        tracing::info!("schema already up to date");
    } else {
        tracing::info!(applied = ?report.applied, "ran pending migrations");
    }

    let movie_repo = Arc::new(SqliteMovieRepository::new(pool.clone()));
    let actor_repo = Arc::new(SqliteActorRepository::new(pool.clone()));

    let movie_service = Arc::new(MovieService::new(movie_repo.clone()));
    let actor_service = Arc::new(ActorService::new(actor_repo, movie_repo));

    let mut registry = Registry::new();
    let poster_store: Arc<dyn PosterStore> = Arc::new(FilesystemPosterStore::new(args.image.poster_dir.clone()));
    handlers::register_all(&mut registry, poster_store).expect("handler names are fixed at compile time and never collide");

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let state = Arc::new(AppState::with_server_name(
        movie_service,
        actor_service,
        shutdown_rx,
        args.server.name.clone(),
    ));
    let router = Arc::new(Router::new(Arc::new(registry), state));

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let stdout = Arc::new(tokio::sync::Mutex::new(tokio::io::stdout()));

    let dispatch_router = Arc::clone(&router);
    tokio::select! {
        result = movies_mcp::codec::listen(stdin, stdout, shutdown_tx, move |request, cancel| {
            let router = Arc::clone(&dispatch_router);
            async move { router.dispatch(request, cancel).await }
        }) => {
            result?;
            tracing::info!("stdin closed, drained in-flight requests");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received interrupt, shutting down");
        }
    }

    router.close().await;
    Ok(())
}
