//! End-to-end router tests: real in-memory SQLite, real migrations, real
//! registry - only the duplex pipe is skipped in favor of calling
//! `Router::dispatch` directly with constructed requests.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use movies_db::{create_pool, up, PoolConfig, SqliteActorRepository, SqliteMovieRepository};
use movies_mcp::handlers::{self, FilesystemPosterStore, PosterStore};
use movies_mcp::protocol::{JsonRpcRequest, RequestId};
use movies_mcp::registry::Registry;
use movies_mcp::router::Router;
use movies_mcp::services::{ActorService, MovieService};
use movies_mcp::AppState;

async fn build_router() -> (Arc<Router>, tempfile::TempDir) {
    let pool = create_pool(&PoolConfig::sqlite_memory()).await.unwrap();
    let migrations_dir = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../movies_db/migrations"));
    up(&pool, migrations_dir).await.unwrap();

    let movie_repo = Arc::new(SqliteMovieRepository::new(pool.clone()));
    let actor_repo = Arc::new(SqliteActorRepository::new(pool.clone()));
    let movie_service = Arc::new(MovieService::new(movie_repo.clone()));
    let actor_service = Arc::new(ActorService::new(actor_repo, movie_repo));

    let mut registry = Registry::new();
    let poster_dir = tempfile::tempdir().unwrap();
    let poster_store: Arc<dyn PosterStore> = Arc::new(FilesystemPosterStore::new(poster_dir.path()));
    handlers::register_all(&mut registry, poster_store).unwrap();

    let (_tx, rx) = tokio::sync::watch::channel(false);
    let state = Arc::new(AppState::new(movie_service, actor_service, rx));
    (Arc::new(Router::new(Arc::new(registry), state)), poster_dir)
}

fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: Some("2.0".to_string()),
        id: Some(RequestId::Number(id)),
        method: Some(method.to_string()),
        params: Some(params),
    }
}

fn cancel() -> tokio::sync::watch::Receiver<bool> {
    tokio::sync::watch::channel(false).1
}

fn as_json(response: &movies_mcp::protocol::JsonRpcResponse) -> Value {
    serde_json::to_value(response).unwrap()
}

#[tokio::test]
async fn initialize_reports_protocol_version_and_server_name() {
    let (router, _poster_dir) = build_router().await;
    let response = router
        .dispatch(
            request(
                1,
                "initialize",
                json!({"protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "t", "version": "1"}}),
            ),
            cancel(),
        )
        .await
        .unwrap();

    let body = as_json(&response);
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(body["result"]["serverInfo"]["name"], "movies-mcp-server");
    assert_eq!(body["id"], 1);
}

#[tokio::test]
async fn add_then_get_movie_round_trips_title() {
    let (router, _poster_dir) = build_router().await;

    let add = router
        .dispatch(
            request(
                1,
                "tools/call",
                json!({"name": "add_movie", "arguments": {"title": "Inception", "director": "Christopher Nolan", "year": 2010, "rating": 8.8}}),
            ),
            cancel(),
        )
        .await
        .unwrap();
    let add_body = as_json(&add);
    let text = add_body["result"]["content"][0]["text"].as_str().unwrap();
    let movie: Value = serde_json::from_str(text).unwrap();
    let movie_id = movie["id"].as_i64().unwrap();
    assert!(movie_id >= 1);

    let get = router
        .dispatch(request(2, "tools/call", json!({"name": "get_movie", "arguments": {"movie_id": movie_id}})), cancel())
        .await
        .unwrap();
    let get_body = as_json(&get);
    let text = get_body["result"]["content"][0]["text"].as_str().unwrap();
    let fetched: Value = serde_json::from_str(text).unwrap();
    assert_eq!(fetched["title"], "Inception");
}

#[tokio::test]
async fn invalid_rating_yields_invalid_params_with_value_too_large() {
    let (router, _poster_dir) = build_router().await;

    let response = router
        .dispatch(
            request(
                1,
                "tools/call",
                json!({"name": "add_movie", "arguments": {"title": "X", "director": "Y", "year": 2000, "rating": 11}}),
            ),
            cancel(),
        )
        .await
        .unwrap();

    let body = as_json(&response);
    assert_eq!(body["error"]["code"], -32602);
    let errors = body["error"]["data"]["errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e["field"] == "rating" && e["code"] == "VALUE_TOO_LARGE"));
}

#[tokio::test]
async fn search_by_decade_returns_only_matching_years() {
    let (router, _poster_dir) = build_router().await;

    for (title, year) in [("A", 1989), ("B", 1990), ("C", 1999), ("D", 2000)] {
        router
            .dispatch(
                request(1, "tools/call", json!({"name": "add_movie", "arguments": {"title": title, "director": "Dir", "year": year}})),
                cancel(),
            )
            .await;
    }

    let response = router
        .dispatch(
            request(1, "tools/call", json!({"name": "search_by_decade", "arguments": {"decade": "1990s"}})),
            cancel(),
        )
        .await
        .unwrap();
    let body = as_json(&response);
    let text = body["result"]["content"][0]["text"].as_str().unwrap();
    let payload: Value = serde_json::from_str(text).unwrap();
    let years: Vec<i64> = payload["movies"].as_array().unwrap().iter().map(|m| m["year"].as_i64().unwrap()).collect();
    assert_eq!(years.len(), 2);
    assert!(years.contains(&1990));
    assert!(years.contains(&1999));
}

#[tokio::test]
async fn deleting_a_movie_cascades_the_cast_link_but_not_the_actor() {
    let (router, _poster_dir) = build_router().await;

    let add_movie = router
        .dispatch(
            request(1, "tools/call", json!({"name": "add_movie", "arguments": {"title": "Heat", "director": "Michael Mann", "year": 1995}})),
            cancel(),
        )
        .await
        .unwrap();
    let movie_id = extract_result(&add_movie)["id"].as_i64().unwrap();

    let add_actor = router
        .dispatch(
            request(2, "tools/call", json!({"name": "add_actor", "arguments": {"name": "Al Pacino", "birth_year": 1940}})),
            cancel(),
        )
        .await
        .unwrap();
    let actor_id = extract_result(&add_actor)["id"].as_i64().unwrap();

    router
        .dispatch(
            request(3, "tools/call", json!({"name": "link_actor_to_movie", "arguments": {"actor_id": actor_id, "movie_id": movie_id}})),
            cancel(),
        )
        .await;

    router
        .dispatch(request(4, "tools/call", json!({"name": "delete_movie", "arguments": {"movie_id": movie_id}})), cancel())
        .await;

    let get_actor = router
        .dispatch(request(5, "tools/call", json!({"name": "get_actor", "arguments": {"actor_id": actor_id}})), cancel())
        .await
        .unwrap();
    let actor = extract_result(&get_actor);
    assert_eq!(actor["movie_ids"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_tool_yields_method_not_found() {
    let (router, _poster_dir) = build_router().await;
    let response = router
        .dispatch(request(1, "tools/call", json!({"name": "nope", "arguments": {}})), cancel())
        .await
        .unwrap();
    let body = as_json(&response);
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn notification_produces_no_response() {
    let (router, _poster_dir) = build_router().await;
    let response = router
        .dispatch(
            JsonRpcRequest {
                jsonrpc: Some("2.0".to_string()),
                id: None,
                method: Some("notifications/initialized".to_string()),
                params: None,
            },
            cancel(),
        )
        .await;
    assert!(response.is_none());
}

fn extract_result(response: &movies_mcp::protocol::JsonRpcResponse) -> Value {
    let body = as_json(response);
    let text = body["result"]["content"][0]["text"].as_str().unwrap().to_string();
    serde_json::from_str(&text).unwrap()
}
