//! Actor tool handlers (spec.md §6): thin adapters from validated
//! `tools/call` arguments to `ActorService` use cases.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use movies_core::{ActorOrderBy, SortDirection};

use crate::protocol::AppError;
use crate::registry::{Registry, RegistryError, ToolHandler};
use crate::schema::SchemaNode;
use crate::AppState;

fn deserialize_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments)
        .map_err(|e| AppError::internal(format!("arguments did not match the shape the schema validated: {e}")))
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_tool(std::sync::Arc::new(AddActorTool))?;
    registry.register_tool(std::sync::Arc::new(GetActorTool))?;
    registry.register_tool(std::sync::Arc::new(UpdateActorTool))?;
    registry.register_tool(std::sync::Arc::new(DeleteActorTool))?;
    registry.register_tool(std::sync::Arc::new(LinkActorToMovieTool))?;
    registry.register_tool(std::sync::Arc::new(UnlinkActorFromMovieTool))?;
    registry.register_tool(std::sync::Arc::new(GetMovieCastTool))?;
    registry.register_tool(std::sync::Arc::new(GetActorMoviesTool))?;
    registry.register_tool(std::sync::Arc::new(SearchActorsTool))?;
    Ok(())
}

struct AddActorTool;

#[derive(Debug, Deserialize)]
struct AddActorArgs {
    name: String,
    birth_year: i32,
    #[serde(default)]
    bio: String,
}

#[async_trait]
impl ToolHandler for AddActorTool {
    fn name(&self) -> &'static str {
        "add_actor"
    }

    fn description(&self) -> &'static str {
        "Add a new actor to the catalog."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("name", SchemaNode::string().min_length(1).build())
            .property("birth_year", SchemaNode::integer().minimum(1850.0).build_integer())
            .property("bio", SchemaNode::string().build())
            .required(&["name", "birth_year"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: AddActorArgs = deserialize_args(arguments)?;
        let dto = state
            .actors()
            .add_actor(&args.name, args.birth_year, &args.bio, state.cancel_token())
            .await?;
        Ok(serde_json::to_value(dto).expect("ActorDto always serializes"))
    }
}

struct GetActorTool;

#[derive(Debug, Deserialize)]
struct ActorIdArgs {
    actor_id: i64,
}

#[async_trait]
impl ToolHandler for GetActorTool {
    fn name(&self) -> &'static str {
        "get_actor"
    }

    fn description(&self) -> &'static str {
        "Get a single actor by id."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("actor_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["actor_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: ActorIdArgs = deserialize_args(arguments)?;
        let dto = state.actors().get_actor(args.actor_id, state.cancel_token()).await?;
        Ok(serde_json::to_value(dto).expect("ActorDto always serializes"))
    }
}

struct UpdateActorTool;

#[derive(Debug, Deserialize)]
struct UpdateActorArgs {
    id: i64,
    name: String,
    birth_year: i32,
    #[serde(default)]
    bio: String,
}

#[async_trait]
impl ToolHandler for UpdateActorTool {
    fn name(&self) -> &'static str {
        "update_actor"
    }

    fn description(&self) -> &'static str {
        "Replace an actor's name, birth year, and bio."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("id", SchemaNode::integer().minimum(1.0).build_integer())
            .property("name", SchemaNode::string().min_length(1).build())
            .property("birth_year", SchemaNode::integer().minimum(1850.0).build_integer())
            .property("bio", SchemaNode::string().build())
            .required(&["id", "name", "birth_year"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: UpdateActorArgs = deserialize_args(arguments)?;
        let dto = state
            .actors()
            .update_actor(args.id, &args.name, args.birth_year, &args.bio, state.cancel_token())
            .await?;
        Ok(serde_json::to_value(dto).expect("ActorDto always serializes"))
    }
}

struct DeleteActorTool;

#[async_trait]
impl ToolHandler for DeleteActorTool {
    fn name(&self) -> &'static str {
        "delete_actor"
    }

    fn description(&self) -> &'static str {
        "Delete an actor and its cast links."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("actor_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["actor_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: ActorIdArgs = deserialize_args(arguments)?;
        state.actors().delete_actor(args.actor_id, state.cancel_token()).await?;
        Ok(serde_json::json!({"deleted": true, "actor_id": args.actor_id}))
    }
}

struct LinkActorToMovieTool;

#[derive(Debug, Deserialize)]
struct ActorMovieArgs {
    actor_id: i64,
    movie_id: i64,
}

#[async_trait]
impl ToolHandler for LinkActorToMovieTool {
    fn name(&self) -> &'static str {
        "link_actor_to_movie"
    }

    fn description(&self) -> &'static str {
        "Link an actor to a movie's cast."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("actor_id", SchemaNode::integer().minimum(1.0).build_integer())
            .property("movie_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["actor_id", "movie_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: ActorMovieArgs = deserialize_args(arguments)?;
        let dto = state
            .actors()
            .link_actor_to_movie(args.actor_id, args.movie_id, state.cancel_token())
            .await?;
        Ok(serde_json::to_value(dto).expect("ActorDto always serializes"))
    }
}

struct UnlinkActorFromMovieTool;

#[async_trait]
impl ToolHandler for UnlinkActorFromMovieTool {
    fn name(&self) -> &'static str {
        "unlink_actor_from_movie"
    }

    fn description(&self) -> &'static str {
        "Remove an actor from a movie's cast."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("actor_id", SchemaNode::integer().minimum(1.0).build_integer())
            .property("movie_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["actor_id", "movie_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: ActorMovieArgs = deserialize_args(arguments)?;
        let dto = state
            .actors()
            .unlink_actor_from_movie(args.actor_id, args.movie_id, state.cancel_token())
            .await?;
        Ok(serde_json::to_value(dto).expect("ActorDto always serializes"))
    }
}

struct GetMovieCastTool;

#[derive(Debug, Deserialize)]
struct MovieIdArgs {
    movie_id: i64,
}

#[async_trait]
impl ToolHandler for GetMovieCastTool {
    fn name(&self) -> &'static str {
        "get_movie_cast"
    }

    fn description(&self) -> &'static str {
        "List the actors linked to a movie."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("movie_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["movie_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: MovieIdArgs = deserialize_args(arguments)?;
        let dtos = state.actors().get_movie_cast(args.movie_id, state.cancel_token()).await?;
        Ok(serde_json::json!({"actors": dtos}))
    }
}

struct GetActorMoviesTool;

#[async_trait]
impl ToolHandler for GetActorMoviesTool {
    fn name(&self) -> &'static str {
        "get_actor_movies"
    }

    fn description(&self) -> &'static str {
        "List the movies an actor is linked to."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("actor_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["actor_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: ActorIdArgs = deserialize_args(arguments)?;
        let dtos = state.actors().get_actor_movies(args.actor_id, state.cancel_token()).await?;
        Ok(serde_json::json!({"movies": dtos}))
    }
}

struct SearchActorsTool;

#[derive(Debug, Deserialize)]
struct SearchActorsArgs {
    name: Option<String>,
    min_birth_year: Option<i32>,
    max_birth_year: Option<i32>,
    movie_id: Option<i64>,
    #[serde(default = "default_search_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
    order_by: Option<String>,
    order_dir: Option<String>,
}

fn default_search_limit() -> u32 {
    50
}

fn parse_actor_order_by(s: &str) -> Result<ActorOrderBy, AppError> {
    match s {
        "name" => Ok(ActorOrderBy::Name),
        "birth_year" => Ok(ActorOrderBy::BirthYear),
        "id" => Ok(ActorOrderBy::Id),
        other => Err(AppError::internal(format!("unknown order_by '{other}'"))),
    }
}

fn parse_order_dir(s: &str) -> Result<SortDirection, AppError> {
    match s {
        "asc" => Ok(SortDirection::Ascending),
        "desc" => Ok(SortDirection::Descending),
        other => Err(AppError::internal(format!("unknown order_dir '{other}'"))),
    }
}

#[async_trait]
impl ToolHandler for SearchActorsTool {
    fn name(&self) -> &'static str {
        "search_actors"
    }

    fn description(&self) -> &'static str {
        "Search actors by name, birth year range, or a linked movie, with pagination."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("name", SchemaNode::string().build())
            .property("min_birth_year", SchemaNode::integer().minimum(1850.0).build_integer())
            .property("max_birth_year", SchemaNode::integer().build_integer())
            .property("movie_id", SchemaNode::integer().minimum(1.0).build_integer())
            .property("limit", SchemaNode::integer().minimum(1.0).maximum(1000.0).build_integer())
            .property("offset", SchemaNode::integer().minimum(0.0).build_integer())
            .property("order_by", SchemaNode::string().enum_values(&["name", "birth_year", "id"]).build())
            .property("order_dir", SchemaNode::string().enum_values(&["asc", "desc"]).build())
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: SearchActorsArgs = deserialize_args(arguments)?;
        let order_by = args.order_by.as_deref().map(parse_actor_order_by).transpose()?;
        let order_dir = args.order_dir.as_deref().map(parse_order_dir).transpose()?;
        let dtos = state
            .actors()
            .search_actors(
                args.name,
                args.min_birth_year,
                args.max_birth_year,
                args.movie_id,
                args.limit,
                args.offset,
                order_by,
                order_dir,
                state.cancel_token(),
            )
            .await?;
        Ok(serde_json::json!({"actors": dtos}))
    }
}
