//! Movie tool handlers (spec.md §6): thin adapters from validated
//! `tools/call` arguments to `MovieService` use cases.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::protocol::AppError;
use crate::registry::{Registry, RegistryError, ToolHandler};
use crate::schema::SchemaNode;
use crate::AppState;

fn deserialize_args<T: for<'de> Deserialize<'de>>(arguments: Value) -> Result<T, AppError> {
    serde_json::from_value(arguments)
        .map_err(|e| AppError::internal(format!("arguments did not match the shape the schema validated: {e}")))
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_tool(std::sync::Arc::new(AddMovieTool))?;
    registry.register_tool(std::sync::Arc::new(GetMovieTool))?;
    registry.register_tool(std::sync::Arc::new(UpdateMovieTool))?;
    registry.register_tool(std::sync::Arc::new(DeleteMovieTool))?;
    registry.register_tool(std::sync::Arc::new(SearchMoviesTool))?;
    registry.register_tool(std::sync::Arc::new(ListTopMoviesTool))?;
    registry.register_tool(std::sync::Arc::new(SearchByDecadeTool))?;
    registry.register_tool(std::sync::Arc::new(SearchByRatingRangeTool))?;
    registry.register_tool(std::sync::Arc::new(SearchSimilarMoviesTool))?;
    Ok(())
}

struct AddMovieTool;

#[derive(Debug, Deserialize)]
struct AddMovieArgs {
    title: String,
    director: String,
    year: i32,
    #[serde(default)]
    genres: Vec<String>,
    rating: Option<f64>,
    poster_url: Option<String>,
}

#[async_trait]
impl ToolHandler for AddMovieTool {
    fn name(&self) -> &'static str {
        "add_movie"
    }

    fn description(&self) -> &'static str {
        "Add a new movie to the catalog."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("title", SchemaNode::string().min_length(1).build())
            .property("director", SchemaNode::string().min_length(1).build())
            .property("year", SchemaNode::integer().minimum(1888.0).maximum(2100.0).build_integer())
            .property(
                "genres",
                SchemaNode::array(SchemaNode::string().min_length(1).build()).build(),
            )
            .property("rating", SchemaNode::number().minimum(0.0).maximum(10.0).build_number())
            .property("poster_url", SchemaNode::string().build())
            .required(&["title", "director", "year"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: AddMovieArgs = deserialize_args(arguments)?;
        let dto = state
            .movies()
            .add_movie(
                &args.title,
                &args.director,
                args.year,
                &args.genres,
                args.rating,
                args.poster_url.as_deref(),
                state.cancel_token(),
            )
            .await?;
        Ok(serde_json::to_value(dto).expect("MovieDto always serializes"))
    }
}

struct GetMovieTool;

#[derive(Debug, Deserialize)]
struct MovieIdArgs {
    movie_id: i64,
}

#[async_trait]
impl ToolHandler for GetMovieTool {
    fn name(&self) -> &'static str {
        "get_movie"
    }

    fn description(&self) -> &'static str {
        "Get a single movie by id."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("movie_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["movie_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: MovieIdArgs = deserialize_args(arguments)?;
        let dto = state.movies().get_movie(args.movie_id, state.cancel_token()).await?;
        Ok(serde_json::to_value(dto).expect("MovieDto always serializes"))
    }
}

struct UpdateMovieTool;

#[derive(Debug, Deserialize)]
struct UpdateMovieArgs {
    id: i64,
    title: String,
    director: String,
    year: i32,
    #[serde(default)]
    genres: Vec<String>,
    rating: Option<f64>,
}

#[async_trait]
impl ToolHandler for UpdateMovieTool {
    fn name(&self) -> &'static str {
        "update_movie"
    }

    fn description(&self) -> &'static str {
        "Replace a movie's title, director, year, genres, and rating."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("id", SchemaNode::integer().minimum(1.0).build_integer())
            .property("title", SchemaNode::string().min_length(1).build())
            .property("director", SchemaNode::string().min_length(1).build())
            .property("year", SchemaNode::integer().minimum(1888.0).maximum(2100.0).build_integer())
            .property(
                "genres",
                SchemaNode::array(SchemaNode::string().min_length(1).build()).build(),
            )
            .property("rating", SchemaNode::number().minimum(0.0).maximum(10.0).build_number())
            .required(&["id", "title", "director", "year"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: UpdateMovieArgs = deserialize_args(arguments)?;
        let dto = state
            .movies()
            .update_movie(
                args.id,
                &args.title,
                &args.director,
                args.year,
                &args.genres,
                args.rating,
                state.cancel_token(),
            )
            .await?;
        Ok(serde_json::to_value(dto).expect("MovieDto always serializes"))
    }
}

struct DeleteMovieTool;

#[async_trait]
impl ToolHandler for DeleteMovieTool {
    fn name(&self) -> &'static str {
        "delete_movie"
    }

    fn description(&self) -> &'static str {
        "Delete a movie and its cast links."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("movie_id", SchemaNode::integer().minimum(1.0).build_integer())
            .required(&["movie_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: MovieIdArgs = deserialize_args(arguments)?;
        state.movies().delete_movie(args.movie_id, state.cancel_token()).await?;
        Ok(serde_json::json!({"deleted": true, "movie_id": args.movie_id}))
    }
}

struct SearchMoviesTool;

#[derive(Debug, Deserialize)]
struct SearchMoviesArgs {
    title: Option<String>,
    director: Option<String>,
    genre: Option<String>,
    min_year: Option<i32>,
    max_year: Option<i32>,
    min_rating: Option<f64>,
    max_rating: Option<f64>,
    #[serde(default = "default_search_limit")]
    limit: u32,
    #[serde(default)]
    offset: u32,
}

fn default_search_limit() -> u32 {
    50
}

#[async_trait]
impl ToolHandler for SearchMoviesTool {
    fn name(&self) -> &'static str {
        "search_movies"
    }

    fn description(&self) -> &'static str {
        "Search movies by title, director, genre, year, or rating, with pagination."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("title", SchemaNode::string().build())
            .property("director", SchemaNode::string().build())
            .property("genre", SchemaNode::string().build())
            .property("min_year", SchemaNode::integer().build_integer())
            .property("max_year", SchemaNode::integer().build_integer())
            .property("min_rating", SchemaNode::number().minimum(0.0).maximum(10.0).build_number())
            .property("max_rating", SchemaNode::number().minimum(0.0).maximum(10.0).build_number())
            .property("limit", SchemaNode::integer().minimum(1.0).maximum(1000.0).build_integer())
            .property("offset", SchemaNode::integer().minimum(0.0).build_integer())
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: SearchMoviesArgs = deserialize_args(arguments)?;
        let dtos = state
            .movies()
            .search_movies(
                args.title,
                args.director,
                args.genre,
                args.min_year,
                args.max_year,
                args.min_rating,
                args.max_rating,
                args.limit,
                args.offset,
                state.cancel_token(),
            )
            .await?;
        Ok(serde_json::json!({"movies": dtos}))
    }
}

struct ListTopMoviesTool;

#[derive(Debug, Deserialize)]
struct LimitArgs {
    #[serde(default = "default_top_limit")]
    limit: u32,
}

fn default_top_limit() -> u32 {
    10
}

#[async_trait]
impl ToolHandler for ListTopMoviesTool {
    fn name(&self) -> &'static str {
        "list_top_movies"
    }

    fn description(&self) -> &'static str {
        "List the highest-rated movies, ties broken by year then id."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("limit", SchemaNode::integer().minimum(1.0).maximum(100.0).build_integer())
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: LimitArgs = deserialize_args(arguments)?;
        let dtos = state.movies().list_top_movies(args.limit, state.cancel_token()).await?;
        Ok(serde_json::json!({"movies": dtos}))
    }
}

struct SearchByDecadeTool;

#[derive(Debug, Deserialize)]
struct DecadeArgs {
    decade: String,
}

#[async_trait]
impl ToolHandler for SearchByDecadeTool {
    fn name(&self) -> &'static str {
        "search_by_decade"
    }

    fn description(&self) -> &'static str {
        "Find movies released in a given decade, e.g. \"1990s\" or \"90s\"."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("decade", SchemaNode::string().pattern(r"^((19|20)\d0s|\d{2}s)$").build())
            .required(&["decade"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: DecadeArgs = deserialize_args(arguments)?;
        let dtos = state.movies().search_by_decade(&args.decade, state.cancel_token()).await?;
        Ok(serde_json::json!({"movies": dtos}))
    }
}

struct SearchByRatingRangeTool;

#[derive(Debug, Deserialize)]
struct RatingRangeArgs {
    min_rating: f64,
    max_rating: f64,
}

#[async_trait]
impl ToolHandler for SearchByRatingRangeTool {
    fn name(&self) -> &'static str {
        "search_by_rating_range"
    }

    fn description(&self) -> &'static str {
        "Find movies whose rating falls within an inclusive range."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("min_rating", SchemaNode::number().minimum(0.0).maximum(10.0).build_number())
            .property("max_rating", SchemaNode::number().minimum(0.0).maximum(10.0).build_number())
            .required(&["min_rating", "max_rating"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: RatingRangeArgs = deserialize_args(arguments)?;
        let dtos = state
            .movies()
            .search_by_rating_range(args.min_rating, args.max_rating, state.cancel_token())
            .await?;
        Ok(serde_json::json!({"movies": dtos}))
    }
}

struct SearchSimilarMoviesTool;

#[derive(Debug, Deserialize)]
struct SearchSimilarArgs {
    movie_id: i64,
    #[serde(default = "default_similar_limit")]
    limit: u32,
}

fn default_similar_limit() -> u32 {
    5
}

#[async_trait]
impl ToolHandler for SearchSimilarMoviesTool {
    fn name(&self) -> &'static str {
        "search_similar_movies"
    }

    fn description(&self) -> &'static str {
        "Rank other movies by genre overlap, director match, year and rating proximity to a seed movie."
    }

    fn input_schema(&self) -> SchemaNode {
        SchemaNode::object()
            .property("movie_id", SchemaNode::integer().minimum(1.0).build_integer())
            .property("limit", SchemaNode::integer().minimum(1.0).maximum(50.0).build_integer())
            .required(&["movie_id"])
            .build()
    }

    async fn call(&self, state: &AppState, arguments: Value) -> Result<Value, AppError> {
        let args: SearchSimilarArgs = deserialize_args(arguments)?;
        let dtos = state
            .movies()
            .search_similar_movies(args.movie_id, args.limit, state.cancel_token())
            .await?;
        Ok(serde_json::json!({"movies": dtos}))
    }
}
