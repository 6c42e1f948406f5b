//! Prompt handlers (spec.md §1, §4.9): a static set of named,
//! argument-parameterised text templates. Prompts never touch the
//! database - they only shape a message the client's model will reason
//! over, using whatever tools it chooses next.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::AppError;
use crate::registry::{PromptHandler, Registry, RegistryError};

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_prompt(Arc::new(RecommendMoviePrompt))?;
    registry.register_prompt(Arc::new(AnalyzeCastPrompt))?;
    registry.register_prompt(Arc::new(DirectorRetrospectivePrompt))?;
    Ok(())
}

fn optional_string(arguments: &Value, key: &str) -> Option<String> {
    arguments.get(key).and_then(Value::as_str).map(str::to_string)
}

struct RecommendMoviePrompt;

#[async_trait]
impl PromptHandler for RecommendMoviePrompt {
    fn name(&self) -> &'static str {
        "recommend_movie"
    }

    fn description(&self) -> &'static str {
        "Ask for a movie recommendation, optionally steered by genre and mood."
    }

    fn arguments(&self) -> Vec<(&'static str, &'static str, bool)> {
        vec![
            ("genre", "A genre to favor, e.g. \"sci-fi\"", false),
            ("mood", "A mood to match, e.g. \"lighthearted\"", false),
        ]
    }

    async fn render(&self, arguments: Value) -> Result<String, AppError> {
        let genre = optional_string(&arguments, "genre");
        let mood = optional_string(&arguments, "mood");

        let mut text = "Recommend a movie from the catalog".to_string();
        if let Some(genre) = genre {
            text.push_str(&format!(" in the {genre} genre"));
        }
        if let Some(mood) = mood {
            text.push_str(&format!(" that fits a {mood} mood"));
        }
        text.push_str(". Use search_movies or list_top_movies to find candidates, then explain the pick.");
        Ok(text)
    }
}

struct AnalyzeCastPrompt;

#[async_trait]
impl PromptHandler for AnalyzeCastPrompt {
    fn name(&self) -> &'static str {
        "analyze_cast"
    }

    fn description(&self) -> &'static str {
        "Ask for an analysis of a movie's cast."
    }

    fn arguments(&self) -> Vec<(&'static str, &'static str, bool)> {
        vec![("movie_title", "The movie to analyze", true)]
    }

    async fn render(&self, arguments: Value) -> Result<String, AppError> {
        let title = optional_string(&arguments, "movie_title")
            .ok_or_else(|| AppError::internal("analyze_cast requires a movie_title argument"))?;
        Ok(format!(
            "Find the movie \"{title}\" with search_movies, then use get_movie_cast to list its \
             actors and summarize the ensemble's range."
        ))
    }
}

struct DirectorRetrospectivePrompt;

#[async_trait]
impl PromptHandler for DirectorRetrospectivePrompt {
    fn name(&self) -> &'static str {
        "director_retrospective"
    }

    fn description(&self) -> &'static str {
        "Ask for a retrospective on a director's work in the catalog."
    }

    fn arguments(&self) -> Vec<(&'static str, &'static str, bool)> {
        vec![("director", "The director to look up", true)]
    }

    async fn render(&self, arguments: Value) -> Result<String, AppError> {
        let director = optional_string(&arguments, "director")
            .ok_or_else(|| AppError::internal("director_retrospective requires a director argument"))?;
        Ok(format!(
            "Search for every movie directed by \"{director}\" with search_movies, order them \
             chronologically, and describe how their ratings and genres evolve over time."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recommend_movie_includes_genre_and_mood() {
        let prompt = RecommendMoviePrompt;
        let text = prompt
            .render(serde_json::json!({"genre": "sci-fi", "mood": "lighthearted"}))
            .await
            .unwrap();
        assert!(text.contains("sci-fi"));
        assert!(text.contains("lighthearted"));
    }

    #[tokio::test]
    async fn analyze_cast_requires_title() {
        let prompt = AnalyzeCastPrompt;
        assert!(prompt.render(serde_json::json!({})).await.is_err());
    }
}
