//! `Actor` aggregate use cases plus the actor/movie linking operations
//! (spec.md §4.10).

use std::sync::Arc;

use chrono::{Datelike, Utc};

use movies_core::{
    ActorId, ActorOrderBy, ActorSearchCriteria, CancellationToken, DomainError, MovieId, Result,
    SortDirection,
};

use super::dto::{ActorDto, MovieDto};
use super::{ActorRepository, MovieRepository};

pub struct ActorService {
    actors: Arc<dyn ActorRepository>,
    movies: Arc<dyn MovieRepository>,
}

impl ActorService {
    pub fn new(actors: Arc<dyn ActorRepository>, movies: Arc<dyn MovieRepository>) -> Self {
        Self { actors, movies }
    }

    fn current_year() -> i32 {
        Utc::now().year_ce().1 as i32
    }

    pub async fn add_actor(
        &self,
        name: &str,
        birth_year: i32,
        bio: &str,
        cancel: CancellationToken,
    ) -> Result<ActorDto> {
        let now = Utc::now();
        let mut actor = movies_core::Actor::new(name, birth_year, bio, Self::current_year(), now)?;
        self.actors.save(&mut actor, cancel).await?;
        Ok(ActorDto::from(&actor))
    }

    pub async fn get_actor(&self, actor_id: i64, cancel: CancellationToken) -> Result<ActorDto> {
        let id = ActorId::new(actor_id)?;
        let actor = self.actors.find_by_id(id, cancel).await?;
        Ok(ActorDto::from(&actor))
    }

    pub async fn update_actor(
        &self,
        actor_id: i64,
        name: &str,
        birth_year: i32,
        bio: &str,
        cancel: CancellationToken,
    ) -> Result<ActorDto> {
        let id = ActorId::new(actor_id)?;
        let mut actor = self.actors.find_by_id(id, cancel.clone()).await?;
        let now = Utc::now();
        actor.update_details(name, birth_year, Self::current_year(), now)?;
        actor.set_bio(bio, now);
        self.actors.save(&mut actor, cancel).await?;
        Ok(ActorDto::from(&actor))
    }

    pub async fn delete_actor(&self, actor_id: i64, cancel: CancellationToken) -> Result<()> {
        let id = ActorId::new(actor_id)?;
        self.actors.delete(id, cancel).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn search_actors(
        &self,
        name: Option<String>,
        min_birth_year: Option<i32>,
        max_birth_year: Option<i32>,
        movie_id: Option<i64>,
        limit: u32,
        offset: u32,
        order_by: Option<ActorOrderBy>,
        order_dir: Option<SortDirection>,
        cancel: CancellationToken,
    ) -> Result<Vec<ActorDto>> {
        let movie_id = movie_id.map(MovieId::new).transpose()?;
        let criteria = ActorSearchCriteria {
            name,
            min_birth_year,
            max_birth_year,
            movie_id,
            limit,
            offset,
            order_by: order_by.unwrap_or(ActorOrderBy::Id),
            order_dir: order_dir.unwrap_or(SortDirection::Ascending),
        };
        let actors = self.actors.find_by_criteria(&criteria, cancel).await?;
        Ok(actors.iter().map(ActorDto::from).collect())
    }

    pub async fn link_actor_to_movie(
        &self,
        actor_id: i64,
        movie_id: i64,
        cancel: CancellationToken,
    ) -> Result<ActorDto> {
        let actor_id = ActorId::new(actor_id)?;
        let movie_id = MovieId::new(movie_id)?;
        self.movies.find_by_id(movie_id, cancel.clone()).await?;

        let mut actor = self.actors.find_by_id(actor_id, cancel.clone()).await?;
        actor.add_movie(movie_id, Utc::now());
        self.actors.save(&mut actor, cancel).await?;
        Ok(ActorDto::from(&actor))
    }

    pub async fn unlink_actor_from_movie(
        &self,
        actor_id: i64,
        movie_id: i64,
        cancel: CancellationToken,
    ) -> Result<ActorDto> {
        let actor_id = ActorId::new(actor_id)?;
        let movie_id = MovieId::new(movie_id)?;

        let mut actor = self.actors.find_by_id(actor_id, cancel.clone()).await?;
        actor.remove_movie(movie_id, Utc::now());
        self.actors.save(&mut actor, cancel).await?;
        Ok(ActorDto::from(&actor))
    }

    pub async fn get_movie_cast(&self, movie_id: i64, cancel: CancellationToken) -> Result<Vec<ActorDto>> {
        let id = MovieId::new(movie_id)?;
        self.movies.find_by_id(id, cancel.clone()).await?;

        let criteria = ActorSearchCriteria {
            movie_id: Some(id),
            limit: 10_000,
            ..ActorSearchCriteria::default()
        };
        let actors = self.actors.find_by_criteria(&criteria, cancel).await?;
        Ok(actors.iter().map(ActorDto::from).collect())
    }

    pub async fn get_actor_movies(&self, actor_id: i64, cancel: CancellationToken) -> Result<Vec<MovieDto>> {
        let id = ActorId::new(actor_id)?;
        let actor = self.actors.find_by_id(id, cancel.clone()).await?;

        let mut movies = Vec::with_capacity(actor.movie_ids().len());
        for movie_id in actor.movie_ids() {
            match self.movies.find_by_id(movie_id, cancel.clone()).await {
                Ok(movie) => movies.push(MovieDto::from(&movie)),
                Err(DomainError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(movies)
    }
}
