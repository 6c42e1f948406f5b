//! Domain events accumulated on aggregates and drained by the repository
//! on save. Not persisted themselves - an observable record of what a
//! mutation session did, per spec.md §9.

use crate::value_objects::{ActorId, MovieId};

#[derive(Debug, Clone, PartialEq)]
pub enum MovieEvent {
    Created { id: MovieId },
    Updated { id: MovieId },
    RatingChanged { id: MovieId, rating: Option<f64> },
    GenreAdded { id: MovieId, genre: String },
    PosterChanged { id: MovieId },
    Deleted { id: MovieId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActorEvent {
    Created { id: ActorId },
    Updated { id: ActorId },
    BioChanged { id: ActorId },
    LinkedToMovie { id: ActorId, movie_id: MovieId },
    UnlinkedFromMovie { id: ActorId, movie_id: MovieId },
    Deleted { id: ActorId },
}
