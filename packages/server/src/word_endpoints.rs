//! `GET /word.json?word=<w>` - associated words for one word

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use semantical_core::models::WordsResponse;
use serde::Deserialize;

use crate::{AppState, HttpError};

#[derive(Debug, Default, Deserialize)]
pub struct WordParams {
    pub word: Option<String>,
}

async fn related_words(
    State(state): State<AppState>,
    Query(params): Query<WordParams>,
) -> Result<Json<WordsResponse>, HttpError> {
    let word = params
        .word
        .ok_or_else(|| HttpError::invalid_input("Missing query parameter: word"))?;

    let words = state.expansion.expand(&word).await?;
    Ok(Json(WordsResponse { words }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/word.json", get(related_words))
        .with_state(state)
}
