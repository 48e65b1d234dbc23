//! Puzzle endpoints
//!
//! - `GET /start.json?seed=<ms>` - unlimited single-goal puzzle
//! - `GET /start.json?date=<iso8601>` - daily puzzle for that UTC day
//! - `GET /bingo.json?seed=<ms>` - multi-goal puzzle
//!
//! Seeds are integer milliseconds. A missing, unparsable or zero seed means
//! "now", so a bare request yields a fresh puzzle.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use semantical_core::models::{daily_seed, day_bucket, BingoResponse, PuzzleMode, StartResponse};
use serde::Deserialize;

use crate::{AppState, HttpError};

#[derive(Debug, Default, Deserialize)]
pub struct StartParams {
    pub seed: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BingoParams {
    pub seed: Option<String>,
}

/// Seed from the `seed` query parameter, falling back to the current time
pub fn parse_seed(raw: Option<&str>) -> i64 {
    match raw.map(str::trim).and_then(|s| s.parse::<i64>().ok()) {
        Some(seed) if seed != 0 => seed,
        _ => Utc::now().timestamp_millis(),
    }
}

/// Start-of-day seed for a `date` parameter (`YYYY-MM-DD` or RFC 3339)
pub fn parse_date_seed(raw: &str) -> Result<i64, HttpError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(daily_seed(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| day_bucket(instant.with_timezone(&Utc).timestamp_millis()))
        .map_err(|e| {
            HttpError::with_details(
                format!("Invalid date: {raw:?}"),
                "INVALID_INPUT",
                e.to_string(),
            )
        })
}

async fn start(
    State(state): State<AppState>,
    Query(params): Query<StartParams>,
) -> Result<Json<StartResponse>, HttpError> {
    let (mode, seed) = match params.date.as_deref() {
        Some(date) => (PuzzleMode::Daily, parse_date_seed(date)?),
        None => (PuzzleMode::Unlimited, parse_seed(params.seed.as_deref())),
    };

    let spec = state.selector.select(mode, seed).await?;
    Ok(Json(StartResponse::from(&spec)))
}

async fn bingo(
    State(state): State<AppState>,
    Query(params): Query<BingoParams>,
) -> Result<Json<BingoResponse>, HttpError> {
    let seed = parse_seed(params.seed.as_deref());
    let spec = state.selector.select(PuzzleMode::Bingo, seed).await?;
    Ok(Json(BingoResponse::from(&spec)))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/start.json", get(start))
        .route("/bingo.json", get(bingo))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed(Some("1709251200000")), 1_709_251_200_000);
        assert_eq!(parse_seed(Some(" -42 ")), -42);

        let before = Utc::now().timestamp_millis();
        for raw in [None, Some("0"), Some("tomorrow"), Some("")] {
            assert!(parse_seed(raw) >= before, "{raw:?} falls back to now");
        }
    }

    #[test]
    fn test_parse_date_seed() {
        assert_eq!(parse_date_seed("2024-03-01").unwrap(), 1_709_251_200_000);
        assert_eq!(
            parse_date_seed("2024-03-01T18:30:00Z").unwrap(),
            1_709_251_200_000
        );
        // 23:30 at UTC-2 is already the next UTC day
        assert_eq!(
            parse_date_seed("2024-02-29T23:30:00-02:00").unwrap(),
            1_709_251_200_000
        );
        assert!(parse_date_seed("yesterday").is_err());
    }
}
