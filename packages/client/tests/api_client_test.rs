//! Integration tests for ApiClient against a stub axum server
//!
//! Tests cover:
//! - Decoding of `word.json`, `start.json` and `bingo.json`
//! - Query parameters (word, seed, date)
//! - Non-2xx and malformed responses
//! - Request timeout

use anyhow::Result;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use semantical_client::{ApiClient, ApiClientConfig, ClientError, WordSource};
use semantical_core::models::{daily_seed, PuzzleMode, DAY_MILLIS};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

type Params = Query<HashMap<String, String>>;

/// Test helper: serve `router` on an ephemeral port and return a client for it
async fn create_client(router: Router, timeout_secs: u64) -> Result<ApiClient> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(ApiClient::new(ApiClientConfig {
        base_url: format!("http://{}", addr),
        timeout_secs,
    })?)
}

/// Echo the query back inside a canned body
fn stub_router() -> Router {
    Router::new()
        .route(
            "/word.json",
            get(|Query(params): Params| async move {
                let word = params.get("word").cloned().unwrap_or_default();
                Json(json!({ "words": [format!("{}-a", word), format!("{}-b", word)] }))
            }),
        )
        .route(
            "/start.json",
            get(|Query(params): Params| async move {
                let tag = params
                    .get("date")
                    .map(|d| format!("date:{}", d))
                    .or_else(|| params.get("seed").map(|s| format!("seed:{}", s)))
                    .unwrap_or_default();
                Json(json!({ "words": ["human", tag], "path": ["human", "girl"] }))
            }),
        )
        .route(
            "/bingo.json",
            get(|| async {
                Json(json!({
                    "start": "sun",
                    "ends": [
                        { "word": "sea", "path": ["sun", "beach", "sea"] },
                        { "word": "snow", "path": ["sun", "winter", "snow"] }
                    ]
                }))
            }),
        )
}

// =========================================================================
// Decoding
// =========================================================================

#[tokio::test]
async fn test_related_words_sends_word_parameter() -> Result<()> {
    let client = create_client(stub_router(), 5).await?;

    let words = client.related_words("ice cream").await?;

    assert_eq!(words, vec!["ice cream-a", "ice cream-b"]);
    Ok(())
}

#[tokio::test]
async fn test_unlimited_puzzle_uses_seed() -> Result<()> {
    let client = create_client(stub_router(), 5).await?;

    let puzzle = client.puzzle(PuzzleMode::Unlimited, 12345).await?;

    assert_eq!(puzzle.mode, PuzzleMode::Unlimited);
    assert_eq!(puzzle.seed, 12345);
    assert_eq!(puzzle.start, "human");
    assert_eq!(puzzle.goal_words(), vec!["seed:12345"]);
    assert_eq!(puzzle.hint_path, vec!["human", "girl"]);
    Ok(())
}

#[tokio::test]
async fn test_daily_puzzle_uses_calendar_date() -> Result<()> {
    let client = create_client(stub_router(), 5).await?;
    let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let afternoon = daily_seed(date) + DAY_MILLIS / 2;

    let puzzle = client.puzzle(PuzzleMode::Daily, afternoon).await?;

    assert_eq!(puzzle.seed, daily_seed(date));
    assert_eq!(puzzle.goal_words(), vec!["date:2024-03-01"]);
    Ok(())
}

#[tokio::test]
async fn test_bingo_puzzle() -> Result<()> {
    let client = create_client(stub_router(), 5).await?;

    let puzzle = client.puzzle(PuzzleMode::Bingo, 7).await?;

    assert_eq!(puzzle.mode, PuzzleMode::Bingo);
    assert_eq!(puzzle.start, "sun");
    assert_eq!(puzzle.goal_words(), vec!["sea", "snow"]);
    assert_eq!(puzzle.goals[1].path, vec!["sun", "winter", "snow"]);
    assert!(puzzle.hint_path.is_empty());
    Ok(())
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn test_non_success_status_is_an_error() -> Result<()> {
    let router = Router::new().route(
        "/word.json",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "store offline") }),
    );
    let client = create_client(router, 5).await?;

    let result = client.related_words("human").await;

    match result {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "store offline");
        }
        other => panic!("Expected status error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() -> Result<()> {
    let router = Router::new()
        .route("/word.json", get(|| async { Json(json!({ "nope": [] })) }))
        .route(
            "/start.json",
            get(|| async { Json(json!({ "words": ["lonely"], "path": [] })) }),
        );
    let client = create_client(router, 5).await?;

    assert!(matches!(
        client.related_words("human").await,
        Err(ClientError::Decode(_))
    ));
    assert!(matches!(
        client.puzzle(PuzzleMode::Unlimited, 1).await,
        Err(ClientError::Decode(_))
    ));
    Ok(())
}

#[tokio::test]
async fn test_slow_server_times_out() -> Result<()> {
    let router = Router::new().route(
        "/word.json",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(Value::Null)
        }),
    );
    let client = create_client(router, 1).await?;

    let result = client.related_words("human").await;

    assert_eq!(result, Err(ClientError::Timeout(1)));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_a_transport_error() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = ApiClient::new(ApiClientConfig {
        base_url: format!("http://{}", addr),
        timeout_secs: 5,
    })?;

    assert!(matches!(
        client.related_words("human").await,
        Err(ClientError::Transport(_))
    ));
    Ok(())
}
