//! Integration tests for ExplorationEngine
//!
//! Tests cover:
//! - Goal discovery and exactly-once win signalling
//! - Failure handling and retry
//! - Single-flight mutation under concurrent activations
//! - Hint budget and forward hint scan
//! - Puzzle replacement while an expansion is in flight
//! - Rendering-surface gating
//! - In-process `LocalSource`

use anyhow::Result;
use async_trait::async_trait;
use semantical_client::{
    ActivationOutcome, ClientError, EngineConfig, EngineEvent, ExplorationEngine, HintOutcome,
    LocalSource, WordSource,
};
use semantical_core::{
    db::MemoryAssociationStore,
    models::{GoalRoute, PuzzleMode, PuzzleSpec},
    services::{ExpansionCache, PuzzleCache, PuzzleSelector, WordExpansionService},
    ExpansionConfig, SelectorConfig,
};
use semantical_oracle::DisabledOracle;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex, Semaphore};

// =========================================================================
// Test Doubles
// =========================================================================

/// Source answering from a fixed adjacency map
///
/// Words listed in `failing` return a transport error. When `gate` is set,
/// every expansion waits for a permit first.
struct MapSource {
    adjacency: HashMap<String, Vec<String>>,
    failing: Mutex<HashSet<String>>,
    puzzle: Option<PuzzleSpec>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl MapSource {
    fn new(pairs: &[(&str, &[&str])]) -> Self {
        Self {
            adjacency: pairs
                .iter()
                .map(|(word, neighbors)| {
                    (
                        word.to_string(),
                        neighbors.iter().map(|n| n.to_string()).collect(),
                    )
                })
                .collect(),
            failing: Mutex::new(HashSet::new()),
            puzzle: None,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn with_puzzle(mut self, puzzle: PuzzleSpec) -> Self {
        self.puzzle = Some(puzzle);
        self
    }

    fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    async fn fail_on(&self, word: &str) {
        self.failing.lock().await.insert(word.to_string());
    }

    async fn recover(&self, word: &str) {
        self.failing.lock().await.remove(word);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WordSource for MapSource {
    async fn related_words(&self, word: &str) -> semantical_client::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ClientError::Transport(e.to_string()))?
                .forget();
        }
        if self.failing.lock().await.contains(word) {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        Ok(self.adjacency.get(word).cloned().unwrap_or_default())
    }

    async fn puzzle(&self, _mode: PuzzleMode, _seed: i64) -> semantical_client::Result<PuzzleSpec> {
        self.puzzle
            .clone()
            .ok_or_else(|| ClientError::Status {
                status: 503,
                body: "no puzzle".to_string(),
            })
    }
}

fn path(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn bingo_puzzle(start: &str, goals: &[&str]) -> PuzzleSpec {
    PuzzleSpec::multi(
        PuzzleMode::Bingo,
        1,
        start.to_string(),
        goals
            .iter()
            .map(|goal| GoalRoute::new(*goal, path(&[start, goal])))
            .collect(),
    )
}

fn daily_puzzle(hint_path: &[&str]) -> PuzzleSpec {
    let start = hint_path[0].to_string();
    let goal = hint_path[hint_path.len() - 1];
    PuzzleSpec::single(PuzzleMode::Daily, 0, start, GoalRoute::new(goal, path(hint_path)))
}

/// Test helper: Create an engine with a loaded puzzle
async fn create_engine(
    source: Arc<MapSource>,
    puzzle: PuzzleSpec,
) -> Result<Arc<ExplorationEngine>> {
    let engine = ExplorationEngine::new(source, EngineConfig::default())?;
    engine.load_puzzle(puzzle).await;
    Ok(Arc::new(engine))
}

/// Drain every event received so far
fn drain(events: &mut broadcast::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

fn count_wins(events: &[EngineEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, EngineEvent::Won { .. }))
        .count()
}

// =========================================================================
// Goals and Win Detection
// =========================================================================

#[tokio::test]
async fn test_goals_found_and_win_fires_once() -> Result<()> {
    let source = Arc::new(MapSource::new(&[
        ("animal", &["cat", "bird"]),
        ("bird", &["dog", "animal"]),
        ("dog", &["cat", "bone"]),
    ]));
    let engine = create_engine(source, bingo_puzzle("animal", &["cat", "dog"])).await?;
    let mut events = engine.subscribe();

    engine.activate("animal").await?;
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.found, vec!["cat"]);
    assert!(!snapshot.won);
    assert_eq!(count_wins(&drain(&mut events)), 0);

    let outcome = engine.activate("bird").await?;
    assert!(matches!(outcome, ActivationOutcome::Expanded { won: true, .. }));
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.found, vec!["cat", "dog"]);
    assert!(snapshot.won);

    let after_win = drain(&mut events);
    assert_eq!(count_wins(&after_win), 1);
    assert!(after_win.contains(&EngineEvent::GoalFound {
        word: "dog".to_string()
    }));
    assert!(after_win.contains(&EngineEvent::Won { clicks: 2 }));

    // Further merges neither re-fire the win nor move the click counter
    engine.activate("dog").await?;
    assert_eq!(count_wins(&drain(&mut events)), 0);
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.found, vec!["cat", "dog"]);
    assert_eq!(snapshot.clicks, 2);
    assert!(snapshot.nodes.contains(&"bone".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_merge_builds_links_and_annotations() -> Result<()> {
    let source = Arc::new(MapSource::new(&[("sun", &["Moon", "star", "moon"])]));
    let engine = create_engine(source, bingo_puzzle("sun", &["sky"])).await?;

    let outcome = engine.activate("SUN").await?;

    assert_eq!(
        outcome,
        ActivationOutcome::Expanded {
            word: "sun".to_string(),
            added: path(&["moon", "star"]),
            newly_found: Vec::new(),
            won: false,
        }
    );
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.nodes, vec!["sun", "moon", "star"]);
    assert_eq!(
        snapshot.links,
        vec![
            ("sun".to_string(), "moon".to_string()),
            ("sun".to_string(), "star".to_string())
        ]
    );
    assert_eq!(snapshot.current_word.as_deref(), Some("sun"));

    let annotation = engine.annotation("sun").await;
    assert!(annotation.visited);
    assert!(!annotation.expanding);
    assert!(!annotation.errored);
    Ok(())
}

// =========================================================================
// Failure Handling
// =========================================================================

#[tokio::test]
async fn test_failed_activation_flags_node_and_allows_retry() -> Result<()> {
    let source = Arc::new(MapSource::new(&[("storm", &["rain", "thunder"])]));
    source.fail_on("storm").await;
    let engine = create_engine(source.clone(), bingo_puzzle("storm", &["rain"])).await?;
    let mut events = engine.subscribe();
    let before = engine.snapshot().await;

    let result = engine.activate("storm").await;

    assert!(matches!(result, Err(ClientError::Transport(_))));
    let annotation = engine.annotation("storm").await;
    assert!(annotation.errored);
    assert!(!annotation.expanding);

    let after = engine.snapshot().await;
    assert_eq!(after.nodes, before.nodes);
    assert_eq!(after.links, before.links);
    assert_eq!(after.found, before.found);
    assert_eq!(after.clicks, 0);

    let failed_events = drain(&mut events);
    assert!(!failed_events
        .iter()
        .any(|e| matches!(e, EngineEvent::MutationStarted { .. })));
    assert!(failed_events
        .iter()
        .any(|e| matches!(e, EngineEvent::ActivationFailed { .. })));

    // Retry the same node once the source recovers
    source.recover("storm").await;
    engine.activate("storm").await?;
    let annotation = engine.annotation("storm").await;
    assert!(!annotation.errored);
    assert!(annotation.visited);
    assert!(engine.snapshot().await.won);
    Ok(())
}

#[tokio::test]
async fn test_current_word_tracks_activation_before_merge() -> Result<()> {
    let gate = Arc::new(Semaphore::new(0));
    let source = Arc::new(MapSource::new(&[("fog", &["mist"])]).with_gate(gate.clone()));
    let engine = create_engine(source.clone(), bingo_puzzle("fog", &["mist"])).await?;

    let pending = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.activate("fog").await })
    };
    while source.calls() == 0 {
        tokio::task::yield_now().await;
    }

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_word.as_deref(), Some("fog"));
    assert_eq!(snapshot.nodes, vec!["fog"]);
    assert!(engine.annotation("fog").await.expanding);

    source.fail_on("fog").await;
    gate.add_permits(1);
    assert!(pending.await?.is_err());

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_word.as_deref(), Some("fog"));
    assert!(snapshot.links.is_empty());
    assert!(engine.annotation("fog").await.errored);
    Ok(())
}

#[tokio::test]
async fn test_empty_word_is_rejected() -> Result<()> {
    let source = Arc::new(MapSource::new(&[]));
    let engine = create_engine(source.clone(), bingo_puzzle("start", &["goal"])).await?;

    let result = engine.activate(" _ ").await;

    assert!(matches!(result, Err(ClientError::InvalidWord(_))));
    assert_eq!(source.calls(), 0);
    Ok(())
}

// =========================================================================
// Single-Flight Mutation
// =========================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_activations_never_overlap() -> Result<()> {
    let words = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let neighbors: Vec<(String, Vec<String>)> = words
        .iter()
        .map(|w| (w.to_string(), vec![format!("{}1", w), format!("{}2", w)]))
        .collect();
    let pairs: Vec<(&str, Vec<&str>)> = neighbors
        .iter()
        .map(|(w, ns)| (w.as_str(), ns.iter().map(String::as_str).collect()))
        .collect();
    let pairs: Vec<(&str, &[&str])> = pairs.iter().map(|(w, ns)| (*w, ns.as_slice())).collect();

    let source = Arc::new(MapSource::new(&pairs));
    let engine = create_engine(source, bingo_puzzle("a", &["zzz"])).await?;
    let mut events = engine.subscribe();

    let handles: Vec<_> = words
        .iter()
        .map(|word| {
            let engine = engine.clone();
            let word = word.to_string();
            tokio::spawn(async move { engine.activate(&word).await })
        })
        .collect();
    for handle in handles {
        handle.await??;
    }

    let mut in_flight: Option<String> = None;
    let mut merges = 0;
    for event in drain(&mut events) {
        match event {
            EngineEvent::MutationStarted { word } => {
                assert!(in_flight.is_none(), "{} started while {:?} held the lock", word, in_flight);
                in_flight = Some(word);
            }
            EngineEvent::MutationFinished { word } => {
                assert_eq!(in_flight.as_deref(), Some(word.as_str()));
                in_flight = None;
                merges += 1;
            }
            _ => {}
        }
    }
    assert_eq!(merges, words.len());

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.nodes.len(), 1 + words.len() * 2);
    assert_eq!(snapshot.links.len(), words.len() * 2);
    Ok(())
}

// =========================================================================
// Hints
// =========================================================================

#[tokio::test]
async fn test_hints_follow_path_and_spend_budget() -> Result<()> {
    let source = Arc::new(MapSource::new(&[
        ("a", &["b", "x"]),
        ("b", &["c"]),
        ("c", &["d"]),
        ("d", &["e"]),
    ]));
    let engine = create_engine(source.clone(), daily_puzzle(&["a", "b", "c", "d"])).await?;

    // Nothing on the path is on screen before the start word is expanded
    assert_eq!(engine.request_hint().await?, HintOutcome::NoCandidate);
    assert_eq!(engine.snapshot().await.hints_left, 3);

    engine.activate("a").await?;

    match engine.request_hint().await? {
        HintOutcome::Activated {
            index, hints_left, ..
        } => {
            assert_eq!(index, 1);
            assert_eq!(hints_left, 2);
        }
        other => panic!("Expected a hint activation, got {:?}", other),
    }
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.current_word.as_deref(), Some("b"));
    assert_eq!(snapshot.hint_pointer, 1);

    match engine.request_hint().await? {
        HintOutcome::Activated {
            index, activation, ..
        } => {
            assert_eq!(index, 2);
            assert!(matches!(activation, ActivationOutcome::Expanded { won: true, .. }));
        }
        other => panic!("Expected a hint activation, got {:?}", other),
    }

    engine.request_hint().await?;
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.hints_left, 0);
    assert_eq!(snapshot.hint_pointer, 3);
    Ok(())
}

#[tokio::test]
async fn test_exhausted_hints_are_noops() -> Result<()> {
    let source = Arc::new(MapSource::new(&[("a", &["b"]), ("b", &["c"]), ("c", &["d"])]));
    let engine = ExplorationEngine::new(
        source.clone(),
        EngineConfig {
            hint_budget: 0,
            ..EngineConfig::default()
        },
    )?;
    engine.load_puzzle(daily_puzzle(&["a", "b", "c", "d"])).await;
    engine.activate("a").await?;

    let mut events = engine.subscribe();
    let before = engine.snapshot().await;
    let calls = source.calls();

    assert_eq!(engine.request_hint().await?, HintOutcome::Exhausted);
    assert_eq!(engine.request_hint().await?, HintOutcome::Exhausted);

    assert_eq!(engine.snapshot().await, before);
    assert_eq!(source.calls(), calls);
    assert!(drain(&mut events).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_failed_hint_keeps_budget() -> Result<()> {
    let source = Arc::new(MapSource::new(&[("a", &["b"]), ("b", &["c"])]));
    let engine = create_engine(source.clone(), daily_puzzle(&["a", "b", "c"])).await?;
    engine.activate("a").await?;
    source.fail_on("b").await;

    assert!(engine.request_hint().await.is_err());

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.hints_left, 3);
    assert_eq!(snapshot.hint_pointer, 0);
    assert!(engine.annotation("b").await.errored);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_hints_cannot_overspend_budget() -> Result<()> {
    let gate = Arc::new(Semaphore::new(1));
    let source = Arc::new(
        MapSource::new(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &["d"])]).with_gate(gate.clone()),
    );
    let engine = Arc::new(ExplorationEngine::new(
        source.clone(),
        EngineConfig {
            hint_budget: 1,
            ..EngineConfig::default()
        },
    )?);
    engine.load_puzzle(daily_puzzle(&["a", "b", "c", "d"])).await;
    engine.activate("a").await?;
    let mut events = engine.subscribe();

    let first = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.request_hint().await })
    };
    let second = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.request_hint().await })
    };
    while source.calls() < 2 {
        tokio::task::yield_now().await;
    }

    // The reserved hint is visible before its expansion returns
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.hints_left, 0);
    assert_eq!(snapshot.current_word.as_deref(), Some("b"));

    gate.add_permits(2);
    let outcomes = vec![first.await??, second.await??];

    let activated: Vec<_> = outcomes
        .iter()
        .filter(|outcome| matches!(outcome, HintOutcome::Activated { .. }))
        .collect();
    assert_eq!(activated.len(), 1, "Budget of one allows one hint: {:?}", outcomes);
    assert!(matches!(
        activated[0],
        HintOutcome::Activated {
            index: 1,
            hints_left: 0,
            ..
        }
    ));
    assert!(outcomes.contains(&HintOutcome::Exhausted));

    let hint_events = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, EngineEvent::HintUsed { .. }))
        .count();
    assert_eq!(hint_events, 1);
    assert_eq!(source.calls(), 2, "Only the start word and one hint were expanded");
    assert_eq!(engine.snapshot().await.hint_pointer, 1);
    Ok(())
}

// =========================================================================
// Puzzle Replacement
// =========================================================================

#[tokio::test]
async fn test_switch_mode_resets_state() -> Result<()> {
    let fresh = daily_puzzle(&["river", "water", "sea"]);
    let source = Arc::new(MapSource::new(&[("tree", &["leaf", "bark"])]).with_puzzle(fresh.clone()));
    let engine = create_engine(source, bingo_puzzle("tree", &["leaf"])).await?;
    engine.activate("tree").await?;
    assert!(engine.snapshot().await.won);

    let mut events = engine.subscribe();
    let loaded = engine.switch_mode(PuzzleMode::Daily, 0).await?;

    assert_eq!(loaded, fresh);
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.nodes, vec!["river"]);
    assert!(snapshot.links.is_empty());
    assert!(snapshot.found.is_empty());
    assert!(!snapshot.won);
    assert_eq!(snapshot.hint_pointer, 0);
    assert_eq!(snapshot.hints_left, 3);
    assert_eq!(snapshot.clicks, 0);
    assert!(snapshot.annotations.is_empty());
    assert_eq!(
        drain(&mut events),
        vec![EngineEvent::PuzzleLoaded {
            start: "river".to_string(),
            goals: vec!["sea".to_string()],
        }]
    );
    Ok(())
}

#[tokio::test]
async fn test_in_flight_expansion_is_discarded_after_reset() -> Result<()> {
    let gate = Arc::new(Semaphore::new(0));
    let source = Arc::new(MapSource::new(&[("old", &["stale"])]).with_gate(gate.clone()));
    let engine = create_engine(source.clone(), bingo_puzzle("old", &["stale"])).await?;

    let pending = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.activate("old").await })
    };
    while source.calls() == 0 {
        tokio::task::yield_now().await;
    }

    engine.load_puzzle(bingo_puzzle("new", &["goal"])).await;
    gate.add_permits(1);

    let outcome = pending.await??;
    assert_eq!(
        outcome,
        ActivationOutcome::Discarded {
            word: "old".to_string()
        }
    );
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.nodes, vec!["new"]);
    assert!(snapshot.links.is_empty());
    assert!(!snapshot.won);
    assert!(
        snapshot.annotations.is_empty(),
        "No flag from the old puzzle survives the swap"
    );
    assert_eq!(snapshot.current_word, None);
    Ok(())
}

#[tokio::test]
async fn test_reset_unloads_puzzle() -> Result<()> {
    let source = Arc::new(MapSource::new(&[("a", &["b"])]));
    let engine = create_engine(source, bingo_puzzle("a", &["b"])).await?;
    engine.activate("a").await?;

    engine.reset().await;

    let snapshot = engine.snapshot().await;
    assert!(snapshot.puzzle.is_none());
    assert!(snapshot.nodes.is_empty());
    assert_eq!(snapshot.hints_left, 3);
    Ok(())
}

// =========================================================================
// Rendering Surface
// =========================================================================

#[tokio::test]
async fn test_first_merge_waits_for_surface() -> Result<()> {
    let source = Arc::new(MapSource::new(&[("a", &["b"])]));
    let engine = Arc::new(ExplorationEngine::new(
        source,
        EngineConfig {
            gate_on_surface: true,
            ..EngineConfig::default()
        },
    )?);
    engine.load_puzzle(bingo_puzzle("a", &["b"])).await;

    let pending = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.activate("a").await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(engine.snapshot().await.nodes, vec!["a"]);
    assert!(engine.annotation("a").await.expanding);

    engine.mark_surface_ready();
    let outcome = pending.await??;

    assert!(matches!(outcome, ActivationOutcome::Expanded { won: true, .. }));
    assert_eq!(engine.snapshot().await.nodes, vec!["a", "b"]);
    Ok(())
}

// =========================================================================
// In-Process Source
// =========================================================================

#[tokio::test]
async fn test_local_source_drives_engine() -> Result<()> {
    let store = Arc::new(
        MemoryAssociationStore::from_pairs([("human", "person"), ("person", "girl"), ("human", "man")])
            .await?,
    );
    let expansion = WordExpansionService::new(
        store.clone(),
        Arc::new(DisabledOracle),
        Arc::new(ExpansionCache::new()),
        ExpansionConfig::default(),
    )?;
    let selector = PuzzleSelector::new(store, Arc::new(PuzzleCache::new()), SelectorConfig::default())?;
    let source = Arc::new(LocalSource::new(Arc::new(expansion), Arc::new(selector)));
    let engine = ExplorationEngine::new(source, EngineConfig::default())?;

    // The tiny graph has no pair at distance 5..=12, so the fallback pair is served
    let puzzle = engine.switch_mode(PuzzleMode::Unlimited, 42).await?;
    assert_eq!(puzzle.start, "human");
    assert_eq!(puzzle.goal_words(), vec!["girl"]);

    engine.activate("human").await?;
    engine.activate("person").await?;

    let snapshot = engine.snapshot().await;
    assert!(snapshot.won);
    assert_eq!(snapshot.found, vec!["girl"]);
    Ok(())
}
