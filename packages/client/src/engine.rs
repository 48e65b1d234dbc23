//! Client Exploration Engine
//!
//! Drives interactive graph growth for one puzzle at a time. Every node
//! activation (a click or a hint) runs through the same state machine:
//!
//! ```text
//! Idle -> Activating -> { Success, Failed }
//! ```
//!
//! ## Single-Flight Mutation
//!
//! The expansion request runs without any lock held. Only after it succeeds
//! does the activation take the mutation lock, merge the result and release
//! the lock, so at most one merge touches the graph at a time. The lock is
//! also held briefly to enter `Activating` and to record a failure, never
//! across the request. A failed activation flags the node as errored and the
//! player may retry it. Waiting activations are not ordered FIFO.
//!
//! ## Puzzle Instances
//!
//! Loading a puzzle (mode switch, new day) or resetting bumps an epoch counter
//! under the mutation lock. An activation records the epoch under the same
//! lock when it enters `Activating`; one that was in flight across the swap
//! sees a stale epoch when it finally gets the lock and discards its result.
//!
//! ## Rendering Surface
//!
//! With `gate_on_surface` set, the first merge waits until
//! [`ExplorationEngine::mark_surface_ready`] is called. The wait is a `watch`
//! channel, not a poll loop.

use crate::config::EngineConfig;
use crate::error::{ClientError, Result};
use crate::events::EngineEvent;
use crate::source::WordSource;
use crate::state::{ClientGraphState, GraphSnapshot, NodeAnnotation};
use semantical_core::models::{normalize_word, PuzzleMode, PuzzleSpec};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, Mutex, RwLock};

/// Result of one node activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// The expansion was merged into the graph
    Expanded {
        word: String,
        added: Vec<String>,
        newly_found: Vec<String>,
        won: bool,
    },
    /// The puzzle was replaced while the expansion was in flight
    Discarded { word: String },
}

/// Result of a hint request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintOutcome {
    /// The next hint-path word was activated
    Activated {
        index: usize,
        hints_left: u32,
        activation: ActivationOutcome,
    },
    /// No word on the hint path is on screen and unexpanded
    NoCandidate,
    /// The hint budget is spent
    Exhausted,
}

/// State machine driving one player's exploration
pub struct ExplorationEngine {
    source: Arc<dyn WordSource>,
    config: EngineConfig,
    /// Single-flight lock; held only while a merge is applied
    mutation: Mutex<()>,
    state: RwLock<ClientGraphState>,
    annotations: RwLock<HashMap<String, NodeAnnotation>>,
    epoch: AtomicU64,
    events: broadcast::Sender<EngineEvent>,
    surface: watch::Sender<bool>,
}

impl ExplorationEngine {
    /// Create an engine with no puzzle loaded
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Transport` if `config` fails validation.
    pub fn new(source: Arc<dyn WordSource>, config: EngineConfig) -> Result<Self> {
        config.validate().map_err(ClientError::Transport)?;

        let (events, _) = broadcast::channel(config.event_capacity);
        let (surface, _) = watch::channel(!config.gate_on_surface);

        Ok(Self {
            source,
            state: RwLock::new(ClientGraphState::empty(config.hint_budget)),
            config,
            mutation: Mutex::new(()),
            annotations: RwLock::new(HashMap::new()),
            epoch: AtomicU64::new(0),
            events,
            surface,
        })
    }

    /// Subscribe to engine events
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// Signal that the rendering surface can accept graph mutations
    pub fn mark_surface_ready(&self) {
        self.surface.send_replace(true);
    }

    /// Read-only copy of the current state
    pub async fn snapshot(&self) -> GraphSnapshot {
        let state = self.state.read().await;
        let annotations = self.annotations.read().await;
        state.snapshot(&annotations)
    }

    pub async fn annotation(&self, word: &str) -> NodeAnnotation {
        self.annotations
            .read()
            .await
            .get(&normalize_word(word))
            .copied()
            .unwrap_or_default()
    }

    /// Fetch the puzzle for `(mode, seed)` from the source and load it
    pub async fn switch_mode(&self, mode: PuzzleMode, seed: i64) -> Result<PuzzleSpec> {
        let puzzle = self.source.puzzle(mode, seed).await?;
        self.load_puzzle(puzzle.clone()).await;
        Ok(puzzle)
    }

    /// Replace all state with a fresh instance of `puzzle`
    pub async fn load_puzzle(&self, puzzle: PuzzleSpec) {
        let start = puzzle.start.clone();
        let goals = puzzle.goal_words();

        self.replace_state(ClientGraphState::new(puzzle, self.config.hint_budget))
            .await;

        tracing::info!(start = %start, goals = goals.len(), "Puzzle loaded");
        self.emit(EngineEvent::PuzzleLoaded { start, goals });
    }

    /// Clear all state and unload the puzzle
    pub async fn reset(&self) {
        self.replace_state(ClientGraphState::empty(self.config.hint_budget))
            .await;
        self.emit(EngineEvent::Reset);
    }

    /// Activate a node: expand it and merge the result
    ///
    /// # Errors
    ///
    /// Returns the source's error when the expansion fails; the node is
    /// flagged as errored and no graph state changes.
    pub async fn activate(&self, raw: &str) -> Result<ActivationOutcome> {
        let word = normalize_word(raw);
        if word.is_empty() {
            return Err(ClientError::InvalidWord(raw.to_string()));
        }

        let epoch = {
            let _guard = self.mutation.lock().await;
            let mut state = self.state.write().await;
            let mut annotations = self.annotations.write().await;
            enter_activating(&mut state, &mut annotations, &word);
            self.epoch.load(Ordering::SeqCst)
        };

        let (outcome, _) = self.run_activation(word, epoch, None).await?;
        Ok(outcome)
    }

    /// Activate the next unexpanded on-screen word along the hint path
    ///
    /// Scans forward from just after the hint pointer. With no hints left
    /// this is a no-op that changes nothing. A hint is reserved from the
    /// budget before the expansion starts and refunded if it fails, so
    /// concurrent requests never spend more than the budget.
    pub async fn request_hint(&self) -> Result<HintOutcome> {
        if self.state.read().await.hints_left() == 0 {
            return Ok(HintOutcome::Exhausted);
        }

        let (epoch, index, word) = {
            let _guard = self.mutation.lock().await;
            let mut state = self.state.write().await;
            let mut annotations = self.annotations.write().await;
            if state.hints_left() == 0 {
                return Ok(HintOutcome::Exhausted);
            }
            let Some((index, word)) = state.next_hint(&annotations) else {
                return Ok(HintOutcome::NoCandidate);
            };
            state.reserve_hint(index);
            enter_activating(&mut state, &mut annotations, &word);
            (self.epoch.load(Ordering::SeqCst), index, word)
        };

        let (activation, hints_left) = self.run_activation(word.clone(), epoch, Some(index)).await?;
        let Some(hints_left) = hints_left else {
            return Ok(HintOutcome::NoCandidate);
        };

        self.emit(EngineEvent::HintUsed {
            word,
            index,
            hints_left,
        });
        Ok(HintOutcome::Activated {
            index,
            hints_left,
            activation,
        })
    }

    /// Shared activation path, entered after `enter_activating` ran at `epoch`
    ///
    /// Returns the hints left when `hint` was settled by a merge.
    async fn run_activation(
        &self,
        word: String,
        epoch: u64,
        hint: Option<usize>,
    ) -> Result<(ActivationOutcome, Option<u32>)> {
        self.emit(EngineEvent::ActivationStarted { word: word.clone() });

        let neighbors = match self.source.related_words(&word).await {
            Ok(neighbors) => neighbors,
            Err(e) => {
                tracing::warn!(word = %word, "Activation failed: {}", e);
                {
                    let _guard = self.mutation.lock().await;
                    if self.epoch.load(Ordering::SeqCst) == epoch {
                        if let Some(index) = hint {
                            self.state.write().await.refund_hint(index);
                        }
                        self.set_annotation(&word, |a| {
                            a.expanding = false;
                            a.errored = true;
                        })
                        .await;
                    }
                }
                self.emit(EngineEvent::ActivationFailed {
                    word,
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        self.wait_for_surface().await;

        let _guard = self.mutation.lock().await;
        if self.epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(word = %word, "Discarding expansion from a replaced puzzle");
            return Ok((ActivationOutcome::Discarded { word }, None));
        }
        self.emit(EngineEvent::MutationStarted { word: word.clone() });

        let (merged, clicks, hints_left) = {
            let mut state = self.state.write().await;
            let merged = state.merge_expansion(&word, &neighbors);
            let hints_left = hint.map(|index| state.consume_hint(index));
            (merged, state.clicks(), hints_left)
        };

        self.set_annotation(&word, |a| {
            a.expanding = false;
            a.errored = false;
            a.visited = true;
        })
        .await;

        self.emit(EngineEvent::Expanded {
            word: word.clone(),
            added: merged.added.clone(),
        });
        for goal in &merged.newly_found {
            tracing::info!(goal = %goal, "Goal found");
            self.emit(EngineEvent::GoalFound { word: goal.clone() });
        }
        if merged.won_now {
            tracing::info!(clicks, "Puzzle won");
            self.emit(EngineEvent::Won { clicks });
        }
        self.emit(EngineEvent::MutationFinished { word: word.clone() });

        let outcome = ActivationOutcome::Expanded {
            word,
            added: merged.added,
            newly_found: merged.newly_found,
            won: merged.won_now,
        };
        Ok((outcome, hints_left))
    }

    async fn replace_state(&self, fresh: ClientGraphState) {
        let _guard = self.mutation.lock().await;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        *self.state.write().await = fresh;
        self.annotations.write().await.clear();
    }

    async fn wait_for_surface(&self) {
        let mut ready = self.surface.subscribe();
        // The engine owns the sender, so the channel cannot close while we wait
        let _ = ready.wait_for(|ready| *ready).await;
    }

    async fn set_annotation(&self, word: &str, update: impl FnOnce(&mut NodeAnnotation)) {
        let mut annotations = self.annotations.write().await;
        update(annotations.entry(word.to_string()).or_default());
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

/// Idle -> Activating; callers hold the mutation lock
fn enter_activating(
    state: &mut ClientGraphState,
    annotations: &mut HashMap<String, NodeAnnotation>,
    word: &str,
) {
    state.set_current_word(word);
    let annotation = annotations.entry(word.to_string()).or_default();
    annotation.expanding = true;
    annotation.errored = false;
}
