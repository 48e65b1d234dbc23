/// Events published by the exploration engine
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// A new puzzle replaced the previous state
    PuzzleLoaded { start: String, goals: Vec<String> },

    /// State cleared without a new puzzle
    Reset,

    ActivationStarted { word: String },

    /// The mutation lock was taken for `word`
    MutationStarted { word: String },

    Expanded { word: String, added: Vec<String> },

    GoalFound { word: String },

    /// Fires exactly once per puzzle instance
    Won { clicks: u32 },

    /// The mutation lock was released after `word`
    MutationFinished { word: String },

    ActivationFailed { word: String, reason: String },

    HintUsed { word: String, index: usize, hints_left: u32 },
}
