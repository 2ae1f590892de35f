//! Advisory tools backing the support panel.
//!
//! Each tool is an independent request/response helper with its own loading
//! flag, result slot and degraded-failure path; none of them may surface a
//! raw protocol error. Results are applied through a generation guard so a
//! stale response can never overwrite a newer request's outcome.

pub mod assistant;
pub mod cache;
pub mod offline;

use crate::library::ShelfMatch;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

/// Structured dictionary lookup result. `did_you_mean` carries spelling
/// suggestions when the queried word looks wrong; the definition is empty in
/// that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DictionaryEntry {
    pub word: String,
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub etymology: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub did_you_mean: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RhymeKind {
    Consonante,
    Toante,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Tonicity {
    #[serde(rename = "oxítona")]
    Oxitona,
    #[serde(rename = "paroxítona")]
    Paroxitona,
    #[serde(rename = "proparoxítona")]
    Proparoxitona,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RhymeEntry {
    pub word: String,
    #[serde(rename = "type")]
    pub kind: RhymeKind,
    /// Zero when unknown (the offline fallback cannot count syllables).
    pub syllables: u32,
    pub tonicity: Tonicity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RhymeSheet {
    pub word: String,
    pub rhymes: Vec<RhymeEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LiteraryReference {
    pub author: String,
    #[serde(default)]
    pub works: Vec<String>,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// Lifecycle of one advisory tool as the front end sees it.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(tag = "state", rename_all = "snake_case")]
#[ts(export)]
pub enum ToolState<T> {
    Idle,
    Loading,
    Ready { result: T },
    Failed { reason: String },
}

/// One tool slot with its request generation counter. `begin` hands out a
/// generation; `resolve` applies an outcome only when its generation is still
/// the latest, so responses that raced a newer request (or a dismiss) are
/// dropped instead of overwriting fresher state.
#[derive(Debug)]
pub struct ToolSlot<T> {
    state: ToolState<T>,
    generation: u64,
}

impl<T> Default for ToolSlot<T> {
    fn default() -> Self {
        ToolSlot {
            state: ToolState::Idle,
            generation: 0,
        }
    }
}

impl<T> ToolSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ToolState<T> {
        &self.state
    }

    /// Start a request; the returned generation must accompany the response.
    pub fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.state = ToolState::Loading;
        self.generation
    }

    /// Apply an outcome if its generation is still current. Returns whether
    /// it was applied.
    pub fn resolve(&mut self, generation: u64, outcome: Result<T, String>) -> bool {
        if generation != self.generation {
            debug!(
                stale = generation,
                current = self.generation,
                "Discarded stale advisory response"
            );
            return false;
        }
        self.state = match outcome {
            Ok(result) => ToolState::Ready { result },
            Err(reason) => ToolState::Failed { reason },
        };
        true
    }

    /// Clear the slot. Also invalidates any in-flight request.
    pub fn dismiss(&mut self) {
        self.generation += 1;
        self.state = ToolState::Idle;
    }
}

/// Names the panel tools on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Tool {
    Dictionary,
    Rhymes,
    Literary,
    Review,
    Continuation,
    Shelf,
}

/// All six tool slots, one per panel window.
#[derive(Debug, Default)]
pub struct SupportPanel {
    pub dictionary: ToolSlot<DictionaryEntry>,
    pub rhymes: ToolSlot<RhymeSheet>,
    pub literary: ToolSlot<LiteraryReference>,
    pub review: ToolSlot<String>,
    pub continuation: ToolSlot<String>,
    pub shelf: ToolSlot<Vec<ShelfMatch>>,
}

/// Serialized view of the panel, embedded in every desk snapshot.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct PanelSnapshot {
    pub dictionary: ToolState<DictionaryEntry>,
    pub rhymes: ToolState<RhymeSheet>,
    pub literary: ToolState<LiteraryReference>,
    pub review: ToolState<String>,
    pub continuation: ToolState<String>,
    pub shelf: ToolState<Vec<ShelfMatch>>,
}

impl SupportPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dismiss(&mut self, tool: Tool) {
        match tool {
            Tool::Dictionary => self.dictionary.dismiss(),
            Tool::Rhymes => self.rhymes.dismiss(),
            Tool::Literary => self.literary.dismiss(),
            Tool::Review => self.review.dismiss(),
            Tool::Continuation => self.continuation.dismiss(),
            Tool::Shelf => self.shelf.dismiss(),
        }
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            dictionary: self.dictionary.state().clone(),
            rhymes: self.rhymes.state().clone(),
            literary: self.literary.state().clone(),
            review: self.review.state().clone(),
            continuation: self.continuation.state().clone(),
            shelf: self.shelf.state().clone(),
        }
    }
}
