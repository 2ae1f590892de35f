//! Project model for the writing desk.
//!
//! A `WritingProject` is the sole persisted entity: one document with its
//! title, content, genre tag and timestamps. The serialized shape matches the
//! stored slots byte-for-byte field-wise (camelCase keys, `type` tag), so old
//! data keeps loading.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use ts_rs::TS;
use uuid::Uuid;

/// Id used by the built-in default project before the user creates anything.
pub const DEFAULT_PROJECT_ID: &str = "default";

/// Title given to projects created through the explicit "new" action.
pub const NEW_PROJECT_TITLE: &str = "Novo Texto";

/// Milliseconds since the Unix epoch; the clock the stored slots use.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Genre tag; informational only, never interpreted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum TextKind {
    Conto,
    Poema,
    #[serde(rename = "crônica")]
    Cronica,
    #[default]
    Geral,
}

impl std::fmt::Display for TextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TextKind::Conto => "Conto",
            TextKind::Poema => "Poema",
            TextKind::Cronica => "Crônica",
            TextKind::Geral => "Geral",
        };
        write!(f, "{}", label)
    }
}

/// One writing document. `created_at` and `id` are immutable after creation;
/// every other field mutation refreshes `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WritingProject {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub created_at: u64,
    pub updated_at: u64,
    /// Schema version, reserved; always 1 today.
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub word_goal: Option<u64>,
}

fn default_version() -> u32 {
    1
}

impl WritingProject {
    /// The built-in project shown on a completely fresh start.
    pub fn default_project(word_goal: u64) -> Self {
        let now = now_millis();
        WritingProject {
            id: DEFAULT_PROJECT_ID.to_string(),
            title: String::new(),
            content: String::new(),
            kind: TextKind::Geral,
            created_at: now,
            updated_at: now,
            version: default_version(),
            word_goal: Some(word_goal),
        }
    }

    /// A blank project created through the explicit "new" action.
    pub fn blank(word_goal: u64) -> Self {
        let now = now_millis();
        WritingProject {
            id: Uuid::new_v4().to_string(),
            title: NEW_PROJECT_TITLE.to_string(),
            content: String::new(),
            kind: TextKind::Geral,
            created_at: now,
            updated_at: now,
            version: default_version(),
            word_goal: Some(word_goal),
        }
    }

    /// A project built from an uploaded file's name and contents.
    pub fn imported(title: String, content: String, word_goal: u64) -> Self {
        let now = now_millis();
        WritingProject {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            kind: TextKind::Geral,
            created_at: now,
            updated_at: now,
            version: default_version(),
            word_goal: Some(word_goal),
        }
    }

    /// Refresh `updated_at`, keeping the `updated_at >= created_at` invariant
    /// even if the wall clock jumps backwards.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.created_at);
    }
}

/// Partial update merged into a project; absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProjectPatch {
    #[ts(optional)]
    pub title: Option<String>,
    #[ts(optional)]
    pub content: Option<String>,
    #[serde(rename = "type")]
    #[ts(optional)]
    pub kind: Option<TextKind>,
    #[ts(optional)]
    pub word_goal: Option<u64>,
}

/// Lightweight listing entry for the project picker.
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProjectMetadata {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub updated_at: u64,
}

impl From<&WritingProject> for ProjectMetadata {
    fn from(project: &WritingProject) -> Self {
        ProjectMetadata {
            id: project.id.clone(),
            title: project.title.clone(),
            kind: project.kind,
            updated_at: project.updated_at,
        }
    }
}
