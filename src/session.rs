//! Desk session: applies front-end commands and emits snapshots.
//!
//! The session ties the project store, support panel, autosave, remote mirror,
//! assistant and shelf together. Every command produces a `DeskEvent` carrying
//! the action name and a full snapshot, so the front end re-renders from one
//! authoritative state. Store mutations schedule a debounced autosave; the
//! remote mirror is only ever touched by its explicit command.

use crate::advisory::assistant::Assistant;
use crate::advisory::{PanelSnapshot, SupportPanel, Tool, ToolState};
use crate::autosave::Autosave;
use crate::config::AppConfig;
use crate::files::{self, ExportFormat};
use crate::library::Shelf;
use crate::metrics::{self, TextMetrics};
use crate::project::{ProjectMetadata, ProjectPatch, WritingProject};
use crate::remote::RemoteMirror;
use crate::storage;
use crate::store::ProjectStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use ts_rs::TS;

/// Commands the front end can issue, one JSON object per line.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(tag = "cmd", rename_all = "snake_case")]
#[ts(export)]
pub enum DeskCommand {
    GetSnapshot,
    CreateProject,
    ImportProject { path: String },
    DeleteProject { id: String },
    SetActive { id: String },
    UpdateProject { id: String, patch: ProjectPatch },
    ClearProject { id: String },
    InsertContinuation,
    ExportProject { dir: String, format: ExportFormat },
    PushRemote,
    Define { word: String },
    Rhymes { word: String },
    Literary { query: String },
    ReviewText,
    ContinueText,
    SearchShelf { query: String },
    Dismiss { tool: Tool },
    Flush,
    Shutdown,
}

impl DeskCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "desk_get_snapshot",
            Self::CreateProject => "desk_create_project",
            Self::ImportProject { .. } => "desk_import_project",
            Self::DeleteProject { .. } => "desk_delete_project",
            Self::SetActive { .. } => "desk_set_active",
            Self::UpdateProject { .. } => "desk_update_project",
            Self::ClearProject { .. } => "desk_clear_project",
            Self::InsertContinuation => "desk_insert_continuation",
            Self::ExportProject { .. } => "desk_export_project",
            Self::PushRemote => "desk_push_remote",
            Self::Define { .. } => "desk_define",
            Self::Rhymes { .. } => "desk_rhymes",
            Self::Literary { .. } => "desk_literary",
            Self::ReviewText => "desk_review_text",
            Self::ContinueText => "desk_continue_text",
            Self::SearchShelf { .. } => "desk_search_shelf",
            Self::Dismiss { .. } => "desk_dismiss",
            Self::Flush => "desk_flush",
            Self::Shutdown => "desk_shutdown",
        }
    }
}

/// Full state of the desk as the front end sees it.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct DeskSnapshot {
    pub projects: Vec<ProjectMetadata>,
    pub active: WritingProject,
    pub metrics: TextMetrics,
    pub panel: PanelSnapshot,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct DeskEvent {
    pub action: String,
    pub snapshot: DeskSnapshot,
    /// Human-readable outcome of side-effecting commands (remote push,
    /// import/export), when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub notice: Option<String>,
}

pub struct DeskSession {
    config: AppConfig,
    store: ProjectStore,
    panel: SupportPanel,
    assistant: Assistant,
    shelf: Shelf,
    remote: RemoteMirror,
    autosave: Autosave,
}

impl DeskSession {
    /// Load the stored collection and wire up every collaborator.
    pub fn open(config: AppConfig) -> Self {
        let data_dir = PathBuf::from(&config.data_dir);
        let store = storage::load_store(&data_dir, config.default_word_goal);
        let autosave = Autosave::new(
            storage::current_slot_path(&data_dir),
            Duration::from_millis(config.autosave_quiet_ms),
        );
        let assistant = Assistant::new(&config);
        let shelf = Shelf::new(
            config.shelf_catalog_path.clone(),
            config.shelf_kindle_notes_path.clone(),
        );
        let remote = RemoteMirror::new(config.remote_endpoint.clone());
        info!(
            projects = store.len(),
            active = %store.active_id(),
            "Opened writing desk"
        );
        DeskSession {
            config,
            store,
            panel: SupportPanel::new(),
            assistant,
            shelf,
            remote,
            autosave,
        }
    }

    pub fn snapshot(&self) -> DeskSnapshot {
        let active = self.store.active().clone();
        let metrics = metrics::measure(&active.content, active.word_goal);
        DeskSnapshot {
            projects: self.store.metadata(),
            active,
            metrics,
            panel: self.panel.snapshot(),
        }
    }

    /// Write any pending autosave now.
    pub fn flush(&self) {
        self.autosave.flush();
    }

    pub fn apply_command(&mut self, command: DeskCommand) -> DeskEvent {
        let action = command.action();
        let mut notice = None;
        let mut dirty = false;

        match command {
            DeskCommand::GetSnapshot => {}
            DeskCommand::CreateProject => {
                self.store.create(self.config.default_word_goal);
                dirty = true;
            }
            DeskCommand::ImportProject { path } => {
                match files::import_project(Path::new(&path), self.config.default_word_goal) {
                    Ok(project) => {
                        self.store.adopt(project);
                        dirty = true;
                    }
                    Err(err) => {
                        warn!("Import failed: {err:#}");
                        notice = Some("Não foi possível importar o arquivo.".to_string());
                    }
                }
            }
            DeskCommand::DeleteProject { id } => {
                dirty = self.store.delete(&id);
            }
            DeskCommand::SetActive { id } => {
                // Switching projects changes no project data; nothing to save.
                self.store.set_active(&id);
            }
            DeskCommand::UpdateProject { id, patch } => {
                dirty = self.store.update(&id, patch);
            }
            DeskCommand::ClearProject { id } => {
                dirty = self.store.clear(&id);
            }
            DeskCommand::InsertContinuation => {
                if let ToolState::Ready { result } = self.panel.continuation.state() {
                    let suggestion = result.clone();
                    let active = self.store.active();
                    let id = active.id.clone();
                    let content = if active.content.ends_with(' ') {
                        format!("{}{}", active.content, suggestion)
                    } else {
                        format!("{} {}", active.content, suggestion)
                    };
                    self.store.update(
                        &id,
                        ProjectPatch {
                            content: Some(content),
                            ..ProjectPatch::default()
                        },
                    );
                    self.panel.continuation.dismiss();
                    dirty = true;
                }
            }
            DeskCommand::ExportProject { dir, format } => {
                match files::export_project(self.store.active(), Path::new(&dir), format) {
                    Ok(path) => {
                        notice = Some(format!("Backup salvo em {}", path.display()));
                    }
                    Err(err) => {
                        warn!("Export failed: {err:#}");
                        notice = Some("Não foi possível exportar o arquivo.".to_string());
                    }
                }
            }
            DeskCommand::PushRemote => {
                let active = self.store.active();
                notice = Some(match self.remote.push(&active.title, &active.content) {
                    Ok(_) => "Texto salvo no banco de dados com sucesso!".to_string(),
                    Err(err) => err.to_string(),
                });
            }
            DeskCommand::Define { word } => {
                if !word.trim().is_empty() {
                    let generation = self.panel.dictionary.begin();
                    let outcome = self.assistant.define(&word);
                    self.panel.dictionary.resolve(generation, outcome);
                }
            }
            DeskCommand::Rhymes { word } => {
                if !word.trim().is_empty() {
                    let generation = self.panel.rhymes.begin();
                    let sheet = self.assistant.rhymes(&word);
                    self.panel.rhymes.resolve(generation, Ok(sheet));
                }
            }
            DeskCommand::Literary { query } => {
                if !query.trim().is_empty() {
                    let generation = self.panel.literary.begin();
                    let reference = self.assistant.literary_reference(&query);
                    self.panel.literary.resolve(generation, Ok(reference));
                }
            }
            DeskCommand::ReviewText => {
                let content = self.store.active().content.clone();
                if !content.trim().is_empty() {
                    let generation = self.panel.review.begin();
                    let feedback = self.assistant.review_text(&content);
                    self.panel.review.resolve(generation, Ok(feedback));
                }
            }
            DeskCommand::ContinueText => {
                let content = self.store.active().content.clone();
                if !content.trim().is_empty() {
                    let generation = self.panel.continuation.begin();
                    let suggestion = self.assistant.continue_text(&content);
                    self.panel.continuation.resolve(generation, Ok(suggestion));
                }
            }
            DeskCommand::SearchShelf { query } => {
                if !query.trim().is_empty() {
                    let generation = self.panel.shelf.begin();
                    let matches = self.shelf.search(&query);
                    self.panel.shelf.resolve(generation, Ok(matches));
                }
            }
            DeskCommand::Dismiss { tool } => {
                self.panel.dismiss(tool);
            }
            DeskCommand::Flush => {
                self.autosave.flush();
            }
            DeskCommand::Shutdown => {
                self.autosave.flush();
            }
        }

        if dirty {
            self.autosave.schedule(self.store.projects());
        }

        DeskEvent {
            action: action.to_string(),
            snapshot: self.snapshot(),
            notice,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_config(root: &Path) -> AppConfig {
        AppConfig {
            data_dir: root.join("data").display().to_string(),
            cache_dir: root.join(".cache").display().to_string(),
            shelf_catalog_path: root.join("shelf/catalogo.md").display().to_string(),
            shelf_kindle_notes_path: root.join("shelf/notas.md").display().to_string(),
            remote_endpoint: "http://127.0.0.1:1/api/save".to_string(),
            api_key_env: "MESA_ESCRITA_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            autosave_quiet_ms: 20,
            ..AppConfig::default()
        }
    }

    fn open_session(root: &Path) -> DeskSession {
        DeskSession::open(test_config(root))
    }

    #[test]
    fn a_fresh_desk_opens_on_the_default_project() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());

        let event = session.apply_command(DeskCommand::GetSnapshot);

        assert_eq!(event.action, "desk_get_snapshot");
        assert_eq!(event.snapshot.projects.len(), 1);
        assert_eq!(event.snapshot.active.id, "default");
        assert_eq!(event.snapshot.metrics.words, 0);
    }

    #[test]
    fn content_edits_update_metrics_and_persist_through_flush() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());
        let id = session.snapshot().active.id;

        session.apply_command(DeskCommand::UpdateProject {
            id,
            patch: ProjectPatch {
                content: Some("uma frase\n\ncom duas partes".to_string()),
                ..ProjectPatch::default()
            },
        });
        let event = session.apply_command(DeskCommand::Flush);

        assert_eq!(event.snapshot.metrics.words, 5);
        assert_eq!(event.snapshot.metrics.paragraphs, 2);
        let slot = storage::current_slot_path(&PathBuf::from(&test_config(dir.path()).data_dir));
        let stored: Vec<WritingProject> =
            serde_json::from_str(&fs::read_to_string(slot).unwrap()).unwrap();
        assert_eq!(stored[0].content, "uma frase\n\ncom duas partes");
    }

    #[test]
    fn a_reopened_desk_sees_the_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut session = open_session(dir.path());
            session.apply_command(DeskCommand::CreateProject);
            session.apply_command(DeskCommand::Flush);
        }

        let session = open_session(dir.path());

        assert_eq!(session.snapshot().projects.len(), 2);
        assert_eq!(session.snapshot().active.title, "Novo Texto");
    }

    #[test]
    fn deleting_the_sole_project_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());
        let id = session.snapshot().active.id;

        let event = session.apply_command(DeskCommand::DeleteProject { id: id.clone() });

        assert_eq!(event.snapshot.projects.len(), 1);
        assert_eq!(event.snapshot.active.id, id);
    }

    #[test]
    fn pushing_empty_content_reports_the_rejection_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());

        let event = session.apply_command(DeskCommand::PushRemote);

        assert_eq!(
            event.notice.as_deref(),
            Some("Erro ao salvar: Content is required")
        );
    }

    #[test]
    fn pushing_to_an_unreachable_server_reports_the_connection_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());
        let id = session.snapshot().active.id;
        session.apply_command(DeskCommand::UpdateProject {
            id,
            patch: ProjectPatch {
                content: Some("algum texto".to_string()),
                ..ProjectPatch::default()
            },
        });

        let event = session.apply_command(DeskCommand::PushRemote);

        assert_eq!(
            event.notice.as_deref(),
            Some("Erro de conexão com o servidor local.")
        );
    }

    #[test]
    fn shelf_search_fills_and_dismiss_clears_the_tool_slot() {
        let dir = tempfile::tempdir().unwrap();
        let shelf_dir = dir.path().join("shelf");
        fs::create_dir_all(&shelf_dir).unwrap();
        fs::write(shelf_dir.join("catalogo.md"), "um livro sobre o mar").unwrap();
        let mut session = open_session(dir.path());

        let event = session.apply_command(DeskCommand::SearchShelf {
            query: "mar".to_string(),
        });
        match &event.snapshot.panel.shelf {
            ToolState::Ready { result } => assert_eq!(result.len(), 1),
            state => panic!("expected shelf results, got {state:?}"),
        }

        let event = session.apply_command(DeskCommand::Dismiss { tool: Tool::Shelf });
        assert_eq!(event.snapshot.panel.shelf, ToolState::Idle);
    }

    #[test]
    fn blank_advisory_queries_leave_the_panel_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());

        let event = session.apply_command(DeskCommand::Define {
            word: "   ".to_string(),
        });

        assert_eq!(event.snapshot.panel.dictionary, ToolState::Idle);
    }

    #[test]
    fn rhyme_lookups_degrade_to_the_offline_sheet_without_a_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());

        let event = session.apply_command(DeskCommand::Rhymes {
            word: "coração".to_string(),
        });

        match &event.snapshot.panel.rhymes {
            ToolState::Ready { result } => {
                assert_eq!(result.word, "coração");
                assert!(!result.rhymes.is_empty());
            }
            state => panic!("expected an offline rhyme sheet, got {state:?}"),
        }
    }

    #[test]
    fn accepted_continuations_are_appended_with_a_single_space() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());
        let id = session.snapshot().active.id;
        session.apply_command(DeskCommand::UpdateProject {
            id,
            patch: ProjectPatch {
                content: Some("Era uma vez".to_string()),
                ..ProjectPatch::default()
            },
        });
        session.apply_command(DeskCommand::ContinueText);
        let suggestion = match session.snapshot().panel.continuation {
            ToolState::Ready { result } => result,
            state => panic!("expected a continuation, got {state:?}"),
        };

        let event = session.apply_command(DeskCommand::InsertContinuation);

        assert_eq!(
            event.snapshot.active.content,
            format!("Era uma vez {suggestion}")
        );
        assert_eq!(event.snapshot.panel.continuation, ToolState::Idle);
    }

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let command: DeskCommand = serde_json::from_str(
            r#"{"cmd": "update_project", "id": "abc", "patch": {"content": "novo"}}"#,
        )
        .unwrap();

        match command {
            DeskCommand::UpdateProject { id, patch } => {
                assert_eq!(id, "abc");
                assert_eq!(patch.content.as_deref(), Some("novo"));
                assert!(patch.title.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn events_serialize_without_an_absent_notice() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = open_session(dir.path());

        let event = session.apply_command(DeskCommand::GetSnapshot);
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains("\"action\":\"desk_get_snapshot\""));
        assert!(!json.contains("notice"));
    }
}
