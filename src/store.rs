//! In-memory project store: the single source of truth for workspace state.
//!
//! The store owns the ordered collection and the active id and is the only
//! write path to either. Two invariants hold at every exit point: the
//! collection is never empty, and the active id resolves to a member (reads
//! fall back to the first project when it does not).

use crate::project::{ProjectMetadata, ProjectPatch, WritingProject};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct ProjectStore {
    projects: Vec<WritingProject>,
    active_id: String,
}

impl ProjectStore {
    /// Wrap a loaded, non-empty collection. Falls back to a single default
    /// project if handed an empty list so the invariant holds from birth.
    pub fn new(projects: Vec<WritingProject>, active_id: String, default_word_goal: u64) -> Self {
        if projects.is_empty() {
            warn!("Refusing to start with an empty collection; using the default project");
            return Self::with_default(default_word_goal);
        }
        ProjectStore {
            projects,
            active_id,
        }
    }

    /// A store holding only the built-in default project.
    pub fn with_default(default_word_goal: u64) -> Self {
        let project = WritingProject::default_project(default_word_goal);
        let active_id = project.id.clone();
        ProjectStore {
            projects: vec![project],
            active_id,
        }
    }

    pub fn projects(&self) -> &[WritingProject] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// The active project; resolves to the first project when the recorded id
    /// is not a member.
    pub fn active(&self) -> &WritingProject {
        self.projects
            .iter()
            .find(|p| p.id == self.active_id)
            .unwrap_or(&self.projects[0])
    }

    pub fn metadata(&self) -> Vec<ProjectMetadata> {
        self.projects.iter().map(ProjectMetadata::from).collect()
    }

    /// Prepend a new blank project and make it active.
    pub fn create(&mut self, default_word_goal: u64) -> String {
        let project = WritingProject::blank(default_word_goal);
        let id = project.id.clone();
        info!(id = %id, "Created new project");
        self.adopt(project);
        id
    }

    /// Prepend an externally built project (e.g. a file import) and make it
    /// active. Newest-first ordering comes from construction alone; edits
    /// never re-sort.
    pub fn adopt(&mut self, project: WritingProject) {
        self.active_id = project.id.clone();
        self.projects.insert(0, project);
    }

    /// Delete a project. A no-op when it is the sole project or the id is
    /// unknown; when the deleted project was active, activation falls to the
    /// new first element.
    pub fn delete(&mut self, id: &str) -> bool {
        if self.projects.len() <= 1 {
            debug!("Ignoring delete of the sole remaining project");
            return false;
        }
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            warn!(id = %id, "Delete requested for unknown project");
            return false;
        }
        if self.active_id == id {
            self.active_id = self.projects[0].id.clone();
            debug!(active = %self.active_id, "Active project deleted; activated first");
        }
        info!(id = %id, remaining = self.projects.len(), "Deleted project");
        true
    }

    /// Merge a partial update into a project and stamp `updated_at`.
    pub fn update(&mut self, id: &str, patch: ProjectPatch) -> bool {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            warn!(id = %id, "Update requested for unknown project");
            return false;
        };
        if let Some(title) = patch.title {
            project.title = title;
        }
        if let Some(content) = patch.content {
            project.content = content;
        }
        if let Some(kind) = patch.kind {
            project.kind = kind;
        }
        if let Some(word_goal) = patch.word_goal {
            project.word_goal = Some(word_goal);
        }
        project.touch();
        true
    }

    /// Empty a project's title and content, stamping `updated_at`. The
    /// destructive-action confirmation lives in the front end.
    pub fn clear(&mut self, id: &str) -> bool {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            warn!(id = %id, "Clear requested for unknown project");
            return false;
        };
        project.title.clear();
        project.content.clear();
        project.touch();
        info!(id = %id, "Cleared project title and content");
        true
    }

    /// Switch the active project. Ignored with a warning for unknown ids so
    /// the resolvable-active invariant is preserved at the only write site.
    pub fn set_active(&mut self, id: &str) -> bool {
        if !self.projects.iter().any(|p| p.id == id) {
            warn!(id = %id, "Refusing to activate unknown project");
            return false;
        }
        self.active_id = id.to_string();
        debug!(id = %id, "Switched active project");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::TextKind;

    fn store_with(titles: &[&str]) -> ProjectStore {
        let mut store = ProjectStore::with_default(1000);
        for title in titles {
            let id = store.create(1000);
            store.update(
                &id,
                ProjectPatch {
                    title: Some(title.to_string()),
                    ..ProjectPatch::default()
                },
            );
        }
        store
    }

    #[test]
    fn empty_collection_falls_back_to_the_default_project() {
        let store = ProjectStore::new(Vec::new(), "nope".to_string(), 750);

        assert_eq!(store.len(), 1);
        assert_eq!(store.active().word_goal, Some(750));
    }

    #[test]
    fn create_prepends_and_activates() {
        let mut store = store_with(&[]);

        let id = store.create(1000);

        assert_eq!(store.projects()[0].id, id);
        assert_eq!(store.active_id(), id);
        assert_eq!(store.active().title, "Novo Texto");
    }

    #[test]
    fn deleting_with_more_than_one_project_shrinks_by_exactly_one() {
        let mut store = store_with(&["a", "b", "c"]);
        let before = store.len();
        let victim = store.projects()[2].id.clone();

        assert!(store.delete(&victim));

        assert_eq!(store.len(), before - 1);
        let active = store.active_id().to_string();
        assert!(store.projects().iter().any(|p| p.id == active));
    }

    #[test]
    fn deleting_the_active_project_activates_the_new_first() {
        let mut store = store_with(&["a", "b"]);
        let active = store.active_id().to_string();

        store.delete(&active);

        assert_eq!(store.active_id(), store.projects()[0].id);
        assert_ne!(store.active_id(), active);
    }

    #[test]
    fn deleting_the_sole_project_is_a_no_op() {
        let mut store = store_with(&[]);
        let id = store.active_id().to_string();

        assert!(!store.delete(&id));

        assert_eq!(store.len(), 1);
        assert_eq!(store.active_id(), id);
    }

    #[test]
    fn update_merges_fields_and_stamps_updated_at() {
        let mut store = store_with(&[]);
        let id = store.active_id().to_string();
        let created_at = store.active().created_at;

        store.update(
            &id,
            ProjectPatch {
                title: Some("Conto da tarde".to_string()),
                kind: Some(TextKind::Conto),
                word_goal: Some(2500),
                ..ProjectPatch::default()
            },
        );

        let project = store.active();
        assert_eq!(project.title, "Conto da tarde");
        assert_eq!(project.kind, TextKind::Conto);
        assert_eq!(project.word_goal, Some(2500));
        assert_eq!(project.content, "");
        assert!(project.updated_at >= created_at);
    }

    #[test]
    fn repeated_updates_keep_updated_at_monotonic() {
        let mut store = store_with(&[]);
        let id = store.active_id().to_string();

        for i in 0..5 {
            store.update(
                &id,
                ProjectPatch {
                    content: Some(format!("rascunho {i}")),
                    ..ProjectPatch::default()
                },
            );
            let project = store.active();
            assert!(project.updated_at >= project.created_at);
        }
        assert_eq!(store.active().content, "rascunho 4");
    }

    #[test]
    fn set_active_ignores_unknown_ids() {
        let mut store = store_with(&["a"]);
        let active = store.active_id().to_string();

        assert!(!store.set_active("missing"));

        assert_eq!(store.active_id(), active);
    }

    #[test]
    fn active_falls_back_to_first_when_id_is_stale() {
        let store = ProjectStore::new(
            vec![WritingProject::blank(100), WritingProject::blank(100)],
            "gone".to_string(),
            100,
        );

        assert_eq!(store.active().id, store.projects()[0].id);
    }

    #[test]
    fn clear_empties_title_and_content_only() {
        let mut store = store_with(&[]);
        let id = store.active_id().to_string();
        store.update(
            &id,
            ProjectPatch {
                title: Some("título".to_string()),
                content: Some("conteúdo".to_string()),
                word_goal: Some(42),
                ..ProjectPatch::default()
            },
        );

        store.clear(&id);

        let project = store.active();
        assert_eq!(project.title, "");
        assert_eq!(project.content, "");
        assert_eq!(project.word_goal, Some(42));
    }

    #[test]
    fn identical_titles_are_allowed() {
        let mut store = store_with(&["mesmo título", "mesmo título"]);

        assert_eq!(
            store
                .projects()
                .iter()
                .filter(|p| p.title == "mesmo título")
                .count(),
            2
        );
        let id = store.create(1000);
        assert!(store.set_active(&id));
    }
}
