//! Durable storage slots for the project collection.
//!
//! Two JSON slots live under the data directory: the current schema
//! (`mesa_escrita_data_v2.json`, an array of projects) and a legacy slot
//! (`mesa_escrita_data.json`, a single project object) that is read exactly
//! once as a migration fallback and never written or deleted. Load failures
//! of any kind fall through to the next source; the built-in default project
//! backs everything. Save failures are logged and swallowed so the in-memory
//! store stays authoritative for the session.

use crate::project::WritingProject;
use crate::store::ProjectStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CURRENT_SLOT: &str = "mesa_escrita_data_v2.json";
pub const LEGACY_SLOT: &str = "mesa_escrita_data.json";

pub fn current_slot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CURRENT_SLOT)
}

pub fn legacy_slot_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LEGACY_SLOT)
}

/// Load the project store: current slot, then legacy slot, then the built-in
/// default. The first element of whatever loads becomes active.
pub fn load_store(data_dir: &Path, default_word_goal: u64) -> ProjectStore {
    if let Some(projects) = read_current_slot(&current_slot_path(data_dir)) {
        let active_id = projects[0].id.clone();
        info!(count = projects.len(), "Loaded project collection");
        return ProjectStore::new(projects, active_id, default_word_goal);
    }

    if let Some(project) = read_legacy_slot(&legacy_slot_path(data_dir)) {
        info!(id = %project.id, "Adopted legacy single-project slot");
        let active_id = project.id.clone();
        return ProjectStore::new(vec![project], active_id, default_word_goal);
    }

    info!("No stored projects; starting with the default project");
    ProjectStore::with_default(default_word_goal)
}

fn read_current_slot(path: &Path) -> Option<Vec<WritingProject>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), "Current slot unavailable: {err}");
            return None;
        }
    };
    match serde_json::from_str::<Vec<WritingProject>>(&data) {
        Ok(projects) if !projects.is_empty() => Some(projects),
        Ok(_) => {
            warn!(path = %path.display(), "Current slot holds an empty collection; ignoring");
            None
        }
        Err(err) => {
            warn!(path = %path.display(), "Unparseable current slot; ignoring: {err}");
            None
        }
    }
}

fn read_legacy_slot(path: &Path) -> Option<WritingProject> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), "Legacy slot unavailable: {err}");
            return None;
        }
    };
    match serde_json::from_str::<WritingProject>(&data) {
        Ok(project) => Some(project),
        Err(err) => {
            warn!(path = %path.display(), "Unparseable legacy slot; ignoring: {err}");
            None
        }
    }
}

/// Overwrite the current slot with the whole collection. Errors are logged
/// and swallowed; persistence must never take the desk down.
pub fn save_projects(path: &Path, projects: &[WritingProject]) {
    let payload = match serde_json::to_string(projects) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("Failed to serialize project collection: {err}");
            return;
        }
    };
    write_payload(path, &payload);
}

/// Write an already-serialized collection to a slot, swallowing errors.
pub fn write_payload(path: &Path, payload: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match fs::write(path, payload) {
        Ok(()) => debug!(path = %path.display(), bytes = payload.len(), "Persisted projects"),
        Err(err) => warn!(path = %path.display(), "Failed to persist projects: {err}"),
    }
}
