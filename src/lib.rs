//! Core of the Mesa de Escrita writing desk.
//!
//! The desk pairs a multi-project text workspace with a panel of reference
//! tools (dictionary, rhymes, literary references, spelling review, creative
//! continuation and shelf search), persisted locally with a debounced
//! autosave and mirrored on demand to a remote save endpoint. The UI itself
//! lives elsewhere; the binary speaks line-delimited JSON (`DeskCommand` in,
//! `DeskEvent` out) and the TypeScript bindings for that surface are exported
//! by `export_ts_bindings`.

pub mod advisory;
pub mod autosave;
pub mod config;
pub mod files;
pub mod library;
pub mod metrics;
pub mod project;
pub mod remote;
pub mod session;
pub mod storage;
pub mod store;

use std::fs;
use std::path::Path;
use ts_rs::TS;

fn export_single_type<T: TS + 'static>(out_dir: &Path) -> Result<(), String> {
    T::export_all_to(out_dir).map_err(|err| err.to_string())
}

/// Export the TypeScript bindings for every wire-visible type, replacing any
/// stale `.ts` files in the output directory.
pub fn export_ts_bindings(out_dir: &Path) -> Result<(), String> {
    fs::create_dir_all(out_dir)
        .map_err(|err| format!("Failed to create {}: {err}", out_dir.display()))?;

    for entry in fs::read_dir(out_dir)
        .map_err(|err| format!("Failed to list {}: {err}", out_dir.display()))?
    {
        let entry = entry.map_err(|err| format!("Failed to read entry: {err}"))?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("ts") {
            fs::remove_file(&path)
                .map_err(|err| format!("Failed to remove {}: {err}", path.display()))?;
        }
    }

    export_single_type::<project::TextKind>(out_dir)?;
    export_single_type::<project::WritingProject>(out_dir)?;
    export_single_type::<project::ProjectPatch>(out_dir)?;
    export_single_type::<project::ProjectMetadata>(out_dir)?;
    export_single_type::<metrics::TextMetrics>(out_dir)?;
    export_single_type::<advisory::DictionaryEntry>(out_dir)?;
    export_single_type::<advisory::RhymeKind>(out_dir)?;
    export_single_type::<advisory::Tonicity>(out_dir)?;
    export_single_type::<advisory::RhymeEntry>(out_dir)?;
    export_single_type::<advisory::RhymeSheet>(out_dir)?;
    export_single_type::<advisory::LiteraryReference>(out_dir)?;
    export_single_type::<advisory::ToolState<String>>(out_dir)?;
    export_single_type::<advisory::Tool>(out_dir)?;
    export_single_type::<advisory::PanelSnapshot>(out_dir)?;
    export_single_type::<library::ShelfSource>(out_dir)?;
    export_single_type::<library::ShelfMatch>(out_dir)?;
    export_single_type::<files::ExportFormat>(out_dir)?;
    export_single_type::<session::DeskCommand>(out_dir)?;
    export_single_type::<session::DeskSnapshot>(out_dir)?;
    export_single_type::<session::DeskEvent>(out_dir)?;

    Ok(())
}
