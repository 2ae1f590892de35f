//! Import and export of plain-text project files.
//!
//! Import turns a `.txt`/`.md` file into a new project (title from the file
//! name, extension stripped). Export writes the project's content next to a
//! directory chosen by the front end, as plain text or markdown.

use crate::project::WritingProject;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use ts_rs::TS;

/// File stem used when the project has no title.
pub const FALLBACK_STEM: &str = "escrito";

static IMPORT_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(txt|md)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ExportFormat {
    Txt,
    Md,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }
}

/// Read a file into a fresh project. The caller adopts it into the store.
pub fn import_project(path: &Path, word_goal: u64) -> Result<WritingProject> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("Sem título");
    let title = IMPORT_EXTENSION.replace(name, "").to_string();
    info!(path = %path.display(), %title, bytes = content.len(), "Imported file as new project");
    Ok(WritingProject::imported(title, content, word_goal))
}

/// Write the project's content to `<title>.<ext>` under the given directory
/// and return the written path.
pub fn export_project(
    project: &WritingProject,
    dir: &Path,
    format: ExportFormat,
) -> Result<PathBuf> {
    let stem = match project.title.trim() {
        "" => FALLBACK_STEM,
        title => title,
    };
    let path = dir.join(format!("{stem}.{}", format.extension()));
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;
    fs::write(&path, &project.content)
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;
    info!(path = %path.display(), "Exported project content");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_strips_known_extensions_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Crônica da Cidade.MD");
        fs::write(&path, "primeiras linhas").unwrap();

        let project = import_project(&path, 1000).unwrap();

        assert_eq!(project.title, "Crônica da Cidade");
        assert_eq!(project.content, "primeiras linhas");
        assert_eq!(project.word_goal, Some(1000));
    }

    #[test]
    fn import_keeps_unknown_extensions_in_the_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notas.rst");
        fs::write(&path, "corpo").unwrap();

        let project = import_project(&path, 1000).unwrap();

        assert_eq!(project.title, "notas.rst");
    }

    #[test]
    fn import_of_a_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();

        assert!(import_project(&dir.path().join("nada.txt"), 1000).is_err());
    }

    #[test]
    fn export_writes_content_under_the_title() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = WritingProject::blank(1000);
        project.title = "Maré Alta".to_string();
        project.content = "ondas e mais ondas".to_string();

        let path = export_project(&project, dir.path(), ExportFormat::Md).unwrap();

        assert_eq!(path.file_name().unwrap(), "Maré Alta.md");
        assert_eq!(fs::read_to_string(&path).unwrap(), "ondas e mais ondas");
    }

    #[test]
    fn export_of_an_untitled_project_uses_the_fallback_stem() {
        let dir = tempfile::tempdir().unwrap();
        let mut project = WritingProject::blank(1000);
        project.title = "   ".to_string();
        project.content = "conteúdo".to_string();

        let path = export_project(&project, dir.path(), ExportFormat::Txt).unwrap();

        assert_eq!(path.file_name().unwrap(), "escrito.txt");
    }
}
