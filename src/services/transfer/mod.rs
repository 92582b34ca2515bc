//! JSON import and export of whole planner documents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;

use crate::models::document::Document;
use crate::services::migration::{is_truthy, migrate, MigrationContext};
use crate::services::planner::{Planner, PlannerError};
use crate::services::storage::KeyValueStore;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("import file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid planner file: expected an object with a month")]
    InvalidFile,
    #[error("failed to save imported planner: {0}")]
    Save(#[from] PlannerError),
}

/// File name an export of `doc` is written under.
pub fn export_file_name(doc: &Document) -> String {
    format!("planner-{}.json", doc.month)
}

/// Writes `doc` as pretty JSON into `dir` and returns the file path.
pub fn export_document(doc: &Document, dir: &Path) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create dir {}", dir.display()))?;
    let path = dir.join(export_file_name(doc));
    let data = serde_json::to_string_pretty(doc)?;
    fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Exported {} to {}", doc.month, path.display());
    Ok(path)
}

/// Validates and migrates an import payload without touching any planner.
pub fn parse_import(text: &str, ctx: &MigrationContext) -> Result<Document, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let has_month = value
        .as_object()
        .and_then(|map| map.get("month"))
        .is_some_and(is_truthy);
    if !has_month {
        return Err(ImportError::InvalidFile);
    }
    migrate(Some(value), ctx).ok_or(ImportError::InvalidFile)
}

/// Reads `path`, and on success replaces the planner's document with it.
/// On any error the active document is left unchanged.
pub fn import_file<S: KeyValueStore>(
    planner: &mut Planner<S>,
    path: &Path,
) -> Result<(), ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_import(&text, planner.context())?;
    log::info!(
        "Importing {} ({} columns, {} events) from {}",
        doc.month,
        doc.columns.len(),
        doc.events.len(),
        path.display()
    );
    planner.replace_document(doc)?;
    Ok(())
}
