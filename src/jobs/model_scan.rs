use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Settings;
use crate::db::Database;
use crate::models::{Library, Model, Part};

/// Mesh file patterns, matched case-sensitively against entry names.
/// Hidden entries (leading `.`) never match.
const MESH_PATTERNS: [&str; 2] = ["*.stl", "*.obj"];

/// Subdirectory that is searched in addition to the model directory itself.
const FILES_SUBDIR: &str = "files";

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Model not found: {0}")]
    ModelNotFound(Uuid),

    #[error("Library not found: {0}")]
    LibraryNotFound(Uuid),

    #[error("Failed to read directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Persistence used by [`ModelScanJob`].
pub trait PartStore {
    fn create_part(&self, model_id: Uuid, filename: &str) -> anyhow::Result<Part>;

    fn autogenerate_tags_from_path(
        &self,
        model_id: Uuid,
        new_tag: Option<&str>,
    ) -> anyhow::Result<Vec<String>>;
}

impl PartStore for Database {
    fn create_part(&self, model_id: Uuid, filename: &str) -> anyhow::Result<Part> {
        Database::create_part(self, model_id, filename)
    }

    fn autogenerate_tags_from_path(
        &self,
        model_id: Uuid,
        new_tag: Option<&str>,
    ) -> anyhow::Result<Vec<String>> {
        Database::autogenerate_tags_from_path(self, model_id, new_tag)
    }
}

/// Outcome of a successful scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub model_id: Uuid,
    pub parts: Vec<Part>,
    pub tags: Vec<String>,
}

/// Registers the mesh files of one model as parts, then autogenerates tags.
///
/// Parts are created for every match on every run; running the job twice
/// over the same directory registers each file twice. Errors abort the scan
/// and parts created before the failure are left in place.
pub struct ModelScanJob<'a, S> {
    store: &'a S,
    new_tag: Option<&'a str>,
}

impl<'a, S: PartStore> ModelScanJob<'a, S> {
    pub fn new(store: &'a S, settings: &'a Settings) -> Self {
        Self {
            store,
            new_tag: settings.new_tag(),
        }
    }

    pub fn perform(&self, model: &Model, library: &Library) -> Result<ScanSummary, ScanError> {
        let model_dir = model_directory(library, model);
        tracing::info!("Scanning model {} in {}", model.id, model_dir.display());

        let files = find_mesh_files(&model_dir)?;
        let mut parts = Vec::with_capacity(files.len());
        for file in &files {
            let filename = to_posix(file);
            tracing::debug!("Registering part {} for model {}", filename, model.id);
            parts.push(self.store.create_part(model.id, &filename)?);
        }

        let tags = self
            .store
            .autogenerate_tags_from_path(model.id, self.new_tag)?;

        tracing::info!(
            "Scanned model {}: {} parts, {} tags",
            model.id,
            parts.len(),
            tags.len()
        );

        Ok(ScanSummary {
            model_id: model.id,
            parts,
            tags,
        })
    }
}

/// Load a model and its library, then scan it.
pub fn scan_model(
    db: &Database,
    settings: &Settings,
    model_id: Uuid,
) -> Result<ScanSummary, ScanError> {
    let model = db
        .get_model(model_id)?
        .ok_or(ScanError::ModelNotFound(model_id))?;
    let library = db
        .get_library(model.library_id)?
        .ok_or(ScanError::LibraryNotFound(model.library_id))?;

    ModelScanJob::new(db, settings).perform(&model, &library)
}

/// Absolute directory of a model: `library.path / model.path`.
pub fn model_directory(library: &Library, model: &Model) -> PathBuf {
    Path::new(&library.path).join(&model.path)
}

/// Mesh files under `model_dir`, relative to it.
///
/// Looks at the directory itself and its `files` subdirectory, nothing
/// deeper. Results are grouped by location then pattern (`*.stl` before
/// `*.obj`) and sorted by name within each group. Hidden entries and names
/// that are not valid UTF-8 are skipped. A missing `files` subdirectory is
/// fine; a missing `model_dir` is an error.
pub fn find_mesh_files(model_dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let matchers = MESH_PATTERNS
        .iter()
        .map(|pattern| Glob::new(pattern).map(|glob| glob.compile_matcher()))
        .collect::<Result<Vec<GlobMatcher>, _>>()?;

    let subdir = model_dir.join(FILES_SUBDIR);
    let locations = [
        (model_dir.to_path_buf(), list_entries(model_dir)?),
        (subdir.clone(), list_optional_entries(&subdir)?),
    ];

    let mut found = Vec::new();
    for (dir, entries) in &locations {
        for matcher in &matchers {
            let matches = entries
                .iter()
                .filter(|entry| !entry.starts_with('.') && matcher.is_match(entry.as_str()));
            for entry in matches {
                let path = dir.join(entry);
                let relative = path
                    .strip_prefix(model_dir)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| path.clone());
                found.push(relative);
            }
        }
    }

    Ok(found)
}

fn list_entries(dir: &Path) -> Result<Vec<String>, ScanError> {
    let io_err = |source| ScanError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => tracing::warn!(
                "Skipping non-UTF-8 entry {} in {}",
                raw.to_string_lossy(),
                dir.display()
            ),
        }
    }
    names.sort();
    Ok(names)
}

fn list_optional_entries(dir: &Path) -> Result<Vec<String>, ScanError> {
    if dir.is_dir() {
        list_entries(dir)
    } else {
        Ok(Vec::new())
    }
}

/// Render a relative path with `/` separators.
fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
