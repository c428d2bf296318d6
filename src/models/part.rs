use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single mesh file belonging to a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Part {
    pub id: Uuid,
    pub model_id: Uuid,
    /// Path relative to the model directory, always `/`-separated (e.g. `files/mesh.stl`).
    pub filename: String,
    pub created_at: DateTime<Utc>,
}

/// Anything that can be grouped by filename.
pub trait FileRecord {
    fn filename(&self) -> &str;
}

impl FileRecord for Part {
    fn filename(&self) -> &str {
        &self.filename
    }
}

impl<T: FileRecord + ?Sized> FileRecord for &T {
    fn filename(&self) -> &str {
        (**self).filename()
    }
}

impl FileRecord for str {
    fn filename(&self) -> &str {
        self
    }
}

impl FileRecord for String {
    fn filename(&self) -> &str {
        self
    }
}
