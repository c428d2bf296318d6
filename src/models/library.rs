use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A collection of models rooted at a filesystem path.
///
/// Model paths are stored relative to the library path, so moving a library
/// only requires updating this one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    pub id: Uuid,
    pub name: String,
    /// Absolute path to the library root on the local file system.
    pub path: String,
    pub created_at: DateTime<Utc>,
}

/// Input for registering a new library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLibraryInput {
    pub name: String,
    pub path: String,
}
