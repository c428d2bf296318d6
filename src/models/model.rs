use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Library, Part, Problem};

/// A single 3D-printable object, backed by a directory of files.
///
/// The model directory lives at `library.path / model.path`. Parts are
/// discovered by scanning that directory (see [`crate::jobs::ModelScanJob`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: Uuid,
    pub library_id: Uuid,
    pub name: String,
    /// Directory relative to the library root, `/`-separated.
    pub path: String,
    /// SPDX license identifier, if known.
    pub license: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Folder names the model is nested under, outermost first.
    ///
    /// The model's own folder is not included: a model at
    /// `scifi/ships/cruiser` yields `["scifi", "ships"]`.
    pub fn path_tags(&self) -> Vec<String> {
        let mut components: Vec<&str> = self
            .path
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .collect();
        components.pop();
        components.into_iter().map(str::to_string).collect()
    }
}

/// Input for registering a new model inside a library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModelInput {
    /// Display name. Defaults to the last component of `path`.
    pub name: Option<String>,
    pub path: String,
    pub license: Option<String>,
}

/// Input for updating an existing model. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModelInput {
    pub name: Option<String>,
    pub license: Option<String>,
}

/// Replacement tag set for a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetTagsInput {
    pub tags: Vec<String>,
}

/// A model with everything needed to render its page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDetail {
    #[serde(flatten)]
    pub model: Model,
    pub library: Library,
    pub tags: Vec<String>,
    pub problems: Vec<Problem>,
    pub parts: Vec<Part>,
}

impl ModelDetail {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
