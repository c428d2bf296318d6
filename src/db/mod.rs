mod schema;

use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

/// Input that was rejected before touching the database.
///
/// The API layer reports these to clients as-is; every other error is
/// treated as internal.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn invalid(msg: impl Into<String>) -> anyhow::Error {
    ValidationError(msg.into()).into()
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Library operations
    // ============================================================

    pub fn get_all_libraries(&self) -> Result<Vec<Library>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt =
            conn.prepare("SELECT id, name, path, created_at FROM libraries ORDER BY name")?;

        let libraries = stmt
            .query_map([], library_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(libraries)
    }

    pub fn get_library(&self, id: Uuid) -> Result<Option<Library>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let library = conn
            .query_row(
                "SELECT id, name, path, created_at FROM libraries WHERE id = ?",
                [id.to_string()],
                library_from_row,
            )
            .optional()?;
        Ok(library)
    }

    pub fn create_library(&self, input: CreateLibraryInput) -> Result<Library> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(invalid("Library name must not be empty"));
        }
        if !Path::new(&input.path).is_absolute() {
            return Err(invalid("Library path must be absolute"));
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        let taken = conn
            .query_row(
                "SELECT 1 FROM libraries WHERE path = ?",
                [&input.path],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Err(invalid(format!(
                "A library already exists at {}",
                input.path
            )));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO libraries (id, name, path, created_at) VALUES (?, ?, ?, ?)",
            (id.to_string(), &name, &input.path, now.to_rfc3339()),
        )?;

        Ok(Library {
            id,
            name,
            path: input.path,
            created_at: now,
        })
    }

    pub fn delete_library(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM libraries WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Model operations
    // ============================================================

    pub fn get_models_by_library(&self, library_id: Uuid) -> Result<Vec<Model>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, library_id, name, path, license, created_at, updated_at
             FROM models WHERE library_id = ? ORDER BY name, path",
        )?;

        let models = stmt
            .query_map([library_id.to_string()], model_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(models)
    }

    pub fn get_model(&self, id: Uuid) -> Result<Option<Model>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let model = conn
            .query_row(
                "SELECT id, library_id, name, path, license, created_at, updated_at
                 FROM models WHERE id = ?",
                [id.to_string()],
                model_from_row,
            )
            .optional()?;
        Ok(model)
    }

    pub fn create_model(&self, library_id: Uuid, input: CreateModelInput) -> Result<Model> {
        let path = normalize_model_path(&input.path)?;
        let name = match input.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => path.rsplit('/').next().unwrap_or(&path).to_string(),
        };

        self.get_library(library_id)?
            .ok_or_else(|| anyhow::anyhow!("Library not found"))?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO models (id, library_id, name, path, license, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                library_id.to_string(),
                &name,
                &path,
                &input.license,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Model {
            id,
            library_id,
            name,
            path,
            license: input.license,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_model(&self, id: Uuid, input: UpdateModelInput) -> Result<Option<Model>> {
        let Some(existing) = self.get_model(id)? else {
            return Ok(None);
        };

        let name = match input.name {
            Some(name) if name.trim().is_empty() => {
                return Err(invalid("Model name must not be empty"))
            }
            Some(name) => name.trim().to_string(),
            None => existing.name,
        };
        let license = input.license.or(existing.license);

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();

        conn.execute(
            "UPDATE models SET name = ?, license = ?, updated_at = ? WHERE id = ?",
            (&name, &license, now.to_rfc3339(), id.to_string()),
        )?;

        Ok(Some(Model {
            name,
            license,
            updated_at: now,
            ..existing
        }))
    }

    pub fn delete_model(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM models WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// A model together with its library, tags, problems and parts.
    pub fn get_model_detail(&self, id: Uuid) -> Result<Option<ModelDetail>> {
        let Some(model) = self.get_model(id)? else {
            return Ok(None);
        };
        let library = self
            .get_library(model.library_id)?
            .ok_or_else(|| anyhow::anyhow!("Library {} missing for model {}", model.library_id, id))?;

        Ok(Some(ModelDetail {
            tags: self.get_model_tags(id)?,
            problems: self.get_problems(id)?,
            parts: self.get_parts(id)?,
            model,
            library,
        }))
    }

    // ============================================================
    // Tag operations
    // ============================================================

    pub fn get_model_tags(&self, model_id: Uuid) -> Result<Vec<String>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare("SELECT tag FROM model_tags WHERE model_id = ? ORDER BY tag")?;
        let tags = stmt
            .query_map([model_id.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(tags)
    }

    /// Add a tag. Adding a tag the model already has is a no-op.
    pub fn add_model_tag(&self, model_id: Uuid, tag: &str) -> Result<()> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(invalid("Tag must not be empty"));
        }
        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT OR IGNORE INTO model_tags (model_id, tag) VALUES (?, ?)",
            (model_id.to_string(), tag),
        )?;
        Ok(())
    }

    pub fn remove_model_tag(&self, model_id: Uuid, tag: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute(
            "DELETE FROM model_tags WHERE model_id = ? AND tag = ?",
            (model_id.to_string(), tag),
        )?;
        Ok(rows > 0)
    }

    /// Replace the model's tags. Blank entries are dropped.
    pub fn set_model_tags(&self, model_id: Uuid, tags: &[String]) -> Result<Vec<String>> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM model_tags WHERE model_id = ?",
            [model_id.to_string()],
        )?;
        for tag in tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            tx.execute(
                "INSERT OR IGNORE INTO model_tags (model_id, tag) VALUES (?, ?)",
                (model_id.to_string(), tag),
            )?;
        }
        tx.commit()?;
        drop(conn);

        self.get_model_tags(model_id)
    }

    /// Tag a model with the folders its path is nested under, plus `new_tag`.
    ///
    /// Existing tags are kept. Returns the model's full tag list afterwards.
    pub fn autogenerate_tags_from_path(
        &self,
        model_id: Uuid,
        new_tag: Option<&str>,
    ) -> Result<Vec<String>> {
        let model = self
            .get_model(model_id)?
            .ok_or_else(|| anyhow::anyhow!("Model not found"))?;

        let path_tags = model.path_tags();
        for tag in path_tags.iter().map(String::as_str).chain(new_tag) {
            self.add_model_tag(model_id, tag)?;
        }

        self.get_model_tags(model_id)
    }

    // ============================================================
    // Part operations
    // ============================================================

    /// Register a part. There is no uniqueness check on `filename`.
    pub fn create_part(&self, model_id: Uuid, filename: &str) -> Result<Part> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO parts (id, model_id, filename, created_at) VALUES (?, ?, ?, ?)",
            (
                id.to_string(),
                model_id.to_string(),
                filename,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Part {
            id,
            model_id,
            filename: filename.to_string(),
            created_at: now,
        })
    }

    pub fn get_parts(&self, model_id: Uuid) -> Result<Vec<Part>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, model_id, filename, created_at
             FROM parts WHERE model_id = ? ORDER BY filename, rowid",
        )?;

        let parts = stmt
            .query_map([model_id.to_string()], |row| {
                Ok(Part {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    model_id: parse_uuid(row.get::<_, String>(1)?),
                    filename: row.get(2)?,
                    created_at: parse_datetime(row.get::<_, String>(3)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(parts)
    }

    pub fn delete_part(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM parts WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Problem operations
    // ============================================================

    pub fn create_problem(&self, model_id: Uuid, input: CreateProblemInput) -> Result<Problem> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO problems (id, model_id, category, note, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                model_id.to_string(),
                input.category.as_str(),
                &input.note,
                now.to_rfc3339(),
            ),
        )?;

        Ok(Problem {
            id,
            model_id,
            category: input.category,
            note: input.note,
            created_at: now,
        })
    }

    pub fn get_problems(&self, model_id: Uuid) -> Result<Vec<Problem>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, model_id, category, note, created_at
             FROM problems WHERE model_id = ? ORDER BY created_at, rowid",
        )?;

        let problems = stmt
            .query_map([model_id.to_string()], |row| {
                Ok(Problem {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    model_id: parse_uuid(row.get::<_, String>(1)?),
                    category: ProblemCategory::from_str(&row.get::<_, String>(2)?)
                        .unwrap_or(ProblemCategory::Other),
                    note: row.get(3)?,
                    created_at: parse_datetime(row.get::<_, String>(4)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(problems)
    }

    pub fn delete_problem(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM problems WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<data_dir>/modelshelf.db` under the platform data directory.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "modelshelf")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("modelshelf.db"))
}

/// Validate a model path and normalize it to `a/b/c` form.
fn normalize_model_path(path: &str) -> Result<String> {
    let mut parts = Vec::new();
    for component in Path::new(path.trim()).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("Model path must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("Model path must be relative to its library"))
            }
        }
    }
    if parts.is_empty() {
        return Err(invalid("Model path must not be empty"));
    }
    Ok(parts.join("/"))
}

fn library_from_row(row: &Row<'_>) -> rusqlite::Result<Library> {
    Ok(Library {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        path: row.get(2)?,
        created_at: parse_datetime(row.get::<_, String>(3)?),
    })
}

fn model_from_row(row: &Row<'_>) -> rusqlite::Result<Model> {
    Ok(Model {
        id: parse_uuid(row.get::<_, String>(0)?),
        library_id: parse_uuid(row.get::<_, String>(1)?),
        name: row.get(2)?,
        path: row.get(3)?,
        license: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
