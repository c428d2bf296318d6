//! Domain models for ModelShelf.
//!
//! # Core Concepts
//!
//! - [`Library`]: A collection of models rooted at an absolute filesystem path.
//! - [`Model`]: One 3D-printable object, backed by a directory inside its library.
//!   Models carry free-text tags and may have [`Problem`]s flagged against them.
//! - [`Part`]: A single mesh file (STL/OBJ) belonging to a model, stored as a path
//!   relative to the model directory.
//! - [`Problem`]: A validation or integrity issue flagged against a model.

mod library;
mod model;
mod part;
mod problem;

pub use library::*;
pub use model::*;
pub use part::*;
pub use problem::*;
