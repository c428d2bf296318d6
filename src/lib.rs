//! ModelShelf: a library manager for 3D-printable model files.
//!
//! Libraries are directories on disk holding one folder per model. Scanning a
//! model registers its STL/OBJ files as parts; the HTTP API exposes the
//! records along with a few rendered HTML fragments.

pub mod api;
pub mod config;
pub mod db;
pub mod helpers;
pub mod i18n;
pub mod jobs;
pub mod models;
