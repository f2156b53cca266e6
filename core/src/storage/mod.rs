//! JSON-backed persistence for structure templates and project registries.
//!
//! This module defines the storage half of the library: the on-disk documents
//! the application reads and writes, and the stores that manage them. There
//! are two storage shapes with different semantics:
//!
//! *   **[`TemplateStore`]:** Manages the single structure template document,
//!     a JSON object describing the folder/file tree to instantiate plus the
//!     configured parent and sync directories. The template is load-bearing:
//!     first-run provisioning ([`TemplateStore::ensure_exists`]) fails hard
//!     when no usable copy can be found, because no project can be created
//!     without it.
//! *   **[`JsonRegistry`]:** A generic registry holding a JSON array of
//!     records with integer ids and unique names. [`ProjectStore`] and
//!     [`GroupStore`] specialize it for [`Project`] and [`ProjectGroup`]
//!     records. Registries are informational, so a missing or corrupt file
//!     degrades to an empty list instead of failing.
//!
//! # Persistence model
//!
//! Each store is bound to one file and rewrites it whole on every mutation.
//! There is no caching between calls and no transaction across files; the
//! design assumes a single local process touching each file at a time.
//! Concurrent external edits surface, at worst, as a parse failure on the
//! next load.
//!
//! All documents are UTF-8 JSON and meant to stay human-editable. Decoding is
//! permissive: optional fields may be omitted by hand-edited documents and
//! fall back to defaults.

pub use self::group::{GroupStore, ProjectGroup};
pub use self::project::{Project, ProjectStore, Status};
pub use self::registry::{JsonRegistry, Record};
pub use self::template::{
    Attribute, StructureFile, StructureNode, StructureTemplate, TemplateStore,
};

mod group;
mod project;
mod registry;
mod template;

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File name of the structure template document.
pub const TEMPLATE_FILENAME: &str = "project_folder_structure.json";
/// File name of the project registry.
pub const PROJECTS_FILENAME: &str = "project_lists.json";
/// File name of the group registry.
pub const GROUPS_FILENAME: &str = "project_groups.json";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Structure template file not found and no fallback copy available: {0}")]
    MissingTemplate(PathBuf),

    #[error("Structure template file is empty and no fallback copy available: {0}")]
    EmptyTemplate(PathBuf),

    #[error("Failed to parse structure template file: {path}")]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Project path already exists: {0}")]
    ProjectPathExists(PathBuf),

    #[error("A record named '{0}' already exists")]
    DuplicateName(String),

    #[error("No record with id {0} found")]
    NotFound(u32),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("Invalid date (expected YYYY-MM-DD): '{0}'")]
    InvalidDate(String),

    #[error("Serialization error")]
    Json(#[from] serde_json::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

// Define a standard Result type for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Normalizes a path lexically: drops `.` components and resolves `..`
/// against preceding normal components, without touching the filesystem.
///
/// Stored parent/sync directory values pass through this before persisting,
/// and the instantiation engine uses it to decide whether the sync directory
/// is distinct from the parent directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
