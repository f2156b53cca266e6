use std::path::{Path, PathBuf};

use foldsmith_core::storage::{
    GROUPS_FILENAME, GroupStore, PROJECTS_FILENAME, ProjectStore, TEMPLATE_FILENAME, TemplateStore,
};

pub mod cli;
pub mod commands;

/// Shared handles to the three stores, all rooted in one data directory.
pub struct AppContext {
    pub templates: TemplateStore,
    pub projects: ProjectStore,
    pub groups: GroupStore,
}

impl AppContext {
    /// Builds the stores against `data_dir`, which also serves as the
    /// fallback root for an unset parent/sync directory.
    pub fn new(data_dir: &Path) -> Self {
        AppContext {
            templates: TemplateStore::new(data_dir.join(TEMPLATE_FILENAME), data_dir),
            projects: ProjectStore::new(data_dir.join(PROJECTS_FILENAME)),
            groups: GroupStore::new(data_dir.join(GROUPS_FILENAME)),
        }
    }
}

/// Resolves the data directory: an explicit flag wins, otherwise the
/// directory containing the executable, otherwise the working directory.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
