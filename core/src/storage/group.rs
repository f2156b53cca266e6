use crate::storage::{Error, JsonRegistry, Record, Result, Status};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A named group projects can be assigned to via [`Project::group_id`].
///
/// [`Project::group_id`]: crate::storage::Project::group_id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectGroup {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
}

impl Record for ProjectGroup {
    fn id(&self) -> u32 {
        self.id
    }
    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of [`ProjectGroup`] records. Same id and name-uniqueness
/// discipline as [`ProjectStore`], without dates or provisioning.
///
/// [`ProjectStore`]: crate::storage::ProjectStore
#[derive(Debug, Clone)]
pub struct GroupStore {
    registry: JsonRegistry<ProjectGroup>,
}

impl GroupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GroupStore {
            registry: JsonRegistry::new(path),
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        self.registry.path()
    }

    /// Loads all groups; missing or corrupt files load as empty.
    pub async fn list(&self) -> Vec<ProjectGroup> {
        self.registry.load().await
    }

    /// Overwrites the registry with the given list.
    pub async fn save(&self, groups: &[ProjectGroup]) -> Result<()> {
        self.registry.save(groups).await
    }

    /// Registers a new group.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyField`] for a blank name and
    /// [`Error::DuplicateName`] when a group with the same name exists.
    pub async fn add(&self, name: &str, description: &str, status: Status) -> Result<ProjectGroup> {
        if name.trim().is_empty() {
            return Err(Error::EmptyField("Group name"));
        }
        let group = ProjectGroup {
            id: 0, // assigned by the registry
            name: name.to_string(),
            description: description.to_string(),
            status,
        };
        self.registry.insert(group).await
    }

    /// Replaces the stored group with the same id.
    pub async fn update(&self, group: ProjectGroup) -> Result<()> {
        if group.name.trim().is_empty() {
            return Err(Error::EmptyField("Group name"));
        }
        self.registry.update(group).await
    }

    /// Removes the group with the given id (idempotent). Member projects are
    /// not updated; their `group_id` keeps pointing at the removed id.
    pub async fn remove(&self, id: u32) -> Result<()> {
        self.registry.remove(id).await
    }
}
