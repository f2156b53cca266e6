use crate::storage::{Error, JsonRegistry, Record, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::fs;
use tracing::{debug, instrument};

/// Lifecycle status shared by projects and groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => write!(f, "active"),
            Status::Inactive => write!(f, "inactive"),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            other => Err(format!("unknown status '{}' (expected 'active' or 'inactive')", other)),
        }
    }
}

/// A registered project: one record per materialized project directory.
///
/// Removing the record does not touch the directory, and `group_id` is a
/// plain reference without integrity enforcement; deleting a group leaves
/// member projects pointing at the dead id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    /// ISO-8601 date the project was started.
    #[serde(default)]
    pub start_date: String,
    /// ISO-8601 date the project ended, or empty while ongoing.
    #[serde(default)]
    pub end_date: String,
    /// Id of the owning group, `0` when unassigned.
    #[serde(default)]
    pub group_id: u32,
}

impl Record for Project {
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

/// Registry of [`Project`] records, specialized over [`JsonRegistry`] with
/// project-specific validation and first-run provisioning.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    registry: JsonRegistry<Project>,
    bundled: Option<PathBuf>,
}

impl ProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProjectStore {
            registry: JsonRegistry::new(path),
            bundled: None,
        }
    }

    /// Sets a bundled default registry file copied on first run when the
    /// backing file does not exist yet.
    pub fn with_bundled_default(mut self, bundled: impl Into<PathBuf>) -> Self {
        self.bundled = Some(bundled.into());
        self
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        self.registry.path()
    }

    /// Copies the bundled default over a missing backing file. Best-effort:
    /// an absent bundle or a failed copy is logged and ignored, since an
    /// empty registry is a valid starting state.
    #[instrument(skip(self), fields(path = %self.registry.path().display()))]
    pub async fn ensure_exists(&self) {
        let Some(bundled) = self.bundled.as_deref() else {
            return;
        };
        if fs::try_exists(self.registry.path()).await.unwrap_or(false) {
            return;
        }
        match fs::copy(bundled, self.registry.path()).await {
            Ok(_) => debug!("Provisioned project registry from {}", bundled.display()),
            Err(e) => debug!("Skipping project registry provisioning: {}", e),
        }
    }

    /// Loads all projects; missing or corrupt files load as empty.
    pub async fn list(&self) -> Vec<Project> {
        self.registry.load().await
    }

    /// Overwrites the registry with the given list.
    pub async fn save(&self, projects: &[Project]) -> Result<()> {
        self.registry.save(projects).await
    }

    /// Registers a new project, with `start_date` defaulting to today.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::EmptyField`] for a blank name and
    /// [`Error::DuplicateName`] when a project with the same name exists;
    /// nothing is written in either case.
    pub async fn add(
        &self,
        name: &str,
        description: &str,
        status: Status,
        group_id: u32,
    ) -> Result<Project> {
        if name.trim().is_empty() {
            return Err(Error::EmptyField("Project name"));
        }
        let project = Project {
            id: 0, // assigned by the registry
            name: name.to_string(),
            description: description.to_string(),
            status,
            start_date: chrono::Local::now().date_naive().to_string(),
            end_date: String::new(),
            group_id,
        };
        self.registry.insert(project).await
    }

    /// Replaces the stored project with the same id after validating its
    /// date fields.
    pub async fn update(&self, project: Project) -> Result<()> {
        if project.name.trim().is_empty() {
            return Err(Error::EmptyField("Project name"));
        }
        validate_date(&project.start_date)?;
        validate_date(&project.end_date)?;
        self.registry.update(project).await
    }

    /// Removes the project record with the given id (idempotent). The
    /// project's directory on disk is left untouched.
    pub async fn remove(&self, id: u32) -> Result<()> {
        self.registry.remove(id).await
    }
}

/// Validates an ISO-8601 (`YYYY-MM-DD`) date field. Empty values are valid;
/// an end date stays blank while a project is ongoing.
pub fn validate_date(value: &str) -> Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| Error::InvalidDate(value.to_string()))
}
