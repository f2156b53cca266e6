use crate::storage::{Error, Result, TEMPLATE_FILENAME, normalize_path};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

/// Placement policy for a template item when a sync directory is active.
///
/// `Manual` items materialize under the project's parent directory; `Auto`
/// items materialize inside the sync directory, with a link left at the
/// equivalent parent-side path. Without a distinct sync directory the
/// attribute has no effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    #[default]
    Manual,
    Auto,
}

/// A file entry in the template. Leaf only; lives in a folder's file list or
/// the template root's top-level file list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureFile {
    /// File name including extension.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub attribute: Attribute,
    /// Initial content written at instantiation; `None` creates an empty file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A folder node in the template tree. Depth is unbounded; cycles cannot
/// occur because nodes are deserialized from a tree-shaped document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub attribute: Attribute,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub folders: Vec<StructureNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<StructureFile>,
}

/// The root structure template document, persisted as a single JSON object.
///
/// Sibling name uniqueness is a convention maintained by the editing
/// frontend, not enforced by this format; a hand-edited document with
/// duplicate siblings instantiates with merge-on-create semantics (directory
/// creation is idempotent, a later file overwrites an earlier one).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureTemplate {
    #[serde(default)]
    pub folders: Vec<StructureNode>,
    #[serde(default)]
    pub files: Vec<StructureFile>,
    /// Directory project trees are created under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_directory: Option<String>,
    /// Directory `auto` items are created in; unset or equal to the parent
    /// directory disables split placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_directory: Option<String>,
}

impl StructureTemplate {
    /// Returns true if any item anywhere in the template is tagged `auto`.
    ///
    /// The instantiation engine uses this to avoid creating a sync directory
    /// that would end up unused.
    pub fn has_auto_items(&self) -> bool {
        self.files.iter().any(|f| f.attribute == Attribute::Auto)
            || nodes_have_auto(&self.folders)
    }
}

fn nodes_have_auto(nodes: &[StructureNode]) -> bool {
    nodes.iter().any(|node| {
        node.attribute == Attribute::Auto
            || node.files.iter().any(|f| f.attribute == Attribute::Auto)
            || nodes_have_auto(&node.folders)
    })
}

/// Manages the structure template document on disk, including first-run
/// provisioning and the configured parent/sync directory fields.
///
/// All configuration lives in the template document itself; this store holds
/// only the backing file path, the fallback root for unset directory fields,
/// and an optional bundled default used for provisioning. No process-wide
/// state is involved.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    path: PathBuf,
    default_root: PathBuf,
    bundled: Option<PathBuf>,
}

impl TemplateStore {
    /// Creates a store bound to the given template file. `default_root` is
    /// returned by the directory accessors when the corresponding field is
    /// unset or blank (conventionally the application's own directory).
    pub fn new(path: impl Into<PathBuf>, default_root: impl Into<PathBuf>) -> Self {
        TemplateStore {
            path: path.into(),
            default_root: default_root.into(),
            bundled: None,
        }
    }

    /// Sets a bundled default template used as the first fallback source
    /// during provisioning.
    pub fn with_bundled_default(mut self, bundled: impl Into<PathBuf>) -> Self {
        self.bundled = Some(bundled.into());
        self
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensures a usable template file exists, provisioning it when needed.
    ///
    /// Fallback sources are searched in order: the bundled default, then a
    /// copy left in the OS temp directory under the template file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingTemplate`] when the file does not exist and no
    /// fallback source is available, and [`Error::EmptyTemplate`] when the
    /// file exists but is zero-length and no fallback source is available.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn ensure_exists(&self) -> Result<()> {
        match fs::metadata(&self.path).await {
            Ok(meta) if meta.len() == 0 => {
                debug!("Template file is empty, searching fallback sources");
                self.restore_from_fallback(Error::EmptyTemplate(self.path.clone()))
                    .await
            }
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Template file not found, searching fallback sources");
                self.restore_from_fallback(Error::MissingTemplate(self.path.clone()))
                    .await
            }
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Copies the first available fallback source over the backing file, or
    /// fails with the provided provisioning error when none exists.
    async fn restore_from_fallback(&self, otherwise: Error) -> Result<()> {
        let temp_copy = std::env::temp_dir().join(
            self.path
                .file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new(TEMPLATE_FILENAME)),
        );

        for source in [self.bundled.as_deref(), Some(&*temp_copy)].into_iter().flatten() {
            if fs::try_exists(source).await.map_err(Error::Io)? {
                debug!("Provisioning template from {}", source.display());
                fs::copy(source, &self.path).await.map_err(Error::Io)?;
                return Ok(());
            }
        }
        Err(otherwise)
    }

    /// Loads and parses the template document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateParse`] for malformed JSON, or an I/O error
    /// if the file cannot be read.
    pub async fn load(&self) -> Result<StructureTemplate> {
        let content = fs::read(&self.path).await.map_err(Error::Io)?;
        serde_json::from_slice(&content).map_err(|e| Error::TemplateParse {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Loads the template, degrading to an empty template on any failure.
    ///
    /// Used in contexts where a broken template file must not abort the
    /// operation, such as reading the configured directories.
    pub async fn load_or_default(&self) -> StructureTemplate {
        match self.load().await {
            Ok(template) => template,
            Err(e) => {
                warn!("Falling back to empty template: {}", e);
                StructureTemplate::default()
            }
        }
    }

    /// Serializes the template with 4-space indentation and stable field
    /// order, overwriting the backing file. The wide indentation keeps the
    /// document readable in the raw-JSON editing view.
    #[instrument(skip(self, template), fields(path = %self.path.display()))]
    pub async fn save(&self, template: &StructureTemplate) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        template.serialize(&mut serializer)?;
        fs::write(&self.path, buf).await.map_err(Error::Io)?;
        debug!("Template saved");
        Ok(())
    }

    /// Returns the configured parent directory, normalized. Falls back to
    /// the store's default root when the field is unset or blank, or when
    /// the template cannot be read.
    pub async fn parent_directory(&self) -> PathBuf {
        let template = self.load_or_default().await;
        configured_dir(template.parent_directory.as_deref(), &self.default_root)
    }

    /// Persists a new parent directory into the template document.
    pub async fn set_parent_directory(&self, path: &Path) -> Result<()> {
        let mut template = self.load().await?;
        template.parent_directory = Some(normalize_path(path).to_string_lossy().into_owned());
        self.save(&template).await
    }

    /// Returns the configured sync directory, normalized, with the same
    /// fallback behavior as [`parent_directory`](Self::parent_directory).
    pub async fn sync_directory(&self) -> PathBuf {
        let template = self.load_or_default().await;
        configured_dir(template.sync_directory.as_deref(), &self.default_root)
    }

    /// Persists a new sync directory into the template document.
    pub async fn set_sync_directory(&self, path: &Path) -> Result<()> {
        let mut template = self.load().await?;
        template.sync_directory = Some(normalize_path(path).to_string_lossy().into_owned());
        self.save(&template).await
    }
}

fn configured_dir(value: Option<&str>, default_root: &Path) -> PathBuf {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(dir) => normalize_path(Path::new(dir)),
        None => default_root.to_path_buf(),
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> TemplateStore {
        TemplateStore::new(dir.join(TEMPLATE_FILENAME), dir)
    }

    fn sample_template() -> StructureTemplate {
        StructureTemplate {
            folders: vec![StructureNode {
                name: "src".to_string(),
                comment: Some("source code".to_string()),
                folders: vec![StructureNode {
                    name: "assets".to_string(),
                    attribute: Attribute::Auto,
                    ..Default::default()
                }],
                ..Default::default()
            }],
            files: vec![StructureFile {
                name: "README.md".to_string(),
                content: Some("# New project\n".to_string()),
                ..Default::default()
            }],
            parent_directory: Some("/projects".to_string()),
            sync_directory: None,
        }
    }

    #[tokio::test]
    async fn ensure_exists_fails_when_missing_without_fallback() {
        let dir = tempdir().unwrap();
        // Distinct file name so no stray temp-directory copy can satisfy
        // the fallback search.
        let store = TemplateStore::new(dir.path().join("missing_structure_file.json"), dir.path());

        let result = store.ensure_exists().await;
        assert!(matches!(result, Err(Error::MissingTemplate(_))));
    }

    #[tokio::test]
    async fn ensure_exists_fails_when_empty_without_fallback() {
        let dir = tempdir().unwrap();
        let store = TemplateStore::new(dir.path().join("empty_structure_file.json"), dir.path());
        fs::write(store.path(), "").await.unwrap();

        let result = store.ensure_exists().await;
        assert!(matches!(result, Err(Error::EmptyTemplate(_))));
    }

    #[tokio::test]
    async fn ensure_exists_provisions_from_temp_dir_copy() {
        let dir = tempdir().unwrap();
        let name = format!("foldsmith_test_{}.json", std::process::id());
        let temp_copy = std::env::temp_dir().join(&name);
        fs::write(&temp_copy, r#"{"folders": [], "files": []}"#).await.unwrap();

        let store = TemplateStore::new(dir.path().join(&name), dir.path());
        let result = store.ensure_exists().await;
        fs::remove_file(&temp_copy).await.ok();

        result.unwrap();
        assert!(store.load().await.is_ok());
    }

    #[tokio::test]
    async fn ensure_exists_accepts_present_file() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "{}").await.unwrap();

        store.ensure_exists().await.unwrap();
    }

    #[tokio::test]
    async fn ensure_exists_provisions_from_bundled_default() {
        let dir = tempdir().unwrap();
        let bundled = dir.path().join("bundled.json");
        fs::write(&bundled, r#"{"folders": [], "files": []}"#).await.unwrap();

        let store = store_in(dir.path()).with_bundled_default(&bundled);
        store.ensure_exists().await.unwrap();

        let template = store.load().await.unwrap();
        assert_eq!(template, StructureTemplate::default());
    }

    #[tokio::test]
    async fn ensure_exists_replaces_empty_file_from_bundled_default() {
        let dir = tempdir().unwrap();
        let bundled = dir.path().join("bundled.json");
        fs::write(&bundled, r#"{"folders": [], "files": []}"#).await.unwrap();

        let store = store_in(dir.path()).with_bundled_default(&bundled);
        fs::write(store.path(), "").await.unwrap();
        store.ensure_exists().await.unwrap();

        assert!(store.load().await.is_ok());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let template = sample_template();

        store.save(&template).await.unwrap();
        assert_eq!(store.load().await.unwrap(), template);
    }

    #[tokio::test]
    async fn save_uses_four_space_indentation() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.save(&sample_template()).await.unwrap();
        let raw = fs::read_to_string(store.path()).await.unwrap();
        assert!(raw.contains("\n    \"folders\""), "got:\n{}", raw);
    }

    #[tokio::test]
    async fn load_tolerates_omitted_optional_fields() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(
            store.path(),
            r#"{"folders": [{"name": "docs"}], "files": [{"name": "notes.txt"}]}"#,
        )
        .await
        .unwrap();

        let template = store.load().await.unwrap();
        assert_eq!(template.folders[0].attribute, Attribute::Manual);
        assert_eq!(template.files[0].attribute, Attribute::Manual);
        assert_eq!(template.files[0].content, None);
    }

    #[tokio::test]
    async fn load_fails_on_malformed_json_but_default_degrades() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "{ nope").await.unwrap();

        assert!(matches!(store.load().await, Err(Error::TemplateParse { .. })));
        assert_eq!(store.load_or_default().await, StructureTemplate::default());
    }

    #[tokio::test]
    async fn directory_accessors_fall_back_to_default_root() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), r#"{"folders": [], "files": [], "sync_directory": "  "}"#)
            .await
            .unwrap();

        assert_eq!(store.parent_directory().await, dir.path());
        assert_eq!(store.sync_directory().await, dir.path(), "blank value falls back");
    }

    #[tokio::test]
    async fn set_parent_directory_normalizes_and_persists() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&StructureTemplate::default()).await.unwrap();

        store
            .set_parent_directory(Path::new("/projects/./archive/../active"))
            .await
            .unwrap();

        assert_eq!(store.parent_directory().await, PathBuf::from("/projects/active"));
        let template = store.load().await.unwrap();
        assert_eq!(template.parent_directory.as_deref(), Some("/projects/active"));
    }

    #[test]
    fn has_auto_items_scans_nested_folders_and_files() {
        let mut template = sample_template();
        assert!(template.has_auto_items(), "nested auto folder should be found");

        template.folders[0].folders.clear();
        assert!(!template.has_auto_items());

        template.folders[0].files.push(StructureFile {
            name: "data.bin".to_string(),
            attribute: Attribute::Auto,
            ..Default::default()
        });
        assert!(template.has_auto_items(), "auto file inside a folder should be found");
    }
}
