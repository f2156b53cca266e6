use crate::storage::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument, warn};

/// A record that can live in a [`JsonRegistry`]: it carries an integer id
/// assigned by the registry and a name that must be unique within the file.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    fn id(&self) -> u32;
    fn set_id(&mut self, id: u32);
    fn name(&self) -> &str;
}

/// A durable mapping from integer id to record, backed by a single JSON
/// array file.
///
/// Every operation goes straight to disk: loads re-read the file and
/// mutations rewrite it whole. That makes redundant I/O the price of always
/// observing the latest persisted state, which is acceptable for a local,
/// low-frequency registry.
///
/// Missing or unreadable files are not errors on the read path; they load as
/// an empty registry so the application stays usable after external
/// corruption of a registry file.
#[derive(Debug, Clone)]
pub struct JsonRegistry<R> {
    path: PathBuf,
    _record: PhantomData<R>,
}

impl<R: Record> JsonRegistry<R> {
    /// Creates a registry bound to the given backing file. The file does not
    /// need to exist yet; it is created on the first mutation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonRegistry {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all records from the backing file.
    ///
    /// Soft-fails to an empty list on a missing file, unreadable file, or
    /// parse failure. Parse failures are logged as warnings since they
    /// usually mean the file was hand-edited into an invalid state.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> Vec<R> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Registry file not found, loading empty registry");
                return Vec::new();
            }
            Err(e) => {
                warn!("Failed to read registry file '{}': {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_slice(&content) {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to parse registry file '{}': {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Serializes the full record list, overwriting the backing file.
    ///
    /// The whole-file replace is the atomicity unit; an interrupted write can
    /// corrupt the file, which the soft-failing [`load`](Self::load) then
    /// treats as empty.
    #[instrument(skip(self, records), fields(path = %self.path.display()))]
    pub async fn save(&self, records: &[R]) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, content).await.map_err(Error::Io)?;
        debug!("Saved {} records", records.len());
        Ok(())
    }

    /// Returns the next free id: `1` for an empty registry, otherwise one
    /// past the highest id ever assigned. Deleted ids are never reused.
    pub fn next_id(records: &[R]) -> u32 {
        records.iter().map(Record::id).max().map_or(1, |max| max + 1)
    }

    /// Appends a new record, assigning it the next free id.
    ///
    /// Fails with [`Error::DuplicateName`] when any existing record already
    /// has the same name (exact, case-sensitive match); nothing is written
    /// in that case. Returns the record as persisted, id included.
    pub async fn insert(&self, mut record: R) -> Result<R> {
        let mut records = self.load().await;

        if records.iter().any(|r| r.name() == record.name()) {
            return Err(Error::DuplicateName(record.name().to_string()));
        }

        record.set_id(Self::next_id(&records));
        records.push(record.clone());
        self.save(&records).await?;
        Ok(record)
    }

    /// Replaces the stored record with the same id, preserving its position
    /// in the file.
    ///
    /// Fails with [`Error::NotFound`] when no record has the given id.
    pub async fn update(&self, record: R) -> Result<()> {
        let mut records = self.load().await;

        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => return Err(Error::NotFound(record.id())),
        }
        self.save(&records).await
    }

    /// Removes the record with the given id, if present. Removal is
    /// idempotent: a missing id is not an error.
    pub async fn remove(&self, id: u32) -> Result<()> {
        let mut records = self.load().await;
        records.retain(|r| r.id() != id);
        self.save(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestRecord {
        #[serde(default)]
        id: u32,
        name: String,
    }

    impl TestRecord {
        fn named(name: &str) -> Self {
            TestRecord { id: 0, name: name.to_string() }
        }
    }

    impl Record for TestRecord {
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

    fn registry_in(dir: &Path) -> JsonRegistry<TestRecord> {
        JsonRegistry::new(dir.join("records.json"))
    }

    #[tokio::test]
    async fn load_missing_file_yields_empty_registry() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());
        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn load_corrupt_file_yields_empty_registry() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());
        fs::write(registry.path(), "{ not json ]").await.unwrap();
        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());

        let alpha = registry.insert(TestRecord::named("Alpha")).await.unwrap();
        let beta = registry.insert(TestRecord::named("Beta")).await.unwrap();
        assert_eq!(alpha.id, 1);
        assert_eq!(beta.id, 2);
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_name() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());

        registry.insert(TestRecord::named("Alpha")).await.unwrap();
        let err = registry.insert(TestRecord::named("Alpha")).await;
        assert!(matches!(err, Err(Error::DuplicateName(name)) if name == "Alpha"));

        // Name matching is case-sensitive; a different casing is a new record.
        registry.insert(TestRecord::named("alpha")).await.unwrap();
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reassigned() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());

        registry.insert(TestRecord::named("Alpha")).await.unwrap();
        let beta = registry.insert(TestRecord::named("Beta")).await.unwrap();
        registry.remove(1).await.unwrap();

        let gamma = registry.insert(TestRecord::named("Gamma")).await.unwrap();
        assert_eq!(beta.id, 2);
        assert_eq!(gamma.id, 3, "id 1 must not be reused after deletion");
    }

    #[tokio::test]
    async fn update_replaces_record_in_place() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());

        registry.insert(TestRecord::named("Alpha")).await.unwrap();
        registry.insert(TestRecord::named("Beta")).await.unwrap();

        registry
            .update(TestRecord { id: 1, name: "Alpha Prime".to_string() })
            .await
            .unwrap();

        let records = registry.load().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Alpha Prime", "position must be preserved");
        assert_eq!(records[1].name, "Beta");
    }

    #[tokio::test]
    async fn update_unknown_id_fails() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());

        let err = registry.update(TestRecord { id: 7, name: "Ghost".to_string() }).await;
        assert!(matches!(err, Err(Error::NotFound(7))));
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());

        registry.insert(TestRecord::named("Alpha")).await.unwrap();
        registry.remove(1).await.unwrap();
        registry.remove(1).await.unwrap(); // absent id is not an error
        assert!(registry.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let registry = registry_in(dir.path());

        let records = vec![
            TestRecord { id: 1, name: "Alpha".to_string() },
            TestRecord { id: 5, name: "Beta".to_string() },
        ];
        registry.save(&records).await.unwrap();
        assert_eq!(registry.load().await, records);
    }
}
