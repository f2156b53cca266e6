//! Instantiation of structure templates into real directory trees.
//!
//! [`create_project_folders`] is the core operation of the library: it takes
//! a [`StructureTemplate`] and a destination path and materializes every
//! folder and file the template describes.
//!
//! # Placement modes
//!
//! *   **Legacy mode** — no sync path is given, or it normalizes to the same
//!     path as the destination. The entire tree is created under the
//!     destination and item attributes are ignored.
//! *   **Split mode** — a distinct sync path is given. `manual` items are
//!     created under the destination as usual; `auto` items are created
//!     inside the sync directory, with a link left at the equivalent
//!     destination-side path. Children of an `auto` folder nest entirely
//!     within the sync tree. The sync root itself is only created when the
//!     template actually contains at least one `auto` item.
//!
//! Link creation degrades through a fallback chain (see [`link`]) and never
//! aborts tree creation.
//!
//! # Guarantees
//!
//! The operation is not transactional: a fatal error partway through leaves
//! a partially created tree for the operator to retry or clean up. Directory
//! creation is idempotent, and a duplicate file name simply overwrites the
//! earlier file (merge-on-create).

pub use self::link::LinkOutcome;

mod link;

use crate::storage::{
    Attribute, Error, Result, StructureFile, StructureNode, StructureTemplate, normalize_path,
};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Materializes `template` at `parent_path`, placing `auto` items under
/// `sync_path` when one is given and distinct from the parent.
///
/// # Errors
///
/// Fails with [`Error::ProjectPathExists`] before any mutation when
/// `parent_path` already exists. Filesystem errors (permissions, full disk)
/// propagate and abort remaining work with the partial tree retained.
#[instrument(skip_all, fields(parent = %parent_path.display()))]
pub async fn create_project_folders(
    parent_path: &Path,
    template: &StructureTemplate,
    sync_path: Option<&Path>,
) -> Result<()> {
    if fs::try_exists(parent_path).await.map_err(Error::Io)? {
        return Err(Error::ProjectPathExists(parent_path.to_path_buf()));
    }

    let distinct_sync = sync_path.filter(|s| normalize_path(s) != normalize_path(parent_path));

    // The sync directory would sit unused without any auto item, so it is
    // only created (and split placement only activated) when one exists.
    let active_sync = distinct_sync.filter(|_| template.has_auto_items());

    fs::create_dir_all(parent_path).await.map_err(Error::Io)?;
    if let Some(sync) = active_sync {
        fs::create_dir_all(sync).await.map_err(Error::Io)?;
    }

    create_folder_items(parent_path, active_sync, &template.folders).await?;
    create_file_items(parent_path, active_sync, &template.files).await?;

    debug!("Project tree created");
    Ok(())
}

/// Depth-first walk over folder nodes, threading the current parent-side and
/// sync-side directories explicitly.
///
/// A `manual` node materializes under `parent` only; the sync-side path is
/// carried along mirrored (`sync/<name>`) but not created, so an `auto`
/// descendant resolves to the equivalent position in the sync tree without
/// the sync tree accumulating empty manual directories. An `auto` node
/// materializes under `sync`, leaves a link at the parent-side path, and
/// recurses with both paths set to the sync-side directory: its subtree
/// never fans out back to the parent tree.
fn create_folder_items<'a>(
    parent: &'a Path,
    sync: Option<&'a Path>,
    nodes: &'a [StructureNode],
) -> BoxFuture<'a, Result<()>> {
    async move {
        for node in nodes {
            match (node.attribute, sync) {
                (Attribute::Auto, Some(sync_dir)) => {
                    let real_dir = sync_dir.join(&node.name);
                    fs::create_dir_all(&real_dir).await.map_err(Error::Io)?;
                    // Inside an auto subtree both sides coincide; a link
                    // would only point at itself.
                    if parent != sync_dir {
                        link::create_link(&parent.join(&node.name), &real_dir).await;
                    }
                    create_folder_items(&real_dir, Some(&real_dir), &node.folders).await?;
                    create_file_items(&real_dir, Some(&real_dir), &node.files).await?;
                }
                _ => {
                    let dir = parent.join(&node.name);
                    fs::create_dir_all(&dir).await.map_err(Error::Io)?;
                    let child_sync = sync.map(|s| s.join(&node.name));
                    create_folder_items(&dir, child_sync.as_deref(), &node.folders).await?;
                    create_file_items(&dir, child_sync.as_deref(), &node.files).await?;
                }
            }
        }
        Ok(())
    }
    .boxed()
}

/// Creates the file entries of one folder level. An `auto` file (with split
/// placement active) is written under the sync side and linked from the
/// parent side; everything else is written in place.
async fn create_file_items(
    parent: &Path,
    sync: Option<&Path>,
    files: &[StructureFile],
) -> Result<()> {
    for file in files {
        match (file.attribute, sync) {
            (Attribute::Auto, Some(sync_dir)) => {
                // The mirrored sync-side directory only materializes once an
                // auto item actually lands in it.
                fs::create_dir_all(sync_dir).await.map_err(Error::Io)?;
                let real_file = sync_dir.join(&file.name);
                fs::write(&real_file, file.content.as_deref().unwrap_or(""))
                    .await
                    .map_err(Error::Io)?;
                if parent != sync_dir {
                    link::create_link(&parent.join(&file.name), &real_file).await;
                }
            }
            _ => {
                fs::write(parent.join(&file.name), file.content.as_deref().unwrap_or(""))
                    .await
                    .map_err(Error::Io)?;
            }
        }
    }
    Ok(())
}
