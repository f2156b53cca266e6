use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

/// The artifact a link request actually produced.
///
/// Link support depends on platform and privileges, so creation runs through
/// a fallback chain and reports which strategy succeeded instead of failing
/// the surrounding tree creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A symbolic link was created at the requested path.
    Symlink,
    /// Link creation failed; a `<link>_link.txt` placeholder naming the
    /// intended target was written instead.
    Placeholder,
}

/// Creates a link at `link_path` pointing at `target_path`, degrading
/// through the fallback chain on failure. Never returns an error: the last
/// resort placeholder write is itself best-effort.
pub async fn create_link(link_path: &Path, target_path: &Path) -> LinkOutcome {
    match try_symlink(link_path, target_path).await {
        Ok(()) => {
            debug!(
                "Created symlink {} -> {}",
                link_path.display(),
                target_path.display()
            );
            LinkOutcome::Symlink
        }
        Err(e) => {
            warn!(
                "Failed to create link {} -> {}: {}; writing placeholder",
                link_path.display(),
                target_path.display(),
                e
            );
            write_placeholder(link_path, target_path, &e).await;
            LinkOutcome::Placeholder
        }
    }
}

#[cfg(unix)]
async fn try_symlink(link_path: &Path, target_path: &Path) -> std::io::Result<()> {
    fs::symlink(target_path, link_path).await
}

#[cfg(windows)]
async fn try_symlink(link_path: &Path, target_path: &Path) -> std::io::Result<()> {
    // Directory symlinks need the dedicated call on Windows.
    if fs::metadata(target_path).await?.is_dir() {
        fs::symlink_dir(target_path, link_path).await
    } else {
        fs::symlink_file(target_path, link_path).await
    }
}

/// Writes a plain-text stand-in next to where the link should have been,
/// recording the intended target and the failure. Errors here are only
/// logged; a missing placeholder must not abort the overall tree creation.
async fn write_placeholder(link_path: &Path, target_path: &Path, cause: &std::io::Error) {
    let mut placeholder = link_path.as_os_str().to_os_string();
    placeholder.push("_link.txt");

    let body = format!(
        "Link to: {}\nError creating link: {}\nCheck file permissions and try again.\n",
        target_path.display(),
        cause
    );
    if let Err(e) = fs::write(Path::new(&placeholder), body).await {
        warn!(
            "Failed to write link placeholder '{}': {}",
            Path::new(&placeholder).display(),
            e
        );
    }
}
