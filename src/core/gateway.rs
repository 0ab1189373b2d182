//! File gateway: the host-filesystem boundary the repository talks through
//!
//! The repository never touches `std::fs` directly. Everything goes through
//! the [`FileGateway`] trait so tests can point it at a scratch directory and
//! the save-with-rename primitive stays in one place.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;
use walkdir::WalkDir;

use super::note::file_stem;

/// Errors crossing the gateway boundary
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("i/o failure on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A note file as listed from the save directory
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// File name including extension
    pub name: String,
    /// Full path
    pub path: PathBuf,
    /// Base name without extension; doubles as the note id
    pub id: String,
    /// Filesystem creation time, when the platform reports one
    pub created_at: Option<SystemTime>,
    /// Last modification time
    pub modified_at: Option<SystemTime>,
}

/// File operations the note repository depends on
pub trait FileGateway {
    /// List the `*.md` files directly inside `dir` (no recursion)
    fn list_files(&self, dir: &Path) -> GatewayResult<Vec<FileEntry>>;

    /// Read a file as text; `NotFound` when the path vanished
    fn read_file(&self, path: &Path) -> GatewayResult<String>;

    /// Write note content under the title-derived name, creating `dir` if
    /// absent. When `old_title` is given, the old safe-filename is renamed
    /// to the new one before the write so no orphan is left behind.
    fn save_file(
        &self,
        id: &str,
        title: &str,
        content: &str,
        dir: &Path,
        old_title: Option<&str>,
    ) -> GatewayResult<PathBuf>;

    /// Delete the file a note with this id and title would occupy
    fn delete_file(&self, id: &str, title: &str, dir: &Path) -> GatewayResult<()>;
}

/// Direct `std::fs` implementation used by the application
#[derive(Debug, Clone, Default)]
pub struct LocalFileGateway;

impl FileGateway for LocalFileGateway {
    fn list_files(&self, dir: &Path) -> GatewayResult<Vec<FileEntry>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).max_depth(1).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.extension().map(|ext| ext == "md").unwrap_or(false) {
                continue;
            }
            let name = path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let id = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            let meta = fs::metadata(path).ok();
            entries.push(FileEntry {
                name,
                path: path.to_path_buf(),
                id,
                created_at: meta.as_ref().and_then(|m| m.created().ok()),
                modified_at: meta.as_ref().and_then(|m| m.modified().ok()),
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> GatewayResult<String> {
        fs::read_to_string(path).map_err(|e| io_error(path, e))
    }

    fn save_file(
        &self,
        id: &str,
        title: &str,
        content: &str,
        dir: &Path,
        old_title: Option<&str>,
    ) -> GatewayResult<PathBuf> {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let path = dir.join(format!("{}.md", file_stem(id, title)));
        if let Some(old_title) = old_title {
            let old_path = dir.join(format!("{}.md", file_stem(id, old_title)));
            if old_path != path && old_path.exists() {
                fs::rename(&old_path, &path).map_err(|e| io_error(&old_path, e))?;
                tracing::info!("Renamed {} -> {}", old_path.display(), path.display());
            }
        }

        fs::write(&path, content).map_err(|e| io_error(&path, e))?;
        tracing::info!("Saved note file: {}", path.display());
        Ok(path)
    }

    fn delete_file(&self, id: &str, title: &str, dir: &Path) -> GatewayResult<()> {
        let path = dir.join(format!("{}.md", file_stem(id, title)));
        fs::remove_file(&path).map_err(|e| io_error(&path, e))?;
        tracing::info!("Deleted note file: {}", path.display());
        Ok(())
    }
}

/// Default notes directory, created on first use
pub fn default_save_location() -> GatewayResult<PathBuf> {
    let dir = directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|d| d.join("Scribble")))
        .or_else(|| {
            directories::ProjectDirs::from("com", "scribble", "Scribble")
                .map(|dirs| dirs.data_dir().join("notes"))
        })
        .unwrap_or_else(|| PathBuf::from("notes"));
    fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
    Ok(dir)
}

fn io_error(path: &Path, source: std::io::Error) -> GatewayError {
    if source.kind() == std::io::ErrorKind::NotFound {
        GatewayError::NotFound(path.to_path_buf())
    } else {
        GatewayError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_creates_directory_and_file() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("notes");
        let gw = LocalFileGateway;

        let path = gw.save_file("id1", "Shopping List", "# Shopping List\n", &dir, None).unwrap();
        assert_eq!(path, dir.join("shopping_list.md"));
        assert!(path.exists());
    }

    #[test]
    fn save_with_old_title_renames_first() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        let gw = LocalFileGateway;

        gw.save_file("id1", "Old Title", "old", &dir, None).unwrap();
        let path = gw.save_file("id1", "New Title", "new", &dir, Some("Old Title")).unwrap();

        assert_eq!(path, dir.join("new_title.md"));
        assert!(!dir.join("old_title.md").exists());
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn list_files_skips_non_markdown() {
        let tmp = TempDir::new().unwrap();
        let gw = LocalFileGateway;
        fs::write(tmp.path().join("a.md"), "a").unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();

        let entries = gw.list_files(tmp.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a");
        assert_eq!(entries[0].name, "a.md");
    }

    #[test]
    fn list_files_on_missing_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let gw = LocalFileGateway;
        let entries = gw.list_files(&tmp.path().join("nope")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let gw = LocalFileGateway;
        let err = gw.read_file(&tmp.path().join("gone.md")).unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[test]
    fn delete_removes_the_title_derived_path() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        let gw = LocalFileGateway;

        gw.save_file("id1", "Groceries", "milk", &dir, None).unwrap();
        gw.delete_file("id1", "Groceries", &dir).unwrap();
        assert!(!dir.join("groceries.md").exists());
    }
}
