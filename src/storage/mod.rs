//! Storage module for persisting crawl data
//!
//! This module handles every file the crawler reads or writes:
//! - Article text files for relevant articles
//! - The checkpoint used to resume an interrupted crawl
//! - The seed file listing known starting articles

mod articles;
mod checkpoint;
mod seeds;
mod traits;

pub use articles::{count_articles, file_safe, FileArticleStore};
pub use checkpoint::{load_checkpoint, save_checkpoint, Checkpoint};
pub use seeds::{SeedFile, SeedRecord};
pub use traits::{ArticleStore, StorageError, StorageResult};

use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Replaces the file at `path` with `contents` in a single rename
///
/// The temporary file is created in the destination directory so the final
/// rename stays on one filesystem.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| StorageError::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| StorageError::io(dir, e))?;
    tmp.write_all(contents)
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| StorageError::io(tmp.path(), e))?;

    tmp.persist(path).map_err(|source| StorageError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
