//! File-per-article content store
//!
//! Relevant articles land in `{data_dir}/data_{file_safe(identifier)}.txt`
//! as UTF-8 text. Files are created exclusively and never rewritten.

use crate::storage::traits::{ArticleStore, StorageError, StorageResult};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Characters that cannot appear in a file name on common filesystems
const UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Escape marker; always encoded itself so the mapping stays one-to-one
const ESCAPE: char = '%';

/// Maps an article identifier onto a string usable as a file name component
///
/// Path separators, reserved punctuation, control characters and `%` are
/// percent-encoded; everything else is kept. Distinct identifiers always get
/// distinct names.
///
/// ```
/// use article_ripple::storage::file_safe;
///
/// assert_eq!(file_safe("AC/DC"), "AC%2FDC");
/// assert_ne!(file_safe("AC/DC"), file_safe("AC_DC"));
/// ```
pub fn file_safe(identifier: &str) -> String {
    let mut safe = String::with_capacity(identifier.len());
    let mut buf = [0u8; 4];
    for c in identifier.chars() {
        if c == ESCAPE || UNSAFE_CHARS.contains(&c) || c.is_control() {
            safe.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        } else {
            safe.push(c);
        }
    }
    safe
}

/// Article store writing one text file per identifier
#[derive(Debug, Clone)]
pub struct FileArticleStore {
    data_dir: PathBuf,
}

impl FileArticleStore {
    /// Opens the store, creating `data_dir` if needed
    pub fn open(data_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir).map_err(|e| StorageError::io(&data_dir, e))?;
        Ok(Self { data_dir })
    }

    /// Path the article for `identifier` is (or would be) stored at
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.data_dir.join(format!("data_{}.txt", file_safe(identifier)))
    }
}

impl ArticleStore for FileArticleStore {
    fn persist(&mut self, identifier: &str, text: &str) -> StorageResult<()> {
        let path = self.path_for(identifier);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                // Names are unique per identifier, so only a run interrupted
                // before its checkpoint save can have written it
                tracing::debug!("Article file {} already exists, keeping it", path.display());
                return Ok(());
            }
            Err(e) => return Err(StorageError::io(&path, e)),
        };

        file.write_all(text.as_bytes())
            .map_err(|e| StorageError::io(&path, e))?;

        tracing::debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(())
    }
}

/// Counts `data_*.txt` files in `data_dir`; a missing directory counts as empty
pub fn count_articles(data_dir: &Path) -> StorageResult<usize> {
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(StorageError::io(data_dir, e)),
    };

    let mut count = 0;
    for entry in entries {
        let entry = entry.map_err(|e| StorageError::io(data_dir, e))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("data_") && name.ends_with(".txt") {
            count += 1;
        }
    }
    Ok(count)
}
