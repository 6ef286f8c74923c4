//! Checkpoint file for resuming an interrupted crawl
//!
//! The checkpoint is a single JSON document:
//!
//! ```json
//! {
//!   "seen_visited": ["Artificial_intelligence", "Deep_learning"],
//!   "to_visit_queue": [["Perceptron", 1], ["Backpropagation", 1]],
//!   "saved_at": "2026-01-01T12:00:00Z"
//! }
//! ```
//!
//! Loading is lenient about individual entries: anything that is not a
//! string in `seen_visited`, or not a `[string, non-negative integer]` pair in
//! `to_visit_queue`, is dropped with a warning. A document that is not valid
//! JSON at all is reported as [`StorageError::Corrupt`].

use crate::state::{Frontier, FrontierItem};
use crate::storage::traits::{StorageError, StorageResult};
use crate::storage::write_atomic;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;

/// Full snapshot of frontier state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub visited: Vec<String>,
    pub queue: Vec<FrontierItem>,
    pub saved_at: Option<DateTime<Utc>>,
}

/// On-disk layout of the checkpoint file
#[derive(Debug, Serialize, Deserialize)]
struct CheckpointFile {
    #[serde(default)]
    seen_visited: Vec<Value>,
    #[serde(default)]
    to_visit_queue: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    saved_at: Option<DateTime<Utc>>,
}

impl Checkpoint {
    /// Captures the current frontier state
    pub fn from_frontier(frontier: &Frontier) -> Self {
        Self {
            visited: frontier.visited_sorted(),
            queue: frontier.queued().cloned().collect(),
            saved_at: None,
        }
    }

    /// Rebuilds the frontier this checkpoint was taken from
    pub fn into_frontier(self) -> Frontier {
        Frontier::restore(self.visited, self.queue)
    }

    fn to_file(&self) -> CheckpointFile {
        CheckpointFile {
            seen_visited: self.visited.iter().cloned().map(Value::String).collect(),
            to_visit_queue: self
                .queue
                .iter()
                .map(|item| serde_json::json!([item.identifier, item.depth]))
                .collect(),
            saved_at: self.saved_at,
        }
    }

    fn from_file(file: CheckpointFile) -> Self {
        let visited_total = file.seen_visited.len();
        let queue_total = file.to_visit_queue.len();

        let visited: Vec<String> = file
            .seen_visited
            .into_iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();

        let queue: Vec<FrontierItem> = file
            .to_visit_queue
            .iter()
            .filter_map(queue_entry)
            .collect();

        let dropped = (visited_total - visited.len()) + (queue_total - queue.len());
        if dropped > 0 {
            tracing::warn!("Dropped {} malformed checkpoint entries", dropped);
        }

        Self {
            visited,
            queue,
            saved_at: file.saved_at,
        }
    }
}

/// Parses one `[identifier, depth]` queue entry
fn queue_entry(value: &Value) -> Option<FrontierItem> {
    let pair = value.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    let identifier = pair[0].as_str()?;
    let depth = u32::try_from(pair[1].as_u64()?).ok()?;
    Some(FrontierItem::new(identifier, depth))
}

/// Loads the checkpoint at `path`
///
/// Returns `Ok(None)` if no checkpoint file exists.
pub fn load_checkpoint(path: &Path) -> StorageResult<Option<Checkpoint>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StorageError::io(path, e)),
    };

    let file: CheckpointFile =
        serde_json::from_str(&content).map_err(|source| StorageError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Some(Checkpoint::from_file(file)))
}

/// Writes `checkpoint` to `path`, replacing any previous checkpoint
///
/// The document is fully serialized before anything touches the disk, then
/// written to a temporary file beside `path` and renamed over it, so readers
/// see either the old checkpoint or the new one.
pub fn save_checkpoint(path: &Path, checkpoint: &Checkpoint) -> StorageResult<()> {
    let mut file = checkpoint.to_file();
    if file.saved_at.is_none() {
        file.saved_at = Some(Utc::now());
    }

    let json = serde_json::to_vec_pretty(&file)?;
    write_atomic(path, &json)
}
