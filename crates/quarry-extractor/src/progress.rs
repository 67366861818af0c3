//! Durable extraction progress
//!
//! One JSON file per book records how far extraction has got:
//!
//! ```json
//! {
//!   "last_processed_page": 30,
//!   "total_concepts_extracted": 9,
//!   "session_history": [
//!     {"timestamp": 1760000000, "concepts_extracted": 5, "page_range": "1-15",
//!      "checkpoint_page": 15, "chapter": "Chapter 1 A Tutorial Introduction"}
//!   ]
//! }
//! ```
//!
//! Loading never fails: a missing, empty or unreadable file is a fresh start.
//! Updates are written to a sibling temporary file and renamed over the
//! original, so a crash mid-write leaves the previous state intact.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use quarry_domain::PageSpan;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::ProgressError;

/// One completed extraction session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unix seconds when the session was checkpointed
    pub timestamp: u64,
    /// Concepts persisted during the session
    pub concepts_extracted: u32,
    /// Pages the session covered
    pub page_range: PageSpan,
    /// Last processed page after the session
    pub checkpoint_page: u32,
    /// Chapter heading seen in the window, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

/// Durable progress of one book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Highest page fully processed; 0 before any session
    pub last_processed_page: u32,
    /// Concepts persisted over all sessions
    pub total_concepts_extracted: u32,
    /// Completed sessions, oldest first
    #[serde(default)]
    pub session_history: Vec<SessionRecord>,
}

impl SessionState {
    /// Recompute `(last_processed_page, total_concepts_extracted)` from the
    /// history alone
    pub fn replay(history: &[SessionRecord]) -> (u32, u32) {
        history.iter().fold((0, 0), |(_, total), record| {
            (
                record.checkpoint_page,
                total.saturating_add(record.concepts_extracted),
            )
        })
    }

    /// Whether the counters agree with the history
    pub fn is_consistent(&self) -> bool {
        Self::replay(&self.session_history)
            == (self.last_processed_page, self.total_concepts_extracted)
    }
}

/// What the caller knows about a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Pages the session covered
    pub page_range: PageSpan,
    /// Chapter heading seen in the window, if any
    pub chapter: Option<String>,
}

/// Loads, updates and persists the [`SessionState`] of one book
#[derive(Debug)]
pub struct ProgressTracker {
    path: PathBuf,
    state: SessionState,
}

impl ProgressTracker {
    /// Load the state stored at `path`.
    ///
    /// A missing, empty or corrupt file yields the zero state. A file whose
    /// counters disagree with its history is repaired from the history.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = Self::read_state(&path);
        debug!(
            path = %path.display(),
            last_processed_page = state.last_processed_page,
            total = state.total_concepts_extracted,
            "Loaded session state"
        );
        Self { path, state }
    }

    fn read_state(path: &Path) -> SessionState {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No session state found, starting fresh");
                return SessionState::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable session state, starting fresh");
                return SessionState::default();
            }
        };

        if contents.trim().is_empty() {
            return SessionState::default();
        }

        let mut state: SessionState = match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt session state, starting fresh");
                return SessionState::default();
            }
        };

        if !state.is_consistent() {
            let (last, total) = SessionState::replay(&state.session_history);
            warn!(
                path = %path.display(),
                stored_page = state.last_processed_page,
                stored_total = state.total_concepts_extracted,
                replayed_page = last,
                replayed_total = total,
                "Session state counters disagree with history, recovering from history"
            );
            state.last_processed_page = last;
            state.total_concepts_extracted = total;
        }

        state
    }

    /// Current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a finished session and persist the new state.
    ///
    /// The checkpoint never moves backwards. The in-memory state only changes
    /// once the new state is safely on disk.
    pub fn update(
        &mut self,
        new_last_page: u32,
        concepts_extracted: u32,
        info: SessionInfo,
    ) -> Result<&SessionState, ProgressError> {
        if new_last_page < self.state.last_processed_page {
            return Err(ProgressError::PageRegression {
                current: self.state.last_processed_page,
                requested: new_last_page,
            });
        }

        let mut next = self.state.clone();
        next.last_processed_page = new_last_page;
        next.total_concepts_extracted = next
            .total_concepts_extracted
            .saturating_add(concepts_extracted);
        next.session_history.push(SessionRecord {
            timestamp: unix_now(),
            concepts_extracted,
            page_range: info.page_range,
            checkpoint_page: new_last_page,
            chapter: info.chapter,
        });

        self.persist(&next)?;
        self.state = next;

        info!(
            last_processed_page = self.state.last_processed_page,
            total = self.state.total_concepts_extracted,
            "Session checkpointed"
        );
        Ok(&self.state)
    }

    fn persist(&self, state: &SessionState) -> Result<(), ProgressError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir)?;

        let mut file = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut file, state)?;
        file.write_all(b"\n")?;
        file.as_file().sync_all()?;
        file.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
