//! # score_ledger
//!
//! Durable name → best-score leaderboard, persisted as a JSON array of
//! `{"name": ..., "score": ...}` records sorted descending by score.
//!
//! The store is a plain constructed object holding the ledger path — no
//! module-level file path, no ambient state.  All reads go back to disk,
//! so a concurrent viewer of the file never observes a half-written
//! document: `save` rewrites the whole ledger through a sibling temp file
//! followed by a rename.
//!
//! Semantics of `save(name, score)`:
//!
//! * at most one entry per distinct name,
//! * an existing entry's score becomes `max(existing, score)` — it is
//!   never reduced,
//! * the ledger is re-sorted descending before the rewrite (stable, so
//!   equal scores keep insertion order),
//! * calling `save` twice with the same arguments leaves the file
//!   byte-identical after the first call.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// LeaderboardEntry
// ════════════════════════════════════════════════════════════════════════════

/// One name/score record in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name:  String,
    pub score: u32,
}

// ════════════════════════════════════════════════════════════════════════════
// LedgerError
// ════════════════════════════════════════════════════════════════════════════

/// Failures of the persisted ledger.
///
/// An absent file is *not* an error — `load` returns an empty ledger for
/// that case.  A file that exists but does not parse is reported as
/// [`LedgerError::Malformed`] rather than silently treated as empty, so
/// corrupted score data is never masked.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to read leaderboard file {path}: {source}")]
    Read {
        path:   PathBuf,
        source: io::Error,
    },

    #[error("leaderboard file {path} is malformed: {source}")]
    Malformed {
        path:   PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to encode leaderboard: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to write leaderboard file {path}: {source}")]
    Write {
        path:   PathBuf,
        source: io::Error,
    },
}

// ════════════════════════════════════════════════════════════════════════════
// LeaderboardStore
// ════════════════════════════════════════════════════════════════════════════

/// Handle to the on-disk ledger.
pub struct LeaderboardStore {
    path: PathBuf,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LeaderboardStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full ledger from disk.
    ///
    /// A missing file yields an empty ledger; any other read failure, or
    /// a file that fails to parse, is an error.
    pub fn load(&self) -> Result<Vec<LeaderboardEntry>, LedgerError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LedgerError::Read {
                    path:   self.path.clone(),
                    source: e,
                })
            }
        };

        serde_json::from_slice(&raw).map_err(|source| LedgerError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Merge-upsert `score` for `name`, then atomically rewrite the file.
    ///
    /// An existing entry is only ever raised, never lowered.
    pub fn save(&self, name: &str, score: u32) -> Result<(), LedgerError> {
        let mut ledger = self.load()?;

        match ledger.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.score = entry.score.max(score),
            None => ledger.push(LeaderboardEntry {
                name: name.to_string(),
                score,
            }),
        }

        // Stable sort: equal scores keep their insertion order.
        ledger.sort_by(|a, b| b.score.cmp(&a.score));

        self.rewrite(&ledger)?;
        debug!(name, score, entries = ledger.len(), "ledger saved");
        Ok(())
    }

    /// Best entry, or the `("None", 0)` sentinel when the ledger is empty.
    ///
    /// Ties go to whichever highest-scoring entry sorts first after the
    /// stable descending sort.
    pub fn high_score(&self) -> Result<(String, u32), LedgerError> {
        let mut ledger = self.load()?;
        ledger.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(match ledger.first() {
            Some(top) => (top.name.clone(), top.score),
            None => ("None".to_string(), 0),
        })
    }

    /// The first `n` entries, freshly re-read and re-sorted, formatted as
    /// `"<name>: <score>"`.  Repeated calls re-read the file rather than
    /// caching, so the view always reflects the current ledger.
    pub fn format_top(&self, n: usize) -> Result<Vec<String>, LedgerError> {
        let mut ledger = self.load()?;
        ledger.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(ledger
            .iter()
            .take(n)
            .map(|e| format!("{}: {}", e.name, e.score))
            .collect())
    }

    // ── atomic rewrite ────────────────────────────────────────────────────

    /// Write the whole ledger to a sibling temp file, then rename it over
    /// the real path.  A reader never sees a partial document.
    fn rewrite(&self, ledger: &[LeaderboardEntry]) -> Result<(), LedgerError> {
        let encoded = serde_json::to_vec_pretty(ledger).map_err(LedgerError::Encode)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &encoded).map_err(|source| LedgerError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> LeaderboardStore {
        LeaderboardStore::new(dir.path().join("leaderboard.json"))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn empty_ledger_high_score_sentinel() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.high_score().unwrap(), ("None".to_string(), 0));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        let ledger = store.load().unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].name, "Ava");
        assert_eq!(ledger[0].score, 50);
    }

    #[test]
    fn save_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        let first = fs::read(store.path()).unwrap();
        store.save("Ava", 50).unwrap();
        let second = fs::read(store.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.high_score().unwrap(), ("Ava".to_string(), 50));
    }

    #[test]
    fn save_never_lowers_a_score() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        store.save("Ava", 30).unwrap();
        assert_eq!(store.high_score().unwrap(), ("Ava".to_string(), 50));
    }

    #[test]
    fn save_raises_an_existing_score() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 30).unwrap();
        store.save("Ava", 50).unwrap();
        let ledger = store.load().unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].score, 50);
    }

    #[test]
    fn at_most_one_entry_per_name() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        for score in [10, 40, 20, 40, 5] {
            store.save("Ava", score).unwrap();
        }
        store.save("Ben", 15).unwrap();
        let ledger = store.load().unwrap();
        assert_eq!(ledger.iter().filter(|e| e.name == "Ava").count(), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn new_high_score_sorts_first() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        store.save("Ben", 70).unwrap();
        let ledger = store.load().unwrap();
        assert_eq!(ledger[0], LeaderboardEntry { name: "Ben".into(), score: 70 });
        assert_eq!(ledger[1], LeaderboardEntry { name: "Ava".into(), score: 50 });
        assert_eq!(store.high_score().unwrap(), ("Ben".to_string(), 70));
    }

    #[test]
    fn tied_scores_keep_insertion_order() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        store.save("Ben", 50).unwrap();
        assert_eq!(store.high_score().unwrap(), ("Ava".to_string(), 50));
    }

    #[test]
    fn format_top_is_sorted_and_prefix_stable() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        store.save("Ben", 70).unwrap();
        store.save("Cho", 20).unwrap();
        store.save("Dee", 60).unwrap();

        let top4 = store.format_top(4).unwrap();
        assert_eq!(top4, vec!["Ben: 70", "Dee: 60", "Ava: 50", "Cho: 20"]);

        // Scores are non-increasing, and top(n) is a prefix of top(n+1).
        for n in 0..4 {
            let shorter = store.format_top(n).unwrap();
            let longer = store.format_top(n + 1).unwrap();
            assert_eq!(shorter[..], longer[..n.min(longer.len())]);
        }
    }

    #[test]
    fn format_top_truncates_to_n() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        store.save("Ben", 70).unwrap();
        assert_eq!(store.format_top(1).unwrap(), vec!["Ben: 70"]);
        assert_eq!(store.format_top(10).unwrap().len(), 2);
    }

    #[test]
    fn malformed_file_is_an_error_not_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), b"{ not json").unwrap();
        assert!(matches!(store.load(), Err(LedgerError::Malformed { .. })));
        // And save must not clobber the corrupt file with a fresh ledger.
        assert!(store.save("Ava", 50).is_err());
        assert_eq!(fs::read(store.path()).unwrap(), b"{ not json");
    }

    #[test]
    fn rewrite_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["leaderboard.json"]);
    }

    #[test]
    fn saved_file_is_valid_json_on_disk() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        store.save("Ava", 50).unwrap();
        let raw = fs::read(store.path()).unwrap();
        let parsed: Vec<LeaderboardEntry> = serde_json::from_slice(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }
}
