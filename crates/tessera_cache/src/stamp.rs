//! Modification-time stamps and change detection.
//!
//! Staleness is decided purely by modification time: a file is dirty when it
//! was never seen before or its mtime is newer than the recorded one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::CacheError;

/// Last-seen modification times keyed by path.
pub type Stamps = HashMap<PathBuf, SystemTime>;

/// Result of comparing current stamps against a recorded snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StampChanges {
    /// Files with no recorded stamp.
    pub new_files: Vec<PathBuf>,

    /// Files whose current mtime is newer than the recorded one.
    pub modified_files: Vec<PathBuf>,

    /// Files that no longer exist on disk. Never counted as changes.
    pub missing_files: Vec<PathBuf>,

    /// Files whose mtime is not newer than the recorded one.
    pub unchanged_files: Vec<PathBuf>,
}

impl StampChanges {
    /// Returns `true` if nothing is new or modified.
    pub fn is_empty(&self) -> bool {
        self.new_files.is_empty() && self.modified_files.is_empty()
    }

    /// New and modified files, in that order.
    pub fn dirty(&self) -> impl Iterator<Item = &PathBuf> {
        self.new_files.iter().chain(&self.modified_files)
    }

    /// Returns the number of files that need reprocessing.
    pub fn dirty_count(&self) -> usize {
        self.new_files.len() + self.modified_files.len()
    }
}

/// Reads the modification time of `path`.
pub async fn stat_mtime(path: &Path) -> Result<SystemTime, CacheError> {
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = tokio::fs::metadata(path).await.map_err(io_err)?;
    metadata.modified().map_err(io_err)
}

/// Reads modification times for `paths`, skipping files that cannot be read.
pub async fn snapshot<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Stamps {
    let mut stamps = Stamps::new();
    for path in paths {
        if let Ok(mtime) = stat_mtime(path).await {
            stamps.insert(path.to_path_buf(), mtime);
        }
    }
    stamps
}

/// Compares stamps of `paths` taken now against `recorded`.
///
/// Paths missing from `current` are reported as missing, not as changes. A
/// `recorded` snapshot of `None` makes every present file new.
pub fn detect_changes(
    paths: &[PathBuf],
    current: &Stamps,
    recorded: Option<&Stamps>,
) -> StampChanges {
    let mut changes = StampChanges::default();
    for path in paths {
        let Some(now) = current.get(path) else {
            changes.missing_files.push(path.clone());
            continue;
        };
        match recorded.and_then(|stamps| stamps.get(path)) {
            None => changes.new_files.push(path.clone()),
            Some(before) if now > before => changes.modified_files.push(path.clone()),
            Some(_) => changes.unchanged_files.push(path.clone()),
        }
    }
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn touch(path: &Path, secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        file.set_modified(at(secs)).unwrap();
    }

    #[tokio::test]
    async fn stat_reads_pinned_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tessera.toml");
        std::fs::write(&path, "").unwrap();
        touch(&path, 1_000);
        assert_eq!(stat_mtime(&path).await.unwrap(), at(1_000));
    }

    #[tokio::test]
    async fn stat_missing_file_errors() {
        let err = stat_mtime(Path::new("/nonexistent/tessera.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[tokio::test]
    async fn snapshot_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.toml");
        std::fs::write(&present, "").unwrap();
        let missing = dir.path().join("b.toml");

        let stamps = snapshot([present.as_path(), missing.as_path()]).await;
        assert_eq!(stamps.len(), 1);
        assert!(stamps.contains_key(&present));
    }

    #[test]
    fn no_recorded_snapshot_means_all_new() {
        let paths = vec![PathBuf::from("a"), PathBuf::from("b")];
        let current: Stamps = paths.iter().map(|p| (p.clone(), at(5))).collect();
        let changes = detect_changes(&paths, &current, None);
        assert_eq!(changes.new_files, paths);
        assert_eq!(changes.dirty_count(), 2);
    }

    #[test]
    fn newer_mtime_is_modified() {
        let paths = vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")];
        let recorded: Stamps = paths.iter().map(|p| (p.clone(), at(5))).collect();
        let mut current = recorded.clone();
        current.insert(PathBuf::from("a"), at(9));
        current.insert(PathBuf::from("b"), at(3));

        let changes = detect_changes(&paths, &current, Some(&recorded));
        assert_eq!(changes.modified_files, vec![PathBuf::from("a")]);
        assert_eq!(
            changes.unchanged_files,
            vec![PathBuf::from("b"), PathBuf::from("c")]
        );
        assert!(!changes.is_empty());
    }

    #[test]
    fn untracked_and_missing_files() {
        let paths = vec![
            PathBuf::from("tracked"),
            PathBuf::from("untracked"),
            PathBuf::from("gone"),
        ];
        let recorded: Stamps = [
            (PathBuf::from("tracked"), at(5)),
            (PathBuf::from("gone"), at(5)),
        ]
        .into_iter()
        .collect();
        let current: Stamps = [
            (PathBuf::from("tracked"), at(5)),
            (PathBuf::from("untracked"), at(1)),
        ]
        .into_iter()
        .collect();

        let changes = detect_changes(&paths, &current, Some(&recorded));
        assert_eq!(changes.new_files, vec![PathBuf::from("untracked")]);
        assert_eq!(changes.missing_files, vec![PathBuf::from("gone")]);
        assert_eq!(changes.unchanged_files, vec![PathBuf::from("tracked")]);
        assert_eq!(
            changes.dirty().collect::<Vec<_>>(),
            vec![&PathBuf::from("untracked")]
        );
    }

    #[test]
    fn only_missing_files_is_no_change() {
        let paths = vec![PathBuf::from("gone")];
        let changes = detect_changes(&paths, &Stamps::new(), Some(&Stamps::new()));
        assert!(changes.is_empty());
    }
}
