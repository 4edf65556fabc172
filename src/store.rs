//! Append-only filesystem artifact store.
//!
//! Two flat directories under the store root — `uploads/` for raw uploads and
//! `output/` for produced results. Artifacts are written once under a name
//! that is unique by construction ([`crate::naming::unique_name`]) and never
//! mutated or deleted; retention is an operational concern outside this
//! module. There is no index file: the directory plus the naming convention
//! is the only persisted state.
//!
//! Retrieval is defensive: an identifier that is not already in sanitized
//! form (path separators, `..`, leading dots) is rejected as [`StoreError::NotFound`]
//! before any filesystem access, so the store can never be coaxed into
//! serving an arbitrary path.

use crate::naming;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("artifact not found")]
    NotFound,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which side of the pipeline an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Upload,
    Result,
}

impl ArtifactKind {
    pub fn dir_name(self) -> &'static str {
        match self {
            ArtifactKind::Upload => "uploads",
            ArtifactKind::Result => "output",
        }
    }
}

/// A persisted image, addressed by its stored filename.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub id: String,
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Filesystem-backed artifact store rooted at a single directory.
#[derive(Debug)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open a store at `root`, creating the kind directories if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        for kind in [ArtifactKind::Upload, ArtifactKind::Result] {
            fs::create_dir_all(root.join(kind.dir_name()))?;
        }
        Ok(Self { root })
    }

    /// Directory that holds artifacts of `kind`.
    pub fn dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Persist `bytes` under a fresh unique name derived from `suggested_name`.
    pub fn put(
        &self,
        bytes: &[u8],
        kind: ArtifactKind,
        suggested_name: &str,
    ) -> Result<Artifact, StoreError> {
        self.write(bytes, kind, naming::unique_name(suggested_name))
    }

    /// Persist `bytes` under an exact, caller-composed identifier.
    ///
    /// The identifier must already be in sanitized form (the caller derives
    /// it from a previously stored artifact id, e.g. `processed_{upload}`).
    pub fn put_exact(
        &self,
        bytes: &[u8],
        kind: ArtifactKind,
        id: &str,
    ) -> Result<Artifact, StoreError> {
        if !naming::is_sanitized(id) {
            return Err(StoreError::NotFound);
        }
        self.write(bytes, kind, id.to_string())
    }

    fn write(&self, bytes: &[u8], kind: ArtifactKind, id: String) -> Result<Artifact, StoreError> {
        let path = self.dir(kind).join(&id);
        // create_new enforces the no-overwrite invariant at the fs level.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)?;
        std::io::Write::write_all(&mut file, bytes)?;
        Ok(Artifact {
            id,
            kind,
            path,
            created_at: Utc::now(),
        })
    }

    /// Retrieve a previously stored artifact's bytes.
    ///
    /// Identifiers that escape the sanitized alphabet are rejected with
    /// [`StoreError::NotFound`] without touching the filesystem.
    pub fn get(&self, kind: ArtifactKind, id: &str) -> Result<Vec<u8>, StoreError> {
        if !naming::is_sanitized(id) {
            return Err(StoreError::NotFound);
        }
        let path = self.dir(kind).join(id);
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Number of artifacts of `kind` currently on disk.
    pub fn count(&self, kind: ArtifactKind) -> usize {
        fs::read_dir(self.dir(kind))
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, ArtifactStore) {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::new(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn new_creates_kind_directories() {
        let (tmp, _store) = temp_store();
        assert!(tmp.path().join("uploads").is_dir());
        assert!(tmp.path().join("output").is_dir());
    }

    #[test]
    fn put_then_get_roundtrips_bytes() {
        let (_tmp, store) = temp_store();
        let artifact = store
            .put(b"png bytes", ArtifactKind::Upload, "photo.png")
            .unwrap();
        assert!(artifact.id.ends_with("_photo.png"));
        assert_eq!(
            store.get(ArtifactKind::Upload, &artifact.id).unwrap(),
            b"png bytes"
        );
    }

    #[test]
    fn put_sanitizes_hostile_suggested_names() {
        let (_tmp, store) = temp_store();
        let artifact = store
            .put(b"x", ArtifactKind::Upload, "../../etc/passwd")
            .unwrap();
        assert!(artifact.id.ends_with("_etcpasswd"));
        assert!(artifact.path.starts_with(store.dir(ArtifactKind::Upload)));
    }

    #[test]
    fn put_exact_refuses_overwrite() {
        let (_tmp, store) = temp_store();
        store.put_exact(b"one", ArtifactKind::Result, "result.png").unwrap();
        let second = store.put_exact(b"two", ArtifactKind::Result, "result.png");
        assert!(second.is_err());
        // First write is untouched.
        assert_eq!(store.get(ArtifactKind::Result, "result.png").unwrap(), b"one");
    }

    #[test]
    fn put_exact_rejects_unsanitized_ids() {
        let (_tmp, store) = temp_store();
        assert!(matches!(
            store.put_exact(b"x", ArtifactKind::Result, "../evil"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn get_rejects_traversal_identifiers() {
        let (tmp, store) = temp_store();
        std::fs::write(tmp.path().join("secret.txt"), b"top secret").unwrap();

        for id in ["../secret.txt", "..", "a/../secret.txt", ".secret"] {
            assert!(
                matches!(store.get(ArtifactKind::Upload, id), Err(StoreError::NotFound)),
                "id {id:?} should be rejected"
            );
        }
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let (_tmp, store) = temp_store();
        assert!(matches!(
            store.get(ArtifactKind::Upload, "missing.png"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn kinds_are_isolated() {
        let (_tmp, store) = temp_store();
        let artifact = store.put(b"x", ArtifactKind::Upload, "a.png").unwrap();
        assert!(matches!(
            store.get(ArtifactKind::Result, &artifact.id),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn count_tracks_puts() {
        let (_tmp, store) = temp_store();
        assert_eq!(store.count(ArtifactKind::Upload), 0);
        store.put(b"x", ArtifactKind::Upload, "a.png").unwrap();
        store.put(b"y", ArtifactKind::Upload, "a.png").unwrap();
        assert_eq!(store.count(ArtifactKind::Upload), 2);
        assert_eq!(store.count(ArtifactKind::Result), 0);
    }

    #[test]
    fn concurrent_puts_never_collide() {
        let (_tmp, store) = temp_store();
        let store = std::sync::Arc::new(store);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                store.put(b"x", ArtifactKind::Upload, "same.png").unwrap().id
            }));
        }
        let ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }
}
