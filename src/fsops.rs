//! Filesystem mutation capability.
//!
//! Every destructive operation (delete, move, mkdir) goes through the
//! [`FsOps`] trait instead of calling `std::fs` directly. Callers inject
//! [`RealFs`] in production and [`MockFs`] in tests, so deletion policy
//! can be tested without ever deleting anything real. Reads are not
//! abstracted; comparison I/O opens files directly.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Destructive filesystem operations.
pub trait FsOps: Send + Sync {
    /// Remove a file.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Rename (move) a file.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a directory and all missing parents.
    ///
    /// # Errors
    ///
    /// Propagates the underlying I/O error.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FsOps for RealFs {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Recording test double. Mutations are appended to interior logs and
/// succeed unless a failure kind is armed.
#[derive(Debug, Default)]
pub struct MockFs {
    removed: Mutex<Vec<PathBuf>>,
    renamed: Mutex<Vec<(PathBuf, PathBuf)>>,
    created_dirs: Mutex<Vec<PathBuf>>,
    fail_remove_with: Mutex<Option<io::ErrorKind>>,
}

impl MockFs {
    /// A mock where every operation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose `remove_file` always fails with `kind`.
    #[must_use]
    pub fn failing_remove(kind: io::ErrorKind) -> Self {
        let fs = Self::default();
        *fs.fail_remove_with.lock().expect("mock lock poisoned") = Some(kind);
        fs
    }

    /// How many removals were attempted.
    #[must_use]
    pub fn remove_count(&self) -> usize {
        self.removed.lock().expect("mock lock poisoned").len()
    }

    /// Paths passed to `remove_file`, in call order.
    #[must_use]
    pub fn removed_paths(&self) -> Vec<PathBuf> {
        self.removed.lock().expect("mock lock poisoned").clone()
    }

    /// `(from, to)` pairs passed to `rename`, in call order.
    #[must_use]
    pub fn renamed_pairs(&self) -> Vec<(PathBuf, PathBuf)> {
        self.renamed.lock().expect("mock lock poisoned").clone()
    }

    /// Paths passed to `create_dir_all`, in call order.
    #[must_use]
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.created_dirs.lock().expect("mock lock poisoned").clone()
    }
}

impl FsOps for MockFs {
    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.removed
            .lock()
            .expect("mock lock poisoned")
            .push(path.to_path_buf());
        match *self.fail_remove_with.lock().expect("mock lock poisoned") {
            Some(kind) => Err(io::Error::new(kind, "injected failure")),
            None => Ok(()),
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.renamed
            .lock()
            .expect("mock lock poisoned")
            .push((from.to_path_buf(), to.to_path_buf()));
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.created_dirs
            .lock()
            .expect("mock lock poisoned")
            .push(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_operations() {
        let fs = MockFs::new();
        fs.remove_file(Path::new("/a")).unwrap();
        fs.rename(Path::new("/b"), Path::new("/c")).unwrap();
        fs.create_dir_all(Path::new("/d/e")).unwrap();

        assert_eq!(fs.removed_paths(), vec![PathBuf::from("/a")]);
        assert_eq!(
            fs.renamed_pairs(),
            vec![(PathBuf::from("/b"), PathBuf::from("/c"))]
        );
        assert_eq!(fs.created_dirs(), vec![PathBuf::from("/d/e")]);
    }

    #[test]
    fn test_mock_injected_remove_failure() {
        let fs = MockFs::failing_remove(io::ErrorKind::PermissionDenied);
        let err = fs.remove_file(Path::new("/locked")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        // The attempt is still recorded.
        assert_eq!(fs.remove_count(), 1);
    }
}
