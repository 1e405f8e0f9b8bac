//! File-based locking for operations that must not overlap.
//!
//! A lock is a `.lock` file held with an exclusive `flock`. The kernel drops the
//! lock when the file descriptor is closed, so a crashed process never leaves a
//! stale lock behind.

use std::{
    fs::{self, File, OpenOptions},
    path::Path,
};

use crate::error::{LockError, LockResult};

/// An exclusive file lock.
///
/// The lock is released when `FileLock` is dropped.
#[derive(Debug)]
pub struct FileLock {
    _file: nix::fcntl::Flock<File>,
}

impl FileLock {
    fn open_lock_file(path: &Path) -> LockResult<File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?)
    }

    /// Try to acquire an exclusive lock on `path` without blocking.
    ///
    /// Returns `None` if the lock is already held, by this process or another.
    pub fn try_acquire<P: AsRef<Path>>(path: P) -> LockResult<Option<Self>> {
        let path = path.as_ref();
        let file = Self::open_lock_file(path)?;

        match nix::fcntl::Flock::lock(file, nix::fcntl::FlockArg::LockExclusiveNonblock) {
            Ok(file) => Ok(Some(FileLock { _file: file })),
            Err((_, nix::errno::Errno::EWOULDBLOCK)) => Ok(None),
            Err((_, err)) => {
                Err(LockError::AcquireFailed(format!(
                    "{}: {}",
                    path.display(),
                    err
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, thread};

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sync.lock");

        let lock = FileLock::try_acquire(&path).unwrap();
        assert!(lock.is_some());
        assert!(path.exists());
    }

    #[test]
    fn test_exclusive_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.lock");

        let lock1 = FileLock::try_acquire(&path).unwrap();
        assert!(lock1.is_some());

        let lock2 = FileLock::try_acquire(&path).unwrap();
        assert!(lock2.is_none(), "Should not be able to acquire lock");

        drop(lock1);

        let lock3 = FileLock::try_acquire(&path).unwrap();
        assert!(
            lock3.is_some(),
            "Should be able to acquire lock after release"
        );
    }

    #[test]
    fn test_different_paths_do_not_conflict() {
        let dir = tempdir().unwrap();
        let lock1 = FileLock::try_acquire(dir.path().join("a.lock")).unwrap();
        let lock2 = FileLock::try_acquire(dir.path().join("b.lock")).unwrap();

        assert!(lock1.is_some());
        assert!(lock2.is_some());
    }

    #[test]
    fn test_held_lock_is_seen_from_other_threads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.lock");
        let held = FileLock::try_acquire(&path).unwrap();
        assert!(held.is_some());

        let (tx, rx) = mpsc::channel();
        let thread_path = path.clone();
        let handle = thread::spawn(move || {
            tx.send(FileLock::try_acquire(&thread_path).unwrap().is_some())
                .unwrap();
        });

        assert!(!rx.recv().unwrap());
        handle.join().unwrap();

        drop(held);
        assert!(FileLock::try_acquire(&path).unwrap().is_some());
    }

    #[test]
    fn test_unwritable_location_is_an_error() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain-file");
        fs::write(&file, b"").unwrap();

        assert!(FileLock::try_acquire(file.join("sync.lock")).is_err());
    }
}
