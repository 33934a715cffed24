use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Advisory lock that keeps a data directory to one interactive session.
///
/// Uses platform-native flock (Unix). The lock is held for as long as the
/// value lives.
pub struct SessionLock {
    _file: File,
    path: PathBuf,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is locked: another ticklist session is already running")]
    Busy { path: PathBuf },
}

impl SessionLock {
    /// Acquire the session lock in `data_dir`, waiting up to `timeout`.
    pub fn acquire(data_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let lock_path = data_dir.join(".lock");
        fs::create_dir_all(data_dir).map_err(|e| LockError::CreateError {
            path: lock_path.clone(),
            source: e,
        })?;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| LockError::CreateError {
                path: lock_path.clone(),
                source: e,
            })?;

        let start = Instant::now();
        loop {
            match try_lock(&file) {
                Ok(()) => {
                    return Ok(SessionLock {
                        _file: file,
                        path: lock_path,
                    });
                }
                Err(_) if start.elapsed() < timeout => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(LockError::Busy { path: lock_path });
                }
            }
        }
    }

    /// Acquire with a short default timeout (250ms)
    pub fn acquire_default(data_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(data_dir, Duration::from_millis(250))
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        // flock is released when the file closes
        let _ = fs::remove_file(&self.path);
    }
}

/// Try to acquire an exclusive flock on the file (non-blocking)
#[cfg(unix)]
fn try_lock(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let fd = file.as_raw_fd();
    let result = unsafe { libc::flock(fd, libc::LOCK_EX | libc::LOCK_NB) };
    if result == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn acquire_release_reacquire() {
        let tmp = TempDir::new().unwrap();
        let lock = SessionLock::acquire_default(tmp.path());
        assert!(lock.is_ok());
        drop(lock);
        assert!(SessionLock::acquire_default(tmp.path()).is_ok());
    }

    #[test]
    fn creates_missing_data_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("a/b");
        let _lock = SessionLock::acquire_default(&dir).unwrap();
        assert!(dir.join(".lock").exists());
    }

    #[cfg(unix)]
    #[test]
    fn second_session_is_refused() {
        let tmp = TempDir::new().unwrap();
        let _first = SessionLock::acquire_default(tmp.path()).unwrap();
        let second = SessionLock::acquire(tmp.path(), Duration::from_millis(30));
        assert!(matches!(second, Err(LockError::Busy { .. })));
    }
}
