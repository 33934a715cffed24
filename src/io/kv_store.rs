use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use chrono::Utc;
use log::{error, info, warn};
use tempfile::NamedTempFile;

/// Synchronous string key-value persistence.
///
/// `set` never reports failure to the caller: writes are best effort and
/// implementations log what goes wrong.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Error type for opening a store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not start store writer: {0}")]
    Writer(std::io::Error),
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Store backed by a plain map. Counts writes per key.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    writes: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Number of `set` calls seen for `key`
    pub fn write_count(&self, key: &str) -> usize {
        self.writes.get(key).copied().unwrap_or(0)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
        *self.writes.entry(key.to_string()).or_insert(0) += 1;
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// File name of the store inside the data directory
pub const STORE_FILE: &str = "store.json";

/// Store persisted as one JSON object in `<data_dir>/store.json`.
///
/// Reads come from a cache loaded at open. Each `set` serializes the cache
/// and hands the snapshot to a writer thread, which keeps only the newest
/// pending snapshot and writes it atomically. Callers on the frame loop
/// therefore never wait on the disk. Dropping the store flushes.
pub struct FileStore {
    path: PathBuf,
    cache: BTreeMap<String, String>,
    tx: Option<Sender<String>>,
    writer: Option<JoinHandle<()>>,
}

impl FileStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|e| StoreError::CreateDir {
            path: data_dir.to_path_buf(),
            source: e,
        })?;
        let path = data_dir.join(STORE_FILE);
        let cache = read_store_file(&path, true)?;

        let (tx, rx) = mpsc::channel();
        let writer_path = path.clone();
        let writer = std::thread::Builder::new()
            .name("store-writer".into())
            .spawn(move || writer_loop(&writer_path, rx))
            .map_err(StoreError::Writer)?;

        Ok(FileStore {
            path,
            cache,
            tx: Some(tx),
            writer: Some(writer),
        })
    }

    /// Open without a writer thread. `set` only updates the cache, and an
    /// unparseable file is left where it is. Used by read-only commands.
    pub fn open_read_only(data_dir: &Path) -> Result<Self, StoreError> {
        let path = data_dir.join(STORE_FILE);
        let cache = read_store_file(&path, false)?;
        Ok(FileStore {
            path,
            cache,
            tx: None,
            writer: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.cache.insert(key.to_string(), value.to_string());
        let Some(tx) = &self.tx else {
            return;
        };
        match serde_json::to_string_pretty(&self.cache) {
            Ok(snapshot) => {
                if tx.send(snapshot).is_err() {
                    error!("event=store_write module=io status=error reason=writer_gone");
                }
            }
            Err(e) => error!("event=store_write module=io status=error reason={}", e),
        }
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        // Closing the channel lets the writer drain and exit
        self.tx.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                error!(
                    "event=store_write module=io status=error path={} reason=writer_panicked",
                    self.path.display()
                );
            }
        }
    }
}

fn writer_loop(path: &Path, rx: Receiver<String>) {
    while let Ok(mut latest) = rx.recv() {
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }
        if let Err(e) = atomic_write(path, latest.as_bytes()) {
            error!(
                "event=store_write module=io status=error path={} reason={}",
                path.display(),
                e
            );
        }
    }
}

/// Load the store map. A missing file is an empty store; an unparseable one
/// reads as empty too. With `move_aside` it is also renamed so the next
/// write does not clobber its contents.
fn read_store_file(
    path: &Path,
    move_aside: bool,
) -> Result<BTreeMap<String, String>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(StoreError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    match serde_json::from_str(&content) {
        Ok(map) => Ok(map),
        Err(e) if !move_aside => {
            warn!(
                "event=store_corrupt module=io path={} reason={} backup=none",
                path.display(),
                e
            );
            Ok(BTreeMap::new())
        }
        Err(e) => {
            let backup = corrupt_backup_path(path);
            warn!(
                "event=store_corrupt module=io path={} reason={} backup={}",
                path.display(),
                e,
                backup.display()
            );
            if let Err(e) = fs::rename(path, &backup) {
                warn!("event=store_backup module=io status=error reason={}", e);
            } else {
                info!("event=store_backup module=io status=ok");
            }
            Ok(BTreeMap::new())
        }
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| STORE_FILE.into());
    name.push(format!(".corrupt-{}", stamp));
    path.with_file_name(name)
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
