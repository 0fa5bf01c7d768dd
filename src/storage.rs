use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::models::{Task, RECORD_SIZE};

/// Extension shared by every store file.
pub const DATAFILE_EXTENSION: &str = ".dat";

/// Which of a user's store files to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// The user's primary task file.
    Primary,
    /// Transient copy holding today's tasks, regenerated per view.
    Day,
    /// Transient copy holding this week's important tasks.
    Week,
}

impl StoreKind {
    fn suffix(self) -> &'static str {
        match self {
            StoreKind::Primary => "",
            StoreKind::Day => "_day",
            StoreKind::Week => "_week",
        }
    }
}

/// Returns the directory holding per-user store files.
///
/// The path is determined in the following order:
/// 1. `EZTASK_DATA_DIR` environment variable.
/// 2. `~/.local/share/eztask` (or the platform equivalent).
/// 3. `.` (fallback).
pub fn data_dir() -> PathBuf {
    std::env::var("EZTASK_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("eztask");
        if !p.exists() {
            let _ = fs::create_dir_all(&p);
        }
        p
    })
}

/// Path of `username`'s store file of the given kind:
/// `<username><suffix>.dat` under `dir`.
pub fn store_path(dir: &Path, username: &str, kind: StoreKind) -> PathBuf {
    dir.join(format!("{}{}{}", username, kind.suffix(), DATAFILE_EXTENSION))
}

/// Usernames start with a letter; the rest is letters, digits, `_` or `-`.
pub fn valid_username(username: &str) -> bool {
    let mut chars = username.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// An ordered sequence of task records persisted in one file.
///
/// Records are addressed by 0-based logical index; the mapping to byte
/// offsets stays internal. Mutations that touch more than the tail rewrite
/// the whole file into a temp file and rename it over the original, so a
/// failed rewrite leaves the store exactly as it was.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `username`'s file of the given kind under `dir`.
    pub fn for_user(dir: &Path, username: &str, kind: StoreKind) -> Self {
        Self::new(store_path(dir, username, kind))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Create the store as an empty file. Used when an account is created.
    pub fn create(&self) -> Result<()> {
        File::create(&self.path)?;
        debug!(path = %self.path.display(), "created empty store");
        Ok(())
    }

    /// Delete the store file if present. Used for the transient day and
    /// week copies once their view is exited.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Number of records currently stored.
    pub fn count(&self) -> Result<usize> {
        let len = fs::metadata(&self.path)?.len();
        if len % RECORD_SIZE as u64 != 0 {
            warn!(path = %self.path.display(), len, "store length is not a whole number of records");
            return Err(StoreError::CorruptStore { len });
        }
        Ok((len / RECORD_SIZE as u64) as usize)
    }

    /// Append one record at the end, creating the store if absent.
    pub fn append(&self, task: &Task) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(&task.encode())?;
        debug!(path = %self.path.display(), name = %task.name, "appended record");
        Ok(())
    }

    /// Read the record at a 0-based logical index.
    pub fn read_one(&self, index: usize) -> Result<Task> {
        if !self.exists() {
            return Err(StoreError::IndexOutOfRange { index, count: 0 });
        }
        let count = self.count()?;
        if index >= count {
            return Err(StoreError::IndexOutOfRange { index, count });
        }
        let mut f = File::open(&self.path)?;
        f.seek(SeekFrom::Start((index * RECORD_SIZE) as u64))?;
        let mut buf = [0u8; RECORD_SIZE];
        f.read_exact(&mut buf)?;
        Ok(Task::decode(&buf))
    }

    /// Read up to `max` records starting at logical index `start`.
    ///
    /// Returns fewer when the store ends first and an empty Vec when
    /// `start` is at or past the end. The Vec is freshly allocated on every
    /// call; nothing is shared between reads.
    pub fn read_range(&self, start: usize, max: usize) -> Result<Vec<Task>> {
        let count = self.count()?;
        if start >= count {
            return Ok(Vec::new());
        }
        let n = max.min(count - start);
        let mut f = File::open(&self.path)?;
        f.seek(SeekFrom::Start((start * RECORD_SIZE) as u64))?;
        let mut tasks = Vec::with_capacity(n);
        let mut buf = [0u8; RECORD_SIZE];
        for _ in 0..n {
            f.read_exact(&mut buf)?;
            tasks.push(Task::decode(&buf));
        }
        Ok(tasks)
    }

    /// All records in store order.
    pub fn read_all(&self) -> Result<Vec<Task>> {
        let count = self.count()?;
        self.read_range(0, count)
    }

    /// Remove the record at `index`; later records shift down by one,
    /// keeping their relative order.
    pub fn delete_at(&self, index: usize) -> Result<()> {
        let mut tasks = self.read_all()?;
        if index >= tasks.len() {
            return Err(StoreError::IndexOutOfRange { index, count: tasks.len() });
        }
        tasks.remove(index);
        self.rewrite(&tasks)?;
        debug!(path = %self.path.display(), index, "deleted record");
        Ok(())
    }

    /// Apply `transform` to every record and atomically replace the store
    /// with the results.
    pub fn replace_all(&self, transform: impl FnMut(Task) -> Task) -> Result<()> {
        let tasks: Vec<Task> = self.read_all()?.into_iter().map(transform).collect();
        self.rewrite(&tasks)
    }

    /// Replace the store's contents with `tasks`.
    pub fn write_all(&self, tasks: &[Task]) -> Result<()> {
        self.rewrite(tasks)
    }

    /// Stage records into a temp file next to the store, fsync, then rename
    /// it over the original. Either the old contents survive intact or the
    /// new contents fully replace them.
    fn rewrite(&self, tasks: &[Task]) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        if let Err(e) = write_records(&tmp_path, tasks) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

fn write_records(path: &Path, tasks: &[Task]) -> Result<()> {
    let mut f = File::create(path)?;
    for task in tasks {
        f.write_all(&task.encode())?;
    }
    f.sync_all()?;
    Ok(())
}
