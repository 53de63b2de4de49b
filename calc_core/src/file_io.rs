//! # File I/O Module
//!
//! Handles the saved-results file with safety features:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Serialize concurrent writers. Writers inside one
//!   process queue on a mutex; other processes are waited on through the
//!   `.lock` file for up to [`LOCK_WAIT`]
//! - **Version validation**: Ensure schema compatibility
//!
//! ## File Format
//!
//! Results are saved as JSON (see [`RecordFile`]). Lock files use a
//! `.lock` extension suffix with metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use calc_core::file_io::{append_record, load_records};
//! use calc_core::records::CalculationRecord;
//! use calc_core::calculations::{CalculationResult, CalculatorKind};
//! use std::path::Path;
//!
//! let path = Path::new("beltworks-results.json");
//! let record = CalculationRecord::new(
//!     CalculatorKind::PulleyTorque,
//!     serde_json::json!({ "power": 15.0, "rotational_speed": 1450.0 }),
//!     CalculationResult::new("Pulley torque", "", 98.8, "N·m"),
//! );
//!
//! // Takes the lock, appends, saves atomically, releases the lock
//! append_record(path, record, 200, "calc_cli")?;
//!
//! let file = load_records(path)?;
//! println!("{} saved results", file.len());
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::records::{CalculationRecord, RecordFile, SCHEMA_VERSION};

/// How long [`append_record`] waits for another process to release the lock.
pub const LOCK_WAIT: Duration = Duration::from_secs(5);

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Serializes appends made from this process. The `.lock` file carries our
/// own pid, which never looks stale to a second writer in the same process.
static APPEND_GUARD: Mutex<()> = Mutex::new(());

/// Lock file metadata stored in .lock files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Owner identifier (process role or username)
    pub owner: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(owner: impl Into<String>) -> Self {
        LockInfo {
            owner: owner.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. .lock file with metadata for visibility
pub struct FileLock {
    /// Path to the lock file
    lock_path: PathBuf,
    /// The underlying file handle (keeps OS lock)
    _lock_file: File,
    /// Lock metadata
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a data file.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired successfully
    /// * `Err(CalcError::FileLocked)` - Another process holds the lock
    pub fn acquire(path: &Path, owner: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(owner);

        // An existing, live lock file means someone else is writing
        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(CalcError::file_locked(
                        path.display().to_string(),
                        format!("{} ({}, pid {})", existing.owner, existing.machine, existing.pid),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                // Lock is stale, we can take it over
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| {
                CalcError::file_error("create lock", lock_path.display().to_string(), e.to_string())
            })?;

        // Non-blocking exclusive OS-level lock
        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        let lock_json = serde_json::to_string_pretty(&info)
            .map_err(|e| CalcError::serialization(e.to_string()))?;

        lock_file.write_all(lock_json.as_bytes()).map_err(|e| {
            CalcError::file_error("write lock", lock_path.display().to_string(), e.to_string())
        })?;

        lock_file.sync_all().map_err(|e| {
            CalcError::file_error("sync lock", lock_path.display().to_string(), e.to_string())
        })?;

        Ok(FileLock {
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Acquire the lock, retrying while another writer holds it.
    ///
    /// Gives up with the last [`CalcError::FileLocked`] once `wait` has
    /// elapsed.
    pub fn acquire_within(path: &Path, owner: &str, wait: Duration) -> CalcResult<Self> {
        let started = Instant::now();
        loop {
            match FileLock::acquire(path, owner) {
                Err(e) if e.is_recoverable() && started.elapsed() < wait => {
                    thread::sleep(LOCK_RETRY_INTERVAL);
                }
                result => return result,
            }
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Remove the lock file
        let _ = fs::remove_file(&self.lock_path);
        // OS lock is released when _lock_file is dropped
    }
}

/// Get the lock file path for a data file
fn lock_path_for(data_path: &Path) -> PathBuf {
    let mut lock_path = data_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// Get the temp file path used during atomic saves
fn tmp_path_for(data_path: &Path) -> PathBuf {
    let mut tmp_path = data_path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

/// Read lock info from a lock file
fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(|e| CalcError::serialization(e.to_string()))
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;

    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Check if a lock is stale (the process that created it is no longer running)
fn is_lock_stale(info: &LockInfo) -> bool {
    if let Some(our_machine) = hostname() {
        if info.machine == our_machine {
            // Same machine - check if process is still running
            #[cfg(unix)]
            {
                if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                    return true;
                }
            }
        }
    }

    // If lock is more than 24 hours old, consider it stale
    let age = Utc::now() - info.locked_at;
    age.num_hours() > 24
}

/// Save a results file with atomic write semantics.
///
/// The save process:
/// 1. Serialize to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename over the target (atomic on most filesystems)
pub fn save_records(file: &RecordFile, path: &Path) -> CalcResult<()> {
    let json =
        serde_json::to_string_pretty(file).map_err(|e| CalcError::serialization(e.to_string()))?;

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        CalcError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        CalcError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        CalcError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        // Clean up temp file if rename fails
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a results file.
///
/// A file that does not exist yet loads as an empty [`RecordFile`].
///
/// # Returns
///
/// * `Ok(RecordFile)` - Successfully loaded
/// * `Err(CalcError::VersionMismatch)` - File version is incompatible
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_records(path: &Path) -> CalcResult<RecordFile> {
    if !path.exists() {
        return Ok(RecordFile::new());
    }

    let contents = read_to_string(path, "read")?;

    let file: RecordFile = serde_json::from_str(&contents).map_err(|e| {
        CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e))
    })?;

    validate_version(&file.version)?;

    Ok(file)
}

/// Append one record under an exclusive lock and save atomically.
///
/// `max_records` caps the file; the oldest records are dropped first.
/// Concurrent calls wait for each other instead of failing.
pub fn append_record(
    path: &Path,
    record: CalculationRecord,
    max_records: usize,
    owner: &str,
) -> CalcResult<RecordFile> {
    let _guard = APPEND_GUARD.lock().unwrap_or_else(|e| e.into_inner());
    let _lock = FileLock::acquire_within(path, owner, LOCK_WAIT)?;

    let mut file = load_records(path)?;
    file.insert(record, max_records);
    save_records(&file, path)?;

    Ok(file)
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION
        .split('.')
        .filter_map(|p| p.parse().ok())
        .collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions, a newer minor version may contain breaking changes
    if current_parts[0] == 0
        && file_parts.len() > 1
        && current_parts.len() > 1
        && file_parts[1] > current_parts[1]
    {
        return Err(mismatch());
    }

    Ok(())
}
