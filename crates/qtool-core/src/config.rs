//! Persistent connection preferences.
//!
//! Settings live in a single INI file. The default location is
//! `.configs.ini` next to the installed `qtool` executable; the CLI can point
//! the store anywhere else with `--config` or `QTOOL_CONFIG`.
//!
//! ```text
//! [CLUSTER]
//! address=127.0.0.1:8091
//! username=Administrator
//! password=secret
//! format=table
//! ```
//!
//! ## Consistency
//!
//! Reads parse the whole file; writes rewrite the whole file. Every write
//! holds an exclusive lock on `<file>.lock`, re-reads the current contents
//! under that lock, writes `<file>.tmp`, syncs it, and renames it into place.
//! A crash mid-write leaves either the old or the new file, and concurrent
//! writers serialize.
//!
//! The `<file>.lock` sibling stays in place after a write. Deleting it while
//! another writer waits on it would let a third process lock a fresh file
//! and write concurrently, so a single empty lock file persists beside the
//! settings instead. No `<file>.tmp` survives a completed write.
//!
//! Values are validated before the lock is taken. A value with a line break
//! or surrounding whitespace, or a key containing `=` or `:`, is refused
//! with [`Error::Config`] and nothing is written.
//!
//! ```rust,no_run
//! use qtool_core::config::{ConfigStore, CLUSTER_SECTION};
//!
//! let store = ConfigStore::open("/tmp/qtool.ini");
//! store.set(CLUSTER_SECTION, "address", "10.0.0.5:8091")?;
//! assert_eq!(store.get(CLUSTER_SECTION, "address", "x"), "10.0.0.5:8091");
//! # Ok::<(), qtool_core::Error>(())
//! ```

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use fs2::FileExt;
use tracing::{debug, warn};

use crate::ini::{IniDocument, check_entry};
use crate::{Error, Result};

/// Section holding cluster connection settings.
pub const CLUSTER_SECTION: &str = "CLUSTER";

/// File name used next to the executable.
pub const CONFIG_FILENAME: &str = ".configs.ini";

/// Address offered when nothing is stored yet.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8091";

/// Username offered when nothing is stored yet.
pub const DEFAULT_USERNAME: &str = "Administrator";

/// Keys recognized in the [`CLUSTER_SECTION`].
pub mod keys {
    /// Cluster address, `host[:port]`.
    pub const ADDRESS: &str = "address";
    /// Username for basic auth.
    pub const USERNAME: &str = "username";
    /// Password for basic auth.
    pub const PASSWORD: &str = "password";
    /// Preferred display format.
    pub const FORMAT: &str = "format";
    /// Query context as `bucket.scope`.
    pub const SCOPE: &str = "scope";
    /// Preferred collection within the scope.
    pub const COLLECTION: &str = "collection";
    /// Port of the query service.
    pub const QUERY_PORT: &str = "query_port";

    /// Every key in display order.
    pub const ALL: &[&str] = &[
        ADDRESS, USERNAME, PASSWORD, FORMAT, SCOPE, COLLECTION, QUERY_PORT,
    ];

    /// Whether the value of `key` must be masked on display.
    pub fn is_sensitive(key: &str) -> bool {
        PASSWORD.eq_ignore_ascii_case(key)
    }
}

/// File-backed store of `(section, key) -> value` settings.
///
/// The store holds only a path; every call reads the file afresh, so two
/// handles on the same path always observe each other's writes.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Use the settings file at `path`. Nothing is read or created yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use the default settings file location.
    pub fn at_default_location() -> Self {
        Self::open(default_config_path())
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value, falling back to `default` when the file, section, or key
    /// is missing or the file cannot be parsed.
    pub fn get(&self, section: &str, key: &str, default: &str) -> String {
        self.get_opt(section, key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Read a value if present. Never fails; unreadable files log a warning.
    pub fn get_opt(&self, section: &str, key: &str) -> Option<String> {
        self.load_lenient().get(section, key).map(str::to_string)
    }

    /// Snapshot of every entry in `section`, in file order.
    pub fn section(&self, section: &str) -> Vec<(String, String)> {
        self.load_lenient()
            .section(section)
            .map(|s| s.entries().to_vec())
            .unwrap_or_default()
    }

    /// Write a single value, creating the file and section as needed.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Config`] if the entry could not be read back
    /// unchanged, or if the existing file is unparsable.
    pub fn set(&self, section: &str, key: &str, value: &str) -> Result<()> {
        self.set_many(section, &[(key, value)])
    }

    /// Write several values in one rewrite of the file.
    pub fn set_many(&self, section: &str, pairs: &[(&str, &str)]) -> Result<()> {
        for (key, value) in pairs {
            check_entry(section, key, value)?;
        }
        self.update(|doc| {
            for (key, value) in pairs {
                doc.set(section, key, value)?;
            }
            Ok(true)
        })?;
        debug!(
            "Saved {} setting(s) in [{}] to {}",
            pairs.len(),
            section,
            self.path.display()
        );
        Ok(())
    }

    /// Remove a value. Returns whether the key existed.
    pub fn unset(&self, section: &str, key: &str) -> Result<bool> {
        self.update(|doc| Ok(doc.remove(section, key)))
    }

    /// Parse the file strictly. A missing file is an empty document.
    pub fn load(&self) -> Result<IniDocument> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => IniDocument::parse(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(IniDocument::new()),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn load_lenient(&self) -> IniDocument {
        match self.load() {
            Ok(doc) => doc,
            Err(err) => {
                warn!("failed to read settings at {}: {err}", self.path.display());
                IniDocument::new()
            },
        }
    }

    /// Read-modify-write under the lock. `apply` returns whether anything
    /// changed; unchanged documents are not rewritten.
    fn update<F>(&self, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut IniDocument) -> Result<bool>,
    {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let lock_path = sibling_path(&self.path, "lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)?;
        lock.lock_exclusive()?;

        let mut doc = self.load().map_err(|err| match err {
            Error::Parse { .. } => Error::Config(format!(
                "refusing to overwrite unparsable settings file {}: {err}",
                self.path.display()
            )),
            other => other,
        })?;

        let changed = apply(&mut doc)?;
        if changed {
            self.write_atomic(&doc)?;
        }

        // Dropping `lock` releases it once the rename has landed.
        drop(lock);
        Ok(changed)
    }

    fn write_atomic(&self, doc: &IniDocument) -> Result<()> {
        let tmp_path = sibling_path(&self.path, "tmp");
        let mut tmp = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(doc.to_string().as_bytes())?;
        tmp.sync_all()?;
        drop(tmp);

        #[cfg(target_os = "windows")]
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }

        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::Config(format!(
                "failed to commit {}: {err}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

/// Default location of the settings file.
///
/// `.configs.ini` beside the running executable; if the executable path is
/// unavailable, the platform config directory.
pub fn default_config_path() -> PathBuf {
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        return dir.join(CONFIG_FILENAME);
    }
    if let Some(project_dirs) = ProjectDirs::from("dev", "qtool", "qtool") {
        return project_dirs.config_dir().join(CONFIG_FILENAME);
    }
    PathBuf::from(CONFIG_FILENAME)
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
