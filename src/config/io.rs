use std::env::{current_exe};
use std::path::{Path, PathBuf};
use std::fs::OpenOptions;
use std::str;
use directories_next::{ProjectDirs};
use fd_lock::{RwLock, RwLockWriteGuard};
use log::{debug, info, warn};
use serde_json;

use crate::config::types::Config;
use crate::error::ConfigError;

const LOCK_FILE_NAME: &str = "adb-autoinit.lock";

// creates a path to adb-autoinit.json in the same directory as the executable
// this is useful when the tool is shipped together with a python environment
fn get_portable_config_path() -> Option<PathBuf> {
    match current_exe() {
        Ok(mut path) => {
            // /opt/tools/adb-autoinit => /opt/tools/adb-autoinit.json
            if !path.set_extension("json") {
                warn!("current exe has no filename: {}", path.to_string_lossy());
                return None
            }

            Some(path)
        },
        Err(err) => {
            warn!("failed to get current exe path: {:?}", err);
            None
        },
    }
}

// creates a path to adb-autoinit.json in an os dependent standard directory, such as ~/.config on linux
fn get_local_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "adb-autoinit").map(|dirs| {
        dirs.config_dir().join("adb-autoinit.json")
    })
}

fn get_config_path() -> Result<PathBuf, ConfigError> {
    if let Some(path) = get_portable_config_path() {
        match std::fs::metadata(&path) {
            Ok(attr) => {
                if attr.is_file() {
                    return Ok(path);
                }
            }
            Err(err) => {
                debug!("Could not read metadata of: {}; Using local path instead. ({:?})", path.to_string_lossy(), err);
            },
        }
    }

    match get_local_config_path() {
        None => Err(ConfigError::NoConfigPath),
        Some(path) => Ok(path),
    }
}

// The lock does not depend on which config file is used: every tracker of this user competes for
// the same lock, so no device is initialized twice.
fn get_lock_dir() -> Result<PathBuf, ConfigError> {
    let dirs = ProjectDirs::from("", "", "adb-autoinit").ok_or(ConfigError::NoLockPath)?;

    match dirs.runtime_dir() {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(dirs.data_local_dir().to_path_buf()),
    }
}

pub struct InstanceLocker {
    rw_lock: RwLock<std::fs::File>,
}

impl InstanceLocker {
    /// Opens the lock file in `lock_dir`, or in the per-user runtime (or local data) directory.
    pub fn open(lock_dir: Option<&Path>) -> Result<Self, ConfigError> {
        let directory = match lock_dir {
            Some(dir) => dir.to_path_buf(),
            None => get_lock_dir()?,
        };
        let path = directory.join(LOCK_FILE_NAME);
        debug!("Using lock file {}", path.to_string_lossy());

        let file = std::fs::create_dir_all(&directory).and_then(|_| {
            OpenOptions::new()
                .read(true)
                .write(true)
                .truncate(false)
                .create(true)
                .open(&path)
        });

        match file {
            Ok(file) => Ok(InstanceLocker { rw_lock: RwLock::new(file) }),
            Err(source) => Err(ConfigError::LockFile { path, source }),
        }
    }

    pub fn lock(&mut self) -> Result<RwLockWriteGuard<'_, std::fs::File>, ConfigError> {
        match self.rw_lock.try_write() {
            Ok(guard) => Ok(guard),
            Err(source) => {
                return Err(ConfigError::CanNotLock { source });
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigIO {
    path: PathBuf,
}

impl ConfigIO {
    /// Use `path` when given, otherwise the portable config next to the executable or the
    /// per-user config directory.
    pub fn new(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path,
            None => get_config_path()?,
        };
        Ok(ConfigIO { path })
    }

    pub async fn read(&self) -> Result<Config, ConfigError> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(source) => {
                let err = ConfigError::from(source);
                if err.is_file_not_found_error() {
                    info!("No config file at {}, using defaults", self.path.to_string_lossy());
                    return Ok(Config::default());
                }
                return Err(err);
            },
        };

        info!("Using config file {}", self.path.to_string_lossy());

        let content = str::from_utf8(&content)?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_json::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DEFAULT_PROGRAM;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("adb-autoinit-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn missing_file_reads_as_default() {
        let dir = scratch_dir("missing");
        let io = ConfigIO::new(Some(dir.join("nope.json"))).unwrap();

        assert_eq!(io.read().await.unwrap(), Config::default());
    }

    #[tokio::test]
    async fn reads_camel_case_json() {
        let dir = scratch_dir("read");
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"shellCommand": "input keyevent 224", "adbPath": "/sdk/adb"}"#).unwrap();

        let config = ConfigIO::new(Some(path)).unwrap().read().await.unwrap();
        assert_eq!(config.shell_command, "input keyevent 224");
        assert_eq!(config.adb_path, Some(PathBuf::from("/sdk/adb")));
        assert_eq!(config.program, DEFAULT_PROGRAM);
    }

    #[tokio::test]
    async fn invalid_json_is_an_error() {
        let dir = scratch_dir("invalid");
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ConfigIO::new(Some(path)).unwrap().read().await.unwrap_err();
        assert!(matches!(err, ConfigError::JsonError { .. }));
    }

    #[test]
    fn second_lock_is_refused() {
        let dir = scratch_dir("lock");

        let mut first = InstanceLocker::open(Some(&dir)).unwrap();
        let _guard = first.lock().unwrap();

        let mut second = InstanceLocker::open(Some(&dir)).unwrap();
        assert!(matches!(second.lock(), Err(ConfigError::CanNotLock { .. })));
    }

    #[test]
    fn lock_is_shared_between_config_files() {
        let lock_dir = scratch_dir("lock-shared");
        let first_config = ConfigIO::new(Some(scratch_dir("lock-shared-a").join("c.json"))).unwrap();
        let second_config = ConfigIO::new(Some(scratch_dir("lock-shared-b").join("c.json"))).unwrap();
        assert_ne!(first_config.path, second_config.path);

        let mut first = InstanceLocker::open(Some(&lock_dir)).unwrap();
        let _guard = first.lock().unwrap();

        let mut second = InstanceLocker::open(Some(&lock_dir)).unwrap();
        assert!(matches!(second.lock(), Err(ConfigError::CanNotLock { .. })));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn unwritable_config_dir_still_locks() {
        let config = ConfigIO::new(Some(PathBuf::from("/proc/self/adb-autoinit.json"))).unwrap();
        assert_eq!(config.read().await.unwrap(), Config::default());

        let mut locker = InstanceLocker::open(Some(&scratch_dir("lock-proc"))).unwrap();
        assert!(locker.lock().is_ok());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unwritable_lock_dir_names_the_lock_file() {
        match InstanceLocker::open(Some(Path::new("/proc/self/adb-autoinit"))) {
            Err(ConfigError::LockFile { path, .. }) => {
                assert_eq!(path, PathBuf::from("/proc/self/adb-autoinit").join(LOCK_FILE_NAME));
            },
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("lock file in /proc should not open"),
        }
    }
}
