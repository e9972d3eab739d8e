use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::str::Utf8Error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine path to config file")]
    NoConfigPath,

    #[error("Failed to determine path to lock file")]
    NoLockPath,

    #[error("Failed to open lock file {}: {source}", path.to_string_lossy())]
    LockFile { path: PathBuf, source: io::Error },

    #[error("Failed to acquire file lock, is another instance already tracking devices? {source}")]
    CanNotLock { source: io::Error },

    #[error("Failed to decode config as utf-8: {source}")]
    Utf8Error { #[from] source: Utf8Error },

    #[error("Failed to read config file: {source}")]
    IOError { #[from] source: io::Error },

    #[error("Failed to parse config file: {source}")]
    JsonError { #[from] source: serde_json::Error },
}

impl ConfigError {
    pub fn is_file_not_found_error(&self) -> bool {
        match self {
            ConfigError::IOError { source } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum AdbError {
    #[error("Could not find the adb binary in PATH, ANDROID_HOME or ANDROID_SDK_ROOT")]
    NotFound,

    #[error("Failed to communicate with adb: {source}")]
    IOError { #[from] source: io::Error },

    #[error("Malformed length prefix in adb output: {prefix:?}")]
    MalformedFrame { prefix: String },

    #[error("adb shell on {serial} failed ({status}): {stderr}")]
    ShellFailed { serial: String, status: ExitStatus, stderr: String },
}

#[derive(Error, Debug)]
pub enum InitError {
    #[error("Failed to run wake-up command: {source}")]
    Shell { #[from] source: AdbError },

    #[error("Failed to spawn {program}: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("Failed to wait for init process: {source}")]
    Wait { source: io::Error },
}

#[derive(Error, Debug)]
pub enum AppRunError {
    #[error("Failed to start tracking (config): {source}")]
    ConfigError { #[from] source: ConfigError },

    #[error("Failed to start tracking (adb): {source}")]
    AdbError { #[from] source: AdbError },

    #[error("Failed to start tokio runtime: {source}")]
    Runtime { source: io::Error },
}
