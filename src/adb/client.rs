use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use log::{debug, info};
use tokio::process::Command;
use which::which;

use crate::adb::constants::{ADB_SDK_SUFFIX, ANDROID_SDK_VARS, TRACK_DEVICES_COMMAND};
use crate::adb::tracker::Tracker;
use crate::error::AdbError;

fn android_sdk_roots() -> Vec<PathBuf> {
    ANDROID_SDK_VARS
        .iter()
        .filter_map(|var| env::var_os(var))
        .map(PathBuf::from)
        .collect()
}

pub fn find_adb() -> Option<PathBuf> {
    if let Ok(path) = which("adb") {
        return Some(path);
    }

    for root in android_sdk_roots() {
        let candidate = root.join(ADB_SDK_SUFFIX);
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}

/// Talks to the adb server through the `adb` host binary.
#[derive(Debug, Clone)]
pub struct AdbClient {
    program: PathBuf,
}

impl AdbClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        AdbClient { program: program.into() }
    }

    /// Uses `program` when given, otherwise looks for adb in PATH and the android sdk.
    pub fn discover(program: Option<&Path>) -> Result<Self, AdbError> {
        let program = match program {
            Some(program) => program.to_path_buf(),
            None => find_adb().ok_or(AdbError::NotFound)?,
        };

        info!("Using adb {}", program.to_string_lossy());
        Ok(AdbClient::new(program))
    }

    #[cfg(test)]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Starts `adb track-devices` and subscribes to its device snapshots.
    pub fn track_devices(&self) -> Result<Tracker, AdbError> {
        let mut child = Command::new(&self.program)
            .arg(TRACK_DEVICES_COMMAND)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            AdbError::IOError { source: std::io::Error::other("adb track-devices has no stdout") }
        })?;

        Ok(Tracker::from_reader(stdout).with_child(child))
    }

    /// Runs `command` in a shell on the device and reads its output until the device closes it.
    pub async fn shell(&self, serial: &str, command: &str) -> Result<Vec<u8>, AdbError> {
        debug!("adb -s {} shell {}", serial, command);

        let output = Command::new(&self.program)
            .args(["-s", serial, "shell", command])
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(AdbError::ShellFailed {
                serial: serial.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
