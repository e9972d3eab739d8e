use std::path::PathBuf;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PROGRAM: &str = "python";
pub const DEFAULT_MODULE: &str = "uiautomator2";
pub const DEFAULT_SHELL_COMMAND: &str = "am start -a android.intent.action.VIEW -d http://www.stackoverflow.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    // None means: look in PATH, then in the android sdk
    pub adb_path: Option<PathBuf>,
    pub program: String,
    pub module: String,
    // sent to the device before the init tool runs, output is discarded
    pub shell_command: String,
    pub server: Option<String>,
}

impl Config {
    /// Apply the command line flags on top of the values from the config file.
    pub fn with_overrides(mut self, adb_path: Option<PathBuf>, server: Option<String>) -> Self {
        if adb_path.is_some() {
            self.adb_path = adb_path;
        }

        if server.is_some() {
            self.server = server;
        }

        // `--server ""` behaves as if no server was given
        if self.server.as_deref() == Some("") {
            self.server = None;
        }

        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            adb_path: None,
            program: String::from(DEFAULT_PROGRAM),
            module: String::from(DEFAULT_MODULE),
            shell_command: String::from(DEFAULT_SHELL_COMMAND),
            server: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"server": "10.0.0.1:7100", "program": "python3"}"#).unwrap();

        assert_eq!(config.server.as_deref(), Some("10.0.0.1:7100"));
        assert_eq!(config.program, "python3");
        assert_eq!(config.module, DEFAULT_MODULE);
        assert_eq!(config.shell_command, DEFAULT_SHELL_COMMAND);
        assert_eq!(config.adb_path, None);
    }

    #[test]
    fn command_line_overrides_file() {
        let config = Config {
            server: Some(String::from("from-file")),
            ..Config::default()
        };

        let config = config.with_overrides(Some(PathBuf::from("/opt/adb")), Some(String::from("from-cli")));
        assert_eq!(config.server.as_deref(), Some("from-cli"));
        assert_eq!(config.adb_path, Some(PathBuf::from("/opt/adb")));

        let config = config.with_overrides(None, None);
        assert_eq!(config.server.as_deref(), Some("from-cli"));
    }

    #[test]
    fn empty_server_is_no_server() {
        let config = Config::default().with_overrides(None, Some(String::new()));
        assert_eq!(config.server, None);
    }
}
