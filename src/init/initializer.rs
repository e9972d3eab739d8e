use std::future::Future;
use std::io;
use std::process::Stdio;
use std::sync::Arc;
use log::{info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

use crate::adb::client::AdbClient;
use crate::config::types::Config;
use crate::error::InitError;
use crate::init::DeviceInitializer;

/// Arguments for the init tool: `-m <module> init --serial <serial> [--server <server>]`.
pub fn init_args(module: &str, serial: &str, server: Option<&str>) -> Vec<String> {
    let mut args: Vec<String> = ["-m", module, "init", "--serial", serial]
        .iter()
        .map(|arg| arg.to_string())
        .collect();

    if let Some(server) = server {
        args.push(String::from("--server"));
        args.push(server.to_string());
    }

    args
}

/// Copies everything from `reader` to `writer` as it arrives, without buffering lines.
pub async fn forward_output<R, W>(mut reader: R, mut writer: W) -> io::Result<u64>
    where R: AsyncRead + Unpin, W: AsyncWrite + Unpin
{
    let mut chunk = [0u8; 4096];
    let mut total: u64 = 0;

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            writer.flush().await?;
            return Ok(total);
        }

        writer.write_all(&chunk[..read]).await?;
        writer.flush().await?;
        total += read as u64;
    }
}

/// Wakes a device up with a shell command and then runs the init tool against it.
#[derive(Debug, Clone)]
pub struct Initializer {
    adb: AdbClient,
    config: Arc<Config>,
}

impl Initializer {
    pub fn new(adb: AdbClient, config: Config) -> Self {
        Initializer { adb, config: Arc::new(config) }
    }

    pub fn args_for(&self, serial: &str) -> Vec<String> {
        init_args(&self.config.module, serial, self.config.server.as_deref())
    }

    /// Runs the whole chain for one device, forwarding the output of the init tool to `out_writer`
    /// and `err_writer`. Returns the exit code, `None` if the tool was killed by a signal.
    pub async fn initialize_with<O, E>(&self, serial: &str, out_writer: O, err_writer: E) -> Result<Option<i32>, InitError>
        where O: AsyncWrite + Unpin, E: AsyncWrite + Unpin
    {
        // the output of the wake-up command is not interesting, but it must be drained
        self.adb.shell(serial, &self.config.shell_command).await?;

        let args = self.args_for(serial);
        info!("Running {} {}", self.config.program, args.join(" "));

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| InitError::Spawn { program: self.config.program.clone(), source })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let forward_stdout = async {
            if let Some(stdout) = stdout {
                if let Err(err) = forward_output(stdout, out_writer).await {
                    warn!("Failed to forward stdout of {}: {}", serial, err);
                }
            }
        };
        let forward_stderr = async {
            if let Some(stderr) = stderr {
                if let Err(err) = forward_output(stderr, err_writer).await {
                    warn!("Failed to forward stderr of {}: {}", serial, err);
                }
            }
        };

        let (_, _, status) = tokio::join!(forward_stdout, forward_stderr, child.wait());
        let status = status.map_err(|source| InitError::Wait { source })?;

        match status.code() {
            Some(code) => info!("child process exited with code {}", code),
            None => info!("child process exited with code null ({})", status),
        }

        Ok(status.code())
    }
}

impl DeviceInitializer for Initializer {
    fn initialize(&self, serial: String) -> impl Future<Output = Result<Option<i32>, InitError>> + Send {
        let this = self.clone();
        async move {
            this.initialize_with(&serial, tokio::io::stdout(), tokio::io::stderr()).await
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::AdbError;
    use crate::testing::{fake_adb, write_script};

    // prints its arguments on stdout, a marker on stderr and exits with 3
    fn fake_tool(name: &str) -> String {
        write_script(name, "printf '%s\\n' \"$@\"\nprintf 'raw\\tbytes\\r\\n' >&2\nexit 3\n")
            .to_string_lossy()
            .into_owned()
    }

    fn initializer(name: &str, server: Option<&str>) -> Initializer {
        let config = Config {
            program: fake_tool(&format!("{}-tool", name)),
            server: server.map(String::from),
            ..Config::default()
        };
        Initializer::new(AdbClient::new(fake_adb(&format!("{}-adb", name))), config)
    }

    #[test]
    fn args_without_server() {
        assert_eq!(
            init_args("uiautomator2", "emulator-5554", None),
            vec!["-m", "uiautomator2", "init", "--serial", "emulator-5554"],
        );
    }

    #[test]
    fn args_with_server() {
        let args = init_args("uiautomator2", "emulator-5554", Some("10.0.0.1:7100"));

        assert_eq!(
            args,
            vec!["-m", "uiautomator2", "init", "--serial", "emulator-5554", "--server", "10.0.0.1:7100"],
        );
    }

    #[tokio::test]
    async fn forwards_bytes_unmodified() {
        let input: &[u8] = b"\x1b[32mok\x1b[0m\r\npartial line \xff\x00";
        let mut output: Vec<u8> = vec![];

        let copied = forward_output(input, &mut output).await.unwrap();
        assert_eq!(copied, input.len() as u64);
        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn runs_tool_and_reports_exit_code() {
        let init = initializer("init-run", Some("10.0.0.1:7100"));
        let mut out: Vec<u8> = vec![];
        let mut err: Vec<u8> = vec![];

        let code = init.initialize_with("emulator-5554", &mut out, &mut err).await.unwrap();

        assert_eq!(code, Some(3));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-m\nuiautomator2\ninit\n--serial\nemulator-5554\n--server\n10.0.0.1:7100\n",
        );
        assert_eq!(err, b"raw\tbytes\r\n");
    }

    #[tokio::test]
    async fn no_server_flag_without_server() {
        let init = initializer("init-noserver", None);
        let mut out: Vec<u8> = vec![];

        init.initialize_with("abc", &mut out, tokio::io::sink()).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains("--server"));
    }

    #[tokio::test]
    async fn failed_shell_aborts_before_spawn() {
        let config = Config {
            shell_command: String::from("fail"),
            program: String::from("/nonexistent/adb-autoinit-test/python"),
            ..Config::default()
        };
        let init = Initializer::new(AdbClient::new(fake_adb("init-fail-adb")), config);

        let result = init.initialize_with("gone", tokio::io::sink(), tokio::io::sink()).await;
        assert!(matches!(result, Err(InitError::Shell { source: AdbError::ShellFailed { .. } })));
    }

    #[tokio::test]
    async fn missing_tool_is_a_spawn_error() {
        let config = Config {
            program: String::from("/nonexistent/adb-autoinit-test/python"),
            ..Config::default()
        };
        let init = Initializer::new(AdbClient::new(fake_adb("init-spawn-adb")), config);

        let result = init.initialize_with("emulator-5554", tokio::io::sink(), tokio::io::sink()).await;
        assert!(matches!(result, Err(InitError::Spawn { .. })));
    }
}
