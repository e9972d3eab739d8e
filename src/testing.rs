use std::env;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

/// Writes an executable shell script to a scratch directory unique to this test process.
pub fn write_script(name: &str, body: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("adb-autoinit-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// An `adb` stand-in: `track-devices` prints one snapshot, `shell fail` fails, any other shell
/// command is echoed back as `<serial>: <command>`.
pub fn fake_adb(name: &str) -> PathBuf {
    write_script(name, concat!(
        "if [ \"$1\" = \"track-devices\" ]; then\n",
        "  printf '0015emulator-5554\\tdevice\\n'\n",
        "  exit 0\n",
        "fi\n",
        "if [ \"$4\" = \"fail\" ]; then\n",
        "  echo \"error: device '$2' not found\" >&2\n",
        "  exit 1\n",
        "fi\n",
        "echo \"$2: $4\"\n",
    ))
}
