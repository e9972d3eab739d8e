/**
 * The adb sub command that keeps the connection to the adb server open and prints the device
 * list every time it changes.
 */
pub const TRACK_DEVICES_COMMAND: &str = "track-devices";

/**
 * Number of ASCII hex digits in front of every payload printed by `adb track-devices`.
 */
pub const FRAME_LENGTH_PREFIX: usize = 4;

/**
 * Capacity of the channel between the adb reader task and the dispatcher.
 */
pub const EVENT_CHANNEL_SIZE: usize = 64;

/**
 * Environment variables that may point at an android sdk, in order of preference.
 */
pub const ANDROID_SDK_VARS: [&str; 2] = ["ANDROID_HOME", "ANDROID_SDK_ROOT"];

#[cfg(target_os = "windows")]
pub const ADB_SDK_SUFFIX: &str = "platform-tools/adb.exe";

#[cfg(not(target_os = "windows"))]
pub const ADB_SDK_SUFFIX: &str = "platform-tools/adb";
