use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceType {
    // connected and authorized, the only state in which a device is initialized
    Device,
    Offline,
    Unauthorized,
    Authorizing,
    Connecting,
    Bootloader,
    Recovery,
    Sideload,
    Host,
    // keeps the hint adb appends, e.g. "no permissions (missing udev rules? ...)"
    NoPermissions(String),
    Other(String),
}

impl DeviceType {
    pub fn parse(state: &str) -> Self {
        match state {
            "device" => DeviceType::Device,
            "offline" => DeviceType::Offline,
            "unauthorized" => DeviceType::Unauthorized,
            "authorizing" => DeviceType::Authorizing,
            "connecting" => DeviceType::Connecting,
            "bootloader" => DeviceType::Bootloader,
            "recovery" => DeviceType::Recovery,
            "sideload" => DeviceType::Sideload,
            "host" => DeviceType::Host,
            s if s.starts_with("no permissions") => DeviceType::NoPermissions(s.to_string()),
            other => DeviceType::Other(other.to_string()),
        }
    }

    pub fn is_connected(&self) -> bool {
        *self == DeviceType::Device
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = match self {
            DeviceType::Device => "device",
            DeviceType::Offline => "offline",
            DeviceType::Unauthorized => "unauthorized",
            DeviceType::Authorizing => "authorizing",
            DeviceType::Connecting => "connecting",
            DeviceType::Bootloader => "bootloader",
            DeviceType::Recovery => "recovery",
            DeviceType::Sideload => "sideload",
            DeviceType::Host => "host",
            DeviceType::NoPermissions(state) => state.as_str(),
            DeviceType::Other(other) => other.as_str(),
        };

        write!(f, "{}", result)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub kind: DeviceType,
}

impl Device {
    pub fn new(id: impl Into<String>, kind: DeviceType) -> Self {
        Device { id: id.into(), kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    Added(Device),
    Removed(Device),
    Changed(Device),
    End,
}
