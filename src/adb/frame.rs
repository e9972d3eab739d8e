use crate::adb::constants::FRAME_LENGTH_PREFIX;
use crate::adb::types::{Device, DeviceType};
use crate::error::AdbError;

/// Parses a device list payload: one `serial\tstate` line per device.
pub fn parse_device_list(payload: &str) -> Vec<Device> {
    payload
        .lines()
        .filter_map(|line| {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                return None;
            }

            let (serial, state) = line.split_once('\t')?;
            Some(Device::new(serial, DeviceType::parse(state.trim())))
        })
        .collect()
}

/// Reassembles the length prefixed frames printed by `adb track-devices`, each frame is a
/// complete snapshot of the attached devices.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Returns the next complete snapshot, or `None` when more bytes are needed.
    pub fn next_frame(&mut self) -> Result<Option<Vec<Device>>, AdbError> {
        if self.buffer.len() < FRAME_LENGTH_PREFIX {
            return Ok(None);
        }

        let prefix = &self.buffer[..FRAME_LENGTH_PREFIX];
        let length = std::str::from_utf8(prefix)
            .ok()
            .and_then(|prefix| usize::from_str_radix(prefix, 16).ok())
            .ok_or_else(|| AdbError::MalformedFrame {
                prefix: String::from_utf8_lossy(prefix).into_owned(),
            })?;

        if self.buffer.len() < FRAME_LENGTH_PREFIX + length {
            return Ok(None);
        }

        let frame: Vec<u8> = self.buffer.drain(..FRAME_LENGTH_PREFIX + length).skip(FRAME_LENGTH_PREFIX).collect();
        Ok(Some(parse_device_list(&String::from_utf8_lossy(&frame))))
    }
}
