use std::future::Future;

use crate::error::InitError;

pub mod initializer;

/// Something that can prepare a connected device, given its serial.
pub trait DeviceInitializer: Clone + Send + Sync + 'static {
    fn initialize(&self, serial: String) -> impl Future<Output = Result<Option<i32>, InitError>> + Send;
}
