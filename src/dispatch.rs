use log::{info, warn};
use tokio::spawn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::adb::tracker::Tracker;
use crate::adb::types::{Device, TrackerEvent};
use crate::init::DeviceInitializer;

/// The device to initialize for `event`, if any. Only devices that were plugged in or changed
/// into the connected state qualify.
pub fn initialization_target(event: &TrackerEvent) -> Option<&Device> {
    match event {
        TrackerEvent::Added(device) | TrackerEvent::Changed(device) if device.kind.is_connected() => Some(device),
        _ => None,
    }
}

pub fn describe(event: &TrackerEvent) -> String {
    match event {
        TrackerEvent::Added(device) => format!("Device {}({}) was plugged in", device.id, device.kind),
        TrackerEvent::Removed(device) => format!("Device {} was unplugged", device.id),
        TrackerEvent::Changed(device) => format!("Device {} was changed to {}", device.id, device.kind),
        TrackerEvent::End => String::from("Tracking stopped"),
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher<I: DeviceInitializer> {
    initializer: I,
}

impl<I: DeviceInitializer> Dispatcher<I> {
    pub fn new(initializer: I) -> Self {
        Dispatcher { initializer }
    }

    /// Logs the event and starts an independent initialization task when the event calls for
    /// one. A failing initialization only ends its own task.
    pub fn dispatch(&self, event: &TrackerEvent) -> Option<JoinHandle<()>> {
        info!("{}", describe(event));

        let device = initialization_target(event)?;
        let serial = device.id.clone();
        let initializer = self.initializer.clone();

        Some(spawn(async move {
            if let Err(err) = initializer.initialize(serial.clone()).await {
                warn!("Initializing device {} failed: {}", serial, err);
            }
        }))
    }
}

/// Dispatches tracker events until adb stops reporting or `cancel` is cancelled. Returns the
/// initialization tasks that were still running at that point.
pub async fn run_tracker<I: DeviceInitializer>(tracker: &mut Tracker, dispatcher: &Dispatcher<I>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
    let mut running: Vec<JoinHandle<()>> = vec![];

    'mainloop: loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Tracking cancelled");
                break 'mainloop;
            },
            event = tracker.next_event() => match event {
                Some(event) => {
                    running.retain(|handle| !handle.is_finished());
                    running.extend(dispatcher.dispatch(&event));
                    if event == TrackerEvent::End {
                        break 'mainloop;
                    }
                },
                None => break 'mainloop,
            },
        }
    }

    running
}
