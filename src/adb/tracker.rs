use futures::{SinkExt, StreamExt};
use futures::channel::mpsc::{channel, Receiver, Sender};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::spawn;
use tokio::task::JoinHandle;

use crate::adb::constants::EVENT_CHANNEL_SIZE;
use crate::adb::frame::FrameDecoder;
use crate::adb::types::{Device, TrackerEvent};
use crate::error::AdbError;

/// Compares two snapshots of the attached devices.
///
/// New serials are reported as `Added`, serials whose type differs as `Changed` (both in the
/// order of `current`), serials that disappeared as `Removed` (in the order of `previous`).
pub fn diff_devices(previous: &[Device], current: &[Device]) -> Vec<TrackerEvent> {
    let mut events = vec![];

    for device in current {
        match previous.iter().find(|old| old.id == device.id) {
            None => events.push(TrackerEvent::Added(device.clone())),
            Some(old) if old.kind != device.kind => events.push(TrackerEvent::Changed(device.clone())),
            Some(_) => {},
        }
    }

    for device in previous {
        if !current.iter().any(|new| new.id == device.id) {
            events.push(TrackerEvent::Removed(device.clone()));
        }
    }

    events
}

async fn read_snapshots<R>(mut reader: R, sender: &mut Sender<TrackerEvent>) -> Result<(), AdbError>
    where R: AsyncRead + Unpin
{
    let mut decoder = FrameDecoder::new();
    let mut devices: Vec<Device> = vec![];
    let mut chunk = [0u8; 1024];

    loop {
        let read = reader.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        decoder.push(&chunk[..read]);

        while let Some(snapshot) = decoder.next_frame()? {
            debug!("adb reported {} device(s)", snapshot.len());

            for event in diff_devices(&devices, &snapshot) {
                if sender.send(event).await.is_err() {
                    // nobody is listening anymore
                    return Ok(());
                }
            }
            devices = snapshot;
        }
    }
}

fn read_snapshots_task<R>(reader: R, mut sender: Sender<TrackerEvent>) -> JoinHandle<()>
    where R: AsyncRead + Unpin + Send + 'static
{
    spawn(async move {
        if let Err(err) = read_snapshots(reader, &mut sender).await {
            warn!("Reading from adb track-devices failed: {}", err);
        }

        let _ = sender.send(TrackerEvent::End).await;
    })
}

/// A running device subscription. Dropping the tracker stops the `adb track-devices` process.
pub struct Tracker {
    events: Receiver<TrackerEvent>,
    reader_handle: JoinHandle<()>,
    // kept so that the process lives (and dies) with the tracker
    _child: Option<Child>,
}

impl Tracker {
    pub fn from_reader<R>(reader: R) -> Self
        where R: AsyncRead + Unpin + Send + 'static
    {
        let (tx, rx) = channel::<TrackerEvent>(EVENT_CHANNEL_SIZE);

        Tracker {
            events: rx,
            reader_handle: read_snapshots_task(reader, tx),
            _child: None,
        }
    }

    pub(crate) fn with_child(mut self, child: Child) -> Self {
        self._child = Some(child);
        self
    }

    /// Waits for the next event. `TrackerEvent::End` is delivered once when adb stops reporting,
    /// after that `None` is returned.
    pub async fn next_event(&mut self) -> Option<TrackerEvent> {
        self.events.next().await
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        self.reader_handle.abort();
    }
}
