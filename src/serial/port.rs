//! # Port Module
//!
//! Serial port access and the two background loops: the port watcher, which
//! enumerates devices while disconnected, and the reader/writer loop, which
//! streams bytes between an open port and the GUI. Both loops talk to the
//! GUI schedule exclusively through channels.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};
use tokio::io::{self, AsyncReadExt, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tokio::time::Duration;
use tokio_serial::SerialPortBuilderExt;
pub use tokio_serial::{SerialStream, available_ports};

use crate::error::{Result, SerialSimpleError};
use crate::serial::data::{PortCommand, PortEvent};
use crate::settings::Terminator;

/// Baud rates offered by the baud selector.
pub const COMMON_BAUD_RATES: &[u32] = &[
    4800, 9600, 19200, 38400, 57600, 115200, 230400, 460800, 500000, 576000, 921600, 1000000,
    1500000, 2000000,
];

/// How often the port watcher re-enumerates devices.
const WATCH_INTERVAL: Duration = Duration::from_millis(200);

/// Read buffer size of the reader/writer loop.
const READ_BUFFER_SIZE: usize = 1024;

/// Serial port selection: device name and baud rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortSettings {
    pub port_name: String,
    pub baud_rate: u32,
}

impl PortSettings {
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        PortSettings {
            port_name,
            baud_rate,
        }
    }
}

/// Opens the serial port described by `set`.
pub async fn open_port(set: &PortSettings) -> Result<SerialStream> {
    match tokio_serial::new(set.port_name.as_str(), set.baud_rate).open_native_async() {
        Ok(stream) => {
            info!("Opened serial port {}", set.port_name);
            Ok(stream)
        }
        Err(e) => Err(SerialSimpleError::port_open(set.port_name.as_str(), e.to_string())),
    }
}

/// True when the detected device list differs from the last published one.
pub(crate) fn ports_changed(last: &[String], current: &[String]) -> bool {
    last != current
}

/// Port watcher loop.
///
/// While `connected` is clear, lists available serial devices at a fixed
/// interval and publishes the name list whenever membership changes. Returns
/// once a connection is established; the plugin respawns it when the
/// connection closes.
pub async fn watch_ports(connected: Arc<AtomicBool>, event_tx: mpsc::UnboundedSender<PortEvent>) {
    let mut last: Vec<String> = Vec::new();
    while !connected.load(Ordering::SeqCst) {
        let names: Vec<String> = match available_ports() {
            Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
            Err(e) => {
                warn!("Error listing ports: {e}");
                Vec::new()
            }
        };
        if ports_changed(&last, &names) {
            if event_tx.send(PortEvent::Ports(names.clone())).is_err() {
                return;
            }
            last = names;
        }
        tokio::time::sleep(WATCH_INTERVAL).await;
    }
}

/// Reader/writer loop for one open port.
///
/// Forwards every chunk read from the stream to the GUI and drains queued
/// send commands, appending the terminator currently published on the watch
/// channel. Any I/O error, end of stream, or close command ends the loop,
/// which emits [`PortEvent::Closed`] on the way out.
pub async fn run_port(
    stream: SerialStream,
    port_name: String,
    mut cmd_rx: mpsc::UnboundedReceiver<PortCommand>,
    term_rx: watch::Receiver<Terminator>,
    event_tx: mpsc::UnboundedSender<PortEvent>,
) {
    let (mut reader, mut writer) = io::split(stream);
    let mut buffer = [0u8; READ_BUFFER_SIZE];
    loop {
        tokio::select! {
            read = reader.read(&mut buffer[..]) => match read {
                Ok(0) => break,
                Ok(n) => {
                    if event_tx.send(PortEvent::Data(buffer[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    info!("Read from {port_name} failed: {e}");
                    break;
                }
            },
            cmd = cmd_rx.recv() => match cmd {
                Some(PortCommand::Send(text)) => {
                    let mut bytes = text.into_bytes();
                    bytes.extend_from_slice(term_rx.borrow().as_bytes());
                    if let Err(e) = writer.write_all(&bytes).await {
                        info!("Write to {port_name} failed: {e}");
                        break;
                    }
                }
                Some(PortCommand::Close) | None => break,
            },
        }
    }
    let _ = event_tx.send(PortEvent::Closed(port_name));
}

/// Sent-message history with a recall cursor.
///
/// Entries are append-only; the cursor counts back from the newest entry
/// (`0` is the most recent) and is clamped to the valid range.
#[derive(Debug, Default)]
pub struct MessageHistory {
    entries: Vec<String>,
    cursor: usize,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sent message and point the cursor at it.
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        self.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Current recall position, counted back from the newest entry.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The entry at the current cursor, if any.
    pub fn current(&self) -> Option<&str> {
        let index = self.entries.len().checked_sub(1 + self.cursor)?;
        self.entries.get(index).map(String::as_str)
    }

    /// Move the cursor one entry toward the oldest and return it.
    pub fn recall_older(&mut self) -> Option<&str> {
        if !self.entries.is_empty() && self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Move the cursor one entry toward the newest and return it.
    pub fn recall_newer(&mut self) -> Option<&str> {
        self.cursor = self.cursor.saturating_sub(1);
        self.current()
    }

    /// Point the cursor at a specific recall position, clamped to range.
    pub fn select(&mut self, cursor: usize) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = cursor.min(self.entries.len() - 1);
        self.current()
    }

    /// Entries from newest to oldest, the order the history dropdown shows.
    pub fn newest_first(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().rev().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_recall_empty() {
        let mut history = MessageHistory::new();
        assert_eq!(history.recall_older(), None);
        assert_eq!(history.recall_newer(), None);
        assert_eq!(history.current(), None);
    }

    #[test]
    fn test_history_push_points_at_newest() {
        let mut history = MessageHistory::new();
        history.push("first".to_string());
        history.push("second".to_string());
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.current(), Some("second"));
    }

    #[test]
    fn test_history_recall_walks_older_then_newer() {
        let mut history = MessageHistory::new();
        for entry in ["a", "b", "c"] {
            history.push(entry.to_string());
        }
        assert_eq!(history.recall_older(), Some("b"));
        assert_eq!(history.recall_older(), Some("a"));
        assert_eq!(history.recall_newer(), Some("b"));
        assert_eq!(history.recall_newer(), Some("c"));
    }

    #[test]
    fn test_history_cursor_clamped_under_arbitrary_presses() {
        let mut history = MessageHistory::new();
        for entry in ["a", "b", "c"] {
            history.push(entry.to_string());
        }
        for _ in 0..10 {
            history.recall_older();
            assert!(history.cursor() < history.len());
        }
        assert_eq!(history.current(), Some("a"));
        for _ in 0..10 {
            history.recall_newer();
        }
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.current(), Some("c"));
    }

    #[test]
    fn test_history_select_clamps() {
        let mut history = MessageHistory::new();
        history.push("a".to_string());
        history.push("b".to_string());
        assert_eq!(history.select(99), Some("a"));
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn test_history_newest_first_order() {
        let mut history = MessageHistory::new();
        for entry in ["a", "b", "c"] {
            history.push(entry.to_string());
        }
        let listed: Vec<&str> = history.newest_first().collect();
        assert_eq!(listed, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_ports_changed_only_on_membership_change() {
        let old = vec!["/dev/ttyUSB0".to_string(), "/dev/ttyUSB1".to_string()];
        assert!(!ports_changed(&old, &old.clone()));
        assert!(ports_changed(&old, &["/dev/ttyUSB0".to_string()]));
        assert!(ports_changed(&[], &old));
    }
}
