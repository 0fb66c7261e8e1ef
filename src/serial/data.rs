//! Channel data types connecting the background I/O tasks to the GUI schedule.

use bevy::prelude::Resource;
use tokio::sync::mpsc;

/// Events published by the background tasks, drained by the GUI every frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortEvent {
    /// Detected device names, sent only when membership changed.
    Ports(Vec<String>),
    /// Raw bytes read from the open port.
    Data(Vec<u8>),
    /// The reader/writer loop ended and the port is gone.
    Closed(String),
}

/// Commands consumed by the reader/writer loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PortCommand {
    /// Write this line followed by the currently selected terminator.
    Send(String),
    /// Stop the loop and drop the stream.
    Close,
}

/// GUI-side ends of the port event channel.
#[derive(Resource)]
pub struct PortEvents {
    pub tx: mpsc::UnboundedSender<PortEvent>,
    pub rx: mpsc::UnboundedReceiver<PortEvent>,
}

impl PortEvents {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for PortEvents {
    fn default() -> Self {
        Self::new()
    }
}
