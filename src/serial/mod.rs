//! # Serial Module
//!
//! Serial port communication for the terminal: the Tokio runtime, the shared
//! channels, and the Bevy systems that drain port events into GUI-visible
//! state each frame.

pub mod data;
pub mod encoding;
pub mod port;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy::prelude::*;
use log::{error, info};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::settings::{Settings, Terminator};
use data::{PortCommand, PortEvent, PortEvents};
use encoding::decode_chunk;
use port::{MessageHistory, PortSettings, open_port, run_port, watch_ports};

/// Plugin wiring the serial background loops into the Bevy app.
pub struct SerialPlugin;

impl Plugin for SerialPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_serial)
            .add_systems(Update, (pump_port_events, sync_terminator));
    }
}

/// GUI-side handle to an open connection. Present implies connected.
pub struct PortLink {
    cmd_tx: mpsc::UnboundedSender<PortCommand>,
}

/// GUI-visible serial state, mutated only from the main schedule.
#[derive(Resource)]
pub struct Serial {
    /// Selected device name and baud rate.
    pub set: PortSettings,
    /// Currently detected device names.
    pub ports: Vec<String>,
    /// Selected line terminator for outbound messages.
    pub terminator: Terminator,
    /// Previously sent messages with recall cursor.
    pub history: MessageHistory,
    /// Text currently in the send entry.
    pub input: String,
    /// Accumulated decoded output shown in the text view.
    pub output: String,
    link: Option<PortLink>,
}

impl Serial {
    /// Initial state from persisted settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Serial {
            set: PortSettings::new(settings.port.clone(), settings.baud),
            ports: Vec::new(),
            terminator: settings.terminator,
            history: MessageHistory::new(),
            input: String::new(),
            output: String::new(),
            link: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    /// Submit the send entry.
    ///
    /// A non-empty line is appended to history; while connected it is also
    /// enqueued for transmission and the entry is cleared. An empty entry is
    /// ignored entirely.
    pub fn submit_input(&mut self) {
        if self.input.is_empty() {
            return;
        }
        let text = self.input.clone();
        self.history.push(text.clone());
        if let Some(link) = &self.link {
            let _ = link.cmd_tx.send(PortCommand::Send(text));
            self.input.clear();
        }
    }

    /// Ask the reader/writer loop to stop. The link itself is cleared when
    /// the loop's closed event arrives.
    pub fn disconnect(&mut self) {
        if let Some(link) = &self.link {
            info!("Closing serial port {}", self.set.port_name);
            let _ = link.cmd_tx.send(PortCommand::Close);
        }
    }
}

/// Tokio runtime and the task-side shared state.
#[derive(Resource)]
pub struct SerialRuntime {
    runtime: Runtime,
    connected: Arc<AtomicBool>,
    term_tx: watch::Sender<Terminator>,
    watcher: Option<JoinHandle<()>>,
}

impl SerialRuntime {
    fn new(terminator: Terminator) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("failed to start tokio runtime");
        let (term_tx, _) = watch::channel(terminator);
        SerialRuntime {
            runtime,
            connected: Arc::new(AtomicBool::new(false)),
            term_tx,
            watcher: None,
        }
    }

    /// Publish the terminator selection to the writer loop.
    ///
    /// `send_replace` stores the value even while no connection is
    /// subscribed, so a connection opened later sees the latest selection.
    pub fn set_terminator(&self, terminator: Terminator) {
        if *self.term_tx.borrow() != terminator {
            self.term_tx.send_replace(terminator);
        }
    }

    /// Spawn the port watcher unless a previous one is still running.
    fn ensure_watcher(&mut self, event_tx: mpsc::UnboundedSender<PortEvent>) {
        let running = self.watcher.as_ref().is_some_and(|h| !h.is_finished());
        if !running {
            let connected = self.connected.clone();
            self.watcher = Some(self.runtime.spawn(watch_ports(connected, event_tx)));
        }
    }
}

/// System: create the serial resources and start the port watcher.
fn setup_serial(mut commands: Commands, settings: Res<Settings>) {
    let events = PortEvents::new();
    let mut runtime = SerialRuntime::new(settings.terminator);
    runtime.ensure_watcher(events.tx.clone());
    commands.insert_resource(Serial::from_settings(&settings));
    commands.insert_resource(runtime);
    commands.insert_resource(events);
}

/// Open the selected port and spawn its reader/writer loop.
///
/// A no-op while already connected or with no port selected.
pub fn connect(serial: &mut Serial, runtime: &SerialRuntime, events: &PortEvents) {
    if serial.is_connected() || serial.set.port_name.is_empty() {
        return;
    }
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    serial.link = Some(PortLink { cmd_tx });
    runtime.connected.store(true, Ordering::SeqCst);

    let set = serial.set.clone();
    let term_rx = runtime.term_tx.subscribe();
    let event_tx = events.tx.clone();
    runtime.runtime.spawn(async move {
        match open_port(&set).await {
            Ok(stream) => run_port(stream, set.port_name, cmd_rx, term_rx, event_tx).await,
            Err(e) => {
                error!("{e}");
                let _ = event_tx.send(PortEvent::Closed(set.port_name));
            }
        }
    });
}

/// System: drain port events into the GUI state.
fn pump_port_events(
    mut serial: ResMut<Serial>,
    mut events: ResMut<PortEvents>,
    mut runtime: ResMut<SerialRuntime>,
) {
    while let Ok(event) = events.rx.try_recv() {
        match event {
            PortEvent::Ports(names) => {
                if serial.set.port_name.is_empty()
                    && let Some(first) = names.first()
                {
                    serial.set.port_name = first.clone();
                }
                serial.ports = names;
            }
            PortEvent::Data(bytes) => {
                let text = decode_chunk(&bytes);
                serial.output.push_str(&text);
            }
            PortEvent::Closed(port_name) => {
                info!("Closed serial port {port_name}");
                serial.link = None;
                runtime.connected.store(false, Ordering::SeqCst);
                runtime.ensure_watcher(events.tx.clone());
            }
        }
    }
}

/// System: keep the writer loop's terminator in sync with the UI selection.
fn sync_terminator(serial: Res<Serial>, runtime: Res<SerialRuntime>) {
    runtime.set_terminator(serial.terminator);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_serial() -> Serial {
        Serial::from_settings(&Settings::default())
    }

    #[test]
    fn test_submit_empty_is_ignored() {
        let mut serial = test_serial();
        serial.submit_input();
        assert!(serial.history.is_empty());
    }

    #[test]
    fn test_submit_disconnected_keeps_entry_and_grows_history() {
        let mut serial = test_serial();
        serial.input = String::from("hello");
        serial.submit_input();
        assert_eq!(serial.history.len(), 1);
        assert_eq!(serial.input, "hello");
    }

    #[test]
    fn test_submit_connected_enqueues_and_clears_entry() {
        let mut serial = test_serial();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        serial.link = Some(PortLink { cmd_tx });
        serial.input = String::from("hello");
        serial.submit_input();
        assert_eq!(serial.history.len(), 1);
        assert!(serial.input.is_empty());
        assert_eq!(
            cmd_rx.try_recv().unwrap(),
            PortCommand::Send(String::from("hello"))
        );
    }

    #[test]
    fn test_disconnect_sends_close() {
        let mut serial = test_serial();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        serial.link = Some(PortLink { cmd_tx });
        serial.disconnect();
        assert_eq!(cmd_rx.try_recv().unwrap(), PortCommand::Close);
    }
}
