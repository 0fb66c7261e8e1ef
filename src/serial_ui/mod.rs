//! # Serial UI Module
//!
//! This module provides the user interface for the terminal, composed of:
//! - Top `egui::TopBottomPanel`: port/baud/terminator selectors and
//!   connect/disconnect buttons
//! - Central `egui::CentralPanel`: scrolling text output of received data
//! - Bottom `egui::TopBottomPanel`: send entry with history dropdown
//!
//! It also owns settings persistence: the current selections and window size
//! are written back to the settings file when the app exits.

pub mod ui;

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use log::{info, warn};

use crate::serial::data::PortEvents;
use crate::serial::{Serial, SerialRuntime};
use crate::settings::Settings;
use ui::{
    draw_baud_rate_selector, draw_connect_buttons, draw_history_dropdown, draw_output_view,
    draw_port_selector, draw_send_entry, draw_terminator_selector,
};

/// Plugin for the terminal UI.
pub struct SerialUiPlugin;

impl Plugin for SerialUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .insert_resource(ClearColor(Color::srgb(0.96875, 0.96875, 0.96875)))
            .add_systems(Startup, setup_camera_system)
            .add_systems(Last, save_settings_on_exit)
            .add_systems(EguiPrimaryContextPass, (serial_ui, history_recall).chain());
    }
}

fn setup_camera_system(mut commands: Commands) {
    // Basic 2D camera required for egui overlay.
    commands.spawn(Camera2d);
}

/// Composite UI: control panel, output view, send area.
fn serial_ui(
    mut contexts: EguiContexts,
    mut serial: ResMut<Serial>,
    runtime: Res<SerialRuntime>,
    events: Res<PortEvents>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::TopBottomPanel::top("control_panel").show(ctx, |ui| {
        ui.add_space(4.0);
        draw_port_selector(ui, &mut serial);
        draw_baud_rate_selector(ui, &mut serial);
        draw_terminator_selector(ui, &mut serial);
        draw_connect_buttons(ui, &mut serial, &runtime, &events);
        ui.add_space(4.0);
    });

    egui::TopBottomPanel::bottom("send_panel").show(ctx, |ui| {
        ui.add_space(4.0);
        draw_send_entry(ui, &mut serial);
        draw_history_dropdown(ui, &mut serial);
        ui.add_space(4.0);
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        draw_output_view(ui, &serial);
    });
}

/// System: navigate sent-message history with Up/Down arrows.
fn history_recall(keyboard_input: Res<ButtonInput<KeyCode>>, mut serial: ResMut<Serial>) {
    if keyboard_input.just_pressed(KeyCode::ArrowUp)
        && let Some(entry) = serial.history.recall_older().map(str::to_string)
    {
        serial.input = entry;
    }
    if keyboard_input.just_pressed(KeyCode::ArrowDown)
        && let Some(entry) = serial.history.recall_newer().map(str::to_string)
    {
        serial.input = entry;
    }
}

/// System: persist selections and window geometry when the app is exiting.
/// Uses the Last schedule so it runs even during app shutdown.
fn save_settings_on_exit(
    mut exit_messages: MessageReader<AppExit>,
    mut serial: ResMut<Serial>,
    mut settings: ResMut<Settings>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    if exit_messages.is_empty() {
        return;
    }
    exit_messages.clear();

    serial.disconnect();

    settings.baud = serial.set.baud_rate;
    settings.port = serial.set.port_name.clone();
    settings.terminator = serial.terminator;
    if let Ok(window) = windows.single() {
        settings.set_geometry(window.width().round() as u32, window.height().round() as u32);
    }
    match settings.save() {
        Ok(()) => info!("Saved settings"),
        Err(e) => warn!("Failed to save settings: {e}"),
    }
}
