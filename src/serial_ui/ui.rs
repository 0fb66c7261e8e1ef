//! Widget helpers for the terminal UI.

use bevy_egui::egui;

use crate::serial::data::PortEvents;
use crate::serial::port::COMMON_BAUD_RATES;
use crate::serial::{self, Serial, SerialRuntime};
use crate::settings::Terminator;

/// draw port selector
pub fn draw_port_selector(ui: &mut egui::Ui, serial: &mut Serial) {
    ui.horizontal(|ui| {
        ui.label("Port");
        let selected = if serial.set.port_name.is_empty() {
            String::from("Select a port")
        } else {
            serial.set.port_name.clone()
        };
        let ports = serial.ports.clone();
        egui::ComboBox::from_id_salt("port_selector")
            .width(180.0)
            .selected_text(selected)
            .show_ui(ui, |ui| {
                for port in &ports {
                    ui.selectable_value(&mut serial.set.port_name, port.clone(), port);
                }
            });
    });
}

/// draw baud rate selector
pub fn draw_baud_rate_selector(ui: &mut egui::Ui, serial: &mut Serial) {
    ui.horizontal(|ui| {
        ui.label("Baud");
        egui::ComboBox::from_id_salt("baud_selector")
            .width(90.0)
            .selected_text(serial.set.baud_rate.to_string())
            .show_ui(ui, |ui| {
                for baud_rate in COMMON_BAUD_RATES {
                    ui.selectable_value(
                        &mut serial.set.baud_rate,
                        *baud_rate,
                        baud_rate.to_string(),
                    );
                }
            });
    });
}

/// draw terminator selector
pub fn draw_terminator_selector(ui: &mut egui::Ui, serial: &mut Serial) {
    ui.horizontal(|ui| {
        ui.label("Terminator");
        egui::ComboBox::from_id_salt("terminator_selector")
            .width(90.0)
            .selected_text(serial.terminator.label())
            .show_ui(ui, |ui| {
                for terminator in Terminator::ALL {
                    ui.selectable_value(&mut serial.terminator, terminator, terminator.label());
                }
            });
    });
}

/// draw connect and disconnect buttons
pub fn draw_connect_buttons(
    ui: &mut egui::Ui,
    serial: &mut Serial,
    runtime: &SerialRuntime,
    events: &PortEvents,
) {
    ui.horizontal(|ui| {
        let connected = serial.is_connected();
        if ui
            .add_enabled(!connected, egui::Button::new("Connect"))
            .clicked()
        {
            serial::connect(serial, runtime, events);
        }
        if ui
            .add_enabled(connected, egui::Button::new("Disconnect"))
            .clicked()
        {
            serial.disconnect();
        }
    });
}

/// draw the scrolling text output
pub fn draw_output_view(ui: &mut egui::Ui, serial: &Serial) {
    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            if serial.output.is_empty() {
                ui.heading(egui::RichText::new("Data Receive Window").color(egui::Color32::GRAY));
            } else {
                ui.label(egui::RichText::new(serial.output.as_str()).monospace());
            }
        });
}

/// draw the send entry with send button
pub fn draw_send_entry(ui: &mut egui::Ui, serial: &mut Serial) {
    ui.horizontal(|ui| {
        let entry_width = (ui.available_width() - 60.0).max(80.0);
        let entry = ui.add_sized(
            [entry_width, 22.0],
            egui::TextEdit::singleline(&mut serial.input).font(egui::FontId::monospace(14.0)),
        );
        if entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            serial.submit_input();
            entry.request_focus();
        }
        if ui.button("Send").clicked() {
            serial.submit_input();
        }
    });
}

/// draw the history dropdown, newest entry first
pub fn draw_history_dropdown(ui: &mut egui::Ui, serial: &mut Serial) {
    let entries: Vec<String> = serial.history.newest_first().map(str::to_string).collect();
    let selected = serial
        .history
        .current()
        .map_or_else(|| String::from("History"), str::to_string);
    egui::ComboBox::from_id_salt("history_dropdown")
        .width(ui.available_width())
        .selected_text(selected)
        .show_ui(ui, |ui| {
            for (index, entry) in entries.iter().enumerate() {
                if ui
                    .selectable_label(serial.history.cursor() == index, entry)
                    .clicked()
                {
                    serial.history.select(index);
                    serial.input = entry.clone();
                }
            }
        });
}
