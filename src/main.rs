use bevy::prelude::*;
use bevy::window::PresentMode;

use serial_simple::serial::SerialPlugin;
use serial_simple::serial_ui::SerialUiPlugin;
use serial_simple::settings::Settings;
use serial_simple::{APP_NAME, APP_VERSION};

fn main() {
    let settings = Settings::load();
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: format!("{APP_NAME} - {APP_VERSION}"),
                resolution: settings.window_resolution(),
                present_mode: PresentMode::AutoVsync,
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(settings)
        .add_plugins(SerialPlugin)
        .add_plugins(SerialUiPlugin)
        .run();
}
