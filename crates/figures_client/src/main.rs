use bevy::prelude::*;
use figures_simulation::{init_logger, log_error, log_info, DemoConfig, SimulationPlugin};

mod camera;
mod input;
mod rendering;
mod status;

use camera::CameraPlugin;
use input::DemoInputPlugin;
use rendering::RenderingSyncPlugin;
use status::StatusPlugin;

pub const WINDOW_TITLE: &str = "Falling Figures";

/// `figures_client [config.json]`
fn load_config() -> DemoConfig {
    let Some(path) = std::env::args().nth(1) else {
        return DemoConfig::default();
    };

    match DemoConfig::load(&path) {
        Ok(config) => {
            log_info(&format!("Config loaded: {}", path));
            config
        }
        Err(err) => {
            log_error(&format!("{} (using defaults)", err));
            DemoConfig::default()
        }
    }
}

fn main() {
    init_logger();
    let config = load_config();

    App::new()
        // Bevy defaults (rendering, input, time, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: WINDOW_TITLE.to_string(),
                resolution: (config.camera.width as f32, config.camera.height as f32).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        // Simulation (emitters on FixedUpdate)
        .add_plugins(SimulationPlugin::new(config))
        // Debug draw triangles → Mesh2d
        .add_plugins(RenderingSyncPlugin)
        // Scene camera ↔ Camera2d, zoom/pan
        .add_plugins(CameraPlugin)
        // Mouse/keyboard → emitters
        .add_plugins(DemoInputPlugin)
        // Title (pause, stats) + profile log
        .add_plugins(StatusPlugin)
        .run();
}
