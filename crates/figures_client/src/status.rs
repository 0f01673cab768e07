use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use figures_simulation::{log_info, EmitterList, EmitterStats, Settings};

use crate::WINDOW_TITLE;

/// Кадров между строками профайлинга в логе
const PROFILE_LOG_INTERVAL: u32 = 120;

pub struct StatusPlugin;

impl Plugin for StatusPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (update_window_title, log_profile));
    }
}

/// "Falling Figures [PAUSED] | bodies 12 contacts 4 joints 0"
pub fn window_title(settings: &Settings, stats: Option<EmitterStats>) -> String {
    let mut title = WINDOW_TITLE.to_string();
    if settings.pause {
        title.push_str(" [PAUSED]");
    }
    if let (true, Some(stats)) = (settings.draw_stats, stats) {
        title.push_str(&format!(
            " | bodies {} contacts {} joints {}",
            stats.bodies, stats.contacts, stats.joints
        ));
    }
    title
}

fn update_window_title(
    settings: Res<Settings>,
    emitters: Res<EmitterList>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };

    let title = window_title(&settings, emitters.active().map(|e| e.stats()));
    if window.title != title {
        window.title = title;
    }
}

fn log_profile(settings: Res<Settings>, emitters: Res<EmitterList>, mut frames: Local<u32>) {
    if !settings.draw_profile {
        return;
    }

    *frames += 1;
    if *frames % PROFILE_LOG_INTERVAL != 0 {
        return;
    }

    for emitter in emitters.iter() {
        let stats = emitter.stats();
        log_info(&format!(
            "[profile] {} step #{}: avg {:.3}ms",
            emitter.name(),
            stats.steps,
            stats.average_step_ms
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        let mut settings = Settings::default();
        let stats = EmitterStats {
            bodies: 3,
            contacts: 2,
            joints: 1,
            ..Default::default()
        };

        assert_eq!(window_title(&settings, Some(stats)), "Falling Figures");

        settings.pause = true;
        settings.draw_stats = true;
        assert_eq!(
            window_title(&settings, Some(stats)),
            "Falling Figures [PAUSED] | bodies 3 contacts 2 joints 1"
        );
        assert_eq!(window_title(&settings, None), "Falling Figures [PAUSED]");
    }
}
