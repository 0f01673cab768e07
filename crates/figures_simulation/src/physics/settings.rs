//! Настройки шага симуляции (часть управляется из UI)

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Testbed settings: частота, итерации солвера, debug draw флаги, пауза
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Частота шагов (Hz). `<= 0` — мир стоит
    pub hz: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,

    pub draw_shapes: bool,
    pub draw_joints: bool,
    pub draw_aabbs: bool,
    pub draw_contact_points: bool,
    pub draw_contact_normals: bool,
    pub draw_contact_impulse: bool,
    pub draw_friction_impulse: bool,
    pub draw_coms: bool,
    pub draw_stats: bool,
    pub draw_profile: bool,

    pub enable_warm_starting: bool,
    pub enable_continuous: bool,
    pub enable_sub_stepping: bool,
    pub enable_sleep: bool,

    pub pause: bool,
    /// Один шаг при паузе (сбрасывается после шага)
    pub single_step: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hz: 60.0,
            velocity_iterations: 8,
            position_iterations: 3,
            draw_shapes: true,
            draw_joints: true,
            draw_aabbs: false,
            draw_contact_points: false,
            draw_contact_normals: false,
            draw_contact_impulse: false,
            draw_friction_impulse: false,
            draw_coms: false,
            draw_stats: false,
            draw_profile: false,
            enable_warm_starting: true,
            enable_continuous: true,
            enable_sub_stepping: false,
            enable_sleep: true,
            pause: false,
            single_step: false,
        }
    }
}

impl Settings {
    /// Номинальный шаг: 1/hz (0 если hz <= 0)
    pub fn time_step(&self) -> f32 {
        if self.hz > 0.0 {
            1.0 / self.hz
        } else {
            0.0
        }
    }

    /// Шаг для текущего кадра с учётом паузы.
    ///
    /// На паузе возвращает 0, кроме случая `single_step` — тогда флаг
    /// сбрасывается и возвращается обычный шаг.
    pub fn take_frame_step(&mut self) -> f32 {
        let time_step = self.time_step();
        if !self.pause {
            return time_step;
        }

        if self.single_step {
            self.single_step = false;
            time_step
        } else {
            0.0
        }
    }

    pub fn draw_flags(&self) -> DrawFlags {
        DrawFlags {
            shapes: self.draw_shapes,
            joints: self.draw_joints,
            aabbs: self.draw_aabbs,
            centers_of_mass: self.draw_coms,
        }
    }

    pub fn toggle_pause(&mut self) {
        self.pause = !self.pause;
    }

    /// Один шаг: ставит паузу (если её не было) и взводит single_step
    pub fn request_single_step(&mut self) {
        self.pause = true;
        self.single_step = true;
    }
}

/// Что рисует debug renderer физического мира
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawFlags {
    pub shapes: bool,
    pub joints: bool,
    pub aabbs: bool,
    pub centers_of_mass: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.hz, 60.0);
        assert_eq!(settings.velocity_iterations, 8);
        assert_eq!(settings.position_iterations, 3);
        assert!(settings.draw_shapes && settings.draw_joints);
        assert!(!settings.draw_contact_points);
        assert!(settings.enable_sleep && settings.enable_continuous);
        assert!(!settings.enable_sub_stepping);
    }

    #[test]
    fn test_zero_hz_means_no_step() {
        let mut settings = Settings {
            hz: 0.0,
            ..Default::default()
        };
        assert_eq!(settings.take_frame_step(), 0.0);
    }

    #[test]
    fn test_pause_and_single_step() {
        let mut settings = Settings::default();
        settings.toggle_pause();
        assert_eq!(settings.take_frame_step(), 0.0);

        settings.request_single_step();
        assert!((settings.take_frame_step() - 1.0 / 60.0).abs() < 1e-6);
        assert!(!settings.single_step);
        assert_eq!(settings.take_frame_step(), 0.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "hz": 30.0, "pause": true }"#).unwrap();
        assert_eq!(settings.hz, 30.0);
        assert!(settings.pause);
        assert_eq!(settings.velocity_iterations, 8);
    }
}
