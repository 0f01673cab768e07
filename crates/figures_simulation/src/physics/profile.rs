//! Тайминги шагов (текущий / максимум / сумма)

use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepProfile {
    /// Шаг мира + сбор контактов
    pub step_ms: f32,
    /// Debug draw
    pub draw_ms: f32,
}

impl StepProfile {
    pub fn new(step: Duration, draw: Duration) -> Self {
        Self {
            step_ms: step.as_secs_f32() * 1000.0,
            draw_ms: draw.as_secs_f32() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfileStats {
    pub current: StepProfile,
    pub max: StepProfile,
    pub total: StepProfile,
}

impl ProfileStats {
    pub fn record(&mut self, profile: StepProfile) {
        self.current = profile;

        self.max.step_ms = self.max.step_ms.max(profile.step_ms);
        self.max.draw_ms = self.max.draw_ms.max(profile.draw_ms);

        self.total.step_ms += profile.step_ms;
        self.total.draw_ms += profile.draw_ms;
    }

    /// Среднее за `steps` шагов (0 шагов — нули)
    pub fn average(&self, steps: u32) -> StepProfile {
        if steps == 0 {
            return StepProfile::default();
        }
        let scale = 1.0 / steps as f32;
        StepProfile {
            step_ms: self.total.step_ms * scale,
            draw_ms: self.total.draw_ms * scale,
        }
    }
}
