use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use figures_simulation::{EmitterList, SceneCamera, Settings};

pub struct DemoInputPlugin;

impl Plugin for DemoInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (mouse_input, keyboard_input));
    }
}

/// Клавиши, которые обрабатывает само приложение (не уходят в emitter)
fn is_app_key(key: KeyCode) -> bool {
    matches!(
        key,
        KeyCode::Space
            | KeyCode::KeyP
            | KeyCode::KeyO
            | KeyCode::KeyZ
            | KeyCode::KeyX
            | KeyCode::ArrowLeft
            | KeyCode::ArrowRight
            | KeyCode::ArrowUp
            | KeyCode::ArrowDown
            | KeyCode::Home
    )
}

/// Первая буква логической клавиши (`None` для Shift, F1 и т.п.)
fn key_char(key: &Key) -> Option<char> {
    match key {
        Key::Character(text) => text.chars().next().map(|c| c.to_ascii_lowercase()),
        _ => None,
    }
}

/// ЛКМ — mouse joint, Shift+ЛКМ — бомба, движение — перетаскивание
fn mouse_input(
    buttons: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    mut cursor_moved: EventReader<CursorMoved>,
    windows: Query<&Window, With<PrimaryWindow>>,
    scene_camera: Res<SceneCamera>,
    mut emitters: ResMut<EmitterList>,
) {
    let Ok(window) = windows.single() else {
        cursor_moved.clear();
        return;
    };

    let moved = cursor_moved.read().last().is_some();
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let world = scene_camera.screen_to_world(cursor);

    if buttons.just_pressed(MouseButton::Left) {
        let shift = keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);
        if shift {
            emitters.shift_mouse_down(world);
        } else {
            emitters.mouse_down(world);
        }
    }

    if buttons.just_released(MouseButton::Left) {
        emitters.mouse_up(world);
    }

    if moved {
        emitters.mouse_move(world);
    }
}

fn keyboard_input(
    mut events: EventReader<KeyboardInput>,
    mut settings: ResMut<Settings>,
    mut emitters: ResMut<EmitterList>,
) {
    for event in events.read() {
        let pressed = event.state == ButtonState::Pressed;

        match event.key_code {
            KeyCode::Space if pressed && !event.repeat => emitters.launch_bomb(),
            KeyCode::KeyP if pressed && !event.repeat => settings.toggle_pause(),
            KeyCode::KeyO if pressed && !event.repeat => settings.request_single_step(),
            code if is_app_key(code) => {}
            _ => {
                let Some(key) = key_char(&event.logical_key) else {
                    continue;
                };
                if pressed {
                    emitters.keyboard(key);
                } else {
                    emitters.keyboard_up(key);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_char() {
        assert_eq!(key_char(&Key::Character("C".into())), Some('c'));
        assert_eq!(key_char(&Key::Shift), None);
    }

    #[test]
    fn test_app_keys_not_forwarded() {
        assert!(is_app_key(KeyCode::KeyP));
        assert!(is_app_key(KeyCode::Home));
        assert!(!is_app_key(KeyCode::KeyC));
        assert!(!is_app_key(KeyCode::KeyG));
    }
}
