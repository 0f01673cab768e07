use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::render::camera::ScalingMode;
use bevy::window::{PrimaryWindow, WindowResized};
use figures_simulation::render::camera::VIEW_EXTENT;
use figures_simulation::SceneCamera;

/// Шаг панорамирования стрелками (метры)
const PAN_STEP: f32 = 0.5;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(
                Update,
                (resize_scene_camera, camera_controls, sync_camera_transform).chain(),
            );
    }
}

/// Marker: Camera2d, повторяющая `SceneCamera`
#[derive(Component)]
pub struct SceneView;

fn projection_for(camera: &figures_simulation::Camera) -> Projection {
    Projection::Orthographic(OrthographicProjection {
        scaling_mode: ScalingMode::FixedVertical {
            viewport_height: 2.0 * VIEW_EXTENT * camera.zoom,
        },
        ..OrthographicProjection::default_2d()
    })
}

fn spawn_camera(mut commands: Commands, scene_camera: Res<SceneCamera>) {
    commands.spawn((
        Camera2d,
        projection_for(&scene_camera),
        Transform::from_xyz(scene_camera.center.x, scene_camera.center.y, 0.0),
        SceneView,
    ));
}

/// Окно → размер viewport сцены (логические пиксели)
fn resize_scene_camera(
    mut resized: EventReader<WindowResized>,
    windows: Query<Entity, With<PrimaryWindow>>,
    mut scene_camera: ResMut<SceneCamera>,
) {
    let Ok(primary) = windows.single() else {
        resized.clear();
        return;
    };

    for event in resized.read() {
        if event.window == primary {
            scene_camera.resize(event.width as u32, event.height as u32);
        }
    }
}

/// Z/X или колесо — zoom, стрелки — pan, Home — сброс
fn camera_controls(
    keys: Res<ButtonInput<KeyCode>>,
    mut wheel: EventReader<MouseWheel>,
    mut scene_camera: ResMut<SceneCamera>,
) {
    if keys.just_pressed(KeyCode::KeyZ) {
        scene_camera.zoom_out();
    }
    if keys.just_pressed(KeyCode::KeyX) {
        scene_camera.zoom_in();
    }
    for event in wheel.read() {
        if event.y > 0.0 {
            scene_camera.zoom_in();
        } else if event.y < 0.0 {
            scene_camera.zoom_out();
        }
    }

    let pans = [
        (KeyCode::ArrowLeft, Vec2::new(-PAN_STEP, 0.0)),
        (KeyCode::ArrowRight, Vec2::new(PAN_STEP, 0.0)),
        (KeyCode::ArrowUp, Vec2::new(0.0, PAN_STEP)),
        (KeyCode::ArrowDown, Vec2::new(0.0, -PAN_STEP)),
    ];
    for (key, delta) in pans {
        if keys.just_pressed(key) {
            scene_camera.pan(delta);
        }
    }

    if keys.just_pressed(KeyCode::Home) {
        scene_camera.reset_view();
    }
}

fn sync_camera_transform(
    scene_camera: Res<SceneCamera>,
    mut query: Query<(&mut Transform, &mut Projection), With<SceneView>>,
) {
    if !scene_camera.is_changed() {
        return;
    }

    for (mut transform, mut projection) in query.iter_mut() {
        transform.translation.x = scene_camera.center.x;
        transform.translation.y = scene_camera.center.y;
        *projection = projection_for(&scene_camera);
    }
}
