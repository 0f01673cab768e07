//! Интеграционные тесты: SimulationPlugin + Figures через Bevy App

use figures_simulation::{
    create_headless_app, DemoConfig, EmitterKind, EmitterList, FrameTriangles, SceneCamera,
    Settings,
};

const GROUND_HALF_WIDTH: f32 = 50.0;

fn app_with(config: DemoConfig) -> bevy::app::App {
    create_headless_app(config)
}

/// Ровно `n` fixed-тиков (app.update() зависит от накопленного времени)
fn tick(app: &mut bevy::app::App, n: usize) {
    for _ in 0..n {
        app.world_mut().run_schedule(bevy::app::FixedUpdate);
    }
}

fn small_scene(max_figures: u32) -> DemoConfig {
    let mut config = DemoConfig::default();
    config.figures.max_figures = max_figures;
    config
}

fn figures_stats(app: &bevy::app::App) -> figures_simulation::EmitterStats {
    let emitters = app.world().resource::<EmitterList>();
    emitters
        .find_by_name("Figures")
        .map(|emitter| emitter.stats())
        .expect("figures emitter")
}

#[test]
fn test_one_step_per_tick() {
    let mut app = app_with(small_scene(300));
    tick(&mut app, 10);

    let stats = figures_stats(&app);
    assert_eq!(stats.steps, 10);
    // ground + фигура за каждый шаг
    assert_eq!(stats.bodies, 11);
    assert_eq!(app.world().resource::<FrameTriangles>().frame, 10);
}

#[test]
fn test_max_figures_respected() {
    let mut app = app_with(small_scene(8));
    tick(&mut app, 40);
    assert_eq!(figures_stats(&app).bodies, 9);
}

#[test]
fn test_figures_settle_above_ground() {
    let mut app = app_with(small_scene(10));
    // 10 секунд: фигуры падают с 45 м и успокаиваются
    tick(&mut app, 600);

    let emitters = app.world().resource::<EmitterList>();
    let figures = emitters.find_by_name("Figures").expect("figures");
    let dynamic: Vec<_> = figures.bodies().into_iter().filter(|b| b.dynamic).collect();

    assert_eq!(dynamic.len(), 10);

    // Ground edge кончается на ±50 м, скатившиеся за край падают дальше
    let over_ground: Vec<_> = dynamic
        .into_iter()
        .filter(|b| b.position.x.abs() < GROUND_HALF_WIDTH - 1.0)
        .collect();
    assert!(!over_ground.is_empty());
    for body in over_ground {
        assert!(body.position.y > -0.5, "body fell through: {:?}", body);
        assert!(body.position.y < 10.0, "body still up: {:?}", body);
    }
}

#[test]
fn test_pause_and_single_step() {
    let mut app = app_with(small_scene(300));
    tick(&mut app, 1);

    app.world_mut().resource_mut::<Settings>().toggle_pause();
    tick(&mut app, 5);
    assert_eq!(figures_stats(&app).steps, 1);

    app.world_mut().resource_mut::<Settings>().request_single_step();
    tick(&mut app, 1);
    tick(&mut app, 1);

    assert_eq!(figures_stats(&app).steps, 2);
    assert!(!app.world().resource::<Settings>().single_step);
}

#[test]
fn test_frame_triangles_follow_debug_draw() {
    let mut app = app_with(small_scene(5));
    tick(&mut app, 5);
    let drawn = app.world().resource::<FrameTriangles>().vertex_count();
    assert!(drawn > 0);
    assert_eq!(drawn % 3, 0);

    // Без shapes/joints рисовать нечего
    {
        let mut settings = app.world_mut().resource_mut::<Settings>();
        settings.draw_shapes = false;
        settings.draw_joints = false;
    }
    tick(&mut app, 1);
    assert_eq!(app.world().resource::<FrameTriangles>().vertex_count(), 0);
}

#[test]
fn test_bomb_from_input() {
    let mut app = app_with(small_scene(0));
    tick(&mut app, 1);

    app.world_mut().resource_mut::<EmitterList>().launch_bomb();
    assert_eq!(figures_stats(&app).bodies, 2);

    // Перетаскивание с shift: вторая бомба заменяет первую
    {
        let mut emitters = app.world_mut().resource_mut::<EmitterList>();
        emitters.shift_mouse_down(bevy::math::Vec2::new(0.0, 20.0));
        emitters.mouse_move(bevy::math::Vec2::new(1.0, 20.0));
        emitters.mouse_up(bevy::math::Vec2::new(1.0, 20.0));
    }
    assert_eq!(figures_stats(&app).bodies, 2);
    tick(&mut app, 1);
}

#[test]
fn test_particles_emitter_optional() {
    let mut config = small_scene(5);
    config.particles.enabled = true;
    let mut app = app_with(config);
    tick(&mut app, 3);

    let emitters = app.world().resource::<EmitterList>();
    assert_eq!(emitters.len(), 2);
    let kinds: Vec<_> = emitters.iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![EmitterKind::Particles, EmitterKind::Physics]);
    // Ввод уходит в Figures
    assert_eq!(
        emitters.active().map(|e| e.name().to_string()),
        Some("Figures".to_string())
    );
    assert!(emitters.iter().all(|e| e.stats().steps == 3));
}

#[test]
fn test_camera_drives_spawn_line() {
    let mut app = app_with(small_scene(1));
    app.world_mut().resource_mut::<SceneCamera>().center.y = 100.0;
    tick(&mut app, 1);

    let top = app.world().resource::<SceneCamera>().bounds().1.y;
    let emitters = app.world().resource::<EmitterList>();
    let figures = emitters.find_by_name("Figures").expect("figures");
    let spawned = figures
        .bodies()
        .into_iter()
        .find(|b| b.dynamic)
        .expect("figure");
    assert_eq!(spawned.position.y, top);
}

#[test]
fn test_fixed_timestep_follows_settings_hz() {
    use bevy::time::{Fixed, Time};
    use std::time::Duration;

    let timestep = |app: &bevy::app::App| app.world().resource::<Time<Fixed>>().timestep();

    let mut app = app_with(small_scene(0));
    app.update();
    assert_eq!(timestep(&app), Duration::from_secs_f64(1.0 / 60.0));

    app.world_mut().resource_mut::<Settings>().hz = 30.0;
    app.update();
    assert_eq!(timestep(&app), Duration::from_secs_f64(1.0 / 30.0));

    // hz <= 0: мир стоит, тик остаётся на запасной частоте
    app.world_mut().resource_mut::<Settings>().hz = 0.0;
    app.update();
    assert_eq!(timestep(&app), Duration::from_secs_f64(1.0 / 60.0));
}
