//! Тесты детерминизма
//!
//! Проверяем что симуляция с одинаковым seed даёт идентичные результаты

use figures_simulation::{create_headless_app, world_snapshot, DemoConfig};

fn config(seed: u64) -> DemoConfig {
    let mut config = DemoConfig {
        seed,
        ..Default::default()
    };
    config.figures.max_figures = 60;
    config.figures.circles = true;
    config.figures.triangles = true;
    config.particles.enabled = true;
    config
}

/// Запускает симуляцию и возвращает snapshot мира
fn run_simulation(seed: u64, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(config(seed));

    for _ in 0..tick_count {
        app.update();
    }

    world_snapshot(app.world())
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: usize = 300;

    let snapshot1 = run_simulation(SEED, TICK_COUNT);
    let snapshot2 = run_simulation(SEED, TICK_COUNT);

    assert!(!snapshot1.is_empty());
    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: usize = 120;

    // Запускаем 3 раза — все должны быть идентичны
    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, TICK_COUNT)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_different_seeds_diverge() {
    let snapshot1 = run_simulation(1, 60);
    let snapshot2 = run_simulation(2, 60);

    assert_ne!(
        snapshot1, snapshot2,
        "Разные seed'ы дали одинаковую сцену"
    );
}
