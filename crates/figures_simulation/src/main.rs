//! Headless симуляция Falling Figures
//!
//! Запускает Bevy App без рендера: `figures_headless [config.json] [ticks]`

use figures_simulation::{
    create_headless_app, init_logger, log_error, log_info, DemoConfig, EmitterList,
};

const DEFAULT_TICKS: u32 = 1000;

fn main() {
    init_logger();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match DemoConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&err.to_string());
                std::process::exit(1);
            }
        },
        None => DemoConfig::default(),
    };
    let ticks = args
        .next()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    log_info(&format!(
        "Starting Falling Figures headless simulation (seed: {}, ticks: {})",
        config.seed, ticks
    ));

    let mut app = create_headless_app(config);

    for tick in 0..ticks {
        app.update();

        if tick % 100 == 0 {
            if let Some(emitters) = app.world().get_resource::<EmitterList>() {
                for emitter in emitters.iter() {
                    let stats = emitter.stats();
                    log_info(&format!(
                        "Tick {}: {} '{}' bodies={} contacts={} avg_step={:.3}ms",
                        tick,
                        emitter.kind().as_str(),
                        emitter.name(),
                        stats.bodies,
                        stats.contacts,
                        stats.average_step_ms
                    ));
                }
            }
        }
    }

    log_info("Simulation complete!");
}
