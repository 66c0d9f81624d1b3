//! Headless RINGSIDE bout
//!
//! Two controller-driven opponents box each other until one is defeated
//! or the round clock runs out. Usage: `ringside_simulation [seed] [config.json]`

use bevy::prelude::*;
use ringside_simulation::{
    create_headless_app, log_error, log_info, opponent_bundle, run_ticks, FighterDefeated, Health, MatchConfig,
    SimulationPlugin, Stamina, StrikeResolved, TICK_HZ,
};

/// One three-minute round
const MAX_TICKS: usize = 180 * TICK_HZ as usize;

#[derive(Resource, Default)]
struct BoutStats {
    strikes: usize,
    knockdowns: usize,
    winner: Option<Entity>,
}

fn collect_stats(
    mut stats: ResMut<BoutStats>,
    mut resolved: EventReader<StrikeResolved>,
    mut defeated: EventReader<FighterDefeated>,
) {
    for event in resolved.read() {
        stats.strikes += 1;
        if event.outcome.knockdown {
            stats.knockdowns += 1;
        }
    }
    for event in defeated.read() {
        if stats.winner.is_none() {
            stats.winner = event.by;
        }
    }
}

fn main() {
    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    let config = match args.next() {
        Some(path) => match MatchConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("Config {}: {}", path, err));
                std::process::exit(1);
            }
        },
        None => MatchConfig::default(),
    };

    println!("Starting RINGSIDE headless bout (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(config.clone())
        .add_plugins(SimulationPlugin)
        .init_resource::<BoutStats>()
        .add_systems(FixedPostUpdate, collect_stats);

    let red = app.world_mut().spawn(opponent_bundle(&config, Vec3::new(0.0, 0.0, 0.7), None)).id();
    let blue = app
        .world_mut()
        .spawn(opponent_bundle(&config, Vec3::new(0.0, 0.0, -0.7), Some(red)))
        .id();
    app.world_mut()
        .entity_mut(red)
        .insert(ringside_simulation::ai::OpponentTarget { target: Some(blue) });

    for tick in 0..MAX_TICKS {
        run_ticks(&mut app, 1);

        if tick % 600 == 0 {
            let world = app.world();
            let describe = |entity: Entity| {
                let health = world.get::<Health>(entity).map(|h| h.current).unwrap_or(0);
                let stamina = world.get::<Stamina>(entity).map(|s| s.current).unwrap_or(0);
                format!("hp {:3} / st {:3}", health, stamina)
            };
            log_info(&format!("Tick {}: red {} | blue {}", tick, describe(red), describe(blue)));
        }

        if app.world().resource::<BoutStats>().winner.is_some() {
            break;
        }
    }

    let stats = app.world().resource::<BoutStats>();
    let winner = match stats.winner {
        Some(entity) if entity == red => "red",
        Some(entity) if entity == blue => "blue",
        _ => "nobody (time)",
    };
    println!(
        "Bout complete! {} strikes landed, {} knockdowns, winner: {}",
        stats.strikes, stats.knockdowns, winner
    );
}
