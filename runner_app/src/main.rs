//! Runner demo application
//!
//! Generates levels headlessly, prints every stage grid and plays each run
//! through to the runway with a scripted player that picks up exactly the
//! bricks each gate needs.
//!
//! Usage: `runner_demo [level.toml|level.ron] [levels]`

use stage_engine::config::ConfigError;
use stage_engine::foundation::logging;
use stage_engine::prelude::*;

type Orchestrator = LevelOrchestrator<ObjectPool<RecordingSink>>;

/// Stands in for the player controller and camera rig
struct SpawnLogger;

impl LevelCollaborator for SpawnLogger {
    fn on_level_ready(&mut self, layout: &LevelLayout, spawn: Vec3) {
        log::info!("Player and camera reset to ({:.1}, {:.1}, {:.1}) for {} stages",
                   spawn.x, spawn.y, spawn.z, layout.stage_count());
    }

    fn on_runway_finished(&mut self, deposited: usize) {
        log::info!("Next level prompt shown ({} bricks on the runway)", deposited);
    }
}

fn load_config(path: Option<String>) -> Result<LevelConfig, ConfigError> {
    match path {
        Some(path) => {
            log::info!("Loading level configuration from {}", path);
            LevelConfig::load_validated(path)
        }
        None => Ok(LevelConfig::default()),
    }
}

fn print_level(orchestrator: &Orchestrator) {
    let layout = orchestrator.level();
    for (markers, grid) in layout.stages.iter().zip(orchestrator.composer().grids()) {
        println!(
            "Stage {} (seed {}, {} floor cells, start {}, end {})",
            markers.stage_index, markers.seed, markers.floor_count, markers.start_cell, markers.end_cell
        );
        print!("{}", grid);
        println!();
    }

    if let Some(runway) = &layout.runway {
        println!("Runway: {} steps from z {:.1}, brick threshold {}", runway.steps, runway.start_z, layout.brick_threshold);
    }
}

fn play(orchestrator: &mut Orchestrator) {
    let layout = orchestrator.level().clone();

    for stage in &layout.stages {
        let need = layout.brick_threshold.max(1);
        for _ in 0..need {
            orchestrator.collect_brick();
        }

        match orchestrator.try_advance(stage.end_position, Direction::Forward) {
            Advance::NextStage { stage: next, target } => {
                log::info!("Stage {} cleared, sliding to stage {} at z {:.1}", stage.stage_index, next + 1, target.z);
            }
            Advance::Runway { target } => {
                log::info!("Final stage cleared, sliding towards z {:.1}", target.z);
            }
            other => {
                log::warn!("Stage {} gate refused: {:?}", stage.stage_index, other);
                return;
            }
        }
    }

    while let RunwayOutcome::Deposited { step, position } = orchestrator.deposit_on_runway() {
        log::debug!("Brick {} deposited at z {:.1}", step, position.z);
    }
}

fn report_pools(orchestrator: &Orchestrator) {
    let stats = orchestrator.pool_stats();
    log::info!("Pool: {} kinds, {} live instances, {} discarded",
               stats.registered_kinds, stats.live_instances, stats.discarded);

    let pool = orchestrator.composer().pool();
    for &kind in ResourceKind::all() {
        if let Some(kind_stats) = pool.kind_stats(kind) {
            log::info!("  {:<12} active {:>4}/{:<4} peak {:>4} exhausted {:>4}",
                       kind.name(),
                       pool.active_count(kind),
                       pool.capacity(kind).unwrap_or(0),
                       kind_stats.peak_active,
                       kind_stats.exhaustions);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let config = load_config(args.next())?;
    let levels: usize = match args.next() {
        Some(count) => count.parse()?,
        None => 2,
    };

    log::info!("Runner demo: {}x{} grid, {} stages, seed {}",
               config.width, config.height, config.total_stages, config.random_seed);

    let pool = ObjectPool::new(RecordingSink::without_command_log());
    let mut orchestrator = LevelOrchestrator::new(StageComposer::new(pool, config));
    orchestrator.add_collaborator(Box::new(SpawnLogger));

    for _ in 0..levels {
        orchestrator.advance_level()?;
        print_level(&orchestrator);
        play(&mut orchestrator);
        report_pools(&orchestrator);
    }

    orchestrator.clear();
    log::info!("Demo finished");
    Ok(())
}
