//! Full-level tests: composer, pool and sink agree, and a run can be played
//! from spawn to runway

use crate::core::config::{LevelConfig, PoolConfig, PoolSizing, RunwayLength};
use crate::foundation::logging;
use crate::level::{Advance, Direction, LevelOrchestrator, RunwayOutcome, StageComposer};
use crate::maze::{Cell, GridPos};
use crate::pool::{ObjectPool, PlacementCommand, RecordingSink, ResourceKind};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn composer(config: LevelConfig, sink: RecordingSink) -> StageComposer<ObjectPool<RecordingSink>> {
    StageComposer::with_seed_source(ObjectPool::new(sink), config, ChaCha8Rng::seed_from_u64(2024))
}

fn ample_pools() -> PoolConfig {
    ResourceKind::all().iter().fold(PoolConfig::default(), |pools, &kind| {
        pools.with_sizing(kind, PoolSizing::new(0, 2000))
    })
}

#[test]
fn test_default_level_matches_sink() {
    logging::init_for_tests();
    let mut composer = composer(LevelConfig::default().with_seed(9), RecordingSink::without_command_log());
    let layout = composer.generate_level().expect("Default config should generate").clone();

    assert_eq!(layout.stage_count(), 3);
    for &kind in ResourceKind::all() {
        let pool = composer.pool();
        assert_eq!(pool.sink().active_count(kind), pool.active_count(kind), "{kind} disagrees");
        assert!(pool.total_objects(kind) <= pool.capacity(kind).unwrap_or(0));
    }
    assert_eq!(composer.pool().sink().live_count(), composer.pool().stats().live_instances);
}

#[test]
fn test_default_pools_furnish_the_default_level() {
    for seed in [0, 9, 31] {
        let config = LevelConfig::default().with_seed(seed).with_runway_length(RunwayLength::FloorCount);
        let mut composer = composer(config, RecordingSink::without_command_log());
        composer.generate_level().unwrap();

        let pool = composer.pool();
        for &kind in ResourceKind::all() {
            assert_eq!(pool.kind_stats(kind).unwrap().exhaustions, 0, "{kind} ran out with seed {seed}");
        }
        assert!(composer.placements().iter().all(|placement| placement.skipped() == 0));
        assert_eq!(pool.active_count(ResourceKind::Floor) + pool.active_count(ResourceKind::Wall), 3 * 400);
    }
}

#[test]
fn test_undersized_wall_pool_skips_without_failing() {
    let pools = PoolConfig::default().with_sizing(ResourceKind::Wall, PoolSizing::new(50, 500));
    let mut composer = composer(LevelConfig::default().with_seed(9).with_pools(pools), RecordingSink::without_command_log());
    composer.generate_level().unwrap();

    let walls = composer.pool().kind_stats(ResourceKind::Wall).unwrap();
    assert!(walls.exhaustions > 0);
    assert_eq!(composer.pool().active_count(ResourceKind::Wall), 500);
    assert!(composer.layout().stages.iter().all(|stage| stage.start_handle.is_some()));
}

#[test]
fn test_stage_grids_keep_edge_rows() {
    let config = LevelConfig::default().with_seed(31).with_pools(ample_pools());
    let mut composer = composer(config, RecordingSink::without_command_log());
    composer.generate_level().unwrap();

    let mid = 9;
    for (index, grid) in composer.grids().iter().enumerate() {
        let start = GridPos::new(mid, if index == 0 { 1 } else { 0 });
        assert!(grid.is_connected_from(start), "stage {} disconnected:\n{}", index + 1, grid);
        assert!(grid.is_floor(GridPos::new(mid, 19)));

        let top_floors = (0..20).filter(|&x| grid.is_floor(GridPos::new(x, 19))).count();
        assert_eq!(top_floors, 1);

        let side_floors = grid
            .iter()
            .filter(|(pos, cell)| *cell == Cell::Floor && (pos.x == 0 || pos.x == 19))
            .count();
        assert_eq!(side_floors, 0);
    }
}

#[test]
fn test_regeneration_keeps_instance_count_bounded() {
    let config = LevelConfig::new().with_grid(11, 11).with_pools(ample_pools());
    let mut composer = composer(config, RecordingSink::without_command_log());

    for _ in 0..6 {
        composer.generate_level().unwrap();
        let pool = composer.pool();
        let placed = composer.placed_count();
        let idle: usize = ResourceKind::all().iter().map(|&kind| pool.inactive_count(kind)).sum();
        let live = pool.sink().live_count();

        assert_eq!(live, placed + idle);
        assert!(live < 2 * placed, "{live} live instances for {placed} placements");
    }

    composer.clear_level();
    for &kind in ResourceKind::all() {
        assert_eq!(composer.pool().sink().active_count(kind), 0);
    }
}

#[test]
fn test_clear_hides_without_destroying() {
    let config = LevelConfig::new().with_grid(5, 5).with_stages(1).with_seed(3).with_pools(ample_pools());
    let mut composer = composer(config, RecordingSink::new());
    composer.generate_level().unwrap();
    composer.pool_mut().sink_mut().clear_commands();

    composer.clear_level();
    let commands = composer.pool().sink().commands();
    assert!(!commands.is_empty());
    assert!(commands.iter().all(|command| matches!(command, PlacementCommand::SetActive { active: false, .. })));
}

#[test]
fn test_play_through_to_runway() {
    logging::init_for_tests();
    let config = LevelConfig::new()
        .with_grid(9, 9)
        .with_stages(3)
        .with_seed(77)
        .with_brick_ratio(0.3)
        .with_runway_length(RunwayLength::Fixed(5))
        .with_pools(ample_pools());
    let mut orchestrator = LevelOrchestrator::new(composer(config, RecordingSink::without_command_log()));
    let layout = orchestrator.advance_level().unwrap().clone();
    let need = layout.brick_threshold;

    for cursor in 0..2 {
        let end = layout.stages[cursor].end_position;
        if need > 0 {
            assert!(matches!(orchestrator.try_advance(end, Direction::Forward), Advance::NotEnoughBricks { .. }));
        }
        for _ in 0..need {
            orchestrator.collect_brick();
        }
        match orchestrator.try_advance(end, Direction::Forward) {
            Advance::NextStage { stage, target } => {
                assert_eq!(stage, cursor + 1);
                assert_eq!(target, layout.stages[cursor + 1].start_position);
            }
            other => panic!("stage {} gate: {:?}", cursor + 1, other),
        }
    }

    for _ in 0..3 {
        orchestrator.collect_brick();
    }
    let final_end = layout.stages[2].end_position;
    assert!(matches!(orchestrator.try_advance(final_end, Direction::Forward), Advance::Runway { .. }));

    let mut deposited = 0;
    while let RunwayOutcome::Deposited { .. } = orchestrator.deposit_on_runway() {
        deposited += 1;
    }
    assert_eq!(deposited, 3);
    assert!(orchestrator.context().awaiting_next_level);

    orchestrator.advance_level().unwrap();
    assert_eq!(orchestrator.context().level_number, 2);
    assert!(!orchestrator.context().awaiting_next_level);
}
