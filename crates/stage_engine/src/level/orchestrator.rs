//! Level orchestration
//!
//! Sequences a level change: regenerate through the [`StageComposer`], reset
//! the run context, then publish the new spawn point to every registered
//! [`LevelCollaborator`] (player controller, camera rig, UI).

use crate::foundation::math::Vec3;
use crate::level::composer::{LevelError, StageComposer};
use crate::level::layout::LevelLayout;
use crate::level::progress::{Advance, Direction, RunwayOutcome, StageProgress};
use crate::pool::{InstancePool, PoolStats};

/// Receives level lifecycle notifications
pub trait LevelCollaborator {
    /// A new level is committed; `spawn` is its first start marker
    fn on_level_ready(&mut self, layout: &LevelLayout, spawn: Vec3);

    /// The runway is done and the next level can be requested
    fn on_runway_finished(&mut self, deposited: usize) {
        let _ = deposited;
    }
}

/// State owned by one run through a level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Levels generated so far, 1 for the first
    pub level_number: usize,
    /// Stage cursor, brick tally and runway state
    pub progress: StageProgress,
    /// Runway finished, waiting for the next level to be requested
    pub awaiting_next_level: bool,
}

impl RunContext {
    /// Start a fresh run for the next level
    fn begin_level(&mut self) {
        self.level_number += 1;
        self.progress.reset();
        self.awaiting_next_level = false;
    }
}

/// Drives level changes and gameplay progress over a [`StageComposer`]
pub struct LevelOrchestrator<P: InstancePool> {
    composer: StageComposer<P>,
    collaborators: Vec<Box<dyn LevelCollaborator>>,
    context: RunContext,
}

impl<P: InstancePool> LevelOrchestrator<P> {
    /// Create an orchestrator with no level committed
    pub fn new(composer: StageComposer<P>) -> Self {
        Self {
            composer,
            collaborators: Vec::new(),
            context: RunContext::default(),
        }
    }

    /// Register a collaborator for lifecycle notifications
    pub fn add_collaborator(&mut self, collaborator: Box<dyn LevelCollaborator>) {
        self.collaborators.push(collaborator);
    }

    /// Replace the committed level with a freshly generated one
    ///
    /// On error neither the committed level nor the run context change.
    pub fn advance_level(&mut self) -> Result<&LevelLayout, LevelError> {
        let layout = self.composer.generate_level()?;
        self.context.begin_level();

        let spawn = layout.spawn_position().unwrap_or_else(Vec3::zeros);
        for collaborator in &mut self.collaborators {
            collaborator.on_level_ready(layout, spawn);
        }

        log::info!("Level {} started, spawn at {:?}", self.context.level_number, spawn);
        Ok(layout)
    }

    /// Release the committed level and forget the run
    pub fn clear(&mut self) {
        self.composer.clear_level();
        self.context.progress.reset();
        self.context.awaiting_next_level = false;
    }

    /// Committed level layout
    pub fn level(&self) -> &LevelLayout {
        self.composer.layout()
    }

    /// Underlying composer
    pub fn composer(&self) -> &StageComposer<P> {
        &self.composer
    }

    /// Underlying composer, mutably
    pub fn composer_mut(&mut self) -> &mut StageComposer<P> {
        &mut self.composer
    }

    /// Statistics of the pool backing the composer
    pub fn pool_stats(&self) -> PoolStats {
        self.composer.pool().pool_stats()
    }

    /// Current run state
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Stage progress of the current run
    pub fn progress(&self) -> &StageProgress {
        &self.context.progress
    }

    /// Stage progress of the current run, mutably
    pub fn progress_mut(&mut self) -> &mut StageProgress {
        &mut self.context.progress
    }

    /// Record one collected brick
    pub fn collect_brick(&mut self) {
        self.context.progress.tally_mut().collect();
    }

    /// Attempt a forward move from the current stage's end marker
    pub fn try_advance(&mut self, position: Vec3, direction: Direction) -> Advance {
        self.context.progress.try_advance(self.composer.layout(), position, direction)
    }

    /// Deposit the next brick on the runway, firing
    /// [`on_runway_finished`](Self::on_runway_finished) once the run ends
    pub fn deposit_on_runway(&mut self) -> RunwayOutcome {
        let was_scoring = self.context.progress.is_scoring();
        let outcome = self.context.progress.deposit_on_runway(self.composer.layout());

        if let RunwayOutcome::Finished { deposited } = outcome {
            if was_scoring {
                self.on_runway_finished(deposited);
            }
        }
        outcome
    }

    /// Mark the run finished and notify collaborators
    pub fn on_runway_finished(&mut self, deposited: usize) {
        self.context.awaiting_next_level = true;
        for collaborator in &mut self.collaborators {
            collaborator.on_runway_finished(deposited);
        }
        log::info!("Level {} finished with {} bricks on the runway", self.context.level_number, deposited);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{LevelConfig, PoolConfig, PoolSizing, RunwayLength};
    use crate::pool::{ObjectPool, RecordingSink, ResourceKind};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Events {
        spawns: Vec<Vec3>,
        finished: Vec<usize>,
    }

    struct Recorder(Rc<RefCell<Events>>);

    impl LevelCollaborator for Recorder {
        fn on_level_ready(&mut self, _layout: &LevelLayout, spawn: Vec3) {
            self.0.borrow_mut().spawns.push(spawn);
        }

        fn on_runway_finished(&mut self, deposited: usize) {
            self.0.borrow_mut().finished.push(deposited);
        }
    }

    fn orchestrator(config: LevelConfig) -> (LevelOrchestrator<ObjectPool<RecordingSink>>, Rc<RefCell<Events>>) {
        let composer = StageComposer::with_seed_source(
            ObjectPool::new(RecordingSink::without_command_log()),
            config,
            ChaCha8Rng::seed_from_u64(3),
        );
        let events = Rc::new(RefCell::new(Events::default()));
        let mut orchestrator = LevelOrchestrator::new(composer);
        orchestrator.add_collaborator(Box::new(Recorder(Rc::clone(&events))));
        (orchestrator, events)
    }

    fn config() -> LevelConfig {
        let mut pools = PoolConfig::default();
        for &kind in ResourceKind::all() {
            pools = pools.with_sizing(kind, PoolSizing::new(0, 500));
        }
        LevelConfig::new()
            .with_grid(9, 9)
            .with_stages(2)
            .with_seed(17)
            .with_brick_ratio(0.0)
            .with_runway_length(RunwayLength::Fixed(2))
            .with_pools(pools)
    }

    #[test]
    fn test_advance_level_publishes_spawn() {
        let (mut orchestrator, events) = orchestrator(config());
        let spawn = orchestrator.advance_level().unwrap().spawn_position().unwrap();

        assert_eq!(events.borrow().spawns, vec![spawn]);
        assert_eq!(orchestrator.context().level_number, 1);
        assert_eq!(orchestrator.level().stage_count(), 2);
    }

    #[test]
    fn test_advance_level_resets_run() {
        let (mut orchestrator, _) = orchestrator(config());
        orchestrator.advance_level().unwrap();
        orchestrator.collect_brick();
        let end = orchestrator.level().stages[0].end_position;
        assert!(matches!(orchestrator.try_advance(end, Direction::Forward), Advance::NextStage { .. }));

        orchestrator.advance_level().unwrap();
        assert_eq!(orchestrator.progress().current_stage(), 0);
        assert_eq!(orchestrator.progress().tally().count(), 0);
        assert_eq!(orchestrator.context().level_number, 2);
    }

    #[test]
    fn test_failed_advance_keeps_level_and_run() {
        let (mut orchestrator, events) = orchestrator(config());
        orchestrator.advance_level().unwrap();
        orchestrator.collect_brick();
        let before = orchestrator.level().clone();

        orchestrator.composer_mut().set_config(config().with_grid(9, 1));
        assert!(orchestrator.advance_level().is_err());

        assert_eq!(orchestrator.level(), &before);
        assert_eq!(orchestrator.progress().tally().count(), 1);
        assert_eq!(events.borrow().spawns.len(), 1);
    }

    #[test]
    fn test_runway_finish_notifies_collaborators() {
        let (mut orchestrator, events) = orchestrator(config());
        orchestrator.advance_level().unwrap();

        let first_end = orchestrator.level().stages[0].end_position;
        let last_end = orchestrator.level().stages[1].end_position;
        orchestrator.try_advance(first_end, Direction::Forward);
        orchestrator.collect_brick();
        assert!(matches!(orchestrator.try_advance(last_end, Direction::Forward), Advance::Runway { .. }));

        assert!(matches!(orchestrator.deposit_on_runway(), RunwayOutcome::Deposited { step: 0, .. }));
        assert_eq!(orchestrator.deposit_on_runway(), RunwayOutcome::Finished { deposited: 1 });
        assert_eq!(orchestrator.deposit_on_runway(), RunwayOutcome::Finished { deposited: 1 });

        assert_eq!(events.borrow().finished, vec![1]);
        assert!(orchestrator.context().awaiting_next_level);
    }

    #[test]
    fn test_pool_stats_and_clear() {
        let (mut orchestrator, _) = orchestrator(config());
        orchestrator.advance_level().unwrap();
        let stats = orchestrator.pool_stats();
        assert_eq!(stats.registered_kinds, ResourceKind::all().len());
        assert!(stats.live_instances > 0);

        orchestrator.clear();
        assert!(orchestrator.level().is_empty());
        assert_eq!(orchestrator.pool_stats().live_instances, stats.live_instances);
        assert_eq!(orchestrator.composer().pool().active_count(ResourceKind::Floor), 0);
    }
}
