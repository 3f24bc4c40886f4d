//! Instance placement sink
//!
//! The pool never creates scene objects itself. It drives a [`PlacementSink`],
//! which stands in for whatever object system hosts the instances, and only
//! ever asks it to create, show/hide, move and destroy them.

use crate::foundation::math::Transform;
use crate::pool::ResourceKind;
use std::collections::HashMap;

/// Identifier the sink assigns to an instance it created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SinkId(pub u64);

/// Host-side object system driven by the pool
pub trait PlacementSink {
    /// Create a new, inactive instance of `kind`
    fn instantiate(&mut self, kind: ResourceKind) -> SinkId;

    /// Show or hide an instance
    fn set_active(&mut self, id: SinkId, active: bool);

    /// Move an instance
    fn set_transform(&mut self, id: SinkId, transform: &Transform);

    /// Destroy an instance permanently
    fn destroy(&mut self, id: SinkId);
}

/// A command issued to a sink, in issue order
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementCommand {
    /// Instance created
    Instantiate {
        /// Assigned identifier
        id: SinkId,
        /// Kind of the new instance
        kind: ResourceKind,
    },
    /// Visibility changed
    SetActive {
        /// Target instance
        id: SinkId,
        /// New visibility
        active: bool,
    },
    /// Instance moved
    SetTransform {
        /// Target instance
        id: SinkId,
        /// New placement
        transform: Transform,
    },
    /// Instance destroyed
    Destroy {
        /// Target instance
        id: SinkId,
    },
}

/// Live state of an instance inside a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInstance {
    /// Kind the instance was created as
    pub kind: ResourceKind,
    /// Whether the instance is currently shown
    pub active: bool,
    /// Current placement
    pub transform: Transform,
}

/// In-memory sink keeping a scene table and the full command stream
///
/// Used by the headless app and by tests; a game engine binding would
/// implement [`PlacementSink`] on its own scene type instead.
#[derive(Debug, Default)]
pub struct RecordingSink {
    next_id: u64,
    instances: HashMap<SinkId, SceneInstance>,
    commands: Vec<PlacementCommand>,
    record_commands: bool,
}

impl RecordingSink {
    /// Create a sink that records every command
    pub fn new() -> Self {
        Self {
            record_commands: true,
            ..Self::default()
        }
    }

    /// Create a sink that only tracks scene state
    pub fn without_command_log() -> Self {
        Self::default()
    }

    /// Look up a live instance
    pub fn instance(&self, id: SinkId) -> Option<&SceneInstance> {
        self.instances.get(&id)
    }

    /// Number of live (not destroyed) instances, active or not
    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of shown instances of `kind`
    pub fn active_count(&self, kind: ResourceKind) -> usize {
        self.instances
            .values()
            .filter(|instance| instance.active && instance.kind == kind)
            .count()
    }

    /// Recorded commands, oldest first
    pub fn commands(&self) -> &[PlacementCommand] {
        &self.commands
    }

    /// Drop the recorded command history, keeping scene state
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    fn record(&mut self, command: PlacementCommand) {
        if self.record_commands {
            self.commands.push(command);
        }
    }
}

impl PlacementSink for RecordingSink {
    fn instantiate(&mut self, kind: ResourceKind) -> SinkId {
        let id = SinkId(self.next_id);
        self.next_id += 1;
        self.instances.insert(id, SceneInstance {
            kind,
            active: false,
            transform: Transform::identity(),
        });
        self.record(PlacementCommand::Instantiate { id, kind });
        id
    }

    fn set_active(&mut self, id: SinkId, active: bool) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.active = active;
        } else {
            log::warn!("set_active on unknown sink instance {:?}", id);
        }
        self.record(PlacementCommand::SetActive { id, active });
    }

    fn set_transform(&mut self, id: SinkId, transform: &Transform) {
        if let Some(instance) = self.instances.get_mut(&id) {
            instance.transform = *transform;
        } else {
            log::warn!("set_transform on unknown sink instance {:?}", id);
        }
        self.record(PlacementCommand::SetTransform { id, transform: *transform });
    }

    fn destroy(&mut self, id: SinkId) {
        self.instances.remove(&id);
        self.record(PlacementCommand::Destroy { id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    #[test]
    fn test_recording_sink_tracks_scene_state() {
        let mut sink = RecordingSink::new();
        let id = sink.instantiate(ResourceKind::Floor);
        assert_eq!(sink.active_count(ResourceKind::Floor), 0);

        sink.set_transform(id, &Transform::from_position(Vec3::new(2.0, 0.0, 4.0)));
        sink.set_active(id, true);
        assert_eq!(sink.active_count(ResourceKind::Floor), 1);
        assert_eq!(sink.instance(id).map(|i| i.transform.position), Some(Vec3::new(2.0, 0.0, 4.0)));

        sink.destroy(id);
        assert_eq!(sink.live_count(), 0);
        assert_eq!(sink.commands().len(), 4);
        assert_eq!(sink.commands()[3], PlacementCommand::Destroy { id });
    }

    #[test]
    fn test_sink_without_log_records_nothing() {
        let mut sink = RecordingSink::without_command_log();
        let id = sink.instantiate(ResourceKind::Wall);
        sink.set_active(id, true);
        assert!(sink.commands().is_empty());
        assert_eq!(sink.active_count(ResourceKind::Wall), 1);
    }
}
