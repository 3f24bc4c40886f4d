//! Resource Kind Definitions
//!
//! This module defines the categories of reusable instances a level places.
//! Each kind gets its own pool with a dedicated capacity and idle queue.

use serde::{Deserialize, Serialize};

/// Enumeration of instance categories managed by the object pool
///
/// Each kind corresponds to a separate pool entry in the
/// [`ObjectPool`](super::ObjectPool), sized independently through
/// [`PoolConfig`](crate::core::config::PoolConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Walkable maze cell
    Floor,
    /// Blocking maze cell
    Wall,
    /// Raised marker at either end of a fence row
    WinTrigger,
    /// Flat filler between the two win triggers of a fence
    FenceFiller,
    /// Runway line segment
    Line,
    /// Collectable brick resting on the runway
    Brick,
    /// Marker placed one cell beyond the end of the runway
    WinPosition,
}

impl ResourceKind {
    /// Get all resource kinds
    pub fn all() -> &'static [Self] {
        &[
            Self::Floor,
            Self::Wall,
            Self::WinTrigger,
            Self::FenceFiller,
            Self::Line,
            Self::Brick,
            Self::WinPosition,
        ]
    }

    /// Get the human-readable name for this kind
    pub fn name(self) -> &'static str {
        match self {
            Self::Floor => "Floor",
            Self::Wall => "Wall",
            Self::WinTrigger => "WinTrigger",
            Self::FenceFiller => "FenceFiller",
            Self::Line => "Line",
            Self::Brick => "Brick",
            Self::WinPosition => "WinPosition",
        }
    }

    /// Whether this kind is part of a stage's maze grid
    pub fn is_maze_cell(self) -> bool {
        matches!(self, Self::Floor | Self::Wall)
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_are_distinct() {
        let kinds = ResourceKind::all();
        assert_eq!(kinds.len(), 7);
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[test]
    fn test_only_floor_and_wall_are_maze_cells() {
        let cells: Vec<_> = ResourceKind::all().iter().filter(|kind| kind.is_maze_cell()).collect();
        assert_eq!(cells, vec![&ResourceKind::Floor, &ResourceKind::Wall]);
    }

    #[test]
    fn test_serde_names() {
        #[derive(Serialize, Deserialize)]
        struct Holder {
            kind: ResourceKind,
        }

        let text = toml::to_string(&Holder { kind: ResourceKind::WinTrigger }).unwrap();
        assert_eq!(text.trim(), "kind = \"win_trigger\"");
        assert_eq!(ResourceKind::FenceFiller.to_string(), "FenceFiller");
    }
}
