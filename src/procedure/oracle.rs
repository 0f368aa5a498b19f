// Proximity/engagement queries over the host's tool tracker. Stateless.

use std::rc::Rc;

use crate::geometry::{self, Vec3};
use crate::procedure::traits::ToolTracker;
use crate::procedure::types::{HandSide, ToolCategory, ToolHandle};

/// Result of checking one tool against one target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Probe {
    /// No tool of the category is in hand
    Absent,
    Present {
        tool: ToolHandle,
        distance: f32,
        in_range: bool,
        engaged: bool,
    },
}

impl Probe {
    pub fn distance(&self) -> Option<f32> {
        match self {
            Probe::Present { distance, .. } => Some(*distance),
            Probe::Absent => None,
        }
    }

    pub fn in_range(&self) -> bool {
        matches!(self, Probe::Present { in_range: true, .. })
    }

    pub fn engaged(&self) -> bool {
        matches!(self, Probe::Present { engaged: true, .. })
    }

    /// In range and engaged
    pub fn active(&self) -> bool {
        self.in_range() && self.engaged()
    }
}

#[derive(Clone)]
pub struct ProximityOracle {
    tracker: Rc<dyn ToolTracker>,
}

impl ProximityOracle {
    pub fn new(tracker: Rc<dyn ToolTracker>) -> Self {
        Self { tracker }
    }

    pub fn find_tool(&self, category: ToolCategory) -> Option<ToolHandle> {
        self.tracker
            .find_held_tool(category)
            .filter(|tool| tool.category == category && tool.is_held())
    }

    pub fn distance(a: Vec3, b: Vec3) -> f32 {
        geometry::distance(a, b)
    }

    pub fn is_engaged(tool: &ToolHandle) -> bool {
        tool.is_engaged()
    }

    pub fn hand_position(&self, side: HandSide) -> Option<Vec3> {
        self.tracker.hand_anchor_position(side)
    }

    /// Distance from the nearest tracked hand to `target`
    pub fn nearest_hand_distance(&self, target: Vec3) -> Option<f32> {
        [HandSide::Left, HandSide::Right]
            .into_iter()
            .filter_map(|side| self.hand_position(side))
            .map(|position| Self::distance(position, target))
            .reduce(f32::min)
    }

    pub fn probe(&self, category: ToolCategory, target: Vec3, max_distance: f32) -> Probe {
        let Some(tool) = self.find_tool(category) else {
            tracing::trace!(tool = category.label(), "No tool in hand");
            return Probe::Absent;
        };

        let distance = Self::distance(tool.world_position(), target);
        let probe = Probe::Present {
            tool,
            distance,
            in_range: distance <= max_distance,
            engaged: Self::is_engaged(&tool),
        };
        tracing::trace!(
            tool = category.label(),
            distance = %format!("{distance:.3}"),
            threshold = %format!("{max_distance:.3}"),
            in_range = probe.in_range(),
            engaged = probe.engaged(),
            "Tool probe"
        );
        probe
    }
}

impl std::fmt::Debug for ProximityOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximityOracle").finish_non_exhaustive()
    }
}
