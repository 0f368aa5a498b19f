// Traits for dependency injection - the host engine sits behind these seams

use std::rc::Rc;

use crate::geometry::Vec3;
use crate::procedure::types::*;

/// Tracked-hand and tool queries answered by the host
pub trait ToolTracker {
    /// Held tool matching the category, or `None` when no such tool is in hand
    fn find_held_tool(&self, category: ToolCategory) -> Option<ToolHandle>;

    /// World position of a hand anchor, if that hand is currently tracked
    fn hand_anchor_position(&self, side: HandSide) -> Option<Vec3>;
}

/// Instruction panel
pub trait Presentation {
    fn set_instruction(&self, text: &str);

    /// `fraction` is always within [0, 1]
    fn set_progress(&self, text: &str, fraction: f32);
}

/// Socket indicator visual
pub trait SocketIndicator {
    fn set_color(&self, color: IndicatorColor, label: &str, alpha: f32);
}

/// Commands for props the procedure creates, removes or animates
pub trait SceneOps {
    fn spawn_prop(&self, kind: PropKind, position: Vec3) -> PropHandle;

    fn destroy_prop(&self, handle: &PropHandle);

    fn animate_prop(&self, handle: &PropHandle, animation: PropAnimation);
}

/// Collaborator handles resolved once when the session is wired up
#[derive(Clone)]
pub struct Collaborators {
    pub tools: Rc<dyn ToolTracker>,
    pub presentation: Rc<dyn Presentation>,
    pub indicator: Rc<dyn SocketIndicator>,
    pub scene: Rc<dyn SceneOps>,
}

impl Collaborators {
    pub fn new(
        tools: Rc<dyn ToolTracker>,
        presentation: Rc<dyn Presentation>,
        indicator: Rc<dyn SocketIndicator>,
        scene: Rc<dyn SceneOps>,
    ) -> Self {
        Self {
            tools,
            presentation,
            indicator,
            scene,
        }
    }

    /// Wire every seam to a single host object
    pub fn from_host<H>(host: Rc<H>) -> Self
    where
        H: ToolTracker + Presentation + SocketIndicator + SceneOps + 'static,
    {
        Self {
            tools: host.clone(),
            presentation: host.clone(),
            indicator: host.clone(),
            scene: host,
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
