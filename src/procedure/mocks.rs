// Mock collaborators for testing - record every call, no side effects

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::geometry::{Bounds, Vec3};
use crate::procedure::traits::*;
use crate::procedure::types::*;

/// Tool tracker whose held tools are set directly by the test
#[derive(Debug, Default)]
pub struct MockToolTracker {
    pub tools: RefCell<HashMap<ToolCategory, ToolHandle>>,
    pub hands: RefCell<HashMap<HandSide, Vec3>>,
}

impl MockToolTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a tool in hand at `position`, trigger pressed or not
    pub fn hold(&self, category: ToolCategory, position: Vec3, trigger: bool) {
        self.tools.borrow_mut().insert(
            category,
            ToolHandle {
                category,
                position,
                held: true,
                primary_trigger: trigger,
                secondary_trigger: false,
            },
        );
    }

    pub fn release(&self, category: ToolCategory) {
        self.tools.borrow_mut().remove(&category);
    }

    pub fn release_all(&self) {
        self.tools.borrow_mut().clear();
    }

    pub fn set_hand(&self, side: HandSide, position: Vec3) {
        self.hands.borrow_mut().insert(side, position);
    }
}

impl ToolTracker for MockToolTracker {
    fn find_held_tool(&self, category: ToolCategory) -> Option<ToolHandle> {
        self.tools.borrow().get(&category).copied()
    }

    fn hand_anchor_position(&self, side: HandSide) -> Option<Vec3> {
        self.hands.borrow().get(&side).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresentationCall {
    Instruction(String),
    Progress { text: String, fraction: f32 },
}

#[derive(Debug, Default)]
pub struct MockPresentation {
    pub calls: RefCell<Vec<PresentationCall>>,
}

impl MockPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::Instruction(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_instruction(&self) -> Option<String> {
        self.instructions().pop()
    }

    pub fn progress_fractions(&self) -> Vec<f32> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                PresentationCall::Progress { fraction, .. } => Some(*fraction),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl Presentation for MockPresentation {
    fn set_instruction(&self, text: &str) {
        self.calls
            .borrow_mut()
            .push(PresentationCall::Instruction(text.to_string()));
    }

    fn set_progress(&self, text: &str, fraction: f32) {
        self.calls.borrow_mut().push(PresentationCall::Progress {
            text: text.to_string(),
            fraction,
        });
    }
}

#[derive(Debug, Default)]
pub struct MockSocketIndicator {
    pub colors: RefCell<Vec<(IndicatorColor, String, f32)>>,
}

impl MockSocketIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_color(&self) -> Option<IndicatorColor> {
        self.colors.borrow().last().map(|(color, _, _)| *color)
    }

    pub fn labels(&self) -> Vec<String> {
        self.colors
            .borrow()
            .iter()
            .map(|(_, label, _)| label.clone())
            .collect()
    }
}

impl SocketIndicator for MockSocketIndicator {
    fn set_color(&self, color: IndicatorColor, label: &str, alpha: f32) {
        self.colors
            .borrow_mut()
            .push((color, label.to_string(), alpha));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneCommand {
    Spawn { kind: PropKind, position: Vec3, handle: PropHandle },
    Destroy(PropHandle),
    Animate(PropHandle, PropAnimation),
}

#[derive(Debug, Default)]
pub struct MockSceneOps {
    pub commands: RefCell<Vec<SceneCommand>>,
    next_id: Cell<u32>,
}

impl MockSceneOps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_executed_commands(&self) -> Vec<SceneCommand> {
        self.commands.borrow().clone()
    }

    pub fn spawned(&self, kind: PropKind) -> Vec<PropHandle> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                SceneCommand::Spawn { kind: k, handle, .. } if *k == kind => Some(handle.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn spawn_position(&self, kind: PropKind) -> Option<Vec3> {
        self.commands
            .borrow()
            .iter()
            .rev()
            .find_map(|command| match command {
                SceneCommand::Spawn { kind: k, position, .. } if *k == kind => Some(*position),
                _ => None,
            })
    }

    pub fn destroyed(&self) -> Vec<PropHandle> {
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                SceneCommand::Destroy(handle) => Some(handle.clone()),
                _ => None,
            })
            .collect()
    }

    /// Spawned props not yet destroyed
    pub fn live_props(&self) -> Vec<PropHandle> {
        let destroyed = self.destroyed();
        self.commands
            .borrow()
            .iter()
            .filter_map(|command| match command {
                SceneCommand::Spawn { handle, .. } if !destroyed.contains(handle) => {
                    Some(handle.clone())
                }
                _ => None,
            })
            .collect()
    }
}

impl SceneOps for MockSceneOps {
    fn spawn_prop(&self, kind: PropKind, position: Vec3) -> PropHandle {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = PropHandle(format!("{kind:?}-{id}"));
        self.commands.borrow_mut().push(SceneCommand::Spawn {
            kind,
            position,
            handle: handle.clone(),
        });
        handle
    }

    fn destroy_prop(&self, handle: &PropHandle) {
        self.commands
            .borrow_mut()
            .push(SceneCommand::Destroy(handle.clone()));
    }

    fn animate_prop(&self, handle: &PropHandle, animation: PropAnimation) {
        self.commands
            .borrow_mut()
            .push(SceneCommand::Animate(handle.clone(), animation));
    }
}

/// All four mocks plus the `Collaborators` bundle wired to them
pub struct MockHost {
    pub tools: Rc<MockToolTracker>,
    pub presentation: Rc<MockPresentation>,
    pub indicator: Rc<MockSocketIndicator>,
    pub scene: Rc<MockSceneOps>,
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            tools: Rc::new(MockToolTracker::new()),
            presentation: Rc::new(MockPresentation::new()),
            indicator: Rc::new(MockSocketIndicator::new()),
            scene: Rc::new(MockSceneOps::new()),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.tools.clone(),
            self.presentation.clone(),
            self.indicator.clone(),
            self.scene.clone(),
        )
    }
}

/// Tooth at `position`, 2cm cube bounds
pub fn tooth(name: &str, position: Vec3) -> ToothCandidate {
    ToothCandidate {
        handle: PropHandle(format!("scene/{name}")),
        name: name.to_string(),
        position,
        bounds: Bounds::cube(position, 0.02),
    }
}
