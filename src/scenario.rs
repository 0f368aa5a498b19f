// Scripted host - replays operator actions from a TOML file against a session
//
// The host stands in for the engine: it answers tool queries from the
// script and records everything the procedure asks it to display or spawn.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use crate::config::TrainerConfig;
use crate::geometry::{Bounds, Vec3};
use crate::procedure::{
    Collaborators, HandSide, IndicatorColor, Presentation, ProcedureSession, ProcedureStep,
    PropAnimation, PropHandle, PropKind, SceneOps, SessionStatus, SocketIndicator, ToolCategory,
    ToolHandle, ToolTracker, ToothCandidate,
};

/// Happy-path walk through every step
pub const DEMO_SCENARIO: &str = include_str!("../scenarios/demo.toml");

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tick_seconds: Option<f32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub teeth: Vec<ToothSpec>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToothSpec {
    pub name: String,
    pub position: Vec3,
    /// Edge length of the tooth's bounding cube
    #[serde(default = "default_tooth_size")]
    pub size: f32,
}

fn default_tooth_size() -> f32 {
    0.02
}

fn default_trigger() -> bool {
    true
}

/// Where a held tool is placed, resolved against the running procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Tooth,
    Socket,
    /// Seated implant, or the socket before the screw is placed
    Implant,
    /// Where the implant screw appears after drilling
    ScrewSpawn,
    Origin,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Start,
    Reset,
    NewExtraction,
    Hold {
        tool: ToolCategory,
        #[serde(default)]
        near: Anchor,
        #[serde(default)]
        offset: Vec3,
        #[serde(default = "default_trigger")]
        trigger: bool,
    },
    /// Drop one tool, or everything when `tool` is omitted
    Release {
        #[serde(default)]
        tool: Option<ToolCategory>,
    },
    Hand {
        side: HandSide,
        position: Vec3,
    },
    Wait {
        seconds: f32,
    },
    /// Tick until `step` (its display name) is current
    WaitFor {
        step: String,
        #[serde(default)]
        timeout: Option<f32>,
    },
}

impl Scenario {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content).context("Invalid scenario TOML")?;
        Ok(scenario)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load scenario {}", path.display()))
    }

    pub fn demo() -> Result<Self> {
        Self::from_toml_str(DEMO_SCENARIO)
    }

    pub fn candidates(&self) -> Vec<ToothCandidate> {
        self.teeth
            .iter()
            .map(|tooth| ToothCandidate {
                handle: PropHandle(format!("scene/{}", tooth.name)),
                name: tooth.name.clone(),
                position: tooth.position,
                bounds: Bounds::cube(tooth.position, tooth.size),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEventKind {
    Instruction {
        text: String,
    },
    Progress {
        text: String,
        fraction: f32,
    },
    Indicator {
        color: IndicatorColor,
        label: String,
        rgba: [f32; 4],
    },
    Spawn {
        kind: PropKind,
        handle: PropHandle,
        position: Vec3,
    },
    Destroy {
        handle: PropHandle,
    },
    Animate {
        handle: PropHandle,
        animation: PropAnimation,
    },
    Note {
        text: String,
    },
}

/// Something the procedure asked the host to do, stamped with sim time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostEvent {
    pub at: f32,
    #[serde(flatten)]
    pub kind: HostEventKind,
}

#[derive(Debug, Default)]
pub struct ScriptedHost {
    tools: RefCell<HashMap<ToolCategory, ToolHandle>>,
    hands: RefCell<HashMap<HandSide, Vec3>>,
    events: RefCell<Vec<HostEvent>>,
    live_props: RefCell<Vec<PropHandle>>,
    next_prop: Cell<u32>,
    clock: Cell<f32>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

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

    pub fn release(&self, category: Option<ToolCategory>) {
        match category {
            Some(category) => {
                self.tools.borrow_mut().remove(&category);
            }
            None => self.tools.borrow_mut().clear(),
        }
    }

    pub fn set_hand(&self, side: HandSide, position: Vec3) {
        self.hands.borrow_mut().insert(side, position);
    }

    pub fn set_clock(&self, seconds: f32) {
        self.clock.set(seconds);
    }

    pub fn note(&self, text: impl Into<String>) {
        self.record(HostEventKind::Note { text: text.into() });
    }

    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    pub fn live_props(&self) -> Vec<PropHandle> {
        self.live_props.borrow().clone()
    }

    fn record(&self, kind: HostEventKind) {
        self.events.borrow_mut().push(HostEvent {
            at: self.clock.get(),
            kind,
        });
    }
}

impl ToolTracker for ScriptedHost {
    fn find_held_tool(&self, category: ToolCategory) -> Option<ToolHandle> {
        self.tools.borrow().get(&category).copied()
    }

    fn hand_anchor_position(&self, side: HandSide) -> Option<Vec3> {
        self.hands.borrow().get(&side).copied()
    }
}

impl Presentation for ScriptedHost {
    fn set_instruction(&self, text: &str) {
        self.record(HostEventKind::Instruction {
            text: text.to_string(),
        });
    }

    fn set_progress(&self, text: &str, fraction: f32) {
        self.record(HostEventKind::Progress {
            text: text.to_string(),
            fraction,
        });
    }
}

impl SocketIndicator for ScriptedHost {
    fn set_color(&self, color: IndicatorColor, label: &str, alpha: f32) {
        let [r, g, b] = color.rgb();
        self.record(HostEventKind::Indicator {
            color,
            label: label.to_string(),
            rgba: [r, g, b, alpha],
        });
    }
}

impl SceneOps for ScriptedHost {
    fn spawn_prop(&self, kind: PropKind, position: Vec3) -> PropHandle {
        let id = self.next_prop.get() + 1;
        self.next_prop.set(id);
        let handle = PropHandle(format!("{kind:?}#{id}"));
        self.live_props.borrow_mut().push(handle.clone());
        self.record(HostEventKind::Spawn {
            kind,
            handle: handle.clone(),
            position,
        });
        handle
    }

    fn destroy_prop(&self, handle: &PropHandle) {
        self.live_props.borrow_mut().retain(|live| live != handle);
        self.record(HostEventKind::Destroy {
            handle: handle.clone(),
        });
    }

    fn animate_prop(&self, handle: &PropHandle, animation: PropAnimation) {
        self.record(HostEventKind::Animate {
            handle: handle.clone(),
            animation,
        });
    }
}

/// Command-line overrides that beat both the scenario and the config file
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub tick_seconds: Option<f32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub ticks: u32,
    pub simulated_seconds: f32,
    pub completed: bool,
    pub status: SessionStatus,
    pub events: Vec<HostEvent>,
}

pub struct ScenarioRunner {
    scenario: Scenario,
    host: Rc<ScriptedHost>,
    session: ProcedureSession,
    tick_seconds: f32,
    max_ticks: u32,
    ticks: u32,
}

impl ScenarioRunner {
    pub fn new(scenario: Scenario, config: &TrainerConfig, options: RunOptions) -> Result<Self> {
        let tick_seconds = options
            .tick_seconds
            .or(scenario.tick_seconds)
            .unwrap_or(config.simulation.tick_seconds);
        if !(tick_seconds > 0.0) || !tick_seconds.is_finite() {
            bail!("Tick length must be a positive number of seconds, got {tick_seconds}");
        }

        let host = Rc::new(ScriptedHost::new());
        let collaborators = Collaborators::from_host(host.clone());
        let candidates = scenario.candidates();
        let settings = config.procedure.clone();
        let session = match options.seed.or(scenario.seed).or(config.simulation.seed) {
            Some(seed) => ProcedureSession::with_seed(settings, collaborators, candidates, seed)?,
            None => ProcedureSession::new(settings, collaborators, candidates)?,
        };

        Ok(Self {
            scenario,
            host,
            session,
            tick_seconds,
            max_ticks: config.simulation.max_ticks,
            ticks: 0,
        })
    }

    pub fn host(&self) -> &ScriptedHost {
        &self.host
    }

    pub fn session(&self) -> &ProcedureSession {
        &self.session
    }

    /// Play every action in order and report where the procedure ended up
    pub fn run(&mut self) -> Result<ScenarioReport> {
        let span = tracing::info_span!(
            "scenario",
            name = %self.scenario.name,
            session.id = %self.session.session_id()
        );
        let _guard = span.enter();
        tracing::info!(
            actions = self.scenario.actions.len(),
            tick = self.tick_seconds,
            "Running scenario"
        );

        let actions = self.scenario.actions.clone();
        for (index, action) in actions.iter().enumerate() {
            tracing::debug!(index = index, action = ?action, "Scenario action");
            self.apply(action)
                .with_context(|| format!("Scenario action #{} ({action:?}) failed", index + 1))?;
        }

        let report = self.report();
        tracing::info!(
            ticks = report.ticks,
            step = %report.status.step,
            completed = report.completed,
            "Scenario finished"
        );
        Ok(report)
    }

    pub fn report(&self) -> ScenarioReport {
        ScenarioReport {
            scenario: self.scenario.name.clone(),
            ticks: self.ticks,
            simulated_seconds: self.ticks as f32 * self.tick_seconds,
            completed: self.session.is_complete(),
            status: self.session.status(),
            events: self.host.events(),
        }
    }

    fn apply(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Start => {
                if let Err(e) = self.session.start_procedure() {
                    tracing::warn!(error = %e, "Start ignored");
                    self.host.note(e.to_string());
                }
            }
            Action::NewExtraction => {
                if let Err(e) = self.session.start_new_extraction() {
                    tracing::warn!(error = %e, "New extraction ignored");
                    self.host.note(e.to_string());
                }
            }
            Action::Reset => self.session.reset_procedure(),
            Action::Hold {
                tool,
                near,
                offset,
                trigger,
            } => {
                let position = self.resolve(*near)? + *offset;
                self.host.hold(*tool, position, *trigger);
            }
            Action::Release { tool } => self.host.release(*tool),
            Action::Hand { side, position } => self.host.set_hand(*side, *position),
            Action::Wait { seconds } => {
                let ticks = (seconds / self.tick_seconds).round().max(0.0) as u32;
                for _ in 0..ticks {
                    self.step()?;
                }
            }
            Action::WaitFor { step, timeout } => {
                let wanted: ProcedureStep = step.parse().map_err(anyhow::Error::msg)?;
                let limit = timeout.map(|seconds| (seconds / self.tick_seconds).ceil() as u32);
                let mut waited = 0u32;
                while self.session.current_step() != wanted {
                    if limit.is_some_and(|limit| waited >= limit) {
                        bail!(
                            "Step {wanted} not reached after {waited} ticks, still at {}",
                            self.session.current_step()
                        );
                    }
                    self.step()?;
                    waited += 1;
                }
            }
        }
        Ok(())
    }

    fn step(&mut self) -> Result<()> {
        if self.ticks >= self.max_ticks {
            bail!(
                "Tick budget of {} exhausted at step {}",
                self.max_ticks,
                self.session.current_step()
            );
        }
        self.ticks += 1;
        self.host.set_clock(self.ticks as f32 * self.tick_seconds);
        self.session.tick(self.tick_seconds);
        Ok(())
    }

    fn resolve(&self, anchor: Anchor) -> Result<Vec3> {
        let socket = self.session.socket_position();
        let position = match anchor {
            Anchor::Origin => Some(Vec3::ZERO),
            Anchor::Tooth => self.session.target().map(|target| target.position),
            Anchor::Socket => socket,
            Anchor::Implant => self.session.machine().implant_position().or(socket),
            Anchor::ScrewSpawn => {
                let height = self.session.machine().settings().implant.screw_spawn_height;
                socket.map(|socket| socket + Vec3::Y * height)
            }
        };
        position.with_context(|| format!("No {anchor:?} position, start the procedure first"))
    }
}
