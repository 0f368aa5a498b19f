use statig::prelude::*;

use crate::config::ProcedureSettings;
use crate::geometry::Vec3;
use crate::procedure::deferred::DeferredTransition;
use crate::procedure::oracle::{Probe, ProximityOracle};
use crate::procedure::timed_task::{TaskUpdate, TimedTask};
use crate::procedure::traits::Collaborators;
use crate::procedure::types::*;

#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    /// Start a procedure on the given tooth
    Begin { target: TargetTooth },
    /// One host frame
    Tick { dt: f32 },
    /// Abort whatever is running. `keep_anesthesia` retains a completed
    /// injection so the next procedure can skip straight to extraction.
    Reset { keep_anesthesia: bool },
}

/// The four grace-buffered steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimedSlot {
    Anesthesia,
    Cleaning,
    Drilling,
    Screwing,
}

struct TaskMessages {
    started: &'static str,
    progress: &'static str,
    interrupted: &'static str,
    completed: &'static str,
}

impl TimedSlot {
    fn messages(&self) -> TaskMessages {
        match self {
            TimedSlot::Anesthesia => TaskMessages {
                started: "Hold trigger and keep syringe near tooth...",
                progress: "Injecting...",
                interrupted: "Keep syringe close to tooth and hold trigger",
                completed: "Anesthesia complete! Wait for numbness to take effect...",
            },
            TimedSlot::Cleaning => TaskMessages {
                started: "Hold trigger and irrigate the socket...",
                progress: "Cleaning socket...",
                interrupted: "Keep irrigation syringe close to socket and hold trigger",
                completed: "Socket cleaning complete! Socket is now clean and ready.",
            },
            TimedSlot::Drilling => TaskMessages {
                started: "Hold trigger and drill the socket...",
                progress: "Drilling socket...",
                interrupted: "Keep drill close to socket and hold trigger",
                completed: "Drilling complete! Now grab your screw and place it into the socket",
            },
            TimedSlot::Screwing => TaskMessages {
                started: "Hold trigger and screw in the implant...",
                progress: "Screwing implant...",
                interrupted: "Keep screwdriver close to implant and hold trigger",
                completed: "Implant placement complete! Implant successfully secured.",
            },
        }
    }
}

/// Shared storage for the step state machine. All step timers, props and
/// completion flags live here; only the machine mutates them.
pub struct ProcedureMachine {
    settings: ProcedureSettings,
    collaborators: Collaborators,
    oracle: ProximityOracle,
    step: ProcedureStep,
    target: Option<TargetTooth>,
    anesthesia: TimedTask,
    cleaning: TimedTask,
    drilling: TimedTask,
    screwing: TimedTask,
    extraction_elapsed: f32,
    advance_after: DeferredTransition,
    anesthesia_complete: bool,
    highlight: Option<PropHandle>,
    socket_indicator: Option<PropHandle>,
    implant_screw: Option<PropHandle>,
    implant_position: Option<Vec3>,
    last_instruction: Option<String>,
    transitions: Vec<StepTransition>,
}

impl ProcedureMachine {
    pub fn new(settings: ProcedureSettings, collaborators: Collaborators) -> Self {
        let oracle = ProximityOracle::new(collaborators.tools.clone());
        Self {
            anesthesia: TimedTask::new(
                "anesthesia",
                settings.anesthesia.duration,
                settings.anesthesia.grace_period,
            ),
            cleaning: TimedTask::new(
                "socket cleaning",
                settings.cleaning.duration,
                settings.cleaning.grace_period,
            ),
            drilling: TimedTask::new(
                "drilling",
                settings.implant.drilling_duration,
                settings.implant.grace_period,
            ),
            screwing: TimedTask::new(
                "screwing",
                settings.implant.screwing_duration,
                settings.implant.grace_period,
            ),
            settings,
            collaborators,
            oracle,
            step: ProcedureStep::WaitingToStart,
            target: None,
            extraction_elapsed: 0.0,
            advance_after: DeferredTransition::new(),
            anesthesia_complete: false,
            highlight: None,
            socket_indicator: None,
            implant_screw: None,
            implant_position: None,
            last_instruction: None,
            transitions: Vec::new(),
        }
    }

    pub fn current_step(&self) -> ProcedureStep {
        self.step
    }

    pub fn target(&self) -> Option<&TargetTooth> {
        self.target.as_ref()
    }

    pub fn socket_position(&self) -> Option<Vec3> {
        self.target.as_ref().map(|target| target.socket_position)
    }

    pub fn settings(&self) -> &ProcedureSettings {
        &self.settings
    }

    pub fn anesthesia_complete(&self) -> bool {
        self.anesthesia_complete
    }

    pub fn anesthesia_task(&self) -> &TimedTask {
        &self.anesthesia
    }

    pub fn cleaning_task(&self) -> &TimedTask {
        &self.cleaning
    }

    pub fn drilling_task(&self) -> &TimedTask {
        &self.drilling
    }

    pub fn screwing_task(&self) -> &TimedTask {
        &self.screwing
    }

    pub fn extraction_elapsed(&self) -> f32 {
        self.extraction_elapsed
    }

    /// Seconds left before a pending automatic advance, if one is armed
    pub fn pending_advance(&self) -> Option<f32> {
        self.advance_after.remaining()
    }

    pub fn implant_screw(&self) -> Option<&PropHandle> {
        self.implant_screw.as_ref()
    }

    pub fn implant_position(&self) -> Option<Vec3> {
        self.implant_position
    }

    pub fn socket_indicator(&self) -> Option<&PropHandle> {
        self.socket_indicator.as_ref()
    }

    pub fn highlight(&self) -> Option<&PropHandle> {
        self.highlight.as_ref()
    }

    /// Step changes since the current procedure began
    pub fn transitions(&self) -> &[StepTransition] {
        &self.transitions
    }
}

#[state_machine(initial = "State::waiting_to_start()")]
impl ProcedureMachine {
    #[state(entry_action = "enter_waiting_to_start")]
    fn waiting_to_start(&mut self, event: &StepEvent) -> Outcome<State> {
        match event {
            StepEvent::Begin { target } => {
                self.begin(target.clone());
                if self.anesthesia_complete || !self.settings.require_anesthesia {
                    tracing::info!(
                        anesthesia_complete = self.anesthesia_complete,
                        "Skipping anesthesia, starting extraction"
                    );
                    Transition(State::tooth_highlighted())
                } else {
                    Transition(State::anesthesia_required())
                }
            }
            StepEvent::Reset { keep_anesthesia } => {
                self.clear(*keep_anesthesia);
                Handled
            }
            StepEvent::Tick { .. } => Handled,
        }
    }

    #[superstate]
    fn in_procedure(&mut self, event: &StepEvent) -> Outcome<State> {
        match event {
            StepEvent::Reset { keep_anesthesia } => {
                tracing::info!(
                    step = %self.step,
                    keep_anesthesia = *keep_anesthesia,
                    "Procedure reset"
                );
                self.clear(*keep_anesthesia);
                Transition(State::waiting_to_start())
            }
            StepEvent::Begin { .. } => {
                tracing::warn!(step = %self.step, "Procedure already running, ignoring start");
                Handled
            }
            StepEvent::Tick { .. } => Handled,
        }
    }

    #[state(
        superstate = "in_procedure",
        entry_action = "enter_anesthesia_required",
        exit_action = "leave_step"
    )]
    fn anesthesia_required(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { dt } = event else {
            return Super;
        };

        if self.anesthesia.is_permanently_complete() {
            if self.advance_after.advance(*dt) {
                tracing::info!("Numbness effect complete");
                return Transition(State::tooth_highlighted());
            }
            return Handled;
        }

        let Some(tooth) = self.target_position() else {
            return Handled;
        };
        let probe = self.oracle.probe(
            ToolCategory::AnesthesiaSyringe,
            tooth,
            self.settings.anesthesia.distance,
        );
        if self.drive_task(TimedSlot::Anesthesia, &probe, *dt) == TaskUpdate::Completed {
            self.anesthesia_complete = true;
            self.advance_after.arm(self.settings.anesthesia.settle_delay);
        }
        Handled
    }

    #[state(superstate = "in_procedure", entry_action = "enter_tooth_highlighted")]
    fn tooth_highlighted(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { .. } = event else {
            return Super;
        };
        let Some(tooth) = self.target_position() else {
            return Handled;
        };

        let probe = self
            .oracle
            .probe(ToolCategory::Forceps, tooth, self.settings.extraction.distance);
        if probe.in_range() {
            tracing::info!(distance = ?probe.distance(), "Forceps in range of target tooth");
            return Transition(State::forceps_near_tooth());
        }
        Handled
    }

    #[state(superstate = "in_procedure", entry_action = "enter_forceps_near_tooth")]
    fn forceps_near_tooth(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { .. } = event else {
            return Super;
        };
        let Some(tooth) = self.target_position() else {
            return Handled;
        };

        let probe = self
            .oracle
            .probe(ToolCategory::Forceps, tooth, self.settings.extraction.distance);
        if self.forceps_gripping(&probe) {
            return Transition(State::extraction_in_progress());
        }
        Handled
    }

    #[state(
        superstate = "in_procedure",
        entry_action = "enter_extraction_in_progress",
        exit_action = "leave_extraction"
    )]
    fn extraction_in_progress(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { dt } = event else {
            return Super;
        };
        let Some(tooth) = self.target_position() else {
            return Handled;
        };

        let probe = self
            .oracle
            .probe(ToolCategory::Forceps, tooth, self.settings.extraction.distance);
        if !self.forceps_gripping(&probe) {
            tracing::warn!(
                distance = ?probe.distance(),
                in_range = probe.in_range(),
                engaged = probe.engaged(),
                elapsed = self.extraction_elapsed,
                "Extraction interrupted"
            );
            return Transition(State::forceps_near_tooth());
        }

        self.extraction_elapsed += dt.max(0.0);
        let required = self.settings.extraction.duration;
        self.report_progress(
            &format!(
                "Extracting tooth... {:.1}s / {:.1}s",
                self.extraction_elapsed.min(required),
                required
            ),
            self.extraction_elapsed / required,
        );

        if self.extraction_elapsed >= required {
            return Transition(State::tooth_extracted());
        }
        Handled
    }

    #[state(
        superstate = "in_procedure",
        entry_action = "enter_tooth_extracted",
        exit_action = "leave_step"
    )]
    fn tooth_extracted(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { dt } = event else {
            return Super;
        };
        if self.advance_after.advance(*dt) {
            return Transition(State::socket_cleaning());
        }
        Handled
    }

    #[state(
        superstate = "in_procedure",
        entry_action = "enter_socket_cleaning",
        exit_action = "leave_step"
    )]
    fn socket_cleaning(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { dt } = event else {
            return Super;
        };

        if self.cleaning.is_permanently_complete() {
            if self.advance_after.advance(*dt) {
                self.instruct("Socket cleaned! Ready for implant placement.");
                return Transition(State::drilling());
            }
            return Handled;
        }

        let Some(socket) = self.socket_position() else {
            return Handled;
        };
        let probe = self.oracle.probe(
            ToolCategory::IrrigationSyringe,
            socket,
            self.settings.cleaning.distance,
        );
        if self.drive_task(TimedSlot::Cleaning, &probe, *dt) == TaskUpdate::Completed {
            self.advance_after.arm(self.settings.cleaning.settle_delay);
        }
        Handled
    }

    #[superstate(superstate = "in_procedure", entry_action = "enter_implant_placement")]
    fn implant_placement(&mut self, event: &StepEvent) -> Outcome<State> {
        match event {
            StepEvent::Tick { .. } => Handled,
            _ => Super,
        }
    }

    #[state(superstate = "implant_placement", entry_action = "enter_drilling")]
    fn drilling(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { dt } = event else {
            return Super;
        };
        let Some(socket) = self.socket_position() else {
            return Handled;
        };

        let threshold = self.settings.implant.tool_distance;
        let probe = self.oracle.probe(ToolCategory::Drill, socket, threshold);
        if !self.drilling.is_running() {
            match probe.distance() {
                Some(distance) => self.instruct(&format!(
                    "Drill the socket\nDistance to socket: {distance:.3}m (need < {threshold:.3}m)"
                )),
                None => self.instruct("Grab the dental drill and position it near the socket"),
            }
        }

        if self.drive_task(TimedSlot::Drilling, &probe, *dt) == TaskUpdate::Completed {
            return Transition(State::placing_screw());
        }
        Handled
    }

    #[state(superstate = "implant_placement", entry_action = "enter_placing_screw")]
    fn placing_screw(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { .. } = event else {
            return Super;
        };
        let Some(socket) = self.socket_position() else {
            return Handled;
        };

        let threshold = self.settings.implant.screw_placement_distance;
        let Some(screw) = self.oracle.find_tool(ToolCategory::ImplantScrew) else {
            let spawn = socket + Vec3::Y * self.settings.implant.screw_spawn_height;
            match self.oracle.nearest_hand_distance(spawn) {
                Some(reach) => self.instruct(&format!(
                    "Grab and place screw in socket\nScrew is {reach:.2}m from your hand\nStatus: NOT HELD"
                )),
                None => self.instruct("Grab and place screw in socket\nStatus: NOT HELD"),
            }
            return Handled;
        };

        let distance = ProximityOracle::distance(screw.world_position(), socket);
        self.instruct(&format!(
            "Grab and place screw in socket\nDistance: {distance:.3}m (need < {threshold:.3}m)\nStatus: HELD"
        ));

        if distance <= threshold {
            tracing::info!(distance = distance, "Implant screw placed in socket");
            self.implant_position = Some(screw.world_position());
            if let Some(prop) = &self.implant_screw {
                self.collaborators.scene.animate_prop(prop, PropAnimation::Seat);
            }
            self.instruct("Screw placed! Now use screwdriver to secure the implant");
            return Transition(State::screwing_in());
        }
        Handled
    }

    #[state(superstate = "implant_placement", entry_action = "enter_screwing_in")]
    fn screwing_in(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { dt } = event else {
            return Super;
        };
        let Some(implant) = self.implant_position.or_else(|| self.socket_position()) else {
            return Handled;
        };

        let probe = self.oracle.probe(
            ToolCategory::Screwdriver,
            implant,
            self.settings.implant.tool_distance,
        );
        let update = self.drive_task(TimedSlot::Screwing, &probe, *dt);
        if matches!(
            update,
            TaskUpdate::Started { .. }
                | TaskUpdate::Progress { in_grace: false, .. }
                | TaskUpdate::Completed
        ) {
            self.turn_screw(*dt);
        }
        if update == TaskUpdate::Completed {
            return Transition(State::implant_complete());
        }
        Handled
    }

    #[state(
        superstate = "implant_placement",
        entry_action = "enter_implant_complete",
        exit_action = "leave_step"
    )]
    fn implant_complete(&mut self, event: &StepEvent) -> Outcome<State> {
        let StepEvent::Tick { dt } = event else {
            return Super;
        };
        if self.advance_after.advance(*dt) {
            return Transition(State::procedure_complete());
        }
        Handled
    }

    #[state(superstate = "in_procedure", entry_action = "enter_procedure_complete")]
    fn procedure_complete(&mut self, event: &StepEvent) -> Outcome<State> {
        match event {
            StepEvent::Tick { .. } => Handled,
            _ => Super,
        }
    }

    #[action]
    fn enter_waiting_to_start(&mut self) {
        self.enter_step(ProcedureStep::WaitingToStart);
    }

    #[action]
    fn enter_anesthesia_required(&mut self) {
        self.enter_step(ProcedureStep::AnesthesiaRequired);
        self.anesthesia.reset();
        self.instruct("Step 1: Administer local anesthesia near the highlighted tooth");
    }

    #[action]
    fn enter_tooth_highlighted(&mut self) {
        self.enter_step(ProcedureStep::ToothHighlighted);
        self.instruct("Step 2: Use dental forceps to extract the highlighted tooth");
    }

    #[action]
    fn enter_forceps_near_tooth(&mut self) {
        let reverted = self.step == ProcedureStep::ExtractionInProgress;
        self.enter_step(ProcedureStep::ForcepsNearTooth);
        self.extraction_elapsed = 0.0;
        if reverted {
            self.instruct("Extraction interrupted! Hold forceps on tooth and press trigger");
        } else {
            self.instruct("Hold forceps on tooth to extract...");
        }
    }

    #[action]
    fn enter_extraction_in_progress(&mut self) {
        self.enter_step(ProcedureStep::ExtractionInProgress);
        self.extraction_elapsed = 0.0;
        self.instruct("Hold forceps firmly on tooth to extract...");
    }

    #[action]
    fn leave_extraction(&mut self) {
        self.extraction_elapsed = 0.0;
    }

    #[action]
    fn enter_tooth_extracted(&mut self) {
        self.enter_step(ProcedureStep::ToothExtracted);

        if let Some(highlight) = self.highlight.take() {
            self.collaborators.scene.destroy_prop(&highlight);
        }
        if let Some(target) = self.target.clone() {
            self.collaborators
                .scene
                .animate_prop(&target.handle, PropAnimation::ExtractionLift);
            if let Some(old) = self.socket_indicator.take() {
                self.collaborators.scene.destroy_prop(&old);
            }
            self.socket_indicator = Some(
                self.collaborators
                    .scene
                    .spawn_prop(PropKind::SocketIndicator, target.socket_position),
            );
            tracing::info!(tooth = %target.name, "Tooth extraction completed");
        }
        self.paint_indicator(IndicatorColor::Red, "Socket");
        self.instruct("Tooth extracted!");
        self.advance_after.arm(self.settings.extraction.animation_duration);
    }

    #[action]
    fn enter_socket_cleaning(&mut self) {
        self.enter_step(ProcedureStep::SocketCleaning);
        self.cleaning.reset();
        self.paint_indicator(IndicatorColor::Blue, "Socket Cleaning");
        self.instruct("Step 3: Use irrigation syringe to clean the empty socket");
    }

    #[action]
    fn enter_implant_placement(&mut self) {
        self.drilling.reset();
        self.screwing.reset();
        self.implant_position = None;
        if let Some(screw) = self.implant_screw.take() {
            self.collaborators.scene.destroy_prop(&screw);
        }
        self.instruct("Step 4: Use drill to prepare the socket for implant placement");
    }

    #[action]
    fn enter_drilling(&mut self) {
        self.enter_step(ProcedureStep::ImplantPlacement(ImplantPhase::Drilling));
        self.paint_indicator(IndicatorColor::Yellow, "Drilling");
    }

    #[action]
    fn enter_placing_screw(&mut self) {
        self.enter_step(ProcedureStep::ImplantPlacement(ImplantPhase::PlacingScrew));
        self.paint_indicator(IndicatorColor::Orange, "Screw Placement");

        if let Some(socket) = self.socket_position() {
            let spawn = socket + Vec3::Y * self.settings.implant.screw_spawn_height;
            let screw = self
                .collaborators
                .scene
                .spawn_prop(PropKind::ImplantScrew, spawn);
            tracing::debug!(screw = %screw, position = ?spawn, "Implant screw spawned");
            self.implant_screw = Some(screw);
        }
    }

    #[action]
    fn enter_screwing_in(&mut self) {
        self.enter_step(ProcedureStep::ImplantPlacement(ImplantPhase::ScrewingIn));
        self.screwing.reset();
        self.paint_indicator(IndicatorColor::Cyan, "Screwing");
    }

    #[action]
    fn enter_implant_complete(&mut self) {
        self.enter_step(ProcedureStep::ImplantPlacement(ImplantPhase::Complete));
        self.paint_indicator(IndicatorColor::Green, "Implant Complete");
        self.advance_after.arm(self.settings.implant.settle_delay);
    }

    #[action]
    fn enter_procedure_complete(&mut self) {
        self.enter_step(ProcedureStep::ProcedureComplete);
        self.instruct("Dental implant procedure complete!");
        tracing::info!(
            tooth = ?self.target.as_ref().map(|target| target.name.as_str()),
            "Procedure completed successfully"
        );
    }

    #[action]
    fn leave_step(&mut self) {
        self.advance_after.cancel();
    }
}

impl ProcedureMachine {
    fn target_position(&self) -> Option<Vec3> {
        self.target.as_ref().map(|target| target.position)
    }

    fn enter_step(&mut self, step: ProcedureStep) {
        let from = self.step;
        self.step = step;
        if from == step {
            return;
        }
        tracing::info!(from = %from, to = %step, "Step transition");

        // Retrying right after a revert folds back into the first attempt
        let transition = StepTransition { from, to: step };
        if let [.., attempt, revert] = self.transitions.as_slice() {
            if *attempt == transition && revert.from == step && revert.to == from {
                self.transitions.pop();
                return;
            }
        }
        self.transitions.push(transition);
    }

    fn begin(&mut self, target: TargetTooth) {
        self.transitions.clear();
        self.last_instruction = None;

        if let Some(old) = self.highlight.take() {
            self.collaborators.scene.destroy_prop(&old);
        }
        self.highlight = Some(
            self.collaborators
                .scene
                .spawn_prop(PropKind::ToothHighlight, target.position),
        );

        tracing::info!(
            tooth = %target.name,
            socket = ?target.socket_position,
            "Target tooth selected"
        );
        self.target = Some(target);
    }

    /// Drop the target, props, timers and completion flags
    fn clear(&mut self, keep_anesthesia: bool) {
        for prop in [
            self.highlight.take(),
            self.socket_indicator.take(),
            self.implant_screw.take(),
        ]
        .into_iter()
        .flatten()
        {
            self.collaborators.scene.destroy_prop(&prop);
        }

        self.target = None;
        self.anesthesia.reset();
        self.cleaning.reset();
        self.drilling.reset();
        self.screwing.reset();
        self.extraction_elapsed = 0.0;
        self.advance_after.cancel();
        self.implant_position = None;
        self.last_instruction = None;
        if !keep_anesthesia {
            self.anesthesia_complete = false;
        }
    }

    fn forceps_gripping(&self, probe: &Probe) -> bool {
        probe.in_range() && (!self.settings.extraction.require_trigger_press || probe.engaged())
    }

    fn task_mut(&mut self, slot: TimedSlot) -> &mut TimedTask {
        match slot {
            TimedSlot::Anesthesia => &mut self.anesthesia,
            TimedSlot::Cleaning => &mut self.cleaning,
            TimedSlot::Drilling => &mut self.drilling,
            TimedSlot::Screwing => &mut self.screwing,
        }
    }

    /// Feed one tick into a timed task and relay the outcome to the panel
    fn drive_task(&mut self, slot: TimedSlot, probe: &Probe, dt: f32) -> TaskUpdate {
        let task = self.task_mut(slot);
        let update = task.update(probe.active(), dt);
        let elapsed = task.elapsed();
        let required = task.required_duration();

        let messages = slot.messages();
        let progress_text = format!("{} {elapsed:.1}s / {required:.1}s", messages.progress);
        match update {
            TaskUpdate::Started { fraction } => {
                self.instruct(messages.started);
                self.report_progress(&progress_text, fraction);
            }
            TaskUpdate::Progress { fraction, .. } => {
                self.report_progress(&progress_text, fraction);
            }
            TaskUpdate::Interrupted => {
                self.instruct(messages.interrupted);
            }
            TaskUpdate::Completed => {
                self.report_progress(&progress_text, 1.0);
                self.instruct(messages.completed);
            }
            TaskUpdate::Idle | TaskUpdate::AlreadyComplete => {}
        }
        update
    }

    /// Push an instruction unless it is already on the panel
    fn instruct(&mut self, text: &str) {
        if self.last_instruction.as_deref() == Some(text) {
            return;
        }
        self.last_instruction = Some(text.to_string());
        self.collaborators.presentation.set_instruction(text);
    }

    fn report_progress(&mut self, text: &str, fraction: f32) {
        // progress text replaces the instruction on the panel
        self.last_instruction = None;
        self.collaborators
            .presentation
            .set_progress(text, fraction.clamp(0.0, 1.0));
    }

    /// Screwdriver engaged for `dt` seconds: turn and sink the spawned screw
    fn turn_screw(&self, dt: f32) {
        let Some(screw) = &self.implant_screw else {
            return;
        };
        let implant = &self.settings.implant;
        self.collaborators.scene.animate_prop(
            screw,
            PropAnimation::ScrewIn {
                degrees: implant.screw_turn_rate * dt,
                depth: implant.screw_sink_rate * dt,
            },
        );
    }

    fn paint_indicator(&self, color: IndicatorColor, label: &str) {
        tracing::debug!(color = ?color, phase = label, "Socket indicator color");
        self.collaborators
            .indicator
            .set_color(color, label, self.settings.indicator_alpha);
    }
}

impl std::fmt::Debug for ProcedureMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureMachine")
            .field("step", &self.step)
            .field("target", &self.target)
            .field("anesthesia_complete", &self.anesthesia_complete)
            .finish_non_exhaustive()
    }
}
