use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use statig::prelude::*;

use crate::config::ProcedureSettings;
use crate::geometry::Vec3;
use crate::procedure::errors::ProcedureError;
use crate::procedure::state_machine::{ProcedureMachine, StepEvent};
use crate::procedure::traits::Collaborators;
use crate::procedure::types::*;

/// Snapshot of a session for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub step: ProcedureStep,
    pub target: Option<String>,
    pub socket_position: Option<Vec3>,
    pub overall_progress: f32,
    pub anesthesia_complete: bool,
    pub transitions: Vec<StepTransition>,
    pub captured_at: DateTime<Utc>,
}

/// Owns target selection and drives the step state machine
pub struct ProcedureSession {
    machine: StateMachine<ProcedureMachine>,
    candidates: Vec<ToothCandidate>,
    rng: StdRng,
    session_id: String,
}

impl ProcedureSession {
    pub fn new(
        settings: ProcedureSettings,
        collaborators: Collaborators,
        candidates: Vec<ToothCandidate>,
    ) -> Result<Self, ProcedureError> {
        Self::build(settings, collaborators, candidates, StdRng::from_os_rng())
    }

    /// Deterministic target selection
    pub fn with_seed(
        settings: ProcedureSettings,
        collaborators: Collaborators,
        candidates: Vec<ToothCandidate>,
        seed: u64,
    ) -> Result<Self, ProcedureError> {
        Self::build(settings, collaborators, candidates, StdRng::seed_from_u64(seed))
    }

    fn build(
        settings: ProcedureSettings,
        collaborators: Collaborators,
        candidates: Vec<ToothCandidate>,
        rng: StdRng,
    ) -> Result<Self, ProcedureError> {
        if let Err(e) = settings.validate() {
            tracing::error!(error = %e, "Rejected procedure settings");
            return Err(e);
        }

        let session_id = crate::telemetry::generate_correlation_id();
        tracing::debug!(
            session_id = %session_id,
            candidates = candidates.len(),
            "Procedure session created"
        );

        Ok(Self {
            machine: ProcedureMachine::new(settings, collaborators).state_machine(),
            candidates,
            rng,
            session_id,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn candidates(&self) -> &[ToothCandidate] {
        &self.candidates
    }

    /// Pick a random tooth and begin. Fails without touching state when a
    /// procedure is already running or there is nothing to pick from.
    pub fn start_procedure(&mut self) -> Result<TargetTooth, ProcedureError> {
        let step = self.current_step();
        if step.is_active() {
            tracing::warn!(step = %step, "Start requested while procedure is running");
            return Err(ProcedureError::AlreadyStarted { step });
        }

        if self.candidates.is_empty() {
            tracing::error!(
                session_id = %self.session_id,
                "No candidate teeth found for extraction"
            );
            return Err(ProcedureError::NoCandidateTeeth);
        }

        let index = self.rng.random_range(0..self.candidates.len());
        let target = TargetTooth::from_candidate(&self.candidates[index]);

        let span =
            crate::telemetry::create_session_span(&self.session_id, Some(target.name.as_str()));
        let _guard = span.enter();
        self.machine.handle(&StepEvent::Begin {
            target: target.clone(),
        });

        Ok(target)
    }

    /// Abort everything, anesthesia included. Safe to call repeatedly.
    pub fn reset_procedure(&mut self) {
        self.machine.handle(&StepEvent::Reset {
            keep_anesthesia: false,
        });
    }

    /// Reset and start on a fresh tooth, keeping a completed anesthesia
    pub fn start_new_extraction(&mut self) -> Result<TargetTooth, ProcedureError> {
        self.machine.handle(&StepEvent::Reset {
            keep_anesthesia: true,
        });
        self.start_procedure()
    }

    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() {
            tracing::warn!(dt = dt, "Ignoring non-finite tick");
            return;
        }
        if !self.current_step().is_active() {
            return;
        }
        self.machine.handle(&StepEvent::Tick { dt: dt.max(0.0) });
    }

    pub fn machine(&self) -> &ProcedureMachine {
        self.machine.inner()
    }

    pub fn current_step(&self) -> ProcedureStep {
        self.machine().current_step()
    }

    pub fn target(&self) -> Option<&TargetTooth> {
        self.machine().target()
    }

    pub fn socket_position(&self) -> Option<Vec3> {
        self.machine().socket_position()
    }

    pub fn is_complete(&self) -> bool {
        self.current_step() == ProcedureStep::ProcedureComplete
    }

    /// Fraction of milestone steps reached, 0 before start and 1 when done
    pub fn overall_progress(&self) -> f32 {
        self.current_step().ordinal() as f32 / ProcedureStep::MILESTONES.len() as f32
    }

    pub fn status(&self) -> SessionStatus {
        let machine = self.machine();
        SessionStatus {
            session_id: self.session_id.clone(),
            step: machine.current_step(),
            target: machine.target().map(|target| target.name.clone()),
            socket_position: machine.socket_position(),
            overall_progress: self.overall_progress(),
            anesthesia_complete: machine.anesthesia_complete(),
            transitions: machine.transitions().to_vec(),
            captured_at: Utc::now(),
        }
    }
}

impl std::fmt::Debug for ProcedureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureSession")
            .field("session_id", &self.session_id)
            .field("machine", self.machine())
            .field("candidates", &self.candidates.len())
            .finish()
    }
}
