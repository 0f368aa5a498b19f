// Dental Trainer Library - VR dental procedure core
// This exposes the procedure engine, configuration and the scripted host

pub mod config;
pub mod geometry;
pub mod procedure;
pub mod scenario;
pub mod telemetry;

pub use crate::config::{config, ProcedureSettings, TrainerConfig};
pub use geometry::{Bounds, Vec3};
pub use procedure::{
    Collaborators, ImplantPhase, ProcedureError, ProcedureSession, ProcedureStep, SessionStatus,
    TargetTooth, TimedTask, ToolCategory, ToothCandidate,
};
pub use scenario::{RunOptions, Scenario, ScenarioReport, ScenarioRunner, ScriptedHost};
pub use telemetry::{create_session_span, generate_correlation_id, init_telemetry};
