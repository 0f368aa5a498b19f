// Dental procedure core - proximity checks, timed tasks, step sequencing
//
// The host engine supplies tool poses and consumes instructions, indicator
// colors and prop commands through the traits in `traits`. Everything here
// is single-threaded and driven by `ProcedureSession::tick`.

pub mod deferred;
pub mod errors;
pub mod oracle;
pub mod session;
pub mod state_machine;
pub mod timed_task;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod mocks;


pub use deferred::DeferredTransition;
pub use errors::ProcedureError;
pub use oracle::{Probe, ProximityOracle};
pub use session::{ProcedureSession, SessionStatus};
pub use state_machine::{ProcedureMachine, StepEvent};
pub use timed_task::{TaskPhase, TaskUpdate, TimedTask};
pub use traits::{Collaborators, Presentation, SceneOps, SocketIndicator, ToolTracker};
pub use types::*;
