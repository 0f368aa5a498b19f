use thiserror::Error;

use crate::procedure::types::ProcedureStep;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProcedureError {
    #[error("No candidate teeth available for extraction")]
    NoCandidateTeeth,
    #[error("Procedure already running (current step: {step})")]
    AlreadyStarted { step: ProcedureStep },
    #[error("Invalid procedure settings: {reason}")]
    InvalidSettings { reason: String },
}
