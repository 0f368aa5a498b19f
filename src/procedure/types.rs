// Core types for the procedure state machine

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Bounds, Vec3};

/// Sub-phase of the implant placement step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImplantPhase {
    Drilling,
    PlacingScrew,
    ScrewingIn,
    Complete,
}

/// Steps of the procedure, in the order a trainee walks through them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcedureStep {
    /// No procedure running; nothing is ticked
    WaitingToStart,
    /// Syringe must be held near the target tooth with the trigger engaged
    AnesthesiaRequired,
    /// Target tooth is highlighted, waiting for forceps to approach
    ToothHighlighted,
    /// Forceps are within reach of the tooth
    ForcepsNearTooth,
    /// Forceps engaged on the tooth, extraction timer running
    ExtractionInProgress,
    /// Tooth is out, extraction animation playing
    ToothExtracted,
    /// Irrigation syringe held near the socket
    SocketCleaning,
    ImplantPlacement(ImplantPhase),
    ProcedureComplete,
}

impl ProcedureStep {
    /// Milestones used for overall progress reporting
    pub const MILESTONES: [ProcedureStep; 11] = [
        ProcedureStep::AnesthesiaRequired,
        ProcedureStep::ToothHighlighted,
        ProcedureStep::ForcepsNearTooth,
        ProcedureStep::ExtractionInProgress,
        ProcedureStep::ToothExtracted,
        ProcedureStep::SocketCleaning,
        ProcedureStep::ImplantPlacement(ImplantPhase::Drilling),
        ProcedureStep::ImplantPlacement(ImplantPhase::PlacingScrew),
        ProcedureStep::ImplantPlacement(ImplantPhase::ScrewingIn),
        ProcedureStep::ImplantPlacement(ImplantPhase::Complete),
        ProcedureStep::ProcedureComplete,
    ];

    /// Position along the happy path; `WaitingToStart` is 0
    pub fn ordinal(&self) -> usize {
        Self::MILESTONES
            .iter()
            .position(|step| step == self)
            .map(|index| index + 1)
            .unwrap_or(0)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, ProcedureStep::WaitingToStart)
    }
}

impl fmt::Display for ProcedureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcedureStep::ImplantPlacement(phase) => write!(f, "ImplantPlacement({phase:?})"),
            other => write!(f, "{other:?}"),
        }
    }
}

impl std::str::FromStr for ProcedureStep {
    type Err = String;

    /// Parses the `Display` form, e.g. `ToothExtracted` or `ImplantPlacement(Drilling)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        std::iter::once(ProcedureStep::WaitingToStart)
            .chain(Self::MILESTONES)
            .find(|step| step.to_string() == name)
            .ok_or_else(|| format!("unknown procedure step '{name}'"))
    }
}

/// Category a tracked tool is matched on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    AnesthesiaSyringe,
    Forceps,
    IrrigationSyringe,
    Drill,
    ImplantScrew,
    Screwdriver,
}

impl ToolCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ToolCategory::AnesthesiaSyringe => "syringe",
            ToolCategory::Forceps => "forceps",
            ToolCategory::IrrigationSyringe => "irrigation syringe",
            ToolCategory::Drill => "drill",
            ToolCategory::ImplantScrew => "implant screw",
            ToolCategory::Screwdriver => "screwdriver",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandSide {
    Left,
    Right,
}

/// Snapshot of a tracked tool as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolHandle {
    pub category: ToolCategory,
    pub position: Vec3,
    pub held: bool,
    pub primary_trigger: bool,
    pub secondary_trigger: bool,
}

impl ToolHandle {
    pub fn world_position(&self) -> Vec3 {
        self.position
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Held with either trigger pressed
    pub fn is_engaged(&self) -> bool {
        self.held && (self.primary_trigger || self.secondary_trigger)
    }
}

/// Opaque host-side identifier for a spawned or scene-owned object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropHandle(pub String);

impl fmt::Display for PropHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropKind {
    ToothHighlight,
    SocketIndicator,
    ImplantScrew,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropAnimation {
    /// Lift the extracted tooth out of the socket
    ExtractionLift,
    /// Freeze the placed screw so it no longer falls or drifts
    Seat,
    /// Turn the screw about its vertical axis and sink it into the socket
    ScrewIn { degrees: f32, depth: f32 },
}

/// A tooth the session may pick as its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToothCandidate {
    pub handle: PropHandle,
    pub name: String,
    pub position: Vec3,
    pub bounds: Bounds,
}

/// The selected tooth together with the socket position derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetTooth {
    pub handle: PropHandle,
    pub name: String,
    pub position: Vec3,
    pub socket_position: Vec3,
}

impl TargetTooth {
    pub fn from_candidate(candidate: &ToothCandidate) -> Self {
        Self {
            handle: candidate.handle.clone(),
            name: candidate.name.clone(),
            position: candidate.position,
            socket_position: candidate.bounds.bottom_center(),
        }
    }
}

/// Socket indicator tint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorColor {
    Red,
    Blue,
    Yellow,
    Orange,
    Cyan,
    Green,
}

impl IndicatorColor {
    pub fn rgb(&self) -> [f32; 3] {
        match self {
            IndicatorColor::Red => [1.0, 0.0, 0.0],
            IndicatorColor::Blue => [0.0, 0.0, 1.0],
            IndicatorColor::Yellow => [1.0, 0.92, 0.016],
            IndicatorColor::Orange => [1.0, 0.5, 0.0],
            IndicatorColor::Cyan => [0.0, 1.0, 1.0],
            IndicatorColor::Green => [0.0, 1.0, 0.0],
        }
    }
}

/// One executed step change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTransition {
    pub from: ProcedureStep,
    pub to: ProcedureStep,
}

impl StepTransition {
    /// Moves one milestone forward along the happy path
    pub fn is_forward(&self) -> bool {
        self.to.ordinal() == self.from.ordinal() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_parses_from_display_form() {
        for step in ProcedureStep::MILESTONES {
            assert_eq!(step.to_string().parse::<ProcedureStep>(), Ok(step));
        }
        assert_eq!(
            "ImplantPlacement(ScrewingIn)".parse::<ProcedureStep>(),
            Ok(ProcedureStep::ImplantPlacement(ImplantPhase::ScrewingIn))
        );
        assert!("Flossing".parse::<ProcedureStep>().is_err());
    }

    #[test]
    fn test_step_ordinals_follow_milestones() {
        assert_eq!(ProcedureStep::WaitingToStart.ordinal(), 0);
        assert_eq!(ProcedureStep::AnesthesiaRequired.ordinal(), 1);
        assert_eq!(ProcedureStep::ProcedureComplete.ordinal(), 11);
        assert!(
            ProcedureStep::ImplantPlacement(ImplantPhase::PlacingScrew).ordinal()
                < ProcedureStep::ImplantPlacement(ImplantPhase::ScrewingIn).ordinal()
        );
    }

    #[test]
    fn test_engagement_requires_hold_and_trigger() {
        let mut tool = ToolHandle {
            category: ToolCategory::Forceps,
            position: Vec3::ZERO,
            held: true,
            primary_trigger: false,
            secondary_trigger: true,
        };
        assert!(tool.is_engaged());

        tool.held = false;
        assert!(!tool.is_engaged());

        tool.held = true;
        tool.secondary_trigger = false;
        assert!(!tool.is_engaged());
    }

    #[test]
    fn test_transition_direction() {
        let forward = StepTransition {
            from: ProcedureStep::ForcepsNearTooth,
            to: ProcedureStep::ExtractionInProgress,
        };
        let revert = StepTransition {
            from: ProcedureStep::ExtractionInProgress,
            to: ProcedureStep::ForcepsNearTooth,
        };
        assert!(forward.is_forward());
        assert!(!revert.is_forward());
    }

    #[test]
    fn test_target_socket_from_bounds() {
        let candidate = ToothCandidate {
            handle: PropHandle("tooth-36".to_string()),
            name: "Tooth_36".to_string(),
            position: Vec3::new(0.0, 1.0, 0.0),
            bounds: Bounds::cube(Vec3::new(0.0, 1.0, 0.0), 0.02),
        };
        let target = TargetTooth::from_candidate(&candidate);
        assert_eq!(target.name, "Tooth_36");
        assert!((target.socket_position.y - 0.99).abs() < 1e-6);
    }
}
