use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::procedure::ProcedureError;

/// Main configuration structure for the trainer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Step thresholds and timings
    pub procedure: ProcedureSettings,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Headless simulation settings used by the CLI
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcedureSettings {
    /// Start with the anesthesia step
    pub require_anesthesia: bool,
    /// Socket indicator opacity
    pub indicator_alpha: f32,
    pub anesthesia: AnesthesiaSettings,
    pub extraction: ExtractionSettings,
    pub cleaning: CleaningSettings,
    pub implant: ImplantSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnesthesiaSettings {
    /// Syringe-to-tooth distance in meters
    pub distance: f32,
    /// Seconds of injection required
    pub duration: f32,
    pub grace_period: f32,
    /// Wait for numbness before highlighting the tooth
    pub settle_delay: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Forceps-to-tooth distance in meters
    pub distance: f32,
    pub duration: f32,
    /// Extraction only starts while a trigger is held
    pub require_trigger_press: bool,
    /// Length of the lift-out animation before cleaning starts
    pub animation_duration: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CleaningSettings {
    /// Irrigation-syringe-to-socket distance in meters
    pub distance: f32,
    pub duration: f32,
    pub grace_period: f32,
    pub settle_delay: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ImplantSettings {
    /// Drill-to-socket and screwdriver-to-implant distance in meters
    pub tool_distance: f32,
    pub drilling_duration: f32,
    pub screwing_duration: f32,
    pub grace_period: f32,
    /// Held screw must come this close to the socket
    pub screw_placement_distance: f32,
    /// Screw spawns this far above the socket
    pub screw_spawn_height: f32,
    /// Degrees per second the screw turns while being screwed in
    pub screw_turn_rate: f32,
    /// Meters per second the screw sinks while being screwed in
    pub screw_sink_rate: f32,
    pub settle_delay: f32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level
    pub log_level: String,
    /// Structured JSON output instead of plain text
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed tick length in seconds
    pub tick_seconds: f32,
    /// Safety stop for scripted runs
    pub max_ticks: u32,
    /// Seed for target tooth selection
    pub seed: Option<u64>,
}

impl Default for AnesthesiaSettings {
    fn default() -> Self {
        Self {
            distance: 0.1,
            duration: 3.0,
            grace_period: 1.0,
            settle_delay: 3.0,
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            distance: 0.15,
            duration: 2.0,
            require_trigger_press: true,
            animation_duration: 1.5,
        }
    }
}

impl Default for CleaningSettings {
    fn default() -> Self {
        Self {
            distance: 0.15,
            duration: 5.0,
            grace_period: 1.0,
            settle_delay: 2.0,
        }
    }
}

impl Default for ImplantSettings {
    fn default() -> Self {
        Self {
            tool_distance: 0.15,
            drilling_duration: 5.0,
            screwing_duration: 3.0,
            grace_period: 1.0,
            screw_placement_distance: 0.05,
            screw_spawn_height: 0.15,
            screw_turn_rate: 180.0,
            screw_sink_rate: 0.01,
            settle_delay: 3.0,
        }
    }
}

impl Default for ProcedureSettings {
    fn default() -> Self {
        Self {
            require_anesthesia: true,
            indicator_alpha: 0.25,
            anesthesia: AnesthesiaSettings::default(),
            extraction: ExtractionSettings::default(),
            cleaning: CleaningSettings::default(),
            implant: ImplantSettings::default(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: true,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 0.05,
            max_ticks: 10_000,
            seed: None,
        }
    }
}

impl ProcedureSettings {
    /// Durations must be positive; distances, grace periods and delays non-negative
    pub fn validate(&self) -> Result<(), ProcedureError> {
        let positive = [
            ("anesthesia.duration", self.anesthesia.duration),
            ("extraction.duration", self.extraction.duration),
            ("cleaning.duration", self.cleaning.duration),
            ("implant.drilling_duration", self.implant.drilling_duration),
            ("implant.screwing_duration", self.implant.screwing_duration),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ProcedureError::InvalidSettings {
                    reason: format!("{name} must be greater than zero, got {value}"),
                });
            }
        }

        let non_negative = [
            ("anesthesia.distance", self.anesthesia.distance),
            ("anesthesia.grace_period", self.anesthesia.grace_period),
            ("anesthesia.settle_delay", self.anesthesia.settle_delay),
            ("extraction.distance", self.extraction.distance),
            ("extraction.animation_duration", self.extraction.animation_duration),
            ("cleaning.distance", self.cleaning.distance),
            ("cleaning.grace_period", self.cleaning.grace_period),
            ("cleaning.settle_delay", self.cleaning.settle_delay),
            ("implant.tool_distance", self.implant.tool_distance),
            ("implant.grace_period", self.implant.grace_period),
            ("implant.screw_placement_distance", self.implant.screw_placement_distance),
            ("implant.screw_spawn_height", self.implant.screw_spawn_height),
            ("implant.screw_turn_rate", self.implant.screw_turn_rate),
            ("implant.screw_sink_rate", self.implant.screw_sink_rate),
            ("implant.settle_delay", self.implant.settle_delay),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ProcedureError::InvalidSettings {
                    reason: format!("{name} must not be negative, got {value}"),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.indicator_alpha) {
            return Err(ProcedureError::InvalidSettings {
                reason: format!(
                    "indicator_alpha must be within [0, 1], got {}",
                    self.indicator_alpha
                ),
            });
        }

        Ok(())
    }
}

impl TrainerConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (dental-trainer.toml, .dental-trainer-rc)
    /// 3. Environment variables (prefixed with DENTAL_TRAINER_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder();

        if Path::new("dental-trainer.toml").exists() {
            builder = builder.add_source(File::with_name("dental-trainer"));
        }

        if Path::new(".dental-trainer-rc").exists() {
            builder = builder.add_source(
                File::with_name(".dental-trainer-rc").format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(Self::environment());

        let config = builder.build()?;
        let trainer_config: TrainerConfig = config.try_deserialize()?;
        trainer_config.procedure.validate()?;

        Ok(trainer_config)
    }

    /// Load from an explicit file, still honouring environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).format(config::FileFormat::Toml))
            .add_source(Self::environment())
            .build()?;

        let trainer_config: TrainerConfig = config.try_deserialize()?;
        trainer_config.procedure.validate()?;

        Ok(trainer_config)
    }

    fn environment() -> Environment {
        Environment::with_prefix("DENTAL_TRAINER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance, loaded from the working directory on first use
static CONFIG: std::sync::LazyLock<Result<TrainerConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = TrainerConfig::load_env_file();
        TrainerConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static TrainerConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
