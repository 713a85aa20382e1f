//! Configuration loading and typed config structures for the decision core.
//!
//! Every tunable of the trust model, the wait-timer policy and the phase
//! machine lives in [`AgentConfig`]. The YAML layout mirrors the struct
//! layout; any key that is absent takes its default, so an empty document
//! is a valid configuration.
//!
//! ```yaml
//! trust:
//!   default_competence: 0.5
//!   default_willingness: 0.5
//! decay:
//!   window_ticks: 60
//! wait:
//!   base_ticks: 15.0
//! mission:
//!   announce_idle_ticks: 25
//! ```

use std::path::Path;

use serde::Deserialize;

use rescuebot_types::TrustBelief;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level decision core configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AgentConfig {
    /// Trust defaults and reserved teammate identities.
    #[serde(default)]
    pub trust: TrustConfig,

    /// Silence decay parameters.
    #[serde(default)]
    pub decay: DecayConfig,

    /// Wait-timer policy parameters.
    #[serde(default)]
    pub wait: WaitConfig,

    /// Phase machine parameters.
    #[serde(default)]
    pub mission: MissionConfig,
}

impl AgentConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Trust model configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrustConfig {
    /// Competence used when no persisted row exists.
    #[serde(default = "default_belief")]
    pub default_competence: f64,

    /// Willingness used when no persisted row exists.
    #[serde(default = "default_belief")]
    pub default_willingness: f64,

    /// Baseline teammate identities whose beliefs are never revised.
    #[serde(default = "default_reserved_names")]
    pub reserved_names: Vec<String>,
}

impl TrustConfig {
    /// The default belief as a [`TrustBelief`].
    pub const fn default_belief(&self) -> TrustBelief {
        TrustBelief::new(self.default_competence, self.default_willingness)
    }

    /// Whether a teammate name is one of the reserved baselines.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|reserved| reserved == name)
    }
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            default_competence: default_belief(),
            default_willingness: default_belief(),
            reserved_names: default_reserved_names(),
        }
    }
}

/// Silence decay configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DecayConfig {
    /// How far back (in ticks) message gaps are examined.
    #[serde(default = "default_window_ticks")]
    pub window_ticks: u64,

    /// Gaps longer than this many ticks accrue decay.
    #[serde(default = "default_max_gap_ticks")]
    pub max_gap_ticks: u64,

    /// Decay accrued per tick of an over-long gap.
    #[serde(default = "default_rate_per_tick")]
    pub rate_per_tick: f64,

    /// Decay never pushes a scalar below this value.
    #[serde(default = "default_floor")]
    pub floor: f64,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            window_ticks: default_window_ticks(),
            max_gap_ticks: default_max_gap_ticks(),
            rate_per_tick: default_rate_per_tick(),
            floor: default_floor(),
        }
    }
}

/// Wait-timer policy configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaitConfig {
    /// Base wait before multipliers, in ticks.
    #[serde(default = "default_base_ticks")]
    pub base_ticks: f64,

    /// Multiplier when the human is close.
    #[serde(default = "default_close_multiplier")]
    pub close_multiplier: f64,

    /// Multiplier when the human is far.
    #[serde(default = "default_far_multiplier")]
    pub far_multiplier: f64,

    /// Extra multiplier for actions that need both team members.
    #[serde(default = "default_joint_multiplier")]
    pub joint_multiplier: f64,

    /// Exponent applied to the combined trust term.
    #[serde(default = "default_trust_exponent")]
    pub trust_exponent: f64,

    /// Shortest wait, in ticks.
    #[serde(default = "default_min_ticks")]
    pub min_ticks: u32,

    /// Longest wait, in ticks.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            base_ticks: default_base_ticks(),
            close_multiplier: default_close_multiplier(),
            far_multiplier: default_far_multiplier(),
            joint_multiplier: default_joint_multiplier(),
            trust_exponent: default_trust_exponent(),
            min_ticks: default_min_ticks(),
            max_ticks: default_max_ticks(),
        }
    }
}

/// Phase machine configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MissionConfig {
    /// Idle ticks emitted after announcing a new goal.
    #[serde(default = "default_announce_idle_ticks")]
    pub announce_idle_ticks: u32,

    /// Mean competence below which the human counts as weak.
    #[serde(default = "default_weak_threshold")]
    pub weak_threshold: f64,

    /// Mean competence below which the human counts as normal.
    #[serde(default = "default_strong_threshold")]
    pub strong_threshold: f64,

    /// Rescue competence above which mild victims are rescued together.
    #[serde(default = "default_rescue_competence_threshold")]
    pub rescue_competence_threshold: f64,

    /// Rescue willingness above which mild victims are rescued together.
    #[serde(default = "default_rescue_willingness_threshold")]
    pub rescue_willingness_threshold: f64,

    /// Highest area index of the first map half (near/far split).
    #[serde(default = "default_room_split")]
    pub room_split: u32,

    /// Chebyshev distance at which the human counts as next to a victim.
    #[serde(default = "default_co_located_distance")]
    pub co_located_distance: u32,

    /// Upper bound on phase transitions evaluated in one tick.
    #[serde(default = "default_max_phase_steps")]
    pub max_phase_steps: u32,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            announce_idle_ticks: default_announce_idle_ticks(),
            weak_threshold: default_weak_threshold(),
            strong_threshold: default_strong_threshold(),
            rescue_competence_threshold: default_rescue_competence_threshold(),
            rescue_willingness_threshold: default_rescue_willingness_threshold(),
            room_split: default_room_split(),
            co_located_distance: default_co_located_distance(),
            max_phase_steps: default_max_phase_steps(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_belief() -> f64 {
    0.5
}

fn default_reserved_names() -> Vec<String> {
    ["ALWAYS_TRUST", "NEVER_TRUST", "RANDOM_TRUST"]
        .iter()
        .map(|name| (*name).to_owned())
        .collect()
}

const fn default_window_ticks() -> u64 {
    60
}

const fn default_max_gap_ticks() -> u64 {
    15
}

const fn default_rate_per_tick() -> f64 {
    0.003
}

const fn default_floor() -> f64 {
    -0.25
}

const fn default_base_ticks() -> f64 {
    15.0
}

const fn default_close_multiplier() -> f64 {
    1.5
}

const fn default_far_multiplier() -> f64 {
    2.0
}

const fn default_joint_multiplier() -> f64 {
    1.5
}

const fn default_trust_exponent() -> f64 {
    0.5
}

const fn default_min_ticks() -> u32 {
    10
}

const fn default_max_ticks() -> u32 {
    30
}

const fn default_announce_idle_ticks() -> u32 {
    25
}

const fn default_weak_threshold() -> f64 {
    -0.2
}

const fn default_strong_threshold() -> f64 {
    0.2
}

const fn default_rescue_competence_threshold() -> f64 {
    0.2
}

const fn default_rescue_willingness_threshold() -> f64 {
    0.0
}

const fn default_room_split() -> u32 {
    7
}

const fn default_co_located_distance() -> u32 {
    1
}

const fn default_max_phase_steps() -> u32 {
    64
}
