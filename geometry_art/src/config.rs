// Data-driven artwork configuration.
//
// Every tunable of a performance lives in `ArtConfig`: how many scenes each
// act gets, the act rotation order, the tempo used to turn note lengths into
// transition durations, and which of the two drive modes is active. The
// config is loaded from JSON (`from_json`) or taken from `Default`; the
// checked-in `data/geometry_config.json` mirrors the defaults.
//
// Validation runs once, when an `Artwork` is built. After that the timing
// code works with a `Tempo`, which cannot hold a zero PPQ or a non-positive
// BPM, so a transition can never end up with a zero, negative or infinite
// duration because of bad tempo settings.
//
// See also: `artwork.rs` which owns the validated config, `clock.rs` which
// consumes `Tempo`.

use crate::catalog::BlendMode;
use crate::cue::CueTarget;
use crate::error::{ArtError, ConfigError};
use crate::scene::Act;
use serde::{Deserialize, Serialize};

/// Raw tempo settings as they appear in JSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TempoConfig {
    /// Ticks per quarter note of the score's timing reference.
    pub ppq: u32,
    /// Beats per minute.
    pub bpm: f64,
}

impl Default for TempoConfig {
    fn default() -> Self {
        Self {
            ppq: 3840 * 4,
            bpm: 200.0,
        }
    }
}

/// Validated tempo. Only obtainable through `Tempo::new`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tempo {
    ppq: u32,
    bpm: f64,
}

impl Tempo {
    pub fn new(ppq: u32, bpm: f64) -> Result<Self, ConfigError> {
        if ppq == 0 {
            return Err(ConfigError::ZeroPpq);
        }
        if !(bpm.is_finite() && bpm > 0.0) {
            return Err(ConfigError::InvalidBpm(bpm));
        }
        Ok(Self { ppq, bpm })
    }

    pub fn ppq(&self) -> u32 {
        self.ppq
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Wall-clock length of a note, in ms:
    /// `(ticks / ppq) * (60 / bpm) * 1000`, evaluated as
    /// `ticks * 60000 / (ppq * bpm)` to keep whole-beat results exact.
    pub fn ticks_to_ms(&self, ticks: u64) -> f64 {
        (ticks as f64 * 60_000.0) / (self.ppq as f64 * self.bpm)
    }
}

/// What moves the animation clock forward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum DriveMode {
    /// Scene transitions happen on musical cues.
    Cued,
    /// Cues are ignored; every `interval_ms` of transport time the whole
    /// catalog is regenerated and the clock restarts.
    Periodic { interval_ms: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtConfig {
    /// Scenes generated for every act.
    pub scenes_per_act: usize,
    /// Act rotation order (cyclic). Repeats are allowed.
    pub act_sequence: Vec<Act>,
    pub tempo: TempoConfig,
    /// Transition duration before the first cue fires.
    pub default_transition_ms: f64,
    /// When true, simultaneous notes each get their own cue.
    pub poly_mode: bool,
    /// Handler id whose cues drive scene transitions.
    pub cue_target: CueTarget,
    pub drive: DriveMode,
    /// Blend modes sampled on each transition.
    pub blend_modes: Vec<BlendMode>,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            scenes_per_act: 16,
            act_sequence: vec![Act::Pairs, Act::Triads, Act::Layers],
            tempo: TempoConfig::default(),
            default_transition_ms: 1000.0,
            poly_mode: false,
            cue_target: CueTarget::default(),
            drive: DriveMode::Cued,
            blend_modes: BlendMode::ALL.to_vec(),
        }
    }
}

impl ArtConfig {
    pub fn from_json(json: &str) -> Result<Self, ArtError> {
        let config: ArtConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The config shipped in `data/geometry_config.json`.
    pub fn embedded_default() -> Result<Self, ArtError> {
        Self::from_json(include_str!("../../data/geometry_config.json"))
    }

    /// Check every value the performance relies on. Returns the validated
    /// tempo since that is what the clock needs.
    pub fn validate(&self) -> Result<Tempo, ConfigError> {
        let tempo = Tempo::new(self.tempo.ppq, self.tempo.bpm)?;
        if self.scenes_per_act == 0 {
            return Err(ConfigError::NoScenes);
        }
        if self.act_sequence.is_empty() {
            return Err(ConfigError::EmptyActSequence);
        }
        if !positive_finite(self.default_transition_ms) {
            return Err(ConfigError::InvalidTransitionDuration(
                self.default_transition_ms,
            ));
        }
        if let DriveMode::Periodic { interval_ms } = self.drive {
            if !positive_finite(interval_ms) {
                return Err(ConfigError::InvalidInterval(interval_ms));
            }
        }
        if self.blend_modes.is_empty() {
            return Err(ConfigError::NoBlendModes);
        }
        Ok(tempo)
    }
}

fn positive_finite(v: f64) -> bool {
    v.is_finite() && v > 0.0
}
