// Animation clock: which scene is showing and how far its transition has run.
//
// The clock is a small state machine with two inputs:
//
// - `on_cue` (discrete): a cue fired. The transition length comes from the
//   note's duration at the configured tempo. Cue 1 re-confirms the current
//   scene; any later cue advances the scene index by one. When the index
//   runs off the end of the active act, the clock rotates to the next act
//   in the sequence (wrapping) and starts it at scene 0. Every cue restarts
//   the transition at the current transport time with progress 0.
// - `update` (continuous, every frame while live): recompute progress as
//   `clamp((now - start) / duration, 0, 1)`. Never touches act or scene.
//
// `restart` is the third, coarse operation used by resets and by periodic
// regeneration: back to the first act, scene 0, progress 0.
//
// **Invariant:** `scene_index < scene_count(active act)` whenever the clock
// is driven with a populated catalog. Driving it with an empty act is a
// programmer error and panics instead of rendering nothing.

use crate::config::Tempo;
use crate::cue::Cue;
use crate::scene::{Act, ActCatalog};
use serde::{Deserialize, Serialize};

/// What the renderer needs each frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    pub act: Act,
    pub scene_index: usize,
    pub progress: f64,
}

/// Outcome of one cue, for logging and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub cue_number: u32,
    pub act: Act,
    pub scene_index: usize,
    pub duration_ms: f64,
    /// True if this cue moved the clock into a different act slot.
    pub rotated: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationClock {
    act_sequence: Vec<Act>,
    /// Position in `act_sequence`.
    act_position: usize,
    scene_index: usize,
    transition_start_ms: f64,
    transition_duration_ms: f64,
    progress: f64,
}

impl AnimationClock {
    /// A clock at the first act, scene 0, progress 0.
    ///
    /// Panics if `act_sequence` is empty; config validation rules that out.
    pub fn new(act_sequence: Vec<Act>, default_duration_ms: f64) -> Self {
        assert!(
            !act_sequence.is_empty(),
            "animation clock needs at least one act"
        );
        Self {
            act_sequence,
            act_position: 0,
            scene_index: 0,
            transition_start_ms: 0.0,
            transition_duration_ms: default_duration_ms,
            progress: 0.0,
        }
    }

    pub fn active_act(&self) -> Act {
        self.act_sequence[self.act_position]
    }

    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn transition_start_ms(&self) -> f64 {
        self.transition_start_ms
    }

    pub fn transition_duration_ms(&self) -> f64 {
        self.transition_duration_ms
    }

    pub fn snapshot(&self) -> AnimationSnapshot {
        AnimationSnapshot {
            act: self.active_act(),
            scene_index: self.scene_index,
            progress: self.progress,
        }
    }

    /// Apply a fired cue. `now_ms` is the transport time of the firing.
    pub fn on_cue(
        &mut self,
        cue: &Cue,
        catalog: &ActCatalog,
        tempo: &Tempo,
        now_ms: f64,
    ) -> Transition {
        self.assert_populated(catalog);

        self.transition_duration_ms = tempo.ticks_to_ms(cue.duration_ticks);

        if cue.number != 1 {
            self.scene_index += 1;
        }

        let mut rotated = false;
        if self.scene_index >= catalog.scene_count(self.active_act()) {
            self.act_position = (self.act_position + 1) % self.act_sequence.len();
            self.scene_index = 0;
            rotated = true;
            self.assert_populated(catalog);
            tracing::info!(act = %self.active_act(), cue = cue.number, "switching act");
        }

        self.transition_start_ms = now_ms;
        self.progress = 0.0;

        let transition = Transition {
            cue_number: cue.number,
            act: self.active_act(),
            scene_index: self.scene_index,
            duration_ms: self.transition_duration_ms,
            rotated,
        };
        tracing::debug!(?transition, "cue applied");
        transition
    }

    /// Recompute progress for the frame at `now_ms`. Returns the new value.
    pub fn update(&mut self, now_ms: f64) -> f64 {
        self.progress = progress_at(
            now_ms,
            self.transition_start_ms,
            self.transition_duration_ms,
        );
        self.progress
    }

    /// Back to the first act and scene, with a fresh transition starting at
    /// `now_ms`.
    pub fn restart(&mut self, now_ms: f64, duration_ms: f64) {
        self.act_position = 0;
        self.scene_index = 0;
        self.transition_start_ms = now_ms;
        self.transition_duration_ms = duration_ms;
        self.progress = 0.0;
    }

    fn assert_populated(&self, catalog: &ActCatalog) {
        let act = self.active_act();
        assert!(
            catalog.scene_count(act) > 0,
            "animation clock driven before act {act} was populated"
        );
    }
}

/// `clamp((now - start) / duration, 0, 1)`. A zero-length transition is
/// complete from its start instant on.
pub fn progress_at(now_ms: f64, start_ms: f64, duration_ms: f64) -> f64 {
    let elapsed = now_ms - start_ms;
    if duration_ms <= 0.0 {
        return if elapsed >= 0.0 { 1.0 } else { 0.0 };
    }
    (elapsed / duration_ms).clamp(0.0, 1.0)
}
