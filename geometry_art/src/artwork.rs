// The artwork: single owner of all performance state.
//
// `Artwork` is the composition root the host talks to. It owns the seed,
// the seeded `ArtRng`, the harmony set, the scene catalog, the animation
// clock and the playback controller. The host owns the transport and
// forwards three kinds of input, always from one thread:
//
// - frame ticks (`frame`), any rate;
// - transport events: cue firings (`on_cue`) and end-of-stream
//   (`transport_ended`);
// - clicks (`toggle_playback`).
//
// Score loading happens elsewhere; its outcome arrives through
// `score_ready` or `score_failed`.
//
// Drive modes (`config::DriveMode`) are mutually exclusive. In `Cued` mode
// cues for the configured target move the clock. In `Periodic` mode cues
// are ignored and, while frames are live, the catalog is regenerated every
// `interval_ms` of transport time with the clock restarted at the first act.
//
// Resuming after the end of the buffer resets the clock to its initial
// state. The catalog is kept, so the replay shows the same scenes in the
// same order; only `reseed` replaces it.
//
// A reseed while playing renumbers the cues still ahead of the playhead
// from 1 (`cue_offset`), so the new catalog opens on its scene 0 like a
// fresh run. The offset is dropped when playback restarts from the top.
//
// **Critical constraint: determinism.** Every random draw after seeding
// goes through `self.rng`, in this order: base hue, catalog, then one blend
// mode per transition (and a fresh harmony + catalog per periodic
// regeneration). Given the same seed, config, and cue/frame sequence, two
// artworks produce identical frames.

use crate::catalog::BlendMode;
use crate::clock::{AnimationClock, AnimationSnapshot, Transition};
use crate::config::{ArtConfig, DriveMode, Tempo};
use crate::cue::{Cue, NoteEvent, schedule_cues};
use crate::error::ArtError;
use crate::harmony::HarmonySet;
use crate::layout::{FramePlan, Viewport, plan_scene};
use crate::playback::{PlaybackController, PlaybackNotice, PlaybackPhase};
use crate::scene::{ActCatalog, Scene, generate_catalog};
use crate::seed::Seed;
use crate::transport::Transport;
use geometry_prng::ArtRng;
use serde::{Deserialize, Serialize};

/// Outcome of the background score load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreStatus {
    Pending,
    Ready { cues: usize },
    Failed(String),
}

/// What the renderer should show for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    /// Nothing has played yet: a blank black canvas.
    Static,
    /// Progress was recomputed for this frame.
    Live(FrameState),
    /// Paused: progress holds its last value.
    Held(FrameState),
}

impl Frame {
    pub fn state(&self) -> Option<&FrameState> {
        match self {
            Frame::Static => None,
            Frame::Live(state) | Frame::Held(state) => Some(state),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    pub snapshot: AnimationSnapshot,
    pub blend_mode: BlendMode,
}

pub struct Artwork {
    config: ArtConfig,
    tempo: Tempo,
    seed: Seed,
    rng: ArtRng,
    harmony: HarmonySet,
    catalog: ActCatalog,
    clock: AnimationClock,
    playback: PlaybackController,
    blend_mode: BlendMode,
    score: ScoreStatus,
    cues: Vec<Cue>,
    /// Cues behind the playhead at the last reseed; subtracted from fired
    /// cue numbers until the next replay from the start.
    cue_offset: u32,
    /// Transport time (ms) of the last periodic regeneration.
    last_regeneration_ms: f64,
    /// Catalogs generated so far, including the first.
    generation: u32,
}

impl Artwork {
    /// Validate the config and build everything that depends only on the
    /// seed: harmony, catalog and an idle clock.
    pub fn new(config: ArtConfig, seed: Seed) -> Result<Self, ArtError> {
        let tempo = config.validate()?;
        let mut rng = ArtRng::new(u64::from(seed.value()));
        let harmony = HarmonySet::sample(&mut rng);
        let catalog = generate_catalog(&harmony, config.scenes_per_act, &mut rng);
        let clock = AnimationClock::new(
            config.act_sequence.clone(),
            config.default_transition_ms,
        );
        tracing::info!(%seed, base_hue = harmony.base, drive = ?config.drive, "artwork created");

        Ok(Self {
            config,
            tempo,
            seed,
            rng,
            harmony,
            catalog,
            clock,
            playback: PlaybackController::new(),
            blend_mode: BlendMode::Blend,
            score: ScoreStatus::Pending,
            cues: Vec::new(),
            cue_offset: 0,
            last_regeneration_ms: 0.0,
            generation: 1,
        })
    }

    pub fn config(&self) -> &ArtConfig {
        &self.config
    }

    pub fn tempo(&self) -> &Tempo {
        &self.tempo
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn harmony(&self) -> &HarmonySet {
        &self.harmony
    }

    pub fn catalog(&self) -> &ActCatalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> AnimationSnapshot {
        self.clock.snapshot()
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn score_status(&self) -> &ScoreStatus {
        &self.score
    }

    /// Cues registered with the transport for the current score.
    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn phase(&self, transport: &impl Transport) -> PlaybackPhase {
        self.playback.phase(transport)
    }

    /// The scene the clock currently points at.
    pub fn current_scene(&self) -> &Scene {
        let snapshot = self.clock.snapshot();
        self.catalog.scene(snapshot.act, snapshot.scene_index)
    }

    // -----------------------------------------------------------------------
    // Score
    // -----------------------------------------------------------------------

    /// The score finished loading: register its cues and open the gate.
    pub fn score_ready(
        &mut self,
        transport: &mut impl Transport,
        notes: &[NoteEvent],
    ) -> Vec<PlaybackNotice> {
        self.cues = schedule_cues(
            transport,
            notes,
            self.config.cue_target,
            self.config.poly_mode,
        );
        self.score = ScoreStatus::Ready {
            cues: self.cues.len(),
        };
        self.cue_offset = 0;
        tracing::info!(cues = self.cues.len(), "score ready");
        self.playback.score_ready()
    }

    /// The score could not be loaded. Playback stays unavailable.
    pub fn score_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "score failed to load; playback disabled");
        self.score = ScoreStatus::Failed(reason);
    }

    // -----------------------------------------------------------------------
    // Transport callbacks
    // -----------------------------------------------------------------------

    /// A cue fired at transport time `at_secs`. Returns the transition it
    /// caused, or `None` if the cue was ignored.
    pub fn on_cue(&mut self, cue: &Cue, at_secs: f64) -> Option<Transition> {
        if let DriveMode::Periodic { .. } = self.config.drive {
            tracing::debug!(cue = cue.number, "periodic drive; cue ignored");
            return None;
        }
        if cue.target != self.config.cue_target {
            tracing::warn!(
                cue = cue.number,
                target = cue.target.0,
                "cue for another target ignored"
            );
            return None;
        }

        let renumbered = Cue {
            number: cue
                .number
                .checked_sub(self.cue_offset)
                .filter(|&n| n >= 1)
                .unwrap_or(cue.number),
            ..*cue
        };
        let transition =
            self.clock
                .on_cue(&renumbered, &self.catalog, &self.tempo, at_secs * 1000.0);
        self.blend_mode = *self.rng.choose(&self.config.blend_modes);
        Some(transition)
    }

    pub fn transport_ended(&mut self) -> Vec<PlaybackNotice> {
        tracing::info!(snapshot = ?self.clock.snapshot(), "transport reached the end");
        self.playback.transport_ended()
    }

    // -----------------------------------------------------------------------
    // Frames and input
    // -----------------------------------------------------------------------

    /// Advance per-frame state and describe what to draw.
    pub fn frame(&mut self, transport: &impl Transport) -> Frame {
        match self.playback.phase(transport) {
            PlaybackPhase::Loading | PlaybackPhase::Static => Frame::Static,
            PlaybackPhase::Paused => Frame::Held(self.frame_state()),
            PlaybackPhase::Playing | PlaybackPhase::Finished => {
                let now_ms = transport.current_time() * 1000.0;
                if let DriveMode::Periodic { interval_ms } = self.config.drive {
                    self.regenerate_if_due(now_ms, interval_ms);
                }
                self.clock.update(now_ms);
                Frame::Live(self.frame_state())
            }
        }
    }

    /// Plan the cells for a frame returned by `frame`. `None` for the
    /// static frame.
    pub fn plan(&self, frame: &Frame, viewport: Viewport) -> Option<FramePlan> {
        let state = frame.state()?;
        let scene = self
            .catalog
            .scene(state.snapshot.act, state.snapshot.scene_index);
        Some(plan_scene(scene, state.snapshot.progress, viewport))
    }

    /// A click: pause, resume, or restart after the end.
    pub fn toggle_playback(&mut self, transport: &mut impl Transport) -> Vec<PlaybackNotice> {
        let notices = self.playback.toggle(transport);
        if notices.contains(&PlaybackNotice::ResetRequested) {
            let now_ms = transport.current_time() * 1000.0;
            self.clock.restart(now_ms, self.config.default_transition_ms);
            self.last_regeneration_ms = now_ms;
            self.cue_offset = 0;
            tracing::info!("replaying from the start");
        }
        notices
    }

    // -----------------------------------------------------------------------
    // Regeneration
    // -----------------------------------------------------------------------

    /// Replace the seed and rebuild everything derived from it: harmony,
    /// catalog, clock and the transport's cue schedule. `notes` is the
    /// loaded score; it is ignored unless the score is ready.
    pub fn reseed(&mut self, seed: Seed, transport: &mut impl Transport, notes: &[NoteEvent]) {
        transport.clear_cues();
        self.rng = ArtRng::new(u64::from(seed.value()));
        self.harmony = HarmonySet::sample(&mut self.rng);
        self.catalog = generate_catalog(&self.harmony, self.config.scenes_per_act, &mut self.rng);
        self.generation = 1;
        self.blend_mode = BlendMode::Blend;

        let now_ms = transport.current_time() * 1000.0;
        self.clock = AnimationClock::new(
            self.config.act_sequence.clone(),
            self.config.default_transition_ms,
        );
        self.clock.restart(now_ms, self.config.default_transition_ms);
        self.last_regeneration_ms = now_ms;

        self.cues.clear();
        self.cue_offset = 0;
        if let ScoreStatus::Ready { .. } = self.score {
            self.cues = schedule_cues(
                transport,
                notes,
                self.config.cue_target,
                self.config.poly_mode,
            );
            self.score = ScoreStatus::Ready {
                cues: self.cues.len(),
            };
            let now_secs = transport.current_time();
            let behind = self.cues.iter().filter(|c| c.time < now_secs).count();
            self.cue_offset = u32::try_from(behind).unwrap_or(u32::MAX);
        }
        tracing::info!(%seed, base_hue = self.harmony.base, "reseeded");
        self.seed = seed;
    }

    fn regenerate_if_due(&mut self, now_ms: f64, interval_ms: f64) {
        if now_ms - self.last_regeneration_ms < interval_ms {
            return;
        }
        self.harmony = HarmonySet::sample(&mut self.rng);
        self.catalog = generate_catalog(&self.harmony, self.config.scenes_per_act, &mut self.rng);
        self.blend_mode = *self.rng.choose(&self.config.blend_modes);
        self.clock.restart(now_ms, interval_ms);
        self.last_regeneration_ms = now_ms;
        self.generation += 1;
        tracing::debug!(generation = self.generation, now_ms, "periodic regeneration");
    }

    fn frame_state(&self) -> FrameState {
        FrameState {
            snapshot: self.clock.snapshot(),
            blend_mode: self.blend_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::CueTarget;
    use crate::error::ConfigError;
    use crate::scene::Act;
    use crate::transport::{TransportEvent, VirtualTransport};

    fn quarter_notes(count: u64, ppq: u64, beat_secs: f64) -> Vec<NoteEvent> {
        (0..count)
            .map(|i| NoteEvent {
                tick: i * ppq,
                time: i as f64 * beat_secs,
                duration_ticks: ppq,
            })
            .collect()
    }

    fn small_config() -> ArtConfig {
        ArtConfig {
            scenes_per_act: 3,
            ..ArtConfig::default()
        }
    }

    fn artwork(config: ArtConfig, token: &str) -> Artwork {
        Artwork::new(config, Seed::from_token(token)).unwrap()
    }

    /// Run every event from the transport into the artwork.
    fn pump(art: &mut Artwork, transport: &mut VirtualTransport, dt: f64) -> Vec<Transition> {
        let mut transitions = Vec::new();
        for event in transport.advance(dt) {
            match event {
                TransportEvent::Cue { cue, at } => {
                    transitions.extend(art.on_cue(&cue, at));
                }
                TransportEvent::Ended => {
                    art.transport_ended();
                }
            }
        }
        transitions
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut config = ArtConfig::default();
        config.tempo.bpm = 0.0;
        let err = Artwork::new(config, Seed::from_token("x")).err();
        assert!(matches!(
            err,
            Some(ArtError::Config(ConfigError::InvalidBpm(_)))
        ));
    }

    #[test]
    fn same_seed_builds_same_artwork() {
        let a = artwork(ArtConfig::default(), "oo-same");
        let b = artwork(ArtConfig::default(), "oo-same");
        assert_eq!(a.harmony(), b.harmony());
        assert_eq!(a.catalog(), b.catalog());
        let c = artwork(ArtConfig::default(), "oo-other");
        assert_ne!(a.catalog(), c.catalog());
    }

    #[test]
    fn frames_are_static_until_first_play() {
        let mut art = artwork(small_config(), "static");
        let mut transport = VirtualTransport::new(10.0);
        assert_eq!(art.frame(&transport), Frame::Static);

        // Clicks before the score is ready do nothing.
        assert!(art.toggle_playback(&mut transport).is_empty());
        assert_eq!(art.frame(&transport), Frame::Static);

        art.score_ready(&mut transport, &quarter_notes(4, 15360, 0.3));
        assert_eq!(art.frame(&transport), Frame::Static);
        assert!(art.plan(&Frame::Static, Viewport::new(100.0, 100.0)).is_none());

        art.toggle_playback(&mut transport);
        assert!(matches!(art.frame(&transport), Frame::Live(_)));
    }

    #[test]
    fn failed_score_keeps_playback_gated() {
        let mut art = artwork(small_config(), "fail");
        let mut transport = VirtualTransport::new(10.0);
        art.score_failed("no such file");
        assert_eq!(
            art.score_status(),
            &ScoreStatus::Failed("no such file".to_string())
        );
        assert!(art.toggle_playback(&mut transport).is_empty());
        assert!(!transport.is_playing());
    }

    #[test]
    fn cues_drive_scenes_and_progress() {
        let mut art = artwork(small_config(), "drive");
        let mut transport = VirtualTransport::new(10.0);
        art.score_ready(&mut transport, &quarter_notes(8, 15360, 0.3));
        assert_eq!(art.cues().len(), 8);
        art.toggle_playback(&mut transport);

        let transitions = pump(&mut art, &mut transport, 0.15);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].scene_index, 0);
        assert_eq!(transitions[0].duration_ms, 300.0);

        let Frame::Live(state) = art.frame(&transport) else {
            panic!("expected a live frame while playing");
        };
        assert_eq!(state.snapshot.act, Act::Pairs);
        assert!((state.snapshot.progress - 0.5).abs() < 1e-9);
        assert!(art.config().blend_modes.contains(&state.blend_mode));

        // Cues 2..=4: indices 1, 2, then rotate into Triads.
        let transitions = pump(&mut art, &mut transport, 0.9);
        let positions: Vec<(Act, usize)> =
            transitions.iter().map(|t| (t.act, t.scene_index)).collect();
        assert_eq!(
            positions,
            vec![(Act::Pairs, 1), (Act::Pairs, 2), (Act::Triads, 0)]
        );
        let frame = art.frame(&transport);
        assert!(art.plan(&frame, Viewport::new(900.0, 600.0)).is_some());
    }

    #[test]
    fn pause_holds_progress() {
        let mut art = artwork(small_config(), "pause");
        let mut transport = VirtualTransport::new(10.0);
        art.score_ready(&mut transport, &quarter_notes(2, 15360, 0.3));
        art.toggle_playback(&mut transport);
        pump(&mut art, &mut transport, 0.1);
        let Frame::Live(before) = art.frame(&transport) else {
            panic!("expected a live frame");
        };

        art.toggle_playback(&mut transport);
        pump(&mut art, &mut transport, 5.0);
        let Frame::Held(held) = art.frame(&transport) else {
            panic!("expected a held frame while paused");
        };
        assert_eq!(held.snapshot, before.snapshot);
    }

    #[test]
    fn cues_for_other_targets_are_ignored() {
        let mut art = artwork(small_config(), "target");
        let cue = Cue {
            number: 2,
            target: CueTarget(9),
            tick: 0,
            time: 0.0,
            duration_ticks: 100,
        };
        assert!(art.on_cue(&cue, 0.0).is_none());
        assert_eq!(art.snapshot().scene_index, 0);
    }

    #[test]
    fn finished_frames_stay_live_and_resume_resets_clock() {
        let mut art = artwork(small_config(), "finish");
        let mut transport = VirtualTransport::new(1.0);
        let notes = quarter_notes(3, 15360, 0.3);
        art.score_ready(&mut transport, &notes);
        let catalog = art.catalog().clone();
        art.toggle_playback(&mut transport);
        pump(&mut art, &mut transport, 2.0);
        assert_eq!(art.phase(&transport), PlaybackPhase::Finished);
        assert!(matches!(art.frame(&transport), Frame::Live(_)));
        assert_eq!(art.snapshot().scene_index, 2);

        let notices = art.toggle_playback(&mut transport);
        assert_eq!(notices[0], PlaybackNotice::ResetRequested);
        assert_eq!(art.snapshot().act, Act::Pairs);
        assert_eq!(art.snapshot().scene_index, 0);
        assert_eq!(art.catalog(), &catalog);

        // The replay walks the same scenes again.
        let replay = pump(&mut art, &mut transport, 2.0);
        let indices: Vec<usize> = replay.iter().map(|t| t.scene_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn pause_near_end_resumes_without_reset() {
        let mut art = artwork(small_config(), "near-end");
        let mut transport = VirtualTransport::new(10.75);
        art.score_ready(&mut transport, &quarter_notes(30, 15360, 0.3));
        art.toggle_playback(&mut transport);
        for _ in 0..41 {
            pump(&mut art, &mut transport, 0.25);
        }
        assert_eq!(transport.current_time(), 10.25);
        let before = art.snapshot();

        art.toggle_playback(&mut transport);
        let notices = art.toggle_playback(&mut transport);
        assert!(!notices.contains(&PlaybackNotice::ResetRequested));
        assert_eq!(transport.current_time(), 10.25);
        assert_eq!(art.snapshot(), before);
    }

    #[test]
    fn reseed_while_playing_opens_on_first_scene() {
        let mut art = artwork(small_config(), "before");
        let mut transport = VirtualTransport::new(10.0);
        let notes = quarter_notes(6, 15360, 0.3);
        art.score_ready(&mut transport, &notes);
        art.toggle_playback(&mut transport);
        // Cues 1..=4 fire (0.0 .. 0.9 s).
        pump(&mut art, &mut transport, 1.0);

        art.reseed(Seed::from_token("after"), &mut transport, &notes);
        let resumed = pump(&mut art, &mut transport, 1.0);
        let steps: Vec<(u32, usize)> = resumed
            .iter()
            .map(|t| (t.cue_number, t.scene_index))
            .collect();
        assert_eq!(steps, vec![(1, 0), (2, 1)]);
    }

    #[test]
    fn reseed_rebuilds_catalog_and_schedule() {
        let mut art = artwork(small_config(), "before");
        let mut transport = VirtualTransport::new(10.0);
        let notes = quarter_notes(6, 15360, 0.3);
        art.score_ready(&mut transport, &notes);
        art.toggle_playback(&mut transport);
        pump(&mut art, &mut transport, 1.0);
        let old = art.catalog().clone();

        art.reseed(Seed::from_token("after"), &mut transport, &notes);
        assert_ne!(art.catalog(), &old);
        assert_eq!(art.seed().token(), "after");
        assert_eq!(art.snapshot().scene_index, 0);
        // Cues behind the playhead wait for the next playthrough.
        assert_eq!(art.cues().len(), 6);
        assert_eq!(transport.pending_cues(), 2);

        let fresh = artwork(small_config(), "after");
        assert_eq!(art.catalog(), fresh.catalog());
    }

    #[test]
    fn periodic_mode_regenerates_and_ignores_cues() {
        let config = ArtConfig {
            drive: DriveMode::Periodic {
                interval_ms: 500.0,
            },
            ..small_config()
        };
        let mut art = artwork(config, "periodic");
        let mut transport = VirtualTransport::new(3.0);
        art.score_ready(&mut transport, &quarter_notes(8, 15360, 0.3));
        art.toggle_playback(&mut transport);

        let first = art.catalog().clone();
        let mut catalogs = vec![first.clone()];
        // Steps of 1/8 s keep transport time exact.
        for _ in 0..16 {
            assert!(pump(&mut art, &mut transport, 0.125).is_empty());
            art.frame(&transport);
            if art.catalog() != catalogs.last().unwrap() {
                catalogs.push(art.catalog().clone());
                assert_eq!(art.snapshot().act, Act::Pairs);
                assert_eq!(art.snapshot().progress, 0.0);
            }
        }
        // 2 s of playback at a 500 ms interval.
        assert_eq!(art.generation(), 5);
        assert_eq!(catalogs.len(), 5);
        assert_ne!(catalogs[1], first);
    }

    #[test]
    fn current_scene_tracks_clock() {
        let mut art = artwork(small_config(), "scene");
        let expected = art.catalog().scenes(Act::Pairs)[0];
        assert_eq!(art.current_scene(), &expected);
        let cue = Cue {
            number: 2,
            target: CueTarget(0),
            tick: 0,
            time: 0.0,
            duration_ticks: 15360,
        };
        art.on_cue(&cue, 0.0);
        assert_eq!(art.current_scene(), &art.catalog().scenes(Act::Pairs)[1]);
    }
}
