// Core of GeometryNo1: a seeded sacred-geometry artwork whose scene changes
// land on the beats of a score.
//
// The crate is pure logic with no I/O and no rendering. A host supplies a
// seed, a timed note stream, an audio transport and frame ticks; in return it
// gets, every frame, which scene to show and how far its transition has run.
//
// Module overview (leaf-first):
// - `seed.rs`:      Seed sources: platform identity hash or self-minted token.
// - `harmony.rs`:   Six-hue split-complementary harmony from one base hue.
// - `catalog.rs`:   Pattern, shape, backdrop and blend-mode catalogs.
// - `scene.rs`:     Per-act scene types and seeded catalog generation.
// - `config.rs`:    `ArtConfig` (JSON-loadable) and the validated `Tempo`.
// - `error.rs`:     `ConfigError` and `ArtError`.
// - `cue.rs`:       Note stream to numbered cues, registered on a transport.
// - `transport.rs`: `Transport` seam and the deterministic `VirtualTransport`.
// - `clock.rs`:     `AnimationClock`: act/scene state and transition progress.
// - `playback.rs`:  `PlaybackController`: play/pause gating and end handling.
// - `layout.rs`:    Scene + progress + viewport to positioned cell draws.
// - `render.rs`:    `Painter` trait and the pattern dispatch table.
// - `artwork.rs`:   `Artwork`, the single owner of a performance.
//
// **Critical constraint: determinism.** All randomness after seeding comes
// from `geometry_prng::ArtRng`, consumed in a fixed order (see `scene.rs`
// and `artwork.rs`). Self-generated seed tokens are the only use of OS
// entropy.

pub mod artwork;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod cue;
pub mod error;
pub mod harmony;
pub mod layout;
pub mod playback;
pub mod render;
pub mod scene;
pub mod seed;
pub mod transport;

pub use geometry_prng as prng;
