// Score loading for GeometryNo1.
//
// Turns a Standard MIDI File into the ordered `NoteEvent` stream the artwork
// schedules cues from, and runs that work off the main thread.
//
// - `midi.rs`:   SMF parsing with `midly`: tempo map, note pairing, track
//                selection.
// - `loader.rs`: `ScoreLoader`, a background load whose single result the
//                host polls for (the "ready" notification).
// - `error.rs`:  `ScoreError`.

pub mod error;
pub mod loader;
pub mod midi;

pub use error::ScoreError;
pub use loader::ScoreLoader;
pub use midi::{Score, parse_score, read_score};
