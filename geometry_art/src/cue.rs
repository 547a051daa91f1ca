// Cue derivation from the score's note stream.
//
// The score loader hands us notes ordered by tick. Every note that starts on
// a new tick becomes a numbered cue; further notes on the same tick are
// dropped, collapsing chords into a single trigger. With `poly_mode` on,
// every note becomes a cue. Cue numbers start at 1 and count only the notes
// that were kept.
//
// Cues are registered with the transport, which owns firing. The transport
// guarantees non-decreasing fire times and at-most-once delivery; nothing
// here reorders or retracts cues. Invalidating a schedule means clearing the
// transport and scheduling again (see `Artwork::reseed`).
//
// See also: `transport.rs` for the `Transport` seam, `clock.rs` for what a
// fired cue does.

use crate::transport::Transport;
use serde::{Deserialize, Serialize};

/// A timed note as delivered by the score loader. Read-only to the core.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Start position in score ticks.
    pub tick: u64,
    /// Start position in seconds.
    pub time: f64,
    /// Length in score ticks.
    pub duration_ticks: u64,
}

/// Identifies which handler a cue is routed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CueTarget(pub u16);

/// A numbered trigger derived from a note. Immutable once assigned.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// 1-based position among the kept notes.
    pub number: u32,
    pub target: CueTarget,
    pub tick: u64,
    /// Fire time in seconds.
    pub time: f64,
    pub duration_ticks: u64,
}

/// Number the notes that become cues, in supplied order.
///
/// An empty stream gives no cues; a single note gives cue 1.
pub fn derive_cues(notes: &[NoteEvent], target: CueTarget, poly_mode: bool) -> Vec<Cue> {
    let mut cues = Vec::new();
    let mut last_tick: Option<u64> = None;
    let mut number = 1u32;

    for note in notes {
        if poly_mode || last_tick != Some(note.tick) {
            cues.push(Cue {
                number,
                target,
                tick: note.tick,
                time: note.time,
                duration_ticks: note.duration_ticks,
            });
            last_tick = Some(note.tick);
            number += 1;
        }
    }

    cues
}

/// Derive cues and register each one with the transport at its note time.
/// Returns the registered cues.
pub fn schedule_cues(
    transport: &mut impl Transport,
    notes: &[NoteEvent],
    target: CueTarget,
    poly_mode: bool,
) -> Vec<Cue> {
    let cues = derive_cues(notes, target, poly_mode);
    for cue in &cues {
        transport.add_cue(cue.time, *cue);
    }
    tracing::info!(
        notes = notes.len(),
        cues = cues.len(),
        target = target.0,
        poly_mode,
        "scheduled cues"
    );
    cues
}
