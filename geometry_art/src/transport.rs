// Audio transport seam and a deterministic in-memory implementation.
//
// The real transport (audio decoding, output, the scheduling primitive) is
// an external collaborator; the core only talks to it through `Transport`.
// Cue callbacks and end-of-stream are not stored closures: the host polls
// its transport and forwards `TransportEvent`s to the artwork, which keeps
// both callback sources on one thread and strictly serialized.
//
// `VirtualTransport` is a manually clocked transport used by the player and
// by tests. Its cue queue is a min-heap keyed by `(time, sequence)`, so cues
// fire in non-decreasing time order and, for equal times, in registration
// order. Each registered cue fires at most once per playthrough; pausing
// suspends firing but never drops a cue.

use crate::cue::Cue;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Playback primitives the core needs from an audio transport.
pub trait Transport {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
    /// Playback position in seconds.
    fn current_time(&self) -> f64;
    /// Length of the loaded audio in seconds.
    fn buffer_duration(&self) -> f64;
    /// Register `cue` to fire when playback crosses `time` seconds.
    fn add_cue(&mut self, time: f64, cue: Cue);
    /// Drop every registered cue.
    fn clear_cues(&mut self);
}

/// Something the transport reports back to the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransportEvent {
    /// Playback crossed a cue. `at` is the transport time of the crossing.
    Cue { cue: Cue, at: f64 },
    /// Playback reached the end of the buffer and stopped.
    Ended,
}

#[derive(Clone, Copy, Debug)]
struct ScheduledCue {
    time: f64,
    sequence: u64,
    cue: Cue,
}

// Min-heap on (time, sequence): BinaryHeap is a max-heap, so compare
// reversed.
impl PartialEq for ScheduledCue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledCue {}

impl PartialOrd for ScheduledCue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledCue {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// Deterministic transport advanced by explicit time steps.
#[derive(Clone, Debug)]
pub struct VirtualTransport {
    duration: f64,
    time: f64,
    playing: bool,
    ended: bool,
    /// Every registered cue, kept so a replay after the end can re-arm them.
    registered: Vec<ScheduledCue>,
    /// Cues still to fire in the current playthrough.
    pending: BinaryHeap<ScheduledCue>,
    next_sequence: u64,
}

impl VirtualTransport {
    /// A stopped transport at time 0 holding `duration` seconds of audio.
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            time: 0.0,
            playing: false,
            ended: false,
            registered: Vec::new(),
            pending: BinaryHeap::new(),
            next_sequence: 0,
        }
    }

    /// Move playback forward by `dt` seconds, returning every cue crossed
    /// (in firing order) and `Ended` if the buffer ran out. Does nothing
    /// while paused.
    pub fn advance(&mut self, dt: f64) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        if !self.playing || dt < 0.0 {
            return events;
        }

        let target = (self.time + dt).min(self.duration);
        while self.pending.peek().is_some_and(|c| c.time <= target) {
            if let Some(scheduled) = self.pending.pop() {
                events.push(TransportEvent::Cue {
                    cue: scheduled.cue,
                    at: scheduled.time.max(self.time),
                });
            }
        }
        self.time = target;

        if self.time >= self.duration {
            self.playing = false;
            self.ended = true;
            events.push(TransportEvent::Ended);
        }
        events
    }

    /// Cues that have not fired yet in this playthrough.
    pub fn pending_cues(&self) -> usize {
        self.pending.len()
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    fn rewind(&mut self) {
        self.time = 0.0;
        self.ended = false;
        self.pending = self.registered.iter().copied().collect();
    }
}

impl Transport for VirtualTransport {
    /// Resume; after the end of the buffer this restarts from 0 with every
    /// cue re-armed.
    fn play(&mut self) {
        if self.ended {
            self.rewind();
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn buffer_duration(&self) -> f64 {
        self.duration
    }

    fn add_cue(&mut self, time: f64, cue: Cue) {
        let scheduled = ScheduledCue {
            time,
            sequence: self.next_sequence,
            cue,
        };
        self.next_sequence += 1;
        self.registered.push(scheduled);
        // A cue behind the playhead waits for the next playthrough.
        if time >= self.time {
            self.pending.push(scheduled);
        }
    }

    fn clear_cues(&mut self) {
        self.registered.clear();
        self.pending.clear();
    }
}
