// Standard MIDI File to note stream.
//
// Reads an SMF with `midly` and produces one `NoteEvent` per sounded note:
// start tick, start time in seconds, and length in ticks. Notes come out
// sorted by start tick; notes starting on the same tick keep file order
// (track, then position in track), which is what cue deduplication expects.
//
// Timing: only metrical files (ticks per quarter note) are supported. Start
// times follow the file's tempo map, built from `Tempo` meta events on every
// track, with 120 BPM before the first one. A note is opened by note-on with
// non-zero velocity and closed by the next note-off (or velocity-0 note-on)
// for the same channel and key; overlapping notes on one key close in the
// order they opened. Notes still open at the end of their track close there.
//
// Track selection restricts notes to one track, but the tempo map always
// comes from the whole file (format-1 files keep tempo on track 0).

use crate::error::ScoreError;
use geometry_art::cue::NoteEvent;
use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;

/// Microseconds per quarter note before any tempo event (120 BPM).
pub const DEFAULT_TEMPO_USPQ: u32 = 500_000;

/// A parsed score, ready for cue scheduling.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Ticks per quarter note from the file header.
    pub ppq: u16,
    pub track_count: usize,
    /// Tempo at tick 0, in BPM.
    pub initial_bpm: f64,
    /// Time of the last note end or track end, in seconds.
    pub duration_secs: f64,
    pub notes: Vec<NoteEvent>,
}

/// Read and parse a MIDI file. `track` selects a single track's notes.
pub fn read_score(path: &Path, track: Option<usize>) -> Result<Score, ScoreError> {
    let bytes = std::fs::read(path).map_err(|source| ScoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let score = parse_score(&bytes, track)?;
    tracing::info!(
        path = %path.display(),
        notes = score.notes.len(),
        duration_secs = score.duration_secs,
        "score loaded"
    );
    Ok(score)
}

/// Parse an in-memory SMF. `track` selects a single track's notes.
pub fn parse_score(bytes: &[u8], track: Option<usize>) -> Result<Score, ScoreError> {
    let smf = Smf::parse(bytes)?;
    let ppq = match smf.header.timing {
        Timing::Metrical(ppq) => ppq.as_int(),
        Timing::Timecode(..) => return Err(ScoreError::UnsupportedTiming),
    };
    let track_count = smf.tracks.len();
    if let Some(index) = track {
        if index >= track_count {
            return Err(ScoreError::TrackOutOfRange {
                index,
                count: track_count,
            });
        }
    }

    let tempo = TempoMap::from_tracks(ppq, &smf.tracks);

    let mut spans = Vec::new();
    let mut last_tick = 0u64;
    for (index, events) in smf.tracks.iter().enumerate() {
        let wanted = track.is_none_or(|t| t == index);
        let end = if wanted {
            collect_spans(events, &mut spans)
        } else {
            track_end(events)
        };
        last_tick = last_tick.max(end);
    }
    // Stable: same-tick notes keep track/file order.
    spans.sort_by_key(|s: &NoteSpan| s.start);

    let notes: Vec<NoteEvent> = spans
        .iter()
        .map(|s| NoteEvent {
            tick: s.start,
            time: tempo.secs_at(s.start),
            duration_ticks: s.end - s.start,
        })
        .collect();

    Ok(Score {
        ppq,
        track_count,
        initial_bpm: tempo.initial_bpm(),
        duration_secs: tempo.secs_at(last_tick),
        notes,
    })
}

#[derive(Clone, Copy, Debug)]
struct NoteSpan {
    start: u64,
    end: u64,
}

/// Pair note-ons with note-offs. Returns the track's final tick.
fn collect_spans(events: &[TrackEvent], spans: &mut Vec<NoteSpan>) -> u64 {
    // (channel, key) -> indices into `spans` of notes still sounding.
    let mut open: BTreeMap<(u8, u8), VecDeque<usize>> = BTreeMap::new();
    let mut tick = 0u64;

    for event in events {
        tick += u64::from(event.delta.as_int());
        let TrackEventKind::Midi { channel, message } = event.kind else {
            continue;
        };
        let (key, starts) = match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => (key, true),
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => (key, false),
            _ => continue,
        };
        let slot = (channel.as_int(), key.as_int());
        if starts {
            open.entry(slot).or_default().push_back(spans.len());
            spans.push(NoteSpan {
                start: tick,
                end: tick,
            });
        } else if let Some(i) = open.get_mut(&slot).and_then(VecDeque::pop_front) {
            spans[i].end = tick;
        }
    }

    for i in open.into_values().flatten() {
        spans[i].end = tick;
    }
    tick
}

fn track_end(events: &[TrackEvent]) -> u64 {
    events.iter().map(|e| u64::from(e.delta.as_int())).sum()
}

// ---------------------------------------------------------------------------
// Tempo map
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
struct TempoSegment {
    tick: u64,
    /// Seconds elapsed at `tick`.
    secs: f64,
    uspq: u32,
}

/// Piecewise-constant tempo over ticks.
#[derive(Clone, Debug)]
struct TempoMap {
    ppq: f64,
    segments: Vec<TempoSegment>,
}

impl TempoMap {
    fn from_tracks(ppq: u16, tracks: &[Vec<TrackEvent>]) -> Self {
        let mut changes: Vec<(u64, u32)> = Vec::new();
        for events in tracks {
            let mut tick = 0u64;
            for event in events {
                tick += u64::from(event.delta.as_int());
                if let TrackEventKind::Meta(MetaMessage::Tempo(uspq)) = event.kind {
                    changes.push((tick, uspq.as_int()));
                }
            }
        }
        changes.sort_by_key(|&(tick, _)| tick);

        let ppq = f64::from(ppq.max(1));
        let mut segments = vec![TempoSegment {
            tick: 0,
            secs: 0.0,
            uspq: DEFAULT_TEMPO_USPQ,
        }];
        for (tick, uspq) in changes {
            let secs = Self::advance(segments[segments.len() - 1], tick, ppq);
            let last = segments.len() - 1;
            // Several changes on one tick: the last one wins.
            if segments[last].tick == tick {
                segments[last].uspq = uspq;
            } else {
                segments.push(TempoSegment { tick, secs, uspq });
            }
        }
        Self { ppq, segments }
    }

    fn advance(from: TempoSegment, tick: u64, ppq: f64) -> f64 {
        from.secs + (tick - from.tick) as f64 * f64::from(from.uspq) / (ppq * 1_000_000.0)
    }

    fn secs_at(&self, tick: u64) -> f64 {
        let i = self.segments.partition_point(|s| s.tick <= tick);
        // Segment 0 sits at tick 0, so `i >= 1`.
        Self::advance(self.segments[i.saturating_sub(1)], tick, self.ppq)
    }

    fn initial_bpm(&self) -> f64 {
        60_000_000.0 / f64::from(self.segments[0].uspq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midly::num::{u4, u7, u15, u24, u28};
    use midly::{Format, Fps, Header, Track};

    fn event(delta: u32, kind: TrackEventKind<'static>) -> TrackEvent<'static> {
        TrackEvent {
            delta: u28::new(delta),
            kind,
        }
    }

    fn on(delta: u32, key: u8) -> TrackEvent<'static> {
        on_vel(delta, key, 80)
    }

    fn on_vel(delta: u32, key: u8, vel: u8) -> TrackEvent<'static> {
        event(
            delta,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(key),
                    vel: u7::new(vel),
                },
            },
        )
    }

    fn off(delta: u32, key: u8) -> TrackEvent<'static> {
        event(
            delta,
            TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(key),
                    vel: u7::new(0),
                },
            },
        )
    }

    fn tempo(delta: u32, uspq: u32) -> TrackEvent<'static> {
        event(delta, TrackEventKind::Meta(MetaMessage::Tempo(u24::new(uspq))))
    }

    fn end() -> TrackEvent<'static> {
        event(0, TrackEventKind::Meta(MetaMessage::EndOfTrack))
    }

    fn smf_bytes(timing: Timing, tracks: Vec<Track<'static>>) -> Vec<u8> {
        let mut smf = Smf::new(Header::new(Format::Parallel, timing));
        smf.tracks = tracks;
        let mut buf = Vec::new();
        smf.write(&mut buf).unwrap();
        buf
    }

    fn metrical(tracks: Vec<Track<'static>>) -> Vec<u8> {
        smf_bytes(Timing::Metrical(u15::new(480)), tracks)
    }

    fn quarter_notes(count: u32) -> Track<'static> {
        let mut track = Vec::new();
        for _ in 0..count {
            track.push(on(0, 60));
            track.push(off(480, 60));
        }
        track.push(end());
        track
    }

    #[test]
    fn quarter_notes_at_default_tempo() {
        let score = parse_score(&metrical(vec![quarter_notes(3)]), None).unwrap();
        assert_eq!(score.ppq, 480);
        assert_eq!(score.initial_bpm, 120.0);
        let ticks: Vec<u64> = score.notes.iter().map(|n| n.tick).collect();
        let times: Vec<f64> = score.notes.iter().map(|n| n.time).collect();
        assert_eq!(ticks, vec![0, 480, 960]);
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert!(score.notes.iter().all(|n| n.duration_ticks == 480));
        assert_eq!(score.duration_secs, 1.5);
    }

    #[test]
    fn tempo_changes_shift_later_notes() {
        let tempo_track = vec![tempo(0, 500_000), tempo(960, 250_000), end()];
        let score = parse_score(&metrical(vec![tempo_track, quarter_notes(4)]), None).unwrap();
        let times: Vec<f64> = score.notes.iter().map(|n| n.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0, 1.25]);
    }

    #[test]
    fn zero_velocity_note_on_ends_a_note() {
        let track = vec![on(0, 64), on_vel(240, 64, 0), end()];
        let score = parse_score(&metrical(vec![track]), None).unwrap();
        assert_eq!(score.notes.len(), 1);
        assert_eq!(score.notes[0].duration_ticks, 240);
    }

    #[test]
    fn chords_share_a_tick_in_file_order() {
        let melody = vec![on(0, 60), on(0, 64), off(480, 60), off(0, 64), end()];
        let bass = vec![on(0, 36), off(960, 36), end()];
        let score = parse_score(&metrical(vec![melody, bass]), None).unwrap();
        assert_eq!(score.notes.len(), 3);
        assert!(score.notes.iter().all(|n| n.tick == 0));
        let lengths: Vec<u64> = score.notes.iter().map(|n| n.duration_ticks).collect();
        assert_eq!(lengths, vec![480, 480, 960]);
    }

    #[test]
    fn notes_are_sorted_across_tracks() {
        let late = vec![on(480, 60), off(480, 60), end()];
        let early = vec![on(0, 62), off(240, 62), end()];
        let score = parse_score(&metrical(vec![late, early]), None).unwrap();
        let ticks: Vec<u64> = score.notes.iter().map(|n| n.tick).collect();
        assert_eq!(ticks, vec![0, 480]);
    }

    #[test]
    fn track_selection_keeps_tempo_from_all_tracks() {
        let tempo_track = vec![tempo(0, 1_000_000), end()];
        let other = vec![on(0, 50), off(100, 50), end()];
        let bytes = metrical(vec![tempo_track, other, quarter_notes(2)]);
        let score = parse_score(&bytes, Some(2)).unwrap();
        assert_eq!(score.notes.len(), 2);
        assert_eq!(score.notes[1].time, 1.0);
        assert_eq!(score.initial_bpm, 60.0);
        assert_eq!(score.track_count, 3);
    }

    #[test]
    fn track_out_of_range_is_an_error() {
        let err = parse_score(&metrical(vec![quarter_notes(1)]), Some(4)).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::TrackOutOfRange { index: 4, count: 1 }
        ));
    }

    #[test]
    fn hanging_notes_close_at_track_end() {
        // The stray note-off for key 61 must not close key 60.
        let track = vec![
            on(0, 60),
            off(100, 61),
            event(380, TrackEventKind::Meta(MetaMessage::EndOfTrack)),
        ];
        let score = parse_score(&metrical(vec![track]), None).unwrap();
        assert_eq!(score.notes[0].duration_ticks, 480);
    }

    #[test]
    fn overlapping_notes_on_one_key_close_in_order() {
        let track = vec![on(0, 60), on(100, 60), off(100, 60), off(100, 60), end()];
        let score = parse_score(&metrical(vec![track]), None).unwrap();
        let lengths: Vec<u64> = score.notes.iter().map(|n| n.duration_ticks).collect();
        assert_eq!(lengths, vec![200, 200]);
    }

    #[test]
    fn timecode_files_are_rejected() {
        let bytes = smf_bytes(Timing::Timecode(Fps::Fps25, 40), vec![quarter_notes(1)]);
        assert!(matches!(
            parse_score(&bytes, None),
            Err(ScoreError::UnsupportedTiming)
        ));
    }

    #[test]
    fn garbage_is_a_midi_error() {
        assert!(matches!(
            parse_score(b"definitely not a midi file", None),
            Err(ScoreError::Midi(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_score(Path::new("/nonexistent/score.mid"), None).unwrap_err();
        assert!(matches!(err, ScoreError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/score.mid"));
    }

    #[test]
    fn empty_track_gives_empty_score() {
        let score = parse_score(&metrical(vec![vec![end()]]), None).unwrap();
        assert!(score.notes.is_empty());
        assert_eq!(score.duration_secs, 0.0);
    }
}
