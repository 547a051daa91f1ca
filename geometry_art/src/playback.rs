// Play/pause toggle over the transport.
//
// The controller gates everything on the score being ready: until
// `score_ready` is called, clicks do nothing. After that a click pauses a
// playing transport or resumes a stopped one. Resuming once the transport
// has reached the end of its buffer first asks for a reset
// (`PlaybackNotice::ResetRequested`); the artwork decides what resetting
// means.
//
// Cursor and prompt changes belong to the UI, so the controller only emits
// notices describing them.

use crate::transport::Transport;
use serde::{Deserialize, Serialize};

/// UI-facing notifications emitted by the controller, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackNotice {
    /// Score loaded; show the play prompt.
    Ready,
    /// The cursor should invite playing (transport paused or ended).
    CursorPlay,
    /// The cursor should invite pausing (transport playing).
    CursorPause,
    /// The play prompt should disappear.
    HidePlayPrompt,
    /// Playback is about to restart after the end; reset visuals first.
    ResetRequested,
}

/// Where a performance is, from the viewer's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// Score still loading (or failed); clicks are ignored.
    Loading,
    /// Loaded, never played: the static frame is showing.
    Static,
    Playing,
    Paused,
    /// The transport ran to the end. Frames keep animating the last
    /// transition until the next click.
    Finished,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackController {
    loaded: bool,
    showing_static: bool,
    finished: bool,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self {
            loaded: false,
            showing_static: true,
            finished: false,
        }
    }
}

impl PlaybackController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score_ready(&mut self) -> Vec<PlaybackNotice> {
        self.loaded = true;
        vec![PlaybackNotice::Ready]
    }

    pub fn phase(&self, transport: &impl Transport) -> PlaybackPhase {
        if !self.loaded {
            PlaybackPhase::Loading
        } else if self.showing_static {
            PlaybackPhase::Static
        } else if transport.is_playing() {
            PlaybackPhase::Playing
        } else if self.finished {
            PlaybackPhase::Finished
        } else {
            PlaybackPhase::Paused
        }
    }

    /// Handle a click/tap.
    pub fn toggle(&mut self, transport: &mut impl Transport) -> Vec<PlaybackNotice> {
        if !self.loaded {
            return Vec::new();
        }

        if transport.is_playing() {
            transport.pause();
            return vec![PlaybackNotice::CursorPlay];
        }

        let mut notices = Vec::new();
        // Only a reported end-of-stream resets; a pause near the end of the
        // buffer resumes in place.
        if self.finished {
            notices.push(PlaybackNotice::ResetRequested);
            self.finished = false;
        }
        notices.push(PlaybackNotice::HidePlayPrompt);
        transport.play();
        self.showing_static = false;
        notices.push(PlaybackNotice::CursorPause);
        notices
    }

    /// The transport reported end-of-stream.
    pub fn transport_ended(&mut self) -> Vec<PlaybackNotice> {
        self.finished = true;
        vec![PlaybackNotice::CursorPlay]
    }
}
