// Background score loading.
//
// `ScoreLoader` runs a load on its own thread and hands the single result
// back over an `mpsc` channel. The host polls it once per frame (or blocks
// with `wait`); the first `Some` from `poll` is the ready notification.
// Nothing else is shared with the loading thread, so the artwork never
// sees a half-loaded score.

use crate::error::ScoreError;
use crate::midi::{Score, parse_score, read_score};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

pub type LoadResult = Result<Score, ScoreError>;

pub struct ScoreLoader {
    inbox: Receiver<LoadResult>,
    _thread: Option<JoinHandle<()>>,
    delivered: bool,
}

impl ScoreLoader {
    /// Run `load` on a background thread.
    pub fn spawn<F>(load: F) -> Self
    where
        F: FnOnce() -> LoadResult + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let thread = thread::spawn(move || {
            // The receiver may already be gone; nothing to report then.
            let _ = tx.send(load());
        });
        Self {
            inbox: rx,
            _thread: Some(thread),
            delivered: false,
        }
    }

    /// Load and parse a MIDI file in the background.
    pub fn from_file(path: impl Into<PathBuf>, track: Option<usize>) -> Self {
        let path = path.into();
        tracing::debug!(path = %path.display(), "loading score in background");
        Self::spawn(move || read_score(&path, track))
    }

    /// Parse MIDI bytes already in memory, in the background.
    pub fn from_bytes(bytes: Vec<u8>, track: Option<usize>) -> Self {
        Self::spawn(move || parse_score(&bytes, track))
    }

    /// Non-blocking check. Returns the result exactly once; `None` before
    /// it is available and after it has been taken.
    pub fn poll(&mut self) -> Option<LoadResult> {
        if self.delivered {
            return None;
        }
        let result = match self.inbox.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ScoreError::LoaderDisconnected),
        };
        self.delivered = true;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "score load failed");
        }
        Some(result)
    }

    /// Block until the load finishes.
    pub fn wait(mut self) -> LoadResult {
        if self.delivered {
            return Err(ScoreError::LoaderDisconnected);
        }
        self.delivered = true;
        self.inbox.recv().unwrap_or(Err(ScoreError::LoaderDisconnected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn empty_score() -> Score {
        Score {
            ppq: 480,
            track_count: 0,
            initial_bpm: 120.0,
            duration_secs: 0.0,
            notes: Vec::new(),
        }
    }

    fn poll_until_ready(loader: &mut ScoreLoader) -> LoadResult {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = loader.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "loader never became ready");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn poll_delivers_once() {
        let mut loader = ScoreLoader::spawn(|| Ok(empty_score()));
        let result = poll_until_ready(&mut loader);
        assert_eq!(result.unwrap(), empty_score());
        assert!(loader.poll().is_none());
    }

    #[test]
    fn wait_blocks_for_the_result() {
        let loader = ScoreLoader::spawn(|| {
            thread::sleep(Duration::from_millis(20));
            Ok(empty_score())
        });
        assert_eq!(loader.wait().unwrap().ppq, 480);
    }

    #[test]
    fn errors_come_through_the_channel() {
        let loader = ScoreLoader::from_bytes(b"nope".to_vec(), None);
        assert!(matches!(loader.wait(), Err(ScoreError::Midi(_))));

        let mut loader = ScoreLoader::from_file("/nonexistent/score.mid", None);
        assert!(matches!(
            poll_until_ready(&mut loader),
            Err(ScoreError::Io { .. })
        ));
    }

    #[test]
    fn panicking_load_reports_disconnect() {
        let loader = ScoreLoader::spawn(|| panic!("loader blew up"));
        assert!(matches!(loader.wait(), Err(ScoreError::LoaderDisconnected)));
    }
}
