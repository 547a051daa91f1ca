use std::path::PathBuf;

/// Why a score could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed MIDI file: {0}")]
    Midi(#[from] midly::Error),

    #[error("SMPTE timecode timing is not supported; expected ticks per quarter note")]
    UnsupportedTiming,

    #[error("track {index} requested but the file has {count} tracks")]
    TrackOutOfRange { index: usize, count: usize },

    #[error("score loader stopped without delivering a result")]
    LoaderDisconnected,
}
