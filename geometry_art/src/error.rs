// Error types for the artwork core.
//
// Only configuration problems are recoverable errors here. Everything else
// that can go wrong at runtime is either not an error at all (an empty note
// stream, a missing seed source) or a broken precondition that panics (see
// `clock.rs`).

/// A configuration value that cannot drive a performance.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("ticks per quarter note must be positive")]
    ZeroPpq,

    #[error("tempo must be a positive, finite BPM (got {0})")]
    InvalidBpm(f64),

    #[error("scenes_per_act must be at least 1")]
    NoScenes,

    #[error("act_sequence must name at least one act")]
    EmptyActSequence,

    #[error("default transition duration must be a positive, finite number of ms (got {0})")]
    InvalidTransitionDuration(f64),

    #[error("periodic drive interval must be a positive, finite number of ms (got {0})")]
    InvalidInterval(f64),

    #[error("blend_modes must list at least one blend mode")]
    NoBlendModes,
}

/// Top-level error for building an artwork from external input.
#[derive(Debug, thiserror::Error)]
pub enum ArtError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}
