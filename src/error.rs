use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the ball engine and its configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// Rectangle with an empty or inverted extent, or a non-finite edge.
    #[error("invalid bounds: x [{min_x}, {max_x}], y [{min_y}, {max_y}]")]
    InvalidBounds {
        min_x: f32,
        max_x: f32,
        min_y: f32,
        max_y: f32,
    },

    /// Ball radius must be finite and > 0.
    #[error("invalid radius: {0}")]
    InvalidRadius(f32),

    /// Requested ball count exceeds what a single reset may create.
    #[error("invalid ball count: {requested} (max {max})")]
    InvalidCount { requested: usize, max: usize },

    /// Any other rejected parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// Regions only exist after the first `reset`.
    #[error("engine not initialized: call reset before use")]
    NotInitialized,

    /// `update` was handed a timestamp older than the regions' time base.
    #[error("time went backwards: now={now}ms, last={last}ms")]
    TimeReversed { now: u64, last: u64 },

    /// Malformed settings document.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
