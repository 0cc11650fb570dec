use thiserror::Error;

/// Errors raised while building or driving a game session
#[derive(Debug, Error)]
pub enum GameError {
    #[error("unknown game type: {0}")]
    UnknownVariant(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("session already started")]
    AlreadyStarted,

    /// An internal state machine invariant was broken; the session cannot continue.
    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),
}

/// Errors found while validating configured settings
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("round schedule is empty")]
    EmptySchedule,

    #[error("round {0} has no items")]
    EmptyRound(usize),

    #[error("bad frequency {0} is outside 0..=1")]
    BadFrequency(f64),

    #[error("visible time {visible_ms}ms must be shorter than round {round} delay {delay_ms}ms")]
    VisibleNotShorterThanDelay {
        visible_ms: u64,
        delay_ms: u64,
        round: usize,
    },
}

/// Errors surfaced by the runtime loop
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
