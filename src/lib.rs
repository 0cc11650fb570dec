// Library surface for the binary and for headless/integration tests.
pub mod classifier;
pub mod config;
pub mod error;
pub mod game;
pub mod runtime;
pub mod schedule;
pub mod score;
pub mod session;
pub mod stimulus;
pub mod timer;

pub use config::{Config, GameSettings};
pub use error::{ConfigError, GameError, RunError};
pub use game::{Game, Phase, Presenter};
pub use score::ResultSummary;
pub use stimulus::{StimulusIdentity, Variant};
