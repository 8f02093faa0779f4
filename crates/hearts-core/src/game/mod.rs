pub mod serialization;
pub mod state;

pub use state::{GameConfig, GameState, PlayOutcome, TrickResult};
