//! Reinforcement-learning surface over the `hearts-core` engine: reward
//! shaping, a step environment, baseline policies and batch simulation.

pub mod config;
pub mod env;
pub mod logging;
pub mod observation;
pub mod policy;
pub mod reward;
pub mod simulation;
pub mod stats;

pub use config::{ConfigError, EnvConfig, LoggingConfig};
pub use env::{HeartsEnv, Step, StepInfo};
pub use observation::Observation;
pub use policy::{Policy, PolicyKind, RandomPolicy, RuleBasedPolicy};
pub use reward::{Reward, RewardBreakdown, RewardShaper, RewardTerm};
pub use simulation::{SimulationError, SimulationReport, simulate};
pub use stats::GameStats;
