pub mod agent;
pub mod config;
pub mod flock;
pub mod nn;
pub mod params;
pub mod pipe;

pub use agent::{Bird, Pilot, SensorReading};
pub use config::{ConfigError, GameConfig};
pub use flock::{Flock, FlockError, FlockStats, StepReport};
pub use nn::DecisionNetwork;
pub use params::{NetworkParams, ParamsError};
pub use pipe::Pipe;
