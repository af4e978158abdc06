//! Input adapters: telemetry distribution and the generic models bridging
//! outside data into the simulation.

pub mod aircraft_state_input;
pub mod cache_input;
pub mod conditions;
pub mod polling_condition_input;
pub mod telemetry;

pub use aircraft_state_input::AircraftStateInput;
pub use cache_input::CacheInput;
pub use conditions::{CountdownCondition, LandingAchieved, PilotTakeover};
pub use polling_condition_input::{Condition, PollingConditionInput, PollingError};
pub use telemetry::{TelemetryError, TelemetryFeed, TelemetryHub};
