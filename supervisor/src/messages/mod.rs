//! Plain value records exchanged between models.

pub mod aircraft;
pub mod fcc;
pub mod ground;
pub mod landing;
pub mod mission;

pub use aircraft::{AircraftState, AircraftTelemetry};
pub use fcc::{ControlMode, FccCommand, MavCommand, OrbitYawBehaviour};
pub use ground::{BossMissionUpdate, GcsUpdate, Severity};
pub use landing::{HoverCriteria, LandingPoint};
pub use mission::StartSupervisor;
