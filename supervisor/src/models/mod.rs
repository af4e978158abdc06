//! Flight logic atomic models.

pub mod command_reposition;
pub mod handle_waypoint;
pub mod handover_control;
pub mod landing_routine;
pub mod lp_manager;
pub mod mission_initialization;
pub mod reposition_timer;
pub mod stabilize;

pub use command_reposition::CommandReposition;
pub use handle_waypoint::HandleWaypoint;
pub use handover_control::HandoverControl;
pub use landing_routine::LandingRoutine;
pub use lp_manager::LpManager;
pub use mission_initialization::MissionInitialization;
pub use reposition_timer::RepositionTimer;
pub use stabilize::Stabilize;
