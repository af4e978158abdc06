use serde::{Deserialize, Serialize};

/// Operator request to start (or resume) the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartSupervisor {
    pub autonomy_armed: bool,
    pub mission_started: bool,
    pub mission_number: i32,
}
