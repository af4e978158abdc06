use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// MAVLink style message severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    #[default]
    Info = 6,
    Debug = 7,
}

/// Text shown to the operator at the ground control station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcsUpdate {
    pub text: String,
    pub severity: Severity,
}

impl GcsUpdate {
    pub fn new(text: impl Into<String>, severity: Severity) -> Self {
        GcsUpdate {
            text: text.into(),
            severity,
        }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        GcsUpdate::new(text, Severity::Alert)
    }

    pub fn info(text: impl Into<String>) -> Self {
        GcsUpdate::new(text, Severity::Info)
    }
}

/// Mission display update for the on-board display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BossMissionUpdate {
    pub lp_no: i32,
    pub lp_lat: f64,
    pub lp_lon: f64,
    pub mission_no: i32,
    pub mission_item_no: i32,
    pub is_mission_started: bool,
    pub is_landing_leg: bool,
    pub lat: f64,
    pub lon: f64,
    /// Meters
    pub alt: f64,
    pub yaw: f64,
    /// Knots
    pub speed: f64,
    pub horz_accept_radius_m: f64,
    pub vert_accept_radius_m: f64,
    pub description: String,
}

impl BossMissionUpdate {
    /// Update about a landing point on the landing leg.
    #[allow(clippy::too_many_arguments)]
    pub fn landing_point(
        lp_no: i32,
        lp_lat: f64,
        lp_lon: f64,
        mission_no: i32,
        mission_item_no: i32,
        alt: f64,
        yaw: f64,
        speed: f64,
        description: &str,
    ) -> Self {
        BossMissionUpdate {
            lp_no,
            lp_lat,
            lp_lon,
            mission_no,
            mission_item_no,
            is_mission_started: true,
            is_landing_leg: true,
            alt,
            yaw,
            speed,
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Update about a mission waypoint with acceptance radii.
    #[allow(clippy::too_many_arguments)]
    pub fn waypoint(
        mission_no: i32,
        mission_item_no: i32,
        lat: f64,
        lon: f64,
        alt: f64,
        yaw: f64,
        speed: f64,
        horz_accept_radius_m: f64,
        vert_accept_radius_m: f64,
        description: &str,
    ) -> Self {
        BossMissionUpdate {
            mission_no,
            mission_item_no,
            is_mission_started: true,
            lat,
            lon,
            alt,
            yaw,
            speed,
            horz_accept_radius_m,
            vert_accept_radius_m,
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Status only update, used when no specific point is tracked.
    pub fn mission_status(mission_no: i32, alt: f64, description: &str) -> Self {
        BossMissionUpdate {
            mission_no,
            is_mission_started: true,
            alt,
            description: description.to_string(),
            ..Default::default()
        }
    }
}
