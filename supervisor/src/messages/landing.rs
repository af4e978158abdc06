use serde::{Deserialize, Serialize};

use crate::parameters::LandCriteria;

/// A candidate landing location.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandingPoint {
    pub id: i32,
    pub lat: f64,
    pub lon: f64,
    /// Feet MSL
    pub alt: f64,
    pub hdg: f64,
    pub mission_item_no: i32,
}

/// Tolerance envelope defining a stable hover over a point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HoverCriteria {
    pub desired_lat: f64,
    pub desired_lon: f64,
    /// Feet MSL
    pub desired_alt_msl: f64,
    /// True heading, NaN when any heading is acceptable
    pub desired_hdg_deg: f64,
    pub hor_dist_tol_ft: f64,
    pub vert_dist_tol_ft: f64,
    pub vel_tol_kts: f64,
    pub hdg_tol_deg: f64,
    /// Seconds the aircraft must stay within tolerance
    pub time_tol: f64,
    pub time_crit_first_met: f64,
    pub hover_completed: f64,
    pub man_ctrl_required_after_crit_met: i32,
}

impl HoverCriteria {
    /// Hover at (`lat`, `lon`, `alt_msl`) with the default landing tolerances.
    pub fn new(
        lat: f64,
        lon: f64,
        alt_msl: f64,
        hdg_deg: f64,
        criteria: &LandCriteria,
        time_crit_first_met: f64,
    ) -> Self {
        HoverCriteria {
            desired_lat: lat,
            desired_lon: lon,
            desired_alt_msl: alt_msl,
            desired_hdg_deg: hdg_deg,
            hor_dist_tol_ft: criteria.hor_dist_ft,
            vert_dist_tol_ft: criteria.vert_dist_ft,
            vel_tol_kts: criteria.vel_kts,
            hdg_tol_deg: criteria.hdg_deg,
            time_tol: criteria.time_s,
            time_crit_first_met,
            hover_completed: 0.0,
            man_ctrl_required_after_crit_met: 0,
        }
    }
}
