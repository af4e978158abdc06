use devs::Time;

use super::parameters::{Error, ParameterMap};

/// Tolerance envelope applied when hovering over a landing point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandCriteria {
    pub hor_dist_ft: f64,
    pub vert_dist_ft: f64,
    pub vel_kts: f64,
    pub hdg_deg: f64,
    /// Seconds the aircraft must remain within tolerance
    pub time_s: f64,
}

impl Default for LandCriteria {
    fn default() -> Self {
        LandCriteria {
            hor_dist_ft: 16.40,
            vert_dist_ft: 5.0,
            vel_kts: 3.0,
            hdg_deg: 15.0,
            time_s: 3.0,
        }
    }
}

impl LandCriteria {
    fn from_params(params: &ParameterMap) -> Result<Self, Error> {
        Ok(LandCriteria {
            hor_dist_ft: params.get_param("hor_dist_ft")?.value_float()?,
            vert_dist_ft: params.get_param("vert_dist_ft")?.value_float()?,
            vel_kts: params.get_param("vel_kts")?.value_float()?,
            hdg_deg: params.get_param("hdg_deg")?.value_float()?,
            time_s: params.get_param("time_s")?.value_float()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversions {
    pub kts_to_mps: f64,
    pub meters_to_ft: f64,
    pub ft_to_meters: f64,
}

impl Default for Conversions {
    fn default() -> Self {
        Conversions {
            kts_to_mps: 0.514444,
            meters_to_ft: 3.281,
            ft_to_meters: 0.3048,
        }
    }
}

/// Every tunable value used by the supervisor models.
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorParams {
    /// Time budget of a single reposition
    pub repo_timer: Time,
    /// Hold before repositioning to a newly found landing point
    pub upd_timer: Time,
    /// Time allowed to find an acceptable landing point
    pub lp_accept_timer: Time,
    pub orbit_timer: Time,

    pub max_repo_vel_kts: f64,

    pub land_criteria: LandCriteria,
    pub conversions: Conversions,

    /// Minimum horizontal distance between consecutive landing points, m
    pub lp_separation_m: f64,
    pub hover_altitude_agl_ft: f64,
    pub orbit_radius_m: f64,
    pub orbit_velocity_kts: f64,
    pub lp_hor_accept_tolerance_m: f64,
    /// Above this height a mission start is an in-air start
    pub in_air_start_agl_ft: f64,
    /// Below this height the aircraft is considered landed
    pub landed_agl_ft: f64,

    pub stabilize_polling_rate: Time,
    pub landing_polling_rate: Time,
    pub takeover_polling_rate: Time,
}

impl Default for SupervisorParams {
    fn default() -> Self {
        SupervisorParams {
            repo_timer: Time::from_millis(60_000),
            upd_timer: Time::from_millis(20_000),
            lp_accept_timer: Time::from_millis(120_000),
            orbit_timer: Time::from_millis(120_000),
            max_repo_vel_kts: 5.0,
            land_criteria: LandCriteria::default(),
            conversions: Conversions::default(),
            lp_separation_m: 10.0,
            hover_altitude_agl_ft: 15.0,
            orbit_radius_m: 30.0,
            orbit_velocity_kts: 2.0,
            lp_hor_accept_tolerance_m: 5.0,
            in_air_start_agl_ft: 10.0,
            landed_agl_ft: 5.0,
            stabilize_polling_rate: Time::from_millis(100),
            landing_polling_rate: Time::from_millis(100),
            takeover_polling_rate: Time::from_millis(1000),
        }
    }
}

impl SupervisorParams {
    pub fn from_params(params: &ParameterMap) -> Result<Self, Error> {
        let timers = params.get_map("timers")?;
        let conversions = params.get_map("conversions")?;
        let geometry = params.get_map("geometry")?;
        let polling = params.get_map("polling")?;

        Ok(SupervisorParams {
            repo_timer: timers.get_param("repo")?.value_duration()?,
            upd_timer: timers.get_param("upd")?.value_duration()?,
            lp_accept_timer: timers.get_param("lp_accept")?.value_duration()?,
            orbit_timer: timers.get_param("orbit")?.value_duration()?,
            max_repo_vel_kts: params
                .get_param("velocity.max_repo_kts")?
                .value_float()?,
            land_criteria: LandCriteria::from_params(params.get_map("land_criteria")?)?,
            conversions: Conversions {
                kts_to_mps: conversions.get_param("kts_to_mps")?.value_float()?,
                meters_to_ft: conversions.get_param("meters_to_ft")?.value_float()?,
                ft_to_meters: conversions.get_param("ft_to_meters")?.value_float()?,
            },
            lp_separation_m: geometry.get_param("lp_separation_m")?.value_float()?,
            hover_altitude_agl_ft: geometry.get_param("hover_altitude_agl_ft")?.value_float()?,
            orbit_radius_m: geometry.get_param("orbit_radius_m")?.value_float()?,
            orbit_velocity_kts: params
                .get_param("velocity.orbit_kts")?
                .value_float()?,
            lp_hor_accept_tolerance_m: geometry
                .get_param("lp_hor_accept_tolerance_m")?
                .value_float()?,
            in_air_start_agl_ft: geometry.get_param("in_air_start_agl_ft")?.value_float()?,
            landed_agl_ft: geometry.get_param("landed_agl_ft")?.value_float()?,
            stabilize_polling_rate: polling.get_param("stabilize")?.value_duration()?,
            landing_polling_rate: polling.get_param("landing")?.value_duration()?,
            takeover_polling_rate: polling.get_param("takeover")?.value_duration()?,
        })
    }

    /// Maximum reposition velocity, m/s
    pub fn max_repo_vel_mps(&self) -> f64 {
        self.max_repo_vel_kts * self.conversions.kts_to_mps
    }
}
