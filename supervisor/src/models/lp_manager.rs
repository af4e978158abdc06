use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::{debug, info};
use strum::AsRefStr;

use crate::{
    geo::{GeoPoint, SharedDistance},
    messages::{
        AircraftState, BossMissionUpdate, FccCommand, GcsUpdate, LandingPoint, OrbitYawBehaviour,
        fcc::scale_deg,
    },
    parameters::{Conversions, SupervisorParams},
};

/// Speed shown on the display while scanning. Zero draws a doghouse.
const SCAN_DISPLAY_SPEED: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    WaitLpPlp,
    RequestStatePlp,
    GetStatePlp,
    RequestStateLp,
    GetStateLp,
    StartLzeScan,
    LzeScan,
    HandoverControl,
    PilotControl,
    NotifyLp,
    LpApproach,
    LpAcceptExp,
}

/// Selects the landing point the aircraft heads to.
///
/// Landing points (LP) come from the perception system. When only a planned
/// landing point (PLP) is known, the aircraft orbits it to scan the landing
/// zone, and hands control to the pilot if nothing is found before the orbit
/// timer expires. New LPs are accepted until the LP accept timer expires.
pub struct LpManager {
    state: State,
    first_waypoint_number: i32,
    lp_count: i32,
    mission_number: i32,
    lp: LandingPoint,
    plp: LandingPoint,
    aircraft_state: AircraftState,
    lp_accept_time_prev: Time,
    orbit_time: Time,

    lp_accept_timer: Time,
    orbit_timer: Time,
    lp_separation_m: f64,
    hover_altitude_agl_ft: f64,
    orbit_radius_m: f64,
    orbit_velocity_kts: f64,
    lp_hor_accept_tolerance_m: f64,
    conversions: Conversions,
    distance: SharedDistance,
}

impl LpManager {
    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const CONTROL_YIELDED: InPort<bool> = InPort::new("control_yielded");
    pub const FCC_COMMAND_LAND: InPort<FccCommand> = InPort::new("fcc_command_land");
    pub const LP_RECV: InPort<LandingPoint> = InPort::new("lp_recv");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const PLP_ACH: InPort<LandingPoint> = InPort::new("plp_ach");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const FCC_COMMAND_ORBIT: OutPort<FccCommand> = OutPort::new("fcc_command_orbit");
    pub const LP_EXPIRED: OutPort<LandingPoint> = OutPort::new("lp_expired");
    pub const LP_NEW: OutPort<LandingPoint> = OutPort::new("lp_new");
    pub const PILOT_HANDOVER: OutPort<LandingPoint> = OutPort::new("pilot_handover");
    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");

    pub fn new(params: &SupervisorParams, distance: SharedDistance) -> Self {
        LpManager {
            state: State::Idle,
            first_waypoint_number: -1,
            lp_count: 0,
            mission_number: 0,
            lp: LandingPoint::default(),
            plp: LandingPoint::default(),
            aircraft_state: AircraftState::default(),
            lp_accept_time_prev: params.lp_accept_timer,
            orbit_time: params.orbit_timer,
            lp_accept_timer: params.lp_accept_timer,
            orbit_timer: params.orbit_timer,
            lp_separation_m: params.lp_separation_m,
            hover_altitude_agl_ft: params.hover_altitude_agl_ft,
            orbit_radius_m: params.orbit_radius_m,
            orbit_velocity_kts: params.orbit_velocity_kts,
            lp_hor_accept_tolerance_m: params.lp_hor_accept_tolerance_m,
            conversions: params.conversions,
            distance,
        }
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn current_state(&self) -> State {
        self.state
    }

    pub fn landing_point(&self) -> &LandingPoint {
        &self.lp
    }

    pub fn planned_landing_point(&self) -> &LandingPoint {
        &self.plp
    }

    pub fn lp_accept_time_left(&self) -> Time {
        self.lp_accept_time_prev
    }

    fn reset(&mut self) {
        self.lp_accept_time_prev = self.lp_accept_timer;
        self.orbit_time = self.orbit_timer;
        self.mission_number = 0;
        self.lp_count = 0;
    }

    /// Accepts a landing point from `candidates`. The first LP of a mission is
    /// the newest candidate, later ones the first candidate far enough from the
    /// current LP. Returns whether an LP was accepted.
    fn set_lp_if_valid(&mut self, candidates: &[LandingPoint]) -> bool {
        let accepted = if self.lp_count == 0 {
            candidates.last().copied()
        } else {
            let current = GeoPoint::new(self.lp.lat, self.lp.lon, self.lp.alt);
            candidates.iter().copied().find(|candidate| {
                let to = GeoPoint::new(candidate.lat, candidate.lon, candidate.alt);
                self.distance.horizontal_m(&current, &to) > self.lp_separation_m
            })
        };

        match accepted {
            Some(lp) => {
                self.lp_count += 1;
                self.lp = LandingPoint {
                    id: self.lp_count,
                    ..lp
                };
                debug!("Accepted LP {}", self.lp.id);
                true
            }
            None => {
                debug!("No LP in {} candidates is far enough from the current LP", candidates.len());
                false
            }
        }
    }

    fn update_lp_accept_time(&mut self, elapsed: Time) {
        if matches!(
            self.state,
            State::RequestStateLp | State::GetStateLp | State::NotifyLp | State::LpApproach
        ) {
            self.lp_accept_time_prev = self.lp_accept_time_prev - elapsed;
            if self.lp_accept_time_prev <= Time::zero() {
                self.lp_accept_time_prev = Time::zero();
            }
        }
    }

    /// Hover altitude over a point, ft MSL. Never lower than the default hover
    /// height above the ground under the aircraft.
    fn hover_altitude(&self) -> f64 {
        let aircraft = &self.aircraft_state;
        if aircraft.alt_agl < self.hover_altitude_agl_ft {
            aircraft.alt_msl - aircraft.alt_agl + self.hover_altitude_agl_ft
        } else {
            aircraft.alt_msl
        }
    }

    fn plp_update(&self, description: &str) -> BossMissionUpdate {
        let plp = &self.plp;
        BossMissionUpdate::waypoint(
            self.mission_number,
            plp.mission_item_no,
            plp.lat,
            plp.lon,
            plp.alt * self.conversions.ft_to_meters,
            plp.hdg,
            SCAN_DISPLAY_SPEED,
            self.lp_hor_accept_tolerance_m,
            0.0,
            description,
        )
    }
}

impl Atomic for LpManager {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::AIRCRAFT_STATE.info(),
            Self::CONTROL_YIELDED.info(),
            Self::FCC_COMMAND_LAND.info(),
            Self::LP_RECV.info(),
            Self::PILOT_TAKEOVER.info(),
            Self::PLP_ACH.info(),
            Self::START_MISSION.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::FCC_COMMAND_ORBIT.info(),
            Self::LP_EXPIRED.info(),
            Self::LP_NEW.info(),
            Self::PILOT_HANDOVER.info(),
            Self::REQUEST_AIRCRAFT_STATE.info(),
            Self::SET_MISSION_MONITOR_STATUS.info(),
            Self::UPDATE_BOSS.info(),
            Self::UPDATE_GCS.info(),
        ]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle
            | State::WaitLpPlp
            | State::GetStatePlp
            | State::GetStateLp
            | State::HandoverControl
            | State::PilotControl
            | State::LpAcceptExp => Time::infinity(),
            State::StartLzeScan
            | State::NotifyLp
            | State::RequestStateLp
            | State::RequestStatePlp => Time::zero(),
            State::LzeScan => self.orbit_time,
            State::LpApproach => self.lp_accept_time_prev,
        }
    }

    fn internal_transition(&mut self) {
        self.state = match self.state {
            State::StartLzeScan => State::LzeScan,
            State::RequestStateLp => State::GetStateLp,
            State::RequestStatePlp => State::GetStatePlp,
            State::LzeScan => State::HandoverControl,
            State::NotifyLp => State::LpApproach,
            State::LpApproach => State::LpAcceptExp,
            other => other,
        };
    }

    fn external_transition(&mut self, elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::PILOT_TAKEOVER) && self.state != State::HandoverControl {
            info!("Pilot took over, LP manager stopped");
            self.state = State::PilotControl;
            return;
        }

        if let Some(mission) = inputs.last(&Self::START_MISSION) {
            self.reset();
            self.mission_number = *mission;
            self.state = State::WaitLpPlp;
            return;
        }

        self.update_lp_accept_time(elapsed);

        let landing_points = inputs.messages(&Self::LP_RECV);

        match self.state {
            State::WaitLpPlp => {
                if !landing_points.is_empty() {
                    self.set_lp_if_valid(landing_points);
                    self.first_waypoint_number = if inputs.has(&Self::PLP_ACH) {
                        self.lp.mission_item_no
                    } else {
                        self.lp.mission_item_no + 1
                    };
                    self.lp.mission_item_no = self.first_waypoint_number;
                    self.state = State::RequestStateLp;
                } else if let Some(plp) = inputs.first(&Self::PLP_ACH) {
                    self.plp = *plp;
                    self.first_waypoint_number = plp.mission_item_no;
                    self.state = State::RequestStatePlp;
                }
            }
            State::LzeScan => {
                if !landing_points.is_empty() {
                    self.set_lp_if_valid(landing_points);
                    self.state = State::RequestStateLp;
                }
            }
            State::GetStatePlp => {
                if let Some(aircraft) = inputs.first(&Self::AIRCRAFT_STATE) {
                    self.aircraft_state = *aircraft;
                    self.plp.alt = self.hover_altitude();
                    self.state = State::StartLzeScan;
                }
            }
            State::GetStateLp => {
                if let Some(aircraft) = inputs.first(&Self::AIRCRAFT_STATE) {
                    self.aircraft_state = *aircraft;
                    self.lp.alt = self.hover_altitude();
                    self.state = State::NotifyLp;
                }
            }
            State::HandoverControl => {
                if inputs.has(&Self::CONTROL_YIELDED) {
                    self.state = State::PilotControl;
                }
            }
            State::LpApproach => {
                if inputs.has(&Self::FCC_COMMAND_LAND) {
                    self.state = State::LpAcceptExp;
                } else if !landing_points.is_empty() {
                    self.set_lp_if_valid(landing_points);
                    self.lp.mission_item_no = self.first_waypoint_number;
                    self.state = State::RequestStateLp;
                }
            }
            _ => {}
        }
    }

    fn confluent_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::PILOT_TAKEOVER) {
            self.external_transition(Time::zero(), inputs);
            self.internal_transition();
        } else {
            self.internal_transition();
            self.external_transition(Time::zero(), inputs);
        }
    }

    fn output(&self) -> Bag {
        let mut bag = Bag::new();

        match self.state {
            State::StartLzeScan => {
                let plp = &self.plp;
                bag.push(
                    &Self::FCC_COMMAND_ORBIT,
                    FccCommand::orbit(
                        self.aircraft_state.gps_time,
                        scale_deg(plp.lat),
                        scale_deg(plp.lon),
                        (plp.alt * self.conversions.ft_to_meters) as f32,
                        self.orbit_radius_m as f32,
                        self.orbit_velocity_kts as f32,
                        OrbitYawBehaviour::HoldFrontTangentToCircle,
                    ),
                );
                bag.push(&Self::UPDATE_GCS, GcsUpdate::info("Starting an orbit to scan LZ"));
                bag.push(&Self::UPDATE_BOSS, self.plp_update("LZ SCAN"));
                bag.push(&Self::SET_MISSION_MONITOR_STATUS, 0);
            }
            State::LzeScan => {
                bag.push(
                    &Self::UPDATE_GCS,
                    GcsUpdate::alert("Landing point not found. Hovering over PLP"),
                );
                bag.push(&Self::UPDATE_BOSS, self.plp_update("MAN CTRL"));
                bag.push(&Self::PILOT_HANDOVER, self.plp);
            }
            State::NotifyLp => {
                if self.lp_count == 1 {
                    bag.push(&Self::UPDATE_GCS, GcsUpdate::info("LP timer started"));
                }
                bag.push(&Self::LP_NEW, self.lp);
            }
            State::LpApproach => {
                bag.push(&Self::LP_EXPIRED, self.lp);
                bag.push(&Self::UPDATE_GCS, GcsUpdate::info("LP accept timer expired"));
            }
            State::RequestStateLp | State::RequestStatePlp => {
                bag.push(&Self::REQUEST_AIRCRAFT_STATE, true)
            }
            _ => {}
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}
