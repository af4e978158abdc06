use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::{debug, info};
use strum::AsRefStr;

use crate::{
    geo::{GeoPoint, SharedDistance},
    messages::{AircraftState, BossMissionUpdate, FccCommand, GcsUpdate, HoverCriteria, LandingPoint},
    parameters::{Conversions, LandCriteria, SupervisorParams},
};

/// Seconds of the reposition budget reserved for settling over the point.
const SETTLING_MARGIN_S: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    MissionStarted,
    RequestState,
    GetState,
    CommandVel,
    CommandHover,
    Stabilizing,
    LpCriteriaMet,
    Landing,
    CancelHover,
    TimerExpired,
    PilotControl,
}

/// Flies the aircraft to a landing point at a bounded velocity, then asks for
/// a hover over it and reports when the hover criteria are met.
pub struct CommandReposition {
    state: State,
    landing_point: LandingPoint,
    aircraft_state: AircraftState,
    /// m/s
    velocity: f64,
    mission_number: i32,

    repo_timer: Time,
    max_velocity_mps: f64,
    land_criteria: LandCriteria,
    conversions: Conversions,
    distance: SharedDistance,
}

impl CommandReposition {
    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const HOVER_CRITERIA_MET: InPort<bool> = InPort::new("hover_criteria_met");
    pub const PILOT_HANDOVER: InPort<LandingPoint> = InPort::new("pilot_handover");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const REQUEST_REPOSITION: InPort<LandingPoint> = InPort::new("request_reposition");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const CANCEL_HOVER: OutPort<bool> = OutPort::new("cancel_hover");
    pub const FCC_COMMAND_VELOCITY: OutPort<FccCommand> = OutPort::new("fcc_command_velocity");
    pub const LP_CRITERIA_MET: OutPort<LandingPoint> = OutPort::new("lp_criteria_met");
    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const STABILIZE: OutPort<HoverCriteria> = OutPort::new("stabilize");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");

    pub fn new(params: &SupervisorParams, distance: SharedDistance) -> Self {
        CommandReposition {
            state: State::Idle,
            landing_point: LandingPoint::default(),
            aircraft_state: AircraftState::default(),
            velocity: 0.0,
            mission_number: 0,
            repo_timer: params.repo_timer,
            max_velocity_mps: params.max_repo_vel_mps(),
            land_criteria: params.land_criteria,
            conversions: params.conversions,
            distance,
        }
    }

    /// Starts from `state` instead of IDLE.
    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn current_state(&self) -> State {
        self.state
    }

    /// Last commanded reposition velocity, m/s.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    fn reset(&mut self) {
        self.aircraft_state = AircraftState::default();
        self.landing_point = LandingPoint::default();
        self.velocity = 0.0;
        self.mission_number = 0;
    }

    /// Velocity that covers the distance to the landing point within the
    /// reposition budget, capped to the maximum reposition velocity.
    fn reposition_velocity(&self) -> f64 {
        let ft_to_m = self.conversions.ft_to_meters;
        let from = GeoPoint::new(
            self.aircraft_state.lat,
            self.aircraft_state.lon,
            self.aircraft_state.alt_msl * ft_to_m,
        );
        let to = GeoPoint::new(
            self.landing_point.lat,
            self.landing_point.lon,
            self.landing_point.alt * ft_to_m,
        );

        let transit_s = self.repo_timer.seconds() - SETTLING_MARGIN_S;
        if transit_s <= 0.0 {
            return self.max_velocity_mps;
        }

        let distance = self.distance.horizontal_m(&from, &to).max(0.0);
        (distance / transit_s).min(self.max_velocity_mps)
    }

    fn hover_criteria(&self) -> HoverCriteria {
        let lp = &self.landing_point;
        HoverCriteria::new(lp.lat, lp.lon, lp.alt, lp.hdg, &self.land_criteria, -1.0)
    }
}

impl Atomic for CommandReposition {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::AIRCRAFT_STATE.info(),
            Self::HOVER_CRITERIA_MET.info(),
            Self::PILOT_HANDOVER.info(),
            Self::PILOT_TAKEOVER.info(),
            Self::REQUEST_REPOSITION.info(),
            Self::START_MISSION.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::CANCEL_HOVER.info(),
            Self::FCC_COMMAND_VELOCITY.info(),
            Self::LP_CRITERIA_MET.info(),
            Self::REQUEST_AIRCRAFT_STATE.info(),
            Self::SET_MISSION_MONITOR_STATUS.info(),
            Self::STABILIZE.info(),
            Self::UPDATE_BOSS.info(),
            Self::UPDATE_GCS.info(),
        ]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle
            | State::MissionStarted
            | State::GetState
            | State::Stabilizing
            | State::Landing
            | State::TimerExpired
            | State::PilotControl => Time::infinity(),
            State::RequestState
            | State::CommandVel
            | State::CommandHover
            | State::LpCriteriaMet
            | State::CancelHover => Time::zero(),
        }
    }

    fn internal_transition(&mut self) {
        self.state = match self.state {
            State::RequestState => State::GetState,
            State::CommandVel => State::CommandHover,
            State::CommandHover => State::Stabilizing,
            State::LpCriteriaMet => State::Landing,
            State::CancelHover => State::RequestState,
            other => other,
        };
    }

    fn external_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::PILOT_TAKEOVER) {
            info!("Pilot took over, stopping reposition");
            self.state = State::PilotControl;
            return;
        }

        if let Some(mission) = inputs.last(&Self::START_MISSION) {
            self.reset();
            self.mission_number = *mission;
            self.state = State::MissionStarted;
            return;
        }

        if inputs.has(&Self::PILOT_HANDOVER) && self.state != State::Idle {
            self.state = State::TimerExpired;
            return;
        }

        let reposition = inputs.last(&Self::REQUEST_REPOSITION).copied();

        match self.state {
            State::MissionStarted | State::CommandVel | State::CommandHover => {
                if let Some(lp) = reposition {
                    self.landing_point = lp;
                    self.state = State::RequestState;
                }
            }
            State::GetState => {
                if let Some(aircraft_state) = inputs.first(&Self::AIRCRAFT_STATE) {
                    self.aircraft_state = *aircraft_state;
                    self.velocity = self.reposition_velocity();
                    debug!(
                        "Repositioning to LP {} at {:.2} m/s",
                        self.landing_point.id, self.velocity
                    );
                    self.state = State::CommandVel;
                }
            }
            State::Stabilizing => {
                if let Some(lp) = reposition {
                    self.landing_point = lp;
                    self.state = State::CancelHover;
                } else if inputs.has(&Self::HOVER_CRITERIA_MET) {
                    self.state = State::LpCriteriaMet;
                }
            }
            State::LpCriteriaMet => {
                if let Some(lp) = reposition {
                    self.landing_point = lp;
                    self.state = State::CancelHover;
                }
            }
            _ => {}
        }
    }

    /// Inputs take precedence and the internal transition is skipped. In a
    /// zero time state an unrelated input leaves the state unchanged, so its
    /// output is emitted once more on the next step. This is intended.
    fn confluent_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        self.external_transition(Time::zero(), inputs);
    }

    fn output(&self) -> Bag {
        let mut bag = Bag::new();

        match self.state {
            State::RequestState => bag.push(&Self::REQUEST_AIRCRAFT_STATE, true),
            State::CommandVel => bag.push(
                &Self::FCC_COMMAND_VELOCITY,
                FccCommand::change_velocity(self.velocity as f32, self.aircraft_state.gps_time),
            ),
            State::CommandHover => {
                let lp = &self.landing_point;

                bag.push(&Self::STABILIZE, self.hover_criteria());
                bag.push(&Self::SET_MISSION_MONITOR_STATUS, 0);
                bag.push(
                    &Self::UPDATE_BOSS,
                    BossMissionUpdate::landing_point(
                        lp.id,
                        lp.lat,
                        lp.lon,
                        self.mission_number,
                        lp.mission_item_no,
                        lp.alt * self.conversions.ft_to_meters,
                        lp.hdg,
                        self.velocity / self.conversions.kts_to_mps,
                        "LP REP",
                    ),
                );
                bag.push(&Self::UPDATE_GCS, GcsUpdate::alert("Repositioning to LP!"));
            }
            State::CancelHover => bag.push(&Self::CANCEL_HOVER, true),
            State::LpCriteriaMet => bag.push(&Self::LP_CRITERIA_MET, self.landing_point),
            _ => {}
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}
