use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::debug;
use strum::AsRefStr;

use crate::{
    geo::{GeoPoint, SharedDistance},
    messages::{AircraftState, FccCommand, GcsUpdate, HoverCriteria, fcc::scale_deg},
    parameters::{Conversions, SupervisorParams},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    WaitStabilize,
    RequestAircraftState,
    GetAircraftState,
    InitHover,
    Stabilizing,
    CheckState,
    Hover,
}

/// Commands a hover over a point and polls the aircraft state until it stays
/// inside the hover criteria for the required time.
pub struct Stabilize {
    state: State,
    hover_criteria: HoverCriteria,
    aircraft_state: AircraftState,
    in_tolerance: bool,
    time_tolerance_met: bool,
    /// Time left before the hover is considered stable
    stabilization_time_prev: Time,

    polling_rate: Time,
    conversions: Conversions,
    distance: SharedDistance,
}

impl Stabilize {
    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const CANCEL_HOVER: InPort<bool> = InPort::new("cancel_hover");
    pub const STABILIZE: InPort<HoverCriteria> = InPort::new("stabilize");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const FCC_COMMAND_HOVER: OutPort<FccCommand> = OutPort::new("fcc_command_hover");
    pub const HOVER_CRITERIA_MET: OutPort<bool> = OutPort::new("hover_criteria_met");
    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");

    pub fn new(params: &SupervisorParams, distance: SharedDistance) -> Self {
        Stabilize {
            state: State::Idle,
            hover_criteria: HoverCriteria::default(),
            aircraft_state: AircraftState::default(),
            in_tolerance: false,
            time_tolerance_met: false,
            stabilization_time_prev: Time::zero(),
            polling_rate: params.stabilize_polling_rate,
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

    pub fn time_tolerance_met(&self) -> bool {
        self.time_tolerance_met
    }

    pub fn remaining_time(&self) -> Time {
        self.stabilization_time_prev
    }

    fn reset(&mut self) {
        self.in_tolerance = false;
        self.time_tolerance_met = false;
        self.stabilization_time_prev = Time::zero();
    }

    fn full_tolerance(&self) -> Time {
        Time::from_secs_f64(self.hover_criteria.time_tol)
    }

    /// True when `aircraft` satisfies every tolerance of the active hover
    /// criteria. Checked in order: altitude, heading, velocity, horizontal
    /// distance.
    pub fn hover_criteria_met(&self, aircraft: &AircraftState) -> bool {
        let criteria = &self.hover_criteria;

        if (aircraft.alt_msl - criteria.desired_alt_msl).abs() >= criteria.vert_dist_tol_ft {
            return false;
        }

        let hdg = aircraft.hdg_deg.rem_euclid(360.0);
        if !criteria.desired_hdg_deg.is_nan()
            && (hdg - criteria.desired_hdg_deg).abs() >= criteria.hdg_tol_deg
        {
            return false;
        }

        if aircraft.vel_kts.abs() >= criteria.vel_tol_kts {
            return false;
        }

        let here = GeoPoint::new(aircraft.lat, aircraft.lon, 0.0);
        let target = GeoPoint::new(criteria.desired_lat, criteria.desired_lon, 0.0);
        let dist_ft = self.distance.horizontal_m(&here, &target) * self.conversions.meters_to_ft;

        dist_ft < criteria.hor_dist_tol_ft
    }
}

impl Atomic for Stabilize {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::AIRCRAFT_STATE.info(),
            Self::CANCEL_HOVER.info(),
            Self::STABILIZE.info(),
            Self::START_MISSION.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::FCC_COMMAND_HOVER.info(),
            Self::HOVER_CRITERIA_MET.info(),
            Self::REQUEST_AIRCRAFT_STATE.info(),
            Self::UPDATE_GCS.info(),
        ]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle | State::WaitStabilize | State::GetAircraftState | State::CheckState => {
                Time::infinity()
            }
            State::RequestAircraftState | State::InitHover | State::Hover => Time::zero(),
            State::Stabilizing => self.polling_rate,
        }
    }

    fn internal_transition(&mut self) {
        self.state = match self.state {
            State::RequestAircraftState => State::GetAircraftState,
            State::InitHover => State::Stabilizing,
            State::Stabilizing => {
                if self.time_tolerance_met && self.in_tolerance {
                    State::Hover
                } else {
                    State::CheckState
                }
            }
            State::Hover => {
                self.reset();
                State::WaitStabilize
            }
            other => other,
        };
    }

    fn external_transition(&mut self, elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::CANCEL_HOVER) || inputs.has(&Self::START_MISSION) {
            self.reset();
            self.state = State::WaitStabilize;
            return;
        }

        match self.state {
            State::WaitStabilize => {
                if let Some(criteria) = inputs.last(&Self::STABILIZE) {
                    self.hover_criteria = *criteria;
                    self.stabilization_time_prev = self.full_tolerance();
                    self.state = State::RequestAircraftState;
                }
            }
            State::GetAircraftState => {
                if let Some(aircraft) = inputs.first(&Self::AIRCRAFT_STATE) {
                    self.aircraft_state = *aircraft;
                    self.state = State::InitHover;
                }
            }
            State::CheckState => {
                if let Some(aircraft) = inputs.first(&Self::AIRCRAFT_STATE) {
                    self.aircraft_state = *aircraft;
                    self.in_tolerance = self.hover_criteria_met(aircraft);

                    if self.in_tolerance {
                        self.stabilization_time_prev =
                            self.stabilization_time_prev - (self.polling_rate + elapsed);
                        self.time_tolerance_met = self.stabilization_time_prev <= Time::zero();
                    } else {
                        self.stabilization_time_prev = self.full_tolerance();
                    }

                    debug!(
                        "Hover check: in tolerance {}, {} s left",
                        self.in_tolerance,
                        self.stabilization_time_prev.seconds()
                    );
                    self.state = State::Stabilizing;
                }
            }
            _ => {}
        }
    }

    fn confluent_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::CANCEL_HOVER) {
            self.external_transition(Time::zero(), inputs);
        } else {
            self.internal_transition();
        }
    }

    fn output(&self) -> Bag {
        let mut bag = Bag::new();

        match self.state {
            State::RequestAircraftState => bag.push(&Self::REQUEST_AIRCRAFT_STATE, true),
            State::InitHover => {
                let criteria = &self.hover_criteria;
                bag.push(
                    &Self::FCC_COMMAND_HOVER,
                    FccCommand::reposition(
                        self.aircraft_state.gps_time,
                        scale_deg(criteria.desired_lat),
                        scale_deg(criteria.desired_lon),
                        (criteria.desired_alt_msl * self.conversions.ft_to_meters) as f32,
                    ),
                );
            }
            State::Stabilizing => {
                if self.time_tolerance_met && self.in_tolerance {
                    bag.push(&Self::HOVER_CRITERIA_MET, true);
                    bag.push(&Self::UPDATE_GCS, GcsUpdate::info("Came to hover!"));
                } else {
                    bag.push(&Self::REQUEST_AIRCRAFT_STATE, true);
                }
            }
            _ => {}
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}
