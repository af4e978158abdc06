use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo, missing_time_advance},
};
use log::{info, warn};
use strum::AsRefStr;

use crate::{
    messages::{AircraftState, GcsUpdate, StartSupervisor},
    parameters::SupervisorParams,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    MissionStatus,
    ResumeMission,
    CheckAutonomy,
    CheckPerceptionSystem,
    OutputPerceptionStatus,
    RequestAircraftState,
    CheckAircraftState,
    OutputTakeoffPosition,
    RequireMonitoring,
    StartMission,
}

/// Gates the mission start on the operator request, the perception system
/// and the height the aircraft starts at.
pub struct MissionInitialization {
    state: State,
    start: StartSupervisor,
    perception_healthy: bool,
    /// Feet AGL when the mission started
    start_height_ft: f64,

    in_air_start_agl_ft: f64,
}

impl MissionInitialization {
    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const PERCEPTION_STATUS: InPort<bool> = InPort::new("perception_status");
    pub const START_SUPERVISOR: InPort<StartSupervisor> = InPort::new("start_supervisor");

    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const REQUEST_PERCEPTION_STATUS: OutPort<bool> = OutPort::new("request_perception_status");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const START_MISSION: OutPort<i32> = OutPort::new("start_mission");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");

    pub fn new(params: &SupervisorParams) -> Self {
        MissionInitialization {
            state: State::Idle,
            start: StartSupervisor::default(),
            perception_healthy: false,
            start_height_ft: 0.0,
            in_air_start_agl_ft: params.in_air_start_agl_ft,
        }
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }

    pub fn current_state(&self) -> State {
        self.state
    }
}

impl Atomic for MissionInitialization {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::AIRCRAFT_STATE.info(),
            Self::PERCEPTION_STATUS.info(),
            Self::START_SUPERVISOR.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::REQUEST_AIRCRAFT_STATE.info(),
            Self::REQUEST_PERCEPTION_STATUS.info(),
            Self::SET_MISSION_MONITOR_STATUS.info(),
            Self::START_MISSION.info(),
            Self::UPDATE_GCS.info(),
        ]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle | State::CheckPerceptionSystem | State::CheckAircraftState => {
                Time::infinity()
            }
            State::MissionStatus
            | State::ResumeMission
            | State::CheckAutonomy
            | State::OutputPerceptionStatus
            | State::RequestAircraftState
            | State::OutputTakeoffPosition
            | State::StartMission => Time::zero(),
            State::RequireMonitoring => {
                missing_time_advance("mission_initialization", self.state.as_ref())
            }
        }
    }

    fn internal_transition(&mut self) {
        self.state = match self.state {
            State::MissionStatus => {
                if self.start.mission_started {
                    State::ResumeMission
                } else {
                    State::CheckAutonomy
                }
            }
            State::ResumeMission => State::Idle,
            State::CheckAutonomy => {
                if self.start.autonomy_armed {
                    State::CheckPerceptionSystem
                } else {
                    info!("Autonomy is not armed, waiting for a new start request");
                    State::Idle
                }
            }
            State::OutputPerceptionStatus => State::RequestAircraftState,
            State::RequestAircraftState => State::CheckAircraftState,
            State::OutputTakeoffPosition => State::StartMission,
            State::StartMission => State::Idle,
            other => other,
        };
    }

    fn external_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        match self.state {
            State::Idle => {
                if let Some(start) = inputs.last(&Self::START_SUPERVISOR) {
                    self.start = *start;
                    self.state = State::MissionStatus;
                }
            }
            State::CheckPerceptionSystem => {
                if let Some(healthy) = inputs.first(&Self::PERCEPTION_STATUS) {
                    self.perception_healthy = *healthy;
                    if !healthy {
                        warn!("Perception system reported not operational");
                    }
                    self.state = State::OutputPerceptionStatus;
                }
            }
            State::CheckAircraftState => {
                if let Some(aircraft) = inputs.first(&Self::AIRCRAFT_STATE) {
                    self.start_height_ft = aircraft.alt_agl;
                    self.state = State::OutputTakeoffPosition;
                }
            }
            _ => {}
        }
    }

    fn confluent_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        self.internal_transition();
        self.external_transition(Time::zero(), inputs);
    }

    fn output(&self) -> Bag {
        let mut bag = Bag::new();

        match self.state {
            State::CheckAutonomy => {
                if self.start.autonomy_armed {
                    bag.push(&Self::REQUEST_PERCEPTION_STATUS, true);
                }
            }
            State::OutputPerceptionStatus => {
                let text = if self.perception_healthy {
                    "The perceptions system is ready for operation!"
                } else {
                    "The perception system is not operational!"
                };
                bag.push(&Self::UPDATE_GCS, GcsUpdate::alert(text));
            }
            State::RequestAircraftState => bag.push(&Self::REQUEST_AIRCRAFT_STATE, true),
            State::OutputTakeoffPosition => {
                bag.push(&Self::SET_MISSION_MONITOR_STATUS, 1);
                if self.start_height_ft > self.in_air_start_agl_ft {
                    bag.push(&Self::UPDATE_GCS, GcsUpdate::alert("Starting Mission in air!"));
                }
            }
            State::StartMission => bag.push(&Self::START_MISSION, self.start.mission_number),
            _ => {}
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}
