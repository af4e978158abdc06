use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use strum::AsRefStr;

use crate::messages::{ControlMode, FccCommand};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    WaitForWaypoint,
    PilotTakeover,
    UpdateFcc,
}

/// Forwards mission waypoints to the FCC while the supervisor is in control.
pub struct HandleWaypoint {
    state: State,
    next_waypoints: Vec<FccCommand>,
}

impl Default for HandleWaypoint {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleWaypoint {
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");
    pub const WAYPOINT: InPort<FccCommand> = InPort::new("waypoint");

    pub const FCC_WAYPOINT_UPDATE: OutPort<FccCommand> = OutPort::new("fcc_waypoint_update");

    pub fn new() -> Self {
        HandleWaypoint {
            state: State::Idle,
            next_waypoints: Vec::new(),
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

impl Atomic for HandleWaypoint {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::PILOT_TAKEOVER.info(),
            Self::START_MISSION.info(),
            Self::WAYPOINT.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![Self::FCC_WAYPOINT_UPDATE.info()]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle | State::WaitForWaypoint | State::PilotTakeover => Time::infinity(),
            State::UpdateFcc => Time::zero(),
        }
    }

    fn internal_transition(&mut self) {
        if self.state == State::UpdateFcc {
            self.next_waypoints.clear();
            self.state = State::WaitForWaypoint;
        }
    }

    fn external_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::PILOT_TAKEOVER) {
            self.state = State::PilotTakeover;
            return;
        }

        match self.state {
            State::Idle => {
                if inputs.has(&Self::START_MISSION) {
                    self.state = State::WaitForWaypoint;
                }
            }
            State::WaitForWaypoint => {
                let waypoints = inputs.messages(&Self::WAYPOINT);
                if !waypoints.is_empty() {
                    self.next_waypoints = waypoints
                        .iter()
                        .map(|waypoint| {
                            let mut waypoint = *waypoint;
                            waypoint.set_supervisor_status(ControlMode::MavCommand);
                            waypoint
                        })
                        .collect();
                    self.state = State::UpdateFcc;
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

        if self.state == State::UpdateFcc {
            for waypoint in &self.next_waypoints {
                bag.push(&Self::FCC_WAYPOINT_UPDATE, *waypoint);
            }
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}
