use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::info;
use strum::AsRefStr;

use crate::{
    messages::{BossMissionUpdate, FccCommand, GcsUpdate, LandingPoint},
    parameters::{Conversions, SupervisorParams},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    WaitLandRequest,
    RequestLand,
    Landing,
    NotifyLanded,
    Landed,
    PilotControl,
}

/// Hands the landing to the FCC and reports when the aircraft is down.
pub struct LandingRoutine {
    state: State,
    landing_point: LandingPoint,
    mission_number: i32,
    conversions: Conversions,
}

impl LandingRoutine {
    pub const LAND: InPort<LandingPoint> = InPort::new("land");
    pub const LANDING_ACHIEVED: InPort<bool> = InPort::new("landing_achieved");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const FCC_COMMAND_LAND: OutPort<FccCommand> = OutPort::new("fcc_command_land");
    pub const MISSION_COMPLETE: OutPort<bool> = OutPort::new("mission_complete");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");
    pub const UPDATE_MISSION_ITEM: OutPort<bool> = OutPort::new("update_mission_item");

    pub fn new(params: &SupervisorParams) -> Self {
        LandingRoutine {
            state: State::Idle,
            landing_point: LandingPoint::default(),
            mission_number: 0,
            conversions: params.conversions,
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

impl Atomic for LandingRoutine {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::LAND.info(),
            Self::LANDING_ACHIEVED.info(),
            Self::PILOT_TAKEOVER.info(),
            Self::START_MISSION.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::FCC_COMMAND_LAND.info(),
            Self::MISSION_COMPLETE.info(),
            Self::UPDATE_BOSS.info(),
            Self::UPDATE_GCS.info(),
            Self::UPDATE_MISSION_ITEM.info(),
        ]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::RequestLand | State::NotifyLanded => Time::zero(),
            State::Idle
            | State::WaitLandRequest
            | State::Landing
            | State::Landed
            | State::PilotControl => Time::infinity(),
        }
    }

    fn internal_transition(&mut self) {
        self.state = match self.state {
            State::RequestLand => State::Landing,
            State::NotifyLanded => State::Landed,
            other => other,
        };
    }

    fn external_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::PILOT_TAKEOVER) {
            self.state = State::PilotControl;
            return;
        }

        if let Some(mission) = inputs.last(&Self::START_MISSION) {
            self.mission_number = *mission;
            self.state = State::WaitLandRequest;
            return;
        }

        match self.state {
            State::WaitLandRequest => {
                if let Some(lp) = inputs.last(&Self::LAND) {
                    self.landing_point = *lp;
                    self.state = State::RequestLand;
                }
            }
            State::Landing | State::PilotControl => {
                if inputs.has(&Self::LANDING_ACHIEVED) {
                    info!("Touchdown");
                    self.state = State::NotifyLanded;
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
            State::RequestLand => {
                let lp = &self.landing_point;
                bag.push(&Self::FCC_COMMAND_LAND, FccCommand::land());
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
                        0.0,
                        "LAND",
                    ),
                );
                bag.push(&Self::UPDATE_GCS, GcsUpdate::alert("Landing"));
            }
            State::NotifyLanded => {
                bag.push(&Self::UPDATE_GCS, GcsUpdate::info("Just landed!"));
                bag.push(&Self::MISSION_COMPLETE, true);
                bag.push(&Self::UPDATE_MISSION_ITEM, true);
            }
            _ => {}
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}
