use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::info;
use strum::AsRefStr;

use crate::{
    messages::{BossMissionUpdate, GcsUpdate, LandingPoint},
    parameters::{Conversions, SupervisorParams},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    WaitNewLp,
    NotifyUpdate,
    UpdateLp,
    LpRepo,
    NewLpRepo,
    RequestLand,
    HandoverCtrl,
    LandingRoutine,
    PilotControl,
}

/// Holds on newly found landing points for the update time before asking for
/// a reposition, and bounds every reposition with the reposition timer.
pub struct RepositionTimer {
    state: State,
    landing_point: LandingPoint,
    /// Id of the last landing point reported to the displays, 0 if none
    last_lp: i32,
    mission_number: i32,
    repo_time: Time,
    upd_time: Time,

    repo_timer: Time,
    upd_timer: Time,
    conversions: Conversions,
}

impl RepositionTimer {
    pub const CONTROL_YIELDED: InPort<bool> = InPort::new("control_yielded");
    pub const LP_CRIT_MET: InPort<LandingPoint> = InPort::new("lp_crit_met");
    pub const LP_NEW: InPort<LandingPoint> = InPort::new("lp_new");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const CANCEL_HOVER: OutPort<bool> = OutPort::new("cancel_hover");
    pub const LAND: OutPort<LandingPoint> = OutPort::new("land");
    pub const PILOT_HANDOVER: OutPort<LandingPoint> = OutPort::new("pilot_handover");
    pub const REQUEST_REPOSITION: OutPort<LandingPoint> = OutPort::new("request_reposition");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");

    pub fn new(params: &SupervisorParams) -> Self {
        RepositionTimer {
            state: State::Idle,
            landing_point: LandingPoint::default(),
            last_lp: 0,
            mission_number: 0,
            repo_time: params.repo_timer,
            upd_time: params.upd_timer,
            repo_timer: params.repo_timer,
            upd_timer: params.upd_timer,
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

    pub fn update_time_left(&self) -> Time {
        self.upd_time
    }

    fn reset(&mut self) {
        self.mission_number = 0;
        self.repo_time = self.repo_timer;
        self.upd_time = self.upd_timer;
        self.landing_point = LandingPoint::default();
        self.last_lp = 0;
    }
}

impl Atomic for RepositionTimer {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::CONTROL_YIELDED.info(),
            Self::LP_CRIT_MET.info(),
            Self::LP_NEW.info(),
            Self::PILOT_TAKEOVER.info(),
            Self::START_MISSION.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::CANCEL_HOVER.info(),
            Self::LAND.info(),
            Self::PILOT_HANDOVER.info(),
            Self::REQUEST_REPOSITION.info(),
            Self::UPDATE_BOSS.info(),
            Self::UPDATE_GCS.info(),
        ]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle
            | State::WaitNewLp
            | State::HandoverCtrl
            | State::PilotControl
            | State::LandingRoutine => Time::infinity(),
            State::UpdateLp => self.upd_time,
            State::LpRepo => self.repo_time,
            State::NotifyUpdate | State::NewLpRepo | State::RequestLand => Time::zero(),
        }
    }

    fn internal_transition(&mut self) {
        self.state = match self.state {
            State::NotifyUpdate => {
                self.last_lp = self.landing_point.id;
                State::UpdateLp
            }
            State::UpdateLp => State::NewLpRepo,
            State::NewLpRepo => State::LpRepo,
            State::LpRepo => {
                info!("Reposition timer expired");
                State::HandoverCtrl
            }
            State::RequestLand => State::LandingRoutine,
            other => other,
        };
    }

    fn external_transition(&mut self, elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::PILOT_TAKEOVER) {
            self.state = State::PilotControl;
            return;
        }

        if let Some(mission) = inputs.last(&Self::START_MISSION) {
            self.reset();
            self.mission_number = *mission;
            self.state = State::WaitNewLp;
            return;
        }

        let new_lp = inputs.last(&Self::LP_NEW).copied();

        match self.state {
            State::WaitNewLp => {
                if let Some(lp) = new_lp {
                    self.landing_point = lp;
                    self.state = State::NotifyUpdate;
                }
            }
            State::UpdateLp => {
                if let Some(lp) = new_lp {
                    self.landing_point = lp;
                    self.upd_time = self.upd_time - elapsed;
                    if self.upd_time <= Time::zero() {
                        self.upd_time = Time::zero();
                    }
                    self.state = State::NotifyUpdate;
                }
            }
            State::LpRepo => {
                if let Some(lp) = new_lp {
                    self.landing_point = lp;
                    self.state = State::NewLpRepo;
                } else if inputs.has(&Self::LP_CRIT_MET) {
                    self.state = State::RequestLand;
                }
            }
            State::HandoverCtrl => {
                if inputs.has(&Self::CONTROL_YIELDED) {
                    self.state = State::PilotControl;
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
        let lp = &self.landing_point;
        let ft_to_m = self.conversions.ft_to_meters;

        match self.state {
            State::NotifyUpdate => {
                if self.last_lp == 0 {
                    bag.push(
                        &Self::UPDATE_GCS,
                        GcsUpdate::alert(format!(
                            "LP found. Holding for {}s",
                            self.upd_time.seconds() as i64
                        )),
                    );
                }

                if lp.id != self.last_lp {
                    bag.push(
                        &Self::UPDATE_BOSS,
                        BossMissionUpdate::landing_point(
                            lp.id,
                            lp.lat,
                            lp.lon,
                            self.mission_number,
                            lp.mission_item_no,
                            lp.alt * ft_to_m,
                            lp.hdg,
                            0.0,
                            "LP UPD",
                        ),
                    );
                }
            }
            State::RequestLand => bag.push(&Self::LAND, *lp),
            State::LpRepo => {
                bag.push(
                    &Self::UPDATE_BOSS,
                    BossMissionUpdate::mission_status(self.mission_number, lp.alt * ft_to_m, "LZ SCAN"),
                );
                bag.push(
                    &Self::UPDATE_GCS,
                    GcsUpdate::alert("Repo timer expired, hovering over the last LP"),
                );
                bag.push(&Self::CANCEL_HOVER, true);
                bag.push(&Self::PILOT_HANDOVER, *lp);
            }
            State::NewLpRepo => bag.push(&Self::REQUEST_REPOSITION, *lp),
            _ => {}
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}
