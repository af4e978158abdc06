use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::info;
use strum::AsRefStr;

use crate::{
    messages::{HoverCriteria, LandingPoint},
    parameters::{LandCriteria, SupervisorParams},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    MissionStarted,
    Hover,
    Stabilizing,
    NotifyPilot,
    WaitForPilot,
    YieldControl,
    PilotControl,
}

/// Hovers over the handover point, tells the pilot the aircraft is ready and
/// yields control once the pilot takes over.
pub struct HandoverControl {
    state: State,
    handover_point: LandingPoint,
    land_criteria: LandCriteria,
}

impl HandoverControl {
    pub const HOVER_CRITERIA_MET: InPort<bool> = InPort::new("hover_criteria_met");
    pub const PILOT_HANDOVER: InPort<LandingPoint> = InPort::new("pilot_handover");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const CONTROL_YIELDED: OutPort<bool> = OutPort::new("control_yielded");
    pub const NOTIFY_PILOT: OutPort<bool> = OutPort::new("notify_pilot");
    pub const STABILIZE: OutPort<HoverCriteria> = OutPort::new("stabilize");

    pub fn new(params: &SupervisorParams) -> Self {
        HandoverControl {
            state: State::Idle,
            handover_point: LandingPoint::default(),
            land_criteria: params.land_criteria,
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

impl Atomic for HandoverControl {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::HOVER_CRITERIA_MET.info(),
            Self::PILOT_HANDOVER.info(),
            Self::PILOT_TAKEOVER.info(),
            Self::START_MISSION.info(),
        ]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![
            Self::CONTROL_YIELDED.info(),
            Self::NOTIFY_PILOT.info(),
            Self::STABILIZE.info(),
        ]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Hover | State::NotifyPilot | State::YieldControl => Time::zero(),
            State::Idle
            | State::MissionStarted
            | State::Stabilizing
            | State::WaitForPilot
            | State::PilotControl => Time::infinity(),
        }
    }

    fn internal_transition(&mut self) {
        self.state = match self.state {
            State::Hover => State::Stabilizing,
            State::NotifyPilot => State::WaitForPilot,
            State::YieldControl => State::PilotControl,
            other => other,
        };
    }

    fn external_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        let takeover = inputs.has(&Self::PILOT_TAKEOVER);

        if takeover && self.state != State::WaitForPilot {
            self.state = State::PilotControl;
            return;
        }

        if inputs.has(&Self::START_MISSION) {
            self.state = State::MissionStarted;
            return;
        }

        match self.state {
            State::MissionStarted => {
                if let Some(lp) = inputs.last(&Self::PILOT_HANDOVER) {
                    self.handover_point = *lp;
                    self.state = State::Hover;
                }
            }
            State::Stabilizing => {
                if inputs.has(&Self::HOVER_CRITERIA_MET) {
                    self.state = State::NotifyPilot;
                }
            }
            State::WaitForPilot => {
                if takeover {
                    info!("Pilot accepted control");
                    self.state = State::YieldControl;
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
            State::Hover => {
                let lp = &self.handover_point;
                bag.push(
                    &Self::STABILIZE,
                    HoverCriteria::new(lp.lat, lp.lon, lp.alt, f64::NAN, &self.land_criteria, 0.0),
                );
            }
            State::NotifyPilot => bag.push(&Self::NOTIFY_PILOT, true),
            State::YieldControl => bag.push(&Self::CONTROL_YIELDED, true),
            _ => {}
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn started() -> HandoverControl {
        HandoverControl::new(&SupervisorParams::default()).with_state(State::MissionStarted)
    }

    fn handover_point() -> LandingPoint {
        LandingPoint {
            id: 0,
            lat: 45.1,
            lon: -75.2,
            alt: 250.0,
            hdg: 45.0,
            mission_item_no: 2,
        }
    }

    #[test]
    fn test_handover_sequence() {
        let mut m = started();

        m.external_transition(
            Time::zero(),
            &Bag::new().with(&HandoverControl::PILOT_HANDOVER, handover_point()),
        );
        assert_eq!(m.current_state(), State::Hover);

        let out = m.output();
        let hover = out.messages(&HandoverControl::STABILIZE);
        assert_eq!(hover.len(), 1);
        assert_eq!(hover[0].desired_lat, 45.1);
        assert_eq!(hover[0].desired_alt_msl, 250.0);
        assert!(hover[0].desired_hdg_deg.is_nan());
        assert_eq!(hover[0].time_crit_first_met, 0.0);

        m.internal_transition();
        assert_eq!(m.current_state(), State::Stabilizing);
        assert!(m.time_advance().is_infinity());

        m.external_transition(
            Time::from_millis(3000),
            &Bag::new().with(&HandoverControl::HOVER_CRITERIA_MET, true),
        );
        assert_eq!(m.current_state(), State::NotifyPilot);
        assert_eq!(m.output().messages(&HandoverControl::NOTIFY_PILOT), &[true]);

        m.internal_transition();
        assert_eq!(m.current_state(), State::WaitForPilot);

        m.external_transition(
            Time::from_millis(1000),
            &Bag::new().with(&HandoverControl::PILOT_TAKEOVER, true),
        );
        assert_eq!(m.current_state(), State::YieldControl);
        assert_eq!(
            m.output().messages(&HandoverControl::CONTROL_YIELDED),
            &[true]
        );

        m.internal_transition();
        assert_eq!(m.current_state(), State::PilotControl);
    }

    #[test]
    fn test_takeover_interrupts() {
        for state in [State::MissionStarted, State::Hover, State::Stabilizing, State::NotifyPilot] {
            let mut m = started().with_state(state);
            m.external_transition(
                Time::zero(),
                &Bag::new().with(&HandoverControl::PILOT_TAKEOVER, true),
            );

            assert_eq!(m.current_state(), State::PilotControl);
        }
    }

    #[test]
    fn test_confluent_takeover_first() {
        // Takeover wins over the pending HOVER -> STABILIZING step
        let mut m = started().with_state(State::Hover);
        m.confluent_transition(
            Time::zero(),
            &Bag::new().with(&HandoverControl::PILOT_TAKEOVER, true),
        );
        assert_eq!(m.current_state(), State::PilotControl);
    }

    #[test]
    fn test_confluent_takeover_while_notifying() {
        // NOTIFY_PILOT takeover short circuits to PILOT_CONTROL, never
        // through YIELD_CONTROL
        let mut m = started().with_state(State::NotifyPilot);
        m.confluent_transition(
            Time::zero(),
            &Bag::new().with(&HandoverControl::PILOT_TAKEOVER, true),
        );
        assert_eq!(m.current_state(), State::PilotControl);

        // In WAIT_FOR_PILOT a takeover is the expected completion
        let mut m = started().with_state(State::WaitForPilot);
        m.external_transition(
            Time::zero(),
            &Bag::new().with(&HandoverControl::PILOT_TAKEOVER, true),
        );
        assert_eq!(m.current_state(), State::YieldControl);
        assert_ne!(m.current_state(), State::PilotControl);
    }

    #[test]
    fn test_confluent_internal_first() {
        let mut m = started().with_state(State::Hover);
        m.confluent_transition(
            Time::zero(),
            &Bag::new().with(&HandoverControl::HOVER_CRITERIA_MET, true),
        );

        assert_eq!(m.current_state(), State::NotifyPilot);
    }

    #[test]
    fn test_start_restarts() {
        let mut m = started().with_state(State::PilotControl);
        m.external_transition(
            Time::zero(),
            &Bag::new().with(&HandoverControl::START_MISSION, 2),
        );

        assert_eq!(m.current_state(), State::MissionStarted);
        assert!(m.output().is_empty());
    }
}
