use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::warn;
use strum::AsRefStr;

use super::telemetry::TelemetryFeed;
use crate::messages::AircraftState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    Send,
}

/// Answers aircraft state requests with the newest telemetry sample.
pub struct AircraftStateInput {
    state: State,
    feed: TelemetryFeed,
    snapshot: Option<AircraftState>,
}

impl AircraftStateInput {
    pub const REQUEST: InPort<bool> = InPort::new("request");

    pub const MESSAGE: OutPort<AircraftState> = OutPort::new("message");

    pub fn new(feed: TelemetryFeed) -> Self {
        AircraftStateInput {
            state: State::Idle,
            feed,
            snapshot: None,
        }
    }

    pub fn current_state(&self) -> State {
        self.state
    }
}

impl Atomic for AircraftStateInput {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![Self::REQUEST.info()]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![Self::MESSAGE.info()]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle => Time::infinity(),
            State::Send => Time::zero(),
        }
    }

    fn internal_transition(&mut self) {
        if self.state == State::Send {
            self.state = State::Idle;
        }
    }

    fn external_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::REQUEST) {
            self.snapshot = self.feed.latest().map(|sample| sample.state);
            if self.snapshot.is_none() {
                warn!("Aircraft state requested before any telemetry was received");
            }
            self.state = State::Send;
        }
    }

    fn confluent_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        self.internal_transition();
        self.external_transition(Time::zero(), inputs);
    }

    fn output(&self) -> Bag {
        let mut bag = Bag::new();

        if self.state == State::Send {
            if let Some(aircraft) = self.snapshot {
                bag.push(&Self::MESSAGE, aircraft);
            }
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }
}

#[cfg(test)]
mod tests {
    use devs::utils::capacity::Capacity;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        io::telemetry::{TelemetryError, TelemetryHub},
        messages::AircraftTelemetry,
    };

    fn telemetry(alt_msl: f64) -> AircraftTelemetry {
        AircraftTelemetry {
            state: AircraftState {
                alt_msl,
                ..Default::default()
            },
            fcc_status: 0b11,
        }
    }

    #[test]
    fn test_newest_sample_on_request() -> Result<(), TelemetryError> {
        let hub = TelemetryHub::new();
        let mut m = AircraftStateInput::new(hub.subscribe(Capacity::Unbounded)?);

        hub.publish(telemetry(100.0))?;
        hub.publish(telemetry(101.0))?;

        m.external_transition(Time::zero(), &Bag::new().with(&AircraftStateInput::REQUEST, true));
        assert_eq!(m.current_state(), State::Send);

        // Sampled at request time
        hub.publish(telemetry(102.0))?;

        let out = m.output();
        let sent = out.messages(&AircraftStateInput::MESSAGE);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].alt_msl, 101.0);

        m.internal_transition();
        assert_eq!(m.current_state(), State::Idle);

        Ok(())
    }

    #[test]
    fn test_no_telemetry_yet() -> Result<(), TelemetryError> {
        let hub = TelemetryHub::new();
        let mut m = AircraftStateInput::new(hub.subscribe(Capacity::Unbounded)?);

        m.external_transition(Time::zero(), &Bag::new().with(&AircraftStateInput::REQUEST, true));
        assert_eq!(m.current_state(), State::Send);
        assert!(m.output().is_empty());

        m.internal_transition();
        assert!(m.time_advance().is_infinity());

        Ok(())
    }
}
