use std::marker::PhantomData;

use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use log::debug;
use strum::AsRefStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollingError {
    #[error("Setup of polling condition '{0}' failed")]
    SetupFailed(String),
}

/// A boolean condition evaluated at a fixed rate.
pub trait Condition: Send {
    /// Prepares the condition before polling starts. Returns false if the
    /// condition cannot be evaluated.
    fn setup(&mut self) -> bool {
        true
    }

    fn check_condition(&mut self) -> bool;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    Poll,
}

/// Polls a [`Condition`] after a message on `start` and emits a single `true`
/// once it holds. A message on `quit` stops polling.
pub struct PollingConditionInput<S, Q, C> {
    state: State,
    condition_met: bool,
    polling_rate: Time,
    condition: C,
    _ports: PhantomData<fn(S, Q)>,
}

impl<S, Q, C> PollingConditionInput<S, Q, C>
where
    S: Clone + Send + 'static,
    Q: Clone + Send + 'static,
    C: Condition,
{
    pub const START: InPort<S> = InPort::new("start");
    pub const QUIT: InPort<Q> = InPort::new("quit");

    pub const MESSAGE: OutPort<bool> = OutPort::new("message");

    pub fn new(polling_rate: Time, mut condition: C) -> Result<Self, PollingError> {
        if !condition.setup() {
            return Err(PollingError::SetupFailed(condition.name().to_string()));
        }

        Ok(PollingConditionInput {
            state: State::Idle,
            condition_met: false,
            polling_rate,
            condition,
            _ports: PhantomData,
        })
    }

    pub fn current_state(&self) -> State {
        self.state
    }

    pub fn condition_met(&self) -> bool {
        self.condition_met
    }
}

impl<S, Q, C> Atomic for PollingConditionInput<S, Q, C>
where
    S: Clone + Send + 'static,
    Q: Clone + Send + 'static,
    C: Condition,
{
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![Self::QUIT.info(), Self::START.info()]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![Self::MESSAGE.info()]
    }

    fn time_advance(&self) -> Time {
        match self.state {
            State::Idle => Time::infinity(),
            State::Poll if self.condition_met => Time::zero(),
            State::Poll => self.polling_rate,
        }
    }

    fn internal_transition(&mut self) {
        if self.condition_met {
            self.condition_met = false;
            self.state = State::Idle;
        } else if self.state == State::Poll && self.condition.check_condition() {
            debug!("Condition '{}' met", self.condition.name());
            self.condition_met = true;
        }
    }

    fn external_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        if inputs.has(&Self::QUIT) {
            self.condition_met = false;
            self.state = State::Idle;
        } else if inputs.has(&Self::START) {
            self.state = State::Poll;
        }
    }

    fn confluent_transition(&mut self, _elapsed: Time, inputs: &Bag) {
        self.external_transition(Time::zero(), inputs);
        self.internal_transition();
    }

    fn output(&self) -> Bag {
        let mut bag = Bag::new();

        if self.state == State::Poll && self.condition_met {
            bag.push(&Self::MESSAGE, true);
        }

        bag
    }

    fn state(&self) -> String {
        self.state.as_ref().to_string()
    }

    fn state_log(&self) -> String {
        let met = if self.condition_met { "MET" } else { "NOT_MET" };
        format!("State: {}-{}", self.state(), met)
    }
}
