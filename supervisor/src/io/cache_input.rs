use devs::{
    Time,
    modeling::{Atomic, Bag, InPort, OutPort, PortInfo},
};
use strum::AsRefStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Idle,
    Send,
}

/// Remembers the last message received on `new_input` and emits it every time
/// something arrives on `get_input`.
pub struct CacheInput<T> {
    state: State,
    cached: T,
}

impl<T: Clone + Send + 'static> CacheInput<T> {
    pub const NEW_INPUT: InPort<T> = InPort::new("new_input");
    pub const GET_INPUT: InPort<bool> = InPort::new("get_input");

    pub const CACHED_INPUT: OutPort<T> = OutPort::new("cached_input");

    /// `initial` is emitted until the first message is cached.
    pub fn new(initial: T) -> Self {
        CacheInput {
            state: State::Idle,
            cached: initial,
        }
    }

    pub fn current_state(&self) -> State {
        self.state
    }
}

impl<T: Clone + Send + 'static> Atomic for CacheInput<T> {
    fn input_ports(&self) -> Vec<PortInfo> {
        vec![Self::NEW_INPUT.info(), Self::GET_INPUT.info()]
    }

    fn output_ports(&self) -> Vec<PortInfo> {
        vec![Self::CACHED_INPUT.info()]
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
        if self.state != State::Idle {
            return;
        }

        if let Some(value) = inputs.last(&Self::NEW_INPUT) {
            self.cached = value.clone();
        }

        if inputs.has(&Self::GET_INPUT) {
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
            bag.push(&Self::CACHED_INPUT, self.cached.clone());
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

    type Cache = CacheInput<u8>;

    #[test]
    fn test_default_before_first_input() {
        let mut m = Cache::new(7);

        m.external_transition(Time::zero(), &Bag::new().with(&Cache::GET_INPUT, true));
        assert_eq!(m.current_state(), State::Send);
        assert_eq!(m.time_advance(), Time::zero());
        assert_eq!(m.output().messages(&Cache::CACHED_INPUT), &[7]);

        m.internal_transition();
        assert_eq!(m.current_state(), State::Idle);
        assert!(m.time_advance().is_infinity());
    }

    #[test]
    fn test_last_input_is_cached() {
        let mut m = Cache::new(0);

        let inputs = Bag::new().with(&Cache::NEW_INPUT, 1).with(&Cache::NEW_INPUT, 2);
        m.external_transition(Time::zero(), &inputs);
        assert_eq!(m.current_state(), State::Idle);

        m.external_transition(Time::from_millis(50), &Bag::new().with(&Cache::GET_INPUT, true));
        assert_eq!(m.output().messages(&Cache::CACHED_INPUT), &[2]);
    }

    #[test]
    fn test_input_and_get_in_same_instant() {
        let mut m = Cache::new(0);

        let inputs = Bag::new()
            .with(&Cache::NEW_INPUT, 9)
            .with(&Cache::GET_INPUT, true);
        m.external_transition(Time::zero(), &inputs);
        assert_eq!(m.output().messages(&Cache::CACHED_INPUT), &[9]);
    }

    #[test]
    fn test_confluent_sends_then_caches() {
        let mut m = Cache::new(1);
        m.external_transition(Time::zero(), &Bag::new().with(&Cache::GET_INPUT, true));

        m.confluent_transition(Time::zero(), &Bag::new().with(&Cache::NEW_INPUT, 4));
        assert_eq!(m.current_state(), State::Idle);

        m.external_transition(Time::zero(), &Bag::new().with(&Cache::GET_INPUT, true));
        assert_eq!(m.output().messages(&Cache::CACHED_INPUT), &[4]);
    }
}
