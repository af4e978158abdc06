use super::{bag::Bag, port::PortInfo};
use crate::time::Time;

/// A P-DEVS atomic model.
///
/// The simulator calls [`Atomic::output`] right before every internal or
/// confluent transition, then exactly one of the three transition functions.
/// `elapsed` is the time since the model last transitioned.
pub trait Atomic: Send {
    fn input_ports(&self) -> Vec<PortInfo>;

    fn output_ports(&self) -> Vec<PortInfo>;

    /// Time until the next internal transition. Must not change until the
    /// next transition.
    fn time_advance(&self) -> Time;

    fn internal_transition(&mut self);

    fn external_transition(&mut self, elapsed: Time, inputs: &Bag);

    /// Called when inputs arrive exactly at the scheduled internal time. Each
    /// model decides the precedence.
    fn confluent_transition(&mut self, elapsed: Time, inputs: &Bag);

    fn output(&self) -> Bag;

    /// Name of the current state.
    fn state(&self) -> String;

    fn state_log(&self) -> String {
        format!("State: {}", self.state())
    }
}

/// Aborts on a state without a time advance rule.
pub fn missing_time_advance(model: &str, state: &str) -> ! {
    panic!("{model}: no time advance defined for State: {state}")
}
