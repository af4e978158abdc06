use std::{
    any::{Any, type_name},
    collections::BTreeMap,
    fmt::{self, Debug},
};

use super::port::Port;

/// Type erased, ordered sequence of messages on a single port.
pub(crate) trait Messages: Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_boxed(&self) -> Box<dyn Messages>;

    /// Appends these messages to `other`. Returns false if the two sequences
    /// carry different types.
    fn append_to(&self, other: &mut dyn Messages) -> bool;

    fn len(&self) -> usize;
    fn type_name(&self) -> &'static str;
}

impl<T: Clone + Send + 'static> Messages for Vec<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn Messages> {
        Box::new(self.clone())
    }

    fn append_to(&self, other: &mut dyn Messages) -> bool {
        match other.as_any_mut().downcast_mut::<Vec<T>>() {
            Some(other) => {
                other.extend_from_slice(self);
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }
}

/// The messages present on each port of a model during one simulated instant.
/// The last element on a port is the most recent one.
#[derive(Default)]
pub struct Bag {
    ports: BTreeMap<&'static str, Box<dyn Messages>>,
}

impl Bag {
    pub fn new() -> Bag {
        Bag::default()
    }

    pub fn push<T: Clone + Send + 'static>(&mut self, port: &impl Port<T>, value: T) {
        let entry = self
            .ports
            .entry(port.name())
            .or_insert_with(|| Box::new(Vec::<T>::new()));

        match entry.as_any_mut().downcast_mut::<Vec<T>>() {
            Some(values) => values.push(value),
            None => log::error!(
                "Dropping message of type '{}' on port '{}' holding '{}'",
                type_name::<T>(),
                port.name(),
                entry.type_name()
            ),
        }
    }

    /// Builder style [`Bag::push`].
    pub fn with<T: Clone + Send + 'static>(mut self, port: &impl Port<T>, value: T) -> Bag {
        self.push(port, value);
        self
    }

    /// All messages on `port`, oldest first. Empty if nothing arrived or the
    /// stored messages are of a different type.
    pub fn messages<T: 'static>(&self, port: &impl Port<T>) -> &[T] {
        self.ports
            .get(port.name())
            .and_then(|v| v.as_any().downcast_ref::<Vec<T>>())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn first<T: 'static>(&self, port: &impl Port<T>) -> Option<&T> {
        self.messages(port).first()
    }

    pub fn last<T: 'static>(&self, port: &impl Port<T>) -> Option<&T> {
        self.messages(port).last()
    }

    pub fn has<T: 'static>(&self, port: &impl Port<T>) -> bool {
        !self.messages(port).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.values().all(|v| v.len() == 0)
    }

    pub fn port_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ports.keys().copied()
    }

    pub(crate) fn erased(&self, name: &str) -> Option<&dyn Messages> {
        self.ports.get(name).map(|v| v.as_ref())
    }

    pub(crate) fn iter_erased(&self) -> impl Iterator<Item = (&'static str, &dyn Messages)> {
        self.ports.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    /// Appends type erased messages to `name`, keeping arrival order.
    pub(crate) fn append_erased(&mut self, name: &'static str, values: &dyn Messages) {
        match self.ports.get_mut(name) {
            Some(existing) => {
                if !values.append_to(existing.as_mut()) {
                    log::error!(
                        "Dropping messages of type '{}' on port '{}' holding '{}'",
                        values.type_name(),
                        name,
                        existing.type_name()
                    );
                }
            }
            None => {
                self.ports.insert(name, values.clone_boxed());
            }
        }
    }
}

impl Clone for Bag {
    fn clone(&self) -> Self {
        Bag {
            ports: self
                .ports
                .iter()
                .map(|(k, v)| (*k, v.clone_boxed()))
                .collect(),
        }
    }
}

impl Debug for Bag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.ports
                    .iter()
                    .map(|(k, v)| (k, format!("{} x {}", v.len(), v.type_name()))),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::modeling::{InPort, OutPort};

    const COUNT: InPort<i32> = InPort::new("count");
    const COUNT_AS_FLOAT: InPort<f64> = InPort::new("count");
    const FLAG: OutPort<bool> = OutPort::new("flag");

    #[test]
    fn test_push_and_read() {
        let mut bag = Bag::new();
        assert!(bag.is_empty());

        bag.push(&COUNT, 1);
        bag.push(&COUNT, 2);
        bag.push(&FLAG, true);

        assert_eq!(bag.messages(&COUNT), &[1, 2]);
        assert_eq!(bag.first(&COUNT), Some(&1));
        assert_eq!(bag.last(&COUNT), Some(&2));
        assert_eq!(bag.last(&FLAG), Some(&true));
        assert!(!bag.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_empty() {
        let bag = Bag::new().with(&COUNT, 7);

        assert!(bag.messages(&COUNT_AS_FLOAT).is_empty());
        assert!(!bag.has(&COUNT_AS_FLOAT));
        assert!(bag.has(&COUNT));
    }

    #[test]
    fn test_append_erased_keeps_order() {
        let src = Bag::new().with(&COUNT, 3).with(&COUNT, 4);
        let mut dst = Bag::new().with(&COUNT, 1);

        for (name, values) in src.iter_erased() {
            dst.append_erased(name, values);
        }

        assert_eq!(dst.messages(&COUNT), &[1, 3, 4]);
    }

    #[test]
    fn test_append_erased_drops_mismatch() {
        let src = Bag::new().with(&COUNT_AS_FLOAT, 2.5);
        let mut dst = Bag::new().with(&COUNT, 1);

        for (name, values) in src.iter_erased() {
            dst.append_erased(name, values);
        }

        assert_eq!(dst.messages(&COUNT), &[1]);
    }

    #[test]
    fn test_clone() {
        let bag = Bag::new().with(&FLAG, false);
        let copy = bag.clone();

        assert_eq!(copy.messages(&FLAG), &[false]);
    }
}
