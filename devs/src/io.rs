//! Channel adapters connecting threads outside the simulation to the root
//! ports of a [`RealTimeRunner`](crate::simulation::RealTimeRunner).

use std::{
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use flume::TrySendError;
use log::warn;

use crate::{
    error::Error,
    modeling::{Bag, OutPort, bag::Messages},
};

pub(crate) enum Event {
    Input {
        port: &'static str,
        values: Box<dyn Messages>,
    },
    Wake,
}

/// Sends messages to one root input port of a running simulation.
pub struct InputHandle<T> {
    port: &'static str,
    sender: flume::Sender<Event>,
    _payload: PhantomData<fn(T)>,
}

impl<T: Clone + Send + 'static> InputHandle<T> {
    pub(crate) fn new(port: &'static str, sender: flume::Sender<Event>) -> Self {
        InputHandle {
            port,
            sender,
            _payload: PhantomData,
        }
    }

    pub fn send(&self, value: T) -> Result<(), Error> {
        self.send_all(vec![value])
    }

    /// Sends several messages that arrive in the same instant.
    pub fn send_all(&self, values: Vec<T>) -> Result<(), Error> {
        self.sender
            .send(Event::Input {
                port: self.port,
                values: Box::new(values),
            })
            .map_err(|_| Error::ClosedChannel)
    }

    pub fn port(&self) -> &'static str {
        self.port
    }
}

impl<T> Clone for InputHandle<T> {
    fn clone(&self) -> Self {
        InputHandle {
            port: self.port,
            sender: self.sender.clone(),
            _payload: PhantomData,
        }
    }
}

/// Receives the messages a root output port emits.
pub(crate) trait OutputSink: Send {
    /// Returns false once the receiving side is gone.
    fn publish(&self, bag: &Bag) -> bool;
}

pub(crate) struct Subscriber<T> {
    pub(crate) port: OutPort<T>,
    pub(crate) sender: flume::Sender<T>,
}

impl<T: Clone + Send + 'static> OutputSink for Subscriber<T> {
    fn publish(&self, bag: &Bag) -> bool {
        for value in bag.messages(&self.port) {
            match self.sender.try_send(value.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "Subscriber queue for '{}' is full, dropping message",
                        self.port.info().name
                    );
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
        true
    }
}

/// Requests a running simulation to stop. Cheap to clone and safe to call
/// from a signal handler thread.
#[derive(Clone)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
    wake: flume::Sender<Event>,
}

impl StopHandle {
    pub(crate) fn new(wake: flume::Sender<Event>) -> Self {
        StopHandle {
            flag: Arc::new(AtomicBool::new(false)),
            wake,
        }
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // The runner may be blocked waiting for input
        let _ = self.wake.send(Event::Wake);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
