use flume::RecvTimeoutError;
use log::info;

use super::simulator::Simulator;
use crate::{
    error::Error,
    io::{Event, InputHandle, OutputSink, StopHandle, Subscriber},
    modeling::{InPort, OutPort},
    time::{Clock, SystemClock, Time},
    utils::capacity::Capacity,
};

/// Runs a [`Simulator`] against wall clock time.
///
/// Inputs from other threads are queued on a single channel and delivered at
/// the wall clock time they are received. Between events the runner blocks on
/// that channel until the next scheduled internal event, or indefinitely if
/// every model is passive.
pub struct RealTimeRunner<C: Clock = SystemClock> {
    simulator: Simulator,
    clock: C,
    events_tx: flume::Sender<Event>,
    events_rx: flume::Receiver<Event>,
    sinks: Vec<Box<dyn OutputSink>>,
    stop: StopHandle,
}

impl RealTimeRunner<SystemClock> {
    pub fn new(simulator: Simulator) -> Self {
        RealTimeRunner::with_clock(simulator, SystemClock::default())
    }
}

impl<C: Clock> RealTimeRunner<C> {
    pub fn with_clock(simulator: Simulator, clock: C) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        let stop = StopHandle::new(events_tx.clone());

        RealTimeRunner {
            simulator,
            clock,
            events_tx,
            events_rx,
            sinks: vec![],
            stop,
        }
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Handle to send messages to the root input `port`.
    pub fn input<T: Clone + Send + 'static>(
        &self,
        port: &InPort<T>,
    ) -> Result<InputHandle<T>, Error> {
        self.simulator.check_root_port(&port.info())?;
        Ok(InputHandle::new(port.info().name, self.events_tx.clone()))
    }

    /// Receiver for every message emitted on the root output `port`.
    pub fn subscribe<T: Clone + Send + 'static>(
        &mut self,
        port: &OutPort<T>,
        capacity: Capacity,
    ) -> Result<flume::Receiver<T>, Error> {
        self.simulator.check_root_port(&port.info())?;

        let (sender, receiver) = capacity.channel();
        self.sinks.push(Box::new(Subscriber {
            port: *port,
            sender,
        }));

        Ok(receiver)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    fn now(&self) -> Time {
        Time::Finite(self.clock.monotonic())
    }

    fn accept(&mut self, event: Event, now: Time) {
        match event {
            Event::Input { port, values } => self.simulator.schedule_erased(now, port, values),
            Event::Wake => {}
        }
    }

    /// Blocks until stopped or until `limit` of simulated time has elapsed.
    pub fn run(&mut self, limit: Option<Time>) -> Result<(), Error> {
        let limit = limit.unwrap_or(Time::Infinity);
        info!("Real-time runner started, limit: {}", limit);

        loop {
            if self.stop.is_stopped() {
                info!("Stop requested at {}", self.simulator.time());
                break;
            }

            let now = self.now();
            if now >= limit {
                info!("Time limit reached");
                break;
            }

            let events: Vec<Event> = self.events_rx.try_iter().collect();
            for event in events {
                self.accept(event, now);
            }

            while self.simulator.next_event_time() <= now {
                let Some(bag) = self.simulator.step() else {
                    break;
                };

                if !bag.is_empty() {
                    self.sinks.retain(|sink| sink.publish(&bag));
                }
            }

            let deadline = self.simulator.next_event_time().min(limit);
            let event = match deadline.delta() {
                Some(deadline) => {
                    let wait = (deadline - self.clock.monotonic())
                        .to_std()
                        .unwrap_or_default();

                    match self.events_rx.recv_timeout(wait) {
                        Ok(event) => Some(event),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => return Err(Error::ClosedChannel),
                    }
                }
                None => Some(self.events_rx.recv().map_err(|_| Error::ClosedChannel)?),
            };

            if let Some(event) = event {
                let now = self.now();
                self.accept(event, now);
            }
        }

        Ok(())
    }
}
