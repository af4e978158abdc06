use std::sync::{Arc, Mutex};

use devs::utils::capacity::Capacity;
use flume::TrySendError;
use log::debug;
use thiserror::Error;

use crate::messages::AircraftTelemetry;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error("Telemetry hub lock poisoned")]
    Poisoned,
}

/// Sending side of one feed. The hub keeps a receiver too, so a full feed
/// can give up its oldest sample.
struct FeedSender {
    tx: flume::Sender<AircraftTelemetry>,
    evict: flume::Receiver<AircraftTelemetry>,
}

impl FeedSender {
    /// False once the feed itself was dropped.
    fn send(&self, sample: AircraftTelemetry) -> bool {
        if self.evict.receiver_count() < 2 {
            return false;
        }

        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(sample)) => {
                debug!("Telemetry feed is full, dropping oldest sample");
                let _ = self.evict.try_recv();
                !matches!(self.tx.try_send(sample), Err(TrySendError::Disconnected(_)))
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Fans out telemetry samples from the FCC link to every subscribed feed.
#[derive(Clone, Default)]
pub struct TelemetryHub {
    subscribers: Arc<Mutex<Vec<FeedSender>>>,
}

impl TelemetryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `sample` to every live feed. Feeds that were dropped are
    /// forgotten. A full feed drops its oldest sample, so the newest one is
    /// always delivered.
    pub fn publish(&self, sample: AircraftTelemetry) -> Result<(), TelemetryError> {
        let mut subscribers = self
            .subscribers
            .lock()
            .map_err(|_| TelemetryError::Poisoned)?;

        subscribers.retain(|feed| feed.send(sample));

        Ok(())
    }

    pub fn subscribe(&self, capacity: Capacity) -> Result<TelemetryFeed, TelemetryError> {
        let (tx, rx) = capacity.channel();

        self.subscribers
            .lock()
            .map_err(|_| TelemetryError::Poisoned)?
            .push(FeedSender {
                tx,
                evict: rx.clone(),
            });

        Ok(TelemetryFeed {
            receiver: rx,
            latest: None,
        })
    }

    pub fn num_subscribers(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Receiving end of a [`TelemetryHub`] subscription. Remembers the newest
/// sample, so polling it never blocks.
pub struct TelemetryFeed {
    receiver: flume::Receiver<AircraftTelemetry>,
    latest: Option<AircraftTelemetry>,
}

impl TelemetryFeed {
    /// Newest sample received so far, if any.
    pub fn latest(&mut self) -> Option<AircraftTelemetry> {
        if let Some(sample) = self.receiver.try_iter().last() {
            self.latest = Some(sample);
        }

        self.latest
    }

    pub fn is_connected(&self) -> bool {
        !self.receiver.is_disconnected()
    }
}
