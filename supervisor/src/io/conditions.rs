//! [`Condition`] strategies for [`PollingConditionInput`](super::PollingConditionInput).

use super::{polling_condition_input::Condition, telemetry::TelemetryFeed};

/// Holds on the `n`th poll, and on every poll after it.
#[derive(Debug, Clone)]
pub struct CountdownCondition {
    remaining: usize,
}

impl CountdownCondition {
    pub fn new(n: usize) -> Self {
        CountdownCondition { remaining: n }
    }
}

impl Condition for CountdownCondition {
    fn check_condition(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }

    fn name(&self) -> &str {
        "countdown"
    }
}

/// Holds once the aircraft is below the landed height.
pub struct LandingAchieved {
    feed: TelemetryFeed,
    landed_agl_ft: f64,
}

impl LandingAchieved {
    pub fn new(feed: TelemetryFeed, landed_agl_ft: f64) -> Self {
        LandingAchieved {
            feed,
            landed_agl_ft,
        }
    }
}

impl Condition for LandingAchieved {
    fn setup(&mut self) -> bool {
        self.feed.is_connected()
    }

    fn check_condition(&mut self) -> bool {
        self.feed
            .latest()
            .is_some_and(|sample| sample.state.alt_agl < self.landed_agl_ft)
    }

    fn name(&self) -> &str {
        "landing_achieved"
    }
}

/// Holds once the FCC no longer accepts supervisor commands.
pub struct PilotTakeover {
    feed: TelemetryFeed,
}

impl PilotTakeover {
    pub fn new(feed: TelemetryFeed) -> Self {
        PilotTakeover { feed }
    }
}

impl Condition for PilotTakeover {
    fn setup(&mut self) -> bool {
        self.feed.is_connected()
    }

    fn check_condition(&mut self) -> bool {
        self.feed.latest().is_some_and(|sample| !sample.fcc_engaged())
    }

    fn name(&self) -> &str {
        "pilot_takeover"
    }
}
