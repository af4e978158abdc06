use serde::{Deserialize, Serialize};

/// Aircraft position and motion as reported by the flight control computer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AircraftState {
    pub gps_time: f64,
    /// Decimal degrees
    pub lat: f64,
    /// Decimal degrees
    pub lon: f64,
    /// Feet above ground level
    pub alt_agl: f64,
    /// Feet above mean sea level
    pub alt_msl: f64,
    /// True heading, degrees
    pub hdg_deg: f64,
    /// Horizontal velocity, knots
    pub vel_kts: f64,
}

/// A telemetry sample: aircraft state plus the FCC status word.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AircraftTelemetry {
    pub state: AircraftState,
    pub fcc_status: u32,
}

impl AircraftTelemetry {
    /// Bits 0 and 1 of the FCC status are set while the FCC accepts
    /// supervisor commands.
    pub const FCC_ENGAGED_MASK: u32 = 0b11;

    pub fn fcc_engaged(&self) -> bool {
        self.fcc_status & Self::FCC_ENGAGED_MASK == Self::FCC_ENGAGED_MASK
    }
}
