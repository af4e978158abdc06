use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

/// Mode advertised to the FCC in the supervisor status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMode {
    LandingRequested,
    TakeoffRequested,
    TrajectoryControl,
    DaaControl,
    MavCommand,
}

impl ControlMode {
    pub fn bit(&self) -> u32 {
        match self {
            ControlMode::LandingRequested => 1 << 1,
            ControlMode::TakeoffRequested => 1 << 2,
            ControlMode::TrajectoryControl => 1 << 3,
            ControlMode::DaaControl => 1 << 4,
            ControlMode::MavCommand => 1 << 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum MavCommand {
    DoChangeSpeed = 178,
    DoReposition = 192,
    DoOrbit = 34,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OrbitYawBehaviour {
    HoldFrontToCircleCenter = 0,
    HoldInitialHeading = 1,
    Uncontrolled = 2,
    HoldFrontTangentToCircle = 3,
    RcControlled = 4,
}

/// Command sent to the flight control computer.
///
/// Latitude and longitude are degrees scaled by 1e7, altitude is meters MSL.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FccCommand {
    pub gps_time: f64,
    pub supervisor_status: u32,
    pub command: u16,
    pub param1: f32,
    pub param2: f32,
    pub param3: f32,
    pub param4: f32,
    pub latitude: i32,
    pub longitude: i32,
    pub altitude_msl: f32,
}

/// Bit 0 of the status word: the supervisor is ready to operate.
const SUPERVISOR_READY: u32 = 1;

impl FccCommand {
    pub fn set_supervisor_status(&mut self, mode: ControlMode) {
        self.supervisor_status = SUPERVISOR_READY | mode.bit();
    }

    pub fn has_mode(&self, mode: ControlMode) -> bool {
        self.supervisor_status & mode.bit() != 0
    }

    /// Horizontal speed change, in m/s.
    pub fn change_velocity(velocity: f32, gps_time: f64) -> Self {
        let mut cmd = FccCommand {
            gps_time,
            command: MavCommand::DoChangeSpeed as u16,
            param1: 0.0,
            param2: velocity,
            param4: -f32::NAN,
            ..Default::default()
        };
        cmd.set_supervisor_status(ControlMode::MavCommand);
        cmd
    }

    pub fn reposition(gps_time: f64, lat: i32, lon: i32, alt_msl: f32) -> Self {
        let mut cmd = FccCommand {
            gps_time,
            command: MavCommand::DoReposition as u16,
            param4: -f32::NAN,
            latitude: lat,
            longitude: lon,
            altitude_msl: alt_msl,
            ..Default::default()
        };
        cmd.set_supervisor_status(ControlMode::MavCommand);
        cmd
    }

    pub fn orbit(
        gps_time: f64,
        lat: i32,
        lon: i32,
        alt_msl: f32,
        radius: f32,
        velocity: f32,
        behaviour: OrbitYawBehaviour,
    ) -> Self {
        let mut cmd = FccCommand {
            gps_time,
            command: MavCommand::DoOrbit as u16,
            param1: radius,
            param2: velocity,
            param3: behaviour as u8 as f32,
            param4: 0.0,
            latitude: lat,
            longitude: lon,
            altitude_msl: alt_msl,
            ..Default::default()
        };
        cmd.set_supervisor_status(ControlMode::MavCommand);
        cmd
    }

    /// Hands the landing over to the FCC.
    pub fn land() -> Self {
        let mut cmd = FccCommand::default();
        cmd.set_supervisor_status(ControlMode::LandingRequested);
        cmd
    }
}

/// Degrees to the 1e7 scaled integer representation used by the FCC.
pub fn scale_deg(deg: f64) -> i32 {
    (deg * 1e7) as i32
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_status_bits() {
        let mut cmd = FccCommand::default();

        cmd.set_supervisor_status(ControlMode::LandingRequested);
        assert_eq!(cmd.supervisor_status, 0b11);

        cmd.set_supervisor_status(ControlMode::MavCommand);
        assert_eq!(cmd.supervisor_status, 0b10_0001);
        assert!(cmd.has_mode(ControlMode::MavCommand));
        assert!(!cmd.has_mode(ControlMode::LandingRequested));
    }

    #[test]
    fn test_change_velocity() {
        let cmd = FccCommand::change_velocity(4.5, 12.0);

        assert_eq!(cmd.command, 178);
        assert_eq!(cmd.param2, 4.5);
        assert!(cmd.param4.is_nan());
        assert_eq!(cmd.latitude, 0);
        assert_eq!(cmd.gps_time, 12.0);
    }

    #[test]
    fn test_orbit() {
        let cmd = FccCommand::orbit(
            1.0,
            scale_deg(45.5),
            scale_deg(-75.25),
            100.0,
            30.0,
            1.0,
            OrbitYawBehaviour::HoldFrontTangentToCircle,
        );

        assert_eq!(cmd.command, 34);
        assert_eq!(cmd.param3, 3.0);
        assert_eq!(cmd.param4, 0.0);
        assert_eq!(cmd.latitude, 455_000_000);
        assert_eq!(cmd.longitude, -752_500_000);
    }
}
