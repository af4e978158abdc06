use devs::{
    Error,
    modeling::{Coupled, CoupledBuilder, InPort, OutPort},
};

use crate::{messages::FccCommand, models::HandleWaypoint};

/// On route phase: waypoints met along the mission are forwarded to the FCC.
pub struct OnRoute;

impl OnRoute {
    pub const NAME: &'static str = "on_route";

    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");
    pub const WAYPOINT: InPort<FccCommand> = InPort::new("waypoint");

    pub const FCC_WAYPOINT_UPDATE: OutPort<FccCommand> = OutPort::new("fcc_waypoint_update");

    pub fn build() -> Result<Coupled, Error> {
        const HW: &str = "handle_waypoint";

        let mut b = CoupledBuilder::new(Self::NAME);
        b.input(Self::PILOT_TAKEOVER)
            .input(Self::START_MISSION)
            .input(Self::WAYPOINT)
            .output(Self::FCC_WAYPOINT_UPDATE)
            .add_atomic(HW, HandleWaypoint::new());

        b.eic(Self::PILOT_TAKEOVER, HW, HandleWaypoint::PILOT_TAKEOVER)
            .eic(Self::START_MISSION, HW, HandleWaypoint::START_MISSION)
            .eic(Self::WAYPOINT, HW, HandleWaypoint::WAYPOINT)
            .eoc(HW, HandleWaypoint::FCC_WAYPOINT_UPDATE, Self::FCC_WAYPOINT_UPDATE);

        b.build()
    }
}

#[cfg(test)]
mod tests {
    use devs::{Time, simulation::Simulator};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::messages::ControlMode;

    #[test]
    fn test_waypoints_forwarded_after_start() -> anyhow::Result<()> {
        let mut sim = Simulator::new(OnRoute::NAME, OnRoute::build()?.into());

        let waypoint = FccCommand {
            latitude: 453_000_000,
            ..Default::default()
        };

        // Ignored before the mission starts
        sim.inject(&OnRoute::WAYPOINT, waypoint)?;
        assert!(sim.run_until_passive(10)?.is_empty());

        sim.schedule(Time::from_millis(10), &OnRoute::START_MISSION, 1)?;
        sim.schedule(Time::from_millis(20), &OnRoute::WAYPOINT, waypoint)?;
        let outputs = sim.run_until_passive(10)?;

        assert_eq!(outputs.len(), 1);
        let sent = outputs[0].1.messages(&OnRoute::FCC_WAYPOINT_UPDATE);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].latitude, 453_000_000);
        assert!(sent[0].has_mode(ControlMode::MavCommand));
        assert_eq!(
            sim.state_of("on_route.handle_waypoint").as_deref(),
            Some("WAIT_FOR_WAYPOINT")
        );

        sim.inject(&OnRoute::PILOT_TAKEOVER, true)?;
        sim.run_until_passive(10)?;
        assert_eq!(
            sim.state_of("on_route.handle_waypoint").as_deref(),
            Some("PILOT_TAKEOVER")
        );

        Ok(())
    }
}
