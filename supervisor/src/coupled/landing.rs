use devs::{
    Error,
    modeling::{Coupled, CoupledBuilder, InPort, OutPort},
};

use super::LpReposition;
use crate::{
    geo::SharedDistance,
    messages::{AircraftState, BossMissionUpdate, FccCommand, GcsUpdate, LandingPoint},
    models::{HandoverControl, LpManager, Stabilize},
    parameters::SupervisorParams,
};

/// Landing phase: from the first planned or perceived landing point down to
/// touchdown, or to the pilot taking control.
pub struct Landing;

impl Landing {
    pub const NAME: &'static str = "landing";

    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const LANDING_ACHIEVED: InPort<bool> = InPort::new("landing_achieved");
    pub const LP_RECV: InPort<LandingPoint> = InPort::new("lp_recv");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const PLP_ACH: InPort<LandingPoint> = InPort::new("plp_ach");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const CONTROL_YIELDED: OutPort<bool> = OutPort::new("control_yielded");
    pub const FCC_COMMAND_HOVER: OutPort<FccCommand> = OutPort::new("fcc_command_hover");
    pub const FCC_COMMAND_LAND: OutPort<FccCommand> = OutPort::new("fcc_command_land");
    pub const FCC_COMMAND_ORBIT: OutPort<FccCommand> = OutPort::new("fcc_command_orbit");
    pub const FCC_COMMAND_VELOCITY: OutPort<FccCommand> = OutPort::new("fcc_command_velocity");
    pub const LP_EXPIRED: OutPort<LandingPoint> = OutPort::new("lp_expired");
    pub const LP_NEW: OutPort<LandingPoint> = OutPort::new("lp_new");
    pub const MISSION_COMPLETE: OutPort<bool> = OutPort::new("mission_complete");
    pub const NOTIFY_PILOT: OutPort<bool> = OutPort::new("notify_pilot");
    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");
    pub const UPDATE_MISSION_ITEM: OutPort<bool> = OutPort::new("update_mission_item");

    pub fn build(params: &SupervisorParams, distance: SharedDistance) -> Result<Coupled, Error> {
        const LPM: &str = "lp_manager";
        const STAB: &str = "stabilize";
        const HC: &str = "handover_control";
        const LPR: &str = LpReposition::NAME;

        let mut b = CoupledBuilder::new(Self::NAME);
        b.input(Self::AIRCRAFT_STATE)
            .input(Self::LANDING_ACHIEVED)
            .input(Self::LP_RECV)
            .input(Self::PILOT_TAKEOVER)
            .input(Self::PLP_ACH)
            .input(Self::START_MISSION);

        b.output(Self::CONTROL_YIELDED)
            .output(Self::FCC_COMMAND_HOVER)
            .output(Self::FCC_COMMAND_LAND)
            .output(Self::FCC_COMMAND_ORBIT)
            .output(Self::FCC_COMMAND_VELOCITY)
            .output(Self::LP_EXPIRED)
            .output(Self::LP_NEW)
            .output(Self::MISSION_COMPLETE)
            .output(Self::NOTIFY_PILOT)
            .output(Self::REQUEST_AIRCRAFT_STATE)
            .output(Self::SET_MISSION_MONITOR_STATUS)
            .output(Self::UPDATE_BOSS)
            .output(Self::UPDATE_GCS)
            .output(Self::UPDATE_MISSION_ITEM);

        b.add_atomic(LPM, LpManager::new(params, distance.clone()))
            .add_atomic(STAB, Stabilize::new(params, distance.clone()))
            .add_atomic(HC, HandoverControl::new(params))
            .add_coupled(LpReposition::build(params, distance)?);

        // lp_manager
        b.eic(Self::LP_RECV, LPM, LpManager::LP_RECV)
            .eic(Self::PLP_ACH, LPM, LpManager::PLP_ACH)
            .eic(Self::PILOT_TAKEOVER, LPM, LpManager::PILOT_TAKEOVER)
            .eic(Self::AIRCRAFT_STATE, LPM, LpManager::AIRCRAFT_STATE)
            .eic(Self::START_MISSION, LPM, LpManager::START_MISSION);

        // lp_reposition
        b.eic(Self::LANDING_ACHIEVED, LPR, LpReposition::LANDING_ACHIEVED)
            .eic(Self::AIRCRAFT_STATE, LPR, LpReposition::AIRCRAFT_STATE)
            .eic(Self::PILOT_TAKEOVER, LPR, LpReposition::PILOT_TAKEOVER)
            .eic(Self::START_MISSION, LPR, LpReposition::START_MISSION);

        // stabilize
        b.eic(Self::AIRCRAFT_STATE, STAB, Stabilize::AIRCRAFT_STATE)
            .eic(Self::START_MISSION, STAB, Stabilize::START_MISSION);

        // handover_control
        b.eic(Self::PILOT_TAKEOVER, HC, HandoverControl::PILOT_TAKEOVER)
            .eic(Self::START_MISSION, HC, HandoverControl::START_MISSION);

        b.eoc(LPM, LpManager::FCC_COMMAND_ORBIT, Self::FCC_COMMAND_ORBIT)
            .eoc(LPM, LpManager::LP_EXPIRED, Self::LP_EXPIRED)
            .eoc(LPM, LpManager::LP_NEW, Self::LP_NEW)
            .eoc(LPM, LpManager::UPDATE_BOSS, Self::UPDATE_BOSS)
            .eoc(LPM, LpManager::UPDATE_GCS, Self::UPDATE_GCS)
            .eoc(LPM, LpManager::REQUEST_AIRCRAFT_STATE, Self::REQUEST_AIRCRAFT_STATE)
            .eoc(LPM, LpManager::SET_MISSION_MONITOR_STATUS, Self::SET_MISSION_MONITOR_STATUS);

        b.eoc(LPR, LpReposition::FCC_COMMAND_LAND, Self::FCC_COMMAND_LAND)
            .eoc(LPR, LpReposition::FCC_COMMAND_VELOCITY, Self::FCC_COMMAND_VELOCITY)
            .eoc(LPR, LpReposition::MISSION_COMPLETE, Self::MISSION_COMPLETE)
            .eoc(LPR, LpReposition::REQUEST_AIRCRAFT_STATE, Self::REQUEST_AIRCRAFT_STATE)
            .eoc(
                LPR,
                LpReposition::SET_MISSION_MONITOR_STATUS,
                Self::SET_MISSION_MONITOR_STATUS,
            )
            .eoc(LPR, LpReposition::UPDATE_BOSS, Self::UPDATE_BOSS)
            .eoc(LPR, LpReposition::UPDATE_GCS, Self::UPDATE_GCS)
            .eoc(LPR, LpReposition::UPDATE_MISSION_ITEM, Self::UPDATE_MISSION_ITEM);

        b.eoc(HC, HandoverControl::CONTROL_YIELDED, Self::CONTROL_YIELDED)
            .eoc(HC, HandoverControl::NOTIFY_PILOT, Self::NOTIFY_PILOT);

        b.eoc(STAB, Stabilize::FCC_COMMAND_HOVER, Self::FCC_COMMAND_HOVER)
            .eoc(STAB, Stabilize::REQUEST_AIRCRAFT_STATE, Self::REQUEST_AIRCRAFT_STATE)
            .eoc(STAB, Stabilize::UPDATE_GCS, Self::UPDATE_GCS);

        b.ic(LPM, LpManager::LP_NEW, LPR, LpReposition::LP_NEW)
            .ic(LPM, LpManager::PILOT_HANDOVER, HC, HandoverControl::PILOT_HANDOVER);

        b.ic(LPR, LpReposition::CANCEL_HOVER, STAB, Stabilize::CANCEL_HOVER)
            .ic(LPR, LpReposition::STABILIZE, STAB, Stabilize::STABILIZE)
            .ic(LPR, LpReposition::PILOT_HANDOVER, HC, HandoverControl::PILOT_HANDOVER)
            .ic(LPR, LpReposition::FCC_COMMAND_LAND, LPM, LpManager::FCC_COMMAND_LAND);

        b.ic(STAB, Stabilize::HOVER_CRITERIA_MET, HC, HandoverControl::HOVER_CRITERIA_MET)
            .ic(STAB, Stabilize::HOVER_CRITERIA_MET, LPR, LpReposition::HOVER_CRITERIA_MET);

        b.ic(HC, HandoverControl::CONTROL_YIELDED, LPM, LpManager::CONTROL_YIELDED)
            .ic(HC, HandoverControl::CONTROL_YIELDED, LPR, LpReposition::CONTROL_YIELDED)
            .ic(HC, HandoverControl::STABILIZE, STAB, Stabilize::STABILIZE);

        b.build()
    }
}

#[cfg(test)]
mod tests {
    use devs::{Time, modeling::Bag, simulation::Simulator};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{coupled::collect, geo::Wgs84Haversine, messages::fcc::scale_deg};

    fn plp() -> LandingPoint {
        LandingPoint {
            id: 0,
            lat: 45.3212,
            lon: -75.6678,
            alt: 300.0,
            hdg: 0.0,
            mission_item_no: 5,
        }
    }

    fn over_plp() -> AircraftState {
        AircraftState {
            gps_time: 100.0,
            lat: 45.3212,
            lon: -75.6678,
            alt_agl: 60.0,
            alt_msl: 360.0,
            hdg_deg: 270.0,
            vel_kts: 0.0,
        }
    }

    /// Steps the simulator up to `end`, answering every aircraft state
    /// request with `aircraft` in the same instant.
    fn run_with_aircraft(
        sim: &mut Simulator,
        aircraft: AircraftState,
        end: Time,
    ) -> anyhow::Result<Vec<(Time, Bag)>> {
        let mut outputs = vec![];

        while sim.next_event_time() <= end {
            let t = sim.next_event_time();
            let Some(bag) = sim.step() else { break };

            if bag.has(&Landing::REQUEST_AIRCRAFT_STATE) {
                sim.inject(&Landing::AIRCRAFT_STATE, aircraft)?;
            }
            if !bag.is_empty() {
                outputs.push((t, bag));
            }
        }

        Ok(outputs)
    }

    #[test]
    fn test_graph() -> anyhow::Result<()> {
        let landing = Landing::build(&SupervisorParams::default(), Wgs84Haversine::shared())?;

        assert_eq!(
            landing.children().collect::<Vec<_>>(),
            vec!["lp_manager", "stabilize", "handover_control", "lp_reposition"]
        );
        assert_eq!(landing.input_ports().len(), 6);
        assert_eq!(landing.output_ports().len(), 14);

        Ok(())
    }

    #[test]
    fn test_scan_without_lp_hands_over() -> anyhow::Result<()> {
        let params = SupervisorParams::default();
        let landing = Landing::build(&params, Wgs84Haversine::shared())?;
        let mut sim = Simulator::new(Landing::NAME, landing.into());

        sim.inject(&Landing::START_MISSION, 2)?;
        sim.schedule(Time::from_millis(1000), &Landing::PLP_ACH, plp())?;
        sim.schedule(Time::from_millis(130_000), &Landing::PILOT_TAKEOVER, true)?;

        let outputs = run_with_aircraft(&mut sim, over_plp(), Time::from_millis(200_000))?;

        let orbit = collect(&outputs, &Landing::FCC_COMMAND_ORBIT);
        assert_eq!(orbit.len(), 1);
        assert_eq!(orbit[0].latitude, scale_deg(plp().lat));

        let boss: Vec<String> = collect(&outputs, &Landing::UPDATE_BOSS)
            .into_iter()
            .map(|update| update.description)
            .collect();
        assert_eq!(boss, vec!["LZ SCAN", "MAN CTRL"]);

        // Handover hover, then the pilot is told to take over
        assert_eq!(collect(&outputs, &Landing::FCC_COMMAND_HOVER).len(), 1);
        assert_eq!(collect(&outputs, &Landing::NOTIFY_PILOT), vec![true]);
        assert_eq!(collect(&outputs, &Landing::CONTROL_YIELDED), vec![true]);
        assert!(collect(&outputs, &Landing::FCC_COMMAND_LAND).is_empty());

        let notified = outputs
            .iter()
            .find(|(_, bag)| bag.has(&Landing::NOTIFY_PILOT))
            .map(|(t, _)| *t);
        assert!(notified.is_some_and(|t| t > Time::from_millis(121_000)));

        assert_eq!(
            sim.state_of("landing.lp_manager").as_deref(),
            Some("PILOT_CONTROL")
        );
        assert_eq!(
            sim.state_of("landing.handover_control").as_deref(),
            Some("PILOT_CONTROL")
        );
        assert_eq!(
            sim.state_of("landing.stabilize").as_deref(),
            Some("WAIT_STABILIZE")
        );
        assert_eq!(
            sim.state_of("landing.lp_reposition.command_reposition").as_deref(),
            Some("PILOT_CONTROL")
        );

        Ok(())
    }
}
