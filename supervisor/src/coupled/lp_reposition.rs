use devs::{
    Error,
    modeling::{Coupled, CoupledBuilder, InPort, OutPort},
};

use crate::{
    geo::SharedDistance,
    messages::{AircraftState, BossMissionUpdate, FccCommand, GcsUpdate, HoverCriteria, LandingPoint},
    models::{CommandReposition, LandingRoutine, RepositionTimer},
    parameters::SupervisorParams,
};

/// Moves the aircraft over each new landing point and lands once it holds
/// there.
pub struct LpReposition;

impl LpReposition {
    pub const NAME: &'static str = "lp_reposition";

    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const CONTROL_YIELDED: InPort<bool> = InPort::new("control_yielded");
    pub const HOVER_CRITERIA_MET: InPort<bool> = InPort::new("hover_criteria_met");
    pub const LANDING_ACHIEVED: InPort<bool> = InPort::new("landing_achieved");
    pub const LP_NEW: InPort<LandingPoint> = InPort::new("lp_new");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
    pub const START_MISSION: InPort<i32> = InPort::new("start_mission");

    pub const CANCEL_HOVER: OutPort<bool> = OutPort::new("cancel_hover");
    pub const FCC_COMMAND_LAND: OutPort<FccCommand> = OutPort::new("fcc_command_land");
    pub const FCC_COMMAND_VELOCITY: OutPort<FccCommand> = OutPort::new("fcc_command_velocity");
    pub const MISSION_COMPLETE: OutPort<bool> = OutPort::new("mission_complete");
    pub const PILOT_HANDOVER: OutPort<LandingPoint> = OutPort::new("pilot_handover");
    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const STABILIZE: OutPort<HoverCriteria> = OutPort::new("stabilize");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");
    pub const UPDATE_MISSION_ITEM: OutPort<bool> = OutPort::new("update_mission_item");

    pub fn build(params: &SupervisorParams, distance: SharedDistance) -> Result<Coupled, Error> {
        const LR: &str = "landing_routine";
        const CR: &str = "command_reposition";
        const RT: &str = "reposition_timer";

        let mut b = CoupledBuilder::new(Self::NAME);
        b.input(Self::AIRCRAFT_STATE)
            .input(Self::CONTROL_YIELDED)
            .input(Self::HOVER_CRITERIA_MET)
            .input(Self::LANDING_ACHIEVED)
            .input(Self::LP_NEW)
            .input(Self::PILOT_TAKEOVER)
            .input(Self::START_MISSION);

        b.output(Self::CANCEL_HOVER)
            .output(Self::FCC_COMMAND_LAND)
            .output(Self::FCC_COMMAND_VELOCITY)
            .output(Self::MISSION_COMPLETE)
            .output(Self::PILOT_HANDOVER)
            .output(Self::REQUEST_AIRCRAFT_STATE)
            .output(Self::SET_MISSION_MONITOR_STATUS)
            .output(Self::STABILIZE)
            .output(Self::UPDATE_BOSS)
            .output(Self::UPDATE_GCS)
            .output(Self::UPDATE_MISSION_ITEM);

        b.add_atomic(LR, LandingRoutine::new(params))
            .add_atomic(CR, CommandReposition::new(params, distance))
            .add_atomic(RT, RepositionTimer::new(params));

        // landing_routine
        b.eic(Self::LANDING_ACHIEVED, LR, LandingRoutine::LANDING_ACHIEVED)
            .eic(Self::PILOT_TAKEOVER, LR, LandingRoutine::PILOT_TAKEOVER)
            .eic(Self::START_MISSION, LR, LandingRoutine::START_MISSION);

        // command_reposition
        b.eic(Self::HOVER_CRITERIA_MET, CR, CommandReposition::HOVER_CRITERIA_MET)
            .eic(Self::PILOT_TAKEOVER, CR, CommandReposition::PILOT_TAKEOVER)
            .eic(Self::AIRCRAFT_STATE, CR, CommandReposition::AIRCRAFT_STATE)
            .eic(Self::START_MISSION, CR, CommandReposition::START_MISSION);

        // reposition_timer
        b.eic(Self::PILOT_TAKEOVER, RT, RepositionTimer::PILOT_TAKEOVER)
            .eic(Self::CONTROL_YIELDED, RT, RepositionTimer::CONTROL_YIELDED)
            .eic(Self::LP_NEW, RT, RepositionTimer::LP_NEW)
            .eic(Self::START_MISSION, RT, RepositionTimer::START_MISSION);

        b.eoc(LR, LandingRoutine::FCC_COMMAND_LAND, Self::FCC_COMMAND_LAND)
            .eoc(LR, LandingRoutine::MISSION_COMPLETE, Self::MISSION_COMPLETE)
            .eoc(LR, LandingRoutine::UPDATE_BOSS, Self::UPDATE_BOSS)
            .eoc(LR, LandingRoutine::UPDATE_GCS, Self::UPDATE_GCS)
            .eoc(LR, LandingRoutine::UPDATE_MISSION_ITEM, Self::UPDATE_MISSION_ITEM);

        b.eoc(CR, CommandReposition::CANCEL_HOVER, Self::CANCEL_HOVER)
            .eoc(CR, CommandReposition::STABILIZE, Self::STABILIZE)
            .eoc(CR, CommandReposition::FCC_COMMAND_VELOCITY, Self::FCC_COMMAND_VELOCITY)
            .eoc(
                CR,
                CommandReposition::SET_MISSION_MONITOR_STATUS,
                Self::SET_MISSION_MONITOR_STATUS,
            )
            .eoc(CR, CommandReposition::REQUEST_AIRCRAFT_STATE, Self::REQUEST_AIRCRAFT_STATE)
            .eoc(CR, CommandReposition::UPDATE_BOSS, Self::UPDATE_BOSS)
            .eoc(CR, CommandReposition::UPDATE_GCS, Self::UPDATE_GCS);

        b.eoc(RT, RepositionTimer::CANCEL_HOVER, Self::CANCEL_HOVER)
            .eoc(RT, RepositionTimer::PILOT_HANDOVER, Self::PILOT_HANDOVER)
            .eoc(RT, RepositionTimer::UPDATE_BOSS, Self::UPDATE_BOSS)
            .eoc(RT, RepositionTimer::UPDATE_GCS, Self::UPDATE_GCS);

        b.ic(CR, CommandReposition::LP_CRITERIA_MET, RT, RepositionTimer::LP_CRIT_MET)
            .ic(RT, RepositionTimer::LAND, LR, LandingRoutine::LAND)
            .ic(RT, RepositionTimer::PILOT_HANDOVER, CR, CommandReposition::PILOT_HANDOVER)
            .ic(RT, RepositionTimer::REQUEST_REPOSITION, CR, CommandReposition::REQUEST_REPOSITION);

        b.build()
    }
}

#[cfg(test)]
mod tests {
    use devs::{Time, simulation::Simulator};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{coupled::collect, geo::Wgs84Haversine};

    fn lp() -> LandingPoint {
        LandingPoint {
            id: 1,
            lat: 45.3212,
            lon: -75.6696,
            alt: 300.0,
            hdg: 90.0,
            mission_item_no: 6,
        }
    }

    fn aircraft() -> AircraftState {
        AircraftState {
            lat: 45.3200,
            lon: -75.6696,
            alt_agl: 60.0,
            alt_msl: 360.0,
            ..Default::default()
        }
    }

    fn simulator() -> anyhow::Result<Simulator> {
        let params = SupervisorParams::default();
        let coupled = LpReposition::build(&params, Wgs84Haversine::shared())?;
        let mut sim = Simulator::new(LpReposition::NAME, coupled.into());

        sim.inject(&LpReposition::START_MISSION, 7)?;
        sim.schedule(Time::from_millis(1000), &LpReposition::LP_NEW, lp())?;
        sim.schedule(Time::from_millis(21_500), &LpReposition::AIRCRAFT_STATE, aircraft())?;

        Ok(sim)
    }

    #[test]
    fn test_reposition_then_land() -> anyhow::Result<()> {
        let mut sim = simulator()?;
        sim.schedule(Time::from_millis(25_000), &LpReposition::HOVER_CRITERIA_MET, true)?;
        sim.schedule(Time::from_millis(40_000), &LpReposition::LANDING_ACHIEVED, true)?;

        let outputs = sim.run_until_passive(500)?;

        let requests: Vec<Time> = outputs
            .iter()
            .filter(|(_, bag)| bag.has(&LpReposition::REQUEST_AIRCRAFT_STATE))
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(requests, vec![Time::from_millis(21_000)]);

        let velocity = collect(&outputs, &LpReposition::FCC_COMMAND_VELOCITY);
        assert_eq!(velocity.len(), 1);
        assert!(velocity[0].param2 > 0.0);

        let hover = collect(&outputs, &LpReposition::STABILIZE);
        assert_eq!(hover.len(), 1);
        assert_eq!(hover[0].desired_lat, lp().lat);

        let land: Vec<Time> = outputs
            .iter()
            .filter(|(_, bag)| bag.has(&LpReposition::FCC_COMMAND_LAND))
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(land, vec![Time::from_millis(25_000)]);

        let boss: Vec<String> = collect(&outputs, &LpReposition::UPDATE_BOSS)
            .into_iter()
            .map(|update| update.description)
            .collect();
        assert_eq!(boss, vec!["LP UPD", "LP REP", "LAND"]);

        assert_eq!(collect(&outputs, &LpReposition::MISSION_COMPLETE), vec![true]);
        assert_eq!(collect(&outputs, &LpReposition::UPDATE_MISSION_ITEM), vec![true]);
        assert!(collect(&outputs, &LpReposition::PILOT_HANDOVER).is_empty());

        assert_eq!(
            sim.states(),
            vec![
                ("lp_reposition.landing_routine".to_string(), "LANDED".to_string()),
                ("lp_reposition.command_reposition".to_string(), "LANDING".to_string()),
                (
                    "lp_reposition.reposition_timer".to_string(),
                    "LANDING_ROUTINE".to_string()
                ),
            ]
        );

        Ok(())
    }

    #[test]
    fn test_reposition_timer_expiry_hands_over() -> anyhow::Result<()> {
        let mut sim = simulator()?;

        let outputs = sim.run_until_passive(500)?;

        let handover: Vec<(Time, LandingPoint)> = outputs
            .iter()
            .flat_map(|(t, bag)| {
                bag.messages(&LpReposition::PILOT_HANDOVER)
                    .iter()
                    .map(move |lp| (*t, *lp))
            })
            .collect();
        assert_eq!(handover, vec![(Time::from_millis(81_000), lp())]);
        assert_eq!(collect(&outputs, &LpReposition::CANCEL_HOVER), vec![true]);
        assert!(collect(&outputs, &LpReposition::FCC_COMMAND_LAND).is_empty());

        assert_eq!(
            sim.state_of("lp_reposition.command_reposition").as_deref(),
            Some("TIMER_EXPIRED")
        );
        assert_eq!(
            sim.state_of("lp_reposition.reposition_timer").as_deref(),
            Some("HANDOVER_CTRL")
        );

        // The pilot handover acknowledgement releases the timer
        sim.inject(&LpReposition::CONTROL_YIELDED, true)?;
        sim.run_until_passive(10)?;
        assert_eq!(
            sim.state_of("lp_reposition.reposition_timer").as_deref(),
            Some("PILOT_CONTROL")
        );

        Ok(())
    }
}
