use anyhow::Context;
use devs::{
    modeling::{Coupled, CoupledBuilder, InPort, OutPort},
    utils::capacity::Capacity,
};

use super::Supervisor;
use crate::{
    geo::SharedDistance,
    io::{AircraftStateInput, LandingAchieved, PilotTakeover, PollingConditionInput, TelemetryHub},
    messages::{BossMissionUpdate, FccCommand, GcsUpdate, LandingPoint, StartSupervisor},
    parameters::SupervisorParams,
};

type LandingAchievedInput = PollingConditionInput<FccCommand, bool, LandingAchieved>;
type PilotTakeoverInput = PollingConditionInput<i32, bool, PilotTakeover>;

/// The supervisor closed over its aircraft side inputs: aircraft state
/// requests and the landing and pilot takeover monitors are answered from
/// FCC telemetry. Ground station and perception messages stay root inputs.
pub struct SupervisorSystem;

impl SupervisorSystem {
    pub const NAME: &'static str = "supervisor_system";

    /// Telemetry samples kept per feed. Older ones are evicted first.
    pub const FEED_CAPACITY: usize = 64;

    pub const LP_RECV: InPort<LandingPoint> = InPort::new("lp_recv");
    pub const PERCEPTION_STATUS: InPort<bool> = InPort::new("perception_status");
    pub const PLP_ACH: InPort<LandingPoint> = InPort::new("plp_ach");
    pub const START_SUPERVISOR: InPort<StartSupervisor> = InPort::new("start_supervisor");
    pub const WAYPOINT: InPort<FccCommand> = InPort::new("waypoint");

    pub const CONTROL_YIELDED: OutPort<bool> = OutPort::new("control_yielded");
    pub const FCC_COMMAND_HOVER: OutPort<FccCommand> = OutPort::new("fcc_command_hover");
    pub const FCC_COMMAND_LAND: OutPort<FccCommand> = OutPort::new("fcc_command_land");
    pub const FCC_COMMAND_ORBIT: OutPort<FccCommand> = OutPort::new("fcc_command_orbit");
    pub const FCC_COMMAND_VELOCITY: OutPort<FccCommand> = OutPort::new("fcc_command_velocity");
    pub const FCC_WAYPOINT_UPDATE: OutPort<FccCommand> = OutPort::new("fcc_waypoint_update");
    pub const LP_EXPIRED: OutPort<LandingPoint> = OutPort::new("lp_expired");
    pub const LP_NEW: OutPort<LandingPoint> = OutPort::new("lp_new");
    pub const MISSION_COMPLETE: OutPort<bool> = OutPort::new("mission_complete");
    pub const NOTIFY_PILOT: OutPort<bool> = OutPort::new("notify_pilot");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const START_MISSION: OutPort<i32> = OutPort::new("start_mission");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");
    pub const UPDATE_MISSION_ITEM: OutPort<bool> = OutPort::new("update_mission_item");

    pub fn build(
        params: &SupervisorParams,
        distance: SharedDistance,
        telemetry: &TelemetryHub,
    ) -> anyhow::Result<Coupled> {
        const SUP: &str = Supervisor::NAME;
        const ASI: &str = "aircraft_state_input";
        const LAI: &str = "landing_achieved_input";
        const PTI: &str = "pilot_takeover_input";

        let capacity = Capacity::from(Self::FEED_CAPACITY);
        let feed = || {
            telemetry
                .subscribe(capacity)
                .context("Cannot subscribe to FCC telemetry")
        };

        let aircraft_state = AircraftStateInput::new(feed()?);
        let landing_achieved = LandingAchievedInput::new(
            params.landing_polling_rate,
            LandingAchieved::new(feed()?, params.landed_agl_ft),
        )?;
        let pilot_takeover =
            PilotTakeoverInput::new(params.takeover_polling_rate, PilotTakeover::new(feed()?))?;

        let mut b = CoupledBuilder::new(Self::NAME);
        b.input(Self::LP_RECV)
            .input(Self::PERCEPTION_STATUS)
            .input(Self::PLP_ACH)
            .input(Self::START_SUPERVISOR)
            .input(Self::WAYPOINT);

        b.output(Self::CONTROL_YIELDED)
            .output(Self::FCC_COMMAND_HOVER)
            .output(Self::FCC_COMMAND_LAND)
            .output(Self::FCC_COMMAND_ORBIT)
            .output(Self::FCC_COMMAND_VELOCITY)
            .output(Self::FCC_WAYPOINT_UPDATE)
            .output(Self::LP_EXPIRED)
            .output(Self::LP_NEW)
            .output(Self::MISSION_COMPLETE)
            .output(Self::NOTIFY_PILOT)
            .output(Self::SET_MISSION_MONITOR_STATUS)
            .output(Self::START_MISSION)
            .output(Self::UPDATE_BOSS)
            .output(Self::UPDATE_GCS)
            .output(Self::UPDATE_MISSION_ITEM);

        b.add_coupled(Supervisor::build(params, distance)?)
            .add_atomic(ASI, aircraft_state)
            .add_atomic(LAI, landing_achieved)
            .add_atomic(PTI, pilot_takeover);

        b.eic(Self::LP_RECV, SUP, Supervisor::LP_RECV)
            .eic(Self::PERCEPTION_STATUS, SUP, Supervisor::PERCEPTION_STATUS)
            .eic(Self::PLP_ACH, SUP, Supervisor::PLP_ACH)
            .eic(Self::START_SUPERVISOR, SUP, Supervisor::START_SUPERVISOR)
            .eic(Self::WAYPOINT, SUP, Supervisor::WAYPOINT);

        b.eoc(SUP, Supervisor::CONTROL_YIELDED, Self::CONTROL_YIELDED)
            .eoc(SUP, Supervisor::FCC_COMMAND_HOVER, Self::FCC_COMMAND_HOVER)
            .eoc(SUP, Supervisor::FCC_COMMAND_LAND, Self::FCC_COMMAND_LAND)
            .eoc(SUP, Supervisor::FCC_COMMAND_ORBIT, Self::FCC_COMMAND_ORBIT)
            .eoc(SUP, Supervisor::FCC_COMMAND_VELOCITY, Self::FCC_COMMAND_VELOCITY)
            .eoc(SUP, Supervisor::FCC_WAYPOINT_UPDATE, Self::FCC_WAYPOINT_UPDATE)
            .eoc(SUP, Supervisor::LP_EXPIRED, Self::LP_EXPIRED)
            .eoc(SUP, Supervisor::LP_NEW, Self::LP_NEW)
            .eoc(SUP, Supervisor::MISSION_COMPLETE, Self::MISSION_COMPLETE)
            .eoc(SUP, Supervisor::NOTIFY_PILOT, Self::NOTIFY_PILOT)
            .eoc(SUP, Supervisor::SET_MISSION_MONITOR_STATUS, Self::SET_MISSION_MONITOR_STATUS)
            .eoc(SUP, Supervisor::START_MISSION, Self::START_MISSION)
            .eoc(SUP, Supervisor::UPDATE_BOSS, Self::UPDATE_BOSS)
            .eoc(SUP, Supervisor::UPDATE_GCS, Self::UPDATE_GCS)
            .eoc(SUP, Supervisor::UPDATE_MISSION_ITEM, Self::UPDATE_MISSION_ITEM);

        b.ic(SUP, Supervisor::REQUEST_AIRCRAFT_STATE, ASI, AircraftStateInput::REQUEST)
            .ic(ASI, AircraftStateInput::MESSAGE, SUP, Supervisor::AIRCRAFT_STATE);

        b.ic(SUP, Supervisor::FCC_COMMAND_LAND, LAI, LandingAchievedInput::START)
            .ic(SUP, Supervisor::MISSION_COMPLETE, LAI, LandingAchievedInput::QUIT)
            .ic(LAI, LandingAchievedInput::MESSAGE, SUP, Supervisor::LANDING_ACHIEVED);

        b.ic(SUP, Supervisor::START_MISSION, PTI, PilotTakeoverInput::START)
            .ic(SUP, Supervisor::MISSION_COMPLETE, PTI, PilotTakeoverInput::QUIT)
            .ic(PTI, PilotTakeoverInput::MESSAGE, SUP, Supervisor::PILOT_TAKEOVER);

        Ok(b.build()?)
    }
}
