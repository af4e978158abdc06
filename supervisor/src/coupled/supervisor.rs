use devs::{
    Error,
    modeling::{Coupled, CoupledBuilder, InPort, OutPort},
};

use super::{Landing, OnRoute, Takeoff};
use crate::{
    geo::SharedDistance,
    messages::{
        AircraftState, BossMissionUpdate, FccCommand, GcsUpdate, LandingPoint, StartSupervisor,
    },
    parameters::SupervisorParams,
};

/// The supervisor across all phases of flight. Takeoff starts the mission for
/// the on route and landing phases.
pub struct Supervisor;

impl Supervisor {
    pub const NAME: &'static str = "supervisor";

    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const LANDING_ACHIEVED: InPort<bool> = InPort::new("landing_achieved");
    pub const LP_RECV: InPort<LandingPoint> = InPort::new("lp_recv");
    pub const PERCEPTION_STATUS: InPort<bool> = InPort::new("perception_status");
    pub const PILOT_TAKEOVER: InPort<bool> = InPort::new("pilot_takeover");
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
    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const START_MISSION: OutPort<i32> = OutPort::new("start_mission");
    pub const UPDATE_BOSS: OutPort<BossMissionUpdate> = OutPort::new("update_boss");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");
    pub const UPDATE_MISSION_ITEM: OutPort<bool> = OutPort::new("update_mission_item");

    pub fn build(params: &SupervisorParams, distance: SharedDistance) -> Result<Coupled, Error> {
        const TAKEOFF: &str = Takeoff::NAME;
        const ON_ROUTE: &str = OnRoute::NAME;
        const LANDING: &str = Landing::NAME;

        let mut b = CoupledBuilder::new(Self::NAME);
        b.input(Self::AIRCRAFT_STATE)
            .input(Self::LANDING_ACHIEVED)
            .input(Self::LP_RECV)
            .input(Self::PERCEPTION_STATUS)
            .input(Self::PILOT_TAKEOVER)
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
            .output(Self::REQUEST_AIRCRAFT_STATE)
            .output(Self::SET_MISSION_MONITOR_STATUS)
            .output(Self::START_MISSION)
            .output(Self::UPDATE_BOSS)
            .output(Self::UPDATE_GCS)
            .output(Self::UPDATE_MISSION_ITEM);

        b.add_coupled(Takeoff::build(params)?)
            .add_coupled(OnRoute::build()?)
            .add_coupled(Landing::build(params, distance)?);

        b.eic(Self::AIRCRAFT_STATE, TAKEOFF, Takeoff::AIRCRAFT_STATE)
            .eic(Self::PERCEPTION_STATUS, TAKEOFF, Takeoff::PERCEPTION_STATUS)
            .eic(Self::START_SUPERVISOR, TAKEOFF, Takeoff::START_SUPERVISOR);

        b.eic(Self::WAYPOINT, ON_ROUTE, OnRoute::WAYPOINT)
            .eic(Self::PILOT_TAKEOVER, ON_ROUTE, OnRoute::PILOT_TAKEOVER);

        b.eic(Self::AIRCRAFT_STATE, LANDING, Landing::AIRCRAFT_STATE)
            .eic(Self::LANDING_ACHIEVED, LANDING, Landing::LANDING_ACHIEVED)
            .eic(Self::LP_RECV, LANDING, Landing::LP_RECV)
            .eic(Self::PILOT_TAKEOVER, LANDING, Landing::PILOT_TAKEOVER)
            .eic(Self::PLP_ACH, LANDING, Landing::PLP_ACH);

        b.eoc(TAKEOFF, Takeoff::REQUEST_AIRCRAFT_STATE, Self::REQUEST_AIRCRAFT_STATE)
            .eoc(TAKEOFF, Takeoff::SET_MISSION_MONITOR_STATUS, Self::SET_MISSION_MONITOR_STATUS)
            .eoc(TAKEOFF, Takeoff::UPDATE_GCS, Self::UPDATE_GCS)
            .eoc(TAKEOFF, Takeoff::START_MISSION, Self::START_MISSION);

        b.eoc(ON_ROUTE, OnRoute::FCC_WAYPOINT_UPDATE, Self::FCC_WAYPOINT_UPDATE);

        b.eoc(LANDING, Landing::REQUEST_AIRCRAFT_STATE, Self::REQUEST_AIRCRAFT_STATE)
            .eoc(LANDING, Landing::CONTROL_YIELDED, Self::CONTROL_YIELDED)
            .eoc(LANDING, Landing::FCC_COMMAND_HOVER, Self::FCC_COMMAND_HOVER)
            .eoc(LANDING, Landing::FCC_COMMAND_LAND, Self::FCC_COMMAND_LAND)
            .eoc(LANDING, Landing::FCC_COMMAND_ORBIT, Self::FCC_COMMAND_ORBIT)
            .eoc(LANDING, Landing::FCC_COMMAND_VELOCITY, Self::FCC_COMMAND_VELOCITY)
            .eoc(LANDING, Landing::LP_EXPIRED, Self::LP_EXPIRED)
            .eoc(LANDING, Landing::LP_NEW, Self::LP_NEW)
            .eoc(LANDING, Landing::MISSION_COMPLETE, Self::MISSION_COMPLETE)
            .eoc(LANDING, Landing::NOTIFY_PILOT, Self::NOTIFY_PILOT)
            .eoc(LANDING, Landing::UPDATE_BOSS, Self::UPDATE_BOSS)
            .eoc(LANDING, Landing::UPDATE_GCS, Self::UPDATE_GCS)
            .eoc(LANDING, Landing::SET_MISSION_MONITOR_STATUS, Self::SET_MISSION_MONITOR_STATUS)
            .eoc(LANDING, Landing::UPDATE_MISSION_ITEM, Self::UPDATE_MISSION_ITEM);

        b.ic(TAKEOFF, Takeoff::START_MISSION, ON_ROUTE, OnRoute::START_MISSION)
            .ic(TAKEOFF, Takeoff::START_MISSION, LANDING, Landing::START_MISSION);

        b.build()
    }
}
