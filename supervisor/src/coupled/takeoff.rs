use devs::{
    Error,
    modeling::{Coupled, CoupledBuilder, InPort, OutPort},
};

use crate::{
    io::CacheInput,
    messages::{AircraftState, GcsUpdate, StartSupervisor},
    models::MissionInitialization,
    parameters::SupervisorParams,
};

type PerceptionCache = CacheInput<bool>;

/// Take off phase: mission initialization with a cache holding the last
/// reported perception system status.
pub struct Takeoff;

impl Takeoff {
    pub const NAME: &'static str = "takeoff";

    pub const AIRCRAFT_STATE: InPort<AircraftState> = InPort::new("aircraft_state");
    pub const PERCEPTION_STATUS: InPort<bool> = InPort::new("perception_status");
    pub const START_SUPERVISOR: InPort<StartSupervisor> = InPort::new("start_supervisor");

    pub const REQUEST_AIRCRAFT_STATE: OutPort<bool> = OutPort::new("request_aircraft_state");
    pub const SET_MISSION_MONITOR_STATUS: OutPort<u8> = OutPort::new("set_mission_monitor_status");
    pub const START_MISSION: OutPort<i32> = OutPort::new("start_mission");
    pub const UPDATE_GCS: OutPort<GcsUpdate> = OutPort::new("update_gcs");

    pub fn build(params: &SupervisorParams) -> Result<Coupled, Error> {
        const MI: &str = "mission_initialization";
        const CACHE: &str = "cache_input";

        let mut b = CoupledBuilder::new(Self::NAME);
        b.input(Self::AIRCRAFT_STATE)
            .input(Self::PERCEPTION_STATUS)
            .input(Self::START_SUPERVISOR)
            .output(Self::REQUEST_AIRCRAFT_STATE)
            .output(Self::SET_MISSION_MONITOR_STATUS)
            .output(Self::START_MISSION)
            .output(Self::UPDATE_GCS);

        b.add_atomic(MI, MissionInitialization::new(params))
            .add_atomic(CACHE, PerceptionCache::new(false));

        b.eic(Self::AIRCRAFT_STATE, MI, MissionInitialization::AIRCRAFT_STATE)
            .eic(Self::START_SUPERVISOR, MI, MissionInitialization::START_SUPERVISOR)
            .eic(Self::PERCEPTION_STATUS, CACHE, PerceptionCache::NEW_INPUT);

        b.eoc(MI, MissionInitialization::REQUEST_AIRCRAFT_STATE, Self::REQUEST_AIRCRAFT_STATE)
            .eoc(
                MI,
                MissionInitialization::SET_MISSION_MONITOR_STATUS,
                Self::SET_MISSION_MONITOR_STATUS,
            )
            .eoc(MI, MissionInitialization::START_MISSION, Self::START_MISSION)
            .eoc(MI, MissionInitialization::UPDATE_GCS, Self::UPDATE_GCS);

        b.ic(
            MI,
            MissionInitialization::REQUEST_PERCEPTION_STATUS,
            CACHE,
            PerceptionCache::GET_INPUT,
        )
        .ic(
            CACHE,
            PerceptionCache::CACHED_INPUT,
            MI,
            MissionInitialization::PERCEPTION_STATUS,
        );

        b.build()
    }
}
