mod common;

use devs::{Time, simulation::Simulator};
use pretty_assertions::assert_eq;
use supervisor::{
    coupled::SupervisorSystem,
    geo::Wgs84Haversine,
    io::TelemetryHub,
    messages::{AircraftState, AircraftTelemetry},
    parameters::SupervisorParams,
};

use common::{collect, hovering_at, landing_point, start};

const LP_LAT: f64 = 45.3212;
const LP_LON: f64 = -75.6696;

fn over_lp(alt_agl: f64) -> AircraftTelemetry {
    AircraftTelemetry {
        state: AircraftState {
            alt_agl,
            alt_msl: 300.0 + alt_agl,
            ..hovering_at(LP_LAT, LP_LON)
        },
        fcc_status: 0b11,
    }
}

#[test]
fn test_land_from_telemetry() -> anyhow::Result<()> {
    let hub = TelemetryHub::new();
    let coupled = SupervisorSystem::build(
        &SupervisorParams::default(),
        Wgs84Haversine::shared(),
        &hub,
    )?;
    let mut sim = Simulator::new(SupervisorSystem::NAME, coupled.into());

    hub.publish(over_lp(60.0))?;
    sim.inject(&SupervisorSystem::PERCEPTION_STATUS, true)?;
    sim.inject(&SupervisorSystem::START_SUPERVISOR, start())?;
    sim.schedule(
        Time::from_millis(1000),
        &SupervisorSystem::LP_RECV,
        landing_point(LP_LAT, LP_LON),
    )?;

    let mut outputs = sim.run_until(Time::from_millis(30_000));
    assert_eq!(collect(&outputs, &SupervisorSystem::FCC_COMMAND_LAND).len(), 1);
    assert!(collect(&outputs, &SupervisorSystem::MISSION_COMPLETE).is_empty());
    assert_eq!(
        sim.state_of("supervisor_system.landing_achieved_input").as_deref(),
        Some("POLL")
    );

    // Touchdown
    hub.publish(over_lp(0.5))?;
    outputs.extend(sim.run_until(Time::from_millis(31_000)));

    assert_eq!(collect(&outputs, &SupervisorSystem::MISSION_COMPLETE), vec![true]);

    let expected = [
        ("supervisor_system.supervisor.landing.lp_reposition.landing_routine", "LANDED"),
        ("supervisor_system.landing_achieved_input", "IDLE"),
        ("supervisor_system.pilot_takeover_input", "IDLE"),
    ];
    for (path, state) in expected {
        assert_eq!(sim.state_of(path).as_deref(), Some(state), "{path}");
    }

    Ok(())
}

#[test]
fn test_reposition_uses_newest_telemetry() -> anyhow::Result<()> {
    let hub = TelemetryHub::new();
    let coupled = SupervisorSystem::build(
        &SupervisorParams::default(),
        Wgs84Haversine::shared(),
        &hub,
    )?;
    let mut sim = Simulator::new(SupervisorSystem::NAME, coupled.into());

    // More samples than a feed holds, all before anything reads them
    let newest = SupervisorSystem::FEED_CAPACITY + 36;
    for i in 1..=newest {
        let mut sample = over_lp(60.0);
        sample.state.gps_time = i as f64;
        hub.publish(sample)?;
    }

    sim.inject(&SupervisorSystem::PERCEPTION_STATUS, true)?;
    sim.inject(&SupervisorSystem::START_SUPERVISOR, start())?;
    sim.schedule(
        Time::from_millis(1000),
        &SupervisorSystem::LP_RECV,
        landing_point(LP_LAT, LP_LON),
    )?;

    let outputs = sim.run_until(Time::from_millis(22_000));
    let velocity = collect(&outputs, &SupervisorSystem::FCC_COMMAND_VELOCITY);
    assert_eq!(velocity.len(), 1);
    assert_eq!(velocity[0].gps_time, newest as f64);

    Ok(())
}
