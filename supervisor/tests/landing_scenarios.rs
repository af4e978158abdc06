mod common;

use devs::{Time, simulation::Simulator};
use pretty_assertions::assert_eq;
use supervisor::{
    coupled::Supervisor,
    geo::Wgs84Haversine,
    messages::{FccCommand, LandingPoint, fcc::scale_deg},
    parameters::SupervisorParams,
};

use common::{
    boss_descriptions, collect, gcs_texts, hovering_at, landing_point, run_with_aircraft, start,
    times,
};

const LP_LAT: f64 = 45.3212;
const LP_LON: f64 = -75.6696;

/// About 22 m north of the first landing point.
const LP2_LAT: f64 = 45.3214;

fn started_supervisor() -> anyhow::Result<Simulator> {
    let coupled = Supervisor::build(&SupervisorParams::default(), Wgs84Haversine::shared())?;
    let mut sim = Simulator::new(Supervisor::NAME, coupled.into());

    sim.inject(&Supervisor::PERCEPTION_STATUS, true)?;
    sim.inject(&Supervisor::START_SUPERVISOR, start())?;
    sim.schedule(
        Time::from_millis(1000),
        &Supervisor::LP_RECV,
        landing_point(LP_LAT, LP_LON),
    )?;

    Ok(sim)
}

fn assert_states(sim: &Simulator, expected: &[(&str, &str)]) {
    for (path, state) in expected {
        assert_eq!(sim.state_of(path).as_deref(), Some(*state), "{path}");
    }
}

#[test]
fn test_land_on_first_landing_point() -> anyhow::Result<()> {
    let mut sim = started_supervisor()?;
    sim.schedule(Time::from_millis(40_000), &Supervisor::LANDING_ACHIEVED, true)?;

    let outputs = run_with_aircraft(
        &mut sim,
        |_| hovering_at(LP_LAT, LP_LON),
        Time::from_millis(60_000),
    )?;

    assert_eq!(collect(&outputs, &Supervisor::START_MISSION), vec![3]);

    let lp_new = collect(&outputs, &Supervisor::LP_NEW);
    assert_eq!(
        lp_new,
        vec![LandingPoint {
            id: 1,
            alt: 360.0,
            mission_item_no: 7,
            ..landing_point(LP_LAT, LP_LON)
        }]
    );

    // Holds for the update time before repositioning
    assert_eq!(
        times(&outputs, &Supervisor::FCC_COMMAND_VELOCITY),
        vec![Time::from_millis(21_000)]
    );
    assert_eq!(collect(&outputs, &Supervisor::FCC_COMMAND_HOVER).len(), 1);

    let land = times(&outputs, &Supervisor::FCC_COMMAND_LAND);
    assert_eq!(land.len(), 1);
    assert!(land[0] >= Time::from_millis(24_000) && land[0] < Time::from_millis(25_000));

    assert_eq!(boss_descriptions(&outputs), vec!["LP UPD", "LP REP", "LAND"]);
    assert_eq!(
        gcs_texts(&outputs),
        vec![
            "The perceptions system is ready for operation!",
            "Starting Mission in air!",
            "LP timer started",
            "LP found. Holding for 20s",
            "Repositioning to LP!",
            "Came to hover!",
            "Landing",
            "Just landed!",
        ]
    );

    assert_eq!(collect(&outputs, &Supervisor::MISSION_COMPLETE), vec![true]);
    assert_eq!(collect(&outputs, &Supervisor::UPDATE_MISSION_ITEM), vec![true]);
    assert!(collect(&outputs, &Supervisor::LP_EXPIRED).is_empty());
    assert!(collect(&outputs, &Supervisor::NOTIFY_PILOT).is_empty());

    assert_states(
        &sim,
        &[
            ("supervisor.takeoff.mission_initialization", "IDLE"),
            ("supervisor.on_route.handle_waypoint", "WAIT_FOR_WAYPOINT"),
            ("supervisor.landing.lp_manager", "LP_ACCEPT_EXP"),
            ("supervisor.landing.stabilize", "WAIT_STABILIZE"),
            ("supervisor.landing.handover_control", "MISSION_STARTED"),
            ("supervisor.landing.lp_reposition.landing_routine", "LANDED"),
            ("supervisor.landing.lp_reposition.command_reposition", "LANDING"),
            ("supervisor.landing.lp_reposition.reposition_timer", "LANDING_ROUTINE"),
        ],
    );

    Ok(())
}

#[test]
fn test_new_landing_point_while_stabilizing() -> anyhow::Result<()> {
    let mut sim = started_supervisor()?;
    sim.schedule(
        Time::from_millis(22_000),
        &Supervisor::LP_RECV,
        landing_point(LP2_LAT, LP_LON),
    )?;
    sim.schedule(Time::from_millis(40_000), &Supervisor::LANDING_ACHIEVED, true)?;

    // The aircraft moves over the second landing point as soon as it exists
    let aircraft = |t: Time| {
        if t < Time::from_millis(22_000) {
            hovering_at(LP_LAT, LP_LON)
        } else {
            hovering_at(LP2_LAT, LP_LON)
        }
    };
    let outputs = run_with_aircraft(&mut sim, aircraft, Time::from_millis(60_000))?;

    let ids: Vec<i32> = collect(&outputs, &Supervisor::LP_NEW)
        .iter()
        .map(|lp| lp.id)
        .collect();
    assert_eq!(ids, vec![1, 2]);

    // One hover per landing point. The first one is cancelled exactly once
    let hover = collect(&outputs, &Supervisor::FCC_COMMAND_HOVER);
    assert_eq!(hover.len(), 2);
    assert_eq!(hover[0].latitude, scale_deg(LP_LAT));
    assert_eq!(hover[1].latitude, scale_deg(LP2_LAT));
    assert_eq!(collect(&outputs, &Supervisor::FCC_COMMAND_VELOCITY).len(), 2);

    let hovered = gcs_texts(&outputs)
        .into_iter()
        .filter(|text| text == "Came to hover!")
        .count();
    assert_eq!(hovered, 1);

    assert_eq!(
        boss_descriptions(&outputs),
        vec!["LP UPD", "LP REP", "LP REP", "LAND"]
    );
    let boss = collect(&outputs, &Supervisor::UPDATE_BOSS);
    assert_eq!(boss.last().map(|update| update.lp_no), Some(2));

    let land = times(&outputs, &Supervisor::FCC_COMMAND_LAND);
    assert_eq!(land.len(), 1);
    assert!(land[0] > Time::from_millis(25_000) && land[0] < Time::from_millis(26_000));
    assert_eq!(collect(&outputs, &Supervisor::MISSION_COMPLETE), vec![true]);

    assert_states(
        &sim,
        &[
            ("supervisor.landing.stabilize", "WAIT_STABILIZE"),
            ("supervisor.landing.lp_reposition.landing_routine", "LANDED"),
            ("supervisor.landing.lp_reposition.command_reposition", "LANDING"),
            ("supervisor.landing.lp_reposition.reposition_timer", "LANDING_ROUTINE"),
        ],
    );

    Ok(())
}

#[test]
fn test_reposition_timeout_hands_over_to_pilot() -> anyhow::Result<()> {
    let mut sim = started_supervisor()?;
    sim.schedule(Time::from_millis(100_000), &Supervisor::PILOT_TAKEOVER, true)?;

    // Too far from the landing point until the handover hover starts
    let aircraft = |t: Time| {
        if t < Time::from_millis(81_000) {
            hovering_at(45.3203, LP_LON)
        } else {
            hovering_at(LP_LAT, LP_LON)
        }
    };
    let outputs = run_with_aircraft(&mut sim, aircraft, Time::from_millis(120_000))?;

    let velocity = collect(&outputs, &Supervisor::FCC_COMMAND_VELOCITY);
    assert_eq!(velocity.len(), 1);
    assert!(velocity[0].param2 > 0.0);

    assert_eq!(boss_descriptions(&outputs), vec!["LP UPD", "LP REP", "LZ SCAN"]);
    assert!(
        gcs_texts(&outputs)
            .iter()
            .any(|text| text == "Repo timer expired, hovering over the last LP")
    );

    // Reposition hover, then the handover hover
    assert_eq!(collect(&outputs, &Supervisor::FCC_COMMAND_HOVER).len(), 2);

    let notified = times(&outputs, &Supervisor::NOTIFY_PILOT);
    assert_eq!(notified.len(), 1);
    assert!(notified[0] > Time::from_millis(81_000) && notified[0] < Time::from_millis(100_000));

    assert_eq!(
        times(&outputs, &Supervisor::CONTROL_YIELDED),
        vec![Time::from_millis(100_000)]
    );
    assert!(collect(&outputs, &Supervisor::FCC_COMMAND_LAND).is_empty());
    assert!(collect(&outputs, &Supervisor::MISSION_COMPLETE).is_empty());

    assert_states(
        &sim,
        &[
            ("supervisor.on_route.handle_waypoint", "PILOT_TAKEOVER"),
            ("supervisor.landing.lp_manager", "PILOT_CONTROL"),
            ("supervisor.landing.stabilize", "WAIT_STABILIZE"),
            ("supervisor.landing.handover_control", "PILOT_CONTROL"),
            ("supervisor.landing.lp_reposition.landing_routine", "PILOT_CONTROL"),
            ("supervisor.landing.lp_reposition.command_reposition", "PILOT_CONTROL"),
            ("supervisor.landing.lp_reposition.reposition_timer", "PILOT_CONTROL"),
        ],
    );

    Ok(())
}

#[test]
fn test_waypoints_forwarded_until_takeover() -> anyhow::Result<()> {
    let mut sim = started_supervisor()?;
    let waypoint = FccCommand::reposition(0.0, scale_deg(LP_LAT), scale_deg(LP_LON), 110.0);

    sim.schedule(Time::from_millis(500), &Supervisor::WAYPOINT, waypoint)?;
    sim.schedule(Time::from_millis(600), &Supervisor::PILOT_TAKEOVER, true)?;
    sim.schedule(Time::from_millis(700), &Supervisor::WAYPOINT, waypoint)?;

    let outputs = run_with_aircraft(
        &mut sim,
        |_| hovering_at(LP_LAT, LP_LON),
        Time::from_millis(5000),
    )?;

    assert_eq!(
        times(&outputs, &Supervisor::FCC_WAYPOINT_UPDATE),
        vec![Time::from_millis(500)]
    );

    // The pilot has control before any landing point arrives
    assert!(collect(&outputs, &Supervisor::LP_NEW).is_empty());
    assert_states(&sim, &[("supervisor.landing.lp_manager", "PILOT_CONTROL")]);

    Ok(())
}
