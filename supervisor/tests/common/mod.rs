#![allow(dead_code)]

use devs::{
    Time,
    modeling::{Bag, OutPort},
    simulation::Simulator,
};
use supervisor::{
    coupled::Supervisor,
    messages::{AircraftState, LandingPoint, StartSupervisor},
};

/// Every message emitted on `port`, in order.
pub fn collect<T: Clone + 'static>(outputs: &[(Time, Bag)], port: &OutPort<T>) -> Vec<T> {
    outputs
        .iter()
        .flat_map(|(_, bag)| bag.messages(port).iter().cloned())
        .collect()
}

/// Times at which `port` emitted at least one message.
pub fn times<T: Clone + 'static>(outputs: &[(Time, Bag)], port: &OutPort<T>) -> Vec<Time> {
    outputs
        .iter()
        .filter(|(_, bag)| bag.has(port))
        .map(|(t, _)| *t)
        .collect()
}

pub fn boss_descriptions(outputs: &[(Time, Bag)]) -> Vec<String> {
    collect(outputs, &Supervisor::UPDATE_BOSS)
        .into_iter()
        .map(|update| update.description)
        .collect()
}

pub fn gcs_texts(outputs: &[(Time, Bag)]) -> Vec<String> {
    collect(outputs, &Supervisor::UPDATE_GCS)
        .into_iter()
        .map(|update| update.text)
        .collect()
}

pub fn start() -> StartSupervisor {
    StartSupervisor {
        autonomy_armed: true,
        mission_started: false,
        mission_number: 3,
    }
}

pub fn landing_point(lat: f64, lon: f64) -> LandingPoint {
    LandingPoint {
        id: 0,
        lat,
        lon,
        alt: 300.0,
        hdg: 90.0,
        mission_item_no: 6,
    }
}

/// Aircraft holding position over (`lat`, `lon`), 60 ft above the ground.
pub fn hovering_at(lat: f64, lon: f64) -> AircraftState {
    AircraftState {
        gps_time: 0.0,
        lat,
        lon,
        alt_agl: 60.0,
        alt_msl: 360.0,
        hdg_deg: 90.0,
        vel_kts: 0.0,
    }
}

/// Steps a [`Supervisor`] simulation up to `end`, answering every aircraft
/// state request in the same instant with `aircraft(t)`.
pub fn run_with_aircraft(
    sim: &mut Simulator,
    aircraft: impl Fn(Time) -> AircraftState,
    end: Time,
) -> anyhow::Result<Vec<(Time, Bag)>> {
    let mut outputs = vec![];

    while sim.next_event_time() <= end {
        let t = sim.next_event_time();
        let Some(bag) = sim.step() else { break };

        if bag.has(&Supervisor::REQUEST_AIRCRAFT_STATE) {
            sim.inject(&Supervisor::AIRCRAFT_STATE, aircraft(t))?;
        }
        if !bag.is_empty() {
            outputs.push((t, bag));
        }
    }

    Ok(outputs)
}
