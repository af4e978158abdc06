use std::{
    fmt::Debug,
    fs,
    path::Path,
    thread::{self, JoinHandle},
};

use anyhow::{Context, Result};
use devs::{
    Time,
    io::{InputHandle, StopHandle},
    modeling::OutPort,
    simulation::{RealTimeRunner, Simulator},
    utils::capacity::Capacity,
};
use flume::{RecvError, Selector};
use itertools::Itertools;
use log::{info, warn};

use crate::{
    coupled::SupervisorSystem,
    geo::Wgs84Haversine,
    io::TelemetryHub,
    messages::{FccCommand, LandingPoint, StartSupervisor},
    parameters::{SupervisorParams, parse_string},
};

/// Name given to the root of the running simulation.
pub const ROOT: &str = "root";

pub fn load_params(path: &Path) -> Result<SupervisorParams> {
    info!("Reading parameters from '{}'", path.display());

    let toml = fs::read_to_string(path)
        .with_context(|| format!("Cannot read parameter file '{}'", path.display()))?;
    let map = parse_string(&toml).context("Malformed parameter file")?;

    SupervisorParams::from_params(&map).context("Invalid supervisor parameters")
}

/// Entry points for the adapters feeding a running supervisor.
#[derive(Clone)]
pub struct SupervisorInputs {
    pub lp_recv: InputHandle<LandingPoint>,
    pub perception_status: InputHandle<bool>,
    pub plp_ach: InputHandle<LandingPoint>,
    pub start_supervisor: InputHandle<StartSupervisor>,
    pub waypoint: InputHandle<FccCommand>,
    pub telemetry: TelemetryHub,
}

enum Received {
    Message,
    Closed,
}

/// A subscribed root output that logs what it receives.
trait LoggedOutput: Send {
    fn register<'a>(&'a self, selector: Selector<'a, Received>) -> Selector<'a, Received>;
}

struct Logged<T> {
    port: &'static str,
    receiver: flume::Receiver<T>,
}

impl<T: Debug + Send + 'static> LoggedOutput for Logged<T> {
    fn register<'a>(&'a self, selector: Selector<'a, Received>) -> Selector<'a, Received> {
        let port = self.port;
        selector.recv(&self.receiver, move |message: Result<T, RecvError>| match message {
            Ok(message) => {
                info!("[{port}] {message:?}");
                Received::Message
            }
            Err(RecvError::Disconnected) => Received::Closed,
        })
    }
}

/// The supervisor system on a wall clock runner, with its outputs logged.
pub struct SupervisorRunner {
    runner: RealTimeRunner,
    inputs: SupervisorInputs,
    outputs: Vec<Box<dyn LoggedOutput>>,
}

impl SupervisorRunner {
    pub fn new(params: &SupervisorParams) -> Result<Self> {
        let telemetry = TelemetryHub::new();
        let system = SupervisorSystem::build(params, Wgs84Haversine::shared(), &telemetry)?;

        let mut runner = RealTimeRunner::new(Simulator::new(ROOT, system.into()));
        info!(
            "Supervisor models: {}",
            runner
                .simulator()
                .states()
                .iter()
                .map(|(path, _)| path)
                .join(", ")
        );

        let inputs = SupervisorInputs {
            lp_recv: runner.input(&SupervisorSystem::LP_RECV)?,
            perception_status: runner.input(&SupervisorSystem::PERCEPTION_STATUS)?,
            plp_ach: runner.input(&SupervisorSystem::PLP_ACH)?,
            start_supervisor: runner.input(&SupervisorSystem::START_SUPERVISOR)?,
            waypoint: runner.input(&SupervisorSystem::WAYPOINT)?,
            telemetry,
        };

        let outputs = vec![
            log_output(&mut runner, SupervisorSystem::CONTROL_YIELDED)?,
            log_output(&mut runner, SupervisorSystem::FCC_COMMAND_HOVER)?,
            log_output(&mut runner, SupervisorSystem::FCC_COMMAND_LAND)?,
            log_output(&mut runner, SupervisorSystem::FCC_COMMAND_ORBIT)?,
            log_output(&mut runner, SupervisorSystem::FCC_COMMAND_VELOCITY)?,
            log_output(&mut runner, SupervisorSystem::FCC_WAYPOINT_UPDATE)?,
            log_output(&mut runner, SupervisorSystem::LP_EXPIRED)?,
            log_output(&mut runner, SupervisorSystem::LP_NEW)?,
            log_output(&mut runner, SupervisorSystem::MISSION_COMPLETE)?,
            log_output(&mut runner, SupervisorSystem::NOTIFY_PILOT)?,
            log_output(&mut runner, SupervisorSystem::SET_MISSION_MONITOR_STATUS)?,
            log_output(&mut runner, SupervisorSystem::START_MISSION)?,
            log_output(&mut runner, SupervisorSystem::UPDATE_BOSS)?,
            log_output(&mut runner, SupervisorSystem::UPDATE_GCS)?,
            log_output(&mut runner, SupervisorSystem::UPDATE_MISSION_ITEM)?,
        ];

        Ok(SupervisorRunner {
            runner,
            inputs,
            outputs,
        })
    }

    pub fn inputs(&self) -> &SupervisorInputs {
        &self.inputs
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.runner.stop_handle()
    }

    /// Runs until stopped or until `limit` has elapsed. Outputs are logged
    /// from a separate thread while the simulation runs.
    pub fn run(self, limit: Option<Time>) -> Result<()> {
        let SupervisorRunner {
            mut runner,
            inputs,
            outputs,
        } = self;

        let logger = spawn_logger(outputs)?;
        let result = runner.run(limit);

        // Closes every subscription so the logger can finish
        drop(runner);
        drop(inputs);

        if logger.join().is_err() {
            warn!("Output logger panicked");
        }

        result.context("Supervisor simulation failed")
    }
}

fn log_output<T: Clone + Debug + Send + 'static>(
    runner: &mut RealTimeRunner,
    port: OutPort<T>,
) -> Result<Box<dyn LoggedOutput>> {
    let receiver = runner.subscribe(&port, Capacity::Unbounded)?;

    Ok(Box::new(Logged {
        port: port.info().name,
        receiver,
    }))
}

fn spawn_logger(outputs: Vec<Box<dyn LoggedOutput>>) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("output-logger".to_string())
        .spawn(move || {
            loop {
                let selector = outputs
                    .iter()
                    .fold(Selector::new(), |selector, output| output.register(selector));

                if let Received::Closed = selector.wait() {
                    break;
                }
            }
        })
        .context("Cannot spawn output logger thread")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;

    fn config_file() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/params.toml")
    }

    #[test]
    fn test_load_config_file() -> Result<()> {
        let params = load_params(&config_file())?;
        let defaults = SupervisorParams::default();

        assert_eq!(params.repo_timer, defaults.repo_timer);
        assert_eq!(params.upd_timer, defaults.upd_timer);
        assert_eq!(params.lp_accept_timer, defaults.lp_accept_timer);
        assert_eq!(params.orbit_timer, defaults.orbit_timer);
        assert_eq!(params.takeover_polling_rate, Time::from_millis(1000));
        assert_relative_eq!(params.landed_agl_ft, defaults.landed_agl_ft);
        assert_relative_eq!(params.orbit_radius_m, defaults.orbit_radius_m);

        Ok(())
    }

    #[test]
    fn test_missing_config_file() {
        assert!(load_params(Path::new("does/not/exist.toml")).is_err());
    }

    #[test]
    fn test_run_until_limit() -> Result<()> {
        let runner = SupervisorRunner::new(&SupervisorParams::default())?;
        let inputs = runner.inputs().clone();

        inputs.perception_status.send(true)?;
        runner.run(Some(Time::from_millis(50)))?;

        // The simulation is gone once the run returns
        assert!(inputs.perception_status.send(true).is_err());

        Ok(())
    }

    #[test]
    fn test_stop_handle() -> Result<()> {
        let runner = SupervisorRunner::new(&SupervisorParams::default())?;
        let stop = runner.stop_handle();

        let worker = thread::spawn(move || runner.run(None));
        stop.stop();

        assert!(matches!(worker.join(), Ok(Ok(()))));

        Ok(())
    }
}
