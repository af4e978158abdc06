use std::collections::HashMap;

use log::{debug, info, warn};

use crate::{
    error::Error,
    modeling::{Atomic, Bag, Coupled, Direction, InPort, Model, PortInfo, bag::Messages},
    time::Time,
};

/// Atomic model reached through a hierarchy of coupled models.
struct Leaf {
    path: String,
    model: Box<dyn Atomic>,
    last: Time,
    next: Time,
    inbox: Bag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Leaf(usize, &'static str),
    Root(&'static str),
}

/// Leaf input ports reached from a boundary port, or leaf output ports
/// reaching a boundary port.
type Endpoints = HashMap<&'static str, Vec<(usize, &'static str)>>;

struct Flattened {
    entries: Endpoints,
    exits: Endpoints,
}

struct Scheduled {
    time: Time,
    port: &'static str,
    values: Box<dyn Messages>,
}

/// Executes a model hierarchy one simulated instant at a time.
///
/// Coupled models are flattened at construction: every output port of every
/// leaf is resolved to the leaf input ports (or root output ports) it feeds,
/// so routing a bag is a single table lookup.
pub struct Simulator {
    name: String,
    leaves: Vec<Leaf>,
    routes: HashMap<(usize, &'static str), Vec<Target>>,
    root_entries: Endpoints,
    root_inputs: Vec<PortInfo>,
    root_outputs: Vec<PortInfo>,
    pending: Vec<Scheduled>,
    time: Time,
}

impl Simulator {
    pub fn new(name: &str, model: Model) -> Simulator {
        let root_inputs = model.input_ports();
        let root_outputs = model.output_ports();

        let mut leaves = vec![];
        let mut routes: HashMap<(usize, &'static str), Vec<Target>> = HashMap::new();

        let flat = flatten(name.to_string(), model, &mut leaves, &mut routes);

        for (port, sources) in flat.exits {
            for source in sources {
                routes.entry(source).or_default().push(Target::Root(port));
            }
        }

        for leaf in leaves.iter_mut() {
            leaf.next = leaf.model.time_advance();
            debug!("[{}] {} {}", Time::zero(), leaf.path, leaf.model.state_log());
        }

        info!(
            "Simulator '{}' ready with {} atomic models",
            name,
            leaves.len()
        );

        Simulator {
            name: name.to_string(),
            leaves,
            routes,
            root_entries: flat.entries,
            root_inputs,
            root_outputs,
            pending: vec![],
            time: Time::zero(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Time of the last executed instant.
    pub fn time(&self) -> Time {
        self.time
    }

    pub fn next_event_time(&self) -> Time {
        let internal = self
            .leaves
            .iter()
            .map(|l| l.next)
            .min()
            .unwrap_or(Time::Infinity);

        match self.pending.first() {
            Some(s) => internal.min(s.time),
            None => internal,
        }
    }

    pub fn input_ports(&self) -> &[PortInfo] {
        &self.root_inputs
    }

    pub fn output_ports(&self) -> &[PortInfo] {
        &self.root_outputs
    }

    /// Checks that the root model has a port matching `info`.
    pub fn check_root_port(&self, info: &PortInfo) -> Result<(), Error> {
        let ports = match info.direction {
            Direction::Input => &self.root_inputs,
            Direction::Output => &self.root_outputs,
        };

        let port = ports
            .iter()
            .find(|p| p.name == info.name)
            .ok_or_else(|| Error::UnknownPort {
                model: self.name.clone(),
                port: info.name.to_string(),
                direction: info.direction.to_string(),
            })?;

        if port.type_id != info.type_id {
            return Err(Error::WrongPortType {
                port: info.name.to_string(),
                requested: info.type_name.to_string(),
                expected: port.type_name.to_string(),
            });
        }

        Ok(())
    }

    /// Schedules `value` on a root input port. Times in the past are delivered
    /// at the next instant.
    pub fn schedule<T: Clone + Send + 'static>(
        &mut self,
        time: Time,
        port: &InPort<T>,
        value: T,
    ) -> Result<(), Error> {
        self.check_root_port(&port.info())?;
        self.schedule_erased(time, port.info().name, Box::new(vec![value]));
        Ok(())
    }

    /// Delivers `value` at the current time.
    pub fn inject<T: Clone + Send + 'static>(
        &mut self,
        port: &InPort<T>,
        value: T,
    ) -> Result<(), Error> {
        self.schedule(self.time, port, value)
    }

    pub(crate) fn schedule_erased(
        &mut self,
        time: Time,
        port: &'static str,
        values: Box<dyn Messages>,
    ) {
        let time = time.max(self.time);
        let pos = self.pending.partition_point(|s| s.time <= time);
        self.pending.insert(pos, Scheduled { time, port, values });
    }

    /// Executes the next simulated instant and returns what the root model
    /// emitted. Returns `None` if every model is passive and no input is
    /// pending.
    pub fn step(&mut self) -> Option<Bag> {
        let t = self.next_event_time();
        if t.is_infinity() {
            return None;
        }

        let imminent: Vec<bool> = self.leaves.iter().map(|l| l.next == t).collect();

        // All outputs are computed before any of them is routed
        let outputs: Vec<(usize, Bag)> = self
            .leaves
            .iter()
            .enumerate()
            .filter(|(i, _)| imminent[*i])
            .map(|(i, l)| (i, l.model.output()))
            .collect();

        let mut root_out = Bag::new();

        for (source, bag) in &outputs {
            for (port, values) in bag.iter_erased() {
                let Some(targets) = self.routes.get(&(*source, port)) else {
                    continue;
                };

                for target in targets {
                    match target {
                        Target::Leaf(i, p) => self.leaves[*i].inbox.append_erased(*p, values),
                        Target::Root(p) => root_out.append_erased(*p, values),
                    }
                }
            }
        }

        while self.pending.first().is_some_and(|s| s.time <= t) {
            let scheduled = self.pending.remove(0);
            match self.root_entries.get(scheduled.port) {
                Some(entries) => {
                    for (i, p) in entries {
                        self.leaves[*i]
                            .inbox
                            .append_erased(*p, scheduled.values.as_ref());
                    }
                }
                None => warn!(
                    "Input on '{}.{}' is not coupled to any model",
                    self.name, scheduled.port
                ),
            }
        }

        for (i, leaf) in self.leaves.iter_mut().enumerate() {
            let inputs = std::mem::take(&mut leaf.inbox);
            let elapsed = t - leaf.last;

            let kind = match (imminent[i], inputs.is_empty()) {
                (true, true) => {
                    leaf.model.internal_transition();
                    "int"
                }
                (true, false) => {
                    leaf.model.confluent_transition(elapsed, &inputs);
                    "conf"
                }
                (false, false) => {
                    leaf.model.external_transition(elapsed, &inputs);
                    "ext"
                }
                (false, true) => continue,
            };

            leaf.last = t;
            leaf.next = t + leaf.model.time_advance();

            debug!("[{}] {} ({}) {}", t, leaf.path, kind, leaf.model.state_log());
        }

        self.time = t;
        Some(root_out)
    }

    /// Executes every instant up to and including `end`, then moves the clock
    /// to `end`. Returns the non empty root outputs with their times.
    pub fn run_until(&mut self, end: Time) -> Vec<(Time, Bag)> {
        let mut outputs = vec![];

        while self.next_event_time() <= end {
            let t = self.next_event_time();
            match self.step() {
                Some(bag) if !bag.is_empty() => outputs.push((t, bag)),
                Some(_) => {}
                None => break,
            }
        }

        if !end.is_infinity() && end > self.time {
            self.time = end;
        }

        outputs
    }

    /// Steps until every model is passive.
    pub fn run_until_passive(&mut self, max_steps: usize) -> Result<Vec<(Time, Bag)>, Error> {
        let mut outputs = vec![];

        for _ in 0..max_steps {
            let t = self.next_event_time();
            match self.step() {
                Some(bag) if !bag.is_empty() => outputs.push((t, bag)),
                Some(_) => {}
                None => {
                    info!("Simulator '{}' passivated at {}", self.name, self.time);
                    return Ok(outputs);
                }
            }
        }

        if self.next_event_time().is_infinity() {
            return Ok(outputs);
        }

        Err(Error::StepLimit(max_steps))
    }

    /// State name of the atomic model at `path`, e.g. `top.child.leaf`.
    pub fn state_of(&self, path: &str) -> Option<String> {
        self.leaves
            .iter()
            .find(|l| l.path == path)
            .map(|l| l.model.state())
    }

    /// Path and state name of every atomic model.
    pub fn states(&self) -> Vec<(String, String)> {
        self.leaves
            .iter()
            .map(|l| (l.path.clone(), l.model.state()))
            .collect()
    }
}

fn flatten(
    path: String,
    model: Model,
    leaves: &mut Vec<Leaf>,
    routes: &mut HashMap<(usize, &'static str), Vec<Target>>,
) -> Flattened {
    match model {
        Model::Atomic(model) => {
            let idx = leaves.len();
            let entries = model
                .input_ports()
                .iter()
                .map(|p| (p.name, vec![(idx, p.name)]))
                .collect();
            let exits = model
                .output_ports()
                .iter()
                .map(|p| (p.name, vec![(idx, p.name)]))
                .collect();

            leaves.push(Leaf {
                path,
                model,
                last: Time::zero(),
                next: Time::Infinity,
                inbox: Bag::new(),
            });

            Flattened { entries, exits }
        }
        Model::Coupled(coupled) => {
            let Coupled {
                children: models,
                couplings,
                ..
            } = *coupled;

            let mut children: HashMap<String, Flattened> = HashMap::new();
            for (name, child) in models {
                let flat = flatten(format!("{path}.{name}"), child, leaves, routes);
                children.insert(name, flat);
            }

            let endpoints = |model: &Option<String>, port: &'static str, exits: bool| {
                model
                    .as_ref()
                    .and_then(|m| children.get(m))
                    .and_then(|f| {
                        let side = if exits { &f.exits } else { &f.entries };
                        side.get(port)
                    })
                    .cloned()
                    .unwrap_or_default()
            };

            let mut entries = Endpoints::new();
            let mut exits = Endpoints::new();

            for coupling in &couplings {
                match (&coupling.from.model, &coupling.to.model) {
                    (None, Some(_)) => entries
                        .entry(coupling.from.port)
                        .or_default()
                        .extend(endpoints(&coupling.to.model, coupling.to.port, false)),
                    (Some(_), None) => exits
                        .entry(coupling.to.port)
                        .or_default()
                        .extend(endpoints(&coupling.from.model, coupling.from.port, true)),
                    (Some(_), Some(_)) => {
                        let targets = endpoints(&coupling.to.model, coupling.to.port, false);
                        for source in endpoints(&coupling.from.model, coupling.from.port, true) {
                            routes
                                .entry(source)
                                .or_default()
                                .extend(targets.iter().map(|(i, p)| Target::Leaf(*i, *p)));
                        }
                    }
                    (None, None) => warn!(
                        "Ignoring boundary to boundary coupling {} in '{}'",
                        coupling, path
                    ),
                }
            }

            Flattened { entries, exits }
        }
    }
}
