use std::{
    any::{TypeId, type_name},
    collections::HashSet,
    fmt::{self, Display},
};

use super::{
    atomic::Atomic,
    port::{Direction, InPort, OutPort, PortInfo},
};
use crate::error::Error;

pub enum Model {
    Atomic(Box<dyn Atomic>),
    Coupled(Box<Coupled>),
}

impl Model {
    pub fn atomic(model: impl Atomic + 'static) -> Model {
        Model::Atomic(Box::new(model))
    }

    pub fn input_ports(&self) -> Vec<PortInfo> {
        match self {
            Model::Atomic(m) => m.input_ports(),
            Model::Coupled(c) => c.inputs.clone(),
        }
    }

    pub fn output_ports(&self) -> Vec<PortInfo> {
        match self {
            Model::Atomic(m) => m.output_ports(),
            Model::Coupled(c) => c.outputs.clone(),
        }
    }
}

impl From<Coupled> for Model {
    fn from(value: Coupled) -> Self {
        Model::Coupled(Box::new(value))
    }
}

/// One end of a coupling. `model` is `None` for the boundary of the coupled
/// model that owns the coupling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub model: Option<String>,
    pub port: &'static str,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.model {
            Some(model) => write!(f, "{model}.{}", self.port),
            None => write!(f, "{}", self.port),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupling {
    pub from: Endpoint,
    pub to: Endpoint,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

impl Display for Coupling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{} -> {}'", self.from, self.to)
    }
}

/// A validated composition of child models and their coupling tables.
pub struct Coupled {
    pub(crate) name: String,
    pub(crate) inputs: Vec<PortInfo>,
    pub(crate) outputs: Vec<PortInfo>,
    pub(crate) children: Vec<(String, Model)>,
    pub(crate) couplings: Vec<Coupling>,
}

impl Coupled {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_ports(&self) -> &[PortInfo] {
        &self.inputs
    }

    pub fn output_ports(&self) -> &[PortInfo] {
        &self.outputs
    }

    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(|(name, _)| name.as_str())
    }

    pub fn couplings(&self) -> &[Coupling] {
        &self.couplings
    }
}

pub struct CoupledBuilder {
    name: String,
    inputs: Vec<PortInfo>,
    outputs: Vec<PortInfo>,
    children: Vec<(String, Model)>,
    couplings: Vec<Coupling>,
}

impl CoupledBuilder {
    pub fn new(name: &str) -> Self {
        CoupledBuilder {
            name: name.to_string(),
            inputs: vec![],
            outputs: vec![],
            children: vec![],
            couplings: vec![],
        }
    }

    pub fn input<T: 'static>(&mut self, port: InPort<T>) -> &mut Self {
        self.inputs.push(port.info());
        self
    }

    pub fn output<T: 'static>(&mut self, port: OutPort<T>) -> &mut Self {
        self.outputs.push(port.info());
        self
    }

    pub fn add_atomic(&mut self, name: &str, model: impl Atomic + 'static) -> &mut Self {
        self.children.push((name.to_string(), Model::atomic(model)));
        self
    }

    pub fn add_coupled(&mut self, model: Coupled) -> &mut Self {
        self.children.push((model.name.clone(), model.into()));
        self
    }

    /// External input coupling: boundary input `port` to `to_model.to_port`.
    pub fn eic<T: 'static>(
        &mut self,
        port: InPort<T>,
        to_model: &str,
        to_port: InPort<T>,
    ) -> &mut Self {
        self.couple::<T>(None, port.info().name, Some(to_model), to_port.info().name)
    }

    /// External output coupling: `from_model.from_port` to boundary output `port`.
    pub fn eoc<T: 'static>(
        &mut self,
        from_model: &str,
        from_port: OutPort<T>,
        port: OutPort<T>,
    ) -> &mut Self {
        self.couple::<T>(Some(from_model), from_port.info().name, None, port.info().name)
    }

    /// Internal coupling between two children.
    pub fn ic<T: 'static>(
        &mut self,
        from_model: &str,
        from_port: OutPort<T>,
        to_model: &str,
        to_port: InPort<T>,
    ) -> &mut Self {
        self.couple::<T>(
            Some(from_model),
            from_port.info().name,
            Some(to_model),
            to_port.info().name,
        )
    }

    fn couple<T: 'static>(
        &mut self,
        from_model: Option<&str>,
        from_port: &'static str,
        to_model: Option<&str>,
        to_port: &'static str,
    ) -> &mut Self {
        self.couplings.push(Coupling {
            from: Endpoint {
                model: from_model.map(str::to_string),
                port: from_port,
            },
            to: Endpoint {
                model: to_model.map(str::to_string),
                port: to_port,
            },
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        });
        self
    }

    /// Checks that every coupling references existing models and ports and
    /// that both ends carry the same payload type.
    pub fn build(self) -> Result<Coupled, Error> {
        let mut names = HashSet::new();
        for (name, _) in &self.children {
            if !names.insert(name.as_str()) {
                return Err(Error::DuplicateModel(format!("{}.{}", self.name, name)));
            }
        }

        for coupling in &self.couplings {
            self.check_endpoint(coupling, &coupling.from, Direction::Output)?;
            self.check_endpoint(coupling, &coupling.to, Direction::Input)?;
        }

        Ok(Coupled {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
            children: self.children,
            couplings: self.couplings,
        })
    }

    /// `direction` is the direction of the port as seen from a child. The
    /// boundary is inverted: a coupling leaves from a boundary input.
    fn check_endpoint(
        &self,
        coupling: &Coupling,
        endpoint: &Endpoint,
        direction: Direction,
    ) -> Result<(), Error> {
        let (owner, ports, direction) = match &endpoint.model {
            None => {
                let (ports, direction) = match direction {
                    Direction::Output => (self.inputs.clone(), Direction::Input),
                    Direction::Input => (self.outputs.clone(), Direction::Output),
                };
                (self.name.clone(), ports, direction)
            }
            Some(model) => {
                let child = self
                    .children
                    .iter()
                    .find(|(name, _)| name == model)
                    .map(|(_, child)| child)
                    .ok_or_else(|| Error::UnknownModel(format!("{}.{}", self.name, model)))?;

                let ports = match direction {
                    Direction::Input => child.input_ports(),
                    Direction::Output => child.output_ports(),
                };
                (format!("{}.{}", self.name, model), ports, direction)
            }
        };

        let port = ports
            .iter()
            .find(|p| p.name == endpoint.port)
            .ok_or_else(|| Error::UnknownPort {
                model: owner,
                port: endpoint.port.to_string(),
                direction: direction.to_string(),
            })?;

        if port.type_id != coupling.type_id {
            return Err(Error::IncompatiblePorts {
                coupling: coupling.to_string(),
                requested: coupling.type_name.to_string(),
                expected: port.type_name.to_string(),
            });
        }

        Ok(())
    }
}
