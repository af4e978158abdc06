use std::{
    any::{TypeId, type_name},
    fmt::{self, Debug, Display},
    marker::PhantomData,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// Runtime description of a port, used to validate couplings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortInfo {
    pub name: &'static str,
    pub direction: Direction,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

/// A port carrying messages of type `T`. Implemented by [`InPort`] and
/// [`OutPort`], so a [`Bag`](super::Bag) can be read and written through
/// either.
pub trait Port<T> {
    fn name(&self) -> &'static str;
}

pub struct InPort<T> {
    name: &'static str,
    _payload: PhantomData<fn() -> T>,
}

pub struct OutPort<T> {
    name: &'static str,
    _payload: PhantomData<fn() -> T>,
}

impl<T: 'static> InPort<T> {
    pub const fn new(name: &'static str) -> Self {
        InPort {
            name,
            _payload: PhantomData,
        }
    }

    pub fn info(&self) -> PortInfo {
        PortInfo {
            name: self.name,
            direction: Direction::Input,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }
}

impl<T: 'static> OutPort<T> {
    pub const fn new(name: &'static str) -> Self {
        OutPort {
            name,
            _payload: PhantomData,
        }
    }

    pub fn info(&self) -> PortInfo {
        PortInfo {
            name: self.name,
            direction: Direction::Output,
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
        }
    }
}

impl<T> Port<T> for InPort<T> {
    fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Port<T> for OutPort<T> {
    fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for InPort<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for InPort<T> {}

impl<T> Clone for OutPort<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for OutPort<T> {}

impl<T> Debug for InPort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InPort<{}>({})", type_name::<T>(), self.name)
    }
}

impl<T> Debug for OutPort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutPort<{}>({})", type_name::<T>(), self.name)
    }
}
