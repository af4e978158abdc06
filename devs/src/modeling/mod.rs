pub mod atomic;
pub mod bag;
pub mod coupled;
pub mod port;

pub use atomic::{Atomic, missing_time_advance};
pub use bag::Bag;
pub use coupled::{Coupled, CoupledBuilder, Coupling, Endpoint, Model};
pub use port::{Direction, InPort, OutPort, Port, PortInfo};
