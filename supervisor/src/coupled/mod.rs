//! Coupled models: the phases of flight and the complete supervisor.

pub mod landing;
pub mod lp_reposition;
pub mod on_route;
pub mod supervisor;
pub mod system;
pub mod takeoff;

pub use landing::Landing;
pub use lp_reposition::LpReposition;
pub use on_route::OnRoute;
pub use supervisor::Supervisor;
pub use system::SupervisorSystem;
pub use takeoff::Takeoff;

#[cfg(test)]
use devs::{
    Time,
    modeling::{Bag, OutPort},
};

/// Every message emitted on `port`, in emission order.
#[cfg(test)]
pub(crate) fn collect<T: Clone + 'static>(outputs: &[(Time, Bag)], port: &OutPort<T>) -> Vec<T> {
    outputs
        .iter()
        .flat_map(|(_, bag)| bag.messages(port).iter().cloned())
        .collect()
}
